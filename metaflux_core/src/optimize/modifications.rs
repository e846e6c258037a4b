//! Modifications applied to a compiled [`Problem`] before it is solved
//!
//! Modifications only ever move forward: to get back to the unmodified problem, compile
//! the model again. They are plain data, so a model and a list of modifications can be
//! serialized and sent to a worker which compiles and modifies its own problem.
use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::metabolic_model::gpr::reaction_available;
use crate::metabolic_model::MetabolicModel;
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::{Problem, ProblemError};
use crate::optimize::solvers::AttributeValue;

/// Id of the first crowding constraint, later ones get a numeric suffix
pub const CROWDING_CONSTRAINT_ID: &str = "crowding";

/// A single change to a compiled problem
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Modification {
    /// Overwrite the lower and/or upper bound of a variable, None keeps the current value
    ChangeBound {
        reaction: String,
        lower_bound: Option<f64>,
        upper_bound: Option<f64>,
    },
    /// Replace the whole objective with a linear one
    ChangeObjective {
        weights: IndexMap<String, f64>,
        sense: ObjectiveSense,
    },
    /// Switch between maximizing and minimizing
    ChangeSense(ObjectiveSense),
    /// Store a solver attribute on the problem
    ChangeSolverAttribute { name: String, value: AttributeValue },
    /// Knock out genes, fixing every reaction which can no longer be catalyzed to zero
    Knockout(Vec<String>),
    /// Add a crowding constraint, `sum(weight * flux) <= 1`
    AddCrowding { weights: IndexMap<String, f64> },
}

impl Modification {
    /// Apply the modification to a problem compiled from `model`
    ///
    /// The problem is left unchanged if the modification fails.
    pub fn apply<M: MetabolicModel + ?Sized>(
        &self,
        model: &M,
        problem: &mut Problem,
    ) -> Result<(), ModificationError> {
        match self {
            Modification::ChangeBound {
                reaction,
                lower_bound,
                upper_bound,
            } => change_bound(problem, reaction, *lower_bound, *upper_bound),
            Modification::ChangeObjective { weights, sense } => {
                change_objective(problem, weights, *sense)
            }
            Modification::ChangeSense(sense) => {
                problem.update_objective_sense(*sense);
                Ok(())
            }
            Modification::ChangeSolverAttribute { name, value } => {
                problem.set_attribute(name, value.clone());
                Ok(())
            }
            Modification::Knockout(genes) => {
                let knocked_out = knockout_reactions(model, genes)?;
                // Check every reaction first so a failure leaves the problem untouched
                if let Some(missing) = knocked_out
                    .iter()
                    .find(|r| problem.variable_index(r).is_none())
                {
                    return Err(ModificationError::UnknownVariable(missing.clone()));
                }
                for reaction in &knocked_out {
                    problem.update_variable_bounds(reaction, 0., 0.)?;
                }
                info!(
                    genes = genes.len(),
                    reactions = knocked_out.len(),
                    "Applied gene knockout"
                );
                Ok(())
            }
            Modification::AddCrowding { weights } => add_crowding(problem, weights),
        }
    }
}

/// Apply modifications in order, stopping at the first one which fails
///
/// # Examples
/// ```rust
/// use indexmap::IndexMap;
/// use metaflux_core::metabolic_model::metabolite::Metabolite;
/// use metaflux_core::metabolic_model::model::Model;
/// use metaflux_core::metabolic_model::reaction::ReactionBuilder;
/// use metaflux_core::optimize::modifications::{apply_modifications, Modification};
/// use metaflux_core::optimize::objective::ObjectiveSense;
/// use metaflux_core::optimize::problem::Problem;
/// let mut model = Model::new_empty();
/// model.add_metabolite(Metabolite::new("a")).unwrap();
/// model
///     .add_reaction(
///         ReactionBuilder::default()
///             .id("EX_a")
///             .metabolites(IndexMap::from([("a".to_string(), -1.)]))
///             .build()
///             .unwrap(),
///     )
///     .unwrap();
/// let mut problem = Problem::compile(&model).unwrap();
/// apply_modifications(
///     &model,
///     &mut problem,
///     &[
///         Modification::ChangeBound {
///             reaction: "EX_a".to_string(),
///             lower_bound: Some(-10.),
///             upper_bound: None,
///         },
///         Modification::ChangeSense(ObjectiveSense::Minimize),
///     ],
/// )
/// .unwrap();
/// assert_eq!(problem.variable("EX_a").unwrap().lower_bound(), -10.);
/// ```
pub fn apply_modifications<M: MetabolicModel + ?Sized>(
    model: &M,
    problem: &mut Problem,
    modifications: &[Modification],
) -> Result<(), ModificationError> {
    for modification in modifications {
        debug!(?modification, "Applying modification");
        modification.apply(model, problem)?;
    }
    Ok(())
}

/// Ids of the [`MetabolicModel::knockout_targets`] of `model` which can't be catalyzed
/// once `genes` are knocked out
///
/// Variables without a gene association never show up here. Every gene has to be part
/// of the model.
pub fn knockout_reactions<M: MetabolicModel + ?Sized>(
    model: &M,
    genes: &[String],
) -> Result<Vec<String>, ModificationError> {
    let model_genes: HashSet<String> = model.genes().into_iter().collect();
    if let Some(missing) = genes.iter().find(|g| !model_genes.contains(*g)) {
        return Err(ModificationError::UnknownGene(missing.clone()));
    }
    let knockouts: HashSet<String> = genes.iter().cloned().collect();
    Ok(model
        .knockout_targets()
        .into_iter()
        .filter(|r| {
            let association = model.reaction_gene_association(r);
            !reaction_available(association.as_deref(), &knockouts)
        })
        .collect())
}

fn change_bound(
    problem: &mut Problem,
    reaction: &str,
    lower_bound: Option<f64>,
    upper_bound: Option<f64>,
) -> Result<(), ModificationError> {
    let variable = problem
        .variable(reaction)
        .ok_or_else(|| ModificationError::UnknownVariable(reaction.to_string()))?;
    let lower_bound = lower_bound.unwrap_or(variable.lower_bound());
    let upper_bound = upper_bound.unwrap_or(variable.upper_bound());
    if lower_bound.is_nan() || upper_bound.is_nan() || lower_bound > upper_bound {
        return Err(ModificationError::InvalidBounds {
            reaction: reaction.to_string(),
            lower_bound,
            upper_bound,
        });
    }
    problem.update_variable_bounds(reaction, lower_bound, upper_bound)?;
    Ok(())
}

fn change_objective(
    problem: &mut Problem,
    weights: &IndexMap<String, f64>,
    sense: ObjectiveSense,
) -> Result<(), ModificationError> {
    let terms = weights
        .iter()
        .map(|(id, weight)| {
            problem
                .variable_index(id)
                .map(|index| (index, *weight))
                .ok_or_else(|| ModificationError::UnknownVariable(id.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    problem.remove_all_objective_terms();
    for (index, weight) in terms {
        problem.add_new_linear_objective_term(index, weight)?;
    }
    problem.update_objective_sense(sense);
    Ok(())
}

fn add_crowding(
    problem: &mut Problem,
    weights: &IndexMap<String, f64>,
) -> Result<(), ModificationError> {
    let (variables, coefficients): (Vec<usize>, Vec<f64>) = weights
        .iter()
        .map(|(id, weight)| {
            problem
                .variable_index(id)
                .map(|index| (index, *weight))
                .ok_or_else(|| ModificationError::UnknownVariable(id.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .unzip();
    let id = next_crowding_id(problem);
    problem.add_new_inequality_constraint(
        &id,
        &variables,
        &coefficients,
        f64::NEG_INFINITY,
        1.,
    )?;
    Ok(())
}

fn next_crowding_id(problem: &Problem) -> String {
    if problem.constraint(CROWDING_CONSTRAINT_ID).is_none() {
        return CROWDING_CONSTRAINT_ID.to_string();
    }
    (2..)
        .map(|n| format!("{}_{}", CROWDING_CONSTRAINT_ID, n))
        .find(|id| problem.constraint(id).is_none())
        .unwrap_or_else(|| CROWDING_CONSTRAINT_ID.to_string())
}

/// Errors from applying a [`Modification`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModificationError {
    #[error("No variable with id {0} in the problem")]
    UnknownVariable(String),
    #[error("No gene with id {0} in the model")]
    UnknownGene(String),
    #[error("Invalid bounds for {reaction}: lower_bound ({lower_bound}) > upper_bound ({upper_bound})")]
    InvalidBounds {
        reaction: String,
        lower_bound: f64,
        upper_bound: f64,
    },
    #[error(transparent)]
    ProblemError(#[from] ProblemError),
}
