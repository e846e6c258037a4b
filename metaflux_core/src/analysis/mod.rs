//! Analyses built on compiling, modifying and solving a model
//!
//! Every analysis compiles a fresh [`Problem`], applies the given modifications in order,
//! and solves with the passed solver. Models are only read.
pub mod fba;
pub mod fva;
pub mod pfba;

use thiserror::Error;

use crate::configuration;
use crate::optimize::modifications::ModificationError;
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::{Problem, ProblemError};
use crate::optimize::solvers::SolverError;
use crate::optimize::OptimizationStatus;

/// Add a row keeping the current linear objective within `relative_slack` of `optimum`
///
/// The slack is `relative_slack * |optimum|` plus [`Configuration::tolerance`], so an
/// objective held at exactly its optimum stays feasible for the solver. For maximization
/// the row is `objective >= optimum - slack`, for minimization `objective <= optimum + slack`.
///
/// [`Configuration::tolerance`]: crate::configuration::Configuration::tolerance
pub(crate) fn constrain_objective(
    problem: &mut Problem,
    id: &str,
    optimum: f64,
    relative_slack: f64,
) -> Result<(), AnalysisError> {
    if problem.objective().contains_quadratic() {
        return Err(AnalysisError::QuadraticObjective);
    }
    let (variables, coefficients): (Vec<usize>, Vec<f64>) = problem
        .objective()
        .linear_coefficients(problem.n_variables())
        .into_iter()
        .enumerate()
        .filter(|(_, coef)| *coef != 0.)
        .unzip();
    let slack = relative_slack * optimum.abs() + configuration::current().tolerance;
    let (lower_bound, upper_bound) = match problem.objective().sense() {
        ObjectiveSense::Maximize => (optimum - slack, f64::INFINITY),
        ObjectiveSense::Minimize => (f64::NEG_INFINITY, optimum + slack),
    };
    problem.add_new_inequality_constraint(id, &variables, &coefficients, lower_bound, upper_bound)?;
    Ok(())
}

/// Errors raised while running an analysis
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    ProblemError(#[from] ProblemError),
    #[error(transparent)]
    ModificationError(#[from] ModificationError),
    #[error(transparent)]
    SolverError(#[from] SolverError),
    #[error("Solver {0} can't minimize a quadratic objective")]
    QuadraticSolverRequired(&'static str),
    #[error("The objective to constrain has quadratic terms")]
    QuadraticObjective,
    #[error("Initial optimization was not optimal, status: {0:?}")]
    NonOptimal(OptimizationStatus),
    #[error("Fraction of the optimum must be within [0, 1], got {0}")]
    InvalidFraction(f64),
    #[error("Relative tolerance must be non-negative, got {0}")]
    InvalidTolerance(f64),
    #[error("No variable {0} in the problem")]
    UnknownReaction(String),
    #[error("Unable to build thread pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_variable(sense: ObjectiveSense) -> Problem {
        let mut problem = Problem::new(sense);
        problem.add_new_variable("x", 0., 100.).unwrap();
        problem.add_new_linear_objective_term(0, 2.).unwrap();
        problem
    }

    #[test]
    fn objective_row_bounds() {
        let tolerance = configuration::current().tolerance;

        let mut problem = single_variable(ObjectiveSense::Maximize);
        constrain_objective(&mut problem, "held", 10., 0.).unwrap();
        let row = problem.constraint("held").unwrap();
        let (lower, upper) = row.bounds();
        assert!((lower - (10. - tolerance)).abs() < 1e-12);
        assert_eq!(upper, f64::INFINITY);
        assert_eq!(row.terms().len(), 1);

        let mut problem = single_variable(ObjectiveSense::Minimize);
        constrain_objective(&mut problem, "held", -10., 0.5).unwrap();
        let (lower, upper) = problem.constraint("held").unwrap().bounds();
        assert_eq!(lower, f64::NEG_INFINITY);
        assert!((upper - (-5. + tolerance)).abs() < 1e-12);
    }

    #[test]
    fn quadratic_objective_rejected() {
        let mut problem = single_variable(ObjectiveSense::Minimize);
        problem.add_new_quadratic_objective_term(0, 0, 1.).unwrap();
        assert!(matches!(
            constrain_objective(&mut problem, "held", 1., 0.),
            Err(AnalysisError::QuadraticObjective)
        ));
    }
}

/// Toy network used by the analysis tests
///
/// `EX_a` takes up to 10 of `a`, `r1` and `r2` (genes g1 and g2) both turn `a` into `b`,
/// and `growth` drains `b`.
#[cfg(test)]
pub(crate) mod test_model {
    use indexmap::IndexMap;

    use crate::metabolic_model::gene::Gene;
    use crate::metabolic_model::gpr::Isozyme;
    use crate::metabolic_model::metabolite::Metabolite;
    use crate::metabolic_model::model::Model;
    use crate::metabolic_model::reaction::ReactionBuilder;

    pub(crate) fn branched() -> Model {
        let mut model = Model::with_id("branched");
        model
            .add_metabolites([Metabolite::new("a"), Metabolite::new("b")])
            .unwrap();
        model.add_genes([Gene::new("g1"), Gene::new("g2")]).unwrap();
        let reactions = [
            ("EX_a", vec![("a", 1.)], 0., 10., 0., None),
            ("r1", vec![("a", -1.), ("b", 1.)], 0., 1000., 0., Some("g1")),
            ("r2", vec![("a", -1.), ("b", 1.)], 0., 1000., 0., Some("g2")),
            ("growth", vec![("b", -1.)], 0., 1000., 1., None),
        ];
        for (id, metabolites, lb, ub, objective, gene) in reactions {
            let metabolites: IndexMap<String, f64> = metabolites
                .into_iter()
                .map(|(m, c)| (m.to_string(), c))
                .collect();
            let mut builder = ReactionBuilder::default();
            builder
                .id(id)
                .metabolites(metabolites)
                .lower_bound(lb)
                .upper_bound(ub)
                .objective_coefficient(objective);
            if let Some(gene) = gene {
                builder.gene_association(vec![Isozyme::new([gene])]);
            }
            model.add_reaction(builder.build().unwrap()).unwrap();
        }
        model
    }
}
