//! Flux balance analysis
use tracing::{instrument, warn};

use crate::analysis::AnalysisError;
use crate::metabolic_model::MetabolicModel;
use crate::optimize::modifications::{apply_modifications, Modification};
use crate::optimize::problem::Problem;
use crate::optimize::solution::FluxSolution;
use crate::optimize::solvers::Solver;

/// Optimize the objective of `model` after applying `modifications`
///
/// Infeasible or unbounded problems are not an error, the returned solution carries the
/// status and no values.
///
/// # Examples
/// ```rust
/// use indexmap::IndexMap;
/// use metaflux_core::analysis::fba::flux_balance_analysis;
/// use metaflux_core::metabolic_model::metabolite::Metabolite;
/// use metaflux_core::metabolic_model::model::Model;
/// use metaflux_core::metabolic_model::reaction::ReactionBuilder;
/// use metaflux_core::optimize::solvers::clarabel::ClarabelSolver;
/// let mut model = Model::new_empty();
/// model.add_metabolite(Metabolite::new("a")).unwrap();
/// model
///     .add_reaction(
///         ReactionBuilder::default()
///             .id("EX_a")
///             .metabolites(IndexMap::from([("a".to_string(), 1.)]))
///             .lower_bound(0.)
///             .upper_bound(5.)
///             .build()
///             .unwrap(),
///     )
///     .unwrap();
/// model
///     .add_reaction(
///         ReactionBuilder::default()
///             .id("sink_a")
///             .metabolites(IndexMap::from([("a".to_string(), -1.)]))
///             .lower_bound(0.)
///             .objective_coefficient(1.)
///             .build()
///             .unwrap(),
///     )
///     .unwrap();
/// let solution = flux_balance_analysis(&model, &[], &ClarabelSolver).unwrap();
/// assert!((solution.objective_value.unwrap() - 5.).abs() < 1e-5);
/// ```
#[instrument(skip_all, name = "flux_balance_analysis")]
pub fn flux_balance_analysis<M, S>(
    model: &M,
    modifications: &[Modification],
    solver: &S,
) -> Result<FluxSolution, AnalysisError>
where
    M: MetabolicModel + ?Sized,
    S: Solver + ?Sized,
{
    let mut problem = Problem::compile(model)?;
    apply_modifications(model, &mut problem, modifications)?;
    let solution = FluxSolution::extract(&problem, problem.solve(solver)?);
    if !solution.status.is_optimal() {
        warn!(status = ?solution.status, solver = solver.name(), "FBA was not solved to optimality");
    }
    Ok(solution)
}
