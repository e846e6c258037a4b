//! Parsimonious flux balance analysis
use tracing::{debug, instrument, warn};

use crate::analysis::{constrain_objective, AnalysisError};
use crate::metabolic_model::MetabolicModel;
use crate::optimize::modifications::{apply_modifications, Modification};
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::Problem;
use crate::optimize::solution::FluxSolution;
use crate::optimize::solvers::Solver;

/// Id of the row holding the original objective near its optimum
pub const PFBA_OBJECTIVE_CONSTRAINT_ID: &str = "pfba_objective";

/// Find the optimal flux distribution with the smallest sum of squared reaction fluxes
///
/// The objective is first optimized as in FBA. It is then kept within
/// `relative_tolerance` of that optimum while the sum of squared fluxes over
/// [`MetabolicModel::reactions`] is minimized. The objective value of the returned
/// solution is that sum of squares.
///
/// The solver has to handle quadratic objectives.
#[instrument(skip_all, name = "parsimonious_flux_balance_analysis")]
pub fn parsimonious_flux_balance_analysis<M, S>(
    model: &M,
    modifications: &[Modification],
    relative_tolerance: f64,
    solver: &S,
) -> Result<FluxSolution, AnalysisError>
where
    M: MetabolicModel + ?Sized,
    S: Solver + ?Sized,
{
    if !solver.quadratic_objective_capable() {
        return Err(AnalysisError::QuadraticSolverRequired(solver.name()));
    }
    if relative_tolerance.is_nan() || relative_tolerance < 0. {
        return Err(AnalysisError::InvalidTolerance(relative_tolerance));
    }
    let mut problem = Problem::compile(model)?;
    apply_modifications(model, &mut problem, modifications)?;

    let initial = FluxSolution::extract(&problem, problem.solve(solver)?);
    let optimum = match initial.objective_value {
        Some(optimum) if initial.status.is_optimal() => optimum,
        _ => {
            warn!(status = ?initial.status, "Initial FBA of pFBA was not optimal");
            return Ok(initial);
        }
    };
    debug!(optimum, "Fixing objective for pFBA");

    constrain_objective(
        &mut problem,
        PFBA_OBJECTIVE_CONSTRAINT_ID,
        optimum,
        relative_tolerance,
    )?;
    problem.remove_all_objective_terms();
    problem.update_objective_sense(ObjectiveSense::Minimize);
    for reaction in model.reactions() {
        let index = problem
            .variable_index(&reaction)
            .ok_or(AnalysisError::UnknownReaction(reaction))?;
        problem.add_new_quadratic_objective_term(index, index, 1.)?;
    }

    let solution = FluxSolution::extract(&problem, problem.solve(solver)?);
    if !solution.status.is_optimal() {
        warn!(status = ?solution.status, "pFBA minimization was not optimal");
    }
    Ok(solution)
}
