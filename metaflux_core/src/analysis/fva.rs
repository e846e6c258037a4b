//! Flux variability analysis
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::analysis::{constrain_objective, AnalysisError};
use crate::configuration;
use crate::metabolic_model::MetabolicModel;
use crate::optimize::modifications::{apply_modifications, Modification};
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::Problem;
use crate::optimize::solvers::Solver;
use crate::optimize::ProblemSolution;

/// Id of the row holding the original objective near its optimum
pub const FVA_OBJECTIVE_CONSTRAINT_ID: &str = "fva_objective";

/// Smallest and largest flux of a reaction, None where that optimization wasn't optimal
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FluxRange {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

/// Find the range of flux every reaction can carry while the objective stays within
/// `gamma` of its optimum
///
/// `reactions` defaults to [`MetabolicModel::reactions`]. Each reaction is minimized and
/// maximized on its own copy of the problem, spread over
/// [`configuration::Configuration::processes`] threads. Results keep the order of
/// `reactions`.
#[instrument(skip_all, name = "flux_variability_analysis")]
pub fn flux_variability_analysis<M, S>(
    model: &M,
    reactions: Option<&[String]>,
    modifications: &[Modification],
    gamma: f64,
    solver: &S,
) -> Result<IndexMap<String, FluxRange>, AnalysisError>
where
    M: MetabolicModel + ?Sized,
    S: Solver + ?Sized,
{
    if !(0. ..=1.).contains(&gamma) {
        return Err(AnalysisError::InvalidFraction(gamma));
    }
    let mut problem = Problem::compile(model)?;
    apply_modifications(model, &mut problem, modifications)?;

    let initial = problem.solve(solver)?;
    let optimum = match initial.objective_value {
        Some(optimum) if initial.status.is_optimal() => optimum,
        _ => return Err(AnalysisError::NonOptimal(initial.status)),
    };
    constrain_objective(&mut problem, FVA_OBJECTIVE_CONSTRAINT_ID, optimum, 1. - gamma)?;
    problem.remove_all_objective_terms();

    let reactions: Vec<String> = match reactions {
        Some(reactions) => reactions.to_vec(),
        None => model.reactions(),
    };
    let targets: Vec<(String, usize)> = reactions
        .into_iter()
        .map(|r| match problem.variable_index(&r) {
            Some(index) => Ok((r, index)),
            None => Err(AnalysisError::UnknownReaction(r)),
        })
        .collect::<Result<_, _>>()?;

    let processes = configuration::current().processes;
    info!(
        reactions = targets.len(),
        processes, optimum, "Starting flux variability analysis"
    );
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(processes)
        .build()?;
    let results: Vec<Result<(String, FluxRange), AnalysisError>> = pool.install(|| {
        targets
            .par_iter()
            .map(|(reaction, index)| {
                let range = reaction_range(&problem, *index, solver)?;
                debug!(reaction = %reaction, ?range, "Solved flux range");
                Ok((reaction.clone(), range))
            })
            .collect()
    });
    let ranges = results.into_iter().collect::<Result<IndexMap<_, _>, _>>()?;
    info!(reactions = ranges.len(), "Flux variability analysis finished");
    Ok(ranges)
}

/// Minimize then maximize one variable, on a copy of `base`
fn reaction_range<S: Solver + ?Sized>(
    base: &Problem,
    index: usize,
    solver: &S,
) -> Result<FluxRange, AnalysisError> {
    let mut problem = base.clone();
    problem.add_new_linear_objective_term(index, 1.)?;

    problem.update_objective_sense(ObjectiveSense::Minimize);
    let minimum = problem.solve(solver)?;
    problem.update_objective_sense(ObjectiveSense::Maximize);
    let maximum = problem.solve(solver)?;

    let value = |solution: ProblemSolution| {
        if !solution.status.is_optimal() {
            return None;
        }
        solution.variable_values.and_then(|x| x.get(index).copied())
    };
    Ok(FluxRange {
        minimum: value(minimum),
        maximum: value(maximum),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_model::branched;
    use crate::optimize::solvers::clarabel::ClarabelSolver;
    use crate::optimize::OptimizationStatus;

    fn assert_range(range: &FluxRange, minimum: f64, maximum: f64) {
        assert!(
            (range.minimum.unwrap() - minimum).abs() < 1e-4,
            "minimum {:?} != {}",
            range.minimum,
            minimum
        );
        assert!(
            (range.maximum.unwrap() - maximum).abs() < 1e-4,
            "maximum {:?} != {}",
            range.maximum,
            maximum
        );
    }

    #[test]
    fn full_optimum() {
        let model = branched();
        let ranges = flux_variability_analysis(&model, None, &[], 1., &ClarabelSolver).unwrap();
        assert_eq!(
            ranges.keys().collect::<Vec<_>>(),
            vec!["EX_a", "r1", "r2", "growth"]
        );
        assert_range(&ranges["EX_a"], 10., 10.);
        assert_range(&ranges["r1"], 0., 10.);
        assert_range(&ranges["r2"], 0., 10.);
        assert_range(&ranges["growth"], 10., 10.);
    }

    #[test]
    fn fraction_and_subset() {
        let model = branched();
        let subset = vec!["growth".to_string(), "r1".to_string()];
        let ranges = flux_variability_analysis(
            &model,
            Some(subset.as_slice()),
            &[Modification::Knockout(vec!["g2".to_string()])],
            0.5,
            &ClarabelSolver,
        )
        .unwrap();
        assert_eq!(ranges.keys().collect::<Vec<_>>(), vec!["growth", "r1"]);
        assert_range(&ranges["growth"], 5., 10.);
        assert_range(&ranges["r1"], 5., 10.);
    }

    #[test]
    fn invalid_input() {
        let model = branched();
        assert!(matches!(
            flux_variability_analysis(&model, None, &[], 1.5, &ClarabelSolver),
            Err(AnalysisError::InvalidFraction(_))
        ));
        let unknown = vec!["r9".to_string()];
        assert!(matches!(
            flux_variability_analysis(&model, Some(unknown.as_slice()), &[], 1., &ClarabelSolver),
            Err(AnalysisError::UnknownReaction(_))
        ));
        let infeasible = [Modification::ChangeBound {
            reaction: "growth".to_string(),
            lower_bound: Some(20.),
            upper_bound: None,
        }];
        assert!(matches!(
            flux_variability_analysis(&model, None, &infeasible, 1., &ClarabelSolver),
            Err(AnalysisError::NonOptimal(OptimizationStatus::Infeasible))
        ));
    }
}
