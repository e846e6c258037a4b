//! Implements a solver interface for HiGHS
use ::highs::{Col, HighsModelStatus, RowProblem, Sense};

use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::Problem;
use crate::optimize::solvers::{AttributeValue, Solver, SolverError};
use crate::optimize::{OptimizationStatus, ProblemSolution};

const NAME: &str = "highs";

/// HiGHS linear programming solver
///
/// Attributes are passed to HiGHS as options, so any HiGHS option name can be used.
/// Integer values must fit in an `i32`.
#[derive(Clone, Copy, Debug, Default)]
pub struct HighsSolver;

impl Solver for HighsSolver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn quadratic_objective_capable(&self) -> bool {
        false
    }

    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError> {
        if problem.objective().contains_quadratic() {
            return Err(SolverError::QuadraticObjectiveUnsupported(NAME));
        }
        let costs = problem.objective().linear_coefficients(problem.n_variables());
        let mut row_problem = RowProblem::default();
        let columns: Vec<Col> = problem
            .variables()
            .zip(costs)
            .map(|(var, cost)| row_problem.add_column(cost, var.lower_bound()..=var.upper_bound()))
            .collect();
        for constraint in problem.constraints() {
            let (lb, ub) = constraint.bounds();
            let factors: Vec<(Col, f64)> = constraint
                .terms()
                .iter()
                .map(|t| (columns[t.variable], t.coefficient))
                .collect();
            row_problem.add_row(lb..=ub, factors);
        }

        let sense = match problem.objective().sense() {
            ObjectiveSense::Maximize => Sense::Maximise,
            ObjectiveSense::Minimize => Sense::Minimise,
        };
        let mut model = row_problem.optimise(sense);
        let mut verbose = false;
        for (name, value) in problem.attributes() {
            match value {
                AttributeValue::Bool(v) => {
                    if name == "verbose" {
                        verbose = *v;
                    } else {
                        model.set_option(name.as_str(), *v)
                    }
                }
                AttributeValue::Int(v) => {
                    let v = i32::try_from(*v).map_err(|_| SolverError::InvalidAttributeValue {
                        solver: NAME,
                        name: name.clone(),
                        value: v.to_string(),
                    })?;
                    model.set_option(name.as_str(), v)
                }
                AttributeValue::Float(v) => model.set_option(name.as_str(), *v),
                AttributeValue::Text(v) => model.set_option(name.as_str(), v.as_str()),
            }
        }
        if !verbose {
            model.make_quiet();
        }

        let solved = model.try_solve().map_err(|status| SolverError::SolverFailure {
            solver: NAME,
            message: format!("{:?}", status),
        })?;
        let status = match solved.status() {
            HighsModelStatus::Optimal => OptimizationStatus::Optimal,
            HighsModelStatus::Infeasible => OptimizationStatus::Infeasible,
            HighsModelStatus::Unbounded | HighsModelStatus::UnboundedOrInfeasible => {
                OptimizationStatus::Unbounded
            }
            HighsModelStatus::ModelError
            | HighsModelStatus::LoadError
            | HighsModelStatus::PresolveError
            | HighsModelStatus::SolveError
            | HighsModelStatus::PostsolveError => OptimizationStatus::NumericalError,
            _ => OptimizationStatus::SolverHalted,
        };
        if !status.is_optimal() {
            return Ok(ProblemSolution::without_values(status));
        }
        let solution = solved.get_solution();
        let x = solution.columns().to_vec();
        Ok(ProblemSolution {
            status,
            objective_value: Some(problem.objective_value(&x)),
            variable_values: Some(x),
            dual_values: Some(solution.dual_rows().to_vec()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve_lp() {
        let mut problem = Problem::new_maximization();
        problem.add_new_variable("x", 0., 3.).unwrap();
        problem.add_new_variable("y", 0., f64::INFINITY).unwrap();
        problem
            .add_new_inequality_constraint_by_id("c", &["x", "y"], &[1., 2.], f64::NEG_INFINITY, 4.)
            .unwrap();
        problem.add_new_linear_objective_term_by_id("x", 1.).unwrap();
        problem.add_new_linear_objective_term_by_id("y", 1.).unwrap();
        let solution = HighsSolver.solve(&problem).unwrap();
        assert_eq!(solution.status, OptimizationStatus::Optimal);
        assert!((solution.objective_value.unwrap() - 3.5).abs() < 1e-7);

        problem.add_new_quadratic_objective_term(0, 0, 1.).unwrap();
        assert!(HighsSolver.solve(&problem).is_err());
    }
}
