//! Implements a solver interface for microlp, a pure rust simplex solver
use ::microlp::{ComparisonOp, Error, LinearExpr, OptimizationDirection, Variable};

use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::Problem;
use crate::optimize::solvers::{Solver, SolverError};
use crate::optimize::{OptimizationStatus, ProblemSolution};

const NAME: &str = "microlp";

/// Simplex solver for small linear problems, doesn't accept any attributes
/// and doesn't report duals
#[derive(Clone, Copy, Debug, Default)]
pub struct MicrolpSolver;

impl Solver for MicrolpSolver {
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
        if let Some(name) = problem.attributes().keys().next() {
            return Err(SolverError::UnknownAttribute {
                solver: NAME,
                name: name.clone(),
            });
        }
        let direction = match problem.objective().sense() {
            ObjectiveSense::Maximize => OptimizationDirection::Maximize,
            ObjectiveSense::Minimize => OptimizationDirection::Minimize,
        };
        let mut lp = ::microlp::Problem::new(direction);
        let costs = problem.objective().linear_coefficients(problem.n_variables());
        let variables: Vec<Variable> = problem
            .variables()
            .zip(costs)
            .map(|(var, cost)| lp.add_var(cost, (var.lower_bound(), var.upper_bound())))
            .collect();
        for constraint in problem.constraints() {
            let expression = || {
                let mut expr = LinearExpr::empty();
                for term in constraint.terms() {
                    expr.add(variables[term.variable], term.coefficient);
                }
                expr
            };
            let (lb, ub) = constraint.bounds();
            if lb == ub {
                lp.add_constraint(expression(), ComparisonOp::Eq, ub);
                continue;
            }
            if ub.is_finite() {
                lp.add_constraint(expression(), ComparisonOp::Le, ub);
            }
            if lb.is_finite() {
                lp.add_constraint(expression(), ComparisonOp::Ge, lb);
            }
        }

        match lp.solve() {
            Ok(solution) => {
                let x: Vec<f64> = variables.iter().map(|v| solution[*v]).collect();
                Ok(ProblemSolution {
                    status: OptimizationStatus::Optimal,
                    objective_value: Some(problem.objective_value(&x)),
                    variable_values: Some(x),
                    dual_values: None,
                })
            }
            Err(Error::Infeasible) => Ok(ProblemSolution::without_values(
                OptimizationStatus::Infeasible,
            )),
            Err(Error::Unbounded) => Ok(ProblemSolution::without_values(
                OptimizationStatus::Unbounded,
            )),
            Err(other) => Err(SolverError::SolverFailure {
                solver: NAME,
                message: other.to_string(),
            }),
        }
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
        let solution = MicrolpSolver.solve(&problem).unwrap();
        assert_eq!(solution.status, OptimizationStatus::Optimal);
        let x = solution.variable_values.unwrap();
        assert!((x[0] - 3.).abs() < 1e-7);
        assert!((x[1] - 0.5).abs() < 1e-7);
    }
}
