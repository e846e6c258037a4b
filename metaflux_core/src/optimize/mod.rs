//! Module for constructing and solving optimization problems

pub mod constraint;
pub mod modifications;
pub mod objective;
pub mod problem;
pub mod solution;
pub mod solvers;
pub mod variable;

use serde::{Deserialize, Serialize};

/// Struct representing the solution to an optimization problem
#[derive(Clone, Debug, PartialEq)]
pub struct ProblemSolution {
    /// The status of the optimization problem, representing if the optimization was
    /// completed successfully
    pub status: OptimizationStatus,
    /// Optimized value of the objective
    ///
    /// Some(f64) if the optimization was completed successfully, None otherwise
    pub objective_value: Option<f64>,
    /// Values of the variables at the optimum, in column order
    ///
    /// Some(Vec) if the problem could be solved, None otherwise
    pub variable_values: Option<Vec<f64>>,
    /// Values of the dual variables at the optimum, in constraint order
    ///
    /// Some(Vec) if the problem could be solved and the solver supports retrieving
    /// the dual values, None otherwise. A dual is the change of the objective per unit
    /// increase of the constraint's bound.
    pub dual_values: Option<Vec<f64>>,
}

impl ProblemSolution {
    /// Solution for a problem which couldn't be solved
    pub fn without_values(status: OptimizationStatus) -> Self {
        ProblemSolution {
            status,
            objective_value: None,
            variable_values: None,
            dual_values: None,
        }
    }
}

/// Status of an optimization problem
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizationStatus {
    /// Problem has been optimized
    Optimal,
    /// Problem can't be optimized because objective value is not bounded
    Unbounded,
    /// Problem can't be solved because it is infeasible (conflicting constraints)
    Infeasible,
    /// An approximate solution has been found
    AlmostOptimal,
    /// A numerical error occurred during solving
    NumericalError,
    /// The solver hit the maximum allowed iterations, or max time, or made insufficient progress
    SolverHalted,
}

impl OptimizationStatus {
    /// Whether the solver found an optimal, or nearly optimal, solution
    pub fn is_optimal(&self) -> bool {
        matches!(
            self,
            OptimizationStatus::Optimal | OptimizationStatus::AlmostOptimal
        )
    }
}
