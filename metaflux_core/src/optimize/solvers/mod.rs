//! Interfaces to the numeric solvers used to optimize a [`Problem`]
//!
//! Every solver receives the whole problem and returns the variable values in column
//! order. Solver attributes set on the problem are interpreted here, never by the
//! problem itself.
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::configuration;
use crate::optimize::problem::Problem;
use crate::optimize::ProblemSolution;

pub mod clarabel;
#[cfg(feature = "highs")]
pub mod highs;
#[cfg(feature = "minilp")]
pub mod microlp;

/// A solver able to optimize a [`Problem`]
///
/// Solvers hold no state between solves, so one solver can be shared between threads.
pub trait Solver: Send + Sync {
    /// Name of the solver, used in errors and logs
    fn name(&self) -> &'static str;

    /// Whether the solver can handle quadratic objective terms
    fn quadratic_objective_capable(&self) -> bool;

    /// Optimize the problem
    ///
    /// Infeasible or unbounded problems are reported through the status of the solution,
    /// errors are only returned when the problem can't be handed to the solver.
    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError>;
}

/// Value of a solver attribute
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl AttributeValue {
    /// Value as a float, integers are converted
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(v) => Some(*v),
            AttributeValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Bool(v) => write!(f, "{}", v),
            AttributeValue::Int(v) => write!(f, "{}", v),
            AttributeValue::Float(v) => write!(f, "{}", v),
            AttributeValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

/// Create the solver selected in the global configuration
pub fn default_solver() -> Result<Box<dyn Solver>, SolverError> {
    match configuration::current().solver {
        configuration::Solver::Clarabel => Ok(Box::new(clarabel::ClarabelSolver::default())),
        #[cfg(feature = "highs")]
        configuration::Solver::Highs => Ok(Box::new(highs::HighsSolver::default())),
        #[cfg(not(feature = "highs"))]
        configuration::Solver::Highs => Err(SolverError::SolverUnavailable("highs")),
        #[cfg(feature = "minilp")]
        configuration::Solver::Microlp => Ok(Box::new(microlp::MicrolpSolver::default())),
        #[cfg(not(feature = "minilp"))]
        configuration::Solver::Microlp => Err(SolverError::SolverUnavailable("microlp")),
    }
}

/// Errors from handing a problem to a solver
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The solver doesn't know the attribute
    #[error("{solver} has no attribute {name}")]
    UnknownAttribute { solver: &'static str, name: String },
    /// The attribute is known, but the value has the wrong type or range
    #[error("Invalid value {value} for {solver} attribute {name}")]
    InvalidAttributeValue {
        solver: &'static str,
        name: String,
        value: String,
    },
    /// The problem has quadratic objective terms the solver can't handle
    #[error("{0} can't solve problems with a quadratic objective")]
    QuadraticObjectiveUnsupported(&'static str),
    /// The solver was not compiled in
    #[error("Solver {0} is not available, enable the corresponding crate feature")]
    SolverUnavailable(&'static str),
    /// The solver failed in a way not covered by a status
    #[error("{solver} failed: {message}")]
    SolverFailure {
        solver: &'static str,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_conversion() {
        assert_eq!(AttributeValue::from(3i64).as_float(), Some(3.));
        assert_eq!(AttributeValue::from(true).as_bool(), Some(true));
        assert_eq!(AttributeValue::from("on").as_int(), None);
        assert_eq!(AttributeValue::from(2.5).to_string(), "2.5");
    }

    #[test]
    fn clarabel_is_default() {
        let solver = default_solver().unwrap();
        assert_eq!(solver.name(), "clarabel");
        assert!(solver.quadratic_objective_capable());
    }
}
