//! Module providing representation of optimization problem variables
use std::fmt::{Display, Formatter};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// A continuous variable of an optimization problem
///
/// The index is the column of the variable in the problem, and is assigned when the
/// variable is added.
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct Variable {
    /// Used to identify the variable
    pub(crate) id: String,
    /// Column of the variable in the problem
    #[builder(default = "0", setter(skip))]
    pub(crate) index: usize,
    /// Lowest value the variable can take
    #[builder(default = "f64::NEG_INFINITY")]
    pub(crate) lower_bound: f64,
    /// Highest value the variable can take
    #[builder(default = "f64::INFINITY")]
    pub(crate) upper_bound: f64,
}

impl VariableBuilder {
    fn validate(&self) -> Result<(), String> {
        let lower_bound = self.lower_bound.unwrap_or(f64::NEG_INFINITY);
        let upper_bound = self.upper_bound.unwrap_or(f64::INFINITY);
        if lower_bound.is_nan() || upper_bound.is_nan() || lower_bound > upper_bound {
            return Err(format!(
                "Invalid variable bounds: [{}, {}]",
                lower_bound, upper_bound
            ));
        }
        Ok(())
    }
}

impl Variable {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    /// Whether the variable is fixed to a single value
    pub fn is_fixed(&self) -> bool {
        self.lower_bound == self.upper_bound
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:[{}, {}]", self.id, self.lower_bound, self.upper_bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_variable() {
        let var = VariableBuilder::default()
            .id("x")
            .lower_bound(0.)
            .build()
            .unwrap();
        assert_eq!(var.id(), "x");
        assert_eq!(var.index(), 0);
        assert!(var.upper_bound().is_infinite());
        assert_eq!(format!("{}", var), "x:[0, inf]");
        assert!(VariableBuilder::default()
            .id("y")
            .lower_bound(1.)
            .upper_bound(0.)
            .build()
            .is_err());
    }
}
