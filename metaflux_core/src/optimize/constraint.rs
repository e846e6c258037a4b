//! Provides struct for representing a constraint in an optimization problem
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Represents a linear constraint in an optimization problem
///
/// Terms refer to variables by their column index in the owning problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constraint {
    /// Represents an equality constraint, where `terms` = `equals`
    Equality {
        /// Identifier of the constraint
        id: String,
        /// Linear terms which are added together, see [`ConstraintTerm`] for more
        terms: Vec<ConstraintTerm>,
        /// The right hand side of the equality constraint
        equals: f64,
    },
    /// Represents an inequality constraint, `lower_bound` <= `terms` <= `upper_bound`
    Inequality {
        /// Identifier of the constraint
        id: String,
        /// Linear terms which are added together, see [`ConstraintTerm`] for more
        terms: Vec<ConstraintTerm>,
        /// The lowest value the sum of the terms can take
        lower_bound: f64,
        /// The highest value the sum of the terms can take
        upper_bound: f64,
    },
}

impl Constraint {
    /// Create a new equality constraint
    ///
    /// # Parameters
    /// - `id`: Identifier of the constraint
    /// - `variables`: A slice of variable indices
    /// - `coefficients`: A slice of coefficients for the variables
    /// - `equals`: The right hand side of the equality
    ///
    /// # Examples
    /// ```rust
    /// use metaflux_core::optimize::constraint::Constraint;
    /// // Create a constraint representing 3*x_0 + 2*x_1 = 6
    /// let new_constraint = Constraint::new_equality("c", &[0, 1], &[3.0, 2.0], 6.);
    /// assert_eq!(new_constraint.bounds(), (6., 6.));
    /// ```
    pub fn new_equality(id: &str, variables: &[usize], coefficients: &[f64], equals: f64) -> Self {
        Constraint::Equality {
            id: id.to_string(),
            terms: Constraint::zip_into_terms(variables, coefficients),
            equals,
        }
    }

    /// Create a new inequality constraint
    ///
    /// # Examples
    /// ```rust
    /// use metaflux_core::optimize::constraint::Constraint;
    /// // represents the inequality 2 <= 3*x_0 + 2*x_1 <= 6
    /// let new_constraint = Constraint::new_inequality("c", &[0, 1], &[3.0, 2.0], 2., 6.);
    /// assert_eq!(new_constraint.terms().len(), 2);
    /// ```
    pub fn new_inequality(
        id: &str,
        variables: &[usize],
        coefficients: &[f64],
        lower_bound: f64,
        upper_bound: f64,
    ) -> Self {
        Constraint::Inequality {
            id: id.to_string(),
            terms: Constraint::zip_into_terms(variables, coefficients),
            lower_bound,
            upper_bound,
        }
    }

    pub fn get_id(&self) -> &str {
        match self {
            Constraint::Equality { id, .. } | Constraint::Inequality { id, .. } => id,
        }
    }

    pub fn terms(&self) -> &[ConstraintTerm] {
        match self {
            Constraint::Equality { terms, .. } | Constraint::Inequality { terms, .. } => terms,
        }
    }

    /// Lowest and highest values of the sum of terms, equal for equality constraints
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            Constraint::Equality { equals, .. } => (*equals, *equals),
            Constraint::Inequality {
                lower_bound,
                upper_bound,
                ..
            } => (*lower_bound, *upper_bound),
        }
    }

    /// Value of the sum of the terms for the given variable values
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.terms()
            .iter()
            .map(|t| t.coefficient * values.get(t.variable).copied().unwrap_or(0.))
            .sum()
    }

    /// Take a slice of variable indices, and a slice of coefficients and zip
    /// them together into a vec of ConstraintTerms
    fn zip_into_terms(variables: &[usize], coefficients: &[f64]) -> Vec<ConstraintTerm> {
        variables
            .iter()
            .zip(coefficients)
            .map(|(var, coef)| ConstraintTerm {
                variable: *var,
                coefficient: *coef,
            })
            .collect()
    }

    /// Convert a vector of terms into a String representation
    fn terms_to_string(terms: &[ConstraintTerm]) -> String {
        if terms.is_empty() {
            return "0".to_string();
        }
        terms
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Constraint::Equality { id, terms, equals } => {
                write!(f, "{}: {} = {}", id, Self::terms_to_string(terms), equals)
            }
            Constraint::Inequality {
                id,
                terms,
                lower_bound,
                upper_bound,
            } => write!(
                f,
                "{}: {} <= {} <= {}",
                id,
                lower_bound,
                Self::terms_to_string(terms),
                upper_bound
            ),
        }
    }
}

/// Represents a single term in a constraint, specifically
/// represents the multiplication of the `variable` by the `coefficient`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstraintTerm {
    /// Column index of the variable
    pub variable: usize,
    /// The coefficient for the variable
    pub coefficient: f64,
}

impl Display for ConstraintTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}*x{}", self.coefficient, self.variable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_constraints() {
        let eq = Constraint::new_equality("A", &[0, 2], &[-1., 1.], 0.);
        assert_eq!(eq.to_string(), "A: -1*x0 + 1*x2 = 0");
        let ineq = Constraint::new_inequality("crowding", &[], &[], f64::NEG_INFINITY, 1.);
        assert_eq!(ineq.to_string(), "crowding: -inf <= 0 <= 1");
    }

    #[test]
    fn activity() {
        let eq = Constraint::new_equality("A", &[0, 2], &[-1., 2.], 0.);
        assert!((eq.activity(&[1., 5., 3.]) - 5.).abs() < 1e-12);
    }
}
