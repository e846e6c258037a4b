//! Provides struct for representing an optimization problem's objective

use serde::{Deserialize, Serialize};

/// Represents the Objective of an optimization problem
///
/// The value of the objective is the sum of its terms, where a linear term is
/// `coef * x_i` and a quadratic term is `coef * x_i * x_j`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    /// Terms included in the objective (See [`ObjectiveTerm`])
    terms: Vec<ObjectiveTerm>,
    /// Sense of the objective (maximize, or minimize), see [`ObjectiveSense`]
    sense: ObjectiveSense,
}

impl Objective {
    /// Create a new empty objective, with a given sense
    pub fn new(sense: ObjectiveSense) -> Self {
        Self {
            terms: Vec::new(),
            sense,
        }
    }

    /// Create a new empty maximization objective
    pub fn new_maximize() -> Self {
        Self::new(ObjectiveSense::Maximize)
    }

    /// Create a new empty minimization objective
    pub fn new_minimize() -> Self {
        Self::new(ObjectiveSense::Minimize)
    }

    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    /// Change the sense of the objective
    pub fn set_sense(&mut self, sense: ObjectiveSense) {
        self.sense = sense;
    }

    pub fn terms(&self) -> &[ObjectiveTerm] {
        &self.terms
    }

    /// Add a new term to the objective
    pub fn add_term(&mut self, term: ObjectiveTerm) {
        self.terms.push(term);
    }

    /// Add a new Linear term to the objective
    pub fn add_linear_term(&mut self, variable: usize, coefficient: f64) {
        self.terms.push(ObjectiveTerm::new_linear(variable, coefficient));
    }

    /// Add a new Quadratic term to the objective
    pub fn add_quadratic_term(&mut self, variable1: usize, variable2: usize, coefficient: f64) {
        self.terms
            .push(ObjectiveTerm::new_quadratic(variable1, variable2, coefficient));
    }

    /// Remove every term, keeping the sense
    pub fn remove_all_terms(&mut self) {
        self.terms.clear();
    }

    /// Whether any term of the objective is quadratic
    pub fn contains_quadratic(&self) -> bool {
        self.terms
            .iter()
            .any(|t| matches!(t, ObjectiveTerm::Quadratic { .. }))
    }

    /// Dense vector of the linear coefficients, repeated terms are summed
    pub fn linear_coefficients(&self, n_variables: usize) -> Vec<f64> {
        let mut coefficients = vec![0.; n_variables];
        for term in &self.terms {
            if let ObjectiveTerm::Linear { var, coef } = term {
                if let Some(c) = coefficients.get_mut(*var) {
                    *c += coef;
                }
            }
        }
        coefficients
    }

    /// Evaluate the objective at the given variable values
    pub fn value(&self, values: &[f64]) -> f64 {
        let value_of = |i: &usize| values.get(*i).copied().unwrap_or(0.);
        self.terms
            .iter()
            .map(|term| match term {
                ObjectiveTerm::Linear { var, coef } => coef * value_of(var),
                ObjectiveTerm::Quadratic { var1, var2, coef } => {
                    coef * value_of(var1) * value_of(var2)
                }
            })
            .sum()
    }
}

/// Represents the sense of the objective, whether it should be maximized or minimized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveSense {
    /// The objective should be minimized
    Minimize,
    /// The objective should be maximized
    Maximize,
}

// region Objective Terms
/// A term in the objective
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObjectiveTerm {
    /// A quadratic term in the objective
    Quadratic {
        /// Index of the first variable in the objective term
        var1: usize,
        /// Index of the second variable in the objective term
        var2: usize,
        /// Coefficient for quadratic term
        coef: f64,
    },
    /// A linear term in the objective
    Linear {
        /// Index of the variable in objective term
        var: usize,
        /// Coefficient for linear term
        coef: f64,
    },
}

impl ObjectiveTerm {
    /// Create a new quadratic objective term
    pub fn new_quadratic(var1: usize, var2: usize, coef: f64) -> Self {
        ObjectiveTerm::Quadratic { var1, var2, coef }
    }

    /// Create a new linear objective term
    pub fn new_linear(var: usize, coef: f64) -> Self {
        ObjectiveTerm::Linear { var, coef }
    }

    /// Indices of the variables used by the term
    pub fn variables(&self) -> Vec<usize> {
        match self {
            ObjectiveTerm::Quadratic { var1, var2, .. } => vec![*var1, *var2],
            ObjectiveTerm::Linear { var, .. } => vec![*var],
        }
    }
}
// endregion Objective Terms

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objective_value() {
        let mut objective = Objective::new_maximize();
        objective.add_linear_term(0, 2.);
        objective.add_linear_term(0, 1.);
        objective.add_quadratic_term(1, 1, 0.5);
        assert!(objective.contains_quadratic());
        assert_eq!(objective.linear_coefficients(3), vec![3., 0., 0.]);
        assert!((objective.value(&[1., 4., 0.]) - 11.).abs() < 1e-12);
        objective.remove_all_terms();
        assert!(!objective.contains_quadratic());
        assert_eq!(objective.sense(), ObjectiveSense::Maximize);
    }
}
