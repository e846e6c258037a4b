//! Provides struct representing an optimization problem
use indexmap::IndexMap;
use nalgebra_sparse::{CooMatrix, CscMatrix, CsrMatrix};
use thiserror::Error;
use tracing::debug;

use crate::metabolic_model::MetabolicModel;
use crate::optimize::constraint::Constraint;
use crate::optimize::objective::{Objective, ObjectiveSense, ObjectiveTerm};
use crate::optimize::solvers::{AttributeValue, Solver, SolverError};
use crate::optimize::variable::Variable;
use crate::optimize::ProblemSolution;

/// An optimization problem
///
/// Variables and constraints are kept in the order they were added, and that order is
/// their index. Nothing is ever removed, so an index stays valid for the lifetime of the
/// problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    /// Objective to optimize
    objective: Objective,
    /// Variables of the optimization problem
    variables: IndexMap<String, Variable>,
    /// Constraints of the optimization problem
    constraints: IndexMap<String, Constraint>,
    /// Solver attributes, passed on to the solver without interpretation
    attributes: IndexMap<String, AttributeValue>,
    /// Type of problem
    problem_type: ProblemType,
}

impl Problem {
    // region Creation Functions
    /// Create a new optimization problem
    pub fn new(objective_sense: ObjectiveSense) -> Self {
        Self {
            objective: Objective::new(objective_sense),
            variables: IndexMap::new(),
            constraints: IndexMap::new(),
            attributes: IndexMap::new(),
            problem_type: ProblemType::Linear,
        }
    }

    /// Create a new maximization problem
    pub fn new_maximization() -> Self {
        Self::new(ObjectiveSense::Maximize)
    }

    /// Create a new minimization problem
    pub fn new_minimization() -> Self {
        Self::new(ObjectiveSense::Minimize)
    }

    /// Compile a metabolic model into a maximization problem
    ///
    /// One variable is created per model variable (in model order), then one equality
    /// constraint per metabolite (`S·v = b`, in model order), then the coupling
    /// constraints of the model.
    ///
    /// # Examples
    /// ```rust
    /// use indexmap::IndexMap;
    /// use metaflux_core::metabolic_model::metabolite::Metabolite;
    /// use metaflux_core::metabolic_model::model::Model;
    /// use metaflux_core::metabolic_model::reaction::ReactionBuilder;
    /// use metaflux_core::optimize::problem::Problem;
    /// let mut model = Model::new_empty();
    /// model.add_metabolite(Metabolite::new("a")).unwrap();
    /// model
    ///     .add_reaction(
    ///         ReactionBuilder::default()
    ///             .id("EX_a")
    ///             .metabolites(IndexMap::from([("a".to_string(), -1.)]))
    ///             .build()
    ///             .unwrap(),
    ///     )
    ///     .unwrap();
    /// let problem = Problem::compile(&model).unwrap();
    /// assert_eq!(problem.n_variables(), 1);
    /// assert_eq!(problem.n_constraints(), 1);
    /// ```
    pub fn compile<M: MetabolicModel + ?Sized>(model: &M) -> Result<Problem, ProblemError> {
        let variable_ids = model.variables();
        let metabolite_ids = model.metabolites();
        let n_variables = variable_ids.len();
        let n_metabolites = metabolite_ids.len();

        let stoichiometry = model.stoichiometry();
        check_dimensions("stoichiometry rows", n_metabolites, stoichiometry.nrows())?;
        check_dimensions("stoichiometry columns", n_variables, stoichiometry.ncols())?;
        let (lower_bounds, upper_bounds) = model.bounds();
        check_dimensions("lower bounds", n_variables, lower_bounds.len())?;
        check_dimensions("upper bounds", n_variables, upper_bounds.len())?;
        let balance = model.balance();
        check_dimensions("balance", n_metabolites, balance.len())?;
        let objective = model.objective();
        check_dimensions("objective", n_variables, objective.len())?;

        let mut problem = Problem::new_maximization();

        for (i, id) in variable_ids.iter().enumerate() {
            problem.add_new_variable(id, lower_bounds[i], upper_bounds[i])?;
        }

        // Mass balance rows
        let stoichiometry = CsrMatrix::from(&stoichiometry);
        for (i, (row, id)) in stoichiometry.row_iter().zip(metabolite_ids.iter()).enumerate() {
            problem.add_new_equality_constraint(id, row.col_indices(), row.values(), balance[i])?;
        }

        // Coupling rows are appended after every balance row
        let coupling_ids = model.coupling_ids();
        if !coupling_ids.is_empty() {
            let coupling = model.coupling();
            check_dimensions("coupling rows", coupling_ids.len(), coupling.nrows())?;
            check_dimensions("coupling columns", n_variables, coupling.ncols())?;
            let (coupling_lower, coupling_upper) = model.coupling_bounds();
            check_dimensions("coupling lower bounds", coupling_ids.len(), coupling_lower.len())?;
            check_dimensions("coupling upper bounds", coupling_ids.len(), coupling_upper.len())?;
            let coupling = CsrMatrix::from(&coupling);
            for (i, (row, id)) in coupling.row_iter().zip(coupling_ids.iter()).enumerate() {
                if coupling_lower[i] == coupling_upper[i] {
                    problem.add_new_equality_constraint(
                        id,
                        row.col_indices(),
                        row.values(),
                        coupling_lower[i],
                    )?;
                } else {
                    problem.add_new_inequality_constraint(
                        id,
                        row.col_indices(),
                        row.values(),
                        coupling_lower[i],
                        coupling_upper[i],
                    )?;
                }
            }
        }

        for (i, coef) in objective.iter().enumerate() {
            if *coef != 0. {
                problem.add_new_linear_objective_term(i, *coef)?;
            }
        }

        debug!(
            variables = problem.n_variables(),
            metabolites = n_metabolites,
            coupling = coupling_ids.len(),
            "Compiled optimization problem"
        );
        Ok(problem)
    }
    // endregion Creation Functions

    // region Accessors
    pub fn n_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn n_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Variables in column order
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    /// Ids of the variables in column order
    pub fn variable_ids(&self) -> Vec<String> {
        self.variables.keys().cloned().collect()
    }

    pub fn variable(&self, id: &str) -> Option<&Variable> {
        self.variables.get(id)
    }

    /// Column index of a variable
    pub fn variable_index(&self, id: &str) -> Option<usize> {
        self.variables.get_index_of(id)
    }

    /// Constraints in row order
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.values()
    }

    /// Ids of the constraints in row order
    pub fn constraint_ids(&self) -> Vec<String> {
        self.constraints.keys().cloned().collect()
    }

    pub fn constraint(&self, id: &str) -> Option<&Constraint> {
        self.constraints.get(id)
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn problem_type(&self) -> ProblemType {
        self.problem_type
    }

    /// Solver attributes set on this problem
    pub fn attributes(&self) -> &IndexMap<String, AttributeValue> {
        &self.attributes
    }

    /// Lower and upper bounds of the variables, in column order
    pub fn variable_bounds(&self) -> (Vec<f64>, Vec<f64>) {
        self.variables
            .values()
            .map(|v| (v.lower_bound, v.upper_bound))
            .unzip()
    }

    /// Lower and upper bounds of the constraints, in row order
    pub fn constraint_bounds(&self) -> (Vec<f64>, Vec<f64>) {
        self.constraints.values().map(|c| c.bounds()).unzip()
    }

    /// Sparse matrix of the constraint coefficients, constraints by variables
    pub fn constraint_matrix(&self) -> CscMatrix<f64> {
        let mut coo = CooMatrix::new(self.n_constraints(), self.n_variables());
        for (row, constraint) in self.constraints.values().enumerate() {
            for term in constraint.terms() {
                coo.push(row, term.variable, term.coefficient);
            }
        }
        CscMatrix::from(&coo)
    }

    /// Value of the objective at the given variable values
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.value(values)
    }
    // endregion Accessors

    // region Update Objective Sense
    /// Update the objective sense of the problem
    pub fn update_objective_sense(&mut self, sense: ObjectiveSense) {
        self.objective.set_sense(sense);
    }
    // endregion Update Objective Sense

    // region Adding Variables
    /// Add a variable to the optimization problem, returning its index
    pub fn add_variable(&mut self, mut variable: Variable) -> Result<usize, ProblemError> {
        self.validate_variable(&variable)?;
        let index = self.n_variables();
        variable.index = index;
        self.variables.insert(variable.id.clone(), variable);
        Ok(index)
    }

    /// Create a new variable and add it to the optimization problem, returning its index
    pub fn add_new_variable(
        &mut self,
        id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<usize, ProblemError> {
        self.add_variable(Variable {
            id: id.to_string(),
            index: 0,
            lower_bound,
            upper_bound,
        })
    }
    // endregion Adding Variables

    // region Adding Constraints
    /// Add a constraint to the problem, returning its index
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<usize, ProblemError> {
        self.validate_constraint(&constraint)?;
        let index = self.n_constraints();
        self.constraints
            .insert(constraint.get_id().to_string(), constraint);
        Ok(index)
    }

    /// Create a new equality constraint and add it to the problem
    pub fn add_new_equality_constraint(
        &mut self,
        id: &str,
        variables: &[usize],
        coefficients: &[f64],
        equals: f64,
    ) -> Result<usize, ProblemError> {
        self.add_constraint(Constraint::new_equality(id, variables, coefficients, equals))
    }

    /// Create a new equality constraint using variable ids rather than indices, and add it to the problem
    pub fn add_new_equality_constraint_by_id(
        &mut self,
        id: &str,
        variables: &[&str],
        coefficients: &[f64],
        equals: f64,
    ) -> Result<usize, ProblemError> {
        let variables = self.indices_of(variables)?;
        self.add_new_equality_constraint(id, &variables, coefficients, equals)
    }

    /// Create a new inequality constraint and add it to the problem
    pub fn add_new_inequality_constraint(
        &mut self,
        id: &str,
        variables: &[usize],
        coefficients: &[f64],
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<usize, ProblemError> {
        self.add_constraint(Constraint::new_inequality(
            id,
            variables,
            coefficients,
            lower_bound,
            upper_bound,
        ))
    }

    /// Create a new inequality constraint using variable ids rather than indices, and add it to the problem
    pub fn add_new_inequality_constraint_by_id(
        &mut self,
        id: &str,
        variables: &[&str],
        coefficients: &[f64],
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<usize, ProblemError> {
        let variables = self.indices_of(variables)?;
        self.add_new_inequality_constraint(id, &variables, coefficients, lower_bound, upper_bound)
    }
    // endregion Adding Constraints

    // region Adding Objective Terms
    /// Add a new term to the objective
    pub fn add_objective_term(&mut self, objective_term: ObjectiveTerm) -> Result<(), ProblemError> {
        if objective_term
            .variables()
            .iter()
            .any(|v| *v >= self.n_variables())
        {
            return Err(ProblemError::NonExistentVariablesInObjective);
        }
        if let ObjectiveTerm::Quadratic { .. } = objective_term {
            self.problem_type = ProblemType::Quadratic;
        }
        self.objective.add_term(objective_term);
        Ok(())
    }

    /// Add a new linear term to the objective
    pub fn add_new_linear_objective_term(
        &mut self,
        variable: usize,
        coefficient: f64,
    ) -> Result<(), ProblemError> {
        self.add_objective_term(ObjectiveTerm::new_linear(variable, coefficient))
    }

    /// Add a new linear term to the objective using the variable id
    pub fn add_new_linear_objective_term_by_id(
        &mut self,
        variable_id: &str,
        coefficient: f64,
    ) -> Result<(), ProblemError> {
        let variable = self
            .variable_index(variable_id)
            .ok_or(ProblemError::NonExistentVariablesInObjective)?;
        self.add_new_linear_objective_term(variable, coefficient)
    }

    /// Add a new quadratic term to the objective
    pub fn add_new_quadratic_objective_term(
        &mut self,
        variable1: usize,
        variable2: usize,
        coefficient: f64,
    ) -> Result<(), ProblemError> {
        self.add_objective_term(ObjectiveTerm::new_quadratic(
            variable1,
            variable2,
            coefficient,
        ))
    }

    /// Add a new quadratic term to the objective using the variable ids
    pub fn add_new_quadratic_objective_term_by_id(
        &mut self,
        variable1: &str,
        variable2: &str,
        coefficient: f64,
    ) -> Result<(), ProblemError> {
        let variable1 = self
            .variable_index(variable1)
            .ok_or(ProblemError::NonExistentVariablesInObjective)?;
        let variable2 = self
            .variable_index(variable2)
            .ok_or(ProblemError::NonExistentVariablesInObjective)?;
        self.add_new_quadratic_objective_term(variable1, variable2, coefficient)
    }
    // endregion Adding Objective Terms

    // region Remove Objective Terms
    /// Remove all terms from the objective
    pub fn remove_all_objective_terms(&mut self) {
        self.objective.remove_all_terms();
        self.problem_type = ProblemType::Linear;
    }
    // endregion Remove Objective Terms

    // region update variable bounds
    /// Update the bounds of a variable
    pub fn update_variable_bounds(
        &mut self,
        id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ProblemError> {
        let index = self
            .variable_index(id)
            .ok_or_else(|| ProblemError::NonExistentVariable(id.to_string()))?;
        self.update_variable_bounds_by_index(index, lower_bound, upper_bound)
    }

    /// Update the bounds of the variable in column `index`
    pub fn update_variable_bounds_by_index(
        &mut self,
        index: usize,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ProblemError> {
        let (_, var) = self
            .variables
            .get_index_mut(index)
            .ok_or_else(|| ProblemError::NonExistentVariable(index.to_string()))?;
        if lower_bound.is_nan() || upper_bound.is_nan() || lower_bound > upper_bound {
            return Err(ProblemError::InvalidVariableBounds(var.id.clone()));
        }
        var.lower_bound = lower_bound;
        var.upper_bound = upper_bound;
        Ok(())
    }
    // endregion update variable bounds

    // region Solver Attributes
    /// Set a solver attribute, replacing any earlier value
    pub fn set_attribute(&mut self, name: &str, value: AttributeValue) {
        self.attributes.insert(name.to_string(), value);
    }
    // endregion Solver Attributes

    /// Solve the problem with `solver`
    pub fn solve<S: Solver + ?Sized>(&self, solver: &S) -> Result<ProblemSolution, SolverError> {
        solver.solve(self)
    }

    // region Validation Functions
    /// Check that a variable to be added is valid to add to this problem
    fn validate_variable(&self, variable: &Variable) -> Result<(), ProblemError> {
        if self.variables.contains_key(&variable.id) {
            return Err(ProblemError::VariableIdAlreadyExists(variable.id.clone()));
        };
        let (lb, ub) = (variable.lower_bound, variable.upper_bound);
        if lb.is_nan() || ub.is_nan() || lb > ub {
            return Err(ProblemError::InvalidVariableBounds(variable.id.clone()));
        }
        Ok(())
    }

    /// Check that a constraint to be added is valid to add to this Problem
    fn validate_constraint(&self, constraint: &Constraint) -> Result<(), ProblemError> {
        let id = constraint.get_id();
        if self.constraints.contains_key(id) {
            return Err(ProblemError::ConstraintAlreadyExists(id.to_string()));
        }
        let (lb, ub) = constraint.bounds();
        if lb.is_nan() || ub.is_nan() || lb > ub {
            return Err(ProblemError::InvalidConstraintBounds(id.to_string()));
        }
        if constraint
            .terms()
            .iter()
            .any(|t| t.variable >= self.n_variables())
        {
            return Err(ProblemError::NonExistentVariablesInConstraint(
                id.to_string(),
            ));
        }
        Ok(())
    }

    fn indices_of(&self, ids: &[&str]) -> Result<Vec<usize>, ProblemError> {
        ids.iter()
            .map(|id| {
                self.variable_index(id)
                    .ok_or_else(|| ProblemError::NonExistentVariable(id.to_string()))
            })
            .collect()
    }
    // endregion Validation Functions
}

fn check_dimensions(what: &'static str, expected: usize, found: usize) -> Result<(), ProblemError> {
    if expected != found {
        return Err(ProblemError::MismatchedDimensions {
            what,
            expected,
            found,
        });
    }
    Ok(())
}

/// Types of optimization problems
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProblemType {
    /// Problem with linear objective and constraints
    Linear,
    /// Problem with quadratic objective and linear constraints
    Quadratic,
}

/// Errors associated with the Problem
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    /// Error when trying to add a variable with the same id as an existing variable
    #[error("Tried to add variable {0}, but a variable with that id already exists")]
    VariableIdAlreadyExists(String),
    /// Error when a variable would get lower_bound > upper_bound
    #[error("Invalid bounds for variable {0}, lower_bound > upper_bound or NaN")]
    InvalidVariableBounds(String),
    /// Error when trying to add a constraint with the same id as an existing constraint
    #[error("Tried to add constraint {0}, but a constraint with that id already exists")]
    ConstraintAlreadyExists(String),
    /// Error when trying to add a constraint with invalid bounds
    #[error("Tried to add constraint {0} with lower_bound > upper_bound")]
    InvalidConstraintBounds(String),
    /// Error when trying to add a constraint that contains variables not in the problem
    #[error("Constraint {0} uses variables not in the problem")]
    NonExistentVariablesInConstraint(String),
    /// Error when trying to add an objective term which includes variables not in the problem
    #[error("Tried adding an objective term with variables not in the problem")]
    NonExistentVariablesInObjective,
    /// Error when trying to update a variable that doesn't exist
    #[error("Tried to access variable {0}, which doesn't exist")]
    NonExistentVariable(String),
    /// The model handed to the compiler gave vectors or matrices of the wrong size
    #[error("Model {what} has size {found}, expected {expected}")]
    MismatchedDimensions {
        what: &'static str,
        expected: usize,
        found: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::metabolite::Metabolite;
    use crate::metabolic_model::model::Model;
    use crate::metabolic_model::reaction::ReactionBuilder;

    fn toy_model() -> Model {
        let mut model = Model::new_empty();
        model
            .add_metabolites([Metabolite::new("A"), Metabolite::new("B")])
            .unwrap();
        let reactions = [
            ("EX_A", vec![("A", 1.)], 0., 10., 0.),
            ("v1", vec![("A", -1.), ("B", 1.)], -1000., 1000., 0.),
            ("EX_B", vec![("B", -1.)], 0., 1000., 1.),
        ];
        for (id, mets, lb, ub, obj) in reactions {
            model
                .add_reaction(
                    ReactionBuilder::default()
                        .id(id)
                        .metabolites(
                            mets.into_iter()
                                .map(|(m, c)| (m.to_string(), c))
                                .collect::<IndexMap<String, f64>>(),
                        )
                        .lower_bound(lb)
                        .upper_bound(ub)
                        .objective_coefficient(obj)
                        .build()
                        .unwrap(),
                )
                .unwrap();
        }
        model
    }

    #[test]
    fn new_problem() {
        let max_problem = Problem::new_maximization();
        assert_eq!(max_problem.objective.sense(), ObjectiveSense::Maximize);

        let min_problem = Problem::new_minimization();
        assert_eq!(min_problem.objective.sense(), ObjectiveSense::Minimize);
    }

    #[test]
    fn update_objective_sense() {
        let mut problem = Problem::new(ObjectiveSense::Maximize);
        problem.update_objective_sense(ObjectiveSense::Minimize);
        assert_eq!(problem.objective.sense(), ObjectiveSense::Minimize);
        problem.update_objective_sense(ObjectiveSense::Maximize);
        assert_eq!(problem.objective.sense(), ObjectiveSense::Maximize);
    }

    #[test]
    fn compile_order() {
        let model = toy_model();
        let problem = Problem::compile(&model).unwrap();
        assert_eq!(problem.variable_ids(), vec!["EX_A", "v1", "EX_B"]);
        assert_eq!(problem.constraint_ids(), vec!["A", "B"]);
        assert_eq!(problem.variable_index("EX_B"), Some(2));
        let (lb, ub) = problem.variable_bounds();
        assert_eq!(lb, vec![0., -1000., 0.]);
        assert_eq!(ub, vec![10., 1000., 1000.]);
        match problem.constraint("A").unwrap() {
            Constraint::Equality { terms, equals, .. } => {
                assert!(equals.abs() < 1e-25);
                let cols: Vec<usize> = terms.iter().map(|t| t.variable).collect();
                assert_eq!(cols, vec![0, 1]);
            }
            Constraint::Inequality { .. } => panic!("Mass balance should be an equality"),
        }
        assert_eq!(problem.objective().linear_coefficients(3), vec![0., 0., 1.]);
        assert_eq!(problem.problem_type(), ProblemType::Linear);

        let matrix = problem.constraint_matrix();
        assert_eq!(matrix.nrows(), 2);
        assert_eq!(matrix.ncols(), 3);
        assert_eq!(matrix.nnz(), 4);
    }

    #[test]
    fn add_variables() {
        let mut problem = Problem::new(ObjectiveSense::Maximize);
        assert_eq!(problem.add_new_variable("x", 64., 100.).unwrap(), 0);
        assert_eq!(problem.add_new_variable("y", 64., 100.).unwrap(), 1);
        let var = problem.variable("y").unwrap();
        assert_eq!(var.index(), 1);
        assert!((var.lower_bound() - 64.).abs() < 1e-25);
        assert!((var.upper_bound() - 100.).abs() < 1e-25);

        match problem.add_new_variable("x", 0., 1.) {
            Err(ProblemError::VariableIdAlreadyExists(id)) => assert_eq!(id, "x"),
            _ => panic!("Duplicate variable not caught"),
        }
        match problem.add_new_variable("z", 100., 64.) {
            Err(ProblemError::InvalidVariableBounds(_)) => {}
            _ => panic!("Invalid variable bounds not caught"),
        }
    }

    #[test]
    fn add_constraint() {
        let mut problem = Problem::new(ObjectiveSense::Maximize);
        problem.add_new_variable("x", 64., 100.).unwrap();
        problem.add_new_variable("y", 64., 100.).unwrap();

        problem
            .add_new_equality_constraint_by_id("test_constraint", &["x", "y"], &[2., 3.], 200.)
            .unwrap();
        match problem.constraint("test_constraint").unwrap() {
            Constraint::Equality { equals, .. } => assert!((equals - 200.).abs() < 1e-25),
            Constraint::Inequality { .. } => panic!("Incorrect constraint type added"),
        }

        problem
            .add_new_inequality_constraint_by_id("test_ineq", &["x", "y"], &[2., 3.], 100., 200.)
            .unwrap();
        match problem.constraint("test_ineq").unwrap() {
            Constraint::Inequality {
                lower_bound,
                upper_bound,
                ..
            } => {
                assert!((lower_bound - 100.).abs() < 1e-25);
                assert!((upper_bound - 200.).abs() < 1e-25);
            }
            Constraint::Equality { .. } => panic!("Incorrect constraint type added"),
        }
        assert_eq!(problem.n_constraints(), 2);
    }

    #[test]
    fn add_bad_constraint() {
        let mut problem = Problem::new(ObjectiveSense::Maximize);
        problem.add_new_variable("x", 64., 100.).unwrap();
        problem.add_new_variable("y", 64., 100.).unwrap();

        match problem.add_new_inequality_constraint_by_id(
            "bad_constraint",
            &["x", "y"],
            &[2., 3.],
            200.,
            100.,
        ) {
            Err(ProblemError::InvalidConstraintBounds(_)) => {}
            _ => panic!("Invalid constraint bounds not caught"),
        }
        match problem.add_new_equality_constraint("bad_constraint", &[0, 5], &[1., 1.], 0.) {
            Err(ProblemError::NonExistentVariablesInConstraint(_)) => {}
            _ => panic!("Unknown variable not caught"),
        }
        assert!(problem
            .add_new_equality_constraint_by_id("bad_constraint", &["z"], &[1.], 0.)
            .is_err());
        assert_eq!(problem.n_constraints(), 0);
    }

    #[test]
    fn objective_terms() {
        let mut problem = Problem::new_minimization();
        problem.add_new_variable("x", 0., 1.).unwrap();
        problem
            .add_new_quadratic_objective_term_by_id("x", "x", 1.)
            .unwrap();
        assert_eq!(problem.problem_type(), ProblemType::Quadratic);
        assert!(problem.add_new_linear_objective_term(3, 1.).is_err());
        problem.remove_all_objective_terms();
        assert_eq!(problem.problem_type(), ProblemType::Linear);
        assert!(problem.objective().terms().is_empty());
    }

    #[test]
    fn update_bounds() {
        let mut problem = Problem::compile(&toy_model()).unwrap();
        problem.update_variable_bounds("v1", 0., 0.).unwrap();
        assert!(problem.variable("v1").unwrap().is_fixed());
        match problem.update_variable_bounds("v1", 1., 0.) {
            Err(ProblemError::InvalidVariableBounds(_)) => {}
            _ => panic!("Invalid bounds not caught"),
        }
        match problem.update_variable_bounds("missing", 0., 1.) {
            Err(ProblemError::NonExistentVariable(id)) => assert_eq!(id, "missing"),
            _ => panic!("Missing variable not caught"),
        }
    }
}
