//! Module providing the Model struct for representing a metabolic model, and the
//! [`MetabolicModel`] trait which every model type compiled into an optimization problem
//! implements.

pub mod gene;
pub mod gpr;
pub mod metabolite;
pub mod model;
pub mod reaction;

use indexmap::IndexMap;
use nalgebra::DVector;
use nalgebra_sparse::CscMatrix;

use crate::metabolic_model::gpr::Isozyme;

/// Free form notes and annotations, a map of keys to lists of values
pub type Annotations = IndexMap<String, Vec<String>>;

/// Common view of a metabolic model used to build optimization problems
///
/// Every model type (plain models, communities, enzyme constrained wrappers) exposes its
/// variables, mass balances and bounds through this trait. Vectors and matrices returned
/// here are ordered by [`MetabolicModel::variables`] (columns) and
/// [`MetabolicModel::metabolites`] (rows), and that order is what compiled problems use.
pub trait MetabolicModel {
    /// Ids of the optimization variables, in column order
    fn variables(&self) -> Vec<String>;

    /// Number of optimization variables
    fn n_variables(&self) -> usize {
        self.variables().len()
    }

    /// Ids of variables which are reaction fluxes
    fn reactions(&self) -> Vec<String> {
        self.variables()
    }

    /// Ids of variables fixed to zero when their gene association is knocked out
    fn knockout_targets(&self) -> Vec<String> {
        self.reactions()
    }

    /// Ids of the metabolites, in row order of the stoichiometric matrix
    fn metabolites(&self) -> Vec<String>;

    /// Number of metabolites
    fn n_metabolites(&self) -> usize {
        self.metabolites().len()
    }

    /// Ids of the genes
    fn genes(&self) -> Vec<String>;

    /// Sparse stoichiometric matrix, metabolites by variables
    fn stoichiometry(&self) -> CscMatrix<f64>;

    /// Lower and upper bounds of the variables
    fn bounds(&self) -> (DVector<f64>, DVector<f64>);

    /// Right hand side of the mass balance, zero for steady state
    fn balance(&self) -> DVector<f64> {
        DVector::zeros(self.n_metabolites())
    }

    /// Linear objective coefficients of the variables
    fn objective(&self) -> DVector<f64>;

    /// Ids of additional coupling constraints
    fn coupling_ids(&self) -> Vec<String> {
        Vec::new()
    }

    /// Sparse matrix of the coupling constraints, coupling rows by variables
    fn coupling(&self) -> CscMatrix<f64> {
        CscMatrix::zeros(0, self.n_variables())
    }

    /// Lower and upper bounds of the coupling constraints
    fn coupling_bounds(&self) -> (DVector<f64>, DVector<f64>) {
        (DVector::zeros(0), DVector::zeros(0))
    }

    /// Isozymes able to catalyze a reaction, None if the reaction doesn't depend on genes
    /// (or isn't a reaction of this model)
    fn reaction_gene_association(&self, reaction_id: &str) -> Option<Vec<Isozyme>>;
}
