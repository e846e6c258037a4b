//! Enzyme constrained models
//!
//! An [`EnzymeConstrainedModel`] wraps a [`Model`] and limits the flux of every reaction
//! whose isozymes all have turnover numbers by the amount of enzyme available. Each such
//! reaction gets one directional flux variable per isozyme and direction, and each gene
//! gets a product amount variable tied to those fluxes:
//!
//! `sum(stoichiometry * flux / kcat) - amount = 0`
//!
//! The total mass of gene products can additionally be limited by a capacity.
use indexmap::IndexMap;
use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CscMatrix};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::metabolic_model::gpr::Isozyme;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::MetabolicModel;
use crate::optimize::solution::FluxSolution;

/// Prefix of the gene product amount variables
pub const GENE_PRODUCT_PREFIX: &str = "prot_";
/// Suffix of the rows tying a gene product amount to the fluxes it catalyzes
pub const GENE_PRODUCT_BALANCE_SUFFIX: &str = "_balance";
/// Suffix of the rows tying a reaction's flux to its isozyme fluxes
pub const ISOZYME_SUM_SUFFIX: &str = "_isozyme_sum";
/// Id of the total gene product mass constraint
pub const CAPACITY_CONSTRAINT_ID: &str = "enzyme_capacity";

/// Direction of an isozyme flux
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn suffix(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
        }
    }
}

/// Flux of one reaction through one isozyme in one direction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct IsozymeFlux {
    id: String,
    /// Column of the reaction in the wrapped model
    reaction: usize,
    isozyme: Isozyme,
    direction: Direction,
    kcat: f64,
    upper_bound: f64,
}

/// A metabolic model whose fluxes are limited by enzyme amounts
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnzymeConstrainedModel {
    model: Model,
    capacity: Option<f64>,
    fluxes: Vec<IsozymeFlux>,
    /// Ids of the genes with a product amount variable, in model order
    gene_products: Vec<String>,
    /// Ids of the reactions split into isozyme fluxes, in model order
    constrained: Vec<String>,
}

impl EnzymeConstrainedModel {
    /// Wrap `model`, `capacity` limits the total mass of all gene products
    ///
    /// Reactions are only constrained when every isozyme has a positive turnover number
    /// for every direction the reaction can run in. Other reactions keep their plain
    /// bounds.
    pub fn new(model: Model, capacity: Option<f64>) -> Result<EnzymeConstrainedModel, EnzymeError> {
        if let Some(capacity) = capacity {
            if capacity.is_nan() || capacity < 0. {
                return Err(EnzymeError::InvalidCapacity(capacity));
            }
        }

        let mut fluxes = Vec::new();
        let mut constrained = Vec::new();
        let mut unconstrained = 0usize;
        for (index, reaction) in model.reactions().values().enumerate() {
            let Some(isozymes) = reaction.gene_association.as_deref() else {
                continue;
            };
            let mut directions = Vec::with_capacity(2);
            if reaction.upper_bound > 0. {
                directions.push((Direction::Forward, reaction.upper_bound));
            }
            if reaction.lower_bound < 0. {
                directions.push((Direction::Backward, -reaction.lower_bound));
            }
            let has_kcats = isozymes.iter().all(|iso| {
                directions
                    .iter()
                    .all(|(direction, _)| kcat(iso, *direction).is_some_and(|k| k > 0.))
            });
            if !has_kcats || directions.is_empty() {
                unconstrained += 1;
                continue;
            }
            constrained.push(reaction.id.clone());
            for (k, isozyme) in isozymes.iter().enumerate() {
                for (direction, upper_bound) in &directions {
                    fluxes.push(IsozymeFlux {
                        id: format!("{}_isozyme{}_{}", reaction.id, k + 1, direction.suffix()),
                        reaction: index,
                        isozyme: isozyme.clone(),
                        direction: *direction,
                        kcat: kcat(isozyme, *direction).unwrap_or(1.),
                        upper_bound: *upper_bound,
                    });
                }
            }
        }
        if unconstrained > 0 {
            warn!(
                reactions = unconstrained,
                "Reactions with gene associations lack turnover numbers and are not enzyme constrained"
            );
        }

        let gene_products: Vec<String> = model
            .genes()
            .keys()
            .filter(|g| {
                fluxes
                    .iter()
                    .any(|f| f.isozyme.gene_product_stoichiometry.contains_key(*g))
            })
            .cloned()
            .collect();
        debug!(
            constrained = constrained.len(),
            isozyme_fluxes = fluxes.len(),
            gene_products = gene_products.len(),
            "Built enzyme constrained model"
        );
        Ok(EnzymeConstrainedModel {
            model,
            capacity,
            fluxes,
            gene_products,
            constrained,
        })
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn capacity(&self) -> Option<f64> {
        self.capacity
    }

    /// Ids of the reactions limited by enzyme amounts
    pub fn constrained_reactions(&self) -> &[String] {
        &self.constrained
    }

    /// Ids of the genes whose product amounts are variables
    pub fn gene_products(&self) -> &[String] {
        &self.gene_products
    }

    /// Gene product amounts of a solution, keyed by gene id
    pub fn gene_product_amounts(&self, solution: &FluxSolution) -> Option<IndexMap<String, f64>> {
        self.gene_products
            .iter()
            .map(|g| {
                solution
                    .flux(&gene_product_id(g))
                    .map(|amount| (g.clone(), amount))
            })
            .collect()
    }

    /// Gene product masses (amount times molar mass) of a solution, keyed by gene id
    ///
    /// Genes without a molar mass are left out.
    pub fn gene_product_masses(&self, solution: &FluxSolution) -> Option<IndexMap<String, f64>> {
        let amounts = self.gene_product_amounts(solution)?;
        Some(
            amounts
                .into_iter()
                .filter_map(|(g, amount)| {
                    let mass = self.model.gene(&g)?.product_molar_mass?;
                    Some((g, amount * mass))
                })
                .collect(),
        )
    }

    fn n_reactions(&self) -> usize {
        self.model.reactions().len()
    }

    fn gene_product_offset(&self) -> usize {
        self.n_reactions() + self.fluxes.len()
    }
}

/// Id of the amount variable of a gene's product
pub fn gene_product_id(gene: &str) -> String {
    format!("{}{}", GENE_PRODUCT_PREFIX, gene)
}

fn kcat(isozyme: &Isozyme, direction: Direction) -> Option<f64> {
    match direction {
        Direction::Forward => isozyme.kcat_forward,
        Direction::Backward => isozyme.kcat_backward,
    }
}

impl MetabolicModel for EnzymeConstrainedModel {
    /// Reactions of the wrapped model, then isozyme fluxes, then gene product amounts
    fn variables(&self) -> Vec<String> {
        let mut variables = self.model.variables();
        variables.extend(self.fluxes.iter().map(|f| f.id.clone()));
        variables.extend(self.gene_products.iter().map(|g| gene_product_id(g)));
        variables
    }

    fn reactions(&self) -> Vec<String> {
        self.model.variables()
    }

    /// Reactions of the wrapped model, then the gene product amounts, so a knockout also
    /// removes the knocked out gene's product
    fn knockout_targets(&self) -> Vec<String> {
        let mut targets = self.model.variables();
        targets.extend(self.gene_products.iter().map(|g| gene_product_id(g)));
        targets
    }

    fn metabolites(&self) -> Vec<String> {
        MetabolicModel::metabolites(&self.model)
    }

    fn genes(&self) -> Vec<String> {
        MetabolicModel::genes(&self.model)
    }

    fn stoichiometry(&self) -> CscMatrix<f64> {
        let inner = self.model.stoichiometry();
        let mut coo = CooMatrix::new(inner.nrows(), self.n_variables());
        for (row, col, value) in inner.triplet_iter() {
            coo.push(row, col, *value);
        }
        CscMatrix::from(&coo)
    }

    fn bounds(&self) -> (DVector<f64>, DVector<f64>) {
        let (lb, ub) = self.model.bounds();
        let mut lower: Vec<f64> = lb.iter().copied().collect();
        let mut upper: Vec<f64> = ub.iter().copied().collect();
        for flux in &self.fluxes {
            lower.push(0.);
            upper.push(flux.upper_bound);
        }
        for gene in &self.gene_products {
            match self.model.gene(gene) {
                Some(g) => {
                    lower.push(g.product_lower_bound);
                    upper.push(g.product_upper_bound_or_inf());
                }
                None => {
                    lower.push(0.);
                    upper.push(f64::INFINITY);
                }
            }
        }
        (DVector::from_vec(lower), DVector::from_vec(upper))
    }

    fn objective(&self) -> DVector<f64> {
        let mut objective = DVector::zeros(self.n_variables());
        for (i, coef) in self.model.objective().iter().enumerate() {
            objective[i] = *coef;
        }
        objective
    }

    /// Isozyme sum rows, then gene product balance rows, then the capacity row
    fn coupling_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .constrained
            .iter()
            .map(|r| format!("{}{}", r, ISOZYME_SUM_SUFFIX))
            .collect();
        ids.extend(
            self.gene_products
                .iter()
                .map(|g| format!("{}{}", gene_product_id(g), GENE_PRODUCT_BALANCE_SUFFIX)),
        );
        if self.capacity.is_some() {
            ids.push(CAPACITY_CONSTRAINT_ID.to_string());
        }
        ids
    }

    fn coupling(&self) -> CscMatrix<f64> {
        let n_rows = self.constrained.len()
            + self.gene_products.len()
            + usize::from(self.capacity.is_some());
        let mut coo = CooMatrix::new(n_rows, self.n_variables());
        let flux_offset = self.n_reactions();
        let product_offset = self.gene_product_offset();
        let reactions = self.model.reactions();

        // reaction - forward + backward = 0
        for (row, reaction) in self.constrained.iter().enumerate() {
            if let Some(col) = reactions.get_index_of(reaction) {
                coo.push(row, col, 1.);
            }
            for (k, flux) in self.fluxes.iter().enumerate() {
                if reactions
                    .get_index(flux.reaction)
                    .is_some_and(|(id, _)| id == reaction)
                {
                    let sign = match flux.direction {
                        Direction::Forward => -1.,
                        Direction::Backward => 1.,
                    };
                    coo.push(row, flux_offset + k, sign);
                }
            }
        }

        let balance_offset = self.constrained.len();
        for (g, gene) in self.gene_products.iter().enumerate() {
            let row = balance_offset + g;
            for (k, flux) in self.fluxes.iter().enumerate() {
                if let Some(stoich) = flux.isozyme.gene_product_stoichiometry.get(gene) {
                    coo.push(row, flux_offset + k, stoich / flux.kcat);
                }
            }
            coo.push(row, product_offset + g, -1.);
        }

        if self.capacity.is_some() {
            let row = balance_offset + self.gene_products.len();
            for (g, gene) in self.gene_products.iter().enumerate() {
                if let Some(mass) = self.model.gene(gene).and_then(|g| g.product_molar_mass) {
                    coo.push(row, product_offset + g, mass);
                }
            }
        }
        CscMatrix::from(&coo)
    }

    fn coupling_bounds(&self) -> (DVector<f64>, DVector<f64>) {
        let n_equalities = self.constrained.len() + self.gene_products.len();
        let mut lower = vec![0.; n_equalities];
        let mut upper = vec![0.; n_equalities];
        if let Some(capacity) = self.capacity {
            lower.push(f64::NEG_INFINITY);
            upper.push(capacity);
        }
        (DVector::from_vec(lower), DVector::from_vec(upper))
    }

    fn reaction_gene_association(&self, reaction_id: &str) -> Option<Vec<Isozyme>> {
        if let Some(gene) = reaction_id.strip_prefix(GENE_PRODUCT_PREFIX) {
            if self.gene_products.iter().any(|g| g == gene) {
                return Some(vec![Isozyme::new([gene])]);
            }
        }
        self.model.reaction_gene_association(reaction_id)
    }
}

/// Errors from building an [`EnzymeConstrainedModel`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnzymeError {
    #[error("Enzyme capacity must be non-negative, got {0}")]
    InvalidCapacity(f64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fva::flux_variability_analysis;
    use crate::metabolic_model::gene::Gene;
    use crate::metabolic_model::metabolite::Metabolite;
    use crate::metabolic_model::reaction::ReactionBuilder;
    use crate::optimize::modifications::Modification;
    use crate::optimize::problem::Problem;
    use crate::optimize::solvers::clarabel::ClarabelSolver;
    use crate::optimize::OptimizationStatus;

    /// Glucose uptake limited to 10, growth catalyzed by either g1 (kcat 2) or g2 (kcat 4)
    fn model() -> Model {
        let mut model = Model::new_empty();
        model.add_metabolite(Metabolite::new("glc")).unwrap();
        for id in ["g1", "g2", "g3"] {
            let mut gene = Gene::new(id);
            gene.product_molar_mass = Some(0.5);
            model.add_gene(gene).unwrap();
        }
        model
            .add_reaction(
                ReactionBuilder::default()
                    .id("EX_glc")
                    .metabolites(IndexMap::from([("glc".to_string(), -1.)]))
                    .lower_bound(-10.)
                    .upper_bound(0.)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        model
            .add_reaction(
                ReactionBuilder::default()
                    .id("growth")
                    .metabolites(IndexMap::from([("glc".to_string(), -1.)]))
                    .gene_association(vec![
                        Isozyme::new(["g1"]).with_kcats(2., 2.),
                        Isozyme::new(["g2"]).with_kcats(4., 4.),
                    ])
                    .lower_bound(0.)
                    .upper_bound(1000.)
                    .objective_coefficient(1.)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        // No turnover numbers, stays unconstrained
        model
            .add_reaction(
                ReactionBuilder::default()
                    .id("leak")
                    .metabolites(IndexMap::from([("glc".to_string(), -1.)]))
                    .gene_association(vec![Isozyme::new(["g3"])])
                    .lower_bound(0.)
                    .upper_bound(0.)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        model
    }

    fn solve(model: &EnzymeConstrainedModel, modifications: &[Modification]) -> FluxSolution {
        let mut problem = Problem::compile(model).unwrap();
        for modification in modifications {
            modification.apply(model, &mut problem).unwrap();
        }
        FluxSolution::extract(&problem, problem.solve(&ClarabelSolver).unwrap())
    }

    #[test]
    fn layout() {
        let ec = EnzymeConstrainedModel::new(model(), Some(1.)).unwrap();
        assert_eq!(ec.constrained_reactions(), &["growth".to_string()]);
        assert_eq!(
            ec.variables(),
            vec![
                "EX_glc",
                "growth",
                "leak",
                "growth_isozyme1_forward",
                "growth_isozyme2_forward",
                "prot_g1",
                "prot_g2"
            ]
        );
        assert_eq!(
            ec.coupling_ids(),
            vec![
                "growth_isozyme_sum",
                "prot_g1_balance",
                "prot_g2_balance",
                "enzyme_capacity"
            ]
        );
        assert_eq!(ec.reactions(), vec!["EX_glc", "growth", "leak"]);
        assert_eq!(
            ec.knockout_targets(),
            vec!["EX_glc", "growth", "leak", "prot_g1", "prot_g2"]
        );
        let (lower, upper) = ec.coupling_bounds();
        assert_eq!(lower.len(), 4);
        assert_eq!(upper[3], 1.);
        assert_eq!(
            ec.reaction_gene_association("prot_g2").unwrap()[0]
                .genes()
                .collect::<Vec<_>>(),
            vec!["g2"]
        );
        assert!(matches!(
            EnzymeConstrainedModel::new(model(), Some(-1.)),
            Err(EnzymeError::InvalidCapacity(_))
        ));
    }

    #[test]
    fn capacity_limits_growth() {
        let unlimited = EnzymeConstrainedModel::new(model(), None).unwrap();
        let solution = solve(&unlimited, &[]);
        assert_eq!(solution.status, OptimizationStatus::Optimal);
        assert!((solution.objective_value.unwrap() - 10.).abs() < 1e-4);

        // 0.5 * amount <= 1, so at most 2 of g2 product, each carrying 4 flux
        let limited = EnzymeConstrainedModel::new(model(), Some(1.)).unwrap();
        let solution = solve(&limited, &[]);
        assert_eq!(solution.status, OptimizationStatus::Optimal);
        assert!((solution.objective_value.unwrap() - 8.).abs() < 1e-4);
        let amounts = limited.gene_product_amounts(&solution).unwrap();
        assert!((amounts["g2"] - 2.).abs() < 1e-4);
        assert!(amounts["g1"].abs() < 1e-4);
        let masses = limited.gene_product_masses(&solution).unwrap();
        assert!((masses["g2"] - 1.).abs() < 1e-4);
    }

    #[test]
    fn knockout_removes_gene_product() {
        let limited = EnzymeConstrainedModel::new(model(), Some(1.)).unwrap();
        let solution = solve(&limited, &[Modification::Knockout(vec!["g2".to_string()])]);
        assert_eq!(solution.status, OptimizationStatus::Optimal);
        // Only g1 is left, 2 of it carry 4 flux
        assert!((solution.objective_value.unwrap() - 4.).abs() < 1e-4);
        assert!(solution.flux("prot_g2").unwrap().abs() < 1e-6);

        let solution = solve(
            &limited,
            &[Modification::Knockout(vec![
                "g1".to_string(),
                "g2".to_string(),
            ])],
        );
        assert!(solution.objective_value.unwrap().abs() < 1e-4);
    }

    #[test]
    fn variability_reports_reactions_only() {
        let limited = EnzymeConstrainedModel::new(model(), Some(1.)).unwrap();
        let ranges = flux_variability_analysis(&limited, None, &[], 1., &ClarabelSolver).unwrap();
        assert_eq!(
            ranges.keys().collect::<Vec<_>>(),
            vec!["EX_glc", "growth", "leak"]
        );
        let growth = ranges["growth"];
        assert!((growth.minimum.unwrap() - 8.).abs() < 1e-3);
        assert!((growth.maximum.unwrap() - 8.).abs() < 1e-3);
    }
}
