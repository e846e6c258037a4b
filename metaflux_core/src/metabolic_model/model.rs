//! This module provides the Model struct for representing an entire metabolic model
use std::collections::HashMap;

use indexmap::IndexMap;
use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CscMatrix};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::io::gpr_parse::{parse_gpr, GprParseError};
use crate::metabolic_model::gene::Gene;
use crate::metabolic_model::gpr::Isozyme;
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::reaction::Reaction;
use crate::metabolic_model::MetabolicModel;
use crate::utils::hashing::stoichiometry_signature;

/// Represents a Genome Scale Metabolic Model
///
/// Every reaction only refers to metabolites and genes that are part of the model. All
/// mutating methods check this, and leave the model unchanged when they fail.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Id associated with the Model
    pub id: Option<String>,
    /// Map of metabolite ids to Metabolites
    metabolites: IndexMap<String, Metabolite>,
    /// Map of reaction ids to Reactions
    reactions: IndexMap<String, Reaction>,
    /// Map of gene ids to Genes
    genes: IndexMap<String, Gene>,
}

/// Group of reactions which can't be told apart by their stoichiometry
#[derive(Clone, Debug, PartialEq)]
pub struct DuplicateReactions {
    /// Ids of the reactions, in model order
    pub reactions: Vec<String>,
}

impl Model {
    /// Create a new model with no metabolites, reactions or genes
    pub fn new_empty() -> Self {
        Model::default()
    }

    /// Create a new empty model with an id
    pub fn with_id(id: &str) -> Self {
        Model {
            id: Some(id.to_string()),
            ..Model::default()
        }
    }

    // region Accessors
    /// Map of metabolite ids to metabolites
    pub fn metabolites(&self) -> &IndexMap<String, Metabolite> {
        &self.metabolites
    }

    /// Map of reaction ids to reactions
    pub fn reactions(&self) -> &IndexMap<String, Reaction> {
        &self.reactions
    }

    /// Map of gene ids to genes
    pub fn genes(&self) -> &IndexMap<String, Gene> {
        &self.genes
    }

    pub fn metabolite(&self, id: &str) -> Option<&Metabolite> {
        self.metabolites.get(id)
    }

    pub fn reaction(&self, id: &str) -> Option<&Reaction> {
        self.reactions.get(id)
    }

    pub fn gene(&self, id: &str) -> Option<&Gene> {
        self.genes.get(id)
    }

    /// Ids of the reactions with exactly one metabolite
    pub fn boundary_reactions(&self) -> Vec<String> {
        self.reactions
            .values()
            .filter(|r| r.is_boundary())
            .map(|r| r.id.clone())
            .collect()
    }
    // endregion Accessors

    // region Adding Components
    /// Add a metabolite to the model
    ///
    /// # Examples
    /// ```rust
    /// use metaflux_core::metabolic_model::metabolite::Metabolite;
    /// use metaflux_core::metabolic_model::model::Model;
    /// let mut model = Model::new_empty();
    /// model.add_metabolite(Metabolite::new("glc__D_c")).unwrap();
    /// assert!(model.add_metabolite(Metabolite::new("glc__D_c")).is_err());
    /// ```
    pub fn add_metabolite(&mut self, metabolite: Metabolite) -> Result<(), ModelError> {
        if self.metabolites.contains_key(&metabolite.id) {
            return Err(ModelError::DuplicateMetabolite(metabolite.id));
        }
        self.metabolites.insert(metabolite.id.clone(), metabolite);
        Ok(())
    }

    /// Add several metabolites, either all of them are added or none are
    pub fn add_metabolites<I>(&mut self, metabolites: I) -> Result<(), ModelError>
    where
        I: IntoIterator<Item = Metabolite>,
    {
        let mut updated = self.metabolites.clone();
        for metabolite in metabolites {
            if updated.contains_key(&metabolite.id) {
                return Err(ModelError::DuplicateMetabolite(metabolite.id));
            }
            updated.insert(metabolite.id.clone(), metabolite);
        }
        self.metabolites = updated;
        Ok(())
    }

    /// Add a gene to the model
    ///
    /// # Examples
    /// ```rust
    /// use metaflux_core::metabolic_model::gene::GeneBuilder;
    /// use metaflux_core::metabolic_model::model::Model;
    /// let mut model = Model::new_empty();
    /// let new_gene = GeneBuilder::default().id("new_gene").build().unwrap();
    /// model.add_gene(new_gene).unwrap();
    /// ```
    pub fn add_gene(&mut self, gene: Gene) -> Result<(), ModelError> {
        if self.genes.contains_key(&gene.id) {
            return Err(ModelError::DuplicateGene(gene.id));
        }
        self.genes.insert(gene.id.clone(), gene);
        Ok(())
    }

    /// Add several genes, either all of them are added or none are
    pub fn add_genes<I>(&mut self, genes: I) -> Result<(), ModelError>
    where
        I: IntoIterator<Item = Gene>,
    {
        let mut updated = self.genes.clone();
        for gene in genes {
            if updated.contains_key(&gene.id) {
                return Err(ModelError::DuplicateGene(gene.id));
            }
            updated.insert(gene.id.clone(), gene);
        }
        self.genes = updated;
        Ok(())
    }

    /// Add a reaction to the model
    ///
    /// All metabolites and genes used by the reaction must already be in the model. An empty
    /// isozyme list is stored as no gene association. If another reaction uses the same
    /// metabolites a warning is logged, but the reaction is still added.
    ///
    /// # Examples
    /// ```rust
    /// use metaflux_core::metabolic_model::metabolite::Metabolite;
    /// use metaflux_core::metabolic_model::model::Model;
    /// use metaflux_core::metabolic_model::reaction::ReactionBuilder;
    /// use indexmap::IndexMap;
    /// let mut model = Model::new_empty();
    /// model.add_metabolite(Metabolite::new("a")).unwrap();
    /// let new_reaction = ReactionBuilder::default()
    ///     .id("EX_a")
    ///     .metabolites(IndexMap::from([("a".to_string(), -1.)]))
    ///     .build()
    ///     .unwrap();
    /// model.add_reaction(new_reaction).unwrap();
    /// ```
    pub fn add_reaction(&mut self, mut reaction: Reaction) -> Result<(), ModelError> {
        self.validate_reaction(&reaction, &self.reactions)?;
        warn_if_duplicate(&self.reactions, &reaction);
        normalize_gene_association(&mut reaction);
        self.reactions.insert(reaction.id.clone(), reaction);
        Ok(())
    }

    /// Add several reactions, either all of them are added or none are
    pub fn add_reactions<I>(&mut self, reactions: I) -> Result<(), ModelError>
    where
        I: IntoIterator<Item = Reaction>,
    {
        let mut updated = self.reactions.clone();
        for mut reaction in reactions {
            self.validate_reaction(&reaction, &updated)?;
            warn_if_duplicate(&updated, &reaction);
            normalize_gene_association(&mut reaction);
            updated.insert(reaction.id.clone(), reaction);
        }
        self.reactions = updated;
        Ok(())
    }
    // endregion Adding Components

    // region Removing Components
    /// Remove a reaction, returning it
    pub fn remove_reaction(&mut self, id: &str) -> Result<Reaction, ModelError> {
        self.reactions
            .shift_remove(id)
            .ok_or_else(|| ModelError::ReactionNotFound(id.to_string()))
    }

    /// Remove a metabolite, which must not be used by any reaction
    pub fn remove_metabolite(&mut self, id: &str) -> Result<Metabolite, ModelError> {
        if !self.metabolites.contains_key(id) {
            return Err(ModelError::MetaboliteNotFound(id.to_string()));
        }
        if let Some(rxn) = self
            .reactions
            .values()
            .find(|r| r.metabolites.contains_key(id))
        {
            return Err(ModelError::MetaboliteInUse {
                metabolite: id.to_string(),
                reaction: rxn.id.clone(),
            });
        }
        self.metabolites
            .shift_remove(id)
            .ok_or_else(|| ModelError::MetaboliteNotFound(id.to_string()))
    }

    /// Remove a gene, which must not be part of any gene association
    pub fn remove_gene(&mut self, id: &str) -> Result<Gene, ModelError> {
        if !self.genes.contains_key(id) {
            return Err(ModelError::GeneNotFound(id.to_string()));
        }
        if let Some(rxn) = self.reactions.values().find(|r| r.genes().any(|g| g == id)) {
            return Err(ModelError::GeneInUse {
                gene: id.to_string(),
                reaction: rxn.id.clone(),
            });
        }
        self.genes
            .shift_remove(id)
            .ok_or_else(|| ModelError::GeneNotFound(id.to_string()))
    }
    // endregion Removing Components

    // region Updating Reactions
    /// Change the bounds of a reaction, a None bound is left unchanged
    pub fn change_bounds(
        &mut self,
        id: &str,
        lower_bound: Option<f64>,
        upper_bound: Option<f64>,
    ) -> Result<(), ModelError> {
        let reaction = self
            .reactions
            .get_mut(id)
            .ok_or_else(|| ModelError::ReactionNotFound(id.to_string()))?;
        let lower_bound = lower_bound.unwrap_or(reaction.lower_bound);
        let upper_bound = upper_bound.unwrap_or(reaction.upper_bound);
        check_bounds(id, lower_bound, upper_bound)?;
        reaction.lower_bound = lower_bound;
        reaction.upper_bound = upper_bound;
        Ok(())
    }

    /// Replace the objective, every reaction not in `weights` gets a coefficient of 0
    pub fn change_objective(&mut self, weights: &IndexMap<String, f64>) -> Result<(), ModelError> {
        if let Some(missing) = weights.keys().find(|id| !self.reactions.contains_key(*id)) {
            return Err(ModelError::ReactionNotFound(missing.clone()));
        }
        for (id, reaction) in self.reactions.iter_mut() {
            reaction.objective_coefficient = weights.get(id).copied().unwrap_or(0.);
        }
        Ok(())
    }

    /// Replace the gene association of a reaction, all genes must be in the model
    pub fn set_gene_association(
        &mut self,
        id: &str,
        gene_association: Option<Vec<Isozyme>>,
    ) -> Result<(), ModelError> {
        if !self.reactions.contains_key(id) {
            return Err(ModelError::ReactionNotFound(id.to_string()));
        }
        if let Some(missing) = gene_association
            .iter()
            .flatten()
            .flat_map(|iso| iso.genes())
            .find(|g| !self.genes.contains_key(*g))
        {
            return Err(ModelError::MissingGene {
                reaction: id.to_string(),
                gene: missing.to_string(),
            });
        }
        if let Some(reaction) = self.reactions.get_mut(id) {
            reaction.gene_association = gene_association;
            normalize_gene_association(reaction);
        }
        Ok(())
    }

    /// Parse a gene reaction rule string and use it as the gene association of a reaction
    ///
    /// Genes in the rule which aren't in the model yet are added.
    ///
    /// # Examples
    /// ```rust
    /// use metaflux_core::metabolic_model::model::Model;
    /// use metaflux_core::metabolic_model::reaction::ReactionBuilder;
    /// let mut model = Model::new_empty();
    /// model.add_reaction(ReactionBuilder::default().id("r1").build().unwrap()).unwrap();
    /// model.set_gene_reaction_rule("r1", "(b0001 and b0002) or b0003").unwrap();
    /// assert_eq!(model.genes().len(), 3);
    /// assert_eq!(model.reaction("r1").unwrap().gene_association.as_ref().unwrap().len(), 2);
    /// ```
    pub fn set_gene_reaction_rule(&mut self, id: &str, rule: &str) -> Result<(), ModelError> {
        if !self.reactions.contains_key(id) {
            return Err(ModelError::ReactionNotFound(id.to_string()));
        }
        let mut genes = self.genes.clone();
        let association = if rule.trim().is_empty() {
            None
        } else {
            Some(parse_gpr(rule, &mut genes)?.to_isozymes())
        };
        self.genes = genes;
        self.set_gene_association(id, association)
    }
    // endregion Updating Reactions

    // region Duplicate Detection
    /// Find a reaction other than `reaction` (compared by id) with the same stoichiometry
    ///
    /// With `only_metabolites` only the metabolite ids are compared, otherwise the
    /// stoichiometric coefficients have to match as well. Bounds are never compared.
    pub fn find_duplicate_reaction(
        &self,
        reaction: &Reaction,
        only_metabolites: bool,
    ) -> Option<&str> {
        find_duplicate(&self.reactions, reaction, only_metabolites)
    }

    /// Report every group of reactions sharing the same stoichiometry
    ///
    /// This is only advisory, models can legitimately hold such reactions (for example
    /// transporters using different mechanisms).
    pub fn duplicate_reactions(&self, only_metabolites: bool) -> Vec<DuplicateReactions> {
        let mut buckets: IndexMap<String, Vec<&Reaction>> = IndexMap::new();
        for reaction in self.reactions.values() {
            buckets
                .entry(stoichiometry_signature(&reaction.metabolites, only_metabolites))
                .or_default()
                .push(reaction);
        }
        let mut duplicates = Vec::new();
        for bucket in buckets.values().filter(|b| b.len() > 1) {
            // Signatures are hashes, so confirm the matches
            let mut grouped: HashMap<usize, Vec<String>> = HashMap::new();
            let mut order: Vec<usize> = Vec::new();
            for (i, reaction) in bucket.iter().enumerate() {
                let leader = (0..i)
                    .find(|&j| same_stoichiometry(bucket[j], reaction, only_metabolites))
                    .unwrap_or(i);
                if leader == i {
                    order.push(i);
                }
                grouped
                    .entry(leader)
                    .or_default()
                    .push(reaction.id.clone());
            }
            for leader in order {
                if let Some(reactions) = grouped.remove(&leader) {
                    if reactions.len() > 1 {
                        duplicates.push(DuplicateReactions { reactions });
                    }
                }
            }
        }
        duplicates
    }
    // endregion Duplicate Detection

    // region Validation Functions
    fn validate_reaction(
        &self,
        reaction: &Reaction,
        existing: &IndexMap<String, Reaction>,
    ) -> Result<(), ModelError> {
        if existing.contains_key(&reaction.id) {
            return Err(ModelError::DuplicateReaction(reaction.id.clone()));
        }
        check_bounds(&reaction.id, reaction.lower_bound, reaction.upper_bound)?;
        if let Some(missing) = reaction
            .metabolites
            .keys()
            .find(|m| !self.metabolites.contains_key(*m))
        {
            return Err(ModelError::MissingMetabolite {
                reaction: reaction.id.clone(),
                metabolite: missing.clone(),
            });
        }
        if let Some(missing) = reaction.genes().find(|g| !self.genes.contains_key(*g)) {
            return Err(ModelError::MissingGene {
                reaction: reaction.id.clone(),
                gene: missing.to_string(),
            });
        }
        Ok(())
    }
    // endregion Validation Functions
}

fn check_bounds(id: &str, lower_bound: f64, upper_bound: f64) -> Result<(), ModelError> {
    if lower_bound.is_nan() || upper_bound.is_nan() || lower_bound > upper_bound {
        return Err(ModelError::InvalidBounds {
            reaction: id.to_string(),
            lower_bound,
            upper_bound,
        });
    }
    Ok(())
}

fn find_duplicate<'a>(
    reactions: &'a IndexMap<String, Reaction>,
    reaction: &Reaction,
    only_metabolites: bool,
) -> Option<&'a str> {
    reactions
        .values()
        .find(|other| {
            other.id != reaction.id && same_stoichiometry(reaction, other, only_metabolites)
        })
        .map(|other| other.id.as_str())
}

/// Log when `reaction` uses the same metabolites as one of `reactions`, returning its id
fn warn_if_duplicate<'a>(
    reactions: &'a IndexMap<String, Reaction>,
    reaction: &Reaction,
) -> Option<&'a str> {
    let duplicate = find_duplicate(reactions, reaction, true)?;
    warn!(
        reaction = %reaction.id,
        duplicate = %duplicate,
        "Added reaction uses the same metabolites as an existing reaction"
    );
    Some(duplicate)
}

fn normalize_gene_association(reaction: &mut Reaction) {
    if reaction
        .gene_association
        .as_ref()
        .is_some_and(|isozymes| isozymes.is_empty())
    {
        reaction.gene_association = None;
    }
}

fn same_stoichiometry(a: &Reaction, b: &Reaction, only_metabolites: bool) -> bool {
    a.metabolites.len() == b.metabolites.len()
        && a.metabolites.iter().all(|(met, coef)| match b.metabolites.get(met) {
            Some(other) => only_metabolites || coef == other,
            None => false,
        })
}

impl MetabolicModel for Model {
    fn variables(&self) -> Vec<String> {
        self.reactions.keys().cloned().collect()
    }

    fn n_variables(&self) -> usize {
        self.reactions.len()
    }

    fn metabolites(&self) -> Vec<String> {
        self.metabolites.keys().cloned().collect()
    }

    fn n_metabolites(&self) -> usize {
        self.metabolites.len()
    }

    fn genes(&self) -> Vec<String> {
        self.genes.keys().cloned().collect()
    }

    fn stoichiometry(&self) -> CscMatrix<f64> {
        let mut coo = CooMatrix::new(self.metabolites.len(), self.reactions.len());
        for (col, reaction) in self.reactions.values().enumerate() {
            for (met, coef) in &reaction.metabolites {
                if let Some(row) = self.metabolites.get_index_of(met) {
                    coo.push(row, col, *coef);
                }
            }
        }
        CscMatrix::from(&coo)
    }

    fn bounds(&self) -> (DVector<f64>, DVector<f64>) {
        (
            DVector::from_iterator(
                self.reactions.len(),
                self.reactions.values().map(|r| r.lower_bound),
            ),
            DVector::from_iterator(
                self.reactions.len(),
                self.reactions.values().map(|r| r.upper_bound),
            ),
        )
    }

    fn objective(&self) -> DVector<f64> {
        DVector::from_iterator(
            self.reactions.len(),
            self.reactions.values().map(|r| r.objective_coefficient),
        )
    }

    fn reaction_gene_association(&self, reaction_id: &str) -> Option<Vec<Isozyme>> {
        self.reactions
            .get(reaction_id)
            .and_then(|r| r.gene_association.clone())
    }
}

/// Errors from building or editing a [`Model`]
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("A metabolite with id {0} is already in the model")]
    DuplicateMetabolite(String),
    #[error("A reaction with id {0} is already in the model")]
    DuplicateReaction(String),
    #[error("A gene with id {0} is already in the model")]
    DuplicateGene(String),
    #[error("Reaction {reaction} uses metabolite {metabolite} which is not in the model")]
    MissingMetabolite { reaction: String, metabolite: String },
    #[error("Reaction {reaction} depends on gene {gene} which is not in the model")]
    MissingGene { reaction: String, gene: String },
    #[error("No reaction with id {0} in the model")]
    ReactionNotFound(String),
    #[error("No metabolite with id {0} in the model")]
    MetaboliteNotFound(String),
    #[error("No gene with id {0} in the model")]
    GeneNotFound(String),
    #[error("Metabolite {metabolite} is still used by reaction {reaction}")]
    MetaboliteInUse { metabolite: String, reaction: String },
    #[error("Gene {gene} is still used by reaction {reaction}")]
    GeneInUse { gene: String, reaction: String },
    #[error("Invalid bounds for reaction {reaction}: lower_bound ({lower_bound}) > upper_bound ({upper_bound})")]
    InvalidBounds {
        reaction: String,
        lower_bound: f64,
        upper_bound: f64,
    },
    #[error("Unable to parse gene reaction rule")]
    GprParseError(#[from] GprParseError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::reaction::ReactionBuilder;

    fn setup_model() -> Model {
        let mut model = Model::with_id("toy");
        model
            .add_metabolites([Metabolite::new("A"), Metabolite::new("B")])
            .unwrap();
        model
            .add_genes([Gene::new("g1"), Gene::new("g2")])
            .unwrap();
        model
            .add_reaction(
                ReactionBuilder::default()
                    .id("v1")
                    .metabolites(IndexMap::from([("A".to_string(), -1.), ("B".to_string(), 1.)]))
                    .gene_association(vec![Isozyme::new(["g1"])])
                    .build()
                    .unwrap(),
            )
            .unwrap();
        model
            .add_reaction(
                ReactionBuilder::default()
                    .id("EX_A")
                    .metabolites(IndexMap::from([("A".to_string(), 1.)]))
                    .lower_bound(0.)
                    .upper_bound(10.)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        model
    }

    #[test]
    fn referential_integrity() {
        let mut model = setup_model();
        let before = model.clone();

        // Unknown metabolite
        let rxn = ReactionBuilder::default()
            .id("v2")
            .metabolites(IndexMap::from([("C".to_string(), 1.)]))
            .build()
            .unwrap();
        match model.add_reaction(rxn) {
            Err(ModelError::MissingMetabolite { metabolite, .. }) => assert_eq!(metabolite, "C"),
            _ => panic!("Missing metabolite not caught"),
        }

        // Unknown gene
        let rxn = ReactionBuilder::default()
            .id("v2")
            .gene_association(vec![Isozyme::new(["g9"])])
            .build()
            .unwrap();
        match model.add_reaction(rxn) {
            Err(ModelError::MissingGene { gene, .. }) => assert_eq!(gene, "g9"),
            _ => panic!("Missing gene not caught"),
        }

        // Duplicate id
        let rxn = ReactionBuilder::default().id("v1").build().unwrap();
        assert!(matches!(
            model.add_reaction(rxn),
            Err(ModelError::DuplicateReaction(_))
        ));

        // Batch insert fails as a whole
        let good = ReactionBuilder::default().id("v3").build().unwrap();
        let bad = ReactionBuilder::default()
            .id("v4")
            .metabolites(IndexMap::from([("Z".to_string(), 1.)]))
            .build()
            .unwrap();
        assert!(model.add_reactions([good, bad]).is_err());

        // Removing things still in use
        assert!(matches!(
            model.remove_metabolite("A"),
            Err(ModelError::MetaboliteInUse { .. })
        ));
        assert!(matches!(
            model.remove_gene("g1"),
            Err(ModelError::GeneInUse { .. })
        ));
        assert_eq!(model, before);

        // Unused gene can go
        model.remove_gene("g2").unwrap();
        assert!(model.gene("g2").is_none());
    }

    #[test]
    fn change_bounds() {
        let mut model = setup_model();
        model.change_bounds("v1", Some(0.), None).unwrap();
        let rxn = model.reaction("v1").unwrap();
        assert!((rxn.lower_bound - 0.).abs() < 1e-25);
        assert!((rxn.upper_bound - 1000.).abs() < 1e-25);
        match model.change_bounds("v1", Some(2000.), None) {
            Err(ModelError::InvalidBounds { .. }) => {}
            _ => panic!("Invalid bounds not caught"),
        }
        assert!((model.reaction("v1").unwrap().lower_bound - 0.).abs() < 1e-25);
        assert!(model.change_bounds("nope", None, None).is_err());
    }

    #[test]
    fn objective_and_matrix() {
        let mut model = setup_model();
        model
            .change_objective(&IndexMap::from([("EX_A".to_string(), 1.)]))
            .unwrap();
        assert_eq!(model.objective().as_slice(), &[0., 1.]);
        assert!(model
            .change_objective(&IndexMap::from([("missing".to_string(), 1.)]))
            .is_err());

        let s = model.stoichiometry();
        assert_eq!(s.nrows(), 2);
        assert_eq!(s.ncols(), 2);
        let mut entries: Vec<(usize, usize, f64)> =
            s.triplet_iter().map(|(i, j, v)| (i, j, *v)).collect();
        entries.sort_by(|a, b| (a.1, a.0).cmp(&(b.1, b.0)));
        assert_eq!(entries, vec![(0, 0, -1.), (1, 0, 1.), (0, 1, 1.)]);

        let (lb, ub) = model.bounds();
        assert_eq!(lb.as_slice(), &[-1000., 0.]);
        assert_eq!(ub.as_slice(), &[1000., 10.]);
        assert_eq!(model.boundary_reactions(), vec!["EX_A".to_string()]);
    }

    #[test]
    fn gene_reaction_rule() {
        let mut model = setup_model();
        model.set_gene_reaction_rule("v1", "g1 and g3").unwrap();
        assert!(model.gene("g3").is_some());
        let association = model.reaction_gene_association("v1").unwrap();
        assert_eq!(association.len(), 1);
        assert_eq!(association[0].genes().collect::<Vec<_>>(), vec!["g1", "g3"]);

        // A bad rule leaves the genes untouched
        assert!(model.set_gene_reaction_rule("v1", "g1 and (g4").is_err());
        assert!(model.gene("g4").is_none());

        // Empty rules and empty isozyme lists both mean no association
        model.set_gene_reaction_rule("v1", "").unwrap();
        assert!(model.reaction_gene_association("v1").is_none());
        model.set_gene_association("v1", Some(vec![])).unwrap();
        assert!(model.reaction("v1").unwrap().gene_association.is_none());
    }

    #[test]
    fn duplicates() {
        let mut model = setup_model();
        let same_metabolites = ReactionBuilder::default()
            .id("v1_alt")
            .metabolites(IndexMap::from([("B".to_string(), 2.), ("A".to_string(), -1.)]))
            .build()
            .unwrap();
        let exact = ReactionBuilder::default()
            .id("v1_copy")
            .metabolites(IndexMap::from([("B".to_string(), 1.), ("A".to_string(), -1.)]))
            .lower_bound(0.)
            .build()
            .unwrap();
        model.add_reactions([same_metabolites, exact]).unwrap();

        let v1 = model.reaction("v1").unwrap().clone();
        assert_eq!(model.find_duplicate_reaction(&v1, true), Some("v1_alt"));
        assert_eq!(model.find_duplicate_reaction(&v1, false), Some("v1_copy"));

        let loose = model.duplicate_reactions(true);
        assert_eq!(loose.len(), 1);
        assert_eq!(loose[0].reactions, vec!["v1", "v1_alt", "v1_copy"]);

        let strict = model.duplicate_reactions(false);
        assert_eq!(strict.len(), 1);
        assert_eq!(strict[0].reactions, vec!["v1", "v1_copy"]);
    }

    #[test]
    fn batch_duplicates_are_reported() {
        let first = ReactionBuilder::default()
            .id("t1")
            .metabolites(IndexMap::from([("A".to_string(), -1.)]))
            .build()
            .unwrap();
        let second = ReactionBuilder::default()
            .id("t2")
            .metabolites(IndexMap::from([("A".to_string(), 3.)]))
            .build()
            .unwrap();
        // add_reactions checks each reaction against the ones already in the batch
        let mut batch = IndexMap::new();
        assert_eq!(warn_if_duplicate(&batch, &first), None);
        batch.insert(first.id.clone(), first);
        assert_eq!(warn_if_duplicate(&batch, &second), Some("t1"));

        let mut model = setup_model();
        model
            .add_reactions(batch.into_values().chain(std::iter::once(second)))
            .unwrap();
        assert!(model
            .duplicate_reactions(true)
            .iter()
            .any(|d| d.reactions.contains(&"t1".to_string()) && d.reactions.contains(&"t2".to_string())));
    }
}
