//! This module provides a struct for representing reactions
use derive_builder::Builder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::metabolic_model::gpr::{Gpr, Isozyme};
use crate::metabolic_model::Annotations;

/// Represents a reaction in the metabolic model
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct Reaction {
    /// Used to identify the reaction
    pub id: String,
    /// Metabolite stoichiometry of the reaction, negative coefficients are consumed
    #[builder(default = "IndexMap::new()")]
    pub metabolites: IndexMap<String, f64>,
    /// Human-readable reaction name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Isozymes able to catalyze the reaction, None if the reaction doesn't depend on genes
    #[builder(default = "None")]
    pub gene_association: Option<Vec<Isozyme>>,
    /// Lower flux bound
    #[builder(default = "crate::configuration::default_lower_bound()")]
    pub lower_bound: f64,
    /// Upper flux bound
    #[builder(default = "crate::configuration::default_upper_bound()")]
    pub upper_bound: f64,
    /// Coefficient of the reaction in the model objective
    #[builder(default = "0.")]
    pub objective_coefficient: f64,
    /// Reaction subsystem
    #[builder(default = "None")]
    pub subsystem: Option<String>,
    /// Notes about the reaction
    #[builder(default)]
    pub notes: Annotations,
    /// Reaction Annotations
    #[builder(default)]
    pub annotations: Annotations,
}

impl ReactionBuilder {
    fn validate(&self) -> Result<(), String> {
        // Unset bounds are checked against the defaults they will be built with
        let lower_bound = self
            .lower_bound
            .unwrap_or_else(crate::configuration::default_lower_bound);
        let upper_bound = self
            .upper_bound
            .unwrap_or_else(crate::configuration::default_upper_bound);
        if lower_bound.is_nan() || upper_bound.is_nan() {
            return Err("Reaction bounds can't be NaN".to_string());
        }
        if lower_bound > upper_bound {
            return Err(format!(
                "Reaction lower bound ({}) is greater than its upper bound ({})",
                lower_bound, upper_bound
            ));
        }
        Ok(())
    }
}

impl Reaction {
    /// Whether the bounds allow flux in the backward direction
    pub fn is_reversible(&self) -> bool {
        self.lower_bound < 0. && self.upper_bound > 0.
    }

    /// Gene protein reaction rule built from the gene association
    pub fn gpr(&self) -> Option<Gpr> {
        self.gene_association
            .as_deref()
            .and_then(Gpr::from_isozymes)
    }

    /// Ids of every gene mentioned in the gene association
    pub fn genes(&self) -> impl Iterator<Item = &str> {
        self.gene_association
            .iter()
            .flatten()
            .flat_map(|iso| iso.genes())
    }

    /// Whether the reaction only has one metabolite, i.e. it crosses the model boundary
    pub fn is_boundary(&self) -> bool {
        self.metabolites.len() == 1
    }
}
