//! This module provides the metabolite struct representing a metabolite

use std::hash::Hash;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::metabolic_model::Annotations;

/// Represents a metabolite
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct Metabolite {
    /// Used to identify the metabolite (must be unique)
    pub id: String,
    /// Human Readable name of the metabolite
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Which compartment the metabolite is in
    #[builder(default = "None")]
    pub compartment: Option<String>,
    /// Electrical charge of the Metabolite
    #[builder(default = "None")]
    pub charge: Option<i32>,
    /// Chemical Formula of the metabolite
    #[builder(default = "None")]
    pub formula: Option<String>,
    /// Notes about the metabolite
    #[builder(default)]
    pub notes: Annotations,
    /// Metabolite annotations
    #[builder(default)]
    pub annotations: Annotations,
}

impl Metabolite {
    /// Create a metabolite with only an id
    pub fn new(id: &str) -> Metabolite {
        Metabolite {
            id: id.to_string(),
            name: None,
            compartment: None,
            charge: None,
            formula: None,
            notes: Annotations::new(),
            annotations: Annotations::new(),
        }
    }
}

impl Hash for Metabolite {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state); // Hash by id
                             // If the metabolite has an associated compartment, also hash by that
        if let Some(ref compartment) = self.compartment {
            compartment.hash(state)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_metabolite() {
        let glucose = MetaboliteBuilder::default()
            .id("glc__D_e")
            .name("D-Glucose".to_string())
            .compartment("e".to_string())
            .formula("C6H12O6".to_string())
            .charge(0)
            .build()
            .unwrap();
        assert_eq!(glucose.id, "glc__D_e");
        assert_eq!(glucose.charge, Some(0));
        assert!(glucose.notes.is_empty());

        // Only the id is required
        let bare = MetaboliteBuilder::default().id("h2o_c").build().unwrap();
        assert_eq!(bare, Metabolite::new("h2o_c"));
        assert!(MetaboliteBuilder::default().build().is_err());
    }
}
