//! This module provides the Gene struct, representing a gene and the protein it codes for
use std::fmt::{Display, Formatter};
use std::hash::Hash;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::metabolic_model::Annotations;

/// Structure Representing a Gene
#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct Gene {
    /// Used to identify the gene
    pub id: String,
    /// Human Readable Gene Name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Molar mass of the gene product, used by enzyme constrained models
    #[builder(default = "None")]
    pub product_molar_mass: Option<f64>,
    /// Lowest allowed amount of the gene product
    #[builder(default = "0.")]
    pub product_lower_bound: f64,
    /// Highest allowed amount of the gene product, None means unbounded
    #[builder(default = "None")]
    pub product_upper_bound: Option<f64>,
    /// Notes about the gene
    #[builder(default)]
    pub notes: Annotations,
    /// Gene Annotations
    #[builder(default)]
    pub annotations: Annotations,
}

impl Gene {
    /// Create a gene with only an id
    pub fn new(id: &str) -> Gene {
        Gene {
            id: id.to_string(),
            name: None,
            product_molar_mass: None,
            product_lower_bound: 0.,
            product_upper_bound: None,
            notes: Annotations::new(),
            annotations: Annotations::new(),
        }
    }

    /// Upper bound of the gene product amount, with infinity for unbounded products
    pub fn product_upper_bound_or_inf(&self) -> f64 {
        self.product_upper_bound.unwrap_or(f64::INFINITY)
    }
}

impl Display for Gene {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl Hash for Gene {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
