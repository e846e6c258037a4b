//! Global defaults used when building models and running analyses
use std::fs;
use std::path::Path;
use std::sync::{LazyLock, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

/// Defaults shared by the whole crate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Lower bound given to reactions built without an explicit one
    pub lower_bound: f64,
    /// Upper bound given to reactions built without an explicit one
    pub upper_bound: f64,
    /// Absolute slack allowed when an analysis holds an objective at its optimum
    pub tolerance: f64,
    /// Allowed deviation of community abundances from a sum of 1
    pub abundance_tolerance: f64,
    /// Solver used by [`crate::optimize::solvers::default_solver`]
    pub solver: Solver,
    /// Number of worker threads for analyses which solve many independent problems
    pub processes: usize,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            lower_bound: -1000.,
            upper_bound: 1000.,
            tolerance: 1e-07,
            abundance_tolerance: 1e-06,
            solver: Solver::Clarabel,
            processes: 1,
        }
    }
}

impl Configuration {
    /// Read a configuration from a JSON string, missing keys keep their default values
    ///
    /// # Examples
    /// ```rust
    /// use metaflux_core::configuration::Configuration;
    /// let config = Configuration::from_json_str(r#"{"processes": 4}"#).unwrap();
    /// assert_eq!(config.processes, 4);
    /// assert_eq!(config.upper_bound, 1000.);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Configuration, ConfigurationError> {
        let config: Configuration = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Configuration, ConfigurationError> {
        let json = fs::read_to_string(path)?;
        Configuration::from_json_str(&json)
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        if self.lower_bound > self.upper_bound {
            return Err(ConfigurationError::InvalidDefaultBounds {
                lower_bound: self.lower_bound,
                upper_bound: self.upper_bound,
            });
        }
        if self.tolerance < 0. || self.abundance_tolerance < 0. {
            return Err(ConfigurationError::NegativeTolerance);
        }
        if self.processes == 0 {
            return Err(ConfigurationError::NoProcesses);
        }
        Ok(())
    }
}

/// Enum used to specify the default solver to use
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Solver {
    /// Use the Clarabel interior point solver
    Clarabel,
    /// Use the HiGHS solver, requires the highs feature to be enabled
    Highs,
    /// Use the microlp simplex solver, requires the minilp feature to be enabled
    Microlp,
}

/// Snapshot of the current global configuration
pub fn current() -> Configuration {
    CONFIGURATION
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replace the global configuration
pub fn set_configuration(configuration: Configuration) -> Result<(), ConfigurationError> {
    configuration.validate()?;
    *CONFIGURATION.write().unwrap_or_else(PoisonError::into_inner) = configuration;
    Ok(())
}

pub(crate) fn default_lower_bound() -> f64 {
    CONFIGURATION
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .lower_bound
}

pub(crate) fn default_upper_bound() -> f64 {
    CONFIGURATION
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .upper_bound
}

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Unable to read configuration file")]
    UnableToRead(#[from] std::io::Error),
    #[error("Unable to parse configuration json")]
    UnableToParse(#[from] serde_json::Error),
    #[error("Default bounds are invalid, lower_bound ({lower_bound}) > upper_bound ({upper_bound})")]
    InvalidDefaultBounds { lower_bound: f64, upper_bound: f64 },
    #[error("Tolerances must be non-negative")]
    NegativeTolerance,
    #[error("At least one process is required")]
    NoProcesses,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json() {
        let config = Configuration::from_json_str(r#"{"solver": "clarabel", "tolerance": 1e-9}"#)
            .unwrap();
        assert_eq!(config.solver, Solver::Clarabel);
        assert!((config.tolerance - 1e-9).abs() < 1e-25);
        assert!((config.lower_bound + 1000.).abs() < 1e-25);
        assert_eq!(config.processes, 1);
    }

    #[test]
    fn invalid_json() {
        match Configuration::from_json_str(r#"{"lower_bound": 10, "upper_bound": 5}"#) {
            Err(ConfigurationError::InvalidDefaultBounds { .. }) => {}
            _ => panic!("Invalid default bounds not caught"),
        }
        match Configuration::from_json_str(r#"{"processes": 0}"#) {
            Err(ConfigurationError::NoProcesses) => {}
            _ => panic!("Zero processes not caught"),
        }
        match Configuration::from_json_str("not json") {
            Err(ConfigurationError::UnableToParse(_)) => {}
            _ => panic!("Bad json not caught"),
        }
    }
}
