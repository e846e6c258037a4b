//! Core of metaflux, a crate for constraint based metabolic modeling.
//!
//! Models (plain [`metabolic_model::model::Model`]s, community models and enzyme
//! constrained models) are compiled into an [`optimize::problem::Problem`], changed by a
//! list of [`optimize::modifications::Modification`]s, and solved by an
//! [`optimize::solvers::Solver`]. The [`analysis`] module bundles the common analyses.

pub mod analysis;
pub mod community;
pub mod configuration;
pub mod enzymes;
pub mod io;
pub mod metabolic_model;
pub mod optimize;
mod utils;
