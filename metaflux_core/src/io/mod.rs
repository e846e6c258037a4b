//! Module for reading gene reaction rules into model structures
//!
//! Model file formats (SBML, JSON, MATLAB) are handled outside this crate, converters only
//! need to produce a [`crate::metabolic_model::model::Model`] through its checked methods.
pub mod gpr_parse;
