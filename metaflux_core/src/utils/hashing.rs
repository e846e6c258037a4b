//! Utility functions for getting hashes
use std::hash::{DefaultHasher, Hash, Hasher};

pub(crate) fn calculate_hash<T: Hash>(t: &T) -> u64 {
    let mut s = DefaultHasher::new();
    t.hash(&mut s);
    s.finish()
}

pub(crate) fn hash_as_hex_string<T: Hash>(t: &T) -> String {
    format!("{:x}", calculate_hash(t))
}

/// Order independent signature of a stoichiometry map
///
/// With `only_metabolites` the coefficients are ignored, so reactions using the same
/// metabolites share a signature. Coefficients are compared by their bit pattern.
pub(crate) fn stoichiometry_signature<'a, I>(metabolites: I, only_metabolites: bool) -> String
where
    I: IntoIterator<Item = (&'a String, &'a f64)>,
{
    let mut entries: Vec<(&str, u64)> = metabolites
        .into_iter()
        .map(|(id, coef)| {
            let bits = if only_metabolites { 0 } else { normalize_zero(*coef).to_bits() };
            (id.as_str(), bits)
        })
        .collect();
    entries.sort_unstable();
    hash_as_hex_string(&entries)
}

fn normalize_zero(value: f64) -> f64 {
    if value == 0. {
        0.
    } else {
        value
    }
}
