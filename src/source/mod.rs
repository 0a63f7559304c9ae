//! Source records: the three inputs a crosswalk merges.
//!
//! - [`profile`]: the ORCID profile (primary)
//! - [`citation`]: the BibTeX citation embedded in a profile work (secondary)
//! - [`crossref`]: the Crossref record for a work's DOI (tertiary)
//!
//! All three are parsed into strongly-typed, read-only structs whose every
//! nested field is optional; `null` and a missing key deserialize the same way.

pub mod citation;
pub mod crossref;
pub mod profile;

use serde::{Deserialize, Deserializer};

pub use citation::{BibtexParser, CitationParser, CitationRecord};
pub use crossref::CrossrefWork;
pub use profile::OrcidProfile;

/// Deserialize a list that may be `null` or missing as an empty list.
pub(crate) fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a scalar that may arrive as a JSON string or number.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// `Some(trimmed)` unless the string is empty or whitespace.
pub fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
