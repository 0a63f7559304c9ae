//! Rich diagnostic error types for orcid-vivo.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so operators know which collaborator
//! failed and what to check.
//!
//! Missing data is never an error: absent fields resolve to `None` or
//! [`Resolved::Absent`](crate::resolve::Resolved) and the affected facts are
//! simply not emitted.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for orcid-vivo.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum VivoError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Citation(#[from] CitationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Load(#[from] LoadError),
}

pub type VivoResult<T> = std::result::Result<T, VivoError>;

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(vivo::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(vivo::config::parse),
        help("Check the TOML syntax. Unknown keys are ignored, wrong value types are not.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(vivo::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid namespace \"{namespace}\"")]
    #[diagnostic(
        code(vivo::config::namespace),
        help(
            "The namespace is the base for every minted identifier and must be an \
             absolute IRI ending in '/' or '#', e.g. http://vivo.example.edu/individual/"
        )
    )]
    InvalidNamespace { namespace: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("invalid IRI \"{iri}\": {message}")]
    #[diagnostic(
        code(vivo::graph::invalid_iri),
        help(
            "A fact carries an IRI that is not valid RDF. This usually comes from a \
             malformed URL in the source profile; check the configured namespace too."
        )
    )]
    InvalidIri { iri: String, message: String },
}

pub type GraphResult<T> = std::result::Result<T, GraphError>;

// ---------------------------------------------------------------------------
// Citation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum CitationError {
    #[error("no BibTeX entry found in citation")]
    #[diagnostic(
        code(vivo::citation::no_entry),
        help("The citation text must contain an entry of the form @type{key, field = {value}, ...}.")
    )]
    NoEntry,

    #[error("unbalanced braces in citation at byte {offset}")]
    #[diagnostic(
        code(vivo::citation::unbalanced),
        help("The citation is truncated or has a stray brace. The work is crosswalked without it.")
    )]
    Unbalanced { offset: usize },
}

pub type CitationResult<T> = std::result::Result<T, CitationError>;

// ---------------------------------------------------------------------------
// Fetch errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum FetchError {
    #[error("transport error fetching {url}: {message}")]
    #[diagnostic(
        code(vivo::fetch::transport),
        help("The remote service could not be reached. Check network access and the configured base URL.")
    )]
    Transport { url: String, message: String },

    #[error("HTTP {code} from {url}")]
    #[diagnostic(
        code(vivo::fetch::status),
        help(
            "The remote service rejected the request. A 404 from the profile service \
             means the ORCID iD does not exist; 5xx responses are usually transient."
        )
    )]
    Status { url: String, code: u16 },

    #[error("failed to decode response from {url}: {message}")]
    #[diagnostic(
        code(vivo::fetch::decode),
        help("The response body was not the expected JSON document.")
    )]
    Decode { url: String, message: String },

    #[error("invalid ORCID iD \"{value}\"")]
    #[diagnostic(
        code(vivo::fetch::invalid_orcid),
        help("An ORCID iD has the form 0000-0002-1825-0097, optionally prefixed by http://orcid.org/.")
    )]
    InvalidOrcid { value: String },

    #[error("invalid service URL \"{url}\": {message}")]
    #[diagnostic(
        code(vivo::fetch::invalid_url),
        help("The configured base URL must be an absolute http(s) URL, e.g. https://api.crossref.org/works")
    )]
    InvalidUrl { url: String, message: String },
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("I/O error: {source}")]
    #[diagnostic(
        code(vivo::store::io),
        help(
            "A filesystem operation failed. Check that the data directory exists, \
             has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("redb transaction error: {message}")]
    #[diagnostic(
        code(vivo::store::redb),
        help(
            "The embedded database encountered a transaction error. \
             Another process may hold the database lock; otherwise try a fresh data directory."
        )
    )]
    Redb { message: String },

    #[error("serialization error: {message}")]
    #[diagnostic(
        code(vivo::store::serde),
        help(
            "Failed to serialize or deserialize a stored record. \
             The stored format may have changed between versions."
        )
    )]
    Serialization { message: String },

    #[error("triple store at {endpoint} failed: {message}")]
    #[diagnostic(
        code(vivo::store::remote),
        help(
            "The SPARQL Update endpoint rejected or did not answer the request. \
             Check the endpoint URL, username and password."
        )
    )]
    Remote { endpoint: String, message: String },

    #[error("local triple store error: {message}")]
    #[diagnostic(
        code(vivo::store::oxigraph),
        help("The in-process RDF store failed to apply a change.")
    )]
    Local { message: String },

    #[error("subject not found: {key}")]
    #[diagnostic(
        code(vivo::store::not_found),
        help("Register the subject first with `orcid-vivo add <ORCID>`.")
    )]
    NotFound { key: String },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Sync errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SyncError {
    #[error("failed to load baseline for {key}")]
    #[diagnostic(
        code(vivo::sync::baseline_load),
        help("The stored snapshot could not be read. Nothing was sent to the triple store.")
    )]
    LoadBaseline {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to delete {count} facts for {key}")]
    #[diagnostic(
        code(vivo::sync::delete),
        help("The baseline was not advanced; the next run recomputes and retries the same change.")
    )]
    Delete {
        key: String,
        count: usize,
        #[source]
        source: StoreError,
    },

    #[error("failed to insert {count} facts for {key} after deleting stale facts")]
    #[diagnostic(
        code(vivo::sync::insert),
        help(
            "Stale facts were removed but new facts were not added. The baseline was \
             not advanced, so the next run re-sends the additions."
        )
    )]
    Insert {
        key: String,
        count: usize,
        #[source]
        source: StoreError,
    },

    #[error("failed to save baseline for {key}")]
    #[diagnostic(
        code(vivo::sync::baseline_save),
        help(
            "The triple store is up to date but the snapshot was not written. \
             The next run re-sends the same delta, which the store applies idempotently."
        )
    )]
    SaveBaseline {
        key: String,
        #[source]
        source: StoreError,
    },
}

pub type SyncResult<T> = std::result::Result<T, SyncError>;

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("failed to fetch profile for {orcid}")]
    #[diagnostic(code(vivo::load::fetch))]
    Fetch {
        orcid: String,
        #[source]
        #[diagnostic_source]
        source: FetchError,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_converts_to_vivo_error() {
        let err = StoreError::Redb {
            message: "locked".into(),
        };
        let top: VivoError = err.into();
        assert!(matches!(top, VivoError::Store(StoreError::Redb { .. })));
    }

    #[test]
    fn sync_error_keeps_source_chain() {
        let err = SyncError::Insert {
            key: "0000-0001".into(),
            count: 3,
            source: StoreError::Remote {
                endpoint: "http://localhost/api/sparqlUpdate".into(),
                message: "HTTP 500".into(),
            },
        };
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(
            source.as_deref(),
            Some("triple store at http://localhost/api/sparqlUpdate failed: HTTP 500")
        );
    }

    #[test]
    fn diagnostic_codes_are_namespaced() {
        let err = FetchError::Status {
            url: "https://api.crossref.org/works/10.1/x".into(),
            code: 503,
        };
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("vivo::fetch::status"));
    }

    #[test]
    fn load_error_wraps_sync_error() {
        let err: LoadError = SyncError::LoadBaseline {
            key: "k".into(),
            source: StoreError::NotFound { key: "k".into() },
        }
        .into();
        let top: VivoError = err.into();
        assert!(top.to_string().contains("baseline"));
    }
}
