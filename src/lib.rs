// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # orcid-vivo
//!
//! Crosswalks ORCID researcher profiles to VIVO RDF and keeps a VIVO triple
//! store in sync with them across repeated runs.
//!
//! ## Architecture
//!
//! - **Sources** (`source`, `fetch`): ORCID profiles, Crossref DOI records,
//!   BibTeX citations embedded in works
//! - **Identity** (`identity`): content-addressed identifiers and the
//!   create-once policy
//! - **Resolution** (`resolve`): per-field source precedence
//! - **Crosswalk** (`crosswalk`): profile sections to a fact [`Graph`](graph::Graph)
//! - **Sync** (`sync`): snapshot diff applied delete-then-add
//! - **Storage** (`store`): SPARQL Update and oxigraph triple stores, redb
//!   baselines and subject registry
//!
//! ## Library usage
//!
//! ```no_run
//! use orcid_vivo::config::Config;
//! use orcid_vivo::crosswalk::ProfileCrosswalker;
//! use orcid_vivo::fetch::{CrossrefClient, OrcidClient};
//! use orcid_vivo::loader::{Subject, crosswalk_subject};
//!
//! let config = Config::default();
//! let orcid = OrcidClient::new(&config.orcid.base_url, config.orcid.timeout(), config.orcid.retry());
//! let crossref = CrossrefClient::new(
//!     &config.crossref.base_url,
//!     config.crossref.timeout(),
//!     config.crossref.retry(),
//! );
//! let out = crosswalk_subject(
//!     &config,
//!     &ProfileCrosswalker::default(),
//!     &orcid,
//!     &crossref,
//!     &Subject::new("0000-0001-5109-3700"),
//! )
//! .unwrap();
//! print!("{}", out.graph.to_ntriples().unwrap());
//! ```

pub mod config;
pub mod crosswalk;
pub mod error;
pub mod fetch;
pub mod graph;
pub mod identity;
pub mod loader;
pub mod resolve;
pub mod source;
pub mod store;
pub mod sync;
pub mod vocab;
