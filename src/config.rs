//! Loader configuration, persisted as TOML.
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration for crosswalking to stdout. Loading to VIVO needs at
//! least `[endpoint]`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::fetch::{self, RetryPolicy};

/// Environment variable consulted when the endpoint password is not set.
pub const PASSWORD_ENV: &str = "VIVO_ROOT_PASSWORD";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base IRI for every minted identifier.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Directory holding the redb database.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Named graph the facts are written to.
    #[serde(default = "default_graph")]
    pub graph: String,
    /// Leave the person and their name card to another system of record.
    #[serde(default)]
    pub skip_person: bool,
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub orcid: OrcidConfig,
    #[serde(default)]
    pub crossref: CrossrefConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// SPARQL Update URL, e.g. `http://localhost/vivo/api/sparqlUpdate`.
    #[serde(default)]
    pub url: Option<String>,
    /// Email of the VIVO root account.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrcidConfig {
    #[serde(default = "default_orcid_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossrefConfig {
    /// Set to false to crosswalk from the profile and citations alone.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_crossref_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Subjects loaded in parallel by a batch load.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_namespace() -> String {
    "http://vivo.mydomain.edu/individual/".into()
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_graph() -> String {
    "http://vitro.mannlib.cornell.edu/default/vitro-kb-2".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_retries() -> u32 {
    2
}
fn default_backoff_ms() -> u64 {
    500
}
fn default_orcid_url() -> String {
    fetch::orcid::DEFAULT_BASE_URL.into()
}
fn default_crossref_url() -> String {
    fetch::crossref::DEFAULT_BASE_URL.into()
}
fn default_true() -> bool {
    true
}
fn default_workers() -> usize {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            data_dir: default_data_dir(),
            graph: default_graph(),
            skip_person: false,
            endpoint: EndpointConfig::default(),
            orcid: OrcidConfig::default(),
            crossref: CrossrefConfig::default(),
            loader: LoaderConfig::default(),
        }
    }
}

impl Default for OrcidConfig {
    fn default() -> Self {
        Self {
            base_url: default_orcid_url(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
        }
    }
}

impl Default for CrossrefConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_crossref_url(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}

impl EndpointConfig {
    /// The configured password, else the one in [`PASSWORD_ENV`].
    pub fn password(&self) -> Option<String> {
        self.password
            .clone()
            .or_else(|| std::env::var(PASSWORD_ENV).ok())
            .filter(|p| !p.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl OrcidConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retries,
            ..RetryPolicy::default()
        }
    }
}

impl CrossrefConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retries,
            backoff: Duration::from_millis(self.backoff_ms),
        }
    }
}

impl Config {
    /// Load from a TOML file and validate.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a TOML file. The endpoint password is never written.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let ns = self.namespace.as_str();
        let absolute = ns.split_once("://").is_some_and(|(scheme, rest)| {
            !scheme.is_empty() && !rest.is_empty()
        });
        if !absolute || !(ns.ends_with('/') || ns.ends_with('#')) {
            return Err(ConfigError::InvalidNamespace {
                namespace: self.namespace.clone(),
            });
        }
        Ok(())
    }
}
