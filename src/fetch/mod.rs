//! Network collaborators: the ORCID profile source and the Crossref DOI
//! lookup.
//!
//! Both are traits so the loader and tests can substitute in-memory sources.
//! The HTTP implementations use a blocking `ureq` agent with a per-request
//! timeout and retry transport errors and 5xx responses.

pub mod crossref;
pub mod orcid;

use std::thread;
use std::time::Duration;

use crate::error::{FetchError, FetchResult};
use crate::source::{CrossrefWork, OrcidProfile};

pub use crossref::CrossrefClient;
pub use orcid::OrcidClient;

/// Fetches a researcher profile by ORCID iD.
pub trait ProfileSource: Send + Sync {
    fn fetch(&self, orcid: &str) -> FetchResult<OrcidProfile>;
}

/// Looks up a work by DOI. `Ok(None)` means the DOI is unknown to the
/// service, which is not an error.
pub trait DoiLookup: Send + Sync {
    fn lookup(&self, doi: &str) -> FetchResult<Option<CrossrefWork>>;
}

/// A lookup that knows no DOIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl DoiLookup for NoLookup {
    fn lookup(&self, _doi: &str) -> FetchResult<Option<CrossrefWork>> {
        Ok(None)
    }
}

/// How often and how patiently a request is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first.
    pub retries: u32,
    /// Wait before retry `n` is `n * backoff`.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Run `attempt` until it succeeds, fails permanently, or retries run out.
    pub fn run<T>(&self, mut attempt: impl FnMut() -> FetchResult<T>) -> FetchResult<T> {
        let mut tries = 0;
        loop {
            match attempt() {
                Err(e) if tries < self.retries && is_transient(&e) => {
                    tries += 1;
                    tracing::warn!(error = %e, attempt = tries, "retrying request");
                    thread::sleep(self.backoff * tries);
                }
                result => return result,
            }
        }
    }
}

/// Transport failures and server errors may succeed on retry.
pub fn is_transient(error: &FetchError) -> bool {
    match error {
        FetchError::Transport { .. } => true,
        FetchError::Status { code, .. } => *code >= 500,
        _ => false,
    }
}

fn agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new().timeout(timeout).build()
}

/// GET `url` and decode the JSON body. A 404 yields `Ok(None)`.
fn get_json<T: serde::de::DeserializeOwned>(
    agent: &ureq::Agent,
    url: &str,
    accept: &str,
) -> FetchResult<Option<T>> {
    match agent.get(url).set("Accept", accept).call() {
        Ok(resp) => resp.into_json::<T>().map(Some).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        }),
        Err(ureq::Error::Status(404, _)) => Ok(None),
        Err(ureq::Error::Status(code, _)) => Err(FetchError::Status {
            url: url.to_string(),
            code,
        }),
        Err(ureq::Error::Transport(t)) => Err(FetchError::Transport {
            url: url.to_string(),
            message: t.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn status(code: u16) -> FetchError {
        FetchError::Status {
            url: "http://x".into(),
            code,
        }
    }

    #[test]
    fn retries_transient_failures() {
        let calls = Cell::new(0);
        let policy = RetryPolicy {
            retries: 2,
            backoff: Duration::ZERO,
        };
        let result = policy.run(|| {
            calls.set(calls.get() + 1);
            if calls.get() < 3 { Err(status(503)) } else { Ok(7) }
        });
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn gives_up_after_retries() {
        let calls = Cell::new(0);
        let policy = RetryPolicy {
            retries: 1,
            backoff: Duration::ZERO,
        };
        let result: FetchResult<()> = policy.run(|| {
            calls.set(calls.get() + 1);
            Err(FetchError::Transport {
                url: "http://x".into(),
                message: "connection refused".into(),
            })
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn client_errors_are_not_retried() {
        let calls = Cell::new(0);
        let result: FetchResult<()> = RetryPolicy::default().run(|| {
            calls.set(calls.get() + 1);
            Err(status(400))
        });
        assert!(matches!(result, Err(FetchError::Status { code: 400, .. })));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn no_lookup_finds_nothing() {
        assert!(NoLookup.lookup("10.1/x").unwrap().is_none());
    }
}
