//! Crossref REST API client.

use std::time::Duration;

use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::source::CrossrefWork;
use crate::source::crossref::CrossrefEnvelope;

use super::{DoiLookup, RetryPolicy, agent, get_json};

pub const DEFAULT_BASE_URL: &str = "https://api.crossref.org/works";

pub struct CrossrefClient {
    base_url: String,
    agent: ureq::Agent,
    retry: RetryPolicy,
}

impl std::fmt::Debug for CrossrefClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossrefClient")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish()
    }
}

impl CrossrefClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent: agent(timeout),
            retry,
        }
    }

    /// The works URL of `doi`. Each `/`-separated part of the DOI is
    /// percent-encoded as a path segment, so `#`, `?` and `<>` stay in the path.
    pub fn work_url(&self, doi: &str) -> FetchResult<String> {
        let invalid = |message: String| FetchError::InvalidUrl {
            url: self.base_url.clone(),
            message,
        };
        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("cannot be a base URL".into()))?
            .pop_if_empty()
            .extend(doi.trim().split('/'));
        Ok(url.into())
    }
}

impl DoiLookup for CrossrefClient {
    fn lookup(&self, doi: &str) -> FetchResult<Option<CrossrefWork>> {
        let url = self.work_url(doi)?;
        let envelope: Option<CrossrefEnvelope> =
            self.retry.run(|| get_json(&self.agent, &url, "application/json"))?;
        if envelope.is_none() {
            tracing::debug!(doi, "DOI not registered with Crossref");
        }
        Ok(envelope.map(|e| e.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    #[test]
    fn work_url_shape() {
        let client = CrossrefClient::new(DEFAULT_BASE_URL, Duration::from_secs(5), RetryPolicy::none());
        assert_eq!(
            client.work_url(" 10.1097/ACM.0000000000000371 ").unwrap(),
            "https://api.crossref.org/works/10.1097/ACM.0000000000000371"
        );
    }

    #[test]
    fn work_url_escapes_reserved_characters() {
        let client = CrossrefClient::new(DEFAULT_BASE_URL, Duration::from_secs(5), RetryPolicy::none());
        assert_eq!(
            client
                .work_url("10.1002/(SICI)1097-4571(199806)49:8<693::AID-ASI4>3.0.CO;2-0")
                .unwrap(),
            "https://api.crossref.org/works/10.1002/(SICI)1097-4571(199806)49:8%3C693::AID-ASI4%3E3.0.CO;2-0"
        );
        assert_eq!(
            client.work_url("10.1000/a#b?c%d").unwrap(),
            "https://api.crossref.org/works/10.1000/a%23b%3Fc%25d"
        );
    }

    #[test]
    fn relative_base_url_is_rejected() {
        let client = CrossrefClient::new("api.crossref.org/works", Duration::from_secs(5), RetryPolicy::none());
        assert!(matches!(
            client.lookup("10.1/x"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn unreachable_service_is_transport_error() {
        let client = CrossrefClient::new("http://127.0.0.1:9", Duration::from_secs(1), RetryPolicy::none());
        assert!(matches!(
            client.lookup("10.1/x"),
            Err(FetchError::Transport { .. })
        ));
    }
}
