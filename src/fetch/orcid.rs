//! ORCID public API client (message version 1.2).

use std::time::Duration;

use crate::error::{FetchError, FetchResult};
use crate::source::OrcidProfile;
use crate::source::profile::clean_orcid;

use super::{ProfileSource, RetryPolicy, agent, get_json};

pub const DEFAULT_BASE_URL: &str = "https://pub.orcid.org/v1.2";
const ACCEPT: &str = "application/orcid+json";

pub struct OrcidClient {
    base_url: String,
    agent: ureq::Agent,
    retry: RetryPolicy,
}

impl std::fmt::Debug for OrcidClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrcidClient")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish()
    }
}

impl OrcidClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent: agent(timeout),
            retry,
        }
    }

    pub fn profile_url(&self, orcid: &str) -> String {
        format!("{}/{orcid}/orcid-profile", self.base_url)
    }
}

impl ProfileSource for OrcidClient {
    fn fetch(&self, orcid: &str) -> FetchResult<OrcidProfile> {
        let orcid = clean_orcid(orcid)?;
        let url = self.profile_url(&orcid);
        tracing::debug!(%url, "fetching profile");
        let profile: Option<OrcidProfile> =
            self.retry.run(|| get_json(&self.agent, &url, ACCEPT))?;
        profile.ok_or(FetchError::Status { url, code: 404 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_url_shape() {
        let client = OrcidClient::new(
            "https://pub.orcid.org/v1.2/",
            Duration::from_secs(5),
            RetryPolicy::none(),
        );
        assert_eq!(
            client.profile_url("0000-0003-1527-0030"),
            "https://pub.orcid.org/v1.2/0000-0003-1527-0030/orcid-profile"
        );
    }

    #[test]
    fn invalid_orcid_fails_before_request() {
        let client = OrcidClient::new(
            "http://127.0.0.1:9",
            Duration::from_secs(1),
            RetryPolicy::none(),
        );
        assert!(matches!(
            client.fetch("not-an-orcid"),
            Err(FetchError::InvalidOrcid { .. })
        ));
    }
}
