//! ORCID profile record (message version 1.2).
//!
//! Only the parts the crosswalk reads are modelled. Unknown keys are ignored
//! and every section may be `null` or missing.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::{FetchError, FetchResult};

use super::{non_empty, nullable_vec, string_or_number};

static ORCID_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{4}-\d{4}-\d{3}[\dX]$").unwrap());

/// Normalize an ORCID iD given as a bare iD or an `orcid.org` URL.
pub fn clean_orcid(value: &str) -> FetchResult<String> {
    let trimmed = value.trim().trim_end_matches('/');
    let id = trimmed.rsplit('/').next().unwrap_or(trimmed).to_uppercase();
    if ORCID_ID.is_match(&id) {
        Ok(id)
    } else {
        Err(FetchError::InvalidOrcid {
            value: value.to_string(),
        })
    }
}

/// A `{"value": ...}` wrapper as used throughout the ORCID schema.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Text {
    #[serde(default, alias = "content", deserialize_with = "string_or_number")]
    pub value: Option<String>,
}

impl Text {
    pub fn get(&self) -> Option<&str> {
        self.value.as_deref().and_then(non_empty)
    }
}

/// Value of an optional `{"value": ...}` field, if non-empty.
pub fn text(field: &Option<Text>) -> Option<&str> {
    field.as_ref().and_then(Text::get)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrcidProfile {
    #[serde(default, rename = "orcid-profile")]
    pub profile: Option<ProfileBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProfileBody {
    #[serde(default)]
    pub orcid_identifier: Option<OrcidIdentifier>,
    #[serde(default)]
    pub orcid_bio: Option<Bio>,
    #[serde(default)]
    pub orcid_activities: Option<Activities>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrcidIdentifier {
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Bio {
    #[serde(default)]
    pub personal_details: Option<PersonalDetails>,
    #[serde(default)]
    pub biography: Option<Text>,
    #[serde(default)]
    pub researcher_urls: Option<ResearcherUrls>,
    #[serde(default)]
    pub keywords: Option<Keywords>,
    #[serde(default)]
    pub external_identifiers: Option<ExternalIdentifiers>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PersonalDetails {
    #[serde(default)]
    pub given_names: Option<Text>,
    #[serde(default)]
    pub family_name: Option<Text>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResearcherUrls {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub researcher_url: Vec<ResearcherUrl>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResearcherUrl {
    #[serde(default)]
    pub url_name: Option<Text>,
    #[serde(default)]
    pub url: Option<Text>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Keywords {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub keyword: Vec<Text>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExternalIdentifiers {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub external_identifier: Vec<ExternalIdentifier>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExternalIdentifier {
    #[serde(default)]
    pub external_id_common_name: Option<Text>,
    #[serde(default)]
    pub external_id_reference: Option<Text>,
    #[serde(default)]
    pub external_id_url: Option<Text>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Activities {
    #[serde(default)]
    pub affiliations: Option<Affiliations>,
    #[serde(default)]
    pub orcid_works: Option<Works>,
    #[serde(default)]
    pub funding_list: Option<FundingList>,
}

// ---------------------------------------------------------------------------
// Dates and organizations
// ---------------------------------------------------------------------------

/// A date whose parts are each optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FuzzyDate {
    #[serde(default)]
    pub year: Option<Text>,
    #[serde(default)]
    pub month: Option<Text>,
    #[serde(default)]
    pub day: Option<Text>,
}

impl FuzzyDate {
    pub fn year(&self) -> Option<&str> {
        text(&self.year)
    }

    pub fn month(&self) -> Option<&str> {
        text(&self.month)
    }

    pub fn day(&self) -> Option<&str> {
        text(&self.day)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Organization {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
}

impl Organization {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().and_then(non_empty)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

// ---------------------------------------------------------------------------
// Affiliations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Affiliations {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub affiliation: Vec<Affiliation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Affiliation {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub department_name: Option<String>,
    #[serde(default)]
    pub role_title: Option<String>,
    #[serde(default)]
    pub start_date: Option<FuzzyDate>,
    #[serde(default)]
    pub end_date: Option<FuzzyDate>,
    #[serde(default)]
    pub organization: Option<Organization>,
}

impl Affiliation {
    pub fn is_education(&self) -> bool {
        self.kind.as_deref() == Some("EDUCATION")
    }

    pub fn organization_name(&self) -> Option<&str> {
        self.organization.as_ref().and_then(Organization::name)
    }

    pub fn degree(&self) -> Option<&str> {
        self.role_title.as_deref().and_then(non_empty)
    }

    pub fn department(&self) -> Option<&str> {
        self.department_name.as_deref().and_then(non_empty)
    }
}

// ---------------------------------------------------------------------------
// Works
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Works {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub orcid_work: Vec<Work>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Work {
    #[serde(default)]
    pub work_title: Option<WorkTitle>,
    #[serde(default)]
    pub journal_title: Option<Text>,
    #[serde(default)]
    pub work_citation: Option<WorkCitation>,
    #[serde(default)]
    pub work_type: Option<String>,
    #[serde(default)]
    pub publication_date: Option<FuzzyDate>,
    #[serde(default)]
    pub work_external_identifiers: Option<WorkExternalIdentifiers>,
    #[serde(default)]
    pub url: Option<Text>,
    #[serde(default)]
    pub work_contributors: Option<WorkContributors>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkTitle {
    #[serde(default)]
    pub title: Option<Text>,
    #[serde(default)]
    pub subtitle: Option<Text>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorkCitation {
    #[serde(default)]
    pub work_citation_type: Option<String>,
    #[serde(default)]
    pub citation: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorkExternalIdentifiers {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub work_external_identifier: Vec<WorkExternalIdentifier>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorkExternalIdentifier {
    #[serde(default)]
    pub work_external_identifier_type: Option<String>,
    #[serde(default)]
    pub work_external_identifier_id: Option<Text>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkContributors {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub contributor: Vec<WorkContributor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorkContributor {
    #[serde(default)]
    pub credit_name: Option<Text>,
    #[serde(default)]
    pub contributor_attributes: Option<ContributorAttributes>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ContributorAttributes {
    #[serde(default)]
    pub contributor_role: Option<String>,
}

impl WorkContributor {
    pub fn credit_name(&self) -> Option<&str> {
        text(&self.credit_name)
    }

    pub fn role(&self) -> Option<&str> {
        self.contributor_attributes
            .as_ref()
            .and_then(|a| a.contributor_role.as_deref())
    }
}

impl Work {
    pub fn work_type(&self) -> Option<&str> {
        self.work_type.as_deref().and_then(non_empty)
    }

    /// Title joined with its subtitle by `": "`.
    pub fn full_title(&self) -> Option<String> {
        let title = self.work_title.as_ref()?;
        let parts: Vec<&str> = [text(&title.title), text(&title.subtitle)]
            .into_iter()
            .flatten()
            .collect();
        (!parts.is_empty()).then(|| parts.join(": "))
    }

    pub fn journal_title(&self) -> Option<&str> {
        text(&self.journal_title)
    }

    pub fn url(&self) -> Option<&str> {
        text(&self.url)
    }

    /// The raw BibTeX citation, if the work carries one.
    pub fn bibtex(&self) -> Option<&str> {
        let citation = self.work_citation.as_ref()?;
        if citation.work_citation_type.as_deref() != Some("BIBTEX") {
            return None;
        }
        citation.citation.as_deref().and_then(non_empty)
    }

    /// External identifiers as `(type, value)` pairs, in profile order.
    pub fn external_ids(&self) -> Vec<(&str, &str)> {
        self.work_external_identifiers
            .iter()
            .flat_map(|ids| ids.work_external_identifier.iter())
            .filter_map(|id| {
                let kind = id.work_external_identifier_type.as_deref().and_then(non_empty)?;
                let value = text(&id.work_external_identifier_id)?;
                Some((kind, value))
            })
            .collect()
    }

    pub fn doi(&self) -> Option<&str> {
        self.external_ids()
            .into_iter()
            .find(|(kind, _)| *kind == "DOI")
            .map(|(_, value)| value)
    }

    pub fn contributors(&self) -> &[WorkContributor] {
        self.work_contributors
            .as_ref()
            .map(|c| c.contributor.as_slice())
            .unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Funding
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FundingList {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub funding: Vec<Funding>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Funding {
    #[serde(default)]
    pub funding_type: Option<String>,
    #[serde(default)]
    pub funding_title: Option<WorkTitle>,
    #[serde(default)]
    pub amount: Option<Amount>,
    #[serde(default)]
    pub start_date: Option<FuzzyDate>,
    #[serde(default)]
    pub end_date: Option<FuzzyDate>,
    #[serde(default)]
    pub organization: Option<Organization>,
    #[serde(default)]
    pub funding_external_identifiers: Option<FundingExternalIdentifiers>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Amount {
    #[serde(default, deserialize_with = "string_or_number")]
    pub value: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FundingExternalIdentifiers {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub funding_external_identifier: Vec<FundingExternalIdentifier>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FundingExternalIdentifier {
    #[serde(default)]
    pub funding_external_identifier_type: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub funding_external_identifier_value: Option<String>,
    #[serde(default)]
    pub funding_external_identifier_url: Option<Text>,
}

impl Funding {
    pub fn is_grant(&self) -> bool {
        self.funding_type.as_deref() == Some("GRANT")
    }

    pub fn title(&self) -> Option<&str> {
        self.funding_title.as_ref().and_then(|t| text(&t.title))
    }

    pub fn organization_name(&self) -> Option<&str> {
        self.organization.as_ref().and_then(Organization::name)
    }

    pub fn amount(&self) -> Option<&str> {
        self.amount.as_ref()?.value.as_deref().and_then(non_empty)
    }

    pub fn external_ids(&self) -> &[FundingExternalIdentifier] {
        self.funding_external_identifiers
            .as_ref()
            .map(|ids| ids.funding_external_identifier.as_slice())
            .unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Profile accessors
// ---------------------------------------------------------------------------

impl OrcidProfile {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    fn bio(&self) -> Option<&Bio> {
        self.profile.as_ref()?.orcid_bio.as_ref()
    }

    fn activities(&self) -> Option<&Activities> {
        self.profile.as_ref()?.orcid_activities.as_ref()
    }

    pub fn orcid_id(&self) -> Option<&str> {
        self.profile
            .as_ref()?
            .orcid_identifier
            .as_ref()?
            .path
            .as_deref()
            .and_then(non_empty)
    }

    pub fn given_names(&self) -> Option<&str> {
        text(&self.bio()?.personal_details.as_ref()?.given_names)
    }

    pub fn family_name(&self) -> Option<&str> {
        text(&self.bio()?.personal_details.as_ref()?.family_name)
    }

    pub fn biography(&self) -> Option<&str> {
        text(&self.bio()?.biography)
    }

    pub fn researcher_urls(&self) -> &[ResearcherUrl] {
        self.bio()
            .and_then(|b| b.researcher_urls.as_ref())
            .map(|u| u.researcher_url.as_slice())
            .unwrap_or(&[])
    }

    /// Keywords, each entry split on `", "`.
    pub fn keywords(&self) -> Vec<&str> {
        self.bio()
            .and_then(|b| b.keywords.as_ref())
            .map(|k| k.keyword.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(Text::get)
            .flat_map(|k| k.split(", "))
            .filter_map(non_empty)
            .collect()
    }

    pub fn external_identifiers(&self) -> &[ExternalIdentifier] {
        self.bio()
            .and_then(|b| b.external_identifiers.as_ref())
            .map(|e| e.external_identifier.as_slice())
            .unwrap_or(&[])
    }

    pub fn affiliations(&self) -> &[Affiliation] {
        self.activities()
            .and_then(|a| a.affiliations.as_ref())
            .map(|a| a.affiliation.as_slice())
            .unwrap_or(&[])
    }

    pub fn works(&self) -> &[Work] {
        self.activities()
            .and_then(|a| a.orcid_works.as_ref())
            .map(|w| w.orcid_work.as_slice())
            .unwrap_or(&[])
    }

    pub fn fundings(&self) -> &[Funding] {
        self.activities()
            .and_then(|a| a.funding_list.as_ref())
            .map(|f| f.funding.as_slice())
            .unwrap_or(&[])
    }
}
