//! Source-precedence field resolution.
//!
//! A work can be described by up to three records: the Crossref lookup for
//! its DOI, the BibTeX citation embedded in the profile, and the profile work
//! itself. Each field is taken whole from the first source in precedence
//! order that has a non-empty value; partial values are never merged.
//!
//! The default order is lookup, then citation, then profile. Fields that are
//! better described by one source get an explicit, named
//! [`PrecedenceOverride`] instead of a special case in crosswalk code.

use std::fmt;

use crate::crosswalk::date::DateParts;
use crate::source::citation::normalize_name;
use crate::source::profile::Work;
use crate::source::{CitationRecord, CrossrefWork};

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Tertiary: Crossref record for the work's DOI.
    Lookup,
    /// Secondary: BibTeX citation embedded in the profile.
    Citation,
    /// Primary: the profile record itself.
    Profile,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceKind::Lookup => "lookup",
            SourceKind::Citation => "citation",
            SourceKind::Profile => "profile",
        })
    }
}

/// Fields resolved by precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    PublicationDate,
    Contributors,
    Publisher,
    Volume,
    Issue,
    Pages,
    Venue,
}

/// Replaces the default source order for one field, optionally only for one
/// work type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecedenceOverride {
    pub name: &'static str,
    pub field: Field,
    pub work_type: Option<&'static str>,
    pub order: Vec<SourceKind>,
}

impl PrecedenceOverride {
    /// Translator roles exist only in profile contributor lists.
    pub fn translation_contributors() -> Self {
        Self {
            name: "translation-contributors-from-profile",
            field: Field::Contributors,
            work_type: Some("TRANSLATION"),
            order: vec![SourceKind::Profile],
        }
    }

    /// Profile dates carry month and day; citation dates are year-only.
    pub fn publication_date() -> Self {
        Self {
            name: "publication-date-profile-before-citation",
            field: Field::PublicationDate,
            work_type: None,
            order: vec![SourceKind::Lookup, SourceKind::Profile, SourceKind::Citation],
        }
    }

    fn applies(&self, field: Field, work_type: &str) -> bool {
        self.field == field && self.work_type.is_none_or(|t| t == work_type)
    }
}

/// Outcome of resolving one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved<T> {
    Found { value: T, source: SourceKind },
    Absent,
}

impl<T> Resolved<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Resolved::Found { value, .. } => Some(value),
            Resolved::Absent => None,
        }
    }

    pub fn as_ref(&self) -> Resolved<&T> {
        match self {
            Resolved::Found { value, source } => Resolved::Found {
                value,
                source: *source,
            },
            Resolved::Absent => Resolved::Absent,
        }
    }

    pub fn source(&self) -> Option<SourceKind> {
        match self {
            Resolved::Found { source, .. } => Some(*source),
            Resolved::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Resolved::Absent)
    }
}

pub const DEFAULT_ORDER: &[SourceKind] =
    &[SourceKind::Lookup, SourceKind::Citation, SourceKind::Profile];

/// Precedence policy: a default source order plus named overrides.
#[derive(Debug, Clone)]
pub struct FieldResolver {
    overrides: Vec<PrecedenceOverride>,
}

impl Default for FieldResolver {
    /// Default order with the standard overrides installed.
    fn default() -> Self {
        Self::new()
            .with_override(PrecedenceOverride::translation_contributors())
            .with_override(PrecedenceOverride::publication_date())
    }
}

impl FieldResolver {
    /// Default order, no overrides.
    pub fn new() -> Self {
        Self {
            overrides: Vec::new(),
        }
    }

    /// Add an override. Later overrides for the same field and work type
    /// take priority over earlier ones.
    pub fn with_override(mut self, rule: PrecedenceOverride) -> Self {
        self.overrides.push(rule);
        self
    }

    pub fn overrides(&self) -> &[PrecedenceOverride] {
        &self.overrides
    }

    /// Source order for `field` on a work of `work_type`. A type-specific
    /// override wins over a field-wide one.
    pub fn order_for(&self, field: Field, work_type: &str) -> &[SourceKind] {
        let mut field_wide = None;
        for rule in self.overrides.iter().rev() {
            if !rule.applies(field, work_type) {
                continue;
            }
            if rule.work_type.is_some() {
                return &rule.order;
            }
            field_wide.get_or_insert(rule);
        }
        field_wide.map_or(DEFAULT_ORDER, |rule| rule.order.as_slice())
    }

    /// Try each source in order; the first `Some` wins.
    pub fn resolve<T>(
        &self,
        field: Field,
        work_type: &str,
        mut extract: impl FnMut(SourceKind) -> Option<T>,
    ) -> Resolved<T> {
        for &source in self.order_for(field, work_type) {
            if let Some(value) = extract(source) {
                return Resolved::Found { value, source };
            }
        }
        Resolved::Absent
    }
}

// ---------------------------------------------------------------------------
// Work sources
// ---------------------------------------------------------------------------

/// Role of a contributor to a work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContributorRole {
    Author,
    Editor,
    Translator,
}

impl ContributorRole {
    /// Map an ORCID `contributor-role`; unknown roles count as authorship.
    pub fn from_profile(role: Option<&str>) -> Self {
        match role {
            Some("EDITOR") => ContributorRole::Editor,
            Some("CHAIR_OR_TRANSLATOR") => ContributorRole::Translator,
            _ => ContributorRole::Author,
        }
    }
}

/// A contributor as named by a source. No family name means the subject
/// person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contributor {
    pub given: Option<String>,
    pub family: Option<String>,
    pub role: ContributorRole,
}

impl Contributor {
    fn named(name: &str, role: ContributorRole) -> Self {
        let (given, family) = match normalize_name(name) {
            Some((given, family)) => (given, Some(family)),
            None => (None, None),
        };
        Self { given, family, role }
    }

    /// The subject person in the given role.
    pub fn subject(role: ContributorRole) -> Self {
        Self {
            given: None,
            family: None,
            role,
        }
    }
}

/// Publication venue: a name plus any ISSNs the same source knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Venue {
    pub name: String,
    pub issns: Vec<String>,
}

/// The records describing one profile work.
#[derive(Debug, Clone, Copy)]
pub struct WorkSources<'a> {
    pub profile: &'a Work,
    pub citation: Option<&'a CitationRecord>,
    pub lookup: Option<&'a CrossrefWork>,
}

impl<'a> WorkSources<'a> {
    pub fn work_type(&self) -> &'a str {
        self.profile.work_type().unwrap_or_default()
    }

    fn field(&self, name: &str) -> Option<String> {
        self.citation?.field(name).map(str::to_string)
    }

    pub fn title(&self, resolver: &FieldResolver) -> Resolved<String> {
        resolver.resolve(Field::Title, self.work_type(), |source| match source {
            SourceKind::Lookup => self.lookup?.title().map(str::to_string),
            SourceKind::Citation => self.field("title"),
            SourceKind::Profile => self.profile.full_title(),
        })
    }

    pub fn publication_date(&self, resolver: &FieldResolver) -> Resolved<DateParts> {
        resolver.resolve(Field::PublicationDate, self.work_type(), |source| match source {
            SourceKind::Lookup => {
                let (year, month, day) = self.lookup?.issued()?;
                DateParts::from_numbers(year?, month, day)
            }
            SourceKind::Citation => DateParts::parse(self.citation?.field("year"), None, None),
            SourceKind::Profile => {
                let date = self.profile.publication_date.as_ref()?;
                DateParts::parse(date.year(), date.month(), date.day())
            }
        })
    }

    pub fn contributors(&self, resolver: &FieldResolver) -> Resolved<Vec<Contributor>> {
        resolver.resolve(Field::Contributors, self.work_type(), |source| {
            let contributors: Vec<Contributor> = match source {
                SourceKind::Lookup => self
                    .lookup?
                    .author
                    .iter()
                    .filter(|a| a.given.is_some() || a.family.is_some())
                    .map(|a| Contributor {
                        given: a.given.clone(),
                        family: a.family.clone(),
                        role: ContributorRole::Author,
                    })
                    .collect(),
                SourceKind::Citation => {
                    let citation = self.citation?;
                    citation
                        .authors
                        .iter()
                        .map(|n| Contributor::named(n, ContributorRole::Author))
                        .chain(
                            citation
                                .editors
                                .iter()
                                .map(|n| Contributor::named(n, ContributorRole::Editor)),
                        )
                        .collect()
                }
                SourceKind::Profile => self
                    .profile
                    .contributors()
                    .iter()
                    .map(|c| {
                        let role = ContributorRole::from_profile(c.role());
                        match c.credit_name() {
                            Some(name) => Contributor::named(name, role),
                            None => Contributor::subject(role),
                        }
                    })
                    .collect(),
            };
            (!contributors.is_empty()).then_some(contributors)
        })
    }

    pub fn publisher(&self, resolver: &FieldResolver) -> Resolved<String> {
        resolver.resolve(Field::Publisher, self.work_type(), |source| match source {
            SourceKind::Lookup => self.lookup?.publisher().map(str::to_string),
            SourceKind::Citation => self.field("publisher"),
            SourceKind::Profile => None,
        })
    }

    pub fn volume(&self, resolver: &FieldResolver) -> Resolved<String> {
        resolver.resolve(Field::Volume, self.work_type(), |source| match source {
            SourceKind::Lookup => self.lookup?.volume().map(str::to_string),
            SourceKind::Citation => self.field("volume"),
            SourceKind::Profile => None,
        })
    }

    pub fn issue(&self, resolver: &FieldResolver) -> Resolved<String> {
        resolver.resolve(Field::Issue, self.work_type(), |source| match source {
            SourceKind::Lookup => self.lookup?.issue().map(str::to_string),
            SourceKind::Citation => self.field("number"),
            SourceKind::Profile => None,
        })
    }

    pub fn pages(&self, resolver: &FieldResolver) -> Resolved<String> {
        resolver.resolve(Field::Pages, self.work_type(), |source| match source {
            SourceKind::Lookup => self.lookup?.page().map(str::to_string),
            SourceKind::Citation => self.field("pages"),
            SourceKind::Profile => None,
        })
    }

    /// Journal-style venue. Citation and profile venues are only trusted
    /// when `periodical` is set, i.e. the work type is a periodical article;
    /// a Crossref container title is always used.
    pub fn venue(&self, resolver: &FieldResolver, periodical: bool) -> Resolved<Venue> {
        resolver.resolve(Field::Venue, self.work_type(), |source| match source {
            SourceKind::Lookup => {
                let lookup = self.lookup?;
                lookup.journal().map(|name| Venue {
                    name: name.to_string(),
                    issns: lookup.issns().into_iter().map(str::to_string).collect(),
                })
            }
            SourceKind::Citation if periodical => {
                let citation = self.citation?;
                citation.field("journal").map(|name| Venue {
                    name: name.to_string(),
                    issns: citation.field("issn").map(str::to_string).into_iter().collect(),
                })
            }
            SourceKind::Profile if periodical => self.profile.journal_title().map(|name| Venue {
                name: name.to_string(),
                issns: Vec::new(),
            }),
            _ => None,
        })
    }
}
