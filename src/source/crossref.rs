//! Crossref work record, as found under `message` in a `/works/{doi}` response.

use serde::Deserialize;

use super::{non_empty, nullable_vec, string_or_number};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrossrefWork {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub title: Vec<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub container_title: Vec<String>,
    #[serde(default, rename = "ISSN", deserialize_with = "nullable_vec")]
    pub issn: Vec<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub subject: Vec<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub author: Vec<CrossrefAuthor>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub volume: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub issue: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub issued: Option<Issued>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrossrefAuthor {
    #[serde(default)]
    pub given: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Issued {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub date_parts: Vec<Vec<Option<i64>>>,
}

/// The response envelope: `{"status": "ok", "message": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CrossrefEnvelope {
    pub message: CrossrefWork,
}

impl CrossrefWork {
    pub fn title(&self) -> Option<&str> {
        self.title.first().and_then(|t| non_empty(t))
    }

    /// The longest container title; records often carry both an abbreviated
    /// and a full journal name.
    pub fn journal(&self) -> Option<&str> {
        self.container_title
            .iter()
            .filter_map(|t| non_empty(t))
            .fold(None, |longest: Option<&str>, t| match longest {
                Some(l) if l.len() >= t.len() => Some(l),
                _ => Some(t),
            })
    }

    pub fn issns(&self) -> Vec<&str> {
        self.issn.iter().filter_map(|i| non_empty(i)).collect()
    }

    pub fn subjects(&self) -> Vec<&str> {
        self.subject.iter().filter_map(|s| non_empty(s)).collect()
    }

    pub fn volume(&self) -> Option<&str> {
        self.volume.as_deref().and_then(non_empty)
    }

    pub fn issue(&self) -> Option<&str> {
        self.issue.as_deref().and_then(non_empty)
    }

    pub fn page(&self) -> Option<&str> {
        self.page.as_deref().and_then(non_empty)
    }

    pub fn publisher(&self) -> Option<&str> {
        self.publisher.as_deref().and_then(non_empty)
    }

    /// `(year, month, day)` of the first issued date, each part optional.
    pub fn issued(&self) -> Option<(Option<i64>, Option<i64>, Option<i64>)> {
        let parts = self.issued.as_ref()?.date_parts.first()?;
        let part = |i: usize| parts.get(i).copied().flatten();
        part(0).map(|year| (Some(year), part(1), part(2)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_envelope() {
        let env: CrossrefEnvelope = serde_json::from_str(
            r#"{"status": "ok", "message": {
                "title": ["Real Title"],
                "container-title": ["Acad Med", "Academic Medicine"],
                "ISSN": ["1040-2446", "1938-808X"],
                "author": [{"given": "Laurel", "family": "Haak"}],
                "volume": "89",
                "issued": {"date-parts": [[2014, 7]]}
            }}"#,
        )
        .unwrap();
        let work = env.message;
        assert_eq!(work.title(), Some("Real Title"));
        assert_eq!(work.journal(), Some("Academic Medicine"));
        assert_eq!(work.issns(), vec!["1040-2446", "1938-808X"]);
        assert_eq!(work.issued(), Some((Some(2014), Some(7), None)));
        assert_eq!(work.volume(), Some("89"));
    }

    #[test]
    fn null_date_parts_are_absent() {
        let work: CrossrefWork =
            serde_json::from_str(r#"{"issued": {"date-parts": [[null]]}}"#).unwrap();
        assert_eq!(work.issued(), None);
    }
}
