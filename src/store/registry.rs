//! Registry of the subjects the loader keeps in sync.
//!
//! One record per ORCID iD, stored as JSON in the shared redb database.
//! Deleting a subject only deactivates it, so its identifiers and last-load
//! time survive a later re-add.

use chrono::{DateTime, Utc};
use redb::TableDefinition;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

use super::durable::{DurableStore, Table};

pub(crate) const SUBJECTS: Table = TableDefinition::new("subjects");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub orcid_id: String,
    pub active: bool,
    /// When the subject was last synced; `None` if never.
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub person_uri: Option<String>,
    #[serde(default)]
    pub person_id: Option<String>,
    #[serde(default)]
    pub person_class: Option<String>,
}

impl SubjectRecord {
    pub fn new(orcid_id: impl Into<String>) -> Self {
        Self {
            orcid_id: orcid_id.into(),
            active: true,
            last_update: None,
            person_uri: None,
            person_id: None,
            person_class: None,
        }
    }
}

impl std::fmt::Display for SubjectRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".into());
        write!(
            f,
            "{} [active={}; last_update={}; person_uri={}; person_id={}; person_class={}]",
            self.orcid_id,
            self.active,
            self.last_update
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".into()),
            show(&self.person_uri),
            show(&self.person_id),
            show(&self.person_class),
        )
    }
}

#[derive(Debug, Clone)]
pub struct SubjectRegistry {
    store: DurableStore,
}

impl SubjectRegistry {
    pub fn new(store: DurableStore) -> Self {
        Self { store }
    }

    fn decode(key: &str, bytes: &[u8]) -> StoreResult<SubjectRecord> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Serialization {
            message: format!("subject {key}: {e}"),
        })
    }

    fn put(&self, record: &SubjectRecord) -> StoreResult<()> {
        let bytes = serde_json::to_vec(record).map_err(|e| StoreError::Serialization {
            message: format!("subject {}: {e}", record.orcid_id),
        })?;
        self.store.put(SUBJECTS, &record.orcid_id, &bytes)
    }

    /// Register a subject, or reactivate it and replace its person fields.
    /// The last-load time of an existing record is kept.
    pub fn add(
        &self,
        orcid_id: &str,
        person_uri: Option<String>,
        person_id: Option<String>,
        person_class: Option<String>,
    ) -> StoreResult<SubjectRecord> {
        let mut record = match self.get(orcid_id)? {
            Some(existing) => {
                tracing::info!(orcid = orcid_id, "updating subject");
                existing
            }
            None => {
                tracing::info!(orcid = orcid_id, "adding subject");
                SubjectRecord::new(orcid_id)
            }
        };
        record.active = true;
        record.person_uri = person_uri;
        record.person_id = person_id;
        record.person_class = person_class;
        self.put(&record)?;
        Ok(record)
    }

    /// The record for `orcid_id`, active or not.
    pub fn get(&self, orcid_id: &str) -> StoreResult<Option<SubjectRecord>> {
        self.store
            .get(SUBJECTS, orcid_id)?
            .map(|bytes| Self::decode(orcid_id, &bytes))
            .transpose()
    }

    /// Whether `orcid_id` is registered and active.
    pub fn contains(&self, orcid_id: &str) -> StoreResult<bool> {
        Ok(self.get(orcid_id)?.is_some_and(|r| r.active))
    }

    /// Mark a subject inactive. Returns whether it was registered.
    pub fn deactivate(&self, orcid_id: &str) -> StoreResult<bool> {
        let Some(mut record) = self.get(orcid_id)? else {
            return Ok(false);
        };
        record.active = false;
        self.put(&record)?;
        Ok(true)
    }

    /// Mark every subject inactive. Returns how many were active.
    pub fn deactivate_all(&self) -> StoreResult<usize> {
        let mut count = 0;
        for mut record in self.list(true)? {
            record.active = false;
            self.put(&record)?;
            count += 1;
        }
        Ok(count)
    }

    /// All records in ORCID iD order.
    pub fn list(&self, active_only: bool) -> StoreResult<Vec<SubjectRecord>> {
        let mut records = Vec::new();
        for (key, bytes) in self.store.entries(SUBJECTS)? {
            let record = Self::decode(&key, &bytes)?;
            if record.active || !active_only {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Active subjects, never-loaded first, then oldest load first.
    ///
    /// With `before`, only subjects never loaded or last loaded strictly
    /// before that time are returned.
    pub fn least_recent(
        &self,
        limit: Option<usize>,
        before: Option<DateTime<Utc>>,
    ) -> StoreResult<Vec<SubjectRecord>> {
        let mut records: Vec<SubjectRecord> = self
            .list(true)?
            .into_iter()
            .filter(|r| match (before, r.last_update) {
                (Some(before), Some(last)) => last < before,
                _ => true,
            })
            .collect();
        // `None` sorts before `Some`, so never-loaded subjects come first.
        records.sort_by(|a, b| {
            a.last_update
                .cmp(&b.last_update)
                .then_with(|| a.orcid_id.cmp(&b.orcid_id))
        });
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    /// Record a successful load of an active subject at `now`.
    pub fn touch(&self, orcid_id: &str, now: DateTime<Utc>) -> StoreResult<()> {
        match self.get(orcid_id)? {
            Some(mut record) if record.active => {
                record.last_update = Some(now);
                self.put(&record)
            }
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound {
                key: orcid_id.to_string(),
            }),
        }
    }
}
