//! End-to-end loading: fetch, look up, crosswalk, sync, record.
//!
//! [`crosswalk_subject`] is the read-only half (used by `orcid-vivo
//! crosswalk`); [`Loader`] adds the sync against a triple store and the
//! registry bookkeeping, for one subject or a batch of the least recently
//! loaded ones.

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::config::Config;
use crate::crosswalk::profile::{person_class, person_iri};
use crate::crosswalk::{CrosswalkContext, LookupCache, ProfileCrosswalker};
use crate::error::{LoadError, LoadResult, StoreError};
use crate::fetch::{DoiLookup, ProfileSource};
use crate::graph::{Graph, GraphDelta, Iri};
use crate::identity::{HashIdentifierStrategy, SimpleCreateStrategy};
use crate::resolve::FieldResolver;
use crate::source::profile::clean_orcid;
use crate::source::{BibtexParser, OrcidProfile};
use crate::store::{SnapshotStore, SubjectRecord, SubjectRegistry, TripleStore};
use crate::sync::SyncEngine;

/// Who to crosswalk and how to name them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subject {
    pub orcid_id: String,
    pub person_uri: Option<String>,
    pub person_id: Option<String>,
    /// VIVO class local name (`FacultyMember`) or IRI.
    pub person_class: Option<String>,
    pub skip_person: bool,
    /// The person proved they own the iD.
    pub confirmed: bool,
}

impl Subject {
    pub fn new(orcid_id: impl Into<String>) -> Self {
        Self {
            orcid_id: orcid_id.into(),
            ..Self::default()
        }
    }

    pub fn from_record(record: &SubjectRecord, skip_person: bool) -> Self {
        Self {
            orcid_id: record.orcid_id.clone(),
            person_uri: record.person_uri.clone(),
            person_id: record.person_id.clone(),
            person_class: record.person_class.clone(),
            skip_person,
            confirmed: false,
        }
    }
}

/// Result of crosswalking one subject.
#[derive(Debug, Clone)]
pub struct Crosswalked {
    /// Normalized ORCID iD; also the snapshot key.
    pub orcid_id: String,
    pub person: Iri,
    pub profile: OrcidProfile,
    pub graph: Graph,
}

/// Look up every DOI the profile's works carry.
///
/// A DOI the service does not know is cached as absent. Any other failure
/// aborts the subject.
pub fn prefetch_lookups(
    lookups: &dyn DoiLookup,
    orcid_id: &str,
    profile: &OrcidProfile,
) -> LoadResult<LookupCache> {
    let mut cache = LookupCache::new();
    for doi in profile.works().iter().filter_map(|w| w.doi()) {
        if cache.contains(doi) {
            continue;
        }
        let record = lookups.lookup(doi).map_err(|source| LoadError::Fetch {
            orcid: orcid_id.to_string(),
            source,
        })?;
        if record.is_none() {
            tracing::debug!(orcid = orcid_id, doi, "DOI not found");
        }
        cache.insert(doi, record);
    }
    Ok(cache)
}

/// Fetch and crosswalk one subject without touching any store.
pub fn crosswalk_subject(
    config: &Config,
    crosswalker: &ProfileCrosswalker,
    profiles: &dyn ProfileSource,
    lookups: &dyn DoiLookup,
    subject: &Subject,
) -> LoadResult<Crosswalked> {
    let fetch_err = |source| LoadError::Fetch {
        orcid: subject.orcid_id.clone(),
        source,
    };
    let orcid_id = clean_orcid(&subject.orcid_id).map_err(fetch_err)?;
    let profile = profiles.fetch(&orcid_id).map_err(fetch_err)?;
    let cache = prefetch_lookups(lookups, &orcid_id, &profile)?;

    let ids = HashIdentifierStrategy::new(config.namespace.as_str());
    let person = person_iri(
        &ids,
        subject.person_uri.as_deref(),
        subject.person_id.as_deref(),
        &orcid_id,
    );
    let create = SimpleCreateStrategy::new(&ids, &person, subject.skip_person);
    let resolver = FieldResolver::default();
    let ctx = CrosswalkContext::new(&ids, &create, &resolver, &BibtexParser, &cache, person.clone())
        .with_person_class(person_class(subject.person_class.as_deref()));

    let graph = crosswalker.crosswalk(&ctx, &profile, &orcid_id, subject.confirmed);
    tracing::info!(orcid = %orcid_id, facts = graph.len(), lookups = cache.len(), "crosswalked profile");
    Ok(Crosswalked {
        orcid_id,
        person,
        profile,
        graph,
    })
}

/// Outcome of a batch load.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Subjects synced, in the order they were selected.
    pub completed: Vec<String>,
    pub failed: Vec<(String, LoadError)>,
}

pub struct Loader<'a> {
    config: &'a Config,
    profiles: &'a dyn ProfileSource,
    lookups: &'a dyn DoiLookup,
    remote: &'a dyn TripleStore,
    snapshots: &'a dyn SnapshotStore,
    registry: &'a SubjectRegistry,
    crosswalker: ProfileCrosswalker,
}

impl<'a> Loader<'a> {
    pub fn new(
        config: &'a Config,
        profiles: &'a dyn ProfileSource,
        lookups: &'a dyn DoiLookup,
        remote: &'a dyn TripleStore,
        snapshots: &'a dyn SnapshotStore,
        registry: &'a SubjectRegistry,
    ) -> Self {
        Self {
            config,
            profiles,
            lookups,
            remote,
            snapshots,
            registry,
            crosswalker: ProfileCrosswalker::default(),
        }
    }

    /// Crosswalk a subject and compute its delta against the stored
    /// baseline, applying nothing.
    pub fn diff(&self, subject: &Subject) -> LoadResult<(Crosswalked, GraphDelta)> {
        let crosswalked = self.crosswalk(subject)?;
        let delta = SyncEngine::new(self.remote, self.snapshots)
            .plan(&crosswalked.orcid_id, &crosswalked.graph)?;
        Ok((crosswalked, delta))
    }

    pub fn crosswalk(&self, subject: &Subject) -> LoadResult<Crosswalked> {
        crosswalk_subject(
            self.config,
            &self.crosswalker,
            self.profiles,
            self.lookups,
            subject,
        )
    }

    /// Load one registered, active subject.
    pub fn load_single(&self, orcid_id: &str, skip_person: bool) -> LoadResult<GraphDelta> {
        let record = match self.registry.get(orcid_id)? {
            Some(record) if record.active => record,
            _ => {
                return Err(StoreError::NotFound {
                    key: orcid_id.to_string(),
                }
                .into());
            }
        };
        self.load_record(&record, skip_person)
    }

    fn load_record(&self, record: &SubjectRecord, skip_person: bool) -> LoadResult<GraphDelta> {
        let crosswalked = self.crosswalk(&Subject::from_record(record, skip_person))?;
        let delta = SyncEngine::new(self.remote, self.snapshots)
            .sync(&crosswalked.orcid_id, &crosswalked.graph)?;
        // The sync has already landed.
        if let Err(e) = self.registry.touch(&record.orcid_id, Utc::now()) {
            tracing::warn!(orcid = %record.orcid_id, error = %e, "failed to record load time");
        }
        Ok(delta)
    }

    /// Load up to `limit` active subjects, least recently loaded first.
    ///
    /// A failing subject is logged and reported; the rest still load.
    pub fn load_batch(
        &self,
        limit: Option<usize>,
        before: Option<DateTime<Utc>>,
        skip_person: bool,
    ) -> LoadResult<BatchReport> {
        let records = self.registry.least_recent(limit, before)?;
        let workers = self.config.loader.workers.max(1);
        tracing::info!(subjects = records.len(), workers, "loading batch");

        let load = |record: &SubjectRecord| {
            let result = self.load_record(record, skip_person);
            if let Err(e) = &result {
                tracing::warn!(orcid = %record.orcid_id, error = %e, "failed to load subject");
            }
            (record.orcid_id.clone(), result)
        };

        let results: Vec<(String, LoadResult<GraphDelta>)> = if workers > 1 {
            match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
                Ok(pool) => pool.install(|| records.par_iter().map(load).collect()),
                Err(e) => {
                    tracing::warn!(error = %e, "falling back to sequential load");
                    records.iter().map(load).collect()
                }
            }
        } else {
            records.iter().map(load).collect()
        };

        let mut report = BatchReport::default();
        for (orcid_id, result) in results {
            match result {
                Ok(_) => report.completed.push(orcid_id),
                Err(e) => report.failed.push((orcid_id, e)),
            }
        }
        Ok(report)
    }
}

impl std::fmt::Debug for Loader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader")
            .field("namespace", &self.config.namespace)
            .field("registry", self.registry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::error::{FetchError, FetchResult};
    use crate::fetch::NoLookup;
    use crate::source::CrossrefWork;
    use crate::store::registry::SUBJECTS;
    use crate::store::{DurableStore, MemorySnapshotStore, OxigraphStore};
    use crate::vocab::{bibo, rdf, rdfs, vivo};
    use tempfile::TempDir;

    const NS: &str = "http://vivo.example.edu/individual/";
    const GRAPH: &str = "http://vitro.mannlib.cornell.edu/default/vitro-kb-2";

    struct Profiles(HashMap<String, String>);

    impl ProfileSource for Profiles {
        fn fetch(&self, orcid: &str) -> FetchResult<OrcidProfile> {
            let json = self.0.get(orcid).ok_or(FetchError::Status {
                url: orcid.to_string(),
                code: 404,
            })?;
            OrcidProfile::from_json(json).map_err(|e| FetchError::Decode {
                url: orcid.to_string(),
                message: e.to_string(),
            })
        }
    }

    #[derive(Default)]
    struct CountingLookup(Mutex<Vec<String>>);

    impl DoiLookup for CountingLookup {
        fn lookup(&self, doi: &str) -> FetchResult<Option<CrossrefWork>> {
            self.0.lock().unwrap().push(doi.to_string());
            Ok(None)
        }
    }

    fn profile(name: &str, title: &str) -> String {
        format!(
            r#"{{"orcid-profile": {{
                "orcid-bio": {{"personal-details": {{"given-names": {{"value": "{name}"}}}}}},
                "orcid-activities": {{"orcid-works": {{"orcid-work": [
                    {{"work-type": "JOURNAL_ARTICLE",
                      "work-title": {{"title": {{"value": "{title}"}}}},
                      "work-external-identifiers": {{"work-external-identifier": [
                        {{"work-external-identifier-type": "DOI",
                          "work-external-identifier-id": {{"value": "10.1/A"}}}}]}}}},
                    {{"work-type": "JOURNAL_ARTICLE",
                      "work-title": {{"title": {{"value": "Other"}}}},
                      "work-external-identifiers": {{"work-external-identifier": [
                        {{"work-external-identifier-type": "DOI",
                          "work-external-identifier-id": {{"value": "10.1/a"}}}}]}}}}
                ]}}}}
            }}}}"#
        )
    }

    fn config(workers: usize) -> Config {
        let mut config = Config::default();
        config.namespace = NS.into();
        config.loader.workers = workers;
        config
    }

    #[test]
    fn crosswalk_subject_uses_person_id_and_class() {
        let profiles = Profiles(HashMap::from([(
            "0000-0001-5109-3700".to_string(),
            profile("Laurel", "T"),
        )]));
        let subject = Subject {
            person_id: Some("lhaak".into()),
            person_class: Some("FacultyMember".into()),
            ..Subject::new("http://orcid.org/0000-0001-5109-3700")
        };
        let out = crosswalk_subject(
            &config(1),
            &ProfileCrosswalker::default(),
            &profiles,
            &NoLookup,
            &subject,
        )
        .unwrap();
        assert_eq!(out.orcid_id, "0000-0001-5109-3700");
        let ids = HashIdentifierStrategy::new(NS);
        assert_eq!(out.person, person_iri(&ids, None, Some("lhaak"), "unused"));
        let class = Iri::new(format!("{}FacultyMember", vivo::NS));
        assert!(out.graph.has(&out.person, rdf::TYPE, class));
    }

    #[test]
    fn doi_lookups_are_deduplicated() {
        let profiles = Profiles(HashMap::from([(
            "0000-0001-5109-3700".to_string(),
            profile("Laurel", "T"),
        )]));
        let lookups = CountingLookup::default();
        let out = crosswalk_subject(
            &config(1),
            &ProfileCrosswalker::default(),
            &profiles,
            &lookups,
            &Subject::new("0000-0001-5109-3700"),
        )
        .unwrap();
        assert_eq!(lookups.0.lock().unwrap().len(), 1);
        let dois = out.graph.iter().filter(|f| f.predicate.as_str() == bibo::DOI).count();
        assert_eq!(dois, 2);
    }

    #[test]
    fn load_single_requires_active_subject() {
        let dir = TempDir::new().unwrap();
        let registry = SubjectRegistry::new(DurableStore::open(dir.path()).unwrap());
        let remote = OxigraphStore::in_memory(GRAPH).unwrap();
        let snapshots = MemorySnapshotStore::new();
        let profiles = Profiles(HashMap::new());
        let config = config(1);
        let loader = Loader::new(&config, &profiles, &NoLookup, &remote, &snapshots, &registry);

        let err = loader.load_single("0000-0001-5109-3700", false).unwrap_err();
        assert!(matches!(err, LoadError::Store(StoreError::NotFound { .. })));
    }

    #[test]
    fn batch_loads_and_reports_failures() {
        let dir = TempDir::new().unwrap();
        let registry = SubjectRegistry::new(DurableStore::open(dir.path()).unwrap());
        let remote = OxigraphStore::in_memory(GRAPH).unwrap();
        let snapshots = MemorySnapshotStore::new();
        let profiles = Profiles(HashMap::from([
            ("0000-0001-5109-3700".to_string(), profile("Laurel", "A")),
            ("0000-0002-1825-0097".to_string(), profile("Josiah", "B")),
        ]));
        for id in ["0000-0001-5109-3700", "0000-0002-1825-0097", "0000-0003-1527-0030"] {
            registry.add(id, None, None, None).unwrap();
        }
        let config = config(2);
        let loader = Loader::new(&config, &profiles, &NoLookup, &remote, &snapshots, &registry);

        let report = loader.load_batch(None, None, false).unwrap();
        assert_eq!(report.completed.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "0000-0003-1527-0030");
        assert_eq!(snapshots.len(), 2);
        assert!(registry.get("0000-0001-5109-3700").unwrap().unwrap().last_update.is_some());
        assert!(registry.get("0000-0003-1527-0030").unwrap().unwrap().last_update.is_none());

        // Remote holds exactly the union of the two baselines.
        let mut union = snapshots.load("0000-0001-5109-3700").unwrap().unwrap();
        union.extend(snapshots.load("0000-0002-1825-0097").unwrap().unwrap());
        assert_eq!(remote.graph().unwrap(), union);

        // Loaded subjects are no longer least recent.
        let next = registry.least_recent(Some(1), None).unwrap();
        assert_eq!(next[0].orcid_id, "0000-0003-1527-0030");
    }

    /// Drops the subject's registry record while its profile is fetched.
    struct Vanishing {
        profiles: Profiles,
        durable: DurableStore,
    }

    impl ProfileSource for Vanishing {
        fn fetch(&self, orcid: &str) -> FetchResult<OrcidProfile> {
            self.durable.remove(SUBJECTS, orcid).unwrap();
            self.profiles.fetch(orcid)
        }
    }

    #[test]
    fn failed_touch_still_reports_sync() {
        let dir = TempDir::new().unwrap();
        let durable = DurableStore::open(dir.path()).unwrap();
        let registry = SubjectRegistry::new(durable.clone());
        registry.add("0000-0001-5109-3700", None, None, None).unwrap();
        let remote = OxigraphStore::in_memory(GRAPH).unwrap();
        let snapshots = MemorySnapshotStore::new();
        let profiles = Vanishing {
            profiles: Profiles(HashMap::from([(
                "0000-0001-5109-3700".to_string(),
                profile("Laurel", "A"),
            )])),
            durable,
        };
        let config = config(1);
        let loader = Loader::new(&config, &profiles, &NoLookup, &remote, &snapshots, &registry);

        let delta = loader.load_single("0000-0001-5109-3700", false).unwrap();
        assert!(!delta.additions.is_empty());
        assert_eq!(
            snapshots.load("0000-0001-5109-3700").unwrap().unwrap(),
            delta.additions
        );
        assert!(registry.get("0000-0001-5109-3700").unwrap().is_none());
    }

    #[test]
    fn diff_applies_nothing() {
        let dir = TempDir::new().unwrap();
        let registry = SubjectRegistry::new(DurableStore::open(dir.path()).unwrap());
        let remote = OxigraphStore::in_memory(GRAPH).unwrap();
        let snapshots = MemorySnapshotStore::new();
        let profiles = Profiles(HashMap::from([(
            "0000-0001-5109-3700".to_string(),
            profile("Laurel", "A"),
        )]));
        let config = config(1);
        let loader = Loader::new(&config, &profiles, &NoLookup, &remote, &snapshots, &registry);

        let (out, delta) = loader.diff(&Subject::new("0000-0001-5109-3700")).unwrap();
        assert_eq!(delta.additions, out.graph);
        assert!(remote.is_empty().unwrap());
        assert!(snapshots.is_empty());
        assert!(out.graph.iter().any(|f| f.predicate.as_str() == rdfs::LABEL));
    }
}
