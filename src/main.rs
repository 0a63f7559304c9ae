//! orcid-vivo CLI: crosswalk ORCID profiles to VIVO and keep VIVO in sync.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};

use orcid_vivo::config::{Config, PASSWORD_ENV};
use orcid_vivo::crosswalk::ProfileCrosswalker;
use orcid_vivo::error::VivoResult;
use orcid_vivo::fetch::{CrossrefClient, DoiLookup, NoLookup, OrcidClient};
use orcid_vivo::graph::{Graph, GraphDelta};
use orcid_vivo::loader::{Loader, Subject, crosswalk_subject};
use orcid_vivo::source::profile::clean_orcid;
use orcid_vivo::store::{
    DurableStore, RedbSnapshotStore, SnapshotStore, SparqlUpdateStore, SubjectRegistry,
};

/// Timestamp format of `load --before`, in UTC.
const BEFORE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Parser)]
#[command(name = "orcid-vivo", version, about = "ORCID to VIVO crosswalk and loader")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for the subject registry and sync baselines.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// VIVO namespace for minted identifiers.
    #[arg(long, global = true)]
    namespace: Option<String>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// N-Triples.
    Nt,
    /// The fact set as JSON.
    Json,
}

#[derive(clap::Args)]
struct PersonArgs {
    /// Local id used to mint the person's identifier instead of the ORCID iD.
    #[arg(long)]
    person_id: Option<String>,

    /// Identifier for the person, used as is.
    #[arg(long)]
    person_uri: Option<String>,

    /// VIVO class of the person, e.g. FacultyMember. Default is foaf:Person.
    #[arg(long)]
    person_class: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a profile and print its VIVO facts.
    Crosswalk {
        orcid_id: String,

        #[command(flatten)]
        person: PersonArgs,

        /// Leave out the facts declaring the person and their name.
        #[arg(long)]
        skip_person: bool,

        /// The person has proven ownership of the iD.
        #[arg(long)]
        confirmed: bool,

        #[arg(long, value_enum, default_value = "nt")]
        format: Format,

        /// Write to this file instead of stdout.
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Register a subject, or reactivate it with new person details.
    Add {
        orcid_id: String,

        #[command(flatten)]
        person: PersonArgs,
    },

    /// Mark a subject inactive so it is no longer loaded.
    Delete { orcid_id: String },

    /// Mark every subject inactive.
    DeleteAll,

    /// List registered subjects.
    List {
        /// Only active subjects.
        #[arg(long)]
        active: bool,
    },

    /// Crosswalk registered subjects and sync them to VIVO, least recently
    /// loaded first.
    Load {
        /// Load only this subject.
        #[arg(long)]
        orcid_id: Option<String>,

        /// Maximum number of subjects to load.
        #[arg(long)]
        limit: Option<usize>,

        /// Only subjects never loaded or last loaded before this UTC time
        /// (YYYY-MM-DD HH:MM:SS).
        #[arg(long, value_parser = parse_before)]
        before: Option<DateTime<Utc>>,

        #[arg(long)]
        skip_person: bool,

        /// Subjects loaded in parallel.
        #[arg(long)]
        jobs: Option<usize>,

        /// SPARQL Update endpoint, e.g. http://localhost/vivo/api/sparqlUpdate.
        #[arg(long)]
        endpoint: Option<String>,

        /// Email of the VIVO root account.
        #[arg(long)]
        username: Option<String>,

        #[arg(long, env = PASSWORD_ENV, hide_env_values = true)]
        password: Option<String>,
    },

    /// Show what the next load of a subject would delete and add.
    Diff {
        orcid_id: String,

        #[arg(long)]
        skip_person: bool,
    },
}

fn parse_before(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    NaiveDateTime::parse_from_str(value, BEFORE_FORMAT)
        .map(|t| t.and_utc())
        .map_err(|e| format!("expected {BEFORE_FORMAT}: {e}"))
}

fn load_config(cli: &Cli) -> VivoResult<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(namespace) = &cli.namespace {
        config.namespace = namespace.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Baselines and registry share one database.
fn open_stores(config: &Config) -> VivoResult<(RedbSnapshotStore, SubjectRegistry)> {
    let durable = DurableStore::open(&config.data_dir)?;
    Ok((
        RedbSnapshotStore::new(durable.clone()),
        SubjectRegistry::new(durable),
    ))
}

fn open_registry(config: &Config) -> VivoResult<SubjectRegistry> {
    Ok(SubjectRegistry::new(DurableStore::open(&config.data_dir)?))
}

fn lookups(config: &Config) -> Box<dyn DoiLookup> {
    if config.crossref.enabled {
        Box::new(CrossrefClient::new(
            &config.crossref.base_url,
            config.crossref.timeout(),
            config.crossref.retry(),
        ))
    } else {
        Box::new(NoLookup)
    }
}

fn orcid_client(config: &Config) -> OrcidClient {
    OrcidClient::new(
        &config.orcid.base_url,
        config.orcid.timeout(),
        config.orcid.retry(),
    )
}

fn render(graph: &Graph, format: Format) -> Result<String> {
    Ok(match format {
        Format::Nt => graph.to_ntriples()?,
        Format::Json => serde_json::to_string_pretty(graph).into_diagnostic()?,
    })
}

fn write_output(content: &str, file: Option<&Path>) -> Result<()> {
    match file {
        Some(path) => {
            std::fs::write(path, content).into_diagnostic()?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

fn print_delta(delta: &GraphDelta) -> Result<()> {
    for line in delta.deletions.to_ntriples()?.lines() {
        println!("- {line}");
    }
    for line in delta.additions.to_ntriples()?.lines() {
        println!("+ {line}");
    }
    eprintln!(
        "{} to delete, {} to add",
        delta.deletions.len(),
        delta.additions.len()
    );
    Ok(())
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Crosswalk {
            orcid_id,
            person,
            skip_person,
            confirmed,
            format,
            file,
        } => {
            let subject = Subject {
                orcid_id,
                person_uri: person.person_uri,
                person_id: person.person_id,
                person_class: person.person_class,
                skip_person: skip_person || config.skip_person,
                confirmed,
            };
            let out = crosswalk_subject(
                &config,
                &ProfileCrosswalker::default(),
                &orcid_client(&config),
                lookups(&config).as_ref(),
                &subject,
            )?;
            write_output(&render(&out.graph, format)?, file.as_deref())?;
        }

        Commands::Add { orcid_id, person } => {
            let orcid_id = clean_orcid(&orcid_id)?;
            let registry = open_registry(&config)?;
            let record = registry.add(
                &orcid_id,
                person.person_uri,
                person.person_id,
                person.person_class,
            )?;
            println!("Added {record}");
        }

        Commands::Delete { orcid_id } => {
            let orcid_id = clean_orcid(&orcid_id)?;
            let registry = open_registry(&config)?;
            if !registry.deactivate(&orcid_id)? {
                miette::bail!("{orcid_id} is not registered");
            }
            println!("Deleted {orcid_id}");
        }

        Commands::DeleteAll => {
            let registry = open_registry(&config)?;
            let count = registry.deactivate_all()?;
            println!("Deleted {count} subjects");
        }

        Commands::List { active } => {
            let registry = open_registry(&config)?;
            let records = registry.list(active)?;
            if records.is_empty() {
                println!("No subjects registered.");
            }
            for record in records {
                println!("{record}");
            }
        }

        Commands::Load {
            orcid_id,
            limit,
            before,
            skip_person,
            jobs,
            endpoint,
            username,
            password,
        } => {
            let mut config = config;
            if let Some(jobs) = jobs {
                config.loader.workers = jobs;
            }
            let Some(url) = endpoint.or_else(|| config.endpoint.url.clone()) else {
                miette::bail!("no SPARQL Update endpoint; pass --endpoint or set [endpoint] url");
            };
            let Some(username) = username.or_else(|| config.endpoint.username.clone()) else {
                miette::bail!("no VIVO username; pass --username or set [endpoint] username");
            };
            let Some(password) = password.or_else(|| config.endpoint.password()) else {
                miette::bail!("no VIVO password; pass --password or set {PASSWORD_ENV}");
            };
            let remote = SparqlUpdateStore::new(
                url,
                username,
                password,
                config.graph.clone(),
                config.endpoint.timeout(),
            );
            let (snapshots, registry) = open_stores(&config)?;
            let profiles = orcid_client(&config);
            let lookups = lookups(&config);
            let loader = Loader::new(
                &config,
                &profiles,
                lookups.as_ref(),
                &remote,
                &snapshots,
                &registry,
            );
            let skip_person = skip_person || config.skip_person;

            println!("Loading to {}", remote.endpoint());
            match orcid_id {
                Some(orcid_id) => {
                    let orcid_id = clean_orcid(&orcid_id)?;
                    let delta = loader.load_single(&orcid_id, skip_person)?;
                    println!(
                        "Loaded {orcid_id}: {} added, {} deleted",
                        delta.additions.len(),
                        delta.deletions.len()
                    );
                }
                None => {
                    let report = loader.load_batch(limit, before, skip_person)?;
                    for orcid_id in &report.completed {
                        println!("Loaded {orcid_id}");
                    }
                    for (orcid_id, error) in &report.failed {
                        println!("Failed {orcid_id}: {error}");
                    }
                    println!(
                        "{} loaded, {} failed",
                        report.completed.len(),
                        report.failed.len()
                    );
                }
            }
        }

        Commands::Diff {
            orcid_id,
            skip_person,
        } => {
            let orcid_id = clean_orcid(&orcid_id)?;
            let (snapshots, registry) = open_stores(&config)?;
            let subject = match registry.get(&orcid_id)? {
                Some(record) => Subject::from_record(&record, skip_person || config.skip_person),
                None => Subject {
                    skip_person: skip_person || config.skip_person,
                    ..Subject::new(orcid_id.clone())
                },
            };
            let out = crosswalk_subject(
                &config,
                &ProfileCrosswalker::default(),
                &orcid_client(&config),
                lookups(&config).as_ref(),
                &subject,
            )?;
            let baseline = snapshots.load(&out.orcid_id)?.unwrap_or_default();
            print_delta(&GraphDelta::compute(&baseline, &out.graph))?;
        }
    }

    Ok(())
}
