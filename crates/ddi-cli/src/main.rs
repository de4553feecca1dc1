mod render;

use std::io::{self, BufRead, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ddi_core::db::{DatasetError, DatasetResult};
use ddi_core::profile::prepare_for_save;
use ddi_core::{
    AppConfig, CachingResolver, Database, FileProfileStore, ImportOutcome, InteractionLookup,
    ProfileStore, PubChemResolver, SavedProfile,
};
use ddi_llm::{ChatSession, DrugBriefer, GeminiClient, Summarizer, TextGenerator};
use ddi_video::{
    AnimationPayload, AnimationRequester, AppState, HttpObjectStore, LocalObjectStore,
    ManimRenderer, MoleculeImageFetcher, ObjectStore, VideoPipeline,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ddi", version, about = "Drug-drug interaction checker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(long, default_value = "info", global = true, env = "RUST_LOG")]
    log_level: String,
    /// Interaction database path (overrides DDI_DATABASE_PATH)
    #[arg(long, global = true)]
    database: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check two drugs for a known interaction
    Check {
        drug1: String,
        drug2: String,
        /// Show the raw side effects instead of a generated summary
        #[arg(long)]
        no_summary: bool,
        /// Request an animation of the interaction
        #[arg(long)]
        animate: bool,
    },
    /// Manage the saved medication profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
    /// Load the interaction dataset if the store is empty
    Import {
        #[arg(long)]
        dataset: Option<PathBuf>,
    },
    /// Short facts about one drug
    Brief { drug: String },
    /// Ask the assistant about drug pairs, keeping the conversation
    Chat,
    /// Run the video generation service
    ServeVideo {
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Replace the saved profile
    Save {
        #[arg(long, num_args = 1.., required = true)]
        medications: Vec<String>,
        #[arg(long, num_args = 0..)]
        allergies: Vec<String>,
    },
    /// Print the saved profile
    Show,
    /// Check a drug against every saved medication
    Check { drug: String },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(database) = cli.database {
        config.store.database_path = database;
    }

    match cli.command {
        Commands::Check {
            drug1,
            drug2,
            no_summary,
            animate,
        } => check(&config, &drug1, &drug2, !no_summary, animate),
        Commands::Profile { command } => profile(&config, command),
        Commands::Import { dataset } => {
            let dataset = dataset.unwrap_or_else(|| config.store.dataset_path.clone());
            let mut db = open_store(&config)?;
            match db.populate_if_empty(&dataset)? {
                ImportOutcome::AlreadyPopulated { existing } => {
                    println!("Store already holds {} interactions; nothing imported", existing)
                }
                ImportOutcome::Imported { inserted, skipped } => {
                    println!("Imported {} interactions ({} rows skipped)", inserted, skipped)
                }
            }
            Ok(())
        }
        Commands::Brief { drug } => {
            let briefer = DrugBriefer::new(gemini(&config)?);
            println!("{}", briefer.brief(&drug));
            Ok(())
        }
        Commands::Chat => chat(&config),
        Commands::ServeVideo { port } => serve_video(&config, port),
    }
}

fn open_store(config: &AppConfig) -> Result<Database> {
    Database::open(&config.store.database_path).with_context(|| {
        format!(
            "interaction store unavailable at {}",
            config.store.database_path.display()
        )
    })
}

/// Open the store, loading the dataset on first use.
fn open_populated_store(config: &AppConfig) -> Result<Database> {
    let mut db = open_store(config)?;
    tolerate_dataset_error(db.populate_if_empty(&config.store.dataset_path))?;
    Ok(db)
}

/// Lookups keep working on an empty store; only a failing store is fatal.
fn tolerate_dataset_error(result: DatasetResult<ImportOutcome>) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(DatasetError::Database(e)) => Err(e).context("failed to load interaction dataset"),
        Err(e) => {
            warn!(error = %e, "interaction dataset not loaded; store is empty");
            Ok(())
        }
    }
}

fn resolver(config: &AppConfig) -> Result<CachingResolver<PubChemResolver>> {
    let pubchem = PubChemResolver::new(&config.pubchem.base_url, config.pubchem.timeout)
        .context("invalid PubChem endpoint")?;
    Ok(CachingResolver::new(pubchem))
}

fn gemini(config: &AppConfig) -> Result<GeminiClient> {
    if config.gemini.api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; generated text is unavailable");
    }
    GeminiClient::new(
        &config.gemini.base_url,
        config.gemini.model.clone(),
        config.gemini.api_key.clone(),
        config.gemini.timeout,
    )
    .context("invalid Gemini endpoint")
}

fn check(config: &AppConfig, drug1: &str, drug2: &str, summarize: bool, animate: bool) -> Result<()> {
    let db = open_populated_store(config)?;
    let resolver = resolver(config)?;
    let lookup = InteractionLookup::new(&resolver, &db);

    let mut result = lookup.lookup(drug1, drug2)?;

    if summarize {
        if let Some(raw) = result.side_effects_raw.clone() {
            let summarizer = Summarizer::new(gemini(config)?);
            result = result.with_summary(summarizer.summarize(&raw));
        }
    }

    print!("{}", render::interaction_panel(&result));

    if animate {
        if !result.found {
            println!("Animation unavailable: no interaction to animate");
            return Ok(());
        }
        let payload = AnimationPayload::new(
            result.drug_a.name.clone(),
            result.drug_b.name.clone(),
            result.drug_a.canonical_id.clone().unwrap_or_default(),
            result.drug_b.canonical_id.clone().unwrap_or_default(),
            result.side_effects_raw.clone().unwrap_or_default(),
        );
        let outcome = AnimationRequester::new(&config.animation.endpoint, config.animation.timeout)
            .and_then(|requester| requester.request_animation(&payload));
        println!("{}", render::animation_line(&outcome));
    }

    Ok(())
}

fn profile(config: &AppConfig, command: ProfileCommand) -> Result<()> {
    let store = FileProfileStore::new(&config.profile_path);

    match command {
        ProfileCommand::Save {
            medications,
            allergies,
        } => {
            let profile = prepare_for_save(SavedProfile::new(medications, allergies))?;
            store.save(&profile)?;
            println!(
                "Saved {} medications and {} allergies",
                profile.medications.len(),
                profile.allergies.len()
            );
        }
        ProfileCommand::Show => match store.load()? {
            Some(profile) => print!("{}", render::profile_panel(&profile)),
            None => println!("No saved profile"),
        },
        ProfileCommand::Check { drug } => {
            let Some(profile) = store.load()? else {
                bail!("no saved profile at {}", config.profile_path.display());
            };
            let db = open_populated_store(config)?;
            let resolver = resolver(config)?;
            let lookup = InteractionLookup::new(&resolver, &db);

            let checks = lookup.lookup_against_profile(&drug, &profile.medications)?;
            print!("{}", render::profile_checks(&drug, &checks));
        }
    }
    Ok(())
}

fn chat(config: &AppConfig) -> Result<()> {
    let mut session = ChatSession::new(gemini(config)?);
    println!("Enter two drug names to check their interaction (\"quit\" to leave).");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let line = line?;
        match line.trim() {
            "" => continue,
            "quit" | "exit" => break,
            input => match session.send(input) {
                Ok(reply) => println!("{}\n", reply),
                Err(e) => println!("Error: {}\n", e),
            },
        }
    }
    Ok(())
}

fn serve_video(config: &AppConfig, port: Option<u16>) -> Result<()> {
    let video = &config.video;
    let port = port.unwrap_or(video.port);

    // Blocking HTTP clients are built before the runtime starts
    let images = MoleculeImageFetcher::new(&config.pubchem.base_url, config.pubchem.timeout)?;
    let generator: Box<dyn TextGenerator> = Box::new(gemini(config)?);
    let store: Box<dyn ObjectStore> = match &video.object_store_url {
        Some(url) => Box::new(HttpObjectStore::new(
            url,
            video.object_store_token.clone(),
            config.animation.timeout,
        )?),
        None => Box::new(LocalObjectStore::new(&video.store_dir, &video.public_url)),
    };
    let pipeline = Arc::new(VideoPipeline::new(
        Box::new(images),
        generator,
        Box::new(ManimRenderer::new(
            video.manim_bin.clone(),
            video.render_timeout,
        )),
        store,
        &video.work_dir,
    ));

    let mut state = AppState::new(pipeline.clone(), video.respond_within);
    if video.object_store_url.is_none() {
        std::fs::create_dir_all(&video.store_dir)
            .with_context(|| format!("cannot create {}", video.store_dir.display()))?;
        state = state.with_videos_dir(&video.store_dir);
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, work_dir = %video.work_dir.display(), "starting video service");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(ddi_video::serve(addr, state))?;
    drop(runtime);

    // The last pipeline handle is released outside the runtime
    drop(pipeline);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddi_core::db::DbError;

    #[test]
    fn test_unreadable_dataset_is_not_fatal() {
        let failures = vec![
            DatasetError::NotFound("dataset/twosides.csv".into()),
            DatasetError::Malformed {
                line: 3,
                reason: "unterminated quoted field".into(),
            },
            DatasetError::MissingColumn("X2".into()),
            DatasetError::Io(io::Error::new(io::ErrorKind::InvalidData, "not UTF-8")),
        ];
        for failure in failures {
            assert!(tolerate_dataset_error(Err(failure)).is_ok());
        }
    }

    #[test]
    fn test_store_failure_is_fatal() {
        let result = tolerate_dataset_error(Err(DatasetError::Database(DbError::Unavailable(
            "disk I/O error".into(),
        ))));
        assert!(result.is_err());
    }

    #[test]
    fn test_import_outcome_passes() {
        assert!(tolerate_dataset_error(Ok(ImportOutcome::AlreadyPopulated { existing: 4 })).is_ok());
    }
}
