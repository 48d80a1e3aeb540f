mod cli;
mod shell;

use mentor_ai::{persona, ConversationCapability, GeminiClient, GeminiConfig, GeminiConversation};
use mentor_common::MentorError;
use mentor_config::{AiConfig, MentorConfig, StorageConfig};
use mentor_store::{FileKeyValueStore, MemoryKeyValueStore, SessionRepository, SessionStore};
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::EnvFilter;

/// Load environment variables from a .env file (KEY=VALUE lines).
///
/// Variables already set in the environment win.
fn load_dotenv() {
    let Ok(contents) = std::fs::read_to_string(".env") else {
        return;
    };
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if std::env::var(key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }
}

fn init_logging(directive: &str) {
    let directive: Directive = directive.parse().unwrap_or_else(|e| {
        eprintln!("Invalid log directive {directive:?} ({e}), using info");
        LevelFilter::INFO.into()
    });
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .init();
}

fn open_repository(ephemeral: bool, storage: &StorageConfig) -> Result<SessionRepository, MentorError> {
    if ephemeral {
        tracing::info!("Using in-memory session storage");
        return Ok(SessionRepository::new(MemoryKeyValueStore::new(), &storage.key));
    }

    let dir = match &storage.data_dir {
        Some(dir) => dir.clone(),
        None => mentor_config::toml_loader::data_dir()?,
    };
    tracing::info!("Session storage: {}", dir.display());
    Ok(SessionRepository::new(FileKeyValueStore::new(dir), &storage.key))
}

fn build_capability(ai: &AiConfig) -> Result<Box<dyn ConversationCapability>, MentorError> {
    let config = GeminiConfig::from_env().unwrap_or_else(|e| {
        tracing::warn!("Gemini API not configured: {e}");
        GeminiConfig::new("")
    });
    let config = config
        .with_model(&ai.model)
        .with_temperature(ai.temperature)
        .with_max_tokens(ai.max_tokens);
    tracing::info!(model = %config.model, "Gemini capability ready");

    let client = GeminiClient::new(config)?;
    Ok(Box::new(GeminiConversation::new(client)))
}

async fn run(args: cli::Args, config: MentorConfig) -> Result<(), MentorError> {
    let repository = open_repository(args.ephemeral, &config.storage)?;
    let capability = build_capability(&config.ai)?;
    let store = SessionStore::open(repository, capability, persona::SYSTEM_INSTRUCTION);

    shell::Shell::new(store).run().await
}

fn main() {
    // Load .env file before anything else
    load_dotenv();

    let args = cli::parse();

    // Config is loaded before logging so its level can apply; a load
    // failure is reported once logging is up.
    let (config, config_error) = match mentor_config::load_config(args.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => (MentorConfig::default(), Some(e)),
    };

    let directive = args
        .log_level
        .as_deref()
        .unwrap_or_else(|| config.logging.level.as_directive());
    init_logging(directive);

    tracing::info!("Mentor v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(e) = config_error {
        tracing::warn!("Config load failed, using defaults: {e}");
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(args, config)) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
    tracing::info!("Shutdown complete");
}
