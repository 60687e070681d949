use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trigger_archiver_core::{
    create_storage_sink, load_config, validate_config, ArchiveOrchestrator, ClientRegistry,
    CredentialStore, HttpTriggerClient, OAuthTokenIssuer, SanitizedConfig, SqliteRegistry,
    StorageSink, TokenIssuer, TriggerClient,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("trigger-archiver v{}", VERSION);

    // CLI argument wins over ARCHIVER_CONFIG
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var("ARCHIVER_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = SanitizedConfig::from(&config);
    info!(
        "Configuration loaded: {}",
        serde_json::to_string(&sanitized).unwrap_or_default()
    );

    // One read-only connection serves both the client list and credentials
    let registry = Arc::new(
        SqliteRegistry::open(&config.database.path, config.database.clients_query.clone())
            .context("Failed to open client registry")?,
    );
    info!("Client registry opened at {:?}", config.database.path);

    let clients: Arc<dyn ClientRegistry> = registry.clone();
    let credentials: Arc<dyn CredentialStore> = registry;

    let token_issuer: Arc<dyn TokenIssuer> =
        Arc::new(OAuthTokenIssuer::new(credentials, config.token.clone()));
    info!("Using token issuer: {}", token_issuer.name());
    let trigger_client: Arc<dyn TriggerClient> =
        Arc::new(HttpTriggerClient::new(config.trigger.clone()));

    let storage: Arc<dyn StorageSink> = Arc::from(
        create_storage_sink(&config.storage).context("Failed to create storage sink")?,
    );
    info!("Using storage sink: {}", storage.name());

    let orchestrator = ArchiveOrchestrator::new(
        config.archive.clone(),
        clients,
        token_issuer,
        trigger_client,
        storage,
    );

    let summary = orchestrator
        .run_archive()
        .await
        .context("Archive run failed")?;

    info!(
        "Run summary: {}",
        serde_json::to_string(&summary).unwrap_or_default()
    );

    if !summary.is_success() {
        let failed: Vec<i64> = summary.failed.iter().map(|f| f.client_id).collect();
        bail!(
            "{} of {} clients failed: {:?}",
            failed.len(),
            failed.len() + summary.archived.len(),
            failed
        );
    }

    Ok(())
}
