//! scenic-gr - Scene-to-Genre Resolution microservice
//!
//! **Module Identity:**
//! - Name: scenic-gr (Genre Resolver)
//! - Port: 5750
//!
//! Turns genre names and scene descriptions ("late night coding", "雨天的咖啡馆")
//! into ranked genres from the taxonomy under `<root>/genres`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scenic_common::config::{get_user_agent, load_toml_or_default, locate_config_file, RootFolderResolver};
use scenic_gr::cache::ResponseCache;
use scenic_gr::completion::{CompletionService, DisabledCompletion, OpenAiCompatClient};
use scenic_gr::config::{resolve_completion_api_key, ServiceConfig};
use scenic_gr::semantic::SemanticResolver;
use scenic_gr::taxonomy::{JsonDirSource, TaxonomyStore};
use scenic_gr::{AppState, GenreResolver};

/// Command-line arguments for scenic-gr
#[derive(Parser, Debug)]
#[command(name = "scenic-gr")]
#[command(about = "Scene-to-genre resolution microservice")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "SCENIC_CONFIG")]
    config: Option<PathBuf>,

    /// Root folder (taxonomy lives in <root>/genres unless overridden)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Taxonomy directory containing main/ and detailed/
    #[arg(short, long, env = "SCENIC_TAXONOMY_DIR")]
    taxonomy_dir: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "SCENIC_GR_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long, env = "SCENIC_GR_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config comes first so the log level can be taken from it
    let config_path = locate_config_file(args.config.as_deref(), "scenic-gr");
    let config: ServiceConfig = load_toml_or_default(config_path.as_deref())
        .context("Failed to load scenic-gr configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("scenic_gr={0},scenic_common={0},tower_http=info", config.logging.level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting scenic-gr (Genre Resolver) microservice");
    info!(
        "Version: {} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) => info!("Config: {}", path.display()),
        None => warn!("No config file found, using defaults"),
    }

    // Root folder: CLI > env > TOML > OS default
    let root_folder = RootFolderResolver::new("scenic-gr")
        .with_cli_override(args.root_folder.clone())
        .with_toml_value(config.root_folder.clone())
        .resolve();
    let taxonomy_dir = args
        .taxonomy_dir
        .clone()
        .unwrap_or_else(|| config.taxonomy_dir_for(&root_folder));
    info!("Taxonomy: {}", taxonomy_dir.display());

    let completion: Arc<dyn CompletionService> = match resolve_completion_api_key(&config.completion) {
        Some(api_key) => {
            let client = OpenAiCompatClient::new(config.completion.client_config(api_key), &get_user_agent())
                .context("Failed to build completion client")?;
            info!("Completion service: {} at {}", config.completion.model, client.endpoint());
            Arc::new(client)
        }
        None => Arc::new(DisabledCompletion),
    };

    let store = TaxonomyStore::new(Arc::new(JsonDirSource::new(&taxonomy_dir)));
    // A failed load is retried on first use, so startup continues
    if let Err(e) = store.initialize().await {
        warn!("Taxonomy not loaded at startup: {}", e);
    }

    let resolver = GenreResolver::new(
        store,
        ResponseCache::new(config.cache.ttl(), config.cache.capacity),
        SemanticResolver::new(completion, config.completion.timeout()),
    )
    .with_max_limit(config.search.max_limit);

    let default_limit = config.search.default_limit.clamp(1, resolver.max_limit());
    let resolver = Arc::new(resolver);

    let state = AppState::new(resolver, default_limit);
    let app = scenic_gr::build_router(state);

    let bind = args.bind.unwrap_or(config.bind_address);
    let port = args.port.unwrap_or(config.port);
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
