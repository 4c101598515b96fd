//! Lostfound HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use lostfound::config::Config;
use lostfound::embedding::{ClipConfig, ClipEmbedder};
use lostfound::gateway::{HandlerState, create_router_with_state};
use lostfound::lifecycle::MatchLifecycle;
use lostfound::matching::MatchEngine;
use lostfound::scoring::SimilarityScorer;
use lostfound::service::{LostFoundService, ServiceSettings};
use lostfound::storage::MemoryStore;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!(
        r#"
██╗      ██████╗ ███████╗████████╗███████╗ ██████╗ ██╗   ██╗███╗   ██╗██████╗
██║     ██╔═══██╗██╔════╝╚══██╔══╝██╔════╝██╔═══██╗██║   ██║████╗  ██║██╔══██╗
██║     ██║   ██║███████╗   ██║   █████╗  ██║   ██║██║   ██║██╔██╗ ██║██║  ██║
██║     ██║   ██║╚════██║   ██║   ██╔══╝  ██║   ██║██║   ██║██║╚██╗██║██║  ██║
███████╗╚██████╔╝███████║   ██║   ██║     ╚██████╔╝╚██████╔╝██║ ╚████║██████╔╝
╚══════╝ ╚═════╝ ╚══════╝   ╚═╝   ╚═╝      ╚═════╝  ╚═════╝ ╚═╝  ╚═══╝╚═════╝

        REPORT. MATCH. RETURN.
                                        AGPL-3.0
"#
    );

    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        storage_path = %config.storage_path.display(),
        upload_dir = %config.upload_dir.display(),
        "Lostfound starting"
    );

    let store = Arc::new(MemoryStore::open(config.snapshot_path())?);

    let clip_config = if let Some(path) = &config.model_path {
        ClipConfig::new(path.clone()).with_embedding_dim(config.embedding_dim)
    } else {
        tracing::warn!("No LOSTFOUND_MODEL_PATH configured, running embedder in stub mode");
        ClipConfig::stub().with_embedding_dim(config.embedding_dim)
    };
    let embedder = Arc::new(ClipEmbedder::load(clip_config)?);

    let engine = MatchEngine::new(
        SimilarityScorer::new(config.scoring_weights()?),
        config.dedupe_matches,
    );
    let lifecycle = MatchLifecycle::new(config.reward_coins);
    let settings = ServiceSettings {
        report_threshold: config.match_threshold()?,
        upload_dir: config.upload_dir.clone(),
    };

    let service = Arc::new(LostFoundService::new(
        store, embedder, engine, lifecycle, settings,
    ));

    if let Some(username) = &config.admin_username {
        let admin = service.ensure_admin(username).await?;
        tracing::info!(user = %admin.id, username = %admin.username, "Administrator available");
    }

    let app = create_router_with_state(HandlerState::new(service));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Lostfound shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("LOSTFOUND_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime");

    rt.block_on(async {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
            .expect("failed to build client");

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
