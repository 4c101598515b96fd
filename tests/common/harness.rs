//! Test server harness.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use lostfound::embedding::{ClipConfig, ClipEmbedder};
use lostfound::gateway::{HandlerState, create_router_with_state};
use lostfound::lifecycle::MatchLifecycle;
use lostfound::matching::{MatchEngine, MatchThreshold};
use lostfound::scoring::SimilarityScorer;
use lostfound::service::{LostFoundService, ServiceSettings};
use lostfound::storage::MemoryStore;
use lostfound::{DEFAULT_REWARD_COINS, SNAPSHOT_FILENAME};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

/// Photos written into the upload directory of every test server.
pub const TEST_UPLOADS: [(&str, &[u8]); 3] = [
    ("umbrella.jpg", b"blue umbrella pixels"),
    ("wallet.jpg", b"brown wallet pixels"),
    ("keys.jpg", b"key ring pixels"),
];

#[derive(Debug, Clone)]
pub struct TestServerConfig {
    pub port: u16,
    /// Snapshot directory; a fresh temp dir when `None`.
    pub storage_path: Option<PathBuf>,
    pub reward_coins: u64,
    pub admin_username: Option<String>,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            port: 0,
            storage_path: None,
            reward_coins: DEFAULT_REWARD_COINS,
            admin_username: None,
        }
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub upload_dir: PathBuf,
    pub storage_path: PathBuf,
    server_handle: Option<JoinHandle<()>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    _upload_temp: TempDir,
    _storage_temp: Option<TempDir>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn snapshot_file(&self) -> PathBuf {
        self.storage_path.join(SNAPSHOT_FILENAME)
    }

    /// Stops the server and waits for the serve loop to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.server_handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn find_available_port() -> std::io::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    Ok(addr.port())
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

fn write_uploads(dir: &Path) -> std::io::Result<()> {
    for (name, bytes) in TEST_UPLOADS {
        std::fs::write(dir.join(name), bytes)?;
    }
    Ok(())
}

/// Spawns a server backed by a snapshot-persisted `MemoryStore` and the stub
/// CLIP embedder. Identical titles and photos embed identically, so a lost and
/// found report of the same thing always match.
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let port = if config.port == 0 {
        find_available_port().await?
    } else {
        config.port
    };

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    let (storage_path, _storage_temp) = if let Some(path) = config.storage_path {
        (path, None)
    } else {
        let temp_dir =
            TempDir::new().map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
        (temp_dir.path().to_path_buf(), Some(temp_dir))
    };

    let upload_temp = TempDir::new()?;
    write_uploads(upload_temp.path())?;

    let store = MemoryStore::open(storage_path.join(SNAPSHOT_FILENAME))
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    let embedder = ClipEmbedder::load(ClipConfig::stub())
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;

    let service = Arc::new(LostFoundService::new(
        Arc::new(store),
        Arc::new(embedder),
        MatchEngine::new(SimilarityScorer::default(), true),
        MatchLifecycle::new(config.reward_coins),
        ServiceSettings {
            report_threshold: MatchThreshold::REPORT,
            upload_dir: upload_temp.path().to_path_buf(),
        },
    ));

    if let Some(username) = &config.admin_username {
        service
            .ensure_admin(username)
            .await
            .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    }

    let app = create_router_with_state(HandlerState::new(service));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        upload_dir: upload_temp.path().to_path_buf(),
        storage_path,
        server_handle: Some(server_handle),
        shutdown_tx: Some(shutdown_tx),
        _upload_temp: upload_temp,
        _storage_temp,
    })
}
