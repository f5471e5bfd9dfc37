//! Test server harness for E2E testing
//!
//! Provides `TestTokenServer` for spawning real Token Service instances in tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use token_service::config::{Config, APP_CERTIFICATE_VAR, APP_ID_VAR};
use token_service::observability::metrics::init_metrics_recorder;
use token_service::routes::{self, AppState};
use tokio::task::JoinHandle;

/// App ID configured on servers started with [`TestTokenServer::spawn`].
pub const TEST_APP_ID: &str = "970CA35de60c44645bbae8a215061b33";

/// App certificate configured on servers started with [`TestTokenServer::spawn`].
pub const TEST_APP_CERTIFICATE: &str = "5CFd2fd1755d40ecb72977518be15d3b";

/// Test harness for spawning the Token Service in E2E tests.
///
/// # Example
/// ```rust,ignore
/// let server = TestTokenServer::spawn().await?;
/// let response = reqwest::get(format!("{}/health", server.url())).await?;
/// assert_eq!(response.status(), 200);
/// ```
pub struct TestTokenServer {
    addr: SocketAddr,
    config: Config,
    _handle: JoinHandle<()>,
}

impl TestTokenServer {
    /// Spawn a server with the test signing credentials configured.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_vars(HashMap::from([
            (APP_ID_VAR.to_string(), TEST_APP_ID.to_string()),
            (APP_CERTIFICATE_VAR.to_string(), TEST_APP_CERTIFICATE.to_string()),
        ]))
        .await
    }

    /// Spawn a server with no signing credentials.
    pub async fn spawn_unconfigured() -> Result<Self, anyhow::Error> {
        Self::spawn_with_vars(HashMap::new()).await
    }

    /// Spawn a server with an explicit environment.
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Start the HTTP server in the background
    pub async fn spawn_with_vars(mut vars: HashMap<String, String>) -> Result<Self, anyhow::Error> {
        vars.insert("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string());

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        // The global recorder can only be installed once per process; later
        // servers get a standalone recorder.
        let metrics_handle = match init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => {
                use metrics_exporter_prometheus::PrometheusBuilder;
                PrometheusBuilder::new().build_recorder().handle()
            }
        };

        let state = Arc::new(AppState {
            config: config.clone(),
        });
        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            config,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for TestTokenServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
