// ── Controller abstraction ──
//
// Lifecycle management for one products API endpoint.
// Handles the initial load, background refresh, command routing,
// and reactive list streaming through the ProductStore.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use finprod_api::transport::{TlsMode, TransportConfig};
use finprod_api::{ProductRecord, ProductUpdateRecord, ProductsClient};

use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::config::{ControllerConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::Product;
use crate::store::ProductStore;
use crate::stream::{ProductSnapshot, ProductStream};

const COMMAND_CHANNEL_SIZE: usize = 64;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Owns the HTTP client and
/// the product cache, runs writes through a command channel, and
/// re-fetches the full list after every successful write.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    store: Arc<ProductStore>,
    connection_state: watch::Sender<ConnectionState>,
    command_tx: mpsc::Sender<CommandEnvelope>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    client: Mutex<Option<Arc<ProductsClient>>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a new Controller from configuration. Does NOT connect --
    /// call [`connect()`](Self::connect) to load the list and start background tasks.
    pub fn new(config: ControllerConfig) -> Self {
        let store = Arc::new(ProductStore::new());
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);

        Self {
            inner: Arc::new(ControllerInner {
                config,
                store,
                connection_state,
                command_tx,
                command_rx: Mutex::new(Some(command_rx)),
                cancel: CancellationToken::new(),
                client: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the controller configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Connect to the products API.
    ///
    /// Builds the HTTP client, performs the initial list fetch, and spawns
    /// background tasks (command processor, optional periodic refresh).
    /// Safe to call again after a failure; a no-op once connected.
    pub async fn connect(&self) -> Result<(), CoreError> {
        if *self.inner.connection_state.borrow() == ConnectionState::Connected {
            return Ok(());
        }
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::ControllerDisconnected);
        }
        self.inner
            .connection_state
            .send_replace(ConnectionState::Connecting);

        if let Err(e) = self.establish().await {
            self.inner.connection_state.send_replace(ConnectionState::Failed);
            warn!(error = %e, url = %self.inner.config.base_url, "connect failed");
            return Err(e);
        }

        // Spawn background tasks
        let mut handles = self.inner.task_handles.lock().await;

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let ctrl = self.clone();
            handles.push(tokio::spawn(command_processor_task(ctrl, rx)));
        }

        let interval_secs = self.inner.config.refresh_interval_secs;
        if interval_secs > 0 {
            let ctrl = self.clone();
            let cancel = self.inner.cancel.clone();
            handles.push(tokio::spawn(refresh_task(ctrl, interval_secs, cancel)));
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Connected);
        info!(url = %self.inner.config.base_url, products = self.inner.store.len(), "connected");
        Ok(())
    }

    async fn establish(&self) -> Result<(), CoreError> {
        let config = &self.inner.config;
        let client = ProductsClient::new(config.base_url.as_str(), &build_transport(config))?;
        *self.inner.client.lock().await = Some(Arc::new(client));

        // Initial data load
        self.full_refresh().await?;
        Ok(())
    }

    /// Disconnect: cancel background tasks and drop the HTTP client.
    pub async fn disconnect(&self) {
        self.inner.cancel.cancel();

        // Join all background tasks
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        *self.inner.client.lock().await = None;
        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    /// Fetch the product list and replace the cache with it.
    /// Returns the number of products fetched.
    pub async fn full_refresh(&self) -> Result<usize, CoreError> {
        let client = self.client().await?;
        let products: Vec<Product> = client
            .list_products()
            .await?
            .into_iter()
            .map(Product::from)
            .collect();
        let count = products.len();

        // Full replace, last write wins.
        self.inner.store.replace(products);
        debug!(products = count, "data refresh complete");
        Ok(count)
    }

    async fn client(&self) -> Result<Arc<ProductsClient>, CoreError> {
        self.inner
            .client
            .lock()
            .await
            .clone()
            .ok_or(CoreError::ControllerDisconnected)
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command against the products API.
    ///
    /// Sends the command through the internal channel to the command
    /// processor task and awaits the result.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::ControllerDisconnected);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();

        self.inner
            .command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::ControllerDisconnected)?;

        rx.await.map_err(|_| CoreError::ControllerDisconnected)?
    }

    /// Ask the backend whether `id` is already taken.
    ///
    /// Reads bypass the command channel; only a built client is needed.
    pub async fn verify_id(&self, id: &str) -> Result<bool, CoreError> {
        let client = self.client().await?;
        Ok(client.verify_product_id(id).await?)
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: connect, run closure, disconnect.
    ///
    /// Periodic refresh is disabled since the CLI only needs a single
    /// request-response cycle.
    pub async fn oneshot<F, Fut, T>(config: ControllerConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.refresh_interval_secs = 0;

        let controller = Controller::new(cfg);
        controller.connect().await?;
        let result = f(controller.clone()).await;
        controller.disconnect().await;
        result
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    // ── Cache reads ──────────────────────────────────────────────

    /// The last fetched list.
    pub fn products(&self) -> ProductSnapshot {
        self.inner.store.snapshot()
    }

    /// Look up a product in the last fetched list. No network call.
    pub fn product(&self, id: &str) -> Option<Arc<Product>> {
        self.inner.store.get(id)
    }

    /// Filter the last fetched list. No network call.
    pub fn search(&self, term: &str) -> Vec<Arc<Product>> {
        self.inner.store.search(term)
    }

    /// Subscribe to list replacements.
    pub fn subscribe(&self) -> ProductStream {
        self.inner.store.subscribe()
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically re-fetch the product list.
async fn refresh_task(controller: Controller, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = controller.full_refresh().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}

/// Process commands from the mpsc channel one at a time.
async fn command_processor_task(controller: Controller, mut rx: mpsc::Receiver<CommandEnvelope>) {
    let cancel = controller.inner.cancel.clone();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&controller, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

/// Run a command, then re-fetch the list.
///
/// A failed re-fetch is logged and does not fail the command: the write
/// already happened on the server.
async fn route_command(controller: &Controller, cmd: Command) -> Result<CommandResult, CoreError> {
    let client = controller.client().await?;

    let result = match cmd {
        Command::CreateProduct(draft) => {
            let created = client.create_product(&ProductRecord::from(&draft)).await?;
            info!(id = %created.id, "product created");
            CommandResult::Product(created.into())
        }

        Command::UpdateProduct { id, changes } => {
            let updated = client
                .update_product(&id, &ProductUpdateRecord::from(&changes))
                .await?;
            info!(%id, "product updated");
            CommandResult::Product(updated.into())
        }

        Command::DeleteProduct { id } => {
            let message = client.delete_product(&id).await?;
            info!(%id, "product deleted");
            CommandResult::Deleted { id, message }
        }

        Command::Refresh => {
            let count = controller.full_refresh().await?;
            return Ok(CommandResult::Refreshed { count });
        }
    };

    if let Err(e) = controller.full_refresh().await {
        warn!(error = %e, "refresh after write failed");
    }
    Ok(result)
}

// ── Helpers ──────────────────────────────────────────────────────

/// Build a [`TransportConfig`] from the controller configuration.
fn build_transport(config: &ControllerConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
