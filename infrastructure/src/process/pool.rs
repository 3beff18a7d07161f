//! Supervision of every configured provider process.
//!
//! [`ProcessPool`] owns one [`ProcessConnection`] per configured name, starts
//! them concurrently, and publishes their discovered tools into a shared
//! [`ToolRegistry`] as [`BridgedTool`]s. A provider that fails to start only
//! affects its own tools.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use zia_domain::Tool;

use super::bridge::BridgedTool;
use super::connection::{ConnectionState, ProcessConnection};
use super::error::{ProcessError, Result};
use crate::config::{ProcessConfig, ServersFile};
use crate::tools::ToolRegistry;

/// Snapshot of one provider for status displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderStatus {
    pub name: String,
    pub state: ConnectionState,
    pub tool_count: usize,
}

type Connections = Arc<RwLock<BTreeMap<String, Arc<ProcessConnection>>>>;

/// Owns and supervises the provider processes.
pub struct ProcessPool {
    config_path: Option<PathBuf>,
    request_timeout: Option<Duration>,
    configs: RwLock<BTreeMap<String, ProcessConfig>>,
    connections: Connections,
    registry: RwLock<Option<Arc<ToolRegistry>>>,
    /// Tools this pool registered, per provider
    published: RwLock<HashMap<String, Vec<Arc<dyn Tool>>>>,
    status_tx: Arc<watch::Sender<Vec<ProviderStatus>>>,
    /// One task per connection forwarding its state changes to `status_tx`
    watchers: Mutex<Vec<JoinHandle<()>>>,
}

impl ProcessPool {
    pub fn new(configs: BTreeMap<String, ProcessConfig>) -> Self {
        let (status_tx, _) = watch::channel(Vec::new());
        Self {
            config_path: None,
            request_timeout: None,
            configs: RwLock::new(configs),
            connections: Arc::new(RwLock::new(BTreeMap::new())),
            registry: RwLock::new(None),
            published: RwLock::new(HashMap::new()),
            status_tx: Arc::new(status_tx),
            watchers: Mutex::new(Vec::new()),
        }
    }

    /// Load the provider file; a missing file gives an empty pool that
    /// [`reload`](Self::reload) can later fill.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = load_servers(&path)?;
        let mut pool = Self::new(file.servers);
        pool.config_path = Some(path);
        Ok(pool)
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn configured_names(&self) -> Vec<String> {
        read(&self.configs).keys().cloned().collect()
    }

    pub fn connection(&self, name: &str) -> Option<Arc<ProcessConnection>> {
        read(&self.connections).get(name).cloned()
    }

    pub fn connections(&self) -> Vec<Arc<ProcessConnection>> {
        read(&self.connections).values().cloned().collect()
    }

    /// Current state of every provider, sorted by name.
    pub fn status(&self) -> Vec<ProviderStatus> {
        snapshot(&self.connections)
    }

    /// Status updates, published on every provider state transition,
    /// including a provider exiting long after it connected.
    pub fn subscribe(&self) -> watch::Receiver<Vec<ProviderStatus>> {
        self.status_tx.subscribe()
    }

    /// Connect every configured provider concurrently.
    ///
    /// Individual failures are logged and reflected in [`status`](Self::status);
    /// they never prevent the other providers from starting.
    pub async fn start_all(&self) -> Vec<ProviderStatus> {
        let targets: Vec<Arc<ProcessConnection>> = {
            let configs = read(&self.configs);
            let mut connections = write(&self.connections);
            let mut watchers = self.watchers.lock().unwrap_or_else(|e| e.into_inner());
            for (name, config) in configs.iter() {
                connections.entry(name.clone()).or_insert_with(|| {
                    let conn = Arc::new(
                        ProcessConnection::new(name.clone(), config.clone())
                            .with_request_timeout(self.request_timeout),
                    );
                    watchers.push(self.watch_connection(&conn));
                    conn
                });
            }
            connections.values().cloned().collect()
        };

        if targets.is_empty() {
            debug!("No provider processes configured");
            return Vec::new();
        }

        let results = join_all(targets.iter().map(|conn| conn.connect())).await;
        let connected = results.iter().filter(|r| r.is_ok()).count();
        info!(
            connected,
            failed = results.len() - connected,
            "Provider processes started"
        );

        self.publish_tools();
        self.publish_status();
        self.status()
    }

    /// Disconnect and reconnect one provider with its last-known configuration.
    pub async fn restart(&self, name: &str) -> Result<()> {
        let conn = self
            .connection(name)
            .ok_or_else(|| ProcessError::NotConfigured(name.to_string()))?;

        conn.disconnect().await?;
        self.withdraw_tools(name);
        self.publish_status();

        let outcome = conn.connect().await;
        self.publish_tools();
        self.publish_status();
        outcome
    }

    /// Disconnect every provider and withdraw their tools.
    pub async fn stop_all(&self) {
        let targets = self.connections();
        for conn in &targets {
            if let Err(e) = conn.disconnect().await {
                warn!(server = %conn.name(), error = %e, "Failed to stop provider");
            }
            self.withdraw_tools(conn.name());
        }
        self.publish_status();
    }

    /// Re-read the provider file, stop everything and start the new set.
    pub async fn reload(&self) -> Result<Vec<ProviderStatus>> {
        let servers = match &self.config_path {
            Some(path) => load_servers(path)?.servers,
            None => read(&self.configs).clone(),
        };

        self.stop_all().await;
        self.stop_watchers();
        write(&self.connections).clear();
        *write(&self.configs) = servers;
        info!(providers = read(&self.configs).len(), "Reloading provider processes");

        Ok(self.start_all().await)
    }

    /// Publish the tools of every connected provider into `registry` and keep
    /// it updated across restarts and reloads. Returns the number published.
    pub fn register_tools(&self, registry: &Arc<ToolRegistry>) -> usize {
        *write(&self.registry) = Some(Arc::clone(registry));
        self.publish_tools()
    }

    /// Republish the pool status on every state change of `conn`, for as
    /// long as the connection belongs to the pool.
    fn watch_connection(&self, conn: &ProcessConnection) -> JoinHandle<()> {
        let mut states = conn.subscribe();
        let connections = Arc::clone(&self.connections);
        let status_tx = Arc::clone(&self.status_tx);
        let name = conn.name().to_string();
        tokio::spawn(async move {
            while states.changed().await.is_ok() {
                let state = states.borrow_and_update().clone();
                debug!(server = %name, %state, "Provider state changed");
                status_tx.send_replace(snapshot(&connections));
            }
        })
    }

    fn stop_watchers(&self) {
        let mut watchers = self.watchers.lock().unwrap_or_else(|e| e.into_inner());
        for watcher in watchers.drain(..) {
            watcher.abort();
        }
    }

    fn publish_status(&self) {
        self.status_tx.send_replace(self.status());
    }

    fn publish_tools(&self) -> usize {
        let Some(registry) = read(&self.registry).clone() else {
            return 0;
        };

        let mut total = 0;
        for conn in self.connections() {
            self.withdraw_tools(conn.name());
            if !conn.is_connected() {
                continue;
            }

            let tools: Vec<Arc<dyn Tool>> = conn
                .tools()
                .iter()
                .map(|remote| {
                    Arc::new(BridgedTool::new(remote, Arc::clone(&conn))) as Arc<dyn Tool>
                })
                .collect();
            for tool in &tools {
                registry.register(Arc::clone(tool));
            }
            debug!(server = %conn.name(), tools = tools.len(), "Published provider tools");
            total += tools.len();
            write(&self.published).insert(conn.name().to_string(), tools);
        }
        total
    }

    fn withdraw_tools(&self, name: &str) {
        let Some(tools) = write(&self.published).remove(name) else {
            return;
        };
        if let Some(registry) = read(&self.registry).as_ref() {
            for tool in &tools {
                registry.unregister_instance(tool);
            }
        }
    }
}

impl Drop for ProcessPool {
    fn drop(&mut self) {
        self.stop_watchers();
    }
}

fn snapshot(connections: &Connections) -> Vec<ProviderStatus> {
    read(connections)
        .values()
        .map(|conn| ProviderStatus {
            name: conn.name().to_string(),
            state: conn.state(),
            tool_count: conn.tools().len(),
        })
        .collect()
}

fn load_servers(path: &Path) -> Result<ServersFile> {
    ServersFile::load(path).map_err(|e| ProcessError::InvalidConfig(e.to_string()))
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}
