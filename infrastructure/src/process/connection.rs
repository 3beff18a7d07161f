//! A single tool-provider child process speaking JSON-RPC over stdio.
//!
//! One background reader task owns the child's stdout, splits it into
//! newline-delimited frames and routes responses to waiting requests by id.
//! Writers share the child's stdin behind an async mutex, so any number of
//! requests may be in flight at once.
//!
//! Lifecycle:
//!
//! ```text
//! Disconnected ──connect──▶ Connecting ──handshake ok──▶ Connected
//!       ▲                        │                           │
//!       └──────disconnect────────┴── error / child exit ──▶ Failed(reason)
//! ```

use crate::config::ProcessConfig;
use crate::process::error::{ProcessError, Result};
use crate::process::protocol::{
    InitializeParams, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, JsonRpcResponseOut,
    METHOD_NOT_FOUND, RemoteTool, ToolCallOutput, parse_tools_list, tools_call_params,
};
use crate::process::transport::{FrameBuffer, MessageKind, classify_message};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, MutexGuard};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};
use zia_domain::util::log_preview;

/// Upper bound for handshake requests when no request timeout is configured.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum number of `tools/list` pages followed during the handshake.
const MAX_TOOL_PAGES: usize = 32;

/// Directories appended to the child's `PATH` when missing.
///
/// Launchers started from a desktop session often inherit a minimal `PATH`
/// that lacks the usual user-level install locations.
const EXTRA_PATH_DIRS: &[&str] = &["/usr/local/bin", "/opt/homebrew/bin", "/usr/bin", "/bin"];

/// Connection state of a provider process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed(String),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

type Waiter = oneshot::Sender<Result<Value>>;

/// Outstanding requests keyed by JSON-RPC id.
///
/// Once closed (the child went away) no new request can register until the
/// next connect reopens the table, so a request can never wait on a process
/// that is already gone.
pub(crate) struct PendingTable {
    next_id: u64,
    waiters: HashMap<u64, Waiter>,
    closed: bool,
}

impl PendingTable {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 1,
            waiters: HashMap::new(),
            closed: false,
        }
    }

    pub(crate) fn register(&mut self) -> Result<(u64, oneshot::Receiver<Result<Value>>)> {
        if self.closed {
            return Err(ProcessError::Disconnected);
        }
        let id = self.next_id;
        self.next_id += 1;
        let (tx, rx) = oneshot::channel();
        self.waiters.insert(id, tx);
        Ok((id, rx))
    }

    /// Deliver an outcome to the waiter with this id. Returns false when no
    /// such waiter exists.
    pub(crate) fn resolve(&mut self, id: u64, outcome: Result<Value>) -> bool {
        match self.waiters.remove(&id) {
            Some(tx) => {
                // The requester may have timed out and dropped its receiver.
                let _ = tx.send(outcome);
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, id: u64) -> bool {
        self.waiters.remove(&id).is_some()
    }

    /// Fail every waiter with `Disconnected` and refuse new registrations.
    pub(crate) fn fail_all(&mut self) -> usize {
        self.closed = true;
        let count = self.waiters.len();
        for (_, tx) in self.waiters.drain() {
            let _ = tx.send(Err(ProcessError::Disconnected));
        }
        count
    }

    pub(crate) fn reopen(&mut self) {
        self.closed = false;
    }

    pub(crate) fn len(&self) -> usize {
        self.waiters.len()
    }
}

/// State shared between the connection handle and its background tasks.
struct Shared {
    name: String,
    state: watch::Sender<ConnectionState>,
    tools: std::sync::RwLock<Vec<RemoteTool>>,
    pending: std::sync::Mutex<PendingTable>,
    writer: Mutex<Option<BufWriter<ChildStdin>>>,
    child: Mutex<Option<Child>>,
}

impl Shared {
    fn pending(&self) -> MutexGuard<'_, PendingTable> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_tools(&self, tools: Vec<RemoteTool>) {
        *self.tools.write().unwrap_or_else(|e| e.into_inner()) = tools;
    }

    /// Serialize one message and write it as a single line.
    async fn write_frame<T: Serialize>(&self, message: &T) -> Result<()> {
        let mut line = serde_json::to_vec(message)?;
        line.push(b'\n');

        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(ProcessError::Disconnected)?;
        let written = async {
            writer.write_all(&line).await?;
            writer.flush().await
        }
        .await;
        written.map_err(|e| match e.kind() {
            std::io::ErrorKind::BrokenPipe => ProcessError::Disconnected,
            _ => ProcessError::Io(e),
        })
    }

    async fn handle_frame(self: &Arc<Self>, frame: &[u8]) {
        let value: Value = match serde_json::from_slice(frame) {
            Ok(v) => v,
            Err(e) => {
                warn!(
                    server = %self.name,
                    error = %e,
                    frame = %log_preview(&String::from_utf8_lossy(frame), 200),
                    "Ignoring malformed frame from provider"
                );
                return;
            }
        };

        match classify_message(&value) {
            MessageKind::Response => self.handle_response(value),
            MessageKind::ServerRequest => {
                // Answered off the reader so a full stdin pipe cannot stall
                // response routing.
                let shared = Arc::clone(self);
                tokio::spawn(async move { shared.handle_server_request(value).await });
            }
            MessageKind::Notification => {
                let method = value.get("method").and_then(Value::as_str).unwrap_or_default();
                debug!(server = %self.name, method, "Provider notification");
            }
            MessageKind::Invalid => {
                warn!(
                    server = %self.name,
                    frame = %log_preview(&value.to_string(), 200),
                    "Ignoring message without id or method"
                );
            }
        }
    }

    fn handle_response(&self, value: Value) {
        let response: JsonRpcResponse = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                warn!(server = %self.name, error = %e, "Ignoring unparseable response");
                return;
            }
        };

        let Some(id) = response.id.as_ref().and_then(|v| {
            v.as_u64()
                .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
        }) else {
            debug!(server = %self.name, id = ?response.id, "Dropping response with foreign id");
            return;
        };

        let outcome = match response.error {
            Some(err) => Err(ProcessError::Rpc {
                code: err.code,
                message: err.message,
            }),
            None => Ok(response.result.unwrap_or(Value::Null)),
        };

        if !self.pending().resolve(id, outcome) {
            debug!(server = %self.name, id, "Dropping response for unknown request");
        }
    }

    async fn handle_server_request(&self, value: Value) {
        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let method = value
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let reply = match method {
            "ping" => JsonRpcResponseOut::result(id, json!({})),
            other => {
                debug!(server = %self.name, method = other, "Rejecting unsupported provider request");
                JsonRpcResponseOut::error(id, METHOD_NOT_FOUND, format!("Method not found: {}", other))
            }
        };

        if let Err(e) = self.write_frame(&reply).await {
            debug!(server = %self.name, error = %e, "Failed to answer provider request");
        }
    }

    /// The child's stdout closed: everything outstanding fails and the
    /// process that owned the stream is killed and reaped.
    async fn connection_lost(&self, pid: Option<u32>) {
        self.set_tools(Vec::new());
        let changed = self.state.send_if_modified(|state| {
            if matches!(state, ConnectionState::Connecting | ConnectionState::Connected) {
                *state = ConnectionState::Failed(ProcessError::Disconnected.to_string());
                true
            } else {
                false
            }
        });
        *self.writer.lock().await = None;
        self.reap(pid).await;
        let failed = self.pending().fail_all();

        if changed {
            warn!(server = %self.name, failed_requests = failed, "Provider process exited");
        } else {
            debug!(server = %self.name, "Provider stdout closed");
        }
    }

    /// Kill the child with this pid if it is still the current one. A
    /// reconnect may already have replaced it.
    async fn reap(&self, pid: Option<u32>) {
        let exited = {
            let mut slot = self.child.lock().await;
            match slot.as_ref() {
                Some(child) if pid.is_some() && child.id() == pid => slot.take(),
                _ => None,
            }
        };
        let Some(mut child) = exited else {
            return;
        };

        match child.try_wait() {
            Ok(Some(status)) => debug!(server = %self.name, %status, "Provider process exited"),
            _ => {
                if let Err(e) = child.kill().await {
                    debug!(server = %self.name, error = %e, "Failed to kill provider process");
                } else {
                    debug!(server = %self.name, "Killed provider process after stdout closed");
                }
            }
        }
    }
}

async fn read_loop(shared: Arc<Shared>, mut stdout: ChildStdout, pid: Option<u32>) {
    let mut frames = FrameBuffer::new();
    let mut chunk = vec![0u8; 8192];

    loop {
        let n = match stdout.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                warn!(server = %shared.name, error = %e, "Failed to read from provider");
                break;
            }
        };
        frames.extend(&chunk[..n]);
        while let Some(frame) = frames.next_frame() {
            shared.handle_frame(&frame).await;
        }
    }

    shared.connection_lost(pid).await;
}

async fn forward_stderr(name: String, stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(server = %name, "stderr: {}", line);
    }
}

/// `PATH` for resolving and running provider commands: the parent's entries
/// followed by common install locations that are missing from it.
fn widened_path() -> OsString {
    let inherited = std::env::var_os("PATH").unwrap_or_default();
    let mut entries: Vec<PathBuf> = std::env::split_paths(&inherited).collect();

    let mut extra: Vec<PathBuf> = EXTRA_PATH_DIRS.iter().map(PathBuf::from).collect();
    if let Some(home) = dirs::home_dir() {
        extra.push(home.join(".local/bin"));
        extra.push(home.join(".cargo/bin"));
    }
    for dir in extra {
        if !entries.contains(&dir) {
            entries.push(dir);
        }
    }

    std::env::join_paths(entries).unwrap_or(inherited)
}

/// Handle to one provider process.
pub struct ProcessConnection {
    shared: Arc<Shared>,
    config: ProcessConfig,
    request_timeout: Option<Duration>,
    tasks: std::sync::Mutex<Vec<JoinHandle<()>>>,
    /// Serializes connect / disconnect
    lifecycle: Mutex<()>,
}

impl ProcessConnection {
    pub fn new(name: impl Into<String>, config: ProcessConfig) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            shared: Arc::new(Shared {
                name: name.into(),
                state,
                tools: std::sync::RwLock::new(Vec::new()),
                pending: std::sync::Mutex::new(PendingTable::new()),
                writer: Mutex::new(None),
                child: Mutex::new(None),
            }),
            config,
            request_timeout: None,
            tasks: std::sync::Mutex::new(Vec::new()),
            lifecycle: Mutex::new(()),
        }
    }

    /// Bound every request; `None` waits indefinitely.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.state.borrow().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.shared.state.borrow().is_connected()
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    /// Tools advertised during the last successful handshake.
    pub fn tools(&self) -> Vec<RemoteTool> {
        self.shared
            .tools
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    #[cfg(test)]
    pub(crate) fn pending_count(&self) -> usize {
        self.shared.pending().len()
    }

    #[cfg(test)]
    pub(crate) async fn child_id(&self) -> Option<u32> {
        self.shared.child.lock().await.as_ref().and_then(Child::id)
    }

    /// Spawn the process and run the handshake.
    ///
    /// No-op when already connected. On failure the state becomes
    /// `Failed(reason)` and the child is torn down.
    pub async fn connect(&self) -> Result<()> {
        let _guard = self.lifecycle.lock().await;
        if self.is_connected() {
            return Ok(());
        }

        // Leftovers from a previous run that ended in failure
        self.teardown().await;
        self.shared.state.send_replace(ConnectionState::Connecting);
        self.shared.pending().reopen();

        match self.start().await {
            Ok(tools) => {
                let count = tools.len();
                self.shared.set_tools(tools);
                let promoted = self.shared.state.send_if_modified(|state| {
                    if *state == ConnectionState::Connecting {
                        *state = ConnectionState::Connected;
                        true
                    } else {
                        false
                    }
                });
                if promoted {
                    info!(server = %self.shared.name, tools = count, "Provider connected");
                    Ok(())
                } else {
                    self.teardown().await;
                    Err(ProcessError::Disconnected)
                }
            }
            Err(e) => {
                self.teardown().await;
                self.shared
                    .state
                    .send_replace(ConnectionState::Failed(e.to_string()));
                warn!(server = %self.shared.name, error = %e, "Provider failed to connect");
                Err(e)
            }
        }
    }

    /// Stop the process. Idempotent.
    pub async fn disconnect(&self) -> Result<()> {
        let _guard = self.lifecycle.lock().await;
        self.teardown().await;
        let previous = self.shared.state.send_replace(ConnectionState::Disconnected);
        if previous != ConnectionState::Disconnected {
            info!(server = %self.shared.name, "Provider disconnected");
        }
        Ok(())
    }

    /// Invoke a remote tool.
    ///
    /// A JSON-RPC error reply is folded into an error output; only transport
    /// failures (not connected, disconnect, timeout) are returned as `Err`.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallOutput> {
        let state = self.state();
        if !state.is_connected() {
            return Err(ProcessError::NotConnected {
                state: state.to_string(),
            });
        }

        match self
            .request("tools/call", Some(tools_call_params(name, arguments)))
            .await
        {
            Ok(result) => Ok(ToolCallOutput::from_result(&result)),
            Err(ProcessError::Rpc { code, message }) => {
                Ok(ToolCallOutput::from_rpc_error(code, &message))
            }
            Err(e) => Err(e),
        }
    }

    /// Send a request and wait for its response.
    pub async fn request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        self.request_within(method, params, self.request_timeout)
            .await
    }

    async fn request_within(
        &self,
        method: &str,
        params: Option<Value>,
        timeout: Option<Duration>,
    ) -> Result<Value> {
        let (id, rx) = self.shared.pending().register()?;
        let request = JsonRpcRequest::new(id, method, params);
        if let Err(e) = self.shared.write_frame(&request).await {
            self.shared.pending().remove(id);
            return Err(e);
        }
        trace!(server = %self.shared.name, id, method, "Request sent");

        let received = match timeout {
            Some(after) => match tokio::time::timeout(after, rx).await {
                Ok(received) => received,
                Err(_) => {
                    // The process stays up; a late reply is dropped by the reader.
                    self.shared.pending().remove(id);
                    return Err(ProcessError::Timeout {
                        method: method.to_string(),
                        after,
                    });
                }
            },
            None => rx.await,
        };

        received.unwrap_or(Err(ProcessError::Disconnected))
    }

    async fn notify(&self, method: &str, params: Option<Value>) -> Result<()> {
        self.shared
            .write_frame(&JsonRpcNotification::new(method, params))
            .await
    }

    async fn start(&self) -> Result<Vec<RemoteTool>> {
        let search_path = self
            .config
            .env
            .get("PATH")
            .map(OsString::from)
            .unwrap_or_else(widened_path);
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let program = which::which_in(&self.config.command, Some(&search_path), cwd).map_err(
            |_| ProcessError::CommandNotFound {
                command: self.config.command.clone(),
            },
        )?;

        let mut cmd = Command::new(&program);
        cmd.args(&self.config.args)
            .env("PATH", &search_path)
            .envs(&self.config.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Ensure the provider dies with us even on SIGKILL.
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        debug!(
            server = %self.shared.name,
            program = %program.display(),
            args = ?self.config.args,
            "Spawning provider process"
        );
        let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
            command: self.config.command.clone(),
            source,
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ProcessError::InvalidState("child stdin not piped".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ProcessError::InvalidState("child stdout not piped".into()))?;
        let stderr = child.stderr.take();

        *self.shared.writer.lock().await = Some(BufWriter::new(stdin));
        let pid = child.id();
        *self.shared.child.lock().await = Some(child);
        {
            let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
            tasks.push(tokio::spawn(read_loop(Arc::clone(&self.shared), stdout, pid)));
            if let Some(stderr) = stderr {
                tasks.push(tokio::spawn(forward_stderr(self.shared.name.clone(), stderr)));
            }
        }

        self.handshake().await
    }

    async fn handshake(&self) -> Result<Vec<RemoteTool>> {
        let timeout = Some(self.request_timeout.unwrap_or(HANDSHAKE_TIMEOUT));
        let stage = |stage: &'static str| {
            move |e: ProcessError| ProcessError::Handshake {
                stage,
                reason: e.to_string(),
            }
        };

        let params = serde_json::to_value(InitializeParams::new("zia", env!("CARGO_PKG_VERSION")))?;
        let init = self
            .request_within("initialize", Some(params), timeout)
            .await
            .map_err(stage("initialize"))?;
        let protocol = init
            .get("protocolVersion")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        debug!(server = %self.shared.name, protocol, "Provider initialized");

        self.notify("notifications/initialized", None)
            .await
            .map_err(stage("initialized"))?;

        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;
        for _ in 0..MAX_TOOL_PAGES {
            let params = cursor.as_ref().map(|c| json!({ "cursor": c }));
            let result = self
                .request_within("tools/list", params, timeout)
                .await
                .map_err(stage("tools/list"))?;
            let page = parse_tools_list(&result);
            tools.extend(page.tools);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => return Ok(tools),
            }
        }

        warn!(
            server = %self.shared.name,
            pages = MAX_TOOL_PAGES,
            "Stopped following tools/list cursor"
        );
        Ok(tools)
    }

    async fn teardown(&self) {
        {
            let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
            for task in tasks.drain(..) {
                task.abort();
            }
        }

        *self.shared.writer.lock().await = None;

        if let Some(mut child) = self.shared.child.lock().await.take()
            && let Err(e) = child.kill().await
        {
            debug!(server = %self.shared.name, error = %e, "Provider already exited");
        }

        self.shared.set_tools(Vec::new());
        self.shared.pending().fail_all();
    }
}

impl Drop for ProcessConnection {
    fn drop(&mut self) {
        let tasks = self.tasks.get_mut().unwrap_or_else(|e| e.into_inner());
        for task in tasks.drain(..) {
            task.abort();
        }
    }
}
