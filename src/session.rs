use {
    crate::{
        event::{self, Event},
        native::{Completion, LogLevel, NativeClient, NativeConnector, Notice, Request},
        status::{self, Status},
        watcher::{EventHandler, WatcherRegistry},
        RequestId,
    },
    futures::FutureExt,
    serde::{de::DeserializeOwned, Serialize},
    std::{
        collections::HashMap,
        future::Future,
        io,
        pin::Pin,
        sync::{
            atomic::{AtomicBool, AtomicU64, Ordering},
            Arc, Mutex,
        },
        task::{Context, Poll},
        time::Duration,
    },
    thiserror::Error,
    tokio::{
        sync::{mpsc, oneshot, watch},
        task::{JoinError, JoinHandle},
    },
    tracing::{info, trace, warn},
};

///
/// Session timeout negotiated with the ensemble by default.
///
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_millis(1000);

///
/// Default bound on every completion wait. A lost or suppressed notice fails
/// the call with [`OpError::CompletionTimeout`] once this elapses.
///
pub const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub session_timeout: Duration,
    pub completion_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_timeout: DEFAULT_SESSION_TIMEOUT,
            completion_timeout: DEFAULT_COMPLETION_TIMEOUT,
        }
    }
}

impl SessionConfig {
    pub fn with_session_timeout(mut self, session_timeout: Duration) -> Self {
        self.session_timeout = session_timeout;
        self
    }

    pub fn with_completion_timeout(mut self, completion_timeout: Duration) -> Self {
        self.completion_timeout = completion_timeout;
        self
    }
}

///
/// Native client construction failed. Carries the platform error. A
/// successful construction does not mean the ensemble is reachable; that
/// is reported asynchronously as a session event.
///
#[derive(Debug, Error)]
#[error("native client construction failed: {0}")]
pub struct ConnectError(#[source] pub io::Error);

impl ConnectError {
    pub fn os_errno(&self) -> i32 {
        self.0.raw_os_error().unwrap_or(0)
    }
}

#[derive(Debug, Error)]
pub enum OpError {
    /// Non-OK native status; displays as the status-table message.
    #[error("{}", .0.message())]
    Status(Status),
    /// The bounded completion wait elapsed without a notice arriving.
    #[error("no completion received within {0:?}")]
    CompletionTimeout(Duration),
    #[error("illegal log level")]
    IllegalLogLevel,
    #[error("payload is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

impl OpError {
    pub fn status(&self) -> Option<Status> {
        match self {
            OpError::Status(status) => Some(*status),
            _ => None,
        }
    }
}

type PendingTable = Arc<Mutex<HashMap<RequestId, oneshot::Sender<Completion>>>>;

///
/// Handle on the session's dispatcher task. Await it after `close` to wait
/// for the dispatcher to drain and stop.
///
pub struct SessionHandle {
    inner: JoinHandle<()>,
}

impl Future for SessionHandle {
    type Output = Result<(), JoinError>;
    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

///
/// Background task draining the native notice channel.
///
/// Completions resolve their waiting call by request id; watch notifications
/// update the session-state cell and go to the registered handler. The
/// handler therefore runs here, decoupled from the native I/O thread.
///
struct SessionRuntime {
    notice_rx: mpsc::UnboundedReceiver<Notice>,
    pending: PendingTable,
    registry: WatcherRegistry,
    state_tx: watch::Sender<i32>,
}

impl SessionRuntime {
    fn handle_completion(&self, completion: Completion) {
        let waiter = self
            .pending
            .lock()
            .expect("pending table poisoned")
            .remove(&completion.request);
        match waiter {
            Some(tx) => {
                if tx.send(completion).is_err() {
                    trace!("completion receiver gone, caller stopped waiting");
                }
            }
            None => {
                // Fire-and-forget submissions land here.
                trace!("completion for untracked request {}", completion.request);
            }
        }
    }

    fn handle_watch(&self, kind: i32, state: i32, path: String) {
        if kind == event::SESSION_EVENT {
            self.state_tx.send_replace(state);
        }
        let event = Event { kind, state, path };
        self.registry.dispatch(&event);
    }

    async fn run(mut self) {
        while let Some(notice) = self.notice_rx.recv().await {
            match notice {
                Notice::Completion(completion) => self.handle_completion(completion),
                Notice::Watch { kind, state, path } => self.handle_watch(kind, state, path),
            }
        }
        // The native side dropped its sender: fail whatever is still waiting
        // instead of leaving callers parked until their timeout.
        let mut pending = self.pending.lock().expect("pending table poisoned");
        if !pending.is_empty() {
            warn!(
                "notice channel closed with {} call(s) still in flight",
                pending.len()
            );
        }
        for (id, tx) in pending.drain() {
            let _ = tx.send(Completion {
                request: id,
                status: Status::CLOSING,
                data: None,
            });
        }
        drop(pending);
        trace!("session dispatcher exiting");
    }
}

///
/// One live connection to the ensemble.
///
/// Cheap to clone and share across tasks; all clones speak to the same native
/// handle and pending-request table. Any number of calls may be in flight
/// concurrently: each correlates to its own completion, so out-of-order
/// delivery never pairs a result with the wrong caller.
///
#[derive(Clone)]
pub struct Session {
    native: Arc<dyn NativeClient>,
    pending: PendingTable,
    next_request: Arc<AtomicU64>,
    state_rx: watch::Receiver<i32>,
    closed: Arc<AtomicBool>,
    completion_timeout: Duration,
}

///
/// Establish a session without a watch handler. Watch notifications are
/// dropped after session-state tracking; completions still resolve, so no
/// call ever depends on a handler being present.
///
pub async fn spawn_session(
    connector: &dyn NativeConnector,
    endpoints: impl AsRef<str>,
    config: SessionConfig,
) -> Result<(SessionHandle, Session), ConnectError> {
    spawn_with_registry(connector, endpoints.as_ref(), config, WatcherRegistry::empty()).await
}

///
/// Establish a session with a watch handler and its bound context. The
/// context values are replayed, in order, after the event on every dispatch
/// for the session's lifetime.
///
pub async fn spawn_session_with_handler(
    connector: &dyn NativeConnector,
    endpoints: impl AsRef<str>,
    config: SessionConfig,
    handler: EventHandler,
    bound_context: Vec<String>,
) -> Result<(SessionHandle, Session), ConnectError> {
    let registry = WatcherRegistry::new(Some(handler), bound_context);
    spawn_with_registry(connector, endpoints.as_ref(), config, registry).await
}

async fn spawn_with_registry(
    connector: &dyn NativeConnector,
    endpoints: &str,
    config: SessionConfig,
    registry: WatcherRegistry,
) -> Result<(SessionHandle, Session), ConnectError> {
    let (notice_tx, notice_rx) = mpsc::unbounded_channel();
    let native = connector
        .connect(endpoints, config.session_timeout, notice_tx)
        .await
        .map_err(ConnectError)?;

    let pending: PendingTable = Arc::new(Mutex::new(HashMap::new()));
    let (state_tx, state_rx) = watch::channel(event::CONNECTING_STATE);
    let runtime = SessionRuntime {
        notice_rx,
        pending: Arc::clone(&pending),
        registry,
        state_tx,
    };
    let handle = tokio::spawn(runtime.run());
    info!("session established against {endpoints}");

    Ok((
        SessionHandle { inner: handle },
        Session {
            native,
            pending,
            next_request: Arc::new(AtomicU64::new(1)),
            state_rx,
            closed: Arc::new(AtomicBool::new(false)),
            completion_timeout: config.completion_timeout,
        },
    ))
}

impl Session {
    fn next_id(&self) -> RequestId {
        self.next_request.fetch_add(1, Ordering::Relaxed)
    }

    fn guard_open(&self) -> Result<(), OpError> {
        if self.closed.load(Ordering::Acquire) {
            Err(OpError::Status(Status::CLOSING))
        } else {
            Ok(())
        }
    }

    ///
    /// Submit a request and await its own completion, bounded by the
    /// configured completion timeout.
    ///
    async fn roundtrip(&self, request: Request) -> Result<Completion, OpError> {
        self.guard_open()?;
        let id = request.id();
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .expect("pending table poisoned")
            .insert(id, tx);

        let submitted = self.native.submit(request);
        if !submitted.is_ok() {
            self.pending
                .lock()
                .expect("pending table poisoned")
                .remove(&id);
            return Err(OpError::Status(submitted));
        }

        match tokio::time::timeout(self.completion_timeout, rx).await {
            Ok(Ok(completion)) if completion.status.is_ok() => Ok(completion),
            Ok(Ok(completion)) => Err(OpError::Status(completion.status)),
            // Dispatcher went away with our waiter still registered.
            Ok(Err(_)) => Err(OpError::Status(Status::CLOSING)),
            Err(_) => {
                self.pending
                    .lock()
                    .expect("pending table poisoned")
                    .remove(&id);
                Err(OpError::CompletionTimeout(self.completion_timeout))
            }
        }
    }

    ///
    /// Create a node at `path` holding `data`. Non-sequential, non-ephemeral,
    /// open ACL.
    ///
    pub async fn create(
        &self,
        path: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Result<(), OpError> {
        let request = Request::Create {
            id: self.next_id(),
            path: path.into(),
            data: data.into(),
        };
        self.roundtrip(request).await.map(|_| ())
    }

    ///
    /// Fire-and-forget create: returns the immediate submission status and
    /// discards the eventual completion.
    ///
    pub fn acreate(
        &self,
        path: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Result<(), OpError> {
        self.guard_open()?;
        let request = Request::Create {
            id: self.next_id(),
            path: path.into(),
            data: data.into(),
        };
        let submitted = self.native.submit(request);
        if submitted.is_ok() {
            Ok(())
        } else {
            Err(OpError::Status(submitted))
        }
    }

    /// Delete the node at `path`, whatever its current version.
    pub async fn delete(&self, path: impl Into<String>) -> Result<(), OpError> {
        let request = Request::Delete {
            id: self.next_id(),
            path: path.into(),
        };
        self.roundtrip(request).await.map(|_| ())
    }

    /// Overwrite the node at `path`, whatever its current version.
    pub async fn set(
        &self,
        path: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Result<(), OpError> {
        let request = Request::SetData {
            id: self.next_id(),
            path: path.into(),
            data: data.into(),
        };
        self.roundtrip(request).await.map(|_| ())
    }

    ///
    /// Read the node at `path`. The completion carries the full payload,
    /// however large.
    ///
    pub async fn get(&self, path: impl Into<String>) -> Result<Vec<u8>, OpError> {
        let request = Request::GetData {
            id: self.next_id(),
            path: path.into(),
        };
        let completion = self.roundtrip(request).await?;
        Ok(completion.data.unwrap_or_default())
    }

    /// Read the node at `path` and deserialize its payload as JSON.
    pub async fn get_json<T>(&self, path: impl Into<String>) -> Result<T, OpError>
    where
        T: DeserializeOwned,
    {
        let raw = self.get(path).await?;
        Ok(serde_json::from_slice(&raw)?)
    }

    /// Serialize `value` as JSON and overwrite the node at `path` with it.
    pub async fn set_json<T>(&self, path: impl Into<String>, value: &T) -> Result<(), OpError>
    where
        T: Serialize,
    {
        let raw = serde_json::to_vec(value)?;
        self.set(path, raw).await
    }

    ///
    /// Reconfigure the native client's logging verbosity, a process-wide side
    /// effect on the native side. Levels outside {Error=1, Warn=2, Info=3,
    /// Debug=4} are rejected before the native client is touched.
    ///
    pub fn set_log_level(&self, level: i32) -> Result<(), OpError> {
        let level = LogLevel::from_raw(level).ok_or(OpError::IllegalLogLevel)?;
        self.guard_open()?;
        self.native.set_log_verbosity(level);
        Ok(())
    }

    /// Latest session state reported by the native client, raw.
    pub fn session_state(&self) -> i32 {
        *self.state_rx.borrow()
    }

    ///
    /// Wait until the session reports Connected. Auth failure and expiry map
    /// to their status-table errors; no report within the completion timeout
    /// fails with the distinct timeout error.
    ///
    pub async fn wait_connected(&self) -> Result<(), OpError> {
        let mut state_rx = self.state_rx.clone();
        let waited = tokio::time::timeout(
            self.completion_timeout,
            state_rx.wait_for(|state| {
                matches!(
                    *state,
                    event::CONNECTED_STATE
                        | event::AUTH_FAILED_STATE
                        | event::EXPIRED_SESSION_STATE
                )
            }),
        )
        .await;
        match waited {
            Ok(Ok(state)) => match *state {
                event::CONNECTED_STATE => Ok(()),
                event::AUTH_FAILED_STATE => Err(OpError::Status(Status(status::ZAUTHFAILED))),
                _ => Err(OpError::Status(Status(status::ZSESSIONEXPIRED))),
            },
            Ok(Err(_)) => Err(OpError::Status(Status::CLOSING)),
            Err(_) => Err(OpError::CompletionTimeout(self.completion_timeout)),
        }
    }

    ///
    /// Close the session. Idempotent: the second and later calls succeed
    /// without touching the native client. Calls still in flight when the
    /// native side stops resolve with the closing status.
    ///
    pub async fn close(&self) -> Result<(), OpError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            trace!("session already closed");
            return Ok(());
        }
        let closed = self.native.close().await;
        if closed.is_ok() {
            Ok(())
        } else {
            Err(OpError::Status(closed))
        }
    }
}
