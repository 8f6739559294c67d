use {
    crate::{status::Status, RequestId},
    std::{io, sync::Arc, time::Duration},
    tokio::sync::mpsc,
};

///
/// One request submitted to the native client.
///
/// Creation is always non-sequential, non-ephemeral and open-ACL; delete and
/// set ignore the node version (any current version is accepted).
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Create {
        id: RequestId,
        path: String,
        data: Vec<u8>,
    },
    Delete {
        id: RequestId,
        path: String,
    },
    SetData {
        id: RequestId,
        path: String,
        data: Vec<u8>,
    },
    GetData {
        id: RequestId,
        path: String,
    },
}

impl Request {
    pub fn id(&self) -> RequestId {
        match self {
            Request::Create { id, .. }
            | Request::Delete { id, .. }
            | Request::SetData { id, .. }
            | Request::GetData { id, .. } => *id,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Request::Create { path, .. }
            | Request::Delete { path, .. }
            | Request::SetData { path, .. }
            | Request::GetData { path, .. } => path,
        }
    }
}

///
/// Result of one submitted request, delivered by the native side once the
/// server has answered. `data` is only populated for reads and carries the
/// full payload, however large.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub request: RequestId,
    pub status: Status,
    pub data: Option<Vec<u8>>,
}

///
/// Everything the native I/O machinery reports back to the bridge.
///
/// Watch notifications keep the native client's raw `(kind, state, path)`
/// triple; the bridge translates them at dispatch time.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Completion(Completion),
    Watch { kind: i32, state: i32, path: String },
}

///
/// Native logging verbosity, process-wide on the native side.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

impl LogLevel {
    pub fn from_raw(level: i32) -> Option<Self> {
        match level {
            1 => Some(Self::Error),
            2 => Some(Self::Warn),
            3 => Some(Self::Info),
            4 => Some(Self::Debug),
            _ => None,
        }
    }
}

///
/// A live native client handle.
///
/// `submit` is fire-and-forget: it returns the immediate acceptance status and
/// the result arrives later as a [`Notice::Completion`] on the channel handed
/// to [`NativeConnector::connect`]. The implementation owns retry, reconnect
/// and wire framing; the bridge assumes none of it.
///
#[async_trait::async_trait]
pub trait NativeClient: Send + Sync {
    fn submit(&self, request: Request) -> Status;

    async fn close(&self) -> Status;

    fn set_log_verbosity(&self, level: LogLevel);
}

///
/// Constructs native clients against an ensemble address list.
///
/// The connector hands every notice, completions and watch events alike, to
/// the given sender. Sends must not block the native I/O thread, which is why
/// the channel is unbounded.
///
#[async_trait::async_trait]
pub trait NativeConnector: Send + Sync {
    async fn connect(
        &self,
        endpoints: &str,
        session_timeout: Duration,
        notices: mpsc::UnboundedSender<Notice>,
    ) -> io::Result<Arc<dyn NativeClient>>;
}
