#![allow(dead_code)]

use {
    async_trait::async_trait,
    rust_zk_bridge::{
        event::{CHANGED_EVENT, CONNECTED_STATE, CREATED_EVENT, DELETED_EVENT, SESSION_EVENT},
        native::{Completion, LogLevel, NativeClient, NativeConnector, Notice, Request},
        status::{self, Status},
        RequestId,
    },
    std::{
        collections::HashMap,
        io,
        sync::{
            atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering},
            Arc, Mutex,
        },
        time::Duration,
    },
    tokio::sync::mpsc,
};

/// In-memory stand-in for the native coordination client: a flat node table,
/// completions and watch events delivered through the notice channel from
/// spawned tasks, emulating the background I/O thread.
#[derive(Clone)]
pub struct MemoryCluster {
    nodes: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    close_calls: Arc<AtomicUsize>,
    verbosity: Arc<Mutex<Option<LogLevel>>>,
    drop_completions: Arc<AtomicBool>,
    refuse_connections: Arc<AtomicBool>,
    connect_state: Arc<AtomicI32>,
    submit_delays: Arc<Mutex<HashMap<String, Duration>>>,
    notices: Arc<Mutex<Option<mpsc::UnboundedSender<Notice>>>>,
}

impl Default for MemoryCluster {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCluster {
    pub fn new() -> Self {
        Self {
            nodes: Arc::new(Mutex::new(HashMap::new())),
            close_calls: Arc::new(AtomicUsize::new(0)),
            verbosity: Arc::new(Mutex::new(None)),
            drop_completions: Arc::new(AtomicBool::new(false)),
            refuse_connections: Arc::new(AtomicBool::new(false)),
            connect_state: Arc::new(AtomicI32::new(CONNECTED_STATE)),
            submit_delays: Arc::new(Mutex::new(HashMap::new())),
            notices: Arc::new(Mutex::new(None)),
        }
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::Acquire)
    }

    pub fn verbosity(&self) -> Option<LogLevel> {
        *self.verbosity.lock().expect("verbosity slot poisoned")
    }

    /// Accept submissions but never deliver their completions.
    pub fn drop_completions(&self, on: bool) {
        self.drop_completions.store(on, Ordering::Release);
    }

    pub fn refuse_connections(&self, on: bool) {
        self.refuse_connections.store(on, Ordering::Release);
    }

    /// Session state announced right after a successful connect.
    pub fn connect_state(&self, state: i32) {
        self.connect_state.store(state, Ordering::Release);
    }

    /// Delay completion delivery for submissions against `path`.
    pub fn delay_path(&self, path: &str, delay: Duration) {
        self.submit_delays
            .lock()
            .expect("delay table poisoned")
            .insert(path.to_string(), delay);
    }

    /// Push a watch notification, as the server would for a foreign change.
    pub fn inject_event(&self, kind: i32, state: i32, path: &str) {
        let guard = self.notices.lock().expect("notice slot poisoned");
        if let Some(tx) = guard.as_ref() {
            let _ = tx.send(Notice::Watch {
                kind,
                state,
                path: path.to_string(),
            });
        }
    }

    pub fn node(&self, path: &str) -> Option<Vec<u8>> {
        self.nodes
            .lock()
            .expect("node table poisoned")
            .get(path)
            .cloned()
    }

    fn delay_for(&self, path: &str) -> Option<Duration> {
        self.submit_delays
            .lock()
            .expect("delay table poisoned")
            .get(path)
            .copied()
    }

    fn apply(&self, request: Request) -> Vec<Notice> {
        let mut nodes = self.nodes.lock().expect("node table poisoned");
        match request {
            Request::Create { id, path, data } => {
                if nodes.contains_key(&path) {
                    vec![completion(id, status::ZNODEEXISTS)]
                } else {
                    nodes.insert(path.clone(), data);
                    vec![completion(id, status::ZOK), node_event(CREATED_EVENT, path)]
                }
            }
            Request::Delete { id, path } => {
                if nodes.remove(&path).is_some() {
                    vec![completion(id, status::ZOK), node_event(DELETED_EVENT, path)]
                } else {
                    vec![completion(id, status::ZNONODE)]
                }
            }
            Request::SetData { id, path, data } => {
                if let Some(slot) = nodes.get_mut(&path) {
                    *slot = data;
                    vec![completion(id, status::ZOK), node_event(CHANGED_EVENT, path)]
                } else {
                    vec![completion(id, status::ZNONODE)]
                }
            }
            Request::GetData { id, path } => match nodes.get(&path) {
                Some(data) => vec![Notice::Completion(Completion {
                    request: id,
                    status: Status::OK,
                    data: Some(data.clone()),
                })],
                None => vec![completion(id, status::ZNONODE)],
            },
        }
    }
}

fn completion(id: RequestId, code: i32) -> Notice {
    Notice::Completion(Completion {
        request: id,
        status: Status(code),
        data: None,
    })
}

fn node_event(kind: i32, path: String) -> Notice {
    Notice::Watch {
        kind,
        state: CONNECTED_STATE,
        path,
    }
}

#[async_trait]
impl NativeConnector for MemoryCluster {
    async fn connect(
        &self,
        _endpoints: &str,
        _session_timeout: Duration,
        notices: mpsc::UnboundedSender<Notice>,
    ) -> io::Result<Arc<dyn NativeClient>> {
        if self.refuse_connections.load(Ordering::Acquire) {
            // ECONNREFUSED
            return Err(io::Error::from_raw_os_error(111));
        }
        let _ = notices.send(Notice::Watch {
            kind: SESSION_EVENT,
            state: self.connect_state.load(Ordering::Acquire),
            path: String::new(),
        });
        *self.notices.lock().expect("notice slot poisoned") = Some(notices.clone());
        Ok(Arc::new(MemoryClient {
            cluster: self.clone(),
            notices: Mutex::new(Some(notices)),
        }))
    }
}

pub struct MemoryClient {
    cluster: MemoryCluster,
    notices: Mutex<Option<mpsc::UnboundedSender<Notice>>>,
}

#[async_trait]
impl NativeClient for MemoryClient {
    fn submit(&self, request: Request) -> Status {
        let notices = match self.notices.lock().expect("notice slot poisoned").clone() {
            Some(tx) => tx,
            None => return Status(status::ZINVALIDSTATE),
        };
        if self.cluster.drop_completions.load(Ordering::Acquire) {
            // Accepted, then lost in transit.
            return Status::OK;
        }
        let cluster = self.cluster.clone();
        let delay = cluster.delay_for(request.path());
        tokio::spawn(async move {
            match delay {
                Some(delay) => tokio::time::sleep(delay).await,
                None => tokio::task::yield_now().await,
            }
            for notice in cluster.apply(request) {
                let _ = notices.send(notice);
            }
        });
        Status::OK
    }

    async fn close(&self) -> Status {
        self.cluster.close_calls.fetch_add(1, Ordering::AcqRel);
        self.notices.lock().expect("notice slot poisoned").take();
        self.cluster
            .notices
            .lock()
            .expect("notice slot poisoned")
            .take();
        Status::OK
    }

    fn set_log_verbosity(&self, level: LogLevel) {
        *self.cluster.verbosity.lock().expect("verbosity slot poisoned") = Some(level);
    }
}

pub fn random_str(len: usize) -> String {
    use rand::{distributions::Alphanumeric, thread_rng, Rng};
    let mut rng = thread_rng();
    (&mut rng)
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
