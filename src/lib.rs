///
/// Coordination-service status codes and their diagnostic messages
///
pub mod status;

///
/// Watch/session event vocabulary shared with the native client
///
pub mod event;

///
/// Contract the underlying asynchronous coordination client must satisfy
///
pub mod native;

///
/// Session facade turning fire-and-forget submissions into awaitable calls
///
pub mod session;

///
/// Fan-out of watch notifications to the registered handler
///
pub mod watcher;

///
/// Correlation id assigned to every submitted request
///
pub type RequestId = u64;
