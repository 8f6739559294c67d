use {crate::event::Event, tracing::trace};

///
/// The caller-supplied watch handler.
///
/// Receives every watch/session notification together with the context values
/// bound at session spawn, replayed in their original order. The handler runs
/// on the session's dispatcher task, never on the native I/O thread, and no
/// return value is consumed from it.
///
pub type EventHandler = Box<dyn Fn(&Event, &[String]) + Send + Sync>;

///
/// Holds the one handler registered for a session, plus its bound context.
///
/// Registration happens at most once, at session spawn; afterwards the
/// registry is immutable for the session's lifetime.
///
pub struct WatcherRegistry {
    handler: Option<EventHandler>,
    bound_context: Vec<String>,
}

impl WatcherRegistry {
    pub fn new(handler: Option<EventHandler>, bound_context: Vec<String>) -> Self {
        Self {
            handler,
            bound_context,
        }
    }

    pub fn empty() -> Self {
        Self::new(None, Vec::new())
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    ///
    /// Hand one event to the registered handler. Events with no handler
    /// registered are dropped.
    ///
    pub fn dispatch(&self, event: &Event) {
        match &self.handler {
            Some(handler) => handler(event, &self.bound_context),
            None => {
                trace!(
                    "no watch handler registered, dropping event kind={} state={} path={}",
                    event.kind,
                    event.state,
                    event.path
                );
            }
        }
    }
}
