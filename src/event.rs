pub const CREATED_EVENT: i32 = 1;
pub const DELETED_EVENT: i32 = 2;
pub const CHANGED_EVENT: i32 = 3;
pub const CHILD_EVENT: i32 = 4;
pub const SESSION_EVENT: i32 = -1;
pub const NOTWATCHING_EVENT: i32 = -2;

pub const CONNECTING_STATE: i32 = 1;
pub const ASSOCIATING_STATE: i32 = 2;
pub const CONNECTED_STATE: i32 = 3;
pub const EXPIRED_SESSION_STATE: i32 = -112;
pub const AUTH_FAILED_STATE: i32 = -113;

///
/// Kind of a watch/session notification.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Created,
    Deleted,
    Changed,
    ChildrenChanged,
    Session,
    NotWatching,
}

impl EventKind {
    pub fn from_raw(code: i32) -> Option<Self> {
        match code {
            CREATED_EVENT => Some(Self::Created),
            DELETED_EVENT => Some(Self::Deleted),
            CHANGED_EVENT => Some(Self::Changed),
            CHILD_EVENT => Some(Self::ChildrenChanged),
            SESSION_EVENT => Some(Self::Session),
            NOTWATCHING_EVENT => Some(Self::NotWatching),
            _ => None,
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            Self::Created => CREATED_EVENT,
            Self::Deleted => DELETED_EVENT,
            Self::Changed => CHANGED_EVENT,
            Self::ChildrenChanged => CHILD_EVENT,
            Self::Session => SESSION_EVENT,
            Self::NotWatching => NOTWATCHING_EVENT,
        }
    }
}

///
/// Liveness state of the session against the ensemble.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Associating,
    Connected,
    Expired,
    AuthFailed,
}

impl SessionState {
    pub fn from_raw(code: i32) -> Option<Self> {
        match code {
            CONNECTING_STATE => Some(Self::Connecting),
            ASSOCIATING_STATE => Some(Self::Associating),
            CONNECTED_STATE => Some(Self::Connected),
            EXPIRED_SESSION_STATE => Some(Self::Expired),
            AUTH_FAILED_STATE => Some(Self::AuthFailed),
            _ => None,
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            Self::Connecting => CONNECTING_STATE,
            Self::Associating => ASSOCIATING_STATE,
            Self::Connected => CONNECTED_STATE,
            Self::Expired => EXPIRED_SESSION_STATE,
            Self::AuthFailed => AUTH_FAILED_STATE,
        }
    }
}

///
/// One watch/session notification as handed to the registered handler.
///
/// `kind` and `state` stay raw so the handler sees exactly what the native
/// client reported; the typed accessors parse on demand. `path` is empty for
/// session-level events.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: i32,
    pub state: i32,
    pub path: String,
}

impl Event {
    pub fn kind(&self) -> Option<EventKind> {
        EventKind::from_raw(self.kind)
    }

    pub fn session_state(&self) -> Option<SessionState> {
        SessionState::from_raw(self.state)
    }
}

/// Render an event kind code. Unrecognized codes render as an empty string.
pub fn event_to_string(code: i32) -> &'static str {
    match code {
        CREATED_EVENT => "CREATED_EVENT",
        DELETED_EVENT => "DELETED_EVENT",
        CHANGED_EVENT => "CHANGED_EVENT",
        CHILD_EVENT => "CHILD_EVENT",
        SESSION_EVENT => "SESSION_EVENT",
        NOTWATCHING_EVENT => "NOTWATCHING_EVENT",
        _ => "",
    }
}

/// Render a session state code. Unrecognized codes render as an empty string.
pub fn state_to_string(code: i32) -> &'static str {
    match code {
        CONNECTING_STATE => "CONNECTING_STATE",
        ASSOCIATING_STATE => "ASSOCIATING_STATE",
        CONNECTED_STATE => "CONNECTED_STATE",
        EXPIRED_SESSION_STATE => "EXPIRED_SESSION_STATE",
        AUTH_FAILED_STATE => "AUTH_FAILED_STATE",
        _ => "",
    }
}
