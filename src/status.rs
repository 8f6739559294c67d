use core::fmt;

pub const ZOK: i32 = 0;
pub const ZSYSTEMERROR: i32 = -1;
pub const ZRUNTIMEINCONSISTENCY: i32 = -2;
pub const ZDATAINCONSISTENCY: i32 = -3;
pub const ZCONNECTIONLOSS: i32 = -4;
pub const ZMARSHALLINGERROR: i32 = -5;
pub const ZUNIMPLEMENTED: i32 = -6;
pub const ZOPERATIONTIMEOUT: i32 = -7;
pub const ZBADARGUMENTS: i32 = -8;
pub const ZINVALIDSTATE: i32 = -9;
pub const ZAPIERROR: i32 = -100;
pub const ZNONODE: i32 = -101;
pub const ZNOAUTH: i32 = -102;
pub const ZBADVERSION: i32 = -103;
pub const ZNOCHILDRENFOREPHEMERALS: i32 = -108;
pub const ZNODEEXISTS: i32 = -110;
pub const ZNOTEMPTY: i32 = -111;
pub const ZSESSIONEXPIRED: i32 = -112;
pub const ZINVALIDCALLBACK: i32 = -113;
pub const ZINVALIDACL: i32 = -114;
pub const ZAUTHFAILED: i32 = -115;
pub const ZCLOSING: i32 = -116;
pub const ZNOTHING: i32 = -117;
pub const ZSESSIONMOVED: i32 = -118;

const UNKNOWN_ERROR: &str = "unknown error";

// Messages are kept byte-for-byte compatible with the legacy bridge,
// including its wording quirks.
static STATUS_TABLE: &[(i32, &str)] = &[
    (ZOK, "ok"),
    (ZNOAUTH, "the client does not have permission"),
    (ZNONODE, "the parent node does not exist"),
    (ZCLOSING, "zookeeper is closing"),
    (ZNOTHING, "(not error) no server responses to process"),
    (ZAPIERROR, "api error"),
    (ZNOTEMPTY, "children are present; node cannot be deleted"),
    (ZAUTHFAILED, "client authentication specified"),
    (ZBADVERSION, "version conflict"),
    (ZINVALIDACL, "invalid ACL specified"),
    (ZNODEEXISTS, "the node already exists"),
    (
        ZSYSTEMERROR,
        "a system (OS) error occured; it's worth checking errno to get details",
    ),
    (ZBADARGUMENTS, "invalid input parameters"),
    (ZINVALIDSTATE, "ZOO_SESSION_EXPIRED_STATE or ZOO_AUTH_FAILED_STATE"),
    (
        ZSESSIONMOVED,
        "session moved to another server, so operation is ignored",
    ),
    (ZUNIMPLEMENTED, "operation is unimplemented"),
    (ZCONNECTIONLOSS, "connection to the server has been lost"),
    (ZSESSIONEXPIRED, "the session has been expired by the server"),
    (ZINVALIDCALLBACK, "invalid callback specified"),
    (
        ZMARSHALLINGERROR,
        "failed to marshall a request; possibly, out of memory",
    ),
    (ZOPERATIONTIMEOUT, "operation timeout"),
    (ZDATAINCONSISTENCY, "a data inconsistency was found"),
    (ZRUNTIMEINCONSISTENCY, "a runtime inconsistency was found"),
    (ZNOCHILDRENFOREPHEMERALS, "cannot create children of ephemeral nodes"),
];

///
/// Look up the diagnostic message for a native status code.
///
/// Total over all of `i32`: codes outside the table fall back to a generic
/// message instead of failing.
///
pub fn lookup(code: i32) -> &'static str {
    STATUS_TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, msg)| *msg)
        .unwrap_or(UNKNOWN_ERROR)
}

///
/// A raw status code as reported by the native client.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(pub i32);

impl Status {
    pub const OK: Status = Status(ZOK);
    pub const CLOSING: Status = Status(ZCLOSING);

    pub fn is_ok(self) -> bool {
        self.0 == ZOK
    }

    pub fn code(self) -> i32 {
        self.0
    }

    pub fn message(self) -> &'static str {
        lookup(self.0)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
