//! Machine-readable error codes carried in error bodies

pub const INVALID_INPUT: &str = "INVALID_INPUT";
pub const PAYLOAD_TOO_LARGE: &str = "PAYLOAD_TOO_LARGE";
pub const UPSTREAM_UNAVAILABLE: &str = "UPSTREAM_UNAVAILABLE";
pub const UPSTREAM_REJECTED: &str = "UPSTREAM_REJECTED";
pub const UPSTREAM_MALFORMED: &str = "UPSTREAM_MALFORMED";
pub const NOT_FOUND: &str = "NOT_FOUND";
