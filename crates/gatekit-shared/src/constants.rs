//! Application-wide constants

/// Minimum secret length for token signing in production (256 bits).
pub const MIN_TOKEN_SECRET_BYTES: usize = 32;
pub const DEFAULT_SESSION_TTL_SECS: i64 = 86_400;
pub const DEFAULT_SESSION_COOKIE: &str = "gatekit_session";
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3_600;
pub const CSRF_TOKEN_HEADER: &str = "x-csrf-token";
