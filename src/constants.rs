// Constants module - defaults for the server, the resize policy and origin fetches
//
// CLI flags and YAML keys fall back to these values when unset.

// =============================================================================
// Server defaults
// =============================================================================

/// Default bind address
pub const DEFAULT_ADDRESS: &str = "127.0.0.1";

/// Default bind port (0xBEEF)
pub const DEFAULT_PORT: u16 = 48879;

/// Default number of worker threads (debug mode always runs a single worker)
pub const DEFAULT_THREADS: usize = 4;

// =============================================================================
// Policy defaults
// =============================================================================

/// Resample method used when neither the config nor the request names one
pub const DEFAULT_RESAMPLE: &str = "antialias";

// =============================================================================
// Resize limits
// =============================================================================

/// Largest output image accepted, in pixels (width × height)
///
/// Requests above this are rejected before any fetch; an output buffer this
/// size is about 200 MB at four bytes per pixel.
pub const MAX_OUTPUT_PIXELS: u64 = 50_000_000;

// =============================================================================
// Origin defaults
// =============================================================================

/// Scheme prepended to every origin path segment
pub const ORIGIN_SCHEME: &str = "http://";

/// Default maximum origin body size (32 MB)
pub const DEFAULT_MAX_ORIGIN_BODY_SIZE: usize = 32 * 1024 * 1024;

/// Default time allowed to establish an origin connection (20 seconds)
pub const DEFAULT_ORIGIN_CONNECT_TIMEOUT_SECS: u64 = 20;

/// Default time allowed for a whole origin fetch, body included (20 seconds)
pub const DEFAULT_ORIGIN_REQUEST_TIMEOUT_SECS: u64 = 20;

/// Origin response headers forwarded to the client, and nothing else
pub const PRESERVED_ORIGIN_HEADERS: [&str; 3] = ["Cache-Control", "Expires", "Last-Modified"];

// =============================================================================
// Reason phrases
// =============================================================================

pub const REASON_ORIGIN_NOT_ALLOWED: &str = "Origin Not Allowed";
pub const REASON_SIZE_NOT_ALLOWED: &str = "Size Not Allowed";
pub const REASON_RESAMPLE_NOT_ALLOWED: &str = "Resample Method Not Allowed";
