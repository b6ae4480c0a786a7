//! Internal constants for diagram encoding and probing.

use std::time::Duration;

/// Public Kroki instance used when no service URL is configured.
pub const DEFAULT_KROKI_URL: &str = "https://kroki.io";

/// Default HTTP timeout for probe requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Number of identity hex characters kept in DOM element ids.
pub(crate) const DOM_ID_HASH_LEN: usize = 8;
