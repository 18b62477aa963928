//! 1NCE management API defaults
//!
//! Endpoint URLs for the production API plus the client-side tuning knobs.
//! None of these are secrets — credentials come from configuration and are
//! held in `Credentials`.

use std::time::Duration;

/// Token endpoint for the OAuth client-credentials grant
pub const DEFAULT_TOKEN_URL: &str = "https://api.1nce.com/management-api/oauth/token";

/// Base URL for the management REST API (v1)
pub const DEFAULT_BASE_URL: &str = "https://api.1nce.com/management-api/v1";

/// Safety margin subtracted from a token's declared lifetime, so the client
/// refreshes before the upstream actually invalidates the token.
pub const TOKEN_EXPIRY_MARGIN_SECS: u64 = 300;

/// Items requested per page when walking a list endpoint to exhaustion
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Upper bound on pages fetched in one full-pagination walk. Guards against
/// an upstream that never signals a final page; hitting it truncates the
/// result rather than erroring.
pub const DEFAULT_MAX_PAGES: usize = 100;

/// Timeout for token endpoint calls
pub const DEFAULT_TOKEN_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for data endpoint calls
pub const DEFAULT_DATA_TIMEOUT: Duration = Duration::from_secs(30);
