//! Error types for API client operations
//!
//! `Authentication` and `Api` carry the upstream status code and body text
//! verbatim so callers can distinguish credential rejection from not-found
//! from rate limiting. No variant is ever collapsed into another in a way
//! that discards that information.

/// Errors from client operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The token endpoint returned a non-2xx response
    #[error("authentication failed ({status}): {body}")]
    Authentication { status: u16, body: String },

    /// A data endpoint returned a non-2xx response
    #[error("API request failed ({status}): {body}")]
    Api { status: u16, body: String },

    /// Transport failure before any upstream status was received
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The upstream body could not be parsed as the expected JSON shape
    #[error("invalid response payload: {0}")]
    Decode(String),

    /// Credentials missing from the environment
    #[error("missing credentials: {0}")]
    Credentials(String),
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_preserves_status_and_body() {
        let err = Error::Api {
            status: 404,
            body: r#"{"message":"sim not found"}"#.into(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("404"), "got: {rendered}");
        assert!(rendered.contains("sim not found"), "got: {rendered}");
    }

    #[test]
    fn authentication_error_preserves_status_and_body() {
        let err = Error::Authentication {
            status: 401,
            body: "invalid_client".into(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("401"), "got: {rendered}");
        assert!(rendered.contains("invalid_client"), "got: {rendered}");
    }
}
