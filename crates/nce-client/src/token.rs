//! OAuth token acquisition
//!
//! One token endpoint interaction: POST with HTTP Basic Authentication and
//! a form-encoded `grant_type=client_credentials` body. The token endpoint
//! lives on the same API host but outside the versioned base path, so it is
//! configured as its own URL.

use std::time::Duration;

use serde::Deserialize;

use crate::credentials::Credentials;
use crate::error::{Error, Result};

/// Response from the token endpoint.
///
/// `expires_in` is a delta in seconds from the response time. The caller
/// converts this to an absolute instant (minus the safety margin) when
/// caching the token.
///
/// The organisation reference appears under either spelling depending on
/// the upstream deployment; both are decoded and `organisation_id()`
/// resolves the preference.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Seconds until the access token expires (delta, not absolute)
    pub expires_in: u64,
    #[serde(default)]
    organisation: Option<OrgRef>,
    #[serde(default)]
    organization: Option<OrgRef>,
}

/// Organisation object embedded in a token response. Only the id matters;
/// upstream has been observed sending it as both a string and a number.
#[derive(Debug, Deserialize)]
struct OrgRef {
    id: serde_json::Value,
}

impl OrgRef {
    fn id_string(&self) -> Option<String> {
        match &self.id {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl TokenResponse {
    /// Organisation id carried in the token response, if any.
    /// "organisation" wins when both spellings are present.
    pub fn organisation_id(&self) -> Option<String> {
        self.organisation
            .as_ref()
            .and_then(OrgRef::id_string)
            .or_else(|| self.organization.as_ref().and_then(OrgRef::id_string))
    }
}

/// Request a fresh token with the client-credentials grant.
///
/// A non-2xx response becomes `Error::Authentication` carrying the upstream
/// status and body so the caller can tell a credential rejection (401) from
/// a token-endpoint outage (5xx).
pub async fn request_token(
    client: &reqwest::Client,
    token_url: &str,
    credentials: &Credentials,
    timeout: Duration,
) -> Result<TokenResponse> {
    let response = client
        .post(token_url)
        .basic_auth(&credentials.username, Some(credentials.password()))
        .form(&[("grant_type", "client_credentials")])
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| Error::Http(format!("token request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::Authentication {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::Decode(format!("invalid token response: {e}")))
}
