//! Error-to-response mapping
//!
//! Client errors become JSON error envelopes that keep the upstream status
//! code: a 404 from the management API answers as 404 here, never as a
//! generic 500, so the dashboard can tell a credential rejection from a
//! missing SIM from rate limiting. Transport failures that carry no
//! upstream status map to 502 Bad Gateway.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::warn;

use crate::metrics;

/// Wrapper so handlers can return client errors with `?`.
pub struct ApiError(pub nce_client::Error);

impl From<nce_client::Error> for ApiError {
    fn from(err: nce_client::Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Stable error classifier, used as the `type` field in the response
    /// envelope and as the upstream-error metric label.
    pub fn kind(&self) -> &'static str {
        match &self.0 {
            nce_client::Error::Authentication { .. } => "authentication_error",
            nce_client::Error::Api { .. } => "api_error",
            nce_client::Error::Http(_) => "upstream_unreachable",
            nce_client::Error::Decode(_) => "invalid_upstream_payload",
            nce_client::Error::Credentials(_) => "configuration_error",
        }
    }

    fn status(&self) -> StatusCode {
        match &self.0 {
            nce_client::Error::Authentication { status, .. }
            | nce_client::Error::Api { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            nce_client::Error::Http(_) | nce_client::Error::Decode(_) => StatusCode::BAD_GATEWAY,
            nce_client::Error::Credentials(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        metrics::record_upstream_error(kind);
        warn!(kind, status = status.as_u16(), error = %self.0, "request failed");

        let body = json!({
            "error": {
                "type": kind,
                "message": self.0.to_string(),
                "status": status.as_u16(),
            }
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn api_error_keeps_upstream_status() {
        let err = ApiError(nce_client::Error::Api {
            status: 404,
            body: "sim not found".into(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response).await;
        assert_eq!(json["error"]["type"], "api_error");
        assert_eq!(json["error"]["status"], 404);
        assert!(
            json["error"]["message"].as_str().unwrap().contains("sim not found"),
            "upstream body text must survive into the envelope"
        );
    }

    #[tokio::test]
    async fn authentication_error_keeps_upstream_status() {
        let err = ApiError(nce_client::Error::Authentication {
            status: 401,
            body: "invalid_client".into(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let json = body_json(response).await;
        assert_eq!(json["error"]["type"], "authentication_error");
        assert!(json["error"]["message"].as_str().unwrap().contains("invalid_client"));
    }

    #[tokio::test]
    async fn transport_error_maps_to_502() {
        let err = ApiError(nce_client::Error::Http("connection refused".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let json = body_json(response).await;
        assert_eq!(json["error"]["type"], "upstream_unreachable");
    }

    #[tokio::test]
    async fn bogus_upstream_status_falls_back_to_502() {
        // An upstream status outside the valid range cannot become a
        // response status; 502 marks it as a gateway-level problem
        let err = ApiError(nce_client::Error::Api {
            status: 0,
            body: String::new(),
        });
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
