//! Token-caching API client
//!
//! Owns credential-based token acquisition with an expiry-skewed,
//! single-slot cache, a generic authenticated GET, and a fetch-all-pages
//! helper built on it. The cache is an explicit field of the client
//! instance — callers share one client by reference; there is no hidden
//! process-wide token state.
//!
//! Request flow:
//! 1. Caller invokes `authenticated_get()` (directly or via a SIM operation)
//! 2. `acquire_token()` returns the cached token or refreshes it
//! 3. The GET carries `Authorization: Bearer <token>` and a bounded timeout
//! 4. Non-2xx answers surface as errors carrying the upstream status + body

use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_DATA_TIMEOUT, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE,
    DEFAULT_TOKEN_TIMEOUT, DEFAULT_TOKEN_URL, TOKEN_EXPIRY_MARGIN_SECS,
};
use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::page::{ListPayload, PagedFetch};
use crate::token;

/// Client construction parameters. `new()` fills in the production
/// endpoints and tuning defaults; tests and the gateway override fields
/// directly.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub token_url: String,
    pub base_url: String,
    pub credentials: Credentials,
    /// Externally configured organisation id. Takes precedence over the id
    /// resolved from the token response.
    pub organisation_id: Option<String>,
    pub token_timeout: Duration,
    pub data_timeout: Duration,
    /// Items per page for full-pagination walks
    pub page_size: usize,
    /// Page cap for full-pagination walks
    pub max_pages: usize,
}

impl ClientConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            credentials,
            organisation_id: None,
            token_timeout: DEFAULT_TOKEN_TIMEOUT,
            data_timeout: DEFAULT_DATA_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// A cached bearer token.
///
/// `expires_at` is the issue instant plus the declared lifetime minus the
/// safety margin, so the client refreshes before the upstream invalidates
/// the token. Replaced wholesale on refresh, never partially mutated.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
    organisation_id: Option<String>,
}

/// Token-caching client for the management API.
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    cache: Mutex<Option<CachedToken>>,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            cache: Mutex::new(None),
        }
    }

    /// Return a valid bearer token, refreshing it when the cached one is
    /// absent or past its (margin-adjusted) expiry.
    ///
    /// The cache lock is not held across the token request, so two callers
    /// that both observe an expired token will both refresh; the last
    /// response wins. The slot stays consistent either way.
    pub async fn acquire_token(&self) -> Result<String> {
        if let Some(token) = self.cached_token().await {
            return Ok(token);
        }

        debug!("token cache miss, requesting a new token");
        let issued = Instant::now();
        let response = token::request_token(
            &self.http,
            &self.config.token_url,
            &self.config.credentials,
            self.config.token_timeout,
        )
        .await?;

        let lifetime =
            Duration::from_secs(response.expires_in.saturating_sub(TOKEN_EXPIRY_MARGIN_SECS));
        let fresh = CachedToken {
            organisation_id: response.organisation_id(),
            access_token: response.access_token,
            expires_at: issued + lifetime,
        };
        let token = fresh.access_token.clone();

        debug!(
            expires_in_secs = lifetime.as_secs(),
            organisation = fresh.organisation_id.as_deref().unwrap_or("-"),
            "token refreshed"
        );
        *self.cache.lock().await = Some(fresh);
        Ok(token)
    }

    async fn cached_token(&self) -> Option<String> {
        let cache = self.cache.lock().await;
        cache
            .as_ref()
            .filter(|cached| Instant::now() < cached.expires_at)
            .map(|cached| cached.access_token.clone())
    }

    /// Seconds until the cached token's early expiry, `None` when no token
    /// is cached. Zero means the next call will refresh.
    pub async fn token_expires_in(&self) -> Option<u64> {
        let cache = self.cache.lock().await;
        cache.as_ref().map(|cached| {
            cached
                .expires_at
                .saturating_duration_since(Instant::now())
                .as_secs()
        })
    }

    /// Organisation filter for list endpoints: the configured id when
    /// supplied, otherwise the id resolved from the token response.
    pub async fn organisation_id(&self) -> Option<String> {
        if let Some(id) = &self.config.organisation_id {
            return Some(id.clone());
        }
        let cache = self.cache.lock().await;
        cache.as_ref().and_then(|cached| cached.organisation_id.clone())
    }

    /// Authenticated GET against `base_url + path`.
    ///
    /// Refreshes the token transparently, then issues the request with a
    /// bounded timeout. A non-2xx answer becomes `Error::Api` carrying the
    /// upstream status code and body verbatim. The parsed body may be a
    /// bare array or an `{items, totalItems}` wrapper; list callers decode
    /// it through `ListPayload`.
    pub async fn authenticated_get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let token = self.acquire_token().await?;
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);

        let mut request = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.config.data_timeout);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Http(format!("GET {path} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Error::Decode(format!("invalid JSON from {path}: {e}")))
    }

    /// Walk a list endpoint to exhaustion, accumulating items in upstream
    /// order.
    ///
    /// Fetches `page=1, 2, ...` until a page comes back empty or short
    /// (fewer than `page_size` items), or until `max_pages` pages have been
    /// fetched. The cap is a guard against an upstream that paginates
    /// forever: hitting it is not an error, but the result is marked
    /// `truncated` and a warning is logged. Restartable, not resumable.
    pub async fn fetch_all_pages(
        &self,
        path: &str,
        fixed_params: &[(&str, String)],
        page_size: usize,
        max_pages: usize,
    ) -> Result<PagedFetch> {
        let mut items = Vec::new();

        for page in 1..=max_pages {
            let mut params: Vec<(&str, String)> = fixed_params.to_vec();
            params.push(("page", page.to_string()));
            params.push(("pageSize", page_size.to_string()));

            let payload = ListPayload::from_value(self.authenticated_get(path, &params).await?)?;
            let batch = payload.into_items();
            let batch_len = batch.len();
            items.extend(batch);

            if batch_len == 0 || batch_len < page_size {
                return Ok(PagedFetch {
                    items,
                    pages_fetched: page,
                    truncated: false,
                });
            }
        }

        warn!(path, max_pages, "page cap reached, result may be incomplete");
        Ok(PagedFetch {
            items,
            pages_fetched: max_pages,
            truncated: true,
        })
    }

    /// Fetch one page of the SIM list, with the organisation filter when
    /// one is resolved.
    pub async fn list_sims(&self, page: u32, page_size: usize) -> Result<ListPayload> {
        // Token acquisition also resolves the organisation filter, so even
        // the first list call carries it.
        self.acquire_token().await?;

        let mut params: Vec<(&str, String)> = vec![
            ("page", page.to_string()),
            ("pageSize", page_size.to_string()),
        ];
        if let Some(org) = self.organisation_id().await {
            params.push(("organisationId", org));
        }
        ListPayload::from_value(self.authenticated_get("/sims", &params).await?)
    }

    /// Walk the SIM list to exhaustion.
    pub async fn list_all_sims(&self) -> Result<PagedFetch> {
        self.acquire_token().await?;

        let mut fixed: Vec<(&str, String)> = Vec::new();
        if let Some(org) = self.organisation_id().await {
            fixed.push(("organisationId", org));
        }
        self.fetch_all_pages("/sims", &fixed, self.config.page_size, self.config.max_pages)
            .await
    }

    /// Details for a single SIM.
    pub async fn sim_details(&self, iccid: &str) -> Result<Value> {
        self.authenticated_get(&format!("/sims/{iccid}"), &[]).await
    }

    /// Best-effort quota lookup.
    ///
    /// A non-2xx upstream answer means "no quota data available" and maps
    /// to `Ok(None)`; transport and authentication failures still
    /// propagate.
    pub async fn sim_quota(&self, iccid: &str) -> Result<Option<Value>> {
        match self
            .authenticated_get(&format!("/sims/{iccid}/quota"), &[])
            .await
        {
            Ok(value) => Ok(Some(value)),
            Err(Error::Api { status, .. }) => {
                debug!(iccid, status, "quota lookup returned no data");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Usage records for one SIM over a date window (YYYY-MM-DD bounds).
    pub async fn sim_usage(&self, iccid: &str, start_date: &str, end_date: &str) -> Result<Value> {
        let params = [
            ("startDate", start_date.to_string()),
            ("endDate", end_date.to_string()),
        ];
        self.authenticated_get(&format!("/sims/{iccid}/usage"), &params)
            .await
    }

    /// One page of SMS records for a SIM.
    pub async fn sim_sms(&self, iccid: &str, page: u32, page_size: usize) -> Result<ListPayload> {
        let params = [
            ("page", page.to_string()),
            ("pageSize", page_size.to_string()),
        ];
        ListPayload::from_value(
            self.authenticated_get(&format!("/sims/{iccid}/sms"), &params)
                .await?,
        )
    }

    /// One page of connectivity events for a SIM.
    pub async fn sim_events(&self, iccid: &str, page: u32, page_size: usize) -> Result<ListPayload> {
        let params = [
            ("page", page.to_string()),
            ("pageSize", page_size.to_string()),
        ];
        ListPayload::from_value(
            self.authenticated_get(&format!("/sims/{iccid}/events"), &params)
                .await?,
        )
    }
}
