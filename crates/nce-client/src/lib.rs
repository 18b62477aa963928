//! 1NCE management API client
//!
//! Token-caching client for the 1NCE SIM management REST API: OAuth
//! client-credentials flow with an expiry-skewed in-memory token cache, a
//! generic authenticated GET, a fetch-all-pages helper, and typed SIM
//! fleet operations built on those primitives. This crate is a standalone
//! library with no dependency on the gateway binary — it can be tested and
//! used independently.
//!
//! Usage flow:
//! 1. Build `Credentials` (from config or `Credentials::from_env()`)
//! 2. Construct an `ApiClient` from a `ClientConfig`
//! 3. Call SIM operations (`list_all_sims()`, `sim_usage()`, ...) or the
//!    raw primitives (`authenticated_get()`, `fetch_all_pages()`)
//! 4. Normalize items with `SimRecord::from_item()` / `status_summary()`

pub mod client;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod page;
pub mod record;
pub mod token;

pub use client::{ApiClient, ClientConfig};
pub use constants::*;
pub use credentials::Credentials;
pub use error::{Error, Result};
pub use page::{ListPayload, PagedFetch};
pub use record::{SimRecord, UNKNOWN_STATUS, normalize_status, status_summary};
pub use token::TokenResponse;
