//! HTTP client factory with consistent timeout configuration.
//!
//! Every outbound client (Stripe, Gemini, Replicate) is built here so no
//! provider call can hang a request indefinitely. Calls are never retried.

use reqwest::Client;
use std::time::Duration;

/// Default connect timeout (TCP handshake + TLS).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default request timeout (total request/response time).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Media generation runs synchronously on the provider side and routinely
/// takes longer than a billing or text call.
pub const MEDIA_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub fn build_client() -> Result<Client, reqwest::Error> {
    build_client_with_timeout(DEFAULT_REQUEST_TIMEOUT)
}

pub fn build_client_with_timeout(request_timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .timeout(request_timeout)
        .build()
}
