//! HTTP client for the accrual service.
//!
//! One GET per poll, 20 s budget per request. A 429 is honored in place: the
//! client sleeps for the advertised `Retry-After` (60 s when absent or
//! unparsable) and then reports the attempt as transient so the caller's
//! retry loop takes over. A 204 means the accrual side does not know the
//! order yet, which is equally a reason to poll again.

use std::time::Duration;

use log::{info, trace, warn};
use lp_common::Points;
use reqwest::{header::HeaderMap, Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::db_types::OrderStatus;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum AccrualClientError {
    #[error("Accrual request failed. {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Accrual is rate limiting; backed off {0} s")]
    RateLimited(u64),
    #[error("Unexpected accrual response status: {0}")]
    UnexpectedStatus(StatusCode),
}

/// Status vocabulary of the accrual service. `Registered` exists only on that
/// side; the mart order mirrors it as `Processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccrualStatus {
    Registered,
    Processing,
    Invalid,
    Processed,
}

impl AccrualStatus {
    pub fn as_order_status(&self) -> OrderStatus {
        match self {
            AccrualStatus::Registered | AccrualStatus::Processing => OrderStatus::Processing,
            AccrualStatus::Invalid => OrderStatus::Invalid,
            AccrualStatus::Processed => OrderStatus::Processed,
        }
    }
}

/// Body of a 200 from `GET /api/orders/{number}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccrualReply {
    pub order: i64,
    pub status: AccrualStatus,
    #[serde(default)]
    pub accrual: Option<Points>,
}

#[derive(Clone)]
pub struct AccrualClient {
    client: Client,
    base_url: String,
}

impl AccrualClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create the accrual HTTP client");
        Self { client, base_url: base_url.trim_end_matches('/').to_string() }
    }

    /// Poll the accrual service for one order. `Ok(None)` means the order is
    /// not registered there yet; every `Err` is transient from the caller's
    /// point of view.
    pub async fn order_status(&self, number: &str) -> Result<Option<AccrualReply>, AccrualClientError> {
        let url = format!("{}/api/orders/{number}", self.base_url);
        trace!("📡️ Querying accrual service: {url}");
        let res = self.client.get(&url).send().await?;
        match res.status() {
            StatusCode::OK => {
                let reply: AccrualReply = res.json().await?;
                trace!("📡️ Accrual reply for [{number}]: {reply:?}");
                Ok(Some(reply))
            },
            StatusCode::NO_CONTENT => {
                info!("📡️ Accrual service does not know order [{number}] yet");
                Ok(None)
            },
            StatusCode::TOO_MANY_REQUESTS => {
                let secs = retry_after_seconds(res.headers());
                warn!("📡️ Rate limited by the accrual service; sleeping {secs} s");
                tokio::time::sleep(Duration::from_secs(secs)).await;
                Err(AccrualClientError::RateLimited(secs))
            },
            other => Err(AccrualClientError::UnexpectedStatus(other)),
        }
    }
}

fn retry_after_seconds(headers: &HeaderMap) -> u64 {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|&secs| secs > 0)
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}
