//! In-memory portal backend
//!
//! Stands in for the portal's API: every save waits on a timer and then
//! either succeeds with a receipt or fails, depending on configuration.

use super::traits::PortalBackend;
use crate::config::PortalConfig;
use crate::forms::FormData;
use crate::presets::FormKind;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Default simulated latency for a save
const DEFAULT_DELAY_MS: u64 = 800;
/// Accepted payloads kept for inspection; older ones are dropped
const MAX_RETAINED: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortalError {
    #[error("Portal unavailable: {0}")]
    Unavailable(String),

    #[error("Submission rejected: {0}")]
    Rejected(String),
}

/// Acknowledgement for an accepted submission
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub id: Uuid,
    pub kind: FormKind,
    pub received_at: DateTime<Utc>,
    /// Size of the serialized payload in bytes
    pub payload_bytes: usize,
}

/// Mock backend that simulates latency with a timer
pub struct MockPortal {
    delay: Duration,
    fail: bool,
    accepted: AtomicUsize,
    /// The most recent accepted submissions, newest last
    received: Mutex<VecDeque<(SubmissionReceipt, FormData)>>,
}

impl MockPortal {
    pub fn new(delay: Duration, fail: bool) -> Self {
        Self {
            delay,
            fail,
            accepted: AtomicUsize::new(0),
            received: Mutex::new(VecDeque::new()),
        }
    }

    pub fn from_config(config: &PortalConfig) -> Self {
        Self::new(
            Duration::from_millis(config.submit_delay_ms.unwrap_or(DEFAULT_DELAY_MS)),
            config.simulate_failure.unwrap_or(false),
        )
    }

    /// Number of submissions accepted so far
    pub fn submission_count(&self) -> usize {
        self.accepted.load(Ordering::Relaxed)
    }

    /// Most recently accepted submission
    pub fn last_submission(&self) -> Option<(SubmissionReceipt, FormData)> {
        self.received.lock().ok()?.back().cloned()
    }

    /// Number of accepted payloads still held
    pub fn retained(&self) -> usize {
        self.received.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl PortalBackend for MockPortal {
    async fn submit(
        &self,
        kind: FormKind,
        data: FormData,
    ) -> Result<SubmissionReceipt, PortalError> {
        tokio::time::sleep(self.delay).await;

        if self.fail {
            tracing::warn!(form = kind.slug(), "Simulated portal outage");
            return Err(PortalError::Unavailable("network down".to_string()));
        }

        let payload = serde_json::to_vec(&data)
            .map_err(|e| PortalError::Rejected(format!("Unserializable form: {e}")))?;
        let receipt = SubmissionReceipt {
            id: Uuid::new_v4(),
            kind,
            received_at: Utc::now(),
            payload_bytes: payload.len(),
        };
        tracing::info!(form = kind.slug(), id = %receipt.id, "Form saved");

        let mut received = self
            .received
            .lock()
            .map_err(|_| PortalError::Unavailable("store poisoned".to_string()))?;
        if received.len() == MAX_RETAINED {
            received.pop_front();
        }
        received.push_back((receipt.clone(), data));
        self.accepted.fetch_add(1, Ordering::Relaxed);
        Ok(receipt)
    }
}
