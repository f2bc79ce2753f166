//! Trait abstraction for the portal backend to enable mocking in tests

use super::client::{PortalError, SubmissionReceipt};
use crate::forms::FormData;
use crate::presets::FormKind;
use async_trait::async_trait;

/// Backend that accepts completed forms
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PortalBackend: Send + Sync {
    /// Persist a submitted form
    async fn submit(
        &self,
        kind: FormKind,
        data: FormData,
    ) -> Result<SubmissionReceipt, PortalError>;
}
