//! Portal backend the forms submit to

mod client;
mod traits;

pub use client::{MockPortal, PortalError, SubmissionReceipt};
pub use traits::PortalBackend;

#[cfg(test)]
pub use traits::MockPortalBackend;
