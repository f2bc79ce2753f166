//! Form domain layer
//!
//! Type-safe form state with declarative per-field validation, touched
//! tracking and guarded submission.

mod engine;
mod error;
mod rules;
mod submit;
mod value;

pub use engine::FormEngine;
pub use error::FormError;
pub use rules::{CustomCheck, RuleViolation, ValidationRule, ValidationRules};
pub use submit::SubmitState;
pub use value::{FieldValue, FileHandle, FormData};
