//! Declarative per-field validation rules

use super::value::{FieldValue, FormData};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Rules keyed by field name, or by dotted path for nested fields
pub type ValidationRules = HashMap<String, ValidationRule>;

/// Custom check. Receives the value under test and the form's current data.
pub type CustomCheck = Arc<dyn Fn(&FieldValue, &FormData) -> Option<String> + Send + Sync>;

/// The ways a single field can fail validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("This field is required")]
    Required,

    #[error("Minimum length is {min} characters")]
    TooShort { min: usize },

    #[error("Maximum length is {max} characters")]
    TooLong { max: usize },

    #[error("Invalid format")]
    InvalidFormat,

    #[error("{0}")]
    Custom(String),
}

/// Constraint set for one field. Every member is optional.
#[derive(Clone, Default)]
pub struct ValidationRule {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub custom: Option<CustomCheck>,
}

impl ValidationRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Custom check that only looks at the field's own value
    pub fn custom<F>(mut self, check: F) -> Self
    where
        F: Fn(&FieldValue) -> Option<String> + Send + Sync + 'static,
    {
        self.custom = Some(Arc::new(move |value, _| check(value)));
        self
    }

    /// Custom check that can read other fields, e.g. a confirmation field
    pub fn custom_with_data<F>(mut self, check: F) -> Self
    where
        F: Fn(&FieldValue, &FormData) -> Option<String> + Send + Sync + 'static,
    {
        self.custom = Some(Arc::new(check));
        self
    }

    /// Run the checks in order and stop at the first failure.
    ///
    /// Length and pattern checks only apply to text values. When the custom
    /// check is reached its answer is final.
    pub fn check(&self, value: &FieldValue, data: &FormData) -> Option<RuleViolation> {
        let text = value.as_text();

        if self.required && (!value.is_truthy() || text.is_some_and(|s| s.trim().is_empty())) {
            return Some(RuleViolation::Required);
        }

        if let Some(s) = text {
            let len = s.chars().count();
            if let Some(min) = self.min_length {
                if len < min {
                    return Some(RuleViolation::TooShort { min });
                }
            }
            if let Some(max) = self.max_length {
                if len > max {
                    return Some(RuleViolation::TooLong { max });
                }
            }
            if let Some(pattern) = &self.pattern {
                if !pattern.is_match(s) {
                    return Some(RuleViolation::InvalidFormat);
                }
            }
        }

        self.custom
            .as_ref()
            .and_then(|check| check(value, data))
            .map(RuleViolation::Custom)
    }
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("required", &self.required)
            .field("min_length", &self.min_length)
            .field("max_length", &self.max_length)
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .field("custom", &self.custom.is_some())
            .finish()
    }
}
