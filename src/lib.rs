//! Care portal forms
//!
//! Form state and field validation for the patient/provider portal, plus
//! the catalogue of portal forms, a mock backend to submit them to, and a
//! terminal front-end.

pub mod app;
pub mod config;
pub mod forms;
pub mod platform;
pub mod portal;
pub mod presets;
pub mod ui;
