//! Application state and key handling for the portal front-end

use crate::config::PortalConfig;
use crate::forms::{FieldValue, FileHandle, FormEngine, FormError};
use crate::portal::{MockPortal, PortalBackend, PortalError};
use crate::presets::{FieldKind, FieldSpec, FormKind, FormPreset};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::Path;
use std::sync::Arc;

/// Raw text typed into a field whose stored value is not text: a number
/// still being entered, or the path of a file about to be attached
#[derive(Debug, Clone, PartialEq, Eq)]
struct Draft {
    field: usize,
    text: String,
}

/// Main application state
pub struct App {
    pub preset: FormPreset,
    pub engine: FormEngine,
    /// Index into `preset.fields`
    pub active_field: usize,
    /// Show every stored error, not only those of touched fields
    pub show_all_errors: bool,
    /// Last notification, with whether it reports a failure
    pub status_message: Option<(String, bool)>,
    backend: Arc<dyn PortalBackend>,
    draft: Option<Draft>,
    submit_requested: bool,
    should_quit: bool,
}

impl App {
    pub fn new(config: &PortalConfig) -> Self {
        Self::with_backend(config, Arc::new(MockPortal::from_config(config)))
    }

    pub fn with_backend(config: &PortalConfig, backend: Arc<dyn PortalBackend>) -> Self {
        let kind = match config.initial_form.as_deref() {
            Some(slug) => FormKind::from_slug(slug).unwrap_or_else(|| {
                tracing::warn!(slug, "Unknown initial form, falling back to login");
                FormKind::default()
            }),
            None => FormKind::default(),
        };
        let preset = FormPreset::for_kind(kind);
        Self {
            engine: preset.engine(),
            preset,
            active_field: 0,
            show_all_errors: false,
            status_message: None,
            backend,
            draft: None,
            submit_requested: false,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn form_kind(&self) -> FormKind {
        self.preset.kind
    }

    pub fn active_spec(&self) -> Option<&FieldSpec> {
        self.preset.fields.get(self.active_field)
    }

    /// Text being typed into field `idx` that is not yet (or not directly)
    /// reflected in its value
    pub fn draft_text(&self, idx: usize) -> Option<&str> {
        self.draft
            .as_ref()
            .filter(|d| d.field == idx)
            .map(|d| d.text.as_str())
    }

    /// Error to render for a field
    pub fn visible_error(&self, path: &str) -> Option<&str> {
        if self.show_all_errors {
            self.engine
                .errors()
                .get(path)
                .map(String::as_str)
                .filter(|e| !e.is_empty())
        } else {
            self.engine.field_error(path)
        }
    }

    /// Replace the current form with a fresh instance of another one
    pub fn switch_form(&mut self, kind: FormKind) {
        self.preset = FormPreset::for_kind(kind);
        self.engine = self.preset.engine();
        self.active_field = 0;
        self.show_all_errors = false;
        self.status_message = None;
        self.draft = None;
    }

    pub fn next_field(&mut self) {
        let count = self.preset.fields.len();
        if count > 0 {
            self.active_field = (self.active_field + 1) % count;
        }
        self.draft = None;
    }

    pub fn prev_field(&mut self) {
        let count = self.preset.fields.len();
        if count == 0 {
            return;
        }
        if self.active_field == 0 {
            self.active_field = count - 1;
        } else {
            self.active_field -= 1;
        }
        self.draft = None;
    }

    /// Handle a key press.
    ///
    /// Submitting only queues the request; the caller drives the save with
    /// [`App::send_submission`] so it can keep redrawing meanwhile.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }
        if self.engine.is_submitting() {
            return Ok(());
        }

        match key.code {
            KeyCode::Char('s') if ctrl => self.request_submit(),
            KeyCode::Char('w') if key.modifiers.contains(crate::platform::SAVE_MODIFIER) => {
                self.request_submit()
            }
            KeyCode::Char('n') if ctrl => self.switch_form(self.form_kind().next()),
            KeyCode::Char('p') if ctrl => self.switch_form(self.form_kind().prev()),
            KeyCode::Tab => self.next_field(),
            KeyCode::BackTab => self.prev_field(),
            KeyCode::Esc => {
                self.engine.reset();
                self.draft = None;
                self.show_all_errors = false;
                self.status_message = Some(("Form cleared".to_string(), false));
            }
            KeyCode::Enter => match self.active_kind() {
                Some(FieldKind::Multiline) => self.edit_active(|v| v.with_char('\n')),
                Some(FieldKind::Files) if self.draft_text(self.active_field).is_some() => {
                    self.attach_draft_file()
                }
                _ => self.next_field(),
            },
            KeyCode::Char(' ') if self.active_kind() == Some(FieldKind::Toggle) => {
                self.edit_active(|v| FieldValue::Bool(!v.as_bool().unwrap_or(false)));
            }
            KeyCode::Char(c) if !ctrl => self.type_char(c),
            KeyCode::Backspace => self.delete_char(),
            _ => {}
        }
        Ok(())
    }

    fn active_kind(&self) -> Option<FieldKind> {
        self.active_spec().map(|s| s.kind)
    }

    fn type_char(&mut self, c: char) {
        match self.active_kind() {
            Some(FieldKind::Text | FieldKind::Secret | FieldKind::Multiline) => {
                self.edit_active(|v| match v {
                    FieldValue::Null => FieldValue::Text(c.to_string()),
                    other => other.with_char(c),
                });
            }
            Some(FieldKind::Number) if c.is_ascii_digit() || c == '.' => {
                let mut text = self.active_draft();
                if c == '.' && text.contains('.') {
                    return;
                }
                text.push(c);
                self.set_number_draft(text);
            }
            Some(FieldKind::Files) => {
                let mut text = self.active_draft();
                text.push(c);
                self.draft = Some(Draft {
                    field: self.active_field,
                    text,
                });
            }
            _ => {}
        }
    }

    fn delete_char(&mut self) {
        match self.active_kind() {
            Some(FieldKind::Number) => {
                let mut text = self.active_draft();
                text.pop();
                self.set_number_draft(text);
            }
            Some(FieldKind::Files) => {
                let idx = self.active_field;
                if let Some(draft) = self
                    .draft
                    .as_mut()
                    .filter(|d| d.field == idx && !d.text.is_empty())
                {
                    draft.text.pop();
                    return;
                }
                self.draft = None;
                self.edit_active(|v| match v {
                    FieldValue::Files(files) => {
                        FieldValue::Files(files[..files.len().saturating_sub(1)].to_vec())
                    }
                    other => other.clone(),
                });
            }
            _ => self.edit_active(FieldValue::without_last_char),
        }
    }

    /// Draft for the focused field, seeded from its value when a number
    /// starts being edited
    fn active_draft(&self) -> String {
        if let Some(text) = self.draft_text(self.active_field) {
            return text.to_string();
        }
        match self.active_spec() {
            Some(spec) if spec.kind == FieldKind::Number => self
                .engine
                .value(spec.path)
                .map(FieldValue::display_value)
                .unwrap_or_default(),
            _ => String::new(),
        }
    }

    /// Keep the typed text and store what it parses to. A lone `.` is
    /// not a number yet and leaves the field empty.
    fn set_number_draft(&mut self, text: String) {
        let value = text
            .parse::<f64>()
            .map_or(FieldValue::Null, FieldValue::Number);
        self.draft = Some(Draft {
            field: self.active_field,
            text,
        });
        self.edit_active(|_| value);
    }

    /// Attach the file whose path has been typed into the focused field
    fn attach_draft_file(&mut self) {
        let typed = self.active_draft();
        let path = typed.trim();
        if path.is_empty() {
            self.draft = None;
            return;
        }

        let size = match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => meta.len(),
            Ok(_) => {
                self.status_message = Some((format!("{path} is not a file"), true));
                return;
            }
            Err(err) => {
                tracing::debug!(path, error = %err, "Attachment not readable");
                self.status_message = Some((format!("Cannot attach {path}: {err}"), true));
                return;
            }
        };
        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());
        let handle = FileHandle::new(name, size);

        self.draft = None;
        self.edit_active(|v| {
            let mut files = match v {
                FieldValue::Files(files) => files.clone(),
                _ => Vec::new(),
            };
            files.push(handle);
            FieldValue::Files(files)
        });
    }

    /// Apply an edit to the focused field through the engine
    fn edit_active(&mut self, edit: impl FnOnce(&FieldValue) -> FieldValue) {
        let Some(spec) = self.active_spec().cloned() else {
            return;
        };
        let current = self.engine.value(spec.path).cloned().unwrap_or_default();
        let updated = edit(&current);
        if let Err(err) = self.update(&spec, updated) {
            tracing::warn!(field = spec.path, error = %err, "Field update rejected");
            self.status_message = Some((err.to_string(), true));
        }
    }

    fn update(&mut self, spec: &FieldSpec, value: FieldValue) -> Result<(), FormError> {
        if spec.is_nested() {
            self.engine.update_nested_field(spec.path, value)
        } else {
            self.engine.update_field(spec.path, value)
        }
    }

    /// Validate the whole form and queue it for sending if it passes
    pub fn request_submit(&mut self) {
        if self.engine.is_submitting() || self.submit_requested {
            return;
        }
        if !self.engine.validate_all() {
            self.show_all_errors = true;
            self.status_message = Some(("Please fix the highlighted fields".to_string(), true));
            return;
        }
        self.submit_requested = true;
        self.status_message = Some((format!("Saving {}...", self.form_kind().title()), false));
    }

    /// Take a queued submit request, if any
    pub fn take_submit_request(&mut self) -> bool {
        std::mem::take(&mut self.submit_requested)
    }

    /// Send the current data to the backend. The engine's submitting flag
    /// stays raised until this future completes or is dropped, and only a
    /// shared borrow is held so the form can be drawn meanwhile.
    pub async fn send_submission(&self) -> Result<(), PortalError> {
        let kind = self.form_kind();
        let backend = Arc::clone(&self.backend);
        let mut outcome = Ok(());

        self.engine
            .handle_submit(
                |data| async move { backend.submit(kind, data).await },
                || {},
                |err| outcome = Err(err),
            )
            .await;
        outcome
    }

    /// Apply the result of [`App::send_submission`]
    pub fn finish_submit(&mut self, outcome: Result<(), PortalError>) {
        match outcome {
            Ok(()) => {
                self.engine.reset();
                self.draft = None;
                self.show_all_errors = false;
                self.active_field = 0;
                self.status_message = Some((format!("{} saved", self.form_kind().title()), false));
            }
            Err(err) => self.status_message = Some((err.to_string(), true)),
        }
    }

    /// Validate and, if the form passes, send it and apply the result
    pub async fn submit(&mut self) {
        self.request_submit();
        if self.take_submit_request() {
            let outcome = self.send_submission().await;
            self.finish_submit(outcome);
        }
    }
}
