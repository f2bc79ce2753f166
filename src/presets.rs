//! Catalogue of the portal's forms: field layout, initial values and rules

use crate::forms::{FieldValue, FormData, FormEngine, ValidationRule, ValidationRules};
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));
static POSTCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}$").expect("valid regex"));
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid regex"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+?[\d ]{8,15})?$").expect("valid regex"));

/// Largest attachment accepted on a clinical note (10 MB)
const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;
const MAX_ATTACHMENTS: usize = 5;
const MAX_SHARE_DAYS: f64 = 90.0;

/// Every form the portal offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormKind {
    #[default]
    Login,
    Register,
    PatientProfile,
    Appointment,
    ClinicalNote,
    HealthGoal,
    ShareRecord,
}

impl FormKind {
    pub const ALL: [FormKind; 7] = [
        FormKind::Login,
        FormKind::Register,
        FormKind::PatientProfile,
        FormKind::Appointment,
        FormKind::ClinicalNote,
        FormKind::HealthGoal,
        FormKind::ShareRecord,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::PatientProfile => "patient-profile",
            Self::Appointment => "appointment",
            Self::ClinicalNote => "clinical-note",
            Self::HealthGoal => "health-goal",
            Self::ShareRecord => "share-record",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Sign In",
            Self::Register => "Create Account",
            Self::PatientProfile => "Patient Profile",
            Self::Appointment => "Book Appointment",
            Self::ClinicalNote => "Clinical Note",
            Self::HealthGoal => "Health Goal",
            Self::ShareRecord => "Share Records",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.slug() == slug)
    }

    pub fn next(&self) -> Self {
        let i = self.index();
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let i = self.index();
        if i == 0 {
            Self::ALL[Self::ALL.len() - 1]
        } else {
            Self::ALL[i - 1]
        }
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|k| k == self).unwrap_or(0)
    }
}

/// How a field is edited and rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Secret,
    Multiline,
    Number,
    Toggle,
    Files,
}

/// Layout entry for one field. `path` may be dotted for nested values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub path: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn new(path: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { path, label, kind }
    }

    pub fn is_nested(&self) -> bool {
        self.path.contains('.')
    }
}

/// A complete form definition
#[derive(Debug, Clone)]
pub struct FormPreset {
    pub kind: FormKind,
    pub fields: Vec<FieldSpec>,
    pub initial: FormData,
    pub rules: ValidationRules,
}

impl FormPreset {
    pub fn for_kind(kind: FormKind) -> Self {
        match kind {
            FormKind::Login => login(),
            FormKind::Register => register(),
            FormKind::PatientProfile => patient_profile(),
            FormKind::Appointment => appointment(),
            FormKind::ClinicalNote => clinical_note(),
            FormKind::HealthGoal => health_goal(),
            FormKind::ShareRecord => share_record(),
        }
    }

    /// Fresh engine seeded with this preset's initial values and rules
    pub fn engine(&self) -> FormEngine {
        FormEngine::new(self.initial.clone(), self.rules.clone())
    }
}

fn initial(entries: Vec<(&str, FieldValue)>) -> FormData {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn rules(entries: Vec<(&str, ValidationRule)>) -> ValidationRules {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn email_rule() -> ValidationRule {
    ValidationRule::new().required().pattern(EMAIL_RE.clone())
}

fn login() -> FormPreset {
    FormPreset {
        kind: FormKind::Login,
        fields: vec![
            FieldSpec::new("email", "Email", FieldKind::Text),
            FieldSpec::new("password", "Password", FieldKind::Secret),
            FieldSpec::new("remember_me", "Remember me", FieldKind::Toggle),
        ],
        initial: initial(vec![
            ("email", FieldValue::text("")),
            ("password", FieldValue::text("")),
            ("remember_me", FieldValue::Bool(false)),
        ]),
        rules: rules(vec![
            ("email", email_rule()),
            ("password", ValidationRule::new().required()),
        ]),
    }
}

fn register() -> FormPreset {
    FormPreset {
        kind: FormKind::Register,
        fields: vec![
            FieldSpec::new("first_name", "First name", FieldKind::Text),
            FieldSpec::new("last_name", "Last name", FieldKind::Text),
            FieldSpec::new("email", "Email", FieldKind::Text),
            FieldSpec::new("role", "Role (patient/provider)", FieldKind::Text),
            FieldSpec::new("password", "Password", FieldKind::Secret),
            FieldSpec::new("confirm_password", "Confirm password", FieldKind::Secret),
            FieldSpec::new("accept_terms", "I accept the terms", FieldKind::Toggle),
        ],
        initial: initial(vec![
            ("first_name", FieldValue::text("")),
            ("last_name", FieldValue::text("")),
            ("email", FieldValue::text("")),
            ("role", FieldValue::text("patient")),
            ("password", FieldValue::text("")),
            ("confirm_password", FieldValue::text("")),
            ("accept_terms", FieldValue::Bool(false)),
        ]),
        rules: rules(vec![
            ("first_name", ValidationRule::new().required().max_length(50)),
            ("last_name", ValidationRule::new().required().max_length(50)),
            ("email", email_rule()),
            (
                "role",
                ValidationRule::new().required().custom(|v| {
                    match v.as_text() {
                        Some("patient") | Some("provider") => None,
                        _ => Some("Role must be patient or provider".to_string()),
                    }
                }),
            ),
            ("password", ValidationRule::new().required().min_length(8)),
            (
                "confirm_password",
                ValidationRule::new().required().custom_with_data(|v, data| {
                    (data.get("password") != Some(v)).then(|| "Passwords do not match".to_string())
                }),
            ),
            ("accept_terms", ValidationRule::new().required()),
        ]),
    }
}

fn patient_profile() -> FormPreset {
    FormPreset {
        kind: FormKind::PatientProfile,
        fields: vec![
            FieldSpec::new("full_name", "Full name", FieldKind::Text),
            FieldSpec::new("date_of_birth", "Date of birth (YYYY-MM-DD)", FieldKind::Text),
            FieldSpec::new("phone", "Phone", FieldKind::Text),
            FieldSpec::new("address.street", "Street", FieldKind::Text),
            FieldSpec::new("address.suburb", "Suburb", FieldKind::Text),
            FieldSpec::new("address.postcode", "Postcode", FieldKind::Text),
        ],
        initial: initial(vec![
            ("full_name", FieldValue::text("")),
            ("date_of_birth", FieldValue::text("")),
            ("phone", FieldValue::text("")),
            (
                "address",
                FieldValue::Group(initial(vec![
                    ("street", FieldValue::text("")),
                    ("suburb", FieldValue::text("")),
                    ("postcode", FieldValue::text("")),
                ])),
            ),
        ]),
        rules: rules(vec![
            ("full_name", ValidationRule::new().required().min_length(2)),
            (
                "date_of_birth",
                ValidationRule::new()
                    .required()
                    .pattern(DATE_RE.clone())
                    .custom(|v| date_error(v.as_text())),
            ),
            ("phone", ValidationRule::new().pattern(PHONE_RE.clone())),
            ("address.street", ValidationRule::new().required()),
            (
                "address.postcode",
                ValidationRule::new().required().pattern(POSTCODE_RE.clone()),
            ),
        ]),
    }
}

fn appointment() -> FormPreset {
    FormPreset {
        kind: FormKind::Appointment,
        fields: vec![
            FieldSpec::new("provider", "Provider", FieldKind::Text),
            FieldSpec::new("date", "Date (YYYY-MM-DD)", FieldKind::Text),
            FieldSpec::new("time", "Time (HH:MM)", FieldKind::Text),
            FieldSpec::new("reason", "Reason for visit", FieldKind::Multiline),
            FieldSpec::new("telehealth", "Telehealth", FieldKind::Toggle),
        ],
        initial: initial(vec![
            ("provider", FieldValue::text("")),
            ("date", FieldValue::text("")),
            ("time", FieldValue::text("")),
            ("reason", FieldValue::text("")),
            ("telehealth", FieldValue::Bool(false)),
        ]),
        rules: rules(vec![
            ("provider", ValidationRule::new().required()),
            (
                "date",
                ValidationRule::new()
                    .required()
                    .pattern(DATE_RE.clone())
                    .custom(|v| date_error(v.as_text())),
            ),
            ("time", ValidationRule::new().required().pattern(TIME_RE.clone())),
            (
                "reason",
                ValidationRule::new().required().min_length(10).max_length(500),
            ),
        ]),
    }
}

fn clinical_note() -> FormPreset {
    FormPreset {
        kind: FormKind::ClinicalNote,
        fields: vec![
            FieldSpec::new("title", "Title", FieldKind::Text),
            FieldSpec::new("content", "Note", FieldKind::Multiline),
            FieldSpec::new("attachments", "Attachments", FieldKind::Files),
            FieldSpec::new("shared_with_patient", "Visible to patient", FieldKind::Toggle),
        ],
        initial: initial(vec![
            ("title", FieldValue::text("")),
            ("content", FieldValue::text("")),
            ("attachments", FieldValue::Files(Vec::new())),
            ("shared_with_patient", FieldValue::Bool(true)),
        ]),
        rules: rules(vec![
            ("title", ValidationRule::new().required().max_length(100)),
            ("content", ValidationRule::new().required().min_length(10)),
            (
                "attachments",
                ValidationRule::new().custom(|v| match v {
                    FieldValue::Files(files) if files.len() > MAX_ATTACHMENTS => {
                        Some(format!("At most {MAX_ATTACHMENTS} attachments allowed"))
                    }
                    FieldValue::Files(files) => files
                        .iter()
                        .find(|f| f.size > MAX_ATTACHMENT_BYTES)
                        .map(|f| format!("{} is larger than 10 MB", f.name)),
                    _ => None,
                }),
            ),
        ]),
    }
}

fn health_goal() -> FormPreset {
    FormPreset {
        kind: FormKind::HealthGoal,
        fields: vec![
            FieldSpec::new("title", "Goal", FieldKind::Text),
            FieldSpec::new("target", "Target value", FieldKind::Number),
            FieldSpec::new("unit", "Unit", FieldKind::Text),
            FieldSpec::new("notes", "Notes", FieldKind::Multiline),
        ],
        initial: initial(vec![
            ("title", FieldValue::text("")),
            ("target", FieldValue::Null),
            ("unit", FieldValue::text("")),
            ("notes", FieldValue::text("")),
        ]),
        rules: rules(vec![
            ("title", ValidationRule::new().required().max_length(80)),
            (
                "target",
                ValidationRule::new().required().custom(|v| match v.as_number() {
                    Some(n) if n > 0.0 => None,
                    _ => Some("Target must be a positive number".to_string()),
                }),
            ),
            ("unit", ValidationRule::new().required()),
            ("notes", ValidationRule::new().max_length(280)),
        ]),
    }
}

fn share_record() -> FormPreset {
    FormPreset {
        kind: FormKind::ShareRecord,
        fields: vec![
            FieldSpec::new("recipient_email", "Recipient email", FieldKind::Text),
            FieldSpec::new("expires_in_days", "Expires in (days)", FieldKind::Number),
            FieldSpec::new("message", "Message", FieldKind::Multiline),
            FieldSpec::new("consent", "I consent to sharing", FieldKind::Toggle),
        ],
        initial: initial(vec![
            ("recipient_email", FieldValue::text("")),
            ("expires_in_days", FieldValue::Number(30.0)),
            ("message", FieldValue::text("")),
            ("consent", FieldValue::Bool(false)),
        ]),
        rules: rules(vec![
            ("recipient_email", email_rule()),
            (
                "expires_in_days",
                ValidationRule::new().required().custom(|v| match v.as_number() {
                    Some(n) if (1.0..=MAX_SHARE_DAYS).contains(&n) && n.fract() == 0.0 => None,
                    _ => Some(format!("Choose between 1 and {MAX_SHARE_DAYS} days")),
                }),
            ),
            ("message", ValidationRule::new().max_length(500)),
            (
                "consent",
                ValidationRule::new().custom(|v| {
                    (v.as_bool() != Some(true))
                        .then(|| "Consent is required to share records".to_string())
                }),
            ),
        ]),
    }
}

/// Calendar check for text already shaped like `YYYY-MM-DD`
fn date_error(text: Option<&str>) -> Option<String> {
    let text = text?;
    chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .err()
        .map(|_| "Not a valid calendar date".to_string())
}
