//! Form field value objects

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Snapshot of every field in a form, keyed by field name
pub type FormData = HashMap<String, FieldValue>;

/// Metadata for a file picked in an upload field. The bytes never live here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileHandle {
    pub name: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Type-safe field values
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// No value at all (never set, or cleared)
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Files(Vec<FileHandle>),
    /// Nested structure addressed with dotted paths
    Group(FormData),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Loose truthiness used by the `required` rule.
    ///
    /// Empty text, `false`, zero, NaN and `Null` are falsy. File lists and
    /// groups are truthy even when empty.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::Bool(b) => *b,
            FieldValue::Number(n) => *n != 0.0 && !n.is_nan(),
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::Files(_) | FieldValue::Group(_) => true,
        }
    }

    /// Get the text value, if this is a text field
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&FormData> {
        match self {
            FieldValue::Group(g) => Some(g),
            _ => None,
        }
    }

    /// Follow a dotted path into nested groups
    pub fn lookup(&self, path: &str) -> Option<&FieldValue> {
        path.split('.')
            .try_fold(self, |current, key| current.as_group()?.get(key))
    }

    /// Value after typing `c` into this field.
    ///
    /// Numbers take digits only; anything else, a decimal point included,
    /// leaves them unchanged since the stored value cannot hold a trailing
    /// `.`. Booleans, files and groups ignore typed characters.
    pub fn with_char(&self, c: char) -> Self {
        match self {
            FieldValue::Text(s) => {
                let mut s = s.clone();
                s.push(c);
                FieldValue::Text(s)
            }
            FieldValue::Null if !c.is_ascii_digit() => FieldValue::Text(c.to_string()),
            FieldValue::Number(_) if !c.is_ascii_digit() => self.clone(),
            FieldValue::Null | FieldValue::Number(_) => {
                let mut raw = self.display_value();
                raw.push(c);
                match raw.parse::<f64>() {
                    Ok(n) => FieldValue::Number(n),
                    Err(_) => self.clone(),
                }
            }
            other => other.clone(),
        }
    }

    /// Value after deleting the last character
    pub fn without_last_char(&self) -> Self {
        match self {
            FieldValue::Text(s) => {
                let mut s = s.clone();
                s.pop();
                FieldValue::Text(s)
            }
            FieldValue::Number(_) => {
                let mut raw = self.display_value();
                raw.pop();
                if raw.is_empty() || raw == "-" {
                    FieldValue::Null
                } else {
                    raw.parse::<f64>().map_or(FieldValue::Null, FieldValue::Number)
                }
            }
            other => other.clone(),
        }
    }

    /// Get the display value for rendering
    pub fn display_value(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(true) => "[x]".to_string(),
            FieldValue::Bool(false) => "[ ]".to_string(),
            FieldValue::Number(n) if n.fract() == 0.0 && n.is_finite() => format!("{n:.0}"),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Files(files) => match files.len() {
                0 => "(no files)".to_string(),
                1 => files[0].name.clone(),
                n => format!("{n} files"),
            },
            FieldValue::Group(g) => format!("{} fields", g.len()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<Vec<FileHandle>> for FieldValue {
    fn from(value: Vec<FileHandle>) -> Self {
        FieldValue::Files(value)
    }
}

impl From<FormData> for FieldValue {
    fn from(value: FormData) -> Self {
        FieldValue::Group(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    mod truthiness {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_falsy_values() {
            assert!(!FieldValue::Null.is_truthy());
            assert!(!FieldValue::Bool(false).is_truthy());
            assert!(!FieldValue::Number(0.0).is_truthy());
            assert!(!FieldValue::Number(f64::NAN).is_truthy());
            assert!(!FieldValue::text("").is_truthy());
        }

        #[test]
        fn test_truthy_values() {
            assert!(FieldValue::Bool(true).is_truthy());
            assert!(FieldValue::Number(-1.5).is_truthy());
            assert!(FieldValue::text(" ").is_truthy());
            assert!(FieldValue::Files(vec![]).is_truthy());
            assert!(FieldValue::Group(FormData::new()).is_truthy());
        }
    }

    mod editing {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_with_char_appends_text() {
            let value = FieldValue::text("ab").with_char('c');
            assert_eq!(value, FieldValue::text("abc"));
        }

        #[test]
        fn test_with_char_builds_number() {
            let value = FieldValue::Number(4.0).with_char('2');
            assert_eq!(value, FieldValue::Number(42.0));
        }

        #[test]
        fn test_with_char_rejects_non_digit_on_number() {
            let value = FieldValue::Number(4.0).with_char('x');
            assert_eq!(value, FieldValue::Number(4.0));
        }

        #[test]
        fn test_with_char_keeps_number_on_decimal_point() {
            assert_eq!(FieldValue::Number(1.0).with_char('.'), FieldValue::Number(1.0));
        }

        #[test]
        fn test_with_char_on_null_starts_text_or_number() {
            assert_eq!(FieldValue::Null.with_char('7'), FieldValue::Number(7.0));
            assert_eq!(FieldValue::Null.with_char('a'), FieldValue::text("a"));
        }

        #[test]
        fn test_with_char_ignored_on_bool() {
            assert_eq!(FieldValue::Bool(true).with_char('a'), FieldValue::Bool(true));
        }

        #[test]
        fn test_without_last_char() {
            assert_eq!(
                FieldValue::text("abc").without_last_char(),
                FieldValue::text("ab")
            );
            assert_eq!(
                FieldValue::Number(42.0).without_last_char(),
                FieldValue::Number(4.0)
            );
            assert_eq!(FieldValue::Number(4.0).without_last_char(), FieldValue::Null);
        }
    }

    mod display {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_display_values() {
            assert_eq!(FieldValue::Null.display_value(), "");
            assert_eq!(FieldValue::Bool(true).display_value(), "[x]");
            assert_eq!(FieldValue::Number(12.0).display_value(), "12");
            assert_eq!(FieldValue::Number(1.5).display_value(), "1.5");
            assert_eq!(
                FieldValue::Files(vec![FileHandle::new("scan.pdf", 10)]).display_value(),
                "scan.pdf"
            );
            assert_eq!(
                FieldValue::Files(vec![
                    FileHandle::new("a.pdf", 1),
                    FileHandle::new("b.pdf", 2)
                ])
                .display_value(),
                "2 files"
            );
        }
    }

    mod lookup {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_lookup_nested() {
            let mut address = FormData::new();
            address.insert("postcode".to_string(), FieldValue::text("3000"));
            let mut root = FormData::new();
            root.insert("address".to_string(), FieldValue::Group(address));
            let root = FieldValue::Group(root);

            assert_eq!(
                root.lookup("address.postcode"),
                Some(&FieldValue::text("3000"))
            );
            assert!(root.lookup("address.street").is_none());
            assert!(root.lookup("address.postcode.extra").is_none());
        }
    }

    mod serde_shape {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_deserialize_untagged_json() {
            let json = r#"{
                "name": "Ada",
                "age": 36,
                "consent": true,
                "notes": null,
                "documents": [{"name": "scan.pdf", "size": 2048}],
                "address": {"postcode": "3000"}
            }"#;
            let data: FormData = serde_json::from_str(json).unwrap();

            assert_eq!(data["name"], FieldValue::text("Ada"));
            assert_eq!(data["age"], FieldValue::Number(36.0));
            assert_eq!(data["consent"], FieldValue::Bool(true));
            assert_eq!(data["notes"], FieldValue::Null);
            assert_eq!(
                data["documents"],
                FieldValue::Files(vec![FileHandle::new("scan.pdf", 2048)])
            );
            assert!(matches!(data["address"], FieldValue::Group(_)));
        }
    }
}
