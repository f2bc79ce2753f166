//! Form state engine: values, per-field errors, touched tracking and submission

use super::error::FormError;
use super::rules::ValidationRules;
use super::submit::SubmitState;
use super::value::{FieldValue, FormData};
use std::collections::{HashMap, HashSet};
use std::future::Future;

/// Single source of truth for one form's values and validation state.
///
/// The rules and the initial snapshot are fixed at construction. The set
/// of top-level fields never changes afterwards, only their values.
#[derive(Debug)]
pub struct FormEngine {
    initial_data: FormData,
    rules: ValidationRules,
    data: FormData,
    errors: HashMap<String, String>,
    touched: HashSet<String>,
    submitting: SubmitState,
}

impl FormEngine {
    pub fn new(initial_data: FormData, rules: ValidationRules) -> Self {
        Self {
            data: initial_data.clone(),
            initial_data,
            rules,
            errors: HashMap::new(),
            touched: HashSet::new(),
            submitting: SubmitState::new(),
        }
    }

    /// Current values
    pub fn data(&self) -> &FormData {
        &self.data
    }

    /// Last computed errors. An empty string means the field passed.
    pub fn errors(&self) -> &HashMap<String, String> {
        &self.errors
    }

    /// Names and dotted paths edited since construction or the last reset
    pub fn touched(&self) -> &HashSet<String> {
        &self.touched
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.is_submitting()
    }

    /// Handle for observing the submitting flag from outside the engine
    pub fn submit_state(&self) -> SubmitState {
        self.submitting.clone()
    }

    /// True when no field holds a non-empty error. Reflects the last
    /// computed errors, not a fresh validation pass.
    pub fn is_valid(&self) -> bool {
        self.errors.values().all(|e| e.is_empty())
    }

    /// Look up a value by field name or dotted path
    pub fn value(&self, path: &str) -> Option<&FieldValue> {
        match path.split_once('.') {
            None => self.data.get(path),
            Some((root, rest)) => self.data.get(root)?.lookup(rest),
        }
    }

    /// Check `value` against the rule registered for `name`.
    ///
    /// Fields without a rule always pass.
    pub fn validate_field(&self, name: &str, value: &FieldValue) -> Option<String> {
        let rule = self.rules.get(name)?;
        let violation = rule.check(value, &self.data);
        if let Some(ref v) = violation {
            tracing::trace!(field = name, error = %v, "Field failed validation");
        }
        violation.map(|v| v.to_string())
    }

    /// Validate every field that has a rule and replace the error map.
    ///
    /// Returns true when nothing failed.
    pub fn validate_all(&mut self) -> bool {
        let missing = FieldValue::Null;
        let errors: HashMap<String, String> = self
            .rules
            .keys()
            .filter_map(|name| {
                let value = self.value(name).unwrap_or(&missing);
                self.validate_field(name, value)
                    .map(|error| (name.clone(), error))
            })
            .collect();

        let failed = errors.values().filter(|e| !e.is_empty()).count();
        tracing::debug!(failed, "Validated all fields");
        self.errors = errors;
        failed == 0
    }

    /// Set a top-level field, mark it touched and re-validate it
    pub fn update_field(
        &mut self,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), FormError> {
        let slot = self.data.get_mut(name).ok_or_else(|| {
            tracing::warn!(field = name, "Rejected update to unknown field");
            FormError::UnknownField(name.to_string())
        })?;
        *slot = value.into();

        self.touched.insert(name.to_string());
        self.store_error(name);
        Ok(())
    }

    /// Set a value inside a nested group addressed by a dotted path.
    ///
    /// Intermediate groups are rebuilt on the way down and missing ones are
    /// created. The full path is marked touched and its error is stored
    /// under the full path.
    pub fn update_nested_field(
        &mut self,
        path: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), FormError> {
        let keys: Vec<&str> = path.split('.').collect();
        if keys.iter().any(|k| k.is_empty()) {
            return Err(FormError::InvalidPath(path.to_string()));
        }

        let (root, rest) = keys
            .split_first()
            .ok_or_else(|| FormError::InvalidPath(path.to_string()))?;
        let current = self
            .data
            .get(*root)
            .ok_or_else(|| FormError::UnknownField((*root).to_string()))?;

        let updated = if rest.is_empty() {
            value.into()
        } else {
            with_nested_value(current, root, rest, path, value.into())?
        };
        self.data.insert((*root).to_string(), updated);

        self.touched.insert(path.to_string());
        self.store_error(path);
        Ok(())
    }

    /// Restore the initial snapshot and forget errors and touched fields
    pub fn reset(&mut self) {
        self.data = self.initial_data.clone();
        self.errors.clear();
        self.touched.clear();
    }

    /// Error for a field the user has interacted with.
    ///
    /// Untouched fields report nothing even when they are invalid.
    pub fn field_error(&self, name: &str) -> Option<&str> {
        if !self.touched.contains(name) {
            return None;
        }
        self.errors
            .get(name)
            .map(String::as_str)
            .filter(|e| !e.is_empty())
    }

    /// Run a submission with the submitting flag raised.
    ///
    /// `submit` receives a snapshot of the current data. Success calls
    /// `on_success`, failure hands the error to `on_error` and goes no
    /// further. The flag is cleared on every exit path. Validation is the
    /// caller's job: this does not call [`FormEngine::validate_all`].
    pub async fn handle_submit<F, Fut, T, E, S, R>(&self, submit: F, on_success: S, on_error: R)
    where
        F: FnOnce(FormData) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        S: FnOnce(),
        R: FnOnce(E),
    {
        let _guard = self.submitting.begin();
        tracing::debug!(fields = self.data.len(), "Submitting form");

        match submit(self.data.clone()).await {
            Ok(_) => on_success(),
            Err(err) => {
                tracing::warn!("Form submission failed");
                on_error(err);
            }
        }
    }

    fn store_error(&mut self, path: &str) {
        let error = match self.value(path) {
            Some(value) => self.validate_field(path, value),
            None => self.validate_field(path, &FieldValue::Null),
        };
        self.errors
            .insert(path.to_string(), error.unwrap_or_default());
    }
}

/// Copy of `node` with `value` written at `keys` below it
fn with_nested_value(
    node: &FieldValue,
    segment: &str,
    keys: &[&str],
    path: &str,
    value: FieldValue,
) -> Result<FieldValue, FormError> {
    let mut group = match node {
        FieldValue::Group(group) => group.clone(),
        FieldValue::Null => FormData::new(),
        _ => {
            return Err(FormError::NotAGroup {
                path: path.to_string(),
                segment: segment.to_string(),
            })
        }
    };

    let Some((key, rest)) = keys.split_first() else {
        return Ok(value);
    };
    let child = if rest.is_empty() {
        value
    } else {
        let existing = group.get(*key).cloned().unwrap_or_default();
        with_nested_value(&existing, key, rest, path, value)?
    };
    group.insert((*key).to_string(), child);
    Ok(FieldValue::Group(group))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::rules::ValidationRule;
    use pretty_assertions::assert_eq;
    use regex::Regex;
    use std::cell::{Cell, RefCell};

    fn data(entries: &[(&str, FieldValue)]) -> FormData {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn registration() -> FormEngine {
        let initial = data(&[
            ("email", FieldValue::text("")),
            ("password", FieldValue::text("")),
            ("confirmPassword", FieldValue::text("")),
            ("nickname", FieldValue::text("")),
        ]);
        let mut rules = ValidationRules::new();
        rules.insert("email".to_string(), ValidationRule::new().required());
        rules.insert(
            "password".to_string(),
            ValidationRule::new().required().min_length(8),
        );
        rules.insert(
            "confirmPassword".to_string(),
            ValidationRule::new().required().custom_with_data(|v, data| {
                (data.get("password") != Some(v)).then(|| "Passwords do not match".to_string())
            }),
        );
        FormEngine::new(initial, rules)
    }

    fn profile() -> FormEngine {
        let address = data(&[
            ("street", FieldValue::text("")),
            ("postcode", FieldValue::text("")),
        ]);
        let initial = data(&[
            ("name", FieldValue::text("")),
            ("address", FieldValue::Group(address)),
        ]);
        let mut rules = ValidationRules::new();
        rules.insert(
            "address.postcode".to_string(),
            ValidationRule::new()
                .required()
                .pattern(Regex::new(r"^\d{4}$").unwrap()),
        );
        FormEngine::new(initial, rules)
    }

    #[derive(Debug, PartialEq)]
    struct SubmitFailed(&'static str);

    mod validate_field {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_unconstrained_field_always_passes() {
            let engine = registration();
            assert_eq!(engine.validate_field("nickname", &FieldValue::Null), None);
            assert_eq!(engine.validate_field("no_such", &FieldValue::Null), None);
        }

        #[test]
        fn test_required_messages() {
            let engine = registration();
            for value in [FieldValue::text(""), FieldValue::text("   "), FieldValue::Null] {
                assert_eq!(
                    engine.validate_field("email", &value),
                    Some("This field is required".to_string())
                );
            }
            assert_eq!(engine.validate_field("email", &FieldValue::text("x")), None);
        }

        #[test]
        fn test_password_confirmation_scenario() {
            let mut engine = registration();
            engine.update_field("password", "abcdefgh").unwrap();

            assert_eq!(
                engine.validate_field("confirmPassword", &FieldValue::text("abcdefg")),
                Some("Passwords do not match".to_string())
            );
            assert_eq!(
                engine.validate_field("confirmPassword", &FieldValue::text("abcdefgh")),
                None
            );
        }

        #[test]
        fn test_has_no_side_effects() {
            let engine = registration();
            let _ = engine.validate_field("email", &FieldValue::text(""));
            assert!(engine.errors().is_empty());
            assert!(engine.touched().is_empty());
        }
    }

    mod validate_all {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_reports_every_ruled_field() {
            let mut engine = registration();
            assert!(!engine.validate_all());
            assert_eq!(engine.errors().len(), 3);
            assert!(!engine.errors().contains_key("nickname"));
            assert!(!engine.is_valid());
        }

        #[test]
        fn test_replaces_stale_errors() {
            let mut engine = registration();
            engine.validate_all();
            engine.update_field("email", "ada@example.org").unwrap();
            engine.update_field("password", "abcdefgh").unwrap();
            engine.update_field("confirmPassword", "abcdefgh").unwrap();

            assert!(engine.validate_all());
            assert!(engine.errors().is_empty());
            assert!(engine.is_valid());
        }

        #[test]
        fn test_is_idempotent() {
            let mut engine = registration();
            engine.update_field("password", "short").unwrap();
            engine.validate_all();
            let first = engine.errors().clone();
            engine.validate_all();
            assert_eq!(&first, engine.errors());
        }

        #[test]
        fn test_resolves_dotted_rule_keys() {
            let mut engine = profile();
            assert!(!engine.validate_all());
            assert_eq!(
                engine.errors().get("address.postcode").map(String::as_str),
                Some("This field is required")
            );
        }

        #[test]
        fn test_empty_custom_message_counts_as_valid() {
            let mut rules = ValidationRules::new();
            rules.insert(
                "a".to_string(),
                ValidationRule::new().custom(|_| Some(String::new())),
            );
            let mut engine = FormEngine::new(data(&[("a", FieldValue::text("x"))]), rules);

            assert!(engine.validate_all());
            assert!(engine.is_valid());
            assert_eq!(engine.errors().get("a").map(String::as_str), Some(""));
        }
    }

    mod update_field {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_updates_value_and_touches() {
            let mut engine = registration();
            engine.update_field("email", "ada@example.org").unwrap();

            assert_eq!(engine.value("email"), Some(&FieldValue::text("ada@example.org")));
            assert!(engine.touched().contains("email"));
            assert_eq!(engine.errors().get("email").map(String::as_str), Some(""));
            assert_eq!(engine.value("password"), Some(&FieldValue::text("")));
        }

        #[test]
        fn test_stores_error_eagerly() {
            let mut engine = registration();
            engine.update_field("password", "abc").unwrap();
            assert_eq!(
                engine.field_error("password"),
                Some("Minimum length is 8 characters")
            );
            assert!(!engine.is_valid());
        }

        #[test]
        fn test_rejects_unknown_field() {
            let mut engine = registration();
            let err = engine.update_field("age", 42u32).unwrap_err();
            assert_eq!(err, FormError::UnknownField("age".to_string()));
            assert_eq!(engine.data().len(), 4);
            assert!(engine.touched().is_empty());
        }
    }

    mod update_nested_field {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_sets_leaf_and_preserves_siblings() {
            let mut engine = profile();
            engine.update_nested_field("address.street", "1 Main St").unwrap();
            engine.update_nested_field("address.postcode", "3000").unwrap();

            assert_eq!(
                engine.value("address.street"),
                Some(&FieldValue::text("1 Main St"))
            );
            assert_eq!(
                engine.value("address.postcode"),
                Some(&FieldValue::text("3000"))
            );
            assert_eq!(engine.value("name"), Some(&FieldValue::text("")));
        }

        #[test]
        fn test_touches_full_path_only() {
            let mut engine = profile();
            engine.update_nested_field("address.postcode", "300").unwrap();

            assert!(engine.touched().contains("address.postcode"));
            assert!(!engine.touched().contains("address"));
            assert_eq!(engine.field_error("address.postcode"), Some("Invalid format"));
            assert_eq!(engine.field_error("address"), None);
        }

        #[test]
        fn test_creates_missing_intermediate_groups() {
            let mut engine = profile();
            engine
                .update_nested_field("address.contact.phone", "0400 000 000")
                .unwrap();
            assert_eq!(
                engine.value("address.contact.phone"),
                Some(&FieldValue::text("0400 000 000"))
            );
        }

        #[test]
        fn test_rejects_descent_into_scalar() {
            let mut engine = profile();
            let err = engine.update_nested_field("name.first", "Ada").unwrap_err();
            assert_eq!(
                err,
                FormError::NotAGroup {
                    path: "name.first".to_string(),
                    segment: "name".to_string(),
                }
            );
        }

        #[test]
        fn test_rejects_bad_paths() {
            let mut engine = profile();
            assert_eq!(
                engine.update_nested_field("address..postcode", "3000"),
                Err(FormError::InvalidPath("address..postcode".to_string()))
            );
            assert_eq!(
                engine.update_nested_field("billing.postcode", "3000"),
                Err(FormError::UnknownField("billing".to_string()))
            );
        }

        #[test]
        fn test_reset_restores_nested_snapshot() {
            let mut engine = profile();
            let initial = engine.data().clone();
            engine.update_nested_field("address.postcode", "3000").unwrap();
            engine.reset();
            assert_eq!(engine.data(), &initial);
        }
    }

    mod reset {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_round_trip_to_initial_data() {
            let mut engine = registration();
            let initial = engine.data().clone();
            engine.update_field("email", "ada@example.org").unwrap();
            engine.update_field("password", "abc").unwrap();
            engine.validate_all();

            engine.reset();

            assert_eq!(engine.data(), &initial);
            assert!(engine.errors().is_empty());
            assert!(engine.touched().is_empty());
        }

        #[test]
        fn test_does_not_revalidate() {
            let mut engine = registration();
            engine.update_field("email", "").unwrap();
            engine.reset();
            assert!(engine.is_valid());
        }
    }

    mod field_error {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_hidden_until_touched() {
            let mut engine = registration();
            engine.validate_all();

            assert!(engine.errors().contains_key("email"));
            assert_eq!(engine.field_error("email"), None);

            engine.update_field("email", "").unwrap();
            assert_eq!(engine.field_error("email"), Some("This field is required"));
        }

        #[test]
        fn test_empty_error_reads_as_none() {
            let mut engine = registration();
            engine.update_field("email", "ada@example.org").unwrap();
            assert_eq!(engine.field_error("email"), None);
        }
    }

    mod handle_submit {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_success_calls_on_success_and_clears_flag() {
            let engine = registration();
            let observer = engine.submit_state();
            let succeeded = Cell::new(0);
            let failed = Cell::new(0);

            engine
                .handle_submit(
                    |data| {
                        let in_flight = observer.is_submitting();
                        async move {
                            assert!(in_flight);
                            assert_eq!(data.len(), 4);
                            Ok::<_, SubmitFailed>(())
                        }
                    },
                    || succeeded.set(succeeded.get() + 1),
                    |_| failed.set(failed.get() + 1),
                )
                .await;

            assert_eq!(succeeded.get(), 1);
            assert_eq!(failed.get(), 0);
            assert!(!engine.is_submitting());
        }

        #[tokio::test]
        async fn test_failure_reports_exact_error_once() {
            let engine = registration();
            let succeeded = Cell::new(false);
            let errors = RefCell::new(Vec::new());

            engine
                .handle_submit(
                    |_| async { Err::<(), _>(SubmitFailed("network down")) },
                    || succeeded.set(true),
                    |err| errors.borrow_mut().push(err),
                )
                .await;

            assert!(!succeeded.get());
            assert_eq!(*errors.borrow(), vec![SubmitFailed("network down")]);
            assert!(!engine.is_submitting());
        }

        #[test]
        fn test_flag_visible_while_awaiting() {
            let engine = registration();
            let observer = engine.submit_state();
            let seen = Cell::new(false);

            tokio_test::block_on(engine.handle_submit(
                |_| async {
                    seen.set(observer.is_submitting());
                    Ok::<_, SubmitFailed>(())
                },
                || {},
                |_| {},
            ));

            assert!(seen.get());
            assert!(!observer.is_submitting());
        }

        #[test]
        fn test_cancelled_submit_releases_flag() {
            let engine = registration();
            let observer = engine.submit_state();
            {
                let pending = engine.handle_submit(
                    |_| std::future::pending::<Result<(), SubmitFailed>>(),
                    || {},
                    |_| {},
                );
                let mut pending = std::pin::pin!(pending);
                let mut task = tokio_test::task::spawn(async { (&mut pending).await });
                assert!(task.poll().is_pending());
                assert!(observer.is_submitting());
            }
            assert!(!observer.is_submitting());
        }

        #[tokio::test]
        async fn test_does_not_validate() {
            let engine = registration();
            let submitted = Cell::new(false);
            engine
                .handle_submit(
                    |_| async { Ok::<_, SubmitFailed>(()) },
                    || submitted.set(true),
                    |_| {},
                )
                .await;

            assert!(submitted.get());
            assert!(engine.errors().is_empty());
        }
    }
}
