//! Request-level validation for drawing payloads.
//!
//! Violations are collected per field and reported together as a single
//! `validation_error` whose `details` map each field to its reason. Create
//! requires both fields; update only checks the fields a caller supplied, so
//! an empty name or a null document still reach the merge-on-absence policy.

use serde_json::{Map, Value};

use crate::domain::{Error, MAX_NAME_LENGTH};

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) const NAME: FieldName = FieldName::new("name");
pub(crate) const DATA: FieldName = FieldName::new("data");

/// Accumulates `{field: reason}` pairs; the last reason per field wins.
#[derive(Debug, Default)]
struct Violations(Map<String, Value>);

impl Violations {
    fn add(&mut self, field: FieldName, reason: impl Into<String>) {
        self.0
            .insert(field.as_str().to_owned(), Value::String(reason.into()));
    }

    fn into_result(self) -> Result<(), Error> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(Value::Object(self.0)))
        }
    }
}

fn check_name(name: &str, violations: &mut Violations) {
    if name.trim().is_empty() {
        violations.add(NAME, "name cannot be empty");
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        violations.add(
            NAME,
            format!("name exceeds maximum length of {MAX_NAME_LENGTH} characters"),
        );
    }
}

/// Validate a create payload. Both fields are required.
pub(crate) fn validate_create(name: Option<&str>, data: Option<&Value>) -> Result<(), Error> {
    let mut violations = Violations::default();
    check_name(name.unwrap_or_default(), &mut violations);
    if data.is_none_or(Value::is_null) {
        violations.add(DATA, "data cannot be null");
    }
    violations.into_result()
}

/// Validate an update payload. An empty name means "keep the stored name".
pub(crate) fn validate_update(name: Option<&str>) -> Result<(), Error> {
    let mut violations = Violations::default();
    if let Some(name) = name.filter(|name| !name.is_empty()) {
        check_name(name, &mut violations);
    }
    violations.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;
    use serde_json::json;

    fn details(result: Result<(), Error>) -> Value {
        let err = result.expect_err("validation should fail");
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(err.message(), "Invalid request data");
        err.details().cloned().expect("details present")
    }

    #[rstest]
    fn create_accepts_a_complete_payload() {
        assert!(validate_create(Some("Sketch"), Some(&json!({"elements": []}))).is_ok());
    }

    #[rstest]
    fn create_collects_every_violation() {
        let details = details(validate_create(Some("  "), None));
        assert_eq!(
            details,
            json!({"name": "name cannot be empty", "data": "data cannot be null"})
        );
    }

    #[rstest]
    fn create_treats_explicit_null_as_missing() {
        let details = details(validate_create(Some("ok"), Some(&Value::Null)));
        assert_eq!(details, json!({"data": "data cannot be null"}));
    }

    #[rstest]
    #[case(255, true)]
    #[case(256, false)]
    fn create_limits_name_length_in_characters(#[case] len: usize, #[case] ok: bool) {
        let name = "é".repeat(len);
        let result = validate_create(Some(&name), Some(&json!({})));
        assert_eq!(result.is_ok(), ok);
        if !ok {
            assert_eq!(
                details(result),
                json!({"name": "name exceeds maximum length of 255 characters"})
            );
        }
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("Renamed"))]
    fn update_allows_absent_and_empty_names(#[case] name: Option<&str>) {
        assert!(validate_update(name).is_ok());
    }

    #[rstest]
    fn update_rejects_whitespace_and_long_names() {
        assert_eq!(
            details(validate_update(Some("   "))),
            json!({"name": "name cannot be empty"})
        );
        let long = "x".repeat(MAX_NAME_LENGTH + 1);
        assert!(validate_update(Some(&long)).is_err());
    }
}
