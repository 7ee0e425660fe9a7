//! Field validation helpers shared by the per-form rules.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Key for messages that belong to the form as a whole.
pub const GLOBAL_FIELD: &str = "_global";

static UCF_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@ucf\.edu$").expect("Invalid regex pattern"));

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex pattern"));

/// Validation messages keyed by snake_case field path.
///
/// Paths use dots for nested objects and brackets for list entries, e.g.
/// `us_address.street` or `dependents[1].given_name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Create an empty set of errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field` unless one is already present.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Record a message for `field`, overwriting any earlier one.
    pub fn replace(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    /// Whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The message for one field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether `field` has a message.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Iterate over `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when empty, otherwise [`Error::Validation`].
    ///
    /// # Errors
    ///
    /// Returns the collected errors when any field failed.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Whether a text field is blank after trimming.
#[must_use]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Whether `value` is an `@ucf.edu` address.
#[must_use]
pub fn is_ucf_email(value: &str) -> bool {
    UCF_EMAIL.is_match(value.trim())
}

/// Whether `value` looks like an email address.
#[must_use]
pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value.trim())
}

/// Parse an ISO `YYYY-MM-DD` date.
///
/// A trailing time part (`2025-06-01T00:00:00Z`) is ignored.
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date_part = value.split_once('T').map_or(value, |(d, _)| d);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Accumulates [`FieldErrors`] for one form.
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    /// Start an empty validation pass.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error unconditionally.
    pub fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    /// Record an error, overwriting any earlier message for the field.
    pub fn override_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.replace(field, message);
    }

    /// Require non-blank text.
    pub fn require(&mut self, field: &str, value: &str, message: &str) -> bool {
        if is_blank(value) {
            self.errors.add(field, message);
            return false;
        }
        true
    }

    /// Require a checked box.
    pub fn require_true(&mut self, field: &str, flag: bool, message: &str) -> bool {
        if !flag {
            self.errors.add(field, message);
        }
        flag
    }

    /// Require an answered yes/no question.
    pub fn require_answer(&mut self, field: &str, answer: Option<bool>, message: &str) -> bool {
        if answer.is_none() {
            self.errors.add(field, message);
            return false;
        }
        true
    }

    /// Require a non-empty selection list.
    pub fn require_some<T>(&mut self, field: &str, items: &[T], message: &str) -> bool {
        if items.is_empty() {
            self.errors.add(field, message);
            return false;
        }
        true
    }

    /// Require at least one of several fields, reporting on all of them.
    pub fn require_any(&mut self, fields: &[(&str, &str)], message: &str) -> bool {
        if fields.iter().any(|(_, value)| !is_blank(value)) {
            return true;
        }
        for (field, _) in fields {
            self.errors.add(*field, message);
        }
        false
    }

    /// Require a UCF email address.
    pub fn ucf_email(&mut self, field: &str, value: &str, required: &str, invalid: &str) -> bool {
        if !self.require(field, value, required) {
            return false;
        }
        if !is_ucf_email(value) {
            self.errors.add(field, invalid);
            return false;
        }
        true
    }

    /// Require a well-formed email address.
    pub fn email(&mut self, field: &str, value: &str, required: &str, invalid: &str) -> bool {
        if !self.require(field, value, required) {
            return false;
        }
        if !is_email(value) {
            self.errors.add(field, invalid);
            return false;
        }
        true
    }

    /// Check email format only when a value is present.
    pub fn email_format(&mut self, field: &str, value: &str) -> bool {
        if !is_blank(value) && !is_email(value) {
            self.errors.add(field, "Please enter a valid email address");
            return false;
        }
        true
    }

    /// Require an ISO date, returning it when valid.
    pub fn date(&mut self, field: &str, value: &str, required: &str) -> Option<NaiveDate> {
        if !self.require(field, value, required) {
            return None;
        }
        let parsed = parse_date(value);
        if parsed.is_none() {
            self.errors.add(field, "Please enter a date as YYYY-MM-DD");
        }
        parsed
    }

    /// Require `later` to fall strictly after `earlier` when both are known.
    pub fn date_after(
        &mut self,
        field: &str,
        earlier: Option<NaiveDate>,
        later: Option<NaiveDate>,
        message: &str,
    ) -> bool {
        match (earlier, later) {
            (Some(start), Some(end)) if end <= start => {
                self.errors.replace(field, message);
                false
            }
            _ => true,
        }
    }

    /// Check that optional numeric text parses and is at least `min`.
    pub fn number_at_least(&mut self, field: &str, value: &str, min: f64, message: &str) -> bool {
        if is_blank(value) {
            return true;
        }
        match value.trim().parse::<f64>() {
            Ok(n) if n.is_finite() && n >= min => true,
            _ => {
                self.errors.add(field, message);
                false
            }
        }
    }

    /// Whether anything has failed so far.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Finish the pass.
    #[must_use]
    pub fn finish(self) -> FieldErrors {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_first_message_wins() {
        let mut errors = FieldErrors::new();
        errors.add("ucf_id", "first");
        errors.add("ucf_id", "second");
        assert_eq!(errors.get("ucf_id"), Some("first"));

        errors.replace("ucf_id", "third");
        assert_eq!(errors.get("ucf_id"), Some("third"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_field_errors_into_result() {
        assert!(FieldErrors::new().into_result().is_ok());

        let mut errors = FieldErrors::new();
        errors.add(GLOBAL_FIELD, "nope");
        let err = errors.into_result().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_field_errors_serialize_as_map() {
        let mut errors = FieldErrors::new();
        errors.add("b", "two");
        errors.add("a", "one");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({"a": "one", "b": "two"}));
        assert_eq!(errors.to_string(), "a: one; b: two");
    }

    #[test]
    fn test_ucf_email() {
        assert!(is_ucf_email("kn123456@ucf.edu"));
        assert!(!is_ucf_email("student@knights.ucf.edu"));
        assert!(!is_ucf_email("student@gmail.com"));
        assert!(!is_ucf_email("two words@ucf.edu"));
    }

    #[test]
    fn test_email() {
        assert!(is_email("person@example.com"));
        assert!(!is_email("person@example"));
        assert!(!is_email("@example.com"));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-06-01"),
            NaiveDate::from_ymd_opt(2025, 6, 1)
        );
        assert_eq!(
            parse_date("2025-06-01T12:00:00.000Z"),
            NaiveDate::from_ymd_opt(2025, 6, 1)
        );
        assert!(parse_date("06/01/2025").is_none());
    }

    #[test]
    fn test_require_any_marks_every_field() {
        let mut v = Validator::new();
        assert!(!v.require_any(&[("us_telephone", ""), ("non_us_telephone", " ")], "phone"));
        let errors = v.finish();
        assert_eq!(errors.get("us_telephone"), Some("phone"));
        assert_eq!(errors.get("non_us_telephone"), Some("phone"));
    }

    #[test]
    fn test_require_any_passes_with_one() {
        let mut v = Validator::new();
        assert!(v.require_any(&[("a", ""), ("b", "x")], "need one"));
        assert!(!v.has_errors());
    }

    #[test]
    fn test_ucf_email_messages() {
        let mut v = Validator::new();
        v.ucf_email("ucf_email", "", "UCF email is required", "bad");
        v.ucf_email("other", "me@gmail.com", "required", "Must be a valid UCF email address");
        v.email("personal_email", "me@", "required", "Must be a valid email address");
        let errors = v.finish();
        assert_eq!(errors.get("ucf_email"), Some("UCF email is required"));
        assert_eq!(errors.get("other"), Some("Must be a valid UCF email address"));
        assert_eq!(errors.get("personal_email"), Some("Must be a valid email address"));
    }

    #[test]
    fn test_date_after() {
        let mut v = Validator::new();
        let start = parse_date("2025-01-10");
        let end = parse_date("2025-01-10");
        assert!(!v.date_after("end", start, end, "End must be after start"));
        assert!(v.date_after("end", start, parse_date("2025-01-11"), "x"));
        assert!(v.date_after("end", None, end, "x"));
        assert_eq!(v.finish().get("end"), Some("End must be after start"));
    }

    #[test]
    fn test_date_invalid_format() {
        let mut v = Validator::new();
        assert!(v.date("from_date", "yesterday", "required").is_none());
        assert!(v.finish().get("from_date").unwrap().contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_number_at_least() {
        let mut v = Validator::new();
        assert!(v.number_at_least("hours", "", 20.0, "x"));
        assert!(v.number_at_least("hours", "40", 20.0, "x"));
        assert!(!v.number_at_least("hours", "10", 20.0, "too few"));
        assert!(!v.number_at_least("credits", "many", 0.0, "not a number"));
        assert_eq!(v.finish().len(), 2);
    }

    #[test]
    fn test_number_at_least_rejects_non_finite() {
        let mut v = Validator::new();
        assert!(!v.number_at_least("hours", "inf", 20.0, "too few"));
        assert!(!v.number_at_least("credits", "NaN", 0.0, "not a number"));
        assert!(!v.number_at_least("other", "-infinity", 0.0, "not a number"));
        let errors = v.finish();
        assert_eq!(errors.get("hours"), Some("too few"));
        assert_eq!(errors.len(), 3);
    }
}
