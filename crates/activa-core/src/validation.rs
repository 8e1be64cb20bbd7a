//! Field-level validation
//!
//! Failed writes report every problem at once as a field → messages map so
//! the caller can redisplay a form. Messages are lowercase fragments meant
//! to follow a humanized field name ("Library name can't be blank").

use crate::error::{Error, Result};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

pub const BLANK: &str = "can't be blank";
pub const TAKEN: &str = "has already been taken";
pub const NOT_INCLUDED: &str = "is not included in the list";
pub const MUST_EXIST: &str = "must exist";
pub const PROJECT_NAME_FORMAT: &str =
    "must be 2-100 characters with letters, numbers, spaces, and ._-+/";

/// Longest name a dimension row accepts.
pub const MAX_NAME_LEN: usize = 100;

static PROJECT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}\p{N}][\p{L}\p{N} ._\-+/]{1,99}$").expect("project name pattern is valid")
});

/// Errors collected while validating one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    fields: IndexMap<String, Vec<String>>,
    base: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single record-level message.
    pub fn base(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add_base(message);
        errors
    }

    /// Attach a message to a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Attach a message to the record as a whole.
    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.base.is_empty()
    }

    /// Messages for one field, empty when the field is valid.
    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn base_messages(&self) -> &[String] {
        &self.base
    }

    /// Fields in the order their first error was added.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Add every message of `other`, keeping its field names.
    pub fn append(&mut self, other: ValidationErrors) {
        for (field, messages) in other.fields {
            for message in messages {
                self.add(&field, message);
            }
        }
        self.base.extend(other.base);
    }

    /// Move every message of `other` under a different field name.
    pub fn merge_as(&mut self, field: &str, other: ValidationErrors) {
        for (_, messages) in other.fields {
            for message in messages {
                self.add(field, message);
            }
        }
        self.base.extend(other.base);
    }

    /// Sentence-style messages, base messages first.
    pub fn full_messages(&self) -> Vec<String> {
        let mut out = self.base.clone();
        for (field, messages) in &self.fields {
            let name = humanize(field);
            out.extend(messages.iter().map(|m| format!("{} {}", name, m)));
        }
        out
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_messages().join(", "))
    }
}

fn humanize(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Empty or whitespace-only.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// `Some` only for values with visible content.
pub fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !is_blank(v))
}

/// Add length errors for `value`, counted in characters.
pub fn check_length(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
    min: usize,
    max: usize,
) {
    let len = value.chars().count();
    if len < min {
        let unit = if min == 1 { "character" } else { "characters" };
        errors.add(field, format!("is too short (minimum is {} {})", min, unit));
    } else if len > max {
        errors.add(field, format!("is too long (maximum is {} characters)", max));
    }
}

/// Project names start alphanumeric and use letters, digits, spaces and `._-+/`.
pub fn is_valid_project_name(value: &str) -> bool {
    PROJECT_NAME.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_collects_in_insertion_order() {
        let mut errors = ValidationErrors::new();
        errors.add("namespace", BLANK);
        errors.add("key", BLANK);
        errors.add("namespace", "is too long (maximum is 100 characters)");

        let fields: Vec<&str> = errors.fields().map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["namespace", "key"]);
        assert_eq!(errors.get("namespace").len(), 2);
        assert!(errors.get("ecosystem").is_empty());
    }

    #[test]
    fn test_full_messages() {
        let mut errors = ValidationErrors::base("Activation keys cannot be deleted");
        errors.add("library_name", BLANK);
        assert_eq!(
            errors.full_messages(),
            vec![
                "Activation keys cannot be deleted".to_string(),
                "Library name can't be blank".to_string(),
            ]
        );
        assert_eq!(
            errors.to_string(),
            "Activation keys cannot be deleted, Library name can't be blank"
        );
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationErrors::new().into_result().is_ok());
        let mut errors = ValidationErrors::new();
        errors.add("key", TAKEN);
        assert!(matches!(errors.into_result(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_merge_as_renames_fields() {
        let mut inner = ValidationErrors::new();
        inner.add("name", "is too long (maximum is 100 characters)");
        let mut outer = ValidationErrors::new();
        outer.merge_as("namespace", inner);
        assert_eq!(outer.get("namespace").len(), 1);
        assert!(!outer.contains("name"));
    }

    #[rstest]
    #[case("", true)]
    #[case("   ", true)]
    #[case("\t\n", true)]
    #[case(" a ", false)]
    fn test_is_blank(#[case] value: &str, #[case] blank: bool) {
        assert_eq!(is_blank(value), blank);
    }

    #[rstest]
    #[case("Proj", true)]
    #[case("my project", true)]
    #[case("a.b_c-d+e/f", true)]
    #[case("Zürich Tools", true)]
    #[case("p", false)]
    #[case(" leading", false)]
    #[case("-dash", false)]
    #[case("bad!char", false)]
    fn test_project_name_format(#[case] value: &str, #[case] valid: bool) {
        assert_eq!(is_valid_project_name(value), valid);
    }

    #[test]
    fn test_project_name_length_limit() {
        assert!(is_valid_project_name(&"a".repeat(100)));
        assert!(!is_valid_project_name(&"a".repeat(101)));
    }

    #[test]
    fn test_check_length() {
        let mut errors = ValidationErrors::new();
        check_length(&mut errors, "name", "x", 2, 100);
        check_length(&mut errors, "other", &"y".repeat(101), 1, 100);
        check_length(&mut errors, "fine", "ok", 1, 100);
        assert_eq!(errors.get("name"), &["is too short (minimum is 2 characters)".to_string()]);
        assert_eq!(errors.get("other"), &["is too long (maximum is 100 characters)".to_string()]);
        assert!(!errors.contains("fine"));
    }
}
