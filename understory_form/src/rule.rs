// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Validation rules and their evaluation.
//!
//! A field is validated by its [`FieldDescriptor`]: an optional `required`
//! flag plus any number of [`Rule`]s. [`evaluate`] combines them into a single
//! [`ValidationOutcome`] for the field's current value.
//!
//! Precedence, both between the rules of one descriptor and between several
//! descriptors sharing a path (see [`ValidationOutcome::combine`]):
//!
//! 1. The first blocking error wins.
//! 2. Otherwise the first informational outcome is kept.
//! 3. Otherwise the field passes.

use std::borrow::Cow;
use std::sync::Arc;

use core::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FormError;
use crate::registry::FieldDescriptor;

/// Severity of a failed rule.
///
/// Only [`Status::Error`] blocks submission. When read from configuration any
/// status other than `"error"` is informational.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Status {
    /// Blocks submission.
    #[default]
    Error,
    /// Surfaced to the user without blocking submission.
    Info,
}

impl From<&str> for Status {
    fn from(status: &str) -> Self {
        if status == "error" {
            Self::Error
        } else {
            Self::Info
        }
    }
}

impl From<String> for Status {
    fn from(status: String) -> Self {
        Self::from(status.as_str())
    }
}

/// A message produced by a custom validator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// Text shown to the user.
    pub message: String,
    /// Whether the notice blocks submission.
    pub status: Status,
}

impl Notice {
    /// A blocking notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: Status::Error,
        }
    }

    /// A non-blocking notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: Status::Info,
        }
    }
}

impl From<&str> for Notice {
    fn from(message: &str) -> Self {
        Self::error(message)
    }
}

impl From<String> for Notice {
    fn from(message: String) -> Self {
        Self::error(message)
    }
}

/// The result of validating one field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Nothing to report.
    #[default]
    Absent,
    /// A blocking error.
    Error(String),
    /// An informational message.
    Info(String),
}

impl ValidationOutcome {
    /// Returns `true` for [`ValidationOutcome::Error`].
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns the message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Absent => None,
            Self::Error(message) | Self::Info(message) => Some(message),
        }
    }

    /// Merges a later outcome for the same field into this one.
    ///
    /// An existing error is kept; otherwise a later error replaces anything
    /// informational; otherwise the first informational message is kept.
    #[must_use]
    pub fn combine(self, later: Self) -> Self {
        match (self, later) {
            (error @ Self::Error(_), _) => error,
            (_, error @ Self::Error(_)) => error,
            (info @ Self::Info(_), _) => info,
            (Self::Absent, later) => later,
        }
    }
}

impl From<Notice> for ValidationOutcome {
    fn from(notice: Notice) -> Self {
        match notice.status {
            Status::Error => Self::Error(notice.message),
            Status::Info => Self::Info(notice.message),
        }
    }
}

#[derive(Deserialize)]
struct PatternSpec {
    regexp: String,
    message: String,
    #[serde(default)]
    status: Status,
}

/// A regular-expression rule.
///
/// The pattern applies to strings (including the empty string), and to
/// numbers and booleans through their text form. It does not apply to absent,
/// `null`, array or object values.
///
/// Deserializes from `{ "regexp": "...", "message": "...", "status": "info" }`;
/// `status` defaults to `"error"`.
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "PatternSpec")]
pub struct PatternRule {
    regexp: Regex,
    message: String,
    status: Status,
}

impl PatternRule {
    /// Compiles `pattern` into a rule.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidPattern`] if the pattern does not compile.
    pub fn new(
        pattern: &str,
        message: impl Into<String>,
        status: Status,
    ) -> Result<Self, FormError> {
        let regexp = Regex::new(pattern).map_err(|source| FormError::InvalidPattern {
            pattern: pattern.into(),
            source,
        })?;
        Ok(Self::from_regex(regexp, message, status))
    }

    /// Wraps an already compiled expression.
    #[must_use]
    pub fn from_regex(regexp: Regex, message: impl Into<String>, status: Status) -> Self {
        Self {
            regexp,
            message: message.into(),
            status,
        }
    }

    /// Returns the pattern text.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.regexp.as_str()
    }

    /// Returns the message reported on mismatch.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the status reported on mismatch.
    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    /// Checks `value` against the pattern.
    #[must_use]
    pub fn check(&self, value: Option<&Value>) -> ValidationOutcome {
        let subject: Cow<'_, str> = match value {
            Some(Value::String(text)) => Cow::Borrowed(text),
            Some(Value::Number(number)) => Cow::Owned(number.to_string()),
            Some(Value::Bool(flag)) => Cow::Borrowed(if *flag { "true" } else { "false" }),
            _ => return ValidationOutcome::Absent,
        };
        if self.regexp.is_match(&subject) {
            ValidationOutcome::Absent
        } else {
            Notice {
                message: self.message.clone(),
                status: self.status,
            }
            .into()
        }
    }
}

impl PartialEq for PatternRule {
    fn eq(&self, other: &Self) -> bool {
        self.pattern() == other.pattern()
            && self.message == other.message
            && self.status == other.status
    }
}

impl TryFrom<PatternSpec> for PatternRule {
    type Error = FormError;

    fn try_from(spec: PatternSpec) -> Result<Self, Self::Error> {
        Self::new(&spec.regexp, spec.message, spec.status)
    }
}

type ValidatorFn = dyn Fn(Option<&Value>, &Value) -> Option<Notice> + Send + Sync;

/// A custom validation function.
///
/// The function receives the field's resolved value (`None` when absent) and
/// the whole form value, and returns `None` to pass.
///
/// Validators compare equal only to clones of themselves, which is what lets
/// the registry recognize a re-registration of the same field.
#[derive(Clone)]
pub struct Validator(Arc<ValidatorFn>);

impl Validator {
    /// Wraps a closure.
    pub fn new(f: impl Fn(Option<&Value>, &Value) -> Option<Notice> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Runs the validator.
    #[must_use]
    pub fn check(&self, value: Option<&Value>, form: &Value) -> ValidationOutcome {
        (self.0)(value, form).map_or(ValidationOutcome::Absent, Into::into)
    }
}

impl PartialEq for Validator {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Validator")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// A single validation rule attached to a field.
#[derive(Clone, Debug, PartialEq)]
pub enum Rule {
    /// A regular-expression rule.
    Pattern(PatternRule),
    /// A custom function.
    Custom(Validator),
}

impl Rule {
    /// Evaluates the rule for `value` within `form`.
    #[must_use]
    pub fn check(&self, value: Option<&Value>, form: &Value) -> ValidationOutcome {
        match self {
            Self::Pattern(pattern) => pattern.check(value),
            Self::Custom(validator) => validator.check(value, form),
        }
    }
}

impl From<PatternRule> for Rule {
    fn from(rule: PatternRule) -> Self {
        Self::Pattern(rule)
    }
}

impl From<Validator> for Rule {
    fn from(validator: Validator) -> Self {
        Self::Custom(validator)
    }
}

/// Returns `true` when a value does not satisfy `required`.
///
/// Absent, `null`, `false`, the empty string and the empty array all count as
/// missing.
#[must_use]
pub fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null | Value::Bool(false)) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Validates one descriptor against the value resolved at its path.
///
/// `required_message` is used for a missing required value unless the
/// descriptor overrides it. A failed `required` check short-circuits the
/// descriptor's rules.
#[must_use]
pub fn evaluate(
    descriptor: &FieldDescriptor,
    resolved: Option<&Value>,
    form: &Value,
    required_message: &str,
) -> ValidationOutcome {
    if descriptor.is_required() && is_missing(resolved) {
        let message = descriptor
            .required_message_override()
            .unwrap_or(required_message);
        return ValidationOutcome::Error(message.into());
    }
    let mut outcome = ValidationOutcome::Absent;
    for rule in descriptor.rules() {
        outcome = outcome.combine(rule.check(resolved, form));
        if outcome.is_blocking() {
            break;
        }
    }
    outcome
}
