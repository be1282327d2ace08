// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Form and field configuration.
//!
//! Both [`FormConfig`] and [`FieldSpec`] can be built in code or read from
//! JSON. Every [`FormConfig`] field has a default, so `{}` is a valid
//! configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::path::FieldPath;
use crate::registry::FieldDescriptor;
use crate::rule::PatternRule;

/// Default debounce window for blur-mode validation, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Default message for a missing required value.
pub const DEFAULT_REQUIRED_MESSAGE: &str = "required";

/// When validation runs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidateOn {
    /// Synchronously after every user mutation.
    #[default]
    Change,
    /// Deferred until a field loses focus, then debounced.
    Blur,
}

/// Form-wide settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct FormConfig {
    /// Default validation timing for fields that do not override it.
    pub validate: ValidateOn,
    /// Debounce window for blur-mode validation, in milliseconds.
    pub debounce_ms: u64,
    /// Message reported for a missing required value.
    pub required_message: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            validate: ValidateOn::Change,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            required_message: DEFAULT_REQUIRED_MESSAGE.into(),
        }
    }
}

impl FormConfig {
    /// Default settings with blur-mode validation.
    #[must_use]
    pub fn blur() -> Self {
        Self {
            validate: ValidateOn::Blur,
            ..Self::default()
        }
    }

    /// Reads settings from JSON such as `{"validate": "blur", "debounceMs": 150}`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Config`](crate::FormError::Config) on malformed input
    /// or unknown keys.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PatternList {
    One(PatternRule),
    Many(Vec<PatternRule>),
}

impl Default for PatternList {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

/// Declarative description of a field, as read from configuration.
///
/// ```json
/// {
///   "name": "password",
///   "required": true,
///   "validate": [{ "regexp": "(?:.*?[A-Z])", "message": "One uppercase letter" }]
/// }
/// ```
///
/// `validate` accepts a single pattern object or a list of them.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldSpec {
    name: FieldPath,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    required_message: Option<String>,
    #[serde(default)]
    validate_on: Option<ValidateOn>,
    #[serde(default)]
    validate: PatternList,
}

impl FieldSpec {
    /// Reads a field description from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Config`](crate::FormError::Config) if the JSON is
    /// malformed, the path does not parse, or a pattern does not compile.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns the field path.
    #[must_use]
    pub fn name(&self) -> &FieldPath {
        &self.name
    }
}

impl From<FieldSpec> for FieldDescriptor {
    fn from(spec: FieldSpec) -> Self {
        let mut descriptor = Self::new(spec.name);
        if spec.required {
            descriptor = descriptor.required();
        }
        if let Some(message) = spec.required_message {
            descriptor = descriptor.required_message(message);
        }
        if let Some(mode) = spec.validate_on {
            descriptor = descriptor.validate_on(mode);
        }
        let patterns = match spec.validate {
            PatternList::One(rule) => vec![rule],
            PatternList::Many(rules) => rules,
        };
        patterns
            .into_iter()
            .fold(descriptor, |descriptor, rule| descriptor.rule(rule))
    }
}
