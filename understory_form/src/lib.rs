// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_form --heading-base-level=0

//! Understory Form: headless form state.
//!
//! This crate keeps the _state_ of a form and nothing else: a nested JSON-like
//! value, the set of paths the user has touched, the error and info messages
//! produced by validation, and the set of fields currently mounted. It draws
//! nothing and owns no event loop. Hosts forward user edits, focus changes and
//! the current time; the form reports back through a [`FormObserver`].
//!
//! Core pieces:
//! - [`FieldPath`]: dotted and indexed paths such as `phones[1].number`, with
//!   [`path::get`] and [`path::set`] over [`serde_json::Value`].
//! - [`FieldDescriptor`] and [`Rule`]: `required`, regular-expression and
//!   custom rules, with blocking ([`Status::Error`]) or informational
//!   ([`Status::Info`]) outcomes.
//! - [`FieldRegistry`]: fields mount and unmount at runtime; an unmounted
//!   field's stale errors disappear with it.
//! - [`Form`]: mutations, blur handling, validation passes, submit and reset,
//!   with either the form or an external owner holding the value
//!   ([`Ownership`]).
//!
//! Validation runs either synchronously after each change
//! ([`ValidateOn::Change`]) or after a field loses focus, debounced through
//! [`understory_timing::Debounce`] ([`ValidateOn::Blur`]). Time is always
//! supplied by the host.
//!
//! ## Minimal example
//!
//! ```rust
//! use serde_json::json;
//! use understory_form::{FieldDescriptor, Form, FormConfig, FormEvent, Submission};
//!
//! let mut form = Form::uncontrolled(FormConfig::default(), Vec::<FormEvent>::new());
//! form.register(FieldDescriptor::parse("name")?.required());
//!
//! // Nothing entered yet: submission is blocked.
//! assert_eq!(form.submit(), Submission::Blocked);
//! assert_eq!(form.errors()["name"], "required");
//!
//! form.mutate("name", json!("Ada"))?;
//! assert!(form.errors().is_empty());
//! assert_eq!(form.submit(), Submission::Submitted);
//! # Ok::<(), understory_form::FormError>(())
//! ```
//!
//! ## Blur mode
//!
//! ```rust
//! use serde_json::json;
//! use understory_form::{FieldDescriptor, Form, FormConfig};
//!
//! let mut form = Form::uncontrolled(FormConfig::blur(), ());
//! form.register(FieldDescriptor::parse("mood")?.required());
//!
//! form.mutate("mood", json!(""))?;
//! assert!(form.errors().is_empty());
//!
//! // Focus leaves the field at t = 1000 ms; validation runs 200 ms later.
//! form.blur("mood", 1_000)?;
//! assert!(!form.tick(1_100));
//! assert!(form.tick(1_200));
//! assert_eq!(form.errors()["mood"], "required");
//! # Ok::<(), understory_form::FormError>(())
//! ```
//!
//! ## Controlled forms
//!
//! A controlled form reports every mutation through `on_change` and expects
//! the owner to answer with [`Form::set_value`]. Mutations made before the
//! owner answers build on each other, so an owner that ignores a change, or
//! applies it late, never loses one.
//!
//! ```rust
//! use serde_json::json;
//! use understory_form::{Form, FormConfig};
//!
//! let mut form = Form::controlled(json!({ "test": "" }), FormConfig::default(), ());
//! form.mutate("test", json!("v"))?;
//!
//! // The owner adjusts the value before storing it.
//! form.set_value(json!({ "test": "V" }))?;
//! assert_eq!(form.value(), &json!({ "test": "V" }));
//! # Ok::<(), understory_form::FormError>(())
//! ```

mod config;
mod error;
mod form;
mod observer;
pub mod path;
mod registry;
mod rule;

pub use config::{DEFAULT_DEBOUNCE_MS, DEFAULT_REQUIRED_MESSAGE, FieldSpec, FormConfig, ValidateOn};
pub use error::{FormError, PathError, PathErrorKind, Result};
pub use form::{ErrorMap, Form, FormSnapshot, InfoMap, Ownership, Phase, Submission, Touched, Validation};
pub use observer::{Callbacks, FormEvent, FormObserver};
pub use path::{Assign, FieldPath, Segment};
pub use registry::{Deregistered, FieldDescriptor, FieldHandle, FieldRegistry};
pub use rule::{Notice, PatternRule, Rule, Status, ValidationOutcome, Validator, evaluate, is_missing};
