// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The form state controller.
//!
//! ## Lifecycle
//!
//! ```text
//! Idle ──mutate/blur──▶ ValidationPending ──tick──▶ Idle
//!   │                                                ▲
//!   ├──submit──▶ Submitting ─────────────────────────┤
//!   └──reset───▶ Reset ──next interaction────────────┘
//! ```
//!
//! `ValidationPending` only occurs in blur mode, while the debounce window is
//! armed. In change mode every mutation validates synchronously.
//! `Submitting` is transient: it holds while `on_submit` runs and is gone by
//! the time [`Form::submit`] returns.
//!
//! ## Notifications
//!
//! Every operation applies its state change in full before the observer hears
//! about it. Inside [`Form::batch`] notifications are held back and delivered
//! once at the end, in the order reset, change, validate, submit.
//!
//! `on_validate` fires only when the error or info maps differ from what the
//! observer last saw, except after a reset or a submit, which always report
//! the current maps.

use std::collections::BTreeMap;

use hashbrown::{HashMap, HashSet};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};
use understory_timing::Debounce;

use crate::config::{FormConfig, ValidateOn};
use crate::error::{FormError, Result};
use crate::observer::FormObserver;
use crate::path::{self, Assign, FieldPath};
use crate::registry::{FieldDescriptor, FieldHandle, FieldRegistry};
use crate::rule::{self, ValidationOutcome};

/// Paths the user has interacted with, keyed by canonical path text.
pub type Touched = BTreeMap<String, bool>;

/// Blocking messages keyed by canonical path text.
pub type ErrorMap = BTreeMap<String, String>;

/// Informational messages keyed by canonical path text.
pub type InfoMap = BTreeMap<String, String>;

/// The error and info maps produced by a validation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Validation {
    /// Blocking errors.
    pub errors: ErrorMap,
    /// Informational messages.
    pub infos: InfoMap,
}

impl Validation {
    /// Returns `true` when nothing blocks submission.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns `true` when there is nothing to report.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.infos.is_empty()
    }

    fn forget(&mut self, path: &str) -> bool {
        let error = self.errors.remove(path).is_some();
        let info = self.infos.remove(path).is_some();
        error || info
    }
}

/// What a successful submission reports.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FormSnapshot {
    /// The submitted value.
    pub value: Value,
    /// Touched paths at submission time.
    pub touched: Touched,
}

/// Where the form is in its lifecycle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// Nothing pending.
    #[default]
    Idle,
    /// A debounced validation pass is armed.
    ValidationPending,
    /// A submission is being delivered.
    ///
    /// Only observable while the observer's `on_submit` runs.
    Submitting,
    /// The form was reset and has not been interacted with since.
    Reset,
}

/// Who owns the form value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Ownership {
    /// An external owner supplies the value through [`Form::set_value`].
    Controlled,
    /// The form owns its value.
    Uncontrolled,
}

/// Outcome of [`Form::submit`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    /// The observer received the submission.
    Submitted,
    /// Blocking errors prevented submission.
    Blocked,
}

#[derive(Copy, Clone)]
enum Scope<'a> {
    All,
    Touched,
    Queued(&'a HashSet<String>),
}

#[derive(Debug, Default)]
struct Outbox {
    reset: bool,
    change: bool,
    validate: bool,
    force_validate: bool,
    submits: Vec<FormSnapshot>,
}

/// A form: value, touched set, validation maps and mounted fields.
///
/// `O` receives notifications; see [`FormObserver`].
#[derive(Debug)]
pub struct Form<O = ()> {
    config: FormConfig,
    ownership: Ownership,
    initial: Value,
    value: Value,
    touched: Touched,
    validation: Validation,
    registry: FieldRegistry,
    phase: Phase,
    debounce: Debounce,
    queued: HashSet<String>,
    last_change: Option<Value>,
    notified: Validation,
    outbox: Outbox,
    depth: u32,
    observer: O,
}

impl<O: FormObserver> Form<O> {
    fn with_ownership(ownership: Ownership, value: Value, config: FormConfig, observer: O) -> Self {
        let debounce = Debounce::new(config.debounce_ms);
        Self {
            config,
            ownership,
            initial: value.clone(),
            value,
            touched: Touched::new(),
            validation: Validation::default(),
            registry: FieldRegistry::new(),
            phase: Phase::Idle,
            debounce,
            queued: HashSet::new(),
            last_change: None,
            notified: Validation::default(),
            outbox: Outbox::default(),
            depth: 0,
            observer,
        }
    }

    /// A form whose value is owned by the caller.
    ///
    /// The caller is told about mutations through `on_change` and answers with
    /// [`Form::set_value`].
    pub fn controlled(value: Value, config: FormConfig, observer: O) -> Self {
        Self::with_ownership(Ownership::Controlled, value, config, observer)
    }

    /// A form owning its value, starting from an empty object.
    pub fn uncontrolled(config: FormConfig, observer: O) -> Self {
        Self::uncontrolled_with(Value::Object(Map::new()), config, observer)
    }

    /// A form owning its value, starting from `value`.
    pub fn uncontrolled_with(value: Value, config: FormConfig, observer: O) -> Self {
        Self::with_ownership(Ownership::Uncontrolled, value, config, observer)
    }

    /// Mounts a field.
    pub fn register(&mut self, descriptor: FieldDescriptor) -> FieldHandle {
        let path = descriptor.path().clone();
        let handle = self.registry.register(descriptor);
        debug!(%path, ?handle, fields = self.registry.len(), "field registered");
        handle
    }

    /// Unmounts a field.
    ///
    /// When no descriptor covers its path any more, the path's outcomes and
    /// any queued validation for it are dropped at once, and the observer is
    /// told about the changed maps. Returns `false` for an unknown handle.
    pub fn deregister(&mut self, handle: FieldHandle) -> bool {
        let Some(released) = self.registry.deregister(handle) else {
            return false;
        };
        debug!(path = %released.path, ?handle, uncovered = released.uncovered, "field deregistered");
        if released.uncovered {
            let key = released.path.as_str();
            self.queued.remove(key);
            if self.validation.forget(key) {
                self.outbox.validate = true;
                self.flush();
            }
        }
        true
    }

    /// Applies a user edit at `path`.
    ///
    /// The path is marked touched. In change mode the touched and already
    /// reported fields are revalidated at once; in blur mode the path waits
    /// for the next debounced pass.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Path`] if `path` is malformed.
    pub fn mutate(&mut self, path: &str, value: Value) -> Result<()> {
        let path = FieldPath::parse(path)?;
        self.leave_reset();
        path::set_in(&mut self.value, &path, Assign::Value(value));
        self.touched.insert(path.as_str().into(), true);
        trace!(%path, "field mutated");
        match self.validate_on(path.as_str()) {
            ValidateOn::Change => {
                self.run_pass(Scope::Touched);
            }
            ValidateOn::Blur => {
                self.queued.insert(path.into());
            }
        }
        self.outbox.change = true;
        self.flush();
        Ok(())
    }

    /// Removes the value at `path` without marking it touched.
    ///
    /// Returns `true` if something was removed.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Path`] if `path` is malformed.
    pub fn remove(&mut self, path: &str) -> Result<bool> {
        let path = FieldPath::parse(path)?;
        if !path::remove_in(&mut self.value, &path) {
            return Ok(false);
        }
        trace!(%path, "field removed");
        self.outbox.change = true;
        self.flush();
        Ok(true)
    }

    /// Reports that the field at `path` lost focus at time `now`.
    ///
    /// In blur mode this queues the path and (re)arms the debounce window; in
    /// change mode it does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Path`] if `path` is malformed.
    pub fn blur(&mut self, path: &str, now: u64) -> Result<()> {
        let path = FieldPath::parse(path)?;
        if self.validate_on(path.as_str()) != ValidateOn::Blur {
            return Ok(());
        }
        self.leave_reset();
        let deadline = self.debounce.schedule(now);
        trace!(%path, deadline, "validation scheduled");
        self.queued.insert(path.into());
        self.phase = Phase::ValidationPending;
        Ok(())
    }

    /// Advances the scheduler to `now`.
    ///
    /// When the debounce window has elapsed, runs one validation pass over the
    /// queued paths against the fields mounted at this moment and returns
    /// `true`.
    pub fn tick(&mut self, now: u64) -> bool {
        if !self.debounce.poll(now) {
            return false;
        }
        let queued = core::mem::take(&mut self.queued);
        trace!(now, paths = queued.len(), "debounce elapsed");
        self.run_pass(Scope::Queued(&queued));
        self.phase = Phase::Idle;
        self.flush();
        true
    }

    /// Validates every mounted field and returns the resulting maps.
    ///
    /// Any scheduled pass is superseded and cancelled.
    pub fn validate(&mut self) -> Validation {
        self.cancel_scheduled();
        self.run_pass(Scope::All);
        self.flush();
        self.validation.clone()
    }

    /// Validates every mounted field and submits when nothing blocks.
    ///
    /// The observer always receives `on_validate`, whether or not the
    /// submission goes through.
    pub fn submit(&mut self) -> Submission {
        self.cancel_scheduled();
        self.run_pass(Scope::All);
        self.outbox.force_validate = true;
        if !self.validation.is_valid() {
            debug!(errors = self.validation.errors.len(), "submission blocked");
            self.flush();
            return Submission::Blocked;
        }
        debug!("submission accepted");
        self.phase = Phase::Submitting;
        self.outbox.submits.push(FormSnapshot {
            value: self.value.clone(),
            touched: self.touched.clone(),
        });
        self.flush();
        self.phase = Phase::Idle;
        Submission::Submitted
    }

    /// Restores the initial value and clears touched paths, maps and any
    /// scheduled validation.
    pub fn reset(&mut self) {
        self.cancel_scheduled();
        self.value = self.initial.clone();
        self.touched.clear();
        self.validation = Validation::default();
        self.phase = Phase::Reset;
        debug!("form reset");
        self.outbox.reset = true;
        self.outbox.change = true;
        self.outbox.force_validate = true;
        self.flush();
    }

    /// Adopts a value supplied by the owner of a controlled form.
    ///
    /// The value is always adopted, even when it repeats an earlier one. In
    /// blur mode, touched paths whose value the owner changed are queued for
    /// the next debounced pass unless the owner merely echoed the last
    /// reported change.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NotControlled`] for an uncontrolled form.
    pub fn set_value(&mut self, external: Value) -> Result<()> {
        if self.ownership != Ownership::Controlled {
            return Err(FormError::NotControlled);
        }
        if self.last_change.as_ref() != Some(&external) {
            for key in self.touched.keys() {
                let Ok(path) = FieldPath::parse(key) else {
                    continue;
                };
                if self.validate_on(key) == ValidateOn::Blur
                    && path.get(&self.value) != path.get(&external)
                {
                    self.queued.insert(key.clone());
                }
            }
        }
        trace!(queued = self.queued.len(), "external value adopted");
        self.value = external;
        Ok(())
    }

    /// Applies a value owned by a field rather than by the user.
    ///
    /// The path is not marked touched. The observer hears about the change
    /// only when the value actually differs.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Path`] if `path` is malformed.
    pub fn sync_field(&mut self, path: &str, value: Value) -> Result<()> {
        let path = FieldPath::parse(path)?;
        if path.get(&self.value) == Some(&value) {
            return Ok(());
        }
        trace!(%path, "field synced");
        path::set_in(&mut self.value, &path, Assign::Value(value));
        self.outbox.change = true;
        self.flush();
        Ok(())
    }

    /// Runs `f` and delivers the notifications it caused once, at the end.
    ///
    /// Batches nest; only the outermost one delivers.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        self.flush();
        result
    }

    /// Returns the current value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the value the form was created with.
    #[must_use]
    pub fn initial_value(&self) -> &Value {
        &self.initial
    }

    /// Returns the touched paths.
    #[must_use]
    pub fn touched(&self) -> &Touched {
        &self.touched
    }

    /// Returns `true` if `path` has been touched.
    #[must_use]
    pub fn is_touched(&self, path: &str) -> bool {
        self.touched.get(path).copied().unwrap_or(false)
    }

    /// Returns the blocking errors.
    #[must_use]
    pub fn errors(&self) -> &ErrorMap {
        &self.validation.errors
    }

    /// Returns the informational messages.
    #[must_use]
    pub fn infos(&self) -> &InfoMap {
        &self.validation.infos
    }

    /// Returns both maps.
    #[must_use]
    pub fn validation(&self) -> &Validation {
        &self.validation
    }

    /// Returns the lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns who owns the value.
    #[must_use]
    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// Returns the mounted fields.
    #[must_use]
    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Returns `true` while a debounced pass is armed.
    #[must_use]
    pub fn is_validation_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Returns when the armed debounced pass is due, for hosts driving a timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.debounce.deadline()
    }

    /// Returns the observer.
    #[must_use]
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Returns the observer mutably.
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Consumes the form and returns the observer.
    pub fn into_observer(self) -> O {
        self.observer
    }

    fn validate_on(&self, path: &str) -> ValidateOn {
        self.registry.validate_on(path, self.config.validate)
    }

    fn leave_reset(&mut self) {
        if self.phase == Phase::Reset {
            self.phase = Phase::Idle;
        }
    }

    fn cancel_scheduled(&mut self) {
        if self.debounce.cancel() {
            trace!("scheduled validation cancelled");
        }
        self.queued.clear();
        if self.phase == Phase::ValidationPending {
            self.phase = Phase::Idle;
        }
    }

    fn run_pass(&mut self, scope: Scope<'_>) {
        let previous = core::mem::take(&mut self.validation);
        let registry = &self.registry;
        let fallback = self.config.validate;
        let in_scope = |path: &str| match scope {
            Scope::All => true,
            Scope::Touched => {
                registry.validate_on(path, fallback) == ValidateOn::Change
                    && (self.touched.contains_key(path)
                        || previous.errors.contains_key(path)
                        || previous.infos.contains_key(path))
            }
            Scope::Queued(queued) => queued.contains(path),
        };

        let mut next = Validation::default();
        for (path, message) in &previous.errors {
            if registry.covers(path) && !in_scope(path.as_str()) {
                next.errors.insert(path.clone(), message.clone());
            }
        }
        for (path, message) in &previous.infos {
            if registry.covers(path) && !in_scope(path.as_str()) {
                next.infos.insert(path.clone(), message.clone());
            }
        }

        let mut outcomes: Vec<(&str, ValidationOutcome)> = Vec::new();
        let mut slots: HashMap<&str, usize> = HashMap::new();
        for (_, descriptor) in registry.iter() {
            let path = descriptor.path();
            if !in_scope(path.as_str()) {
                continue;
            }
            let outcome = rule::evaluate(
                descriptor,
                path.get(&self.value),
                &self.value,
                &self.config.required_message,
            );
            match slots.get(path.as_str()) {
                Some(&slot) => {
                    let existing = core::mem::take(&mut outcomes[slot].1);
                    outcomes[slot].1 = existing.combine(outcome);
                }
                None => {
                    slots.insert(path.as_str(), outcomes.len());
                    outcomes.push((path.as_str(), outcome));
                }
            }
        }
        let evaluated = outcomes.len();
        for (path, outcome) in outcomes {
            match outcome {
                ValidationOutcome::Error(message) => {
                    next.errors.insert(path.into(), message);
                }
                ValidationOutcome::Info(message) => {
                    next.infos.insert(path.into(), message);
                }
                ValidationOutcome::Absent => {}
            }
        }

        debug!(
            fields = evaluated,
            errors = next.errors.len(),
            infos = next.infos.len(),
            "validation pass"
        );
        self.validation = next;
        self.outbox.validate = true;
    }

    fn flush(&mut self) {
        if self.depth > 0 {
            return;
        }
        let outbox = core::mem::take(&mut self.outbox);
        if outbox.reset {
            self.observer.on_reset();
        }
        if outbox.change {
            self.last_change = Some(self.value.clone());
            self.observer.on_change(&self.value, &self.touched);
        }
        if outbox.force_validate || (outbox.validate && self.validation != self.notified) {
            self.notified = self.validation.clone();
            self.observer.on_validate(&self.validation);
        }
        for snapshot in &outbox.submits {
            self.observer.on_submit(snapshot);
        }
    }
}
