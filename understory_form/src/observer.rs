// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Notification sinks.
//!
//! A [`Form`](crate::Form) reports to a single [`FormObserver`]. Every method
//! has a no-op default, so observers implement only what they need. Three
//! ready-made observers are provided:
//!
//! - `()` ignores everything.
//! - `Vec<FormEvent>` records every notification, which is handy in tests and
//!   for hosts that drain events after each frame.
//! - [`Callbacks`] forwards to boxed closures.

use core::fmt;

use serde_json::Value;

use crate::form::{FormSnapshot, Touched, Validation};

/// Receives form notifications.
pub trait FormObserver {
    /// The value changed through a user mutation, a reset or a field sync.
    fn on_change(&mut self, _value: &Value, _touched: &Touched) {}

    /// The error or info maps changed, or the form was reset.
    fn on_validate(&mut self, _validation: &Validation) {}

    /// The form was submitted without blocking errors.
    fn on_submit(&mut self, _snapshot: &FormSnapshot) {}

    /// The form was reset to its initial value.
    fn on_reset(&mut self) {}
}

impl FormObserver for () {}

impl<O: FormObserver + ?Sized> FormObserver for &mut O {
    fn on_change(&mut self, value: &Value, touched: &Touched) {
        (**self).on_change(value, touched);
    }

    fn on_validate(&mut self, validation: &Validation) {
        (**self).on_validate(validation);
    }

    fn on_submit(&mut self, snapshot: &FormSnapshot) {
        (**self).on_submit(snapshot);
    }

    fn on_reset(&mut self) {
        (**self).on_reset();
    }
}

/// A recorded notification.
#[derive(Clone, Debug, PartialEq)]
pub enum FormEvent {
    /// See [`FormObserver::on_change`].
    Change {
        /// The form value after the change.
        value: Value,
        /// Touched paths after the change.
        touched: Touched,
    },
    /// See [`FormObserver::on_validate`].
    Validate(Validation),
    /// See [`FormObserver::on_submit`].
    Submit(FormSnapshot),
    /// See [`FormObserver::on_reset`].
    Reset,
}

impl FormObserver for Vec<FormEvent> {
    fn on_change(&mut self, value: &Value, touched: &Touched) {
        self.push(FormEvent::Change {
            value: value.clone(),
            touched: touched.clone(),
        });
    }

    fn on_validate(&mut self, validation: &Validation) {
        self.push(FormEvent::Validate(validation.clone()));
    }

    fn on_submit(&mut self, snapshot: &FormSnapshot) {
        self.push(FormEvent::Submit(snapshot.clone()));
    }

    fn on_reset(&mut self) {
        self.push(FormEvent::Reset);
    }
}

type ChangeFn = Box<dyn FnMut(&Value, &Touched)>;
type ValidateFn = Box<dyn FnMut(&Validation)>;
type SubmitFn = Box<dyn FnMut(&FormSnapshot)>;
type ResetFn = Box<dyn FnMut()>;

/// An observer built from optional closures.
///
/// ```
/// use understory_form::{Callbacks, Form, FormConfig};
///
/// let observer = Callbacks::new().with_submit(|snapshot| {
///     assert_eq!(snapshot.value["name"], "Ada");
/// });
/// let mut form = Form::uncontrolled(FormConfig::default(), observer);
/// form.mutate("name", "Ada".into()).unwrap();
/// form.submit();
/// ```
#[derive(Default)]
pub struct Callbacks {
    change: Option<ChangeFn>,
    validate: Option<ValidateFn>,
    submit: Option<SubmitFn>,
    reset: Option<ResetFn>,
}

impl Callbacks {
    /// No callbacks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the change callback.
    #[must_use]
    pub fn with_change(mut self, f: impl FnMut(&Value, &Touched) + 'static) -> Self {
        self.change = Some(Box::new(f));
        self
    }

    /// Sets the validation callback.
    #[must_use]
    pub fn with_validate(mut self, f: impl FnMut(&Validation) + 'static) -> Self {
        self.validate = Some(Box::new(f));
        self
    }

    /// Sets the submit callback.
    #[must_use]
    pub fn with_submit(mut self, f: impl FnMut(&FormSnapshot) + 'static) -> Self {
        self.submit = Some(Box::new(f));
        self
    }

    /// Sets the reset callback.
    #[must_use]
    pub fn with_reset(mut self, f: impl FnMut() + 'static) -> Self {
        self.reset = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_change", &self.change.is_some())
            .field("on_validate", &self.validate.is_some())
            .field("on_submit", &self.submit.is_some())
            .field("on_reset", &self.reset.is_some())
            .finish()
    }
}

impl FormObserver for Callbacks {
    fn on_change(&mut self, value: &Value, touched: &Touched) {
        if let Some(f) = &mut self.change {
            f(value, touched);
        }
    }

    fn on_validate(&mut self, validation: &Validation) {
        if let Some(f) = &mut self.validate {
            f(validation);
        }
    }

    fn on_submit(&mut self, snapshot: &FormSnapshot) {
        if let Some(f) = &mut self.submit {
            f(snapshot);
        }
    }

    fn on_reset(&mut self) {
        if let Some(f) = &mut self.reset {
            f();
        }
    }
}
