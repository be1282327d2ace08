// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Field descriptors and the registry of mounted fields.
//!
//! A field mounts by registering a [`FieldDescriptor`] and unmounts by
//! deregistering the [`FieldHandle`] it got back. Several descriptors may share
//! a path. Registering a descriptor equal to one already present bumps a
//! reference count instead of adding a duplicate, so mount and unmount pairs
//! from a re-rendering host balance out.

use core::fmt;

use hashbrown::{HashMap, HashSet};
use serde_json::Value;
use smallvec::SmallVec;

use crate::config::ValidateOn;
use crate::error::Result;
use crate::path::FieldPath;
use crate::rule::{Notice, Rule, Validator};

/// Validation constraints for one field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDescriptor {
    path: FieldPath,
    required: bool,
    required_message: Option<String>,
    rules: SmallVec<[Rule; 2]>,
    validate_on: Option<ValidateOn>,
}

impl FieldDescriptor {
    /// An unconstrained descriptor for `path`.
    #[must_use]
    pub fn new(path: FieldPath) -> Self {
        Self {
            path,
            required: false,
            required_message: None,
            rules: SmallVec::new(),
            validate_on: None,
        }
    }

    /// Parses `path` and returns an unconstrained descriptor for it.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Path`](crate::FormError::Path) if the path is malformed.
    pub fn parse(path: &str) -> Result<Self> {
        Ok(Self::new(FieldPath::parse(path)?))
    }

    /// Marks the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Overrides the form's message for a missing required value.
    #[must_use]
    pub fn required_message(mut self, message: impl Into<String>) -> Self {
        self.required_message = Some(message.into());
        self
    }

    /// Appends a rule.
    #[must_use]
    pub fn rule(mut self, rule: impl Into<Rule>) -> Self {
        self.rules.push(rule.into());
        self
    }

    /// Appends a custom validator built from a closure.
    #[must_use]
    pub fn validator(
        self,
        f: impl Fn(Option<&Value>, &Value) -> Option<Notice> + Send + Sync + 'static,
    ) -> Self {
        self.rule(Validator::new(f))
    }

    /// Overrides the form's validation timing for this field.
    #[must_use]
    pub fn validate_on(mut self, mode: ValidateOn) -> Self {
        self.validate_on = Some(mode);
        self
    }

    /// Returns the field path.
    #[must_use]
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Returns `true` if a value is required.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the field's own message for a missing required value.
    #[must_use]
    pub fn required_message_override(&self) -> Option<&str> {
        self.required_message.as_deref()
    }

    /// Returns the rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Returns the field's own validation timing.
    #[must_use]
    pub fn validate_on_override(&self) -> Option<ValidateOn> {
        self.validate_on
    }
}

/// Identifies a registration.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldHandle(u32);

impl FieldHandle {
    /// Returns the raw index of this handle.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for FieldHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldHandle").field(&self.0).finish()
    }
}

/// Result of a successful [`FieldRegistry::deregister`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deregistered {
    /// Path of the released registration.
    pub path: FieldPath,
    /// `true` when no descriptor covers the path any more.
    pub uncovered: bool,
}

#[derive(Clone, Debug)]
struct Entry {
    handle: FieldHandle,
    descriptor: FieldDescriptor,
    count: u32,
}

/// The set of currently mounted fields.
#[derive(Clone, Debug, Default)]
pub struct FieldRegistry {
    entries: Vec<Entry>,
    coverage: HashMap<String, u32>,
    next: u32,
}

impl FieldRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor.
    ///
    /// A descriptor equal to a live one reuses its handle.
    pub fn register(&mut self, descriptor: FieldDescriptor) -> FieldHandle {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.descriptor == descriptor) {
            entry.count += 1;
            return entry.handle;
        }
        let handle = FieldHandle(self.next);
        self.next = self.next.wrapping_add(1);
        *self
            .coverage
            .entry(descriptor.path.as_str().into())
            .or_insert(0) += 1;
        self.entries.push(Entry {
            handle,
            descriptor,
            count: 1,
        });
        handle
    }

    /// Releases one registration of `handle`.
    ///
    /// Returns `None` for an unknown handle.
    pub fn deregister(&mut self, handle: FieldHandle) -> Option<Deregistered> {
        let index = self.entries.iter().position(|e| e.handle == handle)?;
        let entry = &mut self.entries[index];
        entry.count -= 1;
        if entry.count > 0 {
            return Some(Deregistered {
                path: entry.descriptor.path.clone(),
                uncovered: false,
            });
        }
        let path = self.entries.remove(index).descriptor.path;
        let uncovered = match self.coverage.get_mut(path.as_str()) {
            Some(count) if *count > 1 => {
                *count -= 1;
                false
            }
            _ => {
                self.coverage.remove(path.as_str());
                true
            }
        };
        Some(Deregistered { path, uncovered })
    }

    /// Returns the descriptor registered under `handle`.
    #[must_use]
    pub fn get(&self, handle: FieldHandle) -> Option<&FieldDescriptor> {
        self.entries
            .iter()
            .find(|e| e.handle == handle)
            .map(|e| &e.descriptor)
    }

    /// Returns `true` if at least one descriptor covers `path`.
    #[must_use]
    pub fn covers(&self, path: &str) -> bool {
        self.coverage.contains_key(path)
    }

    /// Iterates the descriptors covering `path`, in registration order.
    pub fn descriptors_for<'a>(
        &'a self,
        path: &'a str,
    ) -> impl Iterator<Item = &'a FieldDescriptor> + 'a {
        self.iter()
            .map(|(_, d)| d)
            .filter(move |d| d.path.as_str() == path)
    }

    /// Iterates all registrations in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldHandle, &FieldDescriptor)> + '_ {
        self.entries.iter().map(|e| (e.handle, &e.descriptor))
    }

    /// Returns each covered path once, in order of first registration.
    #[must_use]
    pub fn paths(&self) -> Vec<&FieldPath> {
        let mut seen = HashSet::with_capacity(self.coverage.len());
        self.entries
            .iter()
            .map(|e| &e.descriptor.path)
            .filter(|path| seen.insert(path.as_str()))
            .collect()
    }

    /// Resolves the validation timing for `path`.
    ///
    /// The first covering descriptor with an override decides; otherwise
    /// `fallback` applies.
    #[must_use]
    pub fn validate_on(&self, path: &str, fallback: ValidateOn) -> ValidateOn {
        self.descriptors_for(path)
            .find_map(FieldDescriptor::validate_on_override)
            .unwrap_or(fallback)
    }

    /// Returns the number of distinct registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
