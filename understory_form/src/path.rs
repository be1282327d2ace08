// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Field paths: parsing and resolution against nested values.
//!
//! A field path names a location in a form value using dot-separated names
//! with optional bracketed indices, for example `phones[1].number` or
//! `matrix[0][2]`. Paths are parsed once into a [`FieldPath`]; its canonical
//! text (see [`FieldPath::as_str`]) is the key used by touched, error and info
//! maps.
//!
//! Resolution never fails: a path that does not exist in a value resolves to
//! `None` ("absent"). Assignment creates whatever intermediate objects and
//! arrays are needed.
//!
//! ```rust
//! use serde_json::json;
//! use understory_form::path::{self, Assign, FieldPath};
//!
//! let phone: FieldPath = "phones[1].number".parse().unwrap();
//! let value = json!({ "phones": [{ "number": "" }] });
//!
//! assert_eq!(path::get(&value, &phone), None);
//!
//! let next = path::set(&value, &phone, Assign::Value(json!("555")));
//! assert_eq!(next, json!({ "phones": [{ "number": "" }, { "number": "555" }] }));
//! ```

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;

use crate::error::{PathError, PathErrorKind};

/// Largest array index a [`FieldPath`] may name.
///
/// Assignment pads arrays up to the index, so the bound also caps how many
/// elements a single write can allocate.
pub const MAX_INDEX: usize = 65_535;

/// One step of a [`FieldPath`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    /// An object key.
    Key(String),
    /// An array index.
    Index(usize),
}

/// A parsed field path.
///
/// Two paths are equal when their canonical forms are equal, so `a[01]` and
/// `a[1]` name the same field.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    text: String,
    segments: SmallVec<[Segment; 4]>,
}

impl FieldPath {
    /// Parses a path such as `a.b[2].c`.
    ///
    /// # Errors
    ///
    /// Returns a [`PathError`] describing the first syntax problem found.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let fail = |offset, kind| PathError {
            path: input.into(),
            offset,
            kind,
        };
        if input.is_empty() {
            return Err(fail(0, PathErrorKind::Empty));
        }

        let bytes = input.as_bytes();
        let mut segments = SmallVec::new();
        let mut expect_name = true;
        let mut i = 0;
        while i < bytes.len() {
            if expect_name {
                let start = i;
                while i < bytes.len() && !matches!(bytes[i], b'.' | b'[' | b']') {
                    i += 1;
                }
                if i == start {
                    let kind = match bytes.get(i) {
                        Some(b'[') if segments.is_empty() => PathErrorKind::LeadingIndex,
                        Some(b']') => PathErrorKind::UnexpectedBracket,
                        _ => PathErrorKind::EmptySegment,
                    };
                    return Err(fail(i, kind));
                }
                segments.push(Segment::Key(input[start..i].into()));
                expect_name = false;
                continue;
            }
            match bytes[i] {
                b'.' => {
                    expect_name = true;
                    i += 1;
                }
                b'[' => {
                    let open = i;
                    let Some(len) = input[open + 1..].find(']') else {
                        return Err(fail(open, PathErrorKind::UnclosedBracket));
                    };
                    let digits = &input[open + 1..open + 1 + len];
                    let index = digits
                        .bytes()
                        .all(|b| b.is_ascii_digit())
                        .then(|| digits.parse::<usize>().ok())
                        .flatten()
                        .filter(|index| *index <= MAX_INDEX)
                        .ok_or_else(|| fail(open + 1, PathErrorKind::InvalidIndex))?;
                    segments.push(Segment::Index(index));
                    i = open + len + 2;
                }
                b']' => return Err(fail(i, PathErrorKind::UnexpectedBracket)),
                _ => return Err(fail(i, PathErrorKind::TrailingCharacters)),
            }
        }
        if expect_name {
            return Err(fail(bytes.len(), PathErrorKind::EmptySegment));
        }

        Ok(Self {
            text: canonical(&segments),
            segments,
        })
    }

    /// Returns the canonical text of this path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Resolves this path against `value`; see [`get`].
    #[must_use]
    pub fn get<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        get(value, self)
    }
}

fn canonical(segments: &[Segment]) -> String {
    let mut text = String::new();
    for (i, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Key(key) => {
                if i > 0 {
                    text.push('.');
                }
                text.push_str(key);
            }
            Segment::Index(index) => {
                text.push('[');
                text.push_str(&index.to_string());
                text.push(']');
            }
        }
    }
    text
}

impl fmt::Debug for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldPath").field(&self.text).finish()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.text
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// What to write at a path.
#[derive(Clone, Debug, PartialEq)]
pub enum Assign {
    /// Store this value, creating intermediate containers as needed.
    Value(Value),
    /// Delete the location entirely.
    ///
    /// Object keys are removed. Array elements become `null` so that the
    /// indices of their siblings are unaffected.
    Remove,
}

impl From<Value> for Assign {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Resolves `path` against `value`.
///
/// Missing keys, out-of-range indices and type mismatches (indexing into an
/// object, keying into an array or a scalar) all resolve to `None`.
#[must_use]
pub fn get<'v>(value: &'v Value, path: &FieldPath) -> Option<&'v Value> {
    path.segments()
        .iter()
        .try_fold(value, |node, segment| match (segment, node) {
            (Segment::Key(key), Value::Object(map)) => map.get(key.as_str()),
            (Segment::Index(index), Value::Array(items)) => items.get(*index),
            _ => None,
        })
}

/// Returns a copy of `value` with `path` assigned.
#[must_use]
pub fn set(value: &Value, path: &FieldPath, assign: Assign) -> Value {
    let mut next = value.clone();
    set_in(&mut next, path, assign);
    next
}

/// Assigns `path` inside `value` in place.
///
/// Intermediate locations that do not exist are created: an array when the
/// next segment is an index, an object otherwise. Arrays shorter than a
/// requested index are padded with `null`. A scalar found where a container
/// is required is replaced by that container.
///
/// [`Assign::Remove`] never creates anything; see [`remove_in`].
pub fn set_in(value: &mut Value, path: &FieldPath, assign: Assign) {
    match assign {
        Assign::Value(leaf) => {
            let node = core::mem::take(value);
            *value = assign_at(node, path.segments(), leaf);
        }
        Assign::Remove => {
            remove_in(value, path);
        }
    }
}

/// Deletes `path` inside `value`.
///
/// Returns `true` if something was removed. Paths that do not exist are left
/// alone.
pub fn remove_in(value: &mut Value, path: &FieldPath) -> bool {
    let Some((last, parents)) = path.segments().split_last() else {
        return false;
    };
    let parent = parents
        .iter()
        .try_fold(value, |node, segment| match (segment, node) {
            (Segment::Key(key), Value::Object(map)) => map.get_mut(key.as_str()),
            (Segment::Index(index), Value::Array(items)) => items.get_mut(*index),
            _ => None,
        });
    match (last, parent) {
        (Segment::Key(key), Some(Value::Object(map))) => map.shift_remove(key.as_str()).is_some(),
        (Segment::Index(index), Some(Value::Array(items))) => match items.get_mut(*index) {
            Some(slot) => {
                *slot = Value::Null;
                true
            }
            None => false,
        },
        _ => false,
    }
}

fn assign_at(node: Value, segments: &[Segment], leaf: Value) -> Value {
    let Some((first, rest)) = segments.split_first() else {
        return leaf;
    };
    match first {
        Segment::Key(key) => {
            let mut map = match node {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            let slot = map.entry(key.as_str()).or_insert(Value::Null);
            let child = core::mem::take(slot);
            *slot = assign_at(child, rest, leaf);
            Value::Object(map)
        }
        Segment::Index(index) => {
            let index = *index;
            let mut items = match node {
                Value::Array(items) => items,
                _ => Vec::new(),
            };
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            let child = core::mem::take(&mut items[index]);
            items[index] = assign_at(child, rest, leaf);
            Value::Array(items)
        }
    }
}
