//! Dictionary entries: plain strings or singular/plural pairs.
//!
//! On disk a locale file maps keys to either a string or a
//! `{ "one": ..., "other": ... }` object:
//!
//! ```json
//! {
//!   "Hello!": "¡Hola!",
//!   "%d cats": { "one": "%d gato", "other": "%d gatos" }
//! }
//! ```
//!
//! [`Entry`] deserializes both shapes via `#[serde(untagged)]` and keeps
//! which one it was, so a file round-trips without flattening plural pairs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// All entries for one locale, keyed by the singular source text.
///
/// A `BTreeMap` keeps serialization order deterministic: writing the same
/// dictionary twice produces identical bytes.
pub type Dictionary = BTreeMap<String, Entry>;

/// One translation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    /// Singular/plural pair. Listed first so objects are not misread.
    Plural { one: String, other: String },
    /// A single translated string.
    Singular(String),
}

impl Entry {
    /// Build a singular entry.
    pub fn singular(text: impl Into<String>) -> Self {
        Entry::Singular(text.into())
    }

    /// Build a plural entry.
    pub fn plural(one: impl Into<String>, other: impl Into<String>) -> Self {
        Entry::Plural {
            one: one.into(),
            other: other.into(),
        }
    }

    /// Whether this entry carries a plural pair.
    #[must_use]
    pub fn is_plural(&self) -> bool {
        matches!(self, Entry::Plural { .. })
    }

    /// Pick the template for a lookup.
    ///
    /// A plural entry selects `other` when `plural_form` is true and `one`
    /// otherwise. A singular entry always yields its text, whatever form
    /// was requested.
    #[must_use]
    pub fn select(&self, plural_form: bool) -> &str {
        match self {
            Entry::Singular(text) => text,
            Entry::Plural { one, other } => {
                if plural_form {
                    other
                } else {
                    one
                }
            }
        }
    }

    /// Convert a singular entry into a plural pair in place.
    ///
    /// The existing text becomes the `one` form, preserving any edits a
    /// translator already made. Plural entries are left untouched.
    pub(crate) fn upgrade_to_plural(&mut self, other: &str) {
        if let Entry::Singular(one) = self {
            *self = Entry::Plural {
                one: std::mem::take(one),
                other: other.to_owned(),
            };
        }
    }
}
