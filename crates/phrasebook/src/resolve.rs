//! Key resolution against a locale dictionary.
//!
//! One resolution per lookup call: find the entry for the singular key,
//! insert or upgrade it when updates are enabled, and pick the template
//! the caller gets back. The caller owns locking and write scheduling;
//! this module only mutates the dictionary it is handed and says whether
//! it did.

use crate::entry::{Dictionary, Entry};

/// Outcome of resolving one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Resolution {
    /// Template to format and return to the caller.
    pub template: String,
    /// Whether the dictionary changed and needs persisting.
    pub dirty: bool,
}

/// Resolve `singular` against `dict`.
///
/// Policy, in order:
/// - `count > 1` selects the plural form; 0, 1, or omitted selects
///   singular.
/// - Unknown key with updates enabled: insert it, seeded from the call's
///   own text (a plural pair when `plural` is given).
/// - Known singular-shaped key called with a `plural` variant and updates
///   enabled: upgrade in place. The stored text becomes `one`, so a
///   translator's prior edit survives the upgrade.
/// - Unknown key with updates disabled: nothing is recorded and the
///   singular key itself is the template.
///
/// Keys match by exact case-sensitive equality.
pub(crate) fn resolve(
    dict: &mut Dictionary,
    singular: &str,
    plural: Option<&str>,
    count: Option<u64>,
    update: bool,
) -> Resolution {
    let is_plural_form = count.is_some_and(|n| n > 1);
    let mut dirty = false;

    match dict.get_mut(singular) {
        None if update => {
            let entry = match plural {
                Some(other) => Entry::plural(singular, other),
                None => Entry::singular(singular),
            };
            dict.insert(singular.to_owned(), entry);
            dirty = true;
        }
        Some(entry) => {
            if let Some(other) = plural
                && update
                && !entry.is_plural()
            {
                entry.upgrade_to_plural(other);
                dirty = true;
            }
        }
        None => {}
    }

    let template = dict
        .get(singular)
        .map(|entry| entry.select(is_plural_form).to_owned())
        .unwrap_or_else(|| singular.to_owned());

    Resolution { template, dirty }
}
