//! One-shot key synchronization across locale files.
//!
//! [`sync_locales`] copies every key present in a source locale but
//! missing from a sibling locale file into that sibling, so translators
//! see the full key set in every file. Existing translations are never
//! overwritten; a malformed sibling is regenerated.
//!
//! This is a maintenance pass over the *files*: it runs synchronously,
//! bypasses the write queue, and does not refresh dictionaries already
//! held in the cache. Callers who interleave it with live lookups should
//! drain the queue first.

use crate::book::{Shared, read};
use crate::entry::Dictionary;
use crate::error::PhrasebookError;
use crate::store;

/// Result of one synchronization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Normalized source locale the keys were copied from.
    pub from: String,
    /// Sibling locales that were rewritten, sorted by name.
    pub synced: Vec<SyncedLocale>,
}

/// Outcome for a single sibling locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedLocale {
    pub locale: String,
    /// Keys copied from the source because the sibling lacked them.
    pub keys_added: usize,
}

/// Copy keys missing from sibling locale files out of `from`'s dictionary.
///
/// `from` may be spelled as a locale (`en`) or a file name (`en.json`);
/// matching against sibling files ignores ASCII case.
pub(crate) fn sync_locales(shared: &Shared, from: &str) -> Result<SyncReport, PhrasebookError> {
    let from = normalize_locale(from);
    let (directory, fallback) = {
        let config = read(&shared.config);
        (config.directory.clone(), config.locale_fallback.clone())
    };

    let source_path = store::resolve_read_path(&directory, &from, &fallback);
    let source = store::load(&source_path, &from)?;

    let targets = list_targets(&directory, &from)?;
    let mut synced = Vec::with_capacity(targets.len());

    for locale in targets {
        let path = store::locale_path(&directory, &locale);
        let mut dict = match store::load(&path, &locale) {
            Ok(dict) => dict,
            Err(err) => {
                tracing::warn!(
                    target: "phrasebook.sync",
                    locale = locale.as_str(),
                    error = %err,
                    "sibling locale unreadable, regenerating"
                );
                Dictionary::new()
            }
        };

        let mut keys_added = 0;
        for (key, entry) in &source {
            if !dict.contains_key(key) {
                dict.insert(key.clone(), entry.clone());
                keys_added += 1;
            }
        }

        store::save(&path, &dict, &locale)?;
        tracing::info!(
            target: "phrasebook.sync",
            from = from.as_str(),
            locale = locale.as_str(),
            keys_added,
            "locale synchronized"
        );
        synced.push(SyncedLocale { locale, keys_added });
    }

    Ok(SyncReport { from, synced })
}

fn normalize_locale(locale: &str) -> String {
    let stem = locale.strip_suffix(".json").unwrap_or(locale);
    stem.to_ascii_lowercase()
}

/// Sibling `*.json` files in `directory`, excluding the source itself.
///
/// File stems are kept verbatim so paths stay valid on case-sensitive
/// filesystems; only the comparison against `from` folds case.
fn list_targets(directory: &std::path::Path, from: &str) -> Result<Vec<String>, PhrasebookError> {
    let read_dir_err = |source: std::io::Error| PhrasebookError::ReadDir {
        path: directory.to_owned(),
        source,
    };

    let mut targets = Vec::new();
    for entry in std::fs::read_dir(directory).map_err(read_dir_err)? {
        let path = entry.map_err(read_dir_err)?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if stem.eq_ignore_ascii_case(from) {
            continue;
        }
        targets.push(stem.to_owned());
    }
    targets.sort();
    Ok(targets)
}

// =============================================================================
// Tests
// =============================================================================
