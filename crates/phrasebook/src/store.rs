//! Locale file persistence.
//!
//! Each locale lives in one JSON file named `<locale>.json` under the
//! configured directory, pretty-printed with two-space indentation so the
//! files stay hand-editable.
//!
//! # Read Fallback
//!
//! Reads may fall back to another locale's file: when `es.json` does not
//! exist and the fallback is `en`, the `en` dictionary seeds the `es`
//! cache. Writes never fall back; a locale's updates always land in its
//! own file, so the first recorded update creates `es.json`.
//!
//! # Atomic Writes
//!
//! Writes use a temp-file-then-rename pattern to prevent corruption on
//! crash.

use std::io;
use std::path::{Path, PathBuf};

use crate::entry::Dictionary;
use crate::error::PhrasebookError;

/// Path of the file that owns `locale` under `directory`.
pub(crate) fn locale_path(directory: &Path, locale: &str) -> PathBuf {
    directory.join(format!("{locale}.json"))
}

/// Resolve which file to read for `locale`.
///
/// The locale's own file wins whenever it exists. Otherwise the fallback
/// locale's file is used, unless fallback is disabled (empty) or is the
/// locale itself.
pub(crate) fn resolve_read_path(directory: &Path, locale: &str, fallback: &str) -> PathBuf {
    let primary = locale_path(directory, locale);
    if primary.exists() || fallback.is_empty() || fallback == locale {
        primary
    } else {
        locale_path(directory, fallback)
    }
}

/// Load a dictionary from `path`.
///
/// - **Missing file** returns an empty dictionary (not an error).
/// - **Unparseable file** returns [`PhrasebookError::Parse`].
pub(crate) fn load(path: &Path, locale: &str) -> Result<Dictionary, PhrasebookError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(
                target: "phrasebook.store",
                locale = locale,
                path = %path.display(),
                "locale file missing, starting empty"
            );
            return Ok(Dictionary::new());
        }
        Err(e) => {
            return Err(PhrasebookError::Read {
                path: path.to_owned(),
                source: e,
            });
        }
    };

    let dict: Dictionary =
        serde_json::from_str(&contents).map_err(|e| PhrasebookError::Parse {
            locale: locale.to_owned(),
            path: path.to_owned(),
            source: e,
        })?;

    tracing::debug!(
        target: "phrasebook.store",
        locale = locale,
        path = %path.display(),
        entries = dict.len(),
        "locale file loaded"
    );
    Ok(dict)
}

/// Serialize a dictionary to the on-disk form.
///
/// Pretty-printed JSON with a trailing newline. `BTreeMap` iteration order
/// makes the output deterministic for a given dictionary.
pub(crate) fn serialize(dict: &Dictionary, locale: &str) -> Result<String, PhrasebookError> {
    let mut json = serde_json::to_string_pretty(dict).map_err(|e| PhrasebookError::Serialize {
        locale: locale.to_owned(),
        source: e,
    })?;
    json.push('\n');
    Ok(json)
}

/// Write `contents` to `path`, creating parent directories as needed.
///
/// Atomic: temp file then rename.
pub(crate) fn write_atomic(
    path: &Path,
    contents: &str,
    locale: &str,
) -> Result<(), PhrasebookError> {
    let write_err = |source: io::Error| PhrasebookError::Write {
        locale: locale.to_owned(),
        path: path.to_owned(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let temp = path.with_extension("json.tmp");
    std::fs::write(&temp, contents).map_err(write_err)?;
    std::fs::rename(&temp, path).map_err(write_err)?;
    Ok(())
}

/// Serialize `dict` and write it to `path`.
pub(crate) fn save(path: &Path, dict: &Dictionary, locale: &str) -> Result<(), PhrasebookError> {
    let contents = serialize(dict, locale)?;
    write_atomic(path, &contents, locale)
}

// =============================================================================
// Tests
// =============================================================================
