//! In-memory cache of loaded locale dictionaries.
//!
//! Each locale is read from disk at most once per handle lifetime. A
//! failed load (unreadable or malformed file) still populates the cache
//! with an empty dictionary, so the error is reported once and lookups
//! keep working; the file is regenerated from cache state on the next
//! recorded update.

use std::collections::HashMap;
use std::collections::hash_map::Entry as MapEntry;
use std::path::Path;

use crate::entry::Dictionary;
use crate::error::PhrasebookError;
use crate::store;

#[derive(Debug, Default)]
pub(crate) struct LocaleCache {
    dicts: HashMap<String, Dictionary>,
}

impl LocaleCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fetch the dictionary for `locale`, loading it from disk on first use.
    ///
    /// The load honors the read fallback. On a load failure the locale is
    /// cached as empty and the error is handed back alongside it, exactly
    /// once.
    pub(crate) fn get_or_load(
        &mut self,
        locale: &str,
        directory: &Path,
        fallback: &str,
    ) -> (&mut Dictionary, Option<PhrasebookError>) {
        match self.dicts.entry(locale.to_owned()) {
            MapEntry::Occupied(slot) => (slot.into_mut(), None),
            MapEntry::Vacant(slot) => {
                let path = store::resolve_read_path(directory, locale, fallback);
                match store::load(&path, locale) {
                    Ok(dict) => (slot.insert(dict), None),
                    Err(err) => (slot.insert(Dictionary::new()), Some(err)),
                }
            }
        }
    }

    /// The cached dictionary for `locale`, if it has been loaded.
    pub(crate) fn get(&self, locale: &str) -> Option<&Dictionary> {
        self.dicts.get(locale)
    }

    pub(crate) fn contains(&self, locale: &str) -> bool {
        self.dicts.contains_key(locale)
    }

    /// Locales currently held in the cache, sorted.
    pub(crate) fn loaded_locales(&self) -> Vec<String> {
        let mut locales: Vec<String> = self.dicts.keys().cloned().collect();
        locales.sort();
        locales
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Entry;

    #[test]
    fn loads_from_disk_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("en.json");
        std::fs::write(&path, r#"{ "Hi": "Hi there" }"#).unwrap();

        let mut cache = LocaleCache::new();
        let (dict, err) = cache.get_or_load("en", dir.path(), "");
        assert!(err.is_none());
        assert_eq!(dict.get("Hi"), Some(&Entry::singular("Hi there")));

        // Disk changes are not observed after the first load.
        std::fs::write(&path, r#"{ "Hi": "CHANGED" }"#).unwrap();
        let (dict, err) = cache.get_or_load("en", dir.path(), "");
        assert!(err.is_none());
        assert_eq!(dict.get("Hi"), Some(&Entry::singular("Hi there")));
    }

    #[test]
    fn missing_file_caches_empty_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = LocaleCache::new();

        let (dict, err) = cache.get_or_load("es", dir.path(), "");
        assert!(err.is_none());
        assert!(dict.is_empty());
        assert!(cache.contains("es"));
    }

    #[test]
    fn malformed_file_reports_once_then_serves_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("es.json"), "{{{").unwrap();

        let mut cache = LocaleCache::new();
        let (dict, err) = cache.get_or_load("es", dir.path(), "");
        assert!(matches!(err, Some(PhrasebookError::Parse { .. })));
        assert!(dict.is_empty());

        let (_, err) = cache.get_or_load("es", dir.path(), "");
        assert!(err.is_none(), "second lookup must not re-report");
    }

    #[test]
    fn fallback_seeds_missing_locale() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("en.json"), r#"{ "Hi": "Hi!" }"#).unwrap();

        let mut cache = LocaleCache::new();
        let (dict, err) = cache.get_or_load("es", dir.path(), "en");
        assert!(err.is_none());
        assert_eq!(dict.get("Hi"), Some(&Entry::singular("Hi!")));
    }

    #[test]
    fn loaded_locales_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = LocaleCache::new();
        cache.get_or_load("fr", dir.path(), "");
        cache.get_or_load("de", dir.path(), "");
        cache.get_or_load("en", dir.path(), "");
        assert_eq!(cache.loaded_locales(), vec!["de", "en", "fr"]);
    }
}
