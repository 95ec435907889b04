//! The [`Phrasebook`] handle.
//!
//! A `Phrasebook` owns one locale cache and one write queue. Lookups go
//! through [`translate`](Phrasebook::translate) and
//! [`translate_plural`](Phrasebook::translate_plural); unseen keys are
//! recorded into the active locale's dictionary and persisted in the
//! background. The handle is `Send + Sync`; share it across threads with
//! an `Arc` so the process keeps a single writer per locale file.
//!
//! ```rust,no_run
//! use phrasebook::Phrasebook;
//!
//! fn main() -> Result<(), phrasebook::PhrasebookError> {
//!     let book = Phrasebook::builder()
//!         .directory("./locales")
//!         .locale("es")
//!         .build()?;
//!
//!     println!("{}", book.translate("Hello my name is %s.", &["Bob".into()]));
//!     println!("{}", book.translate_plural("%d cat", "%d cats", 3, &[]));
//!
//!     // Flush pending writes before the process exits.
//!     book.shutdown()?;
//!     Ok(())
//! }
//! ```
//!
//! Lookup never fails: load and write problems are delivered to the error
//! hook when one is configured, otherwise logged, and an unobserved write
//! failure is also returned by the next [`drain`](Phrasebook::drain) or
//! [`shutdown`](Phrasebook::shutdown).

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use phrasebook_fmt::FmtArg;

use crate::cache::LocaleCache;
use crate::config::PhrasebookConfig;
use crate::error::PhrasebookError;
use crate::resolve;
use crate::store;
use crate::sync::{self, SyncReport};
use crate::writer::{UpdateEvent, WriteQueue};

/// Hook invoked on the writer thread after every write attempt.
///
/// Receives the write error, if any, and the event that triggered the
/// write. Must not call back into `drain` or `shutdown`.
pub type UpdateHook = dyn Fn(Option<&PhrasebookError>, &UpdateEvent) + Send + Sync;

/// Hook invoked whenever an internal error occurs (load, parse, write).
///
/// With a hook configured, errors are considered observed and are not
/// re-surfaced by `drain`/`shutdown`.
pub type ErrorHook = dyn Fn(&PhrasebookError) + Send + Sync;

pub(crate) struct Hooks {
    pub(crate) on_update: Option<Box<UpdateHook>>,
    pub(crate) on_error: Option<Box<ErrorHook>>,
}

impl Hooks {
    pub(crate) fn none() -> Self {
        Self {
            on_update: None,
            on_error: None,
        }
    }

    pub(crate) fn notify_update(&self, err: Option<&PhrasebookError>, event: &UpdateEvent) {
        if let Some(hook) = &self.on_update {
            hook(err, event);
        }
    }

    /// Returns true when a hook received the error.
    pub(crate) fn notify_error(&self, err: &PhrasebookError) -> bool {
        if let Some(hook) = &self.on_error {
            hook(err);
            true
        } else {
            false
        }
    }
}

/// State shared between the handle and the writer thread.
pub(crate) struct Shared {
    pub(crate) config: RwLock<PhrasebookConfig>,
    pub(crate) cache: Mutex<LocaleCache>,
    pub(crate) hooks: Hooks,
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

pub(crate) fn read<T>(rw: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    rw.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(rw: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    rw.write().unwrap_or_else(|e| e.into_inner())
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`Phrasebook`].
#[must_use]
pub struct PhrasebookBuilder {
    config: PhrasebookConfig,
    on_update: Option<Box<UpdateHook>>,
    on_error: Option<Box<ErrorHook>>,
}

impl Default for PhrasebookBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PhrasebookBuilder {
    pub fn new() -> Self {
        Self {
            config: PhrasebookConfig::default(),
            on_update: None,
            on_error: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: PhrasebookConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the locale directory.
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.config.directory = directory.into();
        self
    }

    /// Set the active locale.
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.config.locale = locale.into();
        self
    }

    /// Set the fallback locale. Pass an empty string to disable fallback.
    pub fn locale_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.config.locale_fallback = fallback.into();
        self
    }

    /// Enable or disable dictionary updates.
    pub fn update(mut self, update: bool) -> Self {
        self.config.update = update;
        self
    }

    /// Install an update hook. See [`UpdateHook`].
    pub fn on_update<F>(mut self, hook: F) -> Self
    where
        F: Fn(Option<&PhrasebookError>, &UpdateEvent) + Send + Sync + 'static,
    {
        self.on_update = Some(Box::new(hook));
        self
    }

    /// Install an error hook. See [`ErrorHook`].
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&PhrasebookError) + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(hook));
        self
    }

    /// Build the handle and start its writer thread.
    ///
    /// Configuration problems are advisory: they are logged, not fatal.
    pub fn build(self) -> Result<Phrasebook, PhrasebookError> {
        for problem in self.config.validate() {
            tracing::warn!(
                target: "phrasebook",
                problem = problem.as_str(),
                "config validation"
            );
        }

        let shared = Arc::new(Shared {
            config: RwLock::new(self.config),
            cache: Mutex::new(LocaleCache::new()),
            hooks: Hooks {
                on_update: self.on_update,
                on_error: self.on_error,
            },
        });
        let queue = WriteQueue::start(Arc::clone(&shared))?;
        Ok(Phrasebook { shared, queue })
    }
}

// ---------------------------------------------------------------------------
// Phrasebook
// ---------------------------------------------------------------------------

/// Localization handle: locale cache plus background write queue.
///
/// Dropping the handle flushes pending writes; call
/// [`shutdown`](Phrasebook::shutdown) instead when the outcome matters.
pub struct Phrasebook {
    shared: Arc<Shared>,
    queue: WriteQueue,
}

impl Phrasebook {
    pub fn builder() -> PhrasebookBuilder {
        PhrasebookBuilder::new()
    }

    /// Build a handle with the default configuration.
    pub fn new() -> Result<Self, PhrasebookError> {
        Self::builder().build()
    }

    /// Build a handle from an existing configuration.
    pub fn with_config(config: PhrasebookConfig) -> Result<Self, PhrasebookError> {
        Self::builder().config(config).build()
    }

    // -- lookup -------------------------------------------------------------

    /// Translate a singular key, substituting `args` positionally.
    ///
    /// An unseen key is recorded in the active locale's dictionary and
    /// queued for persistence when updates are enabled; with updates
    /// disabled the key itself is formatted and returned. Callable for the
    /// recording side effect alone, discarding the result.
    pub fn translate(&self, singular: &str, args: &[FmtArg<'_>]) -> String {
        self.localize(singular, None, None, args)
    }

    /// Short alias for [`translate`](Self::translate).
    pub fn t(&self, singular: &str, args: &[FmtArg<'_>]) -> String {
        self.translate(singular, args)
    }

    /// Translate with a plural variant.
    ///
    /// `count > 1` selects the plural text; 0 or 1 selects singular. When
    /// the selected text contains a `%d` placeholder, `count` is appended
    /// to the argument list so a bare `translate_plural(s, p, n, &[])`
    /// still renders the number.
    pub fn translate_plural(
        &self,
        singular: &str,
        plural: &str,
        count: u64,
        args: &[FmtArg<'_>],
    ) -> String {
        self.localize(singular, Some(plural), Some(count), args)
    }

    /// Short alias for [`translate_plural`](Self::translate_plural).
    pub fn tn(&self, singular: &str, plural: &str, count: u64, args: &[FmtArg<'_>]) -> String {
        self.translate_plural(singular, plural, count, args)
    }

    fn localize(
        &self,
        singular: &str,
        plural: Option<&str>,
        count: Option<u64>,
        args: &[FmtArg<'_>],
    ) -> String {
        let (directory, locale, fallback, update) = {
            let config = read(&self.shared.config);
            (
                config.directory.clone(),
                config.locale.clone(),
                config.locale_fallback.clone(),
                config.update,
            )
        };

        let (resolution, load_err) = {
            let mut cache = lock(&self.shared.cache);
            let (dict, load_err) = cache.get_or_load(&locale, &directory, &fallback);
            (resolve::resolve(dict, singular, plural, count, update), load_err)
        };

        if let Some(err) = load_err {
            self.report(&err);
        }

        if resolution.dirty {
            let event = UpdateEvent {
                locale: locale.clone(),
                path: store::locale_path(&directory, &locale),
                singular: singular.to_owned(),
                plural: plural.map(str::to_owned),
                count,
            };
            if let Err(err) = self.queue.enqueue(event) {
                self.report(&err);
            }
        }

        let mut argv: Vec<FmtArg<'_>> = args.to_vec();
        if let Some(n) = count
            && phrasebook_fmt::has_numeric_token(&resolution.template)
        {
            argv.push(FmtArg::Uint(n));
        }
        phrasebook_fmt::format(&resolution.template, &argv)
    }

    // -- queries ------------------------------------------------------------

    /// Whether `key` is already present in the active locale's dictionary.
    ///
    /// Loads the locale on first use, like a lookup, but never inserts.
    #[must_use]
    pub fn key_exists(&self, key: &str) -> bool {
        let locale = read(&self.shared.config).locale.clone();
        self.key_exists_in(&locale, key)
    }

    /// Whether `key` is present in `locale`'s dictionary.
    #[must_use]
    pub fn key_exists_in(&self, locale: &str, key: &str) -> bool {
        let (directory, fallback) = {
            let config = read(&self.shared.config);
            (config.directory.clone(), config.locale_fallback.clone())
        };

        let (exists, load_err) = {
            let mut cache = lock(&self.shared.cache);
            let (dict, load_err) = cache.get_or_load(locale, &directory, &fallback);
            (dict.contains_key(key), load_err)
        };

        if let Some(err) = load_err {
            self.report(&err);
        }
        exists
    }

    /// Locales loaded into the cache so far, sorted.
    #[must_use]
    pub fn loaded_locales(&self) -> Vec<String> {
        lock(&self.shared.cache).loaded_locales()
    }

    // -- configuration ------------------------------------------------------

    /// Snapshot of the current configuration.
    #[must_use]
    pub fn config(&self) -> PhrasebookConfig {
        read(&self.shared.config).clone()
    }

    #[must_use]
    pub fn locale(&self) -> String {
        read(&self.shared.config).locale.clone()
    }

    /// Switch the active locale. Takes effect on the next lookup.
    pub fn set_locale(&self, locale: impl Into<String>) {
        write(&self.shared.config).locale = locale.into();
    }

    #[must_use]
    pub fn directory(&self) -> PathBuf {
        read(&self.shared.config).directory.clone()
    }

    /// Change the locale directory. Already-loaded locales keep their
    /// cached dictionaries; writes target the new directory.
    pub fn set_directory(&self, directory: impl Into<PathBuf>) {
        write(&self.shared.config).directory = directory.into();
    }

    #[must_use]
    pub fn locale_fallback(&self) -> String {
        read(&self.shared.config).locale_fallback.clone()
    }

    pub fn set_locale_fallback(&self, fallback: impl Into<String>) {
        write(&self.shared.config).locale_fallback = fallback.into();
    }

    #[must_use]
    pub fn update_enabled(&self) -> bool {
        read(&self.shared.config).update
    }

    pub fn set_update(&self, update: bool) {
        write(&self.shared.config).update = update;
    }

    // -- maintenance --------------------------------------------------------

    /// Copy keys missing from sibling locale files out of `from`'s
    /// dictionary. See [`sync`](crate::sync).
    pub fn sync_from(&self, from: &str) -> Result<SyncReport, PhrasebookError> {
        sync::sync_locales(&self.shared, from)
    }

    /// Block until every queued write attempt has finished.
    ///
    /// Returns the first write failure no hook observed, at most once.
    pub fn drain(&self) -> Result<(), PhrasebookError> {
        self.queue.drain()
    }

    /// Drain the queue and stop the writer thread.
    ///
    /// Later lookups still work from the in-memory cache, but nothing is
    /// persisted anymore; recorded updates are rejected through the error
    /// path. Idempotent.
    pub fn shutdown(&self) -> Result<(), PhrasebookError> {
        self.queue.shutdown()
    }

    fn report(&self, err: &PhrasebookError) {
        if !self.shared.hooks.notify_error(err) {
            tracing::error!(target: "phrasebook", error = %err, "unhandled error");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
