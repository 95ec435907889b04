#![forbid(unsafe_code)]

//! Phrasebook
//!
//! Lazy, self-updating JSON locale catalogs. Callers ask for a string by
//! its source-language text; unseen strings are recorded into a per-locale
//! dictionary file for a human translator to fill in later, and a
//! background write queue keeps those files consistent under concurrent
//! lookups. Nothing is translated automatically.
//!
//! # Key Components
//!
//! - [`Phrasebook`] - The handle: locale cache plus serialized write queue
//! - [`PhrasebookBuilder`] - Configuration and hook installation
//! - [`PhrasebookConfig`] - Directory, locale, fallback, update flag
//! - [`Entry`] / [`Dictionary`] - The persisted dictionary model
//! - [`FmtArg`] / [`fmt`] - Positional `%s`/`%d` template formatting
//! - [`SyncReport`] - Result of cross-locale key synchronization
//!
//! # Example
//!
//! ```rust,no_run
//! use phrasebook::Phrasebook;
//!
//! # fn main() -> Result<(), phrasebook::PhrasebookError> {
//! let book = Phrasebook::builder().locale("es").build()?;
//!
//! // First use inserts the keys into ./locales/es.json, formatted with
//! // the source text until a translator edits the file.
//! let hello = book.translate("Hello my name is %s.", &["Bob".into()]);
//! let cats = book.translate_plural("I have %d cat.", "I have %d cats.", 2, &[]);
//! assert_eq!(hello, "Hello my name is Bob.");
//! assert_eq!(cats, "I have 2 cats.");
//!
//! book.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! # On-Disk Format
//!
//! One pretty-printed JSON object per locale at `<directory>/<locale>.json`,
//! mapping source text to either a translated string or a
//! `{ "one": ..., "other": ... }` plural pair. The files are meant to be
//! hand-edited; writes are atomic and deterministic so they diff cleanly.

mod cache;
mod resolve;
mod store;

pub mod book;
pub mod config;
pub mod entry;
pub mod error;
pub mod sync;
pub mod writer;

pub use book::{ErrorHook, Phrasebook, PhrasebookBuilder, UpdateHook};
pub use config::{ConfigError, PhrasebookConfig};
pub use entry::{Dictionary, Entry};
pub use error::PhrasebookError;
pub use phrasebook_fmt as fmt;
pub use phrasebook_fmt::FmtArg;
pub use sync::{SyncReport, SyncedLocale};
pub use writer::UpdateEvent;
