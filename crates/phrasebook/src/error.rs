//! Error type shared across the crate.
//!
//! Every failure surfaced by the store, write queue, or sync pass is a
//! [`PhrasebookError`]. Lookup itself never fails; errors reach callers
//! through hooks, through [`drain`](crate::Phrasebook::drain), or as the
//! `Result` of the explicit file operations.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors raised while reading, writing, or queueing locale files.
#[derive(Debug)]
pub enum PhrasebookError {
    /// I/O error reading a locale file.
    Read { path: PathBuf, source: io::Error },
    /// A locale file exists but is not valid JSON.
    Parse {
        locale: String,
        path: PathBuf,
        source: serde_json::Error,
    },
    /// A dictionary could not be serialized to JSON.
    Serialize {
        locale: String,
        source: serde_json::Error,
    },
    /// I/O error writing a locale file.
    Write {
        locale: String,
        path: PathBuf,
        source: io::Error,
    },
    /// I/O error listing the locale directory.
    ReadDir { path: PathBuf, source: io::Error },
    /// An update was submitted after the write queue shut down.
    QueueClosed { locale: String },
    /// The writer thread could not be spawned.
    Spawn { source: io::Error },
}

impl fmt::Display for PhrasebookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read locale file {}: {source}", path.display())
            }
            Self::Parse { locale, source, .. } => {
                write!(
                    f,
                    "locale {locale} contains invalid syntax, ensure valid JSON: {source}"
                )
            }
            Self::Serialize { locale, source } => {
                write!(f, "failed to serialize locale {locale}: {source}")
            }
            Self::Write { locale, path, source } => {
                write!(
                    f,
                    "failed to write locale {locale} to {}: {source}",
                    path.display()
                )
            }
            Self::ReadDir { path, source } => {
                write!(f, "failed to list locale directory {}: {source}", path.display())
            }
            Self::QueueClosed { locale } => {
                write!(f, "write queue is closed, update for locale {locale} dropped")
            }
            Self::Spawn { source } => write!(f, "failed to spawn writer thread: {source}"),
        }
    }
}

impl std::error::Error for PhrasebookError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Serialize { source, .. } => Some(source),
            Self::Write { source, .. } => Some(source),
            Self::ReadDir { source, .. } => Some(source),
            Self::QueueClosed { .. } => None,
            Self::Spawn { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_locale_and_mentions_json() {
        let source = serde_json::from_str::<serde_json::Value>("{bad").unwrap_err();
        let err = PhrasebookError::Parse {
            locale: "es".into(),
            path: PathBuf::from("locales/es.json"),
            source,
        };
        let msg = err.to_string();
        assert!(msg.contains("locale es"), "got: {msg}");
        assert!(msg.contains("valid JSON"), "got: {msg}");
    }

    #[test]
    fn io_variants_expose_source() {
        use std::error::Error as _;

        let err = PhrasebookError::Read {
            path: PathBuf::from("locales/en.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("locales/en.json"));

        let err = PhrasebookError::QueueClosed { locale: "en".into() };
        assert!(err.source().is_none());
    }
}
