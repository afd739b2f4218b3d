//! Centralized error handling for Quire
//!
//! This module provides a unified error type that covers every failure path
//! in the crate: managed-storage I/O, PDF import, configuration, and the
//! assistant's generation stream.

use log::warn;
use std::fmt;
use std::io;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Custom Result Type Alias
// ─────────────────────────────────────────────────────────────────────────────

/// A specialized `Result` type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The centralized error type for the crate.
#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Managed Storage Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic I/O error wrapper
    Io(io::Error),

    /// Failed to read a persisted entry
    FileRead { path: PathBuf, source: io::Error },

    /// Failed to write a persisted entry
    FileWrite { path: PathBuf, source: io::Error },

    /// Failed to remove a backing file
    FileDelete { path: PathBuf, source: io::Error },

    /// Failed to copy an external file into managed storage
    Import { path: PathBuf, source: io::Error },

    /// A persisted entry is not valid JSON for its type
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A mutation was attempted before the list finished loading
    StoreNotReady,

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to load configuration file
    ConfigLoad {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to save configuration file
    ConfigSave {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse configuration (invalid JSON/format)
    ConfigParse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration or data directory not found or inaccessible
    ConfigDirNotFound,

    // ─────────────────────────────────────────────────────────────────────────
    // Template Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// A template definition breaks its invariants
    InvalidTemplate { id: String, reason: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Assistant Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The generation client reported a failure mid-stream
    Generation(String),

    // ─────────────────────────────────────────────────────────────────────────
    // Application Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic application error with a message
    Application(String),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl Error {
    /// Short message suitable for a dismissible alert.
    pub fn user_message(&self) -> String {
        match self {
            Error::FileWrite { .. } | Error::Json { .. } => {
                "Could not save your changes. Please try again.".to_string()
            }
            Error::FileDelete { .. } => "Could not delete the item. Please try again.".to_string(),
            Error::Import { path, .. } => format!(
                "Could not import '{}'.",
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string())
            ),
            other => other.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display trait implementation for user-friendly error messages
// ─────────────────────────────────────────────────────────────────────────────
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Managed Storage Errors
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::FileRead { path, source } => {
                write!(f, "Failed to read '{}': {}", path.display(), source)
            }
            Error::FileWrite { path, source } => {
                write!(f, "Failed to write '{}': {}", path.display(), source)
            }
            Error::FileDelete { path, source } => {
                write!(f, "Failed to delete '{}': {}", path.display(), source)
            }
            Error::Import { path, source } => {
                write!(f, "Failed to import '{}': {}", path.display(), source)
            }
            Error::Json { path, source } => {
                write!(f, "Invalid JSON in '{}': {}", path.display(), source)
            }
            Error::StoreNotReady => write!(f, "The list has not finished loading"),

            // Configuration Errors
            Error::ConfigLoad { path, source } => {
                write!(
                    f,
                    "Failed to load configuration from '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigSave { path, source } => {
                write!(
                    f,
                    "Failed to save configuration to '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigParse { message, .. } => {
                write!(f, "Invalid configuration format: {}", message)
            }
            Error::ConfigDirNotFound => {
                write!(f, "Configuration directory not found")
            }

            // Template Errors
            Error::InvalidTemplate { id, reason } => {
                write!(f, "Invalid template '{}': {}", id, reason)
            }

            // Assistant Errors
            Error::Generation(msg) => write!(f, "Generation failed: {}", msg),

            // Application Errors
            Error::Application(msg) => write!(f, "{}", msg),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// std::error::Error trait implementation for error chaining
// ─────────────────────────────────────────────────────────────────────────────
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::FileRead { source, .. }
            | Error::FileWrite { source, .. }
            | Error::FileDelete { source, .. }
            | Error::Import { source, .. } => Some(source),
            Error::Json { source, .. } => Some(source),
            Error::ConfigLoad { source, .. } => Some(source.as_ref()),
            Error::ConfigSave { source, .. } => Some(source.as_ref()),
            Error::ConfigParse { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            Error::StoreNotReady
            | Error::ConfigDirNotFound
            | Error::InvalidTemplate { .. }
            | Error::Generation(_)
            | Error::Application(_) => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Graceful Degradation Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for Result to support graceful degradation.
pub trait ResultExt<T> {
    /// If the result is an error, log it at warning level and return the provided default.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!("{}: {}. Using default.", context, err);
                default
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_creation() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test error");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_file_delete_error_display() {
        let path = PathBuf::from("/data/docs/abc.json");
        let err = Error::FileDelete {
            path: path.clone(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to delete"));
        assert!(msg.contains("abc.json"));
    }

    #[test]
    fn test_json_error_names_file_and_asks_to_retry() {
        let source = serde_json::from_str::<u32>("invalid json").unwrap_err();
        let err = Error::Json {
            path: PathBuf::from("/data/docs/abc.json"),
            source,
        };
        assert!(err.to_string().starts_with("Invalid JSON in '/data/docs/abc.json'"));
        assert!(err.user_message().contains("save"));
    }

    #[test]
    fn test_display_store_not_ready() {
        assert_eq!(
            Error::StoreNotReady.to_string(),
            "The list has not finished loading"
        );
    }

    #[test]
    fn test_user_message_for_write_failure_hides_path() {
        let err = Error::FileWrite {
            path: PathBuf::from("/very/private/path.json"),
            source: io::Error::new(io::ErrorKind::Other, "disk full"),
        };
        let msg = err.user_message();
        assert!(!msg.contains("/very/private"));
        assert!(msg.contains("save"));
    }

    #[test]
    fn test_user_message_for_import_names_file() {
        let err = Error::Import {
            path: PathBuf::from("/home/me/report.pdf"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.user_message(), "Could not import 'report.pdf'.");
    }

    #[test]
    fn test_error_source_chaining() {
        use std::error::Error as StdError;
        let err = Error::FileRead {
            path: PathBuf::from("x.json"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.source().is_some());
        assert!(Error::Generation("boom".into()).source().is_none());
        assert!(Error::ConfigDirNotFound.source().is_none());
    }

    #[test]
    fn test_unwrap_or_warn_default_ok() {
        let result: super::Result<i32> = Ok(42);
        assert_eq!(result.unwrap_or_warn_default(0, "test context"), 42);
    }

    #[test]
    fn test_unwrap_or_warn_default_err() {
        let result: super::Result<i32> = Err(Error::Application("test".to_string()));
        assert_eq!(result.unwrap_or_warn_default(0, "test context"), 0);
    }
}
