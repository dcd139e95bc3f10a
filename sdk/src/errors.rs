//! Error types and handling
//!
//! This module provides the error types used throughout the widget package
//! subsystem. All errors implement the `StrydeErrorExt` trait which provides
//! user-friendly hints and indicates whether errors are recoverable.
//!
//! # Security
//!
//! Error messages are safe to display to end users: they never include raw
//! package bytes, signature tokens, or absolute file paths.

use thiserror::Error;

/// Trait for Stryde error extensions
///
/// Provides additional context for errors, including user-friendly hints and
/// recoverability information. All package subsystem errors implement this
/// trait.
pub trait StrydeErrorExt {
    /// Returns a user-friendly hint for the error
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried or worked around. Non-recoverable
    /// errors typically mean the package itself must be fixed or replaced.
    fn is_recoverable(&self) -> bool;
}

/// Main package subsystem error type
///
/// Every fallible operation on the store, catalog, or marketplace surfaces
/// one of these variants. Nothing is silently swallowed at the subsystem
/// boundary; best-effort cleanup during removal logs instead of erroring.
#[derive(Debug, Error)]
pub enum PackageError {
    /// File extension is not an accepted package format
    #[error("Unsupported package file extension: {0:?}")]
    InvalidExtension(String),

    /// Package failed decoding, structural validation, or verification
    #[error("Invalid package: {0}")]
    InvalidPackage(String),

    /// Package requires a newer app version than the one running
    #[error("Incompatible version: requires app version {required}")]
    IncompatibleVersion { required: String },

    /// The same `(package_id, version)` pair is already installed
    #[error("Package already installed: {package_id} v{version}")]
    DuplicatePackage {
        package_id: String,
        version: String,
    },

    /// No installed package matched the given identifier
    #[error("Package not installed: {0}")]
    NotInstalled(String),

    /// Package index could not be read or written
    #[error("Index error: {0}")]
    Index(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Network errors
    #[error("Network error: {0}")]
    Network(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StrydeErrorExt for PackageError {
    fn user_hint(&self) -> &str {
        match self {
            Self::InvalidExtension(_) => "Only .widgetpack and .json packages can be installed",
            Self::InvalidPackage(_) => "The package is malformed or failed verification",
            Self::IncompatibleVersion { .. } => "Update the app to install this package",
            Self::DuplicatePackage { .. } => "This package version is already installed",
            Self::NotInstalled(_) => "The package is not installed",
            Self::Index(_) => "The package index is damaged. Reinstalling packages may help",
            Self::Config(_) => "Check your config.toml file for errors",
            Self::Network(_) => "Network operation failed. Check your connection",
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // The package itself is bad; retrying the same bytes cannot succeed
            Self::InvalidExtension(_) | Self::InvalidPackage(_) => false,

            // All other errors are potentially recoverable
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_package_is_not_recoverable() {
        let err = PackageError::InvalidPackage("checksum mismatch".to_string());
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("checksum mismatch"));
    }

    #[test]
    fn duplicate_package_names_both_halves_of_the_identity() {
        let err = PackageError::DuplicatePackage {
            package_id: "pack.a".to_string(),
            version: "1.0".to_string(),
        };
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "Package already installed: pack.a v1.0");
    }

    #[test]
    fn every_variant_has_a_hint() {
        let errors = [
            PackageError::InvalidExtension("txt".to_string()),
            PackageError::NotInstalled("pack.a".to_string()),
            PackageError::Network("timeout".to_string()),
        ];
        for err in errors {
            assert!(!err.user_hint().is_empty());
        }
    }
}
