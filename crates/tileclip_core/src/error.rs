//! Error types for sheet loading, clip resolution and policy loading.
//!
//! Parse-time structural problems are fatal for the sheet being loaded
//! ([`SchemaError`]). Resolution failures are recoverable and leave any
//! playback state untouched ([`ResolveError`]). Imprecise authored data
//! (inverted ranges, GIDs past the sheet) is normalized with a warning and
//! never shows up here.

use std::path::PathBuf;

use thiserror::Error;

use crate::direction::Direction;

/// Malformed or missing sheet geometry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A required geometry field is absent.
    #[error("sheet '{sheet}' is missing required field '{field}'")]
    MissingGeometry { sheet: String, field: &'static str },

    /// A required geometry field is zero or negative.
    #[error("sheet '{sheet}' field '{field}' must be > 0 (got {value})")]
    NonPositiveGeometry {
        sheet: String,
        field: &'static str,
        value: i64,
    },
}

/// Failure to turn a play request into a concrete clip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Neither the requested clip nor any direction-insensitive fallback exists.
    #[error("unknown animation '{name}'{}", direction_suffix(.direction))]
    UnknownAnimation {
        name: String,
        direction: Option<Direction>,
    },
}

fn direction_suffix(direction: &Option<Direction>) -> String {
    match direction {
        Some(dir) => format!(" (direction {dir})"),
        None => String::new(),
    }
}

/// Failure to load a sheet file from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Failure to load or validate a playback policy file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read policy {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse policy {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("policy validation failed: {0}")]
    Invalid(String),
}
