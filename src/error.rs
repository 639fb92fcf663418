//! Error taxonomy shared by the inference engine, the renderer and the
//! file/folder adapters.
//!
//! Every variant carries a stable machine-readable code plus enough metadata
//! to reconstruct what was being attempted without re-running the call.

use serde_json::{Map, Value};
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Stable error codes, suitable for programmatic handling and log grepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    FileNotFound,
    InvalidConfiguration,
    InvalidTableName,
    InvalidJsonStructure,
    DatabaseConnectionFailed,
    NestedStructureLimit,
    Unknown,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::FileNotFound => "FILE_001",
            ErrorCode::InvalidConfiguration => "CFG_001",
            ErrorCode::InvalidTableName => "TBL_001",
            ErrorCode::InvalidJsonStructure => "JSN_001",
            ErrorCode::DatabaseConnectionFailed => "DB_001",
            ErrorCode::NestedStructureLimit => "SQL_001",
            ErrorCode::Unknown => "UNK_001",
        }
    }
}

/// Domain error for the schema compiler.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid table name provided. Table name: '{table_name}'")]
    InvalidTableName { table_name: String },

    #[error("Invalid configuration provided. The key '{config_key}' is invalid or missing.")]
    InvalidConfiguration { config_key: String },

    #[error("File not found at specified path. Path: '{}'", .path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Invalid JSON structure detected. Path: '{path}'")]
    InvalidJsonStructure {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "Nested structure exceeds maximum depth. Actual depth: {current_depth}, allowed maximum: {max_depth}"
    )]
    DepthExceeded { max_depth: i32, current_depth: i32 },

    /// Reserved for the remote table-creation path.
    #[error("Failed to connect to database. Host: '{host}', port: {port}, database: '{database}'")]
    DatabaseConnectionFailed {
        host: String,
        port: u16,
        database: String,
    },

    #[error("An unknown error occurred")]
    Unknown {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
        /// Input parameters of the failed call.
        metadata: Map<String, Value>,
    },
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::InvalidTableName { .. } => ErrorCode::InvalidTableName,
            Error::InvalidConfiguration { .. } => ErrorCode::InvalidConfiguration,
            Error::FileNotFound { .. } => ErrorCode::FileNotFound,
            Error::InvalidJsonStructure { .. } => ErrorCode::InvalidJsonStructure,
            Error::DepthExceeded { .. } => ErrorCode::NestedStructureLimit,
            Error::DatabaseConnectionFailed { .. } => ErrorCode::DatabaseConnectionFailed,
            Error::Unknown { .. } => ErrorCode::Unknown,
        }
    }

    /// Structured diagnostic context: the offending values of the failed call.
    pub fn metadata(&self) -> Map<String, Value> {
        let mut meta = Map::new();
        match self {
            Error::InvalidTableName { table_name } => {
                meta.insert("table_name".into(), Value::String(table_name.clone()));
            }
            Error::InvalidConfiguration { config_key } => {
                meta.insert("config_key".into(), Value::String(config_key.clone()));
            }
            Error::FileNotFound { path, source } => {
                meta.insert(
                    "path".into(),
                    Value::String(path.display().to_string()),
                );
                if let Some(err) = source {
                    meta.insert("reason".into(), Value::String(err.to_string()));
                }
            }
            Error::InvalidJsonStructure { path, source } => {
                meta.insert("path".into(), Value::String(path.clone()));
                meta.insert("reason".into(), Value::String(source.to_string()));
            }
            Error::DepthExceeded {
                max_depth,
                current_depth,
            } => {
                meta.insert("max_depth".into(), Value::from(*max_depth));
                meta.insert("current_depth".into(), Value::from(*current_depth));
            }
            Error::DatabaseConnectionFailed {
                host,
                port,
                database,
            } => {
                meta.insert("host".into(), Value::String(host.clone()));
                meta.insert("port".into(), Value::from(*port));
                meta.insert("database".into(), Value::String(database.clone()));
            }
            Error::Unknown { metadata, .. } => {
                meta = metadata.clone();
            }
        }
        meta
    }

    pub fn invalid_table_name(table_name: impl Into<String>) -> Self {
        Error::InvalidTableName {
            table_name: table_name.into(),
        }
    }

    pub fn invalid_configuration(config_key: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            config_key: config_key.into(),
        }
    }

    pub fn file_not_found(path: impl Into<PathBuf>, source: Option<std::io::Error>) -> Self {
        Error::FileNotFound {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_json(path: impl Into<String>, source: serde_json::Error) -> Self {
        Error::InvalidJsonStructure {
            path: path.into(),
            source,
        }
    }

    pub fn depth_exceeded(max_depth: i32, current_depth: i32) -> Self {
        Error::DepthExceeded {
            max_depth,
            current_depth,
        }
    }
}
