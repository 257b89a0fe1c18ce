//! Error types for doorscan.

use sqlx::postgres::PgDatabaseError;
use thiserror::Error;

/// Result type alias using doorscan's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for doorscan operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A record with the same unique key already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Object storage upload or ACL change failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Postgres SQLSTATE of the underlying database error, if any.
    pub fn sqlstate(&self) -> Option<String> {
        match self {
            Error::Database(sqlx::Error::Database(db_err)) => {
                db_err.code().map(|code| code.into_owned())
            }
            _ => None,
        }
    }

    /// True for `23505 unique_violation`.
    pub fn is_unique_violation(&self) -> bool {
        self.sqlstate().as_deref() == Some("23505")
    }

    /// True for `23503 foreign_key_violation`.
    pub fn is_foreign_key_violation(&self) -> bool {
        self.sqlstate().as_deref() == Some("23503")
    }

    /// True when PostGIS rejected a WKT literal. Its parser raises `XX000`
    /// with a `... <-- parse error at position N within geometry` hint.
    pub fn is_invalid_geometry(&self) -> bool {
        let Error::Database(sqlx::Error::Database(db_err)) = self else {
            return false;
        };
        if db_err.code().as_deref() != Some("XX000") {
            return false;
        }
        let hint = db_err
            .try_downcast_ref::<PgDatabaseError>()
            .and_then(|pg| pg.hint());
        hint.is_some_and(|h| h.contains("parse error"))
            || GEOMETRY_PARSER_MESSAGES
                .iter()
                .any(|m| db_err.message().contains(m))
    }

    /// True when a `*_lonlat_check` constraint rejected a geometry outside
    /// longitude [-180, 180] / latitude [-90, 90].
    pub fn is_coordinate_out_of_range(&self) -> bool {
        match self {
            Error::Database(sqlx::Error::Database(db_err)) => {
                db_err.code().as_deref() == Some("23514")
                    && db_err
                        .constraint()
                        .is_some_and(|c| c.ends_with("_lonlat_check"))
            }
            _ => false,
        }
    }
}

/// Messages of the PostGIS WKT parser (`lwin_wkt`).
const GEOMETRY_PARSER_MESSAGES: &[&str] = &[
    "parse error",
    "geometry requires more points",
    "geometry must have an odd number of points",
    "geometry contains non-closed rings",
    "can not mix dimensionality in a geometry",
    "incontinuous compound curve",
    "triangle must have exactly 4 points",
    "geometry has too many points",
    "invalid WKB type",
];

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
