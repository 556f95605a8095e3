//! Food Tracker operations
//!
//! Validated operations over the [`Database`](crate::db::Database) handle.
//! Transports (the HTTP layer, tests) call these and never touch SQL.

pub mod accounts;
pub mod dishes;
pub mod meals;
pub mod stats;
pub mod status;

use chrono::NaiveDate;
use thiserror::Error;

use crate::db::DbError;
use crate::models::DATE_FORMAT;

/// Errors surfaced by operations
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Request data is missing, malformed or out of range
    #[error("{0}")]
    Validation(String),

    /// A referenced record does not exist
    #[error("{0}")]
    NotFound(String),

    /// The record would collide with an existing one
    #[error("{0}")]
    Conflict(String),

    /// No valid session, or bad credentials
    #[error("{0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_date(value: &str) -> ServiceResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        ServiceError::Validation(format!("Invalid date {:?}: expected YYYY-MM-DD", value))
    })
}
