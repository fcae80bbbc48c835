//! Error types for trip-calendar operations.
//!
//! Only contract violations and store failures become errors. Data-quality
//! problems inside the layout pipeline (bad dates, dangling references,
//! slot overflow) are recovered locally and never reach the caller.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid month: {0}")]
    InvalidMonth(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

pub type Result<T> = std::result::Result<T, CalendarError>;
