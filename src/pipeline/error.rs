//! Error types for the reminder pipeline.
//!
//! Configuration errors name the missing entity and are not retried;
//! store errors propagate unmodified; retry policy belongs to the caller.

use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum ReminderError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Programmer error: `next()` called after the cursor ran out.
    #[error("Cursor exhausted: no remaining rows")]
    CursorExhausted,

    #[error("Page size must be at least 1")]
    InvalidPageSize,

    #[error("Reminder type not found: {0}")]
    ReminderTypeNotFound(Uuid),

    #[error("Patient not found: {0}")]
    PatientNotFound(Uuid),

    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    #[error("Document template not found: {0}")]
    TemplateNotFound(Uuid),

    #[error("Date arithmetic overflowed adding {amount} {units} to {base}")]
    DateOverflow {
        base: chrono::NaiveDate,
        amount: i32,
        units: crate::models::DateUnits,
    },
}
