// dca-common/src/error.rs

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by the calculation core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DcaError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing or invalid price for period ending {date}")]
    DataQuality { date: NaiveDate },
}

impl DcaError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DcaError::Validation(msg.into())
    }
}
