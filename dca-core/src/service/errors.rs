use dca_common::DcaError;
use thiserror::Error;

use crate::provider::ProviderError;

/// Service layer error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] DcaError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Task error: {0}")]
    Task(String),
}

impl ServiceError {
    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            ServiceError::Provider(e) => e.is_transient(),
            ServiceError::Task(_) => true,
            ServiceError::Simulation(_) => false,
            ServiceError::Config(_) => false,
        }
    }

    /// The provider had no data for the requested symbol
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, ServiceError::Provider(ProviderError::DataUnavailable(_)))
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServiceError::Task(format!("Task failed: {}", err))
    }
}
