pub mod dca;
pub mod errors;
pub mod types;

// Re-export main interfaces
pub use dca::DcaService;
pub use errors::ServiceError;
pub use types::*;
