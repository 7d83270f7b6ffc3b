pub mod error;
pub mod plan;
pub mod types;

pub use error::DcaError;
pub use plan::{parse_date, AccumulationWindow, DcaPlan};
pub use types::*;
