// provider/mod.rs
pub mod csv_file;
pub mod errors;
pub mod traits;
pub mod types;
pub mod utils;
pub mod yahoo;

// Re-export main interfaces for easy access
pub use csv_file::CsvPriceProvider;
pub use errors::ProviderError;
pub use traits::PriceProvider;
pub use types::*;
pub use yahoo::{YahooPriceProvider, YAHOO_API_URL};
