// provider/traits.rs

use super::ProviderError;
use async_trait::async_trait;
use dca_common::PriceSeries;

/// Source of daily closing prices that all provider implementations follow
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Full daily closing-price history for `symbol`.
    ///
    /// Fails with `ProviderError::DataUnavailable` when the symbol is
    /// unknown or has no data.
    async fn get_price_series(&self, symbol: &str) -> Result<PriceSeries, ProviderError>;

    /// Short identifier used in logs
    fn name(&self) -> &'static str;
}
