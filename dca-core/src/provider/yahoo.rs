// =================================================================
// provider/yahoo.rs - Yahoo Finance Chart API Provider
// =================================================================

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use dca_common::PriceSeries;
use reqwest::StatusCode;
use tracing::{debug, info};

use super::{
    errors::ProviderError,
    traits::PriceProvider,
    types::{HistoricalPriceParams, YahooChartResponse},
    utils::{convert_yahoo_chart_to_series, validate_symbol},
};

// Constants
pub const YAHOO_API_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) dca-simulator";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Daily closes from the Yahoo chart endpoint
pub struct YahooPriceProvider {
    api_url: String,
    history_start: NaiveDate,
    client: reqwest::Client,
}

impl YahooPriceProvider {
    /// Create a provider fetching history from `history_start` onwards
    pub fn new(
        api_url: impl Into<String>,
        history_start: NaiveDate,
        timeout: Option<Duration>,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;

        Ok(Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            history_start,
            client,
        })
    }

    fn chart_url(&self, params: &HistoricalPriceParams) -> String {
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=history",
            self.api_url,
            params.symbol,
            params.period1(),
            params.period2()
        )
    }

    /// Fetch daily closes using the chart REST API
    async fn fetch_chart(&self, params: &HistoricalPriceParams) -> Result<PriceSeries, ProviderError> {
        let url = self.chart_url(params);
        debug!("Fetching daily prices from: {}", url);

        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(ProviderError::DataUnavailable(params.symbol.clone()));
            }
            status if !status.is_success() => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(ProviderError::ApiError(format!(
                    "HTTP {}: {}",
                    status, error_text
                )));
            }
            _ => {}
        }

        let body = response.text().await?;
        let chart: YahooChartResponse = serde_json::from_str(&body)?;
        let series = convert_yahoo_chart_to_series(&params.symbol, chart)?;

        info!(
            "Successfully fetched {} daily prices for {}",
            series.len(),
            params.symbol
        );
        Ok(series)
    }
}

#[async_trait]
impl PriceProvider for YahooPriceProvider {
    async fn get_price_series(&self, symbol: &str) -> Result<PriceSeries, ProviderError> {
        let symbol = validate_symbol(symbol)?;
        let params = HistoricalPriceParams::new(symbol, self.history_start);
        self.fetch_chart(&params).await
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}
