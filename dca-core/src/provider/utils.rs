// =================================================================
// provider/utils.rs - Utility Functions
// =================================================================

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate};
use dca_common::{PricePoint, PriceSeries};
use rust_decimal::prelude::*;
use tracing::warn;

use super::{ProviderError, YahooChartResponse};

const MISSING_MARKERS: [&str; 5] = ["", "nan", "null", "none", "-"];

/// Collapse several close values reported for the same date into one.
///
/// The first value in source order wins, even when it is missing; later
/// values are never consulted.
pub fn collapse_close(values: &[Option<Decimal>]) -> Option<Decimal> {
    values.first().copied().flatten()
}

/// Whether a CSV header names a closing-price column.
///
/// Matches `Close` plus suffixed variants such as `Close.1` or `Close_MSTR`,
/// but not `Adj Close`.
pub fn is_close_header(header: &str) -> bool {
    let header = header.trim().to_lowercase();
    header == "close"
        || header.starts_with("close.")
        || header.starts_with("close_")
        || header.starts_with("close ")
}

/// Parse a price cell; missing markers become `None`
pub fn parse_price_cell(raw: &str) -> Result<Option<Decimal>, ProviderError> {
    let cell = raw.trim();
    if MISSING_MARKERS.contains(&cell.to_lowercase().as_str()) {
        return Ok(None);
    }

    Decimal::from_str(cell)
        .or_else(|_| Decimal::from_scientific(cell))
        .map(Some)
        .map_err(|e| ProviderError::ParseError(format!("Invalid price '{}': {}", cell, e)))
}

/// Parse a date cell, `YYYY-MM-DD` with an optional time suffix
pub fn parse_date_cell(raw: &str) -> Result<NaiveDate, ProviderError> {
    let cell = raw.trim();
    let day = cell.split(|c: char| c == 'T' || c == ' ').next().unwrap_or(cell);

    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| ProviderError::ParseError(format!("Invalid date '{}': {}", cell, e)))
}

/// Validate a ticker symbol such as `MSTR`, `BTC-USD` or `^GSPC`
pub fn validate_symbol(symbol: &str) -> Result<String, ProviderError> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(ProviderError::InvalidSymbol("Symbol cannot be empty".to_string()));
    }

    let symbol = symbol.to_uppercase();

    if !symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-._^=".contains(c))
    {
        return Err(ProviderError::InvalidSymbol(format!(
            "Symbol '{}' contains invalid characters",
            symbol
        )));
    }

    if symbol.len() > 20 {
        return Err(ProviderError::InvalidSymbol(format!(
            "Symbol '{}' has invalid length",
            symbol
        )));
    }

    Ok(symbol)
}

/// Convert a Yahoo chart response to a daily series.
///
/// Bars are dated in the exchange's local calendar. When several quote
/// blocks are present the first block's close is used (see
/// `collapse_close`); a repeated date keeps its first bar.
pub fn convert_yahoo_chart_to_series(
    symbol: &str,
    response: YahooChartResponse,
) -> Result<PriceSeries, ProviderError> {
    if let Some(error) = response.chart.error {
        if error.code.eq_ignore_ascii_case("not found") {
            return Err(ProviderError::DataUnavailable(symbol.to_string()));
        }
        return Err(ProviderError::ApiError(format!(
            "{}: {}",
            error.code,
            error.description.unwrap_or_default()
        )));
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ProviderError::DataUnavailable(symbol.to_string()))?;

    let offset = Duration::seconds(result.meta.as_ref().map_or(0, |m| m.gmtoffset));
    let blocks = &result.indicators.quote;

    let mut by_date: BTreeMap<NaiveDate, Option<Decimal>> = BTreeMap::new();
    for (i, ts) in result.timestamp.iter().enumerate() {
        let Some(utc) = DateTime::from_timestamp(*ts, 0) else {
            warn!("Skipping bar with invalid timestamp {} for {}", ts, symbol);
            continue;
        };
        let date = (utc + offset).date_naive();

        let closes: Vec<Option<Decimal>> = blocks
            .iter()
            .map(|b| b.close.get(i).copied().flatten().and_then(Decimal::from_f64))
            .collect();

        by_date.entry(date).or_insert_with(|| collapse_close(&closes));
    }

    if by_date.is_empty() {
        return Err(ProviderError::DataUnavailable(symbol.to_string()));
    }

    let points = by_date
        .into_iter()
        .map(|(date, close)| PricePoint::new(date, close))
        .collect();

    Ok(PriceSeries::new(points)?)
}
