// =================================================================
// provider/csv_file.rs - CSV File Provider
// =================================================================

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use csv::{ReaderBuilder, StringRecord, Trim};
use dca_common::{PricePoint, PriceSeries};
use tracing::{debug, info};

use super::{
    errors::ProviderError,
    traits::PriceProvider,
    utils::{collapse_close, is_close_header, parse_date_cell, parse_price_cell, validate_symbol},
};

/// Reads `<data_dir>/<SYMBOL>.csv`, or a `.csv` path passed as the symbol.
pub struct CsvPriceProvider {
    data_dir: PathBuf,
}

impl CsvPriceProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn resolve_path(&self, symbol: &str) -> Result<PathBuf, ProviderError> {
        if symbol.to_lowercase().ends_with(".csv") {
            return Ok(PathBuf::from(symbol));
        }
        let symbol = validate_symbol(symbol)?;
        Ok(self.data_dir.join(format!("{}.csv", symbol)))
    }
}

#[async_trait]
impl PriceProvider for CsvPriceProvider {
    async fn get_price_series(&self, symbol: &str) -> Result<PriceSeries, ProviderError> {
        let path = self.resolve_path(symbol)?;
        debug!("Loading prices for {} from {}", symbol, path.display());

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ProviderError::DataUnavailable(symbol.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let series = parse_price_csv(symbol, &bytes)?;
        info!(
            "Loaded {} daily prices for {} from {}",
            series.len(),
            symbol,
            display_name(&path)
        );
        Ok(series)
    }

    fn name(&self) -> &'static str {
        "csv"
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse CSV bytes with a `Date` column and one or more `Close` columns.
///
/// Several `Close` columns are collapsed with `collapse_close`, so the
/// leftmost one wins. Header layouts written by yfinance (`Price` first
/// column followed by `Ticker` and `Date` rows) are accepted.
pub fn parse_price_csv(symbol: &str, bytes: &[u8]) -> Result<PriceSeries, ProviderError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let (date_col, multi_level) = date_column(&headers)?;

    let close_cols: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| is_close_header(h))
        .map(|(i, _)| i)
        .collect();
    if close_cols.is_empty() {
        return Err(ProviderError::ParseError(format!(
            "No Close column in price file for {}",
            symbol
        )));
    }

    let mut points = Vec::new();
    for record in reader.records() {
        let record = record?;
        let date_cell = record.get(date_col).unwrap_or_default();

        if multi_level && is_metadata_row(date_cell) {
            continue;
        }

        let date = parse_date_cell(date_cell)?;
        let closes = close_cols
            .iter()
            .map(|&i| parse_price_cell(record.get(i).unwrap_or_default()))
            .collect::<Result<Vec<_>, _>>()?;

        points.push(PricePoint::new(date, collapse_close(&closes)));
    }

    if points.is_empty() {
        return Err(ProviderError::DataUnavailable(symbol.to_string()));
    }

    Ok(PriceSeries::new(points)?)
}

fn date_column(headers: &StringRecord) -> Result<(usize, bool), ProviderError> {
    if let Some(i) = headers
        .iter()
        .position(|h| matches!(h.to_lowercase().as_str(), "date" | "datetime"))
    {
        return Ok((i, false));
    }

    match headers.get(0) {
        Some(first) if first.eq_ignore_ascii_case("price") => Ok((0, true)),
        _ => Err(ProviderError::ParseError("No Date column in price file".to_string())),
    }
}

fn is_metadata_row(first_cell: &str) -> bool {
    first_cell.eq_ignore_ascii_case("ticker") || first_cell.eq_ignore_ascii_case("date")
}
