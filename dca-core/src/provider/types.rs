// =================================================================
// provider/types.rs - Data Structures
// =================================================================

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

/// Parameters for querying historical daily prices
#[derive(Debug, Clone)]
pub struct HistoricalPriceParams {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl HistoricalPriceParams {
    pub fn new(symbol: String, start: NaiveDate) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            start,
            end: None,
        }
    }

    pub fn with_end(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    /// Unix seconds for the start of the range
    pub fn period1(&self) -> i64 {
        Self::unix_seconds(self.start)
    }

    /// Unix seconds for the end of the range, `now` when unbounded
    pub fn period2(&self) -> i64 {
        match self.end {
            Some(end) => Self::unix_seconds(end) + 86_400,
            None => Utc::now().timestamp(),
        }
    }

    fn unix_seconds(date: NaiveDate) -> i64 {
        DateTime::<Utc>::from_naive_utc_and_offset(date.and_time(NaiveTime::MIN), Utc).timestamp()
    }
}

/// Yahoo chart API envelope
#[derive(Debug, Deserialize)]
pub struct YahooChartResponse {
    pub chart: YahooChart,
}

#[derive(Debug, Deserialize)]
pub struct YahooChart {
    pub result: Option<Vec<YahooChartResult>>,
    pub error: Option<YahooChartError>,
}

#[derive(Debug, Deserialize)]
pub struct YahooChartError {
    pub code: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct YahooChartResult {
    pub meta: Option<YahooChartMeta>,

    /// Bar open times, unix seconds
    #[serde(default)]
    pub timestamp: Vec<i64>,

    pub indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
pub struct YahooChartMeta {
    pub symbol: Option<String>,

    /// Exchange offset from UTC in seconds
    #[serde(default)]
    pub gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
pub struct YahooIndicators {
    /// Usually a single block; extra blocks are ignored after the first
    #[serde(default)]
    pub quote: Vec<YahooQuoteBlock>,
}

#[derive(Debug, Deserialize)]
pub struct YahooQuoteBlock {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}
