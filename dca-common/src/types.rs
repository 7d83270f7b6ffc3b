// dca-common/src/types.rs

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DcaError;

/// One daily (or periodic) observation. `close == None` marks missing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: Option<Decimal>,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: Option<Decimal>) -> Self {
        Self { date, close }
    }

    /// Price usable for a purchase: present and strictly positive
    pub fn tradable_price(&self) -> Option<Decimal> {
        self.close.filter(|p| *p > Decimal::ZERO)
    }
}

/// Date-indexed closing prices, strictly increasing by date.
///
/// Read-only once built, so one series can back any number of
/// simulations, including concurrent ones behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from points in any order.
    ///
    /// Points are sorted by date. Duplicate dates and negative prices are
    /// rejected.
    pub fn new(mut points: Vec<PricePoint>) -> Result<Self, DcaError> {
        points.sort_by_key(|p| p.date);

        for pair in points.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(DcaError::validation(format!(
                    "Duplicate price date {}",
                    pair[0].date
                )));
            }
        }

        if let Some(bad) = points
            .iter()
            .find(|p| p.close.is_some_and(|c| c < Decimal::ZERO))
        {
            return Err(DcaError::validation(format!(
                "Negative price on {}",
                bad.date
            )));
        }

        Ok(Self { points })
    }

    /// Build from points already strictly increasing by date with
    /// non-negative prices.
    pub fn from_sorted(points: Vec<PricePoint>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        Self { points }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &PricePoint> {
        self.points.iter()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Most recent present, strictly positive close
    pub fn latest_price(&self) -> Option<Decimal> {
        self.points.iter().rev().find_map(PricePoint::tradable_price)
    }

    /// Keep the points matching `keep`; ordering is preserved
    pub fn filtered<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&PricePoint) -> bool,
    {
        Self {
            points: self.points.iter().copied().filter(|p| keep(p)).collect(),
        }
    }
}

/// Purchase periodicity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Day,
    Week,
    Month,
    Year,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Day => "day",
            Timeframe::Week => "week",
            Timeframe::Month => "month",
            Timeframe::Year => "year",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = DcaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(Timeframe::Day),
            "week" => Ok(Timeframe::Week),
            "month" => Ok(Timeframe::Month),
            "year" => Ok(Timeframe::Year),
            other => Err(DcaError::validation(format!(
                "Unknown timeframe '{}', expected day, week, month or year",
                other
            ))),
        }
    }
}

/// One point of a return trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    /// Cumulative portfolio value at this point's price
    pub value: Decimal,
    pub price: Decimal,
    pub cumulative_units: Decimal,
}

/// Aggregate statistics over one trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub purchases: usize,
    pub total_invested: Decimal,
    pub final_value: Decimal,
    pub percent_change: Decimal,
    pub total_units: Decimal,
    pub average_cost: Option<Decimal>,
}

impl SimulationSummary {
    pub fn empty() -> Self {
        Self {
            purchases: 0,
            total_invested: Decimal::ZERO,
            final_value: Decimal::ZERO,
            percent_change: Decimal::ZERO,
            total_units: Decimal::ZERO,
            average_cost: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_series_is_sorted_on_construction() {
        let series = PriceSeries::new(vec![
            PricePoint::new(day(3), Some(dec!(3))),
            PricePoint::new(day(1), Some(dec!(1))),
            PricePoint::new(day(2), None),
        ])
        .unwrap();

        let dates: Vec<_> = series.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(3)]);
        assert_eq!(series.first_date(), Some(day(1)));
        assert_eq!(series.last_date(), Some(day(3)));
    }

    #[test]
    fn test_series_rejects_duplicates_and_negative_prices() {
        let dup = PriceSeries::new(vec![
            PricePoint::new(day(1), Some(dec!(1))),
            PricePoint::new(day(1), Some(dec!(2))),
        ]);
        assert!(matches!(dup, Err(DcaError::Validation(_))));

        let negative = PriceSeries::new(vec![PricePoint::new(day(1), Some(dec!(-1)))]);
        assert!(matches!(negative, Err(DcaError::Validation(_))));
    }

    #[test]
    fn test_latest_price_skips_missing_and_zero() {
        let series = PriceSeries::new(vec![
            PricePoint::new(day(1), Some(dec!(42))),
            PricePoint::new(day(2), Some(dec!(0))),
            PricePoint::new(day(3), None),
        ])
        .unwrap();

        assert_eq!(series.latest_price(), Some(dec!(42)));
        assert_eq!(PriceSeries::empty().latest_price(), None);
    }

    #[test]
    fn test_timeframe_parsing() {
        assert_eq!("Week".parse::<Timeframe>().unwrap(), Timeframe::Week);
        assert_eq!(" day ".parse::<Timeframe>().unwrap(), Timeframe::Day);
        assert!("fortnight".parse::<Timeframe>().is_err());
        assert_eq!(Timeframe::Month.to_string(), "month");
    }

    #[test]
    fn test_return_point_serializes_date_as_calendar_day() {
        let point = ReturnPoint {
            date: day(7),
            value: dec!(20),
            price: dec!(100),
            cumulative_units: dec!(0.2),
        };
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["date"], "2024-01-07");
    }
}
