// dca-core/src/simulation/engine.rs

use dca_common::{DcaError, DcaPlan, PriceSeries, ReturnPoint};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::resample::resample_and_window;

/// Buys a fixed amount at every period of an already resampled series.
pub struct AccumulationEngine {
    investment_amount: Decimal,
    strict: bool,
}

impl AccumulationEngine {
    pub fn new(investment_amount: Decimal) -> Result<Self, DcaError> {
        if investment_amount <= Decimal::ZERO {
            return Err(DcaError::validation(format!(
                "Investment amount must be positive, got {}",
                investment_amount
            )));
        }

        Ok(Self {
            investment_amount,
            strict: false,
        })
    }

    /// In strict mode a period with a missing or non-positive price fails
    /// the run instead of being skipped.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Single chronological pass; the only carried state is the unit count.
    pub fn run(&self, series: &PriceSeries) -> Result<Vec<ReturnPoint>, DcaError> {
        let mut trajectory = Vec::with_capacity(series.len());
        let mut cumulative_units = Decimal::ZERO;
        let mut skipped = 0usize;

        for point in series.iter() {
            let Some(price) = point.tradable_price() else {
                if self.strict {
                    return Err(DcaError::DataQuality { date: point.date });
                }
                debug!("Skipping period {}: no usable price", point.date);
                skipped += 1;
                continue;
            };

            let overflow = || {
                DcaError::validation(format!("Arithmetic overflow at {} (price {})", point.date, price))
            };
            cumulative_units = self
                .investment_amount
                .checked_div(price)
                .and_then(|units| cumulative_units.checked_add(units))
                .ok_or_else(overflow)?;
            let value = cumulative_units.checked_mul(price).ok_or_else(overflow)?;

            trajectory.push(ReturnPoint {
                date: point.date,
                value,
                price,
                cumulative_units,
            });
        }

        if skipped > 0 {
            warn!(
                "Skipped {} of {} periods with missing or invalid prices",
                skipped,
                series.len()
            );
        }

        Ok(trajectory)
    }
}

/// Resample and window `series` per `plan`, then accumulate.
pub fn simulate(plan: &DcaPlan, series: &PriceSeries) -> Result<Vec<ReturnPoint>, DcaError> {
    simulate_with(plan, series, false)
}

pub fn simulate_with(
    plan: &DcaPlan,
    series: &PriceSeries,
    strict: bool,
) -> Result<Vec<ReturnPoint>, DcaError> {
    let engine = AccumulationEngine::new(plan.investment_amount())?.with_strict(strict);
    let periodic = resample_and_window(series, plan);

    info!(
        "Simulating {} {} purchases of {} from {}",
        periodic.len(),
        plan.timeframe(),
        plan.investment_amount(),
        plan.start_date()
    );

    engine.run(&periodic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Days, NaiveDate};
    use dca_common::{PricePoint, Timeframe};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily(start: NaiveDate, prices: &[Option<Decimal>]) -> PriceSeries {
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, p)| PricePoint::new(start + Days::new(i as u64), *p))
            .collect();
        PriceSeries::new(points).unwrap()
    }

    fn business_days(start: NaiveDate, count: usize, price: Decimal) -> PriceSeries {
        let points = start
            .iter_days()
            .filter(|d| d.weekday().number_from_monday() <= 5)
            .take(count)
            .map(|d| PricePoint::new(d, Some(price)))
            .collect();
        PriceSeries::new(points).unwrap()
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        assert!(matches!(
            AccumulationEngine::new(dec!(0)),
            Err(DcaError::Validation(_))
        ));
        assert!(matches!(
            AccumulationEngine::new(dec!(-5)),
            Err(DcaError::Validation(_))
        ));
    }

    #[test]
    fn test_constant_price_returns_invested_amount() {
        let series = daily(date(2024, 1, 1), &vec![Some(dec!(50)); 8]);
        let trajectory = AccumulationEngine::new(dec!(25)).unwrap().run(&series).unwrap();

        let last = trajectory.last().unwrap();
        assert_eq!(trajectory.len(), 8);
        assert_eq!(last.cumulative_units, dec!(4)); // 8 * 25 / 50
        assert_eq!(last.value, dec!(200)); // 8 * 25
    }

    #[test]
    fn test_weekly_scenario_two_business_weeks() {
        let series = business_days(date(2024, 1, 1), 10, dec!(100));
        let plan = DcaPlan::new(dec!(10), Timeframe::Week, date(2024, 1, 1), None).unwrap();

        let trajectory = simulate(&plan, &series).unwrap();

        let values: Vec<_> = trajectory.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![dec!(10), dec!(20)]);
        assert_eq!(trajectory[0].date, date(2024, 1, 7));
        assert_eq!(trajectory[1].date, date(2024, 1, 14));
    }

    #[test]
    fn test_missing_price_is_skipped() {
        let series = daily(
            date(2024, 1, 1),
            &[Some(dec!(10)), None, Some(dec!(20)), Some(dec!(0))],
        );
        let trajectory = AccumulationEngine::new(dec!(10)).unwrap().run(&series).unwrap();

        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory[0].date, date(2024, 1, 1));
        assert_eq!(trajectory[1].date, date(2024, 1, 3));
        // 1 unit at 10, then 0.5 units at 20
        assert_eq!(trajectory[1].cumulative_units, dec!(1.5));
        assert_eq!(trajectory[1].value, dec!(30));
    }

    #[test]
    fn test_strict_mode_reports_skipped_period() {
        let series = daily(date(2024, 1, 1), &[Some(dec!(10)), None, Some(dec!(20))]);
        let result = AccumulationEngine::new(dec!(10))
            .unwrap()
            .with_strict(true)
            .run(&series);

        assert_eq!(result, Err(DcaError::DataQuality { date: date(2024, 1, 2) }));
    }

    #[test]
    fn test_empty_series_yields_empty_trajectory() {
        let trajectory = AccumulationEngine::new(dec!(10))
            .unwrap()
            .run(&PriceSeries::empty())
            .unwrap();
        assert!(trajectory.is_empty());
    }

    #[test]
    fn test_start_after_data_is_empty_not_error() {
        let series = daily(date(2024, 1, 1), &vec![Some(dec!(10)); 5]);
        let plan = DcaPlan::new(dec!(10), Timeframe::Day, date(2025, 1, 1), None).unwrap();

        assert!(simulate(&plan, &series).unwrap().is_empty());
    }

    #[test]
    fn test_units_and_dates_are_monotonic() {
        let prices: Vec<_> = [30, 12, 45, 7, 19, 60, 3, 28]
            .iter()
            .map(|p| Some(Decimal::from(*p)))
            .collect();
        let series = daily(date(2024, 3, 1), &prices);

        let trajectory = AccumulationEngine::new(dec!(100)).unwrap().run(&series).unwrap();

        for pair in trajectory.windows(2) {
            assert!(pair[0].date < pair[1].date);
            assert!(pair[0].cumulative_units <= pair[1].cumulative_units);
        }
    }
}
