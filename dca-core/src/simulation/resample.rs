// dca-core/src/simulation/resample.rs

use chrono::{Datelike, Days, Months, NaiveDate};
use dca_common::{DcaPlan, PricePoint, PriceSeries, Timeframe};
use tracing::debug;

/// Date a period is keyed on.
///
/// Weeks run Monday to Sunday and are keyed on the Sunday; months and years
/// on their last calendar day. Days key on themselves.
pub fn period_end(date: NaiveDate, timeframe: Timeframe) -> NaiveDate {
    match timeframe {
        Timeframe::Day => date,
        Timeframe::Week => {
            let to_sunday = 6 - u64::from(date.weekday().num_days_from_monday());
            date.checked_add_days(Days::new(to_sunday))
                .unwrap_or(NaiveDate::MAX)
        }
        Timeframe::Month => date
            .with_day(1)
            .and_then(|first| first.checked_add_months(Months::new(1)))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX),
        Timeframe::Year => NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(NaiveDate::MAX),
    }
}

/// Reduce a series to one point per period, keyed by `period_end`.
///
/// The representative price is the first present price observed in the
/// period. A period whose observations are all missing keeps a missing
/// price. Periods without any observation produce no point.
pub fn resample(series: &PriceSeries, timeframe: Timeframe) -> PriceSeries {
    if timeframe == Timeframe::Day {
        return series.clone();
    }

    let mut periods: Vec<PricePoint> = Vec::new();
    for point in series.iter() {
        let key = period_end(point.date, timeframe);
        match periods.last_mut() {
            Some(current) if current.date == key => {
                if current.close.is_none() {
                    current.close = point.close;
                }
            }
            _ => periods.push(PricePoint::new(key, point.close)),
        }
    }

    debug!(
        "Resampled {} observations into {} {} periods",
        series.len(),
        periods.len(),
        timeframe
    );

    PriceSeries::from_sorted(periods)
}

/// Keep points keyed on or after `start` and, when given, on or before `end`
pub fn window(series: &PriceSeries, start: NaiveDate, end: Option<NaiveDate>) -> PriceSeries {
    series.filtered(|p| p.date >= start && end.map_or(true, |end| p.date <= end))
}

/// Resample to the plan's timeframe, then restrict to its date range
pub fn resample_and_window(series: &PriceSeries, plan: &DcaPlan) -> PriceSeries {
    let periodic = resample(series, plan.timeframe());
    window(&periodic, plan.start_date(), plan.end_date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dca_common::AccumulationWindow;
    use rust_decimal::Decimal;
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

    #[test]
    fn test_period_end_week_is_sunday() {
        // 2024-01-01 is a Monday
        assert_eq!(period_end(date(2024, 1, 1), Timeframe::Week), date(2024, 1, 7));
        assert_eq!(period_end(date(2024, 1, 5), Timeframe::Week), date(2024, 1, 7));
        assert_eq!(period_end(date(2024, 1, 7), Timeframe::Week), date(2024, 1, 7));
        assert_eq!(period_end(date(2024, 12, 30), Timeframe::Week), date(2025, 1, 5));
    }

    #[test]
    fn test_period_end_month_and_year() {
        assert_eq!(period_end(date(2024, 2, 10), Timeframe::Month), date(2024, 2, 29));
        assert_eq!(period_end(date(2023, 2, 10), Timeframe::Month), date(2023, 2, 28));
        assert_eq!(period_end(date(2023, 12, 1), Timeframe::Month), date(2023, 12, 31));
        assert_eq!(period_end(date(2023, 6, 15), Timeframe::Year), date(2023, 12, 31));
        assert_eq!(period_end(date(2023, 6, 15), Timeframe::Day), date(2023, 6, 15));
    }

    #[test]
    fn test_day_timeframe_is_identity() {
        let series = daily(date(2024, 1, 1), &[Some(dec!(1)), None, Some(dec!(3))]);
        assert_eq!(resample(&series, Timeframe::Day), series);
    }

    #[test]
    fn test_weekly_takes_first_price_of_each_week() {
        // Two business weeks, Monday 2024-01-01 through Friday 2024-01-12
        let prices: Vec<_> = (1..=12).map(|i| Some(Decimal::from(i))).collect();
        let series = daily(date(2024, 1, 1), &prices);

        let weekly = resample(&series, Timeframe::Week);

        assert_eq!(
            weekly.points(),
            &[
                PricePoint::new(date(2024, 1, 7), Some(dec!(1))),
                PricePoint::new(date(2024, 1, 14), Some(dec!(8))),
            ]
        );
    }

    #[test]
    fn test_missing_first_observation_uses_next_present_price() {
        let series = daily(date(2024, 1, 1), &[None, Some(dec!(5)), Some(dec!(6))]);
        let weekly = resample(&series, Timeframe::Week);

        assert_eq!(weekly.points(), &[PricePoint::new(date(2024, 1, 7), Some(dec!(5)))]);
    }

    #[test]
    fn test_all_missing_period_keeps_missing_price() {
        let series = daily(date(2024, 1, 30), &[None, None, Some(dec!(9))]);
        let monthly = resample(&series, Timeframe::Month);

        assert_eq!(
            monthly.points(),
            &[
                PricePoint::new(date(2024, 1, 31), None),
                PricePoint::new(date(2024, 2, 29), Some(dec!(9))),
            ]
        );
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let series = daily(date(2024, 1, 1), &vec![Some(dec!(1)); 10]);

        let windowed = window(&series, date(2024, 1, 3), Some(date(2024, 1, 5)));
        let dates: Vec<_> = windowed.iter().map(|p| p.date).collect();

        assert_eq!(dates, vec![date(2024, 1, 3), date(2024, 1, 4), date(2024, 1, 5)]);
    }

    #[test]
    fn test_window_start_outside_data() {
        let series = daily(date(2024, 1, 1), &vec![Some(dec!(1)); 5]);

        assert_eq!(window(&series, date(2000, 1, 1), None), series);
        assert!(window(&series, date(2030, 1, 1), None).is_empty());
    }

    #[test]
    fn test_window_is_idempotent() {
        let series = daily(date(2024, 1, 1), &vec![Some(dec!(2)); 40]);
        let start = date(2024, 1, 10);
        let end = Some(date(2024, 1, 25));

        let once = window(&series, start, end);
        let twice = window(&once, start, end);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_resample_and_window_uses_period_keys() {
        // Week of Jan 1 is keyed on Jan 7, which is on/after the start date
        let series = daily(date(2024, 1, 1), &vec![Some(dec!(1)); 21]);
        let plan = DcaPlan::new(
            dec!(10),
            Timeframe::Week,
            date(2024, 1, 3),
            Some(AccumulationWindow::months(0)),
        )
        .unwrap();

        let windowed = resample_and_window(&series, &plan);
        let dates: Vec<_> = windowed.iter().map(|p| p.date).collect();

        assert_eq!(dates, vec![date(2024, 1, 7), date(2024, 1, 14), date(2024, 1, 21)]);
    }

    #[test]
    fn test_half_year_window_truncates_to_six_months() {
        let series = daily(date(2020, 1, 1), &vec![Some(dec!(1)); 400]);
        let plan = DcaPlan::new(
            dec!(10),
            Timeframe::Month,
            date(2020, 1, 1),
            Some(AccumulationWindow::from_years(dec!(0.5)).unwrap()),
        )
        .unwrap();

        let windowed = resample_and_window(&series, &plan);

        // Jan..Jun month ends fall on or before 2020-07-01
        assert_eq!(windowed.len(), 6);
        assert_eq!(windowed.last_date(), Some(date(2020, 6, 30)));
    }
}
