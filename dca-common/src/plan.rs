// dca-common/src/plan.rs

use std::str::FromStr;

use chrono::{Months, NaiveDate};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::DcaError;
use crate::types::Timeframe;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Accumulation horizon in whole calendar months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccumulationWindow {
    months: u32,
}

impl AccumulationWindow {
    pub fn months(months: u32) -> Self {
        Self { months }
    }

    /// Fractional years are truncated to whole months (0.5 -> 6, 1.99 -> 23)
    pub fn from_years(years: Decimal) -> Result<Self, DcaError> {
        let months = years.checked_mul(Decimal::from(12)).ok_or_else(|| {
            DcaError::validation(format!("Accumulation window too large: {} years", years))
        })?;
        Self::from_months(months)
    }

    /// Fractional months are truncated. A positive window shorter than one
    /// month is rejected rather than read as unbounded.
    pub fn from_months(months: Decimal) -> Result<Self, DcaError> {
        if months.is_sign_negative() && !months.is_zero() {
            return Err(DcaError::validation(format!(
                "Accumulation window must not be negative, got {} months",
                months
            )));
        }

        let whole = months
            .trunc()
            .to_u32()
            .ok_or_else(|| DcaError::validation(format!("Accumulation window too large: {}", months)))?;

        if whole == 0 && months > Decimal::ZERO {
            return Err(DcaError::validation(format!(
                "Accumulation window of {} months is shorter than one month",
                months
            )));
        }

        Ok(Self { months: whole })
    }

    pub fn as_months(&self) -> u32 {
        self.months
    }

    pub fn is_zero(&self) -> bool {
        self.months == 0
    }

    /// Calendar end date, clamped to month end (Jan 31 + 1 month = Feb 28/29)
    pub fn end_date(&self, start: NaiveDate) -> Option<NaiveDate> {
        start.checked_add_months(Months::new(self.months))
    }
}

/// One simulation request. Only constructible through validating constructors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DcaPlan {
    investment_amount: Decimal,
    timeframe: Timeframe,
    start_date: NaiveDate,
    accumulation_window: Option<AccumulationWindow>,
}

impl DcaPlan {
    /// A zero-length window is treated as no window at all.
    pub fn new(
        investment_amount: Decimal,
        timeframe: Timeframe,
        start_date: NaiveDate,
        accumulation_window: Option<AccumulationWindow>,
    ) -> Result<Self, DcaError> {
        if investment_amount <= Decimal::ZERO {
            return Err(DcaError::validation(format!(
                "Investment amount must be positive, got {}",
                investment_amount
            )));
        }

        let accumulation_window = accumulation_window.filter(|w| !w.is_zero());
        if let Some(window) = accumulation_window {
            if window.end_date(start_date).is_none() {
                return Err(DcaError::validation(format!(
                    "Accumulation window of {} months overflows the calendar from {}",
                    window.as_months(),
                    start_date
                )));
            }
        }

        Ok(Self {
            investment_amount,
            timeframe,
            start_date,
            accumulation_window,
        })
    }

    /// Build a plan from raw text inputs. An empty `accumulate_years` means
    /// no window.
    pub fn parse(
        investment: &str,
        timeframe: &str,
        start_date: &str,
        accumulate_years: Option<&str>,
    ) -> Result<Self, DcaError> {
        let investment_amount = Decimal::from_str(investment.trim()).map_err(|e| {
            DcaError::validation(format!("Invalid investment amount '{}': {}", investment, e))
        })?;
        let timeframe = Timeframe::from_str(timeframe)?;
        let start_date = parse_date(start_date)?;

        let accumulation_window = match accumulate_years.map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let years = Decimal::from_str(raw).map_err(|e| {
                    DcaError::validation(format!("Invalid accumulation years '{}': {}", raw, e))
                })?;
                Some(AccumulationWindow::from_years(years)?)
            }
        };

        Self::new(investment_amount, timeframe, start_date, accumulation_window)
    }

    pub fn investment_amount(&self) -> Decimal {
        self.investment_amount
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn accumulation_window(&self) -> Option<AccumulationWindow> {
        self.accumulation_window
    }

    /// Last date (inclusive) a period may be keyed on
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.accumulation_window
            .and_then(|w| w.end_date(self.start_date))
    }
}

/// Parse a calendar date, `YYYY-MM-DD` or `YYYY/MM/DD`
pub fn parse_date(raw: &str) -> Result<NaiveDate, DcaError> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| DcaError::validation(format!("Invalid start date '{}'", raw)))
}
