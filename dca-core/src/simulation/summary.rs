// dca-core/src/simulation/summary.rs

use dca_common::{DcaError, ReturnPoint, SimulationSummary};
use rust_decimal::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

/// Sub-units per whole unit used when none is configured (satoshis per bitcoin)
pub const DEFAULT_SUBUNIT_SCALE: u64 = 100_000_000;

/// Aggregate one trajectory. Never recomputes the trajectory itself.
///
/// Totals that do not fit a `Decimal` are a `Validation` error.
pub fn summarize(
    trajectory: &[ReturnPoint],
    investment_amount: Decimal,
) -> Result<SimulationSummary, DcaError> {
    let Some(last) = trajectory.last() else {
        return Ok(SimulationSummary::empty());
    };

    let too_large = || {
        DcaError::validation(format!(
            "Summary of {} purchases of {} overflows",
            trajectory.len(),
            investment_amount
        ))
    };

    let purchases = trajectory.len();
    let total_invested = investment_amount
        .checked_mul(Decimal::from(purchases))
        .ok_or_else(too_large)?;
    let final_value = last.value;
    let total_units = last.cumulative_units;

    let percent_change = if total_invested.is_zero() {
        Decimal::ZERO
    } else {
        final_value
            .checked_div(total_invested)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(too_large)?
    };

    let average_cost = if total_units > Decimal::ZERO {
        total_invested.checked_div(total_units)
    } else {
        None
    };

    Ok(SimulationSummary {
        purchases,
        total_invested,
        final_value,
        percent_change,
        total_units,
        average_cost,
    })
}

/// A value expressed in units of another instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnitEquivalence {
    pub whole_units: u64,
    pub sub_units: u64,
}

/// Floor `value / other_price` into whole units and into sub-units at
/// `subunit_scale` per unit. Both are floors, never rounded.
pub fn unit_equivalence(
    value: Decimal,
    other_price: Decimal,
    subunit_scale: u64,
) -> Result<UnitEquivalence, DcaError> {
    if other_price <= Decimal::ZERO {
        return Err(DcaError::validation(format!(
            "Reference price must be positive, got {}",
            other_price
        )));
    }
    if subunit_scale == 0 {
        return Err(DcaError::validation("Subunit scale must be positive"));
    }
    if value < Decimal::ZERO {
        return Err(DcaError::validation(format!(
            "Value must not be negative, got {}",
            value
        )));
    }

    let too_large = || DcaError::validation(format!("Unit equivalence of {} overflows", value));

    let scale = Decimal::from(subunit_scale);
    let units = value.checked_div(other_price).ok_or_else(too_large)?;
    let whole_units = units.floor().to_u64().ok_or_else(too_large)?;

    // Scale before dividing so an exact quotient is not rounded below itself
    let sub_units = match value.checked_mul(scale) {
        Some(scaled) => scaled.checked_div(other_price),
        None => units.checked_mul(scale),
    }
    .and_then(|s| s.floor().to_u64())
    .ok_or_else(too_large)?;

    Ok(UnitEquivalence {
        whole_units,
        sub_units,
    })
}

/// One instrument's simulation output handed to the comparator
#[derive(Debug, Clone)]
pub struct InstrumentRun {
    pub symbol: String,
    pub trajectory: Vec<ReturnPoint>,
    /// Latest known price, used to express other instruments in this one
    pub current_price: Option<Decimal>,
}

/// Final value of one instrument expressed in another
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Equivalent {
    pub symbol: String,
    pub price: Decimal,
    #[serde(flatten)]
    pub units: UnitEquivalence,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstrumentReport {
    pub symbol: String,
    pub current_price: Option<Decimal>,
    pub summary: SimulationSummary,
    pub equivalents: Vec<Equivalent>,
    pub trajectory: Vec<ReturnPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub investment_amount: Decimal,
    pub subunit_scale: u64,
    pub instruments: Vec<InstrumentReport>,
}

impl Comparison {
    pub fn get(&self, symbol: &str) -> Option<&InstrumentReport> {
        self.instruments.iter().find(|r| r.symbol == symbol)
    }
}

/// Summarises several instruments run with the same plan and cross-expresses
/// their final values.
pub struct Comparator {
    investment_amount: Decimal,
    subunit_scale: u64,
    runs: Vec<InstrumentRun>,
}

impl Comparator {
    pub fn new(investment_amount: Decimal, subunit_scale: u64) -> Result<Self, DcaError> {
        if investment_amount <= Decimal::ZERO {
            return Err(DcaError::validation(format!(
                "Investment amount must be positive, got {}",
                investment_amount
            )));
        }
        if subunit_scale == 0 {
            return Err(DcaError::validation("Subunit scale must be positive"));
        }

        Ok(Self {
            investment_amount,
            subunit_scale,
            runs: Vec::new(),
        })
    }

    pub fn add(mut self, run: InstrumentRun) -> Self {
        self.runs.push(run);
        self
    }

    pub fn compare(self) -> Result<Comparison, DcaError> {
        let prices: Vec<(String, Decimal)> = self
            .runs
            .iter()
            .filter_map(|r| r.current_price.map(|p| (r.symbol.clone(), p)))
            .collect();

        let mut instruments = Vec::with_capacity(self.runs.len());
        for run in self.runs {
            let summary = summarize(&run.trajectory, self.investment_amount)?;

            let mut equivalents = Vec::new();
            for (symbol, price) in prices.iter().filter(|(s, _)| *s != run.symbol) {
                match unit_equivalence(summary.final_value, *price, self.subunit_scale) {
                    Ok(units) => equivalents.push(Equivalent {
                        symbol: symbol.clone(),
                        price: *price,
                        units,
                    }),
                    Err(e) => warn!("Dropping {} equivalent of {}: {}", symbol, run.symbol, e),
                }
            }

            debug!(
                "{}: {} purchases, final value {}, {} cross equivalents",
                run.symbol,
                summary.purchases,
                summary.final_value,
                equivalents.len()
            );

            instruments.push(InstrumentReport {
                symbol: run.symbol,
                current_price: run.current_price,
                summary,
                equivalents,
                trajectory: run.trajectory,
            });
        }

        Ok(Comparison {
            investment_amount: self.investment_amount,
            subunit_scale: self.subunit_scale,
            instruments,
        })
    }
}
