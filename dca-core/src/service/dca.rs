use std::sync::Arc;

use dca_common::{DcaPlan, PriceSeries};
use tokio::task::{spawn, spawn_blocking};
use tracing::{error, info};

use super::{ServiceError, SimulationReport};
use crate::provider::PriceProvider;
use crate::simulation::{simulate_with, Comparator, InstrumentRun, DEFAULT_SUBUNIT_SCALE};

/// Runs one plan against several symbols from a shared price provider
pub struct DcaService {
    /// Price source (wrapped in Arc for sharing across tasks)
    provider: Arc<dyn PriceProvider>,
    /// Sub-units per whole unit for cross-instrument equivalents
    subunit_scale: u64,
    /// Fail on missing prices instead of skipping them
    strict: bool,
}

impl DcaService {
    /// Create a new service over `provider`
    pub fn new(provider: Arc<dyn PriceProvider>) -> Self {
        Self {
            provider,
            subunit_scale: DEFAULT_SUBUNIT_SCALE,
            strict: false,
        }
    }

    pub fn with_subunit_scale(mut self, subunit_scale: u64) -> Self {
        self.subunit_scale = subunit_scale;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Fetch every symbol's series concurrently, preserving symbol order
    pub async fn load_series(
        &self,
        symbols: &[String],
    ) -> Result<Vec<(String, Arc<PriceSeries>)>, ServiceError> {
        let handles: Vec<_> = symbols
            .iter()
            .map(|symbol| {
                let provider = Arc::clone(&self.provider);
                let symbol = symbol.clone();
                spawn(async move {
                    let series = provider.get_price_series(&symbol).await;
                    (symbol, series)
                })
            })
            .collect();

        let mut loaded = Vec::with_capacity(handles.len());
        for handle in handles {
            let (symbol, series) = handle.await?;
            match series {
                Ok(series) => loaded.push((symbol, Arc::new(series))),
                Err(e) => {
                    error!("Failed to load prices for {}: {}", symbol, e);
                    return Err(e.into());
                }
            }
        }

        Ok(loaded)
    }

    /// Simulate `plan` for each symbol and compare the outcomes
    pub async fn run(&self, plan: &DcaPlan, symbols: &[String]) -> Result<SimulationReport, ServiceError> {
        if symbols.is_empty() {
            return Err(ServiceError::Config("No symbols configured".to_string()));
        }

        info!(
            "Running {} DCA of {} for {:?} via {}",
            plan.timeframe(),
            plan.investment_amount(),
            symbols,
            self.provider.name()
        );

        let loaded = self.load_series(symbols).await?;

        // Each simulation owns its accumulator; only the series is shared
        let handles: Vec<_> = loaded
            .into_iter()
            .map(|(symbol, series)| {
                let plan = plan.clone();
                let strict = self.strict;
                spawn_blocking(move || {
                    let trajectory = simulate_with(&plan, &series, strict);
                    (symbol, series.latest_price(), trajectory)
                })
            })
            .collect();

        let mut comparator = Comparator::new(plan.investment_amount(), self.subunit_scale)?;
        for handle in handles {
            let (symbol, current_price, trajectory) = handle.await?;
            let trajectory = trajectory?;

            info!("{}: {} purchases simulated", symbol, trajectory.len());

            comparator = comparator.add(InstrumentRun {
                symbol,
                trajectory,
                current_price,
            });
        }

        Ok(SimulationReport {
            plan: plan.clone(),
            source: self.provider.name(),
            comparison: comparator.compare()?,
        })
    }
}
