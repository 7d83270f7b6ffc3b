use anyhow::Context;
use clap::Parser;
use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dca_core::{
    common::{AccumulationWindow, DcaPlan},
    config::Settings,
    service::{DcaService, SimulationReport},
};

#[derive(Parser)]
#[command(name = "dca")]
#[command(about = "Dollar-cost averaging simulator over historical prices")]
enum Commands {
    /// Simulate a recurring purchase plan for one or more symbols
    Simulate {
        #[arg(short, long = "symbol")]
        symbols: Vec<String>,
        #[arg(short, long)]
        investment: Option<String>,
        #[arg(short, long)]
        timeframe: Option<String>,
        #[arg(short = 'd', long)]
        start_date: Option<String>,
        /// Accumulation horizon in years, fractions truncate to whole months
        #[arg(short, long, conflicts_with = "months")]
        years: Option<String>,
        #[arg(long)]
        months: Option<u32>,
        /// Fail on periods with missing prices instead of skipping them
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        subunit_scale: Option<u64>,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the configured provider and default symbols
    Symbols,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let settings = Settings::new().context("Failed to load settings")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match Commands::parse() {
        Commands::Symbols => {
            println!("Provider: {:?}", settings.provider.kind);
            for symbol in &settings.defaults.symbols {
                println!("{}", symbol);
            }
        }

        Commands::Simulate {
            symbols,
            investment,
            timeframe,
            start_date,
            years,
            months,
            strict,
            subunit_scale,
            json,
        } => {
            let defaults = &settings.defaults;
            let symbols = if symbols.is_empty() {
                defaults.symbols.clone()
            } else {
                symbols
            };

            let years = match (&years, months) {
                (Some(years), _) => Some(years.as_str()),
                (None, Some(_)) => None,
                (None, None) => defaults.accumulate_years.as_deref(),
            };

            let mut plan = DcaPlan::parse(
                investment.as_deref().unwrap_or(defaults.investment.as_str()),
                timeframe.as_deref().unwrap_or(defaults.timeframe.as_str()),
                start_date.as_deref().unwrap_or(defaults.start_date.as_str()),
                years,
            )?;
            if let Some(months) = months {
                plan = DcaPlan::new(
                    plan.investment_amount(),
                    plan.timeframe(),
                    plan.start_date(),
                    Some(AccumulationWindow::months(months)),
                )?;
            }

            let service = DcaService::new(settings.price_provider()?)
                .with_subunit_scale(subunit_scale.unwrap_or(defaults.subunit_scale))
                .with_strict(strict);

            let report = match service.run(&plan, &symbols).await {
                Ok(report) => report,
                Err(e) => {
                    error!("Simulation failed: {}", e);
                    return Err(e.into());
                }
            };
            info!("Simulation completed for {} symbols", report.comparison.instruments.len());

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
    }

    Ok(())
}

fn print_report(report: &SimulationReport) {
    let plan = &report.plan;
    let horizon = plan
        .end_date()
        .map(|end| format!("until {}", end))
        .unwrap_or_else(|| "until latest data".to_string());

    println!(
        "\nDCA Results: ${} every {} from {} {}",
        plan.investment_amount(),
        plan.timeframe(),
        plan.start_date(),
        horizon
    );

    for instrument in &report.comparison.instruments {
        let summary = &instrument.summary;
        let symbol = &instrument.symbol;

        println!("\n{} Purchases: {}", symbol, summary.purchases);
        println!("{} Cumulative Investment: ${:.2}", symbol, summary.total_invested);
        println!("{} Final Value: ${:.2}", symbol, summary.final_value);
        println!("{} Value vs Invested: {:.2}%", symbol, summary.percent_change);
        if let Some(cost) = summary.average_cost {
            println!("{} Average Cost: ${:.2}", symbol, cost);
        }
        for eq in &instrument.equivalents {
            println!(
                "{} Value in {}: {} units ({} sub-units @ ${:.2})",
                symbol, eq.symbol, eq.units.whole_units, eq.units.sub_units, eq.price
            );
        }
        if let (Some(first), Some(last)) = (instrument.trajectory.first(), instrument.trajectory.last()) {
            println!("{} Period: {} to {}", symbol, first.date, last.date);
        }
    }
}
