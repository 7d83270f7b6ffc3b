use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::provider::{CsvPriceProvider, PriceProvider, YahooPriceProvider, YAHOO_API_URL};
use crate::service::ServiceError;
use crate::simulation::DEFAULT_SUBUNIT_SCALE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Csv,
    Yahoo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Provider {
    pub kind: ProviderKind,
    pub csv_dir: String,
    pub yahoo_base_url: String,
    pub timeout_secs: u64,
    /// First date requested from remote providers
    pub history_start: String,
}

/// Plan values used when the command line leaves them out
#[derive(Debug, Clone, Deserialize)]
pub struct Defaults {
    pub investment: String,
    pub timeframe: String,
    pub start_date: String,
    pub accumulate_years: Option<String>,
    pub symbols: Vec<String>,
    pub subunit_scale: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub provider: Provider,
    pub defaults: Defaults,
    pub log: Log,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        Self::load(&format!("config/{}", run_mode))
    }

    /// Defaults, then the optional file at `path`, then `DCA__*` variables
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("provider.kind", "csv")?
            .set_default("provider.csv_dir", "data")?
            .set_default("provider.yahoo_base_url", YAHOO_API_URL)?
            .set_default("provider.timeout_secs", 30)?
            .set_default("provider.history_start", "2010-01-01")?
            .set_default("defaults.investment", "10")?
            .set_default("defaults.timeframe", "week")?
            .set_default("defaults.start_date", "2015-01-01")?
            .set_default("defaults.accumulate_years", "5")?
            .set_default("defaults.symbols", vec!["MSTR", "BTC-USD"])?
            .set_default("defaults.subunit_scale", DEFAULT_SUBUNIT_SCALE)?
            .set_default("log.level", "info")?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("DCA").separator("__"));

        if let Ok(data_dir) = std::env::var("DCA_DATA_DIR") {
            builder = builder.set_override("provider.csv_dir", data_dir)?;
        }

        let s = builder.build()?;
        s.try_deserialize()
    }

    pub fn history_start(&self) -> Result<NaiveDate, ServiceError> {
        NaiveDate::parse_from_str(&self.provider.history_start, "%Y-%m-%d").map_err(|e| {
            ServiceError::Config(format!(
                "Invalid provider.history_start '{}': {}",
                self.provider.history_start, e
            ))
        })
    }

    /// Build the configured price provider
    pub fn price_provider(&self) -> Result<Arc<dyn PriceProvider>, ServiceError> {
        match self.provider.kind {
            ProviderKind::Csv => Ok(Arc::new(CsvPriceProvider::new(&self.provider.csv_dir))),
            ProviderKind::Yahoo => {
                let provider = YahooPriceProvider::new(
                    self.provider.yahoo_base_url.clone(),
                    self.history_start()?,
                    Some(Duration::from_secs(self.provider.timeout_secs)),
                )?;
                Ok(Arc::new(provider))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let settings = Settings::load("config/does-not-exist").unwrap();

        assert_eq!(settings.provider.kind, ProviderKind::Csv);
        assert_eq!(settings.defaults.timeframe, "week");
        assert_eq!(settings.defaults.symbols, vec!["MSTR", "BTC-USD"]);
        assert_eq!(settings.defaults.subunit_scale, DEFAULT_SUBUNIT_SCALE);
        assert_eq!(settings.history_start().unwrap(), NaiveDate::from_ymd_opt(2010, 1, 1).unwrap());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[provider]\nkind = \"yahoo\"\n\n[defaults]\ntimeframe = \"month\"\nsymbols = [\"SPY\"]"
        )
        .unwrap();

        let settings = Settings::load(path.to_str().unwrap()).unwrap();

        assert_eq!(settings.provider.kind, ProviderKind::Yahoo);
        assert_eq!(settings.defaults.timeframe, "month");
        assert_eq!(settings.defaults.symbols, vec!["SPY"]);
        assert_eq!(settings.defaults.investment, "10");
        assert!(settings.price_provider().is_ok());
    }
}
