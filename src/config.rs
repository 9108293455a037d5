//! TOML configuration.
//!
//! Every field is optional; a missing file section falls back to the
//! built-in defaults. The backend base address lives here and is passed to
//! whoever needs it instead of being a process-wide constant.

use crate::error::Result;
use crate::geo::CityTable;
use crate::search::DEFAULT_PAGE_SIZE;
use crate::trend::DEFAULT_WINDOW_DAYS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base: String,
    pub data_path: PathBuf,
    pub trend_days: usize,
    pub page_size: usize,
    pub top_n: usize,
    /// Extra or overriding city regions, merged over the built-in table.
    #[serde(default = "CityTable::empty")]
    pub cities: CityTable,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:5000/api".to_string(),
            data_path: PathBuf::from("reports.json"),
            trend_days: DEFAULT_WINDOW_DAYS,
            page_size: DEFAULT_PAGE_SIZE,
            top_n: 5,
            cities: CityTable::empty(),
        }
    }
}

impl AppConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        log::info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Built-in cities with configured overrides applied.
    pub fn city_table(&self) -> CityTable {
        let mut table = CityTable::default();
        table.merge(self.cities.clone());
        table
    }

    /// Full URL of the report listing endpoint. Only logged here; it is
    /// reserved for the fetch layer that produces the JSON snapshots.
    pub fn reports_url(&self) -> String {
        format!("{}/reports", self.api_base.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.city_table(), CityTable::default());
    }

    #[test]
    fn parses_overrides_and_cities() {
        let text = r#"
            api_base = "https://civic.example.org/api/"
            trend_days = 14

            [cities.Mumbai]
            lat_min = 18.9
            lat_max = 19.3
            lng_min = 72.7
            lng_max = 73.0
        "#;
        let config = AppConfig::from_toml(text).unwrap();
        assert_eq!(config.trend_days, 14);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.reports_url(), "https://civic.example.org/api/reports");
        let cities = config.city_table();
        assert!(cities.get("mumbai").is_some());
        assert!(cities.get("delhi").is_some());
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let err = AppConfig::from_toml("trend_days = \"seven\"").unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("civic.toml");
        std::fs::write(&path, "top_n = 3\n").unwrap();
        assert_eq!(AppConfig::load(&path).unwrap().top_n, 3);
        assert!(matches!(
            AppConfig::load(&dir.path().join("missing.toml")),
            Err(ReportError::Io(_))
        ));
    }
}
