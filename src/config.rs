use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming an explicit JSON config file.
pub const CONFIG_ENV: &str = "PAK_DASHBOARD_CONFIG";
/// Environment variable overriding `data_dir`.
pub const DATA_DIR_ENV: &str = "PAK_DATA_DIR";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Runtime settings. Every field has a default so a partial JSON file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Folder holding the indicator CSVs.
    pub data_dir: PathBuf,
    /// Folder holding `gdp_model.json` and `gdp_scaler.json`.
    pub models_dir: PathBuf,
    /// Folder holding pre-computed chart payloads (`<name>.json`).
    pub plots_dir: PathBuf,
    /// Year columns below this value are ignored when reshaping.
    pub year_threshold: i32,
    /// Forecast horizon in years.
    pub forecast_steps: usize,
    /// Half-width of the illustrative band, as a fraction of the forecast.
    pub band_fraction: f64,
    pub histogram_bins: usize,
    /// Saved payloads shown on the forecasting tab.
    pub saved_charts: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data_processed"),
            models_dir: PathBuf::from("models"),
            plots_dir: PathBuf::from("saved_plots"),
            year_threshold: 2000,
            forecast_steps: 10,
            band_fraction: 0.05,
            histogram_bins: 20,
            saved_charts: vec!["export_forecast".to_string()],
        }
    }
}

impl DashboardConfig {
    /// Read a config file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Resolve the config for this process.
    ///
    /// Lookup order: `$PAK_DASHBOARD_CONFIG` (must exist), then
    /// `./dashboard.json` (optional), then defaults. `$PAK_DATA_DIR` is
    /// applied last.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.is_file() {
                    Self::from_file(local)?
                } else {
                    Self::default()
                }
            }
        };

        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    pub fn model_path(&self) -> PathBuf {
        self.models_dir.join("gdp_model.json")
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.models_dir.join("gdp_scaler.json")
    }

    pub fn saved_chart_path(&self, name: &str) -> PathBuf {
        self.plots_dir.join(format!("{name}.json"))
    }

    /// Point the config at a new data root. Models and saved plots follow
    /// when they live inside it.
    pub fn with_data_root(&self, root: &Path) -> Self {
        let mut next = self.clone();
        next.data_dir = root.to_path_buf();
        for dir in [&mut next.models_dir, &mut next.plots_dir] {
            let candidate = root.join(dir.file_name().unwrap_or_default());
            if candidate.is_dir() {
                *dir = candidate;
            }
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(&path, r#"{ "data_dir": "/srv/pak", "forecast_steps": 4 }"#).unwrap();

        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/pak"));
        assert_eq!(config.forecast_steps, 4);
        assert_eq!(config.year_threshold, 2000);
        assert_eq!(config.histogram_bins, 20);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(DashboardConfig::from_file(&path).is_err());
    }

    #[test]
    fn data_root_pulls_in_sibling_folders() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("models")).unwrap();

        let config = DashboardConfig::default().with_data_root(dir.path());
        assert_eq!(config.data_dir, dir.path());
        assert_eq!(config.models_dir, dir.path().join("models"));
        // no saved_plots folder inside the root: keep the old location
        assert_eq!(config.plots_dir, PathBuf::from("saved_plots"));
    }
}
