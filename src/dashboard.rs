use crate::charts::{saved, ChartDescription};
use crate::config::DashboardConfig;
use crate::data::cache::{DataCache, Series, SeriesKey};
use crate::data::loader;
use crate::data::model::Observation;
use crate::data::registry::{Category, CategoryInfo, IndicatorRegistry, LongSeriesSpec};
use crate::error::{DashboardError, Result};
use crate::forecast::{self, ForecastOutcome};

// ---------------------------------------------------------------------------
// Dashboard – owns config, registry and the series cache
// ---------------------------------------------------------------------------

/// Everything the page renderer reads from. The cache lives here rather
/// than in a process-wide static, so a fresh `Dashboard` starts cold.
#[derive(Debug)]
pub struct Dashboard {
    config: DashboardConfig,
    registry: IndicatorRegistry,
    cache: DataCache,
}

impl Dashboard {
    pub fn new(config: DashboardConfig, registry: IndicatorRegistry) -> Self {
        Self {
            config,
            registry,
            cache: DataCache::new(),
        }
    }

    pub fn with_config(config: DashboardConfig) -> Self {
        Self::new(config, IndicatorRegistry::pakistan())
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn registry(&self) -> &IndicatorRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &DataCache {
        &self.cache
    }

    pub fn info(&self, category: Category) -> Result<&CategoryInfo> {
        self.registry.get(category)
    }

    /// Long-format observations of a category, read once per process.
    pub fn load(&self, category: Category) -> Result<Series> {
        let info = self.registry.get(category)?;
        self.cache
            .get_or_populate(SeriesKey::Indicator(category), || {
                loader::load_wide(
                    &self.config.data_dir.join(&info.file),
                    Some(&info.indicator_name),
                    self.config.year_threshold,
                )
            })
    }

    pub fn load_by_name(&self, name: &str) -> Result<Series> {
        let category = self.registry.lookup(name)?.category;
        self.load(category)
    }

    /// A supplementary dated series, aggregated per year and cached.
    pub fn load_series(&self, spec: &LongSeriesSpec) -> Result<Series> {
        self.cache.get_or_populate(SeriesKey::Long(spec.key), || {
            loader::load_long(&self.config.data_dir.join(spec.file), spec)
        })
    }

    /// Like [`Dashboard::load`] but an empty series is an `EmptyResult`.
    pub fn require(&self, category: Category) -> Result<Series> {
        let series = self.load(category)?;
        if series.is_empty() {
            return Err(DashboardError::EmptyResult(category.name().to_string()));
        }
        Ok(series)
    }

    /// GDP forecast for the configured horizon; falls back to the sample
    /// sequence when the model artifacts are unusable.
    pub fn forecast_gdp(&self, history: &[Observation]) -> ForecastOutcome {
        let model_path = self.config.model_path();
        let scaler_path = self.config.scaler_path();
        forecast::forecast_or_fallback(
            history,
            self.config.forecast_steps,
            self.config.band_fraction,
            || forecast::load_artifacts(&model_path, &scaler_path),
        )
    }

    /// A pre-computed chart payload by name.
    pub fn saved_chart(&self, name: &str) -> Result<ChartDescription> {
        saved::load_chart(&self.config.saved_chart_path(name))
    }

    /// Every category whose series is already in memory, for diagnostics.
    pub fn warm_categories(&self) -> Vec<Category> {
        self.registry
            .categories()
            .filter(|c| self.cache.get(SeriesKey::Indicator(*c)).is_some())
            .collect()
    }
}
