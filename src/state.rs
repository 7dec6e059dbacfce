use std::path::Path;

use crate::dashboard::Dashboard;
use crate::data::filter::YearRange;
use crate::data::registry::Category;
use crate::pages::{self, Filters, Page, PageView};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub dashboard: Dashboard,

    /// Current page, tab, year window and explorer indicator.
    pub filters: Filters,

    /// Slider limits for the current page; `None` when nothing could be loaded.
    pub bounds: Option<YearRange>,

    /// Render tree for `filters` (cached until the next change).
    pub view: PageView,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        let mut filters = Filters::default();
        let bounds = pages::year_bounds(filters.page, &dashboard);
        filters.year_range = bounds.unwrap_or_else(YearRange::everything);
        let view = pages::render(&filters, &dashboard);
        Self {
            dashboard,
            filters,
            bounds,
            view,
            status_message: None,
        }
    }

    /// Recompute the view after a filter change.
    pub fn rerender(&mut self) {
        self.view = pages::render(&self.filters, &self.dashboard);
    }

    /// Widen the year window to everything the page can show.
    fn reset_years(&mut self) {
        self.bounds = pages::year_bounds(self.filters.page, &self.dashboard);
        self.filters.year_range = self.bounds.unwrap_or_else(YearRange::everything);
        self.rerender();
    }

    pub fn set_page(&mut self, page: Page) {
        if self.filters.page == page {
            return;
        }
        self.filters.page = page;
        self.filters.tab = 0;
        self.reset_years();
    }

    pub fn set_tab(&mut self, tab: usize) {
        if self.filters.tab != tab {
            self.filters.tab = tab;
            self.rerender();
        }
    }

    /// Update the year window, clamped to what the page shows.
    pub fn set_year_range(&mut self, range: YearRange) {
        let range = match self.bounds {
            Some(bounds) => range.clamp_to(bounds),
            None => range,
        };
        if self.filters.year_range != range {
            self.filters.year_range = range;
            self.rerender();
        }
    }

    pub fn set_indicator(&mut self, indicator: Category) {
        if self.filters.indicator != indicator {
            self.filters.indicator = indicator;
            self.rerender();
        }
    }

    /// Point the dashboard at another data folder. The cache starts cold.
    pub fn open_data_dir(&mut self, dir: &Path) {
        let config = self.dashboard.config().with_data_root(dir);
        log::info!("Switching data folder to {}", config.data_dir.display());
        let registry = self.dashboard.registry().clone();
        self.dashboard = Dashboard::new(config, registry);
        self.reset_years();

        self.status_message = match self.bounds {
            Some(_) => None,
            None => Some(format!("No indicator data found in {}", dir.display())),
        };
    }

    /// Number of series currently held in memory.
    pub fn cached_series(&self) -> usize {
        self.dashboard.cache().len()
    }

    /// Cache line for the top bar: series count and the indicators loaded.
    pub fn cache_summary(&self) -> String {
        let warm: Vec<&str> = self
            .dashboard
            .warm_categories()
            .into_iter()
            .map(Category::name)
            .collect();
        if warm.is_empty() {
            format!("{} series cached", self.cached_series())
        } else {
            format!("{} series cached ({})", self.cached_series(), warm.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::config::DashboardConfig;

    fn gdp_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Pakistan_GDP.csv"),
            "Country Name,Indicator Name,2000,2001,2002,2003\n\
             Pakistan,GDP (current US$),1,2,3,4\n",
        )
        .unwrap();
        dir
    }

    fn state_for(dir: &Path) -> AppState {
        let config = DashboardConfig {
            data_dir: dir.to_path_buf(),
            ..DashboardConfig::default()
        };
        AppState::new(Dashboard::with_config(config))
    }

    #[test]
    fn new_state_spans_all_loaded_years() {
        let dir = gdp_dir();
        let state = state_for(dir.path());
        assert_eq!(state.bounds, Some(YearRange::new(2000, 2003)));
        assert_eq!(state.filters.year_range, YearRange::new(2000, 2003));
        assert_eq!(state.view.tabs[0], "Dashboard");
    }

    #[test]
    fn year_range_is_clamped_and_rerenders() {
        let dir = gdp_dir();
        let mut state = state_for(dir.path());
        state.set_year_range(YearRange::new(2002, 2050));
        assert_eq!(state.filters.year_range, YearRange::new(2002, 2003));
    }

    #[test]
    fn switching_page_resets_tab() {
        let dir = gdp_dir();
        let mut state = state_for(dir.path());
        state.set_tab(1);
        assert_eq!(state.view.active_tab, 1);
        state.set_page(Page::Economy);
        assert_eq!(state.filters.tab, 0);
        assert_eq!(state.view.tabs, vec!["Economic Data", "AI Forecasting"]);
    }

    #[test]
    fn cache_summary_names_loaded_indicators() {
        let dir = gdp_dir();
        let state = state_for(dir.path());
        // GDP loads; education and health files are absent
        let summary = state.cache_summary();
        assert!(summary.starts_with("1 series cached"), "{summary}");
        assert!(summary.ends_with("(GDP)"), "{summary}");
    }

    #[test]
    fn empty_data_dir_sets_a_status() {
        let dir = gdp_dir();
        let mut state = state_for(dir.path());
        assert!(state.cached_series() > 0);

        let empty = tempfile::tempdir().unwrap();
        state.open_data_dir(empty.path());
        assert_eq!(state.bounds, None);
        assert!(state.status_message.is_some());
        assert_eq!(state.cached_series(), 0);
        assert_eq!(state.cache_summary(), "0 series cached");
    }
}
