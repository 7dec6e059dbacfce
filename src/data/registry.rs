use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{DashboardError, Result};

use super::model::{SeriesMeta, Unit};

pub const COLOR_GDP: &str = "#1e88e5";
pub const COLOR_EDU: &str = "#4caf50";
pub const COLOR_HEALTH: &str = "#8e24aa";
pub const COLOR_ACCENT: &str = "#ff7f0e";

// ---------------------------------------------------------------------------
// Category – the fixed set of headline indicators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Gdp,
    Education,
    Health,
    Energy,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Gdp,
        Category::Education,
        Category::Health,
        Category::Energy,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Gdp => "GDP",
            Category::Education => "Education",
            Category::Health => "Health",
            Category::Energy => "Energy",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DashboardError::UnknownCategory(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// CategoryInfo – source file and display metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryInfo {
    pub category: Category,
    /// File name relative to the data directory.
    pub file: PathBuf,
    /// Value of the `Indicator Name` column selecting the row to reshape.
    pub indicator_name: String,
    pub y_axis: String,
    pub description: String,
    pub unit: Unit,
    pub color: &'static str,
}

impl CategoryInfo {
    /// Indicator name without its parenthesised unit suffix.
    pub fn short_indicator(&self) -> &str {
        self.indicator_name
            .split(" (")
            .next()
            .unwrap_or(&self.indicator_name)
    }

    pub fn meta(&self) -> SeriesMeta {
        SeriesMeta {
            name: self.category.name().to_string(),
            title: format!("{} ({})", self.short_indicator(), self.category),
            y_axis: self.y_axis.clone(),
            unit: self.unit,
            color: Some(self.color.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// IndicatorRegistry
// ---------------------------------------------------------------------------

/// Immutable category → source mapping, built once at startup.
#[derive(Debug, Clone)]
pub struct IndicatorRegistry {
    entries: BTreeMap<Category, CategoryInfo>,
}

impl IndicatorRegistry {
    pub fn new(entries: impl IntoIterator<Item = CategoryInfo>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.category, e)).collect(),
        }
    }

    /// The World Bank extracts the dashboard ships with.
    pub fn pakistan() -> Self {
        Self::new([
            CategoryInfo {
                category: Category::Gdp,
                file: PathBuf::from("Pakistan_GDP.csv"),
                indicator_name: "GDP (current US$)".into(),
                y_axis: "Value (USD)".into(),
                description: "Pakistan's Annual Gross Domestic Product (GDP) in Current US$."
                    .into(),
                unit: Unit::Currency,
                color: COLOR_GDP,
            },
            CategoryInfo {
                category: Category::Education,
                file: PathBuf::from("Pakistan_School_Enrollment.csv"),
                indicator_name: "School enrollment, primary (% gross)".into(),
                y_axis: "Value (% Gross)".into(),
                description: "Gross Enrollment Ratio in Primary Education.".into(),
                unit: Unit::Percent,
                color: COLOR_EDU,
            },
            CategoryInfo {
                category: Category::Health,
                file: PathBuf::from("Pakistan_Net_User.csv"),
                indicator_name: "Individuals using the Internet (% of population)".into(),
                y_axis: "Value (%)".into(),
                description: "Digital penetration, used as the health proxy.".into(),
                unit: Unit::Percent,
                color: COLOR_HEALTH,
            },
            // No energy extract yet; GDP stands in.
            CategoryInfo {
                category: Category::Energy,
                file: PathBuf::from("Pakistan_GDP.csv"),
                indicator_name: "GDP (current US$)".into(),
                y_axis: "Value (USD)".into(),
                description: "Temporary: GDP shown as the energy proxy.".into(),
                unit: Unit::Currency,
                color: COLOR_ACCENT,
            },
        ])
    }

    pub fn get(&self, category: Category) -> Result<&CategoryInfo> {
        self.entries
            .get(&category)
            .ok_or_else(|| DashboardError::UnknownCategory(category.name().to_string()))
    }

    pub fn lookup(&self, name: &str) -> Result<&CategoryInfo> {
        self.get(name.parse()?)
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.entries.keys().copied()
    }

    /// Categories summarised on the overview KPI row.
    pub fn dashboard_indicators(&self) -> Vec<Category> {
        [Category::Gdp, Category::Education, Category::Health]
            .into_iter()
            .filter(|c| self.entries.contains_key(c))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Long-format economy series
// ---------------------------------------------------------------------------

/// How several rows of the same year collapse into one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Flows reported monthly (exports, remittances).
    Sum,
    /// Rates and indices reported several times a year.
    Mean,
    /// Levels where the latest dated reading of the year stands for it.
    Last,
}

/// How a [`SeriesFilter`] compares the selector cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    Exact,
    Contains,
}

/// Row selector for files that stack several series in one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesFilter {
    pub column: &'static str,
    pub name: &'static str,
    pub matching: NameMatch,
}

impl SeriesFilter {
    pub fn matches(&self, cell: &str) -> bool {
        let cell = cell.trim();
        match self.matching {
            NameMatch::Exact => cell == self.name,
            NameMatch::Contains => cell.contains(self.name),
        }
    }
}

/// A dated series stored one row per observation with bespoke column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongSeriesSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub file: &'static str,
    pub date_column: &'static str,
    pub value_column: &'static str,
    pub series_filter: Option<SeriesFilter>,
    pub aggregation: Aggregation,
    pub unit: Unit,
    pub y_axis: &'static str,
    pub color: &'static str,
}

impl LongSeriesSpec {
    pub fn meta(&self) -> SeriesMeta {
        SeriesMeta {
            name: self.label.to_string(),
            title: self.label.to_string(),
            y_axis: self.y_axis.to_string(),
            unit: self.unit,
            color: Some(self.color.to_string()),
        }
    }

    const fn selecting(self, column: &'static str, name: &'static str, matching: NameMatch) -> Self {
        LongSeriesSpec {
            series_filter: Some(SeriesFilter { column, name, matching }),
            ..self
        }
    }
}

/// `Date`/`Value` file under `Economy/`.
const fn dated(
    key: &'static str,
    label: &'static str,
    file: &'static str,
    aggregation: Aggregation,
    unit: Unit,
    y_axis: &'static str,
    color: &'static str,
) -> LongSeriesSpec {
    LongSeriesSpec {
        key,
        label,
        file,
        date_column: "Date",
        value_column: "Value",
        series_filter: None,
        aggregation,
        unit,
        y_axis,
        color,
    }
}

const GDP_FACTORS_FILE: &str = "Economy/Pakistan_GDP_2000-2025.csv";

/// One series of the national accounts file, selected by `Series name`.
const fn gdp_factor(
    key: &'static str,
    label: &'static str,
    series: &'static str,
    unit: Unit,
    y_axis: &'static str,
    color: &'static str,
) -> LongSeriesSpec {
    LongSeriesSpec {
        date_column: "Observation Date",
        value_column: "Observation Value",
        ..dated(key, label, GDP_FACTORS_FILE, Aggregation::Last, unit, y_axis, color)
    }
    .selecting("Series name", series, NameMatch::Exact)
}

pub const EXPORTS: LongSeriesSpec = dated(
    "exports",
    "Exports of Goods & Services",
    "Economy/Export_of_Goods_&_Services.csv",
    Aggregation::Sum,
    Unit::Currency,
    "Export Value (Million USD)",
    COLOR_ACCENT,
);

pub const REMITTANCES: LongSeriesSpec = dated(
    "remittances",
    "Workers' Remittances",
    "Economy/Workers_Remittance.csv",
    Aggregation::Sum,
    Unit::Currency,
    "Remittances (Million USD)",
    "#2ca02c",
);

pub const FOREIGN_INVESTMENT: LongSeriesSpec = dated(
    "fdi",
    "Total Foreign Investment",
    "Economy/Total_Foreign_Investment.csv",
    Aggregation::Sum,
    Unit::Currency,
    "Investment (Million USD)",
    "#9467bd",
);

pub const CPI: LongSeriesSpec = LongSeriesSpec {
    value_column: "CPI_Value",
    ..dated(
        "cpi",
        "Consumer Price Index",
        "Economy/Pakistan-CPI_Annual.csv",
        Aggregation::Last,
        Unit::Index,
        "CPI",
        "#ff9800",
    )
};

pub const REAL_GDP_GROWTH: LongSeriesSpec = gdp_factor(
    "gdp_real_growth",
    "Real GDP Growth Rate",
    "Growth Rate of Real Gross Domestic Product",
    Unit::Percent,
    "Growth Rate (%)",
    COLOR_ACCENT,
);

pub const SECTOR_AGRICULTURE: LongSeriesSpec = gdp_factor(
    "gdp_agriculture",
    "Agriculture",
    "Agricultural Sector",
    Unit::Index,
    "Value (Million PKR)",
    "#2e8b57",
);

pub const SECTOR_INDUSTRY: LongSeriesSpec = gdp_factor(
    "gdp_industry",
    "Industry",
    "Industrial Sector",
    Unit::Index,
    "Value (Million PKR)",
    "#ff6b35",
);

pub const SECTOR_SERVICES: LongSeriesSpec = gdp_factor(
    "gdp_services",
    "Services",
    "Services Sector",
    Unit::Index,
    "Value (Million PKR)",
    "#4a90e2",
);

/// Slices of the sectoral composition donut. The commodity-producing
/// subtotal is agriculture plus industry, so it is left out.
pub const GDP_SECTORS: [LongSeriesSpec; 3] = [SECTOR_AGRICULTURE, SECTOR_INDUSTRY, SECTOR_SERVICES];

const EXCHANGE_RATES_FILE: &str = "Economy/Exchange_Rates.csv";

pub const NEER: LongSeriesSpec = dated(
    "neer",
    "NEER (Nominal)",
    EXCHANGE_RATES_FILE,
    Aggregation::Mean,
    Unit::Index,
    "Index (2010 = 100)",
    "#1f77b4",
)
.selecting("Series_Name", "Nominal Effective", NameMatch::Contains);

pub const REER: LongSeriesSpec = dated(
    "reer",
    "REER (Real)",
    EXCHANGE_RATES_FILE,
    Aggregation::Mean,
    Unit::Index,
    "Index (2010 = 100)",
    "#d62728",
)
.selecting("Series_Name", "Real Effective", NameMatch::Contains);

pub const IMPORT_PAYMENTS: LongSeriesSpec = dated(
    "imports_freight",
    "Import Payments: Freight & Insurance",
    "Economy/Pk_Imports_Payments.csv",
    Aggregation::Sum,
    Unit::Index,
    "Payments (Thousand USD)",
    "#d62728",
);

const DEBT_FILE: &str = "Economy/Pakistan_Debt_and_Liabilities.csv";

pub const TOTAL_DEBT: LongSeriesSpec = dated(
    "debt_total",
    "Total Debt & Liabilities",
    DEBT_FILE,
    Aggregation::Last,
    Unit::Index,
    "Debt (Billion PKR)",
    "#e377c2",
)
.selecting("Series_Name", "Total Debt and Liabilities (sum I to IX)", NameMatch::Exact);

pub const GROSS_PUBLIC_DEBT: LongSeriesSpec = dated(
    "debt_gross_public",
    "Gross Public Debt",
    DEBT_FILE,
    Aggregation::Last,
    Unit::Index,
    "Debt (Billion PKR)",
    "#1f77b4",
)
.selecting("Series_Name", "Gross Public Debt (sum I to III)", NameMatch::Exact);

pub const DOMESTIC_DEBT: LongSeriesSpec = dated(
    "debt_domestic",
    "Domestic Debt",
    DEBT_FILE,
    Aggregation::Last,
    Unit::Index,
    "Debt (Billion PKR)",
    "#2ca02c",
)
.selecting("Series_Name", "Government Domestic Debt", NameMatch::Exact);

pub const EXTERNAL_DEBT: LongSeriesSpec = dated(
    "debt_external",
    "External Debt",
    DEBT_FILE,
    Aggregation::Last,
    Unit::Index,
    "Debt (Billion PKR)",
    "#ff7f0e",
)
.selecting("Series_Name", "Government External Debt", NameMatch::Exact);

pub const NET_EXPORT_BALANCE: LongSeriesSpec = dated(
    "net_export_balance",
    "Net Export Balance",
    "Economy/Net-balance-PKR-Exports.csv",
    Aggregation::Sum,
    Unit::Index,
    "Net Balance (Million PKR)",
    "#17becf",
);

pub const AGRICULTURE_GROWTH: LongSeriesSpec = dated(
    "agriculture_growth",
    "Agriculture Sector Growth Rate",
    "Economy/Agriculture-Sector.csv",
    Aggregation::Mean,
    Unit::Percent,
    "Growth Rate (%)",
    "#8c564b",
);

pub const SERVICES_EXPORT: LongSeriesSpec = dated(
    "services_export",
    "Services Export",
    "Economy/Services-Export.csv",
    Aggregation::Sum,
    Unit::Currency,
    "Export Value (Million USD)",
    "#17becf",
);

pub const COMMODITY_EXPORTS: LongSeriesSpec = dated(
    "commodity_exports",
    "Export by Commodities",
    "Economy/Export_By_Commodities.csv",
    Aggregation::Sum,
    Unit::Index,
    "Export Value (Thousand USD)",
    "#bcbd22",
);
