//! Write a deterministic sample data root: indicator CSVs, the dated and
//! stacked economy series, forecast model artifacts and one saved chart
//! payload.
//!
//! Usage: `generate_sample [OUTPUT_DIR]` (defaults to the working directory).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use pak_data_twin::charts::forecast_chart;
use pak_data_twin::config::DashboardConfig;
use pak_data_twin::data::model::Observation;
use pak_data_twin::data::registry::{
    LongSeriesSpec, AGRICULTURE_GROWTH, COMMODITY_EXPORTS, CPI, EXPORTS, FOREIGN_INVESTMENT, IMPORT_PAYMENTS, NEER,
    NET_EXPORT_BALANCE, REAL_GDP_GROWTH, REMITTANCES, SERVICES_EXPORT, TOTAL_DEBT,
};
use pak_data_twin::forecast::model::LinearWindow;
use pak_data_twin::forecast::{with_band, MinMaxScaler, ModelArtifact};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const FIRST_YEAR: i32 = 1960;
const LAST_YEAR: i32 = 2023;

// ---------------------------------------------------------------------------
// Wide World Bank style extracts
// ---------------------------------------------------------------------------

/// One `Pakistan` row with a column per year; `None` leaves the cell blank.
fn write_wide(path: &Path, indicator: &str, code: &str, values: &[(i32, Option<f64>)]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec![
        "Country Name".to_string(),
        "Country Code".to_string(),
        "Indicator Name".to_string(),
        "Indicator Code".to_string(),
    ];
    header.extend(values.iter().map(|(y, _)| y.to_string()));
    writer.write_record(&header)?;

    let mut row = vec![
        "Pakistan".to_string(),
        "PAK".to_string(),
        indicator.to_string(),
        code.to_string(),
    ];
    row.extend(values.iter().map(|(_, v)| v.map(|v| format!("{v:.4}")).unwrap_or_default()));
    writer.write_record(&row)?;
    writer.flush()?;
    Ok(())
}

fn gdp_series(rng: &mut SimpleRng) -> Vec<(i32, Option<f64>)> {
    let mut value = 3.7e9;
    (FIRST_YEAR..=LAST_YEAR)
        .map(|year| {
            value *= 1.0 + rng.gauss(0.065, 0.04).max(-0.08);
            (year, Some(value))
        })
        .collect()
}

fn enrollment_series(rng: &mut SimpleRng) -> Vec<(i32, Option<f64>)> {
    (FIRST_YEAR..=LAST_YEAR)
        .map(|year| {
            let t = (year - FIRST_YEAR) as f64;
            let base = 40.0 + 55.0 / (1.0 + (-(t - 40.0) / 8.0).exp());
            // survey gaps: roughly one year in five is missing
            let missing = rng.next_f64() < 0.2;
            (year, (!missing).then(|| (base + rng.gauss(0.0, 1.5)).clamp(0.0, 120.0)))
        })
        .collect()
}

fn internet_series(rng: &mut SimpleRng) -> Vec<(i32, Option<f64>)> {
    (FIRST_YEAR..=LAST_YEAR)
        .map(|year| {
            if year < 1995 {
                return (year, None);
            }
            let t = (year - 1995) as f64;
            let share = 45.0 / (1.0 + (-(t - 22.0) / 3.5).exp());
            (year, Some((share + rng.gauss(0.0, 0.3)).max(0.0)))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Dated economy series
// ---------------------------------------------------------------------------

fn write_monthly(path: &Path, spec: &LongSeriesSpec, start: f64, growth: f64, rng: &mut SimpleRng) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([spec.date_column, spec.value_column])?;
    let mut value = start;
    for year in 2010..=LAST_YEAR {
        for month in 1..=12 {
            value *= 1.0 + growth / 12.0 + rng.gauss(0.0, 0.02);
            writer.write_record([format!("{year}-{month:02}-01"), format!("{:.2}", value.max(0.0))])?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn write_annual(path: &Path, spec: &LongSeriesSpec, rng: &mut SimpleRng) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([spec.date_column, spec.value_column])?;
    let mut value = 100.0;
    for year in 2000..=LAST_YEAR {
        value *= 1.0 + rng.gauss(0.08, 0.03).max(0.0);
        writer.write_record([year.to_string(), format!("{value:.2}")])?;
    }
    writer.flush()?;
    Ok(())
}

/// Quarterly rates around `mean` (agriculture growth).
fn write_quarterly(path: &Path, spec: &LongSeriesSpec, mean: f64, sd: f64, rng: &mut SimpleRng) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([spec.date_column, spec.value_column])?;
    for year in 2005..=LAST_YEAR {
        for month in [3, 6, 9, 12] {
            writer.write_record([format!("{year}-{month:02}-01"), format!("{:.2}", rng.gauss(mean, sd))])?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Several series in one table, told apart by a name column.
fn write_stacked(path: &Path, columns: [&str; 3], rows: &[(String, &str, f64)]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(columns)?;
    for (date, series, value) in rows {
        let value = format!("{value:.2}");
        writer.write_record([date.as_str(), *series, value.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Real growth and sector output (million PKR) per fiscal year.
fn gdp_factor_rows(rng: &mut SimpleRng) -> Vec<(String, &'static str, f64)> {
    let mut rows = Vec::new();
    let mut output = 4.0e6;
    for year in 2000..=LAST_YEAR {
        let growth = rng.gauss(4.0, 1.8);
        output *= 1.0 + growth / 100.0 + 0.06;
        let agriculture = output * rng.gauss(0.23, 0.01);
        let industry = output * rng.gauss(0.19, 0.01);
        let services = output - agriculture - industry;
        let date = format!("{year}-06-30");
        rows.extend([
            (date.clone(), "Growth Rate of Real Gross Domestic Product", growth),
            (date.clone(), "Agricultural Sector", agriculture),
            (date.clone(), "Industrial Sector", industry),
            (date.clone(), "Services Sector", services),
            (date, "Commodity Producing Sector (a+b)", agriculture + industry),
        ]);
    }
    rows
}

fn exchange_rows(rng: &mut SimpleRng) -> Vec<(String, &'static str, f64)> {
    let (mut neer, mut reer) = (100.0, 100.0);
    let mut rows = Vec::new();
    for year in 2010..=LAST_YEAR {
        for month in 1..=12 {
            neer *= 1.0 + rng.gauss(-0.004, 0.01);
            reer *= 1.0 + rng.gauss(0.0, 0.008);
            let date = format!("{year}-{month:02}-01");
            rows.push((date.clone(), "Nominal Effective Exchange Rate Index (2010=100)", neer));
            rows.push((date, "Real Effective Exchange Rate Index (2010=100)", reer));
        }
    }
    rows
}

/// Quarterly debt stocks in billion PKR.
fn debt_rows(rng: &mut SimpleRng) -> Vec<(String, &'static str, f64)> {
    let (mut domestic, mut external) = (5000.0, 3000.0);
    let mut rows = Vec::new();
    for year in 2010..=LAST_YEAR {
        for month in [3, 6, 9, 12] {
            domestic *= 1.0 + rng.gauss(0.035, 0.01).max(0.0);
            external *= 1.0 + rng.gauss(0.025, 0.015).max(0.0);
            let gross = domestic + external;
            let date = format!("{year}-{month:02}-30");
            rows.extend([
                (date.clone(), "Government Domestic Debt", domestic),
                (date.clone(), "Government External Debt", external),
                (date.clone(), "Gross Public Debt (sum I to III)", gross),
                (date, "Total Debt and Liabilities (sum I to IX)", gross * 1.25),
            ]);
        }
    }
    rows
}

// ---------------------------------------------------------------------------
// Model artifacts and saved chart
// ---------------------------------------------------------------------------

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

/// Linear trend model: `x_{t+1} = 2·x_t − x_{t−1}` over a window of three.
fn trend_model() -> ModelArtifact {
    ModelArtifact::LinearWindow(LinearWindow {
        weights: vec![0.0, -1.0, 2.0],
        bias: 0.0,
    })
}

/// Straight-line projection of annual exports with a ±5% band.
fn export_forecast(monthly_path: &Path) -> Result<pak_data_twin::charts::ChartDescription> {
    let history = pak_data_twin::data::loader::load_long(monthly_path, &EXPORTS)
        .with_context(|| format!("re-reading {}", monthly_path.display()))?;
    let n = history.len();
    anyhow::ensure!(n >= 2, "need at least two years of exports");

    let last = history[n - 1];
    let slope = (last.value - history[0].value) / (n - 1) as f64;
    let projection: Vec<f64> = (1..=5).map(|k| last.value + slope * k as f64).collect();
    let points = with_band(last.year + 1, &projection, 0.05);

    let shown: Vec<Observation> = history.iter().copied().filter(|o| o.year >= 2015).collect();
    Ok(forecast_chart(
        "Exports Forecast (Next 5 Years)",
        "Exports (Million USD)",
        &shown,
        &points,
        1.0,
    ))
}

fn main() -> Result<()> {
    env_logger::init();

    let root = std::env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    let config = DashboardConfig::default();
    let data_dir = root.join(&config.data_dir);
    let models_dir = root.join(&config.models_dir);
    let plots_dir = root.join(&config.plots_dir);
    for dir in [data_dir.join("Economy"), models_dir.clone(), plots_dir.clone()] {
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let mut rng = SimpleRng::new(42);

    let gdp = gdp_series(&mut rng);
    write_wide(&data_dir.join("Pakistan_GDP.csv"), "GDP (current US$)", "NY.GDP.MKTP.CD", &gdp)?;
    write_wide(
        &data_dir.join("Pakistan_School_Enrollment.csv"),
        "School enrollment, primary (% gross)",
        "SE.PRM.ENRR",
        &enrollment_series(&mut rng),
    )?;
    write_wide(
        &data_dir.join("Pakistan_Net_User.csv"),
        "Individuals using the Internet (% of population)",
        "IT.NET.USER.ZS",
        &internet_series(&mut rng),
    )?;

    write_monthly(&data_dir.join(EXPORTS.file), &EXPORTS, 1800.0, 0.04, &mut rng)?;
    write_monthly(&data_dir.join(REMITTANCES.file), &REMITTANCES, 750.0, 0.08, &mut rng)?;
    write_monthly(&data_dir.join(FOREIGN_INVESTMENT.file), &FOREIGN_INVESTMENT, 200.0, 0.02, &mut rng)?;
    write_annual(&data_dir.join(CPI.file), &CPI, &mut rng)?;
    write_annual(&data_dir.join(NET_EXPORT_BALANCE.file), &NET_EXPORT_BALANCE, &mut rng)?;
    write_monthly(&data_dir.join(IMPORT_PAYMENTS.file), &IMPORT_PAYMENTS, 90_000.0, 0.03, &mut rng)?;
    write_monthly(&data_dir.join(SERVICES_EXPORT.file), &SERVICES_EXPORT, 450.0, 0.06, &mut rng)?;
    write_monthly(&data_dir.join(COMMODITY_EXPORTS.file), &COMMODITY_EXPORTS, 300_000.0, 0.04, &mut rng)?;
    write_quarterly(&data_dir.join(AGRICULTURE_GROWTH.file), &AGRICULTURE_GROWTH, 2.8, 1.5, &mut rng)?;

    write_stacked(
        &data_dir.join(REAL_GDP_GROWTH.file),
        ["Observation Date", "Series name", "Observation Value"],
        &gdp_factor_rows(&mut rng),
    )?;
    write_stacked(&data_dir.join(NEER.file), ["Date", "Series_Name", "Value"], &exchange_rows(&mut rng))?;
    write_stacked(&data_dir.join(TOTAL_DEBT.file), ["Date", "Series_Name", "Value"], &debt_rows(&mut rng))?;

    let gdp_values: Vec<f64> = gdp.iter().filter_map(|(_, v)| *v).collect();
    let scaler = MinMaxScaler::fit(&gdp_values).context("GDP sample is empty")?;
    write_json(&models_dir.join("gdp_model.json"), &trend_model())?;
    write_json(&models_dir.join("gdp_scaler.json"), &scaler)?;

    let chart = export_forecast(&data_dir.join(EXPORTS.file))?;
    let chart_path = plots_dir.join("export_forecast.json");
    write_json(&chart_path, &chart)?;

    println!(
        "Wrote sample data to {}, models to {}, saved chart to {}",
        data_dir.display(),
        models_dir.display(),
        chart_path.display()
    );
    Ok(())
}
