use crate::data::model::{last_two, Observation, Unit};

/// Headline metric for a series: latest value and its change on the
/// previous year.
#[derive(Debug, Clone, PartialEq)]
pub struct Kpi {
    pub value: String,
    /// Year-over-year change in percent; `None` without a usable prior year.
    pub delta_pct: Option<f64>,
    pub year: Option<i32>,
}

impl Kpi {
    pub fn unavailable() -> Self {
        Self {
            value: "N/A".to_string(),
            delta_pct: None,
            year: None,
        }
    }

    pub fn delta_text(&self) -> String {
        match self.delta_pct {
            Some(d) => format!("{d:+.2}% YoY"),
            None => "N/A".to_string(),
        }
    }
}

pub fn kpi(observations: &[Observation], unit: Unit) -> Kpi {
    let Some((latest, previous)) = last_two(observations) else {
        return Kpi::unavailable();
    };

    let delta_pct = previous
        .filter(|p| p.value != 0.0)
        .map(|p| (latest.value - p.value) / p.value * 100.0);

    Kpi {
        value: format_value(latest.value, unit),
        delta_pct,
        year: Some(latest.year),
    }
}

/// `$1.23 T`, `$374.70 B`, `$12,345`, `61.40%`, `123.45`.
pub fn format_value(value: f64, unit: Unit) -> String {
    match unit {
        Unit::Currency => {
            if value >= 1e12 {
                format!("${} T", group_thousands(value / 1e12, 2))
            } else if value >= 1e9 {
                format!("${} B", group_thousands(value / 1e9, 2))
            } else {
                format!("${}", group_thousands(value, 0))
            }
        }
        Unit::Percent => format!("{}%", group_thousands(value, 2)),
        Unit::Index => group_thousands(value, 2),
    }
}

/// Fixed-point formatting with `,` between thousands.
pub fn group_thousands(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && text.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_scales_to_billions_and_trillions() {
        assert_eq!(format_value(3.7473e11, Unit::Currency), "$374.73 B");
        assert_eq!(format_value(1.5e12, Unit::Currency), "$1.50 T");
        assert_eq!(format_value(12_345.4, Unit::Currency), "$12,345");
    }

    #[test]
    fn percent_keeps_two_decimals() {
        assert_eq!(format_value(61.4, Unit::Percent), "61.40%");
        assert_eq!(format_value(1234.5, Unit::Index), "1,234.50");
    }

    #[test]
    fn grouping_handles_signs_and_small_numbers() {
        assert_eq!(group_thousands(999.0, 0), "999");
        assert_eq!(group_thousands(1000.0, 0), "1,000");
        assert_eq!(group_thousands(1_234_567.891, 1), "1,234,567.9");
        assert_eq!(group_thousands(-4521.0, 0), "-4,521");
        assert_eq!(group_thousands(-0.001, 2), "0.00");
    }

    #[test]
    fn delta_is_year_over_year() {
        let obs = vec![
            Observation::new(2021, 200.0),
            Observation::new(2022, 250.0),
        ];
        let k = kpi(&obs, Unit::Percent);
        assert_eq!(k.year, Some(2022));
        assert_eq!(k.delta_pct, Some(25.0));
        assert_eq!(k.delta_text(), "+25.00% YoY");
    }

    #[test]
    fn missing_or_zero_previous_has_no_delta() {
        let single = vec![Observation::new(2022, 250.0)];
        assert_eq!(kpi(&single, Unit::Percent).delta_pct, None);

        let zero_prev = vec![Observation::new(2021, 0.0), Observation::new(2022, 5.0)];
        assert_eq!(kpi(&zero_prev, Unit::Percent).delta_pct, None);

        assert_eq!(kpi(&[], Unit::Currency), Kpi::unavailable());
    }
}
