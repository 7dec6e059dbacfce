use std::path::Path;

use serde_json::{Map, Value as JsonValue};

use crate::data::loader::year_of_date;
use crate::error::{DashboardError, Result};

use super::{ChartDescription, Layout, Trace, TraceKind};

// ---------------------------------------------------------------------------
// Pre-computed chart payloads
// ---------------------------------------------------------------------------

/// Load a chart description written by an offline process.
///
/// Accepted layouts:
/// * the native [`ChartDescription`] JSON (has a `traces` key)
/// * a plotly figure: `{ "data": [ {x, y, type, name, ...} ], "layout": {...} }`
pub fn load_chart(path: &Path) -> Result<ChartDescription> {
    let text = std::fs::read_to_string(path).map_err(|e| DashboardError::from_io(path, e))?;
    let root: JsonValue =
        serde_json::from_str(&text).map_err(|e| DashboardError::malformed(path, e))?;

    let chart = parse_chart(root).map_err(|reason| DashboardError::malformed(path, reason))?;
    log::info!("Loaded saved chart '{}' from {}", chart.title, path.display());
    Ok(chart)
}

pub fn parse_chart(root: JsonValue) -> std::result::Result<ChartDescription, String> {
    let obj = root.as_object().ok_or("expected a JSON object")?;
    if obj.contains_key("traces") {
        serde_json::from_value(root).map_err(|e| e.to_string())
    } else if obj.contains_key("data") {
        from_plotly(obj)
    } else {
        Err("neither `traces` nor `data` present".to_string())
    }
}

fn from_plotly(figure: &Map<String, JsonValue>) -> std::result::Result<ChartDescription, String> {
    let data = figure
        .get("data")
        .and_then(JsonValue::as_array)
        .ok_or("`data` is not an array")?;
    let layout = figure.get("layout").and_then(JsonValue::as_object);

    let mut out_layout = Layout::default();
    let mut title = String::new();
    if let Some(layout) = layout {
        title = title_text(layout.get("title")).unwrap_or_default();
        if let Some(t) = axis_title(layout, "xaxis") {
            out_layout.x_title = t;
        }
        if let Some(t) = axis_title(layout, "yaxis") {
            out_layout.y_title = t;
        }
        if let Some(h) = layout.get("height").and_then(JsonValue::as_f64) {
            out_layout.height = h as f32;
        }
    }

    let mut traces = Vec::with_capacity(data.len());
    for (i, item) in data.iter().enumerate() {
        let item = item
            .as_object()
            .ok_or_else(|| format!("trace {i} is not an object"))?;
        let trace = plotly_trace(item, i)?;
        if trace.kind == TraceKind::Donut {
            out_layout.hole = item.get("hole").and_then(JsonValue::as_f64);
            out_layout.x_title.clear();
        }
        traces.push(trace);
    }

    let no_data = traces.iter().all(|t| t.y.iter().all(Option::is_none));
    Ok(ChartDescription {
        title,
        traces,
        layout: out_layout,
        no_data,
        notice: None,
    })
}

fn plotly_trace(item: &Map<String, JsonValue>, index: usize) -> std::result::Result<Trace, String> {
    let kind_tag = item.get("type").and_then(JsonValue::as_str).unwrap_or("scatter");
    let name = item
        .get("name")
        .and_then(JsonValue::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("trace {index}"));
    let fill = item.get("fill").and_then(JsonValue::as_str);

    if kind_tag == "pie" {
        let values = number_array(item.get("values"));
        let mut trace = Trace::new(name, TraceKind::Donut)
            .with_points((0..values.len()).map(|i| i as f64).collect(), values);
        trace.labels = item
            .get("labels")
            .and_then(JsonValue::as_array)
            .map(|arr| arr.iter().map(label_text).collect())
            .unwrap_or_default();
        return Ok(trace);
    }

    let kind = match (kind_tag, fill) {
        ("bar", _) if item.get("orientation").and_then(JsonValue::as_str) == Some("h") => {
            TraceKind::HorizontalBar
        }
        ("bar", _) => TraceKind::Bar,
        ("histogram", _) => TraceKind::Histogram,
        (_, Some("toself")) => TraceKind::Band,
        (_, Some("tozeroy")) | (_, Some("tonexty")) => TraceKind::Area,
        ("scatter", _) | ("scattergl", _) => TraceKind::Line,
        (other, _) => return Err(format!("trace {index}: unsupported type `{other}`")),
    };

    let x: Vec<f64> = item
        .get("x")
        .and_then(JsonValue::as_array)
        .map(|arr| arr.iter().map(x_value).collect::<Option<Vec<_>>>())
        .unwrap_or(Some(Vec::new()))
        .ok_or_else(|| format!("trace {index}: unreadable x values"))?;
    let y = number_array(item.get("y"));
    if x.len() != y.len() {
        return Err(format!(
            "trace {index}: x has {} values but y has {}",
            x.len(),
            y.len()
        ));
    }

    let line = item.get("line").and_then(JsonValue::as_object);
    let color = line
        .and_then(|l| l.get("color"))
        .or_else(|| item.get("marker").and_then(|m| m.get("color")))
        .or_else(|| item.get("fillcolor"))
        .and_then(JsonValue::as_str);
    let dashed = line
        .and_then(|l| l.get("dash"))
        .and_then(JsonValue::as_str)
        .is_some_and(|d| d != "solid");

    let mut trace = if kind == TraceKind::Band {
        band_from_polygon(&name, &x, &y)
    } else {
        Trace::new(name, kind).with_points(x, y)
    };
    trace.color = color.map(str::to_string);
    trace.dashed = dashed;
    Ok(trace)
}

/// Plotly draws a band as one closed polygon: upper edge forward, lower
/// edge backward. Split it back into `y` / `y_lower`.
fn band_from_polygon(name: &str, x: &[f64], y: &[Option<f64>]) -> Trace {
    let half = x.len() / 2;
    let upper_x = x[..half].to_vec();
    let upper_y = y[..half].to_vec();
    let lower: Vec<f64> = y[half..half * 2]
        .iter()
        .rev()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    let mut trace = Trace::new(name, TraceKind::Band).with_points(upper_x, upper_y);
    trace.y_lower = Some(lower);
    trace
}

fn title_text(value: Option<&JsonValue>) -> Option<String> {
    match value? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Object(o) => o.get("text").and_then(JsonValue::as_str).map(str::to_string),
        _ => None,
    }
}

fn axis_title(layout: &Map<String, JsonValue>, axis: &str) -> Option<String> {
    title_text(layout.get(axis)?.get("title"))
}

/// Numbers pass through; `null` and anything non-numeric become gaps.
fn number_array(value: Option<&JsonValue>) -> Vec<Option<f64>> {
    value
        .and_then(JsonValue::as_array)
        .map(|arr| arr.iter().map(JsonValue::as_f64).collect())
        .unwrap_or_default()
}

/// X values may be numbers or date strings; dates collapse to their year.
fn x_value(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => year_of_date(s).map(f64::from),
        _ => None,
    }
}

fn label_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn plotly_figure_is_converted() {
        let figure = json!({
            "data": [
                {"type": "scatter", "name": "Exports", "x": ["2024-01-01", "2025-01-01"],
                 "y": [30.1, null], "line": {"color": "#ff7f0e", "dash": "dash"}},
                {"type": "scatter", "name": "Band", "fill": "toself",
                 "x": [2024, 2025, 2025, 2024], "y": [33.0, 35.0, 31.0, 29.0]}
            ],
            "layout": {"title": {"text": "Export Forecast"}, "yaxis": {"title": {"text": "Million USD"}}}
        });

        let chart = parse_chart(figure).unwrap();
        assert_eq!(chart.title, "Export Forecast");
        assert_eq!(chart.layout.y_title, "Million USD");
        assert_eq!(chart.traces[0].x, vec![2024.0, 2025.0]);
        assert_eq!(chart.traces[0].y, vec![Some(30.1), None]);
        assert!(chart.traces[0].dashed);
        assert_eq!(chart.traces[0].color.as_deref(), Some("#ff7f0e"));

        let band = &chart.traces[1];
        assert_eq!(band.kind, TraceKind::Band);
        assert_eq!(band.x, vec![2024.0, 2025.0]);
        assert_eq!(band.y_lower, Some(vec![29.0, 31.0]));
    }

    #[test]
    fn pie_becomes_donut() {
        let figure = json!({
            "data": [{"type": "pie", "labels": ["Services", "Industry"], "values": [60, 40], "hole": 0.4}]
        });
        let chart = parse_chart(figure).unwrap();
        assert_eq!(chart.traces[0].kind, TraceKind::Donut);
        assert_eq!(chart.traces[0].labels, vec!["Services", "Industry"]);
        assert_eq!(chart.layout.hole, Some(0.4));
    }

    #[test]
    fn native_description_round_trips() {
        let chart = ChartDescription::no_data("Exports");
        let value = serde_json::to_value(&chart).unwrap();
        assert_eq!(parse_chart(value).unwrap(), chart);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let figure = json!({"data": [{"x": [1, 2, 3], "y": [1]}]});
        assert!(parse_chart(figure).is_err());
        assert!(parse_chart(json!([1, 2])).is_err());
        assert!(parse_chart(json!({"layout": {}})).is_err());
    }

    #[test]
    fn missing_and_corrupt_files_map_to_taxonomy() {
        let dir = tempfile::tempdir().unwrap();
        let missing = load_chart(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(missing, DashboardError::DataSourceMissing { .. }));

        let corrupt = dir.path().join("bad.json");
        std::fs::write(&corrupt, "{ \"data\": [").unwrap();
        assert!(matches!(
            load_chart(&corrupt).unwrap_err(),
            DashboardError::MalformedSource { .. }
        ));
    }
}
