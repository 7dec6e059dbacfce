use std::f64::consts::TAU;

use eframe::egui::{self, Color32, RichText, Stroke, Ui, Vec2b};
use egui_plot::{Bar, BarChart, Legend, Line, LineStyle, Plot, PlotPoint, PlotPoints, PlotUi, Polygon, Text, VLine};

use crate::charts::{ChartDescription, Trace, TraceKind, YAxis};
use crate::color::{slice_colors, trace_color};

const SECONDARY_HEIGHT_SHARE: f32 = 0.4;
const BAND_ALPHA: u8 = 40;
/// Degrees per donut segment; each segment must stay convex.
const DONUT_STEP_DEG: f64 = 3.0;

// ---------------------------------------------------------------------------
// Chart widget
// ---------------------------------------------------------------------------

/// Draw one chart description. `id` must be unique on the page.
pub fn chart(ui: &mut Ui, id: &str, chart: &ChartDescription) {
    ui.strong(&chart.title);
    if let Some(notice) = &chart.notice {
        ui.label(RichText::new(notice).italics().color(Color32::GRAY));
    }

    if chart.no_data {
        placeholder(ui, chart.layout.height);
        return;
    }

    if chart.traces.iter().any(|t| t.kind == TraceKind::Donut) {
        donut(ui, id, chart);
    } else if chart.has_secondary_axis() {
        // egui_plot has a single y axis: draw the secondary traces in a
        // second plot sharing the x axis.
        let primary_height = chart.layout.height * (1.0 - SECONDARY_HEIGHT_SHARE);
        let link = egui::Id::new(id).with("x_link");
        xy_plot(ui, id, chart, YAxis::Primary, primary_height, Some(link));
        let secondary_height = chart.layout.height * SECONDARY_HEIGHT_SHARE;
        xy_plot(ui, &format!("{id}_y2"), chart, YAxis::Secondary, secondary_height, Some(link));
    } else {
        xy_plot(ui, id, chart, YAxis::Primary, chart.layout.height, None);
    }
}

fn placeholder(ui: &mut Ui, height: f32) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(ui.available_width(), height * 0.5), egui::Sense::hover());
    ui.painter().rect_stroke(
        rect,
        4.0,
        Stroke::new(1.0, Color32::DARK_GRAY),
        egui::StrokeKind::Inside,
    );
    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        "No Data Available",
        egui::FontId::proportional(16.0),
        Color32::GRAY,
    );
}

fn xy_plot(
    ui: &mut Ui,
    id: &str,
    chart: &ChartDescription,
    axis: YAxis,
    height: f32,
    link: Option<egui::Id>,
) {
    let layout = &chart.layout;
    let y_title = match axis {
        YAxis::Primary => layout.y_title.clone(),
        YAxis::Secondary => layout.y2_title.clone().unwrap_or_default(),
    };

    let mut plot = Plot::new(id)
        .height(height)
        .legend(Legend::default())
        .x_axis_label(layout.x_title.clone())
        .y_axis_label(y_title)
        .allow_scroll(false);
    if let Some(group) = link {
        plot = plot.link_axis(group, Vec2b::new(true, false));
    }
    if axis == YAxis::Secondary {
        if let Some([lo, hi]) = layout.y2_range {
            plot = plot.include_y(lo).include_y(hi);
        }
    }

    let n = chart.traces.len();
    plot.show(ui, |plot_ui| {
        for (i, trace) in chart.traces.iter().enumerate() {
            if trace.axis != axis {
                continue;
            }
            draw_trace(plot_ui, trace, trace_color(trace, i, n), layout.bar_width);
        }
        if axis == YAxis::Primary {
            if let Some(x) = layout.vertical_marker {
                plot_ui.vline(
                    VLine::new(x)
                        .color(Color32::GRAY)
                        .style(LineStyle::dashed_loose()),
                );
            }
        }
    });
}

fn draw_trace(plot_ui: &mut PlotUi, trace: &Trace, color: Color32, bar_width: Option<f64>) {
    match trace.kind {
        TraceKind::Line | TraceKind::Area => {
            // one line per run so gaps stay visible; only the first run
            // carries the legend entry
            for (run, points) in trace.segments().into_iter().enumerate() {
                let mut line = Line::new(PlotPoints::from(points)).color(color).width(2.0);
                if run == 0 {
                    line = line.name(&trace.name);
                }
                if trace.dashed {
                    line = line.style(LineStyle::dashed_loose());
                }
                if trace.kind == TraceKind::Area {
                    line = line.fill(0.0);
                }
                plot_ui.line(line);
            }
        }
        TraceKind::Bar | TraceKind::Histogram | TraceKind::HorizontalBar => {
            let width = bar_width.unwrap_or(0.8);
            let bars: Vec<Bar> = trace
                .points()
                .into_iter()
                .map(|[x, y]| Bar::new(x, y).width(width).fill(color))
                .collect();
            let mut chart = BarChart::new(bars).name(&trace.name).color(color);
            if trace.kind == TraceKind::HorizontalBar {
                chart = chart.horizontal();
            }
            plot_ui.bar_chart(chart);
        }
        TraceKind::Band => {
            let Some(lower) = &trace.y_lower else {
                return;
            };
            let fill = Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), BAND_ALPHA);
            for (k, quad) in band_quads(&trace.x, &trace.y, lower).into_iter().enumerate() {
                let mut poly = Polygon::new(PlotPoints::from(quad))
                    .fill_color(fill)
                    .stroke(Stroke::NONE);
                if k == 0 {
                    poly = poly.name(&trace.name);
                }
                plot_ui.polygon(poly);
            }
        }
        // donuts are drawn by `donut`
        TraceKind::Donut => {}
    }
}

/// The band between `lower` and `upper` as one quad per pair of adjacent
/// x values. Polygons are filled as convex shapes, and a widening band is
/// not convex as a whole. Pairs with a missing bound are skipped.
pub fn band_quads(x: &[f64], upper: &[Option<f64>], lower: &[f64]) -> Vec<Vec<[f64; 2]>> {
    let edge = |i: usize| -> Option<(f64, f64, f64)> {
        let hi = (*upper.get(i)?)?;
        let lo = *lower.get(i)?;
        (hi.is_finite() && lo.is_finite()).then_some((x[i], hi, lo))
    };
    (1..x.len())
        .filter_map(|i| {
            let (x0, hi0, lo0) = edge(i - 1)?;
            let (x1, hi1, lo1) = edge(i)?;
            Some(vec![[x0, hi0], [x1, hi1], [x1, lo1], [x0, lo0]])
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Donut
// ---------------------------------------------------------------------------

/// Ring segments from `start` to `end` (radians, clockwise from 12 o'clock),
/// each a convex quad.
pub fn ring_segments(start: f64, end: f64, inner: f64, outer: f64) -> Vec<Vec<[f64; 2]>> {
    let sweep = end - start;
    if sweep <= 0.0 {
        return Vec::new();
    }
    let count = (sweep / DONUT_STEP_DEG.to_radians() - 1e-9).ceil().max(1.0) as usize;
    let angle = |k: usize| start + sweep * k as f64 / count as f64;
    let at = |angle: f64, r: f64| [r * angle.sin(), r * angle.cos()];
    (0..count)
        .map(|k| {
            let (a0, a1) = (angle(k), angle(k + 1));
            vec![at(a0, outer), at(a1, outer), at(a1, inner), at(a0, inner)]
        })
        .collect()
}

fn donut(ui: &mut Ui, id: &str, chart: &ChartDescription) {
    let hole = chart.layout.hole.unwrap_or(0.0).clamp(0.0, 0.95);
    Plot::new(id)
        .height(chart.layout.height)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            for trace in chart.traces.iter().filter(|t| t.kind == TraceKind::Donut) {
                let values: Vec<f64> = trace.y.iter().map(|v| v.unwrap_or(0.0).max(0.0)).collect();
                let total: f64 = values.iter().sum();
                if total <= 0.0 {
                    continue;
                }
                let colors = slice_colors(trace);
                let mut angle = 0.0;
                for (i, value) in values.iter().enumerate() {
                    let sweep = value / total * TAU;
                    let label = trace.labels.get(i).cloned().unwrap_or_else(|| format!("slice {i}"));
                    for (k, quad) in ring_segments(angle, angle + sweep, hole, 1.0).into_iter().enumerate() {
                        let mut poly = Polygon::new(PlotPoints::from(quad))
                            .fill_color(colors[i])
                            .stroke(Stroke::new(0.5, colors[i]));
                        if k == 0 {
                            poly = poly.name(&label);
                        }
                        plot_ui.polygon(poly);
                    }
                    if *value > 0.0 {
                        let mid = angle + sweep / 2.0;
                        let r = (1.0 + hole) / 2.0;
                        plot_ui.text(Text::new(
                            PlotPoint::new(r * mid.sin(), r * mid.cos()),
                            RichText::new(format!("{:.1}%", value / total * 100.0)).strong(),
                        ));
                    }
                    angle += sweep;
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_ring_is_split_into_small_quads() {
        let quads = ring_segments(0.0, TAU / 4.0, 0.4, 1.0);
        assert_eq!(quads.len(), 30);
        let first = &quads[0];
        // starts at 12 o'clock on the outer edge
        assert!((first[0][0]).abs() < 1e-12);
        assert!((first[0][1] - 1.0).abs() < 1e-12);
        // inner edge at the hole radius
        let [x, y] = first[3];
        assert!(((x * x + y * y).sqrt() - 0.4).abs() < 1e-12);
        // last quad ends exactly at 3 o'clock
        let last = quads.last().unwrap();
        assert!((last[1][0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn band_is_one_quad_per_year_pair() {
        let x = [2026.0, 2027.0, 2028.0, 2029.0];
        let upper = [Some(105.0), Some(126.0), None, Some(180.0)];
        let lower = [95.0, 114.0, 130.0, 160.0];
        let quads = band_quads(&x, &upper, &lower);
        // the missing upper bound at 2028 removes both pairs touching it
        assert_eq!(quads.len(), 1);
        assert_eq!(
            quads[0],
            vec![[2026.0, 105.0], [2027.0, 126.0], [2027.0, 114.0], [2026.0, 95.0]]
        );
        assert!(band_quads(&x[..1], &upper[..1], &lower[..1]).is_empty());
    }

    #[test]
    fn empty_sweep_has_no_segments() {
        assert!(ring_segments(1.0, 1.0, 0.4, 1.0).is_empty());
    }
}
