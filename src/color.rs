use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::charts::Trace;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Chart colours
// ---------------------------------------------------------------------------

/// `#rrggbb` or `#rgb` (leading `#` optional). Anything else is `None`.
pub fn parse_hex(text: &str) -> Option<Color32> {
    let hex = text.trim().trim_start_matches('#');
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some(Color32::from_rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        3 => {
            // #abc is #aabbcc
            let mut rgb = [0u8; 3];
            for (slot, i) in rgb.iter_mut().zip(0..3) {
                *slot = channel(&hex[i..i + 1])? * 17;
            }
            Some(Color32::from_rgb(rgb[0], rgb[1], rgb[2]))
        }
        _ => None,
    }
}

/// Colour of trace `index` out of `n`: its own colour when it names a valid
/// one, otherwise a slot of the generated palette.
pub fn trace_color(trace: &Trace, index: usize, n: usize) -> Color32 {
    trace
        .color
        .as_deref()
        .and_then(parse_hex)
        .unwrap_or_else(|| palette_slot(index, n))
}

/// Colours for the slices of a donut trace.
pub fn slice_colors(trace: &Trace) -> Vec<Color32> {
    let n = trace.y.len();
    (0..n)
        .map(|i| {
            trace
                .palette
                .get(i)
                .and_then(|c| parse_hex(c))
                .unwrap_or_else(|| palette_slot(i, n))
        })
        .collect()
}

fn palette_slot(index: usize, n: usize) -> Color32 {
    generate_palette(n.max(1))
        .get(index % n.max(1))
        .copied()
        .unwrap_or(Color32::GRAY)
}
