use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::TRACE_COUNT;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues,
/// starting at `hue_offset` degrees.
pub fn generate_palette(n: usize, hue_offset: f32) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = hue_offset + (i as f32 / n as f32) * 360.0;
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
// Trace / marker colours
// ---------------------------------------------------------------------------

/// Fixed colour per trace slot, shared by the trace icon and the plot line.
#[derive(Debug, Clone)]
pub struct TraceColors {
    traces: Vec<Color32>,
}

impl Default for TraceColors {
    fn default() -> Self {
        // Yellow first, like a bench analyzer's primary trace.
        Self {
            traces: generate_palette(TRACE_COUNT, 55.0),
        }
    }
}

impl TraceColors {
    pub fn trace(&self, index: usize) -> Color32 {
        self.traces
            .get(index)
            .copied()
            .unwrap_or(Color32::LIGHT_BLUE)
    }

    /// Marker glyph colour; the selected marker is drawn brighter.
    pub fn marker(&self, selected: bool) -> Color32 {
        if selected {
            Color32::WHITE
        } else {
            Color32::LIGHT_GRAY
        }
    }
}
