use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues,
/// saturated enough to read on a dark background.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Genre → Color32
// ---------------------------------------------------------------------------

/// Maps every genre of the loaded dataset to a distinct colour.
///
/// Built from the full dataset, not the filtered view, so a genre keeps its
/// colour while the selection changes.
#[derive(Debug, Clone)]
pub struct GenreColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl Default for GenreColors {
    fn default() -> Self {
        GenreColors {
            mapping: BTreeMap::new(),
            default_color: Color32::GRAY,
        }
    }
}

impl GenreColors {
    pub fn new(genres: &BTreeSet<String>) -> Self {
        let palette = generate_palette(genres.len());
        let mapping = genres.iter().cloned().zip(palette).collect();
        GenreColors {
            mapping,
            ..Default::default()
        }
    }

    /// Look up the colour for a genre.
    pub fn color_for(&self, genre: &str) -> Color32 {
        self.mapping
            .get(genre)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Diverging scale for the correlation heatmap
// ---------------------------------------------------------------------------

const NEGATIVE: (f32, f32, f32) = (0.020, 0.188, 0.380);
const NEUTRAL: (f32, f32, f32) = (0.969, 0.969, 0.969);
const POSITIVE: (f32, f32, f32) = (0.404, 0.000, 0.122);

/// Blue for -1, near white for 0, red for +1. NaN maps to gray.
pub fn diverging_color(value: f64) -> Color32 {
    if value.is_nan() {
        return Color32::DARK_GRAY;
    }
    let v = value.clamp(-1.0, 1.0) as f32;
    let lin = |(r, g, b): (f32, f32, f32)| -> LinSrgb { Srgb::new(r, g, b).into_linear() };
    let neutral = lin(NEUTRAL);
    let mixed = if v < 0.0 {
        neutral.mix(lin(NEGATIVE), -v)
    } else {
        neutral.mix(lin(POSITIVE), v)
    };
    to_color32(Srgb::from_linear(mixed))
}

/// Readable label colour on top of a [`diverging_color`] cell.
pub fn label_color(value: f64) -> Color32 {
    if value.is_nan() || value.abs() < 0.5 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}
