use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

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
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Categorical mapping: label → Color32
// ---------------------------------------------------------------------------

/// Maps category labels (developers) to distinct colours.
#[derive(Debug, Clone)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl CategoryColors {
    /// Build a colour map for the given labels. Duplicates share a colour.
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        // Palette slot per label, in first-seen order.
        let mut slots: BTreeMap<String, usize> = BTreeMap::new();
        for label in labels {
            if !slots.contains_key(label) {
                let slot = slots.len();
                slots.insert(label.to_string(), slot);
            }
        }
        let palette = generate_palette(slots.len());
        let mapping = slots
            .into_iter()
            .map(|(label, slot)| (label, palette[slot]))
            .collect();

        CategoryColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Continuous scales
// ---------------------------------------------------------------------------

/// Named sequential/diverging colour scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuousScale {
    Viridis,
    Plasma,
    RdBu,
}

impl ContinuousScale {
    fn stops(self) -> &'static [(u8, u8, u8)] {
        match self {
            ContinuousScale::Viridis => &[
                (68, 1, 84),
                (72, 40, 120),
                (62, 74, 137),
                (49, 104, 142),
                (38, 130, 142),
                (31, 158, 137),
                (53, 183, 121),
                (110, 206, 88),
                (181, 222, 43),
                (253, 231, 37),
            ],
            ContinuousScale::Plasma => &[
                (13, 8, 135),
                (70, 3, 159),
                (114, 1, 168),
                (156, 23, 158),
                (189, 55, 134),
                (216, 87, 107),
                (237, 121, 83),
                (251, 159, 58),
                (253, 202, 38),
                (240, 249, 33),
            ],
            ContinuousScale::RdBu => &[
                (103, 0, 31),
                (178, 24, 43),
                (214, 96, 77),
                (244, 165, 130),
                (253, 219, 199),
                (247, 247, 247),
                (209, 229, 240),
                (146, 197, 222),
                (67, 147, 195),
                (33, 102, 172),
                (5, 48, 97),
            ],
        }
    }

    /// Colour at position `t` in `[0, 1]` (clamped), interpolated in linear RGB.
    pub fn sample(self, t: f64) -> Color32 {
        let stops = self.stops();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let scaled = t as f32 * (stops.len() - 1) as f32;
        let lower = (scaled.floor() as usize).min(stops.len() - 1);
        let upper = (lower + 1).min(stops.len() - 1);
        let frac = scaled - lower as f32;

        let lin = |(r, g, b): (u8, u8, u8)| -> LinSrgb {
            Srgb::new(r, g, b).into_format::<f32>().into_linear()
        };
        let mixed = lin(stops[lower]).mix(lin(stops[upper]), frac);
        to_color32(Srgb::from_linear(mixed))
    }
}

/// Maps a numeric range onto a [`ContinuousScale`].
#[derive(Debug, Clone, Copy)]
pub struct ContinuousColors {
    pub scale: ContinuousScale,
    pub min: f64,
    pub max: f64,
}

impl ContinuousColors {
    pub fn new(scale: ContinuousScale, range: Option<(f64, f64)>) -> Self {
        let (min, max) = range.unwrap_or((0.0, 1.0));
        ContinuousColors { scale, min, max }
    }

    /// Colour for a value; unknown values are grey.
    pub fn color_for(&self, value: Option<f64>) -> Color32 {
        match value {
            Some(v) => self.scale.sample(self.position(v)),
            None => Color32::GRAY,
        }
    }

    fn position(&self, v: f64) -> f64 {
        let span = self.max - self.min;
        if span.abs() < f64::EPSILON {
            0.5
        } else {
            (v - self.min) / span
        }
    }
}
