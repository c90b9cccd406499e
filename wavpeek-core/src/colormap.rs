//! Named spectrogram colormaps.
//!
//! Each map is a handful of RGB control stops; [`ColormapName::shades`]
//! interpolates them into the `[r, g, b, a]` float table the spectrogram
//! plugin consumes (one entry per intensity level).

use serde::{Deserialize, Serialize};

/// Shades handed to the spectrogram plugin.
pub const DEFAULT_SHADES: usize = 256;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColormapName {
    #[default]
    Plasma,
    Viridis,
    Inferno,
    Magma,
    Cividis,
    Greys,
}

type Stop = (f32, [u8; 3]);

const PLASMA: &[Stop] = &[
    (0.0, [13, 8, 135]),
    (0.13, [75, 3, 161]),
    (0.25, [125, 3, 168]),
    (0.38, [168, 34, 150]),
    (0.5, [203, 70, 121]),
    (0.63, [229, 107, 93]),
    (0.75, [248, 148, 65]),
    (0.88, [253, 195, 40]),
    (1.0, [240, 249, 33]),
];

const VIRIDIS: &[Stop] = &[
    (0.0, [68, 1, 84]),
    (0.13, [71, 44, 122]),
    (0.25, [59, 81, 139]),
    (0.38, [44, 113, 142]),
    (0.5, [33, 144, 141]),
    (0.63, [39, 173, 129]),
    (0.75, [92, 200, 99]),
    (0.88, [170, 220, 50]),
    (1.0, [253, 231, 37]),
];

const INFERNO: &[Stop] = &[
    (0.0, [0, 0, 4]),
    (0.13, [31, 12, 72]),
    (0.25, [85, 15, 109]),
    (0.38, [136, 34, 106]),
    (0.5, [186, 54, 85]),
    (0.63, [227, 89, 51]),
    (0.75, [249, 140, 10]),
    (0.88, [249, 201, 50]),
    (1.0, [252, 255, 164]),
];

const MAGMA: &[Stop] = &[
    (0.0, [0, 0, 4]),
    (0.13, [28, 16, 68]),
    (0.25, [79, 18, 123]),
    (0.38, [129, 37, 129]),
    (0.5, [181, 54, 122]),
    (0.63, [229, 80, 100]),
    (0.75, [251, 135, 97]),
    (0.88, [254, 194, 135]),
    (1.0, [252, 253, 191]),
];

const CIVIDIS: &[Stop] = &[
    (0.0, [0, 32, 77]),
    (0.25, [63, 77, 107]),
    (0.5, [124, 123, 120]),
    (0.75, [188, 175, 111]),
    (1.0, [255, 234, 70]),
];

const GREYS: &[Stop] = &[(0.0, [0, 0, 0]), (1.0, [255, 255, 255])];

impl ColormapName {
    pub const ALL: [ColormapName; 6] = [
        ColormapName::Plasma,
        ColormapName::Viridis,
        ColormapName::Inferno,
        ColormapName::Magma,
        ColormapName::Cividis,
        ColormapName::Greys,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColormapName::Plasma => "plasma",
            ColormapName::Viridis => "viridis",
            ColormapName::Inferno => "inferno",
            ColormapName::Magma => "magma",
            ColormapName::Cividis => "cividis",
            ColormapName::Greys => "greys",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|name| name.as_str() == s)
    }

    fn stops(self) -> &'static [Stop] {
        match self {
            ColormapName::Plasma => PLASMA,
            ColormapName::Viridis => VIRIDIS,
            ColormapName::Inferno => INFERNO,
            ColormapName::Magma => MAGMA,
            ColormapName::Cividis => CIVIDIS,
            ColormapName::Greys => GREYS,
        }
    }

    /// Color at position `t` in `[0, 1]` as normalized RGB.
    pub fn sample(self, t: f32) -> [f32; 3] {
        let stops = self.stops();
        let t = t.clamp(0.0, 1.0);
        let upper = stops.iter().position(|&(pos, _)| pos >= t).unwrap_or(stops.len() - 1);
        let (p1, c1) = stops[upper];
        let (p0, c0) = stops[upper.saturating_sub(1)];
        let frac = if p1 > p0 { (t - p0) / (p1 - p0) } else { 0.0 };
        let mut rgb = [0.0f32; 3];
        for (i, out) in rgb.iter_mut().enumerate() {
            let lo = c0[i] as f32;
            let hi = c1[i] as f32;
            *out = (lo + (hi - lo) * frac) / 255.0;
        }
        rgb
    }

    /// Interpolate `n` opaque `[r, g, b, a]` shades from darkest to brightest.
    pub fn shades(self, n: usize) -> Vec<[f32; 4]> {
        (0..n)
            .map(|i| {
                let t = if n > 1 { i as f32 / (n - 1) as f32 } else { 0.0 };
                let [r, g, b] = self.sample(t);
                [r, g, b, 1.0]
            })
            .collect()
    }
}
