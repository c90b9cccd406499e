//! Analysis parameters and view options, with their fixed option lists.

use serde::{Deserialize, Serialize};

use crate::colormap::ColormapName;
use crate::error::ParamError;

pub const NYQUIST_OPTIONS_HZ: &[u32] = &[4_000, 8_000, 11_025, 16_000, 22_050, 24_000, 48_000, 96_000];

/// Powers of two from 1 to 131072.
pub const FFT_SIZES: [usize; 18] = {
    let mut sizes = [0usize; 18];
    let mut i = 0;
    while i < 18 {
        sizes[i] = 1 << i;
        i += 1;
    }
    sizes
};

pub const MAX_DISPLAY_OPTIONS_HZ: &[u32] = &[1_000, 2_000, 4_000, 8_000, 12_000, 16_000, 20_000, 24_000, 48_000];

pub const ZOOM_MIN: f64 = 1.0;
pub const ZOOM_MAX: f64 = 30_000.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyScale {
    #[default]
    Linear,
    Mel,
}

impl FrequencyScale {
    pub const ALL: [FrequencyScale; 2] = [FrequencyScale::Linear, FrequencyScale::Mel];

    pub fn as_str(self) -> &'static str {
        match self {
            FrequencyScale::Linear => "linear",
            FrequencyScale::Mel => "mel",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|scale| scale.as_str() == s)
    }
}

/// Parameters baked into a visualization session. Changing any field
/// rebuilds the session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParameters {
    pub nyquist_hz: u32,
    pub fft_size: usize,
    /// Upper bound of the spectrogram's frequency axis; `None` shows up to nyquist.
    pub max_display_hz: Option<u32>,
    pub frequency_scale: FrequencyScale,
    pub colormap: ColormapName,
}

impl Default for AnalysisParameters {
    fn default() -> Self {
        Self {
            nyquist_hz: 22_050,
            fft_size: 256,
            max_display_hz: None,
            frequency_scale: FrequencyScale::Linear,
            colormap: ColormapName::Plasma,
        }
    }
}

impl AnalysisParameters {
    pub fn validate(&self) -> Result<(), ParamError> {
        if !NYQUIST_OPTIONS_HZ.contains(&self.nyquist_hz) {
            return Err(ParamError::Nyquist(self.nyquist_hz));
        }
        if !FFT_SIZES.contains(&self.fft_size) {
            return Err(ParamError::FftSize(self.fft_size));
        }
        if let Some(max) = self.max_display_hz {
            if max >= self.nyquist_hz {
                return Err(ParamError::MaxFrequency { max, nyquist: self.nyquist_hz });
            }
        }
        Ok(())
    }

    /// Sample rate the engine decodes at.
    pub fn sample_rate(&self) -> u32 {
        self.nyquist_hz * 2
    }

    /// Top of the displayed frequency range.
    pub fn display_max_hz(&self) -> u32 {
        self.max_display_hz.unwrap_or(self.nyquist_hz)
    }

    /// Display options below the given nyquist frequency.
    pub fn max_display_options(nyquist_hz: u32) -> impl Iterator<Item = u32> {
        MAX_DISPLAY_OPTIONS_HZ.iter().copied().filter(move |&hz| hz < nyquist_hz)
    }

    /// Change nyquist, dropping a max display frequency that would no longer fit.
    pub fn with_nyquist(mut self, nyquist_hz: u32) -> Self {
        self.nyquist_hz = nyquist_hz;
        if self.max_display_hz.is_some_and(|max| max >= nyquist_hz) {
            self.max_display_hz = None;
        }
        self
    }
}

/// View-only options applied to a live session without rebuilding it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    /// Horizontal zoom in pixels per second.
    pub zoom_px_per_sec: f64,
    /// Height of each waveform channel row.
    pub height_px: u32,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self { zoom_px_per_sec: ZOOM_MIN, height_px: 128 }
    }
}

impl ViewOptions {
    pub fn validate(&self) -> Result<(), ParamError> {
        if !(ZOOM_MIN..=ZOOM_MAX).contains(&self.zoom_px_per_sec) {
            return Err(ParamError::Zoom(self.zoom_px_per_sec));
        }
        Ok(())
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom_px_per_sec = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = AnalysisParameters::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.fft_size, FFT_SIZES[8]);
        assert_eq!(params.sample_rate(), 44_100);
        assert_eq!(params.display_max_hz(), 22_050);
        assert!(ViewOptions::default().validate().is_ok());
    }

    #[test]
    fn test_fft_sizes_are_powers_of_two() {
        assert_eq!(FFT_SIZES[0], 1);
        assert_eq!(FFT_SIZES[17], 131_072);
        assert!(FFT_SIZES.iter().all(|n| n.is_power_of_two()));
    }

    #[test]
    fn test_validate_rejects_off_list_values() {
        let base = AnalysisParameters::default();
        let bad_fft = AnalysisParameters { fft_size: 300, ..base.clone() };
        assert_eq!(bad_fft.validate(), Err(ParamError::FftSize(300)));

        let bad_nyquist = AnalysisParameters { nyquist_hz: 0, ..base.clone() };
        assert_eq!(bad_nyquist.validate(), Err(ParamError::Nyquist(0)));

        let too_high = AnalysisParameters { max_display_hz: Some(22_050), ..base };
        assert_eq!(
            too_high.validate(),
            Err(ParamError::MaxFrequency { max: 22_050, nyquist: 22_050 })
        );
    }

    #[test]
    fn test_with_nyquist_drops_stale_max() {
        let params = AnalysisParameters { max_display_hz: Some(12_000), ..Default::default() };
        assert_eq!(params.clone().with_nyquist(48_000).max_display_hz, Some(12_000));
        assert_eq!(params.with_nyquist(8_000).max_display_hz, None);
    }

    #[test]
    fn test_max_display_options_below_nyquist() {
        let opts: Vec<u32> = AnalysisParameters::max_display_options(11_025).collect();
        assert_eq!(opts, vec![1_000, 2_000, 4_000, 8_000]);
    }

    #[test]
    fn test_zoom_clamped() {
        let view = ViewOptions::default().with_zoom(1e9);
        assert_eq!(view.zoom_px_per_sec, ZOOM_MAX);
        assert_eq!(ViewOptions { zoom_px_per_sec: 0.5, height_px: 10 }.validate(), Err(ParamError::Zoom(0.5)));
    }

    #[test]
    fn test_view_options_from_json() {
        let view: ViewOptions = serde_json::from_str(r#"{"height_px": 300}"#).unwrap();
        assert_eq!(view.height_px, 300);
        assert_eq!(view.zoom_px_per_sec, ViewOptions::default().zoom_px_per_sec);
        assert!(view.validate().is_ok());

        let bad: ViewOptions = serde_json::from_str(r#"{"zoom_px_per_sec": 0.5}"#).unwrap();
        assert_eq!(bad.validate(), Err(ParamError::Zoom(0.5)));
    }

    #[test]
    fn test_params_from_json() {
        let params: AnalysisParameters =
            serde_json::from_str(r#"{"fft_size": 1024, "frequency_scale": "mel", "colormap": "viridis"}"#)
                .unwrap();
        assert_eq!(params.fft_size, 1024);
        assert_eq!(params.frequency_scale, FrequencyScale::Mel);
        assert_eq!(params.colormap, ColormapName::Viridis);
        assert_eq!(params.nyquist_hz, 22_050);
    }
}
