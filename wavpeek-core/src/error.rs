//! Error types for wavpeek-core.

use thiserror::Error;

/// A checked little-endian read that would run past the end of the buffer.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("read of {width} bytes at offset {offset} exceeds buffer of {len} bytes")]
pub struct ReadError {
    pub offset: usize,
    pub width: usize,
    pub len: usize,
}

/// Why a byte window was not recognized as a RIFF/WAVE header.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("not a RIFF container")]
    NotRiff,

    #[error("RIFF form type is not WAVE")]
    NotWave,

    #[error("no fmt chunk within the first {window} bytes")]
    MissingFmt { window: usize },

    #[error("no data chunk within the first {window} bytes")]
    MissingData { window: usize },

    #[error("fmt chunk declares {declared} bytes, needs at least 16")]
    TruncatedFmt { declared: u32 },

    #[error("fmt field {field} is negative ({value})")]
    NegativeField { field: &'static str, value: i16 },

    #[error("block align is zero")]
    ZeroBlockAlign,

    #[error("average byte rate is zero")]
    ZeroByteRate,
}

/// Analysis parameters outside the fixed allow-lists.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("nyquist frequency {0} Hz is not an available option")]
    Nyquist(u32),

    #[error("FFT size {0} is not an available option")]
    FftSize(usize),

    #[error("max display frequency {max} Hz must be below nyquist {nyquist} Hz")]
    MaxFrequency { max: u32, nyquist: u32 },

    #[error("zoom {0} px/s is out of range")]
    Zoom(f64),
}

/// Malformed `data:` URI.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlobError {
    #[error("missing data: scheme")]
    MissingScheme,

    #[error("missing ',' separating header from payload")]
    MissingPayload,

    #[error("payload is not base64-encoded")]
    NotBase64,

    #[error("empty payload")]
    Empty,
}

/// Failure reported by the external visualization engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("session construction failed: {0}")]
    Create(String),

    #[error("blob load failed: {0}")]
    Load(String),
}
