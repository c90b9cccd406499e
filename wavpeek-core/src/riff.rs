//! RIFF/WAVE header parsing.
//!
//! Only the leading window of a file is needed: the `fmt ` chunk and the
//! header of the `data` chunk normally sit within the first 44 bytes, and the
//! walk stops as soon as the next chunk header would fall outside the window.
//! Sample data itself is never read.

use std::fmt;

use crate::error::FormatError;
use crate::le_reader::{read_i16_le, read_tag, read_u16_le, read_u32_le};

/// Number of leading bytes decoded and handed to [`WaveFormatInfo::parse`].
pub const HEADER_WINDOW_LEN: usize = 128;

const FMT_MIN_LEN: u32 = 16;

/// Format metadata recovered from a WAVE header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveFormatInfo {
    pub format_tag: u16,
    pub channel_count: u16,
    pub sample_rate: u32,
    pub avg_bytes_per_sec: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// Size of the `data` chunk in bytes.
    pub data_length: u32,
}

/// Raw `WAVEFORMATEX` fields as read, before sign and zero checks.
#[derive(Clone, Copy, Debug)]
struct FmtChunk {
    format_tag: u16,
    channel_count: i16,
    sample_rate: u32,
    avg_bytes_per_sec: u32,
    block_align: i16,
    bits_per_sample: i16,
}

impl FmtChunk {
    fn read(buf: &[u8], body: usize) -> Option<Self> {
        Some(Self {
            format_tag: read_u16_le(buf, body).ok()?,
            channel_count: read_i16_le(buf, body + 2).ok()?,
            sample_rate: read_u32_le(buf, body + 4).ok()?,
            avg_bytes_per_sec: read_u32_le(buf, body + 8).ok()?,
            block_align: read_i16_le(buf, body + 12).ok()?,
            bits_per_sample: read_i16_le(buf, body + 14).ok()?,
        })
    }
}

fn non_negative(field: &'static str, value: i16) -> Result<u16, FormatError> {
    u16::try_from(value).map_err(|_| FormatError::NegativeField { field, value })
}

/// Offset of the chunk following one at `pos` with a body of `size` bytes.
/// Chunk bodies are padded to an even length.
fn next_chunk(pos: usize, size: u32) -> Option<usize> {
    let advance = 8u64 + u64::from(size) + u64::from(size & 1);
    usize::try_from(pos as u64 + advance).ok()
}

impl WaveFormatInfo {
    /// Parse the leading window of a RIFF/WAVE file.
    ///
    /// Unknown chunks are skipped by their declared size. If a chunk appears
    /// more than once, the last one inside the window wins.
    pub fn parse(window: &[u8]) -> Result<Self, FormatError> {
        if read_tag(window, 0).ok().as_ref() != Some(b"RIFF") {
            return Err(FormatError::NotRiff);
        }
        if read_tag(window, 8).ok().as_ref() != Some(b"WAVE") {
            return Err(FormatError::NotWave);
        }
        if let Ok(declared) = read_u32_le(window, 4) {
            log::trace!("RIFF declares {} bytes, window holds {}", declared, window.len());
        }

        let mut fmt: Option<FmtChunk> = None;
        // declared size of the last fmt chunk, if it was too short to use
        let mut short_fmt: Option<u32> = None;
        let mut data_length: Option<u32> = None;
        let mut pos = 12usize;

        loop {
            let Ok(tag) = read_tag(window, pos) else { break };
            let Ok(size) = read_u32_le(window, pos + 4) else { break };
            let body = pos + 8;

            match &tag {
                b"fmt " => {
                    if size < FMT_MIN_LEN {
                        fmt = None;
                        short_fmt = Some(size);
                    } else {
                        match FmtChunk::read(window, body) {
                            Some(chunk) => {
                                fmt = Some(chunk);
                                short_fmt = None;
                            }
                            None => break,
                        }
                    }
                }
                b"data" => data_length = Some(size),
                other => {
                    log::trace!("skipping chunk {:?} ({} bytes)", String::from_utf8_lossy(other), size);
                }
            }

            match next_chunk(pos, size) {
                Some(next) => pos = next,
                None => break,
            }
        }

        let fmt = fmt.ok_or(match short_fmt {
            Some(declared) => FormatError::TruncatedFmt { declared },
            None => FormatError::MissingFmt { window: window.len() },
        })?;
        let data_length = data_length.ok_or(FormatError::MissingData { window: window.len() })?;

        let info = Self {
            format_tag: fmt.format_tag,
            channel_count: non_negative("channel_count", fmt.channel_count)?,
            sample_rate: fmt.sample_rate,
            avg_bytes_per_sec: fmt.avg_bytes_per_sec,
            block_align: non_negative("block_align", fmt.block_align)?,
            bits_per_sample: non_negative("bits_per_sample", fmt.bits_per_sample)?,
            data_length,
        };
        if info.block_align == 0 {
            return Err(FormatError::ZeroBlockAlign);
        }
        if info.avg_bytes_per_sec == 0 {
            return Err(FormatError::ZeroByteRate);
        }
        Ok(info)
    }

    /// Sample frames in the data chunk.
    pub fn sample_count(&self) -> u64 {
        u64::from(self.data_length) / u64::from(self.block_align)
    }

    pub fn duration_seconds(&self) -> f64 {
        self.data_length as f64 / self.avg_bytes_per_sec as f64
    }

    pub fn format_name(&self) -> &'static str {
        match self.format_tag {
            0x0001 => "PCM",
            0x0003 => "IEEE float",
            0x0006 => "A-law",
            0x0007 => "mu-law",
            0x0011 => "IMA ADPCM",
            0xFFFE => "extensible",
            _ => "unknown",
        }
    }
}

impl fmt::Display for WaveFormatInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "format tag:      {} ({})", self.format_tag, self.format_name())?;
        writeln!(f, "channels:        {}", self.channel_count)?;
        writeln!(f, "sample rate:     {} Hz", self.sample_rate)?;
        writeln!(f, "byte rate:       {} B/s", self.avg_bytes_per_sec)?;
        writeln!(f, "block align:     {}", self.block_align)?;
        writeln!(f, "bits per sample: {}", self.bits_per_sample)?;
        writeln!(f, "data length:     {} bytes", self.data_length)?;
        writeln!(f, "samples:         {}", self.sample_count())?;
        write!(f, "duration:        {:.6} s", self.duration_seconds())
    }
}
