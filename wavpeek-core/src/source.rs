//! A loaded blob together with its decoded header window.
//!
//! The header is parsed exactly once here; the diagnostic panel and the
//! region sample math both read the same [`WaveFormatInfo`].

use crate::byte_dump::{self, DEFAULT_ROWS};
use crate::data_uri::EncodedAudioBlob;
use crate::error::FormatError;
use crate::riff::{WaveFormatInfo, HEADER_WINDOW_LEN};

#[derive(Clone, Debug)]
pub struct SourceDocument {
    blob: EncodedAudioBlob,
    header: Vec<u8>,
    format: Result<WaveFormatInfo, FormatError>,
}

impl SourceDocument {
    /// `header` is the decoded start of the blob; anything past the header
    /// window is dropped.
    pub fn new(blob: EncodedAudioBlob, mut header: Vec<u8>) -> Self {
        header.truncate(HEADER_WINDOW_LEN);
        let format = WaveFormatInfo::parse(&header);
        match &format {
            Ok(info) => log::debug!(
                "{}: {} ch, {} Hz, {} bit, {:.3} s",
                blob.mime(),
                info.channel_count,
                info.sample_rate,
                info.bits_per_sample,
                info.duration_seconds()
            ),
            Err(e) => log::warn!("{}: format unknown ({})", blob.mime(), e),
        }
        Self { blob, header, format }
    }

    pub fn blob(&self) -> &EncodedAudioBlob {
        &self.blob
    }

    pub fn header(&self) -> &[u8] {
        &self.header
    }

    pub fn format(&self) -> Result<&WaveFormatInfo, &FormatError> {
        self.format.as_ref()
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.format.as_ref().ok().map(|info| info.sample_rate)
    }

    /// Text for the diagnostic panel: format summary followed by a hex dump
    /// of the header window.
    pub fn diagnostic_text(&self) -> String {
        let mut text = format!("mime type:       {}\n", self.blob.mime());
        match &self.format {
            Ok(info) => text.push_str(&info.to_string()),
            Err(e) => text.push_str(&format!("format:          unknown ({e})")),
        }
        text.push_str("\n\n");
        if self.header.is_empty() {
            text.push_str("(no bytes available)\n");
        } else {
            text.push_str(&byte_dump::dump(&self.header, DEFAULT_ROWS));
        }
        text
    }
}
