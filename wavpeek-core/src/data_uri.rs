//! `data:<mime>;base64,<payload>` blobs as handed over by the notebook host.

use crate::error::BlobError;

/// An immutable base64 data URI holding an encoded audio file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedAudioBlob {
    uri: String,
    /// Byte range of the MIME type within `uri`.
    mime: (usize, usize),
    payload_start: usize,
}

fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=' | '-' | '_')
}

impl EncodedAudioBlob {
    /// Parse a full data URI. ASCII whitespace inside the payload is dropped.
    pub fn parse(uri: &str) -> Result<Self, BlobError> {
        let rest = uri.strip_prefix("data:").ok_or(BlobError::MissingScheme)?;
        let (header, payload) = rest.split_once(',').ok_or(BlobError::MissingPayload)?;
        let mime = header.strip_suffix(";base64").ok_or(BlobError::NotBase64)?;
        Self::from_base64(mime, payload)
    }

    /// Build a blob from a MIME type and a base64 payload, the way the host's
    /// renderer receives them.
    pub fn from_base64(mime: &str, payload: &str) -> Result<Self, BlobError> {
        let payload: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        if payload.is_empty() {
            return Err(BlobError::Empty);
        }
        if !payload.chars().all(is_base64_char) {
            return Err(BlobError::NotBase64);
        }
        let mime = mime.trim();
        let uri = format!("data:{mime};base64,{payload}");
        let mime_start = "data:".len();
        let mime_end = mime_start + mime.len();
        let payload_start = mime_end + ";base64,".len();
        Ok(Self { uri, mime: (mime_start, mime_end), payload_start })
    }

    /// The full URI, suitable for handing to the engine's loader.
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    pub fn mime(&self) -> &str {
        &self.uri[self.mime.0..self.mime.1]
    }

    pub fn payload(&self) -> &str {
        &self.uri[self.payload_start..]
    }

    /// Approximate decoded size in bytes.
    pub fn decoded_len(&self) -> usize {
        let payload = self.payload();
        let padding = payload.bytes().rev().take_while(|&b| b == b'=').count();
        (payload.len() / 4 * 3 + (payload.len() % 4) * 3 / 4).saturating_sub(padding)
    }

    /// Shortest prefix of whole 4-character quanta that decodes to at least
    /// `n_bytes` bytes (or the whole payload if it is shorter).
    pub fn header_payload(&self, n_bytes: usize) -> &str {
        let payload = self.payload();
        let chars = n_bytes.div_ceil(3).saturating_mul(4);
        &payload[..chars.min(payload.len())]
    }
}
