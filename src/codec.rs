//! Data-URL codec.
//!
//! Images cross the HTTP boundary as `data:<mime>;base64,<payload>` strings.
//! Decoding is strict: a required input that does not parse fails the request
//! with [`MonumentError::InvalidImageFormat`]. Only the encoding side ever
//! substitutes a default MIME type.

use crate::error::{MonumentError, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt;

pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Raw image bytes plus their MIME type.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl EncodedImage {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Result<Self> {
        let mime_type = mime_type.into();
        if mime_type.trim().is_empty() || data.is_empty() {
            return Err(MonumentError::InvalidImageFormat);
        }
        Ok(Self { mime_type, data })
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    pub fn to_data_url(&self) -> String {
        encode(&self.mime_type, &self.data)
    }
}

impl fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Parse a data-URL into an [`EncodedImage`].
pub fn decode(data_url: &str) -> Result<EncodedImage> {
    let (header, payload) = data_url
        .split_once(',')
        .ok_or(MonumentError::InvalidImageFormat)?;

    let mime_type = mime_type_of(header).ok_or(MonumentError::InvalidImageFormat)?;

    let payload = payload.trim();
    if payload.is_empty() {
        return Err(MonumentError::InvalidImageFormat);
    }

    let data = STANDARD
        .decode(payload)
        .map_err(|_| MonumentError::InvalidImageFormat)?;

    EncodedImage::new(mime_type, data)
}

/// Build a data-URL from raw bytes.
pub fn encode(mime_type: &str, data: &[u8]) -> String {
    encode_base64(Some(mime_type), &STANDARD.encode(data))
}

/// Build a data-URL from a payload that is already base64, as the image API
/// returns it. A missing or blank MIME type becomes `image/jpeg`.
pub fn encode_base64(mime_type: Option<&str>, payload: &str) -> String {
    let mime_type = mime_type
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_MIME_TYPE);
    format!("data:{};base64,{}", mime_type, payload)
}

// Equivalent of matching `^data:([^;]+);` against the header.
fn mime_type_of(header: &str) -> Option<&str> {
    let rest = header.strip_prefix("data:")?;
    let (mime_type, _) = rest.split_once(';')?;
    if mime_type.is_empty() {
        None
    } else {
        Some(mime_type)
    }
}
