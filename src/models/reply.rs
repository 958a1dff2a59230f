//! Reply shapes from `generateContent`.
//!
//! The API is inconsistent about casing: inline images arrive as either
//! `inlineData { mimeType }` or `inline_data { mime_type }`. Both spellings are
//! read here and folded into [`UpstreamReply`] as soon as the body is parsed;
//! nothing past this module looks at the wire casing again.

use serde::{Deserialize, Serialize};

/// Canonical reply: the parts of the first candidate, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpstreamReply {
    pub parts: Vec<ReplyPart>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplyPart {
    pub inline_image: Option<InlineImage>,
    pub text: Option<String>,
}

/// A base64 image payload as returned upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineImage {
    pub mime_type: Option<String>,
    pub data: String,
}

impl UpstreamReply {
    pub fn new(parts: Vec<ReplyPart>) -> Self {
        Self { parts }
    }

    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        let wire: WireResponse = serde_json::from_str(body)?;
        Ok(wire.into())
    }
}

impl ReplyPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            inline_image: None,
            text: Some(text.into()),
        }
    }

    pub fn image(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            inline_image: Some(InlineImage {
                mime_type: Some(mime_type.into()),
                data: data.into(),
            }),
            text: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    #[serde(default)]
    content: Option<WireContent>,
}

#[derive(Debug, Deserialize)]
struct WireContent {
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Deserialize)]
struct WirePart {
    #[serde(rename = "inlineData", default)]
    inline_data_camel: Option<WireInlineData>,
    #[serde(rename = "inline_data", default)]
    inline_data_snake: Option<WireInlineData>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireInlineData {
    #[serde(default)]
    data: Option<String>,
    #[serde(rename = "mimeType", default)]
    mime_type_camel: Option<String>,
    #[serde(rename = "mime_type", default)]
    mime_type_snake: Option<String>,
}

impl WireInlineData {
    fn into_inline_image(self) -> Option<InlineImage> {
        let data = self.data.filter(|d| !d.is_empty())?;
        let mime_type = self
            .mime_type_camel
            .filter(|m| !m.is_empty())
            .or(self.mime_type_snake.filter(|m| !m.is_empty()));
        Some(InlineImage { mime_type, data })
    }
}

impl From<WirePart> for ReplyPart {
    fn from(part: WirePart) -> Self {
        let inline_image = part
            .inline_data_camel
            .and_then(WireInlineData::into_inline_image)
            .or_else(|| {
                part.inline_data_snake
                    .and_then(WireInlineData::into_inline_image)
            });
        ReplyPart {
            inline_image,
            text: part.text,
        }
    }
}

impl From<WireResponse> for UpstreamReply {
    fn from(wire: WireResponse) -> Self {
        let parts = wire
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().map(ReplyPart::from).collect())
            .unwrap_or_default();
        UpstreamReply { parts }
    }
}
