use crate::codec::EncodedImage;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// The kind of call being made. Drives parameters, error wording and what the
/// reply must contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Monument,
    DescribeScene,
    SynthesizePrompt,
    Composite,
    ReferenceComposite,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Monument => "monument",
            Stage::DescribeScene => "describe_scene",
            Stage::SynthesizePrompt => "synthesize_prompt",
            Stage::Composite => "composite",
            Stage::ReferenceComposite => "reference_composite",
        }
    }

    /// Whether the stage must yield an image (as opposed to text only).
    pub fn produces_image(&self) -> bool {
        matches!(
            self,
            Stage::Monument | Stage::Composite | Stage::ReferenceComposite
        )
    }

    /// Message used when the upstream error body carries none.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Stage::Monument => "Failed to generate image",
            Stage::DescribeScene => "Failed to describe scene",
            Stage::SynthesizePrompt => "Failed to synthesize composite prompt",
            Stage::Composite => "Failed to composite images",
            Stage::ReferenceComposite => "Failed to create composite",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseKind {
    Text,
    Image,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParameters {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
    pub response_modalities: Vec<ResponseKind>,
}

impl GenerationParameters {
    pub fn new(temperature: f32, top_p: f32, top_k: u32, max_output_tokens: u32) -> Self {
        Self {
            temperature,
            top_p,
            top_k,
            max_output_tokens,
            response_mime_type: "text/plain".to_string(),
            response_modalities: vec![ResponseKind::Text],
        }
    }

    pub fn with_image_output(mut self) -> Self {
        if !self.response_modalities.contains(&ResponseKind::Image) {
            self.response_modalities.push(ResponseKind::Image);
        }
        self
    }

    pub fn open_ended() -> Self {
        Self::new(1.0, 0.95, 40, 8192).with_image_output()
    }

    pub fn descriptive() -> Self {
        Self::new(0.7, 0.95, 40, 1024)
    }

    pub fn scene_preserving() -> Self {
        Self::new(0.4, 0.9, 30, 8192).with_image_output()
    }

    pub fn scene_inspired() -> Self {
        Self::new(0.9, 0.95, 40, 8192).with_image_output()
    }

    pub fn reference_composite() -> Self {
        Self::new(0.7, 0.9, 30, 8192).with_image_output()
    }
}

/// One outbound part. Image parts go before the text part that refers to them.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestPart {
    InlineImage(EncodedImage),
    Text(String),
}

impl RequestPart {
    pub fn text(content: impl Into<String>) -> Self {
        RequestPart::Text(content.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RequestPart::Text(content) => Some(content),
            RequestPart::InlineImage(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&EncodedImage> {
        match self {
            RequestPart::InlineImage(image) => Some(image),
            RequestPart::Text(_) => None,
        }
    }

    fn to_payload(&self) -> Value {
        match self {
            RequestPart::InlineImage(image) => json!({
                "inline_data": {
                    "mime_type": image.mime_type,
                    "data": image.to_base64()
                }
            }),
            RequestPart::Text(content) => json!({ "text": content }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub stage: Stage,
    pub parts: Vec<RequestPart>,
    pub parameters: GenerationParameters,
}

impl GenerationRequest {
    pub fn new(stage: Stage, parts: Vec<RequestPart>, parameters: GenerationParameters) -> Self {
        Self {
            stage,
            parts,
            parameters,
        }
    }

    /// The instruction text of the request (the last text part).
    pub fn instruction(&self) -> Option<&str> {
        self.parts.iter().rev().find_map(RequestPart::as_text)
    }

    pub fn images(&self) -> impl Iterator<Item = &EncodedImage> {
        self.parts.iter().filter_map(RequestPart::as_image)
    }

    /// Body sent to `generateContent`.
    pub fn to_payload(&self) -> Value {
        let parts: Vec<Value> = self.parts.iter().map(RequestPart::to_payload).collect();
        json!({
            "contents": [{
                "parts": parts
            }],
            "generationConfig": self.parameters
        })
    }
}
