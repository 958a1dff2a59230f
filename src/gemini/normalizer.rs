use crate::{
    codec,
    error::{MonumentError, Result},
    models::{GenerationResult, Stage, UpstreamReply},
};

/// What a stage needs from the reply for the call to count as a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    Image,
    Text,
}

impl From<Stage> for Expectation {
    fn from(stage: Stage) -> Self {
        if stage.produces_image() {
            Expectation::Image
        } else {
            Expectation::Text
        }
    }
}

/// Take the first inline image and, independently, the first non-empty text.
pub fn extract(reply: &UpstreamReply, expectation: Expectation) -> Result<GenerationResult> {
    let image_data_url = reply.parts.iter().find_map(|part| {
        part.inline_image
            .as_ref()
            .map(|image| codec::encode_base64(image.mime_type.as_deref(), &image.data))
    });

    let description = reply.parts.iter().find_map(|part| {
        part.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(String::from)
    });

    match expectation {
        Expectation::Image if image_data_url.is_none() => Err(MonumentError::NoContentError(
            "No image received from the API".into(),
        )),
        Expectation::Text if description.is_none() => Err(MonumentError::NoContentError(
            "No description received".into(),
        )),
        _ => Ok(GenerationResult {
            image_data_url,
            description,
        }),
    }
}
