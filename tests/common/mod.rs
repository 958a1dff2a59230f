#![allow(dead_code)]

use async_trait::async_trait;
use monugen::{
    Gateway, GenerationRequest, MonumentError, MonumentStudio, PromptAssembler, ReplyPart,
    Result, Stage, UpstreamReply,
};
use std::sync::{Arc, Mutex};

pub const PNG_URL: &str = "data:image/png;base64,iVBORw0KGgo=";
pub const JPEG_URL: &str = "data:image/jpeg;base64,/9j/4AAQ";

/// In-memory gateway: records every request and answers from a script.
pub struct ScriptedGateway {
    requests: Mutex<Vec<GenerationRequest>>,
    reply: Box<dyn Fn(&GenerationRequest) -> Result<UpstreamReply> + Send + Sync>,
}

impl ScriptedGateway {
    pub fn new<F>(reply: F) -> Arc<Self>
    where
        F: Fn(&GenerationRequest) -> Result<UpstreamReply> + Send + Sync + 'static,
    {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            reply: Box::new(reply),
        })
    }

    /// Image stages get an image plus a caption, text stages get text.
    pub fn happy() -> Arc<Self> {
        Self::new(|request| {
            Ok(match request.stage {
                Stage::Monument => UpstreamReply::new(vec![
                    ReplyPart::text("A bronze eagle on a granite plinth."),
                    ReplyPart::image("image/png", "RUFHTEU="),
                ]),
                Stage::DescribeScene => {
                    UpstreamReply::new(vec![ReplyPart::text("A sunny plaza with plane trees.")])
                }
                Stage::SynthesizePrompt => {
                    UpstreamReply::new(vec![ReplyPart::text("An eagle statue in a plaza.")])
                }
                Stage::Composite | Stage::ReferenceComposite => {
                    UpstreamReply::new(vec![ReplyPart::image("image/png", "Q09NUA==")])
                }
            })
        })
    }

    pub fn failing(message: &'static str) -> Arc<Self> {
        Self::new(move |_| {
            Err(MonumentError::UpstreamError {
                status: 429,
                message: message.to_string(),
                details: Some(serde_json::json!({"error": {"message": message}})),
            })
        })
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Gateway for ScriptedGateway {
    async fn invoke(&self, request: &GenerationRequest) -> Result<UpstreamReply> {
        self.requests.lock().unwrap().push(request.clone());
        (self.reply)(request)
    }
}

pub fn studio(gateway: Arc<ScriptedGateway>) -> MonumentStudio {
    MonumentStudio::new(gateway, PromptAssembler::default())
}
