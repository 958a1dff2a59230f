use crate::{
    codec::EncodedImage,
    config::{AssemblerConfig, Config, GeminiConfig},
    error::Result,
    gemini::{extract, Expectation, Gateway, GeminiGateway},
    logger,
    models::{CompositeInput, GenerationRequest, GenerationResult, MonumentArtifact, MonumentInput},
    prompts::PromptAssembler,
};
use std::sync::Arc;

/// Runs one stage at a time: assemble, invoke once, normalize.
#[derive(Clone)]
pub struct MonumentStudio {
    gateway: Arc<dyn Gateway>,
    assembler: PromptAssembler,
}

impl MonumentStudio {
    pub fn new(gateway: Arc<dyn Gateway>, assembler: PromptAssembler) -> Self {
        Self { gateway, assembler }
    }

    /// Build a studio talking to Gemini. Fails without an API key.
    pub fn from_config(gemini: GeminiConfig, assembler: AssemblerConfig) -> Result<Self> {
        let gateway = GeminiGateway::new(gemini)?;
        Ok(Self::new(Arc::new(gateway), PromptAssembler::new(assembler)))
    }

    pub fn from_app_config(config: &Config) -> Result<Self> {
        Self::from_config(config.gemini.clone(), config.assembler.clone())
    }

    pub fn assembler(&self) -> &PromptAssembler {
        &self.assembler
    }

    pub async fn generate_monument(&self, input: &MonumentInput) -> Result<MonumentArtifact> {
        let request = self.assembler.monument(input)?;
        let result = self.run(request).await?;
        Ok(MonumentArtifact {
            image_url: result.image_data_url.unwrap_or_default(),
            description: result.description,
        })
    }

    pub async fn describe_scene(&self, scene: &EncodedImage) -> Result<String> {
        let request = self.assembler.describe_scene(scene);
        let result = self.run(request).await?;
        Ok(result.description.unwrap_or_default())
    }

    pub async fn synthesize_prompt(
        &self,
        monument_description: &str,
        scene_description: &str,
    ) -> Result<String> {
        let request = self
            .assembler
            .synthesize_prompt(monument_description, scene_description)?;
        let result = self.run(request).await?;
        Ok(result.description.unwrap_or_default())
    }

    /// Returns the composite as a data-URL.
    pub async fn composite(&self, input: &CompositeInput) -> Result<String> {
        let request = self.assembler.composite(input)?;
        let result = self.run(request).await?;
        Ok(result.image_data_url.unwrap_or_default())
    }

    pub async fn reference_composite(
        &self,
        reference: &EncodedImage,
        scene: &EncodedImage,
    ) -> Result<String> {
        let request = self.assembler.reference_composite(reference, scene);
        let result = self.run(request).await?;
        Ok(result.image_data_url.unwrap_or_default())
    }

    async fn run(&self, request: GenerationRequest) -> Result<GenerationResult> {
        let _timer = logger::timer(&format!("stage {}", request.stage));
        log::debug!(
            "Stage {} sends {} image(s), temperature {}",
            request.stage,
            request.images().count(),
            request.parameters.temperature
        );

        let reply = self.gateway.invoke(&request).await?;
        extract(&reply, Expectation::from(request.stage))
    }
}
