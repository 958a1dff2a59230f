//! Sequencing of the four stages.
//!
//! [`WorkflowState`] is an immutable accumulator: every transition takes the
//! previous state by value and returns the next one. Nothing is kept between
//! calls besides what the caller carries in the state, mirroring the browser
//! round-tripping images and descriptions between requests.

use crate::{
    codec,
    error::{MonumentError, Result},
    models::{CompositeInput, MonumentArtifact, MonumentInput},
    studio::MonumentStudio,
};
use serde::{Deserialize, Serialize};

/// Where the scene comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneSource {
    /// A data-URL; goes through description and prompt synthesis.
    Image(String),
    /// Free text; skips straight to the composite.
    Description(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneArtifact {
    pub image_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositePrompt {
    pub text: String,
    /// True when synthesis failed and the deterministic template was used.
    pub from_fallback: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub monument: Option<MonumentArtifact>,
    pub scene: Option<SceneArtifact>,
    pub composite_prompt: Option<CompositePrompt>,
    pub composite_url: Option<String>,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(self) -> Self {
        Self::default()
    }

    pub fn with_monument(self, monument: MonumentArtifact) -> Self {
        Self {
            monument: Some(monument),
            composite_url: None,
            ..self
        }
    }

    pub fn with_scene_image(self, image_url: String, description: String) -> Self {
        Self {
            scene: Some(SceneArtifact {
                image_url: Some(image_url),
                description: Some(description),
            }),
            composite_prompt: None,
            composite_url: None,
            ..self
        }
    }

    /// Text-only scene: there is nothing to describe or synthesize.
    pub fn with_scene_text(self, description: String) -> Self {
        Self {
            scene: Some(SceneArtifact {
                image_url: None,
                description: Some(description),
            }),
            composite_prompt: None,
            composite_url: None,
            ..self
        }
    }

    pub fn with_composite_prompt(self, prompt: CompositePrompt) -> Self {
        Self {
            composite_prompt: Some(prompt),
            composite_url: None,
            ..self
        }
    }

    pub fn with_composite(self, image_url: String) -> Self {
        Self {
            composite_url: Some(image_url),
            ..self
        }
    }

    pub fn monument_description(&self) -> Option<&str> {
        self.monument.as_ref()?.description.as_deref()
    }

    pub fn scene_description(&self) -> Option<&str> {
        self.scene.as_ref()?.description.as_deref()
    }

    pub fn scene_image_url(&self) -> Option<&str> {
        self.scene.as_ref()?.image_url.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.composite_url.is_some()
    }
}

pub struct Workflow<'a> {
    studio: &'a MonumentStudio,
}

impl<'a> Workflow<'a> {
    pub fn new(studio: &'a MonumentStudio) -> Self {
        Self { studio }
    }

    /// Stage 1.
    pub async fn create_monument(
        &self,
        state: WorkflowState,
        input: &MonumentInput,
    ) -> Result<WorkflowState> {
        let monument = self.studio.generate_monument(input).await?;
        Ok(state.with_monument(monument))
    }

    /// Stage 2.
    pub async fn describe_scene(
        &self,
        state: WorkflowState,
        scene_url: &str,
    ) -> Result<WorkflowState> {
        let scene = codec::decode(scene_url)?;
        let description = self.studio.describe_scene(&scene).await?;
        Ok(state.with_scene_image(scene_url.to_string(), description))
    }

    /// Stage 3. Upstream failure is not fatal: the fallback template is used
    /// instead so the composite can still run.
    pub async fn synthesize_prompt(&self, state: WorkflowState) -> Result<WorkflowState> {
        let (monument, scene) = match (state.monument_description(), state.scene_description()) {
            (Some(monument), Some(scene)) => (monument.to_string(), scene.to_string()),
            _ => {
                return Err(MonumentError::validation(
                    "Monument description and scene description are required",
                ))
            }
        };

        let prompt = match self.studio.synthesize_prompt(&monument, &scene).await {
            Ok(text) if !text.trim().is_empty() => CompositePrompt {
                text,
                from_fallback: false,
            },
            Ok(_) => self.fallback(&monument, &scene),
            Err(e) if e.is_client_error() => return Err(e),
            Err(e) => {
                log::warn!("Composite prompt synthesis failed, using fallback: {}", e);
                self.fallback(&monument, &scene)
            }
        };

        Ok(state.with_composite_prompt(prompt))
    }

    /// Stage 4.
    pub async fn composite(&self, state: WorkflowState) -> Result<WorkflowState> {
        let monument_url = state
            .monument
            .as_ref()
            .map(|m| m.image_url.as_str())
            .ok_or_else(|| MonumentError::validation("Monument image is required"))?;

        let mut input = CompositeInput::new(codec::decode(monument_url)?).with_descriptions(
            state.monument_description().map(String::from),
            state.scene_description().map(String::from),
        );
        if let Some(scene_url) = state.scene_image_url() {
            input = input.with_scene_image(codec::decode(scene_url)?);
        }
        if let Some(prompt) = &state.composite_prompt {
            input = input.with_composite_prompt(prompt.text.clone());
        }

        let image_url = self.studio.composite(&input).await?;
        Ok(state.with_composite(image_url))
    }

    /// The whole chain, stage by stage.
    pub async fn run(&self, monument: &MonumentInput, scene: &SceneSource) -> Result<WorkflowState> {
        let state = self.create_monument(WorkflowState::new(), monument).await?;

        let state = match scene {
            SceneSource::Image(scene_url) => {
                let state = self.describe_scene(state, scene_url).await?;
                if state.monument_description().is_some() {
                    self.synthesize_prompt(state).await?
                } else {
                    log::warn!("Monument came back without a description, skipping prompt synthesis");
                    state
                }
            }
            SceneSource::Description(text) => state.with_scene_text(text.clone()),
        };

        self.composite(state).await
    }

    fn fallback(&self, monument: &str, scene: &str) -> CompositePrompt {
        CompositePrompt {
            text: self
                .studio
                .assembler()
                .fallback_composite_prompt(monument, scene),
            from_fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gemini::Gateway,
        models::{GenerationRequest, ReplyPart, Stage, UpstreamReply},
        prompts::PromptAssembler,
    };
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    const MONUMENT_URL: &str = "data:image/png;base64,TU9OVU1FTlQ=";
    const SCENE_URL: &str = "data:image/jpeg;base64,U0NFTkU=";

    /// Answers each stage with a canned reply and records what it was sent.
    struct StageGateway {
        calls: Mutex<Vec<GenerationRequest>>,
        fail_synthesis: bool,
    }

    impl StageGateway {
        fn new(fail_synthesis: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                fail_synthesis,
            })
        }

        fn stages(&self) -> Vec<Stage> {
            self.calls.lock().unwrap().iter().map(|r| r.stage).collect()
        }

        fn last(&self) -> GenerationRequest {
            self.calls.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Gateway for StageGateway {
        async fn invoke(&self, request: &GenerationRequest) -> Result<UpstreamReply> {
            self.calls.lock().unwrap().push(request.clone());
            match request.stage {
                Stage::Monument => Ok(UpstreamReply::new(vec![
                    ReplyPart::text("A bronze eagle with spread wings."),
                    ReplyPart::image("image/png", "TU9OVU1FTlQ="),
                ])),
                Stage::DescribeScene => Ok(UpstreamReply::new(vec![ReplyPart::text(
                    "A sunny city plaza paved with granite.",
                )])),
                Stage::SynthesizePrompt if self.fail_synthesis => {
                    Err(MonumentError::RequestError("connection reset".into()))
                }
                Stage::SynthesizePrompt => Ok(UpstreamReply::new(vec![ReplyPart::text(
                    "A bronze eagle standing in a sunny plaza.",
                )])),
                Stage::Composite | Stage::ReferenceComposite => Ok(UpstreamReply::new(vec![
                    ReplyPart::image("image/png", "Q09NUE9TSVRF"),
                ])),
            }
        }
    }

    fn studio(gateway: Arc<StageGateway>) -> MonumentStudio {
        MonumentStudio::new(gateway, PromptAssembler::default())
    }

    #[tokio::test]
    async fn test_full_chain_with_scene_image() {
        let gateway = StageGateway::new(false);
        let studio = studio(gateway.clone());

        let state = Workflow::new(&studio)
            .run(
                &MonumentInput::Description("a bronze eagle".into()),
                &SceneSource::Image(SCENE_URL.into()),
            )
            .await
            .unwrap();

        assert_eq!(
            gateway.stages(),
            vec![
                Stage::Monument,
                Stage::DescribeScene,
                Stage::SynthesizePrompt,
                Stage::Composite
            ]
        );
        assert_eq!(state.monument.as_ref().unwrap().image_url, MONUMENT_URL);
        assert_eq!(
            state.scene_description(),
            Some("A sunny city plaza paved with granite.")
        );
        let prompt = state.composite_prompt.as_ref().unwrap();
        assert!(!prompt.from_fallback);
        assert_eq!(state.composite_url.as_deref(), Some("data:image/png;base64,Q09NUE9TSVRF"));

        let composite = gateway.last();
        assert_eq!(composite.images().count(), 2);
        assert!(composite
            .instruction()
            .unwrap()
            .contains("A bronze eagle standing in a sunny plaza."));
    }

    #[tokio::test]
    async fn test_synthesis_failure_falls_back_and_composite_proceeds() {
        let gateway = StageGateway::new(true);
        let studio = studio(gateway.clone());

        let state = Workflow::new(&studio)
            .run(
                &MonumentInput::Description("a bronze eagle".into()),
                &SceneSource::Image(SCENE_URL.into()),
            )
            .await
            .unwrap();

        let prompt = state.composite_prompt.clone().unwrap();
        assert!(prompt.from_fallback);
        assert!(prompt.text.contains("A bronze eagle with spread wings."));
        assert!(prompt.text.contains("A sunny city plaza paved with granite."));
        assert!(state.is_complete());
        assert!(gateway.last().instruction().unwrap().contains(&prompt.text));
    }

    #[tokio::test]
    async fn test_scene_text_skips_description_and_synthesis() {
        let gateway = StageGateway::new(false);
        let studio = studio(gateway.clone());

        let state = Workflow::new(&studio)
            .run(
                &MonumentInput::Description("a bronze eagle".into()),
                &SceneSource::Description("a foggy harbor at dawn".into()),
            )
            .await
            .unwrap();

        assert_eq!(gateway.stages(), vec![Stage::Monument, Stage::Composite]);
        assert!(state.composite_prompt.is_none());
        let composite = gateway.last();
        assert_eq!(composite.images().count(), 1);
        assert!(composite.instruction().unwrap().contains("a foggy harbor at dawn"));
    }

    #[tokio::test]
    async fn test_invalid_scene_url_fails_before_network() {
        let gateway = StageGateway::new(false);
        let studio = studio(gateway.clone());
        let workflow = Workflow::new(&studio);

        let err = workflow
            .describe_scene(WorkflowState::new(), "data:image/png;base64")
            .await
            .unwrap_err();
        assert!(matches!(err, MonumentError::InvalidImageFormat));
        assert!(gateway.stages().is_empty());
    }

    #[tokio::test]
    async fn test_composite_requires_monument() {
        let gateway = StageGateway::new(false);
        let studio = studio(gateway.clone());

        let state = WorkflowState::new().with_scene_text("a park".into());
        let err = Workflow::new(&studio).composite(state).await.unwrap_err();
        assert_eq!(err.to_string(), "Monument image is required");
        assert!(gateway.stages().is_empty());
    }

    #[test]
    fn test_transitions_clear_downstream_results() {
        let state = WorkflowState::new()
            .with_monument(MonumentArtifact {
                image_url: MONUMENT_URL.into(),
                description: Some("eagle".into()),
            })
            .with_scene_text("park".into())
            .with_composite("data:image/png;base64,AAAA".into());
        assert!(state.is_complete());

        let state = state.with_scene_image(SCENE_URL.into(), "plaza".into());
        assert!(!state.is_complete());
        assert_eq!(state.monument_description(), Some("eagle"));
        assert_eq!(state.scene_image_url(), Some(SCENE_URL));

        assert_eq!(state.reset(), WorkflowState::default());
    }
}
