//! Prompt assembly.
//!
//! Every stage is a pure function of its inputs: it yields exactly one
//! [`GenerationRequest`] or a validation error, before anything touches the
//! network. Image parts always precede the instruction, and a monument image
//! always precedes a scene image so that the "FIRST IMAGE" / "SECOND IMAGE"
//! wording in the templates matches the part order.

pub mod templates;

use crate::{
    codec::EncodedImage,
    config::{AssemblerConfig, MonumentSetting, ScenePolicy},
    error::{MonumentError, Result},
    models::{
        CompositeInput, GenerationParameters, GenerationRequest, MonumentInput, RequestPart, Stage,
    },
};

pub use templates::{render, PromptTemplates};

#[derive(Debug, Clone, Default)]
pub struct PromptAssembler {
    config: AssemblerConfig,
    templates: PromptTemplates,
}

impl PromptAssembler {
    pub fn new(config: AssemblerConfig) -> Self {
        Self {
            config,
            templates: PromptTemplates::default(),
        }
    }

    pub fn with_templates(mut self, templates: PromptTemplates) -> Self {
        self.templates = templates;
        self
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    pub fn templates(&self) -> &PromptTemplates {
        &self.templates
    }

    /// Stage 1: generate the monument on its own.
    pub fn monument(&self, input: &MonumentInput) -> Result<GenerationRequest> {
        let setting = match self.config.monument_setting {
            MonumentSetting::Isolated => &self.templates.isolated_setting,
            MonumentSetting::Contextual => &self.templates.contextual_setting,
        };

        let parts = match input {
            MonumentInput::Reference(image) => {
                let instruction = render(
                    &self.templates.monument_from_reference,
                    &[("setting", setting.as_str())],
                );
                vec![
                    RequestPart::InlineImage(image.clone()),
                    RequestPart::Text(instruction),
                ]
            }
            MonumentInput::Description(prompt) => {
                let prompt = required(prompt, "Prompt is required for text mode")?;
                let instruction = render(
                    &self.templates.monument_from_text,
                    &[("prompt", prompt), ("setting", setting.as_str())],
                );
                vec![RequestPart::Text(instruction)]
            }
        };

        Ok(GenerationRequest::new(
            Stage::Monument,
            parts,
            GenerationParameters::open_ended(),
        ))
    }

    /// Stage 2: describe the uploaded scene for placement.
    pub fn describe_scene(&self, scene: &EncodedImage) -> GenerationRequest {
        GenerationRequest::new(
            Stage::DescribeScene,
            vec![
                RequestPart::InlineImage(scene.clone()),
                RequestPart::text(self.templates.describe_scene.as_str()),
            ],
            GenerationParameters::descriptive(),
        )
    }

    /// Stage 3: ask for a single paragraph that merges both descriptions.
    pub fn synthesize_prompt(
        &self,
        monument_description: &str,
        scene_description: &str,
    ) -> Result<GenerationRequest> {
        const MISSING: &str = "Monument description and scene description are required";
        let monument_description = required(monument_description, MISSING)?;
        let scene_description = required(scene_description, MISSING)?;

        let instruction = render(
            &self.templates.synthesize_prompt,
            &[
                ("monument_description", monument_description),
                ("scene_description", scene_description),
            ],
        );

        Ok(GenerationRequest::new(
            Stage::SynthesizePrompt,
            vec![RequestPart::Text(instruction)],
            GenerationParameters::descriptive(),
        ))
    }

    /// Deterministic stand-in for stage 3, embedding both descriptions verbatim.
    pub fn fallback_composite_prompt(
        &self,
        monument_description: &str,
        scene_description: &str,
    ) -> String {
        render(
            &self.templates.fallback_composite,
            &[
                ("monument_description", monument_description.trim()),
                ("scene_description", scene_description.trim()),
            ],
        )
    }

    /// Stage 4: place the generated monument into the scene.
    pub fn composite(&self, input: &CompositeInput) -> Result<GenerationRequest> {
        let notes = self.scene_notes(input);

        let mut parts = vec![RequestPart::InlineImage(input.monument.clone())];

        let (instruction, parameters) = match (&input.scene_image, notes) {
            (Some(scene), notes) => {
                parts.push(RequestPart::InlineImage(scene.clone()));
                let notes = notes
                    .map(|n| render(&self.templates.composite_notes, &[("notes", n.as_str())]))
                    .unwrap_or_default();
                match self.config.scene_policy {
                    ScenePolicy::PreservePixels => (
                        render(&self.templates.composite_preserve, &[("notes", notes.as_str())]),
                        GenerationParameters::scene_preserving(),
                    ),
                    ScenePolicy::LooseInspiration => (
                        render(&self.templates.composite_inspire, &[("notes", notes.as_str())]),
                        GenerationParameters::scene_inspired(),
                    ),
                }
            }
            (None, Some(scene)) => (
                render(&self.templates.composite_text_scene, &[("scene", scene.as_str())]),
                GenerationParameters::scene_inspired(),
            ),
            (None, None) => {
                return Err(MonumentError::validation(
                    "A composite prompt, scene image, or scene description is required",
                ))
            }
        };

        parts.push(RequestPart::Text(instruction));
        Ok(GenerationRequest::new(Stage::Composite, parts, parameters))
    }

    /// Single pass: build the monument from a reference and place it in the scene.
    pub fn reference_composite(
        &self,
        reference: &EncodedImage,
        scene: &EncodedImage,
    ) -> GenerationRequest {
        GenerationRequest::new(
            Stage::ReferenceComposite,
            vec![
                RequestPart::InlineImage(reference.clone()),
                RequestPart::InlineImage(scene.clone()),
                RequestPart::text(self.templates.reference_composite.as_str()),
            ],
            GenerationParameters::reference_composite(),
        )
    }

    // Composite prompt, else the fallback over both descriptions, else the raw
    // scene description.
    fn scene_notes(&self, input: &CompositeInput) -> Option<String> {
        if let Some(prompt) = non_empty(input.composite_prompt.as_deref()) {
            return Some(prompt.to_string());
        }
        let scene = non_empty(input.scene_description.as_deref())?;
        match non_empty(input.monument_description.as_deref()) {
            Some(monument) => Some(self.fallback_composite_prompt(monument, scene)),
            None => Some(scene.to_string()),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn required<'a>(value: &'a str, message: &str) -> Result<&'a str> {
    non_empty(Some(value)).ok_or_else(|| MonumentError::validation(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResponseKind;

    fn image(mime: &str, bytes: &[u8]) -> EncodedImage {
        EncodedImage::new(mime, bytes.to_vec()).unwrap()
    }

    fn monument_image() -> EncodedImage {
        image("image/png", b"monument")
    }

    fn scene_image() -> EncodedImage {
        image("image/jpeg", b"scene")
    }

    #[test]
    fn test_monument_from_text_is_single_text_part() {
        let assembler = PromptAssembler::default();
        let request = assembler
            .monument(&MonumentInput::Description("a bronze eagle".into()))
            .unwrap();

        assert_eq!(request.stage, Stage::Monument);
        assert_eq!(request.parts.len(), 1);
        let text = request.instruction().unwrap();
        assert!(text.contains("a bronze eagle"));
        assert!(text.contains("isolated"));
        assert!(text.contains("neutral background"));
        assert!(text.contains("bronze, marble, stone, or metal"));
        assert!(text.contains("text description"));
        assert_eq!(
            request.parameters.response_modalities,
            vec![ResponseKind::Text, ResponseKind::Image]
        );
        assert_eq!(request.parameters.temperature, 1.0);
    }

    #[test]
    fn test_monument_from_reference_puts_image_first() {
        let assembler = PromptAssembler::default();
        let request = assembler
            .monument(&MonumentInput::Reference(monument_image()))
            .unwrap();

        assert_eq!(request.parts.len(), 2);
        assert_eq!(request.parts[0].as_image(), Some(&monument_image()));
        let text = request.parts[1].as_text().unwrap();
        assert!(text.contains("person, an animal, or an object"));
        assert!(text.contains("isolated"));
    }

    #[test]
    fn test_contextual_setting_drops_isolation() {
        let assembler = PromptAssembler::new(AssemblerConfig::new().with_setting(MonumentSetting::Contextual));
        let request = assembler
            .monument(&MonumentInput::Description("a marble lion".into()))
            .unwrap();
        let text = request.instruction().unwrap();
        assert!(text.contains("appropriate setting"));
        assert!(!text.contains("neutral background"));
    }

    #[test]
    fn test_blank_monument_prompt_is_rejected() {
        let assembler = PromptAssembler::default();
        let err = assembler
            .monument(&MonumentInput::Description("   ".into()))
            .unwrap_err();
        assert!(matches!(err, MonumentError::ValidationError(_)));
    }

    #[test]
    fn test_describe_scene_asks_for_placement_details() {
        let request = PromptAssembler::default().describe_scene(&scene_image());
        assert_eq!(request.parts[0].as_image(), Some(&scene_image()));
        let text = request.instruction().unwrap();
        for needle in ["location type", "lighting", "weather", "ground surface", "atmosphere", "2-3 sentences"] {
            assert!(text.contains(needle), "missing {}", needle);
        }
        assert_eq!(request.parameters.response_modalities, vec![ResponseKind::Text]);
    }

    #[test]
    fn test_synthesize_prompt_is_text_only() {
        let request = PromptAssembler::default()
            .synthesize_prompt("a bronze eagle", "a sunny plaza")
            .unwrap();
        assert_eq!(request.stage, Stage::SynthesizePrompt);
        assert_eq!(request.parts.len(), 1);
        let text = request.instruction().unwrap();
        assert!(text.contains("a bronze eagle"));
        assert!(text.contains("a sunny plaza"));
        assert!(text.contains("standing in"));
        assert_eq!(request.parameters.response_modalities, vec![ResponseKind::Text]);

        assert!(PromptAssembler::default().synthesize_prompt("", "plaza").is_err());
    }

    #[test]
    fn test_composite_orders_monument_before_scene() {
        let input = CompositeInput::new(monument_image())
            .with_scene_image(scene_image())
            .with_composite_prompt("An eagle in a plaza.");
        let request = PromptAssembler::default().composite(&input).unwrap();

        assert_eq!(request.parts.len(), 3);
        assert_eq!(request.parts[0].as_image(), Some(&monument_image()));
        assert_eq!(request.parts[1].as_image(), Some(&scene_image()));

        let text = request.parts[2].as_text().unwrap();
        let first = text.find("FIRST IMAGE: the monument").unwrap();
        let second = text.find("SECOND IMAGE: the background").unwrap();
        assert!(first < second);
        assert!(text.contains("An eagle in a plaza."));
    }

    #[test]
    fn test_composite_preserves_scene_by_default() {
        let input = CompositeInput::new(monument_image()).with_scene_image(scene_image());
        let request = PromptAssembler::default().composite(&input).unwrap();
        let text = request.instruction().unwrap();

        assert!(text.contains("Do NOT change, crop, or recompose the background"));
        assert!(text.contains("pixel-for-pixel"));
        assert!(text.contains("30-40%"));
        assert!(text.contains("never float"));
        assert!(text.contains("light direction"));
        assert!(!text.contains("inspiration"));
        assert!(!text.contains("NOTES"));
        assert!(request.parameters.temperature < 0.5);
    }

    #[test]
    fn test_inspire_policy_allows_loose_setting() {
        let assembler = PromptAssembler::new(
            AssemblerConfig::new().with_scene_policy(ScenePolicy::LooseInspiration),
        );
        let input = CompositeInput::new(monument_image()).with_scene_image(scene_image());
        let text = assembler.composite(&input).unwrap().instruction().unwrap().to_string();
        assert!(text.contains("loose inspiration"));
    }

    #[test]
    fn test_composite_from_scene_text_has_single_image() {
        let input = CompositeInput::new(monument_image())
            .with_descriptions(None, Some("a misty mountain pass".into()));
        let request = PromptAssembler::default().composite(&input).unwrap();

        assert_eq!(request.images().count(), 1);
        let text = request.instruction().unwrap();
        assert!(text.contains("a misty mountain pass"));
        assert!(!text.contains("SECOND IMAGE"));
    }

    #[test]
    fn test_composite_falls_back_to_description_template() {
        let input = CompositeInput::new(monument_image()).with_descriptions(
            Some("a bronze eagle".into()),
            Some("a sunny plaza".into()),
        );
        let assembler = PromptAssembler::default();
        let request = assembler.composite(&input).unwrap();
        let expected = assembler.fallback_composite_prompt("a bronze eagle", "a sunny plaza");
        assert!(request.instruction().unwrap().contains(&expected));
    }

    #[test]
    fn test_composite_without_scene_is_rejected() {
        let input = CompositeInput::new(monument_image()).with_composite_prompt("  ");
        let err = PromptAssembler::default().composite(&input).unwrap_err();
        assert!(matches!(err, MonumentError::ValidationError(_)));
    }

    #[test]
    fn test_fallback_prompt_embeds_descriptions_verbatim() {
        let prompt = PromptAssembler::default()
            .fallback_composite_prompt("a granite whale", "a rainy harbor at dusk");
        assert!(prompt.contains("a granite whale"));
        assert!(prompt.contains("a rainy harbor at dusk"));
    }

    #[test]
    fn test_braces_in_user_text_survive_rendering() {
        let prompt = PromptAssembler::default()
            .fallback_composite_prompt("a plaque reading {scene_description}", "a park");
        assert!(prompt.starts_with(
            "A photorealistic photograph of a plaque reading {scene_description} standing in a park."
        ));

        let request = PromptAssembler::default()
            .monument(&MonumentInput::Description("a sign saying {setting}".into()))
            .unwrap();
        let text = request.instruction().unwrap();
        assert!(text.contains("a monument: a sign saying {setting}."));
        assert_eq!(text.matches("neutral background").count(), 1);
    }

    #[test]
    fn test_reference_composite_order_and_directive() {
        let request = PromptAssembler::default().reference_composite(&monument_image(), &scene_image());
        assert_eq!(request.stage, Stage::ReferenceComposite);
        assert_eq!(request.parts[0].as_image(), Some(&monument_image()));
        assert_eq!(request.parts[1].as_image(), Some(&scene_image()));
        assert!(request
            .instruction()
            .unwrap()
            .contains("Do NOT change, crop, or recompose the background"));
    }

    #[test]
    fn test_custom_templates_are_used() {
        let templates = PromptTemplates {
            describe_scene: "Just describe it.".to_string(),
            ..PromptTemplates::default()
        };
        let request = PromptAssembler::default()
            .with_templates(templates)
            .describe_scene(&scene_image());
        assert_eq!(request.instruction(), Some("Just describe it."));
    }
}
