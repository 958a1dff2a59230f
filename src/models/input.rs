use crate::codec::EncodedImage;

/// How the monument is specified. A reference image takes priority.
#[derive(Debug, Clone, PartialEq)]
pub enum MonumentInput {
    Description(String),
    Reference(EncodedImage),
}

impl MonumentInput {
    /// Pick the reference image when both are available.
    pub fn from_parts(description: Option<String>, reference: Option<EncodedImage>) -> Option<Self> {
        match (reference, description) {
            (Some(image), _) => Some(MonumentInput::Reference(image)),
            (None, Some(text)) => Some(MonumentInput::Description(text)),
            (None, None) => None,
        }
    }
}

/// Inputs of the final composite.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeInput {
    pub monument: EncodedImage,
    pub scene_image: Option<EncodedImage>,
    pub composite_prompt: Option<String>,
    pub monument_description: Option<String>,
    pub scene_description: Option<String>,
}

impl CompositeInput {
    pub fn new(monument: EncodedImage) -> Self {
        Self {
            monument,
            scene_image: None,
            composite_prompt: None,
            monument_description: None,
            scene_description: None,
        }
    }

    pub fn with_scene_image(mut self, scene: EncodedImage) -> Self {
        self.scene_image = Some(scene);
        self
    }

    pub fn with_composite_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.composite_prompt = Some(prompt.into());
        self
    }

    pub fn with_descriptions(
        mut self,
        monument_description: Option<String>,
        scene_description: Option<String>,
    ) -> Self {
        self.monument_description = monument_description;
        self.scene_description = scene_description;
        self
    }
}
