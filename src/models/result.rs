use serde::{Deserialize, Serialize};

/// What the normalizer pulled out of a reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub image_data_url: Option<String>,
    pub description: Option<String>,
}

/// Output of the monument stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonumentArtifact {
    pub image_url: String,
    pub description: Option<String>,
}
