//! Monument photo compositing on top of the Gemini image API.
//!
//! A request flows through the same four steps whatever the stage: decode the
//! data-URL images ([`codec`]), assemble the prompt and parameters
//! ([`prompts`]), make one call upstream ([`gemini::Gateway`]) and normalize
//! the reply ([`gemini::normalizer`]). [`studio::MonumentStudio`] runs one
//! stage, [`workflow::Workflow`] chains them, and the `server` feature exposes
//! each stage over HTTP.

pub mod codec;
pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod prompts;
#[cfg(feature = "server")]
pub mod server;
pub mod studio;
pub mod workflow;

pub use codec::EncodedImage;
pub use config::{AssemblerConfig, Config, GeminiConfig, MonumentSetting, ScenePolicy, ServerConfig};
pub use error::{MonumentError, Result};
pub use gemini::{Gateway, GeminiGateway};
pub use models::*;
pub use prompts::{PromptAssembler, PromptTemplates};
pub use studio::MonumentStudio;
pub use workflow::{SceneSource, Workflow, WorkflowState};
