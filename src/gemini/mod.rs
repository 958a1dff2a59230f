pub mod gateway;
pub mod normalizer;

use crate::{
    error::Result,
    models::{GenerationRequest, UpstreamReply},
};
use async_trait::async_trait;

pub use gateway::GeminiGateway;
pub use normalizer::{extract, Expectation};

/// The single outbound call every stage makes.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn invoke(&self, request: &GenerationRequest) -> Result<UpstreamReply>;
}
