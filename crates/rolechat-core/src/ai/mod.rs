pub mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::state::MessageRole;

/// One turn of the history handed to a generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: MessageRole,
    pub text: String,
}

impl HistoryEntry {
    pub fn new(role: MessageRole, text: impl Into<String>) -> Self {
        Self { role, text: text.into() }
    }
}

/// A hosted text-generation backend.
///
/// Called once per turn with the full ordered history; returns the complete
/// reply text.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        history: &[HistoryEntry],
        model: &str,
        config: &GenerationConfig,
    ) -> Result<String, GenerationError>;
}
