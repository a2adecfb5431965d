use crate::core::errors::Result;
use crate::core::models::ai::GenerationConfig;

/// Port for a hosted text-generation model.
pub trait TextGenerator {
    /// Complete `prompt` and return the model's text.
    fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String>;
}
