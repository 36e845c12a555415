use async_trait::async_trait;

/// Prefix of the text produced in place of a failed generation.
pub const ERROR_MARKER: &str = "Error: ";

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str, model: &str, temperature: f32) -> anyhow::Result<String>;
    fn provider_name(&self) -> &'static str;
}

pub mod fake;
pub mod gemini;
