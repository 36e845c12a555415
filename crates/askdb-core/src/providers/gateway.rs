use super::llm::{LlmClient, ERROR_MARKER};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

const MODELS: &[(&str, &str)] = &[
    (
        "gemini-2.5-flash-lite",
        "Gemini 2.5 Flash-Lite: fastest and cheapest, good default",
    ),
    (
        "gemini-2.5-flash",
        "Gemini 2.5 Flash: balanced speed and reasoning",
    ),
    (
        "gemini-2.5-pro",
        "Gemini 2.5 Pro: strongest reasoning, slower",
    ),
    ("gemini-2.0-flash", "Gemini 2.0 Flash: previous generation"),
];

/// Static registry of selectable models, keyed by identifier.
pub fn available_models() -> BTreeMap<&'static str, &'static str> {
    MODELS.iter().copied().collect()
}

pub fn is_known_model(model: &str) -> bool {
    MODELS.iter().any(|(id, _)| *id == model)
}

/// Text returned by one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    /// Set when `text` is an error-marked stand-in for a failed call. Model
    /// output is never flagged, whatever it starts with.
    pub degraded: bool,
}

impl Generation {
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            degraded: false,
        }
    }

    pub fn degraded(error: impl std::fmt::Display) -> Self {
        Self {
            text: format!("{}{}", ERROR_MARKER, error),
            degraded: true,
        }
    }
}

/// Front door to the text-generation service.
///
/// Never fails: transport, auth and quota problems come back as a
/// [`Generation`] flagged `degraded` whose text starts with [`ERROR_MARKER`].
#[derive(Clone)]
pub struct Gateway {
    client: Arc<dyn LlmClient>,
    temperature: f32,
}

impl Gateway {
    pub fn new(client: Arc<dyn LlmClient>, temperature: f32) -> Self {
        Self {
            client,
            temperature,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.provider_name()
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub async fn generate(&self, prompt: &str, model: &str) -> Generation {
        self.generate_with(prompt, model, self.temperature).await
    }

    pub async fn generate_with(&self, prompt: &str, model: &str, temperature: f32) -> Generation {
        let started = std::time::Instant::now();
        match self.client.complete(prompt, model, temperature).await {
            Ok(text) => {
                tracing::debug!(
                    event = "askdb.llm.complete",
                    provider = self.client.provider_name(),
                    model = %model,
                    duration_ms = started.elapsed().as_millis() as u64,
                    chars = text.len()
                );
                Generation::answer(text)
            }
            Err(e) => {
                tracing::warn!(
                    event = "askdb.llm.degraded",
                    provider = self.client.provider_name(),
                    model = %model,
                    error = %e,
                    "generation failed: {}", e
                );
                Generation::degraded(e)
            }
        }
    }
}
