use super::LlmClient;
use async_trait::async_trait;
use serde_json::json;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiClient {
    pub api_key: Option<String>,
    pub api_base: String,
    pub max_output_tokens: u32,
    pub client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, api_base: String, max_output_tokens: u32) -> Self {
        Self {
            api_key,
            api_base,
            max_output_tokens,
            client: reqwest::Client::new(),
        }
    }

    /// Reads the key from `GEMINI_API_KEY`. A missing key is reported per call.
    pub fn from_env(api_base: String, max_output_tokens: u32) -> Self {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self::new(api_key, api_base, max_output_tokens)
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, prompt: &str, model: &str, temperature: f32) -> anyhow::Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("GEMINI_API_KEY is not set"))?;

        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "temperature": temperature,
                "maxOutputTokens": self.max_output_tokens,
            }
        });

        let resp = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error ({}): {}", status, error_text);
        }

        let json: serde_json::Value = resp.json().await?;
        let text = extract_text(&json);
        if text.trim().is_empty() {
            anyhow::bail!("empty response");
        }
        Ok(text)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

/// Concatenates `candidates[0].content.parts[*].text`.
fn extract_text(json: &serde_json::Value) -> String {
    json.pointer("/candidates/0/content/parts")
        .and_then(|v| v.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}
