use super::LlmClient;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Offline client returning scripted responses in order; the last one repeats.
///
/// With an empty script it echoes a short acknowledgement. Every call is
/// counted and its prompt recorded.
#[derive(Default)]
pub struct FakeClient {
    script: Vec<String>,
    fail_with: Option<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn new<I, S>(script: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: script.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for FakeClient {
    async fn complete(&self, prompt: &str, model: &str, _temperature: f32) -> anyhow::Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut p) = self.prompts.lock() {
            p.push(prompt.to_string());
        }
        if let Some(msg) = &self.fail_with {
            anyhow::bail!("{}", msg);
        }
        let text = match self.script.get(n).or_else(|| self.script.last()) {
            Some(t) => t.clone(),
            None => format!("fake response from {}", model),
        };
        Ok(text)
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
