//! The external natural-language classifier boundary.
//!
//! A [`Classifier`] receives a [`ClassifierPrompt`] and returns the raw text
//! of its answer; interpreting that text is the selector's job. The bundled
//! [`HttpClassifier`] talks to any OpenAI-compatible chat completions API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_core::StepRegistry;

/// Maximum number of characters of input text included in a prompt.
pub const SAMPLE_CHARS: usize = 100;

/// Upper bound on tokens the classifier may return.
const MAX_TOKENS: u32 = 200;

/// The bounded prompt sent to a classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierPrompt {
    pub system: String,
    pub user: String,
}

impl ClassifierPrompt {
    /// Build a prompt listing every registered capability, a few worked
    /// examples, the request, and at most [`SAMPLE_CHARS`] of the input.
    pub fn build(registry: &StepRegistry, request: &str, sample: &str) -> Self {
        let system = format!(
            "You are an orchestrator that decides which text-processing steps to run based on user requests.\n\
             \n\
             Available steps:\n\
             {}\n\
             \n\
             Your task is to determine which steps should be executed and in what order based on the user's request.\n\
             Return ONLY a valid JSON array of step names in execution order. Include only steps from the available list.\n\
             \n\
             Examples:\n\
             User: \"Clean this text and analyze its sentiment\"\n\
             Output: [\"data-cleaning\", \"sentiment-analysis\"]\n\
             \n\
             User: \"Summarize this article\"\n\
             Output: [\"text-summarization\"]\n\
             \n\
             User: \"Clean and summarize this text\"\n\
             Output: [\"data-cleaning\", \"text-summarization\"]\n",
            registry.describe()
        );

        let sample: String = sample.chars().take(SAMPLE_CHARS).collect();
        let user = if sample.is_empty() {
            format!("User request: {request}\n")
        } else {
            format!("User request: {request}\nSample of the input text: '{sample}...'")
        };

        Self { system, user }
    }
}

/// A pluggable natural-language classifier.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Short human-readable name for logs.
    fn name(&self) -> &str;

    /// Return the raw answer text for `prompt`.
    async fn classify(&self, prompt: &ClassifierPrompt) -> tf_core::Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Classifier backed by an OpenAI-compatible chat completions endpoint.
pub struct HttpClassifier {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl HttpClassifier {
    /// Create a client. `timeout` bounds each HTTP request.
    pub fn new(
        api_url: &str,
        api_key: String,
        model: &str,
        timeout: Duration,
    ) -> tf_core::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| tf_core::Error::Classifier(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
            api_key,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    fn name(&self) -> &str {
        &self.model
    }

    async fn classify(&self, prompt: &ClassifierPrompt) -> tf_core::Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            max_tokens: MAX_TOKENS,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| tf_core::Error::Classifier(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(tf_core::Error::Classifier(format!(
                "API error {status}: {body}"
            )));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| tf_core::Error::Classifier(format!("invalid response body: {e}")))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| tf_core::Error::Classifier("empty response".into()))
    }
}
