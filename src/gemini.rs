use std::time::Duration;

use async_trait::async_trait;
use eyre::Result;
use log::debug;
use serde::Serialize;

use crate::AnalysisError;
use crate::pipeline::ModelClient;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Checked in order; `GOOGLE_BARD_KEY` is the legacy name
pub const API_KEY_VARS: [&str; 3] = ["GOOGLE_API_KEY", "GEMINI_API_KEY", "GOOGLE_BARD_KEY"];

pub const TRANSCRIPT_PLACEHOLDER: &str = "{transcript}";

pub const DEFAULT_PROMPT: &str = "You are reviewing the transcript of a YouTube video.

Evaluate the video and answer ONLY with a single JSON object, no prose and no
markdown. Use exactly these keys:
  topic          - the main subject, in a few words
  summary        - two or three sentences
  audience       - who the video is for
  tone           - one of \"informative\", \"persuasive\", \"entertaining\", \"other\"
  accuracy_notes - claims that look doubtful, or \"none\"
  rating         - overall quality from 1 to 10 (number)

Transcript:
{transcript}";

/// Fill the template with the transcript.
///
/// A template without a `{transcript}` placeholder gets the transcript appended.
pub fn compose_prompt(template: &str, transcript: &str) -> String {
    if template.contains(TRANSCRIPT_PLACEHOLDER) {
        template.replace(TRANSCRIPT_PLACEHOLDER, transcript)
    } else {
        format!("{}\n\nTranscript:\n{transcript}", template.trim_end())
    }
}

/// First non-empty API key from the environment
pub fn api_key_from_env() -> Option<String> {
    API_KEY_VARS.iter().find_map(|var| {
        std::env::var(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

/// Gemini `generateContent` client, one request per call
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
    timeout: Duration,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, api_key: String, settings: &crate::config::Settings) -> Self {
        Self {
            client,
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.trim_start_matches("models/").to_string(),
            temperature: settings.temperature,
            max_output_tokens: settings.max_output_tokens,
            timeout: settings.timeout,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        debug!("Calling Gemini model {} ({} prompt chars)", self.model, prompt.len());

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            eyre::bail!("Gemini API returned {status}: {body}");
        }

        let json: serde_json::Value = resp.json().await?;
        extract_gemini_text(&json)
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn ask(&self, prompt: &str) -> std::result::Result<String, AnalysisError> {
        self.generate(prompt).await.map_err(|e| AnalysisError::model(format!("{e:#}")))
    }
}

fn extract_gemini_text(json: &serde_json::Value) -> Result<String> {
    let text = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if !text.trim().is_empty() {
        return Ok(text);
    }

    match json.get("promptFeedback") {
        Some(feedback) => eyre::bail!("model returned no text; feedback: {feedback}"),
        None => eyre::bail!("unexpected Gemini API response format"),
    }
}
