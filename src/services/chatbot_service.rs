//! Travel chatbot.
//!
//! Replies come from Gemini when an API key is configured. Without one, or when generation fails,
//! a canned reply is picked at random; provider errors never reach the caller.

use std::time::Duration;

use log::{info, warn};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::ChatbotError;

pub const CANNED_REPLIES: [&str; 4] = [
    "I'm sorry, but my AI brain is currently offline. Please set up a valid Gemini API key to enable full chatbot functionality!",
    "As a temporary assistant, I can tell you that travel is amazing! What else can I help with?",
    "Without a working API key, I'm limited, but I recommend checking out popular destinations like Paris or Tokyo.",
    "Let's plan a trip! Where would you like to go? (Note: Full AI responses require a valid Gemini API key.)",
];

pub trait TextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ChatbotError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .reduce(|mut acc, text| {
                acc.push_str(&text);
                acc
            })
    }
}

/// Gemini `generateContent` over REST.
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ChatbotError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// `None` when no Gemini key is configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>, ChatbotError> {
        config
            .gemini_api_key
            .as_ref()
            .map(|key| Self::new(key, &config.gemini_model, &config.gemini_api_base))
            .transpose()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ChatbotError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .http_client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatbotError::Generation(format!(
                "Gemini answered with status {}",
                status
            )));
        }

        let body: GenerateContentResponse = response.json().await?;
        body.into_text()
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ChatbotError::Generation("Gemini returned no text".to_string()))
    }
}

pub struct ChatbotService<G> {
    generator: Option<G>,
    canned: Vec<String>,
}

impl<G: TextGenerator> ChatbotService<G> {
    pub fn new(generator: Option<G>) -> Self {
        Self::with_canned(generator, CANNED_REPLIES.iter().map(|r| r.to_string()).collect())
    }

    pub fn with_canned(generator: Option<G>, canned: Vec<String>) -> Self {
        if generator.is_none() {
            info!("No GEMINI_API_KEY found, using canned chatbot replies");
        }
        Self { generator, canned }
    }

    pub fn is_generating(&self) -> bool {
        self.generator.is_some()
    }

    pub async fn reply(&self, message: &str) -> Result<String, ChatbotError> {
        if let Some(generator) = &self.generator {
            match generator.generate(message).await {
                Ok(reply) => return Ok(reply),
                Err(e) => warn!("Gemini API error: {}", e),
            }
        }

        self.canned
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or(ChatbotError::NoCannedReply)
    }
}
