//! Ollama-backed caption provider.
//!
//! Implements [`CaptionService`] against Ollama's `/api/generate` endpoint:
//! a vision model describes the photo, a text model rewrites the description
//! into a warm caption.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::CaptionService;
use crate::config::CaptionConfig;
use crate::error::ServiceError;

const DESCRIBE_PROMPT: &str =
    "Describe this photo in one or two plain English sentences. Mention the main objects, \
     people, animals and the setting. Do not speculate.";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

pub struct OllamaCaptioner {
    client: reqwest::Client,
    base_url: String,
    vision_model: String,
    caption_model: String,
    language: String,
}

impl OllamaCaptioner {
    pub fn new(config: &CaptionConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: config.ollama_url.trim_end_matches('/').to_string(),
            vision_model: config.vision_model.clone(),
            caption_model: config.caption_model.clone(),
            language: config.language.clone(),
        })
    }

    async fn generate(&self, request: GenerateRequest<'_>) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Malformed(e.to_string()))?;
        Ok(parsed.response)
    }
}

#[async_trait]
impl CaptionService for OllamaCaptioner {
    async fn describe(&self, image: &Path) -> Result<Option<String>, ServiceError> {
        let bytes = tokio::fs::read(image).await?;
        tracing::debug!(image = %image.display(), bytes = bytes.len(), "requesting description");

        let text = self
            .generate(GenerateRequest {
                model: &self.vision_model,
                prompt: DESCRIBE_PROMPT.to_string(),
                stream: false,
                images: vec![BASE64.encode(&bytes)],
            })
            .await?;

        let text = strip_reasoning(&text).trim().to_string();
        Ok((!text.is_empty()).then_some(text))
    }

    async fn rewrite(&self, description: &str, date_context: &str) -> Result<String, ServiceError> {
        let text = self
            .generate(GenerateRequest {
                model: &self.caption_model,
                prompt: caption_prompt(description, date_context, &self.language),
                stream: false,
                images: Vec::new(),
            })
            .await?;
        Ok(clean_caption(&text))
    }
}

/// Build the rewrite prompt for the caption model.
pub fn caption_prompt(description: &str, date_context: &str, language: &str) -> String {
    format!(
        "You are writing a caption for a photo memory. Turn the technical description of \
         the image into ONE warm, nostalgic sentence of 15-25 words in {language}.\n\
         \n\
         Use this information:\n\
         - Technical description: \"{description}\"\n\
         - Time context: \"{date_context}\"\n\
         \n\
         Rules:\n\
         - Write ONLY the final caption in {language}.\n\
         - Do not translate the description literally.\n\
         - No extra comments, notes or greetings.\n\
         - Avoid generic phrases like \"what a nice day\"; be concrete about what the photo shows.\n\
         - If the description mentions an object, a person, an animal or a place, centre the caption on it with a personal touch.\n\
         - Evoke the feeling of remembering this exact moment."
    )
}

/// Trim whitespace and wrapping quotes from a model reply.
pub fn clean_caption(raw: &str) -> String {
    strip_reasoning(raw)
        .trim()
        .trim_matches('"')
        .trim_matches('\'')
        .trim()
        .to_string()
}

/// Drop a leading `<think>...</think>` block emitted by reasoning models.
fn strip_reasoning(raw: &str) -> &str {
    match raw.find("</think>") {
        Some(end) if raw.trim_start().starts_with("<think>") => &raw[end + "</think>".len()..],
        _ => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_caption_strips_quotes_and_whitespace() {
        assert_eq!(clean_caption("  \"A sunny day by the lake\"\n"), "A sunny day by the lake");
        assert_eq!(clean_caption("'Quoted'"), "Quoted");
        assert_eq!(clean_caption("   "), "");
    }

    #[test]
    fn clean_caption_drops_reasoning_block() {
        let raw = "<think>the user wants a caption</think>\n\"Grandma's garden in bloom\"";
        assert_eq!(clean_caption(raw), "Grandma's garden in bloom");
    }

    #[test]
    fn prompt_embeds_description_date_and_language() {
        let prompt = caption_prompt("a red bicycle", "taken 02 June, 2019", "Ukrainian");
        assert!(prompt.contains("\"a red bicycle\""));
        assert!(prompt.contains("taken 02 June, 2019"));
        assert!(prompt.contains("15-25 words in Ukrainian"));
    }

    #[test]
    fn request_omits_empty_images() {
        let req = GenerateRequest {
            model: "m",
            prompt: "p".into(),
            stream: false,
            images: Vec::new(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("images").is_none());
        assert_eq!(value["stream"], false);
    }
}
