//! HTTP text-to-image provider for collage backgrounds.
//!
//! POSTs `{prompt, negative_prompt, width, height}` as JSON to the configured
//! endpoint. The reply is either raw image bytes (`image/*`) or JSON carrying a
//! base64 `image` field.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::DynamicImage;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use super::BackgroundImageService;
use crate::config::BackgroundConfig;
use crate::error::ServiceError;

#[derive(Debug, Serialize)]
struct InferRequest<'a> {
    prompt: &'a str,
    negative_prompt: &'a str,
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct InferResponse {
    image: String,
}

pub struct HttpBackgroundService {
    client: reqwest::Client,
    endpoint: Option<String>,
    width: u32,
    height: u32,
}

impl HttpBackgroundService {
    pub fn new(config: &BackgroundConfig, (width, height): (u32, u32)) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            width,
            height,
        })
    }
}

#[async_trait]
impl BackgroundImageService for HttpBackgroundService {
    async fn generate(
        &self,
        prompt: &str,
        negative_prompt: &str,
    ) -> Result<DynamicImage, ServiceError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or(ServiceError::NotConfigured("background.endpoint"))?;

        let response = self
            .client
            .post(endpoint)
            .json(&InferRequest {
                prompt,
                negative_prompt,
                width: self.width,
                height: self.height,
            })
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

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        let bytes = response.bytes().await?;
        decode_reply(&bytes, is_json)
    }
}

/// Decode a provider reply into an image.
fn decode_reply(bytes: &[u8], is_json: bool) -> Result<DynamicImage, ServiceError> {
    if !is_json {
        return Ok(image::load_from_memory(bytes)?);
    }
    let parsed: InferResponse =
        serde_json::from_slice(bytes).map_err(|e| ServiceError::Malformed(e.to_string()))?;
    // Tolerate data URLs as well as bare base64.
    let payload = parsed
        .image
        .split_once("base64,")
        .map(|(_, data)| data)
        .unwrap_or(&parsed.image);
    let raw = BASE64
        .decode(payload.trim())
        .map_err(|e| ServiceError::Malformed(format!("bad base64 image: {e}")))?;
    Ok(image::load_from_memory(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(4, 3, Rgb([10, 20, 30]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn decodes_raw_image_bytes() {
        let img = decode_reply(&png_bytes(), false).unwrap();
        assert_eq!((img.width(), img.height()), (4, 3));
    }

    #[test]
    fn decodes_json_data_url() {
        let body = serde_json::json!({
            "image": format!("data:image/png;base64,{}", BASE64.encode(png_bytes()))
        });
        let img = decode_reply(body.to_string().as_bytes(), true).unwrap();
        assert_eq!((img.width(), img.height()), (4, 3));
    }

    #[test]
    fn rejects_json_without_image() {
        let err = decode_reply(br#"{"error":"queue full"}"#, true).unwrap_err();
        assert!(matches!(err, ServiceError::Malformed(_)));
    }

    #[tokio::test]
    async fn unconfigured_endpoint_fails() {
        let service =
            HttpBackgroundService::new(&BackgroundConfig::default(), (1080, 1920)).unwrap();
        let err = service.generate("prompt", "neg").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotConfigured(_)));
    }
}
