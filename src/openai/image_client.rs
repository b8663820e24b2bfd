use crate::{
    config::Config,
    error::{ImageGenError, Result},
    logger,
    models::{ApiErrorEnvelope, GenerationRequest, ImagesRequestBody, ImagesResponse, Quality},
    openai::ImageGenerator,
};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use uuid::Uuid;

#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    quality: Quality,
}

impl ImageClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            endpoint: format!("{}/images/generations", config.base_url),
            model: config.model.clone(),
            quality: config.quality,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        let auth = format!("Bearer {}", self.api_key)
            .parse()
            .map_err(|_| ImageGenError::Config("API key contains invalid characters".into()))?;
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        Ok(headers)
    }
}

/// Turns a non-success body into an error, preferring the service's own message.
pub(crate) fn api_error(status: StatusCode, body: &str) -> ImageGenError {
    let message = serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                body.trim().to_string()
            }
        });
    ImageGenError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl ImageGenerator for ImageClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>> {
        let request_id = Uuid::new_v4().to_string();
        let body = ImagesRequestBody {
            model: &self.model,
            prompt: &request.prompt,
            n: request.count,
            size: request.size,
            quality: self.quality,
            response_format: "b64_json",
        };

        log::info!(
            "Generating image with model: {} size: {} n: {} [req:{}]",
            self.model,
            request.size,
            request.count,
            request_id
        );
        let _timer = logger::timer(&format!("images/generations [req:{}]", request_id));

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| ImageGenError::Request(format!("OpenAI request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ImageGenError::Response(e.to_string()))?;

        if !status.is_success() {
            log::warn!("Image request rejected with {} [req:{}]", status, request_id);
            return Err(api_error(status, &text));
        }

        let parsed: ImagesResponse =
            serde_json::from_str(&text).map_err(|e| ImageGenError::Response(e.to_string()))?;
        if let Some(revised) = parsed.data.iter().find_map(|d| d.revised_prompt.as_deref()) {
            log::debug!("Revised prompt: {} [req:{}]", revised, request_id);
        }

        let payloads = parsed.into_payloads();
        log::info!(
            "Received {} image payload(s) [req:{}]",
            payloads.len(),
            request_id
        );
        Ok(payloads)
    }
}
