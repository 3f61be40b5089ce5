use std::sync::Arc;

use async_trait::async_trait;
use gemini_rust::{
    Content, Gemini, GenerationConfig, GenerationResponse, Message, Model, Part, Role,
};
use tracing::{debug, info, instrument, warn};

use crate::{
    error::{MockupError, Result},
    models::{GeneratedImage, ProductImage},
};

/// Default model for slogan (text) generation.
pub const DEFAULT_TEXT_MODEL: &str = "models/gemini-2.5-flash";
/// Default model for advertisement (image) generation.
pub const DEFAULT_IMAGE_MODEL: &str = "models/gemini-2.5-flash-image-preview";

/// The generation capability consumed by the batch orchestrator.
///
/// Both operations take the inline product image plus a text prompt. Failures
/// where the provider answered but produced nothing usable are reported as
/// [`MockupError::NoImageInResponse`] / [`MockupError::NoTextInResponse`],
/// separate from transport errors.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generate prose from the image and prompt. Returns trimmed text.
    async fn generate_text(&self, image: &ProductImage, prompt: &str) -> Result<String>;

    /// Generate an image from the image and prompt.
    async fn generate_image(&self, image: &ProductImage, prompt: &str) -> Result<GeneratedImage>;
}

#[async_trait]
impl<C: GenerationClient + ?Sized> GenerationClient for Arc<C> {
    async fn generate_text(&self, image: &ProductImage, prompt: &str) -> Result<String> {
        (**self).generate_text(image, prompt).await
    }

    async fn generate_image(&self, image: &ProductImage, prompt: &str) -> Result<GeneratedImage> {
        (**self).generate_image(image, prompt).await
    }
}

/// Which operation a [`MockRequest`] stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Text,
    Image,
}

/// Minimal view of a request passed to [`MockHandler`].
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub kind: RequestKind,
    /// The full prompt, including any slogan clause.
    pub prompt: String,
    pub image_mime_type: String,
    pub image_len: usize,
}

/// What a mocked provider "responded" with.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Image(GeneratedImage),
    /// A successful response with no usable content.
    Empty,
}

/// Handler used to short-circuit requests during tests and offline demos.
pub type MockHandler = Arc<dyn Fn(MockRequest) -> Result<MockReply> + Send + Sync>;

/// Builder for [`GeminiMockupClient`].
pub struct MockupClientBuilder {
    api_key: String,
    text_model: Model,
    image_model: Model,
    mock_handler: Option<MockHandler>,
}

impl MockupClientBuilder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            text_model: Model::Custom(DEFAULT_TEXT_MODEL.to_string()),
            image_model: Model::Custom(DEFAULT_IMAGE_MODEL.to_string()),
            mock_handler: None,
        }
    }

    /// Read the API key from `GEMINI_API_KEY`, falling back to `API_KEY`.
    pub fn from_env() -> Result<Self> {
        let key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .map_err(|_| {
                MockupError::Config(
                    "API key not set (expected GEMINI_API_KEY or API_KEY)".to_string(),
                )
            })?;
        Ok(Self::new(key))
    }

    /// Set the model used for slogan generation.
    pub fn with_text_model(mut self, model: Model) -> Self {
        self.text_model = model;
        self
    }

    /// Set the model used for advertisement images.
    pub fn with_image_model(mut self, model: Model) -> Self {
        self.image_model = model;
        self
    }

    /// Provide a mock handler to intercept all requests.
    ///
    /// No network calls are made while a handler is installed.
    pub fn with_mock(
        mut self,
        handler: impl Fn(MockRequest) -> Result<MockReply> + Send + Sync + 'static,
    ) -> Self {
        self.mock_handler = Some(Arc::new(handler));
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<GeminiMockupClient> {
        if self.api_key.trim().is_empty() && self.mock_handler.is_none() {
            return Err(MockupError::Config("API key must not be empty".to_string()));
        }

        let text_client = Arc::new(Gemini::with_model(&self.api_key, self.text_model.clone())?);
        let image_client = Arc::new(Gemini::with_model(
            &self.api_key,
            self.image_model.clone(),
        )?);

        Ok(GeminiMockupClient {
            text_client,
            image_client,
            text_model: self.text_model,
            image_model: self.image_model,
            mock_handler: self.mock_handler,
        })
    }
}

/// [`GenerationClient`] backed by the Gemini API.
#[derive(Clone)]
pub struct GeminiMockupClient {
    text_client: Arc<Gemini>,
    image_client: Arc<Gemini>,
    pub text_model: Model,
    pub image_model: Model,
    mock_handler: Option<MockHandler>,
}

impl GeminiMockupClient {
    fn mock(
        &self,
        kind: RequestKind,
        image: &ProductImage,
        prompt: &str,
    ) -> Option<Result<MockReply>> {
        self.mock_handler.as_ref().map(|handler| {
            (handler)(MockRequest {
                kind,
                prompt: prompt.to_string(),
                image_mime_type: image.mime_type.clone(),
                image_len: image.bytes.len(),
            })
        })
    }
}

/// One user turn: the inline image followed by the prompt text.
fn image_prompt_message(image: &ProductImage, prompt: &str) -> Message {
    let mut content = Content::inline_data(image.mime_type.clone(), image.to_base64());
    content.parts.get_or_insert_with(Vec::new).push(Part::Text {
        text: prompt.to_string(),
        thought: None,
        thought_signature: None,
    });

    Message {
        role: Role::User,
        content: content.with_role(Role::User),
    }
}

#[async_trait]
impl GenerationClient for GeminiMockupClient {
    #[instrument(skip_all, fields(prompt_len = prompt.len()))]
    async fn generate_text(&self, image: &ProductImage, prompt: &str) -> Result<String> {
        let text = match self.mock(RequestKind::Text, image, prompt) {
            Some(reply) => match reply? {
                MockReply::Text(text) => text,
                MockReply::Image(_) | MockReply::Empty => String::new(),
            },
            None => {
                debug!(model = %self.text_model.as_str(), "Requesting text generation");
                let response = self
                    .text_client
                    .generate_content()
                    .with_message(image_prompt_message(image, prompt))
                    .execute()
                    .await?;
                response.text()
            }
        };

        let text = text.trim();
        if text.is_empty() {
            warn!("Received empty text response from model");
            return Err(MockupError::NoTextInResponse);
        }
        Ok(text.to_string())
    }

    #[instrument(skip_all, fields(prompt_len = prompt.len()))]
    async fn generate_image(&self, image: &ProductImage, prompt: &str) -> Result<GeneratedImage> {
        if let Some(reply) = self.mock(RequestKind::Image, image, prompt) {
            return match reply? {
                MockReply::Image(generated) => Ok(generated),
                MockReply::Text(_) | MockReply::Empty => Err(MockupError::no_image(prompt)),
            };
        }

        info!("Generating ad for scenario: {}", prompt);
        let response = self
            .image_client
            .generate_content()
            .with_message(image_prompt_message(image, prompt))
            .with_generation_config(GenerationConfig {
                response_modalities: Some(vec!["IMAGE".to_string(), "TEXT".to_string()]),
                ..Default::default()
            })
            .execute()
            .await?;

        extract_image(&response, prompt)
    }
}

/// First inline image of the first candidate.
fn extract_image(response: &GenerationResponse, prompt: &str) -> Result<GeneratedImage> {
    let inline = response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.parts.as_ref())
        .and_then(|parts| {
            parts.iter().find_map(|part| match part {
                Part::InlineData { inline_data, .. } => Some(inline_data),
                _ => None,
            })
        });

    match inline {
        Some(blob) => GeneratedImage::from_base64(&blob.data, blob.mime_type.clone()),
        None => {
            warn!(
                model_text = %response.text(),
                "No image part found in response for scenario: \"{}\"",
                prompt
            );
            Err(MockupError::no_image(prompt))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> ProductImage {
        ProductImage::new(vec![0x89, 0x50, 0x4e, 0x47], "image/png")
    }

    #[tokio::test]
    async fn test_mock_image_reply_passes_through() {
        let client = MockupClientBuilder::new("mock-key")
            .with_mock(|req| {
                assert_eq!(req.kind, RequestKind::Image);
                assert_eq!(req.image_mime_type, "image/png");
                assert_eq!(req.image_len, 4);
                Ok(MockReply::Image(GeneratedImage::new(vec![7u8], "image/png")))
            })
            .build()
            .unwrap();

        let image = client.generate_image(&product(), "billboard").await.unwrap();
        assert_eq!(image.bytes, vec![7]);
    }

    #[tokio::test]
    async fn test_text_only_reply_is_missing_image() {
        let client = MockupClientBuilder::new("mock-key")
            .with_mock(|_| Ok(MockReply::Text("I can't draw that.".to_string())))
            .build()
            .unwrap();

        let err = client.generate_image(&product(), "billboard").await.unwrap_err();
        assert!(matches!(err, MockupError::NoImageInResponse { ref prompt } if prompt == "billboard"));
    }

    #[tokio::test]
    async fn test_blank_text_reply_is_missing_text() {
        let client = MockupClientBuilder::new("mock-key")
            .with_mock(|_| Ok(MockReply::Text("   ".to_string())))
            .build()
            .unwrap();

        let err = client.generate_text(&product(), "slogan").await.unwrap_err();
        assert!(matches!(err, MockupError::NoTextInResponse));
    }

    #[tokio::test]
    async fn test_mock_errors_propagate() {
        let client = MockupClientBuilder::new("mock-key")
            .with_mock(|_| Err(MockupError::Context("offline".to_string())))
            .build()
            .unwrap();

        let err = client.generate_text(&product(), "slogan").await.unwrap_err();
        assert!(matches!(err, MockupError::Context(_)));
    }

    fn response(json: serde_json::Value) -> GenerationResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_extracts_first_inline_image() {
        let res = response(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "Here is your billboard." },
                        { "inlineData": { "mimeType": "image/png", "data": "AQID" } },
                        { "inlineData": { "mimeType": "image/jpeg", "data": "BAUG" } }
                    ]
                }
            }]
        }));

        let image = extract_image(&res, "billboard").unwrap();
        assert_eq!(image.bytes, vec![1, 2, 3]);
        assert_eq!(image.mime_type, "image/png");
    }

    #[test]
    fn test_text_only_response_has_no_image() {
        let res = response(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": "I can't place the product there." }]
                }
            }]
        }));

        let err = extract_image(&res, "billboard").unwrap_err();
        assert!(matches!(err, MockupError::NoImageInResponse { ref prompt } if prompt == "billboard"));
    }

    #[test]
    fn test_response_without_candidates_has_no_image() {
        let res = response(serde_json::json!({ "candidates": [] }));

        let err = extract_image(&res, "billboard").unwrap_err();
        assert!(matches!(err, MockupError::NoImageInResponse { .. }));
    }

    #[test]
    fn test_invalid_inline_payload_is_decode_error() {
        let res = response(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "inlineData": { "mimeType": "image/png", "data": "not*base64!" } }]
                }
            }]
        }));

        let err = extract_image(&res, "billboard").unwrap_err();
        assert!(matches!(err, MockupError::Decode(_)));
    }

    #[test]
    fn test_empty_api_key_rejected_without_mock() {
        let err = MockupClientBuilder::new("  ").build().err().unwrap();
        assert!(matches!(err, MockupError::Config(_)));
    }
}
