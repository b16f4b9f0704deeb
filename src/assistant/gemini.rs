//! HTTP assistant backed by a Gemini-style `generateContent` endpoint.

use core::future::Future;
use core::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret as _, SecretString};

use super::wire::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, ImageConfig, Part,
    Tool,
};
use super::{
    ANALYSIS_FALLBACK, ANALYSIS_INCONCLUSIVE, AspectRatio, Assistant, CHAT_FALLBACK, CHAT_SILENT,
    ChatMessage, ChatRole, Headline, ImageData, TEXT_FALLBACK, TEXT_SILENT, fallback_headlines,
    parse_headlines,
};
use crate::config::AssistantConfig;
use crate::error::{Result, StorefrontError};

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Resolution class requested for generated images.
const IMAGE_SIZE: &str = "1K";

/// Prompt used to fetch headlines.
const NEWS_PROMPT: &str =
    "5 recent headlines about Bitcoin and Monero. Reply with a JSON array of {title, source}.";

/// Builder for constructing a [`GeminiClient`].
#[derive(Debug)]
pub struct GeminiClientBuilder {
    /// API key for authentication.
    api_key: Option<SecretString>,
    /// Endpoint, models and timeout.
    config: AssistantConfig,
}

impl GeminiClientBuilder {
    /// Sets the API key.
    #[inline]
    #[must_use]
    pub fn api_key(mut self, key: SecretString) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Overrides the base URL (useful for testing with a mock server).
    #[inline]
    #[must_use]
    pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Replaces endpoint, models and timeout with `config`.
    #[inline]
    #[must_use]
    pub fn config(mut self, config: AssistantConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::MissingApiKey`] if no key was provided and
    /// [`StorefrontError::Http`] if the HTTP client fails to build.
    #[inline]
    pub fn build(self) -> Result<GeminiClient> {
        let api_key = self.api_key.ok_or(StorefrontError::MissingApiKey)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build()?;
        Ok(GeminiClient {
            http,
            api_key,
            config: self.config,
        })
    }
}

/// Assistant client for a Gemini-style API.
///
/// The `try_*` methods surface every failure as an error. The [`Assistant`]
/// implementation wraps them and substitutes fallbacks.
///
/// Use [`GeminiClient::builder()`] to construct an instance.
#[derive(Debug)]
pub struct GeminiClient {
    /// Underlying HTTP client.
    http: reqwest::Client,
    /// API key sent with every request.
    api_key: SecretString,
    /// Endpoint and model names.
    config: AssistantConfig,
}

impl GeminiClient {
    /// Creates a new builder with the default endpoint and models.
    #[inline]
    #[must_use]
    pub fn builder() -> GeminiClientBuilder {
        GeminiClientBuilder {
            api_key: None,
            config: AssistantConfig::default(),
        }
    }

    /// Answers a free-form question.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server returns a
    /// non-success status, or the answer is empty.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub async fn try_complete_text(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest::user(vec![Part::text(prompt)]);
        let response = self.generate(&self.config.reasoning_model, &request).await?;
        non_empty(response.text())
    }

    /// Describes an image.
    ///
    /// # Errors
    ///
    /// Same as [`GeminiClient::try_complete_text`].
    #[inline]
    #[tracing::instrument(skip_all, fields(mime = %image.mime_type, bytes = image.bytes.len()))]
    pub async fn try_analyze_image(&self, image: &ImageData, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest::user(vec![inline_part(image), Part::text(prompt)]);
        let response = self.generate(&self.config.reasoning_model, &request).await?;
        non_empty(response.text())
    }

    /// Generates an image.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server returns a
    /// non-success status, no image is returned, or it is not valid base64.
    #[inline]
    #[tracing::instrument(skip_all, fields(ratio = aspect_ratio.as_str()))]
    pub async fn try_generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<ImageData> {
        let mut request = GenerateContentRequest::user(vec![Part::text(prompt)]);
        request.generation_config = Some(GenerationConfig {
            image_config: ImageConfig {
                aspect_ratio: aspect_ratio.as_str().to_owned(),
                image_size: IMAGE_SIZE.to_owned(),
            },
        });
        let response = self.generate(&self.config.image_model, &request).await?;
        decode_image(&response)
    }

    /// Edits an image.
    ///
    /// # Errors
    ///
    /// Same as [`GeminiClient::try_generate_image`].
    #[inline]
    #[tracing::instrument(skip_all)]
    pub async fn try_edit_image(&self, image: &ImageData, prompt: &str) -> Result<ImageData> {
        let request = GenerateContentRequest::user(vec![inline_part(image), Part::text(prompt)]);
        let response = self.generate(&self.config.edit_model, &request).await?;
        decode_image(&response)
    }

    /// Fetches headlines using web search grounding.
    ///
    /// An answer without a JSON array yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server returns a
    /// non-success status or the array does not parse as headlines.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub async fn try_fetch_news_headlines(&self) -> Result<Vec<Headline>> {
        let mut request = GenerateContentRequest::user(vec![Part::text(NEWS_PROMPT)]);
        request.tools.push(Tool {
            google_search: serde_json::Map::new(),
        });
        let response = self.generate(&self.config.text_model, &request).await?;
        parse_headlines(&response.text())
    }

    /// Rewrites a listing description in under forty words.
    ///
    /// # Errors
    ///
    /// Same as [`GeminiClient::try_complete_text`].
    #[inline]
    #[tracing::instrument(skip_all, fields(product = name))]
    pub async fn try_enhance_description(&self, name: &str, description: &str) -> Result<String> {
        let prompt = format!(
            "Write a punchy storefront description for \"{name}\". Context: \"{description}\". Under 40 words."
        );
        let request = GenerateContentRequest::user(vec![Part::text(prompt)]);
        let response = self.generate(&self.config.text_model, &request).await?;
        non_empty(response.text().trim().to_owned())
    }

    /// Sends `message` after the earlier turns in `history`.
    ///
    /// # Errors
    ///
    /// Same as [`GeminiClient::try_complete_text`].
    #[inline]
    #[tracing::instrument(skip_all, fields(turns = history.len()))]
    pub async fn try_chat(&self, history: &[ChatMessage], message: &str) -> Result<String> {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|turn| Content {
                role: Some(role_name(turn.role).to_owned()),
                parts: vec![Part::text(turn.text.as_str())],
            })
            .collect();
        contents.push(Content {
            role: Some(role_name(ChatRole::User).to_owned()),
            parts: vec![Part::text(message)],
        });
        let request = GenerateContentRequest {
            contents,
            ..GenerateContentRequest::default()
        };
        let response = self.generate(&self.config.reasoning_model, &request).await?;
        non_empty(response.text())
    }

    /// Posts a `generateContent` request for `model`.
    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = format!(
            "{}/v1beta/models/{model}:generateContent",
            self.config.base_url.trim_end_matches('/')
        );
        tracing::trace!(%url, "sending generateContent request");
        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Checks the status and deserializes the body.
    async fn handle_response(response: reqwest::Response) -> Result<GenerateContentResponse> {
        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(StorefrontError::from)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_owned());
            Err(StorefrontError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

impl Assistant for GeminiClient {
    #[inline]
    fn complete_text(&self, prompt: &str) -> impl Future<Output = String> + Send {
        async move {
            text_or_fallback(
                self.try_complete_text(prompt).await,
                TEXT_SILENT,
                TEXT_FALLBACK,
            )
        }
    }

    #[inline]
    fn analyze_image(
        &self,
        image: &ImageData,
        prompt: &str,
    ) -> impl Future<Output = String> + Send {
        async move {
            text_or_fallback(
                self.try_analyze_image(image, prompt).await,
                ANALYSIS_INCONCLUSIVE,
                ANALYSIS_FALLBACK,
            )
        }
    }

    #[inline]
    fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> impl Future<Output = Option<ImageData>> + Send {
        async move {
            self.try_generate_image(prompt, aspect_ratio)
                .await
                .map_err(|err| warn_fallback("generate_image", &err))
                .ok()
        }
    }

    #[inline]
    fn edit_image(
        &self,
        image: &ImageData,
        prompt: &str,
    ) -> impl Future<Output = Option<ImageData>> + Send {
        async move {
            self.try_edit_image(image, prompt)
                .await
                .map_err(|err| warn_fallback("edit_image", &err))
                .ok()
        }
    }

    #[inline]
    fn fetch_news_headlines(&self) -> impl Future<Output = Vec<Headline>> + Send {
        async move {
            self.try_fetch_news_headlines().await.unwrap_or_else(|err| {
                warn_fallback("fetch_news_headlines", &err);
                fallback_headlines()
            })
        }
    }

    #[inline]
    fn enhance_description(
        &self,
        name: &str,
        description: &str,
    ) -> impl Future<Output = String> + Send {
        async move {
            self.try_enhance_description(name, description)
                .await
                .unwrap_or_else(|err| {
                    warn_fallback("enhance_description", &err);
                    description.to_owned()
                })
        }
    }

    #[inline]
    fn chat(
        &self,
        history: &[ChatMessage],
        message: &str,
    ) -> impl Future<Output = String> + Send {
        async move {
            text_or_fallback(
                self.try_chat(history, message).await,
                CHAT_SILENT,
                CHAT_FALLBACK,
            )
        }
    }
}

/// Wire name of a chat role.
const fn role_name(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Model => "model",
    }
}

/// Encodes an image as an inline data part.
fn inline_part(image: &ImageData) -> Part {
    Part::inline(image.mime_type.clone(), STANDARD.encode(&image.bytes))
}

/// Decodes the first inline image of a response.
fn decode_image(response: &GenerateContentResponse) -> Result<ImageData> {
    let inline = response
        .inline_data()
        .ok_or(StorefrontError::EmptyResponse)?;
    let bytes = STANDARD.decode(&inline.data)?;
    Ok(ImageData::new(inline.mime_type.as_str(), bytes))
}

/// Treats a blank answer as an empty response.
fn non_empty(text: String) -> Result<String> {
    if text.is_empty() {
        Err(StorefrontError::EmptyResponse)
    } else {
        Ok(text)
    }
}

/// Maps a text result to its answer or one of two fallbacks.
fn text_or_fallback(result: Result<String>, silent: &str, offline: &str) -> String {
    match result {
        Ok(text) => text,
        Err(StorefrontError::EmptyResponse) => silent.to_owned(),
        Err(err) => {
            warn_fallback("text", &err);
            offline.to_owned()
        }
    }
}

/// Logs that a fallback replaced a failed request.
fn warn_fallback(operation: &str, err: &StorefrontError) {
    tracing::warn!(operation, error = %err, "assistant request failed, using fallback");
}
