//! Assistant that is permanently offline.

use core::future::{self, Future};

use super::{
    ANALYSIS_FALLBACK, AspectRatio, Assistant, CHAT_FALLBACK, ChatMessage, Headline, ImageData,
    TEXT_FALLBACK, fallback_headlines,
};

/// Answers every request with its fallback value.
///
/// Used when no API key is configured, and as a predictable stand-in in
/// tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineAssistant;

impl Assistant for OfflineAssistant {
    #[inline]
    fn complete_text(&self, _prompt: &str) -> impl Future<Output = String> + Send {
        future::ready(TEXT_FALLBACK.to_owned())
    }

    #[inline]
    fn analyze_image(
        &self,
        _image: &ImageData,
        _prompt: &str,
    ) -> impl Future<Output = String> + Send {
        future::ready(ANALYSIS_FALLBACK.to_owned())
    }

    #[inline]
    fn generate_image(
        &self,
        _prompt: &str,
        _aspect_ratio: AspectRatio,
    ) -> impl Future<Output = Option<ImageData>> + Send {
        future::ready(None)
    }

    #[inline]
    fn edit_image(
        &self,
        _image: &ImageData,
        _prompt: &str,
    ) -> impl Future<Output = Option<ImageData>> + Send {
        future::ready(None)
    }

    #[inline]
    fn fetch_news_headlines(&self) -> impl Future<Output = Vec<Headline>> + Send {
        future::ready(fallback_headlines())
    }

    #[inline]
    fn enhance_description(
        &self,
        _name: &str,
        description: &str,
    ) -> impl Future<Output = String> + Send {
        future::ready(description.to_owned())
    }

    #[inline]
    fn chat(
        &self,
        _history: &[ChatMessage],
        _message: &str,
    ) -> impl Future<Output = String> + Send {
        future::ready(CHAT_FALLBACK.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::PLACEHOLDER_VIDEO_URL;

    #[tokio::test]
    async fn every_method_returns_fallback() {
        let assistant = OfflineAssistant;
        let image = ImageData::new("image/jpeg", vec![0xFF, 0xD8]);
        assert_eq!(assistant.complete_text("hello").await, TEXT_FALLBACK);
        assert_eq!(assistant.analyze_image(&image, "purity?").await, ANALYSIS_FALLBACK);
        assert!(assistant.generate_image("logo", AspectRatio::Square).await.is_none());
        assert!(assistant.edit_image(&image, "brighter").await.is_none());
        assert_eq!(assistant.generate_video("teaser").await, PLACEHOLDER_VIDEO_URL);
        assert_eq!(assistant.fetch_news_headlines().await, fallback_headlines());
        assert_eq!(assistant.chat(&[], "hi").await, CHAT_FALLBACK);
    }

    #[tokio::test]
    async fn enhance_keeps_original_description() {
        let enhanced = OfflineAssistant
            .enhance_description("Hemp Seed Oil", "Cold-pressed.")
            .await;
        assert_eq!(enhanced, "Cold-pressed.");
    }
}
