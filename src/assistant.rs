//! AI assistant contract.
//!
//! The storefront treats the assistant as an opaque completion service.
//! Every [`Assistant`] method degrades to a fixed fallback value on failure
//! and never returns an error to the caller.
//!
//! Two implementations are provided:
//!
//! - [`OfflineAssistant`] always answers with the fallbacks.
//! - [`GeminiClient`] (feature `assistant`) talks to a Gemini-style
//!   `generateContent` endpoint over HTTP.

use core::future::Future;

use serde::{Deserialize, Serialize};

#[cfg(feature = "assistant")]
mod gemini;
mod offline;
#[cfg(feature = "assistant")]
mod wire;

#[cfg(feature = "assistant")]
pub use gemini::{GeminiClient, GeminiClientBuilder};
pub use offline::OfflineAssistant;

/// Answer when a text request fails.
pub const TEXT_FALLBACK: &str = "Oracle offline.";

/// Answer when a text request succeeds with no text.
pub const TEXT_SILENT: &str = "The Oracle is silent.";

/// Answer when image analysis fails.
pub const ANALYSIS_FALLBACK: &str = "Scanner offline.";

/// Answer when image analysis succeeds with no text.
pub const ANALYSIS_INCONCLUSIVE: &str = "Inconclusive.";

/// Answer when a chat turn fails.
pub const CHAT_FALLBACK: &str = "Connection lost.";

/// Answer when a chat turn succeeds with no text.
pub const CHAT_SILENT: &str = "System error.";

/// Video returned by [`Assistant::generate_video`]. Generation is stubbed.
pub const PLACEHOLDER_VIDEO_URL: &str =
    "https://test-videos.co.uk/vids/bigbuckbunny/mp4/h264/360/Big_Buck_Bunny_360_10s_1MB.mp4";

/// Aspect ratio requested for a generated image.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AspectRatio {
    /// 1:1.
    #[default]
    Square,
    /// 3:4.
    Portrait,
    /// 4:3.
    Landscape,
    /// 9:16.
    Tall,
    /// 16:9.
    Wide,
}

impl AspectRatio {
    /// The ratio as sent on the wire, e.g. `"16:9"`.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Portrait => "3:4",
            Self::Landscape => "4:3",
            Self::Tall => "9:16",
            Self::Wide => "16:9",
        }
    }
}

impl core::str::FromStr for AspectRatio {
    type Err = String;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::Square,
            Self::Portrait,
            Self::Landscape,
            Self::Tall,
            Self::Wide,
        ]
        .into_iter()
        .find(|ratio| ratio.as_str() == s)
        .ok_or_else(|| format!("unsupported aspect ratio: {s}"))
    }
}

/// An image passed to or returned by the assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// MIME type, e.g. `image/png`.
    pub mime_type: String,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

impl ImageData {
    /// Wraps raw bytes with their MIME type.
    #[inline]
    #[must_use]
    pub fn new<M: Into<String>>(mime_type: M, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// A news headline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    /// Headline text.
    pub title: String,
    /// Publisher.
    pub source: String,
}

/// Headlines returned when fetching news fails.
#[inline]
#[must_use]
pub fn fallback_headlines() -> Vec<Headline> {
    vec![Headline {
        title: "BTC Volatility Alert".to_owned(),
        source: "Oracle".to_owned(),
    }]
}

/// Who sent a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The shopper.
    User,
    /// The assistant.
    Model,
}

/// One turn of a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Sender.
    pub role: ChatRole,
    /// Message text.
    pub text: String,
}

impl ChatMessage {
    /// A message from the shopper.
    #[inline]
    #[must_use]
    pub fn user<T: Into<String>>(text: T) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    /// A message from the assistant.
    #[inline]
    #[must_use]
    pub fn model<T: Into<String>>(text: T) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// Text and image completion service with fallbacks instead of errors.
pub trait Assistant: core::fmt::Debug + Send + Sync {
    /// Answers a free-form question.
    ///
    /// Falls back to [`TEXT_FALLBACK`], or [`TEXT_SILENT`] on an empty answer.
    fn complete_text(&self, prompt: &str) -> impl Future<Output = String> + Send;

    /// Describes an image.
    ///
    /// Falls back to [`ANALYSIS_FALLBACK`], or [`ANALYSIS_INCONCLUSIVE`] on an
    /// empty answer.
    fn analyze_image(
        &self,
        image: &ImageData,
        prompt: &str,
    ) -> impl Future<Output = String> + Send;

    /// Generates an image. Returns `None` on failure.
    fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> impl Future<Output = Option<ImageData>> + Send;

    /// Edits an image according to `prompt`. Returns `None` on failure.
    fn edit_image(
        &self,
        image: &ImageData,
        prompt: &str,
    ) -> impl Future<Output = Option<ImageData>> + Send;

    /// Generates a video and returns its URL.
    ///
    /// Video generation is not available; this always yields
    /// [`PLACEHOLDER_VIDEO_URL`].
    #[inline]
    fn generate_video(&self, prompt: &str) -> impl Future<Output = String> + Send {
        tracing::debug!(prompt_len = prompt.len(), "video generation stubbed");
        async { PLACEHOLDER_VIDEO_URL.to_owned() }
    }

    /// Fetches recent headlines. Falls back to [`fallback_headlines`].
    fn fetch_news_headlines(&self) -> impl Future<Output = Vec<Headline>> + Send;

    /// Rewrites a listing description. Falls back to `description` unchanged.
    fn enhance_description(
        &self,
        name: &str,
        description: &str,
    ) -> impl Future<Output = String> + Send;

    /// Continues a chat conversation.
    ///
    /// Falls back to [`CHAT_FALLBACK`], or [`CHAT_SILENT`] on an empty reply.
    fn chat(
        &self,
        history: &[ChatMessage],
        message: &str,
    ) -> impl Future<Output = String> + Send;
}

/// Extracts the JSON array embedded in free text.
///
/// Text without an array yields an empty list.
///
/// # Errors
///
/// Returns [`crate::StorefrontError::Serialization`] if the array does not
/// parse as headlines.
#[cfg(any(test, feature = "assistant"))]
pub(crate) fn parse_headlines(text: &str) -> crate::Result<Vec<Headline>> {
    let Some(json) = text
        .find('[')
        .zip(text.rfind(']'))
        .and_then(|(start, end)| text.get(start..=end))
    else {
        return Ok(Vec::new());
    };
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorefrontError;

    #[test]
    fn aspect_ratio_round_trips_wire_form() {
        assert_eq!(AspectRatio::Wide.as_str(), "16:9");
        assert_eq!("9:16".parse::<AspectRatio>().unwrap(), AspectRatio::Tall);
        assert!("2:1".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn headlines_are_extracted_from_prose() {
        let text = r#"Here you go:
            [{"title": "Halving soon", "source": "CoinDesk"},
             {"title": "Fees spike", "source": "The Block"}]
            Stay safe."#;
        let headlines = parse_headlines(text).unwrap();
        assert_eq!(headlines.len(), 2);
        assert_eq!(headlines[1].source, "The Block");
    }

    #[test]
    fn text_without_array_yields_nothing() {
        assert!(parse_headlines("no news today").unwrap().is_empty());
        assert!(parse_headlines("] backwards [").unwrap().is_empty());
    }

    #[test]
    fn malformed_array_is_an_error() {
        assert!(matches!(
            parse_headlines("[not json]"),
            Err(StorefrontError::Serialization(_))
        ));
    }

    #[test]
    fn chat_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::model("hi")).unwrap();
        assert_eq!(json, r#"{"role":"model","text":"hi"}"#);
    }
}
