//! Request and response bodies of the `generateContent` endpoint.

use serde::{Deserialize, Serialize};

/// Request body.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    /// Conversation turns, oldest first.
    pub(crate) contents: Vec<Content>,
    /// Optional generation settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) generation_config: Option<GenerationConfig>,
    /// Tools the model may call.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) tools: Vec<Tool>,
}

impl GenerateContentRequest {
    /// A single user turn made of `parts`.
    pub(crate) fn user(parts: Vec<Part>) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_owned()),
                parts,
            }],
            ..Self::default()
        }
    }
}

/// One conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Content {
    /// `user` or `model`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) role: Option<String>,
    /// Turn contents.
    #[serde(default)]
    pub(crate) parts: Vec<Part>,
}

/// Text or inline binary data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Part {
    /// Text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) text: Option<String>,
    /// Base64-encoded binary content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) inline_data: Option<InlineData>,
}

impl Part {
    /// A text part.
    pub(crate) fn text<T: Into<String>>(text: T) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    /// An inline data part.
    pub(crate) fn inline(mime_type: String, data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData { mime_type, data }),
        }
    }
}

/// Base64 payload with its MIME type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    /// MIME type.
    pub(crate) mime_type: String,
    /// Base64 data.
    pub(crate) data: String,
}

/// Generation settings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    /// Image output settings.
    pub(crate) image_config: ImageConfig,
}

/// Image output settings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImageConfig {
    /// Ratio such as `16:9`.
    pub(crate) aspect_ratio: String,
    /// Resolution class such as `1K`.
    pub(crate) image_size: String,
}

/// A tool declaration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Tool {
    /// Grounding with web search. Takes no options.
    pub(crate) google_search: serde_json::Map<String, serde_json::Value>,
}

/// Response body.
#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    /// Generated candidates; the first one is used.
    #[serde(default)]
    pub(crate) candidates: Vec<Candidate>,
}

/// One generated candidate.
#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    /// Candidate content.
    #[serde(default)]
    pub(crate) content: Option<Content>,
}

impl GenerateContentResponse {
    /// Parts of the first candidate.
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .into_iter()
            .flat_map(|content| content.parts.iter())
    }

    /// Concatenated text of the first candidate, trimmed.
    pub(crate) fn text(&self) -> String {
        self.parts()
            .filter_map(|part| part.text.as_deref())
            .collect::<String>()
            .trim()
            .to_owned()
    }

    /// First inline data part of the first candidate.
    pub(crate) fn inline_data(&self) -> Option<&InlineData> {
        self.parts().find_map(|part| part.inline_data.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case_and_skips_empty() {
        let request = GenerateContentRequest::user(vec![
            Part::inline("image/jpeg".to_owned(), "AAAA".to_owned()),
            Part::text("describe"),
        ]);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(json["contents"][0]["parts"][1]["text"], "describe");
        assert!(json.get("tools").is_none());
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    fn response_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":" Hello"},{"text":" world "}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response.text(), "Hello world");
        assert!(response.inline_data().is_none());
    }

    #[test]
    fn empty_response_has_no_text() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.text(), "");
    }
}
