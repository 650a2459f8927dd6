//! Data types for plant identification

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

pub const SYSTEM_PROMPT: &str = "You are a plant identification expert.";
pub const USER_PROMPT: &str = "Identify the plant in this image.";

/// Image received from a multipart upload, held only for one request
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Bytes,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

impl UploadedImage {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: None,
            file_name: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// MIME type to declare to the model
    pub fn mime(&self) -> &str {
        detect_mime(&self.bytes, self.content_type.as_deref())
    }

    /// `data:` URI embedding the image as base64
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime(), STANDARD.encode(&self.bytes))
    }
}

/// Pick a MIME type from magic bytes, then the declared `image/*` type, then JPEG.
pub fn detect_mime<'a>(bytes: &[u8], declared: Option<&'a str>) -> &'a str {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        return "image/png";
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "image/jpeg";
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return "image/gif";
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return "image/webp";
    }
    match declared {
        Some(ct) if ct.starts_with("image/") => ct,
        _ => "image/jpeg",
    }
}

/// Response body of the identification route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifyResponse {
    pub plant_name: String,
}

// Chat completions wire types

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

impl ChatCompletionRequest {
    /// System instruction, user instruction, then the image
    pub fn identify_plant(model: &str, max_tokens: u32, image: &UploadedImage) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(SYSTEM_PROMPT.to_string()),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Parts(vec![
                        ContentPart::Text {
                            text: USER_PROMPT.to_string(),
                        },
                        ContentPart::ImageUrl {
                            image_url: ImageUrl {
                                url: image.data_uri(),
                            },
                        },
                    ]),
                },
            ],
            max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_mime_from_magic_bytes() {
        assert_eq!(detect_mime(b"\x89PNG\r\n\x1a\nrest", None), "image/png");
        assert_eq!(detect_mime(&[0xFF, 0xD8, 0xFF, 0xE0], Some("text/plain")), "image/jpeg");
        assert_eq!(detect_mime(b"GIF89a....", None), "image/gif");
        assert_eq!(detect_mime(b"RIFF\x00\x00\x00\x00WEBPVP8 ", None), "image/webp");
    }

    #[test]
    fn test_detect_mime_falls_back_to_declared() {
        assert_eq!(detect_mime(b"unknown", Some("image/heic")), "image/heic");
        assert_eq!(detect_mime(b"unknown", Some("application/octet-stream")), "image/jpeg");
        assert_eq!(detect_mime(b"unknown", None), "image/jpeg");
    }

    #[test]
    fn test_data_uri() {
        let image = UploadedImage::new(&b"\x89PNG\r\n\x1a\n"[..]);
        assert_eq!(image.data_uri(), "data:image/png;base64,iVBORw0KGgo=");
    }

    #[test]
    fn test_request_shape() {
        let image = UploadedImage::new(&b"abc"[..]).with_content_type("image/jpeg");
        let request = ChatCompletionRequest::identify_plant("gpt-4o", 300, &image);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["model"], "gpt-4o");
        assert_eq!(value["max_tokens"], 300);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["messages"][1]["content"][0]["type"], "text");
        assert_eq!(value["messages"][1]["content"][0]["text"], USER_PROMPT);
        assert_eq!(value["messages"][1]["content"][1]["type"], "image_url");
        assert_eq!(
            value["messages"][1]["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,YWJj"
        );
    }

    #[test]
    fn test_response_without_choices() {
        let response: ChatCompletionResponse = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert!(response.choices.is_empty());
    }
}
