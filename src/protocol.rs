//! Request and response exchanged between the coordinator and the page worker.

use serde::{Deserialize, Serialize};

use crate::extractor::Format;

pub const GET_CHAT_CONTENT: &str = "getChatContent";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    pub action: String,
    #[serde(default)]
    pub format_as_markdown: bool,
}

impl ExtractRequest {
    pub fn get_chat_content(format_as_markdown: bool) -> Self {
        Self {
            action: GET_CHAT_CONTENT.to_string(),
            format_as_markdown,
        }
    }

    pub fn format(&self) -> Format {
        Format::from(self.format_as_markdown)
    }
}

/// The single reply to an [`ExtractRequest`]. `data` is `None` when the page
/// answered without content. `message_count` is only set when a transcript
/// was built, and is left off the wire otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_count: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case_wire_names() {
        let json = serde_json::to_string(&ExtractRequest::get_chat_content(true)).unwrap();
        assert_eq!(json, r#"{"action":"getChatContent","formatAsMarkdown":true}"#);
    }

    #[test]
    fn response_data_may_be_null_or_missing() {
        let null: ExtractResponse = serde_json::from_str(r#"{"data":null}"#).unwrap();
        let missing: ExtractResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(null.data, None);
        assert_eq!(missing.data, None);

        let json = serde_json::to_string(&ExtractResponse {
            data: Some("User:\nhi".into()),
            message_count: None,
        })
        .unwrap();
        assert_eq!(json, r#"{"data":"User:\nhi"}"#);
    }

    #[test]
    fn message_count_travels_when_known() {
        let response = ExtractResponse {
            data: Some("User:\nhi".into()),
            message_count: Some(1),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"data":"User:\nhi","messageCount":1}"#);
        assert_eq!(serde_json::from_str::<ExtractResponse>(&json).unwrap(), response);
    }
}
