use chatwire_core::provider::ChatRequest;
use chatwire_core::transcript::{Message, Role};
use serde::{Deserialize, Serialize};

/// Body of `POST /chat/completions`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatCompletionMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl ChatCompletionRequest {
    pub fn new(model: String, messages: Vec<ChatCompletionMessage>) -> Self {
        Self {
            model,
            messages,
            stream: None,
        }
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = Some(stream);
        self
    }
}

impl From<ChatRequest> for ChatCompletionRequest {
    fn from(value: ChatRequest) -> Self {
        Self {
            model: value.model,
            messages: value.messages.into_iter().map(Into::into).collect(),
            stream: Some(value.stream),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ChatCompletionMessage {
    pub role: MessageRole,
    pub content: String,
}

impl From<Role> for MessageRole {
    fn from(value: Role) -> Self {
        match value {
            Role::System => MessageRole::System,
            Role::User => MessageRole::User,
            Role::Assistant => MessageRole::Assistant,
        }
    }
}

impl From<MessageRole> for Role {
    fn from(value: MessageRole) -> Self {
        match value {
            MessageRole::System => Role::System,
            MessageRole::User => Role::User,
            MessageRole::Assistant => Role::Assistant,
        }
    }
}

impl From<Message> for ChatCompletionMessage {
    fn from(value: Message) -> Self {
        Self {
            role: value.role.into(),
            content: value.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_wire_format() {
        let request: ChatCompletionRequest = ChatRequest::streaming(
            "gpt-3.5-turbo",
            vec![Message::system("sys"), Message::user("hello")],
        )
        .into();

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "gpt-3.5-turbo",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "hello"}
                ],
                "stream": true
            })
        );
    }

    #[test]
    fn empty_user_content_is_sent_as_empty_string() {
        let request = ChatCompletionRequest::new("m".into(), vec![Message::user("").into()]);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["content"], "");
        assert!(json.get("stream").is_none());
    }
}
