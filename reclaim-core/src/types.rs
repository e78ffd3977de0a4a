use serde::{Deserialize, Serialize};

/// One turn's worth of content in a conversation, attributed to a role
/// ("user", "model" or "function").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    FunctionCall {
        name: String,
        args: serde_json::Value,
    },
    FunctionResponse {
        name: String,
        response: serde_json::Value,
    },
}

impl Content {
    pub fn new(role: impl Into<String>) -> Self {
        Self { role: role.into(), parts: Vec::new() }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(Part::Text { text: text.into() });
        self
    }

    pub fn with_part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// Concatenation of all text parts, in order.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            if let Part::Text { text } = part {
                out.push_str(text);
            }
        }
        out
    }

    /// Names and arguments of every function call part.
    pub fn function_calls(&self) -> Vec<(&str, &serde_json::Value)> {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::FunctionCall { name, args } => Some((name.as_str(), args)),
                _ => None,
            })
            .collect()
    }
}

impl Part {
    /// Returns the text content if this is a Text part, None otherwise.
    pub fn text(&self) -> Option<&str> {
        match self {
            Part::Text { text } => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn text_part(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn function_call(name: impl Into<String>, args: serde_json::Value) -> Self {
        Part::FunctionCall { name: name.into(), args }
    }

    pub fn function_response(name: impl Into<String>, response: serde_json::Value) -> Self {
        Part::FunctionResponse { name: name.into(), response }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_creation() {
        let content = Content::new("user").with_text("Hello");
        assert_eq!(content.role, "user");
        assert_eq!(content.parts.len(), 1);
        assert_eq!(content.text(), "Hello");
    }

    #[test]
    fn test_text_concatenation() {
        let content = Content::new("model").with_text("a").with_text("b");
        assert_eq!(content.text(), "ab");
    }

    #[test]
    fn test_function_calls_accessor() {
        let content = Content::new("model")
            .with_part(Part::function_call("process_refund", serde_json::json!({"amount": 16.0})))
            .with_text("done");
        let calls = content.function_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "process_refund");
    }

    #[test]
    fn test_part_text_accessor() {
        let text = Part::text_part("hello");
        assert_eq!(text.text(), Some("hello"));

        let call = Part::function_call("check", serde_json::Value::Null);
        assert_eq!(call.text(), None);
    }

    #[test]
    fn test_part_serialization() {
        let part = Part::function_response("lookup", serde_json::json!([{"order_id": "SG002"}]));
        let json = serde_json::to_string(&part).unwrap();
        assert!(json.contains("SG002"));
    }
}
