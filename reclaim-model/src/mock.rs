use async_trait::async_trait;
use reclaim_core::{
    Content, FinishReason, Llm, LlmRequest, LlmResponse, LlmResponseStream, Part, Result,
};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted model for tests. Each `generate_content` call pops the next
/// queued response; when the queue is empty it returns an empty final
/// response so agent loops terminate.
pub struct MockLlm {
    name: String,
    responses: Mutex<VecDeque<LlmResponse>>,
}

impl MockLlm {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), responses: Mutex::new(VecDeque::new()) }
    }

    pub fn enqueue(&self, response: LlmResponse) {
        self.responses.lock().expect("mock response queue lock poisoned").push_back(response);
    }

    /// Queue a plain text reply with role `model`.
    pub fn enqueue_text(&self, text: impl Into<String>) {
        self.enqueue(LlmResponse {
            content: Some(Content::new("model").with_text(text)),
            usage_metadata: None,
            finish_reason: Some(FinishReason::Stop),
            partial: false,
            turn_complete: true,
        });
    }

    /// Queue a single-function-call reply.
    pub fn enqueue_function_call(&self, name: impl Into<String>, args: serde_json::Value) {
        self.enqueue(LlmResponse {
            content: Some(Content::new("model").with_part(Part::function_call(name, args))),
            usage_metadata: None,
            finish_reason: Some(FinishReason::Stop),
            partial: false,
            turn_complete: true,
        });
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().expect("mock response queue lock poisoned").len()
    }
}

#[async_trait]
impl Llm for MockLlm {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_content(&self, _request: LlmRequest, _stream: bool) -> Result<LlmResponseStream> {
        let response = self
            .responses
            .lock()
            .expect("mock response queue lock poisoned")
            .pop_front()
            .unwrap_or(LlmResponse {
                content: Some(Content::new("model")),
                usage_metadata: None,
                finish_reason: Some(FinishReason::Stop),
                partial: false,
                turn_complete: true,
            });

        Ok(Box::pin(futures::stream::once(async move { Ok(response) })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn request() -> LlmRequest {
        LlmRequest {
            model: "mock".to_string(),
            contents: vec![Content::new("user").with_text("hi")],
            config: None,
            tools: Default::default(),
        }
    }

    #[tokio::test]
    async fn pops_one_response_per_call() {
        let mock = MockLlm::new("mock");
        mock.enqueue_text("first");
        mock.enqueue_text("second");

        let mut stream = mock.generate_content(request(), false).await.unwrap();
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.content.unwrap().text(), "first");
        assert!(stream.next().await.is_none());

        let mut stream = mock.generate_content(request(), false).await.unwrap();
        let second = stream.next().await.unwrap().unwrap();
        assert_eq!(second.content.unwrap().text(), "second");
        assert_eq!(mock.remaining(), 0);
    }

    #[tokio::test]
    async fn exhausted_queue_yields_empty_final_response() {
        let mock = MockLlm::new("mock");
        let mut stream = mock.generate_content(request(), false).await.unwrap();
        let response = stream.next().await.unwrap().unwrap();
        assert!(response.turn_complete);
        assert_eq!(response.content.unwrap().text(), "");
    }

    #[tokio::test]
    async fn function_call_response_carries_args() {
        let mock = MockLlm::new("mock");
        mock.enqueue_function_call("get_purchase_history", serde_json::json!({"purchase": "mug"}));

        let mut stream = mock.generate_content(request(), false).await.unwrap();
        let response = stream.next().await.unwrap().unwrap();
        let content = response.content.unwrap();
        let calls = content.function_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "get_purchase_history");
        assert_eq!(calls[0].1["purchase"], "mug");
    }
}
