//! Model backends for the refund assistant.
//!
//! [`GeminiModel`] speaks the Gemini REST API in either API-key or Vertex AI
//! mode; [`MockLlm`] is a scripted stand-in for tests.

mod gemini;
mod mock;

pub use gemini::{GeminiBackend, GeminiConfig, GeminiModel};
pub use mock::MockLlm;
