mod client;
mod config;
mod convert;

pub use client::GeminiModel;
pub use config::{GeminiBackend, GeminiConfig};
