//! # reclaim-core
//!
//! Core traits and types for the ReclaimBot agent workflow.
//!
//! This crate provides the foundational abstractions the rest of the
//! workspace builds on:
//!
//! - [`Agent`] - the fundamental trait for workflow units
//! - [`Tool`] - the pluggable capability-invocation seam (schema in,
//!   structured call out)
//! - [`Llm`] - hosted model backends
//! - [`SessionHandle`] - one conversation's accumulated turns and output
//!   slots
//! - [`Event`] - the streamed unit of agent output
//! - [`ReclaimError`] / [`Result`] - unified error handling
//!
//! Output slots are plain `state_delta` entries on events; the runner
//! applies them to the session in stream order so downstream agents read
//! upstream results through their instruction templates
//! ([`inject_session_state`]).

pub mod agent;
pub mod context;
pub mod error;
pub mod event;
pub mod instruction;
pub mod model;
pub mod tool;
pub mod types;

pub use agent::{Agent, EventStream};
pub use context::{InvocationContext, ReadonlyContext, SessionHandle};
pub use error::{ReclaimError, Result};
pub use event::{Event, EventActions};
pub use instruction::inject_session_state;
pub use model::{
    FinishReason, GenerateContentConfig, Llm, LlmRequest, LlmResponse, LlmResponseStream,
    UsageMetadata,
};
pub use tool::{Tool, ToolContext};
pub use types::{Content, Part};
