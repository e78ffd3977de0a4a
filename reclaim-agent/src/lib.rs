//! Agent implementations for the refund workflow: [`LlmAgent`] wraps a
//! model with instructions, tools and output slots; [`SequentialAgent`] and
//! [`ParallelAgent`] compose agents into staged and fanned-out pipelines.

mod llm_agent;
mod workflow;

pub use llm_agent::{LlmAgent, LlmAgentBuilder};
pub use reclaim_core::Agent;
pub use workflow::{ParallelAgent, SequentialAgent};
