//! Turn runtime for ReclaimBot. [`Runner`] owns the root agent and the
//! session service, records user turns, resolves agent transfers, and
//! applies event side effects (output slots, history) in stream order.

mod context;
mod runner;

pub use context::RunnerInvocationContext;
pub use runner::{Runner, RunnerConfig};
