mod parallel_agent;
mod sequential_agent;

pub use parallel_agent::ParallelAgent;
pub use sequential_agent::SequentialAgent;
