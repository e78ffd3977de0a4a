use async_stream::stream;
use async_trait::async_trait;
use reclaim_core::{Agent, EventStream, InvocationContext, Result};
use std::sync::Arc;

/// Runs its sub-agents concurrently and merges their event streams as events
/// become ready, so neither branch waits for the other to finish. The first
/// branch error ends the merged stream.
pub struct ParallelAgent {
    name: String,
    description: String,
    sub_agents: Vec<Arc<dyn Agent>>,
}

impl ParallelAgent {
    pub fn new(name: impl Into<String>, sub_agents: Vec<Arc<dyn Agent>>) -> Self {
        Self { name: name.into(), description: String::new(), sub_agents }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }
}

#[async_trait]
impl Agent for ParallelAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn sub_agents(&self) -> &[Arc<dyn Agent>] {
        &self.sub_agents
    }

    async fn run(&self, ctx: Arc<dyn InvocationContext>) -> Result<EventStream> {
        let name = self.name.clone();
        let sub_agents = self.sub_agents.clone();

        let s = stream! {
            use futures::StreamExt;
            use futures::stream::select_all;

            let mut branch_streams = Vec::with_capacity(sub_agents.len());
            for agent in &sub_agents {
                tracing::debug!(workflow = %name, branch = %agent.name(), "branch start");
                match agent.run(ctx.clone()).await {
                    Ok(s) => branch_streams.push(s),
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }

            let mut merged = select_all(branch_streams);
            while let Some(event_result) = merged.next().await {
                match event_result {
                    Ok(event) => yield Ok(event),
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
        };

        Ok(Box::pin(s))
    }
}
