use async_stream::stream;
use async_trait::async_trait;
use reclaim_core::{Agent, EventStream, InvocationContext, Result};
use std::sync::Arc;

/// Runs its sub-agents once each, in order. A failing stage ends the stream;
/// later stages never start.
pub struct SequentialAgent {
    name: String,
    description: String,
    sub_agents: Vec<Arc<dyn Agent>>,
}

impl SequentialAgent {
    pub fn new(name: impl Into<String>, sub_agents: Vec<Arc<dyn Agent>>) -> Self {
        Self { name: name.into(), description: String::new(), sub_agents }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }
}

#[async_trait]
impl Agent for SequentialAgent {
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

            for agent in sub_agents {
                if ctx.ended() {
                    tracing::debug!(workflow = %name, "invocation ended; skipping remaining stages");
                    return;
                }

                tracing::debug!(workflow = %name, stage = %agent.name(), "stage start");

                let mut stage_stream = match agent.run(ctx.clone()).await {
                    Ok(s) => s,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };

                while let Some(event_result) = stage_stream.next().await {
                    match event_result {
                        Ok(event) => yield Ok(event),
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }
            }
        };

        Ok(Box::pin(s))
    }
}
