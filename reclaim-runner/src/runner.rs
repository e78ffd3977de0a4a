use crate::context::RunnerInvocationContext;
use async_stream::stream;
use reclaim_core::{Agent, Content, Event, EventStream, ReclaimError, Result};
use reclaim_session::{GetRequest, SessionService};
use std::sync::Arc;

/// At most this many agent-to-agent transfers per user turn.
const MAX_TRANSFERS: u32 = 5;

pub struct RunnerConfig {
    pub app_name: String,
    pub agent: Arc<dyn Agent>,
    pub session_service: Arc<dyn SessionService>,
}

/// Drives one agent tree against one session service. Per user turn it
/// records the user message, runs the tree, and applies each event's
/// effects to the session in stream order before the next event is
/// produced, so downstream agents observe upstream output slots.
pub struct Runner {
    app_name: String,
    root_agent: Arc<dyn Agent>,
    session_service: Arc<dyn SessionService>,
}

impl Runner {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            app_name: config.app_name,
            root_agent: config.agent,
            session_service: config.session_service,
        }
    }

    pub async fn run(
        &self,
        user_id: String,
        session_id: String,
        user_content: Content,
    ) -> Result<EventStream> {
        let app_name = self.app_name.clone();
        let session_service = self.session_service.clone();
        let root_agent = self.root_agent.clone();

        let s = stream! {
            let session = match session_service
                .get(GetRequest {
                    app_name: app_name.clone(),
                    user_id: user_id.clone(),
                    session_id: session_id.clone(),
                })
                .await
            {
                Ok(s) => s,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            // The user turn goes into history first; every agent reads it
            // from there.
            session.append_history(user_content.clone());

            let invocation_id = format!("inv-{}", uuid::Uuid::new_v4());
            tracing::info!(
                invocation = %invocation_id,
                session = %session_id,
                agent = %root_agent.name(),
                "turn start"
            );

            let ctx = Arc::new(RunnerInvocationContext::new(
                invocation_id.clone(),
                root_agent.name().to_string(),
                user_id,
                app_name,
                user_content,
                session.clone(),
            ));

            let mut current_agent = root_agent.clone();
            let mut transfers = 0;

            'agent: loop {
                let mut agent_stream = match current_agent.run(ctx.clone()).await {
                    Ok(s) => s,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };

                use futures::StreamExt;
                while let Some(result) = agent_stream.next().await {
                    let event = match result {
                        Ok(event) => event,
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    };

                    // Output slots land in session state before anything
                    // downstream is polled again.
                    for (key, value) in &event.actions.state_delta {
                        tracing::debug!(slot = %key, author = %event.author, "slot published");
                        session.state_set(key.clone(), value.clone());
                    }

                    if !event.partial {
                        if let Some(ref content) = event.content {
                            session.append_history(content.clone());
                        }
                    }

                    let transfer_target = event.actions.transfer_to_agent.clone();
                    yield Ok(event);

                    if let Some(target) = transfer_target {
                        transfers += 1;
                        if transfers > MAX_TRANSFERS {
                            yield Err(ReclaimError::Agent(format!(
                                "transfer limit ({MAX_TRANSFERS}) exceeded at '{target}'"
                            )));
                            return;
                        }

                        match find_agent(&root_agent, &target) {
                            Some(agent) => {
                                current_agent = agent;
                                continue 'agent;
                            }
                            None => {
                                yield Err(ReclaimError::Agent(format!(
                                    "transfer to unknown agent '{target}'"
                                )));
                                return;
                            }
                        }
                    }
                }

                break;
            }
        };

        Ok(Box::pin(s))
    }

    /// Runs a turn to completion and returns the assistant's text: every
    /// complete model event with text, concatenated with newlines.
    pub async fn run_collect(
        &self,
        user_id: String,
        session_id: String,
        user_content: Content,
    ) -> Result<String> {
        use futures::StreamExt;

        let mut events = self.run(user_id, session_id, user_content).await?;
        let mut reply = String::new();

        while let Some(result) = events.next().await {
            let event = result?;
            if event.partial {
                continue;
            }
            append_reply_text(&mut reply, &event);
        }

        Ok(reply.trim().to_string())
    }
}

fn append_reply_text(reply: &mut String, event: &Event) {
    if let Some(ref content) = event.content {
        if content.role == "function" {
            return;
        }
        let text = content.text();
        if !text.is_empty() {
            reply.push_str(&text);
            reply.push('\n');
        }
    }
}

/// Depth-first search of the agent tree by name.
fn find_agent(root: &Arc<dyn Agent>, name: &str) -> Option<Arc<dyn Agent>> {
    if root.name() == name {
        return Some(root.clone());
    }
    for sub in root.sub_agents() {
        if let Some(found) = find_agent(sub, name) {
            return Some(found);
        }
    }
    None
}
