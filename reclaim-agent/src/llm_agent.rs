use async_stream::stream;
use async_trait::async_trait;
use reclaim_core::{
    Agent, Content, Event, EventStream, InvocationContext, Llm, LlmRequest, Part, ReadonlyContext,
    ReclaimError, Result, Tool, ToolContext, inject_session_state,
};
use std::sync::Arc;

/// Upper bound on model round-trips within one agent turn.
const MAX_ITERATIONS: u32 = 10;

/// An agent backed by a hosted model. Each turn it renders its instruction
/// against session state, streams the model's reply, dispatches any tool
/// calls, and loops until the model answers without calling a tool.
pub struct LlmAgent {
    name: String,
    description: String,
    model: Arc<dyn Llm>,
    instruction: Option<String>,
    tools: Vec<Arc<dyn Tool>>,
    sub_agents: Vec<Arc<dyn Agent>>,
    output_key: Option<String>,
}

impl std::fmt::Debug for LlmAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmAgent")
            .field("name", &self.name)
            .field("model", &self.model.name())
            .field("tools_count", &self.tools.len())
            .field("sub_agents_count", &self.sub_agents.len())
            .field("output_key", &self.output_key)
            .finish()
    }
}

pub struct LlmAgentBuilder {
    name: String,
    description: Option<String>,
    model: Option<Arc<dyn Llm>>,
    instruction: Option<String>,
    tools: Vec<Arc<dyn Tool>>,
    sub_agents: Vec<Arc<dyn Agent>>,
    output_key: Option<String>,
}

impl LlmAgentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            model: None,
            instruction: None,
            tools: Vec::new(),
            sub_agents: Vec::new(),
            output_key: None,
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn model(mut self, model: Arc<dyn Llm>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }

    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn sub_agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.sub_agents.push(agent);
        self
    }

    /// Session-state key the agent's final text is published under.
    pub fn output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = Some(key.into());
        self
    }

    pub fn build(self) -> Result<LlmAgent> {
        let model = self
            .model
            .ok_or_else(|| ReclaimError::Agent(format!("agent '{}' has no model", self.name)))?;

        Ok(LlmAgent {
            name: self.name,
            description: self.description.unwrap_or_default(),
            model,
            instruction: self.instruction,
            tools: self.tools,
            sub_agents: self.sub_agents,
            output_key: self.output_key,
        })
    }
}

/// Tool-call context that delegates to the enclosing invocation and adds a
/// per-call id.
struct AgentToolContext {
    parent_ctx: Arc<dyn InvocationContext>,
    function_call_id: String,
}

impl ReadonlyContext for AgentToolContext {
    fn invocation_id(&self) -> &str {
        self.parent_ctx.invocation_id()
    }

    fn agent_name(&self) -> &str {
        self.parent_ctx.agent_name()
    }

    fn user_id(&self) -> &str {
        self.parent_ctx.user_id()
    }

    fn app_name(&self) -> &str {
        self.parent_ctx.app_name()
    }

    fn session_id(&self) -> &str {
        self.parent_ctx.session_id()
    }

    fn branch(&self) -> &str {
        self.parent_ctx.branch()
    }

    fn user_content(&self) -> &Content {
        self.parent_ctx.user_content()
    }
}

impl ToolContext for AgentToolContext {
    fn function_call_id(&self) -> &str {
        &self.function_call_id
    }
}

#[async_trait]
impl Agent for LlmAgent {
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
        let agent_name = self.name.clone();
        let invocation_id = ctx.invocation_id().to_string();
        let model = self.model.clone();
        let tools = self.tools.clone();
        let has_sub_agents = !self.sub_agents.is_empty();
        let instruction = self.instruction.clone();
        let output_key = self.output_key.clone();

        let s = stream! {
            tracing::debug!(agent = %agent_name, invocation = %invocation_id, "agent turn start");

            let mut conversation_history = Vec::new();

            // Instruction first, rendered against the session's output slots.
            // Slot reads happen here, at poll time, so earlier stages of a
            // sequential workflow have already published their results.
            if let Some(ref template) = instruction {
                let rendered = match inject_session_state(ctx.as_ref(), template) {
                    Ok(r) => r,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };
                if !rendered.is_empty() {
                    conversation_history.push(Content::new("user").with_text(rendered));
                }
            }

            // Session history already ends with the current user turn; the
            // runner appends it before the root agent starts.
            conversation_history.extend(ctx.session().history());

            let mut tool_declarations = std::collections::HashMap::new();
            for tool in &tools {
                let mut decl = serde_json::json!({
                    "name": tool.name(),
                    "description": tool.description(),
                });
                if let Some(params) = tool.parameters_schema() {
                    decl["parameters"] = params;
                }
                tool_declarations.insert(tool.name().to_string(), decl);
            }

            if has_sub_agents {
                tool_declarations.insert(
                    "transfer_to_agent".to_string(),
                    serde_json::json!({
                        "name": "transfer_to_agent",
                        "description": "Transfer execution to another agent.",
                        "parameters": {
                            "type": "object",
                            "properties": {
                                "agent_name": {
                                    "type": "string",
                                    "description": "The name of the agent to transfer to."
                                }
                            },
                            "required": ["agent_name"]
                        }
                    }),
                );
            }

            let mut iteration = 0;
            loop {
                iteration += 1;
                if iteration > MAX_ITERATIONS {
                    yield Err(ReclaimError::Agent(
                        format!("agent '{agent_name}' exceeded {MAX_ITERATIONS} model round-trips")
                    ));
                    return;
                }

                let request = LlmRequest {
                    model: model.name().to_string(),
                    contents: conversation_history.clone(),
                    config: None,
                    tools: tool_declarations.clone(),
                };

                let mut response_stream = match model.generate_content(request, true).await {
                    Ok(s) => s,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };

                // Stream the reply, forwarding partial fragments as they
                // arrive and accumulating the complete turn.
                let mut accumulated_content: Option<Content> = None;

                use futures::StreamExt;
                while let Some(chunk_result) = response_stream.next().await {
                    let chunk = match chunk_result {
                        Ok(c) => c,
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    };

                    if let Some(chunk_content) = chunk.content {
                        if chunk.partial {
                            let mut partial_event = Event::new(&invocation_id)
                                .with_author(&agent_name)
                                .with_content(chunk_content.clone());
                            partial_event.partial = true;
                            yield Ok(partial_event);
                        }

                        match accumulated_content {
                            Some(ref mut acc) => acc.parts.extend(chunk_content.parts),
                            None => accumulated_content = Some(chunk_content),
                        }
                    }

                    if chunk.turn_complete {
                        break;
                    }
                }

                let Some(content) = accumulated_content else {
                    // Model produced nothing at all; end the turn.
                    break;
                };

                // A transfer supersedes everything else in the reply.
                if let Some((_, args)) =
                    content.function_calls().iter().find(|(name, _)| *name == "transfer_to_agent")
                {
                    let target = args
                        .get("agent_name")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info!(agent = %agent_name, target = %target, "transferring turn");

                    let mut transfer_event = Event::new(&invocation_id).with_author(&agent_name);
                    transfer_event.actions.transfer_to_agent = Some(target);
                    yield Ok(transfer_event);
                    return;
                }

                let function_calls: Vec<(String, serde_json::Value)> = content
                    .function_calls()
                    .iter()
                    .map(|(name, args)| (name.to_string(), (*args).clone()))
                    .collect();

                // Complete model turn, recorded in session history by the
                // runner.
                yield Ok(Event::new(&invocation_id)
                    .with_author(&agent_name)
                    .with_content(content.clone()));
                conversation_history.push(content.clone());

                if function_calls.is_empty() {
                    // Final answer. Publish it under the agent's output slot.
                    if let Some(ref key) = output_key {
                        let text = content.text();
                        if !text.is_empty() {
                            let mut state_event =
                                Event::new(&invocation_id).with_author(&agent_name);
                            state_event
                                .actions
                                .state_delta
                                .insert(key.clone(), serde_json::Value::String(text));
                            yield Ok(state_event);
                        }
                    }
                    break;
                }

                for (name, args) in function_calls {
                    let result = match tools.iter().find(|t| t.name() == name) {
                        Some(tool) => {
                            let tool_ctx: Arc<dyn ToolContext> = Arc::new(AgentToolContext {
                                parent_ctx: ctx.clone(),
                                function_call_id: format!("{invocation_id}_{name}"),
                            });

                            match tool.execute(tool_ctx, args).await {
                                Ok(result) => result,
                                Err(e) => {
                                    tracing::warn!(tool = %name, error = %e, "tool call failed");
                                    serde_json::json!({ "error": e.to_string() })
                                }
                            }
                        }
                        None => serde_json::json!({ "error": format!("Tool {name} not found") }),
                    };

                    let response_content = Content::new("function")
                        .with_part(Part::function_response(&name, result));

                    yield Ok(Event::new(&invocation_id)
                        .with_author(&agent_name)
                        .with_content(response_content.clone()));
                    conversation_history.push(response_content);
                }
            }
        };

        Ok(Box::pin(s))
    }
}
