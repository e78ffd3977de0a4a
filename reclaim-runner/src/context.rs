use reclaim_core::{Content, InvocationContext, ReadonlyContext, SessionHandle};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Invocation context minted by the runner, one per user turn. Shared by
/// every agent that participates in the turn.
pub struct RunnerInvocationContext {
    invocation_id: String,
    agent_name: String,
    user_id: String,
    app_name: String,
    session_id: String,
    branch: String,
    user_content: Content,
    session: Arc<dyn SessionHandle>,
    ended: AtomicBool,
}

impl RunnerInvocationContext {
    pub fn new(
        invocation_id: impl Into<String>,
        agent_name: impl Into<String>,
        user_id: impl Into<String>,
        app_name: impl Into<String>,
        user_content: Content,
        session: Arc<dyn SessionHandle>,
    ) -> Self {
        let session_id = session.id().to_string();
        Self {
            invocation_id: invocation_id.into(),
            agent_name: agent_name.into(),
            user_id: user_id.into(),
            app_name: app_name.into(),
            session_id,
            branch: String::new(),
            user_content,
            session,
            ended: AtomicBool::new(false),
        }
    }
}

impl ReadonlyContext for RunnerInvocationContext {
    fn invocation_id(&self) -> &str {
        &self.invocation_id
    }

    fn agent_name(&self) -> &str {
        &self.agent_name
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn app_name(&self) -> &str {
        &self.app_name
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }

    fn branch(&self) -> &str {
        &self.branch
    }

    fn user_content(&self) -> &Content {
        &self.user_content
    }
}

impl InvocationContext for RunnerInvocationContext {
    fn session(&self) -> &dyn SessionHandle {
        self.session.as_ref()
    }

    fn end_invocation(&self) {
        self.ended.store(true, Ordering::SeqCst);
    }

    fn ended(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }
}
