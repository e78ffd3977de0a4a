use reclaim_core::{Content, InvocationContext, ReadonlyContext, SessionHandle};
use reclaim_session::{CreateRequest, InMemorySessionService, SessionService};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Invocation context for agent tests, backed by a real in-memory session.
pub struct TestInvocation {
    session: Arc<dyn SessionHandle>,
    user_content: Content,
    ended: AtomicBool,
}

impl TestInvocation {
    pub async fn new(user_text: &str) -> Arc<Self> {
        let service = InMemorySessionService::new();
        let session = service
            .create(CreateRequest {
                app_name: "reclaimbot-test".to_string(),
                user_id: "tester".to_string(),
                session_id: Some("s1".to_string()),
                state: HashMap::new(),
            })
            .await
            .unwrap();

        let user_content = Content::new("user").with_text(user_text);
        session.append_history(user_content.clone());

        Arc::new(Self { session, user_content, ended: AtomicBool::new(false) })
    }

    pub fn session_handle(&self) -> &dyn SessionHandle {
        self.session.as_ref()
    }
}

impl ReadonlyContext for TestInvocation {
    fn invocation_id(&self) -> &str {
        "inv-test"
    }
    fn agent_name(&self) -> &str {
        "test"
    }
    fn user_id(&self) -> &str {
        "tester"
    }
    fn app_name(&self) -> &str {
        "reclaimbot-test"
    }
    fn session_id(&self) -> &str {
        "s1"
    }
    fn branch(&self) -> &str {
        ""
    }
    fn user_content(&self) -> &Content {
        &self.user_content
    }
}

impl InvocationContext for TestInvocation {
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
