use crate::types::Content;
use serde_json::Value;
use std::collections::HashMap;

/// Read-only view of the current invocation, available to tools and
/// instruction providers.
pub trait ReadonlyContext: Send + Sync {
    fn invocation_id(&self) -> &str;
    fn agent_name(&self) -> &str;
    fn user_id(&self) -> &str;
    fn app_name(&self) -> &str;
    fn session_id(&self) -> &str;
    fn branch(&self) -> &str;
    fn user_content(&self) -> &Content;
}

/// Live handle onto one conversation's accumulated state: prior turns plus
/// the named output slots agents write through `state_delta`. Implementations
/// use interior mutability; the handle is shared between the runner and the
/// session service and discarded when the process ends.
pub trait SessionHandle: Send + Sync {
    fn id(&self) -> &str;
    fn app_name(&self) -> &str;
    fn user_id(&self) -> &str;

    fn state_get(&self, key: &str) -> Option<Value>;
    fn state_set(&self, key: String, value: Value);
    fn state_all(&self) -> HashMap<String, Value>;

    fn history(&self) -> Vec<Content>;
    fn append_history(&self, content: Content);

    fn last_update_time(&self) -> chrono::DateTime<chrono::Utc>;
}

/// Full invocation context handed to an agent's `run`.
pub trait InvocationContext: ReadonlyContext {
    fn session(&self) -> &dyn SessionHandle;
    fn end_invocation(&self);
    fn ended(&self) -> bool;
}
