use async_trait::async_trait;
use reclaim_core::{Result, SessionHandle};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub app_name: String,
    pub user_id: String,
    /// Conversation id; a fresh UUID is assigned when absent.
    pub session_id: Option<String>,
    pub state: HashMap<String, Value>,
}

#[derive(Debug, Clone)]
pub struct GetRequest {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

#[derive(Debug, Clone)]
pub struct ListRequest {
    pub app_name: String,
    pub user_id: String,
}

#[derive(Debug, Clone)]
pub struct DeleteRequest {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

/// Owns conversation lifecycles. The host application holds the service and
/// creates one session per conversation id; handles are live and shared
/// with the runner for the duration of the conversation.
#[async_trait]
pub trait SessionService: Send + Sync {
    async fn create(&self, req: CreateRequest) -> Result<Arc<dyn SessionHandle>>;
    async fn get(&self, req: GetRequest) -> Result<Arc<dyn SessionHandle>>;
    async fn list(&self, req: ListRequest) -> Result<Vec<Arc<dyn SessionHandle>>>;
    async fn delete(&self, req: DeleteRequest) -> Result<()>;
}
