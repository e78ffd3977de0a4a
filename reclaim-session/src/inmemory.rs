use crate::{CreateRequest, DeleteRequest, GetRequest, ListRequest, SessionService};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reclaim_core::{Content, ReclaimError, Result, SessionHandle};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct SessionKey {
    app_name: String,
    user_id: String,
    session_id: String,
}

struct SessionInner {
    state: HashMap<String, Value>,
    history: Vec<Content>,
    updated_at: DateTime<Utc>,
}

/// Live, shared conversation state. All mutation goes through `&self`; the
/// runner and the service hold the same `Arc`.
pub struct SharedSession {
    key: SessionKey,
    inner: RwLock<SessionInner>,
}

impl SharedSession {
    fn new(key: SessionKey, state: HashMap<String, Value>) -> Self {
        Self {
            key,
            inner: RwLock::new(SessionInner { state, history: Vec::new(), updated_at: Utc::now() }),
        }
    }
}

impl SessionHandle for SharedSession {
    fn id(&self) -> &str {
        &self.key.session_id
    }

    fn app_name(&self) -> &str {
        &self.key.app_name
    }

    fn user_id(&self) -> &str {
        &self.key.user_id
    }

    fn state_get(&self, key: &str) -> Option<Value> {
        self.inner.read().expect("session lock poisoned").state.get(key).cloned()
    }

    fn state_set(&self, key: String, value: Value) {
        let mut inner = self.inner.write().expect("session lock poisoned");
        inner.state.insert(key, value);
        inner.updated_at = Utc::now();
    }

    fn state_all(&self) -> HashMap<String, Value> {
        self.inner.read().expect("session lock poisoned").state.clone()
    }

    fn history(&self) -> Vec<Content> {
        self.inner.read().expect("session lock poisoned").history.clone()
    }

    fn append_history(&self, content: Content) {
        let mut inner = self.inner.write().expect("session lock poisoned");
        inner.history.push(content);
        inner.updated_at = Utc::now();
    }

    fn last_update_time(&self) -> DateTime<Utc> {
        self.inner.read().expect("session lock poisoned").updated_at
    }
}

/// In-memory session store. One entry per conversation; everything is
/// discarded when the process ends.
pub struct InMemorySessionService {
    sessions: RwLock<HashMap<SessionKey, Arc<SharedSession>>>,
}

impl InMemorySessionService {
    pub fn new() -> Self {
        Self { sessions: RwLock::new(HashMap::new()) }
    }

    /// Drops sessions idle for longer than `max_idle`. Returns the number
    /// of sessions removed.
    pub fn expire_idle(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(max_idle).unwrap_or_else(|_| chrono::Duration::zero());
        let mut sessions = self.sessions.write().expect("session store lock poisoned");
        let before = sessions.len();
        sessions.retain(|_, s| s.last_update_time() >= cutoff);
        let removed = before - sessions.len();
        if removed > 0 {
            tracing::info!(removed, "expired idle sessions");
        }
        removed
    }
}

impl Default for InMemorySessionService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionService for InMemorySessionService {
    async fn create(&self, req: CreateRequest) -> Result<Arc<dyn SessionHandle>> {
        let session_id = req.session_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let key = SessionKey {
            app_name: req.app_name,
            user_id: req.user_id,
            session_id,
        };

        let session = Arc::new(SharedSession::new(key.clone(), req.state));
        self.sessions
            .write()
            .expect("session store lock poisoned")
            .insert(key, session.clone());

        Ok(session)
    }

    async fn get(&self, req: GetRequest) -> Result<Arc<dyn SessionHandle>> {
        let key = SessionKey {
            app_name: req.app_name,
            user_id: req.user_id,
            session_id: req.session_id,
        };

        self.sessions
            .read()
            .expect("session store lock poisoned")
            .get(&key)
            .cloned()
            .map(|s| s as Arc<dyn SessionHandle>)
            .ok_or_else(|| ReclaimError::Session("session not found".into()))
    }

    async fn list(&self, req: ListRequest) -> Result<Vec<Arc<dyn SessionHandle>>> {
        let sessions = self.sessions.read().expect("session store lock poisoned");
        Ok(sessions
            .iter()
            .filter(|(key, _)| key.app_name == req.app_name && key.user_id == req.user_id)
            .map(|(_, s)| s.clone() as Arc<dyn SessionHandle>)
            .collect())
    }

    async fn delete(&self, req: DeleteRequest) -> Result<()> {
        let key = SessionKey {
            app_name: req.app_name,
            user_id: req.user_id,
            session_id: req.session_id,
        };

        self.sessions.write().expect("session store lock poisoned").remove(&key);
        Ok(())
    }
}
