//! # reclaim-session
//!
//! Session management for ReclaimBot conversations.
//!
//! A session is one conversation's accumulated turns and output slots,
//! keyed by `(app_name, user_id, session_id)`. The host application owns a
//! [`SessionService`] and creates one session per conversation id; there is
//! no process-wide singleton. State is in-memory only and discarded when
//! the process ends.

pub mod inmemory;
pub mod service;

pub use inmemory::{InMemorySessionService, SharedSession};
pub use service::{CreateRequest, DeleteRequest, GetRequest, ListRequest, SessionService};
