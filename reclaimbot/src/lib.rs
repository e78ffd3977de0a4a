//! ReclaimBot: a customer refund assistant for the Click Kart online
//! store. A coordinator agent hands refund requests to a sequential
//! workflow (parallel purchase/eligibility verification, refund
//! processing, confirmation email) and a small axum server hosts the chat
//! UI in front of it.

pub mod agents;
pub mod config;
pub mod prompts;
pub mod sanitize;
pub mod server;
