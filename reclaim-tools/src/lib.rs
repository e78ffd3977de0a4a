//! Refund-domain tools. Each tool implements [`reclaim_core::Tool`] and is
//! wired onto exactly one agent:
//!
//! - [`GetPurchaseHistoryTool`] — purchase lookup against BigQuery (or an
//!   in-memory fixture store)
//! - [`CheckRefundEligibilityTool`] — pure policy check over shipping
//!   method and refund reason
//! - [`ProcessRefundTool`] — mints the refund id and confirmation message
//! - [`SendEmailTool`] — delivers the confirmation through Gmail

mod eligibility;
mod email;
mod purchase;
mod refund;

pub use eligibility::{
    CheckRefundEligibilityTool, ELIGIBLE_REASONS, ELIGIBLE_SHIPPING_METHODS, is_refund_eligible,
};
pub use email::{GmailMailer, Mailer, MemoryMailer, SendEmailTool, SentEmail};
pub use purchase::{
    BigQueryPurchaseStore, GetPurchaseHistoryTool, MemoryPurchaseStore, PurchaseRecord,
    PurchaseStore,
};
pub use refund::{ProcessRefundTool, process_refund, refund_id};
