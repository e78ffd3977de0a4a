use crate::eligibility::required_str;
use async_trait::async_trait;
use reclaim_core::{ReclaimError, Result, Tool, ToolContext};
use serde_json::{Value, json};
use std::sync::Arc;

/// Deterministic refund id: the order id plus the amount in cents.
pub fn refund_id(order_id: &str, amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    format!("REF-{order_id}-{cents}")
}

/// Issues the refund and returns the customer-facing confirmation message.
pub fn process_refund(amount: f64, order_id: &str) -> String {
    let id = refund_id(order_id, amount);
    tracing::info!(order_id, amount, refund_id = %id, "refund processed");

    format!(
        "✅ Refund {id} successful! We will credit ${amount:.2} to your account within 2 business days."
    )
}

pub struct ProcessRefundTool;

#[async_trait]
impl Tool for ProcessRefundTool {
    fn name(&self) -> &str {
        "process_refund"
    }

    fn description(&self) -> &str {
        "Process a refund for the given amount and order."
    }

    fn parameters_schema(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "amount": {
                    "type": "number",
                    "description": "Refund amount in dollars"
                },
                "order_id": {
                    "type": "string",
                    "description": "Order ID to refund"
                }
            },
            "required": ["amount", "order_id"]
        }))
    }

    async fn execute(&self, _ctx: Arc<dyn ToolContext>, args: Value) -> Result<Value> {
        let amount = args
            .get("amount")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| ReclaimError::Tool("missing required argument 'amount'".to_string()))?;
        let order_id = required_str(&args, "order_id")?;

        Ok(json!(process_refund(amount, order_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::tool_ctx;

    #[test]
    fn refund_id_encodes_order_and_cents() {
        assert_eq!(refund_id("SG002-20250610", 16.0), "REF-SG002-20250610-1600");
        assert_eq!(refund_id("A-1", 0.1), "REF-A-1-10");
        assert_eq!(refund_id("A-1", 23.45), "REF-A-1-2345");
    }

    #[test]
    fn confirmation_message_includes_id_and_amount() {
        let message = process_refund(16.0, "SG002-20250610");
        assert_eq!(
            message,
            "✅ Refund REF-SG002-20250610-1600 successful! We will credit $16.00 to your account within 2 business days."
        );
    }

    #[tokio::test]
    async fn tool_returns_confirmation_string() {
        let tool = ProcessRefundTool;
        let result = tool
            .execute(tool_ctx(), json!({"amount": 16.0, "order_id": "SG002-20250610"}))
            .await
            .unwrap();
        let message = result.as_str().unwrap();
        assert!(message.contains("REF-SG002-20250610-1600"));
        assert!(message.contains("$16.00"));
    }

    #[tokio::test]
    async fn tool_rejects_non_numeric_amount() {
        let tool = ProcessRefundTool;
        let err = tool
            .execute(tool_ctx(), json!({"amount": "sixteen", "order_id": "A-1"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("amount"));
    }
}
