use async_trait::async_trait;
use reclaim_core::{ReclaimError, Result, Tool, ToolContext};
use serde_json::{Value, json};
use std::sync::Arc;

/// Shipping methods that qualify for a refund.
pub const ELIGIBLE_SHIPPING_METHODS: &[&str] = &["INSURED"];

/// Refund reasons that qualify for a refund.
pub const ELIGIBLE_REASONS: &[&str] = &["DAMAGED", "NEVER_ARRIVED", "LOST"];

/// Policy decision: a refund is granted only for insured shipments with a
/// qualifying reason. Both inputs are trimmed and upper-cased first.
pub fn is_refund_eligible(reason: &str, shipping_method: &str) -> bool {
    let reason = reason.trim().to_uppercase();
    let shipping = shipping_method.trim().to_uppercase();

    ELIGIBLE_SHIPPING_METHODS.contains(&shipping.as_str())
        && ELIGIBLE_REASONS.contains(&reason.as_str())
}

pub struct CheckRefundEligibilityTool;

#[async_trait]
impl Tool for CheckRefundEligibilityTool {
    fn name(&self) -> &str {
        "check_refund_eligibility"
    }

    fn description(&self) -> &str {
        "Check if a refund request is eligible based on reason and shipping method."
    }

    fn parameters_schema(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "reason": {
                    "type": "string",
                    "description": "Refund reason, e.g. DAMAGED, NEVER_ARRIVED or LOST"
                },
                "shipping_method": {
                    "type": "string",
                    "description": "Shipping method used for the order"
                }
            },
            "required": ["reason", "shipping_method"]
        }))
    }

    async fn execute(&self, _ctx: Arc<dyn ToolContext>, args: Value) -> Result<Value> {
        let reason = required_str(&args, "reason")?;
        let shipping_method = required_str(&args, "shipping_method")?;

        let eligible = is_refund_eligible(reason, shipping_method);
        tracing::info!(reason, shipping_method, eligible, "eligibility checked");

        Ok(json!(eligible))
    }
}

pub(crate) fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ReclaimError::Tool(format!("missing required argument '{key}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn insured_with_qualifying_reason_is_eligible() {
        assert!(is_refund_eligible("DAMAGED", "INSURED"));
        assert!(is_refund_eligible("NEVER_ARRIVED", "INSURED"));
        assert!(is_refund_eligible("LOST", "INSURED"));
    }

    #[test]
    fn uninsured_shipping_is_never_eligible() {
        assert!(!is_refund_eligible("DAMAGED", "STANDARD"));
        assert!(!is_refund_eligible("LOST", "EXPRESS"));
    }

    #[test]
    fn unknown_reason_is_not_eligible() {
        assert!(!is_refund_eligible("CHANGED_MIND", "INSURED"));
        assert!(!is_refund_eligible("", "INSURED"));
    }

    #[test]
    fn inputs_are_normalized() {
        assert!(is_refund_eligible("  damaged ", "insured"));
        assert!(is_refund_eligible("never_arrived", " Insured\n"));
    }

    proptest! {
        // Eligibility must be invariant under case and surrounding whitespace.
        #[test]
        fn normalization_is_stable(reason in "[a-zA-Z_]{0,16}", shipping in "[a-zA-Z_]{0,16}",
                                   pad_l in " {0,3}", pad_r in " {0,3}") {
            let padded_reason = format!("{pad_l}{reason}{pad_r}");
            let padded_shipping = format!("{pad_l}{shipping}{pad_r}");
            prop_assert_eq!(
                is_refund_eligible(&padded_reason, &padded_shipping),
                is_refund_eligible(&reason.to_uppercase(), &shipping.to_uppercase())
            );
        }

        // Nothing outside the allow-lists ever qualifies.
        #[test]
        fn only_allow_listed_pairs_qualify(reason in "\\PC{0,24}", shipping in "\\PC{0,24}") {
            if is_refund_eligible(&reason, &shipping) {
                prop_assert!(ELIGIBLE_REASONS.contains(&reason.trim().to_uppercase().as_str()));
                prop_assert!(
                    ELIGIBLE_SHIPPING_METHODS.contains(&shipping.trim().to_uppercase().as_str())
                );
            }
        }
    }

    #[tokio::test]
    async fn tool_returns_boolean() {
        use crate::test_support::tool_ctx;

        let tool = CheckRefundEligibilityTool;
        let result = tool
            .execute(tool_ctx(), json!({"reason": "damaged", "shipping_method": "insured"}))
            .await
            .unwrap();
        assert_eq!(result, json!(true));

        let result = tool
            .execute(tool_ctx(), json!({"reason": "DAMAGED", "shipping_method": "STANDARD"}))
            .await
            .unwrap();
        assert_eq!(result, json!(false));
    }

    #[tokio::test]
    async fn tool_rejects_missing_arguments() {
        use crate::test_support::tool_ctx;

        let tool = CheckRefundEligibilityTool;
        let err = tool.execute(tool_ctx(), json!({"reason": "DAMAGED"})).await.unwrap_err();
        assert!(err.to_string().contains("shipping_method"));
    }
}
