use crate::prompts;
use reclaim_agent::{LlmAgentBuilder, ParallelAgent, SequentialAgent};
use reclaim_core::{Agent, Llm, Result};
use reclaim_tools::{
    CheckRefundEligibilityTool, GetPurchaseHistoryTool, Mailer, ProcessRefundTool, PurchaseStore,
    SendEmailTool,
};
use std::sync::Arc;

pub const COORDINATOR: &str = "RefundMultiAgent";
pub const PIPELINE: &str = "SequentialRefundProcessor";
pub const VERIFIER: &str = "VerifierAgent";
pub const PURCHASE_VERIFIER: &str = "PurchaseVerifierAgent";
pub const REFUND_ELIGIBILITY: &str = "RefundEligibilityAgent";
pub const REFUND_PROCESSOR: &str = "RefundProcessorAgent";
pub const EMAIL_SENDER: &str = "EmailSenderAgent";

/// External backends the tools talk to.
pub struct WorkflowDeps {
    pub purchase_store: Arc<dyn PurchaseStore>,
    pub mailer: Arc<dyn Mailer>,
}

/// Assembles the refund agent tree:
///
/// ```text
/// RefundMultiAgent (coordinator)
/// └── SequentialRefundProcessor
///     ├── VerifierAgent (parallel)
///     │   ├── PurchaseVerifierAgent  -> purchase_history
///     │   └── RefundEligibilityAgent -> is_refund_eligible
///     ├── RefundProcessorAgent       -> refund_confirmation_message
///     └── EmailSenderAgent           -> email_status
/// ```
///
/// `models` supplies the model per agent name, so tests can script each
/// agent independently while production hands every agent the same backend.
pub fn build_root_agent(
    models: impl Fn(&str) -> Arc<dyn Llm>,
    deps: &WorkflowDeps,
) -> Result<Arc<dyn Agent>> {
    let purchase_verifier = LlmAgentBuilder::new(PURCHASE_VERIFIER)
        .description("Verifies customer purchase history using the internal database")
        .model(models(PURCHASE_VERIFIER))
        .instruction(prompts::PURCHASE_VERIFIER_INSTRUCTION)
        .tool(Arc::new(GetPurchaseHistoryTool::new(deps.purchase_store.clone())))
        .output_key("purchase_history")
        .build()?;

    let refund_eligibility = LlmAgentBuilder::new(REFUND_ELIGIBILITY)
        .description("Determines refund eligibility based on policies")
        .model(models(REFUND_ELIGIBILITY))
        .instruction(prompts::REFUND_ELIGIBILITY_INSTRUCTION)
        .tool(Arc::new(CheckRefundEligibilityTool))
        .output_key("is_refund_eligible")
        .build()?;

    let verifier = ParallelAgent::new(
        VERIFIER,
        vec![Arc::new(purchase_verifier), Arc::new(refund_eligibility)],
    )
    .with_description("Checks purchase history and refund eligibility in parallel");

    let refund_processor = LlmAgentBuilder::new(REFUND_PROCESSOR)
        .description("Processes refunds or provides rejection explanations")
        .model(models(REFUND_PROCESSOR))
        .instruction(prompts::REFUND_PROCESSOR_INSTRUCTION)
        .tool(Arc::new(ProcessRefundTool))
        .output_key("refund_confirmation_message")
        .build()?;

    let email_sender = LlmAgentBuilder::new(EMAIL_SENDER)
        .description("Sends email using Gmail API")
        .model(models(EMAIL_SENDER))
        .instruction(prompts::EMAIL_SENDER_INSTRUCTION)
        .tool(Arc::new(SendEmailTool::new(deps.mailer.clone())))
        .output_key("email_status")
        .build()?;

    let pipeline = SequentialAgent::new(
        PIPELINE,
        vec![Arc::new(verifier), Arc::new(refund_processor), Arc::new(email_sender)],
    )
    .with_description("Processes customer refunds in a fixed sequential workflow");

    let coordinator = LlmAgentBuilder::new(COORDINATOR)
        .description("Customer refund multi LLM agent for the Click Kart online store")
        .model(models(COORDINATOR))
        .instruction(prompts::COORDINATOR_INSTRUCTION)
        .sub_agent(Arc::new(pipeline))
        .build()?;

    Ok(Arc::new(coordinator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reclaim_model::MockLlm;
    use reclaim_tools::{MemoryMailer, MemoryPurchaseStore};

    #[test]
    fn tree_shape_matches_the_workflow() {
        let deps = WorkflowDeps {
            purchase_store: Arc::new(MemoryPurchaseStore::default()),
            mailer: Arc::new(MemoryMailer::new()),
        };
        let root =
            build_root_agent(|name| Arc::new(MockLlm::new(name)) as Arc<dyn Llm>, &deps).unwrap();

        assert_eq!(root.name(), COORDINATOR);
        let pipeline = &root.sub_agents()[0];
        assert_eq!(pipeline.name(), PIPELINE);

        let stages: Vec<&str> = pipeline.sub_agents().iter().map(|a| a.name()).collect();
        assert_eq!(stages, vec![VERIFIER, REFUND_PROCESSOR, EMAIL_SENDER]);

        let branches: Vec<&str> =
            pipeline.sub_agents()[0].sub_agents().iter().map(|a| a.name()).collect();
        assert_eq!(branches, vec![PURCHASE_VERIFIER, REFUND_ELIGIBILITY]);
    }
}
