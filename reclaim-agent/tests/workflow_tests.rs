mod common;

use async_stream::stream;
use async_trait::async_trait;
use common::TestInvocation;
use futures::StreamExt;
use reclaim_agent::{LlmAgentBuilder, ParallelAgent, SequentialAgent};
use reclaim_core::{
    Agent, Content, Event, EventStream, InvocationContext, ReclaimError, Result,
};
use reclaim_model::MockLlm;
use std::sync::Arc;
use std::time::Duration;

/// Emits numbered events with a fixed delay between them.
struct TickingAgent {
    name: String,
    ticks: usize,
    delay: Duration,
}

#[async_trait]
impl Agent for TickingAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "emits ticks"
    }

    fn sub_agents(&self) -> &[Arc<dyn Agent>] {
        &[]
    }

    async fn run(&self, ctx: Arc<dyn InvocationContext>) -> Result<EventStream> {
        let name = self.name.clone();
        let ticks = self.ticks;
        let delay = self.delay;
        let invocation_id = ctx.invocation_id().to_string();

        let s = stream! {
            for i in 0..ticks {
                tokio::time::sleep(delay).await;
                yield Ok(Event::new(&invocation_id)
                    .with_author(&name)
                    .with_content(Content::new("model").with_text(format!("{name}:{i}"))));
            }
        };
        Ok(Box::pin(s))
    }
}

struct FailingAgent;

#[async_trait]
impl Agent for FailingAgent {
    fn name(&self) -> &str {
        "failing"
    }

    fn description(&self) -> &str {
        "always fails"
    }

    fn sub_agents(&self) -> &[Arc<dyn Agent>] {
        &[]
    }

    async fn run(&self, _ctx: Arc<dyn InvocationContext>) -> Result<EventStream> {
        let s = stream! {
            yield Err(ReclaimError::Agent("branch blew up".to_string()));
        };
        Ok(Box::pin(s))
    }
}

#[tokio::test]
async fn sequential_runs_stages_in_order() {
    let a = Arc::new(TickingAgent {
        name: "first".to_string(),
        ticks: 2,
        delay: Duration::from_millis(1),
    });
    let b = Arc::new(TickingAgent {
        name: "second".to_string(),
        ticks: 2,
        delay: Duration::from_millis(1),
    });

    let workflow = SequentialAgent::new("pipeline", vec![a, b]);
    let ctx = TestInvocation::new("go").await;

    let mut stream = workflow.run(ctx as Arc<dyn InvocationContext>).await.unwrap();
    let mut texts = Vec::new();
    while let Some(event) = stream.next().await {
        texts.push(event.unwrap().text());
    }

    assert_eq!(texts, vec!["first:0", "first:1", "second:0", "second:1"]);
}

#[tokio::test]
async fn sequential_stage_error_stops_later_stages() {
    let workflow = SequentialAgent::new(
        "pipeline",
        vec![
            Arc::new(FailingAgent) as Arc<dyn Agent>,
            Arc::new(TickingAgent {
                name: "never".to_string(),
                ticks: 1,
                delay: Duration::from_millis(1),
            }),
        ],
    );

    let ctx = TestInvocation::new("go").await;
    let mut stream = workflow.run(ctx as Arc<dyn InvocationContext>).await.unwrap();

    let first = stream.next().await.unwrap();
    assert!(first.is_err());
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn sequential_slots_flow_between_stages() {
    // Stage one publishes a slot; the harness applies deltas the way the
    // runner does; stage two's instruction requires the slot.
    let first_model = Arc::new(MockLlm::new("mock"));
    first_model.enqueue_text("order A-101, mug, INSURED shipping");
    let first = LlmAgentBuilder::new("PurchaseVerifierAgent")
        .model(first_model)
        .output_key("purchase_history")
        .build()
        .unwrap();

    let second_model = Arc::new(MockLlm::new("mock"));
    second_model.enqueue_text("true");
    let second = LlmAgentBuilder::new("RefundEligibilityAgent")
        .model(second_model)
        .instruction("Purchases on file: {purchase_history}")
        .output_key("is_refund_eligible")
        .build()
        .unwrap();

    let workflow =
        SequentialAgent::new("pipeline", vec![Arc::new(first), Arc::new(second)]);
    let ctx = TestInvocation::new("was my package insured?").await;

    let mut stream = workflow.run(ctx.clone() as Arc<dyn InvocationContext>).await.unwrap();
    while let Some(event) = stream.next().await {
        let event = event.unwrap();
        for (key, value) in &event.actions.state_delta {
            ctx.session_handle().state_set(key.clone(), value.clone());
        }
    }

    assert_eq!(
        ctx.session_handle().state_get("purchase_history").unwrap(),
        serde_json::json!("order A-101, mug, INSURED shipping")
    );
    assert_eq!(
        ctx.session_handle().state_get("is_refund_eligible").unwrap(),
        serde_json::json!("true")
    );
}

#[tokio::test]
async fn parallel_interleaves_branch_events() {
    let fast = Arc::new(TickingAgent {
        name: "fast".to_string(),
        ticks: 3,
        delay: Duration::from_millis(5),
    });
    let slow = Arc::new(TickingAgent {
        name: "slow".to_string(),
        ticks: 2,
        delay: Duration::from_millis(40),
    });

    let workflow = ParallelAgent::new("fanout", vec![fast, slow]);
    let ctx = TestInvocation::new("go").await;

    let mut stream = workflow.run(ctx as Arc<dyn InvocationContext>).await.unwrap();
    let mut texts = Vec::new();
    while let Some(event) = stream.next().await {
        texts.push(event.unwrap().text());
    }

    assert_eq!(texts.len(), 5);
    // All fast ticks arrive before the last slow tick; neither branch is
    // drained to completion before the other starts.
    let last_fast = texts.iter().rposition(|t| t.starts_with("fast")).unwrap();
    let last_slow = texts.iter().rposition(|t| t.starts_with("slow")).unwrap();
    assert!(last_fast < last_slow, "event order: {texts:?}");
    assert!(texts[..last_slow].iter().any(|t| t.starts_with("fast")));
}

#[tokio::test]
async fn parallel_branch_error_ends_merged_stream() {
    let slow = Arc::new(TickingAgent {
        name: "slow".to_string(),
        ticks: 3,
        delay: Duration::from_millis(50),
    });

    let workflow =
        ParallelAgent::new("fanout", vec![Arc::new(FailingAgent) as Arc<dyn Agent>, slow]);
    let ctx = TestInvocation::new("go").await;

    let mut stream = workflow.run(ctx as Arc<dyn InvocationContext>).await.unwrap();
    let mut saw_error = false;
    while let Some(event) = stream.next().await {
        if event.is_err() {
            saw_error = true;
            break;
        }
    }
    assert!(saw_error);
    assert!(stream.next().await.is_none());
}
