use reclaimbot::agents::{self, WorkflowDeps};
use reclaimbot::config::AppConfig;
use reclaimbot::server::{self, AppState};
use reclaim_core::{Llm, ReclaimError, Result};
use reclaim_model::{GeminiConfig, GeminiModel};
use reclaim_runner::{Runner, RunnerConfig};
use reclaim_session::InMemorySessionService;
use reclaim_tools::{BigQueryPurchaseStore, GmailMailer, Mailer, MemoryMailer, PurchaseStore};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const APP_NAME: &str = "reclaimbot";

/// Idle conversations are dropped after this long.
const SESSION_MAX_IDLE: Duration = Duration::from_secs(60 * 60);
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(model = %config.model, vertex = config.use_vertex, "starting reclaimbot");

    let model = build_model(&config)?;
    let purchase_store = build_purchase_store(&config).await?;
    let mailer = build_mailer(&config)?;

    let root_agent = agents::build_root_agent(
        |_| model.clone(),
        &WorkflowDeps { purchase_store, mailer },
    )?;

    let session_service = Arc::new(InMemorySessionService::new());
    let runner = Arc::new(Runner::new(RunnerConfig {
        app_name: APP_NAME.to_string(),
        agent: root_agent,
        session_service: session_service.clone(),
    }));

    // Periodic sweep of abandoned conversations.
    let sweeper = session_service.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            sweeper.expire_idle(SESSION_MAX_IDLE);
        }
    });

    let app = server::create_app(AppState {
        app_name: APP_NAME.to_string(),
        runner,
        session_service,
    });

    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .map_err(|e| ReclaimError::Config(format!("cannot bind {}: {e}", config.addr)))?;
    tracing::info!(addr = %config.addr, "chat UI listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ReclaimError::Config(format!("server error: {e}")))?;

    Ok(())
}

fn build_model(config: &AppConfig) -> Result<Arc<dyn Llm>> {
    let gemini_config = if config.use_vertex {
        let project = config
            .project_id
            .clone()
            .ok_or_else(|| ReclaimError::Config("GOOGLE_CLOUD_PROJECT is not set".to_string()))?;
        GeminiConfig::vertex(config.model.clone(), project, config.location.clone())
    } else {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ReclaimError::Config("GOOGLE_API_KEY is not set".to_string()))?;
        GeminiConfig::api_key(config.model.clone(), api_key)
    };

    Ok(Arc::new(GeminiModel::new(gemini_config)?))
}

async fn build_purchase_store(config: &AppConfig) -> Result<Arc<dyn PurchaseStore>> {
    let project = config
        .project_id
        .clone()
        .ok_or_else(|| ReclaimError::Config("GOOGLE_CLOUD_PROJECT is required for BigQuery".to_string()))?;

    let store =
        BigQueryPurchaseStore::connect(project, config.dataset.clone(), config.table.clone())
            .await?;
    Ok(Arc::new(store))
}

fn build_mailer(config: &AppConfig) -> Result<Arc<dyn Mailer>> {
    match &config.sender {
        Some(sender) => Ok(Arc::new(GmailMailer::new(sender.clone())?)),
        None => {
            // No sender configured: capture mail locally instead of failing
            // every email turn.
            tracing::warn!("RECLAIM_SENDER not set; emails will not leave the process");
            Ok(Arc::new(MemoryMailer::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
