use crate::eligibility::required_str;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use google_cloud_auth::credentials::{self, CacheableResource, Credentials};
use reclaim_core::{ReclaimError, Result, Tool, ToolContext};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex, RwLock};

const GMAIL_SEND_SCOPE: &str = "https://www.googleapis.com/auth/gmail.send";
const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";

/// Outbound mail seam. Returns the provider's message id on success.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<String>;
}

/// Sends through the Gmail REST API as the configured sender address,
/// authenticated with application-default credentials.
pub struct GmailMailer {
    client: reqwest::Client,
    sender: String,
    base_url: String,
    credentials: Credentials,
    auth_headers: Arc<RwLock<Option<reqwest::header::HeaderMap>>>,
}

impl GmailMailer {
    pub fn new(sender: impl Into<String>) -> Result<Self> {
        let credentials = credentials::Builder::default()
            .with_scopes([GMAIL_SEND_SCOPE])
            .build()
            .map_err(|e| ReclaimError::Tool(format!("failed to build gmail credentials: {e}")))?;

        Ok(Self {
            client: reqwest::Client::new(),
            sender: sender.into(),
            base_url: GMAIL_API_BASE.to_string(),
            credentials,
            auth_headers: Arc::new(RwLock::new(None)),
        })
    }

    async fn auth_headers(&self) -> Result<reqwest::header::HeaderMap> {
        let cacheable = self.credentials.headers(Default::default()).await.map_err(|e| {
            ReclaimError::Tool(format!("failed to obtain gmail auth headers: {e}"))
        })?;

        match cacheable {
            CacheableResource::New { data, .. } => {
                *self.auth_headers.write().expect("gmail auth header cache lock poisoned") =
                    Some(data.clone());
                Ok(data)
            }
            CacheableResource::NotModified => self
                .auth_headers
                .read()
                .expect("gmail auth header cache lock poisoned")
                .clone()
                .ok_or_else(|| {
                    ReclaimError::Tool(
                        "gmail credentials returned NotModified before any cached headers".into(),
                    )
                }),
        }
    }
}

/// Plain-text RFC 2822 message, base64url encoded the way the Gmail API's
/// `raw` field expects.
fn encode_raw_message(from: &str, to: &str, subject: &str, body: &str) -> String {
    let message = format!(
        "From: {from}\r\nTo: {to}\r\nSubject: {subject}\r\nContent-Type: text/plain; charset=\"utf-8\"\r\n\r\n{body}"
    );
    URL_SAFE_NO_PAD.encode(message.as_bytes())
}

#[async_trait]
impl Mailer for GmailMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<String> {
        let url = format!("{}/users/{}/messages/send", self.base_url, self.sender);
        let raw = encode_raw_message(&self.sender, to, subject, body);
        let headers = self.auth_headers().await?;

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&json!({ "raw": raw }))
            .send()
            .await
            .map_err(|e| ReclaimError::Tool(format!("Gmail API request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ReclaimError::Tool(format!("Gmail API error ({status}): {text}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ReclaimError::Tool(format!("malformed Gmail response: {e}")))?;

        body.get("id")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| ReclaimError::Tool("Gmail response missing message id".to_string()))
    }
}

/// Captures sent mail for tests instead of delivering it.
#[derive(Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<SentEmail>>,
    fail: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { sent: Mutex::new(Vec::new()), fail: true }
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().expect("sent mail lock poisoned").clone()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<String> {
        if self.fail {
            return Err(ReclaimError::Tool("smtp relay rejected message".to_string()));
        }

        let mut sent = self.sent.lock().expect("sent mail lock poisoned");
        sent.push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(format!("msg-{}", sent.len()))
    }
}

pub struct SendEmailTool {
    mailer: Arc<dyn Mailer>,
}

impl SendEmailTool {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }
}

#[async_trait]
impl Tool for SendEmailTool {
    fn name(&self) -> &str {
        "send_email"
    }

    fn description(&self) -> &str {
        "Send an email to the customer with the given subject and body."
    }

    fn parameters_schema(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "to": {
                    "type": "string",
                    "description": "Recipient email address"
                },
                "subject": {
                    "type": "string",
                    "description": "Email subject line"
                },
                "body": {
                    "type": "string",
                    "description": "Plain-text email body"
                }
            },
            "required": ["to", "subject", "body"]
        }))
    }

    async fn execute(&self, _ctx: Arc<dyn ToolContext>, args: Value) -> Result<Value> {
        let to = required_str(&args, "to")?;
        let subject = required_str(&args, "subject")?;
        let body = required_str(&args, "body")?;

        tracing::info!(to, subject, "sending email");

        // Delivery failures come back as a status string, not an error, so
        // the email agent can report them to the customer.
        match self.mailer.send(to, subject, body).await {
            Ok(id) => Ok(json!(format!("Email sent to {to} with ID: {id}"))),
            Err(e) => {
                tracing::error!(to, error = %e, "email send failed");
                Ok(json!(format!("Error occured in sending mail to {to}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::tool_ctx;

    #[test]
    fn raw_message_is_base64url_without_padding() {
        let raw = encode_raw_message("bot@example.com", "david@example.com", "Your refund", "hi");
        assert!(!raw.contains('='));
        assert!(!raw.contains('+'));
        assert!(!raw.contains('/'));

        let decoded = URL_SAFE_NO_PAD.decode(&raw).unwrap();
        let decoded = String::from_utf8(decoded).unwrap();
        assert!(decoded.starts_with("From: bot@example.com\r\nTo: david@example.com\r\n"));
        assert!(decoded.ends_with("\r\n\r\nhi"));
    }

    #[tokio::test]
    async fn success_returns_sent_status_with_id() {
        let mailer = Arc::new(MemoryMailer::new());
        let tool = SendEmailTool::new(mailer.clone());

        let result = tool
            .execute(
                tool_ctx(),
                json!({"to": "david@example.com", "subject": "Refund", "body": "done"}),
            )
            .await
            .unwrap();

        assert_eq!(result, json!("Email sent to david@example.com with ID: msg-1"));
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Refund");
    }

    #[tokio::test]
    async fn failure_returns_error_status_string() {
        let tool = SendEmailTool::new(Arc::new(MemoryMailer::failing()));

        let result = tool
            .execute(
                tool_ctx(),
                json!({"to": "david@example.com", "subject": "Refund", "body": "done"}),
            )
            .await
            .unwrap();

        assert_eq!(result, json!("Error occured in sending mail to david@example.com"));
    }

    #[tokio::test]
    async fn missing_body_is_an_argument_error() {
        let tool = SendEmailTool::new(Arc::new(MemoryMailer::new()));
        let err = tool
            .execute(tool_ctx(), json!({"to": "a@b.c", "subject": "s"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("body"));
    }
}
