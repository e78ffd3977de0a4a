use crate::eligibility::required_str;
use async_trait::async_trait;
use gcp_bigquery_client::model::{
    query_parameter::QueryParameter, query_parameter_type::QueryParameterType,
    query_parameter_value::QueryParameterValue, query_request::QueryRequest,
    query_response::ResultSet,
};
use reclaim_core::{ReclaimError, Result, Tool, ToolContext};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

/// One purchased line item, flattened from the order's item array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub customer_name: String,
    pub order_id: String,
    pub date: String,
    pub product_name: String,
    pub quantity: i64,
    pub price: f64,
    pub shipping_method: String,
    pub total_amount: f64,
    pub customer_email_id: String,
}

/// Backend seam for purchase lookup. Production uses BigQuery; tests use
/// the in-memory store.
#[async_trait]
pub trait PurchaseStore: Send + Sync {
    /// Case-insensitive substring match on customer name. The fragment is
    /// already trimmed and lower-cased.
    async fn find_by_customer(&self, fragment: &str) -> Result<Vec<PurchaseRecord>>;
}

pub struct BigQueryPurchaseStore {
    client: gcp_bigquery_client::Client,
    project_id: String,
    dataset: String,
    table: String,
}

impl BigQueryPurchaseStore {
    pub async fn connect(
        project_id: impl Into<String>,
        dataset: impl Into<String>,
        table: impl Into<String>,
    ) -> Result<Self> {
        let client =
            gcp_bigquery_client::Client::from_application_default_credentials().await.map_err(
                |e| ReclaimError::Tool(format!("failed to create BigQuery client: {e}")),
            )?;

        Ok(Self {
            client,
            project_id: project_id.into(),
            dataset: dataset.into(),
            table: table.into(),
        })
    }
}

#[async_trait]
impl PurchaseStore for BigQueryPurchaseStore {
    async fn find_by_customer(&self, fragment: &str) -> Result<Vec<PurchaseRecord>> {
        // Flatten the repeated items column; one row per line item. The
        // fragment travels as a named parameter, never spliced into SQL.
        let query = format!(
            "SELECT \
                customer_name, \
                order_id, \
                CAST(date AS STRING) AS date, \
                item.product_name, \
                item.quantity, \
                item.price, \
                shipping_method, \
                total_amount, \
                customer_email_id \
             FROM `{}.{}.{}`, UNNEST(items) AS item \
             WHERE LOWER(customer_name) LIKE CONCAT('%', @purchaser, '%')",
            self.project_id, self.dataset, self.table
        );

        let request = QueryRequest {
            query,
            parameter_mode: Some("NAMED".to_string()),
            query_parameters: Some(vec![QueryParameter {
                name: Some("purchaser".to_string()),
                parameter_type: Some(QueryParameterType {
                    r#type: "STRING".to_string(),
                    ..Default::default()
                }),
                parameter_value: Some(QueryParameterValue {
                    value: Some(fragment.to_string()),
                    ..Default::default()
                }),
            }]),
            use_legacy_sql: false,
            ..Default::default()
        };

        let response = self
            .client
            .job()
            .query(&self.project_id, request)
            .await
            .map_err(|e| ReclaimError::Tool(format!("BigQuery query failed: {e}")))?;

        let mut result_set = ResultSet::new_from_query_response(response);
        let mut records = Vec::new();

        while result_set.next_row() {
            records.push(PurchaseRecord {
                customer_name: get_string(&result_set, "customer_name")?,
                order_id: get_string(&result_set, "order_id")?,
                date: get_string(&result_set, "date")?,
                product_name: get_string(&result_set, "product_name")?,
                quantity: result_set
                    .get_i64_by_name("quantity")
                    .map_err(row_error)?
                    .unwrap_or_default(),
                price: result_set.get_f64_by_name("price").map_err(row_error)?.unwrap_or_default(),
                shipping_method: get_string(&result_set, "shipping_method")?,
                total_amount: result_set
                    .get_f64_by_name("total_amount")
                    .map_err(row_error)?
                    .unwrap_or_default(),
                customer_email_id: get_string(&result_set, "customer_email_id")?,
            });
        }

        Ok(records)
    }
}

fn get_string(result_set: &ResultSet, column: &str) -> Result<String> {
    Ok(result_set.get_string_by_name(column).map_err(row_error)?.unwrap_or_default())
}

fn row_error(e: gcp_bigquery_client::error::BQError) -> ReclaimError {
    ReclaimError::Tool(format!("BigQuery row decode failed: {e}"))
}

/// Fixture-backed store for tests and offline runs.
#[derive(Default)]
pub struct MemoryPurchaseStore {
    records: Vec<PurchaseRecord>,
}

impl MemoryPurchaseStore {
    pub fn new(records: Vec<PurchaseRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl PurchaseStore for MemoryPurchaseStore {
    async fn find_by_customer(&self, fragment: &str) -> Result<Vec<PurchaseRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.customer_name.to_lowercase().contains(fragment))
            .cloned()
            .collect())
    }
}

pub struct GetPurchaseHistoryTool {
    store: Arc<dyn PurchaseStore>,
}

impl GetPurchaseHistoryTool {
    pub fn new(store: Arc<dyn PurchaseStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GetPurchaseHistoryTool {
    fn name(&self) -> &str {
        "get_purchase_history"
    }

    fn description(&self) -> &str {
        "Retrieve purchase history for a given customer name or name fragment."
    }

    fn parameters_schema(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "purchaser": {
                    "type": "string",
                    "description": "Customer name or name fragment"
                }
            },
            "required": ["purchaser"]
        }))
    }

    async fn execute(&self, _ctx: Arc<dyn ToolContext>, args: Value) -> Result<Value> {
        let purchaser = required_str(&args, "purchaser")?.trim().to_lowercase();

        if purchaser.is_empty() {
            tracing::warn!("purchase lookup with empty purchaser");
            return Ok(json!([]));
        }

        tracing::info!(purchaser = %purchaser, "retrieving purchase history");

        match self.store.find_by_customer(&purchaser).await {
            Ok(records) => {
                if records.is_empty() {
                    tracing::warn!(purchaser = %purchaser, "no purchase history found");
                } else {
                    tracing::info!(purchaser = %purchaser, count = records.len(), "purchases found");
                }
                Ok(serde_json::to_value(records)?)
            }
            Err(e) => {
                // Lookup failures degrade to "no purchases"; the agent tells
                // the customer it found nothing rather than crashing the turn.
                tracing::warn!(purchaser = %purchaser, error = %e, "purchase lookup failed");
                Ok(json!([]))
            }
        }
    }
}
