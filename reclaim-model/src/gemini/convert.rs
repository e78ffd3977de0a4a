//! Wire format conversion between core types and the Gemini REST API.

use reclaim_core::{Content, FinishReason, LlmRequest, LlmResponse, Part, UsageMetadata};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<WireTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<WireGenerationConfig>,
}

#[derive(Debug, Serialize)]
pub struct WireTool {
    #[serde(rename = "functionDeclarations")]
    pub function_declarations: Vec<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WireContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<WirePart>,
}

/// One wire part. Exactly one field is populated; options keep the
/// serde representation forward-compatible with part kinds we ignore.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<WireFunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_response: Option<WireFunctionResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WireFunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WireFunctionResponse {
    pub name: String,
    #[serde(default)]
    pub response: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<WireUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<WireContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireUsageMetadata {
    #[serde(default)]
    pub prompt_token_count: i32,
    #[serde(default)]
    pub candidates_token_count: i32,
    #[serde(default)]
    pub total_token_count: i32,
}

fn part_to_wire(part: &Part) -> WirePart {
    match part {
        Part::Text { text } => WirePart { text: Some(text.clone()), ..Default::default() },
        Part::FunctionCall { name, args } => WirePart {
            function_call: Some(WireFunctionCall { name: name.clone(), args: args.clone() }),
            ..Default::default()
        },
        Part::FunctionResponse { name, response } => WirePart {
            function_response: Some(WireFunctionResponse {
                name: name.clone(),
                // Gemini requires an object here; wrap scalars.
                response: match response {
                    Value::Object(_) => response.clone(),
                    other => serde_json::json!({ "result": other }),
                },
            }),
            ..Default::default()
        },
    }
}

fn content_to_wire(content: &Content) -> WireContent {
    WireContent {
        role: Some(match content.role.as_str() {
            "model" => "model".to_string(),
            "function" => "function".to_string(),
            _ => "user".to_string(),
        }),
        parts: content.parts.iter().map(part_to_wire).collect(),
    }
}

pub fn build_request(request: &LlmRequest) -> GenerateContentRequest {
    let tools = if request.tools.is_empty() {
        None
    } else {
        let mut declarations: Vec<(&String, &Value)> = request.tools.iter().collect();
        // Stable declaration order; HashMap iteration order is arbitrary.
        declarations.sort_by_key(|(name, _)| name.as_str());
        Some(vec![WireTool {
            function_declarations: declarations.into_iter().map(|(_, v)| v.clone()).collect(),
        }])
    };

    let generation_config = request.config.as_ref().map(|c| WireGenerationConfig {
        temperature: c.temperature,
        top_p: c.top_p,
        top_k: c.top_k,
        max_output_tokens: c.max_output_tokens,
    });

    GenerateContentRequest {
        contents: request.contents.iter().map(content_to_wire).collect(),
        tools,
        generation_config,
    }
}

pub fn convert_response(resp: &GenerateContentResponse, partial: bool) -> LlmResponse {
    let candidate = resp.candidates.first();

    let content = candidate.and_then(|c| c.content.as_ref()).map(|wire| {
        let parts: Vec<Part> = wire
            .parts
            .iter()
            .filter_map(|p| {
                if let Some(text) = &p.text {
                    Some(Part::Text { text: text.clone() })
                } else if let Some(call) = &p.function_call {
                    Some(Part::FunctionCall { name: call.name.clone(), args: call.args.clone() })
                } else {
                    p.function_response.as_ref().map(|fr| Part::FunctionResponse {
                        name: fr.name.clone(),
                        response: fr.response.clone(),
                    })
                }
            })
            .collect();

        Content { role: "model".to_string(), parts }
    });

    let finish_reason = candidate.and_then(|c| c.finish_reason.as_deref()).map(|fr| match fr {
        "STOP" => FinishReason::Stop,
        "MAX_TOKENS" => FinishReason::MaxTokens,
        "SAFETY" => FinishReason::Safety,
        _ => FinishReason::Other,
    });

    let usage_metadata = resp.usage_metadata.as_ref().map(|u| UsageMetadata {
        prompt_token_count: u.prompt_token_count,
        candidates_token_count: u.candidates_token_count,
        total_token_count: u.total_token_count,
    });

    LlmResponse { content, usage_metadata, finish_reason, partial, turn_complete: !partial }
}
