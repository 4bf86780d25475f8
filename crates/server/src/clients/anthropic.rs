//! Anthropic messages API.

use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};

use super::{Completion, ProviderApi};

pub const API: ProviderApi = ProviderApi {
    build: build_request,
    parse: parse_response,
};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 50;

fn build_request(
    client: &Client,
    base_url: &str,
    api_key: &str,
    completion: &Completion<'_>,
) -> RequestBuilder {
    client
        .post(format!("{base_url}/messages"))
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .json(&json!({
            "model": completion.model,
            "max_tokens": MAX_TOKENS,
            "system": completion.system,
            "messages": [{ "role": "user", "content": completion.prompt }],
        }))
}

/// First content block, when it is text.
fn parse_response(body: &Value) -> Option<String> {
    let block = body.pointer("/content/0")?;
    if block.get("type").and_then(Value::as_str) != Some("text") {
        return None;
    }
    block.get("text")?.as_str().map(str::to_string)
}
