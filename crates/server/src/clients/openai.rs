//! OpenAI-compatible chat completions (OpenAI, xAI, DeepSeek, Moonshot).

use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};

use super::{Completion, ProviderApi};

pub const API: ProviderApi = ProviderApi {
    build: build_request,
    parse: parse_response,
};

/// Models that reject a custom temperature.
const FIXED_TEMPERATURE_MODELS: &[&str] = &["gpt-5"];

fn build_request(
    client: &Client,
    base_url: &str,
    api_key: &str,
    completion: &Completion<'_>,
) -> RequestBuilder {
    let mut body = json!({
        "model": completion.model,
        "messages": [
            { "role": "system", "content": completion.system },
            { "role": "user", "content": completion.prompt },
        ],
    });
    if !FIXED_TEMPERATURE_MODELS.contains(&completion.model) {
        body["temperature"] = json!(0.3);
    }
    client
        .post(format!("{base_url}/chat/completions"))
        .bearer_auth(api_key)
        .json(&body)
}

fn parse_response(body: &Value) -> Option<String> {
    body.pointer("/choices/0/message/content")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::tests::inspect;

    #[test]
    fn test_request_shape() {
        let (url, headers, body) = inspect(API, "gpt-4o");
        assert_eq!(url.as_str(), "http://llm.test/v1/chat/completions");
        assert_eq!(headers["authorization"], "Bearer secret");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "user text");
        assert_eq!(body["temperature"], 0.3);
    }

    #[test]
    fn test_gpt5_has_no_temperature() {
        let (_, _, body) = inspect(API, "gpt-5");
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_parse_reply() {
        let body = json!({ "choices": [{ "message": { "content": " e2e4 " } }] });
        assert_eq!(parse_response(&body), Some(" e2e4 ".to_string()));
        assert_eq!(parse_response(&json!({ "choices": [] })), None);
    }
}
