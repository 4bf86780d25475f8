//! Google Gemini generateContent.

use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};

use super::{Completion, ProviderApi};

pub const API: ProviderApi = ProviderApi {
    build: build_request,
    parse: parse_response,
};

/// Gemini has no separate system role here; the system text leads the prompt.
fn build_request(
    client: &Client,
    base_url: &str,
    api_key: &str,
    completion: &Completion<'_>,
) -> RequestBuilder {
    let text = format!("{}\n\n{}", completion.system, completion.prompt);
    client
        .post(format!(
            "{base_url}/models/{}:generateContent",
            completion.model
        ))
        .query(&[("key", api_key)])
        .json(&json!({
            "contents": [{ "role": "user", "parts": [{ "text": text }] }],
        }))
}

fn parse_response(body: &Value) -> Option<String> {
    let parts = body.pointer("/candidates/0/content/parts")?.as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::tests::inspect;

    #[test]
    fn test_request_shape() {
        let (url, _, body) = inspect(API, "gemini-2.5-pro");
        assert_eq!(url.path(), "/v1/models/gemini-2.5-pro:generateContent");
        assert_eq!(url.query(), Some("key=secret"));
        assert_eq!(
            body["contents"][0]["parts"][0]["text"],
            "system text\n\nuser text"
        );
    }

    #[test]
    fn test_parse_reply() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "e7" }, { "text": "e5" }] } }]
        });
        assert_eq!(parse_response(&body), Some("e7e5".to_string()));
        assert_eq!(parse_response(&json!({ "candidates": [] })), None);
    }
}
