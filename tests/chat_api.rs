//! Integration tests for the chat HTTP API
//!
//! Each test runs the router in-process on an ephemeral port and talks to it
//! with reqwest.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use toolchat::config::Config;
use toolchat::llm::{
    LlmError, LlmProvider, LlmResponse, Message, ProviderFactory, Role, ToolCall, ToolDefinition,
};
use toolchat::transport::{build_router, AppState};
use wiremock::matchers::{bearer_token, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Provider whose behaviour is chosen by the API key it was built with
struct KeyedProvider {
    key: String,
}

#[async_trait]
impl LlmProvider for KeyedProvider {
    fn name(&self) -> &str {
        "keyed"
    }

    async fn chat(
        &self,
        messages: &[Message],
        _tools: Option<&[ToolDefinition]>,
    ) -> Result<LlmResponse, LlmError> {
        match self.key.as_str() {
            "sk-bad" => return Err(LlmError::Unauthorized("Incorrect API key provided".into())),
            "sk-limit" => return Err(LlmError::RateLimited("quota exceeded".into())),
            "sk-down" => return Err(LlmError::ServiceError("overloaded".into())),
            "sk-nomodel" => {
                return Err(LlmError::Upstream {
                    status: 404,
                    message: "The model `gpt-x` does not exist".into(),
                })
            }
            "sk-broken" => return Err(LlmError::Other(anyhow::anyhow!("boom"))),
            _ => {}
        }

        let last = messages.last().expect("conversation is never empty");
        if last.role == Role::Tool {
            let result = last.content.as_text().unwrap_or_default();
            return Ok(LlmResponse::Text {
                text: format!("Done: {}", result),
                usage: None,
            });
        }

        let user = last.content.as_text().unwrap_or_default();
        if user.to_lowercase().contains("weather") {
            Ok(LlmResponse::ToolCalls {
                calls: vec![ToolCall {
                    id: "call_1".into(),
                    name: "get_weather".into(),
                    arguments: json!({"city": "Paris"}),
                }],
                usage: None,
            })
        } else {
            Ok(LlmResponse::Text {
                text: format!("[{}] {}", self.key, user),
                usage: None,
            })
        }
    }
}

#[derive(Default)]
struct KeyedFactory {
    created: Mutex<Vec<String>>,
}

impl ProviderFactory for KeyedFactory {
    fn create(&self, api_key: &str) -> Result<Arc<dyn LlmProvider>, LlmError> {
        self.created.lock().unwrap().push(api_key.to_string());
        if api_key == "sk-unbuildable" {
            return Err(LlmError::Other(anyhow::anyhow!("client build failed")));
        }
        Ok(Arc::new(KeyedProvider {
            key: api_key.to_string(),
        }))
    }
}

async fn spawn_with(
    config: Config,
    factory: Arc<dyn ProviderFactory>,
    env_key: Option<&str>,
) -> String {
    let state = AppState::new(config, factory, env_key.map(String::from));
    let app = build_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn spawn_server(env_key: Option<&str>) -> (String, Arc<KeyedFactory>) {
    let factory = Arc::new(KeyedFactory::default());
    let base = spawn_with(Config::default(), factory.clone(), env_key).await;
    (base, factory)
}

async fn post_chat(base: &str, body: Value) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(format!("{}/chat", base))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_health_reports_healthy() {
    let (base, _) = spawn_server(None).await;

    let body: Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["agent_initialized"], false);
    assert_eq!(body["environment_api_key"], false);
    assert_eq!(body["tools_available"].as_array().unwrap().len(), 4);
    assert!(body["version"]
        .as_str()
        .unwrap()
        .starts_with(env!("CARGO_PKG_VERSION")));
}

#[tokio::test]
async fn test_health_with_environment_key() {
    let (base, factory) = spawn_server(Some("sk-env")).await;

    let body: Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["agent_initialized"], true);
    assert_eq!(body["environment_api_key"], true);
    assert_eq!(*factory.created.lock().unwrap(), vec!["sk-env"]);
}

#[tokio::test]
async fn test_health_reports_key_even_when_agent_failed() {
    let (base, _) = spawn_server(Some("sk-unbuildable")).await;

    let body: Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["agent_initialized"], false);
    assert_eq!(body["environment_api_key"], true);

    let (status, body) = post_chat(&base, json!({"message": "hello"})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error_kind"], "missing_api_key");
}

#[tokio::test]
async fn test_tools_listing() {
    let (base, _) = spawn_server(None).await;

    let body: Value = reqwest::get(format!("{}/tools", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let names: Vec<&str> = body["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["get_weather", "wiki_search", "fun_fact", "random_color"]
    );
    assert!(body["tools"][0]["description"].is_string());
}

#[tokio::test]
async fn test_index_serves_embedded_page() {
    let (base, _) = spawn_server(None).await;

    let response = reqwest::get(format!("{}/", base)).await.unwrap();
    assert!(response.status().is_success());
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));

    let html = response.text().await.unwrap();
    assert!(html.contains("id=\"messageInput\""));
    assert!(html.contains("/chat"));
}

#[tokio::test]
async fn test_index_prefers_static_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>custom page</html>").unwrap();

    let mut config = Config::default();
    config.server.static_dir = Some(dir.path().to_path_buf());
    let base = spawn_with(config, Arc::new(KeyedFactory::default()), None).await;

    let html = reqwest::get(format!("{}/", base))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(html, "<html>custom page</html>");
}

#[tokio::test]
async fn test_missing_key_is_rejected() {
    let (base, factory) = spawn_server(None).await;

    let (status, body) = post_chat(&base, json!({"message": "hello"})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error_kind"], "missing_api_key");
    assert_eq!(
        body["detail"],
        "OpenAI API key is required. Either provide it in the request or set OPENAI_API_KEY environment variable."
    );
    assert!(factory.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_key_counts_as_missing() {
    let (base, _) = spawn_server(None).await;

    let (status, body) = post_chat(&base, json!({"message": "hello", "openai_api_key": "  "})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error_kind"], "missing_api_key");
}

#[tokio::test]
async fn test_empty_message_is_invalid() {
    let (base, factory) = spawn_server(Some("sk-env")).await;

    let (status, body) = post_chat(&base, json!({"message": "   "})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error_kind"], "invalid_request");
    assert_eq!(factory.created.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_body_is_invalid() {
    let (base, _) = spawn_server(Some("sk-env")).await;

    let response = reqwest::Client::new()
        .post(format!("{}/chat", base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error_kind"], "invalid_request");
}

#[tokio::test]
async fn test_chat_with_environment_key() {
    let (base, _) = spawn_server(Some("sk-env")).await;

    let (status, body) = post_chat(&base, json!({"message": "hello"})).await;
    assert_eq!(status, 200);
    assert_eq!(body["response"], "[sk-env] hello");
    assert_eq!(body["tool_calls"], json!([]));
}

#[tokio::test]
async fn test_chat_reports_tool_calls() {
    let (base, _) = spawn_server(Some("sk-env")).await;

    let (status, body) = post_chat(&base, json!({"message": "What's the weather in Paris?"})).await;
    assert_eq!(status, 200);
    assert_eq!(body["response"], "Done: The weather in Paris is sunny.");
    assert_eq!(body["tool_calls"], json!(["get_weather"]));
}

#[tokio::test]
async fn test_request_key_overrides_environment_key() {
    let (base, factory) = spawn_server(Some("sk-env")).await;

    let (status, body) =
        post_chat(&base, json!({"message": "hello", "openai_api_key": "sk-user"})).await;
    assert_eq!(status, 200);
    assert_eq!(body["response"], "[sk-user] hello");

    let (_, body) = post_chat(&base, json!({"message": "hello", "api_key": "sk-alias"})).await;
    assert_eq!(body["response"], "[sk-alias] hello");

    let (_, body) = post_chat(&base, json!({"message": "hello"})).await;
    assert_eq!(body["response"], "[sk-env] hello");

    assert_eq!(
        *factory.created.lock().unwrap(),
        vec!["sk-env", "sk-user", "sk-alias"]
    );
}

#[tokio::test]
async fn test_upstream_failures_map_to_error_kinds() {
    let (base, _) = spawn_server(None).await;

    let cases = [
        ("sk-bad", 401, "invalid_api_key"),
        ("sk-limit", 429, "rate_limited"),
        ("sk-down", 502, "upstream_error"),
        ("sk-nomodel", 502, "upstream_error"),
        ("sk-broken", 500, "internal_error"),
    ];

    for (key, expected_status, expected_kind) in cases {
        let (status, body) =
            post_chat(&base, json!({"message": "hello", "openai_api_key": key})).await;
        assert_eq!(status, expected_status, "key {}", key);
        assert_eq!(body["error_kind"], expected_kind, "key {}", key);
        assert!(body["detail"].is_string());
    }

    let (_, body) = post_chat(&base, json!({"message": "hello", "openai_api_key": "sk-bad"})).await;
    assert_eq!(
        body["detail"],
        "Invalid OpenAI API key: Incorrect API key provided"
    );

    let (_, body) =
        post_chat(&base, json!({"message": "hello", "openai_api_key": "sk-broken"})).await;
    assert_eq!(body["detail"], "Error processing request: boom");

    let (_, body) =
        post_chat(&base, json!({"message": "hello", "openai_api_key": "sk-nomodel"})).await;
    assert_eq!(
        body["detail"],
        "Upstream error: HTTP 404: The model `gpt-x` does not exist"
    );
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let (base, _) = spawn_server(None).await;

    let response = reqwest::Client::new()
        .get(format!("{}/health", base))
        .header("origin", "http://example.test")
        .send()
        .await
        .unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}

#[tokio::test]
async fn test_end_to_end_against_openai_mock() {
    let openai = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(bearer_token("sk-real"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {"name": "fun_fact", "arguments": "{\"topic\": \"octopuses\"}"}
                    }]
                }
            }]
        })))
        .up_to_n_times(1)
        .mount(&openai)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(bearer_token("sk-real"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Octopuses have three hearts."}
            }],
            "usage": {"prompt_tokens": 20, "completion_tokens": 6, "total_tokens": 26}
        })))
        .mount(&openai)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided: sk-nope", "code": "invalid_api_key"}
        })))
        .mount(&openai)
        .await;

    let mut config = Config::default();
    config.llm.base_url = format!("{}/v1", openai.uri());
    let factory = Arc::new(toolchat::llm::OpenAiProviderFactory::new(config.llm.clone()));
    let base = spawn_with(config, factory, None).await;

    let (status, body) = post_chat(
        &base,
        json!({"message": "Tell me a fun fact about octopuses", "openai_api_key": "sk-real"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["response"], "Octopuses have three hearts.");
    assert_eq!(body["tool_calls"], json!(["fun_fact"]));

    let (status, body) =
        post_chat(&base, json!({"message": "hi", "openai_api_key": "sk-nope"})).await;
    assert_eq!(status, 401);
    assert_eq!(body["error_kind"], "invalid_api_key");
    assert_eq!(
        body["detail"],
        "Invalid OpenAI API key: Incorrect API key provided: sk-nope"
    );
}
