use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use finextract::entities::anthropic::{AnthropicConfig, AnthropicExtractor, ANTHROPIC_VERSION};
use finextract::entities::{EntityExtraction, EntityExtractor, FinancialEntities, TOOL_NAME};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    reply: Value,
    seen: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
}

async fn messages(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    stub.seen.lock().unwrap().push((headers, body));
    (stub.status, Json(stub.reply.clone()))
}

/// Serves `reply` from a local stand-in for the Messages API and returns an
/// extractor pointed at it.
async fn extractor_for(status: StatusCode, reply: Value) -> (AnthropicExtractor, Stub) {
    let stub = Stub {
        status,
        reply,
        seen: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/v1/messages", post(messages))
        .with_state(stub.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let extractor = AnthropicExtractor::new(AnthropicConfig {
        api_key: "sk-test".to_string(),
        model: "claude-test".to_string(),
        base_url: format!("http://{}", addr),
        max_tokens: 4096,
    })
    .unwrap();
    (extractor, stub)
}

#[tokio::test]
async fn test_structured_result() {
    let (extractor, stub) = extractor_for(
        StatusCode::OK,
        json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "stop_reason": "tool_use",
            "content": [
                { "type": "text", "text": "Extracting." },
                {
                    "type": "tool_use",
                    "id": "toolu_1",
                    "name": TOOL_NAME,
                    "input": {
                        "company_name": "Acme Corp",
                        "assets": { "total_assets": 5000000 },
                        "liabilities_and_equity": {},
                        "income_statement": { "net_income": 250000.5 }
                    }
                }
            ]
        }),
    )
    .await;

    let outcome = extractor.extract("Acme Corp balance sheet").await;
    let entities = match outcome {
        EntityExtraction::Structured(entities) => entities,
        other => panic!("expected structured result, got {:?}", other),
    };
    assert_eq!(entities.company_name, "Acme Corp");
    assert_eq!(entities.assets.total_assets, 5_000_000.0);
    assert_eq!(entities.income_statement.net_income, 250_000.5);
    assert_eq!(entities.liabilities_and_equity.total_liabilities_and_equity, 0.0);

    let seen = stub.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (headers, body) = &seen[0];
    assert_eq!(headers["x-api-key"], "sk-test");
    assert_eq!(headers["anthropic-version"], ANTHROPIC_VERSION);
    assert_eq!(body["model"], "claude-test");
    assert_eq!(body["max_tokens"], 4096);
    assert_eq!(body["tools"][0]["name"], TOOL_NAME);
    assert_eq!(
        body["tools"][0]["input_schema"]["required"],
        json!(["company_name", "assets", "liabilities_and_equity", "income_statement"])
    );
    let prompt = body["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("<document>\nAcme Corp balance sheet\n</document>"));
}

#[tokio::test]
async fn test_empty_text_still_sends_request() {
    let (extractor, stub) = extractor_for(
        StatusCode::OK,
        json!({ "content": [{ "type": "text", "text": "There is no document." }] }),
    )
    .await;

    let outcome = extractor.extract("").await;
    assert_eq!(outcome, EntityExtraction::NoMatch);

    let seen = stub.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (_, body) = &seen[0];
    assert_eq!(body["messages"][0]["role"], "user");
    assert!(body["messages"][0]["content"]
        .as_str()
        .unwrap()
        .starts_with("<document>\n\n</document>"));
}

#[tokio::test]
async fn test_no_match_caller_gets_zero_default_shape() {
    let (extractor, _stub) = extractor_for(
        StatusCode::OK,
        json!({ "content": [{ "type": "tool_use", "id": "t", "name": "other_tool", "input": {} }] }),
    )
    .await;

    assert_eq!(extractor.extract("text").await, EntityExtraction::NoMatch);
    let zero = FinancialEntities::default();
    assert_eq!(zero.company_name, "Unknown");
    assert_eq!(zero.assets.total_assets, 0.0);
}

#[tokio::test]
async fn test_api_error_is_call_failure() {
    let (extractor, _stub) = extractor_for(
        StatusCode::UNAUTHORIZED,
        json!({
            "type": "error",
            "error": { "type": "authentication_error", "message": "invalid x-api-key" }
        }),
    )
    .await;

    match extractor.extract("text").await {
        EntityExtraction::CallFailed(reason) => {
            assert!(reason.contains("401"), "reason: {}", reason);
            assert!(reason.contains("invalid x-api-key"), "reason: {}", reason);
        }
        other => panic!("expected call failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_endpoint_is_call_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let extractor = AnthropicExtractor::new(AnthropicConfig {
        api_key: "sk-test".to_string(),
        model: "claude-test".to_string(),
        base_url: format!("http://{}", addr),
        max_tokens: 16,
    })
    .unwrap();

    assert!(matches!(
        extractor.extract("text").await,
        EntityExtraction::CallFailed(_)
    ));
}
