use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use async_trait::async_trait;
use iris::config::Settings;
use iris::domain::{ActionSpec, AgentDescriptor, InvokeRequest, Message};
use iris::gateway::ContainerGateway;
use iris::runtime::ContainerizedAgent;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

/// Advertises "Add" (sums its `x` and `y` parameters) and "Stall" (never
/// replies in time). Subscribes to the "events" channel.
struct CalculatorAgent {
    id: String,
}

#[async_trait]
impl ContainerizedAgent for CalculatorAgent {
    fn description(&self) -> AgentDescriptor {
        AgentDescriptor {
            agent_id: self.id.clone(),
            agent_type: "CalculatorAgent".to_string(),
            description: Some("adds numbers".to_string()),
            actions: vec![
                ActionSpec {
                    name: "Add".to_string(),
                    parameters: HashMap::from([
                        ("x".to_string(), "Int".to_string()),
                        ("y".to_string(), "Int".to_string()),
                    ]),
                    result_type: "Int".to_string(),
                },
                ActionSpec {
                    name: "Stall".to_string(),
                    parameters: HashMap::new(),
                    result_type: "Json".to_string(),
                },
            ],
            streams: vec![],
        }
    }

    fn subscriptions(&self) -> Vec<String> {
        vec!["events".to_string()]
    }

    async fn on_message(&mut self, _message: Message) {}

    async fn on_invoke(&mut self, request: InvokeRequest) -> Result<Value, String> {
        match request.action.as_str() {
            "Add" => {
                let x = request
                    .parameters
                    .get("x")
                    .and_then(Value::as_i64)
                    .ok_or("missing parameter: x")?;
                let y = request
                    .parameters
                    .get("y")
                    .and_then(Value::as_i64)
                    .ok_or("missing parameter: y")?;
                Ok(json!(x + y))
            }
            "Stall" => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(Value::Null)
            }
            other => Err(format!("unknown action: {other}")),
        }
    }
}

async fn test_app(invoke_timeout_seconds: u64) -> (axum::Router, Arc<ContainerGateway>) {
    let mut settings = Settings::new().unwrap();
    settings.gateway.invoke_timeout_seconds = invoke_timeout_seconds;

    let gateway = Arc::new(ContainerGateway::new(&settings.gateway));
    gateway
        .spawn_agent(CalculatorAgent {
            id: "calc-1".to_string(),
        })
        .await;

    (iris::create_app(gateway.clone(), &settings), gateway)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_invoke_add_end_to_end() {
    let (app, _gateway) = test_app(5).await;

    // discovery mode
    let response = app
        .clone()
        .oneshot(post("/invoke/Add", json!({"x": 3, "y": 4})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!(7));

    // explicit target
    let response = app
        .oneshot(post("/invoke/Add/calc-1", json!({"x": 1, "y": 2})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!(3));
}

#[tokio::test]
async fn test_invoke_unknown_target_is_404() {
    let (app, _gateway) = test_app(5).await;
    let response = app
        .oneshot(post("/invoke/Add/no-such-agent", json!({"x": 1, "y": 2})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("no-such-agent"));
}

#[tokio::test]
async fn test_invoke_unknown_action_is_404() {
    let (app, _gateway) = test_app(5).await;
    let response = app
        .oneshot(post("/invoke/Multiply", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invoke_agent_failure_is_500_with_detail() {
    let (app, _gateway) = test_app(5).await;
    // Add with missing parameters runs on the agent and fails there
    let response = app
        .oneshot(post("/invoke/Add/calc-1", json!({"x": 1})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("missing parameter: y"));
}

#[tokio::test]
async fn test_invoke_timeout_is_504() {
    let (app, _gateway) = test_app(1).await;
    let started = std::time::Instant::now();
    let response = app
        .oneshot(post("/invoke/Stall/calc-1", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_agents_listing_and_lookup() {
    let (app, _gateway) = test_app(5).await;

    let response = app.clone().oneshot(get("/agents")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["agentId"], "calc-1");

    let response = app.clone().oneshot(get("/agents/calc-1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["agentType"], "CalculatorAgent");

    let response = app.oneshot(get("/agents/ghost")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_initialize_is_idempotent_over_http() {
    let (app, gateway) = test_app(5).await;

    let body = json!({"containerId": "c-1", "platformUrl": "http://parent:8000"});
    let response = app.clone().oneshot(post("/initialize", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!(true));

    let body = json!({"containerId": "c-2", "platformUrl": "http://other:8000"});
    let response = app.clone().oneshot(post("/initialize", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!(false));

    // info reflects the first initialize
    let response = app.oneshot(get("/info")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["containerId"], "c-1");
    assert!(body["startedAt"].is_string());
    assert_eq!(body["agents"][0]["agentId"], "calc-1");

    assert_eq!(gateway.parent_url().await.unwrap(), "http://parent:8000");
}

#[tokio::test]
async fn test_info_before_initialize_omits_identity() {
    let (app, _gateway) = test_app(5).await;
    let response = app.oneshot(get("/info")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body.get("containerId").is_none());
    assert!(body.get("startedAt").is_none());
    assert_eq!(body["agents"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_send_and_broadcast() {
    let (app, _gateway) = test_app(5).await;

    let message = json!({"payload": {"note": "hello"}, "senderId": "external"});
    let response = app
        .clone()
        .oneshot(post("/send/calc-1", message.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post("/send/ghost", message.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // subscribed channel and empty channel both succeed
    let response = app
        .clone()
        .oneshot(post("/broadcast/events", message.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(post("/broadcast/silence", message)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let (app, _gateway) = test_app(5).await;
    let request = Request::builder()
        .uri("/send/calc-1")
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route_and_wrong_method() {
    let (app, _gateway) = test_app(5).await;

    let response = app.clone().oneshot(get("/nowhere")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(post("/agents", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_shutdown_acknowledges_and_retires_agents() {
    let (app, gateway) = test_app(5).await;

    let response = app
        .clone()
        .oneshot(post("/shutdown", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!(true));

    // mailboxes are closed; direct sends now fail
    let message = json!({"payload": null, "senderId": "external"});
    let response = app.oneshot(post("/send/calc-1", message)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let (container_id, _) = gateway.lifecycle().identity().await;
    assert!(container_id.is_none());
}

#[tokio::test]
async fn test_concurrent_invokes_to_different_agents() {
    let mut settings = Settings::new().unwrap();
    settings.gateway.invoke_timeout_seconds = 5;
    let gateway = Arc::new(ContainerGateway::new(&settings.gateway));

    struct SlowAgent {
        id: String,
    }

    #[async_trait]
    impl ContainerizedAgent for SlowAgent {
        fn description(&self) -> AgentDescriptor {
            AgentDescriptor {
                agent_id: self.id.clone(),
                agent_type: "SlowAgent".to_string(),
                description: None,
                actions: vec![ActionSpec {
                    name: "Sleep".to_string(),
                    parameters: HashMap::new(),
                    result_type: "Json".to_string(),
                }],
                streams: vec![],
            }
        }

        async fn on_message(&mut self, _message: Message) {}

        async fn on_invoke(&mut self, _request: InvokeRequest) -> Result<Value, String> {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Ok(json!("done"))
        }
    }

    for id in ["slow-a", "slow-b"] {
        gateway.spawn_agent(SlowAgent { id: id.to_string() }).await;
    }
    let app = iris::create_app(gateway, &settings);

    // one slow invoke must not stall the other
    let started = std::time::Instant::now();
    let (a, b) = tokio::join!(
        app.clone().oneshot(post("/invoke/Sleep/slow-a", json!({}))),
        app.clone().oneshot(post("/invoke/Sleep/slow-b", json!({}))),
    );
    assert_eq!(a.unwrap().status(), StatusCode::OK);
    assert_eq!(b.unwrap().status(), StatusCode::OK);
    assert!(started.elapsed() < Duration::from_millis(550));
}
