//! Readiness and metrics endpoints

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use serde_json::{Value, json};

use crate::state::AppState;

/// Create the /ready and /metrics router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Readiness check - the broker must still accept jobs
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let registry = &state.registry;
    let checks: Vec<(&str, HealthCheckFuture)> = vec![(
        "broker",
        Box::pin(async move {
            if registry.is_closed() {
                Err("broker is closed".to_string())
            } else {
                Ok(())
            }
        }),
    )];

    let (status, Json(mut body)) = match run_health_checks(checks).await {
        Ok(response) | Err(response) => response,
    };

    if let Value::Object(ref mut map) = body {
        let topic = &state.config.broker.topic;
        map.insert(
            "topic".to_string(),
            json!({ "name": topic, "depth": state.registry.depth(topic) }),
        );
        map.insert("webhooks".to_string(), json!(state.webhooks.len()));
    }

    (status, Json(body))
}

async fn metrics() -> String {
    stream_worker::render_metrics()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, WorkerSettings};
    use axum::body::Body;
    use axum::http::Request;
    use core_config::{Environment, app_info, broker::BrokerConfig, server::ServerConfig};
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState::new(Config {
            app: app_info!(),
            server: ServerConfig::default(),
            broker: BrokerConfig::default(),
            worker: WorkerSettings {
                processing_delay: Duration::from_millis(10),
                webhook_timeout: Duration::from_secs(1),
            },
            environment: Environment::Development,
        })
    }

    async fn get_ready(state: AppState) -> (StatusCode, Value) {
        let response = router(state)
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_ready_reports_depth_and_webhooks() {
        let state = test_state();
        state.service.submit(None).unwrap();
        state.webhooks.register("http://localhost:8084/webhook").unwrap();

        let (status, body) = get_ready(state).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["broker"], "ok");
        assert_eq!(body["topic"]["name"], "inventory-jobs");
        assert_eq!(body["topic"]["depth"], 1);
        assert_eq!(body["webhooks"], 1);
    }

    #[tokio::test]
    async fn test_ready_fails_once_broker_closed() {
        let state = test_state();
        state.registry.close();

        let (status, body) = get_ready(state).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "not ready");
        assert_eq!(body["broker"], "failing");
    }

    #[tokio::test]
    async fn test_metrics_endpoint_responds() {
        let response = router(test_state())
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
