//! In-process stand-in for the Unfraud scoring service.
//!
//! Scores `/events` payloads with a handful of fixed rules so integration
//! tests can exercise every response shape the client classifies.

use std::{
    collections::HashSet,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tracing::{info, warn};

pub const DISPOSABLE_DOMAINS: [&str; 2] = ["mailinator.com", "guerrillamail.com"];

/// Which API keys the server accepts.
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub api_keys: HashSet<String>,
    /// Accepted keys whose requests are answered with a 200 `error_message`.
    pub suspended_keys: HashSet<String>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            api_keys: HashSet::from(["test-key".to_string()]),
            suspended_keys: HashSet::new(),
        }
    }
}

pub type Shared = Arc<MockConfig>;

/// Result of the rule set for one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub score: f64,
    pub label: &'static str,
    pub highlights: Vec<String>,
}

pub fn app(config: MockConfig) -> Router {
    Router::new()
        .route("/events", post(score_event))
        .route("/health", get(health))
        .with_state(Arc::new(config))
}

pub async fn run(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app(config)).await
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn score_event(
    State(config): State<Shared>,
    Json(input): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let Value::Object(event) = input else {
        return reject(
            StatusCode::BAD_REQUEST,
            "INVALID_INPUT",
            "request body must be a JSON object",
        );
    };

    let api_id = event.get("api_id").and_then(Value::as_str).unwrap_or_default();
    if !config.api_keys.contains(api_id) {
        warn!(api_id, "rejecting unknown api key");
        return reject(StatusCode::UNAUTHORIZED, "AUTHORIZATION_INVALID", "unknown api_id");
    }
    if config.suspended_keys.contains(api_id) {
        return (
            StatusCode::OK,
            Json(json!({"success": false, "error_message": "account suspended"})),
        );
    }
    if event.get("unfraud_plugin").and_then(Value::as_str).is_none() {
        return reject(StatusCode::BAD_REQUEST, "INVALID_INPUT", "unfraud_plugin is required");
    }
    if event.get("user_email").and_then(Value::as_str).is_none() {
        return reject(StatusCode::BAD_REQUEST, "INVALID_INPUT", "user_email is required");
    }

    let assessment = assess(&event);
    info!(api_id, score = assessment.score, label = assessment.label, "scored event");

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "timestamp": timestamp,
            "unfraud_score": assessment.score,
            "unfraud_label": assessment.label,
            "unfraud_highlights": assessment.highlights,
        })),
    )
}

fn reject(status: StatusCode, code: &str, error: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({"code": code, "error": error})))
}

/// Applies the scoring rules to one event.
pub fn assess(event: &Map<String, Value>) -> Assessment {
    let mut score = 5.0;
    let mut highlights = Vec::new();

    let country = |key: &str| {
        event
            .get(key)
            .and_then(|address| address.get("country"))
            .and_then(Value::as_str)
    };
    let billing = country("billing_address");
    let shipping = country("shipping_address");
    if let (Some(billing), Some(shipping)) = (billing, shipping) {
        if !billing.eq_ignore_ascii_case(shipping) {
            score += 25.0;
            highlights.push("billing and shipping countries differ".to_string());
        }
    }

    let items = event.get("items").and_then(Value::as_array);
    if items.is_some_and(|items| items.len() > 5) {
        score += 20.0;
        highlights.push("large basket".to_string());
    }
    let bulk = items.into_iter().flatten().any(|item| {
        item.get("quantity").and_then(Value::as_u64).is_some_and(|q| q > 10)
    });
    if bulk {
        score += 15.0;
        highlights.push("bulk quantity".to_string());
    }

    let domain = event
        .get("user_email")
        .and_then(Value::as_str)
        .and_then(|email| email.rsplit_once('@'))
        .map(|(_, domain)| domain.to_ascii_lowercase());
    if domain.is_some_and(|d| DISPOSABLE_DOMAINS.contains(&d.as_str())) {
        score += 40.0;
        highlights.push("disposable email domain".to_string());
    }

    let score = f64::min(score, 99.0);
    let label = if score < 30.0 {
        "safe"
    } else if score < 70.0 {
        "review"
    } else {
        "fraud"
    };
    Assessment {
        score,
        label,
        highlights,
    }
}
