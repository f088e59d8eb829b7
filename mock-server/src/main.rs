use std::collections::HashSet;

use mock_server::MockConfig;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn key_set(var: &str) -> Option<HashSet<String>> {
    let raw = std::env::var(var).ok()?;
    Some(
        raw.split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mock_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = MockConfig::default();
    if let Some(keys) = key_set("UNFRAUD_API_KEYS") {
        config.api_keys = keys;
    }
    if let Some(keys) = key_set("UNFRAUD_SUSPENDED_KEYS") {
        config.suspended_keys = keys;
    }

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, keys = config.api_keys.len(), "listening");
    mock_server::run(listener, config).await
}
