//! Immutable request builder for the scoring endpoint.
//!
//! # Design
//! `Unfraud` pairs a shared `WebServiceClient` with the payload built so
//! far. Every `with_*` method borrows `self` and returns a new builder with
//! its own copy of the payload, so a builder handed out earlier never
//! changes. Cloning a builder copies the payload and bumps the client `Arc`.
//!
//! ```no_run
//! use serde_json::json;
//! use unfraud_core::{ClientOptions, Unfraud};
//!
//! # fn main() -> Result<(), unfraud_core::UnfraudError> {
//! let score = Unfraud::new("API_KEY", ClientOptions::default())
//!     .with(json!({"user_email": "demo@unfraud.com", "user_name": "Name"}))?
//!     .with_billing(json!({"ip_address": "1.1.1.1"}))?
//!     .score()?;
//! println!("{:?}", score.risk_score());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::client::{json_kind, WebServiceClient, PLUGIN_VERSION};
use crate::error::UnfraudError;
use crate::model::Score;
use crate::options::ClientOptions;
use crate::tracking;
use crate::transport::Transport;

const EVENTS_PATH: &str = "/events";
const BILLING_KEY: &str = "billing_address";
const SHIPPING_KEY: &str = "shipping_address";
const ITEMS_KEY: &str = "items";

/// Entry point: accumulates a transaction and submits it for scoring.
#[derive(Debug, Clone)]
pub struct Unfraud {
    client: Arc<WebServiceClient>,
    content: Map<String, Value>,
}

impl Unfraud {
    /// Client using the default `ureq` transport.
    #[cfg(feature = "ureq")]
    pub fn new(api_key: impl Into<String>, options: ClientOptions) -> Self {
        let transport = Arc::new(crate::transport::UreqTransport::new(&options));
        Self::with_transport(api_key, options, transport)
    }

    pub fn with_transport(
        api_key: impl Into<String>,
        options: ClientOptions,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self::from_client(Arc::new(WebServiceClient::new(
            api_key,
            PLUGIN_VERSION,
            options,
            transport,
        )))
    }

    pub fn from_client(client: Arc<WebServiceClient>) -> Self {
        Self {
            client,
            content: Map::new(),
        }
    }

    pub fn client(&self) -> &Arc<WebServiceClient> {
        &self.client
    }

    /// Payload accumulated so far, without the injected credentials.
    pub fn payload(&self) -> &Map<String, Value> {
        &self.content
    }

    /// Replaces the whole payload with `values`.
    ///
    /// # Errors
    /// `InvalidInput` if `values` does not serialize to a JSON object.
    pub fn with<T: Serialize>(&self, values: T) -> Result<Self, UnfraudError> {
        Ok(self.derive(object("payload", values)?))
    }

    /// Sets `billing_address`, replacing any previous value.
    pub fn with_billing<T: Serialize>(&self, values: T) -> Result<Self, UnfraudError> {
        self.add(BILLING_KEY, values)
    }

    /// Sets `shipping_address`, replacing any previous value.
    pub fn with_shipping<T: Serialize>(&self, values: T) -> Result<Self, UnfraudError> {
        self.add(SHIPPING_KEY, values)
    }

    /// Appends one entry to the `items` cart.
    ///
    /// # Errors
    /// `InvalidInput` if `values` is not an object, or if `items` was already
    /// set to something other than an array through [`Unfraud::with`].
    pub fn with_shopping_cart_item<T: Serialize>(&self, values: T) -> Result<Self, UnfraudError> {
        let item = object(ITEMS_KEY, values)?;
        let mut content = self.content.clone();
        match content
            .entry(ITEMS_KEY)
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(items) => items.push(Value::Object(item)),
            other => {
                return Err(UnfraudError::InvalidInput(format!(
                    "Cannot add a cart item: `items` is {} rather than an array",
                    json_kind(other)
                )))
            }
        }
        Ok(self.derive(content))
    }

    /// Submits the payload to `/events`.
    ///
    /// Each call is a separate, billable request; nothing is retried.
    pub fn score(&self) -> Result<Score, UnfraudError> {
        let response = self.client.post("Score", EVENTS_PATH, &self.content)?;
        Ok(Score::from_response(&response))
    }

    pub fn tracking_snippet(&self) -> Option<String> {
        tracking::tracking_snippet(self.client.api_key(), self.client.session_id())
    }

    pub fn dashboard_url(&self, email: &str, password: &str) -> Option<String> {
        tracking::dashboard_url(self.client.api_key(), email, password)
    }

    pub fn dashboard(&self, email: &str, password: &str) -> Option<String> {
        tracking::dashboard_iframe(self.client.api_key(), email, password)
    }

    fn add<T: Serialize>(&self, key: &str, values: T) -> Result<Self, UnfraudError> {
        let mut content = self.content.clone();
        content.insert(key.to_string(), Value::Object(object(key, values)?));
        Ok(self.derive(content))
    }

    fn derive(&self, content: Map<String, Value>) -> Self {
        Self {
            client: Arc::clone(&self.client),
            content,
        }
    }
}

/// Serializes `values`, requiring a JSON object.
fn object<T: Serialize>(what: &str, values: T) -> Result<Map<String, Value>, UnfraudError> {
    match serde_json::to_value(values) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(UnfraudError::InvalidInput(format!(
            "`{what}` must be a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(UnfraudError::InvalidInput(format!(
            "Error encoding input as JSON: {e}"
        ))),
    }
}
