//! Low-level web-service client: request building and response
//! classification for the Unfraud API.
//!
//! # Design
//! `WebServiceClient` owns the credentials, the connection options and the
//! transport. Each call is split into a `build_*` step that produces an
//! `HttpRequest` and `handle_response`, which turns an `HttpResponse` into
//! either the decoded JSON object or an `UnfraudError`. `post` and `get`
//! glue the two together around a single `Transport::execute`.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ErrorCode, UnfraudError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::options::ClientOptions;
use crate::transport::Transport;

/// Plugin tag sent as `unfraud_plugin` with every scoring request.
pub const PLUGIN_VERSION: &str = "unfraud-custom_v1.0.0";

/// Shared, immutable client. Cheap to share behind an `Arc`.
pub struct WebServiceClient {
    api_key: String,
    session_id: String,
    version: String,
    options: ClientOptions,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for WebServiceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebServiceClient")
            .field("session_id", &self.session_id)
            .field("version", &self.version)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl WebServiceClient {
    /// Creates a client with a freshly generated session id.
    pub fn new(
        api_key: impl Into<String>,
        version: impl Into<String>,
        options: ClientOptions,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            session_id: Uuid::new_v4().simple().to_string(),
            version: version.into(),
            options,
            transport,
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Always HTTPS against the configured host.
    pub fn url_for(&self, path: &str) -> String {
        format!("https://{}{}", self.options.host, path)
    }

    /// Serializes `payload`, adds `api_id` and `unfraud_plugin`, and builds
    /// the POST request. The caller's payload is not modified.
    ///
    /// A `null` payload is sent as an object holding only the credentials.
    pub fn build_post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<HttpRequest, UnfraudError> {
        let mut input = match serde_json::to_value(payload).map_err(encode_error)? {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(UnfraudError::InvalidInput(format!(
                    "Error encoding input as JSON: expected an object, found {}",
                    json_kind(&other)
                )))
            }
        };
        input.insert("api_id".to_string(), Value::String(self.api_key.clone()));
        input.insert(
            "unfraud_plugin".to_string(),
            Value::String(self.version.clone()),
        );
        let body = serde_json::to_string(&input).map_err(encode_error)?;

        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.url_for(path),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                accept_json(),
            ],
            body: Some(body),
        })
    }

    pub fn build_get(&self, path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url_for(path),
            headers: vec![accept_json()],
            body: None,
        }
    }

    /// POSTs `payload` to `path` and returns the decoded response object.
    pub fn post<T: Serialize + ?Sized>(
        &self,
        service: &str,
        path: &str,
        payload: &T,
    ) -> Result<Map<String, Value>, UnfraudError> {
        let request = self.build_post(path, payload)?;
        let response = self.execute(service, &request)?;
        self.handle_response(service, path, response)
    }

    /// GETs `path` and returns the decoded response object.
    pub fn get(
        &self,
        service: &str,
        path: &str,
    ) -> Result<Map<String, Value>, UnfraudError> {
        let request = self.build_get(path);
        let response = self.execute(service, &request)?;
        self.handle_response(service, path, response)
    }

    fn execute(
        &self,
        service: &str,
        request: &HttpRequest,
    ) -> Result<HttpResponse, UnfraudError> {
        debug!(
            service,
            method = request.method.as_str(),
            url = %request.url,
            "sending request"
        );
        if self.options.debug {
            debug!(
                service,
                body = request.body.as_deref().unwrap_or(""),
                "request body"
            );
        }

        let response = self
            .transport
            .execute(request, &self.options)
            .map_err(|e| {
                warn!(service, url = %request.url, error = %e, "transport failure");
                UnfraudError::Http {
                    message: format!("Transport error for {service}: {e}"),
                    status: 0,
                    url: request.url.clone(),
                }
            })?;

        debug!(service, status = response.status, "received response");
        if self.options.debug {
            debug!(service, body = %response.body_text(), "response body");
        }
        Ok(response)
    }

    /// Classifies a response into the decoded body or an error.
    pub fn handle_response(
        &self,
        service: &str,
        path: &str,
        response: HttpResponse,
    ) -> Result<Map<String, Value>, UnfraudError> {
        match response.status {
            400..=499 => Err(self.client_error(service, path, &response)),
            500.. => Err(UnfraudError::Http {
                message: format!(
                    "Received a server error ({}) for {service}",
                    response.status
                ),
                status: response.status,
                url: self.url_for(path),
            }),
            200 => handle_success(service, &response),
            status => Err(UnfraudError::Http {
                message: format!("Received an unexpected HTTP status ({status}) for {service}"),
                status,
                url: self.url_for(path),
            }),
        }
    }

    fn client_error(&self, service: &str, path: &str, response: &HttpResponse) -> UnfraudError {
        let status = response.status;
        let body = response.body_text();
        let http_error = |message: String| UnfraudError::Http {
            message,
            status,
            url: self.url_for(path),
        };

        if response.body.is_empty() {
            return http_error(format!(
                "Received a {status} error for {service} with no body"
            ));
        }
        if !response.content_type().is_some_and(|ct| ct.contains("json")) {
            return http_error(format!(
                "Received a {status} error for {service} with the following body: {body}"
            ));
        }

        let message: Value = match serde_json::from_slice(&response.body) {
            Ok(value) => value,
            Err(e) => {
                return http_error(format!(
                    "Received a {status} error for {service} but could not decode \
                     the response as JSON: {e} Body: {body}"
                ))
            }
        };

        match (present(&message, "code"), present(&message, "error")) {
            (Some(code), Some(error)) => self.web_service_error(
                text(error),
                ErrorCode::from(text(code).as_str()),
                status,
                path,
            ),
            _ => http_error(format!(
                "Error response contains JSON but it does not specify code or \
                 error keys: {body}"
            )),
        }
    }

    /// Maps a service error code onto an error variant.
    fn web_service_error(
        &self,
        message: String,
        code: ErrorCode,
        status: u16,
        path: &str,
    ) -> UnfraudError {
        match code {
            ErrorCode::InvalidInput | ErrorCode::AuthorizationInvalid | ErrorCode::Other(_) => {
                UnfraudError::InvalidRequest {
                    message,
                    code,
                    status,
                    url: self.url_for(path),
                }
            }
        }
    }
}

fn handle_success(
    service: &str,
    response: &HttpResponse,
) -> Result<Map<String, Value>, UnfraudError> {
    if response.body.is_empty() {
        return Err(UnfraudError::WebService(format!(
            "Received a 200 response for {service} but did not receive a HTTP body."
        )));
    }

    let decoded = match serde_json::from_slice::<Value>(&response.body) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            return Err(UnfraudError::WebService(format!(
                "Received a 200 response for {service} but the JSON body is {} \
                 rather than an object. Body: {}",
                json_kind(&other),
                response.body_text()
            )))
        }
        Err(e) => {
            return Err(UnfraudError::WebService(format!(
                "Received a 200 response for {service} but could not decode the \
                 response as JSON: {e} Body: {}",
                response.body_text()
            )))
        }
    };

    if let Some(error) = decoded.get("error_message").filter(|v| !v.is_null()) {
        return Err(UnfraudError::WebService(format!(
            "Received a 200 response for {service} but it carried the error: {}",
            text(error)
        )));
    }

    Ok(decoded)
}

fn accept_json() -> (String, String) {
    ("Accept".to_string(), "application/json".to_string())
}

fn encode_error(e: serde_json::Error) -> UnfraudError {
    UnfraudError::InvalidInput(format!("Error encoding input as JSON: {e}"))
}

/// Non-null value under `key`, if `value` is an object holding one.
fn present<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| !v.is_null())
}

/// Strings verbatim, anything else as compact JSON.
fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
