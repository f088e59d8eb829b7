//! Pluggable HTTP execution.
//!
//! # Design
//! `WebServiceClient` never performs I/O itself; it hands each
//! `HttpRequest` to a `Transport`. Implementations must return every HTTP
//! status as data (4xx/5xx included) and only fail with `TransportError`
//! when no response was received at all.

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::options::ClientOptions;

/// Executes one HTTP request and returns the raw response.
pub trait Transport: Send + Sync {
    fn execute(
        &self,
        request: &HttpRequest,
        options: &ClientOptions,
    ) -> Result<HttpResponse, TransportError>;
}

#[cfg(feature = "ureq")]
pub use self::ureq_transport::UreqTransport;

#[cfg(feature = "ureq")]
mod ureq_transport {
    use super::*;
    use crate::http::HttpMethod;

    /// Blocking transport backed by `ureq`.
    ///
    /// Redirects are not followed and HTTP error statuses are returned as
    /// responses so the client can classify them. The agent, and with it the
    /// connection pool and timeouts, is built once in `new`.
    #[derive(Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
    }

    impl UreqTransport {
        pub fn new(options: &ClientOptions) -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .max_redirects(0)
                .timeout_connect(options.connect_timeout_duration())
                .timeout_recv_response(options.read_timeout_duration())
                .timeout_recv_body(options.read_timeout_duration())
                .build()
                .new_agent();
            Self { agent }
        }
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new(&ClientOptions::default())
        }
    }

    impl Transport for UreqTransport {
        /// Timeouts come from the options given to `new`, not `_options`.
        fn execute(
            &self,
            request: &HttpRequest,
            _options: &ClientOptions,
        ) -> Result<HttpResponse, TransportError> {
            let agent = &self.agent;

            let result = match request.method {
                HttpMethod::Get => {
                    let mut builder = agent.get(&request.url);
                    for (name, value) in &request.headers {
                        builder = builder.header(name.as_str(), value.as_str());
                    }
                    builder.call()
                }
                HttpMethod::Post => {
                    let mut builder = agent.post(&request.url);
                    for (name, value) in &request.headers {
                        builder = builder.header(name.as_str(), value.as_str());
                    }
                    match &request.body {
                        Some(body) => builder.send(body.as_bytes()),
                        None => builder.send_empty(),
                    }
                }
            };

            let mut response = result.map_err(|e| TransportError::new(e.to_string()))?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response
                .body_mut()
                .read_to_vec()
                .map_err(|e| TransportError::new(e.to_string()))?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}
