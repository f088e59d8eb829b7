//! Connection options shared by every request a client makes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "api.unfraud.com";

/// Host, timeouts and debug flag for a `WebServiceClient`.
///
/// Timeouts are in seconds and are handed to the transport unchanged. `None`
/// leaves the transport's own default (no limit for `UreqTransport`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    pub host: String,
    pub connect_timeout: Option<f64>,
    pub read_timeout: Option<f64>,
    pub debug: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            connect_timeout: None,
            read_timeout: None,
            debug: false,
        }
    }
}

impl ClientOptions {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn connect_timeout(mut self, secs: f64) -> Self {
        self.connect_timeout = Some(secs);
        self
    }

    pub fn read_timeout(mut self, secs: f64) -> Self {
        self.read_timeout = Some(secs);
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn connect_timeout_duration(&self) -> Option<Duration> {
        self.connect_timeout.and_then(to_duration)
    }

    pub fn read_timeout_duration(&self) -> Option<Duration> {
        self.read_timeout.and_then(to_duration)
    }
}

/// Negative, NaN and overflowing values are treated as unset.
fn to_duration(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs).ok()
}
