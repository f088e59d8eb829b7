//! Client library for the Unfraud fraud-scoring web service.
//!
//! # Overview
//! A transaction is assembled through the immutable [`Unfraud`] builder and
//! submitted with [`Unfraud::score`]. The request is POSTed as JSON to
//! `https://{host}/events` through a pluggable [`Transport`], and the
//! response is classified into a [`Score`] or an [`UnfraudError`].
//!
//! # Design
//! - `WebServiceClient` holds the API key, session id, options and
//!   transport. It is immutable and shared by `Arc` across builders.
//! - Requests and responses are plain data (`HttpRequest`,
//!   `HttpResponse`); only the transport performs I/O, so classification is
//!   testable without a network.
//! - `UreqTransport` (feature `ureq`, on by default) is the blocking
//!   transport used by `Unfraud::new`.

pub mod builder;
pub mod client;
pub mod error;
pub mod http;
pub mod model;
pub mod options;
pub mod tracking;
pub mod transport;

pub use builder::Unfraud;
pub use client::{WebServiceClient, PLUGIN_VERSION};
pub use error::{ErrorCode, TransportError, UnfraudError, UnknownAttribute};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use model::Score;
pub use options::ClientOptions;
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
