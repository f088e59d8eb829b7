//! Scoring calls against the live mock server and raw sockets.
//!
//! # Design
//! Starts the mock server on a random port and drives the public `Unfraud`
//! API over real HTTP with `UreqTransport`. The client always builds
//! `https://` URLs, so a thin wrapper rewrites them to plain `http://` for
//! the loopback server before delegating. Responses the mock server cannot
//! produce (bad UTF-8, redirects, silence) come from a bare `TcpListener`.

use std::collections::HashSet;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use mock_server::MockConfig;
use serde_json::json;
use unfraud_core::{
    ClientOptions, ErrorCode, HttpRequest, HttpResponse, Transport, TransportError, Unfraud,
    UnfraudError, UreqTransport,
};

struct Loopback(UreqTransport);

impl Transport for Loopback {
    fn execute(
        &self,
        request: &HttpRequest,
        options: &ClientOptions,
    ) -> Result<HttpResponse, TransportError> {
        let mut plain = request.clone();
        plain.url = plain.url.replacen("https://", "http://", 1);
        self.0.execute(&plain, options)
    }
}

fn start_server(config: MockConfig) -> SocketAddr {
    let std_listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, config).await
        })
        .unwrap();
    });

    addr
}

/// Reads one request, headers plus `Content-Length` body, off `stream`.
fn read_request(stream: &mut TcpStream) {
    let mut data = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        data.extend_from_slice(&buf[..n]);
        let Some(end) = data.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&data[..end]).to_ascii_lowercase();
        let len = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if data.len() >= end + 4 + len {
            return;
        }
    }
}

/// Answers a single request with `response` verbatim.
fn raw_server(response: Vec<u8>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        read_request(&mut stream);
        let _ = stream.write_all(&response);
    });
    addr
}

/// Accepts a single request and never answers it.
fn silent_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        read_request(&mut stream);
        thread::sleep(Duration::from_secs(10));
        drop(stream);
    });
    addr
}

fn unfraud_with(addr: SocketAddr, api_key: &str, options: ClientOptions) -> Unfraud {
    let options = options.host(addr.to_string());
    let transport = Loopback(UreqTransport::new(&options));
    Unfraud::with_transport(api_key, options, Arc::new(transport))
}

fn unfraud(addr: SocketAddr, api_key: &str) -> Unfraud {
    let options = ClientOptions::default().connect_timeout(2.0).read_timeout(5.0);
    unfraud_with(addr, api_key, options)
}

#[test]
fn scoring_lifecycle() {
    let addr = start_server(MockConfig::default());
    let base = unfraud(addr, "test-key");

    // Step 1: a clean event scores as safe.
    let clean = base.with(json!({"user_email": "jo@example.com"})).unwrap();
    let score = clean.score().unwrap();
    assert_eq!(score.success(), Some(true));
    assert_eq!(score.label(), Some("safe"));
    assert_eq!(score.risk_score(), Some(5.0));
    assert!(score.timestamp().is_some());

    // Step 2: derived builders add risk without touching `clean`.
    let risky = clean
        .with_billing(json!({"country": "DE"}))
        .unwrap()
        .with_shipping(json!({"country": "US"}))
        .unwrap()
        .with_shopping_cart_item(json!({"sku": "gift-card", "quantity": 20}))
        .unwrap();
    let score = risky.score().unwrap();
    assert_eq!(score.risk_score(), Some(45.0));
    assert_eq!(score.label(), Some("review"));
    assert_eq!(
        score.highlights(),
        Some(&json!(["billing and shipping countries differ", "bulk quantity"]))
    );
    assert_eq!(clean.payload().len(), 1);

    // Step 3: the original builder can still be scored on its own.
    assert_eq!(clean.score().unwrap().label(), Some("safe"));
}

#[test]
fn service_errors_are_classified() {
    let config = MockConfig {
        api_keys: HashSet::from(["test-key".to_string(), "frozen".to_string()]),
        suspended_keys: HashSet::from(["frozen".to_string()]),
    };
    let addr = start_server(config);

    let err = unfraud(addr, "wrong")
        .with(json!({"user_email": "a@b.com"}))
        .unwrap()
        .score()
        .unwrap_err();
    assert!(matches!(
        err,
        UnfraudError::InvalidRequest { code: ErrorCode::AuthorizationInvalid, status: 401, .. }
    ));

    let err = unfraud(addr, "test-key").score().unwrap_err();
    match err {
        UnfraudError::InvalidRequest { message, code, status, url } => {
            assert_eq!(message, "user_email is required");
            assert_eq!(code, ErrorCode::InvalidInput);
            assert_eq!(status, 400);
            assert_eq!(url, format!("https://{addr}/events"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = unfraud(addr, "frozen")
        .with(json!({"user_email": "a@b.com"}))
        .unwrap()
        .score()
        .unwrap_err();
    assert!(matches!(err, UnfraudError::WebService(ref m) if m.contains("account suspended")));
}

#[test]
fn health_endpoint_via_get() {
    let addr = start_server(MockConfig::default());
    let client = unfraud(addr, "test-key");
    let body = client.client().get("Health", "/health").unwrap();
    assert_eq!(body["status"], "ok");

    let err = client.client().get("Missing", "/nowhere").unwrap_err();
    assert!(matches!(err, UnfraudError::Http { status: 404, .. }));
}

#[test]
fn refused_connection_is_a_transport_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let err = unfraud(addr, "test-key").score().unwrap_err();
    assert!(err.is_transport(), "expected transport error, got {err:?}");
}

#[test]
fn invalid_utf8_body_is_a_decode_error_not_a_transport_error() {
    let mut response = b"HTTP/1.1 200 OK\r\n\
        Content-Type: application/json\r\n\
        Content-Length: 4\r\n\
        Connection: close\r\n\r\n"
        .to_vec();
    response.extend_from_slice(&[0xff, 0xfe, b'{', b'}']);
    let addr = raw_server(response);

    let err = unfraud(addr, "test-key")
        .with(json!({"user_email": "a@b.com"}))
        .unwrap()
        .score()
        .unwrap_err();
    assert!(!err.is_transport(), "got {err:?}");
    assert!(matches!(err, UnfraudError::WebService(ref m)
        if m.contains("could not decode the response as JSON")));
}

#[test]
fn read_timeout_surfaces_as_transport_error() {
    let addr = silent_server();
    let options = ClientOptions::default().connect_timeout(2.0).read_timeout(0.5);

    let started = Instant::now();
    let err = unfraud_with(addr, "test-key", options).score().unwrap_err();
    assert!(err.is_transport(), "expected transport error, got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(5), "took {:?}", started.elapsed());
}

#[test]
fn redirects_are_not_followed() {
    let addr = raw_server(
        b"HTTP/1.1 302 Found\r\n\
          Location: http://127.0.0.1:1/events\r\n\
          Content-Length: 0\r\n\
          Connection: close\r\n\r\n"
            .to_vec(),
    );

    let err = unfraud(addr, "test-key").score().unwrap_err();
    assert!(matches!(err, UnfraudError::Http { status: 302, ref message, .. }
        if message.contains("unexpected HTTP status (302)")));
}
