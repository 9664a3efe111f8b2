//! Pluggable network layer.
//!
//! [`Transport`] performs exactly one HTTP exchange per call and reports
//! failures as either a connect failure (nothing reached the server) or any
//! other transport failure. Retrying is the pipeline's job, never the
//! transport's.

use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::{ClientOptions, Method, Request, Response};

/// Classification of a failed exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The connection could not be established (DNS resolution, TCP connect).
    ConnectFailure,
    /// Anything after the connection was up: timeouts, TLS, broken streams.
    OtherTransportFailure,
    /// No transport failure occurred.
    None,
}

/// Failure reported by a [`Transport`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportError {
    pub fn connect(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::ConnectFailure,
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::OtherTransportFailure,
            message: message.into(),
        }
    }
}

/// Sends one request and returns the fully buffered response.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs a single exchange. Non-2xx statuses are not failures here.
    async fn send(&self, request: &Request) -> Result<Response, TransportError>;

    /// Short `name/version` descriptor appended to the User-Agent.
    fn version_descriptor(&self) -> Option<String>;
}

/// Default transport backed by `reqwest`.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a transport with the timeouts from `options`.
    pub fn new(options: &ClientOptions) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(options.timeout_ms))
            .connect_timeout(Duration::from_millis(options.connect_timeout_ms))
            .build()
            .map_err(|err| TransportError::other(err.to_string()))?;
        Ok(Self { http })
    }

    /// Wraps an already configured `reqwest::Client`.
    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    fn to_reqwest_method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }

    fn header_map(request: &Request) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::with_capacity(request.headers().len());
        for (name, value) in request.headers() {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| TransportError::other(format!("invalid header name '{name}': {err}")))?;
            let value = HeaderValue::from_str(value).map_err(|err| {
                TransportError::other(format!("invalid value for header '{name}': {err}"))
            })?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &Request) -> Result<Response, TransportError> {
        let mut builder = self
            .http
            .request(Self::to_reqwest_method(request.method()), request.url())
            .headers(Self::header_map(request)?);
        if let Some(body) = request.body() {
            builder = builder.body(body.to_vec());
        }

        let response = builder.send().await.map_err(classify_reqwest_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_owned(), value.to_owned()))
            })
            .collect::<Vec<_>>();
        // A failure while reading the body happens after the connection was
        // established and is never a connect failure.
        let body = response
            .bytes()
            .await
            .map_err(|err| TransportError::other(err.to_string()))?;

        Ok(headers
            .into_iter()
            .fold(Response::new(status, body.to_vec()), |response, (name, value)| {
                response.with_header(name, value)
            }))
    }

    fn version_descriptor(&self) -> Option<String> {
        Some("reqwest/0.12".to_owned())
    }
}

/// Maps a `reqwest` error onto the connect / other split.
///
/// Only failures to resolve the host or to establish the TCP connection
/// count as connect failures. A failed TLS handshake also surfaces as a
/// connect error in `reqwest` and is reported as another transport failure.
pub(crate) fn classify_reqwest_error(err: reqwest::Error) -> TransportError {
    let message = error_chain_message(&err);
    if err.is_connect() && (err.is_timeout() || is_connect_cause(&err)) {
        TransportError::connect(message)
    } else {
        TransportError::other(message)
    }
}

/// Walks the source chain down to the first I/O error or DNS failure.
fn is_connect_cause(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(cause) = current {
        if let Some(io) = cause.downcast_ref::<io::Error>() {
            return matches!(
                io.kind(),
                io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::TimedOut
                    | io::ErrorKind::AddrNotAvailable
                    | io::ErrorKind::NotFound
            );
        }
        if cause.to_string().starts_with("dns error") {
            return true;
        }
        current = cause.source();
    }
    false
}

/// `err` and its sources joined with `": "`.
fn error_chain_message(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        let text = cause.to_string();
        if !text.is_empty() && !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        current = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use std::{fmt, io};

    use super::{
        error_chain_message, is_connect_cause, FailureKind, ReqwestTransport, Transport,
        TransportError,
    };
    use crate::{ClientOptions, Method, Request};

    #[derive(Debug)]
    struct Layer {
        message: &'static str,
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    }

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message)
        }
    }

    impl std::error::Error for Layer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static))
        }
    }

    fn layer(
        message: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Layer {
        Layer {
            message,
            source: Some(Box::new(source)),
        }
    }

    #[test]
    fn tcp_and_dns_failures_are_connect_causes() {
        let refused = layer(
            "client error (Connect)",
            layer(
                "tcp connect error",
                io::Error::from(io::ErrorKind::ConnectionRefused),
            ),
        );
        assert!(is_connect_cause(&refused));

        let dns = layer(
            "client error (Connect)",
            layer("dns error", io::Error::new(io::ErrorKind::Other, "no such host")),
        );
        assert!(is_connect_cause(&dns));
    }

    #[test]
    fn handshake_failures_are_not_connect_causes() {
        let tls = layer(
            "client error (Connect)",
            io::Error::new(
                io::ErrorKind::InvalidData,
                "received corrupt message of type InvalidContentType",
            ),
        );
        assert!(!is_connect_cause(&tls));

        let bare = Layer {
            message: "client error (Connect)",
            source: None,
        };
        assert!(!is_connect_cause(&bare));
    }

    #[test]
    fn chain_message_includes_every_cause_once() {
        let err = layer(
            "error sending request for url (http://127.0.0.1:1/)",
            layer(
                "tcp connect error",
                io::Error::new(io::ErrorKind::ConnectionRefused, "Connection refused"),
            ),
        );
        assert_eq!(
            error_chain_message(&err),
            "error sending request for url (http://127.0.0.1:1/): tcp connect error: Connection refused"
        );
    }

    #[test]
    fn constructors_set_failure_kind() {
        assert_eq!(
            TransportError::connect("refused").kind,
            FailureKind::ConnectFailure
        );
        assert_eq!(
            TransportError::other("reset").kind,
            FailureKind::OtherTransportFailure
        );
        assert_eq!(TransportError::other("reset").to_string(), "reset");
    }

    #[test]
    fn reqwest_transport_reports_version() {
        let transport =
            ReqwestTransport::new(&ClientOptions::default()).expect("transport must build");
        assert_eq!(
            transport.version_descriptor().as_deref(),
            Some("reqwest/0.12")
        );
    }

    #[tokio::test]
    async fn refused_connection_is_connect_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("must bind");
        let address = listener.local_addr().expect("must have local addr");
        drop(listener);

        let transport =
            ReqwestTransport::new(&ClientOptions::default()).expect("transport must build");
        let request = Request::new(Method::Get, format!("http://{address}/"));
        let err = transport
            .send(&request)
            .await
            .expect_err("nothing listens on the port");
        assert_eq!(err.kind, FailureKind::ConnectFailure);
        assert!(err.message.contains(": "), "{}", err.message);
    }

    #[tokio::test]
    async fn invalid_header_is_other_failure() {
        let transport =
            ReqwestTransport::new(&ClientOptions::default()).expect("transport must build");
        let request =
            Request::new(Method::Get, "http://127.0.0.1:1/").with_header("bad header", "x");
        let err = transport
            .send(&request)
            .await
            .expect_err("header name must be rejected");
        assert_eq!(err.kind, FailureKind::OtherTransportFailure);
    }
}
