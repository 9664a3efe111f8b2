use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{transport::FailureKind, wire::ErrorEnvelope, Request, Response};

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum PrintessError {
    /// Client misconfiguration, detected before any network attempt.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Caller supplied a request that cannot be sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The exchange failed below HTTP. Connect failures were already retried.
    #[error("{error}")]
    Transport {
        kind: FailureKind,
        error: Box<ApiError>,
    },
    /// Response body was empty (on a non-204 status) or not valid JSON.
    #[error("{0}")]
    Decode(Box<ApiError>),
    /// Well-formed error envelope returned by the Printess API.
    #[error("{0}")]
    Api(Box<ApiError>),
}

/// Taxonomy tag of a [`PrintessError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    InvalidRequest,
    Transport,
    Decode,
    Api,
}

impl PrintessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Api(_) => ErrorKind::Api,
        }
    }

    /// Diagnostic details, present for transport, decode and API failures.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Transport { error, .. } | Self::Decode(error) | Self::Api(error) => Some(error),
            Self::Configuration(_) | Self::InvalidRequest(_) => None,
        }
    }

    pub(crate) fn transport(kind: FailureKind, message: String, request: &Request) -> Self {
        Self::Transport {
            kind,
            error: Box::new(ApiError::new(ErrorKind::Transport, 0, message, String::new())
                .with_request(request)),
        }
    }

    pub(crate) fn decode(
        title: &str,
        detail: String,
        request: Option<&Request>,
        response: Option<&Response>,
    ) -> Self {
        let status = response.map_or(0, Response::status);
        let mut error = ApiError::new(ErrorKind::Decode, status, title.to_owned(), detail);
        if let Some(request) = request {
            error = error.with_request(request);
        }
        if let Some(response) = response {
            error = error.with_response(response);
        }
        Self::Decode(Box::new(error))
    }

    pub(crate) fn api(envelope: ErrorEnvelope, request: &Request, response: &Response) -> Self {
        let mut error = ApiError::new(
            ErrorKind::Api,
            response.status(),
            envelope.title,
            envelope.detail,
        )
        .with_request(request)
        .with_response(response);
        error.api_status = Some(envelope.status);
        error.field = envelope.field.filter(|field| !field.is_empty());
        error.links = envelope.links;
        Self::Api(Box::new(error))
    }
}

/// Hypermedia link attached to an API error (`_links` in the envelope).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Classified, diagnostic-rich representation of a failed API call.
///
/// `Display` renders the message used in logs:
/// `[<raised at>] Error executing API call (<status>: <title>): <detail>`
/// followed by the optional `. Field`, `. Documentation` and
/// `. Request body` suffixes. `<status>` is the one reported in the error
/// body.
#[derive(Clone, Debug)]
pub struct ApiError {
    kind: ErrorKind,
    http_status: u16,
    api_status: Option<u16>,
    title: String,
    detail: String,
    field: Option<String>,
    links: BTreeMap<String, Link>,
    raised_at: DateTime<Utc>,
    request: Option<Request>,
    response: Option<Response>,
}

impl ApiError {
    fn new(kind: ErrorKind, http_status: u16, title: String, detail: String) -> Self {
        Self {
            kind,
            http_status,
            api_status: None,
            title,
            detail,
            field: None,
            links: BTreeMap::new(),
            raised_at: Utc::now(),
            request: None,
            response: None,
        }
    }

    fn with_request(mut self, request: &Request) -> Self {
        self.request = Some(request.clone());
        self
    }

    fn with_response(mut self, response: &Response) -> Self {
        self.response = Some(response.clone());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// HTTP status of the response, `0` when no response was received.
    pub fn http_status(&self) -> u16 {
        self.http_status
    }

    /// Status reported inside the error body, which may differ from the
    /// HTTP status.
    pub fn api_status(&self) -> Option<u16> {
        self.api_status
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn links(&self) -> &BTreeMap<String, Link> {
        &self.links
    }

    pub fn has_link(&self, name: &str) -> bool {
        self.links.contains_key(name)
    }

    pub fn link(&self, name: &str) -> Option<&Link> {
        self.links.get(name)
    }

    pub fn url(&self, name: &str) -> Option<&str> {
        self.link(name).map(|link| link.href.as_str())
    }

    pub fn documentation_url(&self) -> Option<&str> {
        self.url("documentation")
    }

    pub fn dashboard_url(&self) -> Option<&str> {
        self.url("dashboard")
    }

    pub fn raised_at(&self) -> DateTime<Utc> {
        self.raised_at
    }

    /// `raised_at` as ISO 8601 with an explicit `+00:00` offset.
    pub fn raised_at_iso8601(&self) -> String {
        self.raised_at.to_rfc3339_opts(SecondsFormat::Secs, false)
    }

    pub fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    pub fn has_response(&self) -> bool {
        self.response.is_some()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.raised_at_iso8601())?;
        match self.kind {
            ErrorKind::Api => write!(
                f,
                "Error executing API call ({}: {}): {}",
                self.api_status.unwrap_or(self.http_status),
                self.title,
                self.detail
            )?,
            _ => {
                f.write_str(&self.title)?;
                if !self.detail.is_empty() {
                    write!(f, ": {}", self.detail)?;
                }
            }
        }
        if let Some(field) = &self.field {
            write!(f, ". Field: {field}")?;
        }
        if let Some(documentation) = self.documentation_url() {
            write!(f, ". Documentation: {documentation}")?;
        }
        if let Some(body) = self.request.as_ref().and_then(Request::body_text) {
            write!(f, ". Request body: {body}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}
