//! `printess-api` is an async HTTP client for the Printess print-production API.
//!
//! The crate wraps the REST resources with typed methods:
//! - [`PrintessClient::production`]: produce jobs and poll their status
//! - [`PrintessClient::directories`]: load the directory tree
//! - [`PrintessClient::templates`]: list templates, details and form fields
//!
//! Every call runs through a [`Pipeline`] that retries connect failures with
//! a linear backoff and classifies failures into [`PrintessError`] variants.

mod client;
mod decode;
mod endpoints;
mod error;
mod http;
mod options;
mod params;
mod pipeline;
mod response;
mod retry;
mod transport;
mod types;
mod wire;

pub use client::{PrintessClient, API_ENDPOINT, CLIENT_VERSION};
pub use endpoints::{DirectoriesEndpoint, ProductionEndpoint, TemplatesEndpoint};
pub use error::{ApiError, ErrorKind, Link, PrintessError};
pub use http::{Method, Request, Response};
pub use options::ClientOptions;
pub use params::Filters;
pub use pipeline::Pipeline;
pub use response::{parse_response, Payload, HTTP_NO_CONTENT};
pub use retry::{RetryDecision, RetryPolicy, DELAY_INCREASE_MS, MAX_RETRIES};
pub use transport::{FailureKind, ReqwestTransport, Transport, TransportError};
pub use types::{
    Directory, JobResult, JobStatus, PdfOutput, ProduceJob, SimpleJobStatus, TemplateSummary,
    UserTemplates,
};

pub type Result<T> = std::result::Result<T, PrintessError>;
