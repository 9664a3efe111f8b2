use std::fmt;
use std::sync::Arc;

use reqwest::Url;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    decode::{decode_resource, encode_body},
    endpoints::{DirectoriesEndpoint, ProductionEndpoint, TemplatesEndpoint},
    response::parse_response,
    transport::{ReqwestTransport, Transport},
    ClientOptions, Filters, Method, Payload, Pipeline, PrintessError, Request, Result, RetryPolicy,
};

/// Default endpoint of the remote API.
pub const API_ENDPOINT: &str = "https://api.printess.com";

/// Version of this client, reported in the User-Agent.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

const MIN_CREDENTIAL_LEN: usize = 1024;

#[derive(Clone, PartialEq, Eq)]
enum Credential {
    ApiKey(String),
    AccessToken(String),
}

impl Credential {
    fn token(&self) -> &str {
        match self {
            Self::ApiKey(token) | Self::AccessToken(token) => token,
        }
    }
}

#[derive(Clone)]
/// HTTP client for the Printess API.
///
/// Configuration is fixed once the client is built; clones share the
/// transport.
pub struct PrintessClient {
    pipeline: Pipeline,
    api_endpoint: String,
    credential: Option<Credential>,
    version_strings: Vec<String>,
}

impl fmt::Debug for PrintessClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrintessClient")
            .field("api_endpoint", &self.api_endpoint)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("uses_oauth", &self.uses_oauth())
            .field("version_strings", &self.version_strings)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

impl PrintessClient {
    /// Creates a client with the default `reqwest` transport and options.
    pub fn new() -> Result<Self> {
        Self::from_options(ClientOptions::default())
    }

    /// Creates a client with the default `reqwest` transport configured from
    /// `opts` (timeouts and retry policy).
    pub fn from_options(opts: ClientOptions) -> Result<Self> {
        let transport = ReqwestTransport::new(&opts).map_err(|err| {
            PrintessError::Configuration(format!("unable to build HTTP client: {err}"))
        })?;
        Ok(Self::from_transport(transport).with_retry_policy(RetryPolicy::from(&opts)))
    }

    /// Creates a client on top of a custom transport.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use printess_api::{ClientOptions, PrintessClient, ReqwestTransport};
    ///
    /// let transport = ReqwestTransport::new(&ClientOptions::default()).unwrap();
    /// let client = PrintessClient::from_transport(transport);
    /// ```
    pub fn from_transport(transport: impl Transport + 'static) -> Self {
        let transport: Arc<dyn Transport> = Arc::new(transport);
        let descriptor = transport.version_descriptor();
        let client = Self {
            pipeline: Pipeline::new(transport, RetryPolicy::default()),
            api_endpoint: API_ENDPOINT.to_owned(),
            credential: None,
            version_strings: Vec::new(),
        }
        .with_version_string(format!("Printess/{CLIENT_VERSION}"))
        .with_version_string("Rust");

        match descriptor {
            Some(descriptor) => client.with_version_string(descriptor),
            None => client,
        }
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `PRINTESS_API_KEY`: API key (required)
    /// - `PRINTESS_API_ENDPOINT`: API endpoint (optional, defaults to
    ///   [`API_ENDPOINT`])
    ///
    /// # Example
    ///
    /// ```no_run
    /// use printess_api::PrintessClient;
    ///
    /// let printess = PrintessClient::from_env().expect("missing PRINTESS_API_KEY");
    /// ```
    pub fn from_env() -> Result<Self> {
        let key = std::env::var("PRINTESS_API_KEY").map_err(|_| {
            PrintessError::Configuration("missing PRINTESS_API_KEY environment variable".to_owned())
        })?;
        let client = Self::new()?.with_api_key(key)?;
        match std::env::var("PRINTESS_API_ENDPOINT") {
            Ok(endpoint) if !endpoint.trim().is_empty() => Ok(client.with_api_endpoint(endpoint)),
            _ => Ok(client),
        }
    }

    /// Overrides the API endpoint, e.g. to talk to a proxy.
    pub fn with_api_endpoint(mut self, url: impl AsRef<str>) -> Self {
        self.api_endpoint = url.as_ref().trim().trim_end_matches('/').to_owned();
        self
    }

    /// Authenticates with an API key.
    pub fn with_api_key(mut self, key: impl AsRef<str>) -> Result<Self> {
        let key = validate_credential(key.as_ref())?;
        self.credential = Some(Credential::ApiKey(key));
        Ok(self)
    }

    /// Authenticates with an OAuth access token.
    pub fn with_access_token(mut self, token: impl AsRef<str>) -> Result<Self> {
        let token = validate_credential(token.as_ref())?;
        self.credential = Some(Credential::AccessToken(token));
        Ok(self)
    }

    /// Appends a `name/version` entry to the User-Agent.
    ///
    /// Whitespace is replaced by `-`.
    pub fn with_version_string(mut self, version: impl AsRef<str>) -> Self {
        self.version_strings
            .push(version.as_ref().replace([' ', '\t', '\n', '\r'], "-"));
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.pipeline = Pipeline::new(self.pipeline.transport().clone(), policy);
        self
    }

    pub fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    pub fn version_strings(&self) -> &[String] {
        &self.version_strings
    }

    /// `None` until a credential is set, then whether it is an OAuth token.
    pub fn uses_oauth(&self) -> Option<bool> {
        self.credential
            .as_ref()
            .map(|credential| matches!(credential, Credential::AccessToken(_)))
    }

    pub fn production(&self) -> ProductionEndpoint<'_> {
        ProductionEndpoint::new(self)
    }

    pub fn directories(&self) -> DirectoriesEndpoint<'_> {
        DirectoriesEndpoint::new(self)
    }

    pub fn templates(&self) -> TemplatesEndpoint<'_> {
        TemplatesEndpoint::new(self)
    }

    /// Calls `<api endpoint>/<api_path>`.
    pub async fn perform_http_call(
        &self,
        method: Method,
        api_path: &str,
        body: Option<&str>,
    ) -> Result<Payload> {
        let url = format!("{}/{}", self.api_endpoint, api_path);
        self.perform_http_call_to_full_url(method, &url, body).await
    }

    /// Calls an absolute URL with the client's credential and headers.
    pub async fn perform_http_call_to_full_url(
        &self,
        method: Method,
        url: &str,
        body: Option<&str>,
    ) -> Result<Payload> {
        let request = self.build_request(method, url, body)?;
        self.pipeline.execute(&request).await
    }

    /// `POST`s `data` to a resource path.
    pub async fn create<B>(&self, path: &str, data: &B, filters: &Filters) -> Result<Payload>
    where
        B: Serialize + ?Sized,
    {
        let body = encode_body(data)?;
        let url = self.resource_url(path, None, filters)?;
        self.perform_http_call_to_full_url(Method::Post, &url, body.as_deref())
            .await
    }

    /// `POST`s `data` to a resource path and decodes the answer as `T`.
    pub(crate) async fn create_resource<T, B>(
        &self,
        path: &str,
        data: &B,
        filters: &Filters,
        resource: &str,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = encode_body(data)?;
        let url = self.resource_url(path, None, filters)?;
        let request = self.build_request(Method::Post, &url, body.as_deref())?;
        let response = self.pipeline.send(&request).await?;
        let payload = parse_response(&response, &request)?;
        decode_resource(payload, resource, &request, &response)
    }

    /// `GET`s a single resource by id.
    pub async fn read(&self, path: &str, id: &str, filters: &Filters) -> Result<Payload> {
        let url = self.resource_url(path, Some(id), filters)?;
        self.perform_http_call_to_full_url(Method::Get, &url, None)
            .await
    }

    /// `PATCH`es a single resource by id.
    pub async fn update<B>(&self, path: &str, id: &str, data: &B) -> Result<Payload>
    where
        B: Serialize + ?Sized,
    {
        let url = self.resource_url(path, Some(id), &Filters::new())?;
        let body = encode_body(data)?;
        self.perform_http_call_to_full_url(Method::Patch, &url, body.as_deref())
            .await
    }

    /// `DELETE`s a single resource by id.
    pub async fn delete<B>(&self, path: &str, id: &str, data: &B) -> Result<Payload>
    where
        B: Serialize + ?Sized,
    {
        let url = self.resource_url(path, Some(id), &Filters::new())?;
        let body = encode_body(data)?;
        self.perform_http_call_to_full_url(Method::Delete, &url, body.as_deref())
            .await
    }

    fn build_request(&self, method: Method, url: &str, body: Option<&str>) -> Result<Request> {
        let credential = self.credential.as_ref().ok_or_else(|| {
            PrintessError::Configuration(
                "You have not set an API key or OAuth access token. Please use with_api_key() to set the API key."
                    .to_owned(),
            )
        })?;

        let mut user_agent = self.version_strings.join(" ");
        if matches!(credential, Credential::AccessToken(_)) {
            user_agent.push_str(" OAuth/2.0");
        }

        let mut request = Request::new(method, url)
            .with_header("Accept", "application/json")
            .with_header("Authorization", format!("Bearer {}", credential.token()))
            .with_header("User-Agent", user_agent)
            .with_header("X-Client-Info", client_info());

        if let Some(body) = body.filter(|body| !body.is_empty()) {
            request = request
                .with_header("Content-Type", "application/json")
                .with_body(body);
        }

        Ok(request)
    }

    fn resource_url(&self, path: &str, id: Option<&str>, filters: &Filters) -> Result<String> {
        let base = format!("{}/{}", self.api_endpoint, path.trim_matches('/'));
        let mut url = Url::parse(&base).map_err(|err| {
            PrintessError::InvalidRequest(format!("invalid API URL '{base}': {err}"))
        })?;

        if let Some(id) = id {
            if id.trim().is_empty() {
                return Err(PrintessError::InvalidRequest("Invalid resource id.".to_owned()));
            }
            url.path_segments_mut()
                .map_err(|_| PrintessError::InvalidRequest(format!("invalid API URL '{base}'")))?
                .push(id);
        }

        if !filters.is_empty() {
            url.query_pairs_mut().extend_pairs(filters.iter());
        }

        Ok(url.into())
    }
}

fn validate_credential(raw: &str) -> Result<String> {
    let credential = raw.trim();
    let valid = credential.len() >= MIN_CREDENTIAL_LEN
        && credential
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'));
    if !valid {
        return Err(PrintessError::Configuration(format!(
            "Invalid API key: '{credential}'. An API key must be at least {MIN_CREDENTIAL_LEN} characters long."
        )));
    }
    Ok(credential.to_owned())
}

/// Best-effort platform descriptor sent as `X-Client-Info`.
fn client_info() -> String {
    format!(
        "{} {} {}",
        std::env::consts::OS,
        std::env::consts::ARCH,
        std::env::consts::FAMILY
    )
}
