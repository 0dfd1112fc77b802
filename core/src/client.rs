//! The `Client` capability and its network implementation.
//!
//! # Design
//! `HttpClient` owns one `reqwest::Client` for its whole life and keeps no
//! other state, so clones and concurrent callers share the connection pool
//! without interfering. Every call builds its own `Request`, turns it into a
//! `reqwest::Request`, sends it and interprets the response, all raced
//! against the caller's `Context`.

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::context::Context;
use crate::error::{BadStatusError, Error, Result};
use crate::http::HttpMethod;
use crate::request::{Request, RequestOption};
use crate::tls::TlsConfig;

/// Semantic HTTP calls. Implemented by `HttpClient` and `MockClient`.
#[async_trait]
pub trait Client: Send + Sync {
    async fn get<'a>(&self, ctx: &Context, url: &str, options: Vec<RequestOption<'a>>) -> Result<()>;

    async fn post<'a>(&self, ctx: &Context, url: &str, options: Vec<RequestOption<'a>>) -> Result<()>;
}

/// `Client` that performs real network requests.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Client with the transport's default settings.
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
        }
    }

    /// Client whose transport uses the given trust and identity settings.
    pub fn with_tls(config: TlsConfig) -> Result<Self> {
        Self::builder().tls(config).build()
    }

    /// Wrap an already configured transport.
    pub fn from_reqwest(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    async fn execute<'a>(
        &self,
        ctx: &Context,
        method: HttpMethod,
        url: &str,
        options: Vec<RequestOption<'a>>,
    ) -> Result<()> {
        let request = Request::build(method, url, options);
        if let Some(err) = ctx.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            err = ctx.done() => Err(err),
            result = self.round_trip(request) => result,
        }
    }

    async fn round_trip(&self, request: Request<'_>) -> Result<()> {
        let outgoing = prepare(&request)?;
        debug!(
            method = %request.method(),
            url = %outgoing.url(),
            headers = request.headers().len(),
            params = request.params().len(),
            "sending request"
        );
        let response = self.inner.execute(outgoing).await?;
        debug!(status = response.status().as_u16(), "received response");
        handle_response(request, response).await
    }
}

#[async_trait]
impl Client for HttpClient {
    async fn get<'a>(&self, ctx: &Context, url: &str, options: Vec<RequestOption<'a>>) -> Result<()> {
        self.execute(ctx, HttpMethod::Get, url, options).await
    }

    async fn post<'a>(&self, ctx: &Context, url: &str, options: Vec<RequestOption<'a>>) -> Result<()> {
        self.execute(ctx, HttpMethod::Post, url, options).await
    }
}

/// Turn a `Request` into a transport request. Fails before any I/O.
fn prepare(request: &Request<'_>) -> Result<reqwest::Request> {
    let body = request.encode_body()?;
    let target = request.full_url();
    let url = url::Url::parse(&target)
        .map_err(|e| Error::InvalidRequest(format!("invalid url {target:?}: {e}")))?;

    let mut outgoing = reqwest::Request::new(request.method().into(), url);
    if !body.is_empty() {
        *outgoing.body_mut() = Some(body.into());
    }
    let headers = outgoing.headers_mut();
    for (name, value) in request.headers() {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::InvalidRequest(format!("invalid header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::InvalidRequest(format!("invalid value for header {name}: {e}")))?;
        headers.append(name, value);
    }
    Ok(outgoing)
}

/// Check the status and deliver the body to the request's output target.
/// The response is dropped, releasing the connection, on every path.
async fn handle_response(request: Request<'_>, mut response: reqwest::Response) -> Result<()> {
    let status = response.status();
    if !status.is_success() {
        let body = response.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        warn!(status = status.as_u16(), "unsuccessful response");
        return Err(BadStatusError::new(status.as_u16(), body).into());
    }

    let (json_output, output) = request.into_outputs();
    if let Some(sink) = output {
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Error::Stream(std::io::Error::other(e)))?
        {
            sink.write_all(&chunk).await.map_err(Error::Stream)?;
        }
        sink.flush().await.map_err(Error::Stream)?;
    } else if let Some(target) = json_output {
        let body = response.bytes().await?;
        target.decode_json(&body).map_err(Error::Parse)?;
    }
    Ok(())
}

/// Builder for an `HttpClient` with non-default transport settings.
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    tls: Option<TlsConfig>,
    user_agent: Option<String>,
    default_headers: Vec<(String, String)>,
}

impl HttpClientBuilder {
    pub fn tls(mut self, config: TlsConfig) -> Self {
        self.tls = Some(config);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Header sent with every request unless the request sets the same name.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut builder = reqwest::Client::builder();
        if let Some(tls) = self.tls {
            builder = tls.apply(builder);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        if !self.default_headers.is_empty() {
            let mut headers = reqwest::header::HeaderMap::new();
            for (name, value) in &self.default_headers {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| Error::InvalidRequest(format!("invalid header name {name:?}: {e}")))?;
                let value = HeaderValue::from_str(value)
                    .map_err(|e| Error::InvalidRequest(format!("invalid value for header {name}: {e}")))?;
                headers.append(name, value);
            }
            builder = builder.default_headers(headers);
        }
        let inner = builder.build().map_err(Error::Tls)?;
        Ok(HttpClient { inner })
    }
}
