//! `Client` test double that hands each request to a closure.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use crate::client::Client;
use crate::context::Context;
use crate::error::Result;
use crate::http::HttpMethod;
use crate::request::{Request, RequestOption};

type Handler = dyn Fn(&Context, &mut Request<'_>) -> Result<()> + Send + Sync;

/// A `Client` that calls a handler instead of doing network I/O.
///
/// The handler receives the fully built request and its result becomes the
/// call's result. Responses are not interpreted: to simulate a JSON reply the
/// handler calls `Request::fill_json_output`.
///
/// ```ignore
/// let client = MockClient::new(|_ctx, req| {
///     assert_eq!(req.param("id"), Some("7"));
///     req.fill_json_output(br#"{"name":"alex"}"#)
/// });
/// ```
#[derive(Clone)]
pub struct MockClient {
    handler: Arc<Handler>,
}

impl MockClient {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Context, &mut Request<'_>) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
        }
    }

    fn dispatch(&self, ctx: &Context, method: HttpMethod, url: &str, options: Vec<RequestOption<'_>>) -> Result<()> {
        let mut request = Request::build(method, url, options);
        trace!(%method, url, "dispatching to mock handler");
        (self.handler)(ctx, &mut request)
    }
}

impl fmt::Debug for MockClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockClient").finish_non_exhaustive()
    }
}

#[async_trait]
impl Client for MockClient {
    async fn get<'a>(&self, ctx: &Context, url: &str, options: Vec<RequestOption<'a>>) -> Result<()> {
        self.dispatch(ctx, HttpMethod::Get, url, options)
    }

    async fn post<'a>(&self, ctx: &Context, url: &str, options: Vec<RequestOption<'a>>) -> Result<()> {
        self.dispatch(ctx, HttpMethod::Post, url, options)
    }
}
