//! Request descriptor and the options that populate it.
//!
//! # Design
//! A `Request` is created fresh for every call with its method and URL
//! fixed, then the caller's `RequestOption`s run against it left to right.
//! Output targets are borrowed for the lifetime `'a` of the call, so the
//! caller keeps ownership and reads the result once the call returns.
//!
//! Options are plain boxed closures; `RequestOption::custom` lets callers
//! write their own alongside the built-in ones.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWrite;

use crate::error::{Error, Result};
use crate::http::HttpMethod;

/// A value that can be encoded as a JSON request body.
pub trait JsonBody {
    fn to_json(&self) -> serde_json::Result<Vec<u8>>;
    fn to_value(&self) -> serde_json::Result<serde_json::Value>;
}

impl<T: Serialize> JsonBody for T {
    fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// A destination a JSON response body is decoded into.
///
/// On error the target keeps its previous value.
pub trait JsonTarget {
    fn decode_json(&mut self, bytes: &[u8]) -> serde_json::Result<()>;
}

impl<T: DeserializeOwned> JsonTarget for T {
    fn decode_json(&mut self, bytes: &[u8]) -> serde_json::Result<()> {
        *self = serde_json::from_slice(bytes)?;
        Ok(())
    }
}

/// Caller-supplied writer receiving the raw response body.
pub type Sink<'a> = &'a mut (dyn AsyncWrite + Unpin + Send);

/// One pending HTTP call.
pub struct Request<'a> {
    method: HttpMethod,
    url: String,
    params: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<Box<dyn JsonBody + Send + 'a>>,
    json_output: Option<&'a mut (dyn JsonTarget + Send)>,
    output: Option<Sink<'a>>,
}

impl<'a> Request<'a> {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: Vec::new(),
            headers: Vec::new(),
            body: None,
            json_output: None,
            output: None,
        }
    }

    /// Create a request and apply `options` in order.
    pub fn build(
        method: HttpMethod,
        url: impl Into<String>,
        options: impl IntoIterator<Item = RequestOption<'a>>,
    ) -> Self {
        let mut request = Self::new(method, url);
        for option in options {
            option.apply(&mut request);
        }
        request
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// First value of query parameter `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First value of header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn header_values<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'s str> + 's {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// The request body as a JSON value, if one was attached.
    pub fn body_json(&self) -> Option<Result<serde_json::Value>> {
        self.body
            .as_ref()
            .map(|body| body.to_value().map_err(Error::Serialization))
    }

    pub fn has_json_output(&self) -> bool {
        self.json_output.is_some()
    }

    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }

    /// Decode `bytes` into the JSON target, as the network client would.
    /// Does nothing when no JSON target was attached.
    pub fn fill_json_output(&mut self, bytes: &[u8]) -> Result<()> {
        match self.json_output.as_deref_mut() {
            Some(target) => target.decode_json(bytes).map_err(Error::Parse),
            None => Ok(()),
        }
    }

    /// URL with the encoded query string appended, `?` only when there are
    /// parameters.
    pub fn full_url(&self) -> String {
        if self.params.is_empty() {
            return self.url.clone();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.params)
            .finish();
        format!("{}?{}", self.url, query)
    }

    /// Encoded request body, empty when none was attached.
    pub(crate) fn encode_body(&self) -> Result<Vec<u8>> {
        match &self.body {
            Some(body) => body.to_json().map_err(Error::Serialization),
            None => Ok(Vec::new()),
        }
    }

    pub(crate) fn into_outputs(
        self,
    ) -> (Option<&'a mut (dyn JsonTarget + Send)>, Option<Sink<'a>>) {
        (self.json_output, self.output)
    }
}

impl fmt::Debug for Request<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("params", &self.params)
            .field("headers", &self.headers)
            .field("has_body", &self.has_body())
            .field("has_json_output", &self.has_json_output())
            .field("has_output", &self.has_output())
            .finish()
    }
}

/// A single mutation applied to a `Request` before it is executed.
pub struct RequestOption<'a>(Box<dyn FnOnce(&mut Request<'a>) + Send + 'a>);

impl<'a> RequestOption<'a> {
    pub fn custom(f: impl FnOnce(&mut Request<'a>) + Send + 'a) -> Self {
        Self(Box::new(f))
    }

    pub fn apply(self, request: &mut Request<'a>) {
        (self.0)(request)
    }
}

impl fmt::Debug for RequestOption<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RequestOption")
    }
}

/// Decode the response body as JSON into `target` and ask for JSON.
pub fn with_json_response<'a, T>(target: &'a mut T) -> RequestOption<'a>
where
    T: DeserializeOwned + Send,
{
    let target: &'a mut (dyn JsonTarget + Send) = target;
    RequestOption::custom(move |r| {
        r.json_output = Some(target);
        r.headers
            .push(("Accept".to_string(), "application/json".to_string()));
    })
}

/// Stream the raw response body into `sink`.
pub fn with_response<'a, W>(sink: &'a mut W) -> RequestOption<'a>
where
    W: AsyncWrite + Unpin + Send,
{
    let sink: Sink<'a> = sink;
    RequestOption::custom(move |r| r.output = Some(sink))
}

/// Add a query parameter. Repeated keys keep every value.
pub fn with_param<'a>(key: impl Into<String>, value: impl Into<String>) -> RequestOption<'a> {
    let pair = (key.into(), value.into());
    RequestOption::custom(move |r| r.params.push(pair))
}

/// Send `body` encoded as JSON.
///
/// # Panics
/// When applied to a GET request.
pub fn with_json_body<'a, B>(body: B) -> RequestOption<'a>
where
    B: Serialize + Send + 'a,
{
    RequestOption::custom(move |r| {
        if r.method == HttpMethod::Get {
            panic!("GET requests cannot have a body");
        }
        let body: Box<dyn JsonBody + Send + 'a> = Box::new(body);
        r.body = Some(body);
        r.headers
            .push(("Content-Type".to_string(), "application/json".to_string()));
    })
}

/// Add a header. Repeated names keep every value.
pub fn with_header<'a>(name: impl Into<String>, value: impl Into<String>) -> RequestOption<'a> {
    let pair = (name.into(), value.into());
    RequestOption::custom(move |r| r.headers.push(pair))
}
