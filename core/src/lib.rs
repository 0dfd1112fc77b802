//! Small semantic HTTP client with a mockable interface.
//!
//! # Overview
//! Callers issue GET and POST requests through the `Client` trait, shaping
//! each call with `RequestOption`s (query parameters, headers, a JSON body,
//! a JSON or raw response target). Non-2xx responses become a
//! `BadStatusError`, so call sites only handle the interesting cases.
//!
//! # Design
//! - `HttpClient` executes requests over the network via `reqwest`.
//! - `MockClient` passes the built `Request` to a closure instead, so code
//!   written against `Client` is testable without sockets.
//! - Every call takes a `Context`; cancelling it or passing its deadline
//!   makes the call return promptly.
//!
//! ```ignore
//! use semhttp::{with_json_response, with_param, Client, Context, HttpClient};
//!
//! #[derive(serde::Deserialize, Default)]
//! struct User { name: String }
//!
//! let client = HttpClient::new();
//! let ctx = Context::background().with_timeout(std::time::Duration::from_secs(5));
//! let mut user = User::default();
//! client
//!     .get(&ctx, "https://api.example.com/user", vec![
//!         with_param("id", "7"),
//!         with_json_response(&mut user),
//!     ])
//!     .await?;
//! ```

pub mod client;
pub mod context;
pub mod error;
pub mod http;
pub mod mock;
pub mod request;
pub mod tls;

pub use client::{Client, HttpClient, HttpClientBuilder};
pub use context::Context;
pub use error::{BadStatusError, Error, Result};
pub use http::HttpMethod;
pub use mock::MockClient;
pub use request::{
    with_header, with_json_body, with_json_response, with_param, with_response, JsonBody, JsonTarget, Request,
    RequestOption, Sink,
};
pub use tls::{TlsConfig, TlsVersion};
