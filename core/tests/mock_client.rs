//! Code written against `Client` exercised through `MockClient`.
//!
//! `Directory` stands in for an application service: it only knows the
//! `Client` trait, so the tests swap in a mock and assert on the requests it
//! builds without opening a socket.

use std::sync::{Arc, Mutex};

use semhttp::{
    with_header, with_json_body, with_json_response, with_param, BadStatusError, Client, Context, Error, HttpMethod,
    MockClient,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    name: String,
}

struct Directory {
    client: Arc<dyn Client>,
    base_url: String,
}

impl Directory {
    async fn find(&self, ctx: &Context, name: &str) -> semhttp::Result<User> {
        let mut user = User::default();
        self.client
            .get(
                ctx,
                &format!("{}/users", self.base_url),
                vec![with_param("name", name), with_json_response(&mut user)],
            )
            .await?;
        Ok(user)
    }

    async fn create(&self, ctx: &Context, user: &User) -> semhttp::Result<()> {
        self.client
            .post(
                ctx,
                &format!("{}/users", self.base_url),
                vec![with_header("x-request-id", "42"), with_json_body(user)],
            )
            .await
    }
}

fn directory(client: MockClient) -> Directory {
    Directory {
        client: Arc::new(client),
        base_url: "http://directory.test".to_string(),
    }
}

#[tokio::test]
async fn find_decodes_mocked_response() {
    let dir = directory(MockClient::new(|_ctx, req| {
        assert_eq!(req.method(), HttpMethod::Get);
        assert_eq!(req.full_url(), "http://directory.test/users?name=alex");
        assert_eq!(req.header("accept"), Some("application/json"));
        req.fill_json_output(br#"{"name":"alex"}"#)
    }));

    let user = dir.find(&Context::background(), "alex").await.unwrap();
    assert_eq!(user.name, "alex");
}

#[tokio::test]
async fn find_surfaces_bad_status() {
    let dir = directory(MockClient::new(|_ctx, _req| {
        Err(BadStatusError::new(404, "hello").into())
    }));

    let err = dir.find(&Context::background(), "nobody").await.unwrap_err();
    assert_eq!(err.bad_status(), Some(&BadStatusError::new(404, "hello")));
}

#[tokio::test]
async fn find_surfaces_parse_errors() {
    let dir = directory(MockClient::new(|_ctx, req| req.fill_json_output(b"<html></html>")));

    let err = dir.find(&Context::background(), "alex").await.unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[tokio::test]
async fn create_posts_json_body() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let record = seen.clone();
    let dir = directory(MockClient::new(move |_ctx, req| {
        assert_eq!(req.method(), HttpMethod::Post);
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("x-request-id"), Some("42"));
        assert!(!req.has_json_output());
        record.lock().unwrap().push(req.body_json().unwrap()?);
        Ok(())
    }));

    let user = User {
        name: "alex".to_string(),
    };
    dir.create(&Context::background(), &user).await.unwrap();

    let bodies = seen.lock().unwrap();
    assert_eq!(bodies.as_slice(), &[serde_json::json!({"name": "alex"})]);
}

#[tokio::test]
async fn handler_errors_pass_through_unchanged() {
    let dir = directory(MockClient::new(|_ctx, _req| Err(Error::handler("directory offline"))));

    let err = dir
        .create(&Context::background(), &User::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Handler(_)));
    assert_eq!(err.to_string(), "directory offline");
}

#[tokio::test]
#[should_panic(expected = "GET requests cannot have a body")]
async fn mock_get_with_body_panics() {
    let client = MockClient::new(|_ctx, _req| Ok(()));
    let _ = client
        .get(
            &Context::background(),
            "http://directory.test",
            vec![with_json_body(User::default())],
        )
        .await;
}

#[tokio::test]
async fn repeated_options_accumulate() {
    let client = MockClient::new(|_ctx, req| {
        let tags: Vec<_> = req
            .params()
            .iter()
            .filter(|(k, _)| k == "tag")
            .map(|(_, v)| v.clone())
            .collect();
        assert_eq!(tags, vec!["a", "b"]);
        assert_eq!(req.header_values("x-multi").collect::<Vec<_>>(), vec!["1", "2"]);
        Ok(())
    });

    client
        .get(
            &Context::background(),
            "http://directory.test",
            vec![
                with_param("tag", "a"),
                with_header("x-multi", "1"),
                with_param("tag", "b"),
                with_header("x-multi", "2"),
            ],
        )
        .await
        .unwrap();
}
