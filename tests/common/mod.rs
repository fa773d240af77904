#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
};
use notejam::db::{Pad, Storage, User};
use notejam::router::{NotejamState, notejam_router};
use notejam::service::password::hash_password;
use serde_json::Value;
use std::{
    fs,
    path::PathBuf,
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// A router over a throwaway SQLite file, removed on drop.
pub struct TestApp {
    pub app: Router,
    pub storage: Storage,
    path: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();

        let mut path = std::env::temp_dir();
        path.push(format!(
            "notejam-test-{}-{}-{}.sqlite",
            std::process::id(),
            nanos,
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let database_url = format!("sqlite:{}", path.display());
        let storage = notejam::db::connect(&database_url)
            .await
            .expect("failed to open test database");

        let basic = notejam::config::BasicConfig::default();
        let key = basic.cookie_key().expect("failed to build cookie key");
        let session_ttl = basic.session_ttl().expect("default session lifetime is valid");
        let state = NotejamState::new(storage.clone(), key, true, session_ttl);
        let app = notejam_router(state);

        Self { app, storage, path }
    }

    pub async fn create_user(&self, email: &str, password: &str) -> User {
        let hash = hash_password(password).expect("hash failed");
        self.storage
            .create_user(email, &hash)
            .await
            .expect("insert user failed")
            .expect("email already taken")
    }

    pub async fn create_pad(&self, owner: &User, name: &str) -> Pad {
        self.storage
            .create_pad(owner.id, name)
            .await
            .expect("insert pad failed")
    }

    /// Signs in through the real endpoint and returns the session cookie.
    pub async fn sign_in(&self, email: &str, password: &str) -> String {
        let resp = self
            .post("/signin/", &[("email", email), ("password", password)], None)
            .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "sign-in failed");
        resp.headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .expect("sign-in did not set a session cookie")
            .to_string()
    }

    pub async fn post(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> Response<Body> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.app
            .clone()
            .oneshot(builder.body(Body::from(body)).expect("failed to build request"))
            .await
            .expect("request failed")
    }

    /// POST with no body and no content type.
    pub async fn post_bare(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.app
            .clone()
            .oneshot(builder.body(Body::empty()).expect("failed to build request"))
            .await
            .expect("request failed")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.app
            .clone()
            .oneshot(builder.body(Body::empty()).expect("failed to build request"))
            .await
            .expect("request failed")
    }
}

pub fn location(resp: &Response<Body>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("response has no Location header")
}

pub fn assert_redirects(resp: &Response<Body>, target: &str) {
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(resp), target);
}

pub async fn json_body(resp: Response<Body>) -> Value {
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&body).expect("response body was not JSON")
}

/// Field names carrying errors in a redisplayed form, sorted.
pub async fn form_error_fields(resp: Response<Body>) -> Vec<String> {
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    let mut fields: Vec<String> = body["errors"]
        .as_object()
        .expect("response carries no form errors")
        .keys()
        .cloned()
        .collect();
    fields.sort();
    fields
}
