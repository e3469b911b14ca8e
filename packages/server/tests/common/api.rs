//! Thin HTTP client driving the router in-process via tower's `oneshot`.

use std::sync::atomic::{AtomicU16, Ordering};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::util::ServiceExt;

static NEXT_CLIENT_IP: AtomicU16 = AtomicU16::new(1);

/// In-process API client. Each client gets its own forwarded IP so the
/// per-IP rate limiter never throttles unrelated tests.
pub struct ApiClient {
    app: Router,
    client_ip: String,
}

/// A decoded response: status plus JSON body (`Value::Null` when the body
/// is empty or not JSON).
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
    pub raw_body: String,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
}

impl ApiClient {
    pub fn new(app: Router) -> Self {
        let n = NEXT_CLIENT_IP.fetch_add(1, Ordering::Relaxed);
        ApiClient {
            app,
            client_ip: format!("10.1.{}.{}", n / 256, n % 256),
        }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> ApiResponse {
        self.request("GET", path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> ApiResponse {
        self.request("POST", path, token, Some(body)).await
    }

    pub async fn post_empty(&self, path: &str, token: Option<&str>) -> ApiResponse {
        self.request("POST", path, token, None).await
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: Value) -> ApiResponse {
        self.request("PUT", path, token, Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> ApiResponse {
        self.request("DELETE", path, token, None).await
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> ApiResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header("x-forwarded-for", &self.client_ip);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request builds");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router handles request");

        let status = response.status();
        let content_type = header_string(&response, header::CONTENT_TYPE);
        let content_disposition = header_string(&response, header::CONTENT_DISPOSITION);

        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body collects")
            .to_bytes();
        let raw_body = String::from_utf8_lossy(&bytes).to_string();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        ApiResponse {
            status,
            body,
            raw_body,
            content_type,
            content_disposition,
        }
    }
}

fn header_string<B>(
    response: &axum::http::Response<B>,
    name: header::HeaderName,
) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}
