mod error;
mod handlers;
mod multipart;
mod page;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderValue,
    },
    middleware,
    response::Response,
    routing::{get, post},
    Router,
};

use crate::store::Stores;

pub struct AppState {
    pub stores: Stores,
}

impl AppState {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }
}

pub fn router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route(
            "/check",
            post(handlers::check).fallback(handlers::fallback),
        )
        .route(
            "/report",
            post(handlers::report).fallback(handlers::fallback),
        )
        .route(
            "/filter-emails",
            post(handlers::filter_emails).fallback(handlers::fallback),
        )
        .route(
            "/filter",
            get(handlers::filter_page).fallback(handlers::fallback),
        )
        .fallback(handlers::fallback)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(middleware::map_response(apply_cors))
        .with_state(state)
}

/// The browser extension calls from its own origin, so every response is
/// readable cross-origin.
async fn apply_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

#[cfg(test)]
mod tests {
    use std::fs;

    use reqwest::{Client, StatusCode};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tokio::net::TcpListener;

    use super::*;
    use crate::store::JsonSetStore;

    struct TestServer {
        base: String,
        client: Client,
        dir: TempDir,
    }

    impl TestServer {
        async fn start() -> Self {
            Self::start_with_limit(1024 * 1024).await
        }

        async fn start_with_limit(max_body_bytes: usize) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let stores = Stores::new(
                JsonSetStore::new("bad_urls", dir.path().join("bad_urls.json")),
                JsonSetStore::new("members", dir.path().join("members.json")),
            );
            let app = router(Arc::new(AppState::new(stores)), max_body_bytes);
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            Self {
                base: format!("http://{addr}"),
                client: Client::new(),
                dir,
            }
        }

        async fn post_json(&self, path: &str, body: Value) -> Value {
            self.post_raw(path, body.to_string()).await
        }

        async fn post_raw(&self, path: &str, body: String) -> Value {
            let res = self
                .client
                .post(format!("{}{path}", self.base))
                .header("Content-Type", "application/json")
                .body(body)
                .send()
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::OK);
            res.json().await.unwrap()
        }

        async fn upload(&self, content_type: &str, file_content: &str) -> Value {
            let body = format!(
                "--TestBoundary\r\n\
                 Content-Disposition: form-data; name=\"file\"; filename=\"emails.json\"\r\n\
                 Content-Type: {content_type}\r\n\r\n\
                 {file_content}\r\n\
                 --TestBoundary--\r\n"
            );
            let res = self
                .client
                .post(format!("{}/filter-emails", self.base))
                .header("Content-Type", "multipart/form-data; boundary=TestBoundary")
                .body(body)
                .send()
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::OK);
            res.json().await.unwrap()
        }

        fn store_file(&self, name: &str) -> Option<Value> {
            fs::read_to_string(self.dir.path().join(name))
                .ok()
                .map(|raw| serde_json::from_str(&raw).unwrap())
        }
    }

    #[tokio::test]
    async fn reported_url_is_flagged_by_check() {
        let server = TestServer::start().await;

        let report = server
            .post_json("/report", json!({"note": "visit http://evil.example/x now"}))
            .await;
        assert_eq!(report["ok"], json!(true));
        assert_eq!(report["received"], json!(true));
        assert_eq!(report["added"], json!(1));
        assert_eq!(report["payload"], json!({"note": "visit http://evil.example/x now"}));

        let check = server
            .post_json("/check", json!({"urls": ["http://evil.example/x"]}))
            .await;
        assert_eq!(
            check,
            json!({"ok": true, "results": [{"url": "http://evil.example/x", "spam": true}]})
        );
        assert_eq!(
            server.store_file("bad_urls.json"),
            Some(json!(["http://evil.example/x"]))
        );
    }

    #[tokio::test]
    async fn check_preserves_order_and_length() {
        let server = TestServer::start().await;
        server
            .post_json("/report", json!({"urls": ["http://bad.example"]}))
            .await;

        let check = server
            .post_json(
                "/check",
                json!({"urls": ["http://fine.example", "  http://bad.example  ", 42, "HTTP://BAD.EXAMPLE"]}),
            )
            .await;

        assert_eq!(
            check["results"],
            json!([
                {"url": "http://fine.example", "spam": false},
                {"url": "http://bad.example", "spam": true},
                {"url": 42, "spam": false},
                {"url": "HTTP://BAD.EXAMPLE", "spam": false},
            ])
        );
    }

    #[tokio::test]
    async fn check_rejects_missing_url_list() {
        let server = TestServer::start().await;
        let expected = json!({"ok": false, "error": "invalid_payload", "results": []});

        assert_eq!(server.post_json("/check", json!({"urls": "x"})).await, expected);
        assert_eq!(server.post_raw("/check", "not json".to_string()).await, expected);
        assert_eq!(server.post_raw("/check", String::new()).await, expected);
    }

    #[tokio::test]
    async fn repeated_report_is_idempotent() {
        let server = TestServer::start().await;
        let payload = json!({"urls": ["http://dup.example"], "text": "http://dup.example"});

        assert_eq!(server.post_json("/report", payload.clone()).await["added"], json!(1));
        assert_eq!(server.post_json("/report", payload).await["added"], json!(0));
        assert_eq!(
            server.store_file("bad_urls.json"),
            Some(json!(["http://dup.example"]))
        );
    }

    #[tokio::test]
    async fn report_without_urls_does_not_touch_store() {
        let server = TestServer::start().await;
        let report = server.post_json("/report", json!({"note": "nothing here"})).await;
        assert_eq!(report["added"], json!(0));
        assert_eq!(server.store_file("bad_urls.json"), None);

        let report = server.post_json("/report", json!(["http://a.example"])).await;
        assert_eq!(report["added"], json!(0));
        assert_eq!(report["payload"], json!(["http://a.example"]));
    }

    #[tokio::test]
    async fn checked_email_is_filtered_as_member() {
        let server = TestServer::start().await;
        server
            .post_json("/check", json!({"urls": [], "email": "Member@Example.com "}))
            .await;

        let members = server.store_file("members.json").unwrap();
        assert_eq!(members.as_array().unwrap().len(), 1);
        assert!(!members.to_string().contains("example.com"));

        let result = server
            .upload(
                "application/json",
                r#"["member@example.com", "stranger@example.com", 7]"#,
            )
            .await;
        assert_eq!(
            result,
            json!({
                "ok": true,
                "original": ["member@example.com", "stranger@example.com", 7],
                "filtered": ["stranger@example.com"],
                "original_count": 3,
                "members_count": 1,
                "filtered_count": 1,
            })
        );
    }

    #[tokio::test]
    async fn blank_email_is_a_member_but_empty_email_is_ignored() {
        let server = TestServer::start().await;

        server
            .post_json("/check", json!({"urls": [], "email": ""}))
            .await;
        assert_eq!(server.store_file("members.json"), None);

        server
            .post_json("/check", json!({"urls": [], "email": "   "}))
            .await;
        assert_eq!(
            server.store_file("members.json"),
            Some(json!([
                "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
            ]))
        );

        let result = server.upload("application/json", r#"["   ", "a@example.com"]"#).await;
        assert_eq!(result["members_count"], json!(1));
        assert_eq!(result["filtered"], json!(["a@example.com"]));
    }

    #[tokio::test]
    async fn oversized_body_gets_structured_error() {
        let server = TestServer::start_with_limit(64).await;
        let urls: Vec<String> = (0..10)
            .map(|i| format!("http://long-url.example/{i}"))
            .collect();

        for path in ["/check", "/report", "/filter-emails"] {
            let body = server.post_json(path, json!({"urls": &urls})).await;
            assert_eq!(body["ok"], json!(false), "{path}");
            assert!(
                body["error"]
                    .as_str()
                    .unwrap()
                    .starts_with("Unreadable request body:"),
                "{path}: {body}"
            );
        }
        assert_eq!(server.store_file("bad_urls.json"), None);
    }

    #[tokio::test]
    async fn filter_rejects_bad_uploads_without_mutation() {
        let server = TestServer::start().await;

        let not_array = server.upload("application/json", "{}").await;
        assert_eq!(
            not_array,
            json!({"ok": false, "error": "JSON must be an array of emails"})
        );

        let invalid = server.upload("application/json", "[oops").await;
        assert_eq!(invalid["ok"], json!(false));
        assert!(invalid["error"].as_str().unwrap().starts_with("Invalid JSON:"));

        let wrong_type = server.upload("text/plain", "[]").await;
        assert_eq!(wrong_type["error"], json!("No JSON file found in upload"));

        let not_multipart = server.post_json("/filter-emails", json!([])).await;
        assert_eq!(not_multipart["error"], json!("Expected multipart/form-data"));

        assert_eq!(server.store_file("members.json"), None);
        assert_eq!(server.store_file("bad_urls.json"), None);
    }

    #[tokio::test]
    async fn unknown_route_is_structured_404_with_cors() {
        let server = TestServer::start().await;
        let res = server
            .client
            .post(format!("{}/nope", server.base))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.headers()["access-control-allow-origin"], "*");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body, json!({"ok": false, "error": "not_found"}));

        let res = server
            .client
            .get(format!("{}/check", server.base))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn preflight_succeeds_on_any_path() {
        let server = TestServer::start().await;
        for path in ["/check", "/anything"] {
            let res = server
                .client
                .request(reqwest::Method::OPTIONS, format!("{}{path}", server.base))
                .send()
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::OK);
            assert_eq!(res.headers()["access-control-allow-origin"], "*");
            assert_eq!(
                res.headers()["access-control-allow-methods"],
                "GET, POST, OPTIONS"
            );
            assert_eq!(res.headers()["access-control-allow-headers"], "Content-Type");
        }
    }

    #[tokio::test]
    async fn filter_page_is_served() {
        let server = TestServer::start().await;
        let res = server
            .client
            .get(format!("{}/filter", server.base))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        assert!(res.text().await.unwrap().contains("/filter-emails"));
    }
}
