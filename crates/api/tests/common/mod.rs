#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use bookings_api::auth::password::hash_password;
use bookings_api::config::ServerConfig;
use bookings_api::render::{PageRenderer, Renderer};
use bookings_api::router::build_app_router;
use bookings_api::state::AppState;
use bookings_core::types::DbId;
use bookings_db::models::user::CreateUser;
use bookings_db::{BookingRepository, MemoryBookingRepository};
use bookings_events::{MailMessage, MailQueue};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "password123";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..ServerConfig::default()
    }
}

/// Everything a test needs to drive and inspect the app.
pub struct TestApp {
    pub router: Router,
    pub repo: Arc<MemoryBookingRepository>,
    pub mail_rx: mpsc::Receiver<MailMessage>,
}

/// Build the full application router over an in-memory repository holding
/// the two standard rooms, with the default renderer.
pub fn build_test_app() -> TestApp {
    build_test_app_with_renderer(Arc::new(PageRenderer::default()))
}

pub fn build_test_app_with_renderer(renderer: Arc<dyn Renderer>) -> TestApp {
    let config = test_config();
    let repo = Arc::new(MemoryBookingRepository::seeded());
    let (mail, mail_rx) = MailQueue::new(16);

    let state = AppState {
        repo: repo.clone(),
        config: Arc::new(config.clone()),
        mail,
        renderer,
    };
    let router = build_app_router(state, &config, MemoryStore::default());

    TestApp {
        router,
        repo,
        mail_rx,
    }
}

impl TestApp {
    /// A browser with its own cookie jar (one session).
    pub fn client(&self) -> TestClient {
        TestClient {
            router: self.router.clone(),
            cookie: None,
        }
    }

    /// Create a user directly in the repository.
    pub async fn create_user(&self, email: &str, password: &str, access_level: i32) -> DbId {
        self.repo
            .create_user(&CreateUser {
                first_name: "Test".into(),
                last_name: "User".into(),
                email: email.into(),
                password_hash: hash_password(password).unwrap(),
                access_level,
            })
            .await
            .unwrap()
            .id
    }

    /// A client signed in as a freshly created administrator.
    pub async fn admin_client(&self) -> (TestClient, DbId) {
        self.signed_in_client(ADMIN_EMAIL, ADMIN_PASSWORD, 3).await
    }

    /// Create a user and sign a new client in as them.
    pub async fn signed_in_client(
        &self,
        email: &str,
        password: &str,
        access_level: i32,
    ) -> (TestClient, DbId) {
        let id = self.create_user(email, password, access_level).await;
        let mut client = self.client();
        let response = client
            .post_form("/user/login", &format!("email={email}&password={password}"))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        (client, id)
    }
}

/// Sends requests through the router, keeping the session cookie between
/// them.
pub struct TestClient {
    router: Router,
    cookie: Option<String>,
}

impl TestClient {
    pub async fn get(&mut self, uri: &str) -> Response {
        let request = self.request(Method::GET, uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, body: &str) -> Response {
        let request = self
            .request(Method::POST, uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    fn request(&self, method: Method, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(COOKIE, cookie);
        }
        builder
    }

    async fn send(&mut self, request: Request<Body>) -> Response {
        let response = self.router.clone().oneshot(request).await.unwrap();
        if let Some(set_cookie) = response.headers().get(SET_COOKIE) {
            let raw = set_cookie.to_str().unwrap();
            let pair = raw.split(';').next().unwrap_or_default().trim().to_string();
            let removed = raw.contains("Max-Age=0") || pair.ends_with('=');
            self.cookie = if removed { None } else { Some(pair) };
        }
        response
    }
}

/// Collect the response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect the response body as a string.
pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Extract the JSON page payload embedded by the page renderer.
pub async fn page_data(response: Response) -> Value {
    let html = body_text(response).await;
    let marker = "id=\"page-data\">";
    let start = html.find(marker).expect("page-data block") + marker.len();
    let end = start + html[start..].find("</script>").expect("closing script tag");
    serde_json::from_str(&html[start..end]).unwrap()
}

/// The `Location` header of a redirect.
pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(LOCATION)
        .expect("redirect location")
        .to_str()
        .unwrap()
}

/// Assert a 303 to `path`.
pub fn assert_redirect(response: &Response, path: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(response), path);
}
