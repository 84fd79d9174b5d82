//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use tempfile::TempDir;
use tokio_rusqlite::Connection;
use tower::util::ServiceExt;

use planner::api::{AppState, ORGANIZER_HEADER, app};
use planner::core::db::{async_db, initialize_db};
use planner::core::{AppConfig, MailConfig};
use planner::notify::Notifier;

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Captures every outgoing message instead of delivering it.
/// Recipients listed in `failing` are reported as failed sends.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<SentEmail>>,
    pub failing: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    pub fn fail_for(&self, recipient: &str) {
        self.failing.lock().unwrap().push(recipient.to_string());
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> bool {
        self.sent.lock().unwrap().push(SentEmail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: html_body.to_string(),
        });
        !self.failing.lock().unwrap().iter().any(|r| r == recipient)
    }
}

pub struct TestApp {
    pub router: Router,
    pub db: Connection,
    pub notifier: Arc<RecordingNotifier>,
    // Keeps the database directory alive for the duration of the test
    _dir: TempDir,
}

/// Creates a test application backed by a fresh database in a
/// temporary directory.
pub async fn test_app() -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("planner.db");
    let db_path = db_path.to_str().unwrap().to_string();

    let db = async_db(&db_path)
        .await
        .expect("Failed to connect to async db");
    db.call(|conn| {
        initialize_db(conn).expect("Failed to migrate db");
        Ok(())
    })
    .await
    .unwrap();

    let config = AppConfig {
        db_path,
        base_url: String::from("http://planner.test"),
        mail: MailConfig {
            smtp_host: String::new(),
            smtp_port: 465,
            sender_address: String::from("planner@example.com"),
            credential: String::new(),
            otp_expiry_minutes: 10,
        },
    };
    let notifier = Arc::new(RecordingNotifier::default());
    let app_state = AppState::new(db.clone(), config, notifier.clone());

    TestApp {
        router: app(Arc::new(app_state)),
        db,
        notifier,
        _dir: dir,
    }
}

impl TestApp {
    /// Insert a confirmed organizer and return their id
    pub async fn organizer(&self, email: &str) -> i64 {
        let email = email.to_string();
        self.db
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO users(email, is_confirmed) VALUES (?1, 1)",
                    [email],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .unwrap()
    }

    pub async fn request(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, organizer: Option<i64>) -> Response<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(id) = organizer {
            builder = builder.header(ORGANIZER_HEADER, id.to_string());
        }
        self.request(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        organizer: Option<i64>,
        body: serde_json::Value,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/json");
        if let Some(id) = organizer {
            builder = builder.header(ORGANIZER_HEADER, id.to_string());
        }
        self.request(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Create an event through the API and return the response JSON
    pub async fn create_event(
        &self,
        organizer: i64,
        start: &str,
        end: &str,
        emails: &[&str],
    ) -> serde_json::Value {
        let response = self
            .post_json(
                "/api/events",
                Some(organizer),
                serde_json::json!({
                    "title": "Team Offsite",
                    "start": start,
                    "end": end,
                    "emails": emails,
                }),
            )
            .await;
        assert_eq!(response.status(), 200);
        body_to_json(response.into_body()).await
    }

    /// Look up an invitee's token directly since the API never exposes it
    pub async fn token_for(&self, email: &str) -> String {
        let email = email.to_string();
        self.db
            .call(move |conn| {
                let token = conn.query_row(
                    "SELECT token FROM invitees WHERE email = ?1 ORDER BY id DESC LIMIT 1",
                    [email],
                    |row| row.get(0),
                )?;
                Ok(token)
            })
            .await
            .unwrap()
    }
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_to_json(body: Body) -> serde_json::Value {
    serde_json::from_str(&body_to_string(body).await).unwrap()
}
