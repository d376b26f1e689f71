//! In-memory doubles and request builders shared by the router tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
};
use chrono::Utc;
use serde::de::DeserializeOwned;

use crate::applications::notify::{Notifier, NotifyError};
use crate::applications::store::ApplicationStore;
use crate::config::Config;
use crate::models::application::{ApplicationRow, NewApplication, StoredResume};
use crate::routes::build_router;
use crate::state::AppState;

pub const BOUNDARY: &str = "aggiequant-test-boundary";

type StoredRow = (ApplicationRow, Option<StoredResume>);

#[derive(Clone, Default)]
pub struct MemoryStore {
    rows: Arc<Mutex<Vec<StoredRow>>>,
    fail: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails like an unreachable database.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Rows in insertion order.
    pub fn rows(&self) -> Vec<ApplicationRow> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .map(|(row, _)| row.clone())
            .collect()
    }

    fn check(&self) -> Result<(), sqlx::Error> {
        if self.fail {
            Err(sqlx::Error::PoolTimedOut)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn insert(&self, application: &NewApplication) -> Result<i32, sqlx::Error> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i32 + 1;
        let resume = application.resume.as_ref().map(|r| StoredResume {
            filename: r.filename.clone(),
            content_type: r.content_type.clone(),
            data: r.data.to_vec(),
        });
        let row = ApplicationRow {
            id,
            first_name: application.first_name.clone(),
            last_name: application.last_name.clone(),
            email: application.email.clone(),
            gpa: application.gpa.clone(),
            track: application.track.clone(),
            why_quant: Some(application.why_quant.clone()),
            goals: Some(application.goals.clone()),
            awards: application.awards.clone(),
            fun_fact: application.fun_fact.clone(),
            resume_filename: resume.as_ref().map(|r| r.filename.clone()),
            has_resume: resume.is_some(),
            created_at: Utc::now(),
        };
        rows.push((row, resume));
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<ApplicationRow>, sqlx::Error> {
        self.check()?;
        let mut rows = self.rows();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn resume(&self, id: i32) -> Result<Option<StoredResume>, sqlx::Error> {
        self.check()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|(row, _)| row.id == id)
            .and_then(|(_, resume)| resume.clone()))
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<NewApplication>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<NewApplication> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, application: &NewApplication) -> Result<(), NotifyError> {
        if self.fail {
            let err = "relay-rejected".parse::<lettre::Address>().unwrap_err();
            return Err(NotifyError::Address(err));
        }
        self.sent.lock().unwrap().push(application.clone());
        Ok(())
    }
}

pub fn test_state(
    store: Option<MemoryStore>,
    notifier: Option<RecordingNotifier>,
    admin_secret: Option<&str>,
) -> AppState {
    let mut config = Config::from_lookup(|_| None).unwrap();
    config.admin_secret = admin_secret.map(str::to_string);
    AppState {
        config,
        store: store.map(|s| Arc::new(s) as Arc<dyn ApplicationStore>),
        notifier: notifier.map(|n| Arc::new(n) as Arc<dyn Notifier>),
    }
}

pub fn valid_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("first-name", "Ada"),
        ("last-name", "Lovelace"),
        ("tamu-email", "ada@tamu.edu"),
        ("gpa", "3.85"),
        ("track", "quant"),
        ("why-quant", "I like turning noisy data into decisions."),
        ("goals", "Build and backtest a first strategy."),
    ]
}

/// Builds a `multipart/form-data` POST. `resume` is `(filename, content type, bytes)`.
pub fn multipart_request(
    uri: &str,
    fields: &[(&str, &str)],
    resume: Option<(&str, &str, &[u8])>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, content_type, data)) = resume {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Serves the router on an ephemeral local port for HTTP-client tests.
pub async fn spawn_server(state: AppState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });
    addr
}
