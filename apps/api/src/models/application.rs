use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One stored application as returned by the admin listing.
/// `gpa` is the decimal column rendered as text so no precision is lost.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct ApplicationRow {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gpa: String,
    pub track: String,
    pub why_quant: Option<String>,
    pub goals: Option<String>,
    pub awards: Option<String>,
    pub fun_fact: Option<String>,
    pub resume_filename: Option<String>,
    pub has_resume: bool,
    pub created_at: DateTime<Utc>,
}

/// A validated submission, ready to be persisted and emailed.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Normalized to two decimal places, e.g. `"3.85"`.
    pub gpa: String,
    /// Lower-cased.
    pub track: String,
    pub why_quant: String,
    pub goals: String,
    pub awards: Option<String>,
    pub fun_fact: Option<String>,
    pub resume: Option<ResumeUpload>,
}

impl NewApplication {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The uploaded resume file, held in memory for the lifetime of the request.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// A resume read back from the database.
#[derive(Debug, Clone)]
pub struct StoredResume {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}
