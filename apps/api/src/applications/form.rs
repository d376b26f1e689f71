//! Decoding and validation of the membership application form.

use std::borrow::Cow;
use std::collections::HashMap;

use axum::extract::Multipart;
use bytes::Bytes;
use tracing::debug;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::errors::AppError;
use crate::models::application::{NewApplication, ResumeUpload};

pub const FIELD_FIRST_NAME: &str = "first-name";
pub const FIELD_LAST_NAME: &str = "last-name";
pub const FIELD_EMAIL: &str = "tamu-email";
pub const FIELD_GPA: &str = "gpa";
pub const FIELD_TRACK: &str = "track";
pub const FIELD_WHY_QUANT: &str = "why-quant";
pub const FIELD_GOALS: &str = "goals";
pub const FIELD_AWARDS: &str = "awards";
pub const FIELD_FUN_FACT: &str = "fun-fact";
pub const FIELD_RESUME: &str = "resume";

const TEXT_FIELDS: &[&str] = &[
    FIELD_FIRST_NAME,
    FIELD_LAST_NAME,
    FIELD_EMAIL,
    FIELD_GPA,
    FIELD_TRACK,
    FIELD_WHY_QUANT,
    FIELD_GOALS,
    FIELD_AWARDS,
    FIELD_FUN_FACT,
];

const MAX_GPA: f64 = 5.0;
const DEFAULT_RESUME_FILENAME: &str = "resume.pdf";

/// Raw form contents: named text fields plus at most one uploaded file.
#[derive(Debug, Default)]
pub struct SubmissionForm {
    fields: HashMap<String, String>,
    pub resume: Option<ResumeUpload>,
}

impl SubmissionForm {
    /// Drains a multipart body. The first occurrence of a repeated field wins;
    /// unknown fields are skipped.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = SubmissionForm::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if name == FIELD_RESUME {
                let filename = field.file_name().map(str::to_owned);
                let content_type = field.content_type().map(str::to_owned);
                let data = field.bytes().await?;
                if form.resume.is_none() {
                    form.resume = resume_from_part(filename, content_type, data);
                }
                continue;
            }

            if !TEXT_FIELDS.contains(&name.as_str()) {
                debug!("Ignoring unknown form field '{name}'");
                continue;
            }

            let value = field.text().await?;
            form.fields.entry(name).or_insert(value);
        }

        Ok(form)
    }

    #[cfg(test)]
    pub fn from_fields(pairs: &[(&str, &str)]) -> Self {
        SubmissionForm {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            resume: None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Checks required fields and formats, producing the record to store.
    ///
    /// Identity fields are trimmed; free-text answers are kept exactly as submitted.
    pub fn validate(self, allowed_tracks: Option<&[String]>) -> Result<NewApplication, AppError> {
        let fields = ApplicationFields::from_form(&self);

        let mut errors = match fields.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if fields.gpa.is_some() && fields.gpa_value.is_none() {
            errors.add("gpa", gpa_error());
        }
        if let (Some(track), Some(allowed)) = (fields.track.as_deref(), allowed_tracks) {
            if let Err(e) = validate_track(track, allowed) {
                errors.add("track", e);
            }
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(first_message(&errors)));
        }

        // Every required field is present past this point.
        Ok(NewApplication {
            first_name: fields.first_name.unwrap_or_default(),
            last_name: fields.last_name.unwrap_or_default(),
            email: fields.email.unwrap_or_default(),
            gpa: format!("{:.2}", fields.gpa_value.unwrap_or_default()),
            track: fields.track.unwrap_or_default(),
            why_quant: self.get(FIELD_WHY_QUANT).unwrap_or_default().to_string(),
            goals: self.get(FIELD_GOALS).unwrap_or_default().to_string(),
            awards: optional_verbatim(&self, FIELD_AWARDS),
            fun_fact: optional_verbatim(&self, FIELD_FUN_FACT),
            resume: self.resume,
        })
    }
}

/// Trimmed view of the form used for rule checks. Blank values are `None`.
#[derive(Debug, Validate)]
struct ApplicationFields {
    #[validate(required, length(max = 100, message = "must be at most 100 characters"))]
    first_name: Option<String>,
    #[validate(required, length(max = 100, message = "must be at most 100 characters"))]
    last_name: Option<String>,
    #[validate(
        required,
        email(message = "must be a valid email address"),
        length(max = 255, message = "must be at most 255 characters")
    )]
    email: Option<String>,
    #[validate(required)]
    gpa: Option<String>,
    #[validate(range(min = 0.0, max = 5.0, message = "must be a number between 0.00 and 5.00"))]
    gpa_value: Option<f64>,
    #[validate(required, length(max = 50, message = "must be at most 50 characters"))]
    track: Option<String>,
    #[validate(required)]
    why_quant: Option<String>,
    #[validate(required)]
    goals: Option<String>,
}

/// Struct field → form field, in the order errors are reported.
const REPORTED_FIELDS: &[(&str, &str)] = &[
    ("first_name", FIELD_FIRST_NAME),
    ("last_name", FIELD_LAST_NAME),
    ("email", FIELD_EMAIL),
    ("gpa", FIELD_GPA),
    ("gpa_value", FIELD_GPA),
    ("track", FIELD_TRACK),
    ("why_quant", FIELD_WHY_QUANT),
    ("goals", FIELD_GOALS),
];

impl ApplicationFields {
    fn from_form(form: &SubmissionForm) -> Self {
        let trimmed = |name: &str| {
            form.get(name)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let gpa = trimmed(FIELD_GPA);

        ApplicationFields {
            first_name: trimmed(FIELD_FIRST_NAME),
            last_name: trimmed(FIELD_LAST_NAME),
            email: trimmed(FIELD_EMAIL),
            gpa_value: gpa
                .as_deref()
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite()),
            gpa,
            track: trimmed(FIELD_TRACK).map(|t| t.to_lowercase()),
            why_quant: trimmed(FIELD_WHY_QUANT),
            goals: trimmed(FIELD_GOALS),
        }
    }
}

fn gpa_error() -> ValidationError {
    let mut error = ValidationError::new("number");
    error.message = Some(Cow::Owned(format!(
        "must be a number between 0.00 and {MAX_GPA:.2}"
    )));
    error
}

/// Rejects a track outside the configured list.
fn validate_track(track: &str, allowed: &[String]) -> Result<(), ValidationError> {
    if allowed.iter().any(|t| t == track) {
        return Ok(());
    }
    let mut error = ValidationError::new("track");
    error.message = Some(Cow::Owned(format!("must be one of: {}", allowed.join(", "))));
    Err(error)
}

/// Renders the first failing field as `"<form field> <message>"`.
fn first_message(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    REPORTED_FIELDS
        .iter()
        .find_map(|(key, name)| {
            let error = field_errors.get(*key)?.first()?;
            Some(match (&*error.code, &error.message) {
                ("required", _) => format!("Missing required field: {name}"),
                (_, Some(message)) => format!("{name} {message}"),
                (code, None) => format!("{name} is invalid ({code})"),
            })
        })
        .unwrap_or_else(|| "Invalid application".to_string())
}

fn optional_verbatim(form: &SubmissionForm, name: &str) -> Option<String> {
    form.get(name)
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

/// Browsers send an empty, unnamed part for an untouched file input; that is no resume.
/// A named file is kept even when it has no bytes.
fn resume_from_part(
    filename: Option<String>,
    content_type: Option<String>,
    data: Bytes,
) -> Option<ResumeUpload> {
    let unnamed = filename.as_deref().map_or(true, |f| f.trim().is_empty());
    if unnamed && data.is_empty() {
        return None;
    }

    let filename = filename
        .as_deref()
        .map(sanitize_filename)
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| DEFAULT_RESUME_FILENAME.to_string());

    let content_type = content_type
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream")
        .unwrap_or_else(|| guess_content_type(&filename).to_string());

    Some(ResumeUpload {
        filename,
        content_type,
        data,
    })
}

/// Keeps the final path component and drops characters that cannot appear
/// inside a quoted header parameter.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(raw);
    base.chars()
        .filter(|c| !c.is_control() && *c != '"')
        .collect::<String>()
        .trim()
        .to_string()
}

fn guess_content_type(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}
