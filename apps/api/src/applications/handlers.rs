//! Axum route handlers for application submission and the admin listing.

use axum::{
    extract::{multipart::MultipartRejection, rejection::PathRejection, Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info, warn};

use crate::applications::auth::AdminAuth;
use crate::applications::form::SubmissionForm;
use crate::errors::AppError;
use crate::models::application::ApplicationRow;
use crate::state::AppState;

pub const SUCCESS_REDIRECT: &str = "/index.html?success=true";

/// POST /api/submit
///
/// Parse → store (if configured) → email (if configured) → 302.
/// A storage failure is tolerated only while the email stage can still
/// deliver the application; there is no rollback between the two stages.
pub async fn handle_submit(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    if state.store.is_none() && state.notifier.is_none() {
        return Err(AppError::Config(
            "Server configuration error. Contact admin.",
        ));
    }

    let form = SubmissionForm::from_multipart(multipart?).await?;
    let application = form.validate(state.config.allowed_tracks.as_deref())?;
    info!(
        track = %application.track,
        has_resume = application.resume.is_some(),
        "Application received"
    );

    match &state.store {
        Some(store) => match store.insert(&application).await {
            Ok(id) => info!(application_id = id, "Application stored"),
            Err(e) if state.notifier.is_some() => {
                error!("Failed to store application, delivering by email only: {e}");
            }
            Err(e) => return Err(AppError::database("Failed to save application")(e)),
        },
        None => warn!("Skipping persistence: no database configured"),
    }

    match &state.notifier {
        Some(notifier) => notifier.send(&application).await?,
        None => warn!("Skipping email notification: no mail credentials configured"),
    }

    Ok((StatusCode::FOUND, [(header::LOCATION, SUCCESS_REDIRECT)]).into_response())
}

/// GET /api/applications
pub async fn handle_list_applications(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<ApplicationRow>>, AppError> {
    let store = state
        .store
        .as_ref()
        .ok_or(AppError::Config("Database is not configured."))?;

    let rows = store
        .list()
        .await
        .map_err(AppError::database("Failed to fetch applications"))?;

    Ok(Json(rows))
}

/// GET /api/applications/:id/resume
pub async fn handle_get_resume(
    _admin: AdminAuth,
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(id) = id.map_err(|e| {
        warn!("Rejected resume path: {e}");
        AppError::Validation("Application id must be an integer".to_string())
    })?;

    let store = state
        .store
        .as_ref()
        .ok_or(AppError::Config("Database is not configured."))?;

    let resume = store
        .resume(id)
        .await
        .map_err(AppError::database("Failed to fetch resume"))?
        .ok_or_else(|| AppError::NotFound(format!("No resume stored for application {id}")))?;

    let content_type = HeaderValue::from_str(&resume.content_type)
        .unwrap_or(HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        ascii_filename(&resume.filename)
    ))
    .unwrap_or(HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        resume.data,
    )
        .into_response())
}

/// Fallback for unsupported methods on the API routes.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

fn ascii_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_graphic() || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .filter(|c| *c != '"' && *c != '\\')
        .collect()
}
