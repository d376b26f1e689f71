//! Admin dashboard session.
//!
//! The secret lives only inside an [`AdminSession`] and is resent on every
//! refresh; nothing is written to disk.

pub mod client;
pub mod render;

use tracing::{info, warn};

use crate::models::application::ApplicationRow;

pub use client::{AdminClient, DashboardError};

pub const NO_RESPONSE: &str = "No response provided";
pub const NO_AWARDS: &str = "None listed";

#[derive(Debug, Clone, PartialEq)]
pub enum LoginError {
    /// The server answered 401.
    InvalidSecret,
    /// Anything else went wrong; carries a human-readable cause.
    Unavailable(String),
    /// A refresh was requested without an active session.
    NotLoggedIn,
}

#[derive(Debug)]
pub enum SessionState {
    LoggedOut { error: Option<LoginError> },
    LoggedIn {
        secret: String,
        applications: Vec<ApplicationRow>,
    },
}

pub struct AdminSession {
    client: AdminClient,
    state: SessionState,
}

impl AdminSession {
    pub fn new(client: AdminClient) -> Self {
        Self {
            client,
            state: SessionState::LoggedOut { error: None },
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.state, SessionState::LoggedIn { .. })
    }

    /// Fetches the listing with `secret`; only a successful fetch logs in.
    /// A blank secret is ignored.
    pub async fn login(&mut self, secret: &str) -> Result<(), LoginError> {
        let secret = secret.trim();
        if secret.is_empty() {
            return Ok(());
        }

        match self.client.fetch_applications(secret).await {
            Ok(applications) => {
                info!("Admin login succeeded ({} applications)", applications.len());
                self.state = SessionState::LoggedIn {
                    secret: secret.to_string(),
                    applications,
                };
                Ok(())
            }
            Err(e) => {
                let error = login_error(e);
                self.state = SessionState::LoggedOut {
                    error: Some(error.clone()),
                };
                Err(error)
            }
        }
    }

    /// Re-fetches with the in-memory secret. A 401 ends the session; other
    /// failures keep the current table.
    pub async fn refresh(&mut self) -> Result<(), LoginError> {
        let SessionState::LoggedIn { secret, .. } = &self.state else {
            return Err(LoginError::NotLoggedIn);
        };
        let secret = secret.clone();

        match self.client.fetch_applications(&secret).await {
            Ok(fresh) => {
                if let SessionState::LoggedIn { applications, .. } = &mut self.state {
                    *applications = fresh;
                }
                Ok(())
            }
            Err(DashboardError::Unauthorized) => {
                warn!("Admin secret was rejected on refresh; logging out");
                self.state = SessionState::LoggedOut {
                    error: Some(LoginError::InvalidSecret),
                };
                Err(LoginError::InvalidSecret)
            }
            Err(e) => Err(login_error(e)),
        }
    }

    pub fn logout(&mut self) {
        self.state = SessionState::LoggedOut { error: None };
    }

    pub fn applications(&self) -> &[ApplicationRow] {
        match &self.state {
            SessionState::LoggedIn { applications, .. } => applications,
            SessionState::LoggedOut { .. } => &[],
        }
    }

    /// Detail view for one row of the current table.
    pub fn detail(&self, id: i32) -> Option<ApplicationDetail> {
        self.applications()
            .iter()
            .find(|a| a.id == id)
            .map(ApplicationDetail::from)
    }
}

fn login_error(e: DashboardError) -> LoginError {
    match e {
        DashboardError::Unauthorized => LoginError::InvalidSecret,
        other => {
            warn!("Error fetching applications: {other}");
            LoginError::Unavailable(other.to_string())
        }
    }
}

/// The free-text answers of one application, with placeholders for blanks.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationDetail {
    pub name: String,
    pub track: String,
    pub why_quant: String,
    pub goals: String,
    pub awards: String,
    pub fun_fact: String,
}

impl From<&ApplicationRow> for ApplicationDetail {
    fn from(row: &ApplicationRow) -> Self {
        let or = |value: &Option<String>, placeholder: &str| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .unwrap_or(placeholder)
                .to_string()
        };

        ApplicationDetail {
            name: format!("{} {}", row.first_name, row.last_name),
            track: format!("Applied for: {}", row.track.to_uppercase()),
            why_quant: or(&row.why_quant, NO_RESPONSE),
            goals: or(&row.goals, NO_RESPONSE),
            awards: or(&row.awards, NO_AWARDS),
            fun_fact: or(&row.fun_fact, NO_RESPONSE),
        }
    }
}
