use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::applications::notify::{Notifier, SmtpNotifier};
use crate::applications::store::{ApplicationStore, PgApplicationStore};
use crate::config::Config;
use crate::db::create_pool;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Present when `DATABASE_URL` is set.
    pub store: Option<Arc<dyn ApplicationStore>>,
    /// Present when `EMAIL_USER` and `EMAIL_PASS` are set.
    pub notifier: Option<Arc<dyn Notifier>>,
}

impl AppState {
    /// Enables each pipeline stage whose configuration is present.
    pub fn from_config(config: Config) -> Result<Self> {
        let store: Option<Arc<dyn ApplicationStore>> = match &config.database_url {
            Some(url) => {
                let pool = create_pool(url)?;
                Some(Arc::new(PgApplicationStore::new(pool)))
            }
            None => {
                warn!("DATABASE_URL is not set; applications will not be stored");
                None
            }
        };

        let notifier: Option<Arc<dyn Notifier>> = match &config.mail {
            Some(mail) => {
                let notifier = SmtpNotifier::new(mail)?;
                info!("SMTP notifier configured via {}", mail.smtp_host);
                Some(Arc::new(notifier))
            }
            None => {
                warn!("EMAIL_USER/EMAIL_PASS are not set; application emails are disabled");
                None
            }
        };

        if config.admin_secret.is_none() {
            warn!("ADMIN_SECRET is not set; the admin listing will reject every request");
        }

        Ok(AppState {
            config,
            store,
            notifier,
        })
    }
}
