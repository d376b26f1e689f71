use anyhow::{Context, Result};

const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
///
/// Every integration is optional: a missing `DATABASE_URL` disables persistence
/// and listing, missing mail credentials disable notification. Only malformed
/// values are startup errors.
#[derive(Debug, Clone)]
pub struct Config {
    pub admin_secret: Option<String>,
    pub database_url: Option<String>,
    pub mail: Option<MailConfig>,
    /// Lower-cased allowed tracks. `None` accepts any track.
    pub allowed_tracks: Option<Vec<String>>,
    pub static_dir: String,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

/// SMTP credentials. The authenticated user is also the sender and recipient.
#[derive(Clone)]
pub struct MailConfig {
    pub user: String,
    pub pass: String,
    pub smtp_host: String,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .field("smtp_host", &self.smtp_host)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mail = match (get("EMAIL_USER"), get("EMAIL_PASS")) {
            (Some(user), Some(pass)) => Some(MailConfig {
                user,
                pass,
                smtp_host: get("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            }),
            _ => None,
        };

        let allowed_tracks = get("APPLICATION_TRACKS").map(|raw| {
            raw.split(',')
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
        });

        Ok(Config {
            admin_secret: get("ADMIN_SECRET"),
            database_url: get("DATABASE_URL"),
            mail,
            allowed_tracks,
            static_dir: get("STATIC_DIR").unwrap_or_else(|| "public".to_string()),
            max_upload_bytes: match get("MAX_UPLOAD_BYTES") {
                Some(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert!(config.admin_secret.is_none());
        assert!(config.database_url.is_none());
        assert!(config.mail.is_none());
        assert!(config.allowed_tracks.is_none());
        assert_eq!(config.port, 8080);
        assert_eq!(config.static_dir, "public");
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_mail_requires_both_credentials() {
        let config = config_from(&[("EMAIL_USER", "club@example.com")]).unwrap();
        assert!(config.mail.is_none());

        let config = config_from(&[
            ("EMAIL_USER", "club@example.com"),
            ("EMAIL_PASS", "app-password"),
        ])
        .unwrap();
        let mail = config.mail.unwrap();
        assert_eq!(mail.user, "club@example.com");
        assert_eq!(mail.smtp_host, "smtp.gmail.com");
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let config = config_from(&[("ADMIN_SECRET", ""), ("DATABASE_URL", "  ")]).unwrap();
        assert!(config.admin_secret.is_none());
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_tracks_are_normalized() {
        let config = config_from(&[("APPLICATION_TRACKS", " Quant, Dev ,,research")]).unwrap();
        assert_eq!(
            config.allowed_tracks.unwrap(),
            vec!["quant".to_string(), "dev".to_string(), "research".to_string()]
        );
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        assert!(config_from(&[("PORT", "not-a-port")]).is_err());
    }

    #[test]
    fn test_debug_redacts_mail_password() {
        let config = config_from(&[
            ("EMAIL_USER", "club@example.com"),
            ("EMAIL_PASS", "hunter2"),
        ])
        .unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
    }
}
