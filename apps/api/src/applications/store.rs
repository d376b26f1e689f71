//! Persistence of submitted applications in the `applications` table.
//!
//! Rows are append-only: there is no update or delete path.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use sqlx::PgPool;
use tokio::sync::OnceCell;
use tracing::info;

use crate::models::application::{ApplicationRow, NewApplication, StoredResume};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS applications (
    id SERIAL PRIMARY KEY,
    first_name VARCHAR(100) NOT NULL,
    last_name VARCHAR(100) NOT NULL,
    email VARCHAR(255) NOT NULL,
    gpa NUMERIC(4, 2) NOT NULL,
    track VARCHAR(50) NOT NULL,
    why_quant TEXT NOT NULL,
    goals TEXT NOT NULL,
    awards TEXT,
    fun_fact TEXT,
    resume_filename TEXT,
    resume_content_type TEXT,
    resume_data TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

/// Tables created before resumes were stored lack these columns.
const ADD_RESUME_COLUMNS: &[&str] = &[
    "ALTER TABLE applications ADD COLUMN IF NOT EXISTS resume_filename TEXT",
    "ALTER TABLE applications ADD COLUMN IF NOT EXISTS resume_content_type TEXT",
    "ALTER TABLE applications ADD COLUMN IF NOT EXISTS resume_data TEXT",
];

/// Storage seam for the submission and admin handlers.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Inserts one application and returns its id.
    async fn insert(&self, application: &NewApplication) -> Result<i32, sqlx::Error>;

    /// All applications, newest first.
    async fn list(&self) -> Result<Vec<ApplicationRow>, sqlx::Error>;

    /// The stored resume of one application, if both exist.
    async fn resume(&self, id: i32) -> Result<Option<StoredResume>, sqlx::Error>;
}

/// PostgreSQL-backed store. The schema is ensured lazily on first use.
pub struct PgApplicationStore {
    pool: PgPool,
    schema_ready: OnceCell<()>,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            schema_ready: OnceCell::new(),
        }
    }

    /// Idempotent. Runs the DDL at most once per process after it first succeeds.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        self.schema_ready
            .get_or_try_init(|| create_schema(&self.pool))
            .await
            .map(|_| ())
    }
}

/// Creates the `applications` table if absent and adds any missing resume columns.
pub async fn create_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_TABLE).execute(pool).await?;
    for statement in ADD_RESUME_COLUMNS {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Ensured applications table exists");
    Ok(())
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn insert(&self, application: &NewApplication) -> Result<i32, sqlx::Error> {
        self.ensure_schema().await?;

        let resume = application.resume.as_ref();
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO applications
                (first_name, last_name, email, gpa, track, why_quant, goals,
                 awards, fun_fact, resume_filename, resume_content_type, resume_data)
            VALUES ($1, $2, $3, CAST($4 AS NUMERIC), $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
        )
        .bind(&application.first_name)
        .bind(&application.last_name)
        .bind(&application.email)
        .bind(&application.gpa)
        .bind(&application.track)
        .bind(&application.why_quant)
        .bind(&application.goals)
        .bind(application.awards.as_deref())
        .bind(application.fun_fact.as_deref())
        .bind(resume.map(|r| r.filename.as_str()))
        .bind(resume.map(|r| r.content_type.as_str()))
        .bind(resume.map(|r| STANDARD.encode(&r.data)))
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list(&self) -> Result<Vec<ApplicationRow>, sqlx::Error> {
        self.ensure_schema().await?;

        // Legacy rows may hold NULLs and a zone-less timestamp; normalize both here.
        sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT id,
                   COALESCE(first_name, '') AS first_name,
                   COALESCE(last_name, '') AS last_name,
                   COALESCE(email, '') AS email,
                   COALESCE(gpa::TEXT, '') AS gpa,
                   COALESCE(track, '') AS track,
                   why_quant,
                   goals,
                   awards,
                   fun_fact,
                   resume_filename,
                   (resume_data IS NOT NULL) AS has_resume,
                   created_at::TIMESTAMPTZ AS created_at
            FROM applications
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn resume(&self, id: i32) -> Result<Option<StoredResume>, sqlx::Error> {
        self.ensure_schema().await?;

        let row: Option<(Option<String>, Option<String>, Option<String>)> = sqlx::query_as(
            "SELECT resume_filename, resume_content_type, resume_data FROM applications WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some((filename, content_type, Some(encoded))) = row else {
            return Ok(None);
        };

        let data = STANDARD
            .decode(encoded)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(Some(StoredResume {
            filename: filename.unwrap_or_else(|| "resume.pdf".to_string()),
            content_type: content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
            data,
        }))
    }
}
