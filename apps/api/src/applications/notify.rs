//! Email notification for new applications.

use askama::Template;
use async_trait::async_trait;
use lettre::address::AddressError;
use lettre::message::header::{ContentType, ContentTypeErr};
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

use crate::config::MailConfig;
use crate::models::application::NewApplication;

const SENDER_NAME: &str = "AggieQuant Application";
const NO_AWARDS: &str = "None listed";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid email address: {0}")]
    Address(#[from] AddressError),

    #[error("invalid attachment content type: {0}")]
    ContentType(#[from] ContentTypeErr),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("failed to render email body: {0}")]
    Template(#[from] askama::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Delivery seam for new-application notifications. Failures are never retried.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, application: &NewApplication) -> Result<(), NotifyError>;
}

/// Sends the notification through an authenticated SMTP relay. The service
/// mailbox is both sender and recipient; replies go to the applicant.
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    service_address: Address,
}

impl SmtpNotifier {
    pub fn new(config: &MailConfig) -> Result<Self, NotifyError> {
        let credentials = Credentials::new(config.user.clone(), config.pass.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            service_address: config.user.parse()?,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, application: &NewApplication) -> Result<(), NotifyError> {
        let message = build_message(&self.service_address, application)?;
        self.mailer.send(message).await?;
        info!("Application email sent for track '{}'", application.track);
        Ok(())
    }
}

#[derive(Template)]
#[template(path = "application_email.html")]
struct ApplicationEmail<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    gpa: &'a str,
    track: &'a str,
    why_quant: &'a str,
    goals: &'a str,
    awards: &'a str,
    fun_fact: &'a str,
    resume_filename: Option<&'a str>,
}

/// Renders the HTML body. Every interpolated value is HTML-escaped.
pub fn render_body(application: &NewApplication) -> Result<String, NotifyError> {
    let template = ApplicationEmail {
        first_name: &application.first_name,
        last_name: &application.last_name,
        email: &application.email,
        gpa: &application.gpa,
        track: &application.track,
        why_quant: &application.why_quant,
        goals: &application.goals,
        awards: application.awards.as_deref().unwrap_or(NO_AWARDS),
        fun_fact: application.fun_fact.as_deref().unwrap_or(""),
        resume_filename: application.resume.as_ref().map(|r| r.filename.as_str()),
    };
    Ok(template.render()?)
}

pub fn subject(application: &NewApplication) -> String {
    format!(
        "New Application: {} - {}",
        application.full_name(),
        application.track.to_uppercase()
    )
}

/// Builds the notification email, attaching the resume when one was uploaded.
pub fn build_message(
    service_address: &Address,
    application: &NewApplication,
) -> Result<Message, NotifyError> {
    let applicant: Address = application.email.parse()?;
    let html = SinglePart::html(render_body(application)?);

    let builder = Message::builder()
        .from(Mailbox::new(
            Some(SENDER_NAME.to_string()),
            service_address.clone(),
        ))
        .to(Mailbox::new(None, service_address.clone()))
        .reply_to(Mailbox::new(Some(application.full_name()), applicant))
        .subject(subject(application));

    let message = match &application.resume {
        Some(resume) => {
            let content_type = ContentType::parse(&resume.content_type)
                .or_else(|_| ContentType::parse("application/octet-stream"))?;
            let attachment =
                Attachment::new(resume.filename.clone()).body(resume.data.to_vec(), content_type);
            builder.multipart(MultiPart::mixed().singlepart(html).singlepart(attachment))?
        }
        None => builder.singlepart(html)?,
    };

    Ok(message)
}
