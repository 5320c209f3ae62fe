//! SMTP adapter: Implementation of `EstimateMailer` using lettre.
//!
//! # Secrets
//!
//! Connection details come from the environment; the password never does in
//! release builds. Precedence (highest first):
//!
//! - `PREMIUMCAST_SMTP_PASSWORD_FILE` (read from a file path)
//! - `/run/secrets/premiumcast_smtp_password` (Docker/Compose secret default)
//! - `PREMIUMCAST_SMTP_PASSWORD` (debug builds only)

use std::path::Path;

use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use zeroize::Zeroizing;

use crate::ports::{EstimateEmail, EstimateMailer};

const SMTP_HOST_ENV: &str = "PREMIUMCAST_SMTP_HOST";
const SMTP_PORT_ENV: &str = "PREMIUMCAST_SMTP_PORT";
const SMTP_USERNAME_ENV: &str = "PREMIUMCAST_SMTP_USERNAME";
const SMTP_FROM_ENV: &str = "PREMIUMCAST_SMTP_FROM";
const SMTP_PASSWORD_FILE_ENV: &str = "PREMIUMCAST_SMTP_PASSWORD_FILE";
const SMTP_PASSWORD_DOCKER_SECRET_PATH: &str = "/run/secrets/premiumcast_smtp_password";

// Dev-only escape hatch for local runs.
const SMTP_PASSWORD_ENV_DEV: &str = "PREMIUMCAST_SMTP_PASSWORD";

const DEFAULT_SMTP_PORT: u16 = 587;

/// Error type for mail operations.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("SMTP setting {0} is not set")]
    MissingSetting(&'static str),

    #[error("Invalid SMTP setting {0}: {1}")]
    InvalidSetting(&'static str, String),

    #[error(
        "Missing SMTP password: provide PREMIUMCAST_SMTP_PASSWORD_FILE (or mount /run/secrets/premiumcast_smtp_password)"
    )]
    MissingPassword,

    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build email: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Failed to read SMTP password: {0}")]
    Io(#[from] std::io::Error),
}

/// SMTP connection settings (password excluded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub from: String,
}

impl SmtpSettings {
    /// Read settings through `lookup` (normally `std::env::var`).
    ///
    /// # Errors
    /// Returns error if a required setting is missing or malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MailError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(MailError::MissingSetting(name))
        };

        let port = match lookup(SMTP_PORT_ENV) {
            Some(p) => p
                .trim()
                .parse()
                .map_err(|_| MailError::InvalidSetting(SMTP_PORT_ENV, p.clone()))?,
            None => DEFAULT_SMTP_PORT,
        };

        Ok(Self {
            host: required(SMTP_HOST_ENV)?,
            port,
            username: required(SMTP_USERNAME_ENV)?,
            from: required(SMTP_FROM_ENV)?,
        })
    }

    /// Read settings from the process environment.
    ///
    /// # Errors
    /// Returns error if a required setting is missing or malformed.
    pub fn from_env() -> Result<Self, MailError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

fn read_secret_file(path: &Path) -> Result<Zeroizing<String>, MailError> {
    let content = Zeroizing::new(std::fs::read_to_string(path)?);
    let secret = content.trim_end_matches(['\n', '\r']).to_string();
    if secret.is_empty() {
        return Err(MailError::MissingPassword);
    }
    Ok(Zeroizing::new(secret))
}

/// Get the SMTP password from a secure source.
///
/// In release builds, environment variables are not accepted for secrets.
fn smtp_password() -> Result<Zeroizing<String>, MailError> {
    if let Ok(path) = std::env::var(SMTP_PASSWORD_FILE_ENV) {
        return read_secret_file(Path::new(path.trim()));
    }

    if Path::new(SMTP_PASSWORD_DOCKER_SECRET_PATH).exists() {
        return read_secret_file(Path::new(SMTP_PASSWORD_DOCKER_SECRET_PATH));
    }

    if cfg!(debug_assertions) {
        if let Ok(v) = std::env::var(SMTP_PASSWORD_ENV_DEV) {
            let secret = v.trim_end_matches(['\n', '\r']).to_string();
            if !secret.is_empty() {
                return Ok(Zeroizing::new(secret));
            }
        }
    }

    Err(MailError::MissingPassword)
}

/// Build the message lettre will send.
///
/// # Errors
/// Returns error if either address is invalid.
pub fn build_message(from: &str, message: &EstimateEmail) -> Result<Message, MailError> {
    let from: Mailbox = from.parse()?;
    let to: Mailbox = message.to.trim().parse()?;

    Ok(Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(message.body.clone())?)
}

/// Blocking SMTP mailer (STARTTLS relay).
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: String,
}

impl SmtpMailer {
    /// Create a mailer from settings and the secret password source.
    ///
    /// # Errors
    /// Returns error if the password is unavailable or the relay is invalid.
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let password = smtp_password()?;
        let creds = Credentials::new(settings.username.clone(), password.to_string());

        let transport = SmtpTransport::starttls_relay(&settings.host)?
            .port(settings.port)
            .credentials(creds)
            .build();

        tracing::info!(
            "SMTP mailer configured for {}:{}",
            settings.host,
            settings.port
        );

        Ok(Self {
            transport,
            from: settings.from.clone(),
        })
    }
}

impl EstimateMailer for SmtpMailer {
    type Error = MailError;

    fn send(&self, message: &EstimateEmail) -> Result<(), MailError> {
        let email = build_message(&self.from, message)?;
        self.transport.send(&email)?;
        tracing::info!("Estimate email delivered");
        Ok(())
    }
}
