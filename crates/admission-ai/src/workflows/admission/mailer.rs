use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MailConfig;

/// Plain-text status message addressed to one applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mail dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("applicant has no email address on file")]
    MissingRecipient,
    #[error("invalid address '{address}': {detail}")]
    InvalidAddress { address: String, detail: String },
    #[error("mail relay is not configured")]
    NotConfigured,
    #[error("could not build message: {0}")]
    Message(String),
    #[error("mail relay unavailable: {0}")]
    Transport(String),
}

/// Outbound delivery channel used by the notification stage.
pub trait Mailer: Send + Sync {
    fn send(&self, message: &OutboundMessage) -> Result<(), MailError>;
}

impl<T: Mailer + ?Sized> Mailer for Box<T> {
    fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
        (**self).send(message)
    }
}

/// Authenticated SMTP relay. Port 587 negotiates STARTTLS, every other port uses implicit TLS.
pub struct SmtpMailer {
    transport: SmtpTransport,
    sender: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let sender = parse_mailbox(&config.sender)?;

        let builder = if config.port == 587 {
            SmtpTransport::starttls_relay(&config.host)
        } else {
            SmtpTransport::relay(&config.host)
        }
        .map_err(|err| MailError::Transport(err.to_string()))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { transport, sender })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
        let email = Message::builder()
            .from(self.sender.clone())
            .to(parse_mailbox(&message.to)?)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|err| MailError::Message(err.to_string()))?;

        self.transport
            .send(&email)
            .map_err(|err| MailError::Transport(err.to_string()))?;
        debug!(to = %message.to, "relay accepted message");
        Ok(())
    }
}

/// Stand-in used when no relay is configured; every delivery fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledMailer;

impl Mailer for DisabledMailer {
    fn send(&self, _message: &OutboundMessage) -> Result<(), MailError> {
        Err(MailError::NotConfigured)
    }
}

/// Pick the relay for the given configuration.
pub fn mailer_from_config(config: Option<&MailConfig>) -> Result<Box<dyn Mailer>, MailError> {
    match config {
        Some(config) => Ok(Box::new(SmtpMailer::from_config(config)?)),
        None => Ok(Box::new(DisabledMailer)),
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .parse::<Mailbox>()
        .map_err(|err| MailError::InvalidAddress {
            address: address.to_string(),
            detail: err.to_string(),
        })
}
