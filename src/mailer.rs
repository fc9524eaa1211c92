/*
 * Digest Daemon
 * Joshua Bassett, 2017
 */

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::MailConfig;
use crate::error::{DeliveryError, Error};

/// Delivers a single message to the configured recipient.
pub trait Mailer {
    fn send(&self, subject: &str, body: &str) -> Result<(), DeliveryError>;
}

/**
 * Sends mail through an SMTP relay using STARTTLS. Each send opens and closes its own session.
 */
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, Error> {
        let from: Mailbox = config.sender.parse()?;
        let to: Mailbox = config.recipient.parse()?;
        let credentials = Credentials::new(config.sender.clone(), config.password.clone());
        let transport = SmtpTransport::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(SmtpMailer { transport, from, to })
    }

    fn message(&self, subject: &str, body: &str) -> Result<Message, DeliveryError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_owned())?;
        Ok(message)
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, subject: &str, body: &str) -> Result<(), DeliveryError> {
        let message = self.message(subject, body)?;
        debug!("Sending {:?} to {}", subject, self.to);
        self.transport.send(&message)?;
        Ok(())
    }
}

impl<M: Mailer + ?Sized> Mailer for &M {
    fn send(&self, subject: &str, body: &str) -> Result<(), DeliveryError> {
        (**self).send(subject, body)
    }
}
