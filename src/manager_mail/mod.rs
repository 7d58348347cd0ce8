pub mod errors;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use crate::config::MailParameters;
use crate::manager_mail::errors::MailError;

pub struct Mail {
    mailer: SmtpTransport,
    from: Mailbox,
    to: Mailbox,
}

impl Mail {
    /// Returns a new instance of the Mail struct
    ///
    /// # Arguments
    ///
    /// * 'config' - smtp relay, credentials and addresses
    pub fn new(config: &MailParameters) -> Result<Self, MailError> {
        let credentials = Credentials::new(config.smtp_user.to_string(), config.smtp_password.to_string());
        let mailer = SmtpTransport::relay(&config.smtp_endpoint)?
            .credentials(credentials)
            .build();

        Ok(
            Self {
                mailer,
                from: config.from.parse::<Mailbox>()?,
                to: config.to.parse::<Mailbox>()?,
            }
        )
    }

    /// Sends a plain text mail with the given subject and body
    ///
    /// # Arguments
    ///
    /// * 'subject' - the subject of the mail
    /// * 'body' - the body of the mail
    pub fn send_mail(&self, subject: String, body: String) -> Result<(), MailError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        let _ = self.mailer.send(&email)?;

        Ok(())
    }
}
