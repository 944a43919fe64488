//! Digest email: `multipart/alternative` message over authenticated SMTP.

use crate::config::{MailAccount, MailSecurity, MailSettings};
use crate::error::DispatchError;
use crate::models::Article;
use crate::outputs::{html, text};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::fmt;
use std::time::Instant;
use tracing::{info, instrument};

/// Something that can hand a finished message to a mail server.
pub trait DigestTransport {
    async fn deliver(&self, message: Message) -> Result<(), DispatchError>;
}

/// Authenticated SMTP submission, STARTTLS or implicit TLS.
pub struct SmtpRelay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
    port: u16,
}

impl fmt::Debug for SmtpRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpRelay")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

impl SmtpRelay {
    /// Log in as the sending account on the configured relay.
    pub fn new(settings: &MailSettings, account: &MailAccount) -> Result<Self, DispatchError> {
        let builder = match settings.security {
            MailSecurity::Starttls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
            }
            MailSecurity::ImplicitTls => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?,
        };
        let port = settings.port();
        let transport = builder
            .port(port)
            .credentials(Credentials::new(
                account.sender.clone(),
                account.password.clone(),
            ))
            .build();
        Ok(Self {
            transport,
            host: settings.host.clone(),
            port,
        })
    }
}

impl DigestTransport for SmtpRelay {
    #[instrument(level = "info", skip_all, fields(host = %self.host, port = self.port))]
    async fn deliver(&self, message: Message) -> Result<(), DispatchError> {
        let t0 = Instant::now();
        let response = self.transport.send(message).await?;
        info!(
            code = %response.code(),
            elapsed_ms = t0.elapsed().as_millis(),
            "SMTP server accepted message"
        );
        Ok(())
    }
}

/// Assemble the digest message: plain text first, HTML preferred.
pub fn build_message(
    account: &MailAccount,
    subject: &str,
    html_body: String,
    text_body: String,
) -> Result<Message, DispatchError> {
    if account.recipients.is_empty() {
        return Err(DispatchError::NoRecipients);
    }
    let mut builder = Message::builder()
        .from(account.sender.parse::<Mailbox>()?)
        .subject(subject);
    for recipient in &account.recipients {
        builder = builder.to(recipient.parse::<Mailbox>()?);
    }
    Ok(builder.multipart(MultiPart::alternative_plain_html(text_body, html_body))?)
}

/// Render `articles` and send them to every recipient in one message.
///
/// # Arguments
///
/// * `transport` - Where the finished message goes
/// * `account` - Sender address and recipients
/// * `subject` - Subject line
/// * `articles` - The ranked digest
///
/// # Returns
///
/// `Ok(())` once the transport accepts the message. Address, build and
/// SMTP failures come back as [`DispatchError`]; nothing is retried.
#[instrument(level = "info", skip_all, fields(articles = articles.len(), recipients = account.recipients.len()))]
pub async fn dispatch_digest<T: DigestTransport>(
    transport: &T,
    account: &MailAccount,
    subject: &str,
    articles: &[Article],
) -> Result<(), DispatchError> {
    let message = build_message(
        account,
        subject,
        html::render_digest(articles),
        text::render_digest(articles),
    )?;
    transport.deliver(message).await?;
    info!("Digest email sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::article;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        sent: Mutex<Vec<Message>>,
    }

    impl DigestTransport for Recording {
        async fn deliver(&self, message: Message) -> Result<(), DispatchError> {
            self.sent.lock().unwrap().push(message);
            Ok(())
        }
    }

    fn account(recipients: &[&str]) -> MailAccount {
        MailAccount {
            sender: "digest@example.com".into(),
            password: "hunter2".into(),
            recipients: recipients.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn sends_one_alternative_message_to_all_recipients() {
        let transport = Recording::default();
        let articles = [article("Alpha", "https://x/a", Some("2024-01-01"))];

        dispatch_digest(
            &transport,
            &account(&["a@example.com", "b@example.com"]),
            "Your Daily News Digest",
            &articles,
        )
        .await
        .unwrap();

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);

        let to: Vec<String> = sent[0].envelope().to().iter().map(|a| a.to_string()).collect();
        assert_eq!(to, vec!["a@example.com", "b@example.com"]);
        assert_eq!(
            sent[0].envelope().from().map(|a| a.to_string()).as_deref(),
            Some("digest@example.com")
        );

        let raw = String::from_utf8_lossy(&sent[0].formatted()).into_owned();
        assert!(raw.contains("Subject: Your Daily News Digest"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("text/plain"));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn rejects_bad_addresses_and_empty_audience() {
        assert!(matches!(
            build_message(&account(&[]), "s", String::new(), String::new()),
            Err(DispatchError::NoRecipients)
        ));
        assert!(matches!(
            build_message(&account(&["not an address"]), "s", String::new(), String::new()),
            Err(DispatchError::Address(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_relay_is_a_dispatch_error() {
        let settings = MailSettings {
            host: "127.0.0.1".into(),
            port: Some(9),
            ..MailSettings::default()
        };
        let relay = SmtpRelay::new(&settings, &account(&["a@example.com"])).unwrap();
        let result = dispatch_digest(&relay, &account(&["a@example.com"]), "s", &[]).await;
        assert!(matches!(result, Err(DispatchError::Smtp(_))));
    }
}
