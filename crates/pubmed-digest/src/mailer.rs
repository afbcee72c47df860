//! Digest delivery.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::info;

use crate::config::SmtpConfig;
use crate::error::MailError;
use crate::formatters::Digest;

/// Delivers a composed digest to one address.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send `digest` to `to`.
    async fn send(&self, to: &str, digest: &Digest) -> Result<(), MailError>;
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|source| MailError::Address {
        address: address.to_string(),
        source,
    })
}

/// Assemble the multipart HTML message for a digest.
pub fn build_message(from: &str, to: &str, digest: &Digest) -> Result<Message, MailError> {
    let message = Message::builder()
        .from(mailbox(from)?)
        .to(mailbox(to)?)
        .subject(digest.subject.clone())
        .multipart(MultiPart::mixed().singlepart(SinglePart::html(digest.html.clone())))?;
    Ok(message)
}

/// SMTP delivery over implicit TLS, one session per digest.
#[derive(Clone)]
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    /// Create a mailer; credentials are checked when sending.
    #[must_use]
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, digest: &Digest) -> Result<(), MailError> {
        let (Some(sender), Some(password)) =
            (&self.config.sender_email, &self.config.sender_password)
        else {
            return Err(MailError::MissingCredentials);
        };

        let message = build_message(sender, to, digest)?;

        info!(server = %self.config.server, port = self.config.port, "Connecting to mail server");
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.server)?
            .port(self.config.port)
            .credentials(Credentials::new(sender.clone(), password.clone()))
            .build();

        transport.send(message).await?;
        Ok(())
    }
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("server", &self.config.server)
            .field("port", &self.config.port)
            .finish()
    }
}

/// Writes digests to standard output instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunMailer;

/// Write a digest as a plain-text envelope followed by its HTML body.
pub async fn write_digest<W>(out: &mut W, to: &str, digest: &Digest) -> Result<(), MailError>
where
    W: AsyncWrite + Unpin + Send,
{
    let rendered = format!("To: {to}\nSubject: {}\n\n{}\n", digest.subject, digest.html);
    out.write_all(rendered.as_bytes()).await?;
    out.flush().await?;
    Ok(())
}

#[async_trait]
impl Mailer for DryRunMailer {
    async fn send(&self, to: &str, digest: &Digest) -> Result<(), MailError> {
        write_digest(&mut tokio::io::stdout(), to, digest).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest() -> Digest {
        Digest {
            subject: "PubMed daily digest: 2 papers (2025-11-24)".to_string(),
            html: "<h2>hello</h2>".to_string(),
            paper_count: 2,
        }
    }

    #[test]
    fn test_build_message() {
        let message = build_message("bot@example.com", "reader@example.org", &digest()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: reader@example.org"));
        assert!(raw.contains("From: bot@example.com"));
        assert!(raw.contains("Subject: PubMed daily digest: 2 papers (2025-11-24)"));
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn test_build_message_rejects_bad_address() {
        let err = build_message("bot@example.com", "not an address", &digest()).unwrap_err();
        assert!(matches!(err, MailError::Address { .. }));
        assert!(err.to_string().contains("not an address"));
    }

    #[tokio::test]
    async fn test_smtp_mailer_requires_credentials() {
        let mailer = SmtpMailer::new(SmtpConfig::default());
        let err = mailer.send("reader@example.org", &digest()).await.unwrap_err();
        assert!(matches!(err, MailError::MissingCredentials));
    }

    /// Writer whose every write fails, like a closed pipe.
    struct ClosedPipe;

    impl AsyncWrite for ClosedPipe {
        fn poll_write(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &[u8],
        ) -> std::task::Poll<std::io::Result<usize>> {
            std::task::Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_dry_run_mailer_succeeds() {
        assert!(DryRunMailer.send("reader@example.org", &digest()).await.is_ok());
    }

    #[tokio::test]
    async fn test_write_digest_renders_envelope() {
        let mut out: Vec<u8> = Vec::new();
        write_digest(&mut out, "reader@example.org", &digest()).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("To: reader@example.org\nSubject: PubMed daily digest"));
        assert!(text.contains("<h2>hello</h2>"));
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let err = write_digest(&mut ClosedPipe, "reader@example.org", &digest())
            .await
            .unwrap_err();
        assert!(matches!(err, MailError::Output(_)));
    }
}
