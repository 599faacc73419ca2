use std::time::Duration;

use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::error::MailboxError;

pub const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking lettre transport driven from the tokio blocking pool.
#[derive(Clone)]
pub struct SmtpSender {
    transport: SmtpTransport,
    timeout: Duration,
}

impl SmtpSender {
    /// `implicit_tls` selects SMTPS (usually 465); otherwise STARTTLS is required.
    pub fn new(
        host: &str,
        port: u16,
        implicit_tls: bool,
        username: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<Self, MailboxError> {
        let builder = if implicit_tls {
            SmtpTransport::relay(host)
        } else {
            SmtpTransport::starttls_relay(host)
        }
        .map_err(|e| MailboxError::Connection {
            endpoint: format!("{host}:{port}"),
            message: e.to_string(),
        })?;

        let transport = builder
            .port(port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .timeout(Some(timeout))
            .build();

        Ok(Self { transport, timeout })
    }

    pub async fn send(&self, message: Message) -> Result<(), MailboxError> {
        let transport = self.transport.clone();
        let handle = tokio::task::spawn_blocking(move || transport.send(&message));

        // lettre's socket timeout covers each read; this bounds the whole exchange.
        let outer = self.timeout + Duration::from_secs(5);
        match tokio::time::timeout(outer, handle).await {
            Err(_) => Err(MailboxError::Timeout {
                operation: "smtp send",
                after: outer,
            }),
            Ok(Err(join)) => Err(MailboxError::Send(format!("smtp task failed: {join}"))),
            Ok(Ok(Err(e))) => Err(MailboxError::Send(e.to_string())),
            Ok(Ok(Ok(_response))) => Ok(()),
        }
    }
}
