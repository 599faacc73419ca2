use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;

use super::imap::{ImapSession, connect_tls};
use super::smtp::SmtpSender;
use super::{Mailbox, MessageHandle};
use crate::error::MailboxError;
use crate::mail::OutboundReply;

/// Connection details for both halves of the gateway.
#[derive(Debug, Clone)]
pub struct MailboxSettings {
    pub imap_host: String,
    pub imap_port: u16,
    pub imap_folder: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_tls: bool,
    pub username: String,
    pub password: String,
    pub imap_timeout: Duration,
    pub smtp_timeout: Duration,
}

type TlsSession = ImapSession<TlsStream<TcpStream>>;

/// IMAP for intake, SMTP for dispatch. The IMAP session is opened lazily on
/// the first search of a cycle and dropped by [`Mailbox::close`].
pub struct ImapSmtpMailbox {
    settings: MailboxSettings,
    session: Option<TlsSession>,
    smtp: SmtpSender,
}

impl ImapSmtpMailbox {
    pub fn new(settings: MailboxSettings) -> Result<Self, MailboxError> {
        let smtp = SmtpSender::new(
            &settings.smtp_host,
            settings.smtp_port,
            settings.smtp_tls,
            &settings.username,
            &settings.password,
            settings.smtp_timeout,
        )?;
        Ok(Self {
            settings,
            session: None,
            smtp,
        })
    }

    async fn open(&self) -> Result<TlsSession, MailboxError> {
        let s = &self.settings;
        let mut session = connect_tls(&s.imap_host, s.imap_port, s.imap_timeout).await?;
        session.login(&s.username, &s.password).await?;
        session.select(&s.imap_folder).await?;
        tracing::debug!(host = %s.imap_host, folder = %s.imap_folder, "IMAP session ready");
        Ok(session)
    }

    async fn session(&mut self) -> Result<&mut TlsSession, MailboxError> {
        if self.session.is_none() {
            self.session = Some(self.open().await?);
        }
        self.session
            .as_mut()
            .ok_or_else(|| MailboxError::Protocol("IMAP session unavailable".into()))
    }

    /// A broken connection poisons the session; the next call reconnects.
    fn observe<T>(&mut self, result: Result<T, MailboxError>) -> Result<T, MailboxError> {
        if let Err(e) = &result
            && e.is_connection_level()
        {
            self.session = None;
        }
        result
    }
}

impl Mailbox for ImapSmtpMailbox {
    fn search_unseen(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<MessageHandle>, MailboxError>> + Send + '_>> {
        Box::pin(async move {
            let result = match self.session().await {
                Ok(session) => session.search_unseen().await,
                Err(e) => Err(e),
            };
            let uids = self.observe(result)?;
            Ok(uids.into_iter().map(MessageHandle).collect())
        })
    }

    fn fetch<'a>(
        &'a mut self,
        handle: &'a MessageHandle,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, MailboxError>> + Send + 'a>> {
        Box::pin(async move {
            let result = match self.session().await {
                Ok(session) => session.fetch_message(handle.as_str()).await,
                Err(e) => Err(e),
            };
            self.observe(result)
        })
    }

    fn mark_seen<'a>(
        &'a mut self,
        handle: &'a MessageHandle,
    ) -> Pin<Box<dyn Future<Output = Result<(), MailboxError>> + Send + 'a>> {
        Box::pin(async move {
            let result = match self.session().await {
                Ok(session) => session.mark_seen(handle.as_str()).await,
                Err(e) => Err(e),
            };
            self.observe(result)
        })
    }

    fn send<'a>(
        &'a mut self,
        reply: &'a OutboundReply,
    ) -> Pin<Box<dyn Future<Output = Result<(), MailboxError>> + Send + 'a>> {
        Box::pin(async move {
            let message = reply.to_message()?;
            self.smtp.send(message).await
        })
    }

    fn close(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            if let Some(mut session) = self.session.take()
                && let Err(e) = session.logout().await
            {
                tracing::debug!(error = %e, "IMAP logout failed");
            }
        })
    }
}
