//! Remote mail store: search, fetch, flag and send.
//!
//! The agent only ever sees [`Mailbox`]. The production implementation
//! pairs a hand-rolled IMAP4rev1 session over TLS with lettre for SMTP.

mod gateway;
mod imap;
mod smtp;

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::error::MailboxError;
use crate::mail::OutboundReply;

pub use gateway::{ImapSmtpMailbox, MailboxSettings};
pub use imap::{IMAP_COMMAND_TIMEOUT, ImapSession, connect_tls};
pub use smtp::{SMTP_TIMEOUT, SmtpSender};

/// Opaque server-side reference to one message (an IMAP UID).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageHandle(pub String);

impl MessageHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait Mailbox: Send {
    /// Handles of every unseen message, oldest first.
    fn search_unseen(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<MessageHandle>, MailboxError>> + Send + '_>>;

    /// Raw RFC 5322 bytes. Fetching does not set `\Seen`.
    fn fetch<'a>(
        &'a mut self,
        handle: &'a MessageHandle,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, MailboxError>> + Send + 'a>>;

    fn mark_seen<'a>(
        &'a mut self,
        handle: &'a MessageHandle,
    ) -> Pin<Box<dyn Future<Output = Result<(), MailboxError>> + Send + 'a>>;

    fn send<'a>(
        &'a mut self,
        reply: &'a OutboundReply,
    ) -> Pin<Box<dyn Future<Output = Result<(), MailboxError>> + Send + 'a>>;

    /// Release any open session. Called once at the end of every cycle.
    fn close(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async {})
    }
}
