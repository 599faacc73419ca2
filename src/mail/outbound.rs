use lettre::Message;
use lettre::message::Mailbox;
use lettre::message::header::{ContentType, Header, HeaderName, HeaderValue};

use super::InboundMessage;
use crate::error::MailboxError;
use crate::persona::Persona;

/// Subject used when the original message carried none.
pub const NO_SUBJECT: &str = "(no subject)";

type HeaderParseError = Box<dyn std::error::Error + Send + Sync>;

macro_rules! raw_header {
    ($ty:ident, $name:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $ty(String);

        impl Header for $ty {
            fn name() -> HeaderName {
                HeaderName::new_from_ascii_str($name)
            }

            fn parse(s: &str) -> Result<Self, HeaderParseError> {
                Ok(Self(s.trim().to_string()))
            }

            fn display(&self) -> HeaderValue {
                HeaderValue::new(Self::name(), self.0.clone())
            }
        }
    };
}

raw_header!(AutoSubmitted, "Auto-Submitted");
raw_header!(AutoResponseSuppress, "X-Auto-Response-Suppress");
raw_header!(Precedence, "Precedence");

/// Values written on every outbound reply so that mail systems, including
/// this agent's own filter, treat it as non-interactive.
pub const AUTO_SUBMITTED_VALUE: &str = "auto-replied";
pub const AUTO_RESPONSE_SUPPRESS_VALUE: &str = "All";
pub const PRECEDENCE_VALUE: &str = "bulk";

/// A reply ready to be handed to the mailbox gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundReply {
    pub from_name: String,
    pub from_address: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    /// Fresh id without angle brackets.
    pub message_id: String,
    /// Original `Message-ID` for `In-Reply-To` / `References`, without brackets.
    pub in_reply_to: Option<String>,
}

impl OutboundReply {
    /// Address a reply to `original` from `persona`.
    pub fn for_message(
        original: &InboundMessage,
        persona: &Persona,
        body: String,
        id_domain: &str,
    ) -> Self {
        Self {
            from_name: persona.display_name.clone(),
            from_address: persona.address.clone(),
            to: original.sender.clone(),
            subject: reply_subject(original.subject.as_deref()),
            body,
            message_id: format!("{}@{id_domain}", uuid::Uuid::new_v4()),
            in_reply_to: original.message_id.clone(),
        }
    }

    /// Render the RFC 5322 message, anti-loop and threading headers included.
    pub fn to_message(&self) -> Result<Message, MailboxError> {
        let from_address = self
            .from_address
            .parse()
            .map_err(|e| MailboxError::Send(format!("invalid from address: {e}")))?;
        let to = recipient_mailbox(&self.to)?;

        let mut builder = Message::builder()
            .from(Mailbox::new(Some(self.from_name.clone()), from_address))
            .to(to)
            .subject(self.subject.as_str())
            .date_now()
            .message_id(Some(format!("<{}>", self.message_id)))
            .header(ContentType::TEXT_PLAIN)
            .header(AutoSubmitted(AUTO_SUBMITTED_VALUE.to_string()))
            .header(AutoResponseSuppress(AUTO_RESPONSE_SUPPRESS_VALUE.to_string()))
            .header(Precedence(PRECEDENCE_VALUE.to_string()));

        if let Some(original) = &self.in_reply_to {
            builder = builder
                .in_reply_to(format!("<{original}>"))
                .references(format!("<{original}>"));
        }

        builder
            .body(self.body.clone())
            .map_err(|e| MailboxError::Send(format!("failed to build message: {e}")))
    }
}

/// `address` as an SMTP recipient, or the reason it cannot be one.
pub fn recipient_mailbox(address: &str) -> Result<Mailbox, MailboxError> {
    address
        .parse()
        .map_err(|e| MailboxError::Send(format!("invalid recipient {address}: {e}")))
}

/// Ensure a single `Re: ` prefix.
pub fn reply_subject(original: Option<&str>) -> String {
    let subject = original
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(NO_SUBJECT);
    let already_reply = subject
        .get(..3)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("re:"));
    if already_reply {
        subject.to_string()
    } else {
        format!("Re: {subject}")
    }
}
