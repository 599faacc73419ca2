//! Inbound message model and the outbound reply header protocol.

mod inbound;
mod outbound;

pub use inbound::{InboundMessage, LoopMarkers};
pub use outbound::{
    AUTO_RESPONSE_SUPPRESS_VALUE, AUTO_SUBMITTED_VALUE, NO_SUBJECT, OutboundReply,
    PRECEDENCE_VALUE, recipient_mailbox, reply_subject,
};
