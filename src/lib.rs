#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use
)]

pub mod agent;
pub mod completion;
pub mod config;
pub mod error;
pub mod mail;
pub mod mailbox;
pub mod persona;

pub use config::Config;
pub use error::{MailerError, Result};
