/*
 * Digest Daemon
 * Joshua Bassett, 2017
 */

#[macro_use] extern crate log;

pub mod client;
pub mod command;
pub mod config;
pub mod digest;
pub mod digest_server;
pub mod error;
pub mod mailer;
pub mod record;
pub mod server;

pub use crate::command::{Accept, Command, Flush, ShutdownHandle};
pub use crate::config::Config;
pub use crate::digest::Digest;
pub use crate::digest_server::{DigestClock, DigestServer};
pub use crate::error::{ClientError, DeliveryError, Error, MalformedRecord};
pub use crate::mailer::{Mailer, SmtpMailer};
pub use crate::record::{Kind, Record};
