/*
 * Digest Daemon
 * Joshua Bassett, 2017
 */

use std::io;
use thiserror::Error;

/// Errors that stop the daemon from starting.
#[derive(Debug, Error)]
pub enum Error {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value {value:?} for {name}")]
    InvalidVar { name: &'static str, value: String },

    #[error("invalid mailbox: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to set up SMTP relay: {0}")]
    Relay(#[from] lettre::transport::smtp::Error),

    #[error("failed to install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A payload that could not be turned into a record.
#[derive(Debug, Error)]
pub enum MalformedRecord {
    #[error("failed to read record: {0}")]
    Io(#[from] io::Error),

    #[error("record exceeds {0} bytes")]
    TooLarge(u64),

    #[error("connection closed before a record was sent")]
    Empty,

    #[error("invalid record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid timestamp {0:?}")]
    Timestamp(String),
}

/// The mail relay refused or failed to deliver a digest.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("failed to stamp digest: {0}")]
    Stamp(#[from] time::error::Format),

    #[error("SMTP delivery failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to stamp record: {0}")]
    Stamp(#[from] time::error::Format),

    #[error("server closed the connection without acknowledging")]
    NoAcknowledgement,
}
