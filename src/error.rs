//! Error types shared by the console and the keyspace.

use thiserror::Error;

/// Message shown when a failed reply carries no usable `error` field.
pub const UNKNOWN_ERROR: &str = "An unknown error occurred.";

/// A failed `/execute` round trip.
///
/// `Display` is exactly the text rendered after `Error: ` in the output log.
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// The request never produced a response (connect, DNS, IO, timeout).
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx status; carries the server's `error` text or the fallback.
    #[error("{0}")]
    Server(String),

    /// 2xx status whose body could not be read as a reply.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ConsoleError {
    pub fn server(msg: impl Into<String>) -> Self {
        Self::Server(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// Failure of a keyspace command. `Display` is the wire `error` text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("Unknown command")]
    Unknown,

    #[error("{name} command format is: {usage}")]
    Usage { name: &'static str, usage: &'static str },

    #[error("key is not valid, this key may be a {other} key and does not support {command} command")]
    WrongType { other: &'static str, command: &'static str },

    #[error("key not found")]
    KeyNotFound,

    #[error("key has no expiration time")]
    NoExpiration,

    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    #[error("failed to restore: no snapshot saved")]
    NoSnapshot,
}
