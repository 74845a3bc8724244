//! Error types for prudent-fetch.

use std::fmt;
use std::io;

use thiserror::Error;

/// Identity of the reference an error is about.
///
/// `system_id` is the identifier as written in the document until the URI has
/// been validated; after the HTTP exchange it is the final (post-redirect) URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub public_id: Option<String>,
    pub system_id: String,
}

impl Location {
    pub fn new(public_id: Option<&str>, system_id: impl Into<String>) -> Self {
        Self {
            public_id: public_id.map(str::to_owned),
            system_id: system_id.into(),
        }
    }

    /// Same public id, different system id.
    pub fn at(&self, system_id: impl Into<String>) -> Self {
        Self {
            public_id: self.public_id.clone(),
            system_id: system_id.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.public_id {
            Some(public_id) => write!(f, "{} ({})", self.system_id, public_id),
            None => f.write_str(&self.system_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Fatal,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{location}: {reason}")]
    InvalidReference { location: Location, reason: String },

    #[error("{location}: Number of permitted HTTP requests exceeded.")]
    Exhausted { location: Location },

    #[error("{location}: {source}")]
    Transport {
        location: Location,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(
        "{location}: HTTP resource not retrievable. The HTTP status from the remote server was: {code}."
    )]
    HttpStatus { location: Location, code: u16 },

    #[error("{location}: Resource size exceeds limit.")]
    SizeLimit { location: Location, limit: u64 },

    #[error("{location}: {message}")]
    ContentType { location: Location, message: String },

    #[error("{location}: {message}")]
    ProtocolNoise { location: Location, message: String },
}

impl Error {
    pub fn location(&self) -> &Location {
        match self {
            Error::InvalidReference { location, .. }
            | Error::Exhausted { location }
            | Error::Transport { location, .. }
            | Error::HttpStatus { location, .. }
            | Error::SizeLimit { location, .. }
            | Error::ContentType { location, .. }
            | Error::ProtocolNoise { location, .. } => location,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Error::ProtocolNoise { .. } => Severity::Warning,
            _ => Severity::Fatal,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Raised by a bounded stream once more bytes were read than allowed.
#[derive(Debug, Error)]
#[error("{system_id}: Resource size exceeds limit ({limit} bytes).")]
pub struct StreamBoundError {
    pub system_id: String,
    pub limit: u64,
}

impl From<StreamBoundError> for io::Error {
    fn from(e: StreamBoundError) -> Self { io::Error::new(io::ErrorKind::InvalidData, e) }
}

/// An I/O failure tagged with the URI of the stream it happened on.
#[derive(Debug, Error)]
#[error("{system_id}: {message}")]
pub struct SystemIdError {
    pub system_id: String,
    pub message: String,
    #[source]
    pub source: Option<io::Error>,
}

impl SystemIdError {
    /// Wraps `err` unless it already names a system id.
    pub fn locate(system_id: &str, err: io::Error) -> io::Error {
        if is_located(&err) {
            return err;
        }
        let kind = err.kind();
        let message = err.to_string();
        io::Error::new(
            kind,
            SystemIdError {
                system_id: system_id.to_owned(),
                message,
                source: Some(err),
            },
        )
    }

    pub fn released(system_id: &str) -> io::Error {
        io::Error::other(SystemIdError {
            system_id: system_id.to_owned(),
            message: "stream already released".to_owned(),
            source: None,
        })
    }
}

fn is_located(err: &io::Error) -> bool {
    err.get_ref().is_some_and(|inner| {
        inner.is::<SystemIdError>() || inner.is::<StreamBoundError>()
    })
}
