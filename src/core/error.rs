//! Failure taxonomy for the streaming client and the classifier that turns a
//! failure into the one line shown to the user.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::api::ErrorEnvelope;
use crate::core::sheet::SheetError;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The caller raised the cancellation token.
    #[error("request cancelled")]
    Cancelled,

    /// The server answered with a non-2xx status. The body is kept verbatim.
    #[error("server responded with HTTP {status}")]
    Transport { status: u16, body: String },

    /// One stream record could not be decoded. Decoding continues after it.
    #[error("malformed stream record: {reason}")]
    ProtocolDecode { line: String, reason: String },

    /// One attachment could not be encoded and was left out of the request.
    #[error("attachment {item} skipped: {source}")]
    Attachment {
        item: String,
        #[source]
        source: AttachmentError,
    },

    /// Anything else that ends the request.
    #[error("{message}")]
    Fatal {
        message: String,
        detail: Option<String>,
    },
}

impl ClientError {
    pub fn fatal(context: &str, err: impl fmt::Display + fmt::Debug) -> Self {
        ClientError::Fatal {
            message: format!("{context}: {err}"),
            detail: Some(format!("{err:?}")),
        }
    }

    pub fn attachment(item: impl Into<String>, source: AttachmentError) -> Self {
        ClientError::Attachment {
            item: item.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Cancelled => ErrorKind::Cancelled,
            ClientError::Transport { .. } => ErrorKind::Transport,
            ClientError::ProtocolDecode { .. } => ErrorKind::ProtocolDecode,
            ClientError::Attachment { .. } => ErrorKind::Attachment,
            ClientError::Fatal { .. } => ErrorKind::Fatal,
        }
    }
}

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not serialize table: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sheet(#[from] SheetError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Cancelled,
    Transport,
    ProtocolDecode,
    Attachment,
    Fatal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Cancelled => "Cancelled",
            ErrorKind::Transport => "TransportError",
            ErrorKind::ProtocolDecode => "ProtocolDecodeError",
            ErrorKind::Attachment => "AttachmentError",
            ErrorKind::Fatal => "FatalRequestError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure: the primary message is meant for people, the detail
/// for logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
    pub detail: Option<String>,
    pub status: Option<u16>,
}

impl ErrorReport {
    pub fn is_cancelled(&self) -> bool {
        self.kind == ErrorKind::Cancelled
    }

    /// Per-line and per-attachment failures do not end the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind, ErrorKind::ProtocolDecode | ErrorKind::Attachment)
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

pub fn classify(error: &ClientError) -> ErrorReport {
    let kind = error.kind();
    match error {
        ClientError::Cancelled => ErrorReport {
            kind,
            message: "Request cancelled by user".to_string(),
            detail: None,
            status: None,
        },
        ClientError::Transport { status, body } => ErrorReport {
            kind,
            message: transport_message(error, body),
            detail: Some(format!("HTTP {status}: {body}")),
            status: Some(*status),
        },
        ClientError::ProtocolDecode { line, .. } => ErrorReport {
            kind,
            message: error.to_string(),
            detail: Some(line.clone()),
            status: None,
        },
        ClientError::Attachment { source, .. } => ErrorReport {
            kind,
            message: error.to_string(),
            detail: Some(format!("{source:?}")),
            status: None,
        },
        ClientError::Fatal { message, detail } => ErrorReport {
            kind,
            message: message.clone(),
            detail: detail.clone(),
            status: None,
        },
    }
}

fn transport_message(error: &ClientError, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return error.to_string();
    }

    match serde_json::from_str::<ErrorEnvelope>(trimmed) {
        Ok(envelope) => envelope
            .message()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        Err(_) => trimmed.to_string(),
    }
}
