//! Client side of the correction pipeline
//!
//! A [`Session`] holds the input/output text, sends the input to the
//! correction proxy through a [`CorrectionTransport`], and reveals the
//! corrected text one character at a time.

pub mod clipboard;
pub mod files;
pub mod reveal;
pub mod session;
pub mod transport;

use std::path::PathBuf;

use crate::locale::Notice;

pub use files::DownloadTarget;
pub use reveal::Reveal;
pub use session::{Phase, Session, Snapshot};
pub use transport::{CorrectionTransport, HttpTransport, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("input text is empty")]
    EmptyInput,

    /// Every transport or provider failure collapses into this variant
    #[error("correction service unavailable")]
    ServiceUnavailable,

    #[error("unsupported file type: {}", .0.display())]
    UnsupportedFile(PathBuf),

    #[error("file I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ClientError {
    /// Localized notice to show the user, if the error has one
    pub fn notice(&self) -> Option<Notice> {
        match self {
            ClientError::EmptyInput => Some(Notice::EmptyInput),
            ClientError::ServiceUnavailable => Some(Notice::ServiceUnavailable),
            ClientError::UnsupportedFile(_) => Some(Notice::UnsupportedFile),
            ClientError::Io { .. } => None,
        }
    }
}
