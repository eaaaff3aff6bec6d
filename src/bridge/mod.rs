//! External collaborators behind trait seams.
//!
//! The live system talks to two third-party HTTP services: a file-hosting
//! bridge for certificate images and a generative completion API for
//! OCR-style field extraction. Both are thin wrappers, so the crate models
//! them as traits with wire-shape envelope types; concrete HTTP transports
//! live with the embedding application, and the in-memory implementations
//! here back tests.
//!
//! Authentication for the file bridge is a configuration parameter
//! ([`BridgeConfig`]), never an embedded constant.

pub mod extract;
pub mod file;

pub use extract::{CertificateExtractor, ExtractedFields, StaticExtractor};
pub use file::{
    BridgeAction, BridgeConfig, BridgeRequest, BridgeResponse, FileBridge, InMemoryFileBridge,
    UploadedFile,
};

use thiserror::Error;

/// Failures from an external bridge call.
///
/// Callers convert these into a fallback message suggesting manual entry;
/// there is no retry and no backoff.
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    /// The remote endpoint reported failure
    #[error("Bridge rejected the request: {message}")]
    Rejected { message: String },

    /// Transport-level failure reaching the endpoint
    #[error("Bridge unreachable: {message}")]
    Unreachable { message: String },

    /// The reply could not be decoded
    #[error("Bridge reply unreadable: {message}")]
    BadReply { message: String },
}

impl BridgeError {
    /// Create a rejected error.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}
