//! Certificate field extraction through a vision completion API.
//!
//! The live system sends certificate images to a generative completion
//! endpoint with a system instruction constraining the reply to a small
//! JSON object. Every field is nullable: the model may fail to read any of
//! them, and the caller falls back to manual entry.

use crate::bridge::BridgeError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Fields the extractor attempts to read off a certificate image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub credits: Option<f64>,
}

impl ExtractedFields {
    /// Whether extraction produced nothing usable.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.date.is_none() && self.credits.is_none()
    }
}

/// Transport-agnostic certificate field extractor.
pub trait CertificateExtractor: Send + Sync {
    /// Extract fields from image bytes.
    ///
    /// A transport or model failure is a [`BridgeError`]; an unreadable
    /// certificate is a successful reply with empty fields.
    fn extract(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> impl Future<Output = Result<ExtractedFields, BridgeError>> + Send;
}

/// Extractor returning a fixed reply, for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticExtractor {
    pub reply: ExtractedFields,
    pub fail: bool,
}

impl StaticExtractor {
    /// An extractor that always returns the given fields.
    pub fn returning(reply: ExtractedFields) -> Self {
        Self { reply, fail: false }
    }

    /// An extractor whose calls always fail.
    pub fn failing() -> Self {
        Self {
            reply: ExtractedFields::default(),
            fail: true,
        }
    }
}

impl CertificateExtractor for StaticExtractor {
    async fn extract(
        &self,
        _image: &[u8],
        _mime_type: &str,
    ) -> Result<ExtractedFields, BridgeError> {
        if self.fail {
            return Err(BridgeError::Unreachable {
                message: "extractor offline".into(),
            });
        }
        Ok(self.reply.clone())
    }
}
