//! Outbound e-mail boundary.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    /// Base64-encoded payload.
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub to: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
    pub subject: String,
    pub html: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<EmailAttachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EmailOutcome {
    pub fn sent() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EmailError {
    #[error("e-mail transport failed: {0}")]
    Transport(String),
    #[error("e-mail service rejected the message: {0}")]
    Rejected(String),
    #[error("e-mail service is not configured")]
    NotConfigured,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver the message. `Ok` with `success == false` is a delivery refusal reported by
    /// the provider; `Err` is a failure to reach it.
    async fn send(&self, message: &EmailMessage) -> Result<EmailOutcome, EmailError>;
}
