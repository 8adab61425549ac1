//! OCR text consumption
//!
//! The engine performs no text recognition itself; it consumes line lists
//! produced by an external OCR service and resolves card facts from them.

pub mod resolver;
pub mod tables;

pub use resolver::{resolve, resolve_flat};

use serde::{Deserialize, Serialize};

/// One line of recognized text from the external OCR service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrLine {
    pub text: String,
    /// Recognition confidence; 0 when the upstream OCR supplies none
    #[serde(default)]
    pub confidence: f32,
}

impl OcrLine {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }

    /// A line without an upstream confidence value
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: 0.0,
        }
    }
}
