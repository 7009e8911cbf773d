//! Raw text extraction for uploaded marksheets, identity proofs, and criteria documents.
//!
//! Documents arrive either with a selectable text layer or as scans. The extractor
//! reads the text layer first and only rasterises pages for OCR when that yields
//! nothing. Failures never escape: callers always receive a [`TextExtraction`],
//! whose [`ExtractionSource`] records which tier produced the text or why none did.

mod ocr;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::OcrConfig;

pub use ocr::TesseractOcr;

/// Which extraction tier produced the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionSource {
    TextLayer,
    Ocr,
    Unreadable { reason: String },
}

/// Text read from one document plus its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextExtraction {
    pub text: String,
    pub source: ExtractionSource,
}

impl TextExtraction {
    pub fn unreadable(reason: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            source: ExtractionSource::Unreadable {
                reason: reason.into(),
            },
        }
    }

    pub fn is_readable(&self) -> bool {
        !matches!(self.source, ExtractionSource::Unreadable { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("text layer extraction failed for '{}': {detail}", path.display())]
    TextLayer { path: PathBuf, detail: String },
    #[error("`{program}` failed: {detail}")]
    Command { program: String, detail: String },
    #[error("no pages were rendered from '{}'", path.display())]
    NoPages { path: PathBuf },
}

/// Produces raw text for a document path. Implementations must not fail outward.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, path: &Path) -> TextExtraction;
}

impl<T: TextExtractor + ?Sized> TextExtractor for Box<T> {
    fn extract_text(&self, path: &Path) -> TextExtraction {
        (**self).extract_text(path)
    }
}

/// Image-recognition pass over every page of a document, in page order.
pub trait OcrEngine: Send + Sync {
    fn recognize_pdf(&self, path: &Path) -> Result<String, DocumentError>;
}

/// Two-tier extractor: embedded text layer first, OCR fallback second.
pub struct PdfTextExtractor<O> {
    ocr: O,
}

impl PdfTextExtractor<TesseractOcr> {
    pub fn from_config(config: &OcrConfig) -> Self {
        Self::with_ocr(TesseractOcr::from_config(config))
    }
}

impl<O: OcrEngine> PdfTextExtractor<O> {
    pub fn with_ocr(ocr: O) -> Self {
        Self { ocr }
    }
}

impl<O: OcrEngine> TextExtractor for PdfTextExtractor<O> {
    fn extract_text(&self, path: &Path) -> TextExtraction {
        match read_text_layer(path) {
            Ok(text) if !text.trim().is_empty() => {
                debug!(path = %path.display(), chars = text.len(), "read embedded text layer");
                return TextExtraction {
                    text,
                    source: ExtractionSource::TextLayer,
                };
            }
            Ok(_) => debug!(path = %path.display(), "no text layer, falling back to OCR"),
            Err(err) => warn!(path = %path.display(), error = %err, "text layer extraction failed"),
        }

        match self.ocr.recognize_pdf(path) {
            Ok(text) if !text.trim().is_empty() => {
                info!(path = %path.display(), chars = text.len(), "recognized scanned document");
                TextExtraction {
                    text,
                    source: ExtractionSource::Ocr,
                }
            }
            Ok(_) => {
                warn!(path = %path.display(), "OCR produced no text");
                TextExtraction::unreadable("no text recognized")
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "OCR failed");
                TextExtraction::unreadable(err.to_string())
            }
        }
    }
}

fn read_text_layer(path: &Path) -> Result<String, DocumentError> {
    let bytes = std::fs::read(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    // pdf-extract panics on some malformed inputs instead of returning an error.
    let outcome = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes));
    match outcome {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(err)) => Err(DocumentError::TextLayer {
            path: path.to_path_buf(),
            detail: err.to_string(),
        }),
        Err(_) => Err(DocumentError::TextLayer {
            path: path.to_path_buf(),
            detail: "parser panicked".to_string(),
        }),
    }
}
