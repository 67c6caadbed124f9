//! Error types for the pdf2png library.
//!
//! Every failure mode is a distinct [`Pdf2PngError`] variant so callers can
//! match on exactly what went wrong. No component ever aborts the process:
//! everything returns `Result` and the top-level orchestrator (or the CLI
//! `main`) decides how to terminate.
//!
//! Validation errors (`FirstPageBelowMinimum` … `DpiOutOfRange`) are raised
//! before the document is even opened — no output directory exists yet when
//! they fire. `RangeExceedsDocument` needs the true page count and is raised
//! after open but before any rendering starts.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2png library.
#[derive(Debug, Error)]
pub enum Pdf2PngError {
    // ── Range / config validation (pre-open) ──────────────────────────────
    /// Requested first page is below the 1-based minimum.
    #[error("First page must be at least {min}, got {first}")]
    FirstPageBelowMinimum { first: u32, min: u32 },

    /// Requested last page exceeds the all-pages sentinel value.
    #[error("Last page must be at most {max}, got {last}")]
    LastPageAboveMaximum { last: u32, max: u32 },

    /// Requested first page is greater than the requested last page.
    #[error("First page {first} is greater than last page {last}")]
    FirstAfterLast { first: u32, last: u32 },

    /// Requested DPI is outside the supported range.
    #[error("DPI {dpi} is outside the supported range [{min}, {max}]")]
    DpiOutOfRange { dpi: u32, min: u32, max: u32 },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Document-open errors ──────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt or unreadable: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    // ── Range-vs-document errors (post-open) ──────────────────────────────
    /// The literal (non-sentinel) range reaches past the end of the document.
    ///
    /// Never silently truncated: the caller asked for pages the document does
    /// not have, and must be told rather than receive fewer files.
    #[error("Page range [{first}...{last}] exceeds pages in document ({pages})")]
    RangeExceedsDocument { first: u32, last: u32, pages: u32 },

    // ── Per-page errors ───────────────────────────────────────────────────
    /// pdfium returned an error while rasterising a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RenderFailed { page: u32, detail: String },

    /// Could not create the run's output directory; aborts before any page.
    #[error("Failed to create output directory '{path}': {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write an individual page image.
    #[error("Failed to write page {page} to '{path}': {source}")]
    PageWriteFailed {
        page: u32,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Place the pdfium dynamic library next to the executable or install it system-wide."
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2PngError {
    /// The 1-based page number this error is about, if it is a per-page error.
    ///
    /// Used by the concurrent dispatcher to pick a deterministic failure to
    /// report (lowest page number) after the join barrier.
    pub fn page_number(&self) -> Option<u32> {
        match self {
            Pdf2PngError::RenderFailed { page, .. } => Some(*page),
            Pdf2PngError::PageWriteFailed { page, .. } => Some(*page),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_exceeds_display() {
        let e = Pdf2PngError::RangeExceedsDocument {
            first: 3,
            last: 15,
            pages: 10,
        };
        let msg = e.to_string();
        assert!(msg.contains("[3...15]"), "got: {msg}");
        assert!(msg.contains("10"), "got: {msg}");
    }

    #[test]
    fn dpi_out_of_range_display() {
        let e = Pdf2PngError::DpiOutOfRange {
            dpi: 5,
            min: 50,
            max: 1000,
        };
        assert!(e.to_string().contains("[50, 1000]"));
    }

    #[test]
    fn page_number_on_per_page_errors() {
        let render = Pdf2PngError::RenderFailed {
            page: 7,
            detail: "boom".into(),
        };
        assert_eq!(render.page_number(), Some(7));

        let fatal = Pdf2PngError::FirstAfterLast { first: 5, last: 3 };
        assert_eq!(fatal.page_number(), None);
    }
}
