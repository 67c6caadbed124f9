//! # pdf2png
//!
//! Rasterise PDF pages into a directory of PNG images.
//!
//! Each run resolves a user-supplied page range against the document's true
//! page count, renders every page in the resolved interval via pdfium,
//! writes one `image-%04d.png` per page into a fresh `output-<timestamp>`
//! directory, and reports run-level metadata (page counts, elapsed time,
//! bytes written, per-file sizes).
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    validate path + %PDF magic bytes
//!  ├─ 2. Range    validate (first, last, dpi), expand the (1, 999) sentinel
//!  ├─ 3. Render   rasterise pages via pdfium (dedicated worker thread)
//!  ├─ 4. Write    PNG files named by page number in output-<timestamp>/
//!  └─ 5. Record   RunMetadata: totals, timings, ordered file list
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2png::{convert, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Defaults: all pages, 150 dpi, concurrent dispatch.
//!     let config = RunConfig::default();
//!     let meta = convert("document.pdf", &config).await?;
//!     println!(
//!         "{} pages → {} ({} bytes)",
//!         meta.files.len(),
//!         meta.output_folder,
//!         meta.total_bytes
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Page ranges
//!
//! Pages are 1-based and the interval is inclusive. The default request
//! `(first=1, last=999)` is the reserved "all pages" sentinel, expanded to
//! the real page count once the document is open. A literal range that
//! reaches past the end of the document fails the run — it is never
//! silently truncated.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2png` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2png = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod metadata;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DispatchPolicy, RunConfig, RunConfigBuilder};
pub use convert::{convert, convert_sync, convert_with, inspect, DocumentInfo};
pub use error::Pdf2PngError;
pub use metadata::{PageFile, RunMetadata, RunRecorder};
pub use pipeline::range::{ResolvedRange, DPI_DEFAULT, DPI_MAX, DPI_MIN, LAST_SENTINEL, PAGE_MIN};
pub use pipeline::raster::{PageRasterizer, PdfiumRasterizer};
pub use progress::{NoopProgressCallback, ProgressCallback, RunProgressCallback};
