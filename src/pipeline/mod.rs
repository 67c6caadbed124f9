//! Pipeline stages for PDF-to-PNG rasterisation.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap
//! implementations (e.g. the rendering backend) without touching other
//! stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ range ──▶ raster ──▶ writer
//! (path)   (resolve)  (pdfium)   (PNG files)
//! ```
//!
//! 1. [`input`]  — validate the user-supplied path and PDF magic bytes
//! 2. [`range`]  — validate the requested interval and expand the all-pages
//!    sentinel against the true page count
//! 3. [`raster`] — rasterise one page at a time on the pdfium worker thread
//! 4. [`writer`] — PNG-encode each page into the timestamped run directory

pub mod input;
pub mod range;
pub mod raster;
pub mod writer;
