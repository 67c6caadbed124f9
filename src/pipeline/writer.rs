//! Output writing: the run directory and one PNG file per page.
//!
//! ## Why PNG?
//!
//! Lossless compression preserves text crispness at every DPI; JPEG
//! artefacts on rendered text are visible even at high quality settings.
//! The format is fixed — this tool produces exactly one raster format.
//!
//! File names are derived from the page number (`image-0042.png`), so the
//! on-disk result is deterministic regardless of the order pages complete
//! in, and collisions cannot occur within a run: page numbers inside a
//! resolved range are pairwise distinct by construction.

use crate::error::Pdf2PngError;
use crate::metadata::PageFile;
use chrono::{DateTime, Local};
use image::DynamicImage;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the run directory for a given wall-clock instant:
/// `output-<yyyymmddHHMMSS>`.
pub fn run_directory_name(now: DateTime<Local>) -> String {
    format!("output-{}", now.format("%Y%m%d%H%M%S"))
}

/// File name for a page image, zero-padded to at least four digits.
pub fn page_file_name(page_number: u32) -> String {
    format!("image-{page_number:04}.png")
}

/// Create the timestamped run directory under `parent`.
///
/// Uses `create_dir`, not `create_dir_all`: every run owns a fresh
/// directory, and a pre-existing one with the same second-granularity name
/// is an error rather than something to silently reuse.
pub fn create_run_directory(parent: &Path) -> Result<PathBuf, Pdf2PngError> {
    let dir = parent.join(run_directory_name(Local::now()));
    std::fs::create_dir(&dir).map_err(|source| Pdf2PngError::DirectoryCreation {
        path: dir.clone(),
        source,
    })?;
    debug!("Created run directory: {}", dir.display());
    Ok(dir)
}

/// PNG-encode a rendered page and write it into the run directory.
///
/// Returns the [`PageFile`] record with the number of bytes written, which
/// equals the encoded buffer length — the write is all-or-nothing.
pub async fn write_page(
    out_dir: &Path,
    page_number: u32,
    image: &DynamicImage,
) -> Result<PageFile, Pdf2PngError> {
    let file_name = page_file_name(page_number);
    let path = out_dir.join(&file_name);

    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| Pdf2PngError::RenderFailed {
            page: page_number,
            detail: format!("PNG encoding failed: {e}"),
        })?;

    tokio::fs::write(&path, &buf)
        .await
        .map_err(|source| Pdf2PngError::PageWriteFailed {
            page: page_number,
            path,
            source,
        })?;

    debug!("Wrote {} ({} bytes)", file_name, buf.len());

    Ok(PageFile {
        page_number,
        file_name,
        bytes: buf.len() as u64,
    })
}
