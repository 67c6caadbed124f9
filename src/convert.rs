//! Run orchestration: resolve the range, dispatch pages, aggregate metadata.
//!
//! ## Control flow
//!
//! ```text
//! validate (pre-open) ──▶ open ──▶ resolve range ──▶ create run dir
//!        │                                                │
//!        ▼                                                ▼
//!   reject bad flags                      dispatch pages ──▶ recorder
//!   before any I/O                        (sequential | concurrent)
//!                                                         │
//!                                              join barrier ▼ snapshot
//! ```
//!
//! ## Failure policy
//!
//! Sequential dispatch is fail-fast: the first render or write error aborts
//! the remaining pages immediately. Concurrent dispatch lets every in-flight
//! page run to the join barrier, then fails the run with the error for the
//! lowest failed page number — no cooperative cancellation races, and the
//! reported error is deterministic. Either way a failed run never finalises
//! metadata; files written before the failure are left on disk (no rollback).

use crate::config::{DispatchPolicy, RunConfig};
use crate::error::Pdf2PngError;
use crate::metadata::{RunHeader, RunMetadata, RunRecorder};
use crate::pipeline::range::{self, ResolvedRange};
use crate::pipeline::raster::{PageRasterizer, PdfiumRasterizer};
use crate::pipeline::{input, writer};
use crate::progress::ProgressCallback;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Basic facts about a document, without rendering anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// The source PDF as given by the caller.
    pub source_file: String,
    /// Total pages in the document.
    pub page_count: u32,
}

/// Rasterise the configured page range of a PDF into a fresh output
/// directory.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Any validation, open, range, render, or write failure fails the whole
/// run; see [`Pdf2PngError`] for the taxonomy. Images written before a
/// mid-run failure are left on disk.
pub async fn convert(
    input_str: impl AsRef<str>,
    config: &RunConfig,
) -> Result<RunMetadata, Pdf2PngError> {
    let input_str = input_str.as_ref();

    // Reject bad flags before anything touches the filesystem.
    range::validate_request(config.page_first, config.page_last, config.dpi)?;

    let path = input::resolve_source(input_str)?;
    let raster = PdfiumRasterizer::open(&path, config.password.as_deref()).await?;

    convert_with(&raster, input_str, config).await
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_str: impl AsRef<str>,
    config: &RunConfig,
) -> Result<RunMetadata, Pdf2PngError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2PngError::Internal(format!("failed to create tokio runtime: {e}")))?
        .block_on(convert(input_str, config))
}

/// Open a PDF and report its page count without rendering anything.
pub async fn inspect(input_str: impl AsRef<str>) -> Result<DocumentInfo, Pdf2PngError> {
    let input_str = input_str.as_ref();
    let path = input::resolve_source(input_str)?;
    let raster = PdfiumRasterizer::open(&path, None).await?;
    Ok(DocumentInfo {
        source_file: input_str.to_string(),
        page_count: raster.page_count(),
    })
}

/// Run a conversion against an already-open rasterizer.
///
/// This is the seam the integration tests drive with a fake rasterizer;
/// [`convert`] is a thin wrapper that opens the pdfium-backed one.
pub async fn convert_with(
    raster: &dyn PageRasterizer,
    source_file: &str,
    config: &RunConfig,
) -> Result<RunMetadata, Pdf2PngError> {
    range::validate_request(config.page_first, config.page_last, config.dpi)?;

    let resolved = range::resolve(config.page_first, config.page_last, raster.page_count())?;
    info!(
        "Pages range is [{}...{}] — {} of {} pages requested (all_pages={})",
        resolved.first,
        resolved.last,
        resolved.pages_in_range(),
        resolved.page_count,
        resolved.all_pages
    );

    let working_dir = match &config.output_parent {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()
            .map_err(|e| Pdf2PngError::Internal(format!("cannot determine working directory: {e}")))?,
    };

    let out_dir = writer::create_run_directory(&working_dir)?;
    let output_folder = out_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let started = Utc::now().timestamp();
    let recorder = RunRecorder::new(RunHeader {
        working_dir,
        output_folder,
        source_file: source_file.to_string(),
        range: resolved,
        dpi: config.dpi,
        started,
    });

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(resolved.pages_in_range());
    }

    match config.policy {
        DispatchPolicy::Sequential => {
            dispatch_sequential(raster, &resolved, config, &out_dir, &recorder).await?
        }
        DispatchPolicy::Concurrent => {
            dispatch_concurrent(raster, &resolved, config, &out_dir, &recorder).await?
        }
    }

    let completed = Utc::now().timestamp();
    let completed_pages = recorder.files_recorded();

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(resolved.pages_in_range(), completed_pages);
    }

    let metadata = recorder.finish(completed);
    info!(
        "Run complete: {} pages, {} bytes, {}s",
        metadata.files.len(),
        metadata.total_bytes,
        metadata.seconds_spent
    );

    Ok(metadata)
}

/// Render, write, and record one page.
async fn process_page(
    raster: &dyn PageRasterizer,
    page_number: u32,
    total_pages: u32,
    dpi: u32,
    out_dir: &Path,
    recorder: &RunRecorder,
    progress: Option<&ProgressCallback>,
) -> Result<(), Pdf2PngError> {
    if let Some(cb) = progress {
        cb.on_page_start(page_number, total_pages);
    }

    let outcome = async {
        let image = raster.rasterize(page_number, dpi).await?;
        writer::write_page(out_dir, page_number, &image).await
    }
    .await;

    match outcome {
        Ok(file) => {
            if let Some(cb) = progress {
                cb.on_page_complete(page_number, total_pages, file.bytes);
            }
            recorder.record(file);
            Ok(())
        }
        Err(e) => {
            if let Some(cb) = progress {
                cb.on_page_error(page_number, total_pages, e.to_string());
            }
            Err(e)
        }
    }
}

/// Pages one at a time in increasing order; `?` aborts on the first failure.
async fn dispatch_sequential(
    raster: &dyn PageRasterizer,
    resolved: &ResolvedRange,
    config: &RunConfig,
    out_dir: &Path,
    recorder: &RunRecorder,
) -> Result<(), Pdf2PngError> {
    let total = resolved.pages_in_range();
    for page_number in resolved.pages() {
        process_page(
            raster,
            page_number,
            total,
            config.dpi,
            out_dir,
            recorder,
            config.progress_callback.as_ref(),
        )
        .await?;
    }
    Ok(())
}

/// One future per page, bounded by `config.concurrency`; the collected
/// stream is the join barrier.
async fn dispatch_concurrent(
    raster: &dyn PageRasterizer,
    resolved: &ResolvedRange,
    config: &RunConfig,
    out_dir: &Path,
    recorder: &RunRecorder,
) -> Result<(), Pdf2PngError> {
    let total = resolved.pages_in_range();
    let dpi = config.dpi;
    let progress = config.progress_callback.as_ref();

    let mut failures: Vec<Pdf2PngError> =
        stream::iter(resolved.pages().map(|page_number| {
            process_page(raster, page_number, total, dpi, out_dir, recorder, progress)
        }))
        .buffer_unordered(config.concurrency)
        .filter_map(|result| async move { result.err() })
        .collect()
        .await;

    if failures.is_empty() {
        return Ok(());
    }

    debug!("{} page(s) failed; reporting the lowest page number", failures.len());
    failures.sort_by_key(|e| e.page_number().unwrap_or(u32::MAX));
    Err(failures.swap_remove(0))
}
