//! Page rasterisation: the rendering-collaborator seam and its pdfium
//! implementation.
//!
//! ## Why a dedicated worker thread?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which keeps
//! internal state that must not be touched from several threads at once, and
//! its document handle borrows the `Pdfium` instance so neither can cross an
//! `await` point cleanly. A single named thread owns both for the lifetime of
//! the run; render requests arrive over an mpsc channel and are answered over
//! per-request oneshot channels. Concurrent dispatch therefore serialises at
//! the channel — rendering is mutually exclusive by construction, while PNG
//! encoding and file writes still overlap freely in the calling tasks.
//!
//! The [`PageRasterizer`] trait is the seam the dispatcher is written
//! against; tests substitute an in-process fake to exercise the orchestrator
//! without a pdfium binary.

use crate::error::Pdf2PngError;
use futures::future::BoxFuture;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tracing::{debug, info};

/// Points per inch in PDF user space; DPI maps to a scale factor over this.
const PDF_POINTS_PER_INCH: f32 = 72.0;

/// The rendering collaborator: turns a 1-based page number and a resolution
/// into a raster image.
pub trait PageRasterizer: Send + Sync {
    /// Total pages in the open document.
    fn page_count(&self) -> u32;

    /// Rasterise one page. `page_number` is 1-based; implementations convert
    /// to their own indexing convention.
    fn rasterize(
        &self,
        page_number: u32,
        dpi: u32,
    ) -> BoxFuture<'_, Result<DynamicImage, Pdf2PngError>>;
}

/// One render request handed to the pdfium worker thread.
struct RenderRequest {
    /// 0-based page index (pdfium's convention).
    index: u32,
    dpi: u32,
    reply: tokio::sync::oneshot::Sender<Result<DynamicImage, Pdf2PngError>>,
}

/// [`PageRasterizer`] backed by pdfium on a dedicated worker thread.
///
/// The document stays open until the rasterizer is dropped; dropping closes
/// the request channel, the worker drains and exits, and pdfium closes the
/// document. Closing cannot fail and never affects the run's outcome.
pub struct PdfiumRasterizer {
    tx: mpsc::Sender<RenderRequest>,
    page_count: u32,
}

impl PdfiumRasterizer {
    /// Bind pdfium, open the document, and report its page count.
    ///
    /// The open result travels back over a oneshot so the async caller never
    /// blocks on the worker thread.
    pub async fn open(path: &Path, password: Option<&str>) -> Result<Self, Pdf2PngError> {
        let (req_tx, req_rx) = mpsc::channel::<RenderRequest>();
        let (open_tx, open_rx) = tokio::sync::oneshot::channel();

        let path_buf = path.to_path_buf();
        let pwd = password.map(str::to_string);

        std::thread::Builder::new()
            .name("pdfium-render".into())
            .spawn(move || worker(path_buf, pwd, req_rx, open_tx))
            .map_err(|e| Pdf2PngError::Internal(format!("failed to spawn render thread: {e}")))?;

        let page_count = open_rx
            .await
            .map_err(|_| {
                Pdf2PngError::Internal("render thread exited before reporting open result".into())
            })??;

        info!("PDF loaded: {} pages", page_count);

        Ok(Self {
            tx: req_tx,
            page_count,
        })
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn rasterize(
        &self,
        page_number: u32,
        dpi: u32,
    ) -> BoxFuture<'_, Result<DynamicImage, Pdf2PngError>> {
        let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
        let sent = self.tx.send(RenderRequest {
            // Pages in the document start at zero.
            index: page_number.saturating_sub(1),
            dpi,
            reply: reply_tx,
        });

        Box::pin(async move {
            if sent.is_err() {
                return Err(Pdf2PngError::Internal("render thread is gone".into()));
            }
            reply_rx
                .await
                .map_err(|_| Pdf2PngError::Internal("render thread dropped the request".into()))?
        })
    }
}

/// Worker-thread body: owns the `Pdfium` instance and the open document.
fn worker(
    path: PathBuf,
    password: Option<String>,
    requests: mpsc::Receiver<RenderRequest>,
    open_tx: tokio::sync::oneshot::Sender<Result<u32, Pdf2PngError>>,
) {
    let pdfium = match bind_pdfium() {
        Ok(p) => p,
        Err(e) => {
            let _ = open_tx.send(Err(e));
            return;
        }
    };

    let document = match pdfium.load_pdf_from_file(&path, password.as_deref()) {
        Ok(doc) => doc,
        Err(e) => {
            let _ = open_tx.send(Err(map_open_error(&path, password.is_some(), e)));
            return;
        }
    };

    let pages = document.pages();
    let _ = open_tx.send(Ok(pages.len() as u32));

    while let Ok(req) = requests.recv() {
        let result = render_one(&pages, req.index, req.dpi);
        // A dropped reply receiver means the run already failed; nothing to do.
        let _ = req.reply.send(result);
    }

    debug!("pdfium worker shutting down; document closed");
}

/// Bind to a pdfium library next to the executable, falling back to the
/// system library.
fn bind_pdfium() -> Result<Pdfium, Pdf2PngError> {
    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map(Pdfium::new)
        .map_err(|e| Pdf2PngError::PdfiumBindingFailed(format!("{e:?}")))
}

/// Rasterise a single 0-based page at the requested DPI.
fn render_one(
    pages: &PdfPages<'_>,
    index: u32,
    dpi: u32,
) -> Result<DynamicImage, Pdf2PngError> {
    let page_number = index + 1;

    let page = pages
        .get(index as u16)
        .map_err(|e| Pdf2PngError::RenderFailed {
            page: page_number,
            detail: format!("{e:?}"),
        })?;

    let render_config =
        PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / PDF_POINTS_PER_INCH);

    let bitmap =
        page.render_with_config(&render_config)
            .map_err(|e| Pdf2PngError::RenderFailed {
                page: page_number,
                detail: format!("{e:?}"),
            })?;

    let image = bitmap.as_image();
    debug!(
        "Rendered page {} → {}x{} px at {} dpi",
        page_number,
        image.width(),
        image.height(),
        dpi
    );

    Ok(image)
}

/// Classify a pdfium load failure into a specific open error.
fn map_open_error(path: &Path, had_password: bool, e: PdfiumError) -> Pdf2PngError {
    let err_str = format!("{e:?}");
    if err_str.contains("Password") || err_str.contains("password") {
        if had_password {
            Pdf2PngError::WrongPassword {
                path: path.to_path_buf(),
            }
        } else {
            Pdf2PngError::PasswordRequired {
                path: path.to_path_buf(),
            }
        }
    } else {
        Pdf2PngError::CorruptPdf {
            path: path.to_path_buf(),
            detail: err_str,
        }
    }
}
