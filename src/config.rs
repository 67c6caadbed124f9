//! Configuration types for a rasterisation run.
//!
//! All run behaviour is controlled through [`RunConfig`], built via its
//! [`RunConfigBuilder`]. Keeping every knob in one struct makes it trivial to
//! share configs across tasks and to diff two runs to understand why their
//! outputs differ.
//!
//! `build()` performs the pre-open validation from the range resolver: an
//! inverted range or an out-of-bounds DPI is rejected here, before any file
//! or directory is touched.

use crate::error::Pdf2PngError;
use crate::pipeline::range::{self, DPI_DEFAULT, LAST_SENTINEL, PAGE_MIN};
use crate::progress::RunProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// How per-page work is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchPolicy {
    /// Pages rendered one at a time in increasing page order; the first
    /// failure aborts the remaining pages immediately.
    Sequential,
    /// One future per page, at most [`RunConfig::concurrency`] in flight.
    /// All in-flight pages run to the join barrier; the run then fails with
    /// the error for the lowest failed page number, if any. (default)
    #[default]
    Concurrent,
}

/// Configuration for one rasterisation run.
///
/// Built via [`RunConfig::builder()`] or [`RunConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2png::{DispatchPolicy, RunConfig};
///
/// let config = RunConfig::builder()
///     .pages(3, 5)
///     .dpi(300)
///     .policy(DispatchPolicy::Sequential)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct RunConfig {
    /// First page to process, 1-based. Default: 1.
    pub page_first: u32,

    /// Last page to process, 1-based. Default: 999.
    ///
    /// Together with `page_first == 1`, the default means "all pages" — the
    /// range resolver replaces 999 with the document's true page count once
    /// the file is open.
    pub page_last: u32,

    /// Render resolution. Range: 50–1000. Default: 150.
    ///
    /// 150 DPI keeps text legible while a letter-size page stays around
    /// 1275 × 1650 px. Raise it for print-quality output, at a roughly
    /// quadratic cost in pixels and bytes per page.
    pub dpi: u32,

    /// Dispatch policy. Default: [`DispatchPolicy::Concurrent`].
    pub policy: DispatchPolicy,

    /// Maximum in-flight pages under concurrent dispatch. Default: 8.
    ///
    /// Unbounded fan-out against a large document risks resource exhaustion
    /// (raster buffers are megabytes each), so in-flight work is always
    /// bounded. Rendering itself serialises inside the pdfium worker; the
    /// concurrency mostly overlaps PNG encoding and file writes.
    pub concurrency: usize,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Parent directory for the `output-<timestamp>` run directory.
    /// `None` means the current working directory.
    pub output_parent: Option<PathBuf>,

    /// Optional progress callback fired per page and per run.
    pub progress_callback: Option<Arc<dyn RunProgressCallback>>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            page_first: PAGE_MIN,
            page_last: LAST_SENTINEL,
            dpi: DPI_DEFAULT,
            policy: DispatchPolicy::default(),
            concurrency: 8,
            password: None,
            output_parent: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("page_first", &self.page_first)
            .field("page_last", &self.page_last)
            .field("dpi", &self.dpi)
            .field("policy", &self.policy)
            .field("concurrency", &self.concurrency)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("output_parent", &self.output_parent)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl RunConfig {
    /// Create a new builder for `RunConfig`.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder {
            config: Self::default(),
        }
    }

    /// Whether this request is the all-pages sentinel `(1, 999)`.
    pub fn is_all_pages(&self) -> bool {
        self.page_first == PAGE_MIN && self.page_last == LAST_SENTINEL
    }
}

/// Builder for [`RunConfig`].
#[derive(Debug)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    /// Set the 1-based inclusive page interval.
    pub fn pages(mut self, first: u32, last: u32) -> Self {
        self.config.page_first = first;
        self.config.page_last = last;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn policy(mut self, policy: DispatchPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    /// Create the run directory under `dir` instead of the current working
    /// directory. The directory itself is still named `output-<timestamp>`.
    pub fn output_parent(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_parent = Some(dir.into());
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn RunProgressCallback>) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, running the pre-open range and DPI checks.
    pub fn build(self) -> Result<RunConfig, Pdf2PngError> {
        let c = &self.config;
        range::validate_request(c.page_first, c.page_last, c.dpi)?;
        if c.concurrency == 0 {
            return Err(Pdf2PngError::InvalidConfig(
                "concurrency must be at least 1".into(),
            ));
        }
        Ok(self.config)
    }
}
