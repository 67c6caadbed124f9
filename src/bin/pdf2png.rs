//! CLI binary for pdf2png.
//!
//! A thin shim over the library crate that maps CLI flags to `RunConfig`
//! and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2png::{
    convert, inspect, DispatchPolicy, ProgressCallback, RunConfig, RunProgressCallback,
};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per page.
/// Works correctly when pages complete out of order (concurrent dispatch).
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Bar length is set by `on_run_start` once the range is resolved.
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl RunProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_pages: u32) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Rendering");
    }

    fn on_page_start(&self, page_number: u32, _total: u32) {
        self.bar.set_message(format!("page {page_number}"));
    }

    fn on_page_complete(&self, page_number: u32, total: u32, bytes: u64) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_number,
            total,
            dim(&format!("{bytes:>8} bytes")),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_number: u32, total: u32, error: String) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = if error.len() > 80 {
            format!("{}\u{2026}", &error[..79])
        } else {
            error
        };

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_number,
            total,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, total_pages: u32, completed_pages: u32) {
        self.bar.finish_and_clear();
        if completed_pages == total_pages {
            eprintln!(
                "{} {} pages rendered successfully",
                green("✔"),
                bold(&completed_pages.to_string())
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Render every page at the default 150 dpi
  pdf2png document.pdf

  # Pages 3-5 only, print quality
  pdf2png --first 3 --last 5 --dpi 300 document.pdf

  # One page at a time, abort on the first failure
  pdf2png --sequential document.pdf

  # Machine-readable run summary
  pdf2png --json document.pdf > run.json

  # Page count only, nothing rendered
  pdf2png --inspect-only document.pdf

OUTPUT:
  Images land in ./output-<timestamp>/ (e.g. output-20260824153012/),
  one PNG per page, named image-0001.png, image-0002.png, …
  The directory is created fresh for every run; a mid-run failure leaves
  already-written pages in place.

PAGE RANGES:
  Pages are 1-based and the range is inclusive. The defaults
  (--first 1 --last 999) mean "all pages". A literal range that reaches
  past the end of the document is an error, never a silent truncation.

ENVIRONMENT VARIABLES:
  PDF2PNG_DPI          Default --dpi
  PDF2PNG_CONCURRENCY  Default --concurrency
  PDF2PNG_PASSWORD     Default --password
"#;

/// Rasterise PDF pages to PNG images.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2png",
    version,
    about = "Rasterise PDF pages to PNG images",
    long_about = "Convert a PDF document into a sequence of PNG images, one per requested \
page, written into a freshly created output-<timestamp> directory.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the source PDF.
    input: String,

    /// First page to process (1-based).
    #[arg(long, default_value_t = 1)]
    first: u32,

    /// Last page to process (1-based, inclusive); with --first 1 the
    /// default means "all pages".
    #[arg(long, default_value_t = 999)]
    last: u32,

    /// Render resolution (50–1000).
    #[arg(long, env = "PDF2PNG_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(50..=1000))]
    dpi: u32,

    /// Render pages one at a time, aborting on the first failure.
    #[arg(long)]
    sequential: bool,

    /// Maximum in-flight pages under concurrent dispatch.
    #[arg(short, long, env = "PDF2PNG_CONCURRENCY", default_value_t = 8)]
    concurrency: usize,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2PNG_PASSWORD")]
    password: Option<String>,

    /// Print the run metadata as JSON to stdout.
    #[arg(long, env = "PDF2PNG_JSON")]
    json: bool,

    /// Print the document's page count only, render nothing.
    #[arg(long)]
    inspect_only: bool,

    /// Disable the progress bar.
    #[arg(long, env = "PDF2PNG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2PNG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2PNG_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let info = inspect(&cli.input).await.context("Failed to inspect PDF")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info).context("Failed to serialise metadata")?
            );
        } else {
            println!("File:   {}", info.source_file);
            println!("Pages:  {}", info.page_count);
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as ProgressCallback)
    } else {
        None
    };

    let mut builder = RunConfig::builder()
        .pages(cli.first, cli.last)
        .dpi(cli.dpi)
        .policy(if cli.sequential {
            DispatchPolicy::Sequential
        } else {
            DispatchPolicy::Concurrent
        })
        .concurrency(cli.concurrency);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }

    let config = builder.build().context("Invalid configuration")?;

    // ── Run ──────────────────────────────────────────────────────────────
    let meta = convert(&cli.input, &config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&meta).context("Failed to serialise metadata")?;
        println!("{json}");
    } else if !cli.quiet {
        eprintln!(
            "{}  {} pages  →  {}",
            green("✔"),
            meta.files.len(),
            bold(&meta.output_folder),
        );
        eprintln!(
            "   {}  {}",
            dim(&format!("{}s elapsed", meta.seconds_spent)),
            dim(&format!(
                "{:.2} MB written",
                meta.total_bytes as f64 / 1024.0 / 1024.0
            )),
        );
    }

    Ok(())
}
