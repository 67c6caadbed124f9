//! Run metadata: per-page records, the thread-safe recorder, and the final
//! serialisable summary.
//!
//! The recorder keeps running totals (`total_bytes`, file count) incrementally
//! so a `record` call is O(1) regardless of how many pages a run has. Appends
//! are guarded by a mutex because page-completion events race under
//! concurrent dispatch; the lock is held only for the push and the addition.
//!
//! [`RunRecorder::finish`] consumes the recorder — it is called exactly once,
//! after the dispatcher's join barrier, and only for fully successful runs.
//! A failed run never produces a [`RunMetadata`].

use crate::pipeline::range::ResolvedRange;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;

/// One successfully produced page image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFile {
    /// 1-based page number within the source document.
    pub page_number: u32,
    /// File name inside the run directory, e.g. `image-0042.png`.
    pub file_name: String,
    /// Size of the written file in bytes.
    pub bytes: u64,
}

/// The immutable summary of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Directory the run was started from.
    pub working_dir: PathBuf,
    /// Name of the `output-<timestamp>` directory the images were written to.
    pub output_folder: String,
    /// The source PDF as given by the caller.
    pub source_file: String,
    /// `page_last - page_first + 1` after sentinel expansion.
    pub pages_in_range: u32,
    /// First page processed, 1-based.
    pub page_first: u32,
    /// Last page processed, 1-based, after sentinel expansion.
    pub page_last: u32,
    /// Total pages in the source document.
    pub pages_in_file: u32,
    /// Whether the request was the all-pages sentinel.
    pub all_pages: bool,
    /// Render resolution used.
    pub dpi: u32,
    /// Run start, seconds since the Unix epoch.
    pub started: i64,
    /// Run completion, seconds since the Unix epoch.
    pub completed: i64,
    /// `completed - started`.
    pub seconds_spent: i64,
    /// Sum of `bytes` across `files`.
    pub total_bytes: u64,
    /// Produced files, ordered by page number.
    pub files: Vec<PageFile>,
}

/// Static per-run facts known before the first page is dispatched.
#[derive(Debug, Clone)]
pub struct RunHeader {
    pub working_dir: PathBuf,
    pub output_folder: String,
    pub source_file: String,
    pub range: ResolvedRange,
    pub dpi: u32,
    pub started: i64,
}

#[derive(Debug, Default)]
struct RecorderInner {
    total_bytes: u64,
    files: Vec<PageFile>,
}

/// Accumulates page results into run-level metadata.
///
/// Safe to call [`record`](Self::record) from concurrently completing pages.
#[derive(Debug)]
pub struct RunRecorder {
    header: RunHeader,
    inner: Mutex<RecorderInner>,
}

impl RunRecorder {
    pub fn new(header: RunHeader) -> Self {
        let capacity = header.range.pages_in_range() as usize;
        Self {
            header,
            inner: Mutex::new(RecorderInner {
                total_bytes: 0,
                files: Vec::with_capacity(capacity),
            }),
        }
    }

    /// Append one successful page. Called at most once per page number.
    pub fn record(&self, file: PageFile) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.total_bytes += file.bytes;
        inner.files.push(file);
    }

    /// Number of pages recorded so far.
    pub fn files_recorded(&self) -> u32 {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.files.len() as u32
    }

    /// Take the immutable snapshot. Files are sorted by page number so the
    /// reported order is deterministic even when pages completed out of
    /// order.
    pub fn finish(self, completed: i64) -> RunMetadata {
        let inner = self.inner.into_inner().unwrap_or_else(|e| e.into_inner());
        let mut files = inner.files;
        files.sort_by_key(|f| f.page_number);

        let header = self.header;
        RunMetadata {
            working_dir: header.working_dir,
            output_folder: header.output_folder,
            source_file: header.source_file,
            pages_in_range: header.range.pages_in_range(),
            page_first: header.range.first,
            page_last: header.range.last,
            pages_in_file: header.range.page_count,
            all_pages: header.range.all_pages,
            dpi: header.dpi,
            started: header.started,
            completed,
            seconds_spent: completed - header.started,
            total_bytes: inner.total_bytes,
            files,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::range;
    use std::sync::Arc;

    fn header() -> RunHeader {
        RunHeader {
            working_dir: PathBuf::from("/work"),
            output_folder: "output-20260824120000".into(),
            source_file: "doc.pdf".into(),
            range: range::resolve(3, 5, 10).unwrap(),
            dpi: 150,
            started: 1_000,
        }
    }

    fn page(n: u32, bytes: u64) -> PageFile {
        PageFile {
            page_number: n,
            file_name: format!("image-{n:04}.png"),
            bytes,
        }
    }

    #[test]
    fn totals_accumulate_incrementally() {
        let rec = RunRecorder::new(header());
        rec.record(page(3, 100));
        rec.record(page(4, 250));
        rec.record(page(5, 50));
        assert_eq!(rec.files_recorded(), 3);

        let meta = rec.finish(1_007);
        assert_eq!(meta.total_bytes, 400);
        assert_eq!(
            meta.total_bytes,
            meta.files.iter().map(|f| f.bytes).sum::<u64>()
        );
        assert_eq!(meta.seconds_spent, 7);
        assert_eq!(meta.pages_in_range, 3);
        assert_eq!(meta.files.len() as u32, meta.pages_in_range);
    }

    #[test]
    fn snapshot_sorts_by_page_number() {
        let rec = RunRecorder::new(header());
        // Completion order under concurrent dispatch is arbitrary.
        rec.record(page(5, 1));
        rec.record(page(3, 1));
        rec.record(page(4, 1));

        let meta = rec.finish(1_001);
        let pages: Vec<u32> = meta.files.iter().map(|f| f.page_number).collect();
        assert_eq!(pages, vec![3, 4, 5]);
    }

    #[test]
    fn concurrent_records_do_not_lose_updates() {
        let rec = Arc::new(RunRecorder::new(RunHeader {
            range: range::resolve(1, 64, 100).unwrap(),
            ..header()
        }));

        let handles: Vec<_> = (1..=64u32)
            .map(|n| {
                let rec = Arc::clone(&rec);
                std::thread::spawn(move || rec.record(page(n, 10)))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let rec = Arc::try_unwrap(rec).unwrap();
        let meta = rec.finish(2_000);
        assert_eq!(meta.files.len(), 64);
        assert_eq!(meta.total_bytes, 640);
        // Sorted despite arbitrary completion order.
        assert!(meta
            .files
            .windows(2)
            .all(|w| w[0].page_number < w[1].page_number));
    }

    #[test]
    fn metadata_round_trips_through_json() {
        let rec = RunRecorder::new(header());
        rec.record(page(3, 123));
        let meta = rec.finish(1_002);

        let json = serde_json::to_string(&meta).unwrap();
        let back: RunMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back.total_bytes, 123);
        assert_eq!(back.files, meta.files);
        assert!(!back.all_pages);
    }
}
