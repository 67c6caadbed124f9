//! Page-range validation and resolution.
//!
//! The range lives in two stages because the document's true page count is
//! unknown until the file is opened:
//!
//! 1. [`validate_request`] — structural checks on the raw `(first, last, dpi)`
//!    triple that need no document at all. Runs before anything touches the
//!    filesystem, so a bad range never creates an output directory.
//! 2. [`resolve`] — sentinel expansion against the real page count, producing
//!    a [`ResolvedRange`] whose invariants (`first ≥ 1`, `first ≤ last ≤
//!    page_count`) hold by construction.
//!
//! The pair `(first, last) == (1, 999)` is the reserved "all pages" sentinel
//! inherited from the CLI defaults. A literal range that reaches past the end
//! of the document is a fatal error, never a silent truncation — the caller
//! must not receive fewer pages than explicitly requested without being told.

use crate::error::Pdf2PngError;
use serde::{Deserialize, Serialize};

/// Lowest addressable page number (pages are 1-based).
pub const PAGE_MIN: u32 = 1;

/// Reserved `last` value meaning "through the end of the document" when
/// paired with `first == 1`.
pub const LAST_SENTINEL: u32 = 999;

/// Minimum supported render resolution.
pub const DPI_MIN: u32 = 50;

/// Default render resolution.
pub const DPI_DEFAULT: u32 = 150;

/// Maximum supported render resolution.
pub const DPI_MAX: u32 = 1000;

/// Check the raw request before the document is opened.
///
/// Order matters only for which error a doubly-bad request reports first;
/// each check is independent.
pub fn validate_request(first: u32, last: u32, dpi: u32) -> Result<(), Pdf2PngError> {
    if first < PAGE_MIN {
        return Err(Pdf2PngError::FirstPageBelowMinimum {
            first,
            min: PAGE_MIN,
        });
    }
    if last > LAST_SENTINEL {
        return Err(Pdf2PngError::LastPageAboveMaximum {
            last,
            max: LAST_SENTINEL,
        });
    }
    if first > last {
        return Err(Pdf2PngError::FirstAfterLast { first, last });
    }
    if !(DPI_MIN..=DPI_MAX).contains(&dpi) {
        return Err(Pdf2PngError::DpiOutOfRange {
            dpi,
            min: DPI_MIN,
            max: DPI_MAX,
        });
    }
    Ok(())
}

/// The validated, document-aware page interval actually processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRange {
    /// First page to process, 1-based, inclusive.
    pub first: u32,
    /// Last page to process, 1-based, inclusive. `last ≤ page_count`.
    pub last: u32,
    /// Total pages in the source document.
    pub page_count: u32,
    /// Whether the request was the all-pages sentinel.
    pub all_pages: bool,
}

impl ResolvedRange {
    /// Number of pages in the interval (`last - first + 1`).
    pub fn pages_in_range(&self) -> u32 {
        self.last - self.first + 1
    }

    /// Iterate the 1-based page numbers in increasing order.
    pub fn pages(&self) -> impl Iterator<Item = u32> {
        self.first..=self.last
    }
}

/// Expand the sentinel and check the literal range against the document.
///
/// Callers must have run [`validate_request`] first; this function only
/// applies the checks that need the true page count.
pub fn resolve(first: u32, last: u32, page_count: u32) -> Result<ResolvedRange, Pdf2PngError> {
    let all_pages = first == PAGE_MIN && last == LAST_SENTINEL;

    let effective_last = if all_pages { page_count } else { last };

    if effective_last > page_count || page_count == 0 {
        return Err(Pdf2PngError::RangeExceedsDocument {
            first,
            last: effective_last,
            pages: page_count,
        });
    }

    Ok(ResolvedRange {
        first,
        last: effective_last,
        page_count,
        all_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_literal_request_passes() {
        validate_request(3, 5, 150).expect("literal range is valid");
        validate_request(1, 999, 150).expect("sentinel is valid");
        validate_request(1, 1, 50).expect("single page at dpi min");
        validate_request(999, 999, 1000).expect("last page at dpi max");
    }

    #[test]
    fn first_below_minimum_rejected() {
        let err = validate_request(0, 5, 150).unwrap_err();
        assert!(matches!(
            err,
            Pdf2PngError::FirstPageBelowMinimum { first: 0, .. }
        ));
    }

    #[test]
    fn last_above_sentinel_rejected() {
        let err = validate_request(1, 1000, 150).unwrap_err();
        assert!(matches!(
            err,
            Pdf2PngError::LastPageAboveMaximum { last: 1000, .. }
        ));
    }

    #[test]
    fn inverted_range_rejected_before_open() {
        let err = validate_request(5, 3, 150).unwrap_err();
        assert!(matches!(
            err,
            Pdf2PngError::FirstAfterLast { first: 5, last: 3 }
        ));
    }

    #[test]
    fn dpi_bounds_enforced() {
        let err = validate_request(1, 999, 5).unwrap_err();
        assert!(matches!(err, Pdf2PngError::DpiOutOfRange { dpi: 5, .. }));

        let err = validate_request(1, 999, 1001).unwrap_err();
        assert!(matches!(err, Pdf2PngError::DpiOutOfRange { dpi: 1001, .. }));
    }

    #[test]
    fn sentinel_expands_to_page_count() {
        // 10-page document, request (1, 999)
        let r = resolve(1, 999, 10).expect("sentinel resolves");
        assert_eq!(r.first, 1);
        assert_eq!(r.last, 10);
        assert!(r.all_pages);
        assert_eq!(r.pages_in_range(), 10);
    }

    #[test]
    fn sentinel_works_for_single_page_document() {
        let r = resolve(1, 999, 1).expect("sentinel resolves for 1 page");
        assert_eq!((r.first, r.last), (1, 1));
        assert!(r.all_pages);
    }

    #[test]
    fn literal_range_kept_verbatim() {
        // 10-page document, request (3, 5)
        let r = resolve(3, 5, 10).expect("literal range resolves");
        assert_eq!((r.first, r.last), (3, 5));
        assert!(!r.all_pages);
        assert_eq!(r.pages_in_range(), 3);
        assert_eq!(r.pages().collect::<Vec<_>>(), vec![3, 4, 5]);
    }

    #[test]
    fn literal_range_exceeding_document_is_fatal() {
        // 10-page document, request (3, 15) — never truncated
        let err = resolve(3, 15, 10).unwrap_err();
        assert!(matches!(
            err,
            Pdf2PngError::RangeExceedsDocument {
                first: 3,
                last: 15,
                pages: 10
            }
        ));
    }

    #[test]
    fn full_document_as_literal_range_is_not_all_pages() {
        // (1, 10) of a 10-page document is a legitimate literal request.
        let r = resolve(1, 10, 10).expect("exact literal range resolves");
        assert!(!r.all_pages);
        assert_eq!(r.pages_in_range(), 10);
    }

    #[test]
    fn empty_document_rejected() {
        let err = resolve(1, 999, 0).unwrap_err();
        assert!(matches!(
            err,
            Pdf2PngError::RangeExceedsDocument { pages: 0, .. }
        ));
    }

    #[test]
    fn pages_in_range_arithmetic() {
        for (first, last, count) in [(1u32, 1u32, 5u32), (2, 4, 5), (1, 5, 5), (5, 5, 5)] {
            let r = resolve(first, last, count).unwrap();
            assert_eq!(r.pages_in_range(), last - first + 1);
            assert_eq!(r.pages().count() as u32, r.pages_in_range());
        }
    }
}
