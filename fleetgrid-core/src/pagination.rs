use crate::models::PageState;
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::Range;

/// Width of the sliding window of page numbers shown in navigation.
pub const PAGE_WINDOW: usize = 5;

/// Slice of a collection for the current page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub visible: &'a [T],
    pub total_pages: usize,
    pub clamped_page: usize,
    /// Zero-based positions of `visible` within the paginated collection.
    pub range: Range<usize>,
}

impl<T> Page<'_, T> {
    /// One-based inclusive bounds of the rows shown, or `None` for an empty
    /// page.
    pub fn row_bounds(&self) -> Option<(usize, usize)> {
        if self.range.is_empty() {
            None
        } else {
            Some((self.range.start + 1, self.range.end))
        }
    }
}

/// `max(1, ceil(len / page_size))`.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

/// Bound a requested page into `[1, total_pages]`.
pub fn clamp_page(requested: usize, total_pages: usize) -> usize {
    requested.clamp(1, total_pages.max(1))
}

/// Zero-based slice bounds for a page of a collection of `len` items.
pub fn page_range(len: usize, page: &PageState) -> (Range<usize>, usize, usize) {
    let page_size = page.page_size.max(1);
    let total = total_pages(len, page_size);
    let clamped = clamp_page(page.current_page, total);
    let start = ((clamped - 1) * page_size).min(len);
    let end = (clamped * page_size).min(len);
    (start..end, total, clamped)
}

/// Cut the current page out of `records`. Out-of-range pages are clamped,
/// never rejected.
pub fn paginate<'a, T>(records: &'a [T], page: &PageState) -> Page<'a, T> {
    let (range, total_pages, clamped_page) = page_range(records.len(), page);
    Page {
        visible: &records[range.clone()],
        total_pages,
        clamped_page,
        range,
    }
}

/// Entry of the page-number list shown by navigation controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

impl Serialize for PageItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageItem::Page(n) => serializer.serialize_u64(*n as u64),
            PageItem::Ellipsis => serializer.serialize_str("\u{2026}"),
        }
    }
}

impl fmt::Display for PageItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageItem::Page(n) => write!(f, "{}", n),
            PageItem::Ellipsis => f.write_str("\u{2026}"),
        }
    }
}

/// Page numbers to show for navigation.
///
/// Up to five pages are listed in full. Beyond that a five-page window is
/// centred on the current page, kept inside `[1, total_pages]`, and framed by
/// `1 …` when it does not start at the first page and `… total_pages` when
/// it does not end at the last one.
pub fn page_numbers(total_pages: usize, current_page: usize) -> Vec<PageItem> {
    let total = total_pages.max(1);
    if total <= PAGE_WINDOW {
        return (1..=total).map(PageItem::Page).collect();
    }

    let current = clamp_page(current_page, total);
    let half = PAGE_WINDOW / 2;
    let start = current.saturating_sub(half).clamp(1, total - PAGE_WINDOW + 1);
    let end = start + PAGE_WINDOW - 1;

    let mut items = Vec::with_capacity(PAGE_WINDOW + 4);
    if start > 1 {
        items.push(PageItem::Page(1));
        items.push(PageItem::Ellipsis);
    }
    items.extend((start..=end).map(PageItem::Page));
    if end < total {
        items.push(PageItem::Ellipsis);
        items.push(PageItem::Page(total));
    }
    items
}
