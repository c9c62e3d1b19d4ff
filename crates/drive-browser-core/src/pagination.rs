//! Page window computation over a fetched file list.

use crate::storage::FileEntry;
use std::num::NonZeroUsize;

/// Number of entries per page, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize(NonZeroUsize);

impl PageSize {
    /// Returns `None` for a zero size.
    #[must_use]
    pub const fn new(size: usize) -> Option<Self> {
        match NonZeroUsize::new(size) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    /// Raw size
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(NonZeroUsize::MIN.saturating_add(crate::config::DEFAULT_PAGE_SIZE - 1))
    }
}

/// Visible slice of the file list plus navigation affordances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a> {
    /// Entries shown on this page, at most `page_size` of them
    pub entries: &'a [FileEntry],
    /// A "previous" button should be rendered
    pub has_previous: bool,
    /// A "next" button should be rendered
    pub has_next: bool,
}

impl Page<'_> {
    /// No entries and no navigation
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.entries.is_empty() && !self.has_previous && !self.has_next
    }
}

/// Compute page `page_index` of `all_files`.
///
/// The window `[page_index * size, page_index * size + size)` is clipped to
/// the list. A window starting past the end yields an empty page that still
/// reports `has_previous` for any `page_index > 0`.
///
/// # Examples
///
/// ```
/// use drive_browser_core::{paginate, FileEntry, PageSize};
///
/// let files: Vec<FileEntry> = (1..=25)
///     .map(|i| FileEntry::new(format!("id{i}"), format!("file{i}")))
///     .collect();
/// let page = paginate(&files, 2, PageSize::new(10).expect("non-zero"));
/// assert_eq!(page.entries.len(), 5);
/// assert!(page.has_previous);
/// assert!(!page.has_next);
/// ```
#[must_use]
pub fn paginate(all_files: &[FileEntry], page_index: usize, page_size: PageSize) -> Page<'_> {
    let size = page_size.get();
    let total = all_files.len();
    let start = page_index.saturating_mul(size).min(total);
    let end = start.saturating_add(size).min(total);

    Page {
        entries: &all_files[start..end],
        has_previous: page_index > 0,
        has_next: total > page_index.saturating_add(1).saturating_mul(size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn files(n: usize) -> Vec<FileEntry> {
        (1..=n)
            .map(|i| FileEntry::new(format!("id{i}"), format!("file{i}")))
            .collect()
    }

    fn ten() -> PageSize {
        PageSize::default()
    }

    #[test]
    fn test_first_page_of_25() {
        let all = files(25);
        let page = paginate(&all, 0, ten());
        assert_eq!(page.entries.len(), 10);
        assert_eq!(page.entries[0].name, "file1");
        assert_eq!(page.entries[9].name, "file10");
        assert!(!page.has_previous);
        assert!(page.has_next);
    }

    #[test]
    fn test_last_page_of_25() {
        let all = files(25);
        let page = paginate(&all, 2, ten());
        let names: Vec<&str> = page.entries.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["file21", "file22", "file23", "file24", "file25"]);
        assert!(page.has_previous);
        assert!(!page.has_next);
    }

    #[test]
    fn test_exact_multiple_has_no_next() {
        let all = files(20);
        let page = paginate(&all, 1, ten());
        assert_eq!(page.entries.len(), 10);
        assert!(!page.has_next);
    }

    #[test]
    fn test_past_the_end_is_empty_with_previous() {
        let all = files(25);
        let page = paginate(&all, 7, ten());
        assert!(page.entries.is_empty());
        assert!(page.has_previous);
        assert!(!page.has_next);
    }

    #[test]
    fn test_empty_list() {
        let page = paginate(&[], 0, ten());
        assert!(page.is_blank());
    }

    #[test]
    fn test_huge_index_does_not_overflow() {
        let all = files(3);
        let page = paginate(&all, usize::MAX, ten());
        assert!(page.entries.is_empty());
        assert!(!page.has_next);
    }

    #[test]
    fn test_zero_page_size_is_unrepresentable() {
        assert!(PageSize::new(0).is_none());
        assert_eq!(PageSize::default().get(), 10);
    }

    proptest! {
        #[test]
        fn prop_page_bounds(total in 0usize..200, page_index in 0usize..40, size in 1usize..30) {
            let all = files(total);
            let page_size = PageSize::new(size).unwrap_or_default();
            let page = paginate(&all, page_index, page_size);

            prop_assert!(page.entries.len() <= size);
            let shown_through = page_index * size + page.entries.len();
            prop_assert_eq!(page.has_next, shown_through < total);
            prop_assert_eq!(page.has_previous, page_index > 0);
        }
    }
}
