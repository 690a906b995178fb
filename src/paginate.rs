//! Fixed-size pages over a filtered collection, plus the browsing state that
//! ties filter, search term and page number together.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::{
    fields::FieldMap,
    filter::{FilterError, FilterSpec},
    record::Record,
};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_BUTTONS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page actually shown, after clamping.
    pub page: usize,
    pub page_count: usize,
    pub total: usize,
    pub visible_pages: Vec<usize>,
}

pub fn page_count(len: usize, page_size: NonZeroUsize) -> usize {
    len.div_ceil(page_size.get())
}

/// Clamps `page` into `1..=max(page_count, 1)`.
pub fn clamp_page(page: usize, page_count: usize) -> usize {
    page.clamp(1, page_count.max(1))
}

/// Up to [`MAX_PAGE_BUTTONS`] consecutive page numbers around `page`, shifted
/// at the upper edge so the window stays full.
pub fn visible_page_numbers(page: usize, page_count: usize) -> Vec<usize> {
    if page_count == 0 {
        return Vec::new();
    }
    let page = clamp_page(page, page_count);
    let mut start = page.saturating_sub(MAX_PAGE_BUTTONS / 2).max(1);
    let mut end = start + MAX_PAGE_BUTTONS - 1;
    if end > page_count {
        end = page_count;
        start = (end + 1).saturating_sub(MAX_PAGE_BUTTONS).max(1);
    }
    (start..=end).collect()
}

pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: NonZeroUsize) -> Page<T> {
    let count = page_count(items.len(), page_size);
    let page = clamp_page(page, count);
    let start = ((page - 1) * page_size.get()).min(items.len());
    let end = (start + page_size.get()).min(items.len());
    Page {
        items: items[start..end].to_vec(),
        page,
        page_count: count,
        total: items.len(),
        visible_pages: visible_page_numbers(page, count),
    }
}

/// What the operator is looking at. Every transition returns a new state;
/// changing the filter or the search term sends the view back to page 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowseState {
    pub filter: FilterSpec,
    pub search: String,
    pub page: usize,
}

impl Default for BrowseState {
    fn default() -> Self {
        Self {
            filter: FilterSpec::default(),
            search: String::new(),
            page: 1,
        }
    }
}

impl BrowseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(self, filter: FilterSpec) -> Self {
        Self {
            filter,
            page: 1,
            ..self
        }
    }

    pub fn with_search(self, search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            page: 1,
            ..self
        }
    }

    pub fn with_page(self, page: usize) -> Self {
        Self { page, ..self }
    }

    pub fn reset(self) -> Self {
        Self::default()
    }

    /// Filters and paginates `records`. The returned state carries the
    /// clamped page number.
    pub fn view<'a>(
        &self,
        records: &'a [Record],
        fields: &FieldMap,
        page_size: NonZeroUsize,
    ) -> Result<BrowseView<'a>, FilterError> {
        let matched = crate::filter::apply(records, &self.filter, &self.search, fields)?;
        let page = paginate(&matched, self.page, page_size);
        let state = self.clone().with_page(page.page);
        Ok(BrowseView {
            state,
            matched,
            page,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BrowseView<'a> {
    pub state: BrowseState,
    /// Every record passing the filter, for export.
    pub matched: Vec<&'a Record>,
    pub page: Page<&'a Record>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn window_shifts_near_edges() {
        assert_eq!(visible_page_numbers(1, 20), (1..=10).collect::<Vec<_>>());
        assert_eq!(visible_page_numbers(10, 20), (5..=14).collect::<Vec<_>>());
        assert_eq!(visible_page_numbers(20, 20), (11..=20).collect::<Vec<_>>());
        assert_eq!(visible_page_numbers(3, 4), vec![1, 2, 3, 4]);
        assert!(visible_page_numbers(1, 0).is_empty());
    }

    #[test]
    fn out_of_range_pages_clamp() {
        let items = (1..=25).collect::<Vec<_>>();
        let last = paginate(&items, 99, size(10));
        assert_eq!(last.page, 3);
        assert_eq!(last.items, vec![21, 22, 23, 24, 25]);
        let first = paginate(&items, 0, size(10));
        assert_eq!(first.page, 1);
        assert_eq!(first.items.len(), 10);
    }

    #[test]
    fn state_transitions_reset_page() {
        let state = BrowseState::new().with_page(4);
        assert_eq!(state.page, 4);
        assert_eq!(state.clone().with_search("иванов").page, 1);
        assert_eq!(state.with_filter(FilterSpec::default()).page, 1);
    }
}
