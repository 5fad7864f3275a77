//! Filter + paginate view model.
//!
//! [`filter`] and [`paginate`] are pure slices over the inventory. [`ViewState`]
//! is the per-session cursor that keeps `total_pages` and `current_page`
//! consistent whenever the inventory or the search term changes.

use serde::Serialize;

use crate::item::InventoryItem;

/// Items whose canonical name contains `search_term` (case-insensitive).
///
/// An empty term returns the inventory unchanged. Relative order is preserved.
pub fn filter<'a>(inventory: &'a [InventoryItem], search_term: &str) -> Vec<&'a InventoryItem> {
    if search_term.is_empty() {
        return inventory.iter().collect();
    }
    let needle = search_term.to_lowercase();
    inventory
        .iter()
        .filter(|item| item.name.to_lowercase().contains(&needle))
        .collect()
}

/// Slice `[(page - 1) * page_size, page * page_size)` clipped to bounds.
///
/// Pages are 1-based. Page 0 or a zero page size yields an empty slice; the
/// caller is responsible for clamping `page` into `[1, total_pages]`.
pub fn paginate<T>(filtered: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size).min(filtered.len());
    let end = page.saturating_mul(page_size).min(filtered.len());
    &filtered[start..end]
}

/// `max(1, ceil(filtered_len / page_size))`.
pub fn total_pages(filtered_len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    filtered_len.div_ceil(page_size).max(1)
}

/// Presentation-ready page of the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewPage {
    pub items: Vec<InventoryItem>,
    pub search_term: String,
    pub current_page: usize,
    pub total_pages: usize,
    pub items_per_page: usize,
    /// Size of the filtered list (all pages).
    pub matching_items: usize,
    /// Size of the unfiltered inventory.
    pub total_items: usize,
}

/// Per-session search/pagination cursor. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    search_term: String,
    current_page: usize,
    items_per_page: usize,
    total_pages: usize,
}

impl ViewState {
    pub fn new(items_per_page: usize) -> Self {
        Self {
            search_term: String::new(),
            current_page: 1,
            items_per_page: items_per_page.max(1),
            total_pages: 1,
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Replace the search term and go back to the first page.
    ///
    /// `total_pages` is stale until the next [`ViewState::render`].
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.current_page = 1;
    }

    /// Jump to `page`, clamped into `[1, total_pages]`.
    pub fn go_to(&mut self, page: usize) {
        self.current_page = page.clamp(1, self.total_pages);
    }

    pub fn next_page(&mut self) {
        if self.current_page < self.total_pages {
            self.current_page += 1;
        }
    }

    pub fn previous_page(&mut self) {
        if self.current_page > 1 {
            self.current_page -= 1;
        }
    }

    /// Recompute pagination against `inventory` and produce the current page.
    ///
    /// `total_pages` comes from the filtered length; `current_page` is pulled
    /// back into range if the filtered list shrank.
    pub fn render(&mut self, inventory: &[InventoryItem]) -> ViewPage {
        let filtered = filter(inventory, &self.search_term);
        self.total_pages = total_pages(filtered.len(), self.items_per_page);
        self.current_page = self.current_page.clamp(1, self.total_pages);

        let items = paginate(&filtered, self.current_page, self.items_per_page)
            .iter()
            .map(|item| (*item).clone())
            .collect();

        ViewPage {
            items,
            search_term: self.search_term.clone(),
            current_page: self.current_page,
            total_pages: self.total_pages,
            items_per_page: self.items_per_page,
            matching_items: filtered.len(),
            total_items: inventory.len(),
        }
    }
}
