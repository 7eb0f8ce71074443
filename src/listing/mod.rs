//! Filter, sort and paginate the resort collection for display.
//!
//! [`process`] is pure: it borrows the collection and returns references into
//! it, so repeated calls with the same arguments yield the very same elements
//! and the input is never modified. Filtering and sorting are recomputed from
//! scratch on every call.

pub mod filter;
pub mod sort;

pub use filter::{build_predicates, Predicate};
pub use sort::{collation_key, compare_names, sort_resorts, SortKey};

use crate::resort::ResortSnapshot;

pub const DEFAULT_PAGE_SIZE: usize = 24;
/// Increment applied by [`ListConfig::grow_page`]
pub const PAGE_STEP: usize = 24;

/// Active filter, sort and page settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ListConfig {
    /// Case-insensitive substring of the resort name; blank disables it
    pub search_query: String,
    /// Keep only `Open` and `PartiallyOpen` resorts
    pub open_only: bool,
    /// Exact country code; empty disables it
    pub country: String,
    /// Exact region name; empty disables it. Applies with or without a country.
    pub region: String,
    /// `None` keeps the input order
    pub sort_key: Option<SortKey>,
    /// Number of entries to return; zero is treated as one
    pub page_size: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            open_only: false,
            country: String::new(),
            region: String::new(),
            sort_key: Some(SortKey::ShredScore),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListConfig {
    /// "Load more": extend the page by [`PAGE_STEP`]
    pub fn grow_page(&mut self) {
        self.page_size = self.page_size.max(1).saturating_add(PAGE_STEP);
    }
}

/// The visible page plus the number of resorts that passed the filters.
#[derive(Debug, Clone, PartialEq)]
pub struct ListResult<'a> {
    pub visible: Vec<&'a ResortSnapshot>,
    pub total_filtered: usize,
}

impl ListResult<'_> {
    /// Whether a larger page would show more resorts
    pub fn has_more(&self) -> bool {
        self.total_filtered > self.visible.len()
    }
}

/// Filter, sort and slice `all` according to `config`.
pub fn process<'a>(all: &'a [ResortSnapshot], config: &ListConfig) -> ListResult<'a> {
    let predicates = build_predicates(config, all);
    let mut matched: Vec<&ResortSnapshot> = all
        .iter()
        .filter(|r| predicates.iter().all(|p| p.matches(r)))
        .collect();

    if let Some(key) = config.sort_key {
        sort_resorts(&mut matched, key);
    }

    let total_filtered = matched.len();
    matched.truncate(config.page_size.max(1));

    ListResult {
        visible: matched,
        total_filtered,
    }
}
