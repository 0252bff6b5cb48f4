use crate::title_ref::HasTitleRef;
use serde::Serialize;
use std::collections::HashSet;

/// Result of a fetch that completed and passed validation.
///
/// A `Snapshot` is only ever built after the fetcher has confirmed the
/// response was genuine (authenticated, parseable, not truncated), so an
/// empty snapshot means "legitimately empty". Failed fetches never produce
/// one; they surface as `SyncError::FetchFailure` instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot<T> {
    items: Vec<T>,
    duplicates_dropped: usize,
}

impl<T: HasTitleRef> Snapshot<T> {
    /// Deduplicates by title, keeping the first occurrence and the input order
    pub fn verified(items: Vec<T>) -> Self {
        let mut seen = HashSet::new();
        let total = items.len();
        let items: Vec<T> = items
            .into_iter()
            .filter(|item| seen.insert(item.title_ref().clone()))
            .collect();
        let duplicates_dropped = total - items.len();
        Self {
            items,
            duplicates_dropped,
        }
    }
}

impl<T> Snapshot<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            duplicates_dropped: 0,
        }
    }
}
