use async_trait::async_trait;
use media_sync_models::{
    HistoryEntry, MediaKind, RatingEntry, Result, Snapshot, TitleRef, WatchlistEntry,
};
use serde::Serialize;
use std::collections::HashSet;

/// Read-only catalog whose state is authoritative.
///
/// Implementations must return `Err` on authentication, parse or truncation
/// failures; an `Ok` snapshot, even an empty one, asserts the fetch was genuine.
#[async_trait]
pub trait SourceCatalog: Send + Sync {
    fn catalog_name(&self) -> &str;

    async fn watchlist(&self, kind: MediaKind) -> Result<Snapshot<WatchlistEntry>>;
    async fn ratings(&self, kind: MediaKind) -> Result<Snapshot<RatingEntry>>;
    /// Watched movies
    async fn history(&self) -> Result<Snapshot<HistoryEntry>>;
}

/// Read/write catalog being brought in line with the source.
///
/// Every write takes the whole batch for one kind in a single call.
#[async_trait]
pub trait DestinationCatalog: Send + Sync {
    fn catalog_name(&self) -> &str;

    async fn watchlist(&self, kind: MediaKind) -> Result<Snapshot<WatchlistEntry>>;
    async fn ratings(&self, kind: MediaKind) -> Result<Snapshot<RatingEntry>>;
    /// Watched movies
    async fn history(&self) -> Result<Snapshot<HistoryEntry>>;

    async fn add_to_watchlist(&self, kind: MediaKind, items: &[TitleRef]) -> Result<WriteOutcome>;
    async fn remove_from_watchlist(&self, kind: MediaKind, items: &[TitleRef]) -> Result<WriteOutcome>;
    async fn add_ratings(&self, kind: MediaKind, items: &[RatingEntry]) -> Result<WriteOutcome>;
    async fn remove_ratings(&self, kind: MediaKind, items: &[TitleRef]) -> Result<WriteOutcome>;
    async fn add_history(&self, items: &[HistoryEntry]) -> Result<WriteOutcome>;
}

/// Per-item result of one batched write
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    pub accepted: Vec<TitleRef>,
    pub not_found: Vec<TitleRef>,
}

impl WriteOutcome {
    /// Splits `batch` into accepted and not-found, preserving batch order.
    ///
    /// Ids the destination reports as not found but that were never sent are ignored.
    pub fn from_batch<'a, I>(batch: I, not_found: &[TitleRef]) -> Self
    where
        I: IntoIterator<Item = &'a TitleRef>,
    {
        let missing: HashSet<&TitleRef> = not_found.iter().collect();
        let (not_found, accepted): (Vec<TitleRef>, Vec<TitleRef>) = batch
            .into_iter()
            .cloned()
            .partition(|id| missing.contains(id));
        Self { accepted, not_found }
    }
}
