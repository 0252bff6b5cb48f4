//! In-memory catalogs for reconciler and orchestrator tests

use async_trait::async_trait;
use media_sync_models::{
    HistoryEntry, MediaKind, RatingEntry, Result, Snapshot, SyncError, TitleRef, WatchlistEntry,
};
use media_sync_sources::{DestinationCatalog, SourceCatalog, WriteOutcome};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

fn join(ids: &[TitleRef]) -> String {
    ids.iter().map(TitleRef::as_str).collect::<Vec<_>>().join(", ")
}

#[derive(Default)]
pub struct FakeSource {
    pub watchlist: HashMap<MediaKind, Vec<WatchlistEntry>>,
    pub ratings: HashMap<MediaKind, Vec<RatingEntry>>,
    pub history: Vec<HistoryEntry>,
    fail_on: Option<String>,
}

impl FakeSource {
    pub fn failing_on(mut self, call: &str) -> Self {
        self.fail_on = Some(call.to_string());
        self
    }

    fn check(&self, call: String) -> Result<()> {
        if self.fail_on.as_deref() == Some(call.as_str()) {
            return Err(SyncError::fetch(call, "simulated failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl SourceCatalog for FakeSource {
    fn catalog_name(&self) -> &str {
        "fake-source"
    }

    async fn watchlist(&self, kind: MediaKind) -> Result<Snapshot<WatchlistEntry>> {
        self.check(format!("watchlist {}", kind.plural()))?;
        Ok(Snapshot::verified(self.watchlist.get(&kind).cloned().unwrap_or_default()))
    }

    async fn ratings(&self, kind: MediaKind) -> Result<Snapshot<RatingEntry>> {
        self.check(format!("ratings {}", kind.plural()))?;
        Ok(Snapshot::verified(self.ratings.get(&kind).cloned().unwrap_or_default()))
    }

    async fn history(&self) -> Result<Snapshot<HistoryEntry>> {
        self.check("history".to_string())?;
        Ok(Snapshot::verified(self.history.clone()))
    }
}

#[derive(Default)]
struct DestinationState {
    watchlist: HashMap<MediaKind, Vec<WatchlistEntry>>,
    ratings: HashMap<MediaKind, Vec<RatingEntry>>,
    history: Vec<HistoryEntry>,
}

/// Destination that applies writes to its own state and records every call
#[derive(Default)]
pub struct FakeDestination {
    state: Mutex<DestinationState>,
    unknown: HashSet<TitleRef>,
    fail_on: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeDestination {
    /// Titles the destination answers with "not found"
    pub fn with_unknown(mut self, raw: &[&str]) -> Self {
        self.unknown = raw.iter().map(|r| TitleRef::parse(r).unwrap()).collect();
        self
    }

    /// Fails every call whose name starts with `call`
    pub fn failing_on(mut self, call: &str) -> Self {
        self.fail_on = Some(call.to_string());
        self
    }

    pub fn with_watchlist(self, kind: MediaKind, entries: Vec<WatchlistEntry>) -> Self {
        self.state.lock().unwrap().watchlist.insert(kind, entries);
        self
    }

    pub fn with_ratings(self, kind: MediaKind, entries: Vec<RatingEntry>) -> Self {
        self.state.lock().unwrap().ratings.insert(kind, entries);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn watchlist_ids(&self, kind: MediaKind) -> Vec<TitleRef> {
        let state = self.state.lock().unwrap();
        state
            .watchlist
            .get(&kind)
            .map(|entries| entries.iter().map(|e| e.id.clone()).collect())
            .unwrap_or_default()
    }

    fn record(&self, call: String) -> Result<()> {
        let failing = self
            .fail_on
            .as_deref()
            .map_or(false, |prefix| call.starts_with(prefix));
        self.calls.lock().unwrap().push(call.clone());
        if failing {
            if call.starts_with("add") || call.starts_with("remove") {
                return Err(SyncError::write(call, "500 Internal Server Error"));
            }
            return Err(SyncError::fetch(call, "500 Internal Server Error"));
        }
        Ok(())
    }

    fn outcome(&self, ids: &[TitleRef]) -> WriteOutcome {
        let unknown: Vec<TitleRef> = ids.iter().filter(|id| self.unknown.contains(id)).cloned().collect();
        WriteOutcome::from_batch(ids, &unknown)
    }
}

#[async_trait]
impl DestinationCatalog for FakeDestination {
    fn catalog_name(&self) -> &str {
        "fake-destination"
    }

    async fn watchlist(&self, kind: MediaKind) -> Result<Snapshot<WatchlistEntry>> {
        self.record(format!("watchlist {}", kind.plural()))?;
        let state = self.state.lock().unwrap();
        Ok(Snapshot::verified(state.watchlist.get(&kind).cloned().unwrap_or_default()))
    }

    async fn ratings(&self, kind: MediaKind) -> Result<Snapshot<RatingEntry>> {
        self.record(format!("ratings {}", kind.plural()))?;
        let state = self.state.lock().unwrap();
        Ok(Snapshot::verified(state.ratings.get(&kind).cloned().unwrap_or_default()))
    }

    async fn history(&self) -> Result<Snapshot<HistoryEntry>> {
        self.record("history movies".to_string())?;
        Ok(Snapshot::verified(self.state.lock().unwrap().history.clone()))
    }

    async fn add_to_watchlist(&self, kind: MediaKind, items: &[TitleRef]) -> Result<WriteOutcome> {
        self.record(format!("add_to_watchlist {} [{}]", kind.plural(), join(items)))?;
        let outcome = self.outcome(items);
        let mut state = self.state.lock().unwrap();
        let list = state.watchlist.entry(kind).or_default();
        list.extend(outcome.accepted.iter().cloned().map(WatchlistEntry::new));
        Ok(outcome)
    }

    async fn remove_from_watchlist(&self, kind: MediaKind, items: &[TitleRef]) -> Result<WriteOutcome> {
        self.record(format!("remove_from_watchlist {} [{}]", kind.plural(), join(items)))?;
        let outcome = self.outcome(items);
        let mut state = self.state.lock().unwrap();
        if let Some(list) = state.watchlist.get_mut(&kind) {
            list.retain(|e| !outcome.accepted.contains(&e.id));
        }
        Ok(outcome)
    }

    async fn add_ratings(&self, kind: MediaKind, items: &[RatingEntry]) -> Result<WriteOutcome> {
        let ids: Vec<TitleRef> = items.iter().map(|r| r.id.clone()).collect();
        self.record(format!("add_ratings {} [{}]", kind.plural(), join(&ids)))?;
        let outcome = self.outcome(&ids);
        let mut state = self.state.lock().unwrap();
        let list = state.ratings.entry(kind).or_default();
        for item in items.iter().filter(|r| outcome.accepted.contains(&r.id)) {
            list.retain(|existing| existing.id != item.id);
            list.push(item.clone());
        }
        Ok(outcome)
    }

    async fn remove_ratings(&self, kind: MediaKind, items: &[TitleRef]) -> Result<WriteOutcome> {
        self.record(format!("remove_ratings {} [{}]", kind.plural(), join(items)))?;
        let outcome = self.outcome(items);
        let mut state = self.state.lock().unwrap();
        if let Some(list) = state.ratings.get_mut(&kind) {
            list.retain(|r| !outcome.accepted.contains(&r.id));
        }
        Ok(outcome)
    }

    async fn add_history(&self, items: &[HistoryEntry]) -> Result<WriteOutcome> {
        let ids: Vec<TitleRef> = items.iter().map(|h| h.id.clone()).collect();
        self.record(format!("add_history [{}]", join(&ids)))?;
        let outcome = self.outcome(&ids);
        let mut state = self.state.lock().unwrap();
        state
            .history
            .extend(items.iter().filter(|h| outcome.accepted.contains(&h.id)).cloned());
        Ok(outcome)
    }
}
