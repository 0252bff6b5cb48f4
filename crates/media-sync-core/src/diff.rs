// Diff computation between the source snapshot and the destination snapshot

use media_sync_models::{
    HasTitleRef, HistoryEntry, RatingEntry, Result, Snapshot, SyncError, TitleRef, WatchlistEntry,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Writes needed to bring the destination in line with the source for one entity kind.
///
/// `add` keeps source order and `remove` keeps destination order, so the same
/// inputs always produce the same diff.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diff<T> {
    pub add: Vec<T>,
    pub remove: Vec<TitleRef>,
    pub update: Vec<T>,
}

impl<T> Diff<T> {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty() && self.update.is_empty()
    }
}

impl<T> Default for Diff<T> {
    fn default() -> Self {
        Self {
            add: Vec::new(),
            remove: Vec::new(),
            update: Vec::new(),
        }
    }
}

/// Refuses to diff against an empty source.
///
/// Even a verified empty snapshot is rejected here: proceeding would turn
/// every destination entry into a removal.
fn guard_source<T>(stage: &str, source: &Snapshot<T>) -> Result<()> {
    if source.is_empty() {
        return Err(SyncError::empty_source(stage));
    }
    Ok(())
}

fn ids_of<T: HasTitleRef>(items: &[T]) -> HashSet<&TitleRef> {
    items.iter().map(|item| item.title_ref()).collect()
}

/// Destination entries whose title is absent from the source, in destination order
fn missing_from<T: HasTitleRef>(destination: &[T], source_ids: &HashSet<&TitleRef>) -> Vec<TitleRef> {
    destination
        .iter()
        .map(|item| item.title_ref())
        .filter(|id| !source_ids.contains(id))
        .cloned()
        .collect()
}

fn log_sample<T: HasTitleRef>(label: &str, items: &[T]) {
    let sample: Vec<&str> = items.iter().take(5).map(|i| i.title_ref().as_str()).collect();
    if !sample.is_empty() {
        debug!("{}: first items {:?}", label, sample);
    }
}

/// Set difference in both directions: `add = S - D`, `remove = D - S`
pub fn diff_watchlist(
    stage: &str,
    source: &Snapshot<WatchlistEntry>,
    destination: &Snapshot<WatchlistEntry>,
) -> Result<Diff<WatchlistEntry>> {
    guard_source(stage, source)?;

    let source_ids = ids_of(source.items());
    let destination_ids = ids_of(destination.items());

    let add: Vec<WatchlistEntry> = source
        .iter()
        .filter(|entry| !destination_ids.contains(&entry.id))
        .cloned()
        .collect();
    let remove = missing_from(destination.items(), &source_ids);

    debug!(
        "diff_watchlist[{}]: source_count={}, destination_count={}, add={}, remove={}",
        stage,
        source.len(),
        destination.len(),
        add.len(),
        remove.len()
    );
    log_sample("diff_watchlist add", &add);
    log_sample("diff_watchlist remove", &remove);

    Ok(Diff {
        add,
        remove,
        update: Vec::new(),
    })
}

/// Keyed comparison of whole entries.
///
/// A source rating is added when the destination has no rating for that
/// title or holds a different value or date; changed ratings therefore travel
/// through `add` and `update` stays empty.
pub fn diff_ratings(
    stage: &str,
    source: &Snapshot<RatingEntry>,
    destination: &Snapshot<RatingEntry>,
) -> Result<Diff<RatingEntry>> {
    guard_source(stage, source)?;

    let existing: HashMap<&TitleRef, &RatingEntry> =
        destination.iter().map(|entry| (&entry.id, entry)).collect();
    let source_ids = ids_of(source.items());

    let mut add = Vec::new();
    let mut changed = 0;
    for entry in source.iter() {
        match existing.get(&entry.id) {
            None => add.push(entry.clone()),
            Some(current) if *current != entry => {
                changed += 1;
                if changed <= 5 {
                    debug!(
                        "diff_ratings: {} changed from {}@{} to {}@{}",
                        entry.id, current.rating, current.rated_at, entry.rating, entry.rated_at
                    );
                }
                add.push(entry.clone());
            }
            Some(_) => {}
        }
    }
    let remove = missing_from(destination.items(), &source_ids);

    debug!(
        "diff_ratings[{}]: source_count={}, destination_count={}, add={} ({} changed), remove={}",
        stage,
        source.len(),
        destination.len(),
        add.len(),
        changed,
        remove.len()
    );
    log_sample("diff_ratings add", &add);

    Ok(Diff {
        add,
        remove,
        update: Vec::new(),
    })
}

/// Append-only: source plays whose title the destination has never seen
pub fn diff_history(
    stage: &str,
    source: &Snapshot<HistoryEntry>,
    destination: &Snapshot<HistoryEntry>,
) -> Result<Diff<HistoryEntry>> {
    guard_source(stage, source)?;

    let watched = ids_of(destination.items());
    let add: Vec<HistoryEntry> = source
        .iter()
        .filter(|entry| !watched.contains(&entry.id))
        .cloned()
        .collect();

    debug!(
        "diff_history[{}]: source_count={}, destination_count={}, add={}",
        stage,
        source.len(),
        destination.len(),
        add.len()
    );
    log_sample("diff_history add", &add);

    Ok(Diff {
        add,
        remove: Vec::new(),
        update: Vec::new(),
    })
}
