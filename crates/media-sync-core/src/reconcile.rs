use crate::diff::Diff;
use media_sync_models::{HistoryEntry, MediaKind, RatingEntry, Result, TitleRef, WatchlistEntry};
use media_sync_sources::{DestinationCatalog, WriteOutcome};
use serde::Serialize;
use tracing::info;

/// What the destination did with one stage's writes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageCounts {
    pub added: usize,
    pub add_not_found: usize,
    pub deleted: usize,
    pub delete_not_found: usize,
}

impl StageCounts {
    fn record_add(&mut self, outcome: &WriteOutcome) {
        self.added += outcome.accepted.len();
        self.add_not_found += outcome.not_found.len();
    }

    fn record_delete(&mut self, outcome: &WriteOutcome) {
        self.deleted += outcome.accepted.len();
        self.delete_not_found += outcome.not_found.len();
    }
}

/// Applies diffs to the destination, one batched call per direction.
///
/// Empty directions are skipped without a network call. "Not found" items are
/// counted and logged; any failed call aborts with the destination's error.
/// In dry-run mode nothing is written and the counts stay at zero.
pub struct Reconciler<'a> {
    destination: &'a dyn DestinationCatalog,
    dry_run: bool,
}

impl<'a> Reconciler<'a> {
    pub fn new(destination: &'a dyn DestinationCatalog, dry_run: bool) -> Self {
        Self { destination, dry_run }
    }

    pub async fn reconcile_watchlist(&self, kind: MediaKind, diff: &Diff<WatchlistEntry>) -> Result<StageCounts> {
        let label = format!("watchlist {}", kind.plural());
        let mut counts = StageCounts::default();

        if !diff.add.is_empty() {
            let ids: Vec<TitleRef> = diff.add.iter().map(|e| e.id.clone()).collect();
            if !self.skip_write(&label, "add", &ids) {
                let outcome = self.destination.add_to_watchlist(kind, &ids).await?;
                log_outcome(&label, "add", &outcome);
                counts.record_add(&outcome);
            }
        }

        if !diff.remove.is_empty() && !self.skip_write(&label, "remove", &diff.remove) {
            let outcome = self.destination.remove_from_watchlist(kind, &diff.remove).await?;
            log_outcome(&label, "remove", &outcome);
            counts.record_delete(&outcome);
        }

        Ok(counts)
    }

    /// Changed ratings are part of `add`; the destination overwrites the previous value
    pub async fn reconcile_ratings(&self, kind: MediaKind, diff: &Diff<RatingEntry>) -> Result<StageCounts> {
        let label = format!("ratings {}", kind.plural());
        let mut counts = StageCounts::default();

        let upserts: Vec<RatingEntry> = diff.add.iter().chain(diff.update.iter()).cloned().collect();
        if !upserts.is_empty() {
            let ids: Vec<TitleRef> = upserts.iter().map(|r| r.id.clone()).collect();
            if !self.skip_write(&label, "add", &ids) {
                let outcome = self.destination.add_ratings(kind, &upserts).await?;
                log_outcome(&label, "add", &outcome);
                counts.record_add(&outcome);
            }
        }

        if !diff.remove.is_empty() && !self.skip_write(&label, "remove", &diff.remove) {
            let outcome = self.destination.remove_ratings(kind, &diff.remove).await?;
            log_outcome(&label, "remove", &outcome);
            counts.record_delete(&outcome);
        }

        Ok(counts)
    }

    pub async fn reconcile_history(&self, diff: &Diff<HistoryEntry>) -> Result<StageCounts> {
        let label = "history movies";
        let mut counts = StageCounts::default();

        if !diff.add.is_empty() {
            let ids: Vec<TitleRef> = diff.add.iter().map(|h| h.id.clone()).collect();
            if !self.skip_write(label, "add", &ids) {
                let outcome = self.destination.add_history(&diff.add).await?;
                log_outcome(label, "add", &outcome);
                counts.record_add(&outcome);
            }
        }

        Ok(counts)
    }

    /// In dry-run mode, logs the write that would have happened and reports it as skipped
    fn skip_write(&self, label: &str, action: &str, ids: &[TitleRef]) -> bool {
        if self.dry_run {
            info!(
                destination = self.destination.catalog_name(),
                "[dry-run] would {} {} {}: {}",
                action,
                ids.len(),
                label,
                join_ids(ids)
            );
        }
        self.dry_run
    }
}

fn log_outcome(label: &str, action: &str, outcome: &WriteOutcome) {
    info!(
        "{} {}: accepted={} [{}], not_found={} [{}]",
        label,
        action,
        outcome.accepted.len(),
        join_ids(&outcome.accepted),
        outcome.not_found.len(),
        join_ids(&outcome.not_found)
    );
}

fn join_ids(ids: &[TitleRef]) -> String {
    ids.iter().map(TitleRef::as_str).collect::<Vec<_>>().join(", ")
}
