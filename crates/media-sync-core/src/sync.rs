use crate::diff::{diff_history, diff_ratings, diff_watchlist, Diff};
use crate::reconcile::{Reconciler, StageCounts};
use media_sync_models::{HistoryEntry, MediaKind, RatingEntry, Result, Snapshot, WatchlistEntry};
use media_sync_sources::{DestinationCatalog, SourceCatalog};
use serde::Serialize;
use std::fmt;
use std::time::Instant;
use tracing::{error, info, instrument};

/// One step of the pipeline, in the order a full run executes them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    WatchlistMovie,
    WatchlistShow,
    RatingsMovie,
    RatingsShow,
    History,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::WatchlistMovie,
        Stage::WatchlistShow,
        Stage::RatingsMovie,
        Stage::RatingsShow,
        Stage::History,
    ];

    pub fn watchlist(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Movie => Stage::WatchlistMovie,
            MediaKind::Show => Stage::WatchlistShow,
        }
    }

    pub fn ratings(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Movie => Stage::RatingsMovie,
            MediaKind::Show => Stage::RatingsShow,
        }
    }

    /// History only covers movies
    pub fn kind(self) -> MediaKind {
        match self {
            Stage::WatchlistShow | Stage::RatingsShow => MediaKind::Show,
            Stage::WatchlistMovie | Stage::RatingsMovie | Stage::History => MediaKind::Movie,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::WatchlistMovie => "watchlist-movie",
            Stage::WatchlistShow => "watchlist-show",
            Stage::RatingsMovie => "ratings-movie",
            Stage::RatingsShow => "ratings-show",
            Stage::History => "history",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Both snapshots of a stage and the diff computed from them
#[derive(Debug, Clone, Serialize)]
pub struct StagePlan<T> {
    pub stage: Stage,
    pub source_count: usize,
    pub destination_count: usize,
    pub diff: Diff<T>,
}

impl<T> StagePlan<T> {
    fn new(stage: Stage, source: &Snapshot<T>, destination: &Snapshot<T>, diff: Diff<T>) -> Self {
        Self {
            stage,
            source_count: source.len(),
            destination_count: destination.len(),
            diff,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub source_count: usize,
    pub destination_count: usize,
    pub to_add: usize,
    pub to_remove: usize,
    pub counts: StageCounts,
    pub dry_run: bool,
    pub duration_ms: u64,
}

impl StageReport {
    fn new<T>(plan: &StagePlan<T>, counts: StageCounts, dry_run: bool, started: Instant) -> Self {
        Self {
            stage: plan.stage,
            source_count: plan.source_count,
            destination_count: plan.destination_count,
            to_add: plan.diff.add.len() + plan.diff.update.len(),
            to_remove: plan.diff.remove.len(),
            counts,
            dry_run,
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub stages: Vec<StageReport>,
    pub duration_ms: u64,
}

impl SyncReport {
    pub fn totals(&self) -> StageCounts {
        self.stages.iter().fold(StageCounts::default(), |mut acc, s| {
            acc.added += s.counts.added;
            acc.add_not_found += s.counts.add_not_found;
            acc.deleted += s.counts.deleted;
            acc.delete_not_found += s.counts.delete_not_found;
            acc
        })
    }
}

/// Runs fetch, diff and reconcile for each stage, one stage at a time.
///
/// Stages share the destination's write throttle, so nothing here runs
/// concurrently. The first failure aborts the remaining stages.
pub struct SyncOrchestrator {
    source: Box<dyn SourceCatalog>,
    destination: Box<dyn DestinationCatalog>,
    dry_run: bool,
}

impl SyncOrchestrator {
    pub fn new(source: Box<dyn SourceCatalog>, destination: Box<dyn DestinationCatalog>) -> Self {
        Self {
            source,
            destination,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn reconciler(&self) -> Reconciler<'_> {
        Reconciler::new(self.destination.as_ref(), self.dry_run)
    }

    /// Runs `stages` in pipeline order regardless of the order given
    #[instrument(skip(self), fields(dry_run = self.dry_run))]
    pub async fn run(&self, stages: &[Stage]) -> Result<SyncReport> {
        let start = Instant::now();
        let mut report = SyncReport::default();

        info!(
            operation = "sync_start",
            source = self.source.catalog_name(),
            destination = self.destination.catalog_name(),
            "Starting sync"
        );

        for stage in Stage::ALL.into_iter().filter(|s| stages.contains(s)) {
            match self.run_stage(stage).await {
                Ok(stage_report) => {
                    info!(
                        operation = "stage_complete",
                        stage = %stage,
                        added = stage_report.counts.added,
                        add_not_found = stage_report.counts.add_not_found,
                        deleted = stage_report.counts.deleted,
                        delete_not_found = stage_report.counts.delete_not_found,
                        duration_ms = stage_report.duration_ms,
                        "Stage {} complete",
                        stage
                    );
                    report.stages.push(stage_report);
                }
                Err(e) => {
                    error!(
                        operation = "stage_failed",
                        stage = %stage,
                        error = %e,
                        "Stage {} failed, aborting remaining stages",
                        stage
                    );
                    return Err(e.in_stage(stage.as_str()));
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        let totals = report.totals();
        info!(
            operation = "sync_complete",
            stages = report.stages.len(),
            added = totals.added,
            not_found = totals.add_not_found + totals.delete_not_found,
            deleted = totals.deleted,
            duration_ms = report.duration_ms,
            "Sync complete"
        );
        Ok(report)
    }

    async fn run_stage(&self, stage: Stage) -> Result<StageReport> {
        let started = Instant::now();
        let reconciler = self.reconciler();

        let report = match stage {
            Stage::WatchlistMovie | Stage::WatchlistShow => {
                let plan = self.plan_watchlist(stage.kind()).await?;
                let counts = reconciler.reconcile_watchlist(stage.kind(), &plan.diff).await?;
                StageReport::new(&plan, counts, self.dry_run, started)
            }
            Stage::RatingsMovie | Stage::RatingsShow => {
                let plan = self.plan_ratings(stage.kind()).await?;
                let counts = reconciler.reconcile_ratings(stage.kind(), &plan.diff).await?;
                StageReport::new(&plan, counts, self.dry_run, started)
            }
            Stage::History => {
                let plan = self.plan_history().await?;
                let counts = reconciler.reconcile_history(&plan.diff).await?;
                StageReport::new(&plan, counts, self.dry_run, started)
            }
        };
        Ok(report)
    }

    pub async fn plan_watchlist(&self, kind: MediaKind) -> Result<StagePlan<WatchlistEntry>> {
        let stage = Stage::watchlist(kind);
        let source = self.source.watchlist(kind).await?;
        let destination = self.destination.watchlist(kind).await?;
        let diff = diff_watchlist(stage.as_str(), &source, &destination)?;
        Ok(StagePlan::new(stage, &source, &destination, diff))
    }

    pub async fn plan_ratings(&self, kind: MediaKind) -> Result<StagePlan<RatingEntry>> {
        let stage = Stage::ratings(kind);
        let source = self.source.ratings(kind).await?;
        let destination = self.destination.ratings(kind).await?;
        let diff = diff_ratings(stage.as_str(), &source, &destination)?;
        Ok(StagePlan::new(stage, &source, &destination, diff))
    }

    pub async fn plan_history(&self) -> Result<StagePlan<HistoryEntry>> {
        let source = self.source.history().await?;
        let destination = self.destination.history().await?;
        let diff = diff_history(Stage::History.as_str(), &source, &destination)?;
        Ok(StagePlan::new(Stage::History, &source, &destination, diff))
    }
}
