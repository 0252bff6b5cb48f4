use super::RunContext;
use crate::output::{new_table, Output};
use color_eyre::Result;
use media_sync_core::{Diff, Stage, StageCounts, StagePlan};
use media_sync_models::{HistoryEntry, MediaKind, RatingEntry, WatchlistEntry};
use serde::Serialize;

/// One row per pending change: action, title, detail
type Row = (&'static str, String, String);

pub async fn run_diff_watchlist(ctx: &RunContext, kind: MediaKind, apply: bool, output: &Output) -> Result<()> {
    let orchestrator = ctx.orchestrator(!apply)?;
    let plan = orchestrator.plan_watchlist(kind).await?;
    show_plan(&plan, output, |e: &WatchlistEntry| (e.id.to_string(), String::new()));

    if apply {
        let counts = orchestrator.reconciler().reconcile_watchlist(kind, &plan.diff).await?;
        report_applied(plan.stage, counts, output);
    }
    Ok(())
}

pub async fn run_diff_ratings(ctx: &RunContext, kind: MediaKind, apply: bool, output: &Output) -> Result<()> {
    let orchestrator = ctx.orchestrator(!apply)?;
    let plan = orchestrator.plan_ratings(kind).await?;
    show_plan(&plan, output, |r: &RatingEntry| {
        (r.id.to_string(), format!("{}/10 rated {}", r.rating, r.rated_at))
    });

    if apply {
        let counts = orchestrator.reconciler().reconcile_ratings(kind, &plan.diff).await?;
        report_applied(plan.stage, counts, output);
    }
    Ok(())
}

pub async fn run_diff_history(ctx: &RunContext, apply: bool, output: &Output) -> Result<()> {
    let orchestrator = ctx.orchestrator(!apply)?;
    let plan = orchestrator.plan_history().await?;
    show_plan(&plan, output, |h: &HistoryEntry| {
        (h.id.to_string(), format!("watched {}", h.watched_at.format("%Y-%m-%d %H:%M UTC")))
    });

    if apply {
        let counts = orchestrator.reconciler().reconcile_history(&plan.diff).await?;
        report_applied(plan.stage, counts, output);
    }
    Ok(())
}

fn diff_rows<T>(diff: &Diff<T>, describe: impl Fn(&T) -> (String, String)) -> Vec<Row> {
    let mut rows = Vec::with_capacity(diff.add.len() + diff.remove.len() + diff.update.len());
    for item in &diff.add {
        let (id, detail) = describe(item);
        rows.push(("add", id, detail));
    }
    for item in &diff.update {
        let (id, detail) = describe(item);
        rows.push(("update", id, detail));
    }
    for id in &diff.remove {
        rows.push(("remove", id.to_string(), String::new()));
    }
    rows
}

fn show_plan<T: Serialize>(plan: &StagePlan<T>, output: &Output, describe: impl Fn(&T) -> (String, String)) {
    output.render(plan, || {
        let mut table = new_table(["Action", "IMDb ID", "Detail"]);
        for (action, id, detail) in diff_rows(&plan.diff, describe) {
            table.add_row(vec![action.to_string(), id, detail]);
        }
        table
    });
    output.info(format!(
        "{}: {} on IMDb, {} on Trakt, {} to add, {} to remove",
        plan.stage,
        plan.source_count,
        plan.destination_count,
        plan.diff.add.len() + plan.diff.update.len(),
        plan.diff.remove.len()
    ));
}

fn report_applied(stage: Stage, counts: StageCounts, output: &Output) {
    output.success(format!(
        "{} applied: {} added ({} not found), {} removed ({} not found)",
        stage, counts.added, counts.add_not_found, counts.deleted, counts.delete_not_found
    ));
}
