use super::RunContext;
use crate::output::{new_table, Output};
use color_eyre::Result;
use media_sync_core::{Stage, SyncReport};

pub async fn run_sync(ctx: &RunContext, dry_run: bool, output: &Output) -> Result<()> {
    tracing::debug!(dry_run, "Sync command started");

    let orchestrator = ctx.orchestrator(dry_run)?;
    let report = orchestrator.run(&Stage::ALL).await?;

    output.render(&report, || report_table(&report));

    let totals = report.totals();
    let prefix = if dry_run { "Dry run completed" } else { "Sync completed" };
    output.success(format!(
        "{}: {} added, {} removed, {} not found in {:.1}s",
        prefix,
        totals.added,
        totals.deleted,
        totals.add_not_found + totals.delete_not_found,
        report.duration_ms as f64 / 1000.0
    ));
    if dry_run {
        output.info("No changes were written to Trakt (--dry-run)");
    }
    Ok(())
}

fn report_table(report: &SyncReport) -> comfy_table::Table {
    let mut table = new_table([
        "Stage", "IMDb", "Trakt", "To add", "To remove", "Added", "Add not found", "Removed", "Remove not found",
    ]);
    for stage in &report.stages {
        table.add_row(vec![
            stage.stage.to_string(),
            stage.source_count.to_string(),
            stage.destination_count.to_string(),
            stage.to_add.to_string(),
            stage.to_remove.to_string(),
            stage.counts.added.to_string(),
            stage.counts.add_not_found.to_string(),
            stage.counts.deleted.to_string(),
            stage.counts.delete_not_found.to_string(),
        ]);
    }
    table
}
