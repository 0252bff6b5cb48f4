use super::RunContext;
use crate::output::{new_table, Output};
use color_eyre::Result;
use media_sync_models::{HistoryEntry, MediaKind, RatingEntry, Snapshot, WatchlistEntry};
use media_sync_sources::{DestinationCatalog, SourceCatalog};

/// Which single collection a fetch command reads
#[derive(Debug, Clone, Copy)]
pub enum FetchTarget {
    ImdbWatchlist(MediaKind),
    ImdbRatings(MediaKind),
    ImdbHistory,
    TraktWatchlist(MediaKind),
    TraktRatings(MediaKind),
    TraktHistory,
}

pub async fn run_fetch(ctx: &RunContext, target: FetchTarget, output: &Output) -> Result<()> {
    let config = ctx.load_config()?;
    tracing::debug!(?target, "Fetch command started");

    match target {
        FetchTarget::ImdbWatchlist(kind) => show_watchlist(&ctx.imdb(&config)?.watchlist(kind).await?, output),
        FetchTarget::ImdbRatings(kind) => show_ratings(&ctx.imdb(&config)?.ratings(kind).await?, output),
        FetchTarget::ImdbHistory => show_history(&ctx.imdb(&config)?.history().await?, output),
        FetchTarget::TraktWatchlist(kind) => show_watchlist(&ctx.trakt(&config)?.watchlist(kind).await?, output),
        FetchTarget::TraktRatings(kind) => show_ratings(&ctx.trakt(&config)?.ratings(kind).await?, output),
        FetchTarget::TraktHistory => show_history(&ctx.trakt(&config)?.history().await?, output),
    }
    Ok(())
}

fn summarize<T>(snapshot: &Snapshot<T>, output: &Output) {
    output.info(format!("{} entries", snapshot.len()));
    if snapshot.duplicates_dropped() > 0 {
        output.warn(format!("{} duplicate entries dropped", snapshot.duplicates_dropped()));
    }
}

fn show_watchlist(snapshot: &Snapshot<WatchlistEntry>, output: &Output) {
    output.render(snapshot.items(), || {
        let mut table = new_table(["IMDb ID"]);
        for entry in snapshot.iter() {
            table.add_row(vec![entry.id.to_string()]);
        }
        table
    });
    summarize(snapshot, output);
}

fn show_ratings(snapshot: &Snapshot<RatingEntry>, output: &Output) {
    output.render(snapshot.items(), || {
        let mut table = new_table(["IMDb ID", "Rating", "Rated"]);
        for entry in snapshot.iter() {
            table.add_row(vec![entry.id.to_string(), entry.rating.to_string(), entry.rated_at.to_string()]);
        }
        table
    });
    summarize(snapshot, output);
}

fn show_history(snapshot: &Snapshot<HistoryEntry>, output: &Output) {
    output.render(snapshot.items(), || {
        let mut table = new_table(["IMDb ID", "Watched"]);
        for entry in snapshot.iter() {
            table.add_row(vec![entry.id.to_string(), entry.watched_at.to_rfc3339()]);
        }
        table
    });
    summarize(snapshot, output);
}
