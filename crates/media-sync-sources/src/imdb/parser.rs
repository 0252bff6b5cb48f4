use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use media_sync_models::{MediaKind, RatingEntry, Result, SyncError, TitleRef, WatchlistEntry};
use std::collections::HashMap;
use tracing::{debug, info, warn};

const COL_CONST: &str = "Const";
const COL_TITLE_TYPE: &str = "Title Type";
const COL_YOUR_RATING: &str = "Your Rating";
const COL_DATE_RATED: &str = "Date Rated";

/// One parsed export row together with the kind it was filed under
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow<T> {
    pub kind: MediaKind,
    pub entry: T,
}

/// Map an export "Title Type" to a media kind.
///
/// Older exports use display names ("TV Series"), newer ones the camelCase
/// title types ("tvSeries"). Episodes, games and anything else are skipped.
pub fn map_title_type(title_type: &str) -> Option<MediaKind> {
    match title_type.trim() {
        "Movie" | "TV Movie" | "TV Special" | "TV Short" | "Video" | "Short" => Some(MediaKind::Movie),
        "movie" | "tvMovie" | "tvSpecial" | "tvShort" | "video" | "short" => Some(MediaKind::Movie),
        "TV Series" | "TV Mini Series" | "tvSeries" | "tvMiniSeries" => Some(MediaKind::Show),
        _ => None,
    }
}

/// Parse a watchlist list export
pub fn parse_watchlist_csv(data: &str) -> Result<Vec<ExportRow<WatchlistEntry>>> {
    let context = "imdb watchlist export";
    let mut table = CsvTable::open(context, data, &[COL_CONST, COL_TITLE_TYPE])?;
    let mut rows = Vec::new();
    let mut skipped = SkipCounts::default();

    while let Some(record) = table.next_record()? {
        let Some((kind, id)) = table.title(&record, &mut skipped) else {
            continue;
        };
        rows.push(ExportRow {
            kind,
            entry: WatchlistEntry::new(id),
        });
    }

    skipped.log(context);
    info!("Parsed {} total rows, {} valid watchlist entries", table.row_count, rows.len());
    Ok(rows)
}

/// Parse a ratings export
pub fn parse_ratings_csv(data: &str) -> Result<Vec<ExportRow<RatingEntry>>> {
    let context = "imdb ratings export";
    let mut table = CsvTable::open(
        context,
        data,
        &[COL_CONST, COL_TITLE_TYPE, COL_YOUR_RATING, COL_DATE_RATED],
    )?;
    let mut rows = Vec::new();
    let mut skipped = SkipCounts::default();

    while let Some(record) = table.next_record()? {
        let Some((kind, id)) = table.title(&record, &mut skipped) else {
            continue;
        };

        let rating_str = table.field(&record, COL_YOUR_RATING);
        let date_str = table.field(&record, COL_DATE_RATED);

        let rating = rating_str
            .parse::<u8>()
            .ok()
            .and_then(|value| {
                NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                    .ok()
                    .map(|date| (value, date))
            });
        let Some((rating, rated_at)) = rating else {
            return Err(SyncError::fetch(
                context,
                format!(
                    "row {}: cannot parse rating {:?} dated {:?} for {}",
                    table.row_count, rating_str, date_str, id
                ),
            ));
        };

        let entry = RatingEntry::new(id.clone(), rating, rated_at).ok_or_else(|| {
            SyncError::fetch(
                context,
                format!("row {}: rating {} for {} is outside 1-10", table.row_count, rating, id),
            )
        })?;

        if rows.len() < 3 {
            debug!(row = table.row_count, imdb_id = %id, rating, kind = %kind, "Added rating");
        }
        rows.push(ExportRow { kind, entry });
    }

    skipped.log(context);
    info!("Parsed {} total rows, {} valid ratings", table.row_count, rows.len());
    Ok(rows)
}

#[derive(Default)]
struct SkipCounts {
    invalid_id: usize,
    other_type: usize,
}

impl SkipCounts {
    fn log(&self, context: &str) {
        if self.invalid_id > 0 {
            warn!("{}: skipped {} rows with an unusable identifier", context, self.invalid_id);
        }
        if self.other_type > 0 {
            debug!("{}: skipped {} rows that are neither movies nor shows", context, self.other_type);
        }
    }
}

struct CsvTable<'a> {
    context: &'a str,
    reader: csv::Reader<&'a [u8]>,
    columns: HashMap<String, usize>,
    row_count: usize,
}

impl<'a> CsvTable<'a> {
    /// Opens the export and checks the header carries every required column
    fn open(context: &'a str, data: &'a str, required: &[&str]) -> Result<Self> {
        let data = data.strip_prefix('\u{feff}').unwrap_or(data);
        if data.trim().is_empty() {
            return Err(SyncError::fetch(context, "export is empty (no header row)"));
        }

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_reader(data.as_bytes());
        let headers = reader
            .headers()
            .map_err(|e| SyncError::fetch(context, format!("unreadable header: {}", e)))?
            .clone();
        let columns: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_string(), i))
            .collect();

        for col in required {
            if !columns.contains_key(*col) {
                let available: Vec<&str> = headers.iter().collect();
                return Err(SyncError::fetch(
                    context,
                    format!("Missing required column: {}. Available columns: {:?}", col, available),
                ));
            }
        }

        Ok(Self {
            context,
            reader,
            columns,
            row_count: 0,
        })
    }

    fn next_record(&mut self) -> Result<Option<StringRecord>> {
        let mut record = StringRecord::new();
        let more = self
            .reader
            .read_record(&mut record)
            .map_err(|e| SyncError::fetch(self.context, format!("row {}: {}", self.row_count + 1, e)))?;
        if !more {
            return Ok(None);
        }
        self.row_count += 1;
        Ok(Some(record))
    }

    fn field<'r>(&self, record: &'r StringRecord, column: &str) -> &'r str {
        self.columns
            .get(column)
            .and_then(|&i| record.get(i))
            .map(str::trim)
            .unwrap_or("")
    }

    /// Normalized id and kind of a row, or `None` when the row is not syncable
    fn title(&self, record: &StringRecord, skipped: &mut SkipCounts) -> Option<(MediaKind, TitleRef)> {
        let raw_id = self.field(record, COL_CONST);
        let title_type = self.field(record, COL_TITLE_TYPE);

        let Some(kind) = map_title_type(title_type) else {
            skipped.other_type += 1;
            debug!(row = self.row_count, title_type, "Skipping row with unsupported title type");
            return None;
        };

        match TitleRef::parse(raw_id) {
            Ok(id) => Some((kind, id)),
            Err(e) => {
                skipped.invalid_id += 1;
                if skipped.invalid_id <= 5 {
                    warn!(row = self.row_count, "{}: {}", self.context, e);
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests;
