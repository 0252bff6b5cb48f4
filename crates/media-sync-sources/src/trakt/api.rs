//! Wire shapes of the Trakt sync endpoints.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use media_sync_models::{HistoryEntry, MediaKind, RatingEntry, TitleRef};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraktIds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trakt: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvdb: Option<u64>,
}

impl TraktIds {
    /// Normalized IMDb id, if present and well formed
    pub fn title_ref(&self) -> Option<TitleRef> {
        self.imdb.as_deref().and_then(|raw| TitleRef::parse(raw).ok())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraktTitle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,
    pub ids: TraktIds,
}

#[derive(Debug, Deserialize)]
pub struct WatchlistItem {
    pub movie: Option<TraktTitle>,
    pub show: Option<TraktTitle>,
}

#[derive(Debug, Deserialize)]
pub struct RatingItem {
    pub rated_at: String,
    pub rating: u8,
    pub movie: Option<TraktTitle>,
    pub show: Option<TraktTitle>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryItem {
    pub watched_at: String,
    pub movie: Option<TraktTitle>,
}

/// Picks the nested title matching `kind`
pub fn title_for(kind: MediaKind, movie: Option<TraktTitle>, show: Option<TraktTitle>) -> Option<TraktTitle> {
    match kind {
        MediaKind::Movie => movie,
        MediaKind::Show => show,
    }
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// One element of a write batch
#[derive(Debug, Clone, Serialize)]
pub struct SyncItem {
    pub ids: TraktIds,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watched_at: Option<String>,
}

impl SyncItem {
    pub fn id_only(id: &TitleRef) -> Self {
        Self {
            ids: TraktIds {
                imdb: Some(id.to_string()),
                ..TraktIds::default()
            },
            rating: None,
            rated_at: None,
            watched_at: None,
        }
    }

    pub fn rating(entry: &RatingEntry) -> Self {
        Self {
            rating: Some(entry.rating),
            rated_at: Some(date_to_timestamp(entry.rated_at)),
            ..Self::id_only(&entry.id)
        }
    }

    pub fn history(entry: &HistoryEntry) -> Self {
        Self {
            watched_at: Some(entry.watched_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ..Self::id_only(&entry.id)
        }
    }
}

/// Ratings carry day precision; they are written as midnight UTC so a
/// round trip through the destination compares equal
pub fn date_to_timestamp(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KindCounts {
    #[serde(default)]
    pub movies: u64,
    #[serde(default)]
    pub shows: u64,
    #[serde(default)]
    pub seasons: u64,
    #[serde(default)]
    pub episodes: u64,
}

impl KindCounts {
    pub fn for_kind(&self, kind: MediaKind) -> u64 {
        match kind {
            MediaKind::Movie => self.movies,
            MediaKind::Show => self.shows,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotFoundItem {
    #[serde(default)]
    pub ids: TraktIds,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotFound {
    #[serde(default)]
    pub movies: Vec<NotFoundItem>,
    #[serde(default)]
    pub shows: Vec<NotFoundItem>,
}

/// Response body of every `/sync/...` write
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncResponse {
    #[serde(default)]
    pub added: Option<KindCounts>,
    #[serde(default)]
    pub updated: Option<KindCounts>,
    #[serde(default)]
    pub existing: Option<KindCounts>,
    #[serde(default)]
    pub deleted: Option<KindCounts>,
    #[serde(default)]
    pub not_found: NotFound,
}

impl SyncResponse {
    pub fn not_found_ids(&self, kind: MediaKind) -> Vec<TitleRef> {
        let items = match kind {
            MediaKind::Movie => &self.not_found.movies,
            MediaKind::Show => &self.not_found.shows,
        };
        items.iter().filter_map(|item| item.ids.title_ref()).collect()
    }
}
