use crate::http::{CallKind, HttpClient};
use crate::imdb::parser::{self, ExportRow};
use crate::traits::SourceCatalog;
use async_trait::async_trait;
use chrono::{NaiveTime, TimeZone, Utc};
use media_sync_config::{Config, ImdbConfig, Secret};
use media_sync_models::{
    HistoryEntry, MediaKind, RatingEntry, Result, Snapshot, SyncError, WatchlistEntry,
};
use reqwest::header::{ACCEPT, COOKIE};
use reqwest::Method;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Which of the two configured lists an export belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportList {
    Watchlist,
    Ratings,
}

impl ExportList {
    fn as_str(&self) -> &'static str {
        match self {
            ExportList::Watchlist => "watchlist",
            ExportList::Ratings => "ratings",
        }
    }
}

/// Cookie-authenticated reader for IMDb list exports.
///
/// Each export is downloaded at most once per client: the ratings export
/// feeds both rating stages and the history stage.
pub struct ImdbClient {
    http: HttpClient,
    base_url: String,
    at_main: Secret,
    ubid_main: Secret,
    ratings_list_id: String,
    watchlist_list_id: String,
    downloaded: Mutex<HashMap<ExportList, Arc<String>>>,
}

impl ImdbClient {
    pub fn new(config: &ImdbConfig, http: HttpClient) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            at_main: config.at_main.clone(),
            ubid_main: config.ubid_main.clone(),
            ratings_list_id: config.ratings_list_id.clone(),
            watchlist_list_id: config.watchlist_list_id.clone(),
            downloaded: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let http = HttpClient::new(config.http.timeout, config.trace)?;
        Ok(Self::new(&config.imdb, http))
    }

    /// `ls…` ids are custom lists; `ur…` ids address the user's built-in lists
    pub fn export_url(&self, list: ExportList) -> String {
        let id = match list {
            ExportList::Watchlist => &self.watchlist_list_id,
            ExportList::Ratings => &self.ratings_list_id,
        };
        let encoded = urlencoding::encode(id);
        if id.starts_with("ur") {
            format!("{}/user/{}/{}/export", self.base_url, encoded, list.as_str())
        } else {
            format!("{}/list/{}/export", self.base_url, encoded)
        }
    }

    fn cookie_header(&self) -> String {
        format!(
            "at-main={}; ubid-main={}",
            self.at_main.expose(),
            self.ubid_main.expose()
        )
    }

    async fn export(&self, list: ExportList) -> Result<Arc<String>> {
        let mut downloaded = self.downloaded.lock().await;
        if let Some(body) = downloaded.get(&list) {
            debug!("Reusing {} export downloaded earlier in this run", list.as_str());
            return Ok(Arc::clone(body));
        }

        let context = format!("imdb {} export", list.as_str());
        let request = self
            .http
            .request(Method::GET, &self.export_url(list))
            .header(COOKIE, self.cookie_header())
            .header(ACCEPT, "text/csv, */*");
        let response = self.http.send(CallKind::Read, &context, request).await?;

        // Expired cookies get a 200 login page rather than an error status
        let is_html = response
            .content_type()
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false)
            || response.body.trim_start().starts_with('<');
        if is_html {
            return Err(SyncError::fetch(
                context,
                "received an HTML page instead of CSV; the session cookies are probably expired",
            ));
        }

        info!("Downloaded {} export ({} bytes)", list.as_str(), response.body.len());
        let body = Arc::new(response.body);
        downloaded.insert(list, Arc::clone(&body));
        Ok(body)
    }

    async fn rating_rows(&self) -> Result<Vec<ExportRow<RatingEntry>>> {
        let body = self.export(ExportList::Ratings).await?;
        parser::parse_ratings_csv(&body)
    }
}

fn of_kind<T>(rows: Vec<ExportRow<T>>, kind: MediaKind) -> Vec<T> {
    rows.into_iter()
        .filter(|row| row.kind == kind)
        .map(|row| row.entry)
        .collect()
}

#[async_trait]
impl SourceCatalog for ImdbClient {
    fn catalog_name(&self) -> &str {
        "imdb"
    }

    async fn watchlist(&self, kind: MediaKind) -> Result<Snapshot<WatchlistEntry>> {
        let body = self.export(ExportList::Watchlist).await?;
        let rows = parser::parse_watchlist_csv(&body)?;
        let snapshot = Snapshot::verified(of_kind(rows, kind));
        debug!(
            kind = %kind,
            entries = snapshot.len(),
            duplicates = snapshot.duplicates_dropped(),
            "Fetched IMDb watchlist"
        );
        Ok(snapshot)
    }

    async fn ratings(&self, kind: MediaKind) -> Result<Snapshot<RatingEntry>> {
        let rows = self.rating_rows().await?;
        let snapshot = Snapshot::verified(of_kind(rows, kind));
        debug!(
            kind = %kind,
            entries = snapshot.len(),
            duplicates = snapshot.duplicates_dropped(),
            "Fetched IMDb ratings"
        );
        Ok(snapshot)
    }

    /// Every rated movie counts as watched on the day it was rated
    async fn history(&self) -> Result<Snapshot<HistoryEntry>> {
        let rows = self.rating_rows().await?;
        let history: Vec<HistoryEntry> = of_kind(rows, MediaKind::Movie)
            .into_iter()
            .map(|rating| HistoryEntry {
                watched_at: Utc.from_utc_datetime(&rating.rated_at.and_time(NaiveTime::MIN)),
                id: rating.id,
            })
            .collect();
        let snapshot = Snapshot::verified(history);
        debug!(entries = snapshot.len(), "Derived IMDb watch history from ratings");
        Ok(snapshot)
    }
}
