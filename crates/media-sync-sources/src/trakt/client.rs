use crate::http::{CallKind, HttpClient, HttpResponse};
use crate::throttle::Throttle;
use crate::traits::{DestinationCatalog, WriteOutcome};
use crate::trakt::api::{self, SyncItem, SyncResponse};
use async_trait::async_trait;
use media_sync_config::{Config, Secret, TraktConfig};
use media_sync_models::{
    HistoryEntry, MediaKind, RatingEntry, Result, Snapshot, SyncError, TitleRef, WatchlistEntry,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

const API_VERSION: &str = "2";
const PAGE_COUNT_HEADER: &str = "X-Pagination-Page-Count";

/// Paging limits for destination reads
#[derive(Debug, Clone, Copy)]
pub struct PageSettings {
    pub limit: u32,
    /// Hard ceiling on items collected across pages
    pub cap: usize,
}

/// Bearer-token client for the Trakt sync API.
///
/// All writes for one client go through a single [`Throttle`], so any two
/// consecutive mutations are at least `write_delay` apart.
pub struct TraktClient {
    http: HttpClient,
    base_url: String,
    client_id: String,
    access_token: Secret,
    paging: PageSettings,
    throttle: Throttle,
}

impl TraktClient {
    pub fn new(config: &TraktConfig, http: HttpClient, paging: PageSettings, write_delay: Duration) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            client_id: config.client_id.clone(),
            access_token: config.access_token.clone(),
            paging,
            throttle: Throttle::new(write_delay),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let http = HttpClient::new(config.http.timeout, config.trace)?;
        let paging = PageSettings {
            limit: config.http.page_limit,
            cap: config.http.fetch_cap,
        };
        Ok(Self::new(&config.trakt, http, paging, config.http.write_delay))
    }

    fn authed(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, &format!("{}{}", self.base_url, path))
            .header(AUTHORIZATION, format!("Bearer {}", self.access_token.expose()))
            .header("trakt-api-version", API_VERSION)
            .header("trakt-api-key", &self.client_id)
            .header(CONTENT_TYPE, "application/json")
    }

    /// Follows `X-Pagination-Page-Count` until every page is read.
    ///
    /// Hitting the item cap while pages remain is a failure: a truncated
    /// destination view would make the diff re-add or miss entries.
    async fn get_paged<T: DeserializeOwned>(&self, context: &str, path: &str) -> Result<Vec<T>> {
        let mut all = Vec::new();
        let mut page: u32 = 1;

        loop {
            let request = self
                .authed(Method::GET, path)
                .query(&[("page", page), ("limit", self.paging.limit)]);
            let response = self.http.send(CallKind::Read, context, request).await?;

            let total_pages = response.header_u32(PAGE_COUNT_HEADER).unwrap_or(1);
            let items: Vec<T> = response
                .json()
                .map_err(|e| SyncError::fetch(context, format!("page {}: unexpected response: {}", page, e)))?;
            let page_len = items.len();
            all.extend(items);

            debug!(context, page, total_pages, page_len, collected = all.len(), "Fetched page");

            if all.len() > self.paging.cap || (page < total_pages && all.len() >= self.paging.cap) {
                return Err(SyncError::fetch(
                    context,
                    format!(
                        "reached the fetch cap of {} items at page {} of {}",
                        self.paging.cap, page, total_pages
                    ),
                ));
            }
            if page >= total_pages || page_len == 0 {
                break;
            }
            page += 1;
        }

        Ok(all)
    }

    /// Posts one batch for one kind and splits the batch by the reported not-found ids
    async fn post_batch<B: Serialize + Sync>(
        &self,
        context: &str,
        path: &str,
        kind: MediaKind,
        items: &[B],
        batch_ids: &[TitleRef],
    ) -> Result<WriteOutcome> {
        let mut body = BTreeMap::new();
        body.insert(kind.plural(), items);
        let request = self.authed(Method::POST, path).json(&body);

        let response = self
            .throttle
            .run(self.http.send(CallKind::Write, context, request))
            .await?;
        let parsed = parse_sync_response(context, &response)?;

        let outcome = WriteOutcome::from_batch(batch_ids, &parsed.not_found_ids(kind));
        info!(
            context,
            sent = batch_ids.len(),
            accepted = outcome.accepted.len(),
            not_found = outcome.not_found.len(),
            added = parsed.added.as_ref().map(|c| c.for_kind(kind)),
            updated = parsed.updated.as_ref().map(|c| c.for_kind(kind)),
            existing = parsed.existing.as_ref().map(|c| c.for_kind(kind)),
            deleted = parsed.deleted.as_ref().map(|c| c.for_kind(kind)),
            "Destination write completed"
        );
        Ok(outcome)
    }
}

fn parse_sync_response(context: &str, response: &HttpResponse) -> Result<SyncResponse> {
    if response.body.trim().is_empty() {
        return Ok(SyncResponse::default());
    }
    response
        .json()
        .map_err(|e| SyncError::write(context, format!("unexpected response: {}", e)))
}

/// Keeps entries that carry a usable IMDb id; anything else cannot be matched across catalogs
fn with_title_ref<T>(context: &str, title: Option<api::TraktTitle>, build: impl FnOnce(TitleRef) -> T) -> Result<Option<T>> {
    let title = title.ok_or_else(|| SyncError::fetch(context, "item is missing its media object"))?;
    match title.ids.title_ref() {
        Some(id) => Ok(Some(build(id))),
        None => {
            debug!(
                context,
                title = title.title.as_deref().unwrap_or("unknown"),
                year = title.year,
                trakt_id = title.ids.trakt,
                "Skipping item without an IMDb id"
            );
            Ok(None)
        }
    }
}

#[async_trait]
impl DestinationCatalog for TraktClient {
    fn catalog_name(&self) -> &str {
        "trakt"
    }

    async fn watchlist(&self, kind: MediaKind) -> Result<Snapshot<WatchlistEntry>> {
        let context = format!("trakt watchlist {}", kind.plural());
        let items: Vec<api::WatchlistItem> = self
            .get_paged(&context, &format!("/sync/watchlist/{}", kind.plural()))
            .await?;

        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let title = api::title_for(kind, item.movie, item.show);
            if let Some(entry) = with_title_ref(&context, title, WatchlistEntry::new)? {
                entries.push(entry);
            }
        }
        Ok(Snapshot::verified(entries))
    }

    async fn ratings(&self, kind: MediaKind) -> Result<Snapshot<RatingEntry>> {
        let context = format!("trakt ratings {}", kind.plural());
        let items: Vec<api::RatingItem> = self
            .get_paged(&context, &format!("/sync/ratings/{}", kind.plural()))
            .await?;

        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let rated_at = api::parse_timestamp(&item.rated_at)
                .ok_or_else(|| SyncError::fetch(&context, format!("invalid rated_at {:?}", item.rated_at)))?
                .date_naive();
            let rating = item.rating;
            let title = api::title_for(kind, item.movie, item.show);
            let entry = with_title_ref(&context, title, |id| RatingEntry::new(id, rating, rated_at))?;
            match entry {
                Some(Some(entry)) => entries.push(entry),
                Some(None) => {
                    return Err(SyncError::fetch(&context, format!("rating {} is outside 1-10", rating)));
                }
                None => {}
            }
        }
        Ok(Snapshot::verified(entries))
    }

    async fn history(&self) -> Result<Snapshot<HistoryEntry>> {
        let context = "trakt history movies";
        let items: Vec<api::HistoryItem> = self.get_paged(context, "/sync/history/movies").await?;

        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let watched_at = api::parse_timestamp(&item.watched_at)
                .ok_or_else(|| SyncError::fetch(context, format!("invalid watched_at {:?}", item.watched_at)))?;
            if let Some(entry) = with_title_ref(context, item.movie, |id| HistoryEntry { id, watched_at })? {
                entries.push(entry);
            }
        }
        Ok(Snapshot::verified(entries))
    }

    async fn add_to_watchlist(&self, kind: MediaKind, items: &[TitleRef]) -> Result<WriteOutcome> {
        let body: Vec<SyncItem> = items.iter().map(SyncItem::id_only).collect();
        let context = format!("trakt add watchlist {}", kind.plural());
        self.post_batch(&context, "/sync/watchlist", kind, &body, items).await
    }

    async fn remove_from_watchlist(&self, kind: MediaKind, items: &[TitleRef]) -> Result<WriteOutcome> {
        let body: Vec<SyncItem> = items.iter().map(SyncItem::id_only).collect();
        let context = format!("trakt remove watchlist {}", kind.plural());
        self.post_batch(&context, "/sync/watchlist/remove", kind, &body, items).await
    }

    async fn add_ratings(&self, kind: MediaKind, items: &[RatingEntry]) -> Result<WriteOutcome> {
        let body: Vec<SyncItem> = items.iter().map(SyncItem::rating).collect();
        let ids: Vec<TitleRef> = items.iter().map(|r| r.id.clone()).collect();
        let context = format!("trakt add ratings {}", kind.plural());
        self.post_batch(&context, "/sync/ratings", kind, &body, &ids).await
    }

    async fn remove_ratings(&self, kind: MediaKind, items: &[TitleRef]) -> Result<WriteOutcome> {
        let body: Vec<SyncItem> = items.iter().map(SyncItem::id_only).collect();
        let context = format!("trakt remove ratings {}", kind.plural());
        self.post_batch(&context, "/sync/ratings/remove", kind, &body, items).await
    }

    async fn add_history(&self, items: &[HistoryEntry]) -> Result<WriteOutcome> {
        let body: Vec<SyncItem> = items.iter().map(SyncItem::history).collect();
        let ids: Vec<TitleRef> = items.iter().map(|h| h.id.clone()).collect();
        self.post_batch("trakt add history movies", "/sync/history", MediaKind::Movie, &body, &ids)
            .await
    }
}
