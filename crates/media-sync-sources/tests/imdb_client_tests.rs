//! IMDb export fetching against a mock server.

use chrono::{TimeZone, Utc};
use media_sync_config::{ImdbConfig, Secret};
use media_sync_models::{MediaKind, SyncError};
use media_sync_sources::{HttpClient, ImdbClient, SourceCatalog};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WATCHLIST_CSV: &str = "\
Position,Const,Created,Modified,Description,Title,URL,Title Type,IMDb Rating,Runtime (mins),Year,Genres,Num Votes,Release Date,Directors
1,tt0111161,2020-01-01,2020-01-01,,The Shawshank Redemption,https://www.imdb.com/title/tt0111161/,Movie,9.3,142,1994,Drama,2500000,1994-09-23,Frank Darabont
2,tt0944947,2020-01-02,2020-01-02,,Game of Thrones,https://www.imdb.com/title/tt0944947/,TV Series,9.2,57,2011,Drama,2000000,2011-04-17,
3,tt0111161,2020-01-03,2020-01-03,,The Shawshank Redemption,https://www.imdb.com/title/tt0111161/,Movie,9.3,142,1994,Drama,2500000,1994-09-23,Frank Darabont
";

const RATINGS_CSV: &str = "\
Const,Your Rating,Date Rated,Title,URL,Title Type,IMDb Rating,Runtime (mins),Year,Genres,Num Votes,Release Date,Directors
tt0111161,10,2020-01-01,The Shawshank Redemption,https://www.imdb.com/title/tt0111161/,Movie,9.3,142,1994,Drama,2500000,1994-09-23,Frank Darabont
tt0944947,9,2020-01-02,Game of Thrones,https://www.imdb.com/title/tt0944947/,TV Series,9.2,57,2011,Drama,2000000,2011-04-17,
tt1375666,8,2021-06-30,Inception,https://www.imdb.com/title/tt1375666/,Movie,8.8,148,2010,Action,2000000,2010-07-16,Christopher Nolan
";

fn client(server: &MockServer, ratings_id: &str) -> ImdbClient {
    let config = ImdbConfig {
        at_main: Secret::new("at-cookie"),
        ubid_main: Secret::new("ubid-cookie"),
        ratings_list_id: ratings_id.to_string(),
        watchlist_list_id: "ls000000002".to_string(),
        base_url: server.uri(),
    };
    let http = HttpClient::new(Duration::from_secs(5), false).unwrap();
    ImdbClient::new(&config, http)
}

fn csv_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/csv")
        .set_body_string(body)
}

#[tokio::test]
async fn test_watchlist_sends_cookies_and_filters_kind() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list/ls000000002/export"))
        .and(header("cookie", "at-main=at-cookie; ubid-main=ubid-cookie"))
        .respond_with(csv_response(WATCHLIST_CSV))
        .expect(1)
        .mount(&server)
        .await;

    let imdb = client(&server, "ls000000001");
    let movies = imdb.watchlist(MediaKind::Movie).await.unwrap();
    let shows = imdb.watchlist(MediaKind::Show).await.unwrap();

    let movie_ids: Vec<&str> = movies.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(movie_ids, vec!["tt0111161"]);
    assert_eq!(movies.duplicates_dropped(), 1);
    assert_eq!(shows.len(), 1);
    assert_eq!(shows.items()[0].id.as_str(), "tt0944947");
}

#[tokio::test]
async fn test_ratings_export_is_downloaded_once_per_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/ur12345678/ratings/export"))
        .respond_with(csv_response(RATINGS_CSV))
        .expect(1)
        .mount(&server)
        .await;

    let imdb = client(&server, "ur12345678");
    let movies = imdb.ratings(MediaKind::Movie).await.unwrap();
    let shows = imdb.ratings(MediaKind::Show).await.unwrap();
    let history = imdb.history().await.unwrap();

    assert_eq!(movies.len(), 2);
    assert_eq!(shows.len(), 1);
    assert_eq!(shows.items()[0].rating, 9);

    let watched: Vec<(&str, _)> = history
        .iter()
        .map(|h| (h.id.as_str(), h.watched_at))
        .collect();
    assert_eq!(
        watched,
        vec![
            ("tt0111161", Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()),
            ("tt1375666", Utc.with_ymd_and_hms(2021, 6, 30, 0, 0, 0).unwrap()),
        ]
    );
}

#[tokio::test]
async fn test_login_page_is_a_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list/ls000000002/export"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string("<!DOCTYPE html><html><body>Sign in</body></html>"),
        )
        .mount(&server)
        .await;

    let result = client(&server, "ls000000001").watchlist(MediaKind::Movie).await;
    match result {
        Err(SyncError::FetchFailure { message, .. }) => assert!(message.contains("cookies")),
        other => panic!("expected fetch failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_forbidden_is_a_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list/ls000000001/export"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let result = client(&server, "ls000000001").ratings(MediaKind::Movie).await;
    match result {
        Err(SyncError::FetchFailure { message, .. }) => assert!(message.contains("403")),
        other => panic!("expected fetch failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_header_only_export_is_legitimately_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list/ls000000002/export"))
        .respond_with(csv_response(
            "Position,Const,Created,Modified,Description,Title,URL,Title Type\n",
        ))
        .mount(&server)
        .await;

    let snapshot = client(&server, "ls000000001").watchlist(MediaKind::Show).await.unwrap();
    assert!(snapshot.is_empty());
}
