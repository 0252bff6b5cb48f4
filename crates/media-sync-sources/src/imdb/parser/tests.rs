use super::*;

const WATCHLIST_HEADER: &str = "Position,Const,Created,Modified,Description,Title,URL,Title Type,IMDb Rating,Runtime (mins),Year,Genres,Num Votes,Release Date,Directors";
const RATINGS_HEADER: &str = "Const,Your Rating,Date Rated,Title,URL,Title Type,IMDb Rating,Runtime (mins),Year,Genres,Num Votes,Release Date,Directors";

fn csv(header: &str, rows: &[&str]) -> String {
    let mut out = String::from(header);
    for row in rows {
        out.push('\n');
        out.push_str(row);
    }
    out.push('\n');
    out
}

#[test]
fn test_parse_watchlist_csv() {
    let data = csv(
        WATCHLIST_HEADER,
        &[
            "1,tt0111161,2020-01-01,2020-01-01,,The Shawshank Redemption,https://www.imdb.com/title/tt0111161/,Movie,9.3,142,1994,Drama,2500000,1994-09-23,Frank Darabont",
            "2,tt0944947,2020-01-02,2020-01-02,,Game of Thrones,https://www.imdb.com/title/tt0944947/,TV Series,9.2,57,2011,\"Action, Drama\",2000000,2011-04-17,",
        ],
    );

    let rows = parse_watchlist_csv(&data).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].kind, MediaKind::Movie);
    assert_eq!(rows[0].entry.id.as_str(), "tt0111161");
    assert_eq!(rows[1].kind, MediaKind::Show);
    assert_eq!(rows[1].entry.id.as_str(), "tt0944947");
}

#[test]
fn test_parse_watchlist_csv_camel_case_types_and_bom() {
    let data = format!(
        "\u{feff}{}",
        csv(
            WATCHLIST_HEADER,
            &[
                "1,tt1375666,2020-01-01,2020-01-01,,Inception,,movie,8.8,148,2010,Action,2000000,2010-07-16,",
                "2,tt0903747,2020-01-01,2020-01-01,,Breaking Bad,,tvSeries,9.5,49,2008,Drama,2000000,2008-01-20,",
                "3,tt0959621,2020-01-01,2020-01-01,,Pilot,,tvEpisode,9.0,58,2008,Drama,40000,2008-01-20,",
            ],
        )
    );

    let rows = parse_watchlist_csv(&data).unwrap();
    let kinds: Vec<MediaKind> = rows.iter().map(|r| r.kind).collect();
    assert_eq!(kinds, vec![MediaKind::Movie, MediaKind::Show]);
}

#[test]
fn test_parse_watchlist_csv_skips_unusable_ids() {
    let data = csv(
        WATCHLIST_HEADER,
        &[
            "1,,2020-01-01,2020-01-01,,No Id,,Movie,,,,,,,",
            "2,nm0000138,2020-01-01,2020-01-01,,A Person,,Movie,,,,,,,",
            "3,tt0111161,2020-01-01,2020-01-01,,The Shawshank Redemption,,Movie,,,,,,,",
        ],
    );

    let rows = parse_watchlist_csv(&data).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].entry.id.as_str(), "tt0111161");
}

#[test]
fn test_parse_watchlist_header_only_is_legitimately_empty() {
    let rows = parse_watchlist_csv(&csv(WATCHLIST_HEADER, &[])).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_parse_watchlist_csv_missing_column() {
    let result = parse_watchlist_csv("Title,Year\nTest,2020\n");
    match result {
        Err(SyncError::FetchFailure { message, .. }) => {
            assert!(message.contains("Missing required column"));
        }
        other => panic!("expected fetch failure, got {:?}", other),
    }
}

#[test]
fn test_parse_empty_body_is_a_failure() {
    assert!(matches!(parse_watchlist_csv("  \n"), Err(SyncError::FetchFailure { .. })));
    assert!(matches!(parse_ratings_csv(""), Err(SyncError::FetchFailure { .. })));
}

#[test]
fn test_parse_ratings_csv() {
    let data = csv(
        RATINGS_HEADER,
        &[
            "tt0111161,10,2020-01-01,The Shawshank Redemption,https://www.imdb.com/title/tt0111161/,Movie,9.3,142,1994,Drama,2500000,1994-09-23,Frank Darabont",
            "tt0944947,9,2020-01-02,Game of Thrones,https://www.imdb.com/title/tt0944947/,TV Series,9.2,57,2011,Drama,2000000,2011-04-17,",
        ],
    );

    let rows = parse_ratings_csv(&data).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].kind, MediaKind::Movie);
    assert_eq!(rows[0].entry.rating, 10);
    assert_eq!(rows[0].entry.rated_at, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    assert_eq!(rows[1].kind, MediaKind::Show);
    assert_eq!(rows[1].entry.rating, 9);
}

#[test]
fn test_parse_ratings_csv_rejects_bad_rating() {
    let data = csv(RATINGS_HEADER, &["tt0111161,11,2020-01-01,Title,,Movie,,,,,,,"]);
    assert!(matches!(parse_ratings_csv(&data), Err(SyncError::FetchFailure { .. })));

    let data = csv(RATINGS_HEADER, &["tt0111161,ten,2020-01-01,Title,,Movie,,,,,,,"]);
    assert!(matches!(parse_ratings_csv(&data), Err(SyncError::FetchFailure { .. })));
}

#[test]
fn test_parse_ratings_csv_rejects_bad_date() {
    let data = csv(RATINGS_HEADER, &["tt0111161,8,01/02/2020,Title,,Movie,,,,,,,"]);
    match parse_ratings_csv(&data) {
        Err(SyncError::FetchFailure { message, .. }) => assert!(message.contains("01/02/2020")),
        other => panic!("expected fetch failure, got {:?}", other),
    }
}

#[test]
fn test_map_title_type() {
    assert_eq!(map_title_type("TV Mini Series"), Some(MediaKind::Show));
    assert_eq!(map_title_type("tvMovie"), Some(MediaKind::Movie));
    assert_eq!(map_title_type("TV Episode"), None);
    assert_eq!(map_title_type("Video Game"), None);
}
