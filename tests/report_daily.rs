// tests/report_daily.rs
//
// Daily report batch: UTC-day filtering from the primary store and from the
// CSV fallback when degraded, plus date-keyed output filenames.

use chrono::{NaiveDate, TimeZone, Utc};

use sentipulse::record::{NewRecord, Sentiment};
use sentipulse::report::generate_daily_report;
use sentipulse::store::{Store, StoreConfig};

fn rec(id: &str, day: NaiveDate, hour: u32, sentiment: Sentiment) -> NewRecord {
    NewRecord {
        source_id: id.to_string(),
        raw_text: format!("post {id}"),
        normalized_text: format!("post {id}"),
        sentiment,
        confidence: 0.8,
        posted_at: Some(
            Utc.from_utc_datetime(&day.and_hms_opt(hour, 0, 0).unwrap()),
        ),
        language: None,
        geo: None,
    }
}

#[tokio::test]
async fn connected_store_reports_one_utc_day() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::connect(&StoreConfig {
        database_url: format!("sqlite://{}?mode=rwc", dir.path().join("posts.db").display()),
        fallback_path: dir.path().join("fallback.csv"),
    })
    .await
    .unwrap();

    let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let other = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
    store.insert(rec("1", day, 0, Sentiment::Positive)).await.unwrap();
    store.insert(rec("2", day, 23, Sentiment::Negative)).await.unwrap();
    store.insert(rec("3", other, 12, Sentiment::Neutral)).await.unwrap();

    let paths = generate_daily_report(&store, day, dir.path())
        .await
        .unwrap()
        .expect("report for a day with data");

    assert_eq!(
        paths.csv.file_name().unwrap().to_str().unwrap(),
        "report_2024-05-01.csv"
    );
    assert_eq!(
        paths.pdf.file_name().unwrap().to_str().unwrap(),
        "report_2024-05-01.pdf"
    );

    let csv = std::fs::read_to_string(&paths.csv).unwrap();
    assert_eq!(csv.lines().count(), 3, "header + the two in-day rows");
    assert!(!csv.contains("post 3"));

    let pdf = std::fs::read(&paths.pdf).unwrap();
    assert!(pdf.starts_with(b"%PDF"), "pdf magic bytes");
}

#[tokio::test]
async fn degraded_store_reports_from_the_fallback_file() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = StoreConfig {
        database_url: format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("no/such/dir/posts.db").display()
        ),
        fallback_path: dir.path().join("fallback.csv"),
    };
    let store = Store::connect(&cfg).await.unwrap();
    assert!(!store.connected());

    let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let other = NaiveDate::from_ymd_opt(2024, 4, 30).unwrap();
    store.insert(rec("1", day, 9, Sentiment::Positive)).await.unwrap();
    store.insert(rec("2", other, 9, Sentiment::Neutral)).await.unwrap();

    let paths = generate_daily_report(&store, day, dir.path())
        .await
        .unwrap()
        .expect("report from fallback rows");
    let csv = std::fs::read_to_string(&paths.csv).unwrap();
    assert_eq!(csv.lines().count(), 2, "header + the single in-day row");
}

#[tokio::test]
async fn day_without_records_produces_no_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::connect(&StoreConfig {
        database_url: format!("sqlite://{}?mode=rwc", dir.path().join("posts.db").display()),
        fallback_path: dir.path().join("fallback.csv"),
    })
    .await
    .unwrap();

    let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let out = generate_daily_report(&store, day, dir.path()).await.unwrap();
    assert!(out.is_none());
    assert!(!dir.path().join("report_2024-05-01.csv").exists());
    assert!(!dir.path().join("report_2024-05-01.pdf").exists());
}
