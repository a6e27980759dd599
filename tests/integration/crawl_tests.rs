//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small directory site and drive the full
//! crawl: root discovery, batch scheduling, pagination and checkpointing.

use listing_harvester::config::{Config, CrawlerConfig, OutputConfig, SelectorConfig, SiteConfig};
use listing_harvester::crawler::HttpCrawlDriver;
use listing_harvester::state::{BusinessRecord, ProgressState};
use listing_harvester::storage::{JsonProgressStore, ProgressStore};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, dir: &TempDir) -> Config {
    Config {
        site: SiteConfig {
            root_url: format!("{}/los-angeles-ca", base_url),
            user_agent: "TestAgent/1.0".to_string(),
        },
        crawler: CrawlerConfig {
            concurrency: 2,
            retry_attempts: 3,
            retry_delay: 0,
            page_load_timeout: 5_000,
            result_wait_timeout: 5_000,
            page_delay: [0, 0],
            batch_cooldown: 0,
            max_task_failures: None,
        },
        output: OutputConfig {
            output_path: dir.path().join("listings.csv").display().to_string(),
            progress_path: dir.path().join("progress.json").display().to_string(),
        },
        selectors: SelectorConfig::default(),
    }
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

fn root_page(subcategories: &[&str]) -> String {
    let links: String = subcategories
        .iter()
        .map(|name| format!(r#"<a href="/los-angeles-ca/{0}">{0}</a>"#, name))
        .collect();
    format!(
        r#"<html><body><section class="popular-cats">
        <article><h3>Food</h3><div class="row expand-area">{}</div></article>
        </section></body></html>"#,
        links
    )
}

fn listing_page(prefix: &str, count: usize) -> String {
    let listings: String = (0..count)
        .map(|i| {
            format!(
                r#"<div class="result"><a class="business-name"><span>{prefix} {i}</span></a>
                <div class="street-address">{i} Main St</div>
                <div class="locality">Los Angeles, CA</div></div>"#
            )
        })
        .collect();
    format!(r#"<html><body><div class="organic">{listings}</div></body></html>"#)
}

async fn mount_root(server: &MockServer, subcategories: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/los-angeles-ca"))
        .respond_with(html(root_page(subcategories)))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, subcategory: &str, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/los-angeles-ca/{}", subcategory)))
        .and(query_param("page", page.to_string()))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn read_records(dir: &TempDir) -> Vec<BusinessRecord> {
    let mut reader = csv::Reader::from_path(dir.path().join("listings.csv")).unwrap();
    reader.deserialize().map(|r| r.unwrap()).collect()
}

fn load_progress(dir: &TempDir) -> ProgressState {
    JsonProgressStore::new(dir.path().join("progress.json")).load()
}

async fn requests_to(server: &MockServer, subcategory: &str) -> usize {
    let target = format!("/los-angeles-ca/{}", subcategory);
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == target)
        .count()
}

#[tokio::test]
async fn test_completed_and_failed_subcategories() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_root(&server, &["pizza", "sushi"]).await;
    mount_page(&server, "pizza", 1, listing_page("Pizza A", 20)).await;
    mount_page(&server, "pizza", 2, listing_page("Pizza B", 20)).await;
    mount_page(&server, "pizza", 3, listing_page("Pizza C", 0)).await;
    Mock::given(method("GET"))
        .and(path("/los-angeles-ca/sushi"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let driver = HttpCrawlDriver::from_config(create_test_config(&server.uri(), &dir)).unwrap();
    let report = driver.run().await.expect("Crawl failed");

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);

    let records = read_records(&dir);
    assert_eq!(records.len(), 40);
    assert_eq!(records[0].name, "Pizza A 0");
    assert_eq!(records[20].name, "Pizza B 0");
    assert!(records.iter().all(|r| r.category == "Food" && r.sub_category == "pizza"));
    assert_eq!(records[0].phone, "N/A");

    // Three navigation attempts on page 1, nothing past it
    assert_eq!(requests_to(&server, "sushi").await, 3);

    let summary = driver.summary().await;
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.failed, vec!["Food-sushi".to_string()]);

    let progress = load_progress(&dir);
    assert!(progress.is_completed("Food-pizza"));
    assert!(progress.is_failed("Food-sushi"));
    assert!(progress.last_run.is_some());
}

#[tokio::test]
async fn test_duplicate_page_stops_pagination() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_root(&server, &["tacos"]).await;
    mount_page(&server, "tacos", 1, listing_page("Taco", 20)).await;
    mount_page(&server, "tacos", 2, listing_page("Taco", 20)).await;

    let driver = HttpCrawlDriver::from_config(create_test_config(&server.uri(), &dir)).unwrap();
    driver.run().await.expect("Crawl failed");

    assert_eq!(read_records(&dir).len(), 20);
    assert_eq!(requests_to(&server, "tacos").await, 2);
    assert!(load_progress(&dir).is_completed("Food-tacos"));
}

#[tokio::test]
async fn test_missing_results_container_ends_task() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_root(&server, &["bakery"]).await;
    mount_page(&server, "bakery", 1, listing_page("Bread", 5)).await;
    // Past the last page the site answers 404 without a results container
    Mock::given(method("GET"))
        .and(path("/los-angeles-ca/bakery"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html><body>Not found</body></html>"))
        .mount(&server)
        .await;

    let driver = HttpCrawlDriver::from_config(create_test_config(&server.uri(), &dir)).unwrap();
    let report = driver.run().await.expect("Crawl failed");

    assert_eq!(report.succeeded, 1);
    assert_eq!(read_records(&dir).len(), 5);
}

#[tokio::test]
async fn test_second_run_skips_completed_tasks() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_root(&server, &["pizza", "sushi"]).await;
    mount_page(&server, "pizza", 1, listing_page("Pizza", 3)).await;
    mount_page(&server, "sushi", 1, listing_page("Sushi", 3)).await;

    let config = create_test_config(&server.uri(), &dir);
    let driver = HttpCrawlDriver::from_config(config.clone()).unwrap();
    driver.run().await.expect("First crawl failed");
    drop(driver);

    let pizza_before = requests_to(&server, "pizza").await;
    let sushi_before = requests_to(&server, "sushi").await;

    let driver = HttpCrawlDriver::from_config(config).unwrap();
    let report = driver.run().await.expect("Second crawl failed");

    assert_eq!(report.skipped, 2);
    assert_eq!(report.dispatched(), 0);
    assert_eq!(requests_to(&server, "pizza").await, pizza_before);
    assert_eq!(requests_to(&server, "sushi").await, sushi_before);
    assert_eq!(read_records(&dir).len(), 6);
}

#[tokio::test]
async fn test_resume_after_interrupted_batch() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_root(&server, &["donuts", "eclairs"]).await;
    mount_page(&server, "donuts", 1, listing_page("Donut", 2)).await;
    mount_page(&server, "eclairs", 1, listing_page("Eclair", 2)).await;

    // State left behind by a run killed after "donuts" was checkpointed but
    // before "eclairs" reached an outcome
    let mut state = ProgressState::new();
    state.mark_completed("Food-donuts");
    JsonProgressStore::new(dir.path().join("progress.json"))
        .save(&mut state)
        .unwrap();

    let driver = HttpCrawlDriver::from_config(create_test_config(&server.uri(), &dir)).unwrap();
    let report = driver.run().await.expect("Crawl failed");

    assert_eq!(report.skipped, 1);
    assert_eq!(report.succeeded, 1);
    assert_eq!(requests_to(&server, "donuts").await, 0);
    assert!(requests_to(&server, "eclairs").await > 0);

    let progress = load_progress(&dir);
    assert!(progress.is_completed("Food-donuts"));
    assert!(progress.is_completed("Food-eclairs"));
}

#[tokio::test]
async fn test_failed_task_retried_on_next_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_root(&server, &["ramen"]).await;
    let config = create_test_config(&server.uri(), &dir);

    {
        let _outage = Mock::given(method("GET"))
            .and(path("/los-angeles-ca/ramen"))
            .respond_with(ResponseTemplate::new(500))
            .mount_as_scoped(&server)
            .await;

        let driver = HttpCrawlDriver::from_config(config.clone()).unwrap();
        let report = driver.run().await.expect("Crawl failed");
        assert_eq!(report.failed, 1);
    }

    mount_page(&server, "ramen", 1, listing_page("Ramen", 4)).await;

    let driver = HttpCrawlDriver::from_config(config).unwrap();
    let report = driver.run().await.expect("Crawl failed");
    assert_eq!(report.succeeded, 1);

    let progress = load_progress(&dir);
    assert!(progress.is_completed("Food-ramen"));
    assert!(!progress.is_failed("Food-ramen"));
    assert_eq!(read_records(&dir).len(), 4);
}

#[tokio::test]
async fn test_unreachable_root_is_fatal() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/los-angeles-ca"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let driver = HttpCrawlDriver::from_config(create_test_config(&server.uri(), &dir)).unwrap();
    let result = driver.run().await;

    assert!(matches!(
        result,
        Err(listing_harvester::HarvestError::Setup(_))
    ));
    assert!(!dir.path().join("progress.json").exists());
}
