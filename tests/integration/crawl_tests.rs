//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end through the real HTTP fetcher.

use sitegraph::config::Config;
use sitegraph::crawler::crawl;
use sitegraph::output::format_markdown_summary;
use sitegraph::{parse_seed, CrawlResult};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short timeouts
fn create_test_config(max_workers: usize) -> Config {
    let mut config = Config::default();
    config.crawler.max_workers = max_workers;
    config.crawler.request_timeout_ms = 3_000;
    config.user_agent.crawler_name = "TestBot".to_string();
    config
}

/// Mounts an HTML page that must be requested exactly `times` times
async fn mount_page(server: &MockServer, page: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(times)
        .mount(server)
        .await;
}

async fn run(server: &MockServer, config: &Config) -> CrawlResult {
    crawl(&format!("{}/", server.uri()), config, CancellationToken::new())
        .await
        .expect("Crawl should start")
}

fn urls(result: &CrawlResult) -> HashSet<String> {
    result.urls().map(str::to_string).collect()
}

fn expected(server: &MockServer, paths: &[&str]) -> HashSet<String> {
    paths
        .iter()
        .map(|p| format!("{}{}", server.uri(), p))
        .collect()
}

#[tokio::test]
async fn test_root_and_linked_page() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<html><body><a href="/next">Next</a></body></html>"#, 1).await;
    mount_page(&server, "/next", "<html><body>No links</body></html>", 1).await;

    let result = run(&server, &create_test_config(5)).await;

    assert_eq!(urls(&result), expected(&server, &["/", "/next"]));
    let root = result.page(&format!("{}/", server.uri())).unwrap();
    assert_eq!(root.link_strs(), vec![format!("{}/next", server.uri())]);
    let next = result.page(&format!("{}/next", server.uri())).unwrap();
    assert!(next.links.is_empty());
    assert!(!result.is_partial());
}

#[tokio::test]
async fn test_file_links_are_never_fetched() {
    let server = MockServer::start().await;
    let body = format!(
        r#"<a href="{}/file.pdf">PDF</a><a href="/about">About</a>"#,
        server.uri()
    );
    mount_page(&server, "/", &body, 1).await;
    mount_page(&server, "/about", "", 1).await;
    mount_page(&server, "/file.pdf", "%PDF", 0).await;

    let result = run(&server, &create_test_config(5)).await;

    let root = result.page(&format!("{}/", server.uri())).unwrap();
    assert_eq!(root.link_strs(), vec![format!("{}/about", server.uri())]);
    assert_eq!(urls(&result), expected(&server, &["/", "/about"]));
}

#[tokio::test]
async fn test_duplicate_links_fetch_once() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<p><a href=/next>Next page</a></p><p><a href=/next>Next page</a></p>"#,
        1,
    )
    .await;
    mount_page(&server, "/next", r#"<a href="/">Home</a>"#, 1).await;

    let result = run(&server, &create_test_config(5)).await;

    let root = result.page(&format!("{}/", server.uri())).unwrap();
    assert_eq!(root.link_strs(), vec![format!("{}/next", server.uri())]);
    assert_eq!(result.pages.len(), 2);
}

#[tokio::test]
async fn test_cross_host_links_are_excluded() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="http://otherlink.com/what">Nooooo</a><a href="/stay">Stay</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/stay", "", 1).await;

    let result = run(&server, &create_test_config(5)).await;

    let root = result.page(&format!("{}/", server.uri())).unwrap();
    assert_eq!(root.link_strs(), vec![format!("{}/stay", server.uri())]);
    assert!(result.urls().all(|u| u.starts_with(&server.uri())));
}

#[tokio::test]
async fn test_fragments_are_stripped_and_deduplicated() {
    let server = MockServer::start().await;
    let body = format!(
        r#"<a href="{}/terms#section">Terms</a><a href="/terms#go-home">Terms again</a>"#,
        server.uri()
    );
    mount_page(&server, "/", &body, 1).await;
    mount_page(&server, "/terms", "", 1).await;

    let result = run(&server, &create_test_config(5)).await;

    let root = result.page(&format!("{}/", server.uri())).unwrap();
    assert_eq!(root.link_strs(), vec![format!("{}/terms", server.uri())]);
    assert_eq!(urls(&result), expected(&server, &["/", "/terms"]));
}

#[tokio::test]
async fn test_failed_fetch_is_dropped_and_crawl_continues() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/stalled">Stalled</a><a href="/ok">OK</a>"#, 1).await;
    mount_page(&server, "/ok", r#"<a href="/deeper">Deeper</a>"#, 1).await;
    mount_page(&server, "/deeper", "", 1).await;
    Mock::given(method("GET"))
        .and(path("/stalled"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<a href="/unreached">Unreached</a>"#)
                .set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/unreached", "", 0).await;

    let mut config = create_test_config(2);
    config.crawler.request_timeout_ms = 300;
    let result = run(&server, &config).await;

    assert_eq!(urls(&result), expected(&server, &["/", "/ok", "/deeper"]));
    assert_eq!(result.stats.fetch_errors, 1);
    assert!(!result.is_partial());
}

#[tokio::test]
async fn test_error_status_pages_are_recorded_and_followed() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/broken">Broken</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(
            ResponseTemplate::new(500).set_body_string(r#"<a href="/status">Status page</a>"#),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/status", "", 1).await;

    let result = run(&server, &create_test_config(2)).await;

    assert_eq!(urls(&result), expected(&server, &["/", "/broken", "/status"]));
    assert_eq!(result.stats.fetch_errors, 0);
}

#[tokio::test]
async fn test_oversized_body_is_dropped() {
    let server = MockServer::start().await;
    let big = format!(r#"<a href="/hidden">Hidden</a>{}"#, "x".repeat(1_000));
    mount_page(&server, "/", r#"<a href="/big">Big</a>"#, 1).await;
    mount_page(&server, "/big", &big, 1).await;
    mount_page(&server, "/hidden", "", 0).await;

    let mut config = create_test_config(2);
    config.crawler.max_document_bytes = 256;
    let result = run(&server, &config).await;

    assert_eq!(urls(&result), expected(&server, &["/"]));
    assert_eq!(result.stats.fetch_errors, 1);
}

#[tokio::test]
async fn test_control_characters_cannot_smuggle_file_links() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        "<a href=\"/file.p\tdf\">PDF</a><a href=\"/docs\\..\\secret\">Up</a><a href=\"/ok\">OK</a>",
        1,
    )
    .await;
    mount_page(&server, "/ok", "", 1).await;
    mount_page(&server, "/file.pdf", "%PDF", 0).await;
    mount_page(&server, "/secret", "", 0).await;

    let result = run(&server, &create_test_config(2)).await;

    assert_eq!(urls(&result), expected(&server, &["/", "/ok"]));
    let root = result.page(&format!("{}/", server.uri())).unwrap();
    assert_eq!(root.link_strs(), vec![format!("{}/ok", server.uri())]);
}

#[tokio::test]
async fn test_cancellation_returns_partial_result_promptly() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/slow1">1</a><a href="/slow2">2</a>"#, 1).await;
    for page in ["/slow1", "/slow2"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;
    }

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let result = crawl(&format!("{}/", server.uri()), &create_test_config(1), cancel)
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(urls(&result), expected(&server, &["/"]));
    assert_eq!(result.stats.cancelled_tasks, 1);
    assert_eq!(result.stats.frontier_remaining, 1);
    assert_eq!(result.stats.pending, 1);
    assert!(result.is_partial());
}

#[tokio::test]
async fn test_invalid_root_url_fails_to_start() {
    let result = crawl("localhost", &create_test_config(1), CancellationToken::new()).await;
    assert!(matches!(
        result,
        Err(sitegraph::CrawlError::InvalidSeedUrl { .. })
    ));
}

#[tokio::test]
async fn test_summary_lists_every_page() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#, 1).await;
    mount_page(&server, "/a", r#"<a href="/b">B</a>"#, 1).await;
    mount_page(&server, "/b", "", 1).await;

    let result = run(&server, &create_test_config(3)).await;
    let root = parse_seed(&format!("{}/", server.uri())).unwrap();
    let summary = format_markdown_summary(&result, &root);

    for page in ["/", "/a", "/b"] {
        assert!(summary.contains(&format!("### {}{}\n", server.uri(), page)));
    }
}
