//! Integration tests for the harvester
//!
//! These tests use wiremock to create mock HTTP servers and test the full
//! discovery, extraction and storage cycle end-to-end.

use sample_harvest::config::{Config, OutputConfig, ScraperConfig, SeedConfig, UserAgentConfig};
use sample_harvest::crawler::{build_harvester, run_harvest, UrlOutcome};
use sample_harvest::output::{format_markdown_summary, generate_summary};
use sample_harvest::storage::{open_store, DocumentFilter, DocumentStore};
use sample_harvest::{DocumentRecord, SectionKey};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SAMPLE_PATH: &str = "/ia-sample/ib-math-ai-sl/";

/// Creates a test configuration with no politeness delay
fn create_test_config(seeds: Vec<String>, db_path: &str, max_samples: usize) -> Config {
    Config {
        scraper: ScraperConfig {
            max_samples,
            min_delay_ms: 0,
            max_delay_ms: 0,
            request_timeout_secs: 5,
            max_retries: 2,
            backoff_ms: 10,
            round_delay_secs: 0,
            ..ScraperConfig::default()
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            database_path: db_path.to_string(),
            summary_path: "./test_summary.md".to_string(),
        },
        seeds: SeedConfig { urls: seeds },
    }
}

fn sample_path(id: &str) -> String {
    format!("{}{}", SAMPLE_PATH, id)
}

/// A complete sample page linking to `related`
fn sample_html(title: &str, related: &[&str]) -> String {
    let links: String = related
        .iter()
        .map(|id| format!(r#"<a href="{}">{}</a>"#, sample_path(id), id))
        .collect();

    format!(
        r#"<html>
        <head><title>{title} | Samples</title></head>
        <body>
        <h1 class="title">{title}</h1>
        <div class="description">An exploration of {title}</div>
        <div class="article-stats">1,850 words · 9 min read</div>
        <span class="date">2023-09-14</span>
        <h2>Introduction</h2>
        <p>Why {title} matters.</p>
        <ul><li>State the aim</li><li>Describe the data</li></ul>
        <h2>Mathematical Information</h2>
        <p>Definitions used.</p>
        <h2>Mathematical Processes</h2>
        <p>Calculations performed.</p>
        <h2>Interpretation of Findings</h2>
        <p>What the results mean.</p>
        <h2>Validity and Limitations</h2>
        <p>Sources of error.</p>
        <h2>Academic Honesty</h2>
        <p>References listed.</p>
        <p><a href="/files/{title}.pdf">Download</a></p>
        <div class="related-samples">{links}</div>
        </body>
        </html>"#
    )
}

async fn mount_page(server: &MockServer, id: &str, body: String, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(sample_path(id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_harvest_respects_cap() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "a", sample_html("alpha", &["b", "c", "d"]), 1).await;
    mount_page(&mock_server, "b", sample_html("beta", &[]), 1).await;
    mount_page(&mock_server, "c", sample_html("gamma", &[]), 1).await;
    mount_page(&mock_server, "d", sample_html("delta", &[]), 0).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("samples.db");
    let config = create_test_config(
        vec![format!("{}{}", base_url, sample_path("a"))],
        db_path.to_str().unwrap(),
        3,
    );

    let report = run_harvest(&config, "hash-1", &CancellationToken::new())
        .await
        .expect("harvest should succeed");

    assert_eq!(report.discovered, 3);
    assert_eq!(report.attempted, 3);
    assert_eq!(report.stored, 3);
    assert_eq!(report.created, 3);

    let store = open_store(&db_path).unwrap();
    let stats = store.stats().unwrap();
    assert_eq!(stats.count, 3);
    assert_eq!(stats.subjects, vec!["Math AI SL"]);

    let run = store.latest_run().unwrap().unwrap();
    assert_eq!(run.config_hash, "hash-1");
    assert_eq!((run.attempted, run.stored), (3, 3));
}

#[tokio::test]
async fn test_stored_record_fields() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_page(&mock_server, "a", sample_html("alpha", &[]), 1).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("samples.db");
    let seed = format!("{}{}", base_url, sample_path("a"));
    let config = create_test_config(vec![seed.clone()], db_path.to_str().unwrap(), 5);

    run_harvest(&config, "hash", &CancellationToken::new())
        .await
        .unwrap();

    let store = open_store(&db_path).unwrap();
    let value = store.get_by_key(&seed).unwrap().expect("record stored");
    let record = DocumentRecord::from_value(value).unwrap();

    assert_eq!(record.title, "alpha");
    assert_eq!(record.description, "An exploration of alpha");
    assert_eq!(record.word_count, Some(1850));
    assert_eq!(record.read_time.as_deref(), Some("9 min read"));
    assert_eq!(record.file_links, vec![format!("{}/files/alpha.pdf", base_url)]);
    assert_eq!(
        record.publication_date.map(|d| d.format("%Y-%m-%d").to_string()),
        Some("2023-09-14".to_string())
    );
    assert_eq!(record.filled_sections(), 6);

    let intro = record.section(SectionKey::Introduction).unwrap();
    assert_eq!(intro.checklist_items, vec!["State the aim", "Describe the data"]);
    assert!(!intro.content.contains("Definitions used"));
}

#[tokio::test]
async fn test_transient_errors_are_retried() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path(sample_path("a")))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "a", sample_html("alpha", &[]), 1).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("samples.db");
    let config = create_test_config(
        vec![format!("{}{}", base_url, sample_path("a"))],
        db_path.to_str().unwrap(),
        5,
    );

    let report = run_harvest(&config, "hash", &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.stored, 1);
}

#[tokio::test]
async fn test_broken_links_and_invalid_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "a", sample_html("alpha", &["missing", "untitled"]), 1).await;
    Mock::given(method("GET"))
        .and(path(sample_path("missing")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "untitled",
        "<html><body><p>Nothing to see</p></body></html>".to_string(),
        1,
    )
    .await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("samples.db");
    let config = create_test_config(
        vec![format!("{}{}", base_url, sample_path("a"))],
        db_path.to_str().unwrap(),
        5,
    );

    let report = run_harvest(&config, "hash", &CancellationToken::new())
        .await
        .unwrap();

    // the 404 is dropped during discovery and never attempted
    assert_eq!(report.discovered, 2);
    assert_eq!(report.stored, 1);
    assert_eq!(report.invalid, 1);

    let untitled = url::Url::parse(&format!("{}{}", base_url, sample_path("untitled"))).unwrap();
    assert!(matches!(report.outcome(&untitled), Some(UrlOutcome::Invalid(_))));
}

#[tokio::test]
async fn test_repeat_rounds_update_and_catalog() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_page(&mock_server, "a", sample_html("alpha", &["b"]), 2).await;
    mount_page(&mock_server, "b", sample_html("beta", &[]), 2).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("samples.db");
    let config = create_test_config(
        vec![format!("{}{}", base_url, sample_path("a"))],
        db_path.to_str().unwrap(),
        5,
    );

    let store = open_store(&db_path).unwrap();
    let mut harvester = build_harvester(&config, store).unwrap();

    let first = harvester.run_round(&CancellationToken::new()).await;
    let second = harvester.run_round(&CancellationToken::new()).await;
    assert_eq!(first.created, 2);
    assert_eq!(second.updated, 2);

    let found = harvester
        .store()
        .query(&DocumentFilter::default().text("BETA"), 0, 10)
        .unwrap();
    assert_eq!(found.len(), 1);

    let summary = generate_summary(harvester.store()).unwrap();
    let markdown = format_markdown_summary(&summary);
    assert!(markdown.contains("- **Stored Samples**: 2"));
    assert!(markdown.contains("- **Word Count**: 1850"));
}

#[tokio::test]
async fn test_empty_seed_list_is_a_no_op() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("samples.db");
    let config = create_test_config(vec![], db_path.to_str().unwrap(), 5);

    let report = run_harvest(&config, "hash", &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.attempted, 0);
    assert_eq!(open_store(&db_path).unwrap().stats().unwrap().count, 0);
}
