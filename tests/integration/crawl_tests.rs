//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small documentation site and run
//! full crawls against it end-to-end.

use pinout_crawler::config::{parse_config, Config};
use pinout_crawler::crawler::Coordinator;
use pinout_crawler::output::{load_document, ProgramStatus};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_AGENT: &str = "curl/8.7.1";

/// Creates a test configuration pointing at the mock server
fn create_test_config(root_url: &str, output_dir: &Path, programs: &str) -> Config {
    parse_config(&format!(
        r#"
[crawler]
max-concurrency = 2
politeness-delay-ms = 0
request-timeout-secs = 5

[http]
user-agent = "{}"

[site]
root-url = "{}"

[output]
directory = "{}"
summary-path = "{}"

{}
"#,
        USER_AGENT,
        root_url,
        output_dir.display(),
        output_dir.join("summary.md").display(),
        programs
    ))
    .expect("valid test config")
}

const MODEL3_PROG18: &str = r#"
[[program]]
model = "Model3"
prog-id = "prog-18"
sop = "SOP1"
build-information = ["Fremont 2017-07 to 2018-12", "Fremont 2019-01 to 2019-06"]
"#;

fn connector_path(prog_id: &str, catalog: &str) -> String {
    format!(
        "/docs/Model3/ElectricalReference/{}/connector/{}/index.html",
        prog_id, catalog
    )
}

fn sidebar(catalogs: &[&str]) -> String {
    let items: String = catalogs
        .iter()
        .map(|catalog| {
            format!(
                r#"<a class="tds-site-nav-item" href="../{}/index.html">{}</a>"#,
                catalog,
                catalog.to_uppercase()
            )
        })
        .collect();
    format!(
        r#"<aside class="tds-layout-item tds-layout-aside"><nav class="tds-sidenav">{}</nav></aside>"#,
        items
    )
}

fn connector_page(catalog: &str, catalogs: &[&str], pinout: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><head><title>{name}</title></head>
<body>
  {sidebar}
  <section class="tds-layout-item tds-layout-main">
    <h1>{name}</h1>
    <div class="connector-meta">
      <div class="wrapper"><div class="label">Tesla Part Number</div><div class="value">1067745-00-B</div></div>
      <div class="wrapper"><div class="label">Connector</div><div class="value">TE 1-1718643-1</div></div>
      <div class="wrapper"><div class="label">Color</div><div class="value"></div></div>
    </div>
    <div class="connector-images">
      <figure><img src="images/{catalog}_front.png"><figcaption>Front view</figcaption></figure>
      <figure><img src="images/{catalog}_notes.txt"><figcaption>Harness side</figcaption></figure>
    </div>
    {pinout}
  </section>
</body></html>"#,
        name = catalog.to_uppercase(),
        catalog = catalog,
        sidebar = sidebar(catalogs),
        pinout = pinout
    )
}

const PINOUT: &str = r#"<table>
  <tr><th>Cavity</th><th>Wire Color</th><th>Terminal Manufacturer</th></tr>
  <tr><td>1</td><td>BK</td><td>TE Connectivity</td></tr>
  <tr><td>2</td><td>RD</td></tr>
  <tr><td>3</td><td colspan="2">Unused</td></tr>
</table>"#;

async fn mount_page(server: &MockServer, page_path: &str, body: String, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .and(header("user-agent", USER_AGENT))
        .and(header("accept", "*/*"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(expected_hits)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_failed_link_is_skipped_and_document_written() {
    let mock_server = MockServer::start().await;
    let catalogs = ["g011", "x002", "x003"];

    // Entry page doubles as the first connector; the cache serves it twice
    mount_page(
        &mock_server,
        &connector_path("prog-18", "g011"),
        connector_page("g011", &catalogs, PINOUT),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path(connector_path("prog-18", "x002")))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        &connector_path("prog-18", "x003"),
        connector_page("x003", &catalogs, ""),
        1,
    )
    .await;

    let output = tempfile::tempdir().expect("temp dir");
    let config = create_test_config(&mock_server.uri(), output.path(), MODEL3_PROG18);
    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let report = coordinator
        .run(&CancellationToken::new())
        .await
        .expect("Crawl failed");

    // Report names the failed link and why
    match &report.outcomes[0].status {
        ProgramStatus::Succeeded {
            connectors,
            skipped_links,
            ..
        } => {
            assert_eq!(*connectors, 2);
            assert_eq!(skipped_links.len(), 1);
            assert_eq!(skipped_links[0].index, 1);
            assert!(skipped_links[0].url.ends_with(&connector_path("prog-18", "x002")));
            assert!(
                skipped_links[0].reason.contains("500"),
                "reason was {}",
                skipped_links[0].reason
            );
        }
        other => panic!("unexpected status {:?}", other),
    }

    let document = load_document(&output.path().join("Model3_prog-18.json")).expect("document");
    assert_eq!(document.connectors.len(), 2);
    assert_eq!(document.descriptor.stage_tag, "SOP1");
    assert_eq!(
        document.descriptor.build_info,
        vec!["Fremont 2017-07 to 2018-12", "Fremont 2019-01 to 2019-06"]
    );

    let first = &document.connectors[0];
    assert_eq!(first.name.as_deref(), Some("G011"));
    assert_eq!(first.part_number.as_deref(), Some("1067745-00-B"));
    assert_eq!(first.connector_designator.as_deref(), Some("TE 1-1718643-1"));
    assert_eq!(first.body_color, None);
    assert_eq!(first.description.as_deref(), Some("Front view Harness side"));
    assert_eq!(
        first.image_urls,
        vec![format!(
            "{}/docs/Model3/ElectricalReference/prog-18/connector/g011/images/g011_front.png",
            mock_server.uri()
        )]
    );

    let second = &document.connectors[1];
    assert_eq!(second.name.as_deref(), Some("X003"));
    assert!(second.pinout_rows.is_empty());

    assert!(output.path().join("summary.md").exists());
}

#[tokio::test]
async fn test_written_file_format() {
    let mock_server = MockServer::start().await;
    let catalogs = ["g011"];
    mount_page(
        &mock_server,
        &connector_path("prog-18", "g011"),
        connector_page("g011", &catalogs, PINOUT),
        1,
    )
    .await;

    let output = tempfile::tempdir().expect("temp dir");
    let config = create_test_config(&mock_server.uri(), output.path(), MODEL3_PROG18);
    Coordinator::new(config)
        .expect("Failed to create coordinator")
        .run(&CancellationToken::new())
        .await
        .expect("Crawl failed");

    let raw = std::fs::read_to_string(output.path().join("Model3_prog-18.json")).expect("file");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("valid JSON");

    assert_eq!(json["model"], "Model3");
    assert_eq!(json["prog_id"], "prog-18");
    assert_eq!(json["sop"], "SOP1");
    assert_eq!(json["build_information"][1], "Fremont 2019-01 to 2019-06");

    let connector = &json["connectors"][0];
    assert!(connector["color"].is_null());
    assert_eq!(connector["tesla_part_number"], "1067745-00-B");

    let rows = connector["pinout_table"].as_array().expect("pinout rows");
    assert_eq!(rows.len(), 3);
    for row in rows {
        assert_eq!(row.as_object().expect("row object").len(), 3);
    }
    assert_eq!(
        rows[1],
        serde_json::json!({"Cavity": "2", "Wire Color": "RD", "Terminal Manufacturer": null})
    );
    assert_eq!(
        rows[2],
        serde_json::json!({"Cavity": "3", "Wire Color": "unused", "Terminal Manufacturer": "unused"})
    );

    // Header order survives on disk
    let cavity = raw.find("\"Cavity\"").expect("cavity key");
    let wire = raw.find("\"Wire Color\"").expect("wire key");
    let terminal = raw.find("\"Terminal Manufacturer\"").expect("terminal key");
    assert!(cavity < wire && wire < terminal);
}

#[tokio::test]
async fn test_missing_sidebar_skips_program_but_not_run() {
    let mock_server = MockServer::start().await;

    // prog-18 entry page has no sidebar
    mount_page(
        &mock_server,
        &connector_path("prog-18", "g011"),
        "<html><body><p>Loading...</p></body></html>".to_string(),
        1,
    )
    .await;

    let catalogs = ["g011", "x100"];
    mount_page(
        &mock_server,
        &connector_path("prog-19", "g011"),
        connector_page("g011", &catalogs, PINOUT),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        &connector_path("prog-19", "x100"),
        connector_page("x100", &catalogs, PINOUT),
        1,
    )
    .await;

    let programs = format!(
        "{}\n{}",
        MODEL3_PROG18,
        r#"
[[program]]
model = "Model3"
prog-id = "prog-19"
sop = "SOP2"
"#
    );

    let output = tempfile::tempdir().expect("temp dir");
    let config = create_test_config(&mock_server.uri(), output.path(), &programs);
    let report = Coordinator::new(config)
        .expect("Failed to create coordinator")
        .run(&CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(report.outcomes.len(), 2);
    assert!(!report.outcomes[0].is_success());
    assert!(report.outcomes[1].is_success());
    assert!(!output.path().join("Model3_prog-18.json").exists());

    let document = load_document(&output.path().join("Model3_prog-19.json")).expect("document");
    assert_eq!(document.connectors.len(), 2);
    assert_eq!(document.descriptor.stage_tag, "SOP2");
}

#[tokio::test]
async fn test_rerun_overwrites_document() {
    let mock_server = MockServer::start().await;
    let catalogs = ["g011", "x002"];
    mount_page(
        &mock_server,
        &connector_path("prog-18", "g011"),
        connector_page("g011", &catalogs, PINOUT),
        2,
    )
    .await;
    mount_page(
        &mock_server,
        &connector_path("prog-18", "x002"),
        connector_page("x002", &catalogs, PINOUT),
        2,
    )
    .await;

    let output = tempfile::tempdir().expect("temp dir");
    let target = output.path().join("Model3_prog-18.json");
    std::fs::write(&target, b"stale").expect("seed stale file");

    for _ in 0..2 {
        let config = create_test_config(&mock_server.uri(), output.path(), MODEL3_PROG18);
        Coordinator::new(config)
            .expect("Failed to create coordinator")
            .run(&CancellationToken::new())
            .await
            .expect("Crawl failed");
    }

    let document = load_document(&target).expect("document");
    assert_eq!(document.connectors.len(), 2);
    let names: Vec<_> = document
        .connectors
        .iter()
        .map(|c| c.name.clone().unwrap_or_default())
        .collect();
    assert_eq!(names, vec!["G011", "X002"]);
}

#[tokio::test]
async fn test_identity_headers_sent() {
    let mock_server = MockServer::start().await;

    // Only requests carrying the configured identity headers are answered
    mount_page(
        &mock_server,
        &connector_path("prog-18", "g011"),
        connector_page("g011", &["g011"], PINOUT),
        1,
    )
    .await;

    let output = tempfile::tempdir().expect("temp dir");
    let config = create_test_config(&mock_server.uri(), output.path(), MODEL3_PROG18);
    let report = Coordinator::new(config)
        .expect("Failed to create coordinator")
        .run(&CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert!(report.outcomes[0].is_success());
}
