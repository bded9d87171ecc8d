//! Integration tests for the mirror
//!
//! These tests use wiremock to serve fake directory listings and files and
//! run full mirror cycles end-to-end into temporary directories.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use sumi_mirror::config::{Config, HttpConfig};
use sumi_mirror::crawler::{build_http_client, run_mirror, Fetcher, RetryPolicy};
use sumi_mirror::download::{Transfer, WorkQueue, WorkerPool, PART_SUFFIX};
use sumi_mirror::output::{collect_local_files, verify};
use sumi_mirror::state::{SharedState, WorkItem};
use sumi_mirror::url::local_path_for;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration mirroring `<server>/repo/`
fn create_test_config(server: &MockServer, output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.mirror.base_url = format!("{}/repo/", server.uri());
    config.mirror.output_dir = output_dir.display().to_string();
    config.crawler.delay = 0.0;
    config.crawler.timeout = 5;
    config.crawler.workers = 4;
    config.crawler.idle_timeout_ms = 50;
    config.crawler.shutdown_timeout_ms = 1000;
    config
}

fn listing(entries: &[&str]) -> ResponseTemplate {
    let links: String = entries
        .iter()
        .map(|href| format!("<a href=\"{}\">{}</a>\n", href, href))
        .collect();
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><body><h1>Index</h1>\n<a href=\"../\">../</a>\n{}</body></html>",
            links
        ))
        .insert_header("content-type", "text/html")
}

async fn mount_get(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Mounts `/repo/` with `file.txt` and `sub/`, and `sub/` with `nested.bin`
async fn mount_basic_tree(server: &MockServer) {
    mount_get(server, "/repo/", listing(&["file.txt", "sub/"])).await;
    mount_get(server, "/repo/sub/", listing(&["nested.bin"])).await;
    mount_get(
        server,
        "/repo/file.txt",
        ResponseTemplate::new(200).set_body_string("hello mirror"),
    )
    .await;
    mount_get(
        server,
        "/repo/sub/nested.bin",
        ResponseTemplate::new(200).set_body_bytes(vec![7u8; 20_000]),
    )
    .await;
}

fn local(output_dir: &Path, server: &MockServer, rel: &str) -> PathBuf {
    let url = Url::parse(&format!("{}/repo/{}", server.uri(), rel)).unwrap();
    local_path_for(output_dir, &url)
}

fn leftover_part_files(root: &Path) -> Vec<PathBuf> {
    collect_local_files(root)
        .into_iter()
        .filter(|p| p.to_string_lossy().ends_with(PART_SUFFIX))
        .collect()
}

#[tokio::test]
async fn test_full_mirror_of_nested_tree() {
    let server = MockServer::start().await;
    mount_basic_tree(&server).await;
    let tmp = TempDir::new().unwrap();

    let report = run_mirror(create_test_config(&server, tmp.path()))
        .await
        .unwrap();

    assert_eq!(report.counters.downloaded, 2);
    assert_eq!(report.counters.skipped, 0);
    assert_eq!(report.counters.failed, 0);
    assert_eq!(report.directories_scanned, 2);
    assert!(report.verification.passed());
    assert_eq!(report.verification.remote_total, 2);

    let file = local(tmp.path(), &server, "file.txt");
    let nested = local(tmp.path(), &server, "sub/nested.bin");
    assert_eq!(std::fs::read_to_string(&file).unwrap(), "hello mirror");
    assert_eq!(std::fs::read(&nested).unwrap().len(), 20_000);

    // the remote hierarchy is kept under <output>/<host:port>/
    let host_dir = tmp.path().join(Url::parse(&server.uri()).unwrap().authority());
    assert!(file.starts_with(&host_dir));
    assert!(leftover_part_files(tmp.path()).is_empty());
}

#[tokio::test]
async fn test_second_run_skips_existing_files() {
    let server = MockServer::start().await;
    mount_basic_tree(&server).await;
    let tmp = TempDir::new().unwrap();

    let first = run_mirror(create_test_config(&server, tmp.path()))
        .await
        .unwrap();
    assert_eq!(first.counters.downloaded, 2);

    let second = run_mirror(create_test_config(&server, tmp.path()))
        .await
        .unwrap();
    assert_eq!(second.counters.downloaded, 0);
    assert_eq!(second.counters.skipped, 2);
    assert_eq!(second.counters.failed, 0);
    assert!(second.verification.passed());
}

#[tokio::test]
async fn test_out_of_scope_links_are_ignored() {
    let server = MockServer::start().await;
    mount_get(
        &server,
        "/repo/",
        listing(&["keep.txt", "/other/outside.txt", "https://elsewhere.invalid/x.txt"]),
    )
    .await;
    mount_get(
        &server,
        "/repo/keep.txt",
        ResponseTemplate::new(200).set_body_string("kept"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/other/outside.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("nope"))
        .expect(0)
        .mount(&server)
        .await;
    let tmp = TempDir::new().unwrap();

    let report = run_mirror(create_test_config(&server, tmp.path()))
        .await
        .unwrap();

    assert_eq!(report.counters.downloaded, 1);
    assert_eq!(report.verification.remote_total, 1);
    assert!(report.verification.passed());
    assert_eq!(collect_local_files(tmp.path()).len(), 1);
}

#[tokio::test]
async fn test_failed_download_leaves_no_file() {
    let server = MockServer::start().await;
    mount_get(&server, "/repo/", listing(&["good.txt", "gone.txt"])).await;
    mount_get(
        &server,
        "/repo/good.txt",
        ResponseTemplate::new(200).set_body_string("good"),
    )
    .await;
    mount_get(&server, "/repo/gone.txt", ResponseTemplate::new(404)).await;
    let tmp = TempDir::new().unwrap();

    let report = run_mirror(create_test_config(&server, tmp.path()))
        .await
        .unwrap();

    assert_eq!(report.counters.downloaded, 1);
    assert_eq!(report.counters.failed, 1);
    assert!(!report.verification.passed());

    let gone = local(tmp.path(), &server, "gone.txt");
    assert!(!gone.exists());
    assert_eq!(report.verification.missing, vec![gone]);
    assert!(leftover_part_files(tmp.path()).is_empty());
}

#[tokio::test]
async fn test_failed_listing_does_not_abort_run() {
    let server = MockServer::start().await;
    mount_get(&server, "/repo/", listing(&["broken/", "ok.txt"])).await;
    mount_get(&server, "/repo/broken/", ResponseTemplate::new(500)).await;
    mount_get(
        &server,
        "/repo/ok.txt",
        ResponseTemplate::new(200).set_body_string("ok"),
    )
    .await;
    let tmp = TempDir::new().unwrap();

    let report = run_mirror(create_test_config(&server, tmp.path()))
        .await
        .unwrap();

    assert_eq!(report.counters.downloaded, 1);
    assert_eq!(report.counters.failed, 0);
    assert!(report.verification.passed());
}

#[tokio::test]
async fn test_directory_link_without_slash_is_fetched_as_file() {
    let server = MockServer::start().await;
    mount_get(&server, "/repo/", listing(&["docs"])).await;
    mount_get(
        &server,
        "/repo/docs",
        ResponseTemplate::new(200)
            .set_body_string("<html><body>a listing</body></html>")
            .insert_header("content-type", "text/html"),
    )
    .await;
    let tmp = TempDir::new().unwrap();

    let report = run_mirror(create_test_config(&server, tmp.path()))
        .await
        .unwrap();

    assert_eq!(report.directories_scanned, 1);
    assert_eq!(report.counters.downloaded, 1);
    assert!(local(tmp.path(), &server, "docs").is_file());
}

#[tokio::test]
async fn test_verifier_reports_externally_deleted_file() {
    let server = MockServer::start().await;
    mount_basic_tree(&server).await;
    let tmp = TempDir::new().unwrap();

    let report = run_mirror(create_test_config(&server, tmp.path()))
        .await
        .unwrap();
    assert!(report.verification.passed());

    let file = local(tmp.path(), &server, "file.txt");
    let nested = local(tmp.path(), &server, "sub/nested.bin");
    std::fs::remove_file(&nested).unwrap();

    let expected = vec![file, nested.clone()];
    let verification = verify(tmp.path(), &expected, report.counters);
    assert!(!verification.passed());
    assert_eq!(verification.local_total, 1);
    assert_eq!(verification.missing, vec![nested]);
    assert_eq!(verification.extra, 0);
}

#[tokio::test]
async fn test_transient_failure_retried_when_enabled() {
    let server = MockServer::start().await;
    mount_get(&server, "/repo/", listing(&["flaky.txt"])).await;
    Mock::given(method("GET"))
        .and(path("/repo/flaky.txt"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_get(
        &server,
        "/repo/flaky.txt",
        ResponseTemplate::new(200).set_body_string("second time lucky"),
    )
    .await;
    let tmp = TempDir::new().unwrap();

    let mut config = create_test_config(&server, tmp.path());
    config.crawler.retries = 1;
    config.crawler.retry_backoff_ms = 10;
    let report = run_mirror(config).await.unwrap();

    assert_eq!(report.counters.downloaded, 1);
    assert_eq!(report.counters.failed, 0);
    assert_eq!(
        std::fs::read_to_string(local(tmp.path(), &server, "flaky.txt")).unwrap(),
        "second time lucky"
    );
}

#[tokio::test]
async fn test_transient_failure_not_retried_by_default() {
    let server = MockServer::start().await;
    mount_get(&server, "/repo/", listing(&["flaky.txt"])).await;
    Mock::given(method("GET"))
        .and(path("/repo/flaky.txt"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    let tmp = TempDir::new().unwrap();

    let report = run_mirror(create_test_config(&server, tmp.path()))
        .await
        .unwrap();

    assert_eq!(report.counters.failed, 1);
    assert_eq!(report.counters.downloaded, 0);
}

#[tokio::test]
async fn test_worker_pool_drains_queue() {
    let server = MockServer::start().await;
    for i in 0..10 {
        mount_get(
            &server,
            &format!("/files/f{}.dat", i),
            ResponseTemplate::new(200).set_body_string(format!("payload {}", i)),
        )
        .await;
    }
    let tmp = TempDir::new().unwrap();

    let client = build_http_client(&HttpConfig::default(), Duration::from_secs(5)).unwrap();
    let fetcher = Fetcher::new(client, Duration::from_secs(5), RetryPolicy::none());
    let queue = Arc::new(WorkQueue::new());
    let state = Arc::new(SharedState::new());
    let pool = WorkerPool::spawn(
        3,
        Arc::clone(&queue),
        Arc::new(Transfer::new(fetcher)),
        Arc::clone(&state),
        Duration::from_millis(20),
    )
    .unwrap();

    for i in 0..10 {
        let url = Url::parse(&format!("{}/files/f{}.dat", server.uri(), i)).unwrap();
        let local_path = local_path_for(tmp.path(), &url);
        queue.push(WorkItem::new(url, local_path)).unwrap();
    }

    tokio::time::timeout(Duration::from_secs(10), queue.join())
        .await
        .expect("queue did not drain");
    let processed = pool.shutdown(Duration::from_secs(1)).await;

    assert_eq!(processed, 10);
    assert_eq!(queue.unfinished(), 0);
    let counters = state.counters.snapshot();
    assert_eq!(counters.downloaded, 10);
    assert_eq!(counters.failed, 0);
    assert_eq!(collect_local_files(tmp.path()).len(), 10);
}

#[tokio::test]
async fn test_shared_subdirectory_scanned_once() {
    let server = MockServer::start().await;
    mount_get(&server, "/repo/", listing(&["a/", "shared/"])).await;
    mount_get(&server, "/repo/a/", listing(&["/repo/shared/"])).await;
    Mock::given(method("GET"))
        .and(path("/repo/shared/"))
        .respond_with(listing(&["one.txt"]))
        .expect(1)
        .mount(&server)
        .await;
    mount_get(
        &server,
        "/repo/shared/one.txt",
        ResponseTemplate::new(200).set_body_string("one"),
    )
    .await;
    let tmp = TempDir::new().unwrap();

    let report = run_mirror(create_test_config(&server, tmp.path()))
        .await
        .unwrap();

    assert_eq!(report.directories_scanned, 3);
    assert_eq!(report.verification.remote_total, 1);
    assert_eq!(report.counters.downloaded, 1);
}

#[tokio::test]
async fn test_listings_walked_depth_first_in_document_order() {
    let server = MockServer::start().await;
    mount_get(&server, "/repo/", listing(&["a/", "b/"])).await;
    mount_get(&server, "/repo/a/", listing(&["x/", "y/"])).await;
    mount_get(&server, "/repo/a/x/", listing(&[])).await;
    mount_get(&server, "/repo/a/y/", listing(&[])).await;
    mount_get(&server, "/repo/b/", listing(&[])).await;
    let tmp = TempDir::new().unwrap();

    let report = run_mirror(create_test_config(&server, tmp.path()))
        .await
        .unwrap();
    assert_eq!(report.directories_scanned, 5);

    let scanned: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| request.url.path().to_string())
        .collect();
    assert_eq!(
        scanned,
        vec!["/repo/", "/repo/a/", "/repo/a/x/", "/repo/a/y/", "/repo/b/"]
    );
}

#[tokio::test]
async fn test_delay_applied_before_each_subdirectory() {
    let server = MockServer::start().await;
    mount_get(&server, "/repo/", listing(&["a/", "b/"])).await;
    mount_get(&server, "/repo/a/", listing(&[])).await;
    mount_get(&server, "/repo/b/", listing(&[])).await;
    let tmp = TempDir::new().unwrap();

    let mut config = create_test_config(&server, tmp.path());
    config.crawler.delay = 0.15;

    let started = Instant::now();
    let report = run_mirror(config).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(report.directories_scanned, 3);
    // two descents, none before the base listing
    assert!(elapsed >= Duration::from_millis(300), "{:?}", elapsed);
}

/// Serves `/repo/` as a listing with one file and then truncates that file's
/// body: the headers promise far more bytes than are sent before the
/// connection is closed.
async fn start_truncating_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let head = String::from_utf8_lossy(&request);
                if head.starts_with("GET /repo/ ") {
                    let body = "<html><body><a href=\"big.bin\">big.bin</a></body></html>";
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                } else {
                    let head = "HTTP/1.1 200 OK\r\nContent-Length: 100000\r\nConnection: close\r\n\r\n";
                    let _ = socket.write_all(head.as_bytes()).await;
                    let _ = socket.write_all(&[1u8; 512]).await;
                    let _ = socket.flush().await;
                }
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_body_failure_mid_transfer_leaves_no_file() {
    let base = start_truncating_server().await;
    let tmp = TempDir::new().unwrap();

    let mut config = Config::default();
    config.mirror.base_url = format!("{}/repo/", base);
    config.mirror.output_dir = tmp.path().display().to_string();
    config.crawler.delay = 0.0;
    config.crawler.timeout = 5;
    config.crawler.workers = 2;
    config.crawler.idle_timeout_ms = 50;
    config.crawler.shutdown_timeout_ms = 1000;

    let report = run_mirror(config).await.unwrap();

    assert_eq!(report.counters.failed, 1);
    assert_eq!(report.counters.downloaded, 0);

    let target = local_path_for(
        tmp.path(),
        &Url::parse(&format!("{}/repo/big.bin", base)).unwrap(),
    );
    assert!(!target.exists());
    assert!(leftover_part_files(tmp.path()).is_empty());
    // the target directory was created for the temp file, but holds nothing
    assert!(collect_local_files(tmp.path()).is_empty());
}
