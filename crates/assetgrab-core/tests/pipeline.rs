//! End-to-end batches against a local server.

mod common;

use assetgrab_core::control::CancelToken;
use assetgrab_core::error::ErrorKind;
use assetgrab_core::extract::AssetPattern;
use assetgrab_core::fetch::{FetchOptions, HttpFetcher};
use assetgrab_core::manifest;
use assetgrab_core::pipeline::{BatchResult, ManifestOutcome, Pipeline};
use assetgrab_core::report::{Level, RecordingReporter};
use assetgrab_core::resolve::RejectReason;
use assetgrab_core::transform::ExtensionRemap;
use common::asset_server::{self, body_of, Route};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use url::Url;

const PAGE: &str = r#"<!doctype html>
<html>
  <head>
    <script type="module" src="/static/index-z9.js"></script>
    <link rel="modulepreload" href="/static/index-preload.js">
    <script src="/static/index-ab12.js"></script>
    <script>var src = "/static/index-inline.js";</script>
  </head>
  <body><img src="/static/logo.png"></body>
</html>"#;

fn fetcher() -> HttpFetcher {
    HttpFetcher::new(FetchOptions {
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(5),
        ..FetchOptions::default()
    })
}

fn page_url(base: &str) -> Url {
    Url::parse(base).unwrap().join("app/").unwrap()
}

#[test]
fn two_assets_end_to_end() {
    let ab12 = body_of(10_000);
    let z9 = body_of(777);
    let base = asset_server::start(vec![
        ("/app/", Route::Body(PAGE.as_bytes().to_vec())),
        ("/static/index-ab12.js", Route::Body(ab12.clone())),
        ("/static/index-z9.js", Route::Unsized(z9.clone())),
    ]);
    let dir = tempdir().unwrap();
    let out = dir.path().join("assets");
    let manifest_path = dir.path().join("cgi");
    let reporter = Arc::new(RecordingReporter::new());

    let mut pipeline = Pipeline::new(fetcher())
        .with_reporter(reporter.clone())
        .with_manifest(&manifest_path);
    let result = pipeline
        .run(&page_url(&base), &out, &AssetPattern::default())
        .unwrap();

    let report = result.report().expect("completed");
    assert_eq!(report.discovered, ["index-ab12.js", "index-z9.js"]);
    assert_eq!(report.attempted(), 2);
    assert_eq!(report.succeeded.len(), 2);
    assert!(report.failed.is_empty());
    assert!(report.is_clean());
    assert_eq!(report.succeeded[0].path, out.join("index-ab12.js"));

    assert_eq!(std::fs::read(out.join("index-ab12.js")).unwrap(), ab12);
    assert_eq!(std::fs::read(out.join("index-z9.js")).unwrap(), z9);
    let mut files: Vec<_> = std::fs::read_dir(&out)
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    assert_eq!(files, ["index-ab12.js", "index-z9.js"]);

    assert_eq!(
        std::fs::read_to_string(&manifest_path).unwrap(),
        "index-ab12.js\nindex-z9.js\n"
    );
    assert_eq!(
        report.manifest,
        ManifestOutcome::Saved {
            path: manifest_path.clone(),
            count: 2
        }
    );

    let info = reporter.messages(Level::Info);
    let starts: Vec<_> = info
        .iter()
        .filter(|m| m.starts_with("Starting download: "))
        .collect();
    assert_eq!(starts.len(), 2);
    assert!(starts[0].ends_with("/static/index-ab12.js"));
    assert!(starts[1].ends_with("/static/index-z9.js"));
    assert!(reporter.messages(Level::Error).is_empty());
}

#[test]
fn one_failure_does_not_abort_siblings() {
    let good = body_of(2048);
    let page = r#"<script src="/static/index-missing.js"></script>
                  <script src="/static/index-ok.js"></script>"#;
    let base = asset_server::start(vec![
        ("/app/", Route::Body(page.as_bytes().to_vec())),
        ("/static/index-ok.js", Route::Body(good.clone())),
    ]);
    let dir = tempdir().unwrap();
    let reporter = Arc::new(RecordingReporter::new());

    let mut pipeline = Pipeline::new(fetcher()).with_reporter(reporter.clone());
    let result = pipeline
        .run(&page_url(&base), dir.path(), &AssetPattern::default())
        .unwrap();
    let report = result.report().unwrap();

    // Longer reference first: the 404 is attempted before the good one.
    assert_eq!(report.discovered, ["index-missing.js", "index-ok.js"]);
    assert_eq!(report.attempted(), 2);
    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].kind(), ErrorKind::HttpStatus);
    assert!(report.failed[0].url.as_str().ends_with("/static/index-missing.js"));
    assert!(!report.is_clean());

    assert_eq!(std::fs::read(dir.path().join("index-ok.js")).unwrap(), good);
    assert!(!dir.path().join("index-missing.js").exists());

    let errors = reporter.messages(Level::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Failed to download "));

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["outcome"], "completed");
    assert_eq!(json["report"]["failed"][0]["kind"], "http_status");
}

#[test]
fn page_without_matches_reports_nothing_found() {
    let base = asset_server::start(vec![(
        "/app/",
        Route::Body(b"<html><script src=\"/static/app.js\"></script></html>".to_vec()),
    )]);
    let dir = tempdir().unwrap();
    let mut pipeline = Pipeline::new(fetcher());
    let result = pipeline
        .run(&page_url(&base), dir.path(), &AssetPattern::default())
        .unwrap();
    assert!(matches!(result, BatchResult::NothingFound));
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[test]
fn base_page_error_fails_the_batch() {
    let base = asset_server::start(vec![("/app/", Route::Status(500))]);
    let dir = tempdir().unwrap();
    let mut pipeline = Pipeline::new(fetcher());
    let err = pipeline
        .run(&page_url(&base), dir.path(), &AssetPattern::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::HttpStatus);
}

#[test]
fn custom_pattern_and_extension_remap() {
    let body = body_of(1234);
    let page = r#"<img data-src="/img/photo-01.jpg"><img src="/img/photo-02.jpg">"#;
    let base = asset_server::start(vec![
        ("/app/", Route::Body(page.as_bytes().to_vec())),
        ("/img/photo-01.jpg", Route::Body(body.clone())),
    ]);
    let dir = tempdir().unwrap();
    let pattern = AssetPattern::new("data-src", r"/img/photo-\d+\.jpg").unwrap();

    let mut pipeline = Pipeline::new(fetcher())
        .with_transform(Box::new(ExtensionRemap::new("bin").unwrap()));
    let result = pipeline.run(&page_url(&base), dir.path(), &pattern).unwrap();
    let report = result.report().unwrap();
    assert_eq!(report.discovered, ["photo-01.jpg"]);
    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(std::fs::read(dir.path().join("photo-01.bin")).unwrap(), body);
}

#[test]
fn remap_never_lets_two_assets_share_a_file() {
    let js = body_of(900);
    let mjs = body_of(1300);
    let page = r#"<script src="/a/index.js"></script><script src="/b/index.mjs"></script>"#;
    let base = asset_server::start(vec![
        ("/app/", Route::Body(page.as_bytes().to_vec())),
        ("/a/index.js", Route::Body(js)),
        ("/b/index.mjs", Route::Body(mjs.clone())),
    ]);
    let dir = tempdir().unwrap();
    let reporter = Arc::new(RecordingReporter::new());
    let pattern = AssetPattern::new("src", "/.*?/index.*").unwrap();

    let mut pipeline = Pipeline::new(fetcher())
        .with_reporter(reporter.clone())
        .with_transform(Box::new(ExtensionRemap::new("cgi").unwrap()));
    let result = pipeline.run(&page_url(&base), dir.path(), &pattern).unwrap();
    let report = result.report().unwrap();

    // The longer reference claims index.cgi; the other one is rejected, not overwritten.
    assert_eq!(report.discovered, ["index.mjs"]);
    assert_eq!(report.succeeded.len(), 1);
    assert!(report.failed.is_empty());
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].raw, "/a/index.js");
    assert_eq!(report.rejected[0].reason, RejectReason::DuplicateFilename);

    assert_eq!(std::fs::read(dir.path().join("index.cgi")).unwrap(), mjs);
    let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().flatten().collect();
    assert_eq!(files.len(), 1);
    assert!(reporter
        .messages(Level::Warning)
        .iter()
        .any(|m| m.contains("/a/index.js")));
}

#[test]
fn cancelled_run_attempts_nothing_but_saves_manifest() {
    let base = asset_server::start(vec![("/app/", Route::Body(PAGE.as_bytes().to_vec()))]);
    let dir = tempdir().unwrap();
    let manifest_path = dir.path().join("cgi");
    let cancel = CancelToken::new();
    cancel.cancel();

    let mut pipeline = Pipeline::new(fetcher())
        .with_cancel_token(cancel)
        .with_manifest(&manifest_path);
    let result = pipeline
        .run(&page_url(&base), &dir.path().join("out"), &AssetPattern::default())
        .unwrap();
    let report = result.report().unwrap();
    assert!(report.cancelled);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.attempted(), 0);
    assert!(!dir.path().join("out").exists());
    assert_eq!(
        manifest::load(&manifest_path).unwrap(),
        ["index-ab12.js", "index-z9.js"]
    );
}

#[test]
fn discover_only_touches_nothing() {
    let base = asset_server::start(vec![("/app/", Route::Body(PAGE.as_bytes().to_vec()))]);
    let pipeline = Pipeline::new(fetcher());
    let discovery = pipeline
        .discover(&page_url(&base), &AssetPattern::default())
        .unwrap();
    assert_eq!(discovery.matched, 2);
    assert_eq!(discovery.filenames(), ["index-ab12.js", "index-z9.js"]);
    let urls: Vec<_> = discovery
        .resolution
        .assets
        .iter()
        .map(|a| a.url.path().to_string())
        .collect();
    assert_eq!(urls, ["/static/index-ab12.js", "/static/index-z9.js"]);
}
