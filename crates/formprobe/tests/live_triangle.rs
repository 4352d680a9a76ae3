//! Live runs against the real puzzle page.
//!
//! Needs Chromium and network access:
//! `cargo test -p formprobe --features browser -- --ignored`

#![cfg(feature = "browser")]

use formprobe::{catalog, BrowserConfig, ChromiumDriver, ProbeConfig, Session, SuiteRunner};

fn browser_config() -> BrowserConfig {
    let config = BrowserConfig::default().with_no_sandbox();
    match std::env::var("CHROMIUM_PATH") {
        Ok(path) => config.with_chromium_path(path),
        Err(_) => config,
    }
}

#[tokio::test]
#[ignore = "requires chromium and network access"]
async fn test_live_catalog() {
    let driver = ChromiumDriver::launch(browser_config()).await.unwrap();
    let results = SuiteRunner::new(ProbeConfig::default())
        .run_scoped(Session::new(driver), &catalog())
        .await;

    for result in &results.results {
        eprintln!("{} {:?} {:?}", result.title(), result.status, result.error);
    }
    assert!(results.all_passed());
    assert!(results.teardown_error.is_none());
}

#[tokio::test]
#[ignore = "requires chromium and network access"]
async fn test_live_unreachable_page() {
    let driver = ChromiumDriver::launch(browser_config()).await.unwrap();
    let config = ProbeConfig::default().with_url("https://nonexistent.invalid/triangle");
    let results = SuiteRunner::new(config)
        .with_filter("TC-001")
        .run_scoped(Session::new(driver), &catalog())
        .await;

    let error = results.results[0].error.as_deref().unwrap_or_default();
    assert!(error.starts_with("Navigation to https://nonexistent.invalid/triangle failed"));
}
