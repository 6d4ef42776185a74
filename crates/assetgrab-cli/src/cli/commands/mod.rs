//! CLI command handlers, one per file.

mod discover;
mod fetch;
mod grab;

pub use discover::{run_discover, DEFAULT_MANIFEST};
pub use fetch::run_fetch;
pub use grab::run_grab;

use anyhow::{Context, Result};
use assetgrab_core::config::GrabConfig;
use assetgrab_core::error::parse_url;
use assetgrab_core::extract::AssetPattern;
use assetgrab_core::fetch::{HttpFetcher, SavedPage};
use assetgrab_core::pipeline::Pipeline;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

use super::console::ConsoleReporter;

/// Pipeline configured from `cfg`, reading the page from `page` when given.
fn build_pipeline(cfg: &GrabConfig, page: Option<PathBuf>) -> Pipeline {
    let mut pipeline = Pipeline::new(HttpFetcher::new(cfg.fetch_options()))
        .with_reporter(Arc::new(ConsoleReporter));
    if let Some(path) = page {
        tracing::debug!(page = %path.display(), "reading page from file");
        pipeline = pipeline.with_source(Box::new(SavedPage::new(path)));
    }
    pipeline
}

fn asset_pattern(cfg: &GrabConfig) -> Result<AssetPattern> {
    AssetPattern::new(&cfg.attribute, &cfg.pattern).context("invalid --attribute/--pattern")
}

fn page_url(url: &str) -> Result<Url> {
    parse_url(url).context("invalid page URL")
}
