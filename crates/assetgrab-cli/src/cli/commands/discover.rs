//! `assetgrab discover` – record the current asset filenames without downloading.

use anyhow::{Context, Result};
use assetgrab_core::config::GrabConfig;
use assetgrab_core::manifest;
use assetgrab_core::report::Reporter;
use std::path::PathBuf;

use super::{asset_pattern, build_pipeline, page_url};
use crate::cli::console::ConsoleReporter;

/// Manifest written when neither the flag nor the config names one.
pub const DEFAULT_MANIFEST: &str = "./cgi";

pub async fn run_discover(
    cfg: &GrabConfig,
    url: &str,
    page: Option<PathBuf>,
    manifest_path: Option<PathBuf>,
) -> Result<()> {
    let base = page_url(url)?;
    let pattern = asset_pattern(cfg)?;
    let pipeline = build_pipeline(cfg, page);

    let discovery = tokio::task::spawn_blocking(move || pipeline.discover(&base, &pattern))
        .await
        .context("discover task join")??;

    let reporter = ConsoleReporter;
    if discovery.is_empty() {
        reporter.warning("No matching assets found.");
        println!("No filenames were saved");
        return Ok(());
    }

    let filenames = discovery.filenames();
    if let Some(path) = &manifest_path {
        let changed = manifest::has_changed(&filenames, path);
        manifest::save(&filenames, path)?;
        reporter.info(&format!(
            "Saved {} filenames to {} in resolution order.",
            filenames.len(),
            path.display()
        ));
        if changed {
            reporter.info("Asset list changed since the last run.");
        } else {
            reporter.info("Asset list unchanged since the last run.");
        }
    }

    for name in &filenames {
        println!("{name}");
    }
    Ok(())
}
