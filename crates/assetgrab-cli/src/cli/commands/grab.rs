//! `assetgrab grab` – discover assets on a page and download them all.

use anyhow::Result;
use assetgrab_core::config::GrabConfig;
use assetgrab_core::control::CancelToken;
use assetgrab_core::pipeline::{BatchResult, ManifestOutcome};
use assetgrab_core::transform;
use std::path::PathBuf;

use super::{asset_pattern, build_pipeline, page_url};
use crate::cli::cancel::run_blocking_cancellable;
use crate::cli::progress_bar::ProgressBar;

pub async fn run_grab(
    cfg: &GrabConfig,
    url: &str,
    page: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let base = page_url(url)?;
    let pattern = asset_pattern(cfg)?;
    let cancel = CancelToken::new();

    let mut pipeline = build_pipeline(cfg, page)
        .with_transform(transform::from_extension(cfg.extension.as_deref())?)
        .with_cancel_token(cancel.clone());
    if !json {
        pipeline = pipeline.with_progress(Box::new(ProgressBar::stderr()));
    }
    if let Some(path) = &cfg.manifest {
        pipeline = pipeline.with_manifest(path);
    }

    let output_dir = cfg.output_dir.clone();
    let result = run_blocking_cancellable(cancel, move || {
        pipeline.run(&base, &output_dir, &pattern)
    })
    .await??;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    let report = match &result {
        BatchResult::NothingFound => return Ok(()),
        BatchResult::Completed(report) => report,
    };

    if !json {
        println!("{}", report.summary());
        for f in &report.failed {
            println!("  failed  {} ({}): {}", f.url, f.kind(), f.error);
        }
    }

    if !report.failed.is_empty() {
        anyhow::bail!(
            "{} of {} downloads failed",
            report.failed.len(),
            report.attempted()
        );
    }
    if let ManifestOutcome::Failed { path, error } = &report.manifest {
        anyhow::bail!("could not save manifest {}: {}", path.display(), error);
    }
    if report.cancelled {
        anyhow::bail!("cancelled with {} downloads not attempted", report.skipped);
    }
    Ok(())
}
