//! `assetgrab fetch` – download one known URL.

use anyhow::{Context, Result};
use assetgrab_core::config::GrabConfig;
use assetgrab_core::download::{DownloadResult, DownloadTask, Downloader};
use assetgrab_core::fetch::HttpFetcher;
use assetgrab_core::report::{Event, Reporter};
use assetgrab_core::resolve::resolve;
use assetgrab_core::transform;

use super::page_url;
use crate::cli::console::ConsoleReporter;
use crate::cli::progress_bar::ProgressBar;

pub async fn run_fetch(cfg: &GrabConfig, url: &str) -> Result<()> {
    let url = page_url(url)?;
    let resolution = resolve([url.as_str()], &url);
    let asset = match (resolution.assets.into_iter().next(), resolution.rejected.first()) {
        (Some(asset), _) => asset,
        (None, Some(r)) => anyhow::bail!("cannot download {}: {}", url, r.reason),
        (None, None) => anyhow::bail!("cannot download {}", url),
    };

    let downloader = Downloader::new(HttpFetcher::new(cfg.fetch_options()))
        .with_transform(transform::from_extension(cfg.extension.as_deref())?);
    let task = DownloadTask::new(asset, cfg.output_dir.clone());
    let reporter = ConsoleReporter;
    reporter.report(
        Event::info(format!("Starting download: {}", task.asset.url)).with_url(&task.asset.url),
    );

    let result = tokio::task::spawn_blocking(move || {
        let mut bar = ProgressBar::stderr();
        downloader.download(&task, &mut bar)
    })
    .await
    .context("download task join")?;

    match result {
        DownloadResult::Success(ok) => {
            reporter.info(&format!(
                "Successfully downloaded and saved: {}",
                ok.path.display()
            ));
            println!("{}", ok.path.display());
            Ok(())
        }
        DownloadResult::Failure(failure) => {
            reporter.error(&format!(
                "Failed to download {}: {}",
                failure.url, failure.error
            ));
            let context = format!("downloading {}", failure.url);
            Err(anyhow::Error::new(failure.error).context(context))
        }
    }
}
