//! CLI for assetgrab.

mod cancel;
mod commands;
mod console;
mod progress_bar;

use anyhow::Result;
use assetgrab_core::config::{self, GrabConfig};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_discover, run_fetch, run_grab};

/// Top-level CLI for assetgrab.
#[derive(Debug, Parser)]
#[command(name = "assetgrab")]
#[command(
    about = "Find build-hashed assets (e.g. index-<hash>.js) on a page and download them",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Which attribute values on the page count as asset references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct MatchArgs {
    /// Attribute to scan (default from config, normally `src`).
    #[arg(long, value_name = "NAME")]
    pub attribute: Option<String>,

    /// Regex the whole attribute value must match.
    #[arg(long, value_name = "REGEX")]
    pub pattern: Option<String>,

    /// Read the page from a saved HTML file instead of fetching the URL
    /// (the URL is still used to resolve relative references).
    #[arg(long, value_name = "FILE")]
    pub page: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct TransferArgs {
    /// Abort a request after this many seconds without progress.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Receive buffer size in bytes (1024..=524288).
    #[arg(long, value_name = "BYTES")]
    pub chunk_size: Option<usize>,

    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Discover matching assets on a page and download each one.
    Grab {
        /// Page to scan.
        url: String,

        #[command(flatten)]
        matching: MatchArgs,

        #[command(flatten)]
        transfer: TransferArgs,

        /// Directory for downloaded files (created if missing).
        #[arg(long, short = 'o', value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Also write the discovered filenames to this file, one per line.
        #[arg(long, value_name = "FILE")]
        manifest: Option<PathBuf>,

        /// Save files with this extension instead of the original one (e.g. `cgi`).
        #[arg(long, value_name = "EXT")]
        extension: Option<String>,

        /// Print the batch report as JSON on stdout.
        #[arg(long)]
        json: bool,
    },

    /// Discover matching assets and record their filenames without downloading.
    Discover {
        /// Page to scan.
        url: String,

        #[command(flatten)]
        matching: MatchArgs,

        #[command(flatten)]
        transfer: TransferArgs,

        /// Manifest to write (default: config value, else `./cgi`).
        #[arg(long, value_name = "FILE", conflicts_with = "no_manifest")]
        manifest: Option<PathBuf>,

        /// Only print the filenames.
        #[arg(long)]
        no_manifest: bool,
    },

    /// Download a single known URL with a progress bar.
    Fetch {
        /// Direct HTTP/HTTPS URL of the file.
        url: String,

        #[command(flatten)]
        transfer: TransferArgs,

        #[arg(long, short = 'o', value_name = "DIR")]
        output_dir: Option<PathBuf>,

        #[arg(long, value_name = "EXT")]
        extension: Option<String>,
    },
}

impl MatchArgs {
    fn apply(&self, cfg: &mut GrabConfig) {
        if let Some(a) = &self.attribute {
            cfg.attribute = a.clone();
        }
        if let Some(p) = &self.pattern {
            cfg.pattern = p.clone();
        }
    }
}

impl TransferArgs {
    fn apply(&self, cfg: &mut GrabConfig) {
        if let Some(t) = self.timeout {
            cfg.timeout_secs = t;
            cfg.connect_timeout_secs = t;
        }
        if let Some(c) = self.chunk_size {
            cfg.chunk_size = c;
        }
        if let Some(ua) = &self.user_agent {
            cfg.user_agent = Some(ua.clone());
        }
    }
}

fn override_opt<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        slot.clone_from(value);
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        cli.command.run(cfg).await
    }

    /// Applies command-line overrides on top of `cfg` and runs the command.
    pub async fn run(self, mut cfg: GrabConfig) -> Result<()> {
        match self {
            CliCommand::Grab {
                url,
                matching,
                transfer,
                output_dir,
                manifest,
                extension,
                json,
            } => {
                matching.apply(&mut cfg);
                transfer.apply(&mut cfg);
                if let Some(dir) = output_dir {
                    cfg.output_dir = dir;
                }
                override_opt(&mut cfg.manifest, &manifest);
                override_opt(&mut cfg.extension, &extension);
                run_grab(&cfg, &url, matching.page, json).await
            }
            CliCommand::Discover {
                url,
                matching,
                transfer,
                manifest,
                no_manifest,
            } => {
                matching.apply(&mut cfg);
                transfer.apply(&mut cfg);
                let manifest = if no_manifest {
                    None
                } else {
                    manifest
                        .or_else(|| cfg.manifest.clone())
                        .or_else(|| Some(PathBuf::from(commands::DEFAULT_MANIFEST)))
                };
                run_discover(&cfg, &url, matching.page, manifest).await
            }
            CliCommand::Fetch {
                url,
                transfer,
                output_dir,
                extension,
            } => {
                transfer.apply(&mut cfg);
                if let Some(dir) = output_dir {
                    cfg.output_dir = dir;
                }
                override_opt(&mut cfg.extension, &extension);
                run_fetch(&cfg, &url).await
            }
        }
    }
}

#[cfg(test)]
mod tests;
