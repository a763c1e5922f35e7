use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use boot_meta::preflight::check_host_tools;
use boot_meta::{auto_detect, build_manifest, ManifestRequest, Settings};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "boot-meta")]
#[command(version)]
#[command(about = "Print a JSON manifest describing kernels, initcpios, disk images and boot entries")]
struct Cli {
    /// Kernel image to describe (repeatable)
    #[arg(long = "kernel", value_name = "PATH")]
    kernels: Vec<PathBuf>,

    /// Initcpio/initrd archive to describe (repeatable)
    #[arg(long = "initcpio", value_name = "PATH")]
    initcpios: Vec<PathBuf>,

    /// Disk image to describe (repeatable)
    #[arg(long = "disk-image", value_name = "PATH")]
    disk_images: Vec<PathBuf>,

    /// systemd-boot loader.conf
    #[arg(long, value_name = "PATH")]
    boot_config: Option<PathBuf>,

    /// systemd-boot entry file (repeatable)
    #[arg(long = "boot-entry", value_name = "PATH")]
    boot_entries: Vec<PathBuf>,

    /// Package shrinkwrap file
    #[arg(long, value_name = "PATH")]
    shrinkwrap: Option<PathBuf>,

    /// Boot root to search for loader/loader.conf and loader/entries
    #[arg(long, value_name = "DIR")]
    auto_detect: Option<PathBuf>,

    /// Settings file (TOML)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Maximum number of files inspected at once
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Increase log verbosity on stderr (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; stdout carries only the manifest.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<String> {
    let Cli {
        kernels,
        initcpios,
        disk_images,
        boot_config,
        boot_entries,
        shrinkwrap,
        auto_detect: boot_root,
        config,
        concurrency,
        verbose: _,
    } = cli;

    let settings = Settings::load(config.as_deref())
        .context("loading settings")?
        .with_concurrency(concurrency)?;

    let mut request = ManifestRequest {
        kernels,
        initcpios,
        disk_images,
        boot_config,
        boot_entries,
        shrinkwrap,
    };

    if let Some(root) = boot_root {
        let detected = auto_detect(&root, settings.inspect.concurrency)
            .await
            .with_context(|| format!("auto-detecting boot entries under '{}'", root.display()))?;
        let Some(detected) = detected else {
            bail!("Failed to auto-detect boot entries");
        };
        request = request.with_detected(detected);
    }

    if !request.inspected_files().is_empty() {
        check_host_tools(&settings.inspect)?;
    }

    let manifest = build_manifest(request, &settings)
        .await
        .context("building manifest")?;
    serde_json::to_string_pretty(&manifest).context("serializing manifest")
}
