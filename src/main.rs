use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use placeholder_fetcher::config::{Manifest, DEFAULT_BASE_DIR};
use placeholder_fetcher::{logging, BatchDriver, BatchReport, Downloader};

/// Download placeholder images into a site's image folders.
#[derive(Debug, Parser)]
#[command(name = "placeholder-fetcher")]
#[command(about = "Download placeholder images into a site's image folders", long_about = None)]
struct Cli {
    /// TOML manifest listing the images to fetch. Defaults to the built-in portfolio set.
    #[arg(long, value_name = "PATH")]
    manifest: Option<PathBuf>,

    /// Base directory for downloads (overrides the manifest).
    #[arg(long, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Fetch up to N images at once (default 1, sequential).
    #[arg(long, value_name = "N")]
    jobs: Option<usize>,

    /// Per-request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Print the effective manifest as TOML and exit.
    #[arg(long)]
    dump_manifest: bool,

    /// Debug-level logging on stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    logging::init_logging(cli.verbose);

    if let Err(err) = run(&cli) {
        eprintln!("placeholder-fetcher error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let manifest = load_manifest(cli)?;

    if cli.dump_manifest {
        print!("{}", manifest.to_toml()?);
        return Ok(());
    }

    let groups = manifest.requests_by_group();
    let total: usize = groups.iter().map(|(_, requests)| requests.len()).sum();

    println!("Starting download of {} images...", total);

    for directory in manifest.directories() {
        if let Err(err) = fs::create_dir_all(&directory) {
            tracing::warn!(directory = %directory.display(), error = %err, "could not create directory");
        }
    }

    let downloader = Downloader::with_timeout(manifest.timeout_secs.map(Duration::from_secs));
    let driver = BatchDriver::new(&downloader).jobs(manifest.jobs);

    let mut report = BatchReport::default();

    for (index, (title, requests)) in groups.iter().enumerate() {
        if index > 0 {
            println!();
        }
        println!("Downloading {}...", title);

        report.extend(driver.run(requests));
    }

    if !manifest.notes.is_empty() {
        println!();
        for note in &manifest.notes {
            println!("{}", note);
        }
    }

    println!(
        "\nDownload complete! {} succeeded, {} failed. Check your '{}' folder.",
        report.succeeded(),
        report.failed(),
        manifest.base_dir.display()
    );

    Ok(())
}

fn load_manifest(cli: &Cli) -> Result<Manifest> {
    let mut manifest = match &cli.manifest {
        Some(path) => {
            let mut manifest = Manifest::from_file(path)
                .with_context(|| format!("loading manifest {}", path.display()))?;
            if let Some(base_dir) = &cli.base_dir {
                manifest.base_dir = base_dir.clone();
            }
            manifest
        }
        None => Manifest::portfolio(
            cli.base_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BASE_DIR)),
        ),
    };

    if let Some(jobs) = cli.jobs {
        manifest.jobs = jobs;
    }

    if cli.timeout.is_some() {
        manifest.timeout_secs = cli.timeout;
    }

    manifest.validate()?;

    tracing::debug!("effective manifest: {:?}", manifest);

    Ok(manifest)
}
