use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use yieldscraper::{convert::Converter, fetch::Downloader};

/// Download U.S. Treasury yield curve rate feeds and convert them to a
/// single sorted CSV.
#[derive(Parser)]
#[command(name = "yieldscraper")]
struct Cli {
    /// First calendar year to process (treasury publishes data from 1990).
    #[arg(long, default_value_t = 1990)]
    start_year: i32,

    /// Directory the yearly XML feeds are downloaded into.
    /// Defaults to a fresh temporary directory.
    #[arg(long)]
    download_dir: Option<PathBuf>,

    /// Output root; the CSV is written under alternative/ustreasury/.
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() {
    // ─── init logging ────────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        error!("{err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // ─── configure dirs ──────────────────────────────────────────────
    let mut _scratch = None;
    let download_dir = match cli.download_dir {
        Some(dir) => dir,
        None => {
            let dir = tempfile::tempdir().context("creating scratch download directory")?;
            let path = dir.path().to_path_buf();
            // keep the tempdir alive until the converter has read from it
            _scratch = Some(dir);
            path
        }
    };
    let dest_dir = cli.output_dir.join("alternative").join("ustreasury");

    // ─── download, then convert ──────────────────────────────────────
    let downloader =
        Downloader::new(&download_dir).context("the downloader failed to be constructed")?;
    let downloaded = downloader
        .download(cli.start_year)
        .await
        .context("the downloader exited unexpectedly")?;
    info!(files = downloaded.files, "downloaded yearly feeds");

    let converter =
        Converter::new(&download_dir, &dest_dir).context("the converter failed to be constructed")?;
    let converted = converter
        .convert(cli.start_year)
        .context("the converter exited unexpectedly")?;
    info!(
        years = converted.years,
        rows = converted.rows,
        path = %converted.path.display(),
        "completed download and conversion of yield curve data"
    );

    Ok(())
}
