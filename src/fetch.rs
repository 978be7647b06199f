// src/fetch.rs
use crate::error::Error;
use chrono::{Datelike, Local};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Treasury publishes one yield curve XML feed per calendar year.
static FEED_BASE_URL: &str =
    "https://home.treasury.gov/resource-center/data-chart-center/interest-rates/pages/xml";

/// URL of the yield curve feed for a single year.
pub fn feed_url(year: i32) -> String {
    format!("{FEED_BASE_URL}?data=daily_treasury_yield_curve&field_tdr_date_value={year}")
}

/// Name of the on-disk copy of one year's feed; the converter looks these up
/// by the same convention.
pub fn feed_file_name(year: i32) -> String {
    format!("yieldcurverates_{year}.xml")
}

/// Outcome of a completed download run.
#[derive(Debug)]
pub struct DownloadSummary {
    /// One file per year in the requested range.
    pub files: usize,
}

/// Fetches the yearly feeds and persists them for the converter. Years are
/// fetched one at a time; the first failure aborts the whole run.
pub struct Downloader {
    client: Client,
    dest_dir: PathBuf,
}

impl Downloader {
    pub fn new(dest_dir: impl AsRef<Path>) -> Result<Self, Error> {
        let dest_dir = dest_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dest_dir).map_err(|source| Error::Construction {
            dir: dest_dir.clone(),
            source,
        })?;
        Ok(Self {
            client: Client::new(),
            dest_dir,
        })
    }

    /// Download every feed from `start_year` through the current calendar
    /// year, overwriting any file already present for a year.
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn download(&self, start_year: i32) -> Result<DownloadSummary, Error> {
        let end_year = Local::now().year();
        let mut files = 0;

        for year in start_year..=end_year {
            let url = feed_url(year);
            info!(year, "downloading yield curve feed");

            let resp = self
                .client
                .get(&url)
                .send()
                .await
                .and_then(|resp| resp.error_for_status())
                .map_err(|source| Error::Download {
                    year,
                    url: url.clone(),
                    source,
                })?;
            let body = resp
                .text()
                .await
                .map_err(|source| Error::Download { year, url, source })?;

            let dest_path = self.dest_dir.join(feed_file_name(year));
            fs::write(&dest_path, &body).await?;
            files += 1;
        }

        info!(files, "download complete");
        Ok(DownloadSummary { files })
    }
}
