use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the downloader and converter. Every variant is fatal:
/// nothing in the pipeline retries, the caller logs and exits non-zero.
#[derive(Error, Debug)]
pub enum Error {
    /// An expected yearly XML file is absent from the source directory.
    #[error("failed to find yield curve rates file: {path}")]
    MissingInputFile { path: PathBuf },

    /// A feed file exists but does not parse into a usable document.
    #[error("invalid yield curve feed for {year}: {reason}")]
    InvalidFeedData { year: i32, reason: String },

    /// Network failure or non-success response while fetching a year's feed.
    #[error("download of {year} feed from {url} failed: {source}")]
    Download {
        year: i32,
        url: String,
        source: reqwest::Error,
    },

    /// The downloader or converter could not set up its directories.
    #[error("failed to create directory {dir}: {source}")]
    Construction {
        dir: PathBuf,
        source: std::io::Error,
    },

    /// XML reader error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
