//! Downloads the U.S. Treasury's yearly yield curve rate feeds and converts
//! them into a single date-sorted CSV of daily rates across twelve
//! maturities (1-month through 30-year), ready for research pipelines.

pub mod convert;
pub mod error;
pub mod feed;
pub mod fetch;

pub use error::Error;
