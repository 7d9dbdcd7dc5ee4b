#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Source acquisition for cellar
//!
//! Transport and archive handling live in caller-supplied `DownloadStrategy`
//! implementations. This crate coordinates them: it binds a strategy to the
//! package's active source, retries transport failures against the declared
//! mirrors and verifies the result. It also provides the batched downloader
//! used for patches.

mod batch;
mod fetch;
mod strategy;

pub use batch::{BatchDownloader, CurlBatchDownloader, DownloadRequest};
pub use fetch::{FetchAttempt, FetchCoordinator, Fetched};
pub use strategy::{DownloadStrategy, FetchedArtifact, StrategyFactory};
