pub mod batch;
pub mod config;
pub mod downloader;
pub mod logging;

pub use batch::{BatchDriver, BatchReport};
pub use config::Manifest;
pub use downloader::{
    Download, DownloadError, Downloader, ErrorKind, FetchRequest, FileDownloader, Response,
    UReqFetcher,
};
