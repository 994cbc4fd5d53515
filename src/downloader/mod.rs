mod error;
mod fetcher;

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use error::{DownloadError, ErrorKind};
pub use fetcher::UReqFetcher;

#[cfg(test)]
pub(crate) use fetcher::MockFetcher;

const COPY_BUFFER_SIZE: usize = 64 * 1024;

pub type Body = Box<dyn Read + Send>;

/// What a transport hands back for a single GET.
pub enum Response {
    Ok(Body),
    Status(u16),
    InvalidUrl(String),
    NetworkError(String),
}

impl Response {
    pub fn ok(body: impl Read + Send + 'static) -> Self {
        Self::Ok(Box::new(body))
    }

    pub fn status(code: u16) -> Self {
        Self::Status(code)
    }

    pub fn not_found() -> Self {
        Self::Status(404)
    }

    pub fn invalid_url(reason: impl Into<String>) -> Self {
        Self::InvalidUrl(reason.into())
    }

    pub fn network_error(reason: impl Into<String>) -> Self {
        Self::NetworkError(reason.into())
    }
}

pub trait FileDownloader {
    fn fetch(&self, url: &str) -> Response;
}

/// One remote resource and where it should land on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub source_url: String,
    pub destination_directory: PathBuf,
    pub filename: Option<String>,
}

impl FetchRequest {
    pub fn new(source_url: impl Into<String>, destination_directory: impl Into<PathBuf>) -> Self {
        Self {
            source_url: source_url.into(),
            destination_directory: destination_directory.into(),
            filename: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// The explicit filename, or the part of the url after its last `/`.
    /// `None` when that would be empty.
    pub fn file_name(&self) -> Option<&str> {
        let name = match self.filename.as_deref() {
            Some(name) => name,
            None => filename_from_url(&self.source_url),
        };

        (!name.is_empty()).then_some(name)
    }

    pub fn destination(&self) -> Option<PathBuf> {
        self.file_name()
            .map(|name| self.destination_directory.join(name))
    }
}

/// Everything after the final `/`, query string included.
pub fn filename_from_url(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Prints the console line for one attempt and returns whether it succeeded.
pub fn report(request: &FetchRequest, result: &Result<Download, DownloadError>) -> bool {
    match result {
        Ok(download) => {
            println!("Downloaded: {}", download.file.display());
            true
        }

        Err(err) => {
            tracing::debug!(url = %request.source_url, kind = ?err.kind(), "fetch failed");
            println!("Error downloading {}: {}", request.source_url, err);
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub source: String,
    pub file: PathBuf,
    pub bytes: u64,
}

impl Download {
    pub fn new(source: String, file: PathBuf, bytes: u64) -> Self {
        Self {
            source,
            file,
            bytes,
        }
    }
}

pub struct Downloader<T: FileDownloader> {
    fetcher: T,
}

impl<T> Downloader<T>
where
    T: FileDownloader,
{
    pub fn with_fetcher(fetcher: T) -> Self {
        Downloader { fetcher }
    }

    /// Makes a single attempt at `request`. The destination directory is
    /// created before the request goes out; the file itself only appears once
    /// the whole body has been written.
    pub fn fetch(&self, request: &FetchRequest) -> Result<Download, DownloadError> {
        let url = request.source_url.as_str();

        let file_name = request
            .file_name()
            .ok_or_else(|| DownloadError::MissingFilename {
                url: url.to_string(),
            })?;

        let directory = request.destination_directory.as_path();

        fs::create_dir_all(directory).map_err(|e| DownloadError::filesystem(directory, e))?;

        let file_path = directory.join(file_name);

        tracing::debug!(url, path = %file_path.display(), "requesting");

        let body = match self.fetcher.fetch(url) {
            Response::Ok(body) => body,

            Response::Status(code) => {
                return Err(DownloadError::Status {
                    url: url.to_string(),
                    code,
                })
            }

            Response::InvalidUrl(reason) => {
                return Err(DownloadError::InvalidUrl {
                    url: url.to_string(),
                    reason,
                })
            }

            Response::NetworkError(reason) => {
                return Err(DownloadError::Network {
                    url: url.to_string(),
                    reason,
                })
            }
        };

        let bytes = Self::store(url, body, directory, &file_path)?;

        tracing::debug!(url, path = %file_path.display(), bytes, "stored");

        Ok(Download::new(url.to_string(), file_path, bytes))
    }

    /// `fetch`, with the outcome printed instead of returned.
    pub fn fetch_and_report(&self, request: &FetchRequest) -> bool {
        report(request, &self.fetch(request))
    }

    pub fn fetcher(&self) -> &T {
        &self.fetcher
    }

    fn store(
        url: &str,
        mut body: Body,
        directory: &Path,
        file_path: &Path,
    ) -> Result<u64, DownloadError> {
        let mut staged = tempfile::Builder::new()
            .prefix(".fetch-")
            .suffix(".part")
            .tempfile_in(directory)
            .map_err(|e| DownloadError::filesystem(directory, e))?;

        let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
        let mut written = 0u64;

        loop {
            let read = match body.read(&mut buffer) {
                Ok(0) => break,
                Ok(read) => read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(DownloadError::Network {
                        url: url.to_string(),
                        reason: e.to_string(),
                    })
                }
            };

            staged
                .write_all(&buffer[..read])
                .map_err(|e| DownloadError::filesystem(staged.path(), e))?;

            written += read as u64;
        }

        // Dropping `staged` on any early return above removes the partial file.
        staged
            .persist(file_path)
            .map_err(|e| DownloadError::filesystem(file_path, e.error))?;

        Ok(written)
    }
}

impl Downloader<UReqFetcher> {
    pub fn new() -> Self {
        Downloader::with_fetcher(UReqFetcher::new())
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Downloader::with_fetcher(UReqFetcher::with_timeout(timeout))
    }
}

impl Default for Downloader<UReqFetcher> {
    fn default() -> Self {
        Self::new()
    }
}
