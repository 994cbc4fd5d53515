use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::Mutex;
use std::thread;

use crate::downloader::{
    self, Download, DownloadError, Downloader, FetchRequest, FileDownloader,
};

/// Outcome of a single request within a batch.
#[derive(Debug)]
pub struct BatchEntry {
    pub request: FetchRequest,
    pub result: Result<Download, DownloadError>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&FetchRequest, &DownloadError)> {
        self.entries
            .iter()
            .filter_map(|e| e.result.as_ref().err().map(|err| (&e.request, err)))
    }

    pub fn extend(&mut self, other: BatchReport) {
        self.entries.extend(other.entries);
    }
}

pub struct BatchDriver<'a, T: FileDownloader> {
    downloader: &'a Downloader<T>,
    jobs: usize,
}

impl<'a, T> BatchDriver<'a, T>
where
    T: FileDownloader + Sync,
{
    pub fn new(downloader: &'a Downloader<T>) -> Self {
        Self { downloader, jobs: 1 }
    }

    /// Zero is treated as one.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn run(&self, requests: &[FetchRequest]) -> BatchReport {
        let results: Vec<Result<Download, DownloadError>> =
            if self.jobs == 1 || requests.len() <= 1 {
                requests.iter().map(|r| self.attempt(r)).collect()
            } else {
                self.run_pooled(requests)
            };

        let report = BatchReport {
            entries: requests
                .iter()
                .cloned()
                .zip(results)
                .map(|(request, result)| BatchEntry { request, result })
                .collect(),
        };

        tracing::info!(
            total = report.entries.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            "batch finished"
        );

        report
    }

    fn run_pooled(&self, requests: &[FetchRequest]) -> Vec<Result<Download, DownloadError>> {
        let work: Mutex<VecDeque<(usize, &FetchRequest)>> =
            Mutex::new(requests.iter().enumerate().collect());
        let num_workers = self.jobs.min(requests.len());
        let (tx, rx) = mpsc::channel();

        tracing::debug!(workers = num_workers, requests = requests.len(), "starting pool");

        thread::scope(|scope| {
            for _ in 0..num_workers {
                let tx = tx.clone();
                let work = &work;

                scope.spawn(move || loop {
                    let next = match work.lock() {
                        Ok(mut queue) => queue.pop_front(),
                        Err(_) => None,
                    };

                    let Some((index, request)) = next else {
                        break;
                    };

                    if tx.send((index, self.attempt(request))).is_err() {
                        break;
                    }
                });
            }
        });

        drop(tx);

        let mut slots: Vec<Option<Result<Download, DownloadError>>> =
            requests.iter().map(|_| None).collect();

        for (index, result) in rx {
            slots[index] = Some(result);
        }

        slots
            .into_iter()
            .zip(requests)
            .map(|(slot, request)| {
                slot.unwrap_or_else(|| {
                    Err(DownloadError::Network {
                        url: request.source_url.clone(),
                        reason: "worker stopped before attempting the request".to_string(),
                    })
                })
            })
            .collect()
    }

    fn attempt(&self, request: &FetchRequest) -> Result<Download, DownloadError> {
        let result = self.downloader.fetch(request);
        downloader::report(request, &result);
        result
    }
}
