use std::collections::VecDeque;
use std::sync::Mutex;

use super::{FileDownloader, Response};

/// Hands out queued responses in order, then network errors once empty.
pub struct MockFetcher {
    responses: Mutex<VecDeque<Response>>,
    requested: Mutex<Vec<String>>,
}

impl FileDownloader for MockFetcher {
    fn fetch(&self, url: &str) -> Response {
        self.requested.lock().unwrap().push(url.to_string());

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Response::network_error("no more mocked responses"))
    }
}

impl MockFetcher {
    pub fn new(responses: Vec<Response>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}
