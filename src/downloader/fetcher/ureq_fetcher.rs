use std::error::Error;
use std::time::Duration;

use ureq::{Agent, AgentBuilder, ErrorKind, Transport};

use super::{FileDownloader, Response};

const USER_AGENT: &str = concat!("placeholder-fetcher/", env!("CARGO_PKG_VERSION"));

pub struct UReqFetcher {
    agent: Agent,
}

impl FileDownloader for UReqFetcher {
    fn fetch(&self, url: &str) -> Response {
        let response = self.agent.get(url).call();

        match response {
            Ok(response) if (200..300).contains(&response.status()) => {
                Response::ok(response.into_reader())
            }

            // ureq hands back 1xx/3xx it did not follow as Ok.
            Ok(response) => Response::status(response.status()),

            Err(ureq::Error::Status(code, _)) => Response::status(code),

            Err(ureq::Error::Transport(transport)) => match transport.kind() {
                ErrorKind::InvalidUrl | ErrorKind::UnknownScheme => {
                    Response::invalid_url(describe(&transport))
                }
                _ => Response::network_error(describe(&transport)),
            },
        }
    }
}

/// The transport failure without the url, which the caller already prints.
fn describe(transport: &Transport) -> String {
    let mut reason = transport.kind().to_string();

    if let Some(message) = transport.message() {
        reason.push_str(": ");
        reason.push_str(message);
    }

    if let Some(source) = transport.source() {
        reason.push_str(": ");
        reason.push_str(&source.to_string());
    }

    reason
}

impl UReqFetcher {
    pub fn new() -> Self {
        Self::with_timeout(None)
    }

    /// `None` keeps ureq's own defaults.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        let builder = AgentBuilder::new().user_agent(USER_AGENT);

        let builder = match timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };

        UReqFetcher {
            agent: builder.build(),
        }
    }
}

impl Default for UReqFetcher {
    fn default() -> Self {
        Self::new()
    }
}
