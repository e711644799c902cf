//! Single HTTP exchange with size-capped body accumulation.

use crate::buffer::ResponseBuffer;
use crate::error::{BoxError, Error, TransportOutcome};
use crate::Result;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::io::{self, Read};
use tracing::{debug, error, info, warn};

/// Bytes pulled off the socket per read.
const READ_CHUNK_SIZE: usize = 2048;

/// Bodies shorter than this are echoed at debug level.
const LOG_BODY_LIMIT: usize = 1024;

/// Status and body of a completed exchange.
#[derive(Debug)]
pub(crate) struct Exchange {
    pub(crate) status: StatusCode,
    pub(crate) body: ResponseBuffer,
}

impl Exchange {
    pub(crate) fn outcome(&self) -> TransportOutcome {
        TransportOutcome::Completed(self.status)
    }
}

/// Issues requests against a fixed base URL with fixed headers.
#[derive(Debug)]
pub(crate) struct HttpTransport {
    pub(crate) http: reqwest::blocking::Client,
    pub(crate) headers: HeaderMap,
    pub(crate) base_url: String,
    pub(crate) max_response_size: usize,
    pub(crate) logging: bool,
}

impl HttpTransport {
    /// Perform one request and buffer the response body.
    ///
    /// `path` is appended to the base URL as-is.
    pub(crate) fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Exchange> {
        let url = format!("{}{}", self.base_url, path);
        if self.logging {
            info!(%method, %url, "sending request");
        }

        let mut request = self
            .http
            .request(method.clone(), &url)
            .headers(self.headers.clone());

        if let Some(body) = body {
            let payload = serde_json::to_string(body)?;
            if self.logging {
                debug!(body = %payload, "request body");
            }
            request = request.body(payload);
        }

        let mut response = request.send().map_err(|err| {
            let timed_out = err.is_timeout();
            error!(%method, %url, error = %err, "HTTP request failed");
            Error::from_transport(err.into(), timed_out)
        })?;

        let status = response.status();
        let mut body = ResponseBuffer::with_limit(self.max_response_size)?;
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            let read = match response.read(&mut chunk) {
                Ok(0) => break,
                Ok(read) => read,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    let timed_out = is_timeout(&err);
                    error!(%method, %url, error = %err, "failed reading response body");
                    return Err(Error::from_transport(BoxError::from(err), timed_out));
                }
            };
            body.append(&chunk[..read])?;
            if body.is_truncated() {
                warn!(
                    %url,
                    limit = body.limit(),
                    "response too large, dropping remaining data"
                );
                break;
            }
        }

        if self.logging {
            info!(status = status.as_u16(), size = body.len(), "response received");
            if !body.is_empty() && body.len() < LOG_BODY_LIMIT {
                debug!(body = %String::from_utf8_lossy(body.as_bytes()), "response body");
            }
        }

        Ok(Exchange { status, body })
    }
}

fn is_timeout(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::TimedOut
        || err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<reqwest::Error>())
            .is_some_and(reqwest::Error::is_timeout)
}
