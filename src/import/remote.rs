use std::time::Duration;

use tracing::{debug, warn};

use super::ImportSource;
use super::delimited::{self, RowFilter};
use crate::error::{Error, Result};
use crate::models::Application;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Blocking HTTP GET. Non-2xx responses are returned, not raised; `Err` means
/// no response was received at all.
pub trait HttpClient {
    fn get(&self, url: &str) -> Result<HttpResponse>;
}

pub struct ReqwestHttpClient {
    client: reqwest::blocking::Client,
}

impl ReqwestHttpClient {
    /// `timeout` of `None` waits indefinitely.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestHttpClient {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::Transport(e.to_string()))?;
        let status_code = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(HttpResponse { status_code, body })
    }
}

/// Imports applications from a CSV document served over HTTP, such as a
/// spreadsheet published as CSV.
///
/// Every failure to obtain a usable document (transport error, non-2xx
/// status, empty body) yields an empty list.
pub struct RemoteCsvImportSource<C: HttpClient> {
    client: C,
    url: String,
    delimiter: char,
    filter: RowFilter,
}

impl<C: HttpClient> RemoteCsvImportSource<C> {
    pub fn new(client: C, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            delimiter: ',',
            // Stricter than the local file source: both company and position.
            filter: RowFilter::RequireBoth,
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_row_filter(mut self, filter: RowFilter) -> Self {
        self.filter = filter;
        self
    }
}

impl<C: HttpClient> ImportSource for RemoteCsvImportSource<C> {
    fn fetch_applications(&mut self) -> Result<Vec<Application>> {
        let response = match self.client.get(&self.url) {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %self.url, error = %e, "remote CSV fetch failed");
                return Ok(Vec::new());
            }
        };

        if !response.is_success() {
            warn!(url = %self.url, status = response.status_code, "remote CSV returned non-success status");
            return Ok(Vec::new());
        }
        if response.body.is_empty() {
            warn!(url = %self.url, "remote CSV body is empty");
            return Ok(Vec::new());
        }

        let apps = delimited::parse(&response.body, self.delimiter, self.filter)?;
        debug!(url = %self.url, rows = apps.len(), "parsed remote CSV");
        Ok(apps)
    }
}
