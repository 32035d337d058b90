//! HTTP retrieval. Sources talk to a `Downloader` so that tests can serve
//! bytes without touching the network.

use std::io::Read;

use log::info;

use crate::error::FetchError;

pub trait Downloader {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

#[derive(Debug)]
pub struct HttpDownloader {
    client: reqwest::blocking::Client,
}

impl HttpDownloader {
    /// With `insecure`, TLS certificates are not verified.
    pub fn new(insecure: bool) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .danger_accept_invalid_certs(insecure)
            .build()
            .map_err(|error| FetchError::HttpError {
                url: String::new(),
                error,
            })?;
        Ok(HttpDownloader { client })
    }
}

impl Downloader for HttpDownloader {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let http_error = |error| FetchError::HttpError {
            url: url.to_string(),
            error,
        };
        info!("Fetching {}", url);
        let mut response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(http_error)?;
        let mut data = Vec::new();
        response
            .read_to_end(&mut data)
            .map_err(|e| FetchError::IOError(url.into(), e))?;
        Ok(data)
    }
}
