//! Downloading a calendar feed into its cache file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use sha2::{Digest, Sha256};
use url::Url;

use crate::error::{CalResult, CalendarizeError};
use crate::settings::Settings;

/// Length of the URL hash used in cache file names.
const SHORT_HASH_LEN: usize = 10;

/// A feed URL and the local file its content is cached in.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarFeed {
    pub url: Url,
    pub cache_path: PathBuf,
}

impl CalendarFeed {
    pub fn new(url: Url, cache_dir: &Path) -> Self {
        let cache_path = cache_path_for(cache_dir, url.as_str());
        CalendarFeed { url, cache_path }
    }
}

/// Parse a feed URL. Only absolute http(s) or webcal(s) URLs with a host
/// are accepted.
pub fn validate_url(raw: &str) -> CalResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| CalendarizeError::InvalidInput(format!("'{}' is not a valid URL: {}", raw, e)))?;

    if !url.has_host() {
        return Err(CalendarizeError::InvalidInput(format!(
            "'{}' is not a valid URL: missing host",
            raw
        )));
    }

    if !matches!(url.scheme(), "http" | "https" | "webcal" | "webcals") {
        return Err(CalendarizeError::InvalidInput(format!(
            "'{}' is not a valid URL: unsupported scheme '{}'",
            raw,
            url.scheme()
        )));
    }

    Ok(url)
}

/// The URL that is actually requested. webcal feeds are served over HTTPS.
pub fn download_url(url: &Url) -> CalResult<Url> {
    match url.scheme() {
        "webcal" | "webcals" => {
            // set_scheme cannot switch to a special scheme, so rebuild the URL
            let rest = &url.as_str()[url.scheme().len()..];
            Url::parse(&format!("https{}", rest)).map_err(|e| {
                CalendarizeError::InvalidInput(format!("'{}' is not a valid URL: {}", url, e))
            })
        }
        _ => Ok(url.clone()),
    }
}

/// `<cache_dir>/ical.<hash>.ical`. Repeated imports of one URL share the file.
pub fn cache_path_for(cache_dir: &Path, url: &str) -> PathBuf {
    cache_dir.join(format!("ical.{}.ical", short_hash(url)))
}

/// First ten hex digits of the SHA-256 of `input`.
pub fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = format!("{:x}", digest);
    hex.truncate(SHORT_HASH_LEN);
    hex
}

pub struct FeedFetcher {
    http: reqwest::Client,
    cache_dir: PathBuf,
}

impl FeedFetcher {
    pub fn new(cache_dir: PathBuf) -> CalResult<Self> {
        Self::with_client(cache_dir, reqwest::Client::builder())
    }

    pub fn from_settings(settings: &Settings) -> CalResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(settings.user_agent.clone());
        if let Some(secs) = settings.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Self::with_client(settings.cache_dir(), builder)
    }

    fn with_client(cache_dir: PathBuf, builder: reqwest::ClientBuilder) -> CalResult<Self> {
        let http = builder
            .build()
            .map_err(|e| CalendarizeError::Config(format!("Could not build HTTP client: {e}")))?;
        Ok(FeedFetcher { http, cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Download `url` and write the body to the feed's cache file.
    /// Nothing is retried; an existing cache file is overwritten.
    pub async fn fetch(&self, url: &str) -> CalResult<CalendarFeed> {
        let url = validate_url(url)?;
        let target = download_url(&url)?;
        let feed = CalendarFeed::new(url, &self.cache_dir);

        let response = self
            .http
            .get(target.clone())
            .send()
            .await
            .map_err(|e| CalendarizeError::FetchFailed(format!("{}: {}", target, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CalendarizeError::FetchFailed(format!(
                "{} responded with {}",
                target, status
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CalendarizeError::FetchFailed(format!("{}: {}", target, e)))?;

        tokio::fs::create_dir_all(&self.cache_dir).await.map_err(|e| {
            CalendarizeError::FetchFailed(format!(
                "Could not create {}: {}",
                self.cache_dir.display(),
                e
            ))
        })?;
        tokio::fs::write(&feed.cache_path, &body).await.map_err(|e| {
            CalendarizeError::FetchFailed(format!(
                "Could not write {}: {}",
                feed.cache_path.display(),
                e
            ))
        })?;

        log::debug!(
            "Cached {} bytes from {} at {}",
            body.len(),
            feed.url,
            feed.cache_path.display()
        );

        Ok(feed)
    }
}
