//! Installer artifact download.
//!
//! Streams the installer payload over HTTPS into a uniquely named
//! temporary file so large artifacts never sit in memory. A non-success
//! response aborts the download and no partial file is left behind.

use std::io;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use tempfile::TempPath;

use crate::error::{OutfitterError, Result};

/// Default deadline for a whole artifact download. Installer payloads can
/// be large on slow links.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// A downloaded installer artifact.
///
/// Owns its temporary file: the file is removed when the artifact is
/// dropped, on every exit path of an attempt.
#[derive(Debug)]
pub struct DownloadArtifact {
    path: TempPath,
    len: u64,
    url: String,
}

impl DownloadArtifact {
    /// Path of the artifact on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The URL the artifact was retrieved from.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Downloads installer artifacts over HTTPS.
pub struct Downloader {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl Downloader {
    /// Create a downloader with the default timeout.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a downloader with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::blocking::Client::builder()
                .user_agent("outfitter")
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            timeout,
        }
    }

    /// Get the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Stream `url` into a uniquely named temporary file inside `dest_dir`.
    ///
    /// The returned artifact is flushed and closed for writing. Any
    /// non-success status aborts with `Download { status }`.
    pub fn download(&self, url: &str, dest_dir: &Path) -> Result<DownloadArtifact> {
        tracing::debug!("Downloading {} into {}", url, dest_dir.display());

        let mut response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(OutfitterError::Download {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Write failures drop the temp file, which removes the partial
        // file from dest_dir.
        let mut file = tempfile::Builder::new()
            .prefix("outfitter-")
            .suffix(&artifact_suffix(url))
            .tempfile_in(dest_dir)?;
        let len = io::copy(&mut response, file.as_file_mut())?;
        file.as_file_mut().flush()?;

        // Close the write handle; the path keeps its delete-on-drop guard
        // so the installer can open the file exclusively.
        Ok(DownloadArtifact {
            path: file.into_temp_path(),
            len,
            url: url.to_string(),
        })
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}

/// File extension of the artifact named by the URL, including the dot.
///
/// Installers on some platforms dispatch on extension, so the temp file
/// keeps the one the server published.
fn artifact_suffix(url: &str) -> String {
    url.rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| format!(".{ext}"))
        .unwrap_or_default()
}
