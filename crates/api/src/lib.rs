//! HTTP client for the PeerPass relay.
//!
//! The relay exposes two endpoints: `POST /upload` takes a multipart body
//! and answers with the invite code for the stored file, and
//! `GET /download/{code}` serves the file, honoring byte-range requests
//! when it can. This crate owns every request the transfer client makes;
//! retry, ordering, and session state live in `peerpass-client`.

mod error;
mod fetch;
mod headers;
mod probe;
mod upload;

pub use error::{FetchError, HeaderError, ProbeError, UploadError};
pub use probe::ProbeOutcome;
pub use upload::UploadProgressFn;

use std::time::Duration;

use peerpass_protocol::InviteCode;

/// Timeout applied to probe requests. Chunk fetches and uploads run
/// unbounded; their failure handling lives with the caller.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Filename used when the relay names no attachment.
pub const DEFAULT_FILENAME: &str = "downloaded-file";

/// Client for one relay server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for the relay at `base_url` (scheme and authority;
    /// trailing slashes are stripped).
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// The relay base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn download_url(&self, code: InviteCode) -> String {
        format!("{}/download/{}", self.base_url, code)
    }

    pub(crate) fn upload_url(&self) -> String {
        format!("{}/upload", self.base_url)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_stripped() {
        let client = ApiClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");

        let code = InviteCode::new(4242).unwrap();
        assert_eq!(
            client.download_url(code),
            "http://localhost:8080/download/4242"
        );
        assert_eq!(client.upload_url(), "http://localhost:8080/upload");
    }
}
