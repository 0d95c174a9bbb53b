//! Transfer orchestration for the PeerPass client.
//!
//! Downloads run the probe → plan → fetch/retry → assemble pipeline;
//! uploads are a single multipart request with transport-level progress.
//! Either way the caller gets a handle: poll [`snapshot`] for state, take
//! the event stream for push updates, cancel at any moment, and `wait` for
//! the outcome.
//!
//! [`snapshot`]: DownloadHandle::snapshot

mod config;
mod download;
mod error;
mod events;
mod upload;

pub use config::TransferConfig;
pub use download::{CompletedDownload, DownloadHandle};
pub use error::{DownloadError, UploadError};
pub use events::TransferEvent;
pub use upload::UploadHandle;

pub use peerpass_transfer::{RateMode, RetryPolicy, TransferSession};

use std::path::PathBuf;

use peerpass_api::ApiClient;
use peerpass_protocol::InviteCode;

/// Entry point: starts sessions against one relay server.
///
/// Cheap to clone; every started session is independent. A failed or
/// cancelled session is never resumed, only restarted from scratch.
#[derive(Debug, Clone)]
pub struct TransferClient {
    api: ApiClient,
    config: TransferConfig,
}

impl TransferClient {
    /// Creates a client for the relay at `base_url`.
    pub fn new(base_url: impl Into<String>, config: TransferConfig) -> Self {
        Self {
            api: ApiClient::new(base_url),
            config,
        }
    }

    /// Starts a download session for `code`.
    ///
    /// Must be called inside a tokio runtime; the transfer runs on a
    /// spawned task from the moment this returns.
    pub fn start_download(&self, code: InviteCode) -> DownloadHandle {
        download::start(self.api.clone(), self.config.clone(), code)
    }

    /// Starts an upload session for the file at `path`.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start_upload(&self, path: impl Into<PathBuf>) -> UploadHandle {
        upload::start(self.api.clone(), self.config.clone(), path.into())
    }
}
