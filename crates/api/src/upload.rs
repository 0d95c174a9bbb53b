//! Multipart upload to the relay.

use std::path::Path;

use futures_util::TryStreamExt;
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use peerpass_protocol::InviteCode;

use crate::error::UploadError;
use crate::ApiClient;

/// Cumulative-bytes callback fired as the transport reads the request body.
pub type UploadProgressFn = Box<dyn Fn(u64) + Send + Sync>;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    port: u16,
}

impl ApiClient {
    /// Uploads the file at `path` in one multipart request.
    ///
    /// `on_progress` receives the cumulative byte count each time the
    /// transport pulls another piece of the file, so progress tracks what
    /// actually left the machine rather than what was queued. Answers with
    /// the invite code the relay assigned to the stored file.
    pub async fn upload_file(
        &self,
        path: &Path,
        on_progress: UploadProgressFn,
    ) -> Result<InviteCode, UploadError> {
        let file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());

        debug!(file = %filename, size, "starting upload");

        let mut sent = 0u64;
        let counted = ReaderStream::new(file).inspect_ok(move |piece| {
            sent += piece.len() as u64;
            on_progress(sent);
        });
        let part = reqwest::multipart::Part::stream_with_length(
            reqwest::Body::wrap_stream(counted),
            size,
        )
        .file_name(filename.clone());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http()
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::UnexpectedStatus(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: UploadResponse = serde_json::from_str(&body)?;
        let code = InviteCode::new(parsed.port)?;

        info!(code = %code, file = %filename, size, "upload complete");
        Ok(code)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
