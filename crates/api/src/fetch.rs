//! Single-range chunk fetching.

use futures_util::StreamExt;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_RANGE, RANGE};
use tracing::debug;

use peerpass_protocol::InviteCode;
use peerpass_transfer::{ChunkRange, ChunkResult};

use crate::error::FetchError;
use crate::headers::parse_content_range;
use crate::ApiClient;

impl ApiClient {
    /// Fetches exactly `range` of the resource behind `code`.
    ///
    /// A `206` must echo the requested extent in `Content-Range` and carry
    /// a body of exactly that many bytes. A `200` is tolerated for the
    /// first range only (the relay ignored the range header and sent the
    /// whole file), in which case the payload is cut down to the requested
    /// window. A `200` past the first range means the server cannot do
    /// ranges at all and the transfer is hopeless; everything else is
    /// transient.
    pub async fn fetch_chunk(
        &self,
        code: InviteCode,
        range: ChunkRange,
    ) -> Result<ChunkResult, FetchError> {
        let requested = range.header_value();
        let response = self
            .http()
            .get(self.download_url(code))
            .header(RANGE, &requested)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::PARTIAL_CONTENT {
            let extent = response
                .headers()
                .get(CONTENT_RANGE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let Some(extent) = extent else {
                return Err(FetchError::RangeMismatch {
                    requested,
                    got: "206 without content-range".into(),
                });
            };
            let parsed = parse_content_range(&extent).map_err(|_| FetchError::RangeMismatch {
                requested: requested.clone(),
                got: extent.clone(),
            })?;
            if parsed.start != range.start || parsed.end != range.end {
                return Err(FetchError::RangeMismatch {
                    requested,
                    got: extent,
                });
            }

            let payload = read_body(response).await?;
            if payload.len() as u64 != range.len() {
                return Err(FetchError::RangeMismatch {
                    requested,
                    got: format!("{} byte body", payload.len()),
                });
            }

            debug!(code = %code, index = range.sequence_index, bytes = payload.len(), "chunk fetched");
            Ok(ChunkResult::new(range.sequence_index, payload))
        } else if status == StatusCode::OK {
            if range.start != 0 {
                return Err(FetchError::RangeMismatch {
                    requested,
                    got: "full body past the first range".into(),
                });
            }

            // The relay ignored the range and sent everything; keep the
            // requested window.
            let mut payload = read_body(response).await?;
            if (payload.len() as u64) < range.len() {
                return Err(FetchError::RangeMismatch {
                    requested,
                    got: format!("{} byte full body", payload.len()),
                });
            }
            payload.truncate(range.len() as usize);

            debug!(code = %code, index = range.sequence_index, bytes = payload.len(), "chunk cut from full body");
            Ok(ChunkResult::new(range.sequence_index, payload))
        } else {
            Err(FetchError::UnexpectedStatus(status.as_u16()))
        }
    }
}

async fn read_body(response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
    let mut payload = Vec::with_capacity(response.content_length().unwrap_or(0) as usize);
    let mut stream = response.bytes_stream();
    while let Some(piece) = stream.next().await {
        payload.extend_from_slice(&piece?);
    }
    Ok(payload)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
