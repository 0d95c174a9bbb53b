//! Resource size and filename discovery.

use reqwest::StatusCode;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_RANGE, HeaderMap, RANGE};
use tracing::debug;

use peerpass_protocol::InviteCode;

use crate::error::ProbeError;
use crate::headers::{content_disposition_filename, parse_content_length, parse_content_range};
use crate::{ApiClient, DEFAULT_FILENAME, PROBE_TIMEOUT};

/// What a successful probe learned about the resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// Total resource length in bytes, always positive.
    pub total_bytes: u64,
    /// Suggested filename, or the default when the relay names none.
    pub filename: String,
}

impl ApiClient {
    /// Discovers the total size and suggested filename behind `code`.
    ///
    /// Requests the first byte only (`Range: bytes=0-0`). A `206` answer
    /// yields the size from `Content-Range`; a `200` means the relay
    /// ignored the range and the size comes from `Content-Length`. Any
    /// other status, a missing or malformed size, or a zero size is an
    /// error; without a positive size no chunk plan can be made. The
    /// response body is never read.
    pub async fn probe(&self, code: InviteCode) -> Result<ProbeOutcome, ProbeError> {
        let response = self
            .http()
            .get(self.download_url(code))
            .header(RANGE, "bytes=0-0")
            .timeout(PROBE_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers();

        let total_bytes = if status == StatusCode::PARTIAL_CONTENT {
            let value = header_str(headers, CONTENT_RANGE).ok_or(ProbeError::SizeMissing)?;
            parse_content_range(value)?.total
        } else if status == StatusCode::OK {
            let value = header_str(headers, CONTENT_LENGTH).ok_or(ProbeError::SizeMissing)?;
            parse_content_length(value)?
        } else {
            return Err(ProbeError::UnexpectedStatus(status.as_u16()));
        };

        if total_bytes == 0 {
            return Err(ProbeError::EmptySize);
        }

        let filename = header_str(headers, CONTENT_DISPOSITION)
            .and_then(content_disposition_filename)
            .unwrap_or_else(|| DEFAULT_FILENAME.to_string());

        debug!(code = %code, total_bytes, filename = %filename, "probe complete");
        Ok(ProbeOutcome {
            total_bytes,
            filename,
        })
    }
}

fn header_str(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn code(value: u16) -> InviteCode {
        InviteCode::new(value).unwrap()
    }

    #[tokio::test]
    async fn probe_reads_total_from_content_range() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/download/4242"))
            .and(header("Range", "bytes=0-0"))
            .respond_with(
                ResponseTemplate::new(206)
                    .set_body_bytes(vec![0u8])
                    .insert_header("Content-Range", "bytes 0-0/12582912")
                    .insert_header("Content-Disposition", "attachment; filename=\"video.mp4\""),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let outcome = client.probe(code(4242)).await.unwrap();
        assert_eq!(outcome.total_bytes, 12_582_912);
        assert_eq!(outcome.filename, "video.mp4");
    }

    #[tokio::test]
    async fn probe_falls_back_to_content_length_on_full_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/download/77"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 1016]))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let outcome = client.probe(code(77)).await.unwrap();
        assert_eq!(outcome.total_bytes, 1016);
        assert_eq!(outcome.filename, DEFAULT_FILENAME);
    }

    #[tokio::test]
    async fn probe_without_content_range_on_206_is_size_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/download/77"))
            .respond_with(ResponseTemplate::new(206).set_body_bytes(vec![0u8]))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let err = client.probe(code(77)).await.unwrap_err();
        assert!(matches!(err, ProbeError::SizeMissing));
    }

    #[tokio::test]
    async fn probe_with_malformed_content_range_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/download/77"))
            .respond_with(
                ResponseTemplate::new(206)
                    .set_body_bytes(vec![0u8])
                    .insert_header("Content-Range", "bytes nonsense"),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let err = client.probe(code(77)).await.unwrap_err();
        assert!(matches!(err, ProbeError::Malformed(_)));
    }

    #[tokio::test]
    async fn probe_rejects_zero_size() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/download/77"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let err = client.probe(code(77)).await.unwrap_err();
        assert!(matches!(err, ProbeError::EmptySize));
    }

    #[tokio::test]
    async fn probe_rejects_unexpected_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/download/77"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let err = client.probe(code(77)).await.unwrap_err();
        assert!(matches!(err, ProbeError::UnexpectedStatus(404)));
    }
}
