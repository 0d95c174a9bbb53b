//! Header parsing for probe and fetch responses.
//!
//! The relay's interesting metadata arrives in three headers:
//! `Content-Range` (authoritative total size), `Content-Length` (fallback
//! size on full-body answers), and `Content-Disposition` (suggested
//! filename). Size parsing is strict; a malformed value is an error, not a
//! silent zero. The filename is best-effort with a default fallback.

use crate::error::HeaderError;

/// Byte extent reported by a `Content-Range` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    pub start: u64,
    pub end: u64,
    pub total: u64,
}

/// Parses `bytes <start>-<end>/<total>`.
pub fn parse_content_range(value: &str) -> Result<ContentRange, HeaderError> {
    let malformed = || HeaderError {
        header: "content-range",
        value: value.to_string(),
    };

    let rest = value.trim().strip_prefix("bytes").ok_or_else(malformed)?;
    let (range_part, total_part) = rest.trim_start().split_once('/').ok_or_else(malformed)?;
    let (start_part, end_part) = range_part.split_once('-').ok_or_else(malformed)?;

    let start = start_part.trim().parse().map_err(|_| malformed())?;
    let end = end_part.trim().parse().map_err(|_| malformed())?;
    let total = total_part.trim().parse().map_err(|_| malformed())?;
    Ok(ContentRange { start, end, total })
}

/// Parses a `Content-Length` value.
pub fn parse_content_length(value: &str) -> Result<u64, HeaderError> {
    value.trim().parse().map_err(|_| HeaderError {
        header: "content-length",
        value: value.to_string(),
    })
}

/// Extracts the quoted filename from a `Content-Disposition` value.
///
/// Returns `None` when the value has no parsable `filename="…"` part; the
/// caller falls back to a default name.
pub fn content_disposition_filename(value: &str) -> Option<String> {
    const MARKER: &str = "filename=\"";
    let start = value.to_ascii_lowercase().find(MARKER)? + MARKER.len();
    let rest = &value[start..];
    let end = rest.find('"')?;
    if end == 0 {
        return None;
    }
    Some(rest[..end].to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_range_happy_path() {
        let parsed = parse_content_range("bytes 0-0/5242880").unwrap();
        assert_eq!(parsed.start, 0);
        assert_eq!(parsed.end, 0);
        assert_eq!(parsed.total, 5_242_880);
    }

    #[test]
    fn content_range_tolerates_spacing() {
        let parsed = parse_content_range("  bytes  5242880-10485759/12582912 ").unwrap();
        assert_eq!(parsed.start, 5_242_880);
        assert_eq!(parsed.end, 10_485_759);
        assert_eq!(parsed.total, 12_582_912);
    }

    #[test]
    fn content_range_rejects_garbage() {
        assert!(parse_content_range("").is_err());
        assert!(parse_content_range("items 0-0/5").is_err());
        assert!(parse_content_range("bytes 0-0").is_err());
        assert!(parse_content_range("bytes 0/5").is_err());
        assert!(parse_content_range("bytes a-b/c").is_err());
        assert!(parse_content_range("bytes 0-0/notanumber").is_err());
    }

    #[test]
    fn content_range_error_names_the_header() {
        let err = parse_content_range("bytes 0-0/x").unwrap_err();
        assert_eq!(err.header, "content-range");
        assert_eq!(err.value, "bytes 0-0/x");
    }

    #[test]
    fn content_length_parses_digits_only() {
        assert_eq!(parse_content_length("1016").unwrap(), 1016);
        assert_eq!(parse_content_length(" 0 ").unwrap(), 0);
        assert!(parse_content_length("12 bytes").is_err());
        assert!(parse_content_length("-5").is_err());
    }

    #[test]
    fn disposition_extracts_quoted_filename() {
        assert_eq!(
            content_disposition_filename("attachment; filename=\"video.mp4\""),
            Some("video.mp4".into())
        );
    }

    #[test]
    fn disposition_is_case_insensitive() {
        assert_eq!(
            content_disposition_filename("Attachment; Filename=\"a.txt\""),
            Some("a.txt".into())
        );
    }

    #[test]
    fn disposition_without_filename_is_none() {
        assert_eq!(content_disposition_filename("inline"), None);
        assert_eq!(content_disposition_filename("attachment; filename=bare"), None);
        assert_eq!(content_disposition_filename("attachment; filename=\"\""), None);
        assert_eq!(content_disposition_filename("attachment; filename=\"unterminated"), None);
    }
}
