//! Inline document decoding and validation.
//!
//! Clients submit documents as `data:<mime>;base64,<payload>` URIs. This module turns those
//! into a [`DocumentPayload`] before any upstream call is made, so malformed input never
//! reaches a provider.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use thiserror::Error;

/// Media types the pipeline accepts, mirroring the document loaders of the original app.
const SUPPORTED_MEDIA_TYPES: &[&str] = &[
    "application/pdf",
    "text/plain",
    "text/markdown",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "image/png",
    "image/jpeg",
];

/// Errors raised while validating an inline document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Input did not carry the `data:` scheme prefix.
    #[error("document must be a data URI (missing 'data:' prefix)")]
    MissingDataPrefix,
    /// Input did not declare base64 encoding or omitted the payload separator.
    #[error("document data URI must declare ';base64,' encoding")]
    MissingBase64Marker,
    /// Payload bytes could not be decoded as base64.
    #[error("document payload is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    /// Payload decoded to zero bytes.
    #[error("document payload is empty")]
    EmptyPayload,
    /// Declared media type is not supported by the pipeline.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
}

/// A decoded document ready for the analysis pipeline.
///
/// Payloads are transient: constructed per request and dropped once the pipeline run
/// completes. Nothing is persisted.
#[derive(Debug, Clone)]
pub struct DocumentPayload {
    /// Declared media type, e.g. `application/pdf`.
    pub media_type: String,
    /// Decoded document bytes.
    pub bytes: Vec<u8>,
}

impl DocumentPayload {
    /// Parse and validate a `data:<mime>;base64,<payload>` URI.
    pub fn from_data_uri(input: &str) -> Result<Self, DocumentError> {
        let rest = input
            .strip_prefix("data:")
            .ok_or(DocumentError::MissingDataPrefix)?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or(DocumentError::MissingBase64Marker)?;

        let mut params = header.split(';');
        let media_type = params.next().unwrap_or_default().trim().to_lowercase();
        if !params.any(|param| param.trim().eq_ignore_ascii_case("base64")) {
            return Err(DocumentError::MissingBase64Marker);
        }

        if !SUPPORTED_MEDIA_TYPES.contains(&media_type.as_str()) {
            return Err(DocumentError::UnsupportedMediaType(media_type));
        }

        let bytes = BASE64.decode(payload.trim())?;
        if bytes.is_empty() {
            return Err(DocumentError::EmptyPayload);
        }

        Ok(Self { media_type, bytes })
    }

    /// Whether the payload is textual and can be folded into a plain prompt.
    pub fn is_text(&self) -> bool {
        self.media_type.starts_with("text/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(text: &str) -> String {
        BASE64.encode(text.as_bytes())
    }

    #[test]
    fn parses_plain_text_data_uri() {
        let uri = format!("data:text/plain;base64,{}", encode("hello agreement"));
        let payload = DocumentPayload::from_data_uri(&uri).expect("payload");
        assert_eq!(payload.media_type, "text/plain");
        assert_eq!(payload.bytes, b"hello agreement");
        assert!(payload.is_text());
    }

    #[test]
    fn accepts_extra_parameters_before_base64_marker() {
        let uri = format!(
            "data:text/plain;charset=utf-8;base64,{}",
            encode("charset survives")
        );
        let payload = DocumentPayload::from_data_uri(&uri).expect("payload");
        assert_eq!(payload.media_type, "text/plain");
    }

    #[test]
    fn rejects_missing_prefix() {
        let err = DocumentPayload::from_data_uri("text/plain;base64,aGk=").expect_err("error");
        assert!(matches!(err, DocumentError::MissingDataPrefix));
    }

    #[test]
    fn rejects_missing_base64_marker() {
        let err = DocumentPayload::from_data_uri("data:text/plain,plain text").expect_err("error");
        assert!(matches!(err, DocumentError::MissingBase64Marker));
    }

    #[test]
    fn rejects_unsupported_media_type() {
        let uri = format!("data:application/zip;base64,{}", encode("zipped"));
        let err = DocumentPayload::from_data_uri(&uri).expect_err("error");
        assert!(matches!(err, DocumentError::UnsupportedMediaType(kind) if kind == "application/zip"));
    }

    #[test]
    fn rejects_invalid_base64_payload() {
        let err =
            DocumentPayload::from_data_uri("data:application/pdf;base64,@@@").expect_err("error");
        assert!(matches!(err, DocumentError::InvalidBase64(_)));
    }

    #[test]
    fn rejects_empty_payload() {
        let err = DocumentPayload::from_data_uri("data:application/pdf;base64,").expect_err("error");
        assert!(matches!(err, DocumentError::EmptyPayload));
    }

    #[test]
    fn binary_media_is_not_text() {
        let uri = format!("data:image/png;base64,{}", encode("not really a png"));
        let payload = DocumentPayload::from_data_uri(&uri).expect("payload");
        assert!(!payload.is_text());
    }
}
