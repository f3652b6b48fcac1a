use base64::{engine::general_purpose, Engine as _};
use log::{debug, warn};
use mail_parser::MessageParser;
use serde::Deserialize;
use thiserror::Error;

/// Message payload as the Gmail API sends it over the wire: a header list
/// plus a MIME part tree whose leaf data is base64url-encoded.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPayload {
    pub mime_type: Option<String>,
    pub headers: Vec<RawHeader>,
    pub body: Option<RawBody>,
    pub parts: Option<Vec<RawPayload>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawHeader {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBody {
    pub data: Option<String>,
}

/// Decoded, ready-to-classify view of one email.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEmail {
    pub subject: String,
    pub body: String,
    pub snippet: String,
    pub from_email: String,
}

/// Soft failure while decoding message content. Absorbed by `extract`
/// (the field degrades to an empty string), never propagated to callers.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid base64url data: {0}")]
    Base64(#[from] base64::DecodeError),
}

pub struct ContentExtractor;

impl ContentExtractor {
    /// Turn a raw Gmail payload into a normalized record. Never fails:
    /// undecodable headers or bodies come back as empty strings.
    pub fn extract(payload: &RawPayload, snippet: &str) -> NormalizedEmail {
        let mut subject = String::new();
        let mut from_email = String::new();

        for header in &payload.headers {
            if header.name.eq_ignore_ascii_case("subject") {
                subject = Self::decode_header(&header.value);
            } else if header.name.eq_ignore_ascii_case("from") {
                from_email = header.value.clone();
            }
        }

        let body = Self::extract_body(payload);

        NormalizedEmail {
            subject,
            body,
            snippet: snippet.to_string(),
            from_email,
        }
    }

    /// Decode RFC 2047 encoded-words in a header value.
    ///
    /// mail-parser only decodes headers in the context of a full message, so
    /// the value is wrapped in a one-header message before parsing. Unknown
    /// charsets and broken encodings decode lossily; if parsing fails
    /// entirely, the raw value is returned as-is.
    pub fn decode_header(value: &str) -> String {
        let synthetic = format!("Subject: {}\r\n\r\n", value);

        MessageParser::default()
            .parse(synthetic.as_bytes())
            .and_then(|message| message.subject().map(|s| s.to_string()))
            .unwrap_or_else(|| value.to_string())
    }

    /// Select and decode the message body.
    ///
    /// Multipart: the first `text/plain` part with data wins immediately; a
    /// `text/html` part is kept as fallback when no plain text shows up. A
    /// `text/plain` part with empty data does not stop the scan. Single-part:
    /// the data is used only when the declared type is exactly `text/plain`
    /// or `text/html`.
    fn extract_body(payload: &RawPayload) -> String {
        let mut body = String::new();

        if let Some(parts) = &payload.parts {
            for part in parts {
                let data = part
                    .body
                    .as_ref()
                    .and_then(|b| b.data.as_deref())
                    .unwrap_or("");

                match part.mime_type.as_deref() {
                    Some("text/plain") if !data.is_empty() => {
                        body = Self::decode_body_data(data);
                        break;
                    }
                    Some("text/html") if body.is_empty() && !data.is_empty() => {
                        body = Self::decode_body_data(data);
                    }
                    _ => {}
                }
            }
        } else if matches!(
            payload.mime_type.as_deref(),
            Some("text/plain") | Some("text/html")
        ) {
            if let Some(data) = payload.body.as_ref().and_then(|b| b.data.as_deref()) {
                if !data.is_empty() {
                    body = Self::decode_body_data(data);
                }
            }
        }

        body
    }

    fn decode_body_data(data: &str) -> String {
        match Self::decode_base64url(data) {
            Ok(text) => text,
            Err(e) => {
                warn!("Unable to decode message body: {}", e);
                String::new()
            }
        }
    }

    /// Decode a base64url string (URL-safe alphabet, padding optional) into
    /// text. Decoded bytes are interpreted as UTF-8 with invalid sequences
    /// replaced rather than rejected.
    pub fn decode_base64url(data: &str) -> Result<String, DecodeError> {
        // The Gmail API strips padding; restore it before decoding.
        let mut padded = data.to_string();
        let remainder = padded.len() % 4;
        if remainder != 0 {
            padded.push_str(&"=".repeat(4 - remainder));
        }

        let bytes = general_purpose::URL_SAFE.decode(padded.as_bytes())?;
        debug!("Decoded {} bytes of body data", bytes.len());

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base64url_without_padding() {
        // "hello" encodes to "aGVsbG8" once padding is stripped
        assert_eq!(ContentExtractor::decode_base64url("aGVsbG8").unwrap(), "hello");
        assert_eq!(ContentExtractor::decode_base64url("aGVsbG8=").unwrap(), "hello");
    }

    #[test]
    fn test_decode_base64url_urlsafe_alphabet() {
        // 0xfb 0xef encodes to "--8" in the URL-safe alphabet
        let decoded = ContentExtractor::decode_base64url("--8").unwrap();
        // Invalid UTF-8 bytes are replaced, not rejected
        assert_eq!(decoded, "\u{fffd}\u{fffd}");
    }

    #[test]
    fn test_decode_base64url_rejects_invalid_input() {
        assert!(ContentExtractor::decode_base64url("not base64 at all!").is_err());
    }

    #[test]
    fn test_decode_header_plain_value_passes_through() {
        assert_eq!(ContentExtractor::decode_header("Plain subject"), "Plain subject");
    }
}
