//! Bounded-timeout upstream retrieval with charset-aware decoding.
//!
//! Every byte that leaves this module has been decoded to UTF-8 and scrubbed
//! of control characters and replacement markers, so no downstream stage
//! re-checks for garbled text.

use std::time::Duration;

use encoding_rs::{Encoding, UTF_8};
use reqwest::Client;

use crate::error::PipelineError;

/// A decoded, sanitized upstream response body.
#[derive(Debug, Clone)]
pub struct FetchedText {
    pub status: u16,
    pub text: String,
}

/// HTTP client for upstream feeds and suggestion endpoints.
///
/// Built once at startup and shared; the per-request timeout is the only
/// cancellation mechanism the pipeline needs — a timed-out call surfaces as
/// [`PipelineError::Http`] within the configured bound, never a hang.
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
}

impl FetchClient {
    /// Creates a client with the configured total timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g. invalid TLS config).
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Fetches a URL and returns its decoded, sanitized body.
    ///
    /// Charset resolution order: `Content-Type` header charset, then a
    /// document-declared charset (XML prolog `encoding=`), then UTF-8.
    /// Unsupported legacy labels fall back to UTF-8 rather than erroring.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Http`] — network failure or timeout.
    /// - [`PipelineError::UnexpectedStatus`] — any non-2xx status.
    pub async fn fetch_text(&self, url: &str) -> Result<FetchedText, PipelineError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(PipelineError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let header_charset = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_from_content_type);

        let bytes = response.bytes().await?;
        let encoding = resolve_encoding(header_charset.as_deref(), &bytes);
        let (decoded, _, _) = encoding.decode(&bytes);

        Ok(FetchedText {
            status: status.as_u16(),
            text: sanitize_text(&decoded),
        })
    }

    /// Fetches a URL and best-effort parses the body as JSON.
    ///
    /// A body that is not valid JSON yields `Ok(None)` rather than an error;
    /// network and status failures still propagate.
    ///
    /// # Errors
    ///
    /// Same as [`FetchClient::fetch_text`].
    pub async fn fetch_json(&self, url: &str) -> Result<Option<serde_json::Value>, PipelineError> {
        let fetched = self.fetch_text(url).await?;
        Ok(serde_json::from_str(&fetched.text).ok())
    }
}

/// Extracts a `charset=` parameter from a `Content-Type` header value.
fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("charset="))
        .map(|cs| cs.trim_matches('"').to_ascii_lowercase())
}

/// Resolves the encoding for a response body.
///
/// Falls back to sniffing an XML prolog `encoding="..."` declaration in the
/// first bytes when the header carries no charset. Unknown labels resolve
/// to UTF-8.
fn resolve_encoding(header_charset: Option<&str>, bytes: &[u8]) -> &'static Encoding {
    if let Some(label) = header_charset {
        if let Some(enc) = Encoding::for_label(label.as_bytes()) {
            return enc;
        }
    }
    if let Some(label) = sniff_xml_prolog_encoding(bytes) {
        if let Some(enc) = Encoding::for_label(label.as_bytes()) {
            return enc;
        }
    }
    UTF_8
}

/// Pulls the `encoding` attribute out of an XML prolog, if one leads the
/// document. Only the first 256 bytes are examined.
fn sniff_xml_prolog_encoding(bytes: &[u8]) -> Option<String> {
    let head_len = bytes.len().min(256);
    let head = String::from_utf8_lossy(&bytes[..head_len]);
    let prolog_start = head.find("<?xml")?;
    let prolog_end = head[prolog_start..].find("?>")? + prolog_start;
    let prolog = &head[prolog_start..prolog_end];
    let attr_start = prolog.find("encoding=")? + "encoding=".len();
    let rest = &prolog[attr_start..];
    let quote = rest.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let inner = &rest[1..];
    let close = inner.find(quote)?;
    Some(inner[..close].to_ascii_lowercase())
}

/// Strips control characters and decoding-failure markers from decoded text.
///
/// Newlines and tabs survive; everything else below U+0020, the C1 range,
/// and U+FFFD are removed.
pub(crate) fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            if c == '\n' || c == '\t' {
                return true;
            }
            if c == '\u{FFFD}' {
                return false;
            }
            !c.is_control()
        })
        .collect()
}
