//! Multipart/related codec for WADO-RS and STOW-RS payloads
//!
//! Packages one or more binary DICOM payloads into a single HTTP
//! `multipart/related` body and unpacks a received body back into its
//! constituent parts. All boundary handling works on raw bytes; payload
//! content never passes through a string type.

use bytes::Bytes;
use uuid::Uuid;

use crate::error::{DicomWebError, Result};

/// Content type written into each encoded part unless overridden
pub const DEFAULT_PART_CONTENT_TYPE: &str = "application/dicom";

/// Maximum number of bytes scanned for a header/body separator, so a large
/// binary body without one is rejected without a full scan
const HEADER_SEARCH_WINDOW: usize = 1000;

const SEPARATOR: &[u8] = b"\r\n\r\n";

/// A single part of a decoded `multipart/related` message
#[derive(Debug, Clone)]
pub struct Part {
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl Part {
    /// Create a part from parsed headers and raw body bytes
    pub fn new(headers: Vec<(String, String)>, body: Bytes) -> Self {
        Self { headers, body }
    }

    /// Look up a header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The part's `Content-Type` header, if present
    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    /// All headers in the order they appeared
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// The raw body bytes
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consume the part, returning its body
    pub fn into_body(self) -> Bytes {
        self.body
    }
}

/// Result of [`encode`]: the assembled body plus the boundary that was used.
///
/// The caller must echo the boundary in the `Content-Type` header of the
/// surrounding HTTP request.
#[derive(Debug, Clone)]
pub struct EncodedMultipart {
    pub data: Bytes,
    pub boundary: String,
}

/// Encode one or more DICOM datasets into a single `multipart/related` body.
///
/// When no boundary is given a random UUID is generated. The boundary must
/// not occur inside any dataset; the encoder neither escapes nor checks for
/// collisions.
pub fn encode(datasets: &[Bytes], boundary: Option<String>, content_type: &str) -> EncodedMultipart {
    let boundary = boundary.unwrap_or_else(|| Uuid::new_v4().to_string());
    let header = format!("\r\n--{boundary}\r\nContent-Type: {content_type}\r\n\r\n");
    let footer = format!("\r\n--{boundary}--");

    let length: usize = datasets
        .iter()
        .map(|dataset| header.len() + dataset.len())
        .sum::<usize>()
        + footer.len();

    let mut data = Vec::with_capacity(length);
    for dataset in datasets {
        data.extend_from_slice(header.as_bytes());
        data.extend_from_slice(dataset);
    }
    data.extend_from_slice(footer.as_bytes());

    EncodedMultipart {
        data: Bytes::from(data),
        boundary,
    }
}

/// Decode a `multipart/related` body into its parts.
///
/// The boundary is taken from the message itself: the first line of the
/// header block that starts with `--`. A message without a header/body
/// separator, without a boundary line, or ending before the closing
/// `--{boundary}--` terminator is rejected as malformed.
pub fn decode(message: &[u8]) -> Result<Vec<Part>> {
    let header_end = find_token(message, SEPARATOR, 0, Some(HEADER_SEARCH_WINDOW))
        .ok_or_else(|| DicomWebError::malformed("response message has no multipart mime header"))?;

    let preamble = String::from_utf8_lossy(&message[..header_end]);
    let mut preamble_lines = preamble.split("\r\n");
    let boundary = preamble_lines
        .by_ref()
        .find(|line| line.starts_with("--"))
        .map(|line| line[2..].to_string())
        .ok_or_else(|| {
            DicomWebError::malformed("header of response message does not specify boundary")
        })?;
    let delimiter = format!("--{boundary}").into_bytes();

    // Lines after the boundary line belong to the first part
    let mut headers = parse_header_lines(preamble_lines);

    let mut parts = Vec::new();
    let mut offset = header_end + SEPARATOR.len();

    loop {
        let delimiter_index = find_token(message, &delimiter, offset, None).ok_or_else(|| {
            DicomWebError::malformed("message ends without a closing boundary delimiter")
        })?;
        // Every delimiter is preceded by CRLF, which is not part of the body
        if delimiter_index < offset + 2
            || &message[delimiter_index - 2..delimiter_index] != b"\r\n"
        {
            return Err(DicomWebError::malformed(
                "boundary delimiter is not preceded by CRLF",
            ));
        }
        let body = Bytes::copy_from_slice(&message[offset..delimiter_index - 2]);
        parts.push(Part::new(std::mem::take(&mut headers), body));

        let after = delimiter_index + delimiter.len();
        let rest = &message[after..];
        if rest.starts_with(b"--") {
            // Closing terminator
            break;
        }
        if !rest.starts_with(b"\r\n") {
            return Err(DicomWebError::malformed(
                "boundary delimiter is neither terminated nor followed by CRLF",
            ));
        }

        let block_end = find_token(message, SEPARATOR, after, Some(HEADER_SEARCH_WINDOW))
            .ok_or_else(|| {
                DicomWebError::malformed("part header block has no blank-line separator")
            })?;
        let block = String::from_utf8_lossy(&message[after..block_end]);
        headers = parse_header_lines(block.split("\r\n"));
        offset = block_end + SEPARATOR.len();
    }

    Ok(parts)
}

/// Checks whether `message` contains `token` starting at `offset`
fn contains_token(message: &[u8], token: &[u8], offset: usize) -> bool {
    message.len() >= offset + token.len() && &message[offset..offset + token.len()] == token
}

/// Finds the next occurrence of `token` in `message` at or after `offset`.
///
/// A naive scan: tokens and haystacks may have arbitrary lengths and
/// arbitrary byte values. `max_search_length` bounds how far past `offset`
/// a match may start.
fn find_token(
    message: &[u8],
    token: &[u8],
    offset: usize,
    max_search_length: Option<usize>,
) -> Option<usize> {
    if token.is_empty() {
        return None;
    }
    let search_end = match max_search_length {
        Some(limit) => message.len().min(offset.saturating_add(limit)),
        None => message.len(),
    };
    (offset..search_end).find(|&i| token[0] == message[i] && contains_token(message, token, i))
}

fn parse_header_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<(String, String)> {
    lines
        .filter(|line| !line.is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}
