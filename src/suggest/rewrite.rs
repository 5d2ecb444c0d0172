//! Per-chunk suggestion rewriting.
//!
//! Every chunk is rewritten on its own with no memory of earlier chunks, so a
//! `<Text>` tag or a quote split across a chunk boundary is not marked.
//!
//! JSON chunks get a structured rewrite when the chunk is a complete document
//! of the shape `[query, [suggestion, ...], ...]`. Otherwise a textual fallback
//! inserts the marker after every `"` that precedes a word character. The
//! fallback also marks quotes inside the echoed query and metadata keys; that
//! is known and kept as is.

use bytes::Bytes;
use lazy_static::lazy_static;
use regex::bytes::Regex;
use serde_json::Value;

use crate::suggest::params::{ResponseFormat, SuggestRequest, MARKER};

lazy_static! {
    // ASCII word characters only, matching the upstream's own notion of a word start.
    static ref XML_SUGGESTION_START: Regex =
        Regex::new(r"(?-u)<Text>(\w)").expect("valid XML suggestion pattern");
    static ref QUOTE_WORD_START: Regex =
        Regex::new(r#"(?-u)"(\w)"#).expect("valid quote pattern");
}

/// How a chunk was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Forwarded untouched.
    Passthrough,
    /// `<Text>` pattern rewrite.
    Xml,
    /// Parsed, rewritten and re-serialized JSON.
    Structured,
    /// Quote-word pattern rewrite on a partial or unexpected JSON chunk.
    Textual,
}

impl Strategy {
    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Passthrough => "passthrough",
            Strategy::Xml => "xml",
            Strategy::Structured => "structured",
            Strategy::Textual => "textual",
        }
    }
}

/// Rewrite rule for one request, fixed at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewritePolicy {
    /// No bang: bytes pass through unchanged.
    Passthrough,
    /// Bang with the `<Text>` format.
    Xml,
    /// Bang with the JSON array format.
    Json,
}

impl RewritePolicy {
    /// Select the policy for a parsed request.
    pub fn for_request(request: &SuggestRequest) -> Self {
        match (request.bang, request.format) {
            (false, _) => RewritePolicy::Passthrough,
            (true, ResponseFormat::Xml) => RewritePolicy::Xml,
            (true, ResponseFormat::Json) => RewritePolicy::Json,
        }
    }

    /// Whether chunks may change size.
    pub fn is_active(self) -> bool {
        self != RewritePolicy::Passthrough
    }

    /// Rewrite a single chunk.
    pub fn apply(self, chunk: Bytes) -> (Bytes, Strategy) {
        match self {
            RewritePolicy::Passthrough => (chunk, Strategy::Passthrough),
            RewritePolicy::Xml => (mark_xml(chunk), Strategy::Xml),
            RewritePolicy::Json => match mark_json_document(&chunk) {
                Some(rewritten) => (Bytes::from(rewritten), Strategy::Structured),
                None => (mark_quoted_words(chunk), Strategy::Textual),
            },
        }
    }
}

/// Insert the marker after every `<Text>` followed by a word character.
pub fn mark_xml(chunk: Bytes) -> Bytes {
    insert_marker(&XML_SUGGESTION_START, chunk)
}

/// Insert the marker after every `"` followed by a word character.
pub fn mark_quoted_words(chunk: Bytes) -> Bytes {
    insert_marker(&QUOTE_WORD_START, chunk)
}

/// Structured rewrite of a complete JSON suggestion document.
///
/// Returns `None` unless the chunk parses as an array whose element 1 is an
/// array of strings.
pub fn mark_json_document(chunk: &[u8]) -> Option<Vec<u8>> {
    let mut document: Value = serde_json::from_slice(chunk).ok()?;
    let suggestions = document.get_mut(1)?.as_array_mut()?;

    for suggestion in suggestions.iter_mut() {
        match suggestion {
            Value::String(text) => text.insert(0, MARKER),
            _ => return None,
        }
    }

    serde_json::to_vec(&document).ok()
}

fn insert_marker(pattern: &Regex, chunk: Bytes) -> Bytes {
    let mut marker = [0u8; 4];
    let marker = MARKER.encode_utf8(&mut marker).as_bytes();

    let mut out: Option<Vec<u8>> = None;
    let mut last = 0;
    for caps in pattern.captures_iter(&chunk) {
        let Some(word) = caps.get(1) else { continue };
        let buf = out.get_or_insert_with(|| Vec::with_capacity(chunk.len() + 16));
        buf.extend_from_slice(&chunk[last..word.start()]);
        buf.extend_from_slice(marker);
        last = word.start();
    }

    match out {
        Some(mut buf) => {
            buf.extend_from_slice(&chunk[last..]);
            Bytes::from(buf)
        }
        None => chunk,
    }
}
