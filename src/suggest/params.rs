//! Query parameter parsing and re-serialization.
//!
//! Parsing never fails. A missing or garbled query string yields an empty
//! `q`, which means no rewrite happens.

use url::form_urlencoded;

/// Character that marks a bang query and is restored on every suggestion.
pub const MARKER: char = '!';

/// Prefix of `client` values that receive the XML response format.
const XML_CLIENT_PREFIX: &str = "ie";

/// Parsed suggestion query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    /// Search text. Empty when absent.
    pub q: String,
    /// Requesting client type. `None` when absent, treated as `""`.
    pub client: Option<String>,
    /// Every other pair, in original order. Repeats of `q` or `client` land here too.
    pub extra: Vec<(String, String)>,
}

impl QueryParams {
    /// Parse an `application/x-www-form-urlencoded` query string.
    pub fn parse(query: &str) -> Self {
        let mut params = Self::default();
        let mut seen_q = false;

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "q" if !seen_q => {
                    params.q = value.into_owned();
                    seen_q = true;
                }
                "client" if params.client.is_none() => {
                    params.client = Some(value.into_owned());
                }
                _ => params.extra.push((key.into_owned(), value.into_owned())),
            }
        }

        params
    }

    /// The `client` value, defaulting to `""`.
    pub fn client(&self) -> &str {
        self.client.as_deref().unwrap_or("")
    }

    /// True when `q` starts with the marker.
    pub fn is_bang(&self) -> bool {
        self.q.starts_with(MARKER)
    }

    /// True when `client` selects the `<Text>` tag response format.
    pub fn wants_xml(&self) -> bool {
        self.client().starts_with(XML_CLIENT_PREFIX)
    }

    /// Serialize back to a query string.
    ///
    /// `q` is always emitted, `client` only if it was present. Escaping is
    /// canonical form encoding, so non-canonical input escapes are not kept.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.append_pair("q", &self.q);
        if let Some(client) = &self.client {
            serializer.append_pair("client", client);
        }
        for (key, value) in &self.extra {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

/// Response encoding the upstream will use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// `["query",["s1","s2",...]]`
    Json,
    /// `<Text>s1</Text>...`
    Xml,
}

/// Everything derived from an incoming suggestion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestRequest {
    pub params: QueryParams,
    pub bang: bool,
    pub format: ResponseFormat,
}

impl SuggestRequest {
    /// Parse the raw query string of an incoming request.
    pub fn parse(query: Option<&str>) -> Self {
        let params = query.map(QueryParams::parse).unwrap_or_default();
        let bang = params.is_bang();
        let format = if params.wants_xml() {
            ResponseFormat::Xml
        } else {
            ResponseFormat::Json
        };

        Self {
            params,
            bang,
            format,
        }
    }
}
