//! Canonical representation of a signed request.
//!
//! The canonical string is what gets fed to the HMAC. A verifier rebuilds it
//! from the request it receives, so the layout below is a wire contract:
//!
//! ```text
//! METHOD\n
//! date:Date\n
//! nonce:Nonce\n
//! header-name:HeaderValue\n      (one line per signed header)
//! Path[?SortedQuery]
//! ```
//!
//! Header names are lowercased and sorted byte-wise (then by value for
//! repeated names). The `?SortedQuery` suffix is only present when the query
//! is non-empty. Line breaks are the reserved delimiter, so no field may
//! contain `\n` or `\r`.

use crate::error::{SignerError, SignerResult};
use crate::uri::encode_query_component;

/// The canonical fields in the order they are checked and rendered.
pub const CANONICAL_FIELDS: [&str; 6] = ["method", "date", "nonce", "headers", "path", "query"];

/// The signable facets of one request.
///
/// Every field starts out absent. [`CanonicalParams::canonical_representation`]
/// refuses to run until all six are set, even if some are set to empty values.
///
/// # Examples
///
/// ```
/// use warden_hmac::canonical::CanonicalParams;
///
/// let canonical = CanonicalParams::new()
///     .method("get")
///     .date("SUN, 15 01 2012 16:43:21 GMT")
///     .nonce("abc")
///     .headers([("Content-Type", "text/plain")])
///     .path("/blog")
///     .query("a=1&b=2")
///     .canonical_representation()
///     .unwrap();
///
/// assert_eq!(
///     canonical,
///     "GET\ndate:SUN, 15 01 2012 16:43:21 GMT\nnonce:abc\ncontent-type:text/plain\n/blog?a=1&b=2"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalParams {
    method: Option<String>,
    date: Option<String>,
    nonce: Option<String>,
    headers: Option<Vec<(String, String)>>,
    path: Option<String>,
    query: Option<String>,
}

impl CanonicalParams {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTTP method.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Set the formatted request date.
    #[must_use]
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Set the nonce. Use an empty string for requests without one.
    #[must_use]
    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Set the signed headers. Order does not matter.
    #[must_use]
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers = Some(
            headers
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Set the request path.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the already sorted query string.
    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Build the canonical string.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::InvalidArgument`] naming the first missing field
    /// (in [`CANONICAL_FIELDS`] order), or the field whose value contains a
    /// reserved delimiter.
    pub fn canonical_representation(&self) -> SignerResult<String> {
        let method = require(self.method.as_deref(), "method")?;
        let date = require(self.date.as_deref(), "date")?;
        let nonce = require(self.nonce.as_deref(), "nonce")?;
        let headers = self
            .headers
            .as_deref()
            .ok_or_else(|| SignerError::missing("headers"))?;
        let path = require(self.path.as_deref(), "path")?;
        let query = require(self.query.as_deref(), "query")?;

        for (field, value) in [
            ("method", method),
            ("date", date),
            ("nonce", nonce),
            ("path", path),
            ("query", query),
        ] {
            reject_line_breaks(field, value)?;
        }
        if path.contains('?') {
            return Err(SignerError::invalid("path must not contain '?'"));
        }

        let canonical_headers = build_canonical_headers(headers)?;

        let mut rep = String::with_capacity(
            method.len() + date.len() + nonce.len() + canonical_headers.len() + path.len()
                + query.len()
                + 32,
        );
        rep.push_str(&method.to_ascii_uppercase());
        rep.push('\n');
        rep.push_str("date:");
        rep.push_str(date);
        rep.push('\n');
        rep.push_str("nonce:");
        rep.push_str(nonce);
        rep.push('\n');
        rep.push_str(&canonical_headers);
        rep.push_str(path);
        if !query.is_empty() {
            rep.push('?');
            rep.push_str(query);
        }

        Ok(rep)
    }
}

/// Sort decoded query pairs by key, then value, and join them as `k=v&k=v`.
///
/// The comparison is byte-wise on the decoded text, so the result does not
/// depend on locale or on the order the pairs arrived in. Keys and values are
/// then re-encoded with [`encode_query_component`], so a decoded `&`, `=`,
/// `+` or line break cannot pose as a delimiter.
///
/// # Examples
///
/// ```
/// use warden_hmac::canonical::build_sorted_query;
///
/// let pairs = vec![
///     ("value".to_owned(), "def".to_owned()),
///     ("value".to_owned(), "a&b".to_owned()),
///     ("b".to_owned(), "2".to_owned()),
/// ];
/// assert_eq!(build_sorted_query(pairs), "b=2&value=a%26b&value=def");
/// ```
#[must_use]
pub fn build_sorted_query(mut pairs: Vec<(String, String)>) -> String {
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                encode_query_component(k),
                encode_query_component(v)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Render signed headers as `name:value\n` lines.
///
/// Names are lowercased. Lines are ordered by name, then value. An empty
/// header list renders as the empty string.
///
/// # Errors
///
/// Returns [`SignerError::InvalidArgument`] for an empty header name, a name
/// containing `:`, whitespace or control characters, or a value containing a
/// line break.
pub fn build_canonical_headers(headers: &[(String, String)]) -> SignerResult<String> {
    let mut lines: Vec<(String, &str)> = Vec::with_capacity(headers.len());
    for (name, value) in headers {
        if name.is_empty()
            || name
                .chars()
                .any(|c| c == ':' || c.is_whitespace() || c.is_control())
        {
            return Err(SignerError::invalid(format!("invalid header name {name:?}")));
        }
        reject_line_breaks(name, value)?;
        lines.push((name.to_ascii_lowercase(), value.as_str()));
    }
    lines.sort();

    let mut result = String::new();
    for (name, value) in &lines {
        result.push_str(name);
        result.push(':');
        result.push_str(value);
        result.push('\n');
    }
    Ok(result)
}

fn require<'a>(value: Option<&'a str>, field: &str) -> SignerResult<&'a str> {
    value.ok_or_else(|| SignerError::missing(field))
}

fn reject_line_breaks(field: &str, value: &str) -> SignerResult<()> {
    if value.contains(['\n', '\r']) {
        return Err(SignerError::invalid(format!(
            "{field} must not contain line breaks"
        )));
    }
    Ok(())
}
