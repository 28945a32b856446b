//! URL and query-string helpers.
//!
//! The signer needs the raw path exactly as the caller wrote it, the decoded
//! query pairs, and a way to rebuild the URL with extra query parameters. The
//! URL is validated with [`http::Uri`], but the facets are sliced out of the
//! original string so nothing gets normalized behind the caller's back.

use std::borrow::Cow;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::error::{SignerError, SignerResult};

/// Characters percent-encoded in query components the signer appends.
///
/// Everything except the RFC 3986 unreserved characters
/// (A-Z, a-z, 0-9, `-`, `_`, `.`, `~`).
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// An absolute URL split into the facets the signer works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    /// Everything before the query: scheme, authority and path.
    base: String,
    host: String,
    path: String,
    query: Option<String>,
    fragment: Option<String>,
}

impl ParsedUrl {
    /// Parse an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::InvalidArgument`] if the URL is empty, cannot be
    /// parsed, or lacks a scheme or host.
    ///
    /// # Examples
    ///
    /// ```
    /// use warden_hmac::uri::ParsedUrl;
    ///
    /// let url = ParsedUrl::parse("http://www.test.com/blog?key=value&test=true").unwrap();
    /// assert_eq!(url.host(), "www.test.com");
    /// assert_eq!(url.path(), "/blog");
    /// assert_eq!(url.raw_query(), Some("key=value&test=true"));
    /// ```
    pub fn parse(url: &str) -> SignerResult<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(SignerError::invalid("url must be given"));
        }

        let (without_fragment, fragment) = match url.split_once('#') {
            Some((head, fragment)) => (head, Some(fragment.to_owned())),
            None => (url, None),
        };

        let uri: http::Uri = without_fragment
            .parse()
            .map_err(|e| SignerError::invalid(format!("invalid url {url}: {e}")))?;
        let host = match (uri.scheme(), uri.host()) {
            (Some(_), Some(host)) if !host.is_empty() => host.to_owned(),
            _ => {
                return Err(SignerError::invalid(format!(
                    "url must be absolute (scheme and host): {url}"
                )));
            }
        };

        let (base, query) = match without_fragment.split_once('?') {
            Some((base, query)) => (base, Some(query.to_owned())),
            None => (without_fragment, None),
        };

        // The path starts at the first `/` after `scheme://`.
        let authority_start = base.find("://").map_or(0, |idx| idx + 3);
        let path = base[authority_start..]
            .find('/')
            .map_or("", |idx| &base[authority_start + idx..]);

        Ok(Self {
            base: base.to_owned(),
            host,
            path: path.to_owned(),
            query,
            fragment,
        })
    }

    /// Host name without port.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The path verbatim, or `""` when the URL has no path segment.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The raw query string without the leading `?`.
    #[must_use]
    pub fn raw_query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Decoded query pairs in the order they appear.
    ///
    /// Both `%XX` escapes and `+` are decoded. A parameter without `=` yields
    /// an empty value.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .as_deref()
            .map(|query| {
                form_urlencoded::parse(query.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Rebuild the URL, dropping query parameters whose decoded key is in
    /// `drop` and appending `append` (encoded) at the end of the query.
    ///
    /// Kept parameters are copied byte-for-byte. The fragment is preserved.
    ///
    /// # Examples
    ///
    /// ```
    /// use warden_hmac::uri::ParsedUrl;
    ///
    /// let url = ParsedUrl::parse("http://example.com/a?auth=old&x=1").unwrap();
    /// assert_eq!(
    ///     url.with_query_params(&["auth"], &[("auth", "new sig")]),
    ///     "http://example.com/a?x=1&auth=new%20sig"
    /// );
    /// ```
    #[must_use]
    pub fn with_query_params(&self, drop: &[&str], append: &[(&str, &str)]) -> String {
        let kept = self
            .query
            .as_deref()
            .unwrap_or("")
            .split('&')
            .filter(|segment| !segment.is_empty())
            .filter(|segment| {
                let key = decoded_key(segment);
                !drop.contains(&key.as_ref())
            })
            .map(Cow::Borrowed);
        let appended = append.iter().map(|(k, v)| {
            Cow::Owned(format!(
                "{}={}",
                encode_query_component(k),
                encode_query_component(v)
            ))
        });
        let query = kept.chain(appended).collect::<Vec<_>>().join("&");

        let mut url = self.base.clone();
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        if let Some(fragment) = &self.fragment {
            url.push('#');
            url.push_str(fragment);
        }
        url
    }
}

/// Percent-encode a single query key or value.
#[must_use]
pub fn encode_query_component(input: &str) -> String {
    utf8_percent_encode(input, QUERY_ENCODE_SET).to_string()
}

/// Decode the key of a raw `key=value` query segment.
fn decoded_key(segment: &str) -> Cow<'_, str> {
    let raw = segment.split_once('=').map_or(segment, |(k, _)| k);
    form_urlencoded::parse(raw.as_bytes())
        .next()
        .map_or(Cow::Borrowed(raw), |(k, _)| Cow::Owned(k.into_owned()))
}
