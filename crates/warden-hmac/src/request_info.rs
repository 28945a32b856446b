//! The signable facets of a single request.

use crate::canonical::build_sorted_query;
use crate::date::{self, SignDate};
use crate::error::SignerResult;
use crate::options::SigningOptions;
use crate::uri::ParsedUrl;

/// Path, date and sorted query of one request.
///
/// The date is resolved once, at construction: either the `date` option or
/// the current time.
///
/// # Examples
///
/// ```
/// use warden_hmac::{RequestInfo, SignOptions, SigningOptions};
///
/// let options = SigningOptions::default().merge(&SignOptions::new().date("15 01 2012 16:43:21"));
/// let info = RequestInfo::new("http://www.example.com/test?value=1&temp=2", &options).unwrap();
///
/// assert_eq!(info.path(), "/test");
/// assert_eq!(info.date(), "SUN, 15 01 2012 16:43:21 GMT");
/// assert_eq!(info.sorted_query(), "temp=2&value=1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    url: ParsedUrl,
    date: String,
}

impl RequestInfo {
    /// Parse `url` and resolve the request date from `options`.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::InvalidArgument`] if the URL is empty or not an
    /// absolute URL, or if the date option cannot be parsed.
    ///
    /// [`SignerError::InvalidArgument`]: crate::SignerError::InvalidArgument
    pub fn new(url: &str, options: &SigningOptions) -> SignerResult<Self> {
        Self::from_parsed(ParsedUrl::parse(url)?, options)
    }

    /// Build from an already parsed URL.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::InvalidArgument`] if the date option cannot be
    /// parsed.
    ///
    /// [`SignerError::InvalidArgument`]: crate::SignerError::InvalidArgument
    pub fn from_parsed(url: ParsedUrl, options: &SigningOptions) -> SignerResult<Self> {
        let date = options
            .date
            .as_ref()
            .map_or_else(|| Ok(date::now()), SignDate::to_signing_string)?;
        Ok(Self { url, date })
    }

    /// The path verbatim, or `""` for a bare host.
    #[must_use]
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// The date as `DOW, DD MM YYYY HH:MM:SS GMT`.
    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    /// All query pairs sorted by key, then value, re-encoded and joined with
    /// `&`.
    #[must_use]
    pub fn sorted_query(&self) -> String {
        build_sorted_query(self.url.query_pairs())
    }

    /// Like [`RequestInfo::sorted_query`], leaving out pairs whose key is in
    /// `names`.
    #[must_use]
    pub fn sorted_query_without(&self, names: &[&str]) -> String {
        let pairs = self
            .url
            .query_pairs()
            .into_iter()
            .filter(|(key, _)| !names.contains(&key.as_str()))
            .collect();
        build_sorted_query(pairs)
    }

    /// The parsed URL.
    #[must_use]
    pub fn url(&self) -> &ParsedUrl {
        &self.url
    }
}
