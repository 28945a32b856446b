//! Signer configuration.
//!
//! Configuration can come from environment variables or from any serde
//! format. It is validated when converted into [`SigningOptions`].

use crate::algorithm::Algorithm;
use crate::error::SignerResult;
use crate::options::{
    DEFAULT_AUTH_HEADER, DEFAULT_AUTH_HEADER_FORMAT, DEFAULT_AUTH_PARAM, DEFAULT_AUTH_SCHEME,
    HeaderFormat, SigningOptions,
};

/// Plain configuration for a [`Signer`](crate::Signer).
///
/// `extra_auth_paths` has no textual form here; add path overlays with
/// [`SignOptions::extra_auth_path`](crate::SignOptions::extra_auth_path).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SignerConfig {
    /// Algorithm name (`sha1`, `md5`, `sha256`).
    pub algorithm: String,
    /// Scheme name.
    pub auth_scheme: String,
    /// Signature query parameter.
    pub auth_param: String,
    /// Signature header.
    pub auth_header: String,
    /// Header value template.
    pub auth_header_format: String,
    /// Nonce header; derived from the scheme when unset.
    pub nonce_header: Option<String>,
    /// Alternate date header; derived from the scheme when unset.
    pub alternate_date_header: Option<String>,
    /// Whether the signature travels in the query string.
    pub query_based: bool,
    /// Whether the date travels under the alternate date header.
    pub use_alternate_date_header: bool,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default().name().to_owned(),
            auth_scheme: DEFAULT_AUTH_SCHEME.to_owned(),
            auth_param: DEFAULT_AUTH_PARAM.to_owned(),
            auth_header: DEFAULT_AUTH_HEADER.to_owned(),
            auth_header_format: DEFAULT_AUTH_HEADER_FORMAT.to_owned(),
            nonce_header: None,
            alternate_date_header: None,
            query_based: true,
            use_alternate_date_header: false,
        }
    }
}

impl SignerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `HMAC_ALGORITHM` | `algorithm` |
    /// | `HMAC_AUTH_SCHEME` | `auth_scheme` |
    /// | `HMAC_AUTH_PARAM` | `auth_param` |
    /// | `HMAC_AUTH_HEADER` | `auth_header` |
    /// | `HMAC_AUTH_HEADER_FORMAT` | `auth_header_format` |
    /// | `HMAC_NONCE_HEADER` | `nonce_header` |
    /// | `HMAC_ALTERNATE_DATE_HEADER` | `alternate_date_header` |
    /// | `HMAC_QUERY_BASED` | `query_based` |
    /// | `HMAC_USE_ALTERNATE_DATE_HEADER` | `use_alternate_date_header` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("HMAC_ALGORITHM") {
            config.algorithm = v;
        }
        if let Some(v) = lookup("HMAC_AUTH_SCHEME") {
            config.auth_scheme = v;
        }
        if let Some(v) = lookup("HMAC_AUTH_PARAM") {
            config.auth_param = v;
        }
        if let Some(v) = lookup("HMAC_AUTH_HEADER") {
            config.auth_header = v;
        }
        if let Some(v) = lookup("HMAC_AUTH_HEADER_FORMAT") {
            config.auth_header_format = v;
        }
        if let Some(v) = lookup("HMAC_NONCE_HEADER") {
            config.nonce_header = Some(v);
        }
        if let Some(v) = lookup("HMAC_ALTERNATE_DATE_HEADER") {
            config.alternate_date_header = Some(v);
        }
        if let Some(v) = lookup("HMAC_QUERY_BASED") {
            config.query_based = parse_flag(&v);
        }
        if let Some(v) = lookup("HMAC_USE_ALTERNATE_DATE_HEADER") {
            config.use_alternate_date_header = parse_flag(&v);
        }

        config
    }

    /// Validate the configuration and build signer defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::UnsupportedAlgorithm`] for an unknown algorithm
    /// or [`SignerError::InvalidArgument`] for a bad header template.
    ///
    /// [`SignerError::UnsupportedAlgorithm`]: crate::SignerError::UnsupportedAlgorithm
    /// [`SignerError::InvalidArgument`]: crate::SignerError::InvalidArgument
    pub fn to_options(&self) -> SignerResult<SigningOptions> {
        let mut options = SigningOptions::with_scheme(&self.auth_scheme);
        options.algorithm = self.algorithm.parse()?;
        options.auth_param.clone_from(&self.auth_param);
        options.auth_header.clone_from(&self.auth_header);
        options.auth_header_format = HeaderFormat::parse(&self.auth_header_format)?;
        if let Some(header) = &self.nonce_header {
            options.nonce_header.clone_from(header);
        }
        if let Some(header) = &self.alternate_date_header {
            options.alternate_date_header.clone_from(header);
        }
        options.query_based = self.query_based;
        options.use_alternate_date_header = self.use_alternate_date_header;
        Ok(options)
    }
}

fn parse_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
