//! Request signing.
//!
//! A [`Signer`] holds immutable default options. Each call merges the caller's
//! [`SignOptions`] over those defaults, applies the first matching
//! `extra_auth_paths` overlay, and then:
//!
//! 1. Builds the [`RequestInfo`] (path, date, sorted query)
//! 2. Assembles the [`CanonicalParams`]
//! 3. Computes the HMAC signature
//! 4. Places the signature in a header value or in the query string
//!
//! In query-based signing, the parameters the signer itself writes
//! (`auth_param`, `nonce_header`, `alternate_date_header`) are left out of the
//! signed query. Header-based signing signs every query parameter.

use http::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::algorithm::{Algorithm, generate_signature};
use crate::canonical::CanonicalParams;
use crate::config::SignerConfig;
use crate::error::{SignerError, SignerResult};
use crate::options::{SignOptions, SigningOptions};
use crate::request_info::RequestInfo;
use crate::uri::ParsedUrl;

/// The result of [`Signer::sign`].
#[derive(Debug, Clone)]
pub struct SignedRequest {
    /// The URL to request. Carries the signature when signing is query based.
    pub url: String,
    /// Headers to send: the signed headers plus any authentication headers.
    pub headers: HeaderMap,
    /// The hex signature.
    pub signature: String,
    /// The signed date.
    pub date: String,
}

/// Signs URLs and requests with a shared secret.
///
/// # Examples
///
/// ```
/// use warden_hmac::{SignOptions, Signer};
///
/// let signer = Signer::default();
/// let options = SignOptions::new().date("15 01 2012 16:43:21").nonce("abc");
///
/// let header = signer
///     .sign_request("http://example.com/api?b=2&a=1", "secret", &options)
///     .unwrap();
/// assert!(header.starts_with("HMAC "));
///
/// let url = signer
///     .sign_url("http://example.com/api?b=2&a=1", "secret", &options)
///     .unwrap();
/// assert!(url.starts_with("http://example.com/api?b=2&a=1&auth="));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Signer {
    defaults: SigningOptions,
}

/// Effective options, request facets and signature for one call.
struct Prepared {
    options: SigningOptions,
    info: RequestInfo,
    signature: String,
}

impl Prepared {
    fn reserved_params(&self) -> [&str; 3] {
        reserved_params(&self.options)
    }
}

impl Signer {
    /// Create a signer with the given defaults.
    #[must_use]
    pub fn new(defaults: SigningOptions) -> Self {
        Self { defaults }
    }

    /// Create a signer for the named algorithm with stock defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::UnsupportedAlgorithm`] for an unregistered name.
    pub fn with_algorithm(algorithm: &str) -> SignerResult<Self> {
        Self::with_options(algorithm, &SignOptions::new())
    }

    /// Create a signer for the named algorithm, with `options` merged over the
    /// stock defaults. The nonce and alternate date header names are derived
    /// from `options.auth_scheme` when it is set.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::UnsupportedAlgorithm`] for an unregistered name.
    pub fn with_options(algorithm: &str, options: &SignOptions) -> SignerResult<Self> {
        let algorithm: Algorithm = algorithm.parse()?;
        let mut defaults = SigningOptions::from_overlay(options);
        defaults.algorithm = algorithm;
        Ok(Self::new(defaults))
    }

    /// Create a signer from configuration.
    ///
    /// # Errors
    ///
    /// See [`SignerConfig::to_options`].
    pub fn from_config(config: &SignerConfig) -> SignerResult<Self> {
        config.to_options().map(Self::new)
    }

    /// The defaults fixed at construction.
    #[must_use]
    pub fn defaults(&self) -> &SigningOptions {
        &self.defaults
    }

    /// The options a call to [`Signer::sign_request`] would use for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::InvalidArgument`] if the URL cannot be parsed.
    pub fn effective_options(
        &self,
        url: &str,
        options: &SignOptions,
    ) -> SignerResult<SigningOptions> {
        let parsed = ParsedUrl::parse(url)?;
        Ok(self.merge_for_path(&parsed, options, false))
    }

    /// The options a call to [`Signer::sign_url`] would use for `url`.
    /// `query_based` is always `true` here.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::InvalidArgument`] if the URL cannot be parsed.
    pub fn effective_url_options(
        &self,
        url: &str,
        options: &SignOptions,
    ) -> SignerResult<SigningOptions> {
        let parsed = ParsedUrl::parse(url)?;
        Ok(self.merge_for_path(&parsed, options, true))
    }

    /// Sign a request and return the authentication header value.
    ///
    /// The caller places the value under the header named by `auth_header`.
    ///
    /// # Errors
    ///
    /// - [`SignerError::InvalidArgument`] for a bad URL, date, or signed header
    /// - [`SignerError::InvalidKey`] for an empty secret
    pub fn sign_request(
        &self,
        url: &str,
        secret: &str,
        options: &SignOptions,
    ) -> SignerResult<String> {
        let prepared = self.prepare(url, secret, options, false)?;
        Ok(prepared
            .options
            .auth_header_format
            .render(&prepared.options.auth_scheme, &prepared.signature))
    }

    /// Sign a URL, embedding the signature in its query string.
    ///
    /// `query_based` is always on for this call, whatever the defaults or
    /// `options` say. With `use_alternate_date_header` set, the nonce (if any)
    /// and date are appended as well, under `nonce_header` and
    /// `alternate_date_header`.
    ///
    /// # Errors
    ///
    /// See [`Signer::sign_request`].
    pub fn sign_url(
        &self,
        url: &str,
        secret: &str,
        options: &SignOptions,
    ) -> SignerResult<String> {
        let prepared = self.prepare(url, secret, options, true)?;
        Ok(signed_url(&prepared))
    }

    /// Sign a request and return everything needed to send it.
    ///
    /// When the effective options are query based, the returned URL carries
    /// the signature. Otherwise the URL is returned unchanged and the headers
    /// carry the signature in `auth_header`. The nonce and date travel in
    /// headers (`nonce_header`, and `Date` or `alternate_date_header`) unless
    /// both `query_based` and `use_alternate_date_header` are set, in which
    /// case they go in the query string.
    ///
    /// # Errors
    ///
    /// See [`Signer::sign_request`].
    pub fn sign(
        &self,
        url: &str,
        secret: &str,
        options: &SignOptions,
    ) -> SignerResult<SignedRequest> {
        let prepared = self.prepare(url, secret, options, false)?;
        let opts = &prepared.options;

        let mut headers = HeaderMap::new();
        for (name, value) in &opts.headers {
            append_header(&mut headers, name, value)?;
        }

        let url = if opts.query_based {
            signed_url(&prepared)
        } else {
            let value = opts
                .auth_header_format
                .render(&opts.auth_scheme, &prepared.signature);
            append_header(&mut headers, &opts.auth_header, &value)?;
            url.trim().to_owned()
        };

        if !(opts.query_based && opts.use_alternate_date_header) {
            if let Some(nonce) = &opts.nonce {
                append_header(&mut headers, &opts.nonce_header, nonce)?;
            }
            let date_header = if opts.use_alternate_date_header {
                opts.alternate_date_header.as_str()
            } else {
                http::header::DATE.as_str()
            };
            append_header(&mut headers, date_header, prepared.info.date())?;
        }

        Ok(SignedRequest {
            url,
            headers,
            signature: prepared.signature,
            date: prepared.info.date().to_owned(),
        })
    }

    /// Merge defaults, caller options and the matching path overlay, in that
    /// order.
    fn merge_for_path(
        &self,
        url: &ParsedUrl,
        options: &SignOptions,
        force_query: bool,
    ) -> SigningOptions {
        let mut merged = self.defaults.merge(options);
        if let Some(overlay) = merged.path_overlay(url.path()).cloned() {
            debug!(path = %url.path(), "Applying extra auth path overlay");
            merged = merged.merge(&overlay);
        }
        if force_query {
            merged.query_based = true;
        }
        merged
    }

    fn prepare(
        &self,
        url: &str,
        secret: &str,
        options: &SignOptions,
        force_query: bool,
    ) -> SignerResult<Prepared> {
        let parsed = ParsedUrl::parse(url)?;
        let merged = self.merge_for_path(&parsed, options, force_query);
        let info = RequestInfo::from_parsed(parsed, &merged)?;

        let query = if merged.query_based {
            info.sorted_query_without(&reserved_params(&merged))
        } else {
            info.sorted_query()
        };
        let params = CanonicalParams::new()
            .method(merged.method.as_str())
            .date(info.date())
            .nonce(merged.nonce.clone().unwrap_or_default())
            .headers(merged.headers.iter().cloned())
            .path(info.path())
            .query(query);

        debug!(
            algorithm = %merged.algorithm,
            method = %merged.method,
            path = %info.path(),
            query_based = merged.query_based,
            "Signing request"
        );

        let signature = generate_signature(merged.algorithm, Some(secret), &params)?;

        Ok(Prepared {
            options: merged,
            info,
            signature,
        })
    }
}

fn reserved_params(options: &SigningOptions) -> [&str; 3] {
    [
        options.auth_param.as_str(),
        options.nonce_header.as_str(),
        options.alternate_date_header.as_str(),
    ]
}

fn signed_url(prepared: &Prepared) -> String {
    let opts = &prepared.options;
    let mut append: Vec<(&str, &str)> =
        vec![(opts.auth_param.as_str(), prepared.signature.as_str())];
    if opts.use_alternate_date_header {
        if let Some(nonce) = &opts.nonce {
            append.push((opts.nonce_header.as_str(), nonce.as_str()));
        }
        append.push((opts.alternate_date_header.as_str(), prepared.info.date()));
    }
    prepared
        .info
        .url()
        .with_query_params(&prepared.reserved_params(), &append)
}

fn append_header(headers: &mut HeaderMap, name: &str, value: &str) -> SignerResult<()> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| SignerError::invalid(format!("invalid header name {name:?}")))?;
    let value = HeaderValue::from_str(value)
        .map_err(|_| SignerError::invalid(format!("invalid value for header {name}")))?;
    headers.append(name, value);
    Ok(())
}
