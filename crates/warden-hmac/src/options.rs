//! Signing options.
//!
//! [`SigningOptions`] is a complete, immutable set of options. A [`Signer`]
//! holds one as its defaults. Callers pass a [`SignOptions`] overlay per call;
//! [`SigningOptions::merge`] combines the two into a fresh value and never
//! touches the defaults.
//!
//! [`Signer`]: crate::Signer

use std::fmt;

use regex::Regex;

use crate::algorithm::Algorithm;
use crate::date::SignDate;
use crate::error::{SignerError, SignerResult};

/// Default authentication scheme name.
pub const DEFAULT_AUTH_SCHEME: &str = "HMAC";
/// Default query parameter that carries the signature.
pub const DEFAULT_AUTH_PARAM: &str = "auth";
/// Default header that carries the signature.
pub const DEFAULT_AUTH_HEADER: &str = "Authorization";
/// Default template for the authentication header value.
pub const DEFAULT_AUTH_HEADER_FORMAT: &str = "{auth_scheme} {signature}";
/// Default request method.
pub const DEFAULT_METHOD: &str = "GET";

/// A named substitution slot in a [`HeaderFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderSlot {
    /// `{auth_scheme}`
    AuthScheme,
    /// `{signature}`
    Signature,
}

impl HeaderSlot {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "auth_scheme" => Some(Self::AuthScheme),
            "signature" => Some(Self::Signature),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::AuthScheme => "auth_scheme",
            Self::Signature => "signature",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(HeaderSlot),
}

/// Template for the authentication header value.
///
/// Only `{auth_scheme}` and `{signature}` are recognized; any other slot is
/// rejected when the template is parsed.
///
/// # Examples
///
/// ```
/// use warden_hmac::options::HeaderFormat;
///
/// let format = HeaderFormat::parse("{auth_scheme} sig={signature}").unwrap();
/// assert_eq!(format.render("HMAC", "abc"), "HMAC sig=abc");
/// assert!(HeaderFormat::parse("{auth_scheme} {nonce}").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFormat {
    segments: Vec<Segment>,
}

impl HeaderFormat {
    /// Parse a template such as `"{auth_scheme} {signature}"`.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::InvalidArgument`] for unknown slots or
    /// unbalanced braces.
    pub fn parse(template: &str) -> SignerResult<Self> {
        let mut segments = Vec::new();
        let mut rest = template;

        while let Some(open) = rest.find(['{', '}']) {
            if rest[open..].starts_with('}') {
                return Err(SignerError::invalid(format!(
                    "unbalanced '}}' in header format {template:?}"
                )));
            }
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_owned()));
            }
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| {
                SignerError::invalid(format!("unclosed '{{' in header format {template:?}"))
            })?;
            let name = &after[..close];
            let slot = HeaderSlot::from_name(name).ok_or_else(|| {
                SignerError::invalid(format!(
                    "unknown slot {{{name}}} in header format {template:?}"
                ))
            })?;
            segments.push(Segment::Slot(slot));
            rest = &after[close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_owned()));
        }

        Ok(Self { segments })
    }

    /// Substitute the slots.
    #[must_use]
    pub fn render(&self, auth_scheme: &str, signature: &str) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(HeaderSlot::AuthScheme) => out.push_str(auth_scheme),
                Segment::Slot(HeaderSlot::Signature) => out.push_str(signature),
            }
        }
        out
    }
}

impl Default for HeaderFormat {
    fn default() -> Self {
        Self {
            segments: vec![
                Segment::Slot(HeaderSlot::AuthScheme),
                Segment::Literal(" ".to_owned()),
                Segment::Slot(HeaderSlot::Signature),
            ],
        }
    }
}

impl fmt::Display for HeaderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => f.write_str(text)?,
                Segment::Slot(slot) => write!(f, "{{{}}}", slot.name())?,
            }
        }
        Ok(())
    }
}

/// A path pattern for `extra_auth_paths`.
///
/// The pattern is a regular expression that must match the whole path.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Regex,
}

impl PathPattern {
    /// Compile a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::InvalidArgument`] if the regular expression does
    /// not compile.
    ///
    /// # Examples
    ///
    /// ```
    /// use warden_hmac::options::PathPattern;
    ///
    /// let pattern = PathPattern::new("/admin/.*").unwrap();
    /// assert!(pattern.matches("/admin/users"));
    /// assert!(!pattern.matches("/public/admin/users"));
    /// ```
    pub fn new(pattern: &str) -> SignerResult<Self> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|e| SignerError::invalid(format!("invalid path pattern {pattern:?}: {e}")))?;
        Ok(Self {
            source: pattern.to_owned(),
            regex,
        })
    }

    /// Whether the whole `path` matches.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// The pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for PathPattern {}

/// A per-call options overlay.
///
/// Unset fields fall through to the signer defaults. Headers are additive:
/// an overlay header replaces a header of the same name (case-insensitive)
/// and adds the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignOptions {
    /// HMAC algorithm.
    pub algorithm: Option<Algorithm>,
    /// Scheme name used in the header value.
    pub auth_scheme: Option<String>,
    /// Query parameter carrying the signature.
    pub auth_param: Option<String>,
    /// Header carrying the signature.
    pub auth_header: Option<String>,
    /// Header value template.
    pub auth_header_format: Option<HeaderFormat>,
    /// Header (or query parameter) carrying the nonce.
    pub nonce_header: Option<String>,
    /// Header (or query parameter) carrying the date when the alternate date
    /// header is in use.
    pub alternate_date_header: Option<String>,
    /// Whether the signature travels in the query string.
    pub query_based: Option<bool>,
    /// Whether the date travels under `alternate_date_header` instead of `Date`.
    pub use_alternate_date_header: Option<bool>,
    /// Path-specific overlays, replacing the defaults' list when set.
    pub extra_auth_paths: Option<Vec<(PathPattern, SignOptions)>>,
    /// HTTP method.
    pub method: Option<String>,
    /// Request nonce.
    pub nonce: Option<String>,
    /// Request date; the clock is used when unset.
    pub date: Option<SignDate>,
    /// Headers to sign.
    pub headers: Vec<(String, String)>,
}

impl SignOptions {
    /// An empty overlay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the algorithm.
    #[must_use]
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    /// Set the scheme name.
    #[must_use]
    pub fn auth_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.auth_scheme = Some(scheme.into());
        self
    }

    /// Set the signature query parameter.
    #[must_use]
    pub fn auth_param(mut self, param: impl Into<String>) -> Self {
        self.auth_param = Some(param.into());
        self
    }

    /// Set the signature header.
    #[must_use]
    pub fn auth_header(mut self, header: impl Into<String>) -> Self {
        self.auth_header = Some(header.into());
        self
    }

    /// Set the header value template.
    #[must_use]
    pub fn auth_header_format(mut self, format: HeaderFormat) -> Self {
        self.auth_header_format = Some(format);
        self
    }

    /// Set the nonce header name.
    #[must_use]
    pub fn nonce_header(mut self, header: impl Into<String>) -> Self {
        self.nonce_header = Some(header.into());
        self
    }

    /// Set the alternate date header name.
    #[must_use]
    pub fn alternate_date_header(mut self, header: impl Into<String>) -> Self {
        self.alternate_date_header = Some(header.into());
        self
    }

    /// Choose query-based or header-based signing.
    #[must_use]
    pub fn query_based(mut self, query_based: bool) -> Self {
        self.query_based = Some(query_based);
        self
    }

    /// Send the date under the alternate date header.
    #[must_use]
    pub fn use_alternate_date_header(mut self, enabled: bool) -> Self {
        self.use_alternate_date_header = Some(enabled);
        self
    }

    /// Add a path-specific overlay.
    #[must_use]
    pub fn extra_auth_path(mut self, pattern: PathPattern, overlay: SignOptions) -> Self {
        self.extra_auth_paths
            .get_or_insert_with(Vec::new)
            .push((pattern, overlay));
        self
    }

    /// Set the HTTP method.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Set the nonce.
    #[must_use]
    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Set the request date.
    #[must_use]
    pub fn date(mut self, date: impl Into<SignDate>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Add a header to sign.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A complete set of signing options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningOptions {
    /// HMAC algorithm.
    pub algorithm: Algorithm,
    /// Scheme name used in the header value.
    pub auth_scheme: String,
    /// Query parameter carrying the signature.
    pub auth_param: String,
    /// Header carrying the signature.
    pub auth_header: String,
    /// Header value template.
    pub auth_header_format: HeaderFormat,
    /// Header (or query parameter) carrying the nonce.
    pub nonce_header: String,
    /// Header (or query parameter) carrying the date when
    /// `use_alternate_date_header` is set.
    pub alternate_date_header: String,
    /// Whether the signature travels in the query string.
    pub query_based: bool,
    /// Whether the date travels under `alternate_date_header` instead of `Date`.
    pub use_alternate_date_header: bool,
    /// Path-specific overlays, consulted in order; the first match wins.
    pub extra_auth_paths: Vec<(PathPattern, SignOptions)>,
    /// HTTP method.
    pub method: String,
    /// Request nonce.
    pub nonce: Option<String>,
    /// Request date; the clock is used when unset.
    pub date: Option<SignDate>,
    /// Headers to sign.
    pub headers: Vec<(String, String)>,
}

impl Default for SigningOptions {
    fn default() -> Self {
        Self::with_scheme(DEFAULT_AUTH_SCHEME)
    }
}

impl SigningOptions {
    /// Defaults for the given scheme.
    ///
    /// The nonce and alternate date header names are derived from the scheme
    /// (`X-{scheme}-Nonce`, `X-{scheme}-Date`).
    ///
    /// # Examples
    ///
    /// ```
    /// use warden_hmac::SigningOptions;
    ///
    /// let options = SigningOptions::with_scheme("MyApp");
    /// assert_eq!(options.nonce_header, "X-MyApp-Nonce");
    /// assert_eq!(options.alternate_date_header, "X-MyApp-Date");
    /// assert!(options.query_based);
    /// ```
    #[must_use]
    pub fn with_scheme(scheme: &str) -> Self {
        Self {
            algorithm: Algorithm::default(),
            auth_scheme: scheme.to_owned(),
            auth_param: DEFAULT_AUTH_PARAM.to_owned(),
            auth_header: DEFAULT_AUTH_HEADER.to_owned(),
            auth_header_format: HeaderFormat::default(),
            nonce_header: scheme_header(scheme, "Nonce"),
            alternate_date_header: scheme_header(scheme, "Date"),
            query_based: true,
            use_alternate_date_header: false,
            extra_auth_paths: Vec::new(),
            method: DEFAULT_METHOD.to_owned(),
            nonce: None,
            date: None,
            headers: Vec::new(),
        }
    }

    /// Defaults for the scheme named in `overlay` (or `HMAC`), with the
    /// overlay merged on top.
    #[must_use]
    pub fn from_overlay(overlay: &SignOptions) -> Self {
        let scheme = overlay.auth_scheme.as_deref().unwrap_or(DEFAULT_AUTH_SCHEME);
        Self::with_scheme(scheme).merge(overlay)
    }

    /// Merge `overlay` over `self`, returning a new value.
    ///
    /// Every field set in the overlay wins. Headers are combined: overlay
    /// headers replace same-named headers and the rest are appended.
    #[must_use]
    pub fn merge(&self, overlay: &SignOptions) -> Self {
        let mut headers: Vec<(String, String)> = self
            .headers
            .iter()
            .filter(|(name, _)| {
                !overlay
                    .headers
                    .iter()
                    .any(|(other, _)| other.eq_ignore_ascii_case(name))
            })
            .cloned()
            .collect();
        headers.extend(overlay.headers.iter().cloned());

        Self {
            algorithm: overlay.algorithm.unwrap_or(self.algorithm),
            auth_scheme: pick(overlay.auth_scheme.as_deref(), &self.auth_scheme),
            auth_param: pick(overlay.auth_param.as_deref(), &self.auth_param),
            auth_header: pick(overlay.auth_header.as_deref(), &self.auth_header),
            auth_header_format: overlay
                .auth_header_format
                .clone()
                .unwrap_or_else(|| self.auth_header_format.clone()),
            nonce_header: pick(overlay.nonce_header.as_deref(), &self.nonce_header),
            alternate_date_header: pick(
                overlay.alternate_date_header.as_deref(),
                &self.alternate_date_header,
            ),
            query_based: overlay.query_based.unwrap_or(self.query_based),
            use_alternate_date_header: overlay
                .use_alternate_date_header
                .unwrap_or(self.use_alternate_date_header),
            extra_auth_paths: overlay
                .extra_auth_paths
                .clone()
                .unwrap_or_else(|| self.extra_auth_paths.clone()),
            method: pick(overlay.method.as_deref(), &self.method),
            nonce: overlay.nonce.clone().or_else(|| self.nonce.clone()),
            date: overlay.date.clone().or_else(|| self.date.clone()),
            headers,
        }
    }

    /// The first `extra_auth_paths` overlay whose pattern matches `path`.
    #[must_use]
    pub fn path_overlay(&self, path: &str) -> Option<&SignOptions> {
        self.extra_auth_paths
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map(|(_, overlay)| overlay)
    }
}

fn pick(overlay: Option<&str>, default: &str) -> String {
    overlay.unwrap_or(default).to_owned()
}

fn scheme_header(scheme: &str, suffix: &str) -> String {
    format!("X-{scheme}-{suffix}")
}
