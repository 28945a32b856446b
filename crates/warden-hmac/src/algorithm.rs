//! HMAC digest computation.
//!
//! The signature is `hex(HMAC(secret, canonical_representation))` using one of
//! the registered [`Algorithm`]s. The secret is only ever the HMAC key; it is
//! never part of the signed text.

use std::fmt;
use std::str::FromStr;

use digest::KeyInit;
use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;
use sha2::Sha256;
use tracing::debug;

use crate::canonical::CanonicalParams;
use crate::error::{SignerError, SignerResult};

/// A registered HMAC variant.
///
/// Parsing an unknown name fails with [`SignerError::UnsupportedAlgorithm`];
/// there is no fallback.
///
/// # Examples
///
/// ```
/// use warden_hmac::{Algorithm, SignerError};
///
/// assert_eq!("SHA1".parse::<Algorithm>(), Ok(Algorithm::Sha1));
/// assert_eq!(
///     "sha512".parse::<Algorithm>(),
///     Err(SignerError::UnsupportedAlgorithm("sha512".to_owned()))
/// );
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// HMAC-SHA1, the scheme's default.
    #[default]
    Sha1,
    /// HMAC-MD5.
    Md5,
    /// HMAC-SHA256.
    Sha256,
}

impl Algorithm {
    /// Every registered algorithm.
    pub const ALL: [Self; 3] = [Self::Sha1, Self::Md5, Self::Sha256];

    /// The configuration name (`sha1`, `md5`, `sha256`).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
        }
    }

    /// Length of the hex-encoded signature.
    #[must_use]
    pub fn hex_len(self) -> usize {
        match self {
            Self::Sha1 => 40,
            Self::Md5 => 32,
            Self::Sha256 => 64,
        }
    }
}

impl FromStr for Algorithm {
    type Err = SignerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SignerError::UnsupportedAlgorithm(s.to_owned()))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sign the canonical representation of `params` with `secret`.
///
/// # Errors
///
/// - [`SignerError::InvalidArgument`] if `secret` is `None` or a canonical
///   field is missing or malformed.
/// - [`SignerError::InvalidKey`] if the secret is empty.
pub fn generate_signature(
    algorithm: Algorithm,
    secret: Option<&str>,
    params: &CanonicalParams,
) -> SignerResult<String> {
    let secret = secret.ok_or_else(|| SignerError::missing("secret"))?;
    let canonical = params.canonical_representation()?;

    debug!(%algorithm, canonical = ?canonical, "Built canonical representation");

    hash_hmac(algorithm, secret, &canonical)
}

/// Compute `hex(HMAC(secret, message))`.
///
/// # Errors
///
/// Returns [`SignerError::InvalidKey`] if the secret is empty.
///
/// # Examples
///
/// ```
/// use warden_hmac::{Algorithm, algorithm::hash_hmac};
///
/// // RFC 2202 test case 2.
/// assert_eq!(
///     hash_hmac(Algorithm::Sha1, "Jefe", "what do ya want for nothing?").unwrap(),
///     "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79"
/// );
/// ```
pub fn hash_hmac(algorithm: Algorithm, secret: &str, message: &str) -> SignerResult<String> {
    if secret.is_empty() {
        return Err(SignerError::InvalidKey);
    }

    let key = secret.as_bytes();
    let message = message.as_bytes();
    let tag = match algorithm {
        Algorithm::Sha1 => compute_mac::<Hmac<Sha1>>(key, message)?,
        Algorithm::Md5 => compute_mac::<Hmac<Md5>>(key, message)?,
        Algorithm::Sha256 => compute_mac::<Hmac<Sha256>>(key, message)?,
    };

    Ok(hex::encode(tag))
}

fn compute_mac<M: Mac + KeyInit>(key: &[u8], message: &[u8]) -> SignerResult<Vec<u8>> {
    let mut mac = <M as KeyInit>::new_from_slice(key).map_err(|_| SignerError::InvalidKey)?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}
