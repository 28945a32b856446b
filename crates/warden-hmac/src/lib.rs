//! HMAC request signing for the warden HMAC authentication scheme.
//!
//! This crate is the client side of a shared-secret authentication scheme. It
//! turns a URL, a secret and a set of options into either an `Authorization`
//! header value or a URL carrying the signature in its query string. A
//! verifier holding the same secret rebuilds the canonical representation
//! from the request it receives and recomputes the digest.
//!
//! # Overview
//!
//! ```text
//! URL + options ─► RequestInfo (path, date, sorted query)
//!               ─► CanonicalParams ─► canonical string
//!               ─► HMAC(secret, canonical string) ─► hex signature
//!               ─► header value or signed URL
//! ```
//!
//! # Usage
//!
//! ```rust
//! use warden_hmac::{SignOptions, Signer};
//!
//! let signer = Signer::with_algorithm("sha1").unwrap();
//! let options = SignOptions::new()
//!     .method("POST")
//!     .nonce("4f9c3d")
//!     .header("Content-Type", "application/json");
//!
//! let header = signer
//!     .sign_request("https://api.example.com/orders?page=2", "s3cr3t", &options)
//!     .unwrap();
//! assert!(header.starts_with("HMAC "));
//! ```
//!
//! # Modules
//!
//! - [`algorithm`] - Registered HMAC algorithms and digest computation
//! - [`canonical`] - Canonical representation of a request
//! - [`config`] - Environment and serde configuration
//! - [`date`] - Request date parsing and formatting
//! - [`error`] - Error types
//! - [`options`] - Default options, per-call overlays and header templates
//! - [`request_info`] - Path, date and sorted query of a request
//! - [`signer`] - The signing facade
//! - [`uri`] - URL and query-string helpers

pub mod algorithm;
pub mod canonical;
pub mod config;
pub mod date;
pub mod error;
pub mod options;
pub mod request_info;
pub mod signer;
pub mod uri;

pub use algorithm::{Algorithm, generate_signature};
pub use canonical::CanonicalParams;
pub use config::SignerConfig;
pub use date::SignDate;
pub use error::{SignerError, SignerResult};
pub use options::{HeaderFormat, PathPattern, SignOptions, SigningOptions};
pub use request_info::RequestInfo;
pub use signer::{SignedRequest, Signer};
