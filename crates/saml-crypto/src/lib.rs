//! # saml-crypto
//!
//! Cryptographic primitives backing XML-DSig for SAML messages, built on aws-lc-rs.
//!
//! The XML layer (canonicalization, `ds:Signature` assembly) lives in
//! `saml-protocol`; this crate only digests bytes and produces or checks
//! RSA PKCS#1 v1.5 signatures over them.
//!
//! ## Legacy algorithms
//!
//! SHA-1 is available for digesting and verification only, so documents
//! signed by older identity providers can still be checked when the caller
//! opts in. Signing with SHA-1 is refused.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod algorithm;
pub mod error;
pub mod hash;
pub mod pem;
pub mod rsa;

pub use algorithm::{DigestAlgorithm, RsaAlgorithm};
pub use error::CryptoError;
pub use hash::{digest, sha1, sha256, sha384, sha512};
pub use pem::{pem_to_der, PemBlock};
pub use rsa::{rsa_public_key, rsa_sign, rsa_verify};
