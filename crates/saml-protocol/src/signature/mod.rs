//! XML Signature support for SAML.
//!
//! This module provides enveloped XML Digital Signature (XML-DSig) support
//! for signing and validating SAML messages and assertions.
//!
//! # Signing Algorithms
//!
//! The following signature algorithms are supported:
//! - RSA-SHA256 (recommended)
//! - RSA-SHA384
//! - RSA-SHA512
//!
//! Legacy RSA-SHA1 signatures can be verified when explicitly allowed but
//! are never produced.

mod signer;
mod validator;

pub use signer::*;
pub use validator::*;

use crate::{
    error::SamlResult,
    schema::registry,
    types::XMLDSIG_NS,
    xml::XmlNode,
};

/// Conventional prefix for the XML-DSig namespace.
pub const DS_PREFIX: &str = "ds";

/// Enveloped signature transform URI.
pub const ENVELOPED_SIGNATURE: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";

/// Signature position used for roots with no registered type.
const DEFAULT_SIGNATURE_INDEX: usize = 1;

/// Creates an empty element in the XML-DSig namespace.
fn ds(name: &str) -> XmlNode {
    XmlNode::new(Some(XMLDSIG_NS), Some(DS_PREFIX), name)
}

/// Returns where an enveloped signature goes among `node`'s children.
///
/// The position comes from the root's registered element type and is
/// clamped to the number of children.
#[must_use]
pub fn signature_index(node: &XmlNode) -> usize {
    registry::resolve(&node.clark_name())
        .map_or(DEFAULT_SIGNATURE_INDEX, |ty| ty.signature_index)
        .min(node.children.len())
}

/// Signs `node` in place with a PEM private key.
///
/// # Errors
///
/// Returns `Crypto` for unusable key material and `SignatureCreation` if
/// signing fails.
pub fn sign(node: &mut XmlNode, private_key_pem: &str, password: Option<&str>) -> SamlResult<()> {
    XmlSigner::from_pem(private_key_pem, password)?.sign(node)
}

/// Verifies the signature on `node` with PEM key material.
///
/// Returns `Ok(false)` for unsigned or tampered documents.
///
/// # Errors
///
/// Returns `Crypto` only when the key material cannot be loaded.
pub fn verify(node: &XmlNode, key_pem: &str) -> SamlResult<bool> {
    Ok(XmlSignatureValidator::from_pem(key_pem)?.verify(node))
}
