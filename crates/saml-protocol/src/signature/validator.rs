//! XML Signature validation.
//!
//! Provides functionality for validating enveloped signatures on SAML
//! documents. Validation never errors: any problem with the signature
//! makes the document unverified.

use std::collections::HashSet;

use base64::Engine;
use saml_crypto::{DigestAlgorithm, PemBlock, RsaAlgorithm};
use tracing::debug;
use x509_parser::prelude::{FromDer, SubjectPublicKeyInfo, X509Certificate};

use super::ENVELOPED_SIGNATURE;
use crate::{
    config::{Canonicalization, SamlConfig},
    error::{SamlError, SamlResult},
    types::{SAML_NS, XMLDSIG_NS},
    xml::{c14n::canonicalize_with_prefixes, NamespaceDecl, XmlNode},
};

/// XML signature validator.
///
/// Validates signatures on SAML documents against a single trusted key.
pub struct XmlSignatureValidator {
    /// RSA public key (PKCS#1 DER).
    public_key: Vec<u8>,
    /// Whether to allow SHA-1 signatures (deprecated but sometimes needed).
    allow_sha1: bool,
}

/// An element carrying an enveloped signature.
struct SignedElement<'a> {
    element: &'a XmlNode,
    /// Declarations in scope from the element's ancestors.
    scope: Vec<NamespaceDecl>,
    /// Position of `ds:Signature` among the element's children.
    position: usize,
}

impl XmlSignatureValidator {
    /// Creates a new validator with an RSA public key in PKCS#1 DER form.
    #[must_use]
    pub fn new(public_key: Vec<u8>) -> Self {
        Self {
            public_key,
            allow_sha1: false,
        }
    }

    /// Creates a validator from PEM key material.
    ///
    /// Accepts a certificate, a public key (SPKI or PKCS#1) or an RSA
    /// private key, whose public half is used.
    ///
    /// # Errors
    ///
    /// Returns `Crypto` if no usable key is found.
    pub fn from_pem(pem: &str) -> SamlResult<Self> {
        let block =
            PemBlock::parse(pem).ok_or_else(|| SamlError::Crypto("invalid PEM".to_string()))?;

        let public_key = match block.label.as_str() {
            "CERTIFICATE" => {
                let (_, cert) = X509Certificate::from_der(&block.der)
                    .map_err(|e| SamlError::Crypto(format!("invalid certificate: {e}")))?;
                cert.public_key().subject_public_key.data.to_vec()
            }
            "PUBLIC KEY" => {
                let (_, spki) = SubjectPublicKeyInfo::from_der(&block.der)
                    .map_err(|e| SamlError::Crypto(format!("invalid public key: {e}")))?;
                spki.subject_public_key.data.to_vec()
            }
            "RSA PUBLIC KEY" => block.der,
            "PRIVATE KEY" | "RSA PRIVATE KEY" => saml_crypto::rsa_public_key(&block.der)?,
            other => {
                return Err(SamlError::Crypto(format!("unsupported PEM block: {other}")));
            }
        };

        Ok(Self::new(public_key))
    }

    /// Sets whether to allow SHA-1 signatures.
    #[must_use]
    pub fn allow_sha1(mut self, allow: bool) -> Self {
        self.allow_sha1 = allow;
        self
    }

    /// Applies the validation settings from `config`.
    #[must_use]
    pub fn with_config(self, config: &SamlConfig) -> Self {
        self.allow_sha1(config.allow_sha1)
    }

    /// Verifies the enveloped signature on `node`.
    ///
    /// The signature is looked for on the root element, then on nested
    /// assertions. Returns false when there is none or it does not verify.
    #[must_use]
    pub fn verify(&self, node: &XmlNode) -> bool {
        match self.check(node) {
            Ok(()) => true,
            Err(reason) => {
                debug!(root = %node.clark_name(), %reason, "signature verification failed");
                false
            }
        }
    }

    fn check(&self, root: &XmlNode) -> Result<(), String> {
        let signed = locate(root, &mut Vec::new(), true).ok_or("no signature")?;
        let signature = &signed.element.children[signed.position];

        let mut ids = HashSet::new();
        if !unique_ids(root, &mut ids) {
            return Err("duplicate ID attributes".into());
        }

        let signed_info = signature
            .child(XMLDSIG_NS, "SignedInfo")
            .ok_or("missing SignedInfo")?;

        let c14n_method = signed_info
            .child(XMLDSIG_NS, "CanonicalizationMethod")
            .ok_or("missing CanonicalizationMethod")?;
        let c14n = c14n_method.attribute("Algorithm").unwrap_or("");
        Canonicalization::from_uri(c14n)
            .ok_or_else(|| format!("unsupported canonicalization {c14n}"))?;

        let method = algorithm_of(signed_info, "SignatureMethod")?;
        let algorithm = RsaAlgorithm::from_uri(method)
            .ok_or_else(|| format!("unsupported signature method {method}"))?;
        if algorithm.is_deprecated() && !self.allow_sha1 {
            return Err("SHA-1 signatures are not allowed".into());
        }

        let mut references = signed_info
            .children
            .iter()
            .filter(|c| c.is(XMLDSIG_NS, "Reference"));
        let reference = references.next().ok_or("missing Reference")?;
        if references.next().is_some() {
            return Err("more than one Reference".into());
        }
        let uri = reference.attribute("URI").unwrap_or("");
        check_reference(uri, signed.element, root)?;

        let mut inclusive = Vec::new();
        if let Some(transforms) = reference.child(XMLDSIG_NS, "Transforms") {
            for transform in &transforms.children {
                let uri = transform.attribute("Algorithm").unwrap_or("");
                if uri == ENVELOPED_SIGNATURE {
                    continue;
                }
                if Canonicalization::from_uri(uri).is_none() {
                    return Err(format!("unsupported transform {uri}"));
                }
                inclusive.extend(prefix_list(transform));
            }
        }

        let digest_uri = algorithm_of(reference, "DigestMethod")?;
        let digest_algorithm = DigestAlgorithm::from_uri(digest_uri)
            .ok_or_else(|| format!("unsupported digest method {digest_uri}"))?;
        if digest_algorithm == DigestAlgorithm::Sha1 && !self.allow_sha1 {
            return Err("SHA-1 digests are not allowed".into());
        }
        let expected_digest = base64_text(reference.child(XMLDSIG_NS, "DigestValue"))?;

        let mut unsigned = signed.element.clone();
        unsigned.remove_child(signed.position);
        let canonical = canonicalize_with_prefixes(&unsigned, &signed.scope, &inclusive);
        if saml_crypto::digest(digest_algorithm, canonical.as_bytes()) != expected_digest {
            return Err("digest mismatch".into());
        }

        let signature_value = base64_text(signature.child(XMLDSIG_NS, "SignatureValue"))?;
        let mut scope = signed.scope.clone();
        scope.extend(signed.element.namespaces.iter().cloned());
        scope.extend(signature.namespaces.iter().cloned());
        let canonical_signed_info =
            canonicalize_with_prefixes(signed_info, &scope, &prefix_list(c14n_method));

        if saml_crypto::rsa_verify(
            &self.public_key,
            canonical_signed_info.as_bytes(),
            &signature_value,
            algorithm,
        ) {
            Ok(())
        } else {
            Err("signature value does not verify".into())
        }
    }
}

/// Finds the first signed element: the root, then nested assertions in
/// document order.
fn locate<'a>(
    node: &'a XmlNode,
    scope: &mut Vec<NamespaceDecl>,
    is_root: bool,
) -> Option<SignedElement<'a>> {
    if is_root || node.is(SAML_NS, "Assertion") {
        if let Some(position) = node.child_position(XMLDSIG_NS, "Signature") {
            return Some(SignedElement {
                element: node,
                scope: scope.clone(),
                position,
            });
        }
    }

    let mark = scope.len();
    scope.extend(node.namespaces.iter().cloned());
    let found = node
        .children
        .iter()
        .find_map(|child| locate(child, scope, false));
    scope.truncate(mark);
    found
}

/// Records every `ID` under `node`, returning false on a repeat.
fn unique_ids<'a>(node: &'a XmlNode, seen: &mut HashSet<&'a str>) -> bool {
    if let Some(id) = node.attribute("ID") {
        if !seen.insert(id) {
            return false;
        }
    }
    node.children.iter().all(|child| unique_ids(child, seen))
}

/// The reference must cover exactly the element that carries the signature.
fn check_reference(uri: &str, signed: &XmlNode, root: &XmlNode) -> Result<(), String> {
    if uri.is_empty() {
        return if std::ptr::eq(signed, root) {
            Ok(())
        } else {
            Err("empty reference on a nested element".into())
        };
    }
    let id = uri
        .strip_prefix('#')
        .ok_or_else(|| format!("unsupported reference {uri}"))?;
    if signed.attribute("ID") == Some(id) {
        Ok(())
    } else {
        Err(format!("reference {uri} does not point at the signed element"))
    }
}

fn algorithm_of<'a>(parent: &'a XmlNode, name: &str) -> Result<&'a str, String> {
    parent
        .child(XMLDSIG_NS, name)
        .and_then(|method| method.attribute("Algorithm"))
        .ok_or_else(|| format!("missing {name}"))
}

/// Reads the `PrefixList` of an `InclusiveNamespaces` child of a
/// canonicalization method or transform.
fn prefix_list(method: &XmlNode) -> Vec<&str> {
    method
        .child(Canonicalization::ExclusiveC14n.uri(), "InclusiveNamespaces")
        .and_then(|inclusive| inclusive.attribute("PrefixList"))
        .map(|list| list.split_ascii_whitespace().collect())
        .unwrap_or_default()
}

fn base64_text(node: Option<&XmlNode>) -> Result<Vec<u8>, String> {
    let text = node.and_then(|n| n.text.as_deref()).unwrap_or("");
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| format!("invalid base64: {e}"))
}
