//! XML Signature creation.
//!
//! Provides functionality for signing SAML documents using XML-DSig.

use base64::Engine;
use saml_crypto::{PemBlock, RsaAlgorithm};
use tracing::debug;

use super::{ds, signature_index, DS_PREFIX, ENVELOPED_SIGNATURE};
use crate::{
    config::SignatureConfig,
    error::{SamlError, SamlResult},
    schema::Element,
    types::XMLDSIG_NS,
    xml::{c14n::canonicalize, NamespaceDecl, XmlNode},
};

/// XML document signer.
///
/// Signs SAML documents using the configured private key.
pub struct XmlSigner {
    /// The private key in DER format (PKCS#8 or PKCS#1).
    private_key_der: Vec<u8>,
    /// The X.509 certificate in DER format (optional).
    certificate_der: Option<Vec<u8>>,
    /// Signature configuration.
    config: SignatureConfig,
}

impl XmlSigner {
    /// Creates a new signer with an RSA private key.
    ///
    /// # Errors
    ///
    /// Returns `Crypto` if the key is not an RSA private key.
    pub fn new(private_key_der: Vec<u8>, certificate_der: Option<Vec<u8>>) -> SamlResult<Self> {
        saml_crypto::rsa_public_key(&private_key_der)?;
        Ok(Self {
            private_key_der,
            certificate_der,
            config: SignatureConfig::default(),
        })
    }

    /// Creates a new signer from a PEM-encoded private key.
    ///
    /// Encrypted keys are not supported; a password given for an
    /// unencrypted key is ignored.
    ///
    /// # Errors
    ///
    /// Returns `Crypto` for missing, encrypted or non-RSA keys.
    pub fn from_pem(private_key_pem: &str, password: Option<&str>) -> SamlResult<Self> {
        let block = PemBlock::parse(private_key_pem)
            .ok_or_else(|| SamlError::Crypto("invalid private key PEM".to_string()))?;

        match block.label.as_str() {
            "PRIVATE KEY" | "RSA PRIVATE KEY" if !private_key_pem.contains("ENCRYPTED") => {}
            "ENCRYPTED PRIVATE KEY" | "PRIVATE KEY" | "RSA PRIVATE KEY" => {
                return Err(SamlError::Crypto(
                    "encrypted private keys are not supported".to_string(),
                ))
            }
            other => {
                return Err(SamlError::Crypto(format!(
                    "expected a private key, found {other}"
                )))
            }
        }
        if password.is_some() {
            debug!("ignoring password for an unencrypted private key");
        }

        Self::new(block.der, None)
    }

    /// Embeds a PEM certificate in `ds:KeyInfo`.
    ///
    /// # Errors
    ///
    /// Returns `Crypto` if the PEM holds no certificate.
    pub fn with_certificate_pem(mut self, certificate_pem: &str) -> SamlResult<Self> {
        let der = saml_crypto::pem_to_der(certificate_pem, "CERTIFICATE")
            .ok_or_else(|| SamlError::Crypto("invalid certificate PEM".to_string()))?;
        self.certificate_der = Some(der);
        Ok(self)
    }

    /// Sets the signature configuration.
    #[must_use]
    pub fn with_config(mut self, config: SignatureConfig) -> Self {
        self.config = config;
        self
    }

    /// Signs `node` in place.
    ///
    /// The reference covers the whole element (`#ID`, or `""` when the
    /// element has no `ID`) and the `ds:Signature` is inserted at the
    /// position its element type declares.
    ///
    /// # Errors
    ///
    /// Returns `SignatureCreation` for SHA-1 or if RSA signing fails.
    pub fn sign(&self, node: &mut XmlNode) -> SamlResult<()> {
        let algorithm = self.config.algorithm;
        if algorithm.is_deprecated() {
            return Err(SamlError::SignatureCreation(
                "SHA-1 signatures are verification only".to_string(),
            ));
        }

        let reference = node
            .attribute("ID")
            .map_or_else(String::new, |id| format!("#{id}"));

        let canonical = canonicalize(node, &[]);
        let digest = saml_crypto::digest(algorithm.digest(), canonical.as_bytes());
        let digest_b64 = base64::engine::general_purpose::STANDARD.encode(digest);

        let signed_info = self.build_signed_info(&reference, &digest_b64, algorithm);
        let ds_scope: [NamespaceDecl; 1] = [(Some(DS_PREFIX.to_string()), XMLDSIG_NS.to_string())];
        let canonical_signed_info = canonicalize(&signed_info, &ds_scope);

        let signature_value =
            saml_crypto::rsa_sign(&self.private_key_der, canonical_signed_info.as_bytes(), algorithm)
                .map_err(|e| SamlError::SignatureCreation(format!("RSA signing failed: {e}")))?;
        let signature_b64 = base64::engine::general_purpose::STANDARD.encode(signature_value);

        let signature = self.build_signature(signed_info, signature_b64);
        let index = signature_index(node);
        node.children.insert(index, signature);
        Ok(())
    }

    /// Serializes `element` and returns the signed tree.
    ///
    /// # Errors
    ///
    /// See [`XmlSigner::sign`].
    pub fn sign_element(&self, element: &mut Element) -> SamlResult<XmlNode> {
        let mut node = element.serialize();
        self.sign(&mut node)?;
        Ok(node)
    }

    fn build_signed_info(&self, reference: &str, digest_b64: &str, algorithm: RsaAlgorithm) -> XmlNode {
        let c14n = self.config.canonicalization.uri();

        let mut canonicalization = ds("CanonicalizationMethod");
        canonicalization.set_attribute("Algorithm", c14n);

        let mut method = ds("SignatureMethod");
        method.set_attribute("Algorithm", algorithm.xml_dsig_uri());

        let mut enveloped = ds("Transform");
        enveloped.set_attribute("Algorithm", ENVELOPED_SIGNATURE);
        let mut exclusive = ds("Transform");
        exclusive.set_attribute("Algorithm", c14n);
        let mut transforms = ds("Transforms");
        transforms.children = vec![enveloped, exclusive];

        let mut digest_method = ds("DigestMethod");
        digest_method.set_attribute("Algorithm", algorithm.digest().xml_dsig_uri());
        let mut digest_value = ds("DigestValue");
        digest_value.text = Some(digest_b64.to_string());

        let mut reference_node = ds("Reference");
        reference_node.set_attribute("URI", reference);
        reference_node.children = vec![transforms, digest_method, digest_value];

        let mut signed_info = ds("SignedInfo");
        signed_info.children = vec![canonicalization, method, reference_node];
        signed_info
    }

    fn build_signature(&self, signed_info: XmlNode, signature_b64: String) -> XmlNode {
        let mut signature = ds("Signature");
        signature.declare_namespace(Some(DS_PREFIX), XMLDSIG_NS);

        let mut value = ds("SignatureValue");
        value.text = Some(signature_b64);
        signature.children = vec![signed_info, value];

        if self.config.include_certificate {
            if let Some(cert) = &self.certificate_der {
                let mut certificate = ds("X509Certificate");
                certificate.text = Some(base64::engine::general_purpose::STANDARD.encode(cert));
                let mut x509_data = ds("X509Data");
                x509_data.children.push(certificate);
                let mut key_info = ds("KeyInfo");
                key_info.children.push(x509_data);
                signature.children.push(key_info);
            }
        }
        signature
    }
}
