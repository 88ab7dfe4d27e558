//! SAML engine configuration.

use saml_crypto::RsaAlgorithm;
use serde::{Deserialize, Serialize};

use crate::{
    error::{SamlError, SamlResult},
    types::SamlBinding,
};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamlConfig {
    /// Signature creation settings.
    #[serde(default)]
    pub signature: SignatureConfig,

    /// Transport binding settings.
    #[serde(default)]
    pub binding: BindingConfig,

    /// Accept RSA-SHA1 signatures when verifying.
    #[serde(default)]
    pub allow_sha1: bool,
}

impl SamlConfig {
    /// Parses a configuration from JSON; missing sections take defaults.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the document does not deserialize.
    pub fn from_json(json: &str) -> SamlResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| SamlError::Config(format!("failed to parse config: {e}")))
    }
}

/// Canonicalization methods understood by the signature adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Canonicalization {
    /// Exclusive XML canonicalization without comments.
    #[default]
    ExclusiveC14n,
}

impl Canonicalization {
    /// Returns the XML-DSig algorithm URI.
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::ExclusiveC14n => "http://www.w3.org/2001/10/xml-exc-c14n#",
        }
    }

    /// Parses a canonicalization method from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        (uri == Self::ExclusiveC14n.uri()).then_some(Self::ExclusiveC14n)
    }
}

/// Configuration for signature creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureConfig {
    /// The signature algorithm to use.
    #[serde(default)]
    pub algorithm: RsaAlgorithm,
    /// The canonicalization method to use.
    #[serde(default)]
    pub canonicalization: Canonicalization,
    /// Whether to embed the signer's certificate in `ds:KeyInfo`.
    #[serde(default = "default_true")]
    pub include_certificate: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            algorithm: RsaAlgorithm::Sha256,
            canonicalization: Canonicalization::ExclusiveC14n,
            include_certificate: true,
        }
    }
}

impl SignatureConfig {
    /// Creates a configuration with the given algorithm.
    #[must_use]
    pub fn with_algorithm(algorithm: RsaAlgorithm) -> Self {
        Self {
            algorithm,
            ..Self::default()
        }
    }
}

/// Configuration for the transport bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingConfig {
    /// Raw deflate level for the redirect binding (0-9).
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
    /// Binding used when the caller does not pick one.
    #[serde(default)]
    pub default_binding: SamlBinding,
}

fn default_compression_level() -> u32 {
    6
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            compression_level: default_compression_level(),
            default_binding: SamlBinding::default(),
        }
    }
}

impl BindingConfig {
    /// Returns the compression level clamped to the valid deflate range.
    #[must_use]
    pub fn compression_level(&self) -> u32 {
        self.compression_level.min(9)
    }
}
