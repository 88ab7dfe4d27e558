//! SAML error types.
//!
//! Provides error types for schema binding, transport decoding and
//! signature operations.

use thiserror::Error;

use crate::types::constants::status_codes;

/// Result type for SAML operations.
pub type SamlResult<T> = Result<T, SamlError>;

/// SAML protocol errors.
#[derive(Debug, Error)]
pub enum SamlError {
    /// A required attribute or child element has no value after parsing.
    #[error("missing required field `{field}` on <{element}>")]
    MissingField {
        /// Wire name of the owning element type.
        element: String,
        /// Name of the unset field.
        field: &'static str,
    },

    /// A wire value failed its value codec.
    #[error("malformed value {value:?} for `{field}` on <{element}>: {reason}")]
    MalformedValue {
        /// Wire name of the owning element type.
        element: String,
        /// Name of the field being parsed.
        field: &'static str,
        /// The offending wire text.
        value: String,
        /// Why the text was rejected.
        reason: String,
    },

    /// A disallowed mutation was attempted.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A wire tag has no registered element type.
    #[error("unknown element: {0}")]
    UnknownElement(String),

    /// A field name is not declared on the element type.
    #[error("unknown field `{field}` on <{element}>")]
    UnknownField {
        /// Wire name of the element type.
        element: String,
        /// The undeclared field name.
        field: String,
    },

    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// XML writing error.
    #[error("XML writing error: {0}")]
    XmlWrite(String),

    /// Base64 decoding error.
    #[error("base64 decode error: {0}")]
    Base64Decode(String),

    /// Deflate compression or decompression error.
    #[error("deflate error: {0}")]
    Deflate(String),

    /// Transport payload could not be decoded.
    #[error("transport decode error: {0}")]
    Transport(String),

    /// Cryptographic operation error.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// XML signature creation failed.
    #[error("signature creation failed: {0}")]
    SignatureCreation(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// Unknown or unsupported binding.
    #[error("unsupported binding: {0}")]
    UnsupportedBinding(String),
}

impl SamlError {
    /// Returns true for errors that reject an inbound document's content.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::MissingField { .. } | Self::MalformedValue { .. })
    }

    /// Returns the SAML status code for this error.
    ///
    /// Problems with what the peer sent map to `Requester`; everything else
    /// is the responder's fault.
    #[must_use]
    pub const fn status_code(&self) -> &'static str {
        match self {
            Self::MissingField { .. }
            | Self::MalformedValue { .. }
            | Self::UnknownElement(_)
            | Self::XmlParse(_)
            | Self::Base64Decode(_)
            | Self::Deflate(_)
            | Self::Transport(_) => status_codes::REQUESTER,
            Self::UnsupportedBinding(_) => status_codes::REQUEST_UNSUPPORTED,
            _ => status_codes::RESPONDER,
        }
    }
}

impl From<quick_xml::Error> for SamlError {
    fn from(err: quick_xml::Error) -> Self {
        Self::XmlParse(err.to_string())
    }
}

impl From<base64::DecodeError> for SamlError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Base64Decode(err.to_string())
    }
}

impl From<std::io::Error> for SamlError {
    fn from(err: std::io::Error) -> Self {
        Self::Deflate(err.to_string())
    }
}

impl From<saml_crypto::CryptoError> for SamlError {
    fn from(err: saml_crypto::CryptoError) -> Self {
        Self::Crypto(err.to_string())
    }
}
