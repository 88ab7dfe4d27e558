//! HTTP-Redirect Binding implementation.
//!
//! Implements the SAML 2.0 HTTP-Redirect binding for sending SAML messages
//! via URL query parameters with raw DEFLATE compression.

use std::io::{Read, Write};

use base64::Engine;
use flate2::{read::DeflateDecoder, write::DeflateEncoder, Compression};

use super::{decode_base64, select_message, utf8, DecodedMessage, SamlMessageType, RELAY_STATE};
use crate::{
    config::BindingConfig,
    error::{SamlError, SamlResult},
};

/// HTTP-Redirect binding encoder/decoder.
#[derive(Debug, Clone, Copy)]
pub struct HttpRedirectBinding {
    compression: Compression,
}

impl Default for HttpRedirectBinding {
    fn default() -> Self {
        Self::from_config(&BindingConfig::default())
    }
}

impl HttpRedirectBinding {
    /// Creates a binding compressing at the configured level.
    #[must_use]
    pub fn from_config(config: &BindingConfig) -> Self {
        Self {
            compression: Compression::new(config.compression_level()),
        }
    }

    /// Returns the query-string payload: base64 of the raw-deflated XML.
    ///
    /// # Errors
    ///
    /// Returns `Deflate` if compression fails.
    pub fn encode_payload(&self, xml: &str) -> SamlResult<String> {
        let compressed = deflate_compress(xml.as_bytes(), self.compression)?;
        Ok(base64::engine::general_purpose::STANDARD.encode(compressed))
    }

    /// Builds the query string carrying a message and optional relay state.
    ///
    /// # Errors
    ///
    /// Returns `Deflate` if compression fails.
    pub fn encode_query(
        &self,
        xml: &str,
        relay_state: Option<&str>,
        message_type: SamlMessageType,
    ) -> SamlResult<String> {
        let encoded = self.encode_payload(xml)?;
        let mut query = format!("{}={}", message_type.form_param(), urlencoding::encode(&encoded));
        if let Some(rs) = relay_state {
            query.push_str(&format!("&{RELAY_STATE}={}", urlencoding::encode(rs)));
        }
        Ok(query)
    }

    /// Encodes a message into a redirect URL.
    ///
    /// # Errors
    ///
    /// Returns `Deflate` if compression fails.
    pub fn encode(
        &self,
        xml: &str,
        destination: &str,
        relay_state: Option<&str>,
        message_type: SamlMessageType,
    ) -> SamlResult<String> {
        let query = self.encode_query(xml, relay_state, message_type)?;
        let separator = if destination.contains('?') { '&' } else { '?' };
        Ok(format!("{destination}{separator}{query}"))
    }

    /// Decodes a SAML message from already URL-decoded query parameters.
    ///
    /// # Errors
    ///
    /// Returns `Transport` when neither message parameter is present or the
    /// XML is not UTF-8, `Base64Decode` and `Deflate` for corrupt payloads.
    pub fn decode(
        saml_request: Option<&str>,
        saml_response: Option<&str>,
        relay_state: Option<&str>,
    ) -> SamlResult<DecodedMessage> {
        let (encoded, message_type) = select_message(saml_request, saml_response)?;
        let compressed = decode_base64(encoded)?;
        let xml = utf8(deflate_decompress(&compressed)?)?;

        Ok(DecodedMessage {
            xml,
            message_type,
            relay_state: relay_state.map(String::from),
        })
    }

    /// Decodes a message from a full URL, using the first occurrence of
    /// each parameter.
    ///
    /// # Errors
    ///
    /// Returns `Transport` for an unparsable URL, otherwise as
    /// [`HttpRedirectBinding::decode`].
    pub fn decode_url(url: &str) -> SamlResult<DecodedMessage> {
        let parsed =
            url::Url::parse(url).map_err(|e| SamlError::Transport(format!("invalid URL: {e}")))?;
        let param = |name: &str| {
            parsed
                .query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
        };

        Self::decode(
            param(SamlMessageType::Request.form_param()).as_deref(),
            param(SamlMessageType::Response.form_param()).as_deref(),
            param(RELAY_STATE).as_deref(),
        )
    }
}

/// Compresses data using DEFLATE (raw, no zlib header).
fn deflate_compress(data: &[u8], level: Compression) -> SamlResult<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), level);
    encoder
        .write_all(data)
        .map_err(|e| SamlError::Deflate(format!("compression error: {e}")))?;
    encoder
        .finish()
        .map_err(|e| SamlError::Deflate(format!("compression finish error: {e}")))
}

/// Decompresses raw DEFLATE data.
fn deflate_decompress(data: &[u8]) -> SamlResult<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| SamlError::Deflate(format!("decompression error: {e}")))?;
    Ok(decompressed)
}
