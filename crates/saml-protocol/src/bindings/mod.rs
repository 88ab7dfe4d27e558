//! SAML bindings implementation.
//!
//! This module implements the SAML 2.0 bindings for message transport:
//!
//! - **HTTP-POST Binding** - Messages are base64-encoded and sent in HTML forms
//! - **HTTP-Redirect Binding** - Messages are raw-deflated, base64-encoded and
//!   carried in the query string
//!
//! Both work on serialized XML text; choosing the parameter name from the
//! message's element type is left to [`crate::client`].

mod post;
mod redirect;

pub use post::*;
pub use redirect::*;

use base64::Engine;

use crate::{
    error::{SamlError, SamlResult},
    schema::{registry, ElementType},
    types::is_status_response,
    xml::XmlNode,
};

/// Query/form parameter carrying the relay state.
pub const RELAY_STATE: &str = "RelayState";

/// Query parameter carrying an artifact.
pub const SAML_ART: &str = "SAMLart";

/// Artifact parameter name used by some older senders.
pub const SAML_ARTIFACT_LEGACY: &str = "SAMLArtifact";

/// SAML message kind, which decides the parameter name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamlMessageType {
    /// Any protocol request.
    Request,
    /// A status response.
    Response,
}

impl SamlMessageType {
    /// Returns the form parameter name for this message type.
    #[must_use]
    pub const fn form_param(&self) -> &'static str {
        match self {
            Self::Request => "SAMLRequest",
            Self::Response => "SAMLResponse",
        }
    }

    /// Returns the kind of messages of type `ty`.
    #[must_use]
    pub fn of_type(ty: &ElementType) -> Self {
        if is_status_response(ty) {
            Self::Response
        } else {
            Self::Request
        }
    }

    /// Returns the kind of the message rooted at `node`, or `None` when
    /// the root tag is not registered.
    #[must_use]
    pub fn of_node(node: &XmlNode) -> Option<Self> {
        registry::resolve(&node.clark_name()).map(Self::of_type)
    }
}

/// Decoded SAML binding message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
    /// The decoded XML message.
    pub xml: String,
    /// Which parameter carried the message.
    pub message_type: SamlMessageType,
    /// The RelayState if present.
    pub relay_state: Option<String>,
}

impl DecodedMessage {
    /// Parses the decoded XML.
    ///
    /// # Errors
    ///
    /// Returns `XmlParse` for malformed XML.
    pub fn parse(&self) -> SamlResult<XmlNode> {
        XmlNode::parse(&self.xml)
    }
}

/// Picks the message parameter, preferring `SAMLRequest`.
fn select_message<'a>(
    saml_request: Option<&'a str>,
    saml_response: Option<&'a str>,
) -> SamlResult<(&'a str, SamlMessageType)> {
    match (saml_request, saml_response) {
        (Some(req), _) => Ok((req, SamlMessageType::Request)),
        (None, Some(resp)) => Ok((resp, SamlMessageType::Response)),
        (None, None) => Err(SamlError::Transport(
            "no SAMLRequest or SAMLResponse parameter".to_string(),
        )),
    }
}

/// Decodes standard base64, ignoring embedded line breaks.
fn decode_base64(encoded: &str) -> SamlResult<Vec<u8>> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(base64::engine::general_purpose::STANDARD.decode(compact)?)
}

fn utf8(bytes: Vec<u8>) -> SamlResult<String> {
    String::from_utf8(bytes)
        .map_err(|e| SamlError::Transport(format!("invalid UTF-8 in message: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ARTIFACT_RESPONSE, AUTHN_REQUEST, LOGOUT_REQUEST, RESPONSE};

    #[test]
    fn message_type_follows_element_type() {
        assert_eq!(SamlMessageType::of_type(&RESPONSE), SamlMessageType::Response);
        assert_eq!(SamlMessageType::of_type(&ARTIFACT_RESPONSE), SamlMessageType::Response);
        assert_eq!(SamlMessageType::of_type(&AUTHN_REQUEST), SamlMessageType::Request);
        assert_eq!(SamlMessageType::of_type(&LOGOUT_REQUEST), SamlMessageType::Request);
    }

    #[test]
    fn unknown_root_has_no_message_type() {
        let node = XmlNode::new(Some("urn:example"), None, "Thing");
        assert_eq!(SamlMessageType::of_node(&node), None);
    }

    #[test]
    fn base64_tolerates_line_breaks() {
        assert_eq!(decode_base64("PFRl\r\nc3Qv\nPg==").unwrap(), b"<Test/>");
        assert!(matches!(decode_base64("not base64!"), Err(SamlError::Base64Decode(_))));
    }
}
