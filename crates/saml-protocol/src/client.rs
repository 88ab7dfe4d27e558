//! Sending and receiving SAML messages over the HTTP bindings.
//!
//! [`BindingClient::send`] picks `SAMLRequest` or `SAMLResponse` from the
//! message's registered element type and encodes it for the chosen binding.
//! [`BindingClient::receive`] inspects an inbound HTTP request and returns
//! the carried message or artifact, or `None` when it carries neither.

use tracing::debug;
use url::form_urlencoded;

use crate::{
    bindings::{
        HttpPostBinding, HttpRedirectBinding, SamlMessageType, RELAY_STATE, SAML_ART,
        SAML_ARTIFACT_LEGACY,
    },
    config::BindingConfig,
    error::{SamlError, SamlResult},
    schema::{self, Element},
    types::SamlBinding,
    xml::XmlNode,
};

/// An encoded outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// URL to redirect the user agent to.
    Redirect(String),
    /// Auto-submitting HTML form to return to the user agent.
    Post(String),
}

/// A message or artifact extracted from an inbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum Received {
    /// A protocol message delivered by value.
    Message {
        /// The parsed message.
        node: XmlNode,
        /// Which parameter carried it.
        message_type: SamlMessageType,
        /// The binding it arrived over.
        binding: SamlBinding,
        /// Opaque relay state.
        relay_state: Option<String>,
    },
    /// An artifact to resolve with `<samlp:ArtifactResolve>`.
    Artifact {
        /// The artifact exactly as received.
        artifact: String,
        /// Opaque relay state.
        relay_state: Option<String>,
    },
}

impl Received {
    /// Returns the relay state.
    #[must_use]
    pub fn relay_state(&self) -> Option<&str> {
        match self {
            Self::Message { relay_state, .. } | Self::Artifact { relay_state, .. } => {
                relay_state.as_deref()
            }
        }
    }

    /// Deserializes a received message through the type registry.
    ///
    /// Returns `Ok(None)` for artifacts and for unregistered root tags.
    ///
    /// # Errors
    ///
    /// Propagates validation errors from deserialization.
    pub fn deserialize(&self) -> SamlResult<Option<Element>> {
        match self {
            Self::Message { node, .. } => schema::deserialize(node),
            Self::Artifact { .. } => Ok(None),
        }
    }
}

/// Encodes and decodes messages for the HTTP bindings.
#[derive(Debug, Clone, Copy, Default)]
pub struct BindingClient {
    config: BindingConfig,
}

impl BindingClient {
    /// Creates a client with the given binding configuration.
    #[must_use]
    pub const fn new(config: BindingConfig) -> Self {
        Self { config }
    }

    /// Encodes a message as a redirect query string:
    /// `SAMLRequest|SAMLResponse=<payload>[&RelayState=<state>]`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownElement` for an unregistered root tag, `XmlWrite` and
    /// `Deflate` when encoding fails.
    pub fn encode(&self, message: &XmlNode, relay_state: Option<&str>) -> SamlResult<String> {
        let message_type = message_type(message)?;
        HttpRedirectBinding::from_config(&self.config).encode_query(
            &message.to_xml()?,
            relay_state,
            message_type,
        )
    }

    /// Encodes a message for delivery to `uri`.
    ///
    /// `binding` falls back to the configured default binding.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedBinding` for bindings that are not carried by the
    /// user agent, and otherwise as [`BindingClient::encode`].
    pub fn send(
        &self,
        uri: &str,
        message: &XmlNode,
        relay_state: Option<&str>,
        binding: Option<SamlBinding>,
    ) -> SamlResult<Outbound> {
        let binding = binding.unwrap_or(self.config.default_binding);
        let message_type = message_type(message)?;
        let xml = message.to_xml()?;

        match binding {
            SamlBinding::HttpRedirect => HttpRedirectBinding::from_config(&self.config)
                .encode(&xml, uri, relay_state, message_type)
                .map(Outbound::Redirect),
            SamlBinding::HttpPost => Ok(Outbound::Post(HttpPostBinding::encode(
                &xml,
                uri,
                relay_state,
                message_type,
            ))),
            other => Err(SamlError::UnsupportedBinding(other.uri().to_string())),
        }
    }

    /// Serializes an element and encodes it for delivery to `uri`.
    ///
    /// # Errors
    ///
    /// See [`BindingClient::send`].
    pub fn send_element(
        &self,
        uri: &str,
        message: &mut Element,
        relay_state: Option<&str>,
        binding: Option<SamlBinding>,
    ) -> SamlResult<Outbound> {
        self.send(uri, &message.serialize(), relay_state, binding)
    }

    /// Extracts a message or artifact from an inbound HTTP request.
    ///
    /// `query` is the raw query string and `body` the raw
    /// `application/x-www-form-urlencoded` body. GET requests carry an
    /// artifact or a deflated redirect payload; POST bodies carry an
    /// uncompressed payload.
    ///
    /// # Errors
    ///
    /// Returns `Base64Decode`, `Deflate`, `Transport` or `XmlParse` when a
    /// SAML parameter is present but its payload is corrupt.
    pub fn receive(&self, method: &str, query: &str, body: &str) -> SamlResult<Option<Received>> {
        if method.eq_ignore_ascii_case("GET") {
            let params = Params::parse(query);
            if let Some(artifact) = params.artifact() {
                debug!("received artifact binding message");
                return Ok(Some(Received::Artifact {
                    artifact: artifact.to_string(),
                    relay_state: params.relay_state,
                }));
            }
            if !params.has_message() {
                debug!("no SAML parameter in query string");
                return Ok(None);
            }
            let decoded = HttpRedirectBinding::decode(
                params.saml_request.as_deref(),
                params.saml_response.as_deref(),
                params.relay_state.as_deref(),
            )?;
            debug!(message_type = ?decoded.message_type, "received redirect binding message");
            Ok(Some(Received::Message {
                node: decoded.parse()?,
                message_type: decoded.message_type,
                binding: SamlBinding::HttpRedirect,
                relay_state: decoded.relay_state,
            }))
        } else if method.eq_ignore_ascii_case("POST") {
            let params = Params::parse(body);
            if !params.has_message() {
                debug!("no SAML parameter in form body");
                return Ok(None);
            }
            let decoded = HttpPostBinding::decode(
                params.saml_request.as_deref(),
                params.saml_response.as_deref(),
                params.relay_state.as_deref(),
            )?;
            debug!(message_type = ?decoded.message_type, "received post binding message");
            Ok(Some(Received::Message {
                node: decoded.parse()?,
                message_type: decoded.message_type,
                binding: SamlBinding::HttpPost,
                relay_state: decoded.relay_state,
            }))
        } else {
            debug!(method, "unsupported method for SAML bindings");
            Ok(None)
        }
    }
}

fn message_type(message: &XmlNode) -> SamlResult<SamlMessageType> {
    SamlMessageType::of_node(message).ok_or_else(|| SamlError::UnknownElement(message.clark_name()))
}

/// The SAML parameters of a query string or form body; first value wins.
#[derive(Debug, Default)]
struct Params {
    saml_request: Option<String>,
    saml_response: Option<String>,
    relay_state: Option<String>,
    artifact: Option<String>,
}

impl Params {
    fn parse(encoded: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(encoded.trim_start_matches('?').as_bytes()) {
            let slot = match key.as_ref() {
                "SAMLRequest" => &mut params.saml_request,
                "SAMLResponse" => &mut params.saml_response,
                RELAY_STATE => &mut params.relay_state,
                SAML_ART | SAML_ARTIFACT_LEGACY => &mut params.artifact,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }

    fn has_message(&self) -> bool {
        self.saml_request.is_some() || self.saml_response.is_some()
    }

    fn artifact(&self) -> Option<&str> {
        self.artifact.as_deref()
    }
}
