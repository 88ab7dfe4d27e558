//! SAML AuthnRequest types.
//!
//! An authentication request is sent by a service provider to ask an
//! identity provider to authenticate a principal.

use super::{
    issuer, NameIdFormat, AUTHN_CONTEXT_CLASS_REF, CONDITIONS, MESSAGE, SAMLP, SUBJECT,
};
use crate::{
    error::SamlResult,
    schema::{Element, ElementType, Field, ValueKind},
};

/// `<samlp:NameIDPolicy>`
pub static NAME_ID_POLICY: ElementType = ElementType {
    name: Some("NameIDPolicy"),
    fields: &[
        Field::attribute("format", ValueKind::String),
        Field::attribute("sp_name_qualifier", ValueKind::String).named("SPNameQualifier"),
        Field::attribute("allow_create", ValueKind::Boolean),
    ],
    ..ElementType::new("name_id_policy", SAMLP)
};

/// `<samlp:RequestedAuthnContext>`
pub static REQUESTED_AUTHN_CONTEXT: ElementType = ElementType {
    fields: &[
        Field::attribute("comparison", ValueKind::String),
        Field::collection("class_refs", &AUTHN_CONTEXT_CLASS_REF),
    ],
    ..ElementType::new("requested_authn_context", SAMLP)
};

/// `<samlp:AuthnRequest>`
pub static AUTHN_REQUEST: ElementType = ElementType {
    base: Some(&MESSAGE),
    fields: &[
        Field::attribute("force_authn", ValueKind::Boolean),
        Field::attribute("is_passive", ValueKind::Boolean),
        Field::attribute("protocol_binding", ValueKind::String),
        Field::attribute("assertion_consumer_service_index", ValueKind::Integer),
        Field::attribute("assertion_consumer_service_url", ValueKind::String)
            .named("AssertionConsumerServiceURL"),
        Field::attribute("attribute_consuming_service_index", ValueKind::Integer),
        Field::attribute("provider_name", ValueKind::String),
        Field::element("subject", &SUBJECT),
        Field::element("name_id_policy", &NAME_ID_POLICY),
        Field::element("conditions", &CONDITIONS),
        Field::element("requested_authn_context", &REQUESTED_AUTHN_CONTEXT),
    ],
    ..ElementType::new("authn_request", SAMLP)
};

/// Creates an authentication request from `sp_entity_id`.
///
/// # Errors
///
/// Never fails for the catalogue type; the `Result` comes from
/// [`Element::with`].
pub fn authn_request(sp_entity_id: impl Into<String>) -> SamlResult<Element> {
    Element::new(&AUTHN_REQUEST).with("issuer", issuer(sp_entity_id))
}

/// Creates a name identifier policy.
///
/// # Errors
///
/// See [`authn_request`].
pub fn name_id_policy(format: NameIdFormat, allow_create: bool) -> SamlResult<Element> {
    Element::new(&NAME_ID_POLICY)
        .with("format", format.uri())?
        .with("allow_create", allow_create)
}
