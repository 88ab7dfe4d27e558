//! SAML metadata types.
//!
//! An entity publishes its role descriptors and the endpoints each role
//! listens on. Signatures on metadata come first, so every signable type
//! here places `ds:Signature` at position 0.

use super::{default_id, NameIdFormat, SamlBinding, ATTRIBUTE, MD, SAMLP_NS};
use crate::{
    error::SamlResult,
    schema::{Element, ElementType, Field, ValueKind},
};

// ============================================================================
// Endpoints
// ============================================================================

/// Abstract base of service endpoints.
pub static ENDPOINT_TYPE: ElementType = ElementType {
    fields: &[
        Field::attribute("binding", ValueKind::String).required(),
        Field::attribute("location", ValueKind::String).required(),
        Field::attribute("response_location", ValueKind::String),
    ],
    is_abstract: true,
    ..ElementType::new("endpoint_type", MD)
};

/// Abstract base of endpoints selected by index.
pub static INDEXED_ENDPOINT_TYPE: ElementType = ElementType {
    base: Some(&ENDPOINT_TYPE),
    fields: &[
        Field::attribute("index", ValueKind::Integer)
            .named("index")
            .required(),
        Field::attribute("is_default", ValueKind::Boolean).named("isDefault"),
    ],
    is_abstract: true,
    ..ElementType::new("indexed_endpoint_type", MD)
};

/// `<md:SingleSignOnService>`
pub static SINGLE_SIGN_ON_SERVICE: ElementType = ElementType {
    base: Some(&ENDPOINT_TYPE),
    ..ElementType::new("single_sign_on_service", MD)
};

/// `<md:SingleLogoutService>`
pub static SINGLE_LOGOUT_SERVICE: ElementType = ElementType {
    base: Some(&ENDPOINT_TYPE),
    ..ElementType::new("single_logout_service", MD)
};

/// `<md:AssertionConsumerService>`
pub static ASSERTION_CONSUMER_SERVICE: ElementType = ElementType {
    base: Some(&INDEXED_ENDPOINT_TYPE),
    ..ElementType::new("assertion_consumer_service", MD)
};

/// `<md:ArtifactResolutionService>`
pub static ARTIFACT_RESOLUTION_SERVICE: ElementType = ElementType {
    base: Some(&INDEXED_ENDPOINT_TYPE),
    ..ElementType::new("artifact_resolution_service", MD)
};

/// `<md:NameIDFormat>`
pub static NAME_ID_FORMAT: ElementType = ElementType {
    name: Some("NameIDFormat"),
    text: true,
    ..ElementType::new("name_id_format", MD)
};

// ============================================================================
// Attribute consuming service
// ============================================================================

/// `<md:ServiceName>`
pub static SERVICE_NAME: ElementType = ElementType {
    fields: &[Field::attribute("lang", ValueKind::String)
        .named("xml:lang")
        .required()],
    text: true,
    ..ElementType::new("service_name", MD)
};

/// `<md:RequestedAttribute>`: an attribute the service wants released.
pub static REQUESTED_ATTRIBUTE: ElementType = ElementType {
    base: Some(&ATTRIBUTE),
    fields: &[Field::attribute("is_required", ValueKind::Boolean).named("isRequired")],
    ..ElementType::new("requested_attribute", MD)
};

/// `<md:AttributeConsumingService>`
pub static ATTRIBUTE_CONSUMING_SERVICE: ElementType = ElementType {
    fields: &[
        Field::attribute("index", ValueKind::Integer)
            .named("index")
            .required(),
        Field::attribute("is_default", ValueKind::Boolean).named("isDefault"),
        Field::collection("service_names", &SERVICE_NAME).required(),
        Field::collection("requested_attributes", &REQUESTED_ATTRIBUTE).required(),
    ],
    ..ElementType::new("attribute_consuming_service", MD)
};

// ============================================================================
// Role descriptors
// ============================================================================

/// `<md:RoleDescriptor>`, also the base of the SSO descriptors.
pub static ROLE_DESCRIPTOR: ElementType = ElementType {
    fields: &[
        Field::attribute("id", ValueKind::String)
            .named("ID")
            .with_default(default_id),
        Field::attribute("valid_until", ValueKind::DateTime).named("validUntil"),
        Field::attribute("cache_duration", ValueKind::String).named("cacheDuration"),
        Field::attribute("protocol_support_enumeration", ValueKind::String)
            .named("protocolSupportEnumeration")
            .required(),
        Field::attribute("error_url", ValueKind::String).named("errorURL"),
    ],
    signature_index: 0,
    ..ElementType::new("role_descriptor", MD)
};

/// `<md:IDPSSODescriptor>`
pub static IDP_SSO_DESCRIPTOR: ElementType = ElementType {
    name: Some("IDPSSODescriptor"),
    base: Some(&ROLE_DESCRIPTOR),
    fields: &[
        Field::attribute("want_authn_requests_signed", ValueKind::Boolean)
            .named("WantAuthnRequestsSigned"),
        Field::collection("artifact_resolution_services", &ARTIFACT_RESOLUTION_SERVICE),
        Field::collection("single_logout_services", &SINGLE_LOGOUT_SERVICE),
        Field::collection("name_id_formats", &NAME_ID_FORMAT),
        Field::collection("single_sign_on_services", &SINGLE_SIGN_ON_SERVICE).required(),
    ],
    signature_index: 0,
    ..ElementType::new("idp_sso_descriptor", MD)
};

/// `<md:SPSSODescriptor>`
pub static SP_SSO_DESCRIPTOR: ElementType = ElementType {
    name: Some("SPSSODescriptor"),
    base: Some(&ROLE_DESCRIPTOR),
    fields: &[
        Field::attribute("authn_requests_signed", ValueKind::Boolean)
            .named("AuthnRequestsSigned"),
        Field::attribute("want_assertions_signed", ValueKind::Boolean)
            .named("WantAssertionsSigned"),
        Field::collection("artifact_resolution_services", &ARTIFACT_RESOLUTION_SERVICE),
        Field::collection("single_logout_services", &SINGLE_LOGOUT_SERVICE),
        Field::collection("name_id_formats", &NAME_ID_FORMAT),
        Field::collection("assertion_consumer_services", &ASSERTION_CONSUMER_SERVICE).required(),
        Field::collection("attribute_consuming_services", &ATTRIBUTE_CONSUMING_SERVICE),
    ],
    signature_index: 0,
    ..ElementType::new("sp_sso_descriptor", MD)
};

// ============================================================================
// Entities
// ============================================================================

/// `<md:EntityDescriptor>`
pub static ENTITY_DESCRIPTOR: ElementType = ElementType {
    fields: &[
        Field::attribute("entity_id", ValueKind::String)
            .named("entityID")
            .required(),
        Field::attribute("id", ValueKind::String)
            .named("ID")
            .with_default(default_id),
        Field::attribute("valid_until", ValueKind::DateTime).named("validUntil"),
        Field::attribute("cache_duration", ValueKind::String).named("cacheDuration"),
        Field::collection("descriptors", &ROLE_DESCRIPTOR).required(),
    ],
    signature_index: 0,
    ..ElementType::new("entity_descriptor", MD)
};

/// `<md:EntitiesDescriptor>`
pub static ENTITIES_DESCRIPTOR: ElementType = ElementType {
    fields: &[
        Field::attribute("id", ValueKind::String)
            .named("ID")
            .with_default(default_id),
        Field::attribute("valid_until", ValueKind::DateTime).named("validUntil"),
        Field::attribute("cache_duration", ValueKind::String).named("cacheDuration"),
        Field::attribute("name", ValueKind::String),
        Field::collection("entities", &ENTITY_DESCRIPTOR).required(),
    ],
    signature_index: 0,
    ..ElementType::new("entities_descriptor", MD)
};

/// Creates an endpoint of type `ty` for `binding` at `location`.
///
/// # Errors
///
/// Returns `InvalidOperation` if `ty` has no binding and location.
pub fn endpoint(
    ty: &'static ElementType,
    binding: SamlBinding,
    location: impl Into<String>,
) -> SamlResult<Element> {
    Element::new(ty)
        .with("binding", binding.uri())?
        .with("location", location.into())
}

/// Creates the metadata of a service provider that consumes assertions
/// over HTTP-POST at `acs_url`.
///
/// # Errors
///
/// Never fails for the catalogue types; the `Result` comes from
/// [`Element::with`].
pub fn sp_metadata(
    entity_id: impl Into<String>,
    acs_url: impl Into<String>,
    format: NameIdFormat,
) -> SamlResult<Element> {
    let acs = endpoint(&ASSERTION_CONSUMER_SERVICE, SamlBinding::HttpPost, acs_url)?
        .with("index", 0_i64)?
        .with("is_default", true)?;
    let descriptor = Element::new(&SP_SSO_DESCRIPTOR)
        .with("protocol_support_enumeration", SAMLP_NS)?
        .with("name_id_formats", Element::with_text(&NAME_ID_FORMAT, format.uri()))?
        .with("assertion_consumer_services", acs)?;
    Element::new(&ENTITY_DESCRIPTOR)
        .with("entity_id", entity_id.into())?
        .with("descriptors", descriptor)
}

/// Creates the metadata of an identity provider with a single sign-on
/// endpoint per binding.
///
/// # Errors
///
/// See [`sp_metadata`].
pub fn idp_metadata(
    entity_id: impl Into<String>,
    sso_url: &str,
    bindings: &[SamlBinding],
) -> SamlResult<Element> {
    let services = bindings
        .iter()
        .map(|&binding| endpoint(&SINGLE_SIGN_ON_SERVICE, binding, sso_url))
        .collect::<SamlResult<Vec<_>>>()?;
    let descriptor = Element::new(&IDP_SSO_DESCRIPTOR)
        .with("protocol_support_enumeration", SAMLP_NS)?
        .with("want_authn_requests_signed", true)?
        .with("single_sign_on_services", services)?;
    Element::new(&ENTITY_DESCRIPTOR)
        .with("entity_id", entity_id.into())?
        .with("descriptors", descriptor)
}
