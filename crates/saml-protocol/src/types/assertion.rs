//! SAML assertion types.
//!
//! Assertions carry the subject, the conditions under which they are valid
//! and the statements an identity provider makes about the subject.

use chrono::{DateTime, Utc};

use super::{
    confirmation_methods, default_id, default_issue_instant, default_version, issuer,
    AuthnContextClass, ISSUER, NAME_ID, SAML,
};
use crate::{
    error::SamlResult,
    schema::{Element, ElementType, Field, Value, ValueKind},
};

// ============================================================================
// Subject
// ============================================================================

/// `<saml:SubjectConfirmationData>`
pub static SUBJECT_CONFIRMATION_DATA: ElementType = ElementType {
    fields: &[
        Field::attribute("not_before", ValueKind::DateTime),
        Field::attribute("not_on_or_after", ValueKind::DateTime),
        Field::attribute("recipient", ValueKind::String),
        Field::attribute("in_response_to", ValueKind::String),
        Field::attribute("address", ValueKind::String),
    ],
    ..ElementType::new("subject_confirmation_data", SAML)
};

fn default_method() -> Value {
    Value::Str(confirmation_methods::BEARER.to_string())
}

/// `<saml:SubjectConfirmation>`
pub static SUBJECT_CONFIRMATION: ElementType = ElementType {
    fields: &[
        Field::attribute("method", ValueKind::String)
            .required()
            .with_default(default_method),
        Field::element("name_id", &NAME_ID),
        Field::element("data", &SUBJECT_CONFIRMATION_DATA),
    ],
    ..ElementType::new("subject_confirmation", SAML)
};

/// `<saml:Subject>`
pub static SUBJECT: ElementType = ElementType {
    fields: &[
        Field::element("name_id", &NAME_ID),
        Field::collection("confirmations", &SUBJECT_CONFIRMATION),
    ],
    ..ElementType::new("subject", SAML)
};

// ============================================================================
// Conditions
// ============================================================================

/// Abstract base of the members of `<saml:Conditions>`.
pub static CONDITION: ElementType = ElementType {
    is_abstract: true,
    ..ElementType::new("condition", SAML)
};

/// `<saml:Audience>`
pub static AUDIENCE: ElementType = ElementType {
    text: true,
    ..ElementType::new("audience", SAML)
};

/// `<saml:AudienceRestriction>`
pub static AUDIENCE_RESTRICTION: ElementType = ElementType {
    base: Some(&CONDITION),
    fields: &[Field::collection("audiences", &AUDIENCE).required()],
    ..ElementType::new("audience_restriction", SAML)
};

/// `<saml:OneTimeUse>`
pub static ONE_TIME_USE: ElementType = ElementType {
    base: Some(&CONDITION),
    ..ElementType::new("one_time_use", SAML)
};

/// `<saml:Conditions>`
pub static CONDITIONS: ElementType = ElementType {
    fields: &[
        Field::attribute("not_before", ValueKind::DateTime),
        Field::attribute("not_on_or_after", ValueKind::DateTime),
        Field::collection("conditions", &CONDITION),
    ],
    ..ElementType::new("conditions", SAML)
};

// ============================================================================
// Statements
// ============================================================================

/// Abstract base of assertion statements.
pub static STATEMENT: ElementType = ElementType {
    is_abstract: true,
    ..ElementType::new("statement", SAML)
};

/// `<saml:AuthnContextClassRef>`
pub static AUTHN_CONTEXT_CLASS_REF: ElementType = ElementType {
    text: true,
    ..ElementType::new("authn_context_class_ref", SAML)
};

/// `<saml:AuthnContext>`
pub static AUTHN_CONTEXT: ElementType = ElementType {
    fields: &[Field::element("class_ref", &AUTHN_CONTEXT_CLASS_REF)],
    ..ElementType::new("authn_context", SAML)
};

/// `<saml:AuthnStatement>`
pub static AUTHN_STATEMENT: ElementType = ElementType {
    base: Some(&STATEMENT),
    fields: &[
        Field::attribute("authn_instant", ValueKind::DateTime)
            .required()
            .with_default(default_issue_instant),
        Field::attribute("session_index", ValueKind::String),
        Field::attribute("session_not_on_or_after", ValueKind::DateTime),
        Field::element("context", &AUTHN_CONTEXT).required(),
    ],
    ..ElementType::new("authn_statement", SAML)
};

/// `<saml:AttributeValue>`
pub static ATTRIBUTE_VALUE: ElementType = ElementType {
    text: true,
    ..ElementType::new("attribute_value", SAML)
};

/// `<saml:Attribute>`
pub static ATTRIBUTE: ElementType = ElementType {
    fields: &[
        Field::attribute("name", ValueKind::String).required(),
        Field::attribute("name_format", ValueKind::String),
        Field::attribute("friendly_name", ValueKind::String),
        Field::collection("values", &ATTRIBUTE_VALUE),
    ],
    ..ElementType::new("attribute", SAML)
};

/// `<saml:AttributeStatement>`
pub static ATTRIBUTE_STATEMENT: ElementType = ElementType {
    base: Some(&STATEMENT),
    fields: &[Field::collection("attributes", &ATTRIBUTE).required()],
    ..ElementType::new("attribute_statement", SAML)
};

// ============================================================================
// Assertion
// ============================================================================

/// `<saml:Assertion>`
pub static ASSERTION: ElementType = ElementType {
    fields: &[
        Field::attribute("version", ValueKind::String)
            .required()
            .with_default(default_version),
        Field::attribute("id", ValueKind::String)
            .named("ID")
            .required()
            .with_default(default_id),
        Field::attribute("issue_instant", ValueKind::DateTime)
            .required()
            .with_default(default_issue_instant),
        Field::element("issuer", &ISSUER).required(),
        Field::element("subject", &SUBJECT),
        Field::element("conditions", &CONDITIONS),
        Field::collection("statements", &STATEMENT),
    ],
    ..ElementType::new("assertion", SAML)
};

/// Creates an assertion issued by `entity_id`.
///
/// # Errors
///
/// Never fails for the catalogue type; the `Result` comes from
/// [`Element::with`].
pub fn assertion(entity_id: impl Into<String>) -> SamlResult<Element> {
    Element::new(&ASSERTION).with("issuer", issuer(entity_id))
}

/// Creates a bearer confirmation answering `request_id` at `recipient`.
///
/// # Errors
///
/// See [`assertion`].
pub fn bearer_confirmation(
    request_id: impl Into<String>,
    recipient: impl Into<String>,
    not_on_or_after: DateTime<Utc>,
) -> SamlResult<Element> {
    let data = Element::new(&SUBJECT_CONFIRMATION_DATA)
        .with("in_response_to", request_id.into())?
        .with("recipient", recipient.into())?
        .with("not_on_or_after", not_on_or_after)?;
    Element::new(&SUBJECT_CONFIRMATION).with("data", data)
}

/// Creates conditions restricting the audience to `audience` within the
/// given validity window.
///
/// # Errors
///
/// See [`assertion`].
pub fn audience_conditions(
    audience: impl Into<String>,
    not_before: DateTime<Utc>,
    not_on_or_after: DateTime<Utc>,
) -> SamlResult<Element> {
    let restriction = Element::new(&AUDIENCE_RESTRICTION)
        .with("audiences", Element::with_text(&AUDIENCE, audience))?;
    Element::new(&CONDITIONS)
        .with("not_before", not_before)?
        .with("not_on_or_after", not_on_or_after)?
        .with("conditions", restriction)
}

/// Creates an authentication statement for the given context class.
///
/// # Errors
///
/// See [`assertion`].
pub fn authn_statement(
    authn_instant: DateTime<Utc>,
    session_index: impl Into<String>,
    class: AuthnContextClass,
) -> SamlResult<Element> {
    let context = Element::new(&AUTHN_CONTEXT).with(
        "class_ref",
        Element::with_text(&AUTHN_CONTEXT_CLASS_REF, class.uri()),
    )?;
    Element::new(&AUTHN_STATEMENT)
        .with("authn_instant", authn_instant)?
        .with("session_index", session_index.into())?
        .with("context", context)
}

/// Creates an attribute with string values.
///
/// # Errors
///
/// See [`assertion`].
pub fn attribute<I, S>(name: impl Into<String>, values: I) -> SamlResult<Element>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let values: Vec<Element> = values
        .into_iter()
        .map(|v| Element::with_text(&ATTRIBUTE_VALUE, v))
        .collect();
    Element::new(&ATTRIBUTE)
        .with("name", name.into())?
        .with("values", values)
}
