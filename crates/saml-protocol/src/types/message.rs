//! Protocol message bases.
//!
//! Every request and response shares the identifying attributes and the
//! optional issuer declared here. Responses additionally carry a status.

use super::{default_id, default_issue_instant, default_version, ISSUER, SAMLP, STATUS};
use crate::schema::{ElementType, Field, ValueKind};

/// Abstract base of all protocol messages.
pub static MESSAGE: ElementType = ElementType {
    fields: &[
        Field::attribute("id", ValueKind::String)
            .named("ID")
            .required()
            .with_default(default_id),
        Field::attribute("version", ValueKind::String)
            .required()
            .with_default(default_version),
        Field::attribute("issue_instant", ValueKind::DateTime)
            .required()
            .with_default(default_issue_instant),
        Field::attribute("destination", ValueKind::String),
        Field::attribute("consent", ValueKind::String),
        Field::element("issuer", &ISSUER),
    ],
    is_abstract: true,
    ..ElementType::new("message_abstract_type", SAMLP)
};

/// Abstract base of protocol responses.
pub static STATUS_RESPONSE_TYPE: ElementType = ElementType {
    base: Some(&MESSAGE),
    fields: &[
        Field::attribute("in_response_to", ValueKind::String),
        Field::element("status", &STATUS).required(),
    ],
    is_abstract: true,
    ..ElementType::new("status_response_type", SAMLP)
};

/// Returns true if `ty` is a protocol response.
#[must_use]
pub fn is_status_response(ty: &ElementType) -> bool {
    ty.is_subtype_of(&STATUS_RESPONSE_TYPE)
}
