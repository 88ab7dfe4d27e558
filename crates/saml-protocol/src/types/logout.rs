//! SAML Single Logout types.

use super::{MESSAGE, NAME_ID, SAMLP, STATUS_RESPONSE_TYPE};
use crate::schema::{ElementType, Field, ValueKind};

/// `<samlp:SessionIndex>`
pub static SESSION_INDEX: ElementType = ElementType {
    text: true,
    ..ElementType::new("session_index", SAMLP)
};

/// `<samlp:LogoutRequest>`
pub static LOGOUT_REQUEST: ElementType = ElementType {
    base: Some(&MESSAGE),
    fields: &[
        Field::attribute("not_on_or_after", ValueKind::DateTime),
        Field::attribute("reason", ValueKind::String),
        Field::element("name_id", &NAME_ID).required(),
        Field::collection("session_indexes", &SESSION_INDEX),
    ],
    ..ElementType::new("logout_request", SAMLP)
};

/// `<samlp:LogoutResponse>`
pub static LOGOUT_RESPONSE: ElementType = ElementType {
    base: Some(&STATUS_RESPONSE_TYPE),
    ..ElementType::new("logout_response", SAMLP)
};
