//! SAML status types.
//!
//! Status information returned in SAML protocol responses.

use super::{status_codes, SAMLP};
use crate::{
    error::{SamlError, SamlResult},
    schema::{Element, ElementType, Field, ValueKind},
};

/// `<samlp:StatusCode>`, optionally nesting a second-level code.
pub static STATUS_CODE: ElementType = ElementType {
    fields: &[
        Field::attribute("value", ValueKind::String).required(),
        Field::element("status_code", &STATUS_CODE),
    ],
    ..ElementType::new("status_code", SAMLP)
};

/// `<samlp:StatusMessage>`
pub static STATUS_MESSAGE: ElementType = ElementType {
    text: true,
    ..ElementType::new("status_message", SAMLP)
};

/// `<samlp:Status>`
pub static STATUS: ElementType = ElementType {
    fields: &[
        Field::element("status_code", &STATUS_CODE).required(),
        Field::element("status_message", &STATUS_MESSAGE),
    ],
    ..ElementType::new("status", SAMLP)
};

/// Creates a status with the given top-level code.
///
/// # Errors
///
/// Never fails for the catalogue type; the `Result` comes from
/// [`Element::with`].
pub fn status(code: &str) -> SamlResult<Element> {
    let code = Element::new(&STATUS_CODE).with("value", code)?;
    Element::new(&STATUS).with("status_code", code)
}

/// Creates a success status.
///
/// # Errors
///
/// See [`status`].
pub fn status_success() -> SamlResult<Element> {
    status(status_codes::SUCCESS)
}

/// Creates a status describing `err`.
///
/// # Errors
///
/// See [`status`].
pub fn status_for_error(err: &SamlError) -> SamlResult<Element> {
    status(err.status_code())?.with(
        "status_message",
        Element::with_text(&STATUS_MESSAGE, err.to_string()),
    )
}

/// Returns the top-level status code value of a `<samlp:Status>`.
#[must_use]
pub fn status_code_value(status: &Element) -> Option<&str> {
    status.child("status_code")?.str_value("value")
}
