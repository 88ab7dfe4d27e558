//! SAML name identifiers.
//!
//! `NameIDType` is the abstract base shared by `<saml:NameID>` and
//! `<saml:Issuer>`.

use super::{NameIdFormat, SAML};
use crate::{
    error::SamlResult,
    schema::{Element, ElementType, Field, ValueKind},
};

/// Abstract base of all name identifiers.
pub static NAME_ID_TYPE: ElementType = ElementType {
    name: Some("NameIDType"),
    fields: &[
        Field::attribute("name_qualifier", ValueKind::String),
        Field::attribute("sp_name_qualifier", ValueKind::String).named("SPNameQualifier"),
        Field::attribute("format", ValueKind::String),
        Field::attribute("sp_provided_id", ValueKind::String).named("SPProvidedID"),
    ],
    text: true,
    is_abstract: true,
    ..ElementType::new("name_id_type", SAML)
};

/// `<saml:NameID>`
pub static NAME_ID: ElementType = ElementType {
    name: Some("NameID"),
    base: Some(&NAME_ID_TYPE),
    ..ElementType::new("name_id", SAML)
};

/// `<saml:Issuer>`
pub static ISSUER: ElementType = ElementType {
    base: Some(&NAME_ID_TYPE),
    ..ElementType::new("issuer", SAML)
};

/// Creates an `<saml:Issuer>` naming the given entity.
#[must_use]
pub fn issuer(entity_id: impl Into<String>) -> Element {
    Element::with_text(&ISSUER, entity_id)
}

/// Creates a `<saml:NameID>` in the given format.
///
/// # Errors
///
/// Never fails for the catalogue type; the `Result` comes from
/// [`Element::with`].
pub fn name_id(value: impl Into<String>, format: NameIdFormat) -> SamlResult<Element> {
    Element::with_text(&NAME_ID, value).with("format", format.uri())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlNode;

    #[test]
    fn name_id_wire_form() {
        let mut id = name_id("jdoe@example.com", NameIdFormat::Email).unwrap();
        id.set("sp_name_qualifier", "https://sp.example.com").unwrap();
        let node = id.serialize();

        assert_eq!(node.name, "NameID");
        assert_eq!(
            node.attribute("Format"),
            Some("urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress")
        );
        assert_eq!(node.attribute("SPNameQualifier"), Some("https://sp.example.com"));
        assert_eq!(node.text.as_deref(), Some("jdoe@example.com"));
    }

    #[test]
    fn issuer_is_a_name_id_type() {
        assert!(ISSUER.is_subtype_of(&NAME_ID_TYPE));
        assert!(!ISSUER.is_subtype_of(&NAME_ID));

        let node = XmlNode::parse(
            r#"<saml:Issuer xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"
                 Format="urn:oasis:names:tc:SAML:2.0:nameid-format:entity">
               https://idp.example.org/SAML2
             </saml:Issuer>"#,
        )
        .unwrap();
        let parsed = ISSUER.deserialize(&node).unwrap();
        assert_eq!(parsed.text(), Some("https://idp.example.org/SAML2"));
        assert_eq!(
            parsed.str_value("format"),
            Some(NameIdFormat::Entity.uri())
        );
    }
}
