//! SAML Response type.
//!
//! A response delivers assertions from the identity provider back to the
//! service provider.

use super::{issuer, status_success, ASSERTION, SAMLP, STATUS_RESPONSE_TYPE};
use crate::{
    error::SamlResult,
    schema::{Element, ElementType, Field},
};

/// `<samlp:Response>`
pub static RESPONSE: ElementType = ElementType {
    base: Some(&STATUS_RESPONSE_TYPE),
    fields: &[Field::collection("assertions", &ASSERTION)],
    ..ElementType::new("response", SAMLP)
};

/// Creates a successful response answering `request_id`.
///
/// # Errors
///
/// Never fails for the catalogue type; the `Result` comes from
/// [`Element::with`].
pub fn success_response(
    idp_entity_id: impl Into<String>,
    request_id: impl Into<String>,
) -> SamlResult<Element> {
    Element::new(&RESPONSE)
        .with("issuer", issuer(idp_entity_id))?
        .with("in_response_to", request_id.into())?
        .with("status", status_success()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::SamlError,
        types::{assertion, status_code_value, status_codes},
        xml::XmlNode,
    };

    #[test]
    fn response_with_assertions() {
        let mut response = success_response("https://idp.example.org/SAML2", "_req").unwrap();
        response
            .set("assertions", assertion("https://idp.example.org/SAML2").unwrap())
            .unwrap();
        response
            .set("assertions", assertion("https://idp.example.org/SAML2").unwrap())
            .unwrap();

        let xml = response.to_xml_string().unwrap();
        let parsed = RESPONSE.deserialize(&XmlNode::parse(&xml).unwrap()).unwrap();
        assert_eq!(parsed.children("assertions").len(), 2);
        assert_eq!(parsed.str_value("in_response_to"), Some("_req"));
        assert_eq!(
            parsed.child("status").and_then(status_code_value),
            Some(status_codes::SUCCESS)
        );
    }

    #[test]
    fn response_requires_status() {
        let node = XmlNode::parse(
            r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
                 ID="_r" Version="2.0" IssueInstant="2004-12-05T09:22:05Z"/>"#,
        )
        .unwrap();
        assert!(matches!(
            RESPONSE.deserialize(&node),
            Err(SamlError::MissingField { field: "status", .. })
        ));
    }
}
