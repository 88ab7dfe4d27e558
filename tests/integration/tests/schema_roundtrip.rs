//! Catalogue round trips and ingestion rules.

use chrono::{TimeZone, Utc};
use saml_protocol::{
    schema::{self, Element, Value},
    types::*,
    xml::XmlNode,
    SamlError,
};

use crate::common::{assert_roundtrip, init_tracing, reparse};

const SP: &str = "https://sp.example.com/SAML2";
const IDP: &str = "https://idp.example.org/SAML2";
const ACS: &str = "https://sp.example.com/SAML2/SSO/POST";

fn full_assertion() -> anyhow::Result<Element> {
    let instant = Utc.with_ymd_and_hms(2004, 12, 5, 9, 22, 5).unwrap();
    let expiry = Utc.with_ymd_and_hms(2004, 12, 5, 9, 27, 5).unwrap();

    let subject = Element::new(&SUBJECT)
        .with("name_id", name_id("3f7b3dcf-1674-4ecd-92c8-1544f346baf8", NameIdFormat::Transient)?)?
        .with("confirmations", bearer_confirmation("identifier_1", ACS, expiry)?)?;

    let statement = Element::new(&ATTRIBUTE_STATEMENT)
        .with("attributes", attribute("mail", ["alice@example.com"])?)?
        .with("attributes", attribute("groups", ["staff", "admins"])?)?;

    Ok(assertion(IDP)?
        .with("id", "identifier_3")?
        .with("issue_instant", instant)?
        .with("subject", subject)?
        .with("conditions", audience_conditions(SP, instant, expiry)?)?
        .with(
            "statements",
            authn_statement(instant, "identifier_3", AuthnContextClass::PasswordProtectedTransport)?,
        )?
        .with("statements", statement)?)
}

#[test]
fn authn_request_scenario() -> anyhow::Result<()> {
    let mut request = authn_request(SP)?
        .with("id", "aaf23196-1773-2113-474a-fe114412ab72")?
        .with("issue_instant", Utc.with_ymd_and_hms(2004, 12, 5, 9, 21, 59).unwrap())?
        .with("assertion_consumer_service_index", 0_i64)?
        .with("attribute_consuming_service_index", 0_i64)?
        .with("name_id_policy", name_id_policy(NameIdFormat::Transient, true)?)?;

    let node = request.serialize();
    assert!(node.is(SAMLP_NS, "AuthnRequest"));
    assert_eq!(node.attribute("ID"), Some("aaf23196-1773-2113-474a-fe114412ab72"));
    assert_eq!(node.attribute("Version"), Some("2.0"));
    assert_eq!(node.attribute("IssueInstant"), Some("2004-12-05T09:21:59Z"));
    assert_eq!(node.attribute("AssertionConsumerServiceIndex"), Some("0"));
    assert_eq!(node.attribute("AttributeConsumingServiceIndex"), Some("0"));

    let declared: Vec<_> = node.namespaces.iter().map(|(p, uri)| (p.as_deref(), uri.as_str())).collect();
    assert!(declared.contains(&(Some("samlp"), SAMLP_NS)));
    assert!(declared.contains(&(Some("saml"), SAML_NS)));

    let names: Vec<_> = node.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Issuer", "NameIDPolicy"]);
    assert_eq!(node.children[0].text.as_deref(), Some(SP));
    let policy = &node.children[1];
    assert_eq!(policy.attribute("AllowCreate"), Some("true"));
    assert_eq!(policy.attribute("Format"), Some(NameIdFormat::Transient.uri()));

    let parsed = assert_roundtrip(&mut request)?;
    assert_eq!(
        parsed.child("name_id_policy").and_then(|p| p.peek("allow_create")),
        Some(&Value::Bool(true))
    );
    Ok(())
}

#[test]
fn response_with_assertion_roundtrip() -> anyhow::Result<()> {
    init_tracing();
    let mut response = success_response(IDP, "identifier_1")?
        .with("destination", ACS)?
        .with("assertions", full_assertion()?)?;

    let parsed = assert_roundtrip(&mut response)?;
    assert_eq!(
        parsed.child("status").and_then(status_code_value),
        Some(status_codes::SUCCESS)
    );

    let assertion = &parsed.children("assertions")[0];
    let statements = assertion.children("statements");
    assert_eq!(statements.len(), 2);
    assert!(std::ptr::eq(statements[0].element_type(), &AUTHN_STATEMENT));
    assert!(std::ptr::eq(statements[1].element_type(), &ATTRIBUTE_STATEMENT));

    let groups = &statements[1].children("attributes")[1];
    let values: Vec<_> = groups.children("values").iter().filter_map(Element::text).collect();
    assert_eq!(values, ["staff", "admins"]);
    Ok(())
}

#[test]
fn logout_roundtrip() -> anyhow::Result<()> {
    let mut request = Element::new(&LOGOUT_REQUEST)
        .with("issuer", issuer(SP))?
        .with("destination", "https://idp.example.org/SAML2/SLO")?
        .with("reason", "urn:oasis:names:tc:SAML:2.0:logout:user")?
        .with("name_id", name_id("alice@example.com", NameIdFormat::Email)?)?
        .with("session_indexes", Element::with_text(&SESSION_INDEX, "s1"))?
        .with("session_indexes", Element::with_text(&SESSION_INDEX, "s2"))?;
    let parsed = assert_roundtrip(&mut request)?;
    assert_eq!(parsed.children("session_indexes").len(), 2);

    let request_id = request.str_value("id").map(str::to_string);
    let mut response = Element::new(&LOGOUT_RESPONSE)
        .with("issuer", issuer(IDP))?
        .with("in_response_to", request_id.clone().unwrap_or_default())?
        .with("status", status(status_codes::PARTIAL_LOGOUT)?)?;
    let parsed = assert_roundtrip(&mut response)?;
    assert_eq!(parsed.str_value("in_response_to"), request_id.as_deref());
    Ok(())
}

#[test]
fn artifact_roundtrip() -> anyhow::Result<()> {
    let artifact = "AAQAAMh48/1oXIM+sDo7Dh2qMp1HM4IF5DaRNmDj6RdUmllwn9jJHyEgIi8=";
    let mut resolve = artifact_resolve(SP, artifact)?;
    let parsed = assert_roundtrip(&mut resolve)?;
    assert_eq!(parsed.child("artifact").and_then(Element::text), Some(artifact));

    let mut response = Element::new(&ARTIFACT_RESPONSE)
        .with("issuer", issuer(IDP))?
        .with("status", status_success()?)?
        .with("message", success_response(IDP, "identifier_1")?)?;
    let parsed = assert_roundtrip(&mut response)?;
    let embedded = parsed.child("message").map(Element::element_type);
    assert!(embedded.is_some_and(|ty| std::ptr::eq(ty, &RESPONSE)));
    Ok(())
}

#[test]
fn nested_status_code_roundtrip() -> anyhow::Result<()> {
    let inner = Element::new(&STATUS_CODE).with("value", status_codes::NO_PASSIVE)?;
    let code = Element::new(&STATUS_CODE)
        .with("value", status_codes::RESPONDER)?
        .with("status_code", inner)?;
    let failure = Element::new(&STATUS)
        .with("status_code", code)?
        .with("status_message", Element::with_text(&STATUS_MESSAGE, "passive login impossible"))?;
    let mut response = Element::new(&RESPONSE)
        .with("issuer", issuer(IDP))?
        .with("status", failure)?;

    let parsed = assert_roundtrip(&mut response)?;
    let nested = parsed
        .child("status")
        .and_then(|s| s.child("status_code"))
        .and_then(|c| c.child("status_code"))
        .and_then(|c| c.str_value("value"));
    assert_eq!(nested, Some(status_codes::NO_PASSIVE));
    Ok(())
}

#[test]
fn fields_serialize_in_declaration_order() -> anyhow::Result<()> {
    let mut request = Element::new(&AUTHN_REQUEST)
        .with("name_id_policy", name_id_policy(NameIdFormat::Persistent, false)?)?
        .with("destination", "https://idp.example.org/SAML2/SSO")?
        .with("issuer", issuer(SP))?;
    let node = request.serialize();
    let names: Vec<_> = node.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Issuer", "NameIDPolicy"]);
    Ok(())
}

#[test]
fn defaults_are_generated_once() -> anyhow::Result<()> {
    let mut request = authn_request(SP)?;
    assert!(request.peek("id").is_none());

    let first = request.get("id")?.cloned();
    let second = request.get("id")?.cloned();
    assert!(first.is_some());
    assert_eq!(first, second);

    let node = request.serialize();
    assert_eq!(node.attribute("ID"), first.as_ref().and_then(Value::as_str));
    Ok(())
}

#[test]
fn assertion_without_issuer_is_rejected() {
    let xml = r#"<saml:Assertion xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" ID="a1" Version="2.0" IssueInstant="2004-12-05T09:22:05Z"><saml:Subject/></saml:Assertion>"#;
    let err = schema::from_xml(xml).unwrap_err();
    assert!(err.is_validation());
    assert!(matches!(err, SamlError::MissingField { field: "issuer", .. }));
}

#[test]
fn message_without_id_is_rejected() {
    let xml = r#"<samlp:AuthnRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" Version="2.0" IssueInstant="2004-12-05T09:22:05Z"/>"#;
    assert!(matches!(
        schema::from_xml(xml),
        Err(SamlError::MissingField { field: "id", .. })
    ));

    let xml = r#"<samlp:AuthnRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" ID="" Version="2.0" IssueInstant="2004-12-05T09:22:05Z"/>"#;
    assert!(matches!(
        schema::from_xml(xml),
        Err(SamlError::MissingField { field: "id", .. })
    ));
}

#[test]
fn empty_attributes_are_absent() -> anyhow::Result<()> {
    let xml = r#"<samlp:AuthnRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" ID="r1" Version="2.0" IssueInstant="2004-12-05T09:21:59Z" AssertionConsumerServiceIndex="" Destination=""/>"#;
    let request = schema::from_xml(xml)?.ok_or_else(|| anyhow::anyhow!("unregistered"))?;
    assert_eq!(request.peek("assertion_consumer_service_index"), None);
    assert_eq!(request.peek("destination"), None);
    Ok(())
}

#[test]
fn deeply_nested_status_codes_are_refused() {
    let depth = 10_000;
    let xml = format!(
        r#"<samlp:Status xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol">{}{}</samlp:Status>"#,
        r#"<samlp:StatusCode Value="v">"#.repeat(depth),
        "</samlp:StatusCode>".repeat(depth),
    );
    assert!(matches!(schema::from_xml(&xml), Err(SamlError::XmlParse(_))));

    let shallow = format!(
        r#"<samlp:Status xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol">{}{}</samlp:Status>"#,
        r#"<samlp:StatusCode Value="v">"#.repeat(50),
        "</samlp:StatusCode>".repeat(50),
    );
    assert!(schema::from_xml(&shallow).is_ok());
}

#[test]
fn unknown_extensions_are_skipped() -> anyhow::Result<()> {
    init_tracing();
    let xml = r#"<samlp:AuthnRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" ID="r1" Version="2.0" IssueInstant="2004-12-05T09:21:59Z">
  <saml:Issuer>https://sp.example.com/SAML2</saml:Issuer>
  <samlp:Extensions><ext:Hint xmlns:ext="urn:example:ext">x</ext:Hint></samlp:Extensions>
  <samlp:NameIDPolicy AllowCreate="false"/>
</samlp:AuthnRequest>"#;
    let request = schema::from_xml(xml)?.ok_or_else(|| anyhow::anyhow!("unregistered"))?;
    assert_eq!(request.child("issuer").and_then(Element::text), Some(SP));
    assert_eq!(
        request.child("name_id_policy").and_then(|p| p.peek("allow_create")),
        Some(&Value::Bool(false))
    );
    Ok(())
}

#[test]
fn malformed_values_are_rejected() {
    let xml = r#"<samlp:AuthnRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" ID="r1" Version="2.0" IssueInstant="2004-12-05T09:21:59.500Z"/>"#;
    assert!(matches!(
        schema::from_xml(xml),
        Err(SamlError::MalformedValue { field: "issue_instant", .. })
    ));

    let xml = r#"<samlp:AuthnRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" ID="r1" Version="2.0" IssueInstant="2004-12-05T09:21:59Z" AssertionConsumerServiceIndex="x1"/>"#;
    assert!(matches!(
        schema::from_xml(xml),
        Err(SamlError::MalformedValue { field: "assertion_consumer_service_index", .. })
    ));
}

#[test]
fn blank_booleans_are_absent() -> anyhow::Result<()> {
    let xml = r#"<samlp:AuthnRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" ID="r1" Version="2.0" IssueInstant="2004-12-05T09:21:59Z" ForceAuthn="" IsPassive="false"/>"#;
    let request = schema::from_xml(xml)?.ok_or_else(|| anyhow::anyhow!("unregistered"))?;
    assert_eq!(request.peek("force_authn"), None);
    assert_eq!(request.peek("is_passive"), Some(&Value::Bool(false)));
    Ok(())
}

#[test]
fn unregistered_root_is_not_an_error() -> anyhow::Result<()> {
    assert!(schema::from_xml(r#"<x:Thing xmlns:x="urn:example"/>"#)?.is_none());
    Ok(())
}

#[test]
fn every_catalogue_type_serializes_under_its_registered_name() {
    for &ty in CATALOGUE {
        let node = Element::new(ty).serialize();
        assert_eq!(node.clark_name(), ty.clark_name());
        let reparsed = XmlNode::parse(&node.to_xml().unwrap()).unwrap();
        assert_eq!(reparsed.clark_name(), ty.clark_name());
    }
}

#[test]
fn reparse_keeps_generated_values() -> anyhow::Result<()> {
    let mut assertion = full_assertion()?;
    let parsed = reparse(&mut assertion)?;
    assert_eq!(parsed.str_value("id"), Some("identifier_3"));
    assert_eq!(
        parsed
            .child("subject")
            .map(|s| s.children("confirmations")[0].str_value("method")),
        Some(Some(confirmation_methods::BEARER))
    );
    Ok(())
}

#[test]
fn metadata_roundtrip() -> anyhow::Result<()> {
    let until = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    let slo = endpoint(
        &SINGLE_LOGOUT_SERVICE,
        SamlBinding::HttpRedirect,
        "https://sp.example.com/SAML2/SLO",
    )?
    .with("response_location", "https://sp.example.com/SAML2/SLO/return")?;
    let consuming = Element::new(&ATTRIBUTE_CONSUMING_SERVICE)
        .with("index", 0_i64)?
        .with(
            "service_names",
            Element::with_text(&SERVICE_NAME, "Example portal").with("lang", "en")?,
        )?
        .with("requested_attributes", Element::new(&REQUESTED_ATTRIBUTE).with("name", "mail")?)?;

    let mut sp = sp_metadata(SP, ACS, NameIdFormat::Persistent)?.with("valid_until", until)?;
    let descriptor = sp.children("descriptors")[0]
        .clone()
        .with("single_logout_services", slo)?
        .with("attribute_consuming_services", consuming)?
        .with("want_assertions_signed", true)?;
    sp.remove("descriptors");
    sp.set("descriptors", descriptor)?;

    let idp = idp_metadata(IDP, "https://idp.example.org/SAML2/SSO", &SamlBinding::ALL[..2])?;
    let mut federation = Element::new(&ENTITIES_DESCRIPTOR)
        .with("name", "urn:example:federation")?
        .with("entities", vec![sp, idp])?;

    let parsed = assert_roundtrip(&mut federation)?;
    let entities = parsed.children("entities");
    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0].peek("valid_until").and_then(Value::as_datetime), Some(until));

    let sp_descriptor = &entities[0].children("descriptors")[0];
    assert_eq!(sp_descriptor.element_type(), &SP_SSO_DESCRIPTOR);
    let consuming = &sp_descriptor.children("attribute_consuming_services")[0];
    let lang = consuming.children("service_names")[0].str_value("lang");
    assert_eq!(lang, Some("en"));

    let idp_descriptor = &entities[1].children("descriptors")[0];
    assert_eq!(idp_descriptor.children("single_sign_on_services").len(), 2);
    assert_eq!(
        idp_descriptor.peek("want_authn_requests_signed"),
        Some(&Value::Bool(true))
    );
    Ok(())
}
