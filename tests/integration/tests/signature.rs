//! XML signature tests across the wire.

use base64::Engine;
use chrono::{TimeZone, Utc};
use saml_crypto::RsaAlgorithm;
use saml_protocol::{
    client::{BindingClient, Outbound, Received},
    config::{SamlConfig, SignatureConfig},
    schema,
    signature::{self, XmlSignatureValidator, XmlSigner},
    types::*,
    xml::XmlNode,
};

use crate::common::{init_tracing, CERT, KEY, OTHER_CERT, SIGNED_RESPONSE};

fn signed_assertion() -> anyhow::Result<XmlNode> {
    let instant = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let mut assertion = assertion("https://idp.example.org/SAML2")?
        .with("conditions", audience_conditions("https://sp.example.com/SAML2", instant, instant)?)?
        .with("statements", authn_statement(instant, "s1", AuthnContextClass::Password)?)?;
    let signer = XmlSigner::from_pem(KEY, None)?.with_certificate_pem(CERT)?;
    Ok(signer.sign_element(&mut assertion)?)
}

#[test]
fn sign_and_verify_with_free_functions() -> anyhow::Result<()> {
    init_tracing();
    let mut response = success_response("https://idp.example.org/SAML2", "identifier_1")?;
    let mut node = response.serialize();
    signature::sign(&mut node, KEY, None)?;

    assert!(signature::verify(&node, CERT)?);
    assert!(!signature::verify(&node, OTHER_CERT)?);
    Ok(())
}

#[test]
fn signed_message_still_deserializes() -> anyhow::Result<()> {
    let mut response = success_response("https://idp.example.org/SAML2", "identifier_1")?;
    let mut node = response.serialize();
    signature::sign(&mut node, KEY, None)?;

    let names: Vec<_> = node.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Issuer", "Signature", "Status"]);

    let parsed = schema::from_xml(&node.to_xml()?)?.ok_or_else(|| anyhow::anyhow!("unregistered"))?;
    assert_eq!(parsed.str_value("in_response_to"), Some("identifier_1"));
    Ok(())
}

#[test]
fn signed_assertion_survives_post_binding() -> anyhow::Result<()> {
    let mut response = success_response("https://idp.example.org/SAML2", "identifier_1")?;
    let mut node = response.serialize();
    node.children.push(signed_assertion()?);

    let client = BindingClient::default();
    let Outbound::Post(html) = client.send(
        "https://sp.example.com/SAML2/SSO/POST",
        &node,
        None,
        Some(SamlBinding::HttpPost),
    )?
    else {
        anyhow::bail!("expected a form");
    };

    let marker = r#"name="SAMLResponse" value=""#;
    let start = html.find(marker).map(|i| i + marker.len()).unwrap_or_default();
    let payload = &html[start..start + html[start..].find('"').unwrap_or_default()];
    let body = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("SAMLResponse", payload)
        .finish();

    let Some(Received::Message { node: received, .. }) = client.receive("POST", "", &body)? else {
        anyhow::bail!("expected a message");
    };
    let validator = XmlSignatureValidator::from_pem(CERT)?;
    assert!(validator.verify(&received));
    Ok(())
}

#[test]
fn tampered_assertion_fails() -> anyhow::Result<()> {
    let mut node = signed_assertion()?;
    let issuer = node
        .children
        .iter_mut()
        .find(|c| c.is(SAML_NS, "Issuer"))
        .ok_or_else(|| anyhow::anyhow!("no issuer"))?;
    issuer.text = Some("https://evil.example.com".to_string());

    assert!(!XmlSignatureValidator::from_pem(CERT)?.verify(&node));
    Ok(())
}

#[test]
fn configured_algorithm_is_used() -> anyhow::Result<()> {
    let config = SamlConfig::from_json(r#"{"signature": {"algorithm": "RS384"}}"#)?;
    let signer = XmlSigner::from_pem(KEY, None)?.with_config(config.signature);
    let mut request = authn_request("https://sp.example.com/SAML2")?;
    let node = signer.sign_element(&mut request)?;

    let method = node
        .child(XMLDSIG_NS, "Signature")
        .and_then(|s| s.child(XMLDSIG_NS, "SignedInfo"))
        .and_then(|si| si.child(XMLDSIG_NS, "SignatureMethod"))
        .and_then(|m| m.attribute("Algorithm"));
    assert_eq!(method, Some(RsaAlgorithm::Sha384.xml_dsig_uri()));

    let validator = XmlSignatureValidator::from_pem(CERT)?.with_config(&config);
    assert!(validator.verify(&XmlNode::parse(&node.to_xml()?)?));
    Ok(())
}

#[test]
fn sha1_is_refused_for_signing() -> anyhow::Result<()> {
    let signer = XmlSigner::from_pem(KEY, None)?
        .with_config(SignatureConfig::with_algorithm(RsaAlgorithm::Sha1));
    let mut request = authn_request("https://sp.example.com/SAML2")?;
    assert!(signer.sign_element(&mut request).is_err());
    Ok(())
}

#[test]
fn indented_peer_response_verifies_after_transport() -> anyhow::Result<()> {
    let payload = base64::engine::general_purpose::STANDARD.encode(SIGNED_RESPONSE);
    let body = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("SAMLResponse", &payload)
        .finish();

    let client = BindingClient::default();
    let Some(received) = client.receive("POST", "", &body)? else {
        anyhow::bail!("nothing received");
    };
    let Received::Message { node, .. } = &received else {
        anyhow::bail!("expected a message");
    };
    assert!(signature::verify(node, CERT)?);

    let response = received
        .deserialize()?
        .ok_or_else(|| anyhow::anyhow!("unregistered"))?;
    assert_eq!(response.str_value("in_response_to"), Some("identifier_1"));
    let assertion = &response.children("assertions")[0];
    assert_eq!(assertion.str_value("id"), Some("_a1"));
    Ok(())
}
