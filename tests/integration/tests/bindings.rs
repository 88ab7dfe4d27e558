//! HTTP-Redirect, HTTP-POST and artifact transport tests.

use base64::Engine;
use saml_protocol::{
    bindings::{HttpPostBinding, SamlMessageType},
    client::{BindingClient, Outbound, Received},
    config::BindingConfig,
    types::*,
    xml::XmlNode,
    SamlError,
};
use url::Url;

use crate::common::{assert_node, init_tracing};

const IDP_SSO: &str = "https://idp.example.org/SAML2/SSO";
const ACS: &str = "https://sp.example.com/SAML2/SSO/POST";

fn query_pairs(url: &str) -> Vec<(String, String)> {
    Url::parse(url)
        .map(|u| u.query_pairs().into_owned().collect())
        .unwrap_or_default()
}

#[test]
fn redirect_response_with_relay_state() -> anyhow::Result<()> {
    init_tracing();
    let client = BindingClient::default();
    let mut response = success_response("https://idp.example.org/SAML2", "identifier_1")?;
    let node = response.serialize();

    let query = client.encode(&node, Some("http://localhost:8080/"))?;
    assert!(query.starts_with("SAMLResponse="));
    assert!(!query.contains("SAMLRequest="));
    assert!(query.ends_with("&RelayState=http%3A%2F%2Flocalhost%3A8080%2F"));

    let Outbound::Redirect(url) = client.send(ACS, &node, Some("http://localhost:8080/"), None)? else {
        anyhow::bail!("expected a redirect");
    };
    let pairs = query_pairs(&url);
    assert!(pairs.iter().any(|(k, _)| k == "SAMLResponse"));
    assert!(pairs.contains(&("RelayState".to_string(), "http://localhost:8080/".to_string())));

    let received = client
        .receive("GET", &query, "")?
        .ok_or_else(|| anyhow::anyhow!("nothing received"))?;
    assert_eq!(received.relay_state(), Some("http://localhost:8080/"));
    let Received::Message { node: decoded, message_type, binding, .. } = &received else {
        anyhow::bail!("expected a message");
    };
    assert_eq!(*message_type, SamlMessageType::Response);
    assert_eq!(*binding, SamlBinding::HttpRedirect);
    assert_node(decoded, &node);
    Ok(())
}

#[test]
fn redirect_request_keeps_destination_query() -> anyhow::Result<()> {
    let client = BindingClient::new(BindingConfig {
        compression_level: 9,
        ..BindingConfig::default()
    });
    let mut request = authn_request("https://sp.example.com/SAML2")?;
    let Outbound::Redirect(url) = client.send_element(
        "https://idp.example.org/SAML2/SSO?tenant=acme",
        &mut request,
        None,
        Some(SamlBinding::HttpRedirect),
    )?
    else {
        anyhow::bail!("expected a redirect");
    };

    let pairs = query_pairs(&url);
    assert_eq!(pairs[0], ("tenant".to_string(), "acme".to_string()));
    assert_eq!(pairs[1].0, "SAMLRequest");
    assert!(!pairs.iter().any(|(k, _)| k == "RelayState"));
    Ok(())
}

#[test]
fn post_body_without_compression() -> anyhow::Result<()> {
    let client = BindingClient::default();
    let mut response = success_response("https://idp.example.org/SAML2", "identifier_1")?;
    let node = response.serialize();
    let xml = node.to_xml()?;

    let payload = base64::engine::general_purpose::STANDARD.encode(&xml);
    let body = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("SAMLResponse", &payload)
        .finish();

    let received = client
        .receive("POST", "", &body)?
        .ok_or_else(|| anyhow::anyhow!("nothing received"))?;
    let Received::Message { node: decoded, message_type, binding, relay_state } = received else {
        anyhow::bail!("expected a message");
    };
    assert_eq!(message_type, SamlMessageType::Response);
    assert_eq!(binding, SamlBinding::HttpPost);
    assert_eq!(relay_state, None);
    assert_node(&decoded, &XmlNode::parse(&xml)?);
    Ok(())
}

#[test]
fn post_form_roundtrip() -> anyhow::Result<()> {
    let client = BindingClient::default();
    let mut request = authn_request("https://sp.example.com/SAML2")?
        .with("assertion_consumer_service_url", ACS)?;
    let node = request.serialize();

    let Outbound::Post(html) = client.send(IDP_SSO, &node, Some("a&b"), Some(SamlBinding::HttpPost))? else {
        anyhow::bail!("expected a form");
    };
    assert!(html.contains(r#"action="https://idp.example.org/SAML2/SSO""#));
    assert!(html.contains(r#"value="a&amp;b""#));

    let marker = r#"name="SAMLRequest" value=""#;
    let start = html.find(marker).map(|i| i + marker.len()).unwrap_or_default();
    let payload = &html[start..start + html[start..].find('"').unwrap_or_default()];
    let decoded = HttpPostBinding::decode(Some(payload), None, Some("a&b"))?;
    assert_node(&decoded.parse()?, &node);

    let typed = client
        .receive(
            "POST",
            "",
            &url::form_urlencoded::Serializer::new(String::new())
                .append_pair("SAMLRequest", payload)
                .finish(),
        )?
        .map(|r| r.deserialize())
        .transpose()?
        .flatten()
        .ok_or_else(|| anyhow::anyhow!("no message"))?;
    assert_eq!(typed.str_value("assertion_consumer_service_url"), Some(ACS));
    Ok(())
}

#[test]
fn artifact_from_query() -> anyhow::Result<()> {
    let client = BindingClient::default();
    let query = "SAMLart=AAQAAMh48%2F1oXIM%2BsDo7Dh2qMp1HM4IF5DaRNmDj6RdUmllwn9jJHyEgIi8%3D&RelayState=xyz";
    let received = client.receive("GET", query, "")?;
    let Some(Received::Artifact { artifact, relay_state }) = received else {
        anyhow::bail!("expected an artifact");
    };
    assert_eq!(artifact, "AAQAAMh48/1oXIM+sDo7Dh2qMp1HM4IF5DaRNmDj6RdUmllwn9jJHyEgIi8=");
    assert_eq!(relay_state.as_deref(), Some("xyz"));

    let mut resolve = artifact_resolve("https://sp.example.com/SAML2", artifact)?;
    assert!(resolve.to_xml_string()?.contains("<samlp:Artifact>AAQAAMh48/1oXIM+"));
    Ok(())
}

#[test]
fn nothing_to_receive() -> anyhow::Result<()> {
    let client = BindingClient::default();
    assert!(client.receive("GET", "foo=bar", "")?.is_none());
    assert!(client.receive("POST", "", "foo=bar")?.is_none());
    assert!(client.receive("PUT", "SAMLRequest=abc", "SAMLRequest=abc")?.is_none());
    Ok(())
}

#[test]
fn corrupt_payloads_are_errors() {
    let client = BindingClient::default();
    assert!(matches!(
        client.receive("GET", "SAMLRequest=%%%", ""),
        Err(SamlError::Base64Decode(_))
    ));
    assert!(matches!(
        client.receive("GET", "SAMLRequest=%2F%2F%2F%2F%2Fw%3D%3D", ""),
        Err(SamlError::Deflate(_))
    ));
    assert!(matches!(
        client.receive("POST", "", "SAMLResponse=PGE%2BPGI%2BPC9hPg%3D%3D"),
        Err(SamlError::XmlParse(_))
    ));
}

#[test]
fn unsupported_outbound_bindings() -> anyhow::Result<()> {
    let client = BindingClient::default();
    let mut request = authn_request("https://sp.example.com/SAML2")?;
    for binding in [SamlBinding::HttpArtifact, SamlBinding::Soap] {
        assert!(matches!(
            client.send_element(IDP_SSO, &mut request, None, Some(binding)),
            Err(SamlError::UnsupportedBinding(_))
        ));
    }

    let stranger = XmlNode::new(Some("urn:example"), Some("x"), "Thing");
    assert!(matches!(
        client.send(IDP_SSO, &stranger, None, None),
        Err(SamlError::UnknownElement(_))
    ));
    Ok(())
}
