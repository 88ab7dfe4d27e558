//! Common test utilities and fixtures.

use saml_protocol::{schema, schema::Element, xml::XmlNode};

/// Private key matching [`CERT`].
pub const KEY: &str = include_str!("../../../crates/saml-protocol/testdata/key.pem");
/// Self-signed certificate for [`KEY`].
pub const CERT: &str = include_str!("../../../crates/saml-protocol/testdata/cert.pem");
/// Certificate for an unrelated key.
pub const OTHER_CERT: &str = include_str!("../../../crates/saml-protocol/testdata/other-cert.pem");
/// Indented response with an assertion signed by openssl under [`KEY`].
pub const SIGNED_RESPONSE: &str =
    include_str!("../../../crates/saml-protocol/testdata/signed-response.xml");

/// Installs a test subscriber once so library `tracing` output shows up
/// with `RUST_LOG=saml_protocol=debug`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Asserts that two trees are structurally equal, printing both on failure.
pub fn assert_node(actual: &XmlNode, expected: &XmlNode) {
    assert!(
        actual.same_structure(expected),
        "trees differ\n  actual:   {}\n  expected: {}",
        actual.to_xml().unwrap_or_default(),
        expected.to_xml().unwrap_or_default(),
    );
}

/// Serializes `element`, reparses the text and deserializes it again.
pub fn reparse(element: &mut Element) -> anyhow::Result<Element> {
    let xml = element.to_xml_string()?;
    schema::from_xml(&xml)?.ok_or_else(|| anyhow::anyhow!("unregistered root in {xml}"))
}

/// Round-trips `element` through text and checks the re-serialized tree.
pub fn assert_roundtrip(element: &mut Element) -> anyhow::Result<Element> {
    let original = element.serialize();
    let mut parsed = reparse(element)?;
    assert!(std::ptr::eq(parsed.element_type(), element.element_type()));
    assert_node(&parsed.serialize(), &original);
    Ok(parsed)
}
