//! Declarative schema binding.
//!
//! Element types are described once as statics ([`ElementType`] with a list
//! of [`Field`] descriptors) and the codec in [`element`] derives both XML
//! serialization and deserialization from that description. The
//! [`registry`] maps tag names back to types so child elements can be
//! resolved polymorphically.
//!
//! ```rust,ignore
//! use saml_protocol::schema::{Element, ElementType, Field, ValueKind};
//! use saml_protocol::types::SAMLP;
//!
//! static PING: ElementType = ElementType {
//!     fields: &[Field::attribute("id", ValueKind::String).named("ID").required()],
//!     ..ElementType::new("ping", SAMLP)
//! };
//!
//! let mut ping = Element::new(&PING).with("id", "_1")?;
//! assert_eq!(ping.to_xml_string()?, r#"<samlp:Ping xmlns:samlp="..." ID="_1"/>"#);
//! ```

pub mod element;
pub mod field;
pub mod registry;
pub mod utils;
pub mod value;

pub use element::{Element, ElementType};
pub use field::{Field, FieldKind};
pub use registry::TypeRegistry;
pub use utils::pascalize;
pub use value::{format_datetime, parse_datetime, Value, ValueKind};

use crate::{error::SamlResult, xml::XmlNode};

/// An XML namespace with its conventional prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace {
    /// Prefix used when serializing.
    pub prefix: &'static str,
    /// Namespace URI.
    pub uri: &'static str,
}

impl Namespace {
    /// Creates a namespace.
    #[must_use]
    pub const fn new(prefix: &'static str, uri: &'static str) -> Self {
        Self { prefix, uri }
    }
}

/// Deserializes a node whose type is resolved through the registry.
///
/// Returns `Ok(None)` when the root tag is not registered.
///
/// # Errors
///
/// Propagates validation errors from [`ElementType::deserialize`].
pub fn deserialize(node: &XmlNode) -> SamlResult<Option<Element>> {
    registry::resolve(&node.clark_name())
        .map(|ty| ty.deserialize(node))
        .transpose()
}

/// Parses and deserializes an XML document.
///
/// # Errors
///
/// Returns `XmlParse` for malformed XML and validation errors from
/// [`ElementType::deserialize`].
pub fn from_xml(xml: &str) -> SamlResult<Option<Element>> {
    deserialize(&XmlNode::parse(xml)?)
}
