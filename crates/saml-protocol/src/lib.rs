//! SAML 2.0 protocol messages as declarative element types.
//!
//! Every SAML element is described once by a static [`schema::ElementType`]
//! listing its attributes and child elements. The same description drives
//! parsing, validation, default values and serialization, so adding a
//! message kind is a matter of declaring its fields.
//!
//! # Architecture
//!
//! - [`schema`] - Element types, field descriptors, values and the type registry
//! - [`types`] - The SAML assertion and protocol catalogue
//! - [`xml`] - A small owned XML tree and exclusive canonicalization
//! - [`signature`] - Enveloped XML-DSig signing and validation
//! - [`bindings`] - HTTP-Redirect and HTTP-POST encodings
//! - [`client`] - Sending and receiving messages over a binding
//! - [`config`] - Signature and binding settings
//! - [`error`] - Error types for SAML operations
//!
//! # Example
//!
//! ```rust
//! use saml_protocol::{schema, types};
//!
//! let mut request = types::authn_request("https://sp.example.com/SAML2")?;
//! let xml = request.to_xml_string()?;
//!
//! let parsed = schema::from_xml(&xml)?.expect("registered root");
//! assert_eq!(parsed.element_type().tag(), "AuthnRequest");
//! # Ok::<(), saml_protocol::SamlError>(())
//! ```
//!
//! # SAML Specifications
//!
//! - [SAML 2.0 Core](https://docs.oasis-open.org/security/saml/v2.0/saml-core-2.0-os.pdf)
//! - [SAML 2.0 Bindings](https://docs.oasis-open.org/security/saml/v2.0/saml-bindings-2.0-os.pdf)
//! - [Exclusive XML Canonicalization](https://www.w3.org/TR/xml-exc-c14n/)
//! - [XML Signature](https://www.w3.org/TR/xmldsig-core1/)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bindings;
pub mod client;
pub mod config;
pub mod error;
pub mod schema;
pub mod signature;
pub mod types;
pub mod xml;

pub use error::{SamlError, SamlResult};
