//! End-to-End Integration Tests
//!
//! These tests drive the public API of `saml-protocol` the way a service
//! provider or identity provider would: building catalogue messages,
//! moving them over the HTTP bindings and signing them.

mod bindings;
mod common;
mod schema_roundtrip;
mod signature;
