//! Artifact resolution types.
//!
//! A receiver holding an artifact sends `<samlp:ArtifactResolve>` to the
//! issuer and receives the referenced message wrapped in
//! `<samlp:ArtifactResponse>`.

use super::{issuer, MESSAGE, SAMLP, STATUS_RESPONSE_TYPE};
use crate::{
    error::SamlResult,
    schema::{Element, ElementType, Field},
};

/// `<samlp:Artifact>`
pub static ARTIFACT: ElementType = ElementType {
    text: true,
    ..ElementType::new("artifact", SAMLP)
};

/// `<samlp:ArtifactResolve>`
pub static ARTIFACT_RESOLVE: ElementType = ElementType {
    base: Some(&MESSAGE),
    fields: &[Field::element("artifact", &ARTIFACT).required()],
    ..ElementType::new("artifact_resolve", SAMLP)
};

/// `<samlp:ArtifactResponse>`, embedding any protocol message.
pub static ARTIFACT_RESPONSE: ElementType = ElementType {
    base: Some(&STATUS_RESPONSE_TYPE),
    fields: &[Field::element("message", &MESSAGE)],
    ..ElementType::new("artifact_response", SAMLP)
};

/// Creates a request resolving `artifact`.
///
/// # Errors
///
/// Never fails for the catalogue type; the `Result` comes from
/// [`Element::with`].
pub fn artifact_resolve(
    entity_id: impl Into<String>,
    artifact: impl Into<String>,
) -> SamlResult<Element> {
    Element::new(&ARTIFACT_RESOLVE)
        .with("issuer", issuer(entity_id))?
        .with("artifact", Element::with_text(&ARTIFACT, artifact))
}
