//! SAML 2.0 element catalogue.
//!
//! Every assertion and protocol element is a static [`ElementType`]
//! described with the declarative field builders from [`crate::schema`].
//! Metadata types describe entities and their endpoints.
//! Concrete types are listed in [`CATALOGUE`], which seeds the registry
//! used to resolve tags while deserializing.

mod artifact;
mod assertion;
mod authn_request;
pub mod constants;
mod logout;
mod message;
mod metadata;
mod name_id;
mod response;
mod status;

pub use artifact::*;
pub use assertion::*;
pub use authn_request::*;
pub use constants::*;
pub use logout::*;
pub use message::*;
pub use metadata::*;
pub use name_id::*;
pub use response::*;
pub use status::*;

use chrono::{SubsecRound, Utc};
use uuid::Uuid;

use crate::schema::{ElementType, Value};

/// Every concrete SAML element type, registered by tag on first use.
///
/// Abstract bases (`NameIDType`, `Condition`, `Statement`, the message
/// base, `StatusResponseType` and the metadata endpoint types) are left
/// out; they only appear as the declared type of polymorphic fields.
pub static CATALOGUE: &[&ElementType] = &[
    // assertion namespace
    &NAME_ID,
    &ISSUER,
    &SUBJECT_CONFIRMATION_DATA,
    &SUBJECT_CONFIRMATION,
    &SUBJECT,
    &AUDIENCE,
    &AUDIENCE_RESTRICTION,
    &ONE_TIME_USE,
    &CONDITIONS,
    &AUTHN_CONTEXT_CLASS_REF,
    &AUTHN_CONTEXT,
    &AUTHN_STATEMENT,
    &ATTRIBUTE_VALUE,
    &ATTRIBUTE,
    &ATTRIBUTE_STATEMENT,
    &ASSERTION,
    // protocol namespace
    &NAME_ID_POLICY,
    &REQUESTED_AUTHN_CONTEXT,
    &AUTHN_REQUEST,
    &STATUS_CODE,
    &STATUS_MESSAGE,
    &STATUS,
    &RESPONSE,
    &ARTIFACT,
    &ARTIFACT_RESOLVE,
    &ARTIFACT_RESPONSE,
    &SESSION_INDEX,
    &LOGOUT_REQUEST,
    &LOGOUT_RESPONSE,
    // metadata namespace
    &SINGLE_SIGN_ON_SERVICE,
    &SINGLE_LOGOUT_SERVICE,
    &ASSERTION_CONSUMER_SERVICE,
    &ARTIFACT_RESOLUTION_SERVICE,
    &NAME_ID_FORMAT,
    &SERVICE_NAME,
    &REQUESTED_ATTRIBUTE,
    &ATTRIBUTE_CONSUMING_SERVICE,
    &ROLE_DESCRIPTOR,
    &IDP_SSO_DESCRIPTOR,
    &SP_SSO_DESCRIPTOR,
    &ENTITY_DESCRIPTOR,
    &ENTITIES_DESCRIPTOR,
];

/// Default message and assertion identifier: `_` followed by 32 hex digits.
pub(crate) fn default_id() -> Value {
    Value::Str(format!("_{}", Uuid::new_v4().simple()))
}

pub(crate) fn default_version() -> Value {
    Value::Str(SAML_VERSION.to_string())
}

/// Current time at second precision.
pub(crate) fn default_issue_instant() -> Value {
    Value::DateTime(Utc::now().trunc_subsecs(0))
}
