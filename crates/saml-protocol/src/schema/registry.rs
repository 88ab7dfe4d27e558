//! Registry mapping namespace-qualified tag names to element types.
//!
//! Deserialization resolves every child tag through the process-wide
//! registry, which is seeded with the SAML catalogue on first use.

use std::{collections::HashMap, ptr, sync::LazyLock};

use parking_lot::RwLock;
use tracing::warn;

use super::element::ElementType;
use crate::types::CATALOGUE;

/// Registry of element types keyed by Clark name (`{uri}local`).
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: RwLock<HashMap<String, &'static ElementType>>,
}

impl TypeRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the given types under their own wire names.
    #[must_use]
    pub fn with_types(types: &[&'static ElementType]) -> Self {
        let registry = Self::new();
        for &ty in types {
            registry.register(ty);
        }
        registry
    }

    /// Registers a type under its own wire name.
    pub fn register(&self, ty: &'static ElementType) {
        self.register_as(ty.clark_name(), ty);
    }

    /// Registers a type under an explicit wire name; the last registration wins.
    pub fn register_as(&self, wire_name: impl Into<String>, ty: &'static ElementType) {
        let wire_name = wire_name.into();
        if let Some(previous) = self.types.write().insert(wire_name.clone(), ty) {
            if !ptr::eq(previous, ty) {
                warn!(
                    wire_name = %wire_name,
                    previous = previous.ident,
                    replacement = ty.ident,
                    "element type registration replaced"
                );
            }
        }
    }

    /// Looks up a type by Clark name.
    #[must_use]
    pub fn resolve(&self, wire_name: &str) -> Option<&'static ElementType> {
        self.types.read().get(wire_name).copied()
    }

    /// Returns the number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }
}

static GLOBAL: LazyLock<TypeRegistry> = LazyLock::new(|| TypeRegistry::with_types(CATALOGUE));

/// Returns the process-wide registry.
pub fn global() -> &'static TypeRegistry {
    &GLOBAL
}

/// Registers a type in the process-wide registry.
pub fn register(ty: &'static ElementType) {
    GLOBAL.register(ty);
}

/// Registers a type under an explicit wire name in the process-wide registry.
pub fn register_as(wire_name: impl Into<String>, ty: &'static ElementType) {
    GLOBAL.register_as(wire_name, ty);
}

/// Resolves a Clark name through the process-wide registry.
#[must_use]
pub fn resolve(wire_name: &str) -> Option<&'static ElementType> {
    GLOBAL.resolve(wire_name)
}
