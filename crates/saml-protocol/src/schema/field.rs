//! Field descriptors.
//!
//! A [`Field`] describes one member of an element type: whether it is an
//! XML attribute or a child element, its wire name, occurrence and default.
//! Descriptors are built in `const` context so element types can be plain
//! statics.

use std::borrow::Cow;

use super::{element::ElementType, utils::pascalize, value::Value, ValueKind};

/// What a field maps to on the wire.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// An attribute carrying a scalar.
    Attribute(ValueKind),
    /// A child element of the given type (or any registered subtype).
    Element {
        /// Declared element type.
        of: &'static ElementType,
        /// Unbounded (or `max_occurs`-bounded) repetition.
        collection: bool,
        /// Upper bound on collection members; `None` is unbounded.
        max_occurs: Option<usize>,
    },
}

/// Describes one member of an element type.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// Field name used by accessors.
    pub name: &'static str,
    /// Explicit attribute wire name.
    pub rename: Option<&'static str>,
    /// Attribute or element.
    pub kind: FieldKind,
    /// Must be present on inbound documents.
    pub required: bool,
    /// Lazily evaluated default.
    pub default: Option<fn() -> Value>,
}

impl Field {
    /// Declares an attribute field.
    #[must_use]
    pub const fn attribute(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            rename: None,
            kind: FieldKind::Attribute(kind),
            required: false,
            default: None,
        }
    }

    /// Declares a singular child element field.
    #[must_use]
    pub const fn element(name: &'static str, of: &'static ElementType) -> Self {
        Self {
            name,
            rename: None,
            kind: FieldKind::Element {
                of,
                collection: false,
                max_occurs: None,
            },
            required: false,
            default: None,
        }
    }

    /// Declares a repeated child element field.
    #[must_use]
    pub const fn collection(name: &'static str, of: &'static ElementType) -> Self {
        Self {
            name,
            rename: None,
            kind: FieldKind::Element {
                of,
                collection: true,
                max_occurs: None,
            },
            required: false,
            default: None,
        }
    }

    /// Overrides the attribute wire name.
    #[must_use]
    pub const fn named(mut self, wire_name: &'static str) -> Self {
        self.rename = Some(wire_name);
        self
    }

    /// Marks the field as required on inbound documents.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the default producer.
    #[must_use]
    pub const fn with_default(mut self, producer: fn() -> Value) -> Self {
        self.default = Some(producer);
        self
    }

    /// Bounds the number of members a collection field accepts.
    #[must_use]
    pub const fn max_occurs(mut self, bound: usize) -> Self {
        if let FieldKind::Element { of, collection, .. } = self.kind {
            self.kind = FieldKind::Element {
                of,
                collection,
                max_occurs: Some(bound),
            };
        }
        self
    }

    /// Returns true for attribute fields.
    #[must_use]
    pub const fn is_attribute(&self) -> bool {
        matches!(self.kind, FieldKind::Attribute(_))
    }

    /// Returns true for repeated element fields.
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self.kind, FieldKind::Element { collection: true, .. })
    }

    /// Returns the declared element type of an element field.
    #[must_use]
    pub const fn element_type(&self) -> Option<&'static ElementType> {
        match self.kind {
            FieldKind::Element { of, .. } => Some(of),
            FieldKind::Attribute(_) => None,
        }
    }

    /// Returns the name used on the wire.
    ///
    /// Attributes use their explicit name or the Pascal-cased field name;
    /// elements use the tag of their declared type.
    #[must_use]
    pub fn wire_name(&self) -> Cow<'static, str> {
        match (self.rename, self.kind) {
            (Some(name), _) => Cow::Borrowed(name),
            (None, FieldKind::Element { of, .. }) => of.tag(),
            (None, FieldKind::Attribute(_)) => Cow::Owned(pascalize(self.name)),
        }
    }

    /// Returns true if `count` members fill the collection.
    pub(crate) fn is_full(&self, count: usize) -> bool {
        match self.kind {
            FieldKind::Element {
                collection: true,
                max_occurs,
                ..
            } => max_occurs.is_some_and(|bound| count >= bound),
            _ => true,
        }
    }
}
