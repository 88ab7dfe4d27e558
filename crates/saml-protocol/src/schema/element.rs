//! Element types and instances, and the codec that maps them to XML.
//!
//! An [`ElementType`] is a static description: namespace, wire name, base
//! type and ordered fields. An [`Element`] is a value of such a type holding
//! field values by name. Serialization walks the fields in declared order;
//! deserialization matches the node's children against the element fields
//! with a single forward cursor.

use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap},
    fmt, ptr,
    sync::LazyLock,
};

use parking_lot::RwLock;
use tracing::trace;

use super::{
    field::{Field, FieldKind},
    registry,
    utils::pascalize,
    value::Value,
    Namespace,
};
use crate::{
    error::{SamlError, SamlResult},
    xml::{clark, XmlNode},
};

/// Flattened field lists, keyed by the address of their static type.
static FLATTENED: LazyLock<RwLock<HashMap<usize, &'static [&'static Field]>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Static description of an XML element type.
pub struct ElementType {
    /// Identifier the wire name is derived from.
    pub ident: &'static str,
    /// Explicit wire name.
    pub name: Option<&'static str>,
    /// Namespace and conventional prefix.
    pub namespace: Namespace,
    /// Base type whose fields come first.
    pub base: Option<&'static ElementType>,
    /// Fields declared on this type, in wire order.
    pub fields: &'static [Field],
    /// Whether instances carry character content.
    pub text: bool,
    /// Child position where an enveloped signature is inserted.
    pub signature_index: usize,
    /// Abstract types are never registered for tag lookup.
    pub is_abstract: bool,
}

impl ElementType {
    /// Creates a type with no fields.
    #[must_use]
    pub const fn new(ident: &'static str, namespace: Namespace) -> Self {
        Self {
            ident,
            name: None,
            namespace,
            base: None,
            fields: &[],
            text: false,
            signature_index: 1,
            is_abstract: false,
        }
    }

    /// Returns the local wire name.
    #[must_use]
    pub fn tag(&self) -> Cow<'static, str> {
        match self.name {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(pascalize(self.ident)),
        }
    }

    /// Returns the namespace-qualified wire name in Clark notation.
    #[must_use]
    pub fn clark_name(&self) -> String {
        clark(Some(self.namespace.uri), &self.tag())
    }

    /// Returns all fields, base type fields first.
    ///
    /// A field redeclared by a derived type takes the place of the inherited
    /// one. The list is built on first use and shared afterwards.
    #[must_use]
    pub fn fields(&'static self) -> &'static [&'static Field] {
        let key = ptr::from_ref(self) as usize;
        if let Some(fields) = FLATTENED.read().get(&key).copied() {
            return fields;
        }
        *FLATTENED
            .write()
            .entry(key)
            .or_insert_with(|| Box::leak(self.flatten().into_boxed_slice()))
    }

    fn flatten(&self) -> Vec<&'static Field> {
        let mut chain = vec![self.fields];
        let mut base = self.base;
        while let Some(ty) = base {
            chain.push(ty.fields);
            base = ty.base;
        }

        let mut fields: Vec<&'static Field> = Vec::new();
        for declared in chain.into_iter().rev() {
            for field in declared {
                match fields.iter_mut().find(|f| f.name == field.name) {
                    Some(slot) => *slot = field,
                    None => fields.push(field),
                }
            }
        }
        fields
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&'static self, name: &str) -> Option<&'static Field> {
        self.fields().iter().copied().find(|f| f.name == name)
    }

    /// Returns true if this type is `other` or derives from it.
    #[must_use]
    pub fn is_subtype_of(&self, other: &Self) -> bool {
        let mut current = Some(self);
        while let Some(ty) = current {
            if ptr::eq(ty, other) {
                return true;
            }
            current = ty.base;
        }
        false
    }

    /// Returns true if this type or a base carries character content.
    #[must_use]
    pub fn supports_text(&self) -> bool {
        self.text || self.base.is_some_and(Self::supports_text)
    }

    /// Field descriptors cannot be removed from a type.
    ///
    /// # Errors
    ///
    /// Always returns `InvalidOperation`.
    pub fn remove(&self, field: &str) -> SamlResult<()> {
        Err(SamlError::InvalidOperation(format!(
            "field `{field}` cannot be deleted from type <{}>",
            self.tag()
        )))
    }

    /// Builds an instance of this type from an XML node.
    ///
    /// Attributes are looked up by wire name. Child elements are matched to
    /// element fields in declared order: unrecognized children are skipped,
    /// a child whose type does not fit the current field moves matching on
    /// to the next field, and a collection field keeps consuming children
    /// until one does not fit or its bound is reached. Matching stops when
    /// the children run out.
    ///
    /// # Errors
    ///
    /// Returns `MalformedValue` when an attribute fails its codec and
    /// `MissingField` when a required field is unset afterwards.
    pub fn deserialize(&'static self, node: &XmlNode) -> SamlResult<Element> {
        let mut instance = Element::new(self);
        let fields = self.fields();

        for field in fields {
            let FieldKind::Attribute(kind) = field.kind else {
                continue;
            };
            let Some(text) = node.attribute(&field.wire_name()) else {
                continue;
            };
            match kind.clean(text) {
                Ok(Some(value)) => {
                    instance.state.insert(field.name, value);
                }
                Ok(None) => {}
                Err(reason) => {
                    return Err(SamlError::MalformedValue {
                        element: self.tag().into_owned(),
                        field: field.name,
                        value: text.to_string(),
                        reason,
                    })
                }
            }
        }

        let elements: Vec<&'static Field> =
            fields.iter().copied().filter(|f| !f.is_attribute()).collect();
        let mut index = 0;
        let mut cursor = 0;
        while let Some(field) = elements.get(index) {
            let Some(child) = node.children.get(cursor) else {
                break;
            };
            let Some(declared) = field.element_type() else {
                index += 1;
                continue;
            };

            let Some(resolved) = registry::resolve(&child.clark_name()) else {
                trace!(
                    element = %child.clark_name(),
                    parent = %self.tag(),
                    "skipping unrecognized element"
                );
                cursor += 1;
                continue;
            };
            if !resolved.is_subtype_of(declared) {
                index += 1;
                continue;
            }

            let value = resolved.deserialize(child)?;
            cursor += 1;

            if field.is_collection() {
                let slot = instance
                    .state
                    .entry(field.name)
                    .or_insert_with(|| Value::List(Vec::new()));
                if let Value::List(items) = slot {
                    items.push(value);
                    if field.is_full(items.len()) {
                        index += 1;
                    }
                }
            } else {
                instance.state.insert(field.name, Value::Element(Box::new(value)));
                index += 1;
            }
        }

        if self.supports_text() {
            if let Some(text) = node.text.as_deref().map(str::trim) {
                if !text.is_empty() {
                    instance.text = Some(text.to_string());
                }
            }
        }

        if let Some(missing) = fields
            .iter()
            .find(|f| f.required && !instance.state.contains_key(f.name))
        {
            return Err(SamlError::MissingField {
                element: self.tag().into_owned(),
                field: missing.name,
            });
        }

        Ok(instance)
    }
}

impl PartialEq for ElementType {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}

impl Eq for ElementType {}

impl fmt::Debug for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementType")
            .field("name", &self.clark_name())
            .finish_non_exhaustive()
    }
}

/// An instance of an [`ElementType`].
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    ty: &'static ElementType,
    state: BTreeMap<&'static str, Value>,
    text: Option<String>,
}

impl Element {
    /// Creates an empty instance.
    #[must_use]
    pub fn new(ty: &'static ElementType) -> Self {
        Self {
            ty,
            state: BTreeMap::new(),
            text: None,
        }
    }

    /// Creates an instance whose content is `text`.
    #[must_use]
    pub fn with_text(ty: &'static ElementType, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(ty)
        }
    }

    /// Returns the instance's type.
    #[must_use]
    pub const fn element_type(&self) -> &'static ElementType {
        self.ty
    }

    /// Returns the character content.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Replaces the character content.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    fn field(&self, name: &str) -> SamlResult<&'static Field> {
        self.ty.field(name).ok_or_else(|| SamlError::UnknownField {
            element: self.ty.tag().into_owned(),
            field: name.to_string(),
        })
    }

    /// Assigns a field.
    ///
    /// Collection fields append (a list value appends each member); other
    /// fields are replaced. Scalars must match the attribute's kind and
    /// elements must be of the declared type or a subtype.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` for undeclared names and `InvalidOperation`
    /// when the value does not fit the field.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> SamlResult<()> {
        let field = self.field(name)?;
        let value = value.into();

        match field.kind {
            FieldKind::Attribute(kind) => {
                if !kind.accepts(&value) {
                    return Err(self.mismatch(field, &format!("a {kind:?} value")));
                }
                self.state.insert(field.name, value);
            }
            FieldKind::Element { of, collection, .. } => {
                let members = match value {
                    Value::Element(element) => vec![*element],
                    Value::List(items) if collection => items,
                    _ => return Err(self.mismatch(field, "an element")),
                };
                if let Some(wrong) = members.iter().find(|e| !e.ty.is_subtype_of(of)) {
                    let expected = format!("<{}>, got <{}>", of.tag(), wrong.ty.tag());
                    return Err(self.mismatch(field, &expected));
                }

                if collection {
                    match self.state.entry(field.name).or_insert_with(|| Value::List(Vec::new())) {
                        Value::List(items) => items.extend(members),
                        slot => *slot = Value::List(members),
                    }
                } else if let Some(member) = members.into_iter().next() {
                    self.state.insert(field.name, Value::Element(Box::new(member)));
                }
            }
        }
        Ok(())
    }

    /// Builder form of [`Element::set`].
    ///
    /// # Errors
    ///
    /// See [`Element::set`].
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> SamlResult<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    fn mismatch(&self, field: &Field, expected: &str) -> SamlError {
        SamlError::InvalidOperation(format!(
            "field `{}` on <{}> expects {expected}",
            field.name,
            self.ty.tag()
        ))
    }

    /// Returns the stored value without applying defaults.
    #[must_use]
    pub fn peek(&self, name: &str) -> Option<&Value> {
        self.state.get(name)
    }

    /// Returns the value, materializing and storing the default if unset.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` for undeclared names.
    pub fn get(&mut self, name: &str) -> SamlResult<Option<&Value>> {
        let field = self.field(name)?;
        Ok(self.prepare(field))
    }

    /// Returns a singular child element.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.peek(name).and_then(Value::as_element)
    }

    /// Returns the members of a collection field.
    #[must_use]
    pub fn children(&self, name: &str) -> &[Self] {
        self.peek(name).and_then(Value::as_list).unwrap_or_default()
    }

    /// Returns a singular child element, creating an empty one if unset.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` for undeclared names and `InvalidOperation`
    /// for attribute or collection fields.
    pub fn child_mut(&mut self, name: &str) -> SamlResult<&mut Self> {
        let field = self.field(name)?;
        let FieldKind::Element {
            of,
            collection: false,
            ..
        } = field.kind
        else {
            return Err(self.mismatch(field, "access through child_mut on a singular element"));
        };

        let slot = self
            .state
            .entry(field.name)
            .or_insert_with(|| Value::Element(Box::new(Self::new(of))));
        match slot {
            Value::Element(element) => Ok(element.as_mut()),
            _ => Err(SamlError::InvalidOperation(format!(
                "field `{name}` holds a non-element value"
            ))),
        }
    }

    /// Removes a stored value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.state.remove(name)
    }

    /// Returns the text of a string attribute.
    #[must_use]
    pub fn str_value(&self, name: &str) -> Option<&str> {
        self.peek(name).and_then(Value::as_str)
    }

    fn prepare(&mut self, field: &'static Field) -> Option<&Value> {
        if !self.state.contains_key(field.name) {
            if let Some(producer) = field.default {
                self.state.insert(field.name, producer());
            }
        }
        self.state.get(field.name)
    }

    /// Builds the XML node for this instance.
    ///
    /// Unset fields with a default are materialized and kept, so repeated
    /// calls produce the same tree.
    pub fn serialize(&mut self) -> XmlNode {
        let ty = self.ty;
        let ns = ty.namespace;
        let mut node = XmlNode::new(Some(ns.uri), Some(ns.prefix), &ty.tag());
        node.declare_namespace(Some(ns.prefix), ns.uri);

        let fields = ty.fields();
        for of in fields.iter().filter_map(|f| f.element_type()) {
            node.declare_namespace(Some(of.namespace.prefix), of.namespace.uri);
        }

        node.text.clone_from(&self.text);

        for &field in fields {
            match field.kind {
                FieldKind::Attribute(_) => {
                    if let Some(wire) = self.prepare(field).and_then(Value::to_wire) {
                        node.attributes.push((field.wire_name().into_owned(), wire));
                    }
                }
                FieldKind::Element { .. } => {
                    self.prepare(field);
                    match self.state.get_mut(field.name) {
                        Some(Value::Element(child)) => node.children.push(child.serialize()),
                        Some(Value::List(items)) => {
                            node.children.extend(items.iter_mut().map(Self::serialize));
                        }
                        _ => {}
                    }
                }
            }
        }
        node
    }

    /// Serializes this instance to an XML string.
    ///
    /// # Errors
    ///
    /// Returns `XmlWrite` if the writer fails.
    pub fn to_xml_string(&mut self) -> SamlResult<String> {
        self.serialize().to_xml()
    }
}
