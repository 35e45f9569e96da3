//! Type model handed over by the type-information provider.
//!
//! A [`TypeGraph`] is an arena of [`TypeNode`]s addressed by [`TypeId`]. Nodes
//! only carry *facts* (predicates and accessors); deciding what a node is
//! happens in [`crate::classify`]. Predicates overlap on purpose: an enum is
//! also a union, an enum member is also a literal, arrays are also objects.
use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Error;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Handle into a [`TypeGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Classification predicates reported by the provider.
///
/// `String`, `Number` and `Boolean` mean the keyword types only. A literal
/// such as `"on"` or `3` carries `Literal` alone; only enum members may pair
/// `Literal` with a primitive flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeFlag {
    Null,
    String,
    Number,
    Boolean,
    Array,
    Tuple,
    Enum,
    EnumLiteral,
    Intersection,
    Union,
    Literal,
    Any,
    Unknown,
    Undefined,
    Never,
    Interface,
    Object,
    /// Declared by the host's standard library (`Date`, `Uint8Array`, ...).
    BuiltIn,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypeNode {
    /// Raw textual form, e.g. `string | A` or `"foo"`.
    pub text: String,
    pub alias_name: Option<String>,
    pub symbol_name: Option<String>,
    pub flags: BTreeSet<TypeFlag>,

    pub element: Option<TypeId>,
    pub tuple_elements: Vec<TupleElement>,
    pub union_types: Vec<TypeId>,
    pub intersection_types: Vec<TypeId>,
    pub enum_members: Vec<TypeId>,
    /// For enum members: name of the containing enum.
    pub enum_name: Option<String>,
    pub call_signatures: usize,
    pub properties: Vec<Property>,
    pub string_index: Option<TypeId>,
    pub number_index: Option<TypeId>,
    pub type_parameters: Vec<GenericParam>,

    /// Instantiation of a generic declaration: `target<type_arguments...>`.
    pub target: Option<TypeId>,
    pub type_arguments: Vec<TypeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TupleElement {
    /// For a variadic element this is the repeated item (`B` in `...B[]`).
    pub ty: TypeId,
    #[serde(default)]
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,
    pub ty: TypeId,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericParam {
    pub name: String,
    #[serde(default)]
    pub constraint: Option<Constraint>,
}

/// A type-parameter bound. `declared` is set when the bound resolves to a
/// declared type that can itself be emitted; otherwise only `text` is usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraint {
    #[serde(default)]
    pub declared: Option<TypeId>,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypeGraph {
    pub types: Vec<TypeNode>,
    pub exports: IndexMap<String, TypeId>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl TypeNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), ..Self::default() }
    }
    /// A node carrying a single predicate, e.g. `TypeNode::flagged(TypeFlag::String, "string")`.
    pub fn flagged(flag: TypeFlag, text: impl Into<String>) -> Self {
        Self::new(text).with_flag(flag)
    }
    pub fn with_flag(mut self, flag: TypeFlag) -> Self {
        self.flags.insert(flag);
        self
    }
    pub fn with_alias(mut self, name: impl Into<String>) -> Self {
        self.alias_name = Some(name.into());
        self
    }
    pub fn with_symbol(mut self, name: impl Into<String>) -> Self {
        self.symbol_name = Some(name.into());
        self
    }
    pub fn with_property(mut self, name: impl Into<String>, ty: TypeId, optional: bool) -> Self {
        self.properties.push(Property { name: name.into(), ty, optional });
        self
    }
    pub fn with_type_parameter(mut self, name: impl Into<String>, constraint: Option<Constraint>) -> Self {
        self.type_parameters.push(GenericParam { name: name.into(), constraint });
        self
    }

    pub fn is(&self, flag: TypeFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Alias name wins over symbol name.
    pub fn declared_name(&self) -> Option<&str> {
        self.alias_name.as_deref().or(self.symbol_name.as_deref())
    }

    pub fn is_variadic_tuple(&self) -> bool {
        self.tuple_elements.iter().any(|e| e.variadic)
    }

    /// A plain literal that also claims a primitive keyword flag. Classified
    /// as the primitive it would silently lose its value.
    pub fn is_widened_literal(&self) -> bool {
        use TypeFlag as F;
        self.is(F::Literal)
            && !self.is(F::EnumLiteral)
            && (self.is(F::String) || self.is(F::Number) || self.is(F::Boolean))
    }

    pub fn is_instantiation(&self) -> bool {
        self.target.is_some() && !self.type_arguments.is_empty()
    }

    /// Every `TypeId` this node points at, in declaration order.
    fn references(&self) -> Vec<TypeId> {
        let mut out = Vec::new();
        out.extend(self.element);
        out.extend(self.tuple_elements.iter().map(|e| e.ty));
        out.extend(self.union_types.iter().copied());
        out.extend(self.intersection_types.iter().copied());
        out.extend(self.enum_members.iter().copied());
        out.extend(self.properties.iter().map(|p| p.ty));
        out.extend(self.string_index);
        out.extend(self.number_index);
        out.extend(
            self.type_parameters
                .iter()
                .filter_map(|g| g.constraint.as_ref().and_then(|c| c.declared)),
        );
        out.extend(self.target);
        out.extend(self.type_arguments.iter().copied());
        out
    }
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: TypeNode) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(node);
        id
    }

    /// Allocate a slot to be filled later with [`TypeGraph::set`]; needed for
    /// self-referencing graphs.
    pub fn reserve(&mut self) -> TypeId {
        self.push(TypeNode::default())
    }

    pub fn set(&mut self, id: TypeId, node: TypeNode) -> Result<(), Error> {
        let slot = self.types.get_mut(id.index()).ok_or(Error::UnknownType(id))?;
        *slot = node;
        Ok(())
    }

    pub fn export(&mut self, name: impl Into<String>, id: TypeId) {
        self.exports.insert(name.into(), id);
    }

    pub fn node(&self, id: TypeId) -> Result<&TypeNode, Error> {
        self.types.get(id.index()).ok_or(Error::UnknownType(id))
    }

    pub fn exported(&self, name: &str) -> Result<TypeId, Error> {
        self.exports
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownExport(name.to_string()))
    }

    /// Check that every reference (including exports) lands inside the arena
    /// and that no literal is also flagged as its primitive keyword.
    pub fn validate(&self) -> Result<(), Error> {
        let len = self.types.len();
        for (index, node) in self.types.iter().enumerate() {
            if node.is_widened_literal() {
                return Err(Error::WidenedLiteral { id: TypeId(index as u32), text: node.text.clone() });
            }
            for to in node.references() {
                if to.index() >= len {
                    return Err(Error::DanglingReference { from: TypeId(index as u32), to });
                }
            }
        }
        for (name, id) in &self.exports {
            if id.index() >= len {
                return Err(Error::UnknownExport(name.clone()));
            }
        }
        Ok(())
    }

    /// Parse and validate a graph serialized as JSON.
    pub fn from_json_str(src: &str) -> Result<Self, Error> {
        let graph: TypeGraph = crate::path_de::from_str_with_path(src)?;
        graph.validate()?;
        Ok(graph)
    }
}

// ------------------------------- Tests ------------------------------------ //
