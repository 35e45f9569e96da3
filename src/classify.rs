//! Ordered classification of a [`TypeNode`] into exactly one [`Shape`].
//!
//! The order of the checks is part of the contract: predicates overlap in the
//! host type system, so the first match wins. Enum members are also literals,
//! enums are also unions, and arrays/tuples/enums are all object-like.
use crate::error::Error;
use crate::model::{TypeFlag, TypeNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Lazy,
    EnumLiteral,
    Null,
    String,
    Number,
    Boolean,
    Array,
    Tuple,
    VariadicTuple,
    Enum,
    Intersection,
    Union,
    Literal,
    Any,
    Unknown,
    Undefined,
    Never,
    Void,
    Function,
    BuiltInObject,
    StringIndexedObject,
    NumberIndexedObject,
    GenericObject,
    Object,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyFlags {
    pub recursive: bool,
    pub circular: bool,
}

pub fn classify(node: &TypeNode, flags: ClassifyFlags) -> Result<Shape, Error> {
    use TypeFlag as F;

    if flags.recursive || flags.circular {
        return Ok(Shape::Lazy);
    }
    if node.is(F::EnumLiteral) {
        return Ok(Shape::EnumLiteral);
    }
    if node.is(F::Null) {
        return Ok(Shape::Null);
    }
    if node.is(F::String) {
        return Ok(Shape::String);
    }
    if node.is(F::Number) {
        return Ok(Shape::Number);
    }
    if node.is(F::Boolean) {
        return Ok(Shape::Boolean);
    }
    if node.is(F::Array) {
        return Ok(Shape::Array);
    }
    if node.is(F::Tuple) {
        return Ok(if node.is_variadic_tuple() { Shape::VariadicTuple } else { Shape::Tuple });
    }
    if node.is(F::Enum) {
        return Ok(Shape::Enum);
    }
    if node.is(F::Intersection) {
        return Ok(Shape::Intersection);
    }
    if node.is(F::Union) {
        return Ok(Shape::Union);
    }
    if node.is(F::Literal) {
        return Ok(Shape::Literal);
    }
    if node.is(F::Any) {
        return Ok(Shape::Any);
    }
    if node.is(F::Unknown) {
        return Ok(Shape::Unknown);
    }
    if node.is(F::Undefined) {
        return Ok(Shape::Undefined);
    }
    if node.is(F::Never) {
        return Ok(Shape::Never);
    }
    // `void` has no predicate of its own; only the text tells it apart.
    if node.text == "void" {
        return Ok(Shape::Void);
    }
    if node.call_signatures > 0 {
        return Ok(Shape::Function);
    }
    if node.is(F::Interface) || node.is(F::Object) {
        let shape = if node.is(F::BuiltIn) {
            Shape::BuiltInObject
        } else if node.string_index.is_some() {
            Shape::StringIndexedObject
        } else if node.number_index.is_some() {
            Shape::NumberIndexedObject
        } else if !node.type_parameters.is_empty() {
            Shape::GenericObject
        } else {
            Shape::Object
        };
        return Ok(shape);
    }
    Err(Error::Unclassifiable { text: node.text.clone() })
}

// ------------------------------- Tests ------------------------------------ //
