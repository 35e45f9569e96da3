//! [runtypes](https://github.com/runtypes/runtypes) output.
use crate::dialect::{Dialect, Emit, enum_member, enum_member_paths, required};
use crate::model::TypeId;
use crate::object::{AllOf, Group, ObjectSyntax};
use crate::session::Session;
use crate::tuple::{self, SlotKind};

const MODULE: &str = "runtypes";

const OBJECT: ObjectSyntax = ObjectSyntax {
    module: MODULE,
    required: Group { import: Some("Record"), open: "Record({ ", close: "})" },
    optional: Group { import: Some("Partial"), open: "Partial({ ", close: "})" },
    all_of: AllOf { import: None, open: "", separator: ".And(", close: ")" },
};

#[derive(Debug, Clone, Copy, Default)]
pub struct RuntypesDialect;

impl RuntypesDialect {
    /// Validators exported as ready-made constants (`String`, `Never`, ...).
    fn constant(&self, cx: &mut Session<'_>, name: &'static str) -> Emit {
        cx.out().import(MODULE, name);
        cx.out().write(name);
        Ok(())
    }

    fn literal_of(&self, cx: &mut Session<'_>, value: &str) -> Emit {
        cx.out().import(MODULE, "Literal");
        cx.out().write(format!("Literal({value})"));
        Ok(())
    }
}

impl Dialect for RuntypesDialect {
    fn name(&self) -> &'static str {
        "runtypes"
    }

    fn module(&self) -> &'static str {
        MODULE
    }

    fn default_static(&self, cx: &mut Session<'_>) -> Emit {
        cx.out().import(MODULE, "Static");
        cx.out().static_type("Static<typeof ${name}>");
        Ok(())
    }

    fn lazy(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        cx.out().import(MODULE, "Lazy");
        cx.out().import(MODULE, "Runtype");
        let reference = cx.static_reference(id)?;
        cx.out().declare_type(format!("Runtype<{reference}>"));
        cx.out().write("Lazy(() => ");
        cx.type_writer(id, Default::default())?;
        cx.out().write(")");
        Ok(())
    }

    fn enum_literal(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let (enum_name, member) = enum_member(cx, id)?;
        let alias = format!("_{enum_name}");
        cx.out().import_from_source(&enum_name, &alias);
        self.literal_of(cx, &format!("{alias}.{member}"))
    }

    fn null(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.constant(cx, "Null")
    }

    fn string(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.constant(cx, "String")
    }

    fn number(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.constant(cx, "Number")
    }

    fn boolean(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.constant(cx, "Boolean")
    }

    fn array(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let node = cx.node(id)?;
        let element = required(node, node.element)?;
        cx.out().import(MODULE, "Array");
        cx.out().write("Array(");
        cx.generate_or_reuse(element)?;
        cx.out().write(")");
        Ok(())
    }

    fn tuple(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let node = cx.node(id)?;
        cx.out().import(MODULE, "Tuple");
        cx.out().write("Tuple(");
        for element in &node.tuple_elements {
            cx.generate_or_reuse(element.ty)?;
            cx.out().write(", ");
        }
        cx.out().write(")");
        Ok(())
    }

    /// `Array(Unknown).withConstraint((data) => ...)` checking every segment
    /// with `.guard`.
    fn variadic_tuple(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let node = cx.node(id)?;
        let layout = tuple::decompose(&node.tuple_elements, &node.text)?;

        cx.out().import(MODULE, "Array");
        cx.out().import(MODULE, "Unknown");
        cx.out()
            .write(format!("Array(Unknown).withConstraint((data) => data.length >= {}", layout.min_length));
        for slot in &layout.slots {
            match slot.kind {
                SlotKind::Fixed { ordinal } => {
                    cx.out().write(" && ");
                    cx.generate_or_reuse(slot.ty)?;
                    cx.out().write(format!(".guard({})", tuple::element_access("data", ordinal)));
                }
                SlotKind::Variadic { from, to } => {
                    cx.out().write(" && Array(");
                    cx.generate_or_reuse(slot.ty)?;
                    cx.out().write(format!(").guard({})", tuple::slice_expression("data", from, to)));
                }
            }
        }
        cx.out().write(")");
        Ok(())
    }

    fn enumeration(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let paths = enum_member_paths(cx, id)?;
        if paths.is_empty() {
            return self.constant(cx, "Never");
        }
        for (i, path) in paths.iter().enumerate() {
            if i > 0 {
                cx.out().write(".Or(");
            }
            self.literal_of(cx, path)?;
            if i > 0 {
                cx.out().write(")");
            }
        }
        Ok(())
    }

    fn intersection(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let items = cx.undefined_last(&cx.node(id)?.intersection_types)?;
        if items.is_empty() {
            return self.constant(cx, "Unknown");
        }
        cx.chain(&items, "And")
    }

    fn union(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let items = cx.undefined_last(&cx.node(id)?.union_types)?;
        if items.is_empty() {
            return self.constant(cx, "Undefined");
        }
        cx.chain(&items, "Or")
    }

    fn literal(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let text = &cx.node(id)?.text;
        self.literal_of(cx, text)
    }

    // runtypes has no separate `any`.
    fn any(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.constant(cx, "Unknown")
    }

    fn unknown(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.constant(cx, "Unknown")
    }

    fn undefined(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.constant(cx, "Undefined")
    }

    fn never(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.constant(cx, "Never")
    }

    fn void(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.constant(cx, "Void")
    }

    fn function(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.constant(cx, "Function")
    }

    fn built_in_object(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let text = &cx.node(id)?.text;
        cx.out().import(MODULE, "InstanceOf");
        cx.out().write(format!("InstanceOf({text})"));
        Ok(())
    }

    fn string_indexed_object(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let node = cx.node(id)?;
        let value = required(node, node.string_index)?;
        cx.out().import(MODULE, "Dictionary");
        cx.out().import(MODULE, "String");
        cx.out().write("Dictionary(");
        cx.generate_or_reuse(value)?;
        cx.out().write(", String)");
        Ok(())
    }

    fn number_indexed_object(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let node = cx.node(id)?;
        let value = required(node, node.number_index)?;
        cx.out().import(MODULE, "Dictionary");
        cx.out().import(MODULE, "Number");
        cx.out().write("Dictionary(");
        cx.generate_or_reuse(value)?;
        cx.out().write(", Number)");
        Ok(())
    }

    fn generic_object(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        cx.out().import(MODULE, "Runtype");
        cx.out().import(MODULE, "Static");
        cx.object_function(id, "Runtype", "Static")
    }

    fn object(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        cx.write_object(id, &OBJECT)
    }
}

// ------------------------------- Tests ------------------------------------ //
