//! [zod](https://zod.dev) output.
//!
//! Zod exports several validators under reserved words (`null`, `void`,
//! `instanceof`), so those are imported under a capitalized alias.
use crate::dialect::{Dialect, Emit, enum_member, enum_member_paths, required};
use crate::model::TypeId;
use crate::object::{AllOf, Group, ObjectSyntax};
use crate::session::Session;
use crate::tuple::{self, SlotKind};

const MODULE: &str = "zod";

const OBJECT: ObjectSyntax = ObjectSyntax {
    module: MODULE,
    required: Group { import: Some("object"), open: "object({ ", close: "})" },
    optional: Group { import: Some("object"), open: "object({ ", close: "}).partial()" },
    all_of: AllOf { import: None, open: "", separator: ".and(", close: ")" },
};

/// Reports the issues of `type` against `value` under `path`.
const CHECK: &str = "const check = (type: ZodTypeAny, value: unknown, path: string | number) => { \
                     const result = type.safeParse(value); \
                     if (!result.success) result.error.issues.forEach((issue) => \
                     ctx.addIssue({ ...issue, path: [path, ...issue.path] })); }; ";

#[derive(Debug, Clone, Copy, Default)]
pub struct ZodDialect;

impl ZodDialect {
    /// `string()` and friends.
    fn call(&self, cx: &mut Session<'_>, name: &'static str) -> Emit {
        cx.out().import(MODULE, name);
        cx.out().write(format!("{name}()"));
        Ok(())
    }

    /// Same as [`Self::call`] for validators whose export name is reserved.
    fn aliased_call(&self, cx: &mut Session<'_>, name: &'static str, alias: &'static str) -> Emit {
        cx.out().import_as(MODULE, name, alias);
        cx.out().write(format!("{alias}()"));
        Ok(())
    }

    fn literal_of(&self, cx: &mut Session<'_>, value: &str) -> Emit {
        cx.out().import(MODULE, "literal");
        cx.out().write(format!("literal({value})"));
        Ok(())
    }
}

impl Dialect for ZodDialect {
    fn name(&self) -> &'static str {
        "zod"
    }

    fn module(&self) -> &'static str {
        MODULE
    }

    fn default_static(&self, cx: &mut Session<'_>) -> Emit {
        cx.out().import_as(MODULE, "infer", "Infer");
        cx.out().static_type("Infer<typeof ${name}>");
        Ok(())
    }

    fn lazy(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        cx.out().import(MODULE, "lazy");
        cx.out().import(MODULE, "ZodType");
        let reference = cx.static_reference(id)?;
        cx.out().declare_type(format!("ZodType<{reference}>"));
        cx.out().write("lazy(() => ");
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
        self.aliased_call(cx, "null", "Null")
    }

    fn string(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.call(cx, "string")
    }

    fn number(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.call(cx, "number")
    }

    fn boolean(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.call(cx, "boolean")
    }

    fn array(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let node = cx.node(id)?;
        let element = required(node, node.element)?;
        cx.out().import(MODULE, "array");
        cx.out().write("array(");
        cx.generate_or_reuse(element)?;
        cx.out().write(")");
        Ok(())
    }

    fn tuple(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let node = cx.node(id)?;
        cx.out().import(MODULE, "tuple");
        cx.out().write("tuple([");
        for element in &node.tuple_elements {
            cx.generate_or_reuse(element.ty)?;
            cx.out().write(", ");
        }
        cx.out().write("])");
        Ok(())
    }

    fn variadic_tuple(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let node = cx.node(id)?;
        let layout = tuple::decompose(&node.tuple_elements, &node.text)?;

        cx.out().import(MODULE, "array");
        cx.out().import_as(MODULE, "any", "Any");
        cx.out().import(MODULE, "ZodTypeAny");
        cx.out().write(format!(
            "array(Any()).min({}).superRefine((data, ctx) => {{ {CHECK}",
            layout.min_length
        ));
        for slot in &layout.slots {
            match slot.kind {
                SlotKind::Fixed { ordinal } => {
                    cx.out().write("check(");
                    cx.generate_or_reuse(slot.ty)?;
                    cx.out().write(format!(
                        ", {}, {}); ",
                        tuple::element_access("data", ordinal),
                        tuple::slot_path(slot.kind)
                    ));
                }
                SlotKind::Variadic { from, to } => {
                    cx.out().write("check(array(");
                    cx.generate_or_reuse(slot.ty)?;
                    cx.out().write(format!(
                        "), {}, {}); ",
                        tuple::slice_expression("data", from, to),
                        tuple::slot_path(slot.kind)
                    ));
                }
            }
        }
        cx.out().write("})");
        Ok(())
    }

    fn enumeration(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let paths = enum_member_paths(cx, id)?;
        if paths.is_empty() {
            return self.aliased_call(cx, "never", "Never");
        }
        for (i, path) in paths.iter().enumerate() {
            if i > 0 {
                cx.out().write(".or(");
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
            return self.aliased_call(cx, "unknown", "Unknown");
        }
        cx.chain(&items, "and")
    }

    fn union(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let items = cx.undefined_last(&cx.node(id)?.union_types)?;
        if items.is_empty() {
            return self.aliased_call(cx, "undefined", "Undefined");
        }
        cx.chain(&items, "or")
    }

    fn literal(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let text = &cx.node(id)?.text;
        self.literal_of(cx, text)
    }

    fn any(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.aliased_call(cx, "any", "Any")
    }

    fn unknown(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.aliased_call(cx, "unknown", "Unknown")
    }

    fn undefined(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.aliased_call(cx, "undefined", "Undefined")
    }

    fn never(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.aliased_call(cx, "never", "Never")
    }

    fn void(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.aliased_call(cx, "void", "Void")
    }

    fn function(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.aliased_call(cx, "function", "Function")
    }

    fn built_in_object(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let text = &cx.node(id)?.text;
        cx.out().import_as(MODULE, "instanceof", "InstanceOf");
        cx.out().write(format!("InstanceOf({text})"));
        Ok(())
    }

    fn string_indexed_object(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let node = cx.node(id)?;
        let value = required(node, node.string_index)?;
        cx.out().import(MODULE, "record");
        cx.out().import(MODULE, "string");
        cx.out().write("record(string(), ");
        cx.generate_or_reuse(value)?;
        cx.out().write(")");
        Ok(())
    }

    fn number_indexed_object(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let node = cx.node(id)?;
        let value = required(node, node.number_index)?;
        cx.out().import(MODULE, "record");
        cx.out().import(MODULE, "number");
        cx.out().write("record(number(), ");
        cx.generate_or_reuse(value)?;
        cx.out().write(")");
        Ok(())
    }

    fn generic_object(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        cx.out().import(MODULE, "ZodType");
        cx.out().import_as(MODULE, "infer", "Infer");
        cx.object_function(id, "ZodType", "Infer")
    }

    fn object(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        cx.write_object(id, &OBJECT)
    }
}

// ------------------------------- Tests ------------------------------------ //
