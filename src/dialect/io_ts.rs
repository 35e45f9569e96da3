//! [io-ts](https://github.com/gcanti/io-ts) output.
//!
//! Codecs that io-ts has no combinator for (class instances, variadic
//! tuples) are written as hand-built `new Type(...)` adapters.
use crate::dialect::{Dialect, Emit, enum_member, enum_member_paths, required};
use crate::model::TypeId;
use crate::object::{AllOf, Group, ObjectSyntax};
use crate::session::Session;
use crate::tuple::{self, SlotKind, TupleLayout};

const MODULE: &str = "io-ts";

/// Codecs exported under reserved words.
const RESERVED: [&str; 5] = ["null", "undefined", "unknown", "void", "never"];

const OBJECT: ObjectSyntax = ObjectSyntax {
    module: MODULE,
    required: Group { import: Some("type"), open: "type({ ", close: "})" },
    optional: Group { import: Some("partial"), open: "partial({ ", close: "})" },
    all_of: AllOf { import: Some("intersection"), open: "intersection([", separator: ", ", close: "])" },
};

#[derive(Debug, Clone, Copy, Default)]
pub struct IoTsDialect;

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Contents of a single-quoted string.
fn quoted(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "\\'")
}

impl IoTsDialect {
    fn codec(&self, cx: &mut Session<'_>, name: &'static str) -> Emit {
        if RESERVED.contains(&name) {
            let alias = capitalize(name);
            cx.out().import_as(MODULE, name, &alias);
            cx.out().write(alias);
        } else {
            cx.out().import(MODULE, name);
            cx.out().write(name);
        }
        Ok(())
    }

    fn literal_of(&self, cx: &mut Session<'_>, value: &str) -> Emit {
        cx.out().import(MODULE, "literal");
        cx.out().write(format!("literal({value})"));
        Ok(())
    }

    /// ` && A.is(data[0]) && array(B).is(data.slice(1))` for every slot.
    fn guards(&self, cx: &mut Session<'_>, layout: &TupleLayout, data: &str) -> Emit {
        for slot in &layout.slots {
            cx.out().write(" && ");
            match slot.kind {
                SlotKind::Fixed { ordinal } => {
                    cx.generate_or_reuse(slot.ty)?;
                    cx.out().write(format!(".is({})", tuple::element_access(data, ordinal)));
                }
                SlotKind::Variadic { from, to } => {
                    cx.out().write("array(");
                    cx.generate_or_reuse(slot.ty)?;
                    cx.out().write(format!(").is({})", tuple::slice_expression(data, from, to)));
                }
            }
        }
        Ok(())
    }
}

impl Dialect for IoTsDialect {
    fn name(&self) -> &'static str {
        "io-ts"
    }

    fn module(&self) -> &'static str {
        MODULE
    }

    fn default_static(&self, cx: &mut Session<'_>) -> Emit {
        cx.out().import(MODULE, "TypeOf");
        cx.out().static_type("TypeOf<typeof ${name}>");
        Ok(())
    }

    fn lazy(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        cx.out().import(MODULE, "recursion");
        cx.out().import(MODULE, "Type");
        let reference = cx.static_reference(id)?;
        let label = cx.declaring().map(str::to_string).unwrap_or_else(|| reference.clone());
        cx.out().declare_type(format!("Type<{reference}>"));
        cx.out().write(format!("recursion('{}', () => ", quoted(&label)));
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
        self.codec(cx, "null")
    }

    fn string(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.codec(cx, "string")
    }

    fn number(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.codec(cx, "number")
    }

    fn boolean(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.codec(cx, "boolean")
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

    /// An `array(Unknown)` piped into a custom `Type` whose guard and
    /// validate both walk the tuple segments.
    fn variadic_tuple(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let node = cx.node(id)?;
        let layout = tuple::decompose(&node.tuple_elements, &node.text)?;
        let t = &node.text;
        let min = layout.min_length;

        cx.out().import(MODULE, "array");
        cx.out().import_as(MODULE, "unknown", "Unknown");
        cx.out().import(MODULE, "Type");
        cx.out().import(MODULE, "success");
        cx.out().import(MODULE, "failure");

        cx.out().write(format!(
            "array(Unknown).pipe(new Type<{t}, {t}, unknown[]>('{}', (u): u is {t} => Array.isArray(u) && u.length >= {min}",
            quoted(t)
        ));
        self.guards(cx, &layout, "u")?;
        cx.out().write(format!(", (i, c) => i.length >= {min}"));
        self.guards(cx, &layout, "i")?;
        cx.out().write(format!(
            " ? success(i as {t}) : failure(i, c, 'Variadic tuple does not match schema'), (a) => a))"
        ));
        Ok(())
    }

    fn enumeration(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let paths = enum_member_paths(cx, id)?;
        if paths.is_empty() {
            return self.codec(cx, "never");
        }
        cx.out().import(MODULE, "union");
        cx.out().write("union([");
        for path in &paths {
            self.literal_of(cx, path)?;
            cx.out().write(", ");
        }
        cx.out().write("])");
        Ok(())
    }

    fn intersection(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let items = cx.undefined_last(&cx.node(id)?.intersection_types)?;
        if items.is_empty() {
            return self.codec(cx, "unknown");
        }
        cx.out().import(MODULE, "intersection");
        cx.out().write("intersection([");
        cx.list(&items, ", ")?;
        cx.out().write("])");
        Ok(())
    }

    fn union(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let items = cx.undefined_last(&cx.node(id)?.union_types)?;
        if items.is_empty() {
            return self.codec(cx, "undefined");
        }
        cx.out().import(MODULE, "union");
        cx.out().write("union([");
        cx.list(&items, ", ")?;
        cx.out().write("])");
        Ok(())
    }

    fn literal(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let text = &cx.node(id)?.text;
        self.literal_of(cx, text)
    }

    // io-ts' `any` is deprecated in favour of `unknown`.
    fn any(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.codec(cx, "unknown")
    }

    fn unknown(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.codec(cx, "unknown")
    }

    fn undefined(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.codec(cx, "undefined")
    }

    fn never(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.codec(cx, "never")
    }

    fn void(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.codec(cx, "void")
    }

    fn function(&self, cx: &mut Session<'_>, _id: TypeId) -> Emit {
        self.codec(cx, "Function")
    }

    fn built_in_object(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let t = &cx.node(id)?.text;
        cx.out().import(MODULE, "Type");
        cx.out().import(MODULE, "success");
        cx.out().import(MODULE, "failure");
        cx.out().write(format!(
            "new Type<{t}>('{name}', (u): u is {t} => u instanceof {t}, \
             (i, c) => i instanceof {t} ? success(i) : failure(i, c, 'not a {name}'), (a) => a)",
            name = quoted(t)
        ));
        Ok(())
    }

    fn string_indexed_object(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let node = cx.node(id)?;
        let value = required(node, node.string_index)?;
        cx.out().import(MODULE, "record");
        cx.out().import(MODULE, "string");
        cx.out().write("record(string, ");
        cx.generate_or_reuse(value)?;
        cx.out().write(")");
        Ok(())
    }

    fn number_indexed_object(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        let node = cx.node(id)?;
        let value = required(node, node.number_index)?;
        cx.out().import(MODULE, "record");
        cx.out().import(MODULE, "number");
        cx.out().write("record(number, ");
        cx.generate_or_reuse(value)?;
        cx.out().write(")");
        Ok(())
    }

    fn generic_object(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        cx.out().import(MODULE, "Type");
        cx.out().import(MODULE, "TypeOf");
        cx.object_function(id, "Type", "TypeOf")
    }

    fn object(&self, cx: &mut Session<'_>, id: TypeId) -> Emit {
        cx.write_object(id, &OBJECT)
    }
}

// ------------------------------- Tests ------------------------------------ //
