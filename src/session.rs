//! One generation run: declaration cache, recursion tracking and dispatch.
//!
//! A run walks the roots twice. The first walk goes into a muted emitter and
//! only exists so the tracker can find the types that refer back to
//! themselves (lazy status has to be known when a declaration opens). The
//! second walk emits, with the cache and stack reset but the lazy marks and
//! diagnostics kept.
use crate::cache::{DeclarationCache, Decision};
use crate::classify::{ClassifyFlags, Shape, classify};
use crate::dialect::Dialect;
use crate::error::Error;
use crate::instruction::{Emitter, Instruction};
use crate::model::{TypeFlag, TypeGraph, TypeId, TypeNode};
use crate::tracker::{Diagnostic, Recursion, RecursionTracker};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// An exported type to declare in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    pub name: String,
    /// Emit lazily even if no recursion is found.
    pub force_lazy: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Generated {
    pub instructions: Vec<Instruction>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct Session<'a> {
    graph: &'a TypeGraph,
    dialect: &'a dyn Dialect,
    cache: DeclarationCache,
    tracker: RecursionTracker,
    /// Anonymous nodes currently being written inside the open declaration.
    inline: Vec<TypeId>,
    out: Emitter,
}

// ————————————————————————————————————————————————————————————————————————————
// ENTRY POINT
// ————————————————————————————————————————————————————————————————————————————

pub fn generate(graph: &TypeGraph, dialect: &dyn Dialect, roots: &[Root]) -> Result<Generated, Error> {
    let mut tracker = RecursionTracker::new();
    for root in roots.iter().filter(|r| r.force_lazy) {
        tracker.force_lazy(&root.name);
    }

    tracing::debug!(dialect = dialect.name(), module = dialect.module(), roots = roots.len(), "discovery pass");
    let mut discovery = Session::new(graph, dialect, tracker, Emitter::muted());
    discovery.declare_roots(roots)?;

    let mut tracker = discovery.tracker;
    tracker.rewind();

    tracing::debug!(dialect = dialect.name(), "emission pass");
    let mut session = Session::new(graph, dialect, tracker, Emitter::new());
    session.declare_roots(roots)?;
    tracing::debug!(dialect = dialect.name(), declared = session.cache.len(), "emission done");

    Ok(Generated {
        instructions: session.out.into_instructions(),
        diagnostics: session.tracker.into_diagnostics(),
    })
}

/// Convenience wrapper: every name is a plain (non-forced) root.
pub fn generate_exports<I>(graph: &TypeGraph, dialect: &dyn Dialect, names: I) -> Result<Generated, Error>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let roots = names
        .into_iter()
        .map(|n| Root { name: n.as_ref().to_string(), force_lazy: false })
        .collect::<Vec<_>>();
    generate(graph, dialect, &roots)
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl<'a> Session<'a> {
    fn new(graph: &'a TypeGraph, dialect: &'a dyn Dialect, tracker: RecursionTracker, out: Emitter) -> Self {
        Self { graph, dialect, cache: DeclarationCache::new(), tracker, inline: Vec::new(), out }
    }

    fn declare_roots(&mut self, roots: &[Root]) -> Result<(), Error> {
        for root in roots {
            let id = self.graph.exported(&root.name)?;
            // A root may already have been pulled in by an earlier one.
            if self.cache.declare_or_reuse(&root.name) == Decision::Declare {
                self.emit_declaration(id, &root.name)?;
            }
        }
        Ok(())
    }

    /// Emit `id`, or a reference to it if its name was already declared.
    pub fn generate_or_reuse(&mut self, id: TypeId) -> Result<(), Error> {
        let node = self.node(id)?;
        if node.is_instantiation() {
            return self.instantiate(node);
        }
        match node.declared_name() {
            Some(name) if !node.is(TypeFlag::EnumLiteral) => match self.cache.declare_or_reuse(name) {
                Decision::Reuse => {
                    self.tracker.reenter(name);
                    self.out.push(Instruction::DeclareAndUse { name: name.to_string(), reused: true });
                    Ok(())
                }
                Decision::Declare => self.emit_declaration(id, name),
            },
            _ => self.inline(id, node),
        }
    }

    /// Classify `id` and hand it to the dialect.
    pub fn type_writer(&mut self, id: TypeId, flags: ClassifyFlags) -> Result<(), Error> {
        let shape = classify(self.node(id)?, flags)?;
        let d = self.dialect;
        match shape {
            Shape::Lazy => d.lazy(self, id),
            Shape::EnumLiteral => d.enum_literal(self, id),
            Shape::Null => d.null(self, id),
            Shape::String => d.string(self, id),
            Shape::Number => d.number(self, id),
            Shape::Boolean => d.boolean(self, id),
            Shape::Array => d.array(self, id),
            Shape::Tuple => d.tuple(self, id),
            Shape::VariadicTuple => d.variadic_tuple(self, id),
            Shape::Enum => d.enumeration(self, id),
            Shape::Intersection => d.intersection(self, id),
            Shape::Union => d.union(self, id),
            Shape::Literal => d.literal(self, id),
            Shape::Any => d.any(self, id),
            Shape::Unknown => d.unknown(self, id),
            Shape::Undefined => d.undefined(self, id),
            Shape::Never => d.never(self, id),
            Shape::Void => d.void(self, id),
            Shape::Function => d.function(self, id),
            Shape::BuiltInObject => d.built_in_object(self, id),
            Shape::StringIndexedObject => d.string_indexed_object(self, id),
            Shape::NumberIndexedObject => d.number_indexed_object(self, id),
            Shape::GenericObject => d.generic_object(self, id),
            Shape::Object => d.object(self, id),
        }
    }

    fn emit_declaration(&mut self, id: TypeId, name: &str) -> Result<(), Error> {
        self.out.push(Instruction::DeclareAndUse { name: name.to_string(), reused: false });
        self.dialect.default_static(self)?;

        let flags = match self.tracker.lazy_kind(name) {
            Some(Recursion::SelfReference) => ClassifyFlags { recursive: true, circular: false },
            Some(Recursion::Circular) => ClassifyFlags { recursive: false, circular: true },
            None => ClassifyFlags::default(),
        };

        let outer_inline = std::mem::take(&mut self.inline);
        self.tracker.enter(name);
        let result = self.type_writer(id, flags);
        self.tracker.exit();
        self.inline = outer_inline;
        result?;

        self.out.push(Instruction::EndDeclaration { name: name.to_string() });
        Ok(())
    }

    fn inline(&mut self, id: TypeId, node: &TypeNode) -> Result<(), Error> {
        if self.inline.contains(&id) {
            return Err(Error::UnnamedCycle { text: node.text.clone() });
        }
        self.inline.push(id);
        let result = self.type_writer(id, ClassifyFlags::default());
        self.inline.pop();
        result
    }

    /// `Target(arg, ...)`: a generic constructor applied to validators.
    fn instantiate(&mut self, node: &'a TypeNode) -> Result<(), Error> {
        let Some(target) = node.target else {
            return Err(Error::Unclassifiable { text: node.text.clone() });
        };
        self.generate_or_reuse(target)?;
        self.out.write("(");
        for &arg in &node.type_arguments {
            self.generate_or_reuse(arg)?;
            self.out.write(", ");
        }
        self.out.write(")");
        Ok(())
    }

    // -------------------------- dialect helpers --------------------------- //

    pub fn node(&self, id: TypeId) -> Result<&'a TypeNode, Error> {
        self.graph.node(id)
    }

    pub fn out(&mut self) -> &mut Emitter {
        &mut self.out
    }

    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    /// Name of the innermost open declaration.
    pub fn declaring(&self) -> Option<&str> {
        self.tracker.current()
    }

    /// Declared name of `id`, required.
    pub fn type_name(&self, id: TypeId) -> Result<&'a str, Error> {
        let node = self.node(id)?;
        node.declared_name().ok_or_else(|| Error::Unnamed { text: node.text.clone() })
    }

    /// Import the compile-time type of `id` as `_Name` and return the alias.
    /// Anonymous types fall back to their raw text.
    pub fn static_reference(&mut self, id: TypeId) -> Result<String, Error> {
        let node = self.node(id)?;
        match node.declared_name() {
            Some(name) => {
                let alias = format!("_{name}");
                self.out.import_from_source(name, &alias);
                Ok(alias)
            }
            None => {
                tracing::debug!(text = %node.text, "no importable name, using the type text");
                Ok(node.text.clone())
            }
        }
    }

    /// `first.method(second).method(third)`.
    pub fn chain(&mut self, items: &[TypeId], method: &str) -> Result<(), Error> {
        for (i, &item) in items.iter().enumerate() {
            if i > 0 {
                self.out.write(format!(".{method}("));
            }
            self.generate_or_reuse(item)?;
            if i > 0 {
                self.out.write(")");
            }
        }
        Ok(())
    }

    /// Every item followed by `separator`.
    pub fn list(&mut self, items: &[TypeId], separator: &str) -> Result<(), Error> {
        for &item in items {
            self.generate_or_reuse(item)?;
            self.out.write(separator);
        }
        Ok(())
    }

    /// Stable reorder that moves `undefined` members to the end, so that
    /// optional members read `X.or(Undefined())`.
    pub fn undefined_last(&self, items: &[TypeId]) -> Result<Vec<TypeId>, Error> {
        let mut keyed = items
            .iter()
            .map(|&id| Ok((self.node(id)?.is(TypeFlag::Undefined), id)))
            .collect::<Result<Vec<_>, Error>>()?;
        keyed.sort_by_key(|(undefined, _)| *undefined);
        Ok(keyed.into_iter().map(|(_, id)| id).collect())
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{DialectKind, dialect};
    use crate::model::TupleElement;

    fn runtypes() -> &'static dyn Dialect {
        dialect(DialectKind::Runtypes)
    }

    fn full_declarations(out: &Generated, name: &str) -> usize {
        out.instructions
            .iter()
            .filter(|i| matches!(i, Instruction::DeclareAndUse { name: n, reused: false } if n == name))
            .count()
    }

    fn reuses(out: &Generated, name: &str) -> usize {
        out.instructions
            .iter()
            .filter(|i| matches!(i, Instruction::DeclareAndUse { name: n, reused: true } if n == name))
            .count()
    }

    fn lazy_declarations(out: &Generated) -> Vec<String> {
        out.instructions
            .iter()
            .filter_map(|i| match i {
                Instruction::DeclareType { text } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn named_type_is_declared_once_and_reused_after() {
        let mut g = TypeGraph::new();
        let null = g.push(TypeNode::flagged(TypeFlag::Null, "null"));
        let string = g.push(TypeNode::flagged(TypeFlag::String, "string"));
        let mut foo = TypeNode::flagged(TypeFlag::Union, "FooType").with_alias("FooType");
        foo.union_types = vec![null, string];
        let foo = g.push(foo);
        let horse = g.push(
            TypeNode::flagged(TypeFlag::Object, "HorseType")
                .with_alias("HorseType")
                .with_property("a", foo, false)
                .with_property("b", foo, false)
                .with_property("c", foo, false),
        );
        g.export("FooType", foo);
        g.export("HorseType", horse);

        let out = generate_exports(&g, runtypes(), ["HorseType", "FooType"]).unwrap();
        assert_eq!(full_declarations(&out, "FooType"), 1);
        assert_eq!(reuses(&out, "FooType"), 2);
        assert_eq!(full_declarations(&out, "HorseType"), 1);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn self_recursive_type_is_lazy_without_warnings() {
        // A = { recurse: string | A }
        let mut g = TypeGraph::new();
        let string = g.push(TypeNode::flagged(TypeFlag::String, "string"));
        let a = g.reserve();
        let mut union = TypeNode::flagged(TypeFlag::Union, "string | A");
        union.union_types = vec![string, a];
        let union = g.push(union);
        g.set(a, TypeNode::flagged(TypeFlag::Object, "A").with_alias("A").with_property("recurse", union, false))
            .unwrap();
        g.export("A", a);

        let out = generate_exports(&g, runtypes(), ["A"]).unwrap();
        assert!(out.diagnostics.is_empty());
        assert_eq!(lazy_declarations(&out), vec!["Runtype<_A>".to_string()]);
        assert_eq!(full_declarations(&out, "A"), 1);
        assert_eq!(reuses(&out, "A"), 1);
    }

    fn teacher_student() -> TypeGraph {
        let mut g = TypeGraph::new();
        let teacher = g.reserve();
        let student = g.reserve();
        let students = g.push(TypeNode { element: Some(student), ..TypeNode::flagged(TypeFlag::Array, "Student[]") });
        g.set(
            teacher,
            TypeNode::flagged(TypeFlag::Interface, "Teacher")
                .with_symbol("Teacher")
                .with_property("students", students, false)
                .with_property("reportsTo", teacher, true),
        )
        .unwrap();
        g.set(
            student,
            TypeNode::flagged(TypeFlag::Interface, "Student")
                .with_symbol("Student")
                .with_property("teacher", teacher, false),
        )
        .unwrap();
        let mut user = TypeNode::flagged(TypeFlag::Union, "User").with_alias("User");
        user.union_types = vec![student, teacher];
        let user = g.push(user);
        g.export("Teacher", teacher);
        g.export("Student", student);
        g.export("User", user);
        g
    }

    #[test]
    fn mutual_circularity_warns_once_per_direction() {
        let g = teacher_student();
        let out = generate_exports(&g, runtypes(), ["User"]).unwrap();

        let messages: Vec<String> = out.diagnostics.iter().map(|d| d.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "Spotted a circular reference between `Teacher` and `Student`. This may cause infinite loops at runtime.",
                "Spotted a circular reference between `Student` and `Teacher`. This may cause infinite loops at runtime.",
            ]
        );
        let lazies = lazy_declarations(&out);
        assert!(lazies.contains(&"Runtype<_Student>".to_string()));
        assert!(lazies.contains(&"Runtype<_Teacher>".to_string()));
        assert_eq!(lazies.len(), 2);
    }

    #[test]
    fn extra_references_do_not_repeat_warnings() {
        let g = teacher_student();
        let out = generate_exports(&g, runtypes(), ["User", "Teacher", "Student"]).unwrap();
        assert_eq!(out.diagnostics.len(), 2);
        assert_eq!(full_declarations(&out, "Teacher"), 1);
        assert_eq!(full_declarations(&out, "Student"), 1);
    }

    #[test]
    fn forced_lazy_root_is_wrapped() {
        let mut g = TypeGraph::new();
        let a = g.push(TypeNode::flagged(TypeFlag::Boolean, "boolean"));
        g.export("A", a);
        let roots = [Root { name: "A".into(), force_lazy: true }];
        let out = generate(&g, runtypes(), &roots).unwrap();
        assert!(out.instructions.contains(&Instruction::Write { text: "Lazy(() => ".into() }));
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn primitive_root_emits_one_declaration() {
        let mut g = TypeGraph::new();
        let a = g.push(TypeNode::flagged(TypeFlag::Boolean, "boolean"));
        g.export("A", a);
        let out = generate_exports(&g, runtypes(), ["A"]).unwrap();
        let opened = out
            .instructions
            .iter()
            .filter(|i| matches!(i, Instruction::DeclareAndUse { reused: false, .. }))
            .count();
        assert_eq!(opened, 1);
        assert_eq!(out.instructions.last(), Some(&Instruction::EndDeclaration { name: "A".into() }));
    }

    #[test]
    fn property_key_is_followed_by_its_value() {
        let mut g = TypeGraph::new();
        let string = g.push(TypeNode::flagged(TypeFlag::String, "string"));
        let number = g.push(TypeNode::flagged(TypeFlag::Number, "number"));
        let a = g.push(
            TypeNode::flagged(TypeFlag::Object, "A")
                .with_alias("A")
                .with_property("x", string, false)
                .with_property("y", number, false),
        );
        g.export("A", a);
        let out = generate_exports(&g, runtypes(), ["A"]).unwrap();
        let writes: Vec<&str> = out
            .instructions
            .iter()
            .filter_map(|i| match i {
                Instruction::Write { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        let x = writes.iter().position(|w| *w == "x: ").unwrap();
        assert_eq!(writes[x + 1], "String");
        assert_eq!(writes[x + 3], "y: ");
        assert_eq!(writes[x + 4], "Number");
    }

    #[test]
    fn anonymous_cycle_is_fatal() {
        let mut g = TypeGraph::new();
        let arr = g.reserve();
        g.set(arr, TypeNode { element: Some(arr), ..TypeNode::flagged(TypeFlag::Array, "X[]") }).unwrap();
        let root = g.push(TypeNode::flagged(TypeFlag::Object, "R").with_alias("R").with_property("x", arr, false));
        g.export("R", root);
        let err = generate_exports(&g, runtypes(), ["R"]).unwrap_err();
        assert!(matches!(err, Error::UnnamedCycle { .. }));
    }

    #[test]
    fn unclassifiable_type_aborts_the_run() {
        let mut g = TypeGraph::new();
        let sym = g.push(TypeNode::new("unique symbol"));
        let a = g.push(TypeNode::flagged(TypeFlag::Object, "A").with_alias("A").with_property("s", sym, false));
        g.export("A", a);
        let err = generate_exports(&g, runtypes(), ["A"]).unwrap_err();
        assert_eq!(err.to_string(), "type `unique symbol` matches no known shape");
    }

    #[test]
    fn enum_members_are_never_cached() {
        let mut g = TypeGraph::new();
        let red = g.push(TypeNode {
            enum_name: Some("Color".into()),
            ..TypeNode::flagged(TypeFlag::EnumLiteral, "Color.Red").with_symbol("Red")
        });
        let pair = g.push(TypeNode {
            tuple_elements: vec![TupleElement { ty: red, variadic: false }, TupleElement { ty: red, variadic: false }],
            ..TypeNode::flagged(TypeFlag::Tuple, "[Color.Red, Color.Red]").with_alias("Pair")
        });
        g.export("Pair", pair);
        let out = generate_exports(&g, runtypes(), ["Pair"]).unwrap();
        assert_eq!(reuses(&out, "Red"), 0);
        assert_eq!(full_declarations(&out, "Red"), 0);
    }

    #[test]
    fn sessions_do_not_share_state() {
        let g = teacher_student();
        let first = generate_exports(&g, runtypes(), ["User"]).unwrap();
        let second = generate_exports(&g, runtypes(), ["User"]).unwrap();
        assert_eq!(first.instructions, second.instructions);
        assert_eq!(first.diagnostics, second.diagnostics);
    }
}
