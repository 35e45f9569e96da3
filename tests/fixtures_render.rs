use std::path::PathBuf;

use guardgen::{DialectKind, Error, Generated, RenderOptions, TypeGraph, generate_exports, render};

fn fixture(name: &str) -> TypeGraph {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name);
    let source = std::fs::read_to_string(&path).unwrap();
    TypeGraph::from_json_str(&source).unwrap()
}

fn generate(graph: &TypeGraph, kind: DialectKind) -> (Generated, String) {
    let names: Vec<&str> = graph.exports.keys().map(String::as_str).collect();
    let generated = generate_exports(graph, kind.writer(), names).unwrap();
    let text = render(&generated.instructions, &RenderOptions::new("./types")).unwrap();
    (generated, text)
}

#[test]
fn every_fixture_renders_in_every_dialect() {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        let graph = TypeGraph::from_json_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        for kind in DialectKind::ALL {
            let (_, text) = generate(&graph, kind);
            for name in graph.exports.keys() {
                assert!(text.contains(&format!("export const {name}")), "{} / {kind}: {name}", path.display());
            }
        }
    }
}

#[test]
fn primitive_root() {
    let (generated, text) = generate(&fixture("primitive.json"), DialectKind::Runtypes);
    assert!(generated.diagnostics.is_empty());
    assert_eq!(
        text,
        "import { Boolean, Static } from 'runtypes';\n\n\
         export const A = Boolean;\n\n\
         export type A = Static<typeof A>;\n"
    );
}

#[test]
fn self_recursive_root() {
    let (generated, text) = generate(&fixture("recursive.json"), DialectKind::Runtypes);
    assert!(generated.diagnostics.is_empty());
    assert_eq!(
        text,
        "import { Lazy, Record, Runtype, Static, String } from 'runtypes';\n\
         import { A as _A } from './types';\n\n\
         export const A: Runtype<_A> = Lazy(() => Record({ recurse: String.Or(A), }));\n\n\
         export type A = Static<typeof A>;\n"
    );
}

#[test]
fn mutually_circular_roots() {
    let (generated, text) = generate(&fixture("circular.json"), DialectKind::Zod);
    let messages: Vec<String> = generated.diagnostics.iter().map(|d| d.to_string()).collect();
    assert_eq!(
        messages,
        vec![
            "Spotted a circular reference between `Teacher` and `Student`. This may cause infinite loops at runtime.",
            "Spotted a circular reference between `Student` and `Teacher`. This may cause infinite loops at runtime.",
        ]
    );
    assert!(text.contains(
        "export const Teacher: ZodType<_Teacher> = lazy(() => \
         object({ students: array(Student), }).and(object({ reportsTo: Teacher, }).partial()));"
    ));
    assert!(text.contains("export const Student: ZodType<_Student> = lazy(() => object({ teacher: Teacher, }));"));
    assert!(text.contains("export const User = Student.or(Teacher);"));

    // dependencies are printed before their users
    let teacher = text.find("export const Teacher").unwrap();
    let user = text.find("export const User").unwrap();
    assert!(teacher < user);
}

#[test]
fn generic_object_and_instantiation() {
    let (_, text) = generate(&fixture("generics.json"), DialectKind::Runtypes);
    assert!(text.contains("export const Base = Record({ id: String, });"));
    assert!(text.contains(
        "export const Box = <T extends Static<typeof Base>, >(T: Runtype<T>, ) => \
         Record({ value: T, }).And(Partial({ label: String, }));"
    ));
    assert!(text.contains("export type Box<T extends Base> = Static<ReturnType<typeof Box<T>>>;"));
    assert!(text.contains("export const Use = Record({ boxed: Box(Record({ id: String, }), ), });"));
}

#[test]
fn variadic_tuple_in_io_ts() {
    let (_, text) = generate(&fixture("tuples.json"), DialectKind::IoTs);
    assert!(text.contains("export const Pair = tuple([string, number, ]);"));
    assert!(text.contains("(u): u is [string, ...number[], boolean] => Array.isArray(u) && u.length >= 2"));
    assert!(text.contains("string.is(u[0]) && array(number).is(u.slice(1, -1)) && boolean.is(u[u.length - 1])"));
    assert!(text.contains("string.is(i[0]) && array(number).is(i.slice(1, -1)) && boolean.is(i[i.length - 1])"));
    assert!(text.contains("failure(i, c, 'Variadic tuple does not match schema')"));
}

#[test]
fn object_keys_enums_and_built_ins() {
    let (_, text) = generate(&fixture("objects.json"), DialectKind::Runtypes);
    assert!(text.contains("export const Color = Literal(_Color.Red).Or(Literal(_Color.Green));"));
    assert!(text.contains(
        "export const Settings = Record({ [`has spaces`]: String, [`\\${template}`]: Number, color: Color, \
         exact: Literal(_Color.Red), created: InstanceOf(Date), counts: Dictionary(Number, String), \
         mode: Literal(\"on\"), }).And(Partial({ note: String.Or(Undefined), onChange: Function, }));"
    ));
    assert!(text.contains("import { Color as _Color } from './types';"));
}

#[test]
fn unknown_export_is_an_error() {
    let graph = fixture("primitive.json");
    let err = generate_exports(&graph, DialectKind::Zod.writer(), ["Missing"]).unwrap_err();
    assert!(matches!(err, Error::UnknownExport(name) if name == "Missing"));
}
