//! Turns an instruction stream into TypeScript source.
//!
//! Declarations nest in the stream (a type declared while another one is
//! open), but the output is flat: each declaration is printed once it ends,
//! so dependencies always come before their users.
use indexmap::{IndexMap, IndexSet};

use crate::error::Error;
use crate::instruction::{Instruction, StaticParameter};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Module the original types are imported from, e.g. `./types`.
    pub source_module: String,
    /// Comment placed above the imports.
    pub header: Option<String>,
}

#[derive(Debug, Default)]
struct Declaration {
    name: String,
    body: String,
    annotation: Option<String>,
    static_type: Option<String>,
    parameters: Vec<StaticParameter>,
}

type Imports = IndexMap<String, IndexSet<(String, Option<String>)>>;

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl RenderOptions {
    pub fn new(source_module: impl Into<String>) -> Self {
        Self { source_module: source_module.into(), header: None }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }
}

pub fn render(instructions: &[Instruction], options: &RenderOptions) -> Result<String, Error> {
    let mut imports = Imports::new();
    let mut open: Vec<Declaration> = Vec::new();
    let mut done: Vec<Declaration> = Vec::new();

    for instruction in instructions {
        match instruction {
            Instruction::Write { text } => current(&mut open, instruction)?.body.push_str(text),
            Instruction::Import(import) => {
                let alias = import.alias.clone().filter(|alias| alias != &import.name);
                imports
                    .entry(import.source.clone())
                    .or_default()
                    .insert((import.name.clone(), alias));
            }
            Instruction::ImportFromSource { name, alias } => {
                let alias = Some(alias.clone()).filter(|alias| alias != name);
                imports
                    .entry(options.source_module.clone())
                    .or_default()
                    .insert((name.clone(), alias));
            }
            Instruction::DeclareAndUse { name, reused } => {
                if let Some(outer) = open.last_mut() {
                    outer.body.push_str(name);
                }
                if !reused {
                    open.push(Declaration { name: name.clone(), ..Declaration::default() });
                }
            }
            Instruction::EndDeclaration { name } => {
                let declaration = open
                    .pop()
                    .ok_or_else(|| Error::Render(format!("`{name}` ends but was never opened")))?;
                if &declaration.name != name {
                    return Err(Error::Render(format!(
                        "`{name}` ends while `{}` is still open",
                        declaration.name
                    )));
                }
                done.push(declaration);
            }
            Instruction::DeclareType { text } => current(&mut open, instruction)?.annotation = Some(text.clone()),
            Instruction::Static { text } => current(&mut open, instruction)?.static_type = Some(text.clone()),
            Instruction::StaticParameters { parameters } => {
                current(&mut open, instruction)?.parameters = parameters.clone();
            }
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(Error::Render(format!("`{}` is never closed", unclosed.name)));
    }

    let mut sections = Vec::new();
    if let Some(header) = &options.header {
        sections.push(header.lines().map(|line| format!("// {line}")).collect::<Vec<_>>().join("\n"));
    }
    if !imports.is_empty() {
        sections.push(render_imports(imports));
    }
    sections.extend(done.iter().map(render_declaration));

    let mut output = sections.join("\n\n");
    output.push('\n');
    Ok(output)
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn current<'d>(open: &'d mut [Declaration], instruction: &Instruction) -> Result<&'d mut Declaration, Error> {
    open.last_mut()
        .ok_or_else(|| Error::Render(format!("{instruction:?} outside of any declaration")))
}

fn render_imports(imports: Imports) -> String {
    imports
        .into_iter()
        .map(|(module, names)| {
            let mut names = names.into_iter().collect::<Vec<_>>();
            names.sort();
            let names = names
                .into_iter()
                .map(|(name, alias)| match alias {
                    Some(alias) => format!("{name} as {alias}"),
                    None => name,
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("import {{ {names} }} from '{module}';")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_declaration(declaration: &Declaration) -> String {
    let Declaration { name, body, annotation, static_type, parameters } = declaration;
    let annotation = annotation.as_ref().map(|a| format!(": {a}")).unwrap_or_default();
    let mut text = format!("export const {name}{annotation} = {body};");

    if let Some(static_type) = static_type {
        let parameters = if parameters.is_empty() {
            String::new()
        } else {
            let list = parameters
                .iter()
                .map(|p| match &p.constraint {
                    Some(constraint) => format!("{} extends {constraint}", p.name),
                    None => p.name.clone(),
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("<{list}>")
        };
        let static_type = static_type.replace("${name}", name);
        text.push_str(&format!("\n\nexport type {name}{parameters} = {static_type};"));
    }
    text
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Emitter;

    fn open(em: &mut Emitter, name: &str) {
        em.push(Instruction::DeclareAndUse { name: name.into(), reused: false });
    }

    fn close(em: &mut Emitter, name: &str) {
        em.push(Instruction::EndDeclaration { name: name.into() });
    }

    #[test]
    fn nested_declarations_come_out_dependencies_first() {
        let mut em = Emitter::new();
        open(&mut em, "Outer");
        em.static_type("Static<typeof ${name}>");
        em.write("Array(");
        open(&mut em, "Inner");
        em.static_type("Static<typeof ${name}>");
        em.write("String");
        close(&mut em, "Inner");
        em.write(")");
        close(&mut em, "Outer");

        let text = render(&em.into_instructions(), &RenderOptions::new("./types")).unwrap();
        assert_eq!(
            text,
            "export const Inner = String;\n\n\
             export type Inner = Static<typeof Inner>;\n\n\
             export const Outer = Array(Inner);\n\n\
             export type Outer = Static<typeof Outer>;\n"
        );
    }

    #[test]
    fn imports_are_deduplicated_per_module() {
        let mut em = Emitter::new();
        open(&mut em, "A");
        em.import("zod", "string");
        em.import("zod", "string");
        em.import_as("zod", "null", "Null");
        em.import_from_source("A", "_A");
        em.import_from_source("A", "_A");
        em.write("string()");
        close(&mut em, "A");

        let text = render(&em.into_instructions(), &RenderOptions::new("./model").with_header("generated")).unwrap();
        assert!(text.starts_with(
            "// generated\n\nimport { null as Null, string } from 'zod';\nimport { A as _A } from './model';\n\n"
        ));
    }

    #[test]
    fn annotation_and_generic_parameters() {
        let mut em = Emitter::new();
        open(&mut em, "Box");
        em.declare_type("Runtype<_Box>");
        em.static_parameters(vec![
            StaticParameter { name: "T".into(), constraint: Some("Static<typeof Base>".into()) },
            StaticParameter { name: "U".into(), constraint: None },
        ]);
        em.static_type("Static<ReturnType<typeof Box<T, U>>>");
        em.write("x");
        close(&mut em, "Box");
        let text = render(&em.into_instructions(), &RenderOptions::new("./types")).unwrap();
        assert!(text.contains("export const Box: Runtype<_Box> = x;"));
        assert!(text.contains("export type Box<T extends Static<typeof Base>, U> = Static<ReturnType<typeof Box<T, U>>>;"));
    }

    #[test]
    fn unbalanced_streams_are_rejected() {
        let mut em = Emitter::new();
        open(&mut em, "A");
        assert!(matches!(render(&em.into_instructions(), &RenderOptions::new("./t")), Err(Error::Render(_))));

        let stray = [Instruction::Write { text: "x".into() }];
        assert!(matches!(render(&stray, &RenderOptions::new("./t")), Err(Error::Render(_))));
    }
}
