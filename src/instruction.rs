//! The instruction stream: the only channel between traversal and renderer.
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Import {
    /// Module specifier, e.g. `zod`.
    pub source: String,
    pub name: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticParameter {
    pub name: String,
    pub constraint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Instruction {
    /// Append a text fragment to the innermost open declaration.
    Write { text: String },
    Import(Import),
    /// Import the compile-time type `name` from the module the types came from.
    ImportFromSource { name: String, alias: String },
    /// Reference a named type. `reused == false` opens its declaration; every
    /// instruction up to the matching `EndDeclaration` belongs to it.
    DeclareAndUse { name: String, reused: bool },
    EndDeclaration { name: String },
    /// Explicit annotation for the open constant (`const A: Runtype<_A> = ...`).
    DeclareType { text: String },
    /// Static type of the open declaration; `${name}` is replaced by its name.
    Static { text: String },
    StaticParameters { parameters: Vec<StaticParameter> },
}

/// Collects instructions in emission order. A muted emitter drops everything,
/// which is what the discovery pass of a session uses.
#[derive(Debug, Default)]
pub struct Emitter {
    out: Vec<Instruction>,
    muted: bool,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn muted() -> Self {
        Self { out: Vec::new(), muted: true }
    }

    pub fn push(&mut self, instruction: Instruction) {
        if !self.muted {
            self.out.push(instruction);
        }
    }

    pub fn write(&mut self, text: impl Into<String>) {
        self.push(Instruction::Write { text: text.into() });
    }
    pub fn import(&mut self, source: &str, name: &str) {
        self.push(Instruction::Import(Import {
            source: source.to_string(),
            name: name.to_string(),
            alias: None,
        }));
    }
    pub fn import_as(&mut self, source: &str, name: &str, alias: &str) {
        self.push(Instruction::Import(Import {
            source: source.to_string(),
            name: name.to_string(),
            alias: Some(alias.to_string()),
        }));
    }
    pub fn import_from_source(&mut self, name: &str, alias: &str) {
        self.push(Instruction::ImportFromSource { name: name.to_string(), alias: alias.to_string() });
    }
    pub fn declare_type(&mut self, text: impl Into<String>) {
        self.push(Instruction::DeclareType { text: text.into() });
    }
    pub fn static_type(&mut self, text: impl Into<String>) {
        self.push(Instruction::Static { text: text.into() });
    }
    pub fn static_parameters(&mut self, parameters: Vec<StaticParameter>) {
        self.push(Instruction::StaticParameters { parameters });
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.out
    }
}
