//! Target validation libraries.
//!
//! Each dialect implements [`Dialect`]: one method per [`Shape`](crate::classify::Shape)
//! plus the default static annotation. Traversal, caching and recursion
//! handling live in [`Session`]; dialects only decide the syntax and call
//! back into the session for nested types.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::{TypeId, TypeNode};
use crate::session::Session;

pub mod io_ts;
pub mod runtypes;
pub mod zod;

pub use io_ts::IoTsDialect;
pub use runtypes::RuntypesDialect;
pub use zod::ZodDialect;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DialectKind {
    Runtypes,
    Zod,
    IoTs,
}

pub type Emit = Result<(), Error>;

/// Emission rules of one validation library.
pub trait Dialect: Send + Sync {
    /// Identifier used on the command line, e.g. `io-ts`.
    fn name(&self) -> &'static str;

    /// Module every validator is imported from, e.g. `zod`.
    fn module(&self) -> &'static str;

    /// Static type of a freshly opened declaration; `${name}` is substituted
    /// by the renderer.
    fn default_static(&self, cx: &mut Session<'_>) -> Emit;

    /// Defer the body of a recursive or circular type behind a thunk.
    fn lazy(&self, cx: &mut Session<'_>, id: TypeId) -> Emit;
    fn enum_literal(&self, cx: &mut Session<'_>, id: TypeId) -> Emit;
    fn null(&self, cx: &mut Session<'_>, id: TypeId) -> Emit;
    fn string(&self, cx: &mut Session<'_>, id: TypeId) -> Emit;
    fn number(&self, cx: &mut Session<'_>, id: TypeId) -> Emit;
    fn boolean(&self, cx: &mut Session<'_>, id: TypeId) -> Emit;
    fn array(&self, cx: &mut Session<'_>, id: TypeId) -> Emit;
    fn tuple(&self, cx: &mut Session<'_>, id: TypeId) -> Emit;
    fn variadic_tuple(&self, cx: &mut Session<'_>, id: TypeId) -> Emit;
    fn enumeration(&self, cx: &mut Session<'_>, id: TypeId) -> Emit;
    fn intersection(&self, cx: &mut Session<'_>, id: TypeId) -> Emit;
    fn union(&self, cx: &mut Session<'_>, id: TypeId) -> Emit;
    fn literal(&self, cx: &mut Session<'_>, id: TypeId) -> Emit;
    fn any(&self, cx: &mut Session<'_>, id: TypeId) -> Emit;
    fn unknown(&self, cx: &mut Session<'_>, id: TypeId) -> Emit;
    fn undefined(&self, cx: &mut Session<'_>, id: TypeId) -> Emit;
    fn never(&self, cx: &mut Session<'_>, id: TypeId) -> Emit;
    fn void(&self, cx: &mut Session<'_>, id: TypeId) -> Emit;
    fn function(&self, cx: &mut Session<'_>, id: TypeId) -> Emit;
    fn built_in_object(&self, cx: &mut Session<'_>, id: TypeId) -> Emit;
    fn string_indexed_object(&self, cx: &mut Session<'_>, id: TypeId) -> Emit;
    fn number_indexed_object(&self, cx: &mut Session<'_>, id: TypeId) -> Emit;
    fn generic_object(&self, cx: &mut Session<'_>, id: TypeId) -> Emit;
    fn object(&self, cx: &mut Session<'_>, id: TypeId) -> Emit;
}

// ————————————————————————————————————————————————————————————————————————————
// LOOKUP
// ————————————————————————————————————————————————————————————————————————————

static RUNTYPES: RuntypesDialect = RuntypesDialect;
static ZOD: ZodDialect = ZodDialect;
static IO_TS: IoTsDialect = IoTsDialect;

pub fn dialect(kind: DialectKind) -> &'static dyn Dialect {
    match kind {
        DialectKind::Runtypes => &RUNTYPES,
        DialectKind::Zod => &ZOD,
        DialectKind::IoTs => &IO_TS,
    }
}

impl DialectKind {
    pub const ALL: [DialectKind; 3] = [DialectKind::Runtypes, DialectKind::Zod, DialectKind::IoTs];

    pub fn writer(self) -> &'static dyn Dialect {
        dialect(self)
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.writer().name())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SHARED HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// A child reference the shape cannot do without.
pub(crate) fn required(node: &TypeNode, child: Option<TypeId>) -> Result<TypeId, Error> {
    child.ok_or_else(|| Error::Unclassifiable { text: node.text.clone() })
}

/// Containing enum and member name of an enum literal (`Color`, `Red`).
pub(crate) fn enum_member(cx: &Session<'_>, id: TypeId) -> Result<(String, String), Error> {
    let node = cx.node(id)?;
    let enum_name = node
        .enum_name
        .clone()
        .ok_or_else(|| Error::MissingEnumName { text: node.text.clone() })?;
    let member = cx.type_name(id)?.to_string();
    Ok((enum_name, member))
}

/// `_Enum.Member` expressions for every member of an enum, importing the enum.
pub(crate) fn enum_member_paths(cx: &mut Session<'_>, id: TypeId) -> Result<Vec<String>, Error> {
    let node = cx.node(id)?;
    let name = cx.type_name(id)?;
    let alias = format!("_{name}");
    cx.out().import_from_source(name, &alias);
    node.enum_members
        .iter()
        .map(|&member| Ok(format!("{alias}.{}", cx.type_name(member)?)))
        .collect()
}
