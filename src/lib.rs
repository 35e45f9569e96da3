//! Generate runtime validators (runtypes, zod, io-ts) from a static type model.
pub mod cache;
pub mod classify;
pub mod dialect;
pub mod error;
pub mod instruction;
pub mod manifest;
pub mod model;
pub mod object;
pub mod path_de;
pub mod render;
pub mod session;
pub mod tracker;
pub mod tuple;

pub use dialect::{Dialect, DialectKind, dialect};
pub use error::Error;
pub use instruction::Instruction;
pub use model::{TypeGraph, TypeId, TypeNode};
pub use render::{RenderOptions, render};
pub use session::{Generated, Root, generate, generate_exports};
pub use tracker::Diagnostic;
