use crate::model::TypeId;

/// Fatal errors. Any of these aborts the whole generation run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("type `{text}` matches no known shape")]
    Unclassifiable { text: String },

    #[error("no exported type named `{0}`")]
    UnknownExport(String),

    #[error("type id {0} is out of range")]
    UnknownType(TypeId),

    #[error("literal `{text}` ({id}) is also flagged as a primitive keyword")]
    WidenedLiteral { id: TypeId, text: String },

    #[error("type {from} references missing type {to}")]
    DanglingReference { from: TypeId, to: TypeId },

    #[error("anonymous type `{text}` contains itself; only named types may recurse")]
    UnnamedCycle { text: String },

    #[error("tuple `{text}` has more than one variadic element")]
    MultipleVariadic { text: String },

    #[error("enum member `{text}` does not name its enum")]
    MissingEnumName { text: String },

    #[error("type `{text}` has no name")]
    Unnamed { text: String },

    #[error("render: {0}")]
    Render(String),

    #[error("at JSON path {path} → {message}")]
    Parse { path: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
