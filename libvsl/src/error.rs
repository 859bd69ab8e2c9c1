use std::io;
use thiserror::Error;

/// Fatal conditions raised while building the symbol table.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SemanticError {
    #[error("malformed syntax tree: {construct}")]
    MalformedTree { construct: String },

    #[error("unknown identifier `{name}`")]
    UnknownIdentifier { name: String },

    #[error("`{name}` is declared twice in the same scope")]
    DuplicateDeclaration { name: String },
}

impl SemanticError {
    pub fn malformed<S>(construct: S) -> Self
        where S: Into<String>
    {
        SemanticError::MalformedTree { construct: construct.into() }
    }
}

pub type SemanticResult<T> = Result<T, SemanticError>;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("could not read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("unrecognized input: {0}")]
    Lex(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Semantic(#[from] SemanticError),
}
