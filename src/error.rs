//! Errors raised while reading parameter files and compiling expressions

use std::path::PathBuf;

use thiserror::Error;

/// Crate result type
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors from parsing parameter text and looking up typed values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("line {line}: {message} (open sections: [{}])", .scope.join(" / "))]
    Structural {
        line: usize,
        message: String,
        scope: Vec<String>,
    },

    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("expected {expected} for `{key}` in [{}], found `{text}`", .path.join(" / "))]
    Type {
        expected: String,
        path: Vec<String>,
        key: String,
        text: String,
    },

    #[error("no entry `{key}` in [{}]", .path.join(" / "))]
    MissingKey { path: Vec<String>, key: String },
}

/// Errors from compiling an expression into a [`CompiledFunction`](crate::ast::CompiledFunction)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("unbound identifier `{name}` at offset {offset}")]
    UnboundIdentifier { name: String, offset: usize },

    #[error("function `{name}` at offset {offset} takes {expected} arguments, found {found}")]
    ArgumentCount {
        name: String,
        offset: usize,
        expected: usize,
        found: usize,
    },

    #[error("`{0}` is not a valid symbol name")]
    InvalidSymbol(String),

    #[error("symbol `{0}` is declared more than once")]
    DuplicateSymbol(String),

    #[error("expected {expected} function components, found {found}")]
    ComponentCount { expected: usize, found: usize },
}

/// Errors from calling a compiled function with mismatched inputs
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum EvaluationError {
    #[error("expected {expected} arguments, found {found}")]
    ArgumentCount { expected: usize, found: usize },

    #[error("component {component} out of range for a function with {count} components")]
    ComponentOutOfRange { component: usize, count: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
