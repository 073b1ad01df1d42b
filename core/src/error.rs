//! Error types for the registry model.
//!
//! [`ExprError`] covers dependency-expression tokenizing and parsing.
//! [`ModelError`] covers everything that makes a registry entry unusable:
//! malformed versions, broken aliases, commands without a level, and
//! requirements naming commands that were never declared.

use thiserror::Error;

/// Errors produced while tokenizing or parsing a dependency expression.
///
/// Every variant carries the byte index of the offending character in the
/// input expression text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    /// A `(` with no matching `)`.
    #[error("unmatched '(' at index {index}")]
    UnmatchedOpen { index: usize },
    /// A `)` with no preceding `(`.
    #[error("unmatched ')' at index {index}")]
    UnmatchedClose { index: usize },
    /// A term between separators is empty (e.g. `A,,B` or `A+`).
    #[error("empty term at index {index}")]
    EmptyTerm { index: usize },
    /// A parenthesis that is neither a group boundary nor a separator
    /// neighbour (e.g. `A(B)`).
    #[error("misplaced parenthesis at index {index}")]
    MisplacedParen { index: usize },
}

/// Errors raised while building the in-memory model from raw entries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Version text does not begin with `X.Y`.
    #[error("\"{0}\" is not a valid version string")]
    InvalidVersion(String),
    /// A dependency expression could not be parsed.
    #[error("malformed dependency expression \"{expression}\": {source}")]
    MalformedExpression {
        expression: String,
        #[source]
        source: ExprError,
    },
    /// A command entry carries no name at all.
    #[error("command entry has no name")]
    MissingCommandName,
    /// A command name lacks the API namespace prefix.
    #[error("command \"{name}\" must begin with the \"{prefix}\" namespace identifier")]
    MissingNamespace { name: String, prefix: String },
    /// An alias points to a command that is not declared.
    #[error("command alias \"{alias}\" refers to missing command \"{target}\"")]
    MissingAliasTarget { alias: String, target: String },
    /// Following aliases returned to an alias already visited.
    #[error("command alias cycle detected at \"{0}\"")]
    AliasCycle(String),
    /// The first parameter type matches no known handle set.
    #[error("the command \"{name}\" appears to have no level")]
    UndeterminedLevel { name: String, owner: Option<String> },
    /// Two unrestricted command entries share a name.
    #[error("duplicate command definition: {0}")]
    DuplicateCommand(String),
    /// A requirement names a command missing from the catalog.
    #[error("feature \"{feature}\" requires unknown command \"{command}\"")]
    UnknownCommand { feature: String, command: String },
}

/// Convenience alias for results with [`ModelError`].
pub type Result<T> = std::result::Result<T, ModelError>;
