//! Error types for the three phases a caller can hit: declaration, parsing and
//! typed access.

use thiserror::Error;

use crate::value::{ScalarType, TypeTag};

/// A raw token could not be converted into the declared scalar type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert '{raw}' to {target}")]
pub struct ConvertError {
    pub raw: String,
    pub target: ScalarType,
}

/// Rejected registration. The registry is left untouched when `add` fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclareError {
    #[error("key is already registered in option list: -{short}({long})")]
    DuplicateKey { short: char, long: String },

    #[error("name is already registered in argument list: {0}")]
    DuplicateName(String),

    #[error("argument added after variable arguments: {0}")]
    VariadicAlreadyClosed(String),

    #[error("default value of {name} does not match its declared type {tag}")]
    DefaultTypeMismatch { name: String, tag: TypeTag },
}

/// Parse-time failure. The `Display` text is what `Parser::error_message`
/// reports to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid argument name specified: {0}")]
    UnknownOption(String),

    #[error("argument should be specified for {0}")]
    TooFewArguments(String),

    #[error("invalid type was specified for {display}")]
    InvalidType {
        display: String,
        #[source]
        source: Option<ConvertError>,
    },

    #[error("{0} should be specified.")]
    MissingRequired(String),
}

impl ParseError {
    /// Human readable message, identical to the `Display` output.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Typed accessor failure. Independent of the parse outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("no declaration matches {0}")]
    NotFound(String),

    #[error("{name} is declared as {declared}, not {requested}")]
    TypeMismatch {
        name: String,
        declared: TypeTag,
        requested: TypeTag,
    },

    #[error("{0} has no value and no default")]
    Unset(String),
}

pub type DeclareResult<T> = Result<T, DeclareError>;
pub type AccessResult<T> = Result<T, AccessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_messages_match_usage_conventions() {
        let err = ParseError::UnknownOption("-x".to_string());
        assert_eq!(err.message(), "invalid argument name specified: -x");

        let err = ParseError::MissingRequired("-n(count)".to_string());
        assert_eq!(err.to_string(), "-n(count) should be specified.");

        let err = ParseError::InvalidType {
            display: "numbers".to_string(),
            source: Some(ConvertError {
                raw: "abc".to_string(),
                target: ScalarType::I32,
            }),
        };
        assert_eq!(err.to_string(), "invalid type was specified for numbers");
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("cannot convert 'abc' to i32"));
    }
}
