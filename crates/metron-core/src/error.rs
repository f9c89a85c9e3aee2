//! Error taxonomy for parsing, dimension checking and conversion

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every failure the engine can surface.
///
/// Errors are returned immediately; nothing in the engine retries or falls
/// back to a different unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Token is not a catalog name, alias, plural, abbreviation or prefixed form
    #[error("Unknown unit: '{0}'")]
    UnknownUnit(String),

    #[error("Malformed unit expression '{input}': {reason}")]
    MalformedUnitExpression {
        input: String,
        reason: MalformedReason,
    },

    #[error("Incompatible dimensions: cannot convert '{from}' to '{to}'")]
    IncompatibleDimension { from: String, to: String },

    /// The dataset has no edge chain between the two units. This is a gap in
    /// the data, not a user mistake.
    #[error("No conversion path from '{from}' to '{to}'")]
    ConversionPathNotFound { from: String, to: String },

    #[error("Arithmetic overflow during {0}")]
    Overflow(&'static str),

    #[error("Cannot raise a measurement to a non-integral power or root")]
    NonIntegralExponent,

    /// Some exponent is not a multiple of the root, even in primitive units
    #[error("Cannot take the {root} root of '{units}'")]
    InvalidRoot { root: String, units: String },

    #[error("Cannot take an even root of a negative value")]
    NegativeRoot,

    #[error("Invalid unit dataset: {0}")]
    InvalidDataset(String),
}

/// Why a unit expression failed to parse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("only one '/' is permitted")]
    MultipleDivisions,
    #[error("empty term")]
    EmptyTerm,
    #[error("exponent '{0}' is not an integer")]
    InvalidExponent(String),
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
}

impl Error {
    pub(crate) fn malformed(input: &str, reason: MalformedReason) -> Self {
        Error::MalformedUnitExpression {
            input: input.to_string(),
            reason,
        }
    }

    pub(crate) fn dataset(msg: impl Into<String>) -> Self {
        Error::InvalidDataset(msg.into())
    }
}
