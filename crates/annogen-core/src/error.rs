//! Error types surfaced to the driver

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Where in the run an error originates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Drops a single declaration from the corpus.
    Parse,
    /// Skips one strategy for one declaration.
    Strategy,
    /// Corpus-wide, reported once per contract.
    Registration,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Parse => write!(f, "parse"),
            ErrorCategory::Strategy => write!(f, "strategy"),
            ErrorCategory::Registration => write!(f, "registration"),
        }
    }
}

/// Error type for generation runs
///
/// Every variant names the offending declaration; member-level variants also
/// name the member or fields involved.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum GenerationError {
    /// A declaration or one of its members could not be classified
    #[error("malformed declaration `{declaration}`{} (line {line}): {reason}", member_suffix(.member))]
    MalformedDeclaration {
        declaration: String,
        member: Option<String>,
        reason: String,
        line: usize,
    },

    /// A strategy's preconditions are not met by the declaration
    #[error("cannot apply `{strategy}` to `{declaration}`: {reason}")]
    UnresolvableStrategy {
        declaration: String,
        strategy: String,
        reason: String,
    },

    /// A stub needs a default value for a type it cannot construct
    #[error("missing fixture for `{type_name}` returned by `{declaration}.{member}`")]
    MissingFixture {
        declaration: String,
        member: String,
        type_name: String,
    },

    /// A mapping pair has fields that cannot be matched
    #[error("cannot map `{counterpart}` to `{declaration}`: unmatched fields {}", .fields.join(", "))]
    IncompatibleFieldSet {
        declaration: String,
        counterpart: String,
        fields: Vec<String>,
    },

    /// More than one annotated type implements the same contract
    #[error("ambiguous registration for `{contract}`: candidates {}", .candidates.join(", "))]
    AmbiguousRegistration {
        contract: String,
        candidates: Vec<String>,
    },

    /// An annotated contract has no annotated implementation
    #[error("no annotated implementation registered for `{contract}`")]
    UnregisteredContract { contract: String },

    /// A feature composes a feature declared at or after itself
    #[error("feature `{declaration}` composes `{child}` in field `{field}` before it is declared")]
    CompositionOrder {
        declaration: String,
        field: String,
        child: String,
    },
}

fn member_suffix(member: &Option<String>) -> String {
    member
        .as_ref()
        .map(|m| format!(", member `{m}`"))
        .unwrap_or_default()
}

impl GenerationError {
    /// Stable numeric code, used for exit summaries
    pub fn error_code(&self) -> u32 {
        match self {
            GenerationError::MalformedDeclaration { .. } => 1,
            GenerationError::UnresolvableStrategy { .. } => 2,
            GenerationError::MissingFixture { .. } => 3,
            GenerationError::IncompatibleFieldSet { .. } => 4,
            GenerationError::AmbiguousRegistration { .. } => 5,
            GenerationError::UnregisteredContract { .. } => 6,
            GenerationError::CompositionOrder { .. } => 7,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            GenerationError::MalformedDeclaration { .. } => ErrorCategory::Parse,
            GenerationError::UnresolvableStrategy { .. }
            | GenerationError::MissingFixture { .. }
            | GenerationError::IncompatibleFieldSet { .. }
            | GenerationError::CompositionOrder { .. } => ErrorCategory::Strategy,
            GenerationError::AmbiguousRegistration { .. }
            | GenerationError::UnregisteredContract { .. } => ErrorCategory::Registration,
        }
    }

    /// Name of the offending declaration (the contract for registration errors)
    pub fn declaration(&self) -> &str {
        match self {
            GenerationError::MalformedDeclaration { declaration, .. }
            | GenerationError::UnresolvableStrategy { declaration, .. }
            | GenerationError::MissingFixture { declaration, .. }
            | GenerationError::IncompatibleFieldSet { declaration, .. }
            | GenerationError::CompositionOrder { declaration, .. } => declaration,
            GenerationError::AmbiguousRegistration { contract, .. }
            | GenerationError::UnregisteredContract { contract } => contract,
        }
    }

    /// Offending member or field, when the error concerns exactly one
    pub fn member(&self) -> Option<&str> {
        match self {
            GenerationError::MalformedDeclaration { member, .. } => member.as_deref(),
            GenerationError::MissingFixture { member, .. } => Some(member),
            GenerationError::CompositionOrder { field, .. } => Some(field),
            GenerationError::IncompatibleFieldSet { fields, .. } if fields.len() == 1 => {
                fields.first().map(String::as_str)
            }
            _ => None,
        }
    }
}
