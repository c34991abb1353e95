use thiserror::Error;

/// The user-input errors raised while processing a command line.
///
/// Every variant describes a rule violated by the *user* of the final program.
/// These errors propagate unmodified through the parse pipeline and are
/// rendered exactly once by the top-level driver ([`Parser::process`](crate::Parser::process)).
///
/// Mis-configurations of the parser itself (ex: registering the same name
/// twice, referencing an unknown name in a relation) are programmer bugs, not
/// user errors.
/// Those panic immediately at the registration call site and never appear here.
#[derive(Debug, Error, PartialEq)]
pub enum ArgumentError {
    /// A value was present but failed its cast/type conversion.
    #[error("{0}")]
    Format(String),

    /// An option label was given, but no token was available to satisfy its reader.
    #[error("'{0}' specified but missing given value.")]
    MissingValue(String),

    /// A required option, with no satisfied replacement, is absent.
    #[error("no value passed for '{0}'.")]
    MissingRequired(String),

    /// A required option and all of its replacements are simultaneously absent.
    #[error("[{}] not specified.", .0.join(", "))]
    ManyAllowedNoneSpecified(Vec<String>),

    /// An option occurred more than once without being marked multi-valued.
    #[error("'{0}' specified multiple times.")]
    MultipleSpecified(String),

    /// An unrecognized option label.
    #[error("illegal option '{0}'.")]
    Unspecified(String),

    /// A satisfied option's required dependency (a plain option) is unmet.
    #[error("'{option}' requires '{dependency}'.")]
    Dependency { option: String, dependency: String },

    /// A satisfied option's required dependency (a relational/composed condition) is unmet.
    #[error("'{option}' requires that {condition}.")]
    Condition { option: String, condition: String },

    /// Two simultaneously satisfied options are declared mutually exclusive.
    #[error("'{left}' conflicts with '{right}'.")]
    Conflict { left: String, right: String },

    /// A custom per-option predicate rejected the final parsed state.
    #[error("condition failed for '{0}'.")]
    FailedCondition(String),
}
