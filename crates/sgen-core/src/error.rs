//! Error types for stylesheet compilation.
//!
//! Each stage of the pipeline has its own error enum so callers can match on
//! the failure they care about. [`Error`] aggregates all of them for callers
//! that drive the whole pipeline and only need to report.
//!
//! | Stage | Error |
//! |-------|-------|
//! | Condition parsing | [`ConditionError`] |
//! | Rhs value parsing | [`RhsError`] (wraps [`ColorError`], [`ConditionError`]) |
//! | Loading stylesheet files | [`GeneratorError`] |
//! | Linking and resolution | [`ResolveError`] |

use std::path::PathBuf;

use thiserror::Error;

/// A condition string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    /// Bad operator, bad term count or unknown token.
    #[error("malformed condition `{condition}`: {reason}")]
    Malformed { condition: String, reason: String },
}

/// A hex color literal could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("color `{0}` must start with `#`")]
    MissingHashPrefix(String),

    #[error("color `{0}` is not a valid hex value")]
    InvalidHex(String),

    #[error("color `{value}` has {len} hex digits, expected 3 or 6 plus an optional 2-digit alpha")]
    InvalidLength { value: String, len: usize },
}

/// A right-hand side value could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RhsError {
    /// The string matches no value form, names an unknown call, or a form
    /// has bad arguments.
    #[error("malformed rhs value `{value}`: {reason}")]
    Malformed { value: String, reason: String },

    #[error(transparent)]
    InvalidColor(#[from] ColorError),

    #[error("invalid font `{value}`: {reason}")]
    InvalidFont { value: String, reason: String },

    /// A conditional map key is not a valid condition.
    #[error(transparent)]
    Condition(#[from] ConditionError),

    /// The YAML node kind cannot be used as a value in this position.
    #[error("unsupported YAML value {0} as right-hand side")]
    UnsupportedYaml(String),
}

impl RhsError {
    pub(crate) fn malformed(value: impl Into<String>, reason: impl Into<String>) -> Self {
        RhsError::Malformed {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while loading stylesheet sources or rendering output.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("file {} does not exist", path.display())]
    FileDoesNotExist { path: PathBuf },

    #[error("malformed YAML in stylesheet `{stylesheet}`: {message}")]
    MalformedYaml { stylesheet: String, message: String },

    /// A property value failed to parse.
    #[error("illegal value for `{key}` in stylesheet `{stylesheet}`: {source}")]
    IllegalScalarValue {
        stylesheet: String,
        key: String,
        #[source]
        source: RhsError,
    },

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Errors raised while linking the registry or resolving stylesheets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no base stylesheet: exactly one stylesheet must have no superclass")]
    NoBaseStylesheet,

    #[error("multiple base stylesheets: {}", .0.join(", "))]
    MultipleBaseStylesheets(Vec<String>),

    #[error("stylesheet `{0}` is registered twice")]
    DuplicateStylesheet(String),

    #[error("stylesheet `{name}` extends unknown stylesheet `{superclass}`")]
    UnknownSuperclass { name: String, superclass: String },

    #[error("stylesheet `{name}` extends `{superclass}`, which is not the base stylesheet")]
    NestedSuperclass { name: String, superclass: String },

    #[error("style `{style}` in stylesheet `{stylesheet}` extends unknown style `{superclass}`")]
    UnknownStyle {
        stylesheet: String,
        style: String,
        superclass: String,
    },

    #[error("registry must be linked before resolution")]
    NotLinked,

    #[error("invalid redirect `{0}`: expected Style.property or Style.Nested.property")]
    InvalidRedirect(String),

    #[error("redirect `{redirect}` in stylesheet `{stylesheet}` does not match any property")]
    UnresolvedRedirect { redirect: String, stylesheet: String },

    #[error("cycle detected in redirects: {}", path.join(" -> "))]
    RedirectCycle { path: Vec<String> },

    #[error("cycle detected in style inheritance: {}", path.join(" -> "))]
    InheritanceCycle { path: Vec<String> },

    /// Conditional branches must share one materialized type.
    #[error("conditional branches of `{property}` disagree on type: {}", types.join(", "))]
    BranchTypeMismatch { property: String, types: Vec<String> },
}

/// Any error produced by the compilation pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Condition(#[from] ConditionError),

    #[error(transparent)]
    Rhs(#[from] RhsError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_cycle_display() {
        let err = ResolveError::RedirectCycle {
            path: vec!["A.a".into(), "B.b".into(), "A.a".into()],
        };
        assert_eq!(err.to_string(), "cycle detected in redirects: A.a -> B.b -> A.a");
    }

    #[test]
    fn test_rhs_error_wraps_condition() {
        let err: RhsError = ConditionError::Malformed {
            condition: "width ? 3".into(),
            reason: "no operator".into(),
        }
        .into();
        assert!(err.to_string().contains("width ? 3"));
    }

    #[test]
    fn test_error_from_stage_errors() {
        let err: Error = ResolveError::NoBaseStylesheet.into();
        assert!(matches!(err, Error::Resolve(ResolveError::NoBaseStylesheet)));
    }
}
