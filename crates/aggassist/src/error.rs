use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured error with a stable classification.
/// Every fallible operation in this crate returns one of these.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    /// The variant (if present) must correspond to `origin`.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    /// Construct an InternalError without structured detail.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct a fragment-origin conflict (duplicate sibling name).
    pub(crate) fn fragment_conflict(name: &str) -> Self {
        Self::new(
            ErrorClass::Conflict,
            ErrorOrigin::Fragment,
            format!("duplicate aggregation name '{name}' under one parent"),
        )
    }

    /// Construct a response-origin corruption error.
    pub(crate) fn response_corruption(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, ErrorOrigin::Response, message)
    }

    /// Construct a response-origin not-found error for a root lookup.
    pub(crate) fn response_not_found(name: &str) -> Self {
        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Response,
            format!("aggregation result '{name}' not found in response"),
        )
    }

    /// Construct a fragment-origin internal error.
    pub(crate) fn fragment_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Fragment, message)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self.class, ErrorClass::Unsupported)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`InternalError`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Collect(CollectError),
    #[error("{0}")]
    Context(ContextError),
    #[error("{0}")]
    Config(ConfigError),
}

///
/// CollectError
///
/// Failures raised while a node turns its raw result into a value.
/// Never returned directly; always wrapped in [`ErrorDetail::Collect`].
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CollectError {
    #[error("unsupported aggregation shape '{shape}' for assistant '{node}'")]
    UnsupportedShape { node: String, shape: String },

    #[error("bucket of assistant '{node}' has no result for child '{child}'")]
    MissingChild { node: String, child: String },
}

impl From<CollectError> for InternalError {
    fn from(err: CollectError) -> Self {
        let class = match &err {
            CollectError::UnsupportedShape { .. } => ErrorClass::Unsupported,
            CollectError::MissingChild { .. } => ErrorClass::NotFound,
        };

        Self {
            class,
            origin: ErrorOrigin::Collect,
            message: err.to_string(),
            detail: Some(ErrorDetail::Collect(err)),
        }
    }
}

///
/// ContextError
///
/// Typed-read failures against a row context.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ContextError {
    #[error("row context has no value for '{key}'")]
    Missing { key: String },

    #[error("row context value '{key}' is not a {expected}")]
    TypeMismatch { key: String, expected: &'static str },
}

impl From<ContextError> for InternalError {
    fn from(err: ContextError) -> Self {
        let class = match &err {
            ContextError::Missing { .. } => ErrorClass::NotFound,
            ContextError::TypeMismatch { .. } => ErrorClass::InvariantViolation,
        };

        Self {
            class,
            origin: ErrorOrigin::Context,
            message: err.to_string(),
            detail: Some(ErrorDetail::Context(err)),
        }
    }
}

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid assistant config: {0}")]
    Toml(#[from] toml::de::Error),
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self {
            class: ErrorClass::Unsupported,
            origin: ErrorOrigin::Config,
            message: err.to_string(),
            detail: Some(ErrorDetail::Config(err)),
        }
    }
}

///
/// ErrorClass
/// Error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Corruption,
    NotFound,
    Internal,
    Conflict,
    Unsupported,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Corruption => "corruption",
            Self::NotFound => "not_found",
            Self::Internal => "internal",
            Self::Conflict => "conflict",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Fragment,
    Response,
    Collect,
    Context,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Fragment => "fragment",
            Self::Response => "response",
            Self::Collect => "collect",
            Self::Context => "context",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}
