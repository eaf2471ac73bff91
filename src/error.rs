use std::fmt;

/// Error produced by user handlers.
///
/// Handlers are ordinary fallible Rust code, so any error type can be returned
/// with `?`. Callers that need the concrete type back use
/// [`anyhow::Error::downcast_ref`].
pub type HandlerError = anyhow::Error;

/// Result type returned by every handler.
pub type HandlerResult = Result<(), HandlerError>;

/// Route registration error
///
/// Returned by [`RouteTable::add`](crate::router::RouteTable::add) and the
/// [`App`](crate::app::App) registration methods. Both variants are programmer
/// errors raised at startup, never during request handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The exact pattern string is already registered
    Duplicate {
        /// The pattern that was registered twice
        pattern: String,
    },
    /// The pattern cannot be compiled into a matcher
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// What is wrong with it
        reason: &'static str,
    },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::Duplicate { pattern } => {
                write!(
                    f,
                    "Duplicate route '{}'. Each pattern may only be registered once.",
                    pattern
                )
            }
            RouteError::InvalidPattern { pattern, reason } => {
                write!(f, "Invalid route pattern '{}': {}", pattern, reason)
            }
        }
    }
}

impl std::error::Error for RouteError {}

/// Template rendering error
#[derive(Debug)]
pub struct TemplateError {
    name: String,
    source: minijinja::Error,
}

impl TemplateError {
    pub(crate) fn new(name: &str, source: minijinja::Error) -> Self {
        Self {
            name: name.to_string(),
            source,
        }
    }

    /// Name of the template that failed
    #[must_use]
    pub fn template_name(&self) -> &str {
        &self.name
    }

    /// Whether the failure was a missing template file
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.source.kind() == minijinja::ErrorKind::TemplateNotFound
    }
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to render template '{}': {}", self.name, self.source)
    }
}

impl std::error::Error for TemplateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
