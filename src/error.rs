//! Application error types using thiserror
//!
//! Error hierarchy:
//! - PluginError: a single package manager backend failed (process or parse)
//! - AnalyzeError: the analysis as a whole could not produce a report
//! - NormalizedError: the uniform, message-bearing shape every failure is
//!   converted into before it is logged or reported

use serde_json::{Map, Value};
use std::error::Error as StdError;
use std::fmt::{self, Write as _};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Prefix used when a raised value has no meaningful message of its own
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Shared, type-erased error used as the cause of a normalized error
pub type ErrorCause = Arc<dyn StdError + Send + Sync + 'static>;

/// Errors raised by a package manager plugin
#[derive(Error, Debug)]
pub enum PluginError {
    /// The external command could not run, or timed out with no usable output
    #[error("[{plugin}] failed to run `{command}`: {message}")]
    Process {
        plugin: String,
        command: String,
        message: String,
    },

    /// Output was received but not in the expected shape
    #[error("[{plugin}] unexpected output: {message}")]
    Parse { plugin: String, message: String },
}

impl PluginError {
    /// Creates a new Process error
    pub fn process(
        plugin: impl Into<String>,
        command: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        PluginError::Process {
            plugin: plugin.into(),
            command: command.into(),
            message: message.into(),
        }
    }

    /// Creates a new Parse error
    pub fn parse(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        PluginError::Parse {
            plugin: plugin.into(),
            message: message.into(),
        }
    }
}

/// A plugin that failed during a multi-plugin analysis
#[derive(Debug, Clone)]
pub struct PluginFailure {
    /// Identifier of the failing plugin
    pub plugin: String,
    /// The normalized failure
    pub error: NormalizedError,
}

impl fmt::Display for PluginFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.plugin, self.error)
    }
}

/// Errors surfaced by the dependency service
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// A plugin was requested by id but nothing is registered under it
    #[error("no package manager plugin registered as '{id}'")]
    UnknownBackend { id: String },

    /// Every applicable plugin failed
    #[error("all applicable plugins failed: {}", join_failures(.failures))]
    Aggregate { failures: Vec<PluginFailure> },

    /// The caller-level deadline elapsed before all plugins completed
    #[error("analysis did not complete within {deadline:?}")]
    DeadlineExceeded { deadline: Duration },
}

impl AnalyzeError {
    /// Creates a new UnknownBackend error
    pub fn unknown_backend(id: impl Into<String>) -> Self {
        AnalyzeError::UnknownBackend { id: id.into() }
    }
}

fn join_failures(failures: &[PluginFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// A raised value of unknown shape, waiting to be normalized.
///
/// Variants are matched in precedence order by [`normalize`].
pub enum Raised {
    /// A real error value; kept as the cause
    Error(ErrorCause),
    /// A bare string
    Text(String),
    /// A structured object, possibly carrying a `message` field
    Object(Map<String, Value>),
    /// Anything that can render itself as text
    Display(Box<dyn fmt::Display + Send + Sync>),
    Number(f64),
    Bool(bool),
    Null,
    Undefined,
}

impl Raised {
    /// Wrap any error type
    pub fn error<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Raised::Error(Arc::new(err))
    }

    /// Wrap anything implementing Display
    pub fn display<D>(value: D) -> Self
    where
        D: fmt::Display + Send + Sync + 'static,
    {
        Raised::Display(Box::new(value))
    }
}

impl fmt::Debug for Raised {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Raised::Error(e) => f.debug_tuple("Error").field(e).finish(),
            Raised::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Raised::Object(m) => f.debug_tuple("Object").field(m).finish(),
            Raised::Display(_) => f.write_str("Display(..)"),
            Raised::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Raised::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Raised::Null => f.write_str("Null"),
            Raised::Undefined => f.write_str("Undefined"),
        }
    }
}

impl From<&str> for Raised {
    fn from(value: &str) -> Self {
        Raised::Text(value.to_string())
    }
}

impl From<String> for Raised {
    fn from(value: String) -> Self {
        Raised::Text(value)
    }
}

impl From<bool> for Raised {
    fn from(value: bool) -> Self {
        Raised::Bool(value)
    }
}

impl From<f64> for Raised {
    fn from(value: f64) -> Self {
        Raised::Number(value)
    }
}

impl From<i64> for Raised {
    fn from(value: i64) -> Self {
        Raised::Number(value as f64)
    }
}

impl From<Value> for Raised {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Raised::Null,
            Value::Bool(b) => Raised::Bool(b),
            Value::Number(n) => n.as_f64().map(Raised::Number).unwrap_or(Raised::Null),
            Value::String(s) => Raised::Text(s),
            Value::Object(map) => Raised::Object(map),
            array @ Value::Array(_) => Raised::Display(Box::new(array)),
        }
    }
}

impl<T: Into<Raised>> From<Option<T>> for Raised {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Raised::Undefined)
    }
}

impl From<PluginError> for Raised {
    fn from(value: PluginError) -> Self {
        Raised::error(value)
    }
}

/// Uniform error representation: a non-empty message and an optional cause.
///
/// The cause is kept for diagnostics only.
#[derive(Clone)]
pub struct NormalizedError {
    message: String,
    cause: Option<ErrorCause>,
}

impl NormalizedError {
    /// Create a normalized error with an explicit message and cause
    pub fn new(message: impl Into<String>, cause: Option<ErrorCause>) -> Self {
        let message = message.into();
        let message = if message.is_empty() {
            format!("{}: \"\"", UNKNOWN_ERROR_MESSAGE)
        } else {
            message
        };
        Self { message, cause }
    }

    /// Wrap an existing error, keeping it as the cause
    pub fn from_error<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        normalize(Raised::error(err))
    }

    /// The human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The original failure, if the raised value was an error
    pub fn cause(&self) -> Option<&ErrorCause> {
        self.cause.as_ref()
    }
}

impl fmt::Debug for NormalizedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizedError")
            .field("message", &self.message)
            .field("cause", &self.cause.as_ref().map(|c| c.to_string()))
            .finish()
    }
}

impl fmt::Display for NormalizedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for NormalizedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_ref()
            .map(|c| c.as_ref() as &(dyn StdError + 'static))
    }
}

/// Convert any raised value into a [`NormalizedError`]. Never fails.
pub fn normalize(value: impl Into<Raised>) -> NormalizedError {
    let value = value.into();

    match value {
        Raised::Error(err) => NormalizedError::new(err.to_string(), Some(err)),
        Raised::Text(text) => NormalizedError::new(text, None),
        Raised::Object(map) => match map.get("message") {
            Some(Value::String(message)) => NormalizedError::new(message.clone(), None),
            _ => unknown(&Value::Object(map).to_string()),
        },
        Raised::Display(display) => {
            let mut rendered = String::new();
            match write!(rendered, "{}", display) {
                Ok(()) if !rendered.is_empty() => NormalizedError::new(rendered, None),
                _ => unknown("[unprintable]"),
            }
        }
        Raised::Number(n) => unknown(&format_number(n)),
        Raised::Bool(b) => unknown(&b.to_string()),
        Raised::Null => unknown("null"),
        Raised::Undefined => unknown("undefined"),
    }
}

fn unknown(repr: &str) -> NormalizedError {
    NormalizedError::new(format!("{}: {}", UNKNOWN_ERROR_MESSAGE, repr), None)
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
