use std::fmt;

/// A statistics or scoring step could not produce a finite value.
#[derive(Debug, Clone, PartialEq)]
pub enum ComputeError {
    /// The input window was empty.
    EmptyInput(&'static str),
    /// The input or an intermediate value was NaN or infinite.
    NonFinite(&'static str),
}

impl fmt::Display for ComputeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputeError::EmptyInput(what) => write!(f, "empty input for {what}"),
            ComputeError::NonFinite(what) => write!(f, "non-finite value in {what}"),
        }
    }
}

impl std::error::Error for ComputeError {}

/// An inbound sample did not have the required shape.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleError {
    MissingField(&'static str),
    NonFinite(&'static str),
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleError::MissingField(field) => write!(f, "missing required field '{field}'"),
            SampleError::NonFinite(field) => write!(f, "field '{field}' is not a finite number"),
        }
    }
}

impl std::error::Error for SampleError {}

/// Engine configuration is internally inconsistent.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "invalid engine config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

pub type ComputeResult<T> = std::result::Result<T, ComputeError>;
