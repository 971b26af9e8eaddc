use crate::core::key::ServiceKey;
use thiserror::Error;

pub type ContainerResult<T> = Result<T, ContainerError>;

/// Failures raised by service registration and resolution.
///
/// A service that is simply not registered, or whose constructors can never be
/// satisfied, is not an error: resolution returns `Ok(None)` for it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContainerError {
    /// The registered concrete type declares no constructor at all.
    #[error("Failed to construct type '{type_name}'")]
    Construction { type_name: String },

    /// One registration call listed the same service key twice.
    #[error("Service '{key}' is registered more than once in a single registration call")]
    DuplicateRegistration { key: ServiceKey },

    /// A resolved service could not be viewed as the type it was requested as.
    #[error("Service '{key}' could not be produced as the requested type")]
    TypeMismatch { key: ServiceKey },
}

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Failures raised while sending a command to its handler.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Handler not found for command '{command}'")]
    HandlerNotFound { command: String },

    #[error("Handler for command '{command}' failed: {source}")]
    HandlerFailed {
        command: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(transparent)]
    Resolution(#[from] ContainerError),
}

pub type AloResult<T> = Result<T, AloError>;

#[derive(Error, Debug)]
pub enum AloError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Path error: {0}")]
    Path(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}
