//! Error types for sketch setup.
//!
//! The per-frame simulation never fails; these cover loading configuration,
//! building the worker pool and encoding particle data for a renderer.

use std::fmt;

/// Errors that can occur while configuring or exporting a sketch.
#[derive(Debug)]
pub enum Error {
    /// Failed to read a configuration file.
    Io(std::io::Error),
    /// Configuration file is not valid YAML for a [`SketchConfig`](crate::SketchConfig).
    Yaml(serde_yaml::Error),
    /// Configuration parsed but holds values the simulator cannot run with.
    InvalidConfig(String),
    /// The worker pool for partitioned stepping could not be created.
    WorkerPool(rayon::ThreadPoolBuildError),
    /// Particle data could not be written into a vertex buffer.
    VertexBuffer(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "Failed to read config file: {}", e),
            Error::Yaml(e) => write!(f, "Failed to parse config: {}", e),
            Error::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            Error::WorkerPool(e) => write!(f, "Failed to build worker pool: {}", e),
            Error::VertexBuffer(msg) => write!(f, "Failed to encode vertex buffer: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Yaml(e) => Some(e),
            Error::WorkerPool(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Yaml(e)
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        Error::WorkerPool(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
