//! Error types

use thiserror::Error;

/// A virtual node was built with a combination the reconciler cannot handle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VNodeError {
    /// Text nodes carry a text payload only
    #[error("text node cannot have child nodes")]
    TextWithChildNodes,

    /// Text nodes carry no properties
    #[error("text node cannot have properties (got {0:?})")]
    TextWithProps(Vec<String>),

    /// Element tags must be non-empty
    #[error("element tag must not be empty")]
    EmptyTag,

    /// Keys must be strings or integers
    #[error("invalid key value {0}; keys must be strings or integers")]
    InvalidKey(String),
}

/// Errors surfaced by the render entry points
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// No host node matched the container selector
    #[error("no container matches selector '{0}'")]
    ContainerNotFound(String),
}

/// Errors loading a renderer configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
