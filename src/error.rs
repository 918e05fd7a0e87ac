use thiserror::Error;

/// Why a configured address could not be turned into a table key
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid IP address: {0}")]
    InvalidAddress(String),

    #[error("not an IPv4 address: {0}")]
    NotIpv4(String),
}

#[derive(Error, Debug)]
pub enum BlockwallError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported config file extension: {0:?}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("Interface not found: {0}")]
    InterfaceNotFound(String),

    #[error("Attach rejected: {0}")]
    AttachRejected(String),

    #[error("Program load failed: {0}")]
    ProgramLoad(String),

    #[error("Detach failed: {0}")]
    Detach(String),

    #[error("Map error: {0}")]
    Map(String),

    #[error("Signal handling error: {0}")]
    Signal(String),
}

pub type Result<T> = std::result::Result<T, BlockwallError>;
