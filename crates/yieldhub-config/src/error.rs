use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating configuration. All of these are
/// detected before any transaction is sent.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("one of config values undefined: {}", .0.join(", "))]
    MissingValues(Vec<String>),

    #[error("unsupported chain: {0}")]
    UnsupportedChain(String),

    #[error("unsupported chain id: {0}")]
    UnsupportedChainId(u64),

    #[error("no configured compiler satisfies {requirement} in {}", .source_file.display())]
    NoCompiler {
        source_file: PathBuf,
        requirement: String,
    },

    #[error("invalid address {value:?}: {reason}")]
    InvalidAddress { value: String, reason: String },

    #[error("missing deployer private key (set YIELDHUB_PRIVATE_KEY)")]
    MissingPrivateKey,

    #[error("invalid deployer private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid environment: {0}")]
    Environment(#[from] envy::Error),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
