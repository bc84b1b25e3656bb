//! Error types for the Meridian MCP server.

use thiserror::Error;

/// Main error type for Meridian operations.
#[derive(Error, Debug)]
pub enum MeridianError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Model error: {0}")]
    Llm(#[from] LlmError),

    #[error("Classification error: {0}")]
    Classification(#[from] ClassificationError),

    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("MCP error: {0}")]
    Mcp(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Storage-related errors (PostgreSQL, in-memory).
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

/// Errors from the delegated language-model service.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Fixture exhausted: no scripted response left for {0}")]
    FixtureExhausted(&'static str),
}

/// Intent classification failures.
///
/// No retry is attempted; callers see these as-is.
#[derive(Error, Debug)]
pub enum ClassificationError {
    #[error("Classification service failed: {0}")]
    Delegate(#[from] LlmError),

    #[error("Classification payload failed validation: {0}")]
    Invalid(String),

    #[error("Classifier returned an empty zone set")]
    EmptyZones,
}

/// Synthesis failures.
#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("Generation service failed: {0}")]
    Delegate(#[from] LlmError),
}

/// Result type alias for Meridian operations.
pub type Result<T> = std::result::Result<T, MeridianError>;
