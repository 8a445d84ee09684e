use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum MigrateError {
    #[error("failed to read configuration file '{path}': {message}")]
    ConfigRead { path: String, message: String },
    #[error("malformed configuration file '{path}': {message}")]
    ConfigParse { path: String, message: String },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("pipeline can be executed only once.")]
    AlreadyExecuted,
    #[error("object listing failed.")]
    ListingFailed,
}
