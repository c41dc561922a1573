use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrustError>;

#[derive(Error, Debug)]
pub enum TrustError {
    #[error("Manifest error in {file}: {message}")]
    Manifest { file: String, message: String },

    #[error("No extension manifests found under: {0}")]
    NoManifests(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid tier scheme: {0}")]
    InvalidTierScheme(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON5 error: {0}")]
    Json5(#[from] json5::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl TrustError {
    pub fn exit_code(&self) -> i32 {
        2
    }
}
