use thiserror::Error;

#[derive(Debug, Error)]
pub enum FxError {
    #[error("element not found: {0}")]
    MissingElement(String),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("unsupported selector `{0}`")]
    Selector(String),

    #[error("browser call failed: {0}")]
    Js(String),
}

pub type Result<T> = std::result::Result<T, FxError>;
