pub type StartvalResult<T> = Result<T, StartvalError>;

#[derive(Debug, thiserror::Error)]
pub enum StartvalError {
    #[error("[Config Error] {0}")]
    ConfigError(#[from] confy::ConfyError),

    #[error("[Enum Error] {0}")]
    EnumError(#[from] ::strum::ParseError),

    #[error("[HTTP Error] {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("[HTTP Status Error] {0}")]
    HttpStatusError(String),

    #[error("[Input Error] {0}")]
    InputError(#[from] dialoguer::Error),

    #[error("[Invalid] {1}")]
    Invalid(&'static str, String),

    #[error("[JSON Error] {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("[Required] {1}")]
    Required(&'static str, String),

    #[error("[URL Error] {0}")]
    UrlError(#[from] url::ParseError),
}
