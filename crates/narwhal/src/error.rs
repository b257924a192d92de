#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid layout parameter `{name}`: {value}")]
    InvalidParam { name: &'static str, value: f64 },

    #[error("invalid layout config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("teardown step `{step}` failed: {message}")]
    Teardown { step: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
