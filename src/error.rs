use thiserror::Error;

#[derive(Error, Debug)]
pub enum TiltError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, TiltError>;
