use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Unknown value '{value}' for {kind}")]
    UnknownVariant { kind: &'static str, value: String },
}
