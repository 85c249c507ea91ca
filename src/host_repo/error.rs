// Parse errors for /proc files

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcParseError {
    #[error("{file}: missing field '{field}'")]
    MissingField { file: &'static str, field: &'static str },

    #[error("{file}: invalid value '{value}' for '{field}'")]
    InvalidValue {
        file: &'static str,
        field: &'static str,
        value: String,
    },
}

impl From<ProcParseError> for std::io::Error {
    fn from(err: ProcParseError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidData, err)
    }
}
