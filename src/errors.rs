use thiserror::Error;

#[derive(Error, Debug)]
pub enum CotacoesError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Input error: {0}")]
    InputError(String),

    #[error("Browser session error: {0}")]
    SessionError(String),

    #[error("Navigation error: {0}")]
    NavigationError(String),

    #[error("Data not loaded for symbol {0}")]
    DataNotLoaded(String),

    #[error("Output error: {0}")]
    OutputError(String),
}

pub type Result<T> = std::result::Result<T, CotacoesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_not_loaded_names_only_the_symbol() {
        let err = CotacoesError::DataNotLoaded("PETR4".to_string());
        assert_eq!(err.to_string(), "Data not loaded for symbol PETR4");
    }
}
