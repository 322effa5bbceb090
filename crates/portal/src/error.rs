use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("invalid setting: {0}")]
    Setting(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("persistence error: {0}")]
    Persistence(#[from] engine::PersistenceError),
    #[error("{0}")]
    Engine(#[from] engine::EngineError),
    #[error("login refused for {0}")]
    Login(String),
    #[error("invalid input: {0}")]
    Input(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_errors_convert() {
        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(AppError::from(json), AppError::Json(_)));

        let engine = "abc".parse::<engine::Money>().unwrap_err();
        assert!(matches!(AppError::from(engine), AppError::Engine(_)));

        let io = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert!(AppError::from(io).to_string().starts_with("io error"));
    }
}
