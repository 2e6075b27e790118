use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("An I/O error happened in the server. {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not initialize the mart service. {0}")]
    Initialize(String),
}
