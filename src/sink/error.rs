#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open sink output: {0}")]
    OpenError(#[source] std::io::Error),
    #[error("failed to write measurement: {0}")]
    WriteError(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
