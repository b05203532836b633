#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid unit name: {0}")]
    InvalidUnitName(String),
}
pub type Result<T> = std::result::Result<T, Error>;
