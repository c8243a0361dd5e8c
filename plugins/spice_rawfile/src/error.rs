use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("malformed rawfile near byte {offset}")]
    Parse { offset: usize },
    #[error("missing header field `{0}`")]
    MissingField(&'static str),
    #[error("invalid value for header field `{field}`: {value}")]
    InvalidField { field: &'static str, value: String },
    #[error("rawfile contains no plots")]
    Empty,
}
