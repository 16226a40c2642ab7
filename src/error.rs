use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No pixels to cluster")]
    EmptyInput,

    #[error("Invalid color count {count}: must be between 1 and {available}")]
    InvalidConfiguration { count: usize, available: usize },

    #[error("Unable to decode image: {0}")]
    Decode(#[from] image::ImageError),
}
