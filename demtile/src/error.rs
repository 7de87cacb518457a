use thiserror::Error;

#[derive(Error, Debug)]
pub enum DemError {
    #[error("malformed tile: {0}")]
    MalformedTile(String),

    #[error("{0}")]
    Image(#[from] image::ImageError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
