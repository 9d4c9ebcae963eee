use std::path::PathBuf;
use thiserror::Error;

/// The main error type for imgvis operations.
#[derive(Debug, Error)]
pub enum ImgvisError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to parse annotation stream from {path}: {source}")]
    StreamParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write annotation stream to {path}: {source}")]
    StreamWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse stage configuration from {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid text placement '{0}' (expected 'V,H' with V in T/C/B and H in L/C/R)")]
    InvalidTextPlacement(String),

    #[error("Unknown combination method: {0} (supported: union, intersect)")]
    UnsupportedCombination(String),

    #[error("Invalid color '{0}'")]
    InvalidColor(String),

    #[error("Invalid position '{0}' (expected 'X,Y')")]
    InvalidPosition(String),

    #[error("No usable font for family '{family}'")]
    FontUnavailable { family: String },

    #[error("Image file name '{0}' must be a relative path inside the image directory")]
    InvalidImagePath(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedImageFormat(String),

    #[error("Invalid segmentation annotation: {0}")]
    InvalidSegmentation(String),
}
