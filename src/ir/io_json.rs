//! JSON annotation streams consumed and produced by the CLI.
//!
//! A stream file lists the elements of an annotation stream in order. Each
//! record names its image file (relative to an image directory) and carries
//! the annotations for one domain:
//!
//! ```json
//! { "elements": [ { "file_name": "a.png", "objects": [ ... ] } ] }
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::model::LocatedObject;
use crate::error::ImgvisError;

/// Top-level layout of a stream file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StreamFile<R> {
    pub elements: Vec<R>,
}

/// Object detection record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub file_name: String,
    #[serde(default)]
    pub objects: Vec<LocatedObject>,
}

/// Segmentation record in index-matrix form (one row of indices per image row).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentationRecord {
    pub file_name: String,
    pub labels: Vec<String>,
    pub indices: Vec<Vec<u16>>,
}

/// Classification record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub file_name: String,
    pub label: String,
}

/// Reads the records of a stream file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_stream<R: DeserializeOwned>(path: &Path) -> Result<Vec<R>, ImgvisError> {
    let file = File::open(path).map_err(ImgvisError::Io)?;
    let reader = BufReader::new(file);

    let stream: StreamFile<R> =
        serde_json::from_reader(reader).map_err(|source| ImgvisError::StreamParse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(stream.elements)
}

/// Writes records as a stream file.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_stream<R: Serialize>(path: &Path, elements: Vec<R>) -> Result<(), ImgvisError> {
    let file = File::create(path).map_err(ImgvisError::Io)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, &StreamFile { elements }).map_err(|source| {
        ImgvisError::StreamWrite {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Parses stream records from a JSON string.
///
/// Useful for testing without file I/O.
pub fn from_json_str<R: DeserializeOwned>(json: &str) -> Result<Vec<R>, serde_json::Error> {
    serde_json::from_str::<StreamFile<R>>(json).map(|s| s.elements)
}

/// Serializes stream records to a JSON string.
pub fn to_json_string<R: Serialize>(elements: Vec<R>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&StreamFile { elements })
}
