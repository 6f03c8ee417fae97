use std::path::PathBuf;

use thiserror::Error;

use crate::enums::{ComponentType, PixelId};

/// Errors raised by an I/O backend while opening or decoding a single file.
#[derive(Debug, Error)]
pub enum ImageIoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DICOM error: {0}")]
    Dicom(#[from] dicom::object::ReadError),

    #[error("DICOM pixel data error: {0}")]
    PixelData(#[from] dicom::pixeldata::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Missing required attribute {0}")]
    MissingAttribute(&'static str),

    #[error("Unsupported pixel encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Inconsistent slice geometry: expected size {expected:?}, found {found:?}")]
    InconsistentGeometry {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("Inconsistent number of components: expected {expected}, found {found}")]
    ComponentMismatch { expected: usize, found: usize },

    #[error("Cannot convert {found} {component} components per pixel into a scalar pixel")]
    NotScalar {
        component: ComponentType,
        found: usize,
    },

    #[error("Declared size {size:?} with {components} components per pixel is too large")]
    SizeOverflow { size: Vec<usize>, components: usize },

    #[error("Truncated pixel data: expected {expected} samples, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("Invalid buffer shape: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Errors surfaced by [`ImageSeriesReader`](crate::ImageSeriesReader) and
/// its metadata accessors.
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("File names information is empty. Cannot read series.")]
    EmptyFileList,

    #[error("Unable to open \"{path}\": {reason}")]
    IoOpen { path: PathBuf, reason: String },

    #[error("The files in the series have unsupported {file_dimension} dimensions (series dimension {dimension})")]
    UnsupportedDimension {
        file_dimension: usize,
        dimension: usize,
    },

    #[error("PixelType is not supported! Pixel Type: {pixel_id}, dimension: {dimension}. Refusing to load!")]
    UnsupportedPixelType { pixel_id: PixelId, dimension: usize },

    #[error("Failed to decode \"{path}\": {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageIoError,
    },

    #[error("Metadata key \"{key}\" not found for slice {slice}")]
    KeyNotFound { slice: usize, key: String },

    #[error("Slice index {index} out of range for a series of {len} slices")]
    SliceIndexOutOfRange { index: usize, len: usize },

    #[error("No slice metadata available; execute with metadata capture enabled first")]
    MetadataUnavailable,
}
