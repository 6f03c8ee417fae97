//! # DICOM-series library
//!
//! This crate reads an ordered list of image files, one per slice, into a
//! single typed image. The pixel type and dimension are only known once the
//! first file has been opened, so the reader:
//!
//!  - probes the header of the first file through a pluggable backend
//!    ([`ImageIo`]), without decoding its pixel data
//!  - infers the output dimension: one more than the files have, except
//!    that 3-D files holding a single plane stack into a 3-D volume
//!  - looks up the decode routine compiled for that pixel type and
//!    dimension in a static table ([`PixelTypeRegistry`])
//!  - decodes every file in order, checks that all slices share the first
//!    file's geometry, and stacks them along a new last axis
//!
//! Callers may request an explicit output pixel type, in which case the
//! samples are converted on read, and may force a backend by name. DICOM
//! files are read with dicom-rs; PNG, TIFF and the other raster formats with
//! the `image` crate. Per-slice metadata dictionaries can be captured and
//! queried on the reader after a successful execution.
//!
//! Finding the files of a series and sorting them is left to the caller.
//!
//! # Examples
//!
//! ## Reading a series of slices into a volume
//!
//! ```no_run
//! # use dicom_series::{ImageSeriesReader, PixelId};
//! let mut reader = ImageSeriesReader::new();
//! reader
//!     .set_file_names(["dicom/001.dcm", "dicom/002.dcm", "dicom/003.dcm"])
//!     .set_metadata_capture(true);
//! let image = reader.execute().expect("should have read the series");
//! assert_eq!(image.dimension(), 3);
//! println!("{} {:?}", image.pixel_id(), image.size());
//! println!("{}", reader.metadata(0, "0020|0013").unwrap_or("-"));
//! ```
//!
//! ## One-shot read with an explicit pixel type
//!
//! ```no_run
//! # use dicom_series::{read_image, PixelId};
//! let image = read_image(["a.png", "b.png"], PixelId::Float32, None)
//!     .expect("should have read the series");
//! let volume = image.as_array::<f32>().expect("should be a float volume");
//! ```

pub mod dimension;
pub mod enums;
pub mod error;
pub mod image;
pub mod image_io;
pub mod metadata;
pub mod pixel;
pub mod probe;
pub mod registry;
pub mod series_decoder;
pub mod series_reader;

pub use dimension::{MAX_DIMENSION, MIN_DIMENSION, infer_dimension};
pub use enums::{ComponentType, PixelId};
pub use error::{ImageIoError, ReaderError};
pub use self::image::Image;
pub use image_io::{
    DicomImageIo, ImageIo, ImageIoHandle, ImageIoRegistry, MetadataDictionary, RasterImageIo,
    SliceData, SliceHeader,
};
pub use metadata::SliceMetadata;
pub use pixel::{Component, Pixel, PixelBuffer, Samples, Vector};
pub use probe::{ProbedHeader, probe};
pub use registry::{PixelTypeRegistry, SeriesRoutine};
pub use series_decoder::{NoopHook, PreDecodeHook, SeriesDecode, SeriesImageReader};
pub use series_reader::{ImageSeriesReader, ReaderState, read_image};
