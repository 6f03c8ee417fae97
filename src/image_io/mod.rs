//! Pluggable file backends.
//!
//! An [`ImageIo`] knows how to recognise one on-disk representation and
//! open it. Opening yields an [`ImageIoHandle`] that exposes the header of
//! the opened file cheaply and can then decode that file, or any other file
//! of the same kind, into [`SliceData`].
//!
//! The series reader probes the first file of a series through an
//! [`ImageIoRegistry`] and reuses the returned handle for every slice.

mod dicom_io;
mod raster_io;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

pub use dicom_io::DicomImageIo;
pub use raster_io::RasterImageIo;

use crate::enums::{ComponentType, PixelId};
use crate::error::ImageIoError;
use crate::pixel::Samples;

/// Key/value dictionary attached to one file of a series.
pub type MetadataDictionary = BTreeMap<String, String>;

/// Header information of a single file.
///
/// `size`, `spacing` and `origin` are indexed by axis with x first.
/// `direction` is a row-major `rank × rank` matrix whose columns are the
/// axis directions.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceHeader {
    pub component_type: ComponentType,
    pub number_of_components: usize,
    pub size: Vec<usize>,
    pub spacing: Vec<f64>,
    pub origin: Vec<f64>,
    pub direction: Vec<f64>,
    pub metadata: MetadataDictionary,
}

impl SliceHeader {
    /// Header with unit spacing, zero origin and identity direction.
    pub fn new(component_type: ComponentType, number_of_components: usize, size: Vec<usize>) -> Self {
        let rank = size.len();
        Self {
            component_type,
            number_of_components,
            spacing: vec![1.0; rank],
            origin: vec![0.0; rank],
            direction: identity(rank),
            size,
            metadata: MetadataDictionary::new(),
        }
    }

    pub fn with_spacing(mut self, spacing: Vec<f64>) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_origin(mut self, origin: Vec<f64>) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_direction(mut self, direction: Vec<f64>) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_metadata(mut self, metadata: MetadataDictionary) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn rank(&self) -> usize {
        self.size.len()
    }

    /// Extent along `axis`; axes past the rank have extent 1.
    pub fn size(&self, axis: usize) -> usize {
        self.size.get(axis).copied().unwrap_or(1)
    }

    pub fn spacing(&self, axis: usize) -> f64 {
        self.spacing.get(axis).copied().unwrap_or(1.0)
    }

    pub fn origin(&self, axis: usize) -> f64 {
        self.origin.get(axis).copied().unwrap_or(0.0)
    }

    /// Entry `(row, column)` of the direction matrix, identity past the rank.
    pub fn direction(&self, row: usize, column: usize) -> f64 {
        let rank = self.rank();
        if row < rank && column < rank {
            if let Some(value) = self.direction.get(row * rank + column) {
                return *value;
            }
        }
        if row == column { 1.0 } else { 0.0 }
    }

    pub fn pixel_id(&self) -> PixelId {
        PixelId::from_components(self.component_type, self.number_of_components)
    }

    /// Number of samples a file with this header decodes to, or `None` if
    /// the declared size does not fit in `usize`.
    pub fn number_of_samples(&self) -> Option<usize> {
        self.size
            .iter()
            .try_fold(self.number_of_components, |total, &extent| total.checked_mul(extent))
    }
}

pub(crate) fn identity(rank: usize) -> Vec<f64> {
    let mut matrix = vec![0.0; rank * rank];
    for axis in 0..rank {
        matrix[axis * rank + axis] = 1.0;
    }
    matrix
}

/// Fully decoded file.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceData {
    pub header: SliceHeader,
    pub samples: Samples,
}

/// An opened file. The header is read eagerly; pixel data only on
/// [`read`](ImageIoHandle::read).
pub trait ImageIoHandle: Send {
    /// Name of the backend that produced this handle.
    fn io_name(&self) -> &str;

    /// Header of the file this handle was opened on.
    fn header(&self) -> &SliceHeader;

    /// Decodes `path` with this backend.
    fn read(&self, path: &Path) -> Result<SliceData, ImageIoError>;

    fn component_type(&self) -> ComponentType {
        self.header().component_type
    }

    fn number_of_components(&self) -> usize {
        self.header().number_of_components
    }

    fn number_of_dimensions(&self) -> usize {
        self.header().rank()
    }

    fn size(&self, axis: usize) -> usize {
        self.header().size(axis)
    }
}

/// A file backend.
pub trait ImageIo: Send + Sync {
    fn name(&self) -> &str;

    /// Cheap check whether `path` looks like something this backend reads.
    fn can_read(&self, path: &Path) -> bool;

    /// Opens `path` and reads its header, without decoding pixel data.
    fn open(&self, path: &Path) -> Result<Box<dyn ImageIoHandle>, ImageIoError>;
}

/// Ordered set of backends. Automatic selection picks the first backend
/// whose [`ImageIo::can_read`] accepts the file.
pub struct ImageIoRegistry {
    backends: Vec<Box<dyn ImageIo>>,
}

impl ImageIoRegistry {
    pub fn empty() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    pub fn register(&mut self, image_io: impl ImageIo + 'static) -> &mut Self {
        self.backends.push(Box::new(image_io));
        self
    }

    pub fn with(mut self, image_io: impl ImageIo + 'static) -> Self {
        self.register(image_io);
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn ImageIo> {
        self.backends
            .iter()
            .find(|backend| backend.name() == name)
            .map(|backend| backend.as_ref())
    }

    pub fn find_for(&self, path: &Path) -> Option<&dyn ImageIo> {
        self.backends
            .iter()
            .find(|backend| backend.can_read(path))
            .map(|backend| backend.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.backends.iter().map(|backend| backend.name()).collect()
    }
}

impl Default for ImageIoRegistry {
    /// DICOM first, then the raster formats handled by the `image` crate.
    fn default() -> Self {
        Self::empty().with(DicomImageIo).with(RasterImageIo)
    }
}

impl fmt::Debug for ImageIoRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
