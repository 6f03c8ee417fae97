use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::dimension::infer_dimension;
use crate::enums::PixelId;
use crate::error::ReaderError;
use crate::image::Image;
use crate::image_io::{ImageIoRegistry, MetadataDictionary};
use crate::metadata::SliceMetadata;
use crate::probe::probe;
use crate::registry::PixelTypeRegistry;
use crate::series_decoder::{DecodeState, NoopHook, PreDecodeHook, SeriesJob};

/// Lifecycle of an [`ImageSeriesReader`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    #[default]
    Idle,
    Probing,
    Dispatching,
    Decoding,
    /// The last execution succeeded; its decode state is retained until the
    /// next execution.
    Ready,
}

/// Reads an ordered list of files into a single image.
///
/// The first file is probed to find the pixel type and dimension, the
/// matching decode routine is looked up in the [`PixelTypeRegistry`], and
/// that routine reads every file through the same backend and stacks them
/// along a new last axis.
///
/// A reader is not meant to be shared across threads while executing; use
/// one reader per concurrent series.
pub struct ImageSeriesReader {
    file_names: Vec<PathBuf>,
    output_pixel_type: PixelId,
    image_io: Option<String>,
    metadata_capture: bool,
    image_ios: ImageIoRegistry,
    hook: Box<dyn PreDecodeHook>,
    state: ReaderState,
    decoded: Option<DecodeState>,
}

impl Default for ImageSeriesReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageSeriesReader {
    pub fn new() -> Self {
        Self::with_image_ios(ImageIoRegistry::default())
    }

    /// Reader that selects backends from `image_ios` instead of the
    /// bundled DICOM and raster backends.
    pub fn with_image_ios(image_ios: ImageIoRegistry) -> Self {
        Self {
            file_names: Vec::new(),
            output_pixel_type: PixelId::Unknown,
            image_io: None,
            metadata_capture: false,
            image_ios,
            hook: Box::new(NoopHook),
            state: ReaderState::Idle,
            decoded: None,
        }
    }

    pub fn set_file_names<P: AsRef<Path>>(&mut self, file_names: impl IntoIterator<Item = P>) -> &mut Self {
        self.file_names = file_names
            .into_iter()
            .map(|path| path.as_ref().to_path_buf())
            .collect();
        self
    }

    pub fn file_names(&self) -> &[PathBuf] {
        &self.file_names
    }

    /// Pixel type of the output. [`PixelId::Unknown`] (the default) uses the
    /// type declared by the first file.
    pub fn set_output_pixel_type(&mut self, pixel_id: PixelId) -> &mut Self {
        self.output_pixel_type = pixel_id;
        self
    }

    pub fn output_pixel_type(&self) -> PixelId {
        self.output_pixel_type
    }

    /// Forces a backend by name instead of automatic selection. An empty
    /// name restores automatic selection.
    pub fn set_image_io(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.image_io = (!name.is_empty()).then_some(name);
        self
    }

    pub fn image_io(&self) -> Option<&str> {
        self.image_io.as_deref()
    }

    pub fn registered_image_ios(&self) -> Vec<&str> {
        self.image_ios.names()
    }

    /// Capture every slice's metadata dictionary during the next execution.
    pub fn set_metadata_capture(&mut self, enabled: bool) -> &mut Self {
        self.metadata_capture = enabled;
        self
    }

    pub fn metadata_capture(&self) -> bool {
        self.metadata_capture
    }

    pub fn set_pre_decode_hook(&mut self, hook: impl PreDecodeHook + 'static) -> &mut Self {
        self.hook = Box::new(hook);
        self
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Reads the series.
    ///
    /// Any state retained from a previous execution is released before the
    /// new decode starts. On failure the reader returns to
    /// [`ReaderState::Idle`] with nothing retained; images returned by
    /// earlier executions are unaffected.
    ///
    /// # Errors
    ///
    /// - [`ReaderError::EmptyFileList`] without touching the file system
    /// - [`ReaderError::IoOpen`] if the first file cannot be probed
    /// - [`ReaderError::UnsupportedDimension`] / [`ReaderError::UnsupportedPixelType`]
    ///   if no routine exists for the series
    /// - [`ReaderError::Decode`] if any file fails to decode or does not match
    ///   the first one
    pub fn execute(&mut self) -> Result<Image, ReaderError> {
        let result = self.try_execute();
        match &result {
            Ok(_) => self.state = ReaderState::Ready,
            Err(error) => {
                warn!("Series read failed: {error}");
                self.decoded = None;
                self.state = ReaderState::Idle;
            }
        }
        result
    }

    fn try_execute(&mut self) -> Result<Image, ReaderError> {
        let first = self.file_names.first().ok_or(ReaderError::EmptyFileList)?;

        self.state = ReaderState::Probing;
        let header = probe(first, self.image_io.as_deref(), &self.image_ios)?;
        let dimension = infer_dimension(header.rank(), header.size(2))?;

        self.state = ReaderState::Dispatching;
        let pixel_id = match self.output_pixel_type {
            PixelId::Unknown => header.pixel_id(),
            requested => requested,
        };
        let routine = PixelTypeRegistry::global().lookup(pixel_id, dimension)?;
        debug!(
            %pixel_id,
            dimension,
            declared = %header.pixel_id(),
            image_io = header.image_io_name(),
            files = self.file_names.len(),
            "Dispatching series decode"
        );

        self.state = ReaderState::Decoding;
        routine(SeriesJob {
            header,
            file_names: &self.file_names,
            metadata_capture: self.metadata_capture,
            hook: self.hook.as_ref(),
            state: &mut self.decoded,
        })
    }

    /// Slice metadata of the last execution.
    ///
    /// # Errors
    ///
    /// [`ReaderError::MetadataUnavailable`] before any successful execution,
    /// after a failed one, or when it ran without metadata capture.
    pub fn slice_metadata(&self) -> Result<&SliceMetadata, ReaderError> {
        self.decoded
            .as_ref()
            .and_then(|state| state.metadata.as_ref())
            .ok_or(ReaderError::MetadataUnavailable)
    }

    pub fn metadata_keys(&self, slice: usize) -> Result<impl Iterator<Item = &str> + '_, ReaderError> {
        self.slice_metadata()?.keys(slice)
    }

    pub fn has_metadata_key(&self, slice: usize, key: &str) -> Result<bool, ReaderError> {
        self.slice_metadata()?.has_key(slice, key)
    }

    pub fn metadata(&self, slice: usize, key: &str) -> Result<&str, ReaderError> {
        self.slice_metadata()?.get(slice, key)
    }

    pub fn metadata_dictionary(&self, slice: usize) -> Result<&MetadataDictionary, ReaderError> {
        self.slice_metadata()?.dictionary(slice)
    }
}

impl fmt::Display for ImageSeriesReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "dicom_series::ImageSeriesReader")?;
        writeln!(f, "  FileNames:")?;
        for name in &self.file_names {
            writeln!(f, "    \"{}\"", name.display())?;
        }
        writeln!(f, "  OutputPixelType: {}", self.output_pixel_type)?;
        writeln!(f, "  ImageIO: {}", self.image_io.as_deref().unwrap_or("<auto>"))?;
        writeln!(f, "  MetadataCapture: {}", self.metadata_capture)?;
        writeln!(f, "  State: {:?}", self.state)
    }
}

impl fmt::Debug for ImageSeriesReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageSeriesReader")
            .field("file_names", &self.file_names)
            .field("output_pixel_type", &self.output_pixel_type)
            .field("image_io", &self.image_io)
            .field("metadata_capture", &self.metadata_capture)
            .field("image_ios", &self.image_ios)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Reads `file_names` as one series in a single call.
///
/// `pixel_id` may be [`PixelId::Unknown`] to keep the on-disk type, and
/// `image_io` forces a backend by name.
pub fn read_image<P: AsRef<Path>>(
    file_names: impl IntoIterator<Item = P>,
    pixel_id: PixelId,
    image_io: Option<&str>,
) -> Result<Image, ReaderError> {
    let mut reader = ImageSeriesReader::new();
    reader
        .set_file_names(file_names)
        .set_output_pixel_type(pixel_id)
        .set_image_io(image_io.unwrap_or_default());
    reader.execute()
}
