use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::enums::PixelId;
use crate::error::ReaderError;
use crate::image_io::{ImageIoHandle, ImageIoRegistry, SliceHeader};

/// Header of the first file of a series, together with the opened backend
/// so the decode routine does not have to select and open it again.
pub struct ProbedHeader {
    path: PathBuf,
    handle: Box<dyn ImageIoHandle>,
}

impl ProbedHeader {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &SliceHeader {
        self.handle.header()
    }

    /// Pixel id declared on disk.
    pub fn pixel_id(&self) -> PixelId {
        self.header().pixel_id()
    }

    pub fn rank(&self) -> usize {
        self.handle.number_of_dimensions()
    }

    pub fn size(&self, axis: usize) -> usize {
        self.handle.size(axis)
    }

    pub fn image_io_name(&self) -> &str {
        self.handle.io_name()
    }

    pub(crate) fn into_handle(self) -> Box<dyn ImageIoHandle> {
        self.handle
    }
}

impl fmt::Debug for ProbedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbedHeader")
            .field("path", &self.path)
            .field("image_io", &self.image_io_name())
            .field("header", self.header())
            .finish()
    }
}

/// Opens `path` and reads its header.
///
/// With `image_io` set, that backend is used regardless of what the file
/// looks like; otherwise the first backend of `registry` that claims the
/// file is used. Pixel data is not decoded.
///
/// # Errors
///
/// [`ReaderError::IoOpen`] if the named backend is unknown, no backend
/// claims the file, or the backend fails to parse its header.
pub fn probe(
    path: &Path,
    image_io: Option<&str>,
    registry: &ImageIoRegistry,
) -> Result<ProbedHeader, ReaderError> {
    let io_open = |reason: String| ReaderError::IoOpen {
        path: path.to_path_buf(),
        reason,
    };

    let backend = match image_io {
        Some(name) => registry.get(name).ok_or_else(|| {
            io_open(format!(
                "unknown ImageIO \"{name}\", registered: {:?}",
                registry.names()
            ))
        })?,
        None => registry
            .find_for(path)
            .ok_or_else(|| io_open("no ImageIO can read the file".to_string()))?,
    };

    let handle = backend
        .open(path)
        .map_err(|source| io_open(format!("{} failed: {source}", backend.name())))?;

    debug!(
        path = %path.display(),
        image_io = backend.name(),
        pixel_id = %handle.header().pixel_id(),
        size = ?handle.header().size,
        "Probed series header"
    );

    Ok(ProbedHeader {
        path: path.to_path_buf(),
        handle,
    })
}
