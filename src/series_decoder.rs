//! The typed half of the series reader.
//!
//! [`decode_series`] is instantiated once per registered pixel type and
//! dimension and stored as a plain function pointer in the
//! [`PixelTypeRegistry`](crate::PixelTypeRegistry).

use std::marker::PhantomData;
use std::path::PathBuf;

use ndarray::{ArrayD, IxDyn};
use tracing::{debug, info};

use crate::enums::PixelId;
use crate::error::{ImageIoError, ReaderError};
use crate::image::Image;
use crate::image_io::{ImageIoHandle, SliceHeader};
use crate::metadata::SliceMetadata;
use crate::pixel::{Component, Pixel};
use crate::probe::ProbedHeader;

/// Type-erased view of a typed series reader, handed to a
/// [`PreDecodeHook`] before the decode runs.
pub trait SeriesDecode {
    fn pixel_id(&self) -> PixelId;

    fn dimension(&self) -> usize;

    fn file_names(&self) -> &[PathBuf];

    fn image_io_name(&self) -> &str;

    fn metadata_capture(&self) -> bool;

    fn set_metadata_capture(&mut self, enabled: bool);

    fn reverse_order(&self) -> bool;

    /// Stack the files last to first.
    fn set_reverse_order(&mut self, reverse: bool);
}

/// Customization point run on the typed reader right before it decodes.
pub trait PreDecodeHook: Send + Sync {
    fn pre_decode(&self, reader: &mut dyn SeriesDecode);
}

impl<F> PreDecodeHook for F
where
    F: Fn(&mut dyn SeriesDecode) + Send + Sync,
{
    fn pre_decode(&self, reader: &mut dyn SeriesDecode) {
        self(reader)
    }
}

/// The default hook: leaves the reader untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl PreDecodeHook for NoopHook {
    fn pre_decode(&self, _reader: &mut dyn SeriesDecode) {}
}

/// State a successful decode leaves behind on the reader.
#[derive(Debug, Clone, Default)]
pub(crate) struct DecodeState {
    pub(crate) metadata: Option<SliceMetadata>,
}

/// Everything a registered routine needs for one execution.
pub struct SeriesJob<'a> {
    pub(crate) header: ProbedHeader,
    pub(crate) file_names: &'a [PathBuf],
    pub(crate) metadata_capture: bool,
    pub(crate) hook: &'a dyn PreDecodeHook,
    pub(crate) state: &'a mut Option<DecodeState>,
}

/// Registered routine: decodes a whole series as pixel type `P` into a
/// `D`-dimensional image.
pub fn decode_series<P: Pixel, const D: usize>(job: SeriesJob<'_>) -> Result<Image, ReaderError> {
    let SeriesJob {
        header,
        file_names,
        metadata_capture,
        hook,
        state,
    } = job;

    let mut reader = SeriesImageReader::<P, D>::new(header.into_handle(), file_names.to_vec());
    reader.set_metadata_capture(metadata_capture);

    // release the previous decode before building the new one
    if state.take().is_some() {
        debug!("Released previous series decode state");
    }

    hook.pre_decode(&mut reader);

    let (image, metadata) = reader.update()?;
    *state = Some(DecodeState { metadata });
    Ok(image)
}

/// Reads an ordered list of files into one `D`-dimensional image of pixel
/// type `P`, stacking the files along the last axis.
pub struct SeriesImageReader<P: Pixel, const D: usize> {
    image_io: Box<dyn ImageIoHandle>,
    file_names: Vec<PathBuf>,
    metadata_capture: bool,
    reverse_order: bool,
    _pixel: PhantomData<P>,
}

impl<P: Pixel, const D: usize> SeriesImageReader<P, D> {
    pub fn new(image_io: Box<dyn ImageIoHandle>, file_names: Vec<PathBuf>) -> Self {
        Self {
            image_io,
            file_names,
            metadata_capture: false,
            reverse_order: false,
            _pixel: PhantomData,
        }
    }

    /// Decodes every file and assembles the image.
    ///
    /// # Errors
    ///
    /// [`ReaderError::Decode`] naming the offending file when a backend read
    /// fails, a slice's geometry or component count differs from the first
    /// file, a file holds the wrong number of samples, or the first file's
    /// declared sample count overflows `usize`.
    pub fn update(&self) -> Result<(Image, Option<SliceMetadata>), ReaderError> {
        let reference = self.image_io.header();
        let slice_size = Self::slice_size(reference);
        let number_of_components = reference.number_of_components;

        if !P::IS_VECTOR && number_of_components != 1 {
            return Err(ReaderError::Decode {
                path: self.file_names.first().cloned().unwrap_or_default(),
                source: ImageIoError::NotScalar {
                    component: reference.component_type,
                    found: number_of_components,
                },
            });
        }

        let ordered: Vec<&PathBuf> = if self.reverse_order {
            self.file_names.iter().rev().collect()
        } else {
            self.file_names.iter().collect()
        };

        // axes past the slice shape have extent 1 in the reference header
        let samples_per_slice = reference.number_of_samples().ok_or_else(|| ReaderError::Decode {
            path: self.file_names.first().cloned().unwrap_or_default(),
            source: ImageIoError::SizeOverflow {
                size: reference.size.clone(),
                components: number_of_components,
            },
        })?;
        // reserved only after the first slice's sample count has been checked
        let mut data: Vec<P::Component> = Vec::new();
        let mut dictionaries = Vec::new();
        let mut first_origin = Vec::new();
        let mut last_origin = Vec::new();

        for (index, path) in ordered.iter().enumerate() {
            let decode_error = |source: ImageIoError| ReaderError::Decode {
                path: path.to_path_buf(),
                source,
            };
            let slice = self.image_io.read(path).map_err(decode_error)?;
            Self::check_geometry(&slice.header, &slice_size, number_of_components)
                .map_err(decode_error)?;

            if slice.samples.len() != samples_per_slice {
                return Err(decode_error(ImageIoError::Truncated {
                    expected: samples_per_slice,
                    found: slice.samples.len(),
                }));
            }
            if index == 0 {
                data.reserve(samples_per_slice.checked_mul(ordered.len()).unwrap_or(samples_per_slice));
            }
            data.extend(P::Component::coerce(slice.samples));

            let origin: Vec<f64> = (0..D).map(|axis| slice.header.origin(axis)).collect();
            if index == 0 {
                first_origin = origin;
            } else {
                last_origin = origin;
            }
            if self.metadata_capture {
                dictionaries.push(slice.header.metadata);
            }
        }

        let mut size = slice_size;
        size.push(ordered.len());

        let mut shape: Vec<usize> = size.iter().rev().copied().collect();
        if P::IS_VECTOR {
            shape.push(number_of_components);
        }
        let array = ArrayD::from_shape_vec(IxDyn(&shape), data).map_err(|error| ReaderError::Decode {
            path: ordered.last().map(|path| path.to_path_buf()).unwrap_or_default(),
            source: error.into(),
        })?;

        let spacing = Self::spacing(reference, &first_origin, &last_origin, ordered.len());
        let direction = Self::direction(reference);
        let image = Image::new(P::PIXEL_ID, size, number_of_components, P::Component::into_buffer(array))
            .with_geometry(first_origin, spacing, direction);

        info!(
            pixel_id = %P::PIXEL_ID,
            size = ?image.size(),
            slices = ordered.len(),
            "Decoded image series"
        );

        let metadata = self.metadata_capture.then(|| SliceMetadata::new(dictionaries));
        Ok((image, metadata))
    }

    /// Extent of one slice within the output: the first `D - 1` axes of the
    /// file.
    fn slice_size(header: &SliceHeader) -> Vec<usize> {
        (0..D - 1).map(|axis| header.size(axis)).collect()
    }

    fn check_geometry(
        header: &SliceHeader,
        expected: &[usize],
        number_of_components: usize,
    ) -> Result<(), ImageIoError> {
        let found = Self::slice_size(header);
        let trailing: usize = header.size.iter().skip(D - 1).product();
        if found != expected || trailing != 1 {
            return Err(ImageIoError::InconsistentGeometry {
                expected: expected.to_vec(),
                found: header.size.clone(),
            });
        }
        if header.number_of_components != number_of_components {
            return Err(ImageIoError::ComponentMismatch {
                expected: number_of_components,
                found: header.number_of_components,
            });
        }
        Ok(())
    }

    /// In-slice spacing comes from the first file. Along the series axis it
    /// is the distance between the first and last slice origins divided by
    /// the number of gaps, falling back to the header's own value.
    fn spacing(reference: &SliceHeader, first_origin: &[f64], last_origin: &[f64], slices: usize) -> Vec<f64> {
        let mut spacing: Vec<f64> = (0..D).map(|axis| reference.spacing(axis)).collect();
        if slices > 1 && !last_origin.is_empty() {
            let distance = first_origin
                .iter()
                .zip(last_origin)
                .map(|(a, b)| (b - a) * (b - a))
                .sum::<f64>()
                .sqrt();
            let series_spacing = distance / (slices - 1) as f64;
            if series_spacing > f64::EPSILON {
                spacing[D - 1] = series_spacing;
            }
        }
        spacing
    }

    fn direction(reference: &SliceHeader) -> Vec<f64> {
        (0..D)
            .flat_map(|row| (0..D).map(move |column| (row, column)))
            .map(|(row, column)| reference.direction(row, column))
            .collect()
    }
}

impl<P: Pixel, const D: usize> SeriesDecode for SeriesImageReader<P, D> {
    fn pixel_id(&self) -> PixelId {
        P::PIXEL_ID
    }

    fn dimension(&self) -> usize {
        D
    }

    fn file_names(&self) -> &[PathBuf] {
        &self.file_names
    }

    fn image_io_name(&self) -> &str {
        self.image_io.io_name()
    }

    fn metadata_capture(&self) -> bool {
        self.metadata_capture
    }

    fn set_metadata_capture(&mut self, enabled: bool) {
        self.metadata_capture = enabled;
    }

    fn reverse_order(&self) -> bool {
        self.reverse_order
    }

    fn set_reverse_order(&mut self, reverse: bool) {
        self.reverse_order = reverse;
    }
}
