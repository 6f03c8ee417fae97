use super::{ImageIo, ImageIoHandle, MetadataDictionary, SliceData, SliceHeader};
use crate::{enums::ComponentType, error::ImageIoError, pixel::Samples};

use dicom::{
    core::Tag,
    object::{DefaultDicomObject, InMemDicomObject, OpenFileOptions, open_file},
    pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder},
};
use dicom_dictionary_std::tags;
use ndarray::{Array, Dimension};
use std::{fs::File, io::Read, path::Path};
use tracing::debug;

/// DICOM backend built on `dicom-rs`.
///
/// Every file is reported as three dimensional with the frame count on the
/// third axis, so a plain single-frame slice has size `(columns, rows, 1)`.
/// Stored values are returned without applying the modality LUT.
#[derive(Debug, Clone, Copy, Default)]
pub struct DicomImageIo;

const DICM_MAGIC_OFFSET: usize = 128;

impl ImageIo for DicomImageIo {
    fn name(&self) -> &str {
        "DicomImageIo"
    }

    fn can_read(&self, path: &Path) -> bool {
        let has_extension = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("dcm"));
        has_extension || has_dicm_magic(path)
    }

    fn open(&self, path: &Path) -> Result<Box<dyn ImageIoHandle>, ImageIoError> {
        let object = OpenFileOptions::new()
            .read_until(tags::PIXEL_DATA)
            .open_file(path)?;
        let header = read_header(&object)?;
        debug!(path = %path.display(), size = ?header.size, "Opened DICOM header");
        Ok(Box::new(DicomHandle { header }))
    }
}

struct DicomHandle {
    header: SliceHeader,
}

impl ImageIoHandle for DicomHandle {
    fn io_name(&self) -> &str {
        "DicomImageIo"
    }

    fn header(&self) -> &SliceHeader {
        &self.header
    }

    fn read(&self, path: &Path) -> Result<SliceData, ImageIoError> {
        let object = open_file(path)?;
        let header = read_header(&object)?;
        let pixel_data = object.decode_pixel_data()?;
        let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
        let samples = match header.component_type {
            ComponentType::UInt8 => {
                Samples::UInt8(flatten(pixel_data.to_ndarray_with_options::<u8>(&options)?))
            }
            ComponentType::Int8 => {
                Samples::Int8(flatten(pixel_data.to_ndarray_with_options::<i8>(&options)?))
            }
            ComponentType::UInt16 => {
                Samples::UInt16(flatten(pixel_data.to_ndarray_with_options::<u16>(&options)?))
            }
            ComponentType::Int16 => {
                Samples::Int16(flatten(pixel_data.to_ndarray_with_options::<i16>(&options)?))
            }
            ComponentType::UInt32 => {
                Samples::UInt32(flatten(pixel_data.to_ndarray_with_options::<u32>(&options)?))
            }
            ComponentType::Int32 => {
                Samples::Int32(flatten(pixel_data.to_ndarray_with_options::<i32>(&options)?))
            }
            other => {
                return Err(ImageIoError::UnsupportedEncoding(format!(
                    "{other} DICOM pixel data"
                )));
            }
        };
        Ok(SliceData { header, samples })
    }
}

/// Frames, rows, columns and samples come out of `dicom-pixeldata` in
/// standard layout, which is exactly x-fastest interleaved order.
fn flatten<T: Copy, D: Dimension>(array: Array<T, D>) -> Vec<T> {
    array.iter().copied().collect()
}

fn has_dicm_magic(path: &Path) -> bool {
    let mut preamble = [0u8; DICM_MAGIC_OFFSET + 4];
    File::open(path)
        .and_then(|mut file| file.read_exact(&mut preamble))
        .is_ok_and(|_| &preamble[DICM_MAGIC_OFFSET..] == b"DICM")
}

fn read_header(object: &DefaultDicomObject) -> Result<SliceHeader, ImageIoError> {
    let rows = required_int(object, tags::ROWS, "Rows")?;
    let columns = required_int(object, tags::COLUMNS, "Columns")?;
    let bits_allocated = required_int(object, tags::BITS_ALLOCATED, "BitsAllocated")?;
    let pixel_representation = optional_int(object, tags::PIXEL_REPRESENTATION).unwrap_or(0);
    let samples_per_pixel = optional_int(object, tags::SAMPLES_PER_PIXEL).unwrap_or(1);
    let frames = optional_int(object, tags::NUMBER_OF_FRAMES).unwrap_or(1).max(1);

    let component_type = component_type_for(bits_allocated, pixel_representation)?;

    // PixelSpacing is (row spacing, column spacing), i.e. (y, x)
    let (spacing_y, spacing_x) = match optional_floats(object, tags::PIXEL_SPACING).as_deref() {
        Some([y, x, ..]) => (*y, *x),
        _ => (1.0, 1.0),
    };
    let spacing_z = optional_floats(object, tags::SPACING_BETWEEN_SLICES)
        .or_else(|| optional_floats(object, tags::SLICE_THICKNESS))
        .and_then(|values| values.first().copied())
        .unwrap_or(1.0);

    let origin = match optional_floats(object, tags::IMAGE_POSITION_PATIENT).as_deref() {
        Some([x, y, z, ..]) => vec![*x, *y, *z],
        _ => vec![0.0; 3],
    };
    let direction = optional_floats(object, tags::IMAGE_ORIENTATION_PATIENT)
        .and_then(|cosines| direction_from_orientation(&cosines))
        .unwrap_or_else(|| super::identity(3));

    Ok(
        SliceHeader::new(
            component_type,
            samples_per_pixel as usize,
            vec![columns as usize, rows as usize, frames as usize],
        )
        .with_spacing(vec![spacing_x, spacing_y, spacing_z])
        .with_origin(origin)
        .with_direction(direction)
        .with_metadata(metadata_dictionary(object)),
    )
}

fn component_type_for(bits_allocated: u32, pixel_representation: u32) -> Result<ComponentType, ImageIoError> {
    let signed = pixel_representation != 0;
    match (bits_allocated, signed) {
        (8, false) => Ok(ComponentType::UInt8),
        (8, true) => Ok(ComponentType::Int8),
        (16, false) => Ok(ComponentType::UInt16),
        (16, true) => Ok(ComponentType::Int16),
        (32, false) => Ok(ComponentType::UInt32),
        (32, true) => Ok(ComponentType::Int32),
        (bits, _) => Err(ImageIoError::UnsupportedEncoding(format!(
            "BitsAllocated {bits}"
        ))),
    }
}

/// Builds the row-major 3x3 direction matrix whose columns are the row
/// cosine, the column cosine and their cross product.
fn direction_from_orientation(cosines: &[f64]) -> Option<Vec<f64>> {
    let [rx, ry, rz, cx, cy, cz] = <[f64; 6]>::try_from(cosines.get(..6)?).ok()?;
    let (nx, ny, nz) = (ry * cz - rz * cy, rz * cx - rx * cz, rx * cy - ry * cx);
    Some(vec![rx, cx, nx, ry, cy, ny, rz, cz, nz])
}

/// Every textual element of the header, keyed as `gggg|eeee`.
fn metadata_dictionary(object: &InMemDicomObject) -> MetadataDictionary {
    object
        .iter()
        .filter(|element| element.header().tag != tags::PIXEL_DATA)
        .filter_map(|element| {
            let tag = element.header().tag;
            let value = element.to_str().ok()?;
            Some((
                format!("{:04x}|{:04x}", tag.group(), tag.element()),
                value.trim_end_matches(['\0', ' ']).to_string(),
            ))
        })
        .collect()
}

fn required_int(object: &InMemDicomObject, tag: Tag, name: &'static str) -> Result<u32, ImageIoError> {
    optional_int(object, tag).ok_or(ImageIoError::MissingAttribute(name))
}

fn optional_int(object: &InMemDicomObject, tag: Tag) -> Option<u32> {
    object.element(tag).ok()?.to_int::<u32>().ok()
}

fn optional_floats(object: &InMemDicomObject, tag: Tag) -> Option<Vec<f64>> {
    object.element(tag).ok()?.to_multi_float64().ok()
}
