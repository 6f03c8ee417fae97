use std::path::Path;

use image::{ColorType, DynamicImage, ImageDecoder, ImageFormat, ImageReader};

use super::{ImageIo, ImageIoHandle, MetadataDictionary, SliceData, SliceHeader};
use crate::enums::ComponentType;
use crate::error::ImageIoError;
use crate::pixel::Samples;

/// Two dimensional raster formats (PNG, TIFF, BMP, ...) decoded by the
/// `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterImageIo;

impl ImageIo for RasterImageIo {
    fn name(&self) -> &str {
        "RasterImageIo"
    }

    fn can_read(&self, path: &Path) -> bool {
        ImageFormat::from_path(path).is_ok()
    }

    fn open(&self, path: &Path) -> Result<Box<dyn ImageIoHandle>, ImageIoError> {
        let decoder = ImageReader::open(path)?
            .with_guessed_format()?
            .into_decoder()?;
        let (width, height) = decoder.dimensions();
        let header = header_for(decoder.color_type(), width, height)?;
        Ok(Box::new(RasterHandle { header }))
    }
}

struct RasterHandle {
    header: SliceHeader,
}

impl ImageIoHandle for RasterHandle {
    fn io_name(&self) -> &str {
        "RasterImageIo"
    }

    fn header(&self) -> &SliceHeader {
        &self.header
    }

    fn read(&self, path: &Path) -> Result<SliceData, ImageIoError> {
        let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        let header = header_for(image.color(), image.width(), image.height())?;
        let samples = match image {
            DynamicImage::ImageLuma8(buffer) => Samples::UInt8(buffer.into_raw()),
            DynamicImage::ImageLumaA8(buffer) => Samples::UInt8(buffer.into_raw()),
            DynamicImage::ImageRgb8(buffer) => Samples::UInt8(buffer.into_raw()),
            DynamicImage::ImageRgba8(buffer) => Samples::UInt8(buffer.into_raw()),
            DynamicImage::ImageLuma16(buffer) => Samples::UInt16(buffer.into_raw()),
            DynamicImage::ImageLumaA16(buffer) => Samples::UInt16(buffer.into_raw()),
            DynamicImage::ImageRgb16(buffer) => Samples::UInt16(buffer.into_raw()),
            DynamicImage::ImageRgba16(buffer) => Samples::UInt16(buffer.into_raw()),
            DynamicImage::ImageRgb32F(buffer) => Samples::Float32(buffer.into_raw()),
            DynamicImage::ImageRgba32F(buffer) => Samples::Float32(buffer.into_raw()),
            other => {
                return Err(ImageIoError::UnsupportedEncoding(format!(
                    "{:?} raster image",
                    other.color()
                )));
            }
        };
        Ok(SliceData { header, samples })
    }
}

fn header_for(color: ColorType, width: u32, height: u32) -> Result<SliceHeader, ImageIoError> {
    let channels = usize::from(color.channel_count());
    let bytes_per_channel = usize::from(color.bytes_per_pixel()) / channels.max(1);
    let component_type = match bytes_per_channel {
        1 => ComponentType::UInt8,
        2 => ComponentType::UInt16,
        4 => ComponentType::Float32,
        _ => {
            return Err(ImageIoError::UnsupportedEncoding(format!(
                "{color:?} raster image"
            )));
        }
    };
    let mut metadata = MetadataDictionary::new();
    metadata.insert("ColorType".to_string(), format!("{color:?}"));
    Ok(
        SliceHeader::new(component_type, channels, vec![width as usize, height as usize])
            .with_metadata(metadata),
    )
}
