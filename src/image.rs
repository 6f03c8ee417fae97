use image::{GrayImage, ImageBuffer};
use ndarray::{ArrayViewD, Axis};
use rayon::prelude::*;

use crate::enums::PixelId;
use crate::pixel::{Component, PixelBuffer, for_each_variant};

/// A typed image produced by the series reader.
///
/// `size`, `origin` and `spacing` are indexed x first. The buffer is stored
/// in standard (row-major) layout, so its shape is the reversed size, with
/// an extra trailing axis of components for vector images. `direction` is a
/// row-major `dimension × dimension` matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pixel_id: PixelId,
    size: Vec<usize>,
    number_of_components: usize,
    buffer: PixelBuffer,
    origin: Vec<f64>,
    spacing: Vec<f64>,
    direction: Vec<f64>,
}

impl Image {
    pub(crate) fn new(
        pixel_id: PixelId,
        size: Vec<usize>,
        number_of_components: usize,
        buffer: PixelBuffer,
    ) -> Self {
        let dimension = size.len();
        Self {
            pixel_id,
            number_of_components,
            buffer,
            origin: vec![0.0; dimension],
            spacing: vec![1.0; dimension],
            direction: crate::image_io::identity(dimension),
            size,
        }
    }

    pub(crate) fn with_geometry(mut self, origin: Vec<f64>, spacing: Vec<f64>, direction: Vec<f64>) -> Self {
        self.origin = origin;
        self.spacing = spacing;
        self.direction = direction;
        self
    }

    pub fn pixel_id(&self) -> PixelId {
        self.pixel_id
    }

    pub fn dimension(&self) -> usize {
        self.size.len()
    }

    /// Extent per axis, x first.
    pub fn size(&self) -> &[usize] {
        &self.size
    }

    pub fn number_of_components(&self) -> usize {
        self.number_of_components
    }

    pub fn origin(&self) -> &[f64] {
        &self.origin
    }

    pub fn spacing(&self) -> &[f64] {
        &self.spacing
    }

    pub fn direction(&self) -> &[f64] {
        &self.direction
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> PixelBuffer {
        self.buffer
    }

    /// Typed view of the pixel data, `None` if `C` is not the component
    /// type of this image.
    pub fn as_array<C: Component>(&self) -> Option<ArrayViewD<'_, C>> {
        C::view(&self.buffer)
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.buffer.as_bytes()
    }

    /// Renders plane `index` of a scalar 3-D image as an 8-bit grayscale
    /// image, stretching the plane's value range to 0..=255.
    pub fn slice_preview(&self, index: usize) -> Option<GrayImage> {
        if self.dimension() != 3 || self.pixel_id.is_vector() || index >= self.size[2] {
            return None;
        }
        let width = u32::try_from(self.size[0]).ok()?;
        let height = u32::try_from(self.size[1]).ok()?;
        let values: Vec<f64> = for_each_variant!(&self.buffer, PixelBuffer, array => {
            array
                .index_axis(Axis(0), index)
                .iter()
                .map(|value| value.to_f64())
                .collect()
        });
        Self::plane_to_image(&values, width, height)
    }

    fn plane_to_image(values: &[f64], width: u32, height: u32) -> Option<GrayImage> {
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let range = max - min;
        let pixel_data: Vec<u8> = values
            .par_iter()
            .map(|&v| Self::normalize_to_u8(v, min, range))
            .collect();
        ImageBuffer::from_raw(width, height, pixel_data)
    }

    #[inline]
    fn normalize_to_u8(value: f64, min: f64, range: f64) -> u8 {
        if range <= 0.0 {
            return 0;
        }
        (((value - min) / range) * 255.0).clamp(0.0, 255.0) as u8
    }
}
