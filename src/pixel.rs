//! Compile-time pixel types and the runtime buffers they map onto.
//!
//! A [`Pixel`] is what the series decode routine is generic over: either a
//! bare [`Component`] (scalar pixel) or a [`Vector`] of components. Backends
//! hand out [`Samples`] in whatever encoding the file uses; the typed
//! routine coerces them into its own component type with plain numeric
//! casts.

use std::fmt::Debug;
use std::marker::PhantomData;

use ndarray::{ArrayD, ArrayViewD};

use crate::enums::{ComponentType, PixelId};

/// Decoded samples of one file, in file order (x fastest, components
/// interleaved).
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    UInt8(Vec<u8>),
    Int8(Vec<i8>),
    UInt16(Vec<u16>),
    Int16(Vec<i16>),
    UInt32(Vec<u32>),
    Int32(Vec<i32>),
    UInt64(Vec<u64>),
    Int64(Vec<i64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

/// Owned pixel storage of an [`Image`](crate::Image), one variant per
/// component type.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelBuffer {
    UInt8(ArrayD<u8>),
    Int8(ArrayD<i8>),
    UInt16(ArrayD<u16>),
    Int16(ArrayD<i16>),
    UInt32(ArrayD<u32>),
    Int32(ArrayD<i32>),
    UInt64(ArrayD<u64>),
    Int64(ArrayD<i64>),
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
}

macro_rules! for_each_variant {
    ($value:expr, $enum:ident, $inner:ident => $body:expr) => {
        match $value {
            $enum::UInt8($inner) => $body,
            $enum::Int8($inner) => $body,
            $enum::UInt16($inner) => $body,
            $enum::Int16($inner) => $body,
            $enum::UInt32($inner) => $body,
            $enum::Int32($inner) => $body,
            $enum::UInt64($inner) => $body,
            $enum::Int64($inner) => $body,
            $enum::Float32($inner) => $body,
            $enum::Float64($inner) => $body,
        }
    };
}
pub(crate) use for_each_variant;

impl Samples {
    pub fn component_type(&self) -> ComponentType {
        match self {
            Samples::UInt8(_) => ComponentType::UInt8,
            Samples::Int8(_) => ComponentType::Int8,
            Samples::UInt16(_) => ComponentType::UInt16,
            Samples::Int16(_) => ComponentType::Int16,
            Samples::UInt32(_) => ComponentType::UInt32,
            Samples::Int32(_) => ComponentType::Int32,
            Samples::UInt64(_) => ComponentType::UInt64,
            Samples::Int64(_) => ComponentType::Int64,
            Samples::Float32(_) => ComponentType::Float32,
            Samples::Float64(_) => ComponentType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        for_each_variant!(self, Samples, values => values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PixelBuffer {
    pub fn component_type(&self) -> ComponentType {
        match self {
            PixelBuffer::UInt8(_) => ComponentType::UInt8,
            PixelBuffer::Int8(_) => ComponentType::Int8,
            PixelBuffer::UInt16(_) => ComponentType::UInt16,
            PixelBuffer::Int16(_) => ComponentType::Int16,
            PixelBuffer::UInt32(_) => ComponentType::UInt32,
            PixelBuffer::Int32(_) => ComponentType::Int32,
            PixelBuffer::UInt64(_) => ComponentType::UInt64,
            PixelBuffer::Int64(_) => ComponentType::Int64,
            PixelBuffer::Float32(_) => ComponentType::Float32,
            PixelBuffer::Float64(_) => ComponentType::Float64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        for_each_variant!(self, PixelBuffer, array => array.shape())
    }

    /// Raw bytes of the buffer in native endianness, if it is contiguous.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        for_each_variant!(self, PixelBuffer, array => array.as_slice().map(|s| bytemuck::cast_slice(s)))
    }
}

/// A numeric sample type the series reader can produce.
pub trait Component:
    Copy + Default + Debug + PartialEq + bytemuck::Pod + Send + Sync + 'static
{
    const COMPONENT_TYPE: ComponentType;

    /// Converts backend samples of any encoding into `Self` with `as`
    /// semantics (saturating for float to integer, wrapping between
    /// integers).
    fn coerce(samples: Samples) -> Vec<Self>;

    fn into_buffer(array: ArrayD<Self>) -> PixelBuffer;

    fn view(buffer: &PixelBuffer) -> Option<ArrayViewD<'_, Self>>;

    fn to_f64(self) -> f64;
}

macro_rules! impl_component {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl Component for $ty {
                const COMPONENT_TYPE: ComponentType = ComponentType::$variant;

                #[allow(unreachable_patterns)]
                fn coerce(samples: Samples) -> Vec<Self> {
                    match samples {
                        Samples::$variant(values) => values,
                        Samples::UInt8(values) => values.into_iter().map(|v| v as $ty).collect(),
                        Samples::Int8(values) => values.into_iter().map(|v| v as $ty).collect(),
                        Samples::UInt16(values) => values.into_iter().map(|v| v as $ty).collect(),
                        Samples::Int16(values) => values.into_iter().map(|v| v as $ty).collect(),
                        Samples::UInt32(values) => values.into_iter().map(|v| v as $ty).collect(),
                        Samples::Int32(values) => values.into_iter().map(|v| v as $ty).collect(),
                        Samples::UInt64(values) => values.into_iter().map(|v| v as $ty).collect(),
                        Samples::Int64(values) => values.into_iter().map(|v| v as $ty).collect(),
                        Samples::Float32(values) => values.into_iter().map(|v| v as $ty).collect(),
                        Samples::Float64(values) => values.into_iter().map(|v| v as $ty).collect(),
                    }
                }

                fn into_buffer(array: ArrayD<Self>) -> PixelBuffer {
                    PixelBuffer::$variant(array)
                }

                fn view(buffer: &PixelBuffer) -> Option<ArrayViewD<'_, Self>> {
                    match buffer {
                        PixelBuffer::$variant(array) => Some(array.view()),
                        _ => None,
                    }
                }

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )+
    };
}

impl_component!(
    u8 => UInt8,
    i8 => Int8,
    u16 => UInt16,
    i16 => Int16,
    u32 => UInt32,
    i32 => Int32,
    u64 => UInt64,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
);

/// Pixel type a decode routine is instantiated over.
pub trait Pixel: Send + Sync + 'static {
    type Component: Component;

    const PIXEL_ID: PixelId;

    /// Vector pixels keep every on-disk component; scalar pixels require
    /// single-component files.
    const IS_VECTOR: bool;
}

impl<C: Component> Pixel for C {
    type Component = C;
    const PIXEL_ID: PixelId = PixelId::scalar(C::COMPONENT_TYPE);
    const IS_VECTOR: bool = false;
}

/// Variable-length vector pixel of `C` components.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vector<C>(PhantomData<C>);

impl<C: Component> Pixel for Vector<C> {
    type Component = C;
    const PIXEL_ID: PixelId = PixelId::vector(C::COMPONENT_TYPE);
    const IS_VECTOR: bool = true;
}
