use std::collections::HashMap;
use std::sync::OnceLock;

use crate::dimension::{MAX_DIMENSION, MIN_DIMENSION};
use crate::enums::PixelId;
use crate::error::ReaderError;
use crate::image::Image;
use crate::pixel::{Pixel, Vector};
use crate::series_decoder::{SeriesJob, decode_series};

/// Type-erased series decode routine.
pub type SeriesRoutine = fn(SeriesJob<'_>) -> Result<Image, ReaderError>;

/// Lookup table from `(pixel id, dimension)` to the decode routine
/// monomorphized for that combination.
///
/// The process-wide instance is built once on first use and never modified
/// afterwards; see [`PixelTypeRegistry::global`].
#[derive(Debug)]
pub struct PixelTypeRegistry {
    routines: HashMap<(PixelId, usize), SeriesRoutine>,
}

/// Registers `decode_series::<P, D>` for every listed pixel type and every
/// dimension from `MIN_DIMENSION` to `MAX_DIMENSION`.
macro_rules! register_pixel_types {
    ($registry:ident; $($pixel:ty),+ $(,)?) => {
        $(
            register_pixel_types!(@dimensions $registry, $pixel, 2 3 4 5);
        )+
    };
    (@dimensions $registry:ident, $pixel:ty, $($dimension:literal)+) => {
        $(
            $registry.register(<$pixel as Pixel>::PIXEL_ID, $dimension, decode_series::<$pixel, $dimension>);
        )+
    };
}

impl PixelTypeRegistry {
    /// The shared registry used by every series reader.
    pub fn global() -> &'static PixelTypeRegistry {
        static REGISTRY: OnceLock<PixelTypeRegistry> = OnceLock::new();
        REGISTRY.get_or_init(PixelTypeRegistry::build)
    }

    fn build() -> Self {
        let mut registry = Self {
            routines: HashMap::new(),
        };

        register_pixel_types!(registry;
            u8, i8, u16, i16, u32, i32, f32, f64,
            Vector<u8>, Vector<i8>, Vector<u16>, Vector<i16>,
            Vector<u32>, Vector<i32>, Vector<f32>, Vector<f64>,
        );

        #[cfg(feature = "int64-pixels")]
        register_pixel_types!(registry; u64, i64, Vector<u64>, Vector<i64>);

        debug_assert!(
            registry
                .routines
                .keys()
                .all(|(_, dimension)| (MIN_DIMENSION..=MAX_DIMENSION).contains(dimension))
        );
        registry
    }

    fn register(&mut self, pixel_id: PixelId, dimension: usize, routine: SeriesRoutine) {
        self.routines.insert((pixel_id, dimension), routine);
    }

    pub fn has_routine(&self, pixel_id: PixelId, dimension: usize) -> bool {
        self.routines.contains_key(&(pixel_id, dimension))
    }

    /// # Errors
    ///
    /// [`ReaderError::UnsupportedPixelType`] if nothing is registered for the
    /// combination. There is no fallback to another pixel type.
    pub fn lookup(&self, pixel_id: PixelId, dimension: usize) -> Result<SeriesRoutine, ReaderError> {
        self.routines
            .get(&(pixel_id, dimension))
            .copied()
            .ok_or(ReaderError::UnsupportedPixelType {
                pixel_id,
                dimension,
            })
    }

    /// Registered pixel ids, sorted.
    pub fn supported_pixel_ids(&self) -> Vec<PixelId> {
        let mut pixel_ids: Vec<PixelId> = self.routines.keys().map(|(pixel_id, _)| *pixel_id).collect();
        pixel_ids.sort();
        pixel_ids.dedup();
        pixel_ids
    }

    pub fn len(&self) -> usize {
        self.routines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }
}
