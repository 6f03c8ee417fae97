//! Per-slice metadata captured during a series decode.
//!
//! The dictionaries are owned by the reader that decoded them and are only
//! reachable through a borrow of that reader, so a view can never outlive
//! the decode it came from or observe the next one.

use crate::error::ReaderError;
use crate::image_io::MetadataDictionary;

/// One metadata dictionary per slice, in series order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SliceMetadata {
    dictionaries: Vec<MetadataDictionary>,
}

impl SliceMetadata {
    pub(crate) fn new(dictionaries: Vec<MetadataDictionary>) -> Self {
        Self { dictionaries }
    }

    /// Number of slices.
    pub fn len(&self) -> usize {
        self.dictionaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dictionaries.is_empty()
    }

    /// Keys of slice `slice`, in sorted order.
    pub fn keys(&self, slice: usize) -> Result<impl Iterator<Item = &str> + '_, ReaderError> {
        Ok(self.dictionary(slice)?.keys().map(String::as_str))
    }

    pub fn has_key(&self, slice: usize, key: &str) -> Result<bool, ReaderError> {
        Ok(self.dictionary(slice)?.contains_key(key))
    }

    pub fn get(&self, slice: usize, key: &str) -> Result<&str, ReaderError> {
        self.dictionary(slice)?
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ReaderError::KeyNotFound {
                slice,
                key: key.to_string(),
            })
    }

    pub fn dictionary(&self, slice: usize) -> Result<&MetadataDictionary, ReaderError> {
        self.dictionaries
            .get(slice)
            .ok_or(ReaderError::SliceIndexOutOfRange {
                index: slice,
                len: self.dictionaries.len(),
            })
    }
}
