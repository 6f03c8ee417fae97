use crate::error::ReaderError;

/// Highest image dimension a series may be read into.
pub const MAX_DIMENSION: usize = 5;

/// Lowest image dimension a series may be read into.
pub const MIN_DIMENSION: usize = 2;

/// Dimension of the image produced by stacking files of `file_dimension`
/// axes along a new series axis.
///
/// Files that are three dimensional with a single plane on their third axis
/// (the usual shape of single-frame DICOM) stack into a 3-D volume rather
/// than a 4-D one.
pub fn infer_dimension(file_dimension: usize, third_axis_extent: usize) -> Result<usize, ReaderError> {
    let mut dimension = file_dimension + 1;

    if dimension == 4 && third_axis_extent == 1 {
        dimension -= 1;
    }

    if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&dimension) {
        return Err(ReaderError::UnsupportedDimension {
            file_dimension,
            dimension,
        });
    }

    Ok(dimension)
}
