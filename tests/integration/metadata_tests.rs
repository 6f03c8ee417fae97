//! Per-slice metadata retained by the reader.
//!
//! Tests verify:
//! - Metadata is only available after a capturing execution
//! - Keys and values are reported per slice in stacking order
//! - Out-of-range slices and missing keys are errors
//! - Metadata is replaced by the next execution

use dicom_series::{ReaderError, SeriesDecode};

use super::test_utils::{MockImageIo, paths, single_plane_series};

#[test]
fn test_metadata_unavailable_before_execute() {
    let reader = MockImageIo::default().reader();
    assert!(matches!(
        reader.slice_metadata(),
        Err(ReaderError::MetadataUnavailable)
    ));
    assert!(matches!(
        reader.metadata(0, "0020|0013"),
        Err(ReaderError::MetadataUnavailable)
    ));
}

#[test]
fn test_metadata_unavailable_without_capture() {
    let series = single_plane_series(3, 2, 2, 1.0);
    let io = MockImageIo::new(series.clone());
    let mut reader = io.reader();
    reader.set_file_names(paths(&series));

    reader.execute().unwrap();
    assert!(matches!(
        reader.has_metadata_key(0, "0008|0060"),
        Err(ReaderError::MetadataUnavailable)
    ));
}

#[test]
fn test_captured_metadata_per_slice() {
    let series = single_plane_series(4, 2, 2, 1.0);
    let io = MockImageIo::new(series.clone());
    let mut reader = io.reader();
    reader
        .set_file_names(paths(&series))
        .set_metadata_capture(true);
    reader.execute().unwrap();

    assert_eq!(reader.slice_metadata().unwrap().len(), 4);
    for slice in 0..4 {
        let keys: Vec<_> = reader.metadata_keys(slice).unwrap().collect();
        assert_eq!(keys, ["0008|0060", "0020|0013"]);
        assert_eq!(
            reader.metadata(slice, "0020|0013").unwrap(),
            (slice + 1).to_string()
        );
    }
    assert!(reader.has_metadata_key(2, "0008|0060").unwrap());
    assert!(!reader.has_metadata_key(2, "7fe0|0010").unwrap());
}

#[test]
fn test_metadata_errors() {
    let series = single_plane_series(2, 2, 2, 1.0);
    let io = MockImageIo::new(series.clone());
    let mut reader = io.reader();
    reader
        .set_file_names(paths(&series))
        .set_metadata_capture(true);
    reader.execute().unwrap();

    match reader.metadata(1, "0010|0010") {
        Err(ReaderError::KeyNotFound { slice, key }) => {
            assert_eq!(slice, 1);
            assert_eq!(key, "0010|0010");
        }
        other => panic!("expected a missing key, got {other:?}"),
    }
    assert!(matches!(
        reader.metadata_dictionary(2),
        Err(ReaderError::SliceIndexOutOfRange { index: 2, len: 2 })
    ));
    assert!(reader.metadata_keys(5).is_err());
}

#[test]
fn test_reversed_order_reorders_metadata() {
    let series = single_plane_series(3, 2, 2, 1.0);
    let io = MockImageIo::new(series.clone());
    let mut reader = io.reader();
    reader
        .set_file_names(paths(&series))
        .set_metadata_capture(true)
        .set_pre_decode_hook(|typed: &mut dyn SeriesDecode| typed.set_reverse_order(true));
    reader.execute().unwrap();

    assert_eq!(reader.metadata(0, "0020|0013").unwrap(), "3");
    assert_eq!(reader.metadata(2, "0020|0013").unwrap(), "1");
}

#[test]
fn test_hook_can_disable_capture() {
    let series = single_plane_series(2, 2, 2, 1.0);
    let io = MockImageIo::new(series.clone());
    let mut reader = io.reader();
    reader
        .set_file_names(paths(&series))
        .set_metadata_capture(true)
        .set_pre_decode_hook(|typed: &mut dyn SeriesDecode| {
            assert!(typed.metadata_capture());
            typed.set_metadata_capture(false);
        });

    reader.execute().unwrap();
    assert!(matches!(
        reader.slice_metadata(),
        Err(ReaderError::MetadataUnavailable)
    ));
}

#[test]
fn test_metadata_replaced_on_next_execute() {
    let series = single_plane_series(5, 2, 2, 1.0);
    let io = MockImageIo::new(series.clone());
    let mut reader = io.reader();
    reader
        .set_file_names(paths(&series))
        .set_metadata_capture(true);
    reader.execute().unwrap();
    assert_eq!(reader.slice_metadata().unwrap().len(), 5);

    reader.set_file_names(paths(&series[3..]));
    reader.execute().unwrap();
    assert_eq!(reader.slice_metadata().unwrap().len(), 2);
    assert_eq!(reader.metadata(0, "0020|0013").unwrap(), "4");

    reader.set_metadata_capture(false);
    reader.execute().unwrap();
    assert!(reader.slice_metadata().is_err());
}
