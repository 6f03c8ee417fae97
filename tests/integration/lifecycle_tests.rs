//! Reader lifecycle across executions.
//!
//! Tests verify:
//! - An empty file list fails without probing
//! - Consecutive executions produce independent images
//! - A failed execution discards retained state but not returned images
//! - The pre-decode hook runs on the typed reader before decoding

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dicom_series::{ImageSeriesReader, PixelId, ReaderError, ReaderState, SeriesDecode};

use super::test_utils::{MockImageIo, paths, single_plane_series, u16_slice, write_u8_filled};

#[test]
fn test_empty_file_list_never_probes() {
    let io = MockImageIo::new(single_plane_series(2, 2, 2, 1.0));
    let mut reader = io.reader();

    assert!(matches!(reader.execute(), Err(ReaderError::EmptyFileList)));
    reader.set_file_names(Vec::<PathBuf>::new());
    assert!(matches!(reader.execute(), Err(ReaderError::EmptyFileList)));
    assert_eq!(io.opens(), 0);
    assert_eq!(reader.state(), ReaderState::Idle);
}

#[test]
fn test_consecutive_executions_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let first: Vec<_> = (0..3)
        .map(|k| {
            let path = dir.path().join(format!("a{k}.png"));
            write_u8_filled(&path, 4, 4, 10);
            path
        })
        .collect();
    let second: Vec<_> = (0..2)
        .map(|k| {
            let path = dir.path().join(format!("b{k}.png"));
            write_u8_filled(&path, 6, 2, 99);
            path
        })
        .collect();

    let mut reader = ImageSeriesReader::new();
    reader.set_file_names(&first);
    let image_a = reader.execute().unwrap();
    reader.set_file_names(&second);
    let image_b = reader.execute().unwrap();

    assert_eq!(image_a.size(), &[4, 4, 3]);
    assert_eq!(image_b.size(), &[6, 2, 2]);
    assert!(image_a.as_array::<u8>().unwrap().iter().all(|&v| v == 10));
    assert!(image_b.as_array::<u8>().unwrap().iter().all(|&v| v == 99));
}

#[test]
fn test_failed_execution_resets_to_idle() {
    let series = single_plane_series(3, 2, 2, 1.0);
    let io = MockImageIo::new(series.clone());
    let mut reader = io.reader();
    reader
        .set_file_names(paths(&series))
        .set_metadata_capture(true);

    let image = reader.execute().unwrap();
    assert_eq!(reader.state(), ReaderState::Ready);
    assert!(reader.slice_metadata().is_ok());

    reader.set_file_names(["mock/unknown.dcm"]);
    assert!(matches!(reader.execute(), Err(ReaderError::IoOpen { .. })));
    assert_eq!(reader.state(), ReaderState::Idle);
    assert!(matches!(
        reader.slice_metadata(),
        Err(ReaderError::MetadataUnavailable)
    ));

    // the image handed out earlier is untouched
    assert_eq!(image.size(), &[2, 2, 3]);
    assert_eq!(image.as_array::<u16>().unwrap()[[2, 1, 1]], 2);
}

#[test]
fn test_readers_do_not_share_state() {
    let series = single_plane_series(2, 2, 2, 1.0);
    let io = MockImageIo::new(series.clone());
    let mut reader = io.reader();
    reader
        .set_file_names(paths(&series))
        .set_metadata_capture(true);
    reader.execute().unwrap();

    let wide = vec![(PathBuf::from("wide"), u16_slice(vec![2, 2, 2, 2, 2], 0))];
    let wide_io = MockImageIo::new(wide.clone());
    let mut other = wide_io.reader();
    other.set_file_names(paths(&wide)).set_metadata_capture(true);
    assert!(other.execute().is_err());
    assert!(other.slice_metadata().is_err());

    assert_eq!(reader.slice_metadata().unwrap().len(), 2);
}

#[test]
fn test_pre_decode_hook_sees_typed_reader() {
    let series = single_plane_series(4, 2, 2, 1.0);
    let io = MockImageIo::new(series.clone());
    let calls = Arc::new(AtomicUsize::new(0));
    let hook_calls = Arc::clone(&calls);

    let mut reader = io.reader();
    reader
        .set_file_names(paths(&series))
        .set_output_pixel_type(PixelId::Float32)
        .set_pre_decode_hook(move |typed: &mut dyn SeriesDecode| {
            hook_calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(typed.pixel_id(), PixelId::Float32);
            assert_eq!(typed.dimension(), 3);
            assert_eq!(typed.file_names().len(), 4);
            assert_eq!(typed.image_io_name(), "MockImageIo");
            typed.set_reverse_order(true);
        });

    let image = reader.execute().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let volume = image.as_array::<f32>().unwrap();
    assert_eq!(volume[[0, 0, 0]], 3.0);
    assert_eq!(volume[[3, 0, 0]], 0.0);

    reader.execute().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_hook_not_called_when_dispatch_fails() {
    let wide = vec![(PathBuf::from("wide"), u16_slice(vec![2, 2, 2, 2, 2], 0))];
    let io = MockImageIo::new(wide.clone());
    let calls = Arc::new(AtomicUsize::new(0));
    let hook_calls = Arc::clone(&calls);

    let mut reader = io.reader();
    reader
        .set_file_names(paths(&wide))
        .set_pre_decode_hook(move |_: &mut dyn SeriesDecode| {
            hook_calls.fetch_add(1, Ordering::SeqCst);
        });

    assert!(reader.execute().is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(io.opens(), 1);
}
