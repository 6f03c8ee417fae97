//! Series read from real PNG files through the bundled raster backend.
//!
//! Tests verify:
//! - 2-D slices stack into a 3-D volume in file order
//! - An explicit output pixel type overrides the on-disk type
//! - Multi-component files become vector images
//! - Mismatched slices and unreadable files are reported with their path

use image::{ImageBuffer, Rgb};

use dicom_series::{
    ImageIoError, ImageSeriesReader, PixelId, ReaderError, ReaderState, read_image,
};

use super::test_utils::{u16_value, write_u16_series, write_u8_filled};

// =============================================================================
// Inferred pixel type
// =============================================================================

#[test]
fn test_three_uint16_slices_make_a_volume() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_u16_series(dir.path(), 3, 256, 256);

    let mut reader = ImageSeriesReader::new();
    reader.set_file_names(&files);
    let image = reader.execute().unwrap();

    assert_eq!(reader.state(), ReaderState::Ready);
    assert_eq!(image.dimension(), 3);
    assert_eq!(image.size(), &[256, 256, 3]);
    assert_eq!(image.pixel_id(), PixelId::UInt16);
    assert_eq!(image.number_of_components(), 1);

    let volume = image.as_array::<u16>().unwrap();
    assert_eq!(volume.shape(), &[3, 256, 256]);
    for (k, (x, y)) in [(0, (0, 0)), (1, (17, 3)), (2, (255, 255))] {
        assert_eq!(volume[[k, y as usize, x as usize]], u16_value(k, x, y, 256));
    }
}

#[test]
fn test_slice_count_becomes_third_axis() {
    let dir = tempfile::tempdir().unwrap();
    for count in [1, 2, 5] {
        let sub = dir.path().join(format!("n{count}"));
        std::fs::create_dir(&sub).unwrap();
        let files = write_u16_series(&sub, count, 8, 4);

        let image = read_image(&files, PixelId::Unknown, None).unwrap();
        assert_eq!(image.size(), &[8, 4, count]);
    }
}

#[test]
fn test_default_geometry_for_raster_files() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_u16_series(dir.path(), 2, 4, 4);

    let image = read_image(&files, PixelId::Unknown, None).unwrap();
    assert_eq!(image.spacing(), &[1.0, 1.0, 1.0]);
    assert_eq!(image.origin(), &[0.0, 0.0, 0.0]);
    assert_eq!(
        image.direction(),
        &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]
    );
}

// =============================================================================
// Explicit pixel type
// =============================================================================

#[test]
fn test_requested_pixel_type_overrides_disk_type() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_u16_series(dir.path(), 2, 16, 16);

    let image = read_image(&files, PixelId::Float32, None).unwrap();
    assert_eq!(image.pixel_id(), PixelId::Float32);
    assert!(image.as_array::<u16>().is_none());

    let volume = image.as_array::<f32>().unwrap();
    assert_eq!(volume[[1, 2, 3]], f32::from(u16_value(1, 3, 2, 16)));
}

#[test]
fn test_requested_vector_type_from_scalar_files() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_u16_series(dir.path(), 2, 4, 4);

    let image = read_image(&files, PixelId::VectorUInt16, None).unwrap();
    assert_eq!(image.pixel_id(), PixelId::VectorUInt16);
    assert_eq!(image.number_of_components(), 1);
    assert_eq!(image.as_array::<u16>().unwrap().shape(), &[2, 4, 4, 1]);
}

#[test]
fn test_rgb_slices_become_vector_volume() {
    let dir = tempfile::tempdir().unwrap();
    let files: Vec<_> = (0..2u8)
        .map(|k| {
            let path = dir.path().join(format!("rgb_{k}.png"));
            ImageBuffer::from_pixel(3, 2, Rgb([k, 10 + k, 20 + k]))
                .save(&path)
                .unwrap();
            path
        })
        .collect();

    let image = read_image(&files, PixelId::Unknown, None).unwrap();
    assert_eq!(image.pixel_id(), PixelId::VectorUInt8);
    assert_eq!(image.number_of_components(), 3);
    assert_eq!(image.size(), &[3, 2, 2]);

    let volume = image.as_array::<u8>().unwrap();
    assert_eq!(volume.shape(), &[2, 2, 3, 3]);
    assert_eq!(volume[[1, 1, 2, 2]], 21);
}

#[test]
fn test_scalar_request_rejects_rgb_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rgb.png");
    ImageBuffer::from_pixel(2, 2, Rgb([1u8, 2, 3])).save(&path).unwrap();

    let result = read_image([&path], PixelId::UInt8, None);
    assert!(matches!(
        result,
        Err(ReaderError::Decode {
            source: ImageIoError::NotScalar { found: 3, .. },
            ..
        })
    ));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_mismatched_slice_is_named() {
    let dir = tempfile::tempdir().unwrap();
    let mut files = write_u16_series(dir.path(), 2, 8, 8);
    let odd = dir.path().join("odd.png");
    ImageBuffer::from_pixel(8, 9, image::Luma([0u16]))
        .save(&odd)
        .unwrap();
    files.push(odd.clone());

    let mut reader = ImageSeriesReader::new();
    reader.set_file_names(&files);
    match reader.execute() {
        Err(ReaderError::Decode {
            path,
            source: ImageIoError::InconsistentGeometry { expected, found },
        }) => {
            assert_eq!(path, odd);
            assert_eq!(expected, vec![8, 8]);
            assert_eq!(found, vec![8, 9]);
        }
        other => panic!("expected a geometry error, got {other:?}"),
    }
    assert_eq!(reader.state(), ReaderState::Idle);
}

#[test]
fn test_component_type_mismatch_is_coerced() {
    // a u8 slice in a u16 series is converted, not rejected
    let dir = tempfile::tempdir().unwrap();
    let mut files = write_u16_series(dir.path(), 1, 4, 4);
    let narrow = dir.path().join("narrow.png");
    write_u8_filled(&narrow, 4, 4, 200);
    files.push(narrow);

    let image = read_image(&files, PixelId::Unknown, None).unwrap();
    let volume = image.as_array::<u16>().unwrap();
    assert_eq!(volume[[1, 0, 0]], 200);
}

#[test]
fn test_unreadable_first_file_is_an_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.xyz");
    std::fs::write(&path, b"plain text").unwrap();

    match read_image([&path], PixelId::Unknown, None) {
        Err(ReaderError::IoOpen { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected an open error, got {other:?}"),
    }
}

#[test]
fn test_unknown_image_io_name_is_an_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_u16_series(dir.path(), 1, 2, 2);

    let result = read_image(&files, PixelId::Unknown, Some("GDCMImageIO"));
    match result {
        Err(ReaderError::IoOpen { reason, .. }) => assert!(reason.contains("GDCMImageIO")),
        other => panic!("expected an open error, got {other:?}"),
    }
}

#[test]
fn test_forced_raster_backend_reads_series() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_u16_series(dir.path(), 2, 2, 2);

    let image = read_image(&files, PixelId::Unknown, Some("RasterImageIo")).unwrap();
    assert_eq!(image.size(), &[2, 2, 2]);
}

#[test]
fn test_preview_of_middle_slice() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_u16_series(dir.path(), 3, 10, 6);

    let image = read_image(&files, PixelId::Unknown, None).unwrap();
    let preview = image.slice_preview(1).unwrap();
    assert_eq!(preview.dimensions(), (10, 6));
    assert_eq!(preview.get_pixel(0, 0).0[0], 0);
    assert_eq!(preview.get_pixel(9, 5).0[0], 255);
}
