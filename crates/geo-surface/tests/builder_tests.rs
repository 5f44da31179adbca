//! End-to-end tests for SurfaceImageBuilder.

use geo_surface::{
    grayscale, render_points, SurfaceConfig, SurfaceError, SurfaceImageBuilder, ValueScale,
};
use test_utils::{assert_approx_eq, planar_points, radial_points, scratch_path, scratch_dir};

/// Route library logs through the test harness. Set `RUST_LOG=debug` to see them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn corner_builder() -> SurfaceImageBuilder {
    // Grid 0..2 x 0..2 at 0.25 covers exactly the lattice's hull.
    let mut b = SurfaceImageBuilder::new((0.0, 2.0), (0.0, 2.0), 0.25).unwrap();
    let sample = planar_points((0.0, 2.0), (0.0, 2.0), 5, (0.1, 0.2, 0.15));
    b.set_points(&sample.points, &sample.values).unwrap();
    b
}

#[test]
fn test_grid_dimensions() {
    let b = SurfaceImageBuilder::new((0.0, 10.0), (0.0, 10.0), 1.0).unwrap();
    assert_eq!(b.grid().rows(), 11);
    assert_eq!(b.grid().cols(), 11);
}

#[test]
fn test_invalid_construction() {
    for (lat, lon, res) in [
        ((0.0, 1e9), (0.0, 1e9), 1e-9),
        ((0.0, 10.0), (0.0, 10.0), 0.0),
        ((0.0, 10.0), (0.0, 10.0), f64::NAN),
        ((10.0, 0.0), (0.0, 10.0), 1.0),
    ] {
        let err = SurfaceImageBuilder::new(lat, lon, res).unwrap_err();
        assert!(matches!(err, SurfaceError::InvalidArgument { .. }));
    }
}

#[test]
fn test_set_points_skips_nan() {
    let mut b = SurfaceImageBuilder::new((0.0, 2.0), (0.0, 2.0), 1.0).unwrap();
    b.set_points(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)], &[1.0, f64::NAN, 3.0])
        .unwrap();
    assert_eq!(b.points().len(), 2);
    assert_eq!(b.points().values(), &[1.0, 3.0]);
}

#[test]
fn test_set_points_length_mismatch() {
    let mut b = SurfaceImageBuilder::new((0.0, 2.0), (0.0, 2.0), 1.0).unwrap();
    let err = b.set_points(&[(0.0, 0.0)], &[1.0, 2.0]).unwrap_err();
    assert!(matches!(err, SurfaceError::InvalidArgument { .. }));
}

#[test]
fn test_boundary_points_from_single_point() {
    let mut b = SurfaceImageBuilder::new((0.0, 4.0), (0.0, 4.0), 0.5).unwrap();
    b.set_points(&[(2.0, 2.0)], &[0.42]).unwrap();

    let added = b.add_boundary_points(6).unwrap();
    assert_eq!(added, 4 * 6 - 4);
    assert_eq!(b.points().len(), 1 + added);
    assert!(b.points().values().iter().all(|&v| v == 0.42));
    assert_eq!(b.points().boundary_count(), added);
}

#[test]
fn test_boundary_counts() {
    let mut b = SurfaceImageBuilder::new((0.0, 4.0), (0.0, 4.0), 0.5).unwrap();
    b.set_points(&[(2.0, 2.0)], &[0.5]).unwrap();
    assert_eq!(b.add_boundary_points(0).unwrap(), 0);
    assert_eq!(b.add_boundary_points(1).unwrap(), 2);
    assert_eq!(b.add_boundary_points(2).unwrap(), 4);
    assert_eq!(b.points().len(), 7);
}

#[test]
fn test_boundary_requires_points() {
    let mut b = SurfaceImageBuilder::new((0.0, 4.0), (0.0, 4.0), 0.5).unwrap();
    let err = b.add_boundary_points(5).unwrap_err();
    assert!(matches!(err, SurfaceError::InsufficientData { .. }));

    b.set_points(&[(1.0, 1.0)], &[f64::NAN]).unwrap();
    assert!(b.add_boundary_points(5).is_err());
}

#[test]
fn test_remove_boundary_points_restores_measured() {
    let mut b = corner_builder();
    let measured = b.points().clone();
    let added = b.add_boundary_points(4).unwrap();
    b.generate_image(true).unwrap();

    assert_eq!(b.remove_boundary_points(), added);
    assert_eq!(b.points(), &measured);
    assert!(b.raster().is_none());
    assert_eq!(b.remove_boundary_points(), 0);
}

#[test]
fn test_covered_grid_has_no_nan() {
    let mut b = corner_builder();
    b.generate_image(false).unwrap();

    let surface = b.surface().unwrap();
    assert_eq!(surface.nan_count(), 0);
    // Linear data is reproduced cell by cell (unflipped: row 0 = lat_min).
    for r in 0..surface.rows() {
        for c in 0..surface.cols() {
            let lat = r as f64 * 0.25;
            let lon = c as f64 * 0.25;
            assert_approx_eq!(surface.get(r, c).unwrap(), 0.1 + 0.2 * lat + 0.15 * lon, 1e-3);
        }
    }
}

#[test]
fn test_boundary_points_fill_uncovered_corners() {
    init_tracing();
    let mut b = SurfaceImageBuilder::new((0.0, 2.0), (0.0, 2.0), 0.25).unwrap();
    let sample = radial_points((1.0, 1.0), 0.6, 2, 8);
    b.set_points(&sample.points, &sample.values).unwrap();

    b.generate_image(true).unwrap();
    let before = b.surface().unwrap().nan_count();
    assert!(before > 0);
    // Corners of the image are transparent black before augmentation.
    assert_eq!(b.raster().unwrap().pixel(0, 0), Some([0, 0, 0, 0]));

    b.add_boundary_points(9).unwrap();
    b.generate_image(true).unwrap();
    assert_eq!(b.surface().unwrap().nan_count(), 0);
    assert_eq!(b.raster().unwrap().pixel(0, 0).unwrap()[3], 255);
}

#[test]
fn test_flip_y_puts_max_latitude_first() {
    let mut b = corner_builder();
    b.generate_image(true).unwrap();
    let flipped = b.surface().unwrap().clone();
    b.generate_image(false).unwrap();
    let plain = b.surface().unwrap().clone();

    let rows = plain.rows();
    for r in 0..rows {
        for c in 0..plain.cols() {
            assert_eq!(flipped.get(r, c), plain.get(rows - 1 - r, c));
        }
    }
    // Values grow with latitude.
    assert!(flipped.get(0, 0).unwrap() > flipped.get(rows - 1, 0).unwrap());
}

#[test]
fn test_fitted_values_take_lon_lat() {
    let mut b = SurfaceImageBuilder::new((0.0, 10.0), (20.0, 30.0), 1.0).unwrap();
    let points = [(0.0, 20.0), (10.0, 20.0), (0.0, 30.0), (10.0, 30.0), (4.0, 27.0)];
    let values = [0.1, 0.2, 0.3, 0.4, 0.9];
    b.set_points(&points, &values).unwrap();

    let queries: Vec<(f64, f64)> = points.iter().map(|&(lat, lon)| (lon, lat)).collect();
    let fitted = b.get_fitted_values(&queries).unwrap();
    for (got, want) in fitted.iter().zip(&values) {
        assert_approx_eq!(*got, *want, 1e-9);
    }

    // (lat, lon) order would fall outside the hull.
    let wrong = b.get_fitted_values(&[(4.0, 27.0)]).unwrap();
    assert!(wrong[0].is_nan());
    assert!(b.raster().is_none());
}

#[test]
fn test_degenerate_points_fail() {
    let mut b = SurfaceImageBuilder::new((0.0, 2.0), (0.0, 2.0), 0.5).unwrap();
    b.set_points(&[(0.0, 0.0), (1.0, 1.0)], &[0.1, 0.2]).unwrap();
    assert!(matches!(
        b.generate_image(true).unwrap_err(),
        SurfaceError::InsufficientData { .. }
    ));
    assert!(matches!(
        b.get_fitted_values(&[(0.5, 0.5)]).unwrap_err(),
        SurfaceError::InsufficientData { .. }
    ));

    b.set_points(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)], &[0.1, 0.2, 0.3])
        .unwrap();
    assert!(b.generate_image(true).is_err());
    assert!(b.raster().is_none());
}

#[test]
fn test_generation_is_bit_identical() {
    init_tracing();
    let mut b = SurfaceImageBuilder::new((0.0, 3.0), (0.0, 5.0), 0.1).unwrap();
    let sample = test_utils::scattered_points((0.0, 3.0), (0.0, 5.0), 80, 21);
    b.set_points(&sample.points, &sample.values).unwrap();
    b.add_boundary_points(10).unwrap();

    b.generate_image(true).unwrap();
    let first_raster = b.raster().unwrap().clone();
    let first_bits: Vec<u64> = b.surface().unwrap().values().iter().map(|v| v.to_bits()).collect();

    b.generate_image(true).unwrap();
    let second_bits: Vec<u64> = b.surface().unwrap().values().iter().map(|v| v.to_bits()).collect();
    assert_eq!(&first_raster, b.raster().unwrap());
    assert_eq!(first_bits, second_bits);
}

#[test]
fn test_color_map_and_value_scale() {
    let mut b = SurfaceImageBuilder::new((0.0, 1.0), (0.0, 1.0), 0.5).unwrap();
    b.set_points(
        &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)],
        &[10.0, 10.0, 10.0, 10.0],
    )
    .unwrap();
    b.set_color_map(Box::new(grayscale()));
    assert_eq!(b.color_map().name(), "grayscale");

    // Unscaled values above 1 hit the over color.
    b.generate_image(true).unwrap();
    assert_eq!(b.raster().unwrap().pixel(1, 1), Some([255, 255, 255, 255]));

    b.set_value_scale(ValueScale::range(10.0, 20.0).unwrap()).unwrap();
    b.generate_image(true).unwrap();
    assert_eq!(b.raster().unwrap().pixel(1, 1), Some([0, 0, 0, 255]));
}

#[test]
fn test_empty_value_range_rejected() {
    let mut b = corner_builder();
    let err = b
        .set_value_scale(ValueScale::Range { min: 0.5, max: 0.5 })
        .unwrap_err();
    assert!(matches!(err, SurfaceError::InvalidArgument { .. }));
    assert!(b
        .set_value_scale(ValueScale::Range { min: 1.0, max: f64::NAN })
        .is_err());
    assert_eq!(b.value_scale(), ValueScale::Identity);
}

#[test]
fn test_save_before_generate() {
    let dir = scratch_dir();
    let b = corner_builder();
    let err = b.save_image(dir.path().join("out.png")).unwrap_err();
    assert!(matches!(err, SurfaceError::NoImageGenerated));
    assert!(matches!(b.encode_png().unwrap_err(), SurfaceError::NoImageGenerated));
}

#[test]
fn test_save_creates_dirs_and_matches_grid() {
    let dir = scratch_dir();
    let path = scratch_path(&dir, "nested/deeper/surface.png");

    let mut b = SurfaceImageBuilder::new((0.0, 2.0), (0.0, 3.0), 0.25).unwrap();
    let sample = planar_points((0.0, 2.0), (0.0, 3.0), 4, (0.0, 0.3, 0.1));
    b.set_points(&sample.points, &sample.values).unwrap();
    b.generate_image(true).unwrap();
    b.save_image(&path).unwrap();

    let img = image::open(&path).unwrap();
    assert_eq!(img.width() as usize, b.grid().cols());
    assert_eq!(img.height() as usize, b.grid().rows());
    assert_eq!(img.color(), image::ColorType::Rgb8);
}

#[test]
fn test_save_under_regular_file_is_io_error() {
    let dir = scratch_dir();
    let blocker = scratch_path(&dir, "not-a-dir");
    std::fs::write(&blocker, b"occupied").unwrap();

    let mut b = corner_builder();
    b.generate_image(true).unwrap();
    let err = b.save_image(blocker.join("out.png")).unwrap_err();
    assert!(matches!(err, SurfaceError::Io(_)), "{:?}", err);
}

#[test]
fn test_save_rejects_unknown_extension() {
    let dir = scratch_dir();
    let mut b = corner_builder();
    b.generate_image(true).unwrap();
    let err = b.save_image(dir.path().join("surface.notaformat")).unwrap_err();
    assert!(matches!(err, SurfaceError::Encode(_)));
}

#[test]
fn test_encode_png_round_trip_dimensions() {
    let mut b = corner_builder();
    b.generate_image(true).unwrap();
    let bytes = b.encode_png().unwrap();
    let img = image::load_from_memory(&bytes).unwrap();
    assert_eq!(img.width() as usize, b.grid().cols());
    assert_eq!(img.height() as usize, b.grid().rows());
}

#[test]
fn test_render_points_from_config() {
    let config = SurfaceConfig {
        lat_range: (0.0, 2.0),
        lon_range: (0.0, 2.0),
        resolution: 0.25,
        boundary_points_per_side: Some(5),
        color_map: "viridis".to_string(),
        value_range: Some((0.0, 10.0)),
        flip_y: true,
    };
    let sample = radial_points((1.0, 1.0), 0.5, 2, 6);
    let values: Vec<f64> = sample.values.iter().map(|v| v * 10.0).collect();

    let b = render_points(&config, &sample.points, &values).unwrap();
    assert_eq!(b.color_map().name(), "viridis");
    assert_eq!(b.points().boundary_count(), 16);
    assert_eq!(b.surface().unwrap().nan_count(), 0);
    assert_eq!(b.value_scale(), ValueScale::Range { min: 0.0, max: 10.0 });
}

#[test]
fn test_from_config_rejects_invalid() {
    let config = SurfaceConfig {
        color_map: "no-such-map".to_string(),
        ..Default::default()
    };
    assert!(SurfaceImageBuilder::from_config(&config).is_err());
}
