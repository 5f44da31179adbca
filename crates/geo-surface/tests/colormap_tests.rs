//! Tests for color maps.

use geo_surface::colormap::hex_to_rgba;
use geo_surface::{
    cividis, colormap_by_name, grayscale, viridis, ColorMap, FnColorMap, Gradient, Rgba,
    SurfaceError,
};

#[test]
fn test_endpoints_match_stops() {
    let cmap = cividis();
    assert_eq!(cmap.map(0.0), hex_to_rgba("#00224e").unwrap());
    assert_eq!(cmap.map(1.0), hex_to_rgba("#fee838").unwrap());

    let cmap = viridis();
    assert_eq!(cmap.map(0.0), hex_to_rgba("#440154").unwrap());
    assert_eq!(cmap.map(1.0), hex_to_rgba("#fde725").unwrap());
}

#[test]
fn test_under_over_and_bad() {
    let cmap = cividis();
    assert_eq!(cmap.map(-0.5), cmap.map(0.0));
    assert_eq!(cmap.map(7.0), cmap.map(1.0));
    assert_eq!(cmap.map(f64::NAN), Rgba::transparent());
    assert_eq!(cmap.map(f64::NAN).to_u8(), [0, 0, 0, 0]);
}

#[test]
fn test_custom_under_over_bad() {
    let red = Rgba::opaque(1.0, 0.0, 0.0);
    let blue = Rgba::opaque(0.0, 0.0, 1.0);
    let white = Rgba::opaque(1.0, 1.0, 1.0);
    let cmap = grayscale().with_under(red).with_over(blue).with_bad(white);
    assert_eq!(cmap.map(-0.01), red);
    assert_eq!(cmap.map(1.01), blue);
    assert_eq!(cmap.map(f64::NAN), white);
}

#[test]
fn test_grayscale_midpoint_truncates() {
    let px = grayscale().map(0.5).to_u8();
    assert_eq!(px, [127, 127, 127, 255]);
    assert_eq!(grayscale().map(1.0).to_u8(), [255, 255, 255, 255]);
}

#[test]
fn test_gradient_is_monotonic_for_grayscale() {
    let cmap = grayscale();
    let mut last = -1.0;
    for i in 0..=100 {
        let c = cmap.map(i as f64 / 100.0);
        assert!(c.r >= last);
        last = c.r;
    }
}

#[test]
fn test_explicit_stops_are_sorted() {
    let cmap = Gradient::new(
        "two-tone",
        vec![
            (1.0, Rgba::opaque(1.0, 1.0, 1.0)),
            (0.0, Rgba::opaque(0.0, 0.0, 0.0)),
        ],
    )
    .unwrap();
    assert_eq!(cmap.map(0.0), Rgba::opaque(0.0, 0.0, 0.0));
    assert_eq!(cmap.map(0.25).r, 0.25);
}

#[test]
fn test_gradient_needs_two_stops() {
    let err = Gradient::from_hex("one", &["#ffffff"]).unwrap_err();
    assert!(matches!(err, SurfaceError::InvalidArgument { .. }));
    assert!(Gradient::from_hex("bad", &["#ffffff", "nothex"]).is_err());
}

#[test]
fn test_lookup_by_name() {
    assert_eq!(colormap_by_name("cividis").unwrap().name(), "cividis");
    assert_eq!(colormap_by_name("VIRIDIS").unwrap().name(), "viridis");
    assert_eq!(colormap_by_name("Gray").unwrap().name(), "grayscale");
    let err = colormap_by_name("jet").err().unwrap();
    assert!(matches!(err, SurfaceError::InvalidArgument { .. }));
}

#[test]
fn test_closure_color_map() {
    let cmap = FnColorMap::new("red-ramp", |v: f64| Rgba::opaque(v, 0.0, 0.0));
    assert_eq!(cmap.name(), "red-ramp");
    assert_eq!(cmap.map(1.0).to_u8(), [255, 0, 0, 255]);
}
