use mapnik_capi::core::{BoundingBox, Coord, Projection, ViewTransform, Viewport, fix_aspect_ratio};
use mapnik_capi::imaging::ImageFormat;
use proptest::prelude::*;

proptest! {
    #[test]
    fn view_transform_round_trips(
        minx in -1.0e6f64..1.0e6,
        miny in -1.0e6f64..1.0e6,
        w in 1.0f64..1.0e5,
        h in 1.0f64..1.0e5,
        width in 1u32..4096,
        height in 1u32..4096,
        tx in 0.0f64..1.0,
        ty in 0.0f64..1.0,
    ) {
        let extent = BoundingBox::new(minx, miny, minx + w, miny + h);
        let view = ViewTransform::new(Viewport::new(width, height), extent).expect("view");
        let coord = Coord::new(minx + w * tx, miny + h * ty);

        let (px, py) = view.forward(coord);
        prop_assert!((0.0..=f64::from(width) + 1e-6).contains(&px));
        prop_assert!((0.0..=f64::from(height) + 1e-6).contains(&py));

        let back = view.backward(px, py);
        prop_assert!((back.x - coord.x).abs() <= 1e-6 * w.max(1.0));
        prop_assert!((back.y - coord.y).abs() <= 1e-6 * h.max(1.0));
    }

    #[test]
    fn aspect_fix_contains_original_and_matches_viewport(
        minx in -180.0f64..180.0,
        miny in -90.0f64..90.0,
        w in 0.001f64..360.0,
        h in 0.001f64..180.0,
        width in 1u32..2048,
        height in 1u32..2048,
    ) {
        let extent = BoundingBox::new(minx, miny, minx + w, miny + h);
        let fixed = fix_aspect_ratio(extent, Viewport::new(width, height));

        let eps = 1e-9 * (w + h);
        prop_assert!(fixed.minx <= extent.minx + eps && fixed.maxx >= extent.maxx - eps);
        prop_assert!(fixed.miny <= extent.miny + eps && fixed.maxy >= extent.maxy - eps);
        let fixed_ratio = fixed.width() / fixed.height();
        let viewport_ratio = f64::from(width) / f64::from(height);
        prop_assert!((fixed_ratio / viewport_ratio - 1.0).abs() < 1e-5);
    }

    #[test]
    fn mercator_inverse_undoes_forward(lon in -180.0f64..180.0, lat in -85.0f64..85.0) {
        let merc = Projection::new("+init=epsg:3857").expect("merc");
        let back = merc.inverse(merc.forward(Coord::new(lon, lat)));
        prop_assert!((back.x - lon).abs() < 1e-9);
        prop_assert!((back.y - lat).abs() < 1e-9);
    }

    #[test]
    fn jpeg_quality_suffix_is_bounded(quality in 0u32..200) {
        let parsed = ImageFormat::parse(&format!("jpeg{quality}"));
        if (1..=100).contains(&quality) {
            prop_assert_eq!(parsed.expect("valid quality"), ImageFormat::Jpeg { quality: quality as u8 });
        } else {
            prop_assert!(parsed.is_err());
        }
    }
}
