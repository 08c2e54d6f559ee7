use std::ffi::CString;
use std::ptr;

use approx::assert_relative_eq;
use mapnik_capi::core::{
    BoundingBox, Coord, ProjTransform, Projection, ProjectionKind, ViewTransform, Viewport,
    fix_aspect_ratio, scale_denominator,
};
use mapnik_capi::ffi::{
    mapnik_coord_t, mapnik_map, mapnik_map_free, mapnik_map_last_error, mapnik_map_projection,
    mapnik_map_set_srs, mapnik_projection_forward, mapnik_projection_free,
};

const MERC: &str = "+proj=merc +a=6378137 +b=6378137 +lat_ts=0.0 +lon_0=0.0 +x_0=0.0 +y_0=0 +k=1.0 +units=m +nadgrids=@null +wktext +no_defs +over";

#[test]
fn projection_kinds_are_classified() {
    let cases = [
        ("+proj=longlat +ellps=WGS84 +datum=WGS84 +no_defs", ProjectionKind::Geographic),
        ("+init=epsg:4326", ProjectionKind::Geographic),
        ("EPSG:3857", ProjectionKind::WebMercator),
        ("+init=epsg:900913", ProjectionKind::WebMercator),
        (MERC, ProjectionKind::WebMercator),
    ];
    for (srs, kind) in cases {
        assert_eq!(Projection::new(srs).expect(srs).kind(), kind, "{srs}");
    }
}

#[test]
fn unsupported_projection_is_an_error() {
    let err = Projection::new("+proj=lcc +lat_1=33").expect_err("lcc unsupported");
    assert_eq!(
        err.to_string(),
        "failed to initialize projection with: '+proj=lcc +lat_1=33'"
    );
    assert!(Projection::new("").is_err());
}

#[test]
fn mercator_forward_matches_reference_values() {
    let merc = Projection::new(MERC).expect("merc");
    let east = merc.forward(Coord::new(180.0, 0.0));
    assert_relative_eq!(east.x, 20_037_508.342_789_244, epsilon = 1e-6);
    assert_relative_eq!(east.y, 0.0, epsilon = 1e-6);

    let north = merc.forward(Coord::new(0.0, 85.051_128_779_806_59));
    assert_relative_eq!(north.y, 20_037_508.342_789_244, epsilon = 1e-3);
}

#[test]
fn mercator_round_trips_through_inverse() {
    let merc = Projection::new("+init=epsg:3857").expect("merc");
    let lonlat = Coord::new(-73.98, 40.75);
    let back = merc.inverse(merc.forward(lonlat));
    assert_relative_eq!(back.x, lonlat.x, epsilon = 1e-9);
    assert_relative_eq!(back.y, lonlat.y, epsilon = 1e-9);
}

#[test]
fn transform_box_covers_projected_corners() {
    let transform = ProjTransform::new(
        Projection::new("+init=epsg:4326").expect("geo"),
        Projection::new("+init=epsg:3857").expect("merc"),
    );
    assert!(!transform.is_identity());
    let projected = transform
        .forward_box(BoundingBox::new(-10.0, -10.0, 10.0, 10.0))
        .expect("box");
    assert_relative_eq!(projected.maxx, 1_113_194.907_932_735_7, epsilon = 1e-6);
    assert_relative_eq!(projected.minx, -projected.maxx, epsilon = 1e-6);
}

#[test]
fn view_transform_maps_extent_corners_to_pixels() {
    let view = ViewTransform::new(Viewport::new(200, 100), BoundingBox::new(0.0, 0.0, 20.0, 10.0))
        .expect("view");
    assert_eq!(view.forward(Coord::new(0.0, 10.0)), (0.0, 0.0));
    assert_eq!(view.forward(Coord::new(20.0, 0.0)), (200.0, 100.0));
    assert_relative_eq!(view.scale(), 0.1);
    let back = view.backward(50.0, 50.0);
    assert_relative_eq!(back.x, 5.0);
    assert_relative_eq!(back.y, 5.0);
}

#[test]
fn view_transform_rejects_degenerate_inputs() {
    assert!(ViewTransform::new(Viewport::new(0, 10), BoundingBox::new(0.0, 0.0, 1.0, 1.0)).is_err());
    assert!(ViewTransform::new(Viewport::new(10, 10), BoundingBox::new(0.0, 0.0, 0.0, 1.0)).is_err());
}

#[test]
fn scale_denominator_accounts_for_geographic_units() {
    assert_relative_eq!(scale_denominator(0.28, false), 1000.0, epsilon = 1e-9);
    let geographic = scale_denominator(1.0, true);
    assert_relative_eq!(geographic, 111_319.490_793_273_57 / 0.00028, max_relative = 1e-12);
}

#[test]
fn aspect_fix_grows_the_short_axis() {
    let fixed = fix_aspect_ratio(BoundingBox::new(0.0, 0.0, 10.0, 10.0), Viewport::new(100, 50));
    assert_eq!(fixed, BoundingBox::new(-5.0, 0.0, 15.0, 10.0));
    let fixed = fix_aspect_ratio(BoundingBox::new(0.0, 0.0, 10.0, 10.0), Viewport::new(50, 100));
    assert_eq!(fixed, BoundingBox::new(0.0, -5.0, 10.0, 15.0));
}

#[test]
fn map_projection_handle_snapshots_srs() {
    let merc = CString::new(MERC).expect("cstring");
    let geo = CString::new("+init=epsg:4326").expect("cstring");
    unsafe {
        let m = mapnik_map(10, 10);
        assert_eq!(mapnik_map_set_srs(m, merc.as_ptr()), 0);
        let p = mapnik_map_projection(m);
        assert!(!p.is_null());

        assert_eq!(mapnik_map_set_srs(m, geo.as_ptr()), 0);
        let out = mapnik_projection_forward(p, mapnik_coord_t { x: 180.0, y: 0.0 });
        assert_relative_eq!(out.x, 20_037_508.342_789_244, epsilon = 1e-6);

        mapnik_projection_free(p);
        mapnik_map_free(m);
    }
}

#[test]
fn projection_handle_edge_cases() {
    let bogus = CString::new("+proj=bogus").expect("cstring");
    unsafe {
        let identity = mapnik_map_projection(ptr::null_mut());
        assert!(!identity.is_null());
        let c = mapnik_coord_t { x: 1.5, y: -2.5 };
        assert_eq!(mapnik_projection_forward(identity, c), c);
        assert_eq!(mapnik_projection_forward(ptr::null_mut(), c), c);
        mapnik_projection_free(identity);

        let m = mapnik_map(10, 10);
        mapnik_map_set_srs(m, bogus.as_ptr());
        assert!(mapnik_map_projection(m).is_null());
        assert!(!mapnik_map_last_error(m).is_null());
        mapnik_map_free(m);
    }
}
