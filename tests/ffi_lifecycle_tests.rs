use std::ffi::{CStr, CString};
use std::ptr;

use mapnik_capi::ffi::{
    MAPNIK_DEBUG, MAPNIK_ERROR, MAPNIK_FAILURE, MAPNIK_NONE, MAPNIK_OK, MAPNIK_WARN, mapnik_bbox,
    mapnik_bbox_free, mapnik_free_string, mapnik_image_blob_free, mapnik_image_free,
    mapnik_logging_set_severity, mapnik_map, mapnik_map_free, mapnik_map_get_buffer_size,
    mapnik_map_get_srs, mapnik_map_height, mapnik_map_last_error, mapnik_map_layer_count,
    mapnik_map_resize, mapnik_map_set_buffer_size, mapnik_map_set_srs, mapnik_map_width,
    mapnik_projection_free, mapnik_version_string,
};
use mapnik_capi::logger::{Severity, severity};

#[test]
fn map_handle_round_trips_basic_properties() {
    unsafe {
        let m = mapnik_map(256, 128);
        assert!(!m.is_null());
        assert_eq!(mapnik_map_width(m), 256);
        assert_eq!(mapnik_map_height(m), 128);
        assert_eq!(mapnik_map_layer_count(m), 0);
        assert!(mapnik_map_last_error(m).is_null());

        mapnik_map_resize(m, 64, 32);
        assert_eq!(mapnik_map_width(m), 64);
        assert_eq!(mapnik_map_height(m), 32);

        mapnik_map_set_buffer_size(m, 16);
        assert_eq!(mapnik_map_get_buffer_size(m), 16);

        mapnik_map_free(m);
    }
}

#[test]
fn new_map_defaults_to_geographic_srs() {
    unsafe {
        let m = mapnik_map(10, 10);
        let srs = CStr::from_ptr(mapnik_map_get_srs(m));
        assert_eq!(
            srs.to_str().expect("utf8 srs"),
            "+proj=longlat +ellps=WGS84 +datum=WGS84 +no_defs"
        );
        mapnik_map_free(m);
    }
}

#[test]
fn set_srs_is_visible_through_get_srs() {
    let merc = CString::new("+init=epsg:3857").expect("cstring");
    unsafe {
        let m = mapnik_map(10, 10);
        assert_eq!(mapnik_map_set_srs(m, merc.as_ptr()), MAPNIK_OK);
        let srs = CStr::from_ptr(mapnik_map_get_srs(m));
        assert_eq!(srs.to_str().expect("utf8 srs"), "+init=epsg:3857");

        assert_eq!(mapnik_map_set_srs(m, ptr::null()), MAPNIK_FAILURE);
        assert_eq!(mapnik_map_set_srs(ptr::null_mut(), merc.as_ptr()), MAPNIK_FAILURE);
        mapnik_map_free(m);
    }
}

#[test]
fn get_srs_pointer_is_stable_until_srs_changes() {
    unsafe {
        let m = mapnik_map(10, 10);
        let first = mapnik_map_get_srs(m);
        let second = mapnik_map_get_srs(m);
        assert_eq!(first, second);
        mapnik_map_free(m);
    }
}

#[test]
fn free_functions_accept_null() {
    unsafe {
        mapnik_map_free(ptr::null_mut());
        mapnik_bbox_free(ptr::null_mut());
        mapnik_image_free(ptr::null_mut());
        mapnik_image_blob_free(ptr::null_mut());
        mapnik_projection_free(ptr::null_mut());
        mapnik_free_string(ptr::null_mut());
    }
}

#[test]
fn accessors_tolerate_null_map() {
    unsafe {
        assert_eq!(mapnik_map_width(ptr::null_mut()), 0);
        assert_eq!(mapnik_map_height(ptr::null_mut()), 0);
        assert_eq!(mapnik_map_layer_count(ptr::null_mut()), MAPNIK_FAILURE);
        assert!(mapnik_map_get_srs(ptr::null_mut()).is_null());
        assert!(mapnik_map_last_error(ptr::null_mut()).is_null());
        mapnik_map_resize(ptr::null_mut(), 10, 10);
        mapnik_map_set_buffer_size(ptr::null_mut(), 4);
    }
}

#[test]
fn bbox_handle_can_be_created_and_freed() {
    unsafe {
        let b = mapnik_bbox(-180.0, -85.0, 180.0, 85.0);
        assert!(!b.is_null());
        assert_eq!((*b).bbox().maxx, 180.0);
        mapnik_bbox_free(b);
    }
}

#[test]
fn version_string_matches_crate_version() {
    let version = unsafe { CStr::from_ptr(mapnik_version_string()) };
    assert_eq!(version.to_str().expect("utf8 version"), mapnik_capi::VERSION);
}

#[test]
fn logging_severity_accepts_known_levels_and_silences_unknown() {
    mapnik_logging_set_severity(MAPNIK_DEBUG);
    assert_eq!(severity(), Severity::Debug);
    mapnik_logging_set_severity(MAPNIK_ERROR);
    assert_eq!(severity(), Severity::Error);
    mapnik_logging_set_severity(MAPNIK_NONE);
    assert_eq!(severity(), Severity::None);
    mapnik_logging_set_severity(42);
    assert_eq!(severity(), Severity::None);
    mapnik_logging_set_severity(MAPNIK_WARN);
    assert_eq!(severity(), Severity::Warn);
}
