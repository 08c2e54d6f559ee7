use std::ffi::{CStr, CString};
use std::ptr;

use mapnik_capi::datasource::{Parameters, create};
use mapnik_capi::ffi::{
    MAPNIK_FAILURE, MAPNIK_OK, mapnik_map, mapnik_map_free, mapnik_map_layer_parameter,
    mapnik_map_load, mapnik_map_set_max_connections, mapnik_map_t,
};
use mapnik_capi::map::{Layer, Map};

fn fixture_map() -> *mut mapnik_map_t {
    let path = CString::new(format!("{}/tests/data/map.xml", env!("CARGO_MANIFEST_DIR")))
        .expect("cstring");
    unsafe {
        let m = mapnik_map(64, 64);
        assert_eq!(mapnik_map_load(m, path.as_ptr()), MAPNIK_OK);
        m
    }
}

fn parameter(m: *mut mapnik_map_t, layer: i32, key: &str) -> Option<String> {
    let key = CString::new(key).expect("cstring");
    let value = unsafe { mapnik_map_layer_parameter(m, layer, key.as_ptr()) };
    if value.is_null() {
        return None;
    }
    Some(
        unsafe { CStr::from_ptr(value) }
            .to_str()
            .expect("utf8 value")
            .to_owned(),
    )
}

#[test]
fn hint_adds_headroom_to_layers_without_explicit_size() {
    let m = fixture_map();
    assert_eq!(parameter(m, 0, "max_size"), None);

    assert_eq!(unsafe { mapnik_map_set_max_connections(m, 4) }, MAPNIK_OK);
    assert_eq!(parameter(m, 0, "max_size").as_deref(), Some("6"));
    unsafe { mapnik_map_free(m) };
}

#[test]
fn explicit_max_size_is_kept() {
    let m = fixture_map();
    assert_eq!(unsafe { mapnik_map_set_max_connections(m, 16) }, MAPNIK_OK);
    assert_eq!(parameter(m, 1, "max_size").as_deref(), Some("3"));
    unsafe { mapnik_map_free(m) };
}

#[test]
fn negative_hint_clamps_to_headroom() {
    let m = fixture_map();
    assert_eq!(unsafe { mapnik_map_set_max_connections(m, -5) }, MAPNIK_OK);
    assert_eq!(parameter(m, 0, "max_size").as_deref(), Some("2"));
    unsafe { mapnik_map_free(m) };
}

#[test]
fn recreated_datasource_keeps_other_parameters() {
    let m = fixture_map();
    assert_eq!(unsafe { mapnik_map_set_max_connections(m, 1) }, MAPNIK_OK);
    assert_eq!(parameter(m, 0, "type").as_deref(), Some("geojson"));
    assert_eq!(parameter(m, 0, "file").as_deref(), Some("parks.geojson"));
    assert_eq!(parameter(m, 1, "type").as_deref(), Some("csv"));
    assert!(parameter(m, 0, "base").is_some());
    unsafe { mapnik_map_free(m) };
}

#[test]
fn empty_map_accepts_any_hint() {
    unsafe {
        let m = mapnik_map(8, 8);
        assert_eq!(mapnik_map_set_max_connections(m, 8), MAPNIK_OK);
        mapnik_map_free(m);
    }
}

#[test]
fn null_map_reports_failure() {
    assert_eq!(
        unsafe { mapnik_map_set_max_connections(ptr::null_mut(), 4) },
        MAPNIK_FAILURE
    );
}

#[test]
fn layer_parameter_misses_return_null() {
    let m = fixture_map();
    assert_eq!(parameter(m, 0, "no-such-key"), None);
    assert_eq!(parameter(m, 7, "type"), None);
    assert_eq!(parameter(m, -1, "type"), None);
    assert_eq!(parameter(ptr::null_mut(), 0, "type"), None);
    unsafe { mapnik_map_free(m) };
}

#[test]
fn failed_recreation_leaves_every_layer_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("points.csv");
    std::fs::write(&csv_path, "name,x,y\nfountain,1,1\n").expect("write csv");

    let inline = create(
        &Parameters::new()
            .with("type", "geojson")
            .with("inline", r#"{"type":"Point","coordinates":[0,0]}"#),
    )
    .expect("inline geojson");
    let points = create(
        &Parameters::new()
            .with("type", "csv")
            .with("file", csv_path.to_string_lossy()),
    )
    .expect("csv file");

    let mut map = Map::new(16, 16);
    map.add_layer(Layer::new("inline").with_datasource(inline));
    map.add_layer(Layer::new("points").with_datasource(points));
    std::fs::remove_file(&csv_path).expect("remove csv");

    assert!(map.set_max_connections(4).is_err());
    for layer in map.layers() {
        let datasource = layer.datasource().expect("datasource");
        assert_eq!(datasource.params().get("max_size"), None, "{}", layer.name());
        assert_eq!(datasource.pool().max_size, 10);
    }
}
