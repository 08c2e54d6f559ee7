use mapnik_capi::core::BoundingBox;
use mapnik_capi::datasource::{Parameters, create};
use mapnik_capi::map::{Layer, Map};
use mapnik_capi::render::{
    Color, DrawCommand, NullRenderer, RenderRequest, Renderer, build_frame, render_to_image,
};
use mapnik_capi::style::{
    LineSymbolizer, MarkersSymbolizer, PolygonSymbolizer, Rule, Style, Symbolizer,
};

const FEATURES: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type":"Feature","properties":{},"geometry":{"type":"Polygon","coordinates":[[[0,0],[4,0],[4,4],[0,4],[0,0]]]}},
    {"type":"Feature","properties":{},"geometry":{"type":"LineString","coordinates":[[5,5],[9,9]]}},
    {"type":"Feature","properties":{},"geometry":{"type":"MultiPoint","coordinates":[[1,8],[2,8]]}}
  ]
}"#;

fn rule(symbolizer: Symbolizer) -> Rule {
    let mut rule = Rule::default();
    rule.symbolizers.push(symbolizer);
    rule
}

fn sample_map() -> Map {
    let mut map = Map::new(100, 100);
    map.insert_style(
        "all",
        Style {
            rules: vec![
                rule(Symbolizer::Polygon(PolygonSymbolizer::default())),
                rule(Symbolizer::Line(LineSymbolizer::default())),
                rule(Symbolizer::Markers(MarkersSymbolizer::default())),
            ],
        },
    );
    let datasource = create(
        &Parameters::new()
            .with("type", "geojson")
            .with("inline", FEATURES),
    )
    .expect("inline geojson");
    map.add_layer(Layer::new("features").with_style("all").with_datasource(datasource));
    map.zoom_to_box(BoundingBox::new(0.0, 0.0, 10.0, 10.0));
    map
}

fn counts(map: &Map, request: RenderRequest) -> (usize, usize, usize) {
    let frame = build_frame(map, request).expect("frame");
    let mut renderer = NullRenderer::default();
    renderer.render(&frame).expect("null render");
    (
        renderer.last_fill_count,
        renderer.last_stroke_count,
        renderer.last_marker_count,
    )
}

#[test]
fn symbolizers_emit_commands_per_geometry_type() {
    let map = sample_map();
    // Polygon: one fill, one closed outline and one envelope marker.
    // Line: one stroke and one envelope marker. MultiPoint: two markers.
    assert_eq!(counts(&map, RenderRequest::default()), (1, 2, 4));
}

#[test]
fn frame_carries_map_background() {
    let mut map = sample_map();
    map.set_background(Some(Color::rgb(1.0, 1.0, 1.0)));
    let frame = build_frame(&map, RenderRequest::default()).expect("frame");
    assert_eq!(frame.background, Some(Color::rgb(1.0, 1.0, 1.0)));
    assert_eq!(frame.viewport.width, 100);
}

#[test]
fn scale_factor_multiplies_symbol_sizes() {
    let map = sample_map();
    let request = RenderRequest {
        scale: None,
        scale_factor: 2.0,
    };
    let frame = build_frame(&map, request).expect("frame");

    let stroke = frame
        .commands
        .iter()
        .find_map(|command| match command {
            DrawCommand::Stroke(stroke) => Some(stroke),
            _ => None,
        })
        .expect("stroke command");
    assert_eq!(stroke.width, 2.0);

    let marker = frame
        .commands
        .iter()
        .find_map(|command| match command {
            DrawCommand::Marker(marker) => Some(marker),
            _ => None,
        })
        .expect("marker command");
    assert_eq!(marker.width, 20.0);
}

#[test]
fn scale_zooms_about_extent_center() {
    let map = sample_map();
    let frame = build_frame(&map, RenderRequest::from_abi(2.0, 1.0)).expect("frame");
    let fill = frame
        .commands
        .iter()
        .find_map(|command| match command {
            DrawCommand::Fill(fill) => Some(fill),
            _ => None,
        })
        .expect("fill command");
    // Extent 2.5..7.5 over 100 px: map x = 0 lands 50 px left of the image.
    assert!(fill.rings[0].iter().any(|point| (point.x + 50.0).abs() < 1e-9));
}

#[test]
fn inactive_and_out_of_scale_layers_are_skipped() {
    let mut map = sample_map();
    let datasource = map.layers()[0].datasource().cloned().expect("datasource");
    map.add_layer(
        Layer::new("hidden")
            .with_style("all")
            .with_datasource(datasource.clone())
            .with_active(false),
    );
    map.add_layer(
        Layer::new("zoomed-in only")
            .with_style("all")
            .with_datasource(datasource)
            .with_scale_range(0.0, 10.0),
    );
    assert_eq!(counts(&map, RenderRequest::default()), (1, 2, 4));
}

#[test]
fn missing_style_is_skipped() {
    let mut map = sample_map();
    let datasource = map.layers()[0].datasource().cloned().expect("datasource");
    map.add_layer(
        Layer::new("orphan")
            .with_style("nope")
            .with_datasource(datasource),
    );
    assert_eq!(counts(&map, RenderRequest::default()), (1, 2, 4));
}

#[test]
fn map_without_extent_yields_background_only() {
    let mut map = Map::new(10, 10);
    map.add_layer(Layer::new("empty"));
    let frame = build_frame(&map, RenderRequest::default()).expect("frame");
    assert!(frame.is_empty());
}

#[test]
fn zero_sized_map_cannot_render() {
    let map = Map::new(0, 10);
    let err = render_to_image(&map, RenderRequest::default()).expect_err("empty viewport");
    assert_eq!(err.to_string(), "invalid map size: width=0, height=10");
}

#[test]
fn unsupported_map_srs_fails_when_layers_exist() {
    let mut map = sample_map();
    map.set_srs("+proj=bogus");
    assert!(build_frame(&map, RenderRequest::default()).is_err());
}

#[test]
fn rendered_image_matches_map_size() {
    let map = sample_map();
    let image = render_to_image(&map, RenderRequest::default()).expect("image");
    assert_eq!((image.width(), image.height()), (100, 100));
    assert_eq!(image.data().len(), 100 * 100 * 4);
    // The polygon's interior is filled with the default gray.
    assert_eq!(image.pixel(5, 95), Some([128, 128, 128, 255]));
}
