use criterion::{Criterion, criterion_group, criterion_main};
use mapnik_capi::core::{BoundingBox, Viewport};
use mapnik_capi::datasource::{Parameters, create};
use mapnik_capi::imaging::{ImageFormat, encode};
use mapnik_capi::map::{Layer, Map};
use mapnik_capi::render::{
    Color, DrawCommand, FillPrimitive, PixelPoint, RasterRenderer, RenderFrame, RenderRequest,
    Renderer, render_to_image,
};
use mapnik_capi::style::{LineSymbolizer, PolygonSymbolizer, Rule, Style, Symbolizer};
use std::fmt::Write as _;
use std::hint::black_box;

fn grid_geojson(cells: usize) -> String {
    let mut features = String::new();
    for i in 0..cells {
        for j in 0..cells {
            let (x, y) = (i as f64, j as f64);
            if !features.is_empty() {
                features.push(',');
            }
            write!(
                features,
                r#"{{"type":"Feature","properties":{{}},"geometry":{{"type":"Polygon","coordinates":[[[{x},{y}],[{x1},{y}],[{x1},{y1}],[{x},{y1}],[{x},{y}]]]}}}}"#,
                x1 = x + 0.8,
                y1 = y + 0.8,
            )
            .expect("write to string");
        }
    }
    format!(r#"{{"type":"FeatureCollection","features":[{features}]}}"#)
}

fn grid_map(cells: usize) -> Map {
    let mut map = Map::new(512, 512);
    map.set_background(Some(Color::rgb(1.0, 1.0, 1.0)));

    let mut rule = Rule::default();
    rule.symbolizers
        .push(Symbolizer::Polygon(PolygonSymbolizer::default()));
    rule.symbolizers
        .push(Symbolizer::Line(LineSymbolizer::default()));
    map.insert_style("grid", Style { rules: vec![rule] });

    let datasource = create(
        &Parameters::new()
            .with("type", "geojson")
            .with("inline", grid_geojson(cells)),
    )
    .expect("inline datasource");
    map.add_layer(Layer::new("grid").with_style("grid").with_datasource(datasource));
    map.zoom_to_box(BoundingBox::new(0.0, 0.0, cells as f64, cells as f64));
    map
}

fn bench_render_grid_32(c: &mut Criterion) {
    let map = grid_map(32);
    c.bench_function("render_grid_32x32", |b| {
        b.iter(|| {
            let _ = render_to_image(black_box(&map), RenderRequest::default())
                .expect("render should succeed");
        })
    });
}

fn bench_rasterize_star(c: &mut Criterion) {
    let points: Vec<PixelPoint> = (0..64_u32)
        .map(|i| {
            let angle = std::f64::consts::TAU * f64::from(i) / 64.0;
            let radius = if i % 2 == 0 { 240.0 } else { 90.0 };
            PixelPoint::new(256.0 + radius * angle.cos(), 256.0 + radius * angle.sin())
        })
        .collect();
    let frame = RenderFrame::new(Viewport::new(512, 512)).with_command(DrawCommand::Fill(
        FillPrimitive::new(vec![points], Color::rgba(0.2, 0.4, 0.8, 0.7)),
    ));

    c.bench_function("rasterize_star_512", |b| {
        b.iter(|| {
            let mut renderer = RasterRenderer::new(Viewport::new(512, 512)).expect("surface");
            renderer.render(black_box(&frame)).expect("raster");
        })
    });
}

fn bench_png_encode(c: &mut Criterion) {
    let image = render_to_image(&grid_map(8), RenderRequest::default()).expect("render");
    c.bench_function("encode_png_512", |b| {
        b.iter(|| {
            let _ = encode(black_box(&image), ImageFormat::Png { drop_alpha: false })
                .expect("encode");
        })
    });
}

criterion_group!(
    benches,
    bench_render_grid_32,
    bench_rasterize_star,
    bench_png_encode
);
criterion_main!(benches);
