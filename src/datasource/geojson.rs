use serde_json::{Map as JsonObject, Value};
use tracing::debug;

use crate::core::{AttributeValue, Coord, Feature, Geometry};
use crate::datasource::{MemoryDatasource, Parameters, source_text};
use crate::error::{MapnikError, MapnikResult};

pub const DRIVER_NAME: &str = "geojson";

pub fn create(params: &Parameters) -> MapnikResult<MemoryDatasource> {
    let text = source_text(params, DRIVER_NAME)?;
    let features = parse_features(&text)?;
    debug!(count = features.len(), "geojson datasource loaded");
    MemoryDatasource::new(DRIVER_NAME, params.clone(), features)
}

/// Parses a FeatureCollection, a single Feature or a bare geometry.
pub fn parse_features(text: &str) -> MapnikResult<Vec<Feature>> {
    let root: Value = serde_json::from_str(text)
        .map_err(|err| MapnikError::Datasource(format!("geojson: {err}")))?;

    match member_str(&root, "type")? {
        "FeatureCollection" => {
            let members = root
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| invalid("FeatureCollection without a `features` array"))?;
            members
                .iter()
                .enumerate()
                .filter_map(|(index, value)| parse_feature(value, index as u64 + 1).transpose())
                .collect()
        }
        "Feature" => Ok(parse_feature(&root, 1)?.into_iter().collect()),
        _ => Ok(vec![Feature::new(1, parse_geometry(&root)?)]),
    }
}

/// Features with a `null` geometry carry no drawable content and are skipped.
fn parse_feature(value: &Value, fallback_id: u64) -> MapnikResult<Option<Feature>> {
    if member_str(value, "type")? != "Feature" {
        return Err(invalid("expected a Feature"));
    }

    let geometry = match value.get("geometry") {
        None | Some(Value::Null) => return Ok(None),
        Some(geometry) => parse_geometry(geometry)?,
    };

    let id = value
        .get("id")
        .and_then(Value::as_u64)
        .unwrap_or(fallback_id);
    let mut feature = Feature::new(id, geometry);
    if let Some(Value::Object(properties)) = value.get("properties") {
        feature.attributes = properties_to_attributes(properties);
    }
    Ok(Some(feature))
}

fn properties_to_attributes(
    properties: &JsonObject<String, Value>,
) -> indexmap::IndexMap<String, AttributeValue> {
    properties
        .iter()
        .map(|(key, value)| {
            let attribute = match value {
                Value::Null => AttributeValue::Null,
                Value::Bool(flag) => AttributeValue::Bool(*flag),
                Value::Number(number) => number
                    .as_f64()
                    .map_or(AttributeValue::Null, AttributeValue::Number),
                Value::String(text) => AttributeValue::String(text.clone()),
                nested => AttributeValue::String(nested.to_string()),
            };
            (key.clone(), attribute)
        })
        .collect()
}

fn parse_geometry(value: &Value) -> MapnikResult<Geometry> {
    let coordinates = || {
        value
            .get("coordinates")
            .ok_or_else(|| invalid("geometry without `coordinates`"))
    };

    match member_str(value, "type")? {
        "Point" => Ok(Geometry::Point(parse_position(coordinates()?)?)),
        "MultiPoint" => Ok(Geometry::MultiPoint(parse_positions(coordinates()?)?)),
        "LineString" => Ok(Geometry::LineString(parse_positions(coordinates()?)?)),
        "MultiLineString" => Ok(Geometry::MultiLineString(parse_rings(coordinates()?)?)),
        "Polygon" => Ok(Geometry::Polygon(parse_rings(coordinates()?)?)),
        "MultiPolygon" => {
            let polygons = as_array(coordinates()?)?
                .iter()
                .map(parse_rings)
                .collect::<MapnikResult<Vec<_>>>()?;
            Ok(Geometry::MultiPolygon(polygons))
        }
        other => Err(invalid(&format!("unsupported geometry type `{other}`"))),
    }
}

fn parse_position(value: &Value) -> MapnikResult<Coord> {
    let position = as_array(value)?;
    match (
        position.first().and_then(Value::as_f64),
        position.get(1).and_then(Value::as_f64),
    ) {
        (Some(x), Some(y)) => Ok(Coord::new(x, y)),
        _ => Err(invalid("position must hold at least two numbers")),
    }
}

fn parse_positions(value: &Value) -> MapnikResult<Vec<Coord>> {
    as_array(value)?.iter().map(parse_position).collect()
}

fn parse_rings(value: &Value) -> MapnikResult<Vec<Vec<Coord>>> {
    as_array(value)?.iter().map(parse_positions).collect()
}

fn as_array(value: &Value) -> MapnikResult<&Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| invalid("coordinates must be arrays"))
}

fn member_str<'a>(value: &'a Value, key: &str) -> MapnikResult<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(&format!("missing `{key}` member")))
}

fn invalid(message: &str) -> MapnikError {
    MapnikError::Datasource(format!("geojson: {message}"))
}
