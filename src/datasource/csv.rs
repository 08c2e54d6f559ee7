use tracing::{debug, warn};

use crate::core::{AttributeValue, Coord, Feature, Geometry};
use crate::datasource::{MemoryDatasource, Parameters, source_text};
use crate::error::{MapnikError, MapnikResult};

pub const DRIVER_NAME: &str = "csv";

const COORDINATE_COLUMNS: [(&str, &str); 3] =
    [("x", "y"), ("lon", "lat"), ("longitude", "latitude")];

pub fn create(params: &Parameters) -> MapnikResult<MemoryDatasource> {
    let text = source_text(params, DRIVER_NAME)?;
    let separator = match params.get("separator") {
        None => ',',
        Some(raw) => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(separator), None) => separator,
                _ => {
                    return Err(MapnikError::Datasource(format!(
                        "csv: separator must be a single character, got '{raw}'"
                    )));
                }
            }
        }
    };
    let strict = params.get_bool("strict")?.unwrap_or(false);

    let features = parse_features(&text, separator, strict)?;
    debug!(count = features.len(), "csv datasource loaded");
    MemoryDatasource::new(DRIVER_NAME, params.clone(), features)
}

/// Parses point features from delimited text with a header row.
///
/// Rows with unparseable coordinates are skipped unless `strict` is set.
/// Quoted cells must not contain line breaks.
pub fn parse_features(text: &str, separator: char, strict: bool) -> MapnikResult<Vec<Feature>> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header_line) = lines
        .next()
        .ok_or_else(|| MapnikError::Datasource("csv: missing header row".to_owned()))?;
    let headers: Vec<String> = split_row(header_line, separator)
        .into_iter()
        .map(|header| header.trim().to_owned())
        .collect();

    let (x_index, y_index) = locate_coordinate_columns(&headers).ok_or_else(|| {
        MapnikError::Datasource(
            "csv: could not detect coordinate columns (x/y, lon/lat, longitude/latitude)"
                .to_owned(),
        )
    })?;

    let mut features = Vec::new();
    for (line_index, line) in lines {
        let cells = split_row(line, separator);
        let coord = parse_coord(&cells, x_index, y_index);
        let Some(coord) = coord else {
            if strict {
                return Err(MapnikError::Datasource(format!(
                    "csv: could not parse coordinates on line {}",
                    line_index + 1
                )));
            }
            warn!(line = line_index + 1, "skipping csv row without coordinates");
            continue;
        };

        let mut feature = Feature::new(features.len() as u64 + 1, Geometry::Point(coord));
        for (index, header) in headers.iter().enumerate() {
            if index == x_index || index == y_index {
                continue;
            }
            let value = cells
                .get(index)
                .map_or(AttributeValue::Null, |cell| AttributeValue::infer(cell));
            feature.attributes.insert(header.clone(), value);
        }
        features.push(feature);
    }

    Ok(features)
}

fn locate_coordinate_columns(headers: &[String]) -> Option<(usize, usize)> {
    let position = |name: &str| {
        headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(name))
    };
    COORDINATE_COLUMNS
        .iter()
        .find_map(|(x, y)| Some((position(x)?, position(y)?)))
}

fn parse_coord(cells: &[String], x_index: usize, y_index: usize) -> Option<Coord> {
    let x = cells.get(x_index)?.trim().parse::<f64>().ok()?;
    let y = cells.get(y_index)?.trim().parse::<f64>().ok()?;
    let coord = Coord::new(x, y);
    coord.is_finite().then_some(coord)
}

/// Splits one row, honoring double-quoted cells and `""` escapes.
///
/// Rows are split on line breaks before this runs, so a quoted cell cannot
/// span lines; such a record is read as two malformed rows.
fn split_row(line: &str, separator: char) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if quoted && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ch if ch == separator && !quoted => cells.push(std::mem::take(&mut current)),
            ch => current.push(ch),
        }
    }
    cells.push(current);
    cells
}
