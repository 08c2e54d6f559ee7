use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::core::{BoundingBox, LONGLAT_PROJ};
use crate::datasource::{self, BASE_PARAM, Parameters};
use crate::error::{MapnikError, MapnikResult};
use crate::map::{Layer, Map};
use crate::render::Color;
use crate::style::{
    Filter, LineSymbolizer, MarkersSymbolizer, PolygonSymbolizer, Rule, Style, Symbolizer,
    TextSymbolizer, parse_color,
};

/// Loads an XML stylesheet file into `map`.
///
/// Relative datasource files resolve against the stylesheet's directory.
pub fn load_map(map: &mut Map, path: impl AsRef<Path>) -> MapnikResult<()> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| MapnikError::io(path, source))?;
    let base = path.parent().map(Path::to_path_buf);
    load_map_string(map, &text, base.as_deref())
}

/// Loads an XML stylesheet from memory into `map`.
///
/// The map is only modified when the whole document parses; layers and styles
/// are appended to the ones already present.
pub fn load_map_string(map: &mut Map, text: &str, base_path: Option<&Path>) -> MapnikResult<()> {
    let document = Document::parse(text)?;
    let root = document.root_element();
    if root.tag_name().name() != "Map" {
        return Err(MapnikError::Stylesheet(format!(
            "Map node not found, found <{}>",
            root.tag_name().name()
        )));
    }

    let mut staged = map.clone();
    let base = resolve_base(root.attribute("base"), base_path);
    staged.set_base_path(base.clone());
    parse_map_attributes(&mut staged, root)?;

    for child in root.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "Style" => {
                let (name, style) = parse_style(child)?;
                if staged.insert_style(name.clone(), style).is_some() {
                    warn!(style = %name, "style defined twice, keeping the last definition");
                }
            }
            "Layer" => staged.add_layer(parse_layer(child, base.as_deref())?),
            "Parameters" | "FontSet" | "Include" | "FileSource" => {
                debug!(element = child.tag_name().name(), "ignoring stylesheet element");
            }
            other => warn!(element = other, "unknown stylesheet element"),
        }
    }

    debug!(
        layers = staged.layers().len(),
        styles = staged.styles().count(),
        "loaded stylesheet"
    );
    *map = staged;
    Ok(())
}

fn resolve_base(attribute: Option<&str>, base_path: Option<&Path>) -> Option<PathBuf> {
    match (attribute, base_path) {
        (Some(attr), Some(base)) if Path::new(attr).is_relative() => Some(base.join(attr)),
        (Some(attr), _) => Some(PathBuf::from(attr)),
        (None, base) => base.map(Path::to_path_buf),
    }
}

fn parse_map_attributes(map: &mut Map, node: Node<'_, '_>) -> MapnikResult<()> {
    if let Some(srs) = node.attribute("srs") {
        map.set_srs(srs);
    }
    if let Some(color) = node.attribute("background-color") {
        map.set_background(Some(parse_color(color)?));
    }
    if let Some(buffer_size) = parse_attr::<i32>(node, "buffer-size")? {
        map.set_buffer_size(buffer_size);
    }
    if let Some(extent) = node.attribute("maximum-extent") {
        map.set_maximum_extent(Some(parse_extent(extent)?));
    }
    Ok(())
}

fn parse_extent(text: &str) -> MapnikResult<BoundingBox> {
    let values: SmallVec<[f64; 4]> = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::parse::<f64>)
        .collect::<Result<_, _>>()
        .map_err(|_| MapnikError::Stylesheet(format!("failed to parse maximum-extent: '{text}'")))?;
    match values.as_slice() {
        &[minx, miny, maxx, maxy] => Ok(BoundingBox::from_corners(minx, miny, maxx, maxy)),
        _ => Err(MapnikError::Stylesheet(format!(
            "maximum-extent needs four values: '{text}'"
        ))),
    }
}

fn parse_style(node: Node<'_, '_>) -> MapnikResult<(String, Style)> {
    let name = node
        .attribute("name")
        .ok_or_else(|| MapnikError::Stylesheet("<Style> requires a name attribute".to_owned()))?;

    let rules = node
        .children()
        .filter(|child| child.has_tag_name("Rule"))
        .map(parse_rule)
        .collect::<MapnikResult<Vec<_>>>()?;

    Ok((name.to_owned(), Style { rules }))
}

fn parse_rule(node: Node<'_, '_>) -> MapnikResult<Rule> {
    let mut rule = Rule::default();
    for child in node.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "Filter" => rule.filter = Filter::parse(child.text().unwrap_or_default())?,
            "MinScaleDenominator" => rule.min_scale_denominator = parse_text(child)?,
            "MaxScaleDenominator" => rule.max_scale_denominator = parse_text(child)?,
            "PolygonSymbolizer" => rule
                .symbolizers
                .push(Symbolizer::Polygon(parse_polygon_symbolizer(child)?)),
            "LineSymbolizer" => rule
                .symbolizers
                .push(Symbolizer::Line(parse_line_symbolizer(child)?)),
            "MarkersSymbolizer" => rule
                .symbolizers
                .push(Symbolizer::Markers(parse_markers_symbolizer(child)?)),
            "TextSymbolizer" => rule
                .symbolizers
                .push(Symbolizer::Text(parse_text_symbolizer(child)?)),
            other => warn!(symbolizer = other, "unsupported rule element"),
        }
    }
    Ok(rule)
}

fn parse_polygon_symbolizer(node: Node<'_, '_>) -> MapnikResult<PolygonSymbolizer> {
    let mut sym = PolygonSymbolizer::default();
    if let Some(fill) = node.attribute("fill") {
        sym.fill = parse_color(fill)?;
    }
    sym.fill_opacity = parse_attr(node, "fill-opacity")?.unwrap_or(sym.fill_opacity);
    Ok(sym)
}

fn parse_line_symbolizer(node: Node<'_, '_>) -> MapnikResult<LineSymbolizer> {
    let mut sym = LineSymbolizer::default();
    if let Some(stroke) = node.attribute("stroke") {
        sym.stroke = parse_color(stroke)?;
    }
    sym.stroke_width = parse_attr(node, "stroke-width")?.unwrap_or(sym.stroke_width);
    sym.stroke_opacity = parse_attr(node, "stroke-opacity")?.unwrap_or(sym.stroke_opacity);
    Ok(sym)
}

fn parse_markers_symbolizer(node: Node<'_, '_>) -> MapnikResult<MarkersSymbolizer> {
    let mut sym = MarkersSymbolizer::default();
    if let Some(fill) = node.attribute("fill") {
        sym.fill = parse_color(fill)?;
    }
    if let Some(stroke) = node.attribute("stroke") {
        sym.stroke = parse_color(stroke)?;
    }
    sym.fill_opacity = parse_attr(node, "fill-opacity")?.unwrap_or(sym.fill_opacity);
    sym.stroke_width = parse_attr(node, "stroke-width")?.unwrap_or(sym.stroke_width);
    sym.stroke_opacity = parse_attr(node, "stroke-opacity")?.unwrap_or(sym.stroke_opacity);
    sym.width = parse_attr(node, "width")?.unwrap_or(sym.width);
    sym.height = parse_attr(node, "height")?.unwrap_or(sym.width);
    Ok(sym)
}

fn parse_text_symbolizer(node: Node<'_, '_>) -> MapnikResult<TextSymbolizer> {
    Ok(TextSymbolizer {
        expression: node.text().unwrap_or_default().trim().to_owned(),
        face_name: node.attribute("face-name").map(str::to_owned),
        size: parse_attr(node, "size")?.unwrap_or(10.0),
        fill: match node.attribute("fill") {
            Some(fill) => parse_color(fill)?,
            None => Color::rgb(0.0, 0.0, 0.0),
        },
    })
}

fn parse_layer(node: Node<'_, '_>, base: Option<&Path>) -> MapnikResult<Layer> {
    let name = node.attribute("name").unwrap_or("Unnamed");
    let active = match node.attribute("status") {
        Some(status) => parse_bool(status).ok_or_else(|| {
            MapnikError::Stylesheet(format!("invalid status '{status}' on layer '{name}'"))
        })?,
        None => true,
    };

    let mut layer = Layer::new(name)
        .with_srs(node.attribute("srs").unwrap_or(LONGLAT_PROJ))
        .with_active(active)
        .with_scale_range(
            parse_attr(node, "minimum-scale-denominator")?.unwrap_or(0.0),
            parse_attr(node, "maximum-scale-denominator")?.unwrap_or(f64::INFINITY),
        );

    for child in node.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "StyleName" => {
                let style = child.text().unwrap_or_default().trim();
                if !style.is_empty() {
                    layer = layer.with_style(style);
                }
            }
            "Datasource" => {
                let params = parse_datasource_params(child, base);
                let datasource = datasource::create(&params).map_err(|err| {
                    MapnikError::Stylesheet(format!("{err} (encountered in layer '{name}')"))
                })?;
                layer.set_datasource(datasource);
            }
            other => warn!(element = other, layer = name, "unknown layer element"),
        }
    }
    Ok(layer)
}

fn parse_datasource_params(node: Node<'_, '_>, base: Option<&Path>) -> Parameters {
    let mut params: Parameters = node
        .children()
        .filter(|child| child.has_tag_name("Parameter"))
        .filter_map(|child| {
            let key = child.attribute("name")?;
            Some((key.to_owned(), child.text().unwrap_or_default().trim().to_owned()))
        })
        .collect();

    if !params.contains_key(BASE_PARAM) {
        if let Some(base) = base {
            params.insert(BASE_PARAM, base.to_string_lossy());
        }
    }
    params
}

fn parse_attr<T: std::str::FromStr>(node: Node<'_, '_>, name: &str) -> MapnikResult<Option<T>> {
    node.attribute(name)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|_| {
                MapnikError::Stylesheet(format!(
                    "failed to parse attribute '{name}' of <{}>: '{raw}'",
                    node.tag_name().name()
                ))
            })
        })
        .transpose()
}

fn parse_text(node: Node<'_, '_>) -> MapnikResult<f64> {
    let raw = node.text().unwrap_or_default().trim();
    raw.parse().map_err(|_| {
        MapnikError::Stylesheet(format!(
            "failed to parse <{}>: '{raw}'",
            node.tag_name().name()
        ))
    })
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_extent, resolve_base};
    use std::path::{Path, PathBuf};

    #[test]
    fn extent_accepts_commas_or_spaces() {
        let extent = parse_extent("-10, -5 10,5").expect("extent");
        assert_eq!((extent.minx, extent.maxy), (-10.0, 5.0));
        assert!(parse_extent("1,2,3").is_err());
    }

    #[test]
    fn relative_base_attribute_joins_stylesheet_directory() {
        assert_eq!(
            resolve_base(Some("data"), Some(Path::new("/styles"))),
            Some(PathBuf::from("/styles/data"))
        );
        assert_eq!(resolve_base(None, None), None);
    }
}
