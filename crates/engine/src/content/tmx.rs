use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use thiserror::Error;
use tracing::info;

use crate::app::{MapObject, Rect, TileLayer, Tilemap, TilemapError};

const GID_FLIP_MASK: u32 = 0x1FFF_FFFF;

#[derive(Debug, Error)]
pub enum TmxError {
    #[error("failed to read map {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed map XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("<{element}> is missing attribute '{attribute}' (line {line})")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
        line: u32,
    },
    #[error("<{element}> attribute '{attribute}' has invalid value '{value}' (line {line})")]
    InvalidValue {
        element: String,
        attribute: &'static str,
        value: String,
        line: u32,
    },
    #[error("layer '{layer}' uses unsupported data encoding '{encoding}'; save the map as CSV")]
    UnsupportedEncoding { layer: String, encoding: String },
    #[error(transparent)]
    Shape(#[from] TilemapError),
}

pub fn load_tmx(path: &Path) -> Result<Tilemap, TmxError> {
    let raw = fs::read_to_string(path).map_err(|source| TmxError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let tilemap = parse_tmx(&raw)?;
    info!(
        path = %path.display(),
        width = tilemap.width(),
        height = tilemap.height(),
        layers = tilemap.layers().len(),
        "map_loaded"
    );
    Ok(tilemap)
}

/// Parses an orthogonal Tiled map with CSV layer data. Tile ids are rebased
/// so that `1` is the first tile of the first tileset.
pub fn parse_tmx(raw: &str) -> Result<Tilemap, TmxError> {
    let doc = Document::parse(raw)?;
    let map = doc.root_element();

    let width = parse_attr::<u32>(&doc, map, "width")?;
    let height = parse_attr::<u32>(&doc, map, "height")?;
    let tile_width = parse_attr::<u32>(&doc, map, "tilewidth")?;
    let tile_height = parse_attr::<u32>(&doc, map, "tileheight")?;

    let first_gid = map
        .children()
        .find(|node| node.has_tag_name("tileset"))
        .map(|tileset| parse_attr::<u32>(&doc, tileset, "firstgid"))
        .transpose()?
        .unwrap_or(1);

    let mut layers = Vec::new();
    let mut object_layers = HashMap::new();
    for node in map.children().filter(Node::is_element) {
        match node.tag_name().name() {
            "layer" => layers.push(parse_layer(&doc, node, first_gid)?),
            "objectgroup" => {
                let name = required_attr(&doc, node, "name")?.to_string();
                let objects = node
                    .children()
                    .filter(|child| child.has_tag_name("object"))
                    .map(|object| parse_object(&doc, object))
                    .collect::<Result<Vec<_>, _>>()?;
                object_layers.insert(name, objects);
            }
            _ => {}
        }
    }

    Ok(Tilemap::new(
        width,
        height,
        (tile_width, tile_height),
        layers,
        object_layers,
    )?)
}

fn parse_layer(
    doc: &Document<'_>,
    node: Node<'_, '_>,
    first_gid: u32,
) -> Result<TileLayer, TmxError> {
    let name = required_attr(doc, node, "name")?.to_string();
    let properties = parse_properties(node);
    let solid = properties
        .get("solid")
        .map(|value| value != "false")
        .unwrap_or(true);

    let Some(data) = node.children().find(|child| child.has_tag_name("data")) else {
        return Err(missing(doc, node, "data"));
    };
    let encoding = data.attribute("encoding").unwrap_or("xml");
    if encoding != "csv" {
        return Err(TmxError::UnsupportedEncoding {
            layer: name,
            encoding: encoding.to_string(),
        });
    }

    let mut gids = Vec::new();
    for cell in data.text().unwrap_or_default().split(',') {
        let cell = cell.trim();
        if cell.is_empty() {
            continue;
        }
        let raw_gid = cell.parse::<u32>().map_err(|_| TmxError::InvalidValue {
            element: "data".to_string(),
            attribute: "csv",
            value: cell.to_string(),
            line: line_of(doc, data),
        })?;
        let gid = raw_gid & GID_FLIP_MASK;
        gids.push(if gid == 0 { 0 } else { gid + 1 - first_gid.min(gid) });
    }

    Ok(TileLayer { name, solid, gids })
}

fn parse_object(doc: &Document<'_>, node: Node<'_, '_>) -> Result<MapObject, TmxError> {
    let x = parse_attr::<f32>(doc, node, "x")?;
    let y = parse_attr::<f32>(doc, node, "y")?;
    let width = optional_attr::<f32>(doc, node, "width")?.unwrap_or(0.0);
    let height = optional_attr::<f32>(doc, node, "height")?.unwrap_or(0.0);
    // Tiled 1.9 renamed `type` to `class`
    let kind = node
        .attribute("type")
        .or_else(|| node.attribute("class"))
        .unwrap_or_default();

    Ok(MapObject {
        name: node.attribute("name").unwrap_or_default().to_string(),
        kind: kind.to_string(),
        rect: Rect::new(x, y, width, height),
        properties: parse_properties(node),
    })
}

/// Multi-line string properties carry their value as element text.
fn parse_properties(node: Node<'_, '_>) -> HashMap<String, String> {
    node.children()
        .filter(|child| child.has_tag_name("properties"))
        .flat_map(|properties| properties.children())
        .filter(|property| property.has_tag_name("property"))
        .filter_map(|property| {
            let name = property.attribute("name")?;
            let value = property
                .attribute("value")
                .or_else(|| property.text())
                .unwrap_or_default();
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

fn required_attr<'a>(
    doc: &Document<'_>,
    node: Node<'a, '_>,
    attribute: &'static str,
) -> Result<&'a str, TmxError> {
    node.attribute(attribute)
        .ok_or_else(|| missing(doc, node, attribute))
}

fn parse_attr<T: std::str::FromStr>(
    doc: &Document<'_>,
    node: Node<'_, '_>,
    attribute: &'static str,
) -> Result<T, TmxError> {
    optional_attr(doc, node, attribute)?.ok_or_else(|| missing(doc, node, attribute))
}

fn optional_attr<T: std::str::FromStr>(
    doc: &Document<'_>,
    node: Node<'_, '_>,
    attribute: &'static str,
) -> Result<Option<T>, TmxError> {
    let Some(value) = node.attribute(attribute) else {
        return Ok(None);
    };
    value
        .trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| TmxError::InvalidValue {
            element: node.tag_name().name().to_string(),
            attribute,
            value: value.to_string(),
            line: line_of(doc, node),
        })
}

fn missing(doc: &Document<'_>, node: Node<'_, '_>, attribute: &'static str) -> TmxError {
    TmxError::MissingAttribute {
        element: node.tag_name().name().to_string(),
        attribute,
        line: line_of(doc, node),
    }
}

fn line_of(doc: &Document<'_>, node: Node<'_, '_>) -> u32 {
    doc.text_pos_at(node.range().start).row
}
