//! OSM XML document parsing.
//!
//! One parse pass produces every `node`, `way` and `relation` element as an
//! entry in an ordered sequence, regardless of how many times the element
//! occurs in the input. Way node references are resolved against nodes from
//! the same document only; dangling references are dropped.

use std::collections::HashMap;
use std::io::{self, BufRead, BufReader};

use camino::{Utf8Path, Utf8PathBuf};
use geo::{Coord, Rect};
use geocampus_core::Tags;
use log::debug;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use thiserror::Error;

use geocampus_fs::open_utf8_file;

/// A point element from the parsed document.
///
/// Nodes missing any of `id`, `lat` or `lon` are still parsed and counted,
/// but they are excluded from the lookup table used to resolve way
/// coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OsmNode {
    /// Element identifier, when present.
    pub id: Option<i64>,
    /// Latitude in degrees, when present.
    pub lat: Option<f64>,
    /// Longitude in degrees, when present.
    pub lon: Option<f64>,
    /// Raw tags.
    pub tags: Tags,
}

/// An ordered node sequence from the parsed document.
#[derive(Debug, Clone, PartialEq)]
pub struct OsmWay {
    /// Element identifier, when present.
    pub id: Option<i64>,
    /// Referenced node identifiers, in document order.
    pub node_refs: Vec<i64>,
    /// Raw tags.
    pub tags: Tags,
    /// Coordinates resolved from nodes in the same document; dangling
    /// references are dropped.
    pub coordinates: Vec<Coord<f64>>,
    /// Arithmetic mean of the resolved coordinates. Ways with no
    /// resolvable coordinates fall back to the origin.
    pub centroid: Coord<f64>,
}

/// A member reference inside a relation.
#[derive(Debug, Clone, PartialEq)]
pub struct OsmRelationMember {
    /// Member element kind (`node`, `way`, `relation`).
    pub member_type: String,
    /// Referenced element identifier.
    pub member_ref: i64,
    /// Role of the member within the relation.
    pub role: String,
}

/// A relation element from the parsed document. Counted, never extracted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OsmRelation {
    /// Element identifier, when present.
    pub id: Option<i64>,
    /// Member references, in document order.
    pub members: Vec<OsmRelationMember>,
    /// Raw tags.
    pub tags: Tags,
}

/// The result of one parse pass over an OSM XML document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OsmDocument {
    /// All node elements, in document order.
    pub nodes: Vec<OsmNode>,
    /// All way elements, in document order, with resolved coordinates.
    pub ways: Vec<OsmWay>,
    /// All relation elements, in document order.
    pub relations: Vec<OsmRelation>,
    /// The document `bounds` box, when all four limits were present.
    pub bounds: Option<Rect<f64>>,
}

/// Errors raised while parsing an OSM XML document.
///
/// Parsing is all-or-nothing: any failure aborts the operation without a
/// partial result.
#[derive(Debug, Error)]
pub enum OsmParseError {
    /// The document file could not be opened.
    #[error("failed to open OSM file at {path}: {source}")]
    Open {
        /// Location of the document on disk.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The document is not well-formed XML.
    #[error("malformed OSM XML: {source}")]
    Xml {
        /// Underlying XML reader error.
        #[source]
        source: quick_xml::Error,
    },
    /// A numeric attribute could not be parsed.
    #[error("invalid numeric attribute {attribute}: {value:?}")]
    InvalidNumber {
        /// Attribute name.
        attribute: &'static str,
        /// Offending attribute value.
        value: String,
    },
}

/// Parse the OSM XML document at `path`.
pub fn parse_osm_file(path: &Utf8Path) -> Result<OsmDocument, OsmParseError> {
    let file = open_utf8_file(path).map_err(|source| OsmParseError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_osm_document(BufReader::new(file))
}

/// Parse an OSM XML document from a reader.
///
/// # Examples
/// ```
/// use geocampus_data::parse_osm_document;
///
/// let xml = r#"<osm>
///   <node id="1" lat="10.0" lon="20.0"/>
///   <node id="2" lat="12.0" lon="22.0"/>
///   <way id="100"><nd ref="1"/><nd ref="2"/><tag k="building" v="yes"/></way>
/// </osm>"#;
///
/// let document = parse_osm_document(xml.as_bytes()).expect("parse OSM document");
/// assert_eq!(document.nodes.len(), 2);
/// let way = document.ways.first().expect("one way");
/// assert_eq!(way.centroid.y, 11.0);
/// assert_eq!(way.centroid.x, 21.0);
/// ```
pub fn parse_osm_document<R: BufRead>(reader: R) -> Result<OsmDocument, OsmParseError> {
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut nodes: Vec<OsmNode> = Vec::new();
    let mut raw_ways: Vec<RawWay> = Vec::new();
    let mut relations: Vec<OsmRelation> = Vec::new();
    let mut bounds: Option<Rect<f64>> = None;
    let mut scope: Option<Scope> = None;

    let mut buf = Vec::new();
    loop {
        let event = xml
            .read_event_into(&mut buf)
            .map_err(|source| OsmParseError::Xml { source })?;
        match event {
            Event::Eof => break,
            Event::Start(element) => {
                open_element(
                    &element,
                    false,
                    &mut scope,
                    &mut nodes,
                    &mut raw_ways,
                    &mut relations,
                    &mut bounds,
                )?;
            }
            Event::Empty(element) => {
                open_element(
                    &element,
                    true,
                    &mut scope,
                    &mut nodes,
                    &mut raw_ways,
                    &mut relations,
                    &mut bounds,
                )?;
            }
            Event::End(element) => {
                close_element(
                    element.name().as_ref(),
                    &mut scope,
                    &mut nodes,
                    &mut raw_ways,
                    &mut relations,
                );
            }
            _ => {}
        }
        buf.clear();
    }

    let ways = resolve_ways(raw_ways, &nodes);
    Ok(OsmDocument {
        nodes,
        ways,
        relations,
        bounds,
    })
}

/// A way before its node references have been resolved.
#[derive(Debug, Default)]
struct RawWay {
    id: Option<i64>,
    node_refs: Vec<i64>,
    tags: Tags,
}

/// The container element currently being populated.
#[derive(Debug)]
enum Scope {
    Node(OsmNode),
    Way(RawWay),
    Relation(OsmRelation),
}

impl Scope {
    fn tags_mut(&mut self) -> &mut Tags {
        match self {
            Scope::Node(node) => &mut node.tags,
            Scope::Way(way) => &mut way.tags,
            Scope::Relation(relation) => &mut relation.tags,
        }
    }
}

fn open_element(
    element: &BytesStart<'_>,
    self_closing: bool,
    scope: &mut Option<Scope>,
    nodes: &mut Vec<OsmNode>,
    raw_ways: &mut Vec<RawWay>,
    relations: &mut Vec<OsmRelation>,
    bounds: &mut Option<Rect<f64>>,
) -> Result<(), OsmParseError> {
    match element.name().as_ref() {
        b"node" => {
            let node = parse_node(element)?;
            if self_closing {
                nodes.push(node);
            } else {
                *scope = Some(Scope::Node(node));
            }
        }
        b"way" => {
            let way = parse_way(element)?;
            if self_closing {
                raw_ways.push(way);
            } else {
                *scope = Some(Scope::Way(way));
            }
        }
        b"relation" => {
            let relation = parse_relation(element)?;
            if self_closing {
                relations.push(relation);
            } else {
                *scope = Some(Scope::Relation(relation));
            }
        }
        b"tag" => {
            if let (Some(container), Some((key, value))) = (scope.as_mut(), parse_tag(element)?) {
                container.tags_mut().insert(key, value);
            }
        }
        b"nd" => {
            if let Some(Scope::Way(way)) = scope.as_mut()
                && let Some(node_ref) = parse_nd(element)?
            {
                way.node_refs.push(node_ref);
            }
        }
        b"member" => {
            if let Some(Scope::Relation(relation)) = scope.as_mut()
                && let Some(member) = parse_member(element)?
            {
                relation.members.push(member);
            }
        }
        b"bounds" => {
            if let Some(rect) = parse_bounds(element)? {
                *bounds = Some(rect);
            }
        }
        _ => {}
    }
    Ok(())
}

fn close_element(
    name: &[u8],
    scope: &mut Option<Scope>,
    nodes: &mut Vec<OsmNode>,
    raw_ways: &mut Vec<RawWay>,
    relations: &mut Vec<OsmRelation>,
) {
    match (name, scope.take()) {
        (b"node", Some(Scope::Node(node))) => nodes.push(node),
        (b"way", Some(Scope::Way(way))) => raw_ways.push(way),
        (b"relation", Some(Scope::Relation(relation))) => relations.push(relation),
        (_, restored) => *scope = restored,
    }
}

fn parse_node(element: &BytesStart<'_>) -> Result<OsmNode, OsmParseError> {
    let mut node = OsmNode::default();
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|source| OsmParseError::Xml {
            source: source.into(),
        })?;
        match attribute.key.as_ref() {
            b"id" => node.id = Some(parse_number("id", &attribute_text(&attribute)?)?),
            b"lat" => node.lat = Some(parse_number("lat", &attribute_text(&attribute)?)?),
            b"lon" => node.lon = Some(parse_number("lon", &attribute_text(&attribute)?)?),
            _ => {}
        }
    }
    Ok(node)
}

fn parse_way(element: &BytesStart<'_>) -> Result<RawWay, OsmParseError> {
    let mut way = RawWay::default();
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|source| OsmParseError::Xml {
            source: source.into(),
        })?;
        if attribute.key.as_ref() == b"id" {
            way.id = Some(parse_number("id", &attribute_text(&attribute)?)?);
        }
    }
    Ok(way)
}

fn parse_relation(element: &BytesStart<'_>) -> Result<OsmRelation, OsmParseError> {
    let mut relation = OsmRelation::default();
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|source| OsmParseError::Xml {
            source: source.into(),
        })?;
        if attribute.key.as_ref() == b"id" {
            relation.id = Some(parse_number("id", &attribute_text(&attribute)?)?);
        }
    }
    Ok(relation)
}

/// Parse a `tag` element into a key/value pair.
///
/// Both `k` and `v` must be present; `v` may be the empty string. Returns
/// `None` when either attribute is missing.
fn parse_tag(element: &BytesStart<'_>) -> Result<Option<(String, String)>, OsmParseError> {
    let mut key: Option<String> = None;
    let mut value: Option<String> = None;
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|source| OsmParseError::Xml {
            source: source.into(),
        })?;
        match attribute.key.as_ref() {
            b"k" => key = Some(attribute_text(&attribute)?),
            b"v" => value = Some(attribute_text(&attribute)?),
            _ => {}
        }
    }
    Ok(key.zip(value))
}

fn parse_nd(element: &BytesStart<'_>) -> Result<Option<i64>, OsmParseError> {
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|source| OsmParseError::Xml {
            source: source.into(),
        })?;
        if attribute.key.as_ref() == b"ref" {
            return Ok(Some(parse_number("ref", &attribute_text(&attribute)?)?));
        }
    }
    Ok(None)
}

fn parse_member(element: &BytesStart<'_>) -> Result<Option<OsmRelationMember>, OsmParseError> {
    let mut member_type = String::new();
    let mut member_ref: Option<i64> = None;
    let mut role = String::new();
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|source| OsmParseError::Xml {
            source: source.into(),
        })?;
        match attribute.key.as_ref() {
            b"type" => member_type = attribute_text(&attribute)?,
            b"ref" => member_ref = Some(parse_number("ref", &attribute_text(&attribute)?)?),
            b"role" => role = attribute_text(&attribute)?,
            _ => {}
        }
    }
    Ok(member_ref.map(|reference| OsmRelationMember {
        member_type,
        member_ref: reference,
        role,
    }))
}

/// Parse a `bounds` element; all four limits must be present.
fn parse_bounds(element: &BytesStart<'_>) -> Result<Option<Rect<f64>>, OsmParseError> {
    let mut minlat: Option<f64> = None;
    let mut minlon: Option<f64> = None;
    let mut maxlat: Option<f64> = None;
    let mut maxlon: Option<f64> = None;
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|source| OsmParseError::Xml {
            source: source.into(),
        })?;
        match attribute.key.as_ref() {
            b"minlat" => minlat = Some(parse_number("minlat", &attribute_text(&attribute)?)?),
            b"minlon" => minlon = Some(parse_number("minlon", &attribute_text(&attribute)?)?),
            b"maxlat" => maxlat = Some(parse_number("maxlat", &attribute_text(&attribute)?)?),
            b"maxlon" => maxlon = Some(parse_number("maxlon", &attribute_text(&attribute)?)?),
            _ => {}
        }
    }
    Ok(match (minlat, minlon, maxlat, maxlon) {
        (Some(min_lat), Some(min_lon), Some(max_lat), Some(max_lon)) => Some(Rect::new(
            Coord {
                x: min_lon,
                y: min_lat,
            },
            Coord {
                x: max_lon,
                y: max_lat,
            },
        )),
        _ => None,
    })
}

fn attribute_text(attribute: &Attribute<'_>) -> Result<String, OsmParseError> {
    attribute
        .unescape_value()
        .map(|value| value.into_owned())
        .map_err(|source| OsmParseError::Xml { source })
}

fn parse_number<T: std::str::FromStr>(
    attribute: &'static str,
    value: &str,
) -> Result<T, OsmParseError> {
    value
        .trim()
        .parse()
        .map_err(|_| OsmParseError::InvalidNumber {
            attribute,
            value: value.to_owned(),
        })
}

/// Resolve way node references against the nodes of the same document.
///
/// Only nodes carrying all of `id`, `lat` and `lon` enter the lookup table;
/// dangling references are dropped silently.
fn resolve_ways(raw_ways: Vec<RawWay>, nodes: &[OsmNode]) -> Vec<OsmWay> {
    let lookup: HashMap<i64, Coord<f64>> = nodes
        .iter()
        .filter_map(|node| {
            let id = node.id?;
            let lat = node.lat?;
            let lon = node.lon?;
            Some((id, Coord { x: lon, y: lat }))
        })
        .collect();

    raw_ways
        .into_iter()
        .map(|raw| {
            let coordinates: Vec<Coord<f64>> = raw
                .node_refs
                .iter()
                .filter_map(|reference| lookup.get(reference).copied())
                .collect();
            let dropped = raw.node_refs.len() - coordinates.len();
            if dropped > 0 {
                debug!(
                    "way {id:?}: dropped {dropped} unresolved node references",
                    id = raw.id
                );
            }
            let centroid = vertex_mean(&coordinates);
            OsmWay {
                id: raw.id,
                node_refs: raw.node_refs,
                tags: raw.tags,
                coordinates,
                centroid,
            }
        })
        .collect()
}

/// Arithmetic mean of the vertices; the origin when there are none.
fn vertex_mean(coordinates: &[Coord<f64>]) -> Coord<f64> {
    if coordinates.is_empty() {
        return Coord { x: 0.0, y: 0.0 };
    }
    let count = coordinates.len() as f64;
    let sum = coordinates.iter().fold(
        Coord { x: 0.0, y: 0.0 },
        |accumulated, coordinate| Coord {
            x: accumulated.x + coordinate.x,
            y: accumulated.y + coordinate.y,
        },
    );
    Coord {
        x: sum.x / count,
        y: sum.y / count,
    }
}
