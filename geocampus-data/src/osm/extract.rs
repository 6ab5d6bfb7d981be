//! Candidate extraction from a parsed OSM document.
//!
//! Pure transforms: tag-based heuristics decide which elements become
//! building or point-of-interest candidates, and per-field resolvers pick
//! values along a fixed tag-key priority.

use geo::{Coord, Rect};
use geocampus_core::Tags;
use log::debug;
use serde::{Deserialize, Serialize};

use super::document::{OsmDocument, OsmNode, OsmWay};

/// Availability label stamped on every extracted building.
const DEFAULT_AVAILABILITY: &str = "Disponible";

/// The generic `building=yes` sentinel maps to this literal subtype.
const GENERIC_BUILDING_TYPE: &str = "building";

/// Name fallback literal for nodes carrying point-of-interest tags.
const POI_NAME_FALLBACK: &str = "POI";

const BUILDING_NAME_KEYS: [&str; 3] = ["name", "building:name", "addr:street"];
const ACRONYM_KEYS: [&str; 2] = ["short_name", "alt_name"];
const ADDRESS_KEYS: [&str; 2] = ["addr:full", "addr:street"];
const POI_NAME_KEYS: [&str; 3] = ["name", "amenity", "shop"];
const POI_TYPE_KEYS: [&str; 4] = ["amenity", "shop", "tourism", "leisure"];

/// Amenity values that make a node a building candidate on their own.
const CAMPUS_AMENITIES: [&str; 2] = ["university", "college"];

/// A building derived from OSM data, before reconciliation assigns it a
/// collection identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingCandidate {
    /// Identifier of the source OSM element.
    pub osm_id: i64,
    /// Display name.
    pub nombre_edificio: String,
    /// Short name or acronym; empty when unknown.
    pub acronimo: String,
    /// Building subtype.
    pub tipo: String,
    /// Street address; empty when unknown.
    pub direccion: String,
    /// Latitude in WGS84 degrees.
    pub cord_latitud: f64,
    /// Longitude in WGS84 degrees.
    pub cord_longitud: f64,
    /// Always active on extraction.
    pub estado: bool,
    /// Always `"Disponible"` on extraction.
    pub disponibilidad: String,
    /// Always empty on extraction; an image may be uploaded later.
    pub imagen: String,
    /// The way's resolved coordinate ring; empty for node candidates.
    pub outline: Vec<Coord<f64>>,
    /// Raw tags of the source element, kept for traceability.
    pub osm_tags: Tags,
}

/// A point of interest derived from a node. Preview-only; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiCandidate {
    /// Identifier of the source OSM node.
    pub osm_id: i64,
    /// Display name.
    pub nombre: String,
    /// Point-of-interest category.
    pub tipo: String,
    /// Latitude in WGS84 degrees.
    pub cord_latitud: f64,
    /// Longitude in WGS84 degrees.
    pub cord_longitud: f64,
    /// Raw tags of the source node.
    pub osm_tags: Tags,
}

/// Element and candidate counts for one extraction pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractionSummary {
    /// Node elements seen.
    pub nodes: u64,
    /// Way elements seen.
    pub ways: u64,
    /// Relation elements seen.
    pub relations: u64,
    /// Building candidates emitted.
    pub buildings: u64,
    /// Point-of-interest candidates emitted.
    pub pois: u64,
    /// The document bounds, when declared.
    pub bounds: Option<Rect<f64>>,
}

/// Candidates and statistics from one extraction pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Building candidates: way-derived first, then node-derived, each in
    /// document order.
    pub buildings: Vec<BuildingCandidate>,
    /// Point-of-interest candidates in document order.
    pub pois: Vec<PoiCandidate>,
    /// Element and candidate counts.
    pub summary: ExtractionSummary,
}

/// Derive building and point-of-interest candidates from a parsed document.
///
/// Ways never become POIs; a node carrying both building and
/// point-of-interest tags appears in both lists.
///
/// # Examples
/// ```
/// use geocampus_data::{extract_candidates, parse_osm_document};
///
/// let xml = r#"<osm>
///   <node id="1" lat="10.0" lon="20.0"/>
///   <node id="2" lat="12.0" lon="22.0"/>
///   <way id="100">
///     <nd ref="1"/><nd ref="2"/>
///     <tag k="building" v="yes"/><tag k="name" v="Library"/>
///   </way>
/// </osm>"#;
///
/// let document = parse_osm_document(xml.as_bytes()).expect("parse OSM document");
/// let report = extract_candidates(&document);
/// let building = report.buildings.first().expect("one candidate");
/// assert_eq!(building.nombre_edificio, "Library");
/// assert_eq!(building.tipo, "building");
/// ```
pub fn extract_candidates(document: &OsmDocument) -> ExtractionReport {
    let mut buildings = Vec::new();
    for way in &document.ways {
        if let Some(candidate) = building_from_way(way) {
            buildings.push(candidate);
        }
    }
    for node in &document.nodes {
        if let Some(candidate) = building_from_node(node) {
            buildings.push(candidate);
        }
    }
    let pois: Vec<PoiCandidate> = document.nodes.iter().filter_map(poi_from_node).collect();

    let summary = ExtractionSummary {
        nodes: document.nodes.len() as u64,
        ways: document.ways.len() as u64,
        relations: document.relations.len() as u64,
        buildings: buildings.len() as u64,
        pois: pois.len() as u64,
        bounds: document.bounds,
    };
    ExtractionReport {
        buildings,
        pois,
        summary,
    }
}

fn building_from_way(way: &OsmWay) -> Option<BuildingCandidate> {
    if !way.tags.contains_key("building") {
        return None;
    }
    let Some(osm_id) = way.id else {
        debug!("skipping building way without an id");
        return None;
    };
    Some(building_candidate(
        osm_id,
        &way.tags,
        way.centroid,
        way.coordinates.clone(),
    ))
}

fn building_from_node(node: &OsmNode) -> Option<BuildingCandidate> {
    let campus_amenity = node
        .tags
        .get("amenity")
        .is_some_and(|amenity| CAMPUS_AMENITIES.contains(&amenity.as_str()));
    if !node.tags.contains_key("building") && !campus_amenity {
        return None;
    }
    let Some(osm_id) = node.id else {
        debug!("skipping building node without an id");
        return None;
    };
    let location = Coord {
        x: node.lon.unwrap_or(0.0),
        y: node.lat.unwrap_or(0.0),
    };
    Some(building_candidate(osm_id, &node.tags, location, Vec::new()))
}

fn building_candidate(
    osm_id: i64,
    tags: &Tags,
    location: Coord<f64>,
    outline: Vec<Coord<f64>>,
) -> BuildingCandidate {
    let nombre_edificio = first_tag(tags, &BUILDING_NAME_KEYS)
        .map_or_else(|| format!("Edificio {osm_id}"), str::to_owned);
    BuildingCandidate {
        osm_id,
        nombre_edificio,
        acronimo: first_tag(tags, &ACRONYM_KEYS).unwrap_or_default().to_owned(),
        tipo: building_type(tags),
        direccion: first_tag(tags, &ADDRESS_KEYS).unwrap_or_default().to_owned(),
        cord_latitud: location.y,
        cord_longitud: location.x,
        estado: true,
        disponibilidad: DEFAULT_AVAILABILITY.to_owned(),
        imagen: String::new(),
        outline,
        osm_tags: tags.clone(),
    }
}

/// Resolve the building subtype.
///
/// The generic `building=yes` sentinel maps to the literal `"building"`;
/// any other `building` value is kept verbatim. Candidates admitted through
/// a campus amenity alone fall back to that amenity value.
fn building_type(tags: &Tags) -> String {
    match tags.get("building").map(String::as_str) {
        Some("yes") => GENERIC_BUILDING_TYPE.to_owned(),
        Some(value) => value.to_owned(),
        None => first_tag(tags, &["amenity"])
            .unwrap_or(GENERIC_BUILDING_TYPE)
            .to_owned(),
    }
}

fn poi_from_node(node: &OsmNode) -> Option<PoiCandidate> {
    let tipo = first_tag(&node.tags, &POI_TYPE_KEYS)?.to_owned();
    let Some(osm_id) = node.id else {
        debug!("skipping point-of-interest node without an id");
        return None;
    };
    Some(PoiCandidate {
        osm_id,
        nombre: first_tag(&node.tags, &POI_NAME_KEYS)
            .unwrap_or(POI_NAME_FALLBACK)
            .to_owned(),
        tipo,
        cord_latitud: node.lat.unwrap_or(0.0),
        cord_longitud: node.lon.unwrap_or(0.0),
        osm_tags: node.tags.clone(),
    })
}

/// Resolve the first non-empty value among `keys`, in priority order.
///
/// Empty tag values never satisfy a slot; the chain falls through to the
/// next key.
fn first_tag<'a>(tags: &'a Tags, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| {
        tags.get(*key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    })
}
