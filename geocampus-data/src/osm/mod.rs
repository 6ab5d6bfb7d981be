//! OpenStreetMap XML ingestion.
//!
//! The parser turns one OSM XML document into typed nodes, ways and
//! relations; the extractor derives building and point-of-interest
//! candidates from the parsed document. Both are pure with respect to the
//! datastore.

mod document;
mod extract;

pub use document::{
    OsmDocument, OsmNode, OsmParseError, OsmRelation, OsmRelationMember, OsmWay,
    parse_osm_document, parse_osm_file,
};
pub use extract::{
    BuildingCandidate, ExtractionReport, ExtractionSummary, PoiCandidate, extract_candidates,
};
