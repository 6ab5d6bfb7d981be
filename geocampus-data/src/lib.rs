//! Data pipeline for the GeoCampus toolchain.
//!
//! Responsibilities:
//! - Parse OSM XML documents into typed nodes, ways and relations.
//! - Extract building and point-of-interest candidates.
//! - Reconcile candidates into the persisted campus registry under a
//!   configurable merge policy.
//! - Persist the campus document as a flat JSON file.
//!
//! Boundaries:
//! - Domain entities and the store contract live in `geocampus-core`.
//! - No HTTP surface; the CLI and other callers drive these operations.
//!
//! Invariants:
//! - One import run performs at most one storage write, at the very end;
//!   any earlier failure leaves the persisted state authoritative.

#![forbid(unsafe_code)]

pub mod import;
pub mod osm;
pub mod store;

pub use import::{
    ImportError, ImportReport, MergeMode, MergeOptions, MergeOutcome, preview, reconcile,
    run_import,
};
pub use osm::{
    BuildingCandidate, ExtractionReport, ExtractionSummary, OsmDocument, OsmNode, OsmParseError,
    OsmRelation, OsmRelationMember, OsmWay, PoiCandidate, extract_candidates, parse_osm_document,
    parse_osm_file,
};
pub use store::JsonCampusStore;
