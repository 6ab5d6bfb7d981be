//! Facade crate for the GeoCampus toolchain.
//!
//! This crate re-exports the campus domain model and the OSM import
//! pipeline so downstream consumers depend on a single crate.

#![forbid(unsafe_code)]

pub use geocampus_core::{
    Bathroom, Building, CampusState, CampusStore, CampusStoreError, Faculty, Floor, Room, Tags,
};

pub use geocampus_data::{
    BuildingCandidate, ExtractionReport, ExtractionSummary, ImportError, ImportReport,
    JsonCampusStore, MergeMode, MergeOptions, OsmDocument, OsmParseError, PoiCandidate, preview,
    run_import,
};

#[cfg(feature = "test-support")]
pub use geocampus_core::InMemoryStore;
