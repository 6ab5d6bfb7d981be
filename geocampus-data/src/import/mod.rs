//! Import orchestration: parse, extract, reconcile, persist.
//!
//! `run_import` performs at most one storage write, at the very end of a
//! successful run; any earlier failure leaves the persisted state
//! authoritative. `preview` runs the parser and extractor only and never
//! touches storage. Runs are synchronous and uncoordinated: concurrent runs
//! against the same store are last-writer-wins.

mod reconcile;

use camino::Utf8Path;
use chrono::Utc;
use geocampus_core::{CampusStore, CampusStoreError};
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::osm::{
    ExtractionReport, ExtractionSummary, OsmParseError, extract_candidates, parse_osm_file,
};

pub use reconcile::{MergeMode, MergeOptions, MergeOutcome, reconcile};

/// Summary of one completed import run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Building records before the run.
    pub original_count: u64,
    /// Building records after the run.
    pub final_count: u64,
    /// Candidates appended as new records.
    pub added: u64,
    /// Existing records merged with a candidate.
    pub updated: u64,
    /// Candidates skipped as duplicates.
    pub skipped: u64,
    /// Element and candidate counts from the extraction pass.
    pub summary: ExtractionSummary,
}

/// Errors surfaced by the import operations.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The OSM document could not be parsed.
    #[error(transparent)]
    Parse(#[from] OsmParseError),
    /// Persisting the reconciled state failed.
    #[error(transparent)]
    Persist(#[from] CampusStoreError),
}

/// Import the OSM document at `path` into the store's building registry.
///
/// Reads the current state, reconciles the extracted candidates under
/// `options`, and writes the whole document back once. The run timestamp is
/// taken once and stamped on every appended record.
///
/// # Examples
/// ```
/// use camino::Utf8PathBuf;
/// use geocampus_core::CampusStore;
/// use geocampus_data::{JsonCampusStore, MergeOptions, run_import};
///
/// let dir = tempfile::tempdir().expect("create temp dir");
/// let base = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8 temp path");
/// let fixture = base.join("campus.osm");
/// std::fs::write(
///     &fixture,
///     r#"<osm>
///       <node id="1" lat="10.0" lon="20.0"/>
///       <node id="2" lat="12.0" lon="22.0"/>
///       <way id="100">
///         <nd ref="1"/><nd ref="2"/>
///         <tag k="building" v="yes"/><tag k="name" v="Library"/>
///       </way>
///     </osm>"#,
/// )
/// .expect("write fixture");
///
/// let store = JsonCampusStore::new(base.join("campus-data.json"));
/// let report = run_import(&store, &fixture, &MergeOptions::default()).expect("import");
/// assert_eq!(report.added, 1);
/// assert_eq!(store.load().buildings.len(), 1);
/// ```
pub fn run_import<S: CampusStore>(
    store: &S,
    path: &Utf8Path,
    options: &MergeOptions,
) -> Result<ImportReport, ImportError> {
    let document = parse_osm_file(path)?;
    let ExtractionReport {
        buildings: candidates,
        summary,
        ..
    } = extract_candidates(&document);

    let mut state = store.load();
    let imported_at = Utc::now().to_rfc3339();
    let existing = std::mem::take(&mut state.buildings);
    let outcome = reconcile(candidates, existing, options, &imported_at);

    let report = ImportReport {
        original_count: outcome.original_count,
        final_count: outcome.buildings.len() as u64,
        added: outcome.added,
        updated: outcome.updated,
        skipped: outcome.skipped,
        summary,
    };
    state.buildings = outcome.buildings;
    store.save(&state)?;

    info!(
        "imported {path}: {added} added, {updated} updated, {skipped} skipped",
        added = report.added,
        updated = report.updated,
        skipped = report.skipped,
    );
    Ok(report)
}

/// Parse and extract the OSM document at `path` without touching storage.
pub fn preview(path: &Utf8Path) -> Result<ExtractionReport, ImportError> {
    let document = parse_osm_file(path)?;
    Ok(extract_candidates(&document))
}
