//! Merge policy for reconciling building candidates into the registry.

use geocampus_core::Building;
use serde::{Deserialize, Serialize};

use crate::osm::BuildingCandidate;

/// How an import treats the existing building collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Keep existing records and reconcile candidates against them.
    #[default]
    Add,
    /// Clear the collection before importing.
    Replace,
}

/// Policy controlling one import run.
///
/// Under [`MergeMode::Add`], a candidate matching an existing record is
/// handled by the sub-policy flags: `update_existing` merges the candidate
/// over the record, otherwise `skip_duplicates` leaves the record untouched
/// and counts a skip. With both flags disabled a matched candidate is
/// dropped without being counted. That last combination mirrors the system
/// this importer replaces and is kept as-is pending product clarification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Collection-level merge mode.
    pub mode: MergeMode,
    /// Merge matched candidates over their existing records.
    pub update_existing: bool,
    /// Count matched candidates as skipped, leaving records untouched.
    pub skip_duplicates: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            mode: MergeMode::Add,
            update_existing: false,
            skip_duplicates: true,
        }
    }
}

/// Result of reconciling one candidate set into a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// The reconciled collection.
    pub buildings: Vec<Building>,
    /// Record count before the run (before any replace-mode clear).
    pub original_count: u64,
    /// Candidates appended as new records.
    pub added: u64,
    /// Existing records merged with a candidate.
    pub updated: u64,
    /// Candidates skipped because a record already matched.
    pub skipped: u64,
}

/// Reconcile `candidates` into `existing` under `options`.
///
/// Matching scans the current collection in order and compares `osm_id`
/// first, then the display name case-insensitively. New records receive
/// `max current id + 1`, recomputed per append so repeated appends within
/// one run cannot collide, plus the `created_from_osm` marker and the run
/// timestamp.
///
/// # Examples
/// ```
/// use geocampus_data::{MergeOptions, reconcile};
///
/// let outcome = reconcile(Vec::new(), Vec::new(), &MergeOptions::default(), "");
/// assert_eq!(outcome.added, 0);
/// assert!(outcome.buildings.is_empty());
/// ```
pub fn reconcile(
    candidates: Vec<BuildingCandidate>,
    existing: Vec<Building>,
    options: &MergeOptions,
    imported_at: &str,
) -> MergeOutcome {
    let original_count = existing.len() as u64;
    let mut buildings = match options.mode {
        MergeMode::Add => existing,
        MergeMode::Replace => Vec::new(),
    };

    let mut added = 0u64;
    let mut updated = 0u64;
    let mut skipped = 0u64;
    for candidate in candidates {
        match find_match(&buildings, &candidate) {
            Some(index) => {
                if options.update_existing {
                    if let Some(record) = buildings.get_mut(index) {
                        merge_candidate(record, candidate);
                        updated += 1;
                    }
                } else if options.skip_duplicates {
                    skipped += 1;
                }
                // Both flags disabled: the candidate is dropped uncounted.
            }
            None => {
                let id = next_id(&buildings);
                buildings.push(candidate.into_record(id, imported_at));
                added += 1;
            }
        }
    }

    MergeOutcome {
        buildings,
        original_count,
        added,
        updated,
        skipped,
    }
}

/// First record matching the candidate: `osm_id` equality, else
/// case-insensitive display-name equality.
fn find_match(buildings: &[Building], candidate: &BuildingCandidate) -> Option<usize> {
    buildings.iter().position(|record| {
        record.osm_id == Some(candidate.osm_id)
            || record.nombre_edificio.to_lowercase() == candidate.nombre_edificio.to_lowercase()
    })
}

fn next_id(buildings: &[Building]) -> u64 {
    buildings.iter().map(|record| record.id).max().unwrap_or(0) + 1
}

/// Merge a candidate over an existing record.
///
/// The persisted `id` is never touched. The existing image wins unless the
/// candidate actually carries one, and existing non-zero coordinates win
/// over the candidate's, per axis.
fn merge_candidate(record: &mut Building, candidate: BuildingCandidate) {
    record.nombre_edificio = candidate.nombre_edificio;
    record.acronimo = candidate.acronimo;
    record.tipo = candidate.tipo;
    record.direccion = candidate.direccion;
    record.estado = candidate.estado;
    record.disponibilidad = candidate.disponibilidad;
    if !candidate.imagen.is_empty() {
        record.imagen = candidate.imagen;
    }
    if record.cord_latitud == 0.0 {
        record.cord_latitud = candidate.cord_latitud;
    }
    if record.cord_longitud == 0.0 {
        record.cord_longitud = candidate.cord_longitud;
    }
    record.osm_id = Some(candidate.osm_id);
    record.osm_tags = candidate.osm_tags;
}

impl BuildingCandidate {
    /// Convert into a persisted record with the assigned collection id.
    fn into_record(self, id: u64, imported_at: &str) -> Building {
        Building {
            id,
            nombre_edificio: self.nombre_edificio,
            acronimo: self.acronimo,
            tipo: self.tipo,
            direccion: self.direccion,
            cord_latitud: self.cord_latitud,
            cord_longitud: self.cord_longitud,
            estado: self.estado,
            disponibilidad: self.disponibilidad,
            imagen: self.imagen,
            created_from_osm: true,
            imported_at: Some(imported_at.to_owned()),
            osm_id: Some(self.osm_id),
            osm_tags: self.osm_tags,
        }
    }
}
