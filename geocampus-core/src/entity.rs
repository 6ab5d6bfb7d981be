use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// OpenStreetMap-style free-form key/value tags.
pub type Tags = HashMap<String, String>;

/// A campus building as persisted in the datastore document.
///
/// Field names follow the JSON contract consumed by the admin frontend,
/// which is why they are Spanish. `id` is assigned by the datastore when the
/// record is first persisted and is distinct from `osm_id`, the identifier
/// the record carried in the map data it was imported from (if any).
///
/// # Examples
/// ```
/// use geocampus_core::Building;
///
/// let record: Building =
///     serde_json::from_str(r#"{"id": 3, "nombre_edificio": "Biblioteca Central"}"#)
///         .expect("parse building record");
/// assert!(record.estado);
/// assert_eq!(record.disponibilidad, "Disponible");
/// assert_eq!(record.osm_id, None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Building {
    /// Collection-local sequential identifier.
    pub id: u64,
    /// Display name.
    pub nombre_edificio: String,
    /// Short name or acronym; empty when unknown.
    pub acronimo: String,
    /// Building subtype (e.g. `"library"`, or the generic `"building"`).
    pub tipo: String,
    /// Street address; empty when unknown.
    pub direccion: String,
    /// Latitude in WGS84 degrees.
    pub cord_latitud: f64,
    /// Longitude in WGS84 degrees.
    pub cord_longitud: f64,
    /// Whether the building is active.
    pub estado: bool,
    /// Availability label shown to users.
    pub disponibilidad: String,
    /// Hosted image reference; empty when none has been uploaded.
    pub imagen: String,
    /// Marker set on records appended by an OSM import.
    pub created_from_osm: bool,
    /// RFC 3339 timestamp of the import run that created the record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported_at: Option<String>,
    /// Identifier of the OSM element the record was derived from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub osm_id: Option<i64>,
    /// Raw tags of the source OSM element, kept for traceability.
    #[serde(skip_serializing_if = "Tags::is_empty")]
    pub osm_tags: Tags,
}

impl Default for Building {
    fn default() -> Self {
        Self {
            id: 0,
            nombre_edificio: String::new(),
            acronimo: String::new(),
            tipo: String::new(),
            direccion: String::new(),
            cord_latitud: 0.0,
            cord_longitud: 0.0,
            estado: true,
            disponibilidad: "Disponible".to_owned(),
            imagen: String::new(),
            created_from_osm: false,
            imported_at: None,
            osm_id: None,
            osm_tags: Tags::new(),
        }
    }
}

/// A floor inside a building.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Floor {
    /// Collection-local sequential identifier.
    pub id: u64,
    /// Owning building.
    pub id_edificio: u64,
    /// Floor number, negative for basements.
    pub numero_piso: i32,
    /// Display name; empty when the number suffices.
    pub nombre_piso: String,
}

/// A room on a floor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Room {
    /// Collection-local sequential identifier.
    pub id: u64,
    /// Owning floor.
    pub id_piso: u64,
    /// Display name.
    pub nombre_sala: String,
    /// Room category (lecture hall, laboratory, office, ...).
    pub tipo_sala: String,
}

/// A bathroom on a floor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Bathroom {
    /// Collection-local sequential identifier.
    pub id: u64,
    /// Owning floor.
    pub id_piso: u64,
    /// Gender designation label.
    pub genero: String,
}

/// A faculty owning buildings on campus.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Faculty {
    /// Collection-local sequential identifier.
    pub id: u64,
    /// Display name.
    pub nombre_facultad: String,
}

/// The whole persisted campus document.
///
/// Persistence is whole-document: stores load and save this value as a unit.
///
/// # Examples
/// ```
/// use geocampus_core::CampusState;
///
/// let state = CampusState::default();
/// assert!(state.buildings.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CampusState {
    /// Campus buildings.
    pub buildings: Vec<Building>,
    /// Floors across all buildings.
    pub floors: Vec<Floor>,
    /// Rooms across all floors.
    pub rooms: Vec<Room>,
    /// Bathrooms across all floors.
    pub bathrooms: Vec<Bathroom>,
    /// Faculties.
    pub faculties: Vec<Faculty>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn building_defaults_mark_it_available() {
        let record = Building::default();
        assert!(record.estado);
        assert_eq!(record.disponibilidad, "Disponible");
        assert!(record.imagen.is_empty());
        assert!(!record.created_from_osm);
    }

    #[rstest]
    fn building_round_trips_through_json() {
        let mut record = Building {
            id: 7,
            nombre_edificio: "Facultad de Ingeniería".to_owned(),
            tipo: "university".to_owned(),
            cord_latitud: -0.21,
            cord_longitud: -78.49,
            osm_id: Some(42),
            ..Building::default()
        };
        record
            .osm_tags
            .insert("building".to_owned(), "university".to_owned());

        let encoded = serde_json::to_string(&record).expect("serialise building");
        let decoded: Building = serde_json::from_str(&encoded).expect("parse building");
        assert_eq!(decoded, record);
    }

    #[rstest]
    fn building_omits_absent_markers_from_json() {
        let encoded =
            serde_json::to_string(&Building::default()).expect("serialise default building");
        assert!(!encoded.contains("imported_at"));
        assert!(!encoded.contains("osm_id"));
        assert!(!encoded.contains("osm_tags"));
    }

    #[rstest]
    fn state_tolerates_missing_collections() {
        let state: CampusState =
            serde_json::from_str(r#"{"buildings": []}"#).expect("parse partial document");
        assert!(state.floors.is_empty());
        assert!(state.faculties.is_empty());
    }
}
