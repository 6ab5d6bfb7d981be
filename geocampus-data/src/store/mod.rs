//! Flat JSON file persistence for the campus document.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use geocampus_core::{CampusState, CampusStore, CampusStoreError};
use geocampus_fs::{ensure_parent_dir, read_utf8_file, write_utf8_file};
use log::{debug, warn};

/// Whole-document JSON file store.
///
/// `load` never fails: a missing file yields the empty default document, and
/// an unreadable or malformed one is downgraded to the same defaults with a
/// logged warning. `save` overwrites the file in a single write, creating
/// missing parent directories first.
///
/// # Examples
/// ```
/// use camino::Utf8PathBuf;
/// use geocampus_core::CampusStore;
/// use geocampus_data::JsonCampusStore;
///
/// let dir = tempfile::tempdir().expect("create temp dir");
/// let path = Utf8PathBuf::from_path_buf(dir.path().join("campus.json"))
///     .expect("UTF-8 temp path");
/// let store = JsonCampusStore::new(path);
///
/// let state = store.load();
/// assert!(state.buildings.is_empty());
/// store.save(&state).expect("persist empty document");
/// ```
#[derive(Debug, Clone)]
pub struct JsonCampusStore {
    path: Utf8PathBuf,
}

impl JsonCampusStore {
    /// Create a store backed by the JSON document at `path`.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl CampusStore for JsonCampusStore {
    fn load(&self) -> CampusState {
        let contents = match read_utf8_file(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(
                    "campus document {path} not found; starting empty",
                    path = self.path
                );
                return CampusState::default();
            }
            Err(err) => {
                warn!(
                    "failed to read campus document {path}: {err}; starting empty",
                    path = self.path
                );
                return CampusState::default();
            }
        };
        match serde_json::from_str(&contents) {
            Ok(state) => state,
            Err(err) => {
                warn!(
                    "campus document {path} is malformed: {err}; starting empty",
                    path = self.path
                );
                CampusState::default()
            }
        }
    }

    fn save(&self, state: &CampusState) -> Result<(), CampusStoreError> {
        let payload = serde_json::to_string_pretty(state)
            .map_err(|source| CampusStoreError::Serialize { source })?;
        ensure_parent_dir(&self.path).map_err(|source| CampusStoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        write_utf8_file(&self.path, &payload).map_err(|source| CampusStoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geocampus_core::Building;
    use rstest::{fixture, rstest};
    use std::fs;

    struct StoreFixture {
        store: JsonCampusStore,
        // Held for its lifetime; the directory is removed on drop.
        _dir: tempfile::TempDir,
    }

    #[fixture]
    fn fixture() -> StoreFixture {
        let dir = tempfile::tempdir().expect("create temporary directory");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("campus.json"))
            .expect("temporary path should be UTF-8");
        StoreFixture {
            store: JsonCampusStore::new(path),
            _dir: dir,
        }
    }

    #[rstest]
    fn missing_file_loads_the_empty_document(fixture: StoreFixture) {
        let state = fixture.store.load();
        assert_eq!(state, CampusState::default());
    }

    #[rstest]
    fn malformed_file_downgrades_to_the_empty_document(fixture: StoreFixture) {
        fs::write(fixture.store.path(), "not json at all").expect("write malformed document");
        let state = fixture.store.load();
        assert_eq!(state, CampusState::default());
    }

    #[rstest]
    fn saved_state_round_trips(fixture: StoreFixture) {
        let mut state = CampusState::default();
        state.buildings.push(Building {
            id: 1,
            nombre_edificio: "Biblioteca Central".to_owned(),
            cord_latitud: -0.21,
            cord_longitud: -78.49,
            osm_id: Some(100),
            ..Building::default()
        });

        fixture.store.save(&state).expect("persist document");
        assert_eq!(fixture.store.load(), state);
    }

    #[rstest]
    fn save_creates_missing_parent_directories(fixture: StoreFixture) {
        let nested = JsonCampusStore::new(
            fixture
                .store
                .path()
                .parent()
                .expect("fixture path has a parent")
                .join("nested/deep/campus.json"),
        );
        nested
            .save(&CampusState::default())
            .expect("persist into created directories");
        assert_eq!(nested.load(), CampusState::default());
    }

    #[rstest]
    fn save_overwrites_the_previous_document(fixture: StoreFixture) {
        let mut first = CampusState::default();
        first.buildings.push(Building::default());
        fixture.store.save(&first).expect("first save");

        let second = CampusState::default();
        fixture.store.save(&second).expect("second save");
        assert_eq!(fixture.store.load(), second);
    }
}
