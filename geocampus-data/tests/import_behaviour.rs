//! Behavioural tests for the `run_import` and `preview` entry points.

use std::{cell::RefCell, fs, path::PathBuf};

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempPath;

use geocampus_core::{Building, CampusState, CampusStore, InMemoryStore};
use geocampus_data::{
    ExtractionReport, ImportError, ImportReport, MergeMode, MergeOptions, preview, run_import,
};

mod support;

use support::{LIBRARY_OSM, utf8_path, write_fixture};

#[fixture]
fn osm_file() -> RefCell<Option<TempPath>> {
    RefCell::new(None)
}

#[fixture]
fn campus_store() -> InMemoryStore {
    InMemoryStore::default()
}

#[fixture]
fn import_result() -> RefCell<Option<Result<ImportReport, ImportError>>> {
    RefCell::new(None)
}

#[fixture]
fn preview_result() -> RefCell<Option<Result<ExtractionReport, ImportError>>> {
    RefCell::new(None)
}

fn fixture_path(file: &RefCell<Option<TempPath>>) -> camino::Utf8PathBuf {
    let guard = file.borrow();
    let temp = guard.as_ref().expect("OSM fixture prepared");
    utf8_path(temp.as_ref())
}

fn expect_report(result: &RefCell<Option<Result<ImportReport, ImportError>>>) -> ImportReport {
    result
        .borrow()
        .as_ref()
        .expect("import was attempted")
        .as_ref()
        .expect("expected a successful import")
        .clone()
}

#[given("an OSM file with one named building way")]
fn library_fixture(#[from(osm_file)] file: &RefCell<Option<TempPath>>) {
    *file.borrow_mut() = Some(write_fixture(LIBRARY_OSM));
}

#[given("an empty campus store")]
fn empty_store(#[from(campus_store)] store: &InMemoryStore) {
    assert!(store.snapshot().buildings.is_empty());
}

#[given("a campus store that already imported the file")]
fn pre_imported_store(
    #[from(osm_file)] file: &RefCell<Option<TempPath>>,
    #[from(campus_store)] store: &InMemoryStore,
) {
    run_import(store, &fixture_path(file), &MergeOptions::default())
        .expect("seed import succeeds");
}

#[given("a campus store holding an unrelated building")]
fn seeded_store(#[from(campus_store)] store: &InMemoryStore) {
    let mut state = CampusState::default();
    state.buildings.push(Building {
        id: 9,
        nombre_edificio: "Old Hall".to_owned(),
        ..Building::default()
    });
    store.save(&state).expect("seed the store");
}

#[when("I run the import with default options")]
fn run_default_import(
    #[from(osm_file)] file: &RefCell<Option<TempPath>>,
    #[from(campus_store)] store: &InMemoryStore,
    #[from(import_result)] result: &RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    let outcome = run_import(store, &fixture_path(file), &MergeOptions::default());
    *result.borrow_mut() = Some(outcome);
}

#[when("I run the import in replace mode")]
fn run_replace_import(
    #[from(osm_file)] file: &RefCell<Option<TempPath>>,
    #[from(campus_store)] store: &InMemoryStore,
    #[from(import_result)] result: &RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    let options = MergeOptions {
        mode: MergeMode::Replace,
        ..MergeOptions::default()
    };
    let outcome = run_import(store, &fixture_path(file), &options);
    *result.borrow_mut() = Some(outcome);
}

#[when("I preview the file")]
fn run_preview(
    #[from(osm_file)] file: &RefCell<Option<TempPath>>,
    #[from(preview_result)] result: &RefCell<Option<Result<ExtractionReport, ImportError>>>,
) {
    let outcome = preview(&fixture_path(file));
    *result.borrow_mut() = Some(outcome);
}

#[then("the report counts one added building")]
fn one_added(#[from(import_result)] result: &RefCell<Option<Result<ImportReport, ImportError>>>) {
    let report = expect_report(result);
    assert_eq!(report.added, 1, "expected one added building");
    assert_eq!(report.final_count, 1, "expected one record after the run");
}

#[then("the report counts zero added and one skipped")]
fn zero_added_one_skipped(
    #[from(import_result)] result: &RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    let report = expect_report(result);
    assert_eq!(report.added, 0, "expected no added buildings");
    assert_eq!(report.skipped, 1, "expected one skipped candidate");
}

#[then("the store holds one building named Library")]
fn store_holds_library(#[from(campus_store)] store: &InMemoryStore) {
    let state = store.snapshot();
    assert_eq!(state.buildings.len(), 1, "expected exactly one record");
    let record = state.buildings.first().expect("one record");
    assert_eq!(record.nombre_edificio, "Library");
    assert!(record.created_from_osm);
}

#[then("the store still holds one building")]
fn store_still_one(#[from(campus_store)] store: &InMemoryStore) {
    assert_eq!(store.snapshot().buildings.len(), 1);
}

#[then("the preview lists one building candidate")]
fn preview_lists_candidate(
    #[from(preview_result)] result: &RefCell<Option<Result<ExtractionReport, ImportError>>>,
) {
    let borrowed = result.borrow();
    let outcome = borrowed.as_ref().expect("preview was attempted");
    let report = outcome.as_ref().expect("expected a successful preview");
    assert_eq!(report.buildings.len(), 1);
    let candidate = report.buildings.first().expect("candidate");
    assert_eq!(candidate.nombre_edificio, "Library");
}

#[then("the store was never written")]
fn store_never_written(#[from(campus_store)] store: &InMemoryStore) {
    assert_eq!(store.save_count(), 0, "preview must not persist anything");
}

#[test]
fn scenario_indices_follow_feature_order() {
    let feature =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/features/import_osm.feature");
    let contents = fs::read_to_string(&feature).unwrap_or_else(|err| {
        panic!("failed to read feature file {feature:?}: {err}");
    });
    let titles: Vec<String> = contents
        .lines()
        .filter_map(|line| line.trim().strip_prefix("Scenario: "))
        .map(|title| title.to_owned())
        .collect();
    let expected = [
        "importing into an empty registry",
        "re-importing the same file skips duplicates",
        "replace mode discards prior records",
        "previewing reports candidates without writing",
    ];
    assert_eq!(
        titles.len(),
        expected.len(),
        "scenario count changed in feature file: {titles:?}"
    );
    for (index, expected_title) in expected.iter().enumerate() {
        let actual = titles.get(index).map(String::as_str);
        assert_eq!(
            actual,
            Some(*expected_title),
            "scenario at index {index} does not match feature order"
        );
    }
}

#[scenario(path = "tests/features/import_osm.feature", index = 0)]
fn importing_into_an_empty_registry(
    osm_file: RefCell<Option<TempPath>>,
    campus_store: InMemoryStore,
    import_result: RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    let _ = (osm_file, campus_store, import_result);
}

#[scenario(path = "tests/features/import_osm.feature", index = 1)]
fn reimporting_skips_duplicates(
    osm_file: RefCell<Option<TempPath>>,
    campus_store: InMemoryStore,
    import_result: RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    let _ = (osm_file, campus_store, import_result);
}

#[scenario(path = "tests/features/import_osm.feature", index = 2)]
fn replace_mode_discards_prior_records(
    osm_file: RefCell<Option<TempPath>>,
    campus_store: InMemoryStore,
    import_result: RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    let _ = (osm_file, campus_store, import_result);
}

#[scenario(path = "tests/features/import_osm.feature", index = 3)]
fn previewing_without_writing(
    osm_file: RefCell<Option<TempPath>>,
    campus_store: InMemoryStore,
    preview_result: RefCell<Option<Result<ExtractionReport, ImportError>>>,
) {
    let _ = (osm_file, campus_store, preview_result);
}
