//! Shared helpers for the behaviour suite.

use std::io::Write;
use std::path::Path;

use camino::Utf8PathBuf;
use tempfile::{Builder, TempPath};

/// XML document with two nodes and one named building way.
pub const LIBRARY_OSM: &str = r#"<osm>
  <node id="1" lat="10.0" lon="20.0"/>
  <node id="2" lat="12.0" lon="22.0"/>
  <way id="100">
    <nd ref="1"/>
    <nd ref="2"/>
    <tag k="building" v="yes"/>
    <tag k="name" v="Library"/>
  </way>
</osm>"#;

/// Write an OSM XML fixture to a temporary file.
pub fn write_fixture(contents: &str) -> TempPath {
    let mut file = Builder::new()
        .prefix("campus")
        .suffix(".osm")
        .tempfile()
        .unwrap_or_else(|err| panic!("failed to create temporary fixture: {err}"));
    file.write_all(contents.as_bytes())
        .unwrap_or_else(|err| panic!("failed to write fixture: {err}"));
    file.flush()
        .unwrap_or_else(|err| panic!("failed to flush fixture: {err}"));
    file.into_temp_path()
}

/// UTF-8 view of a fixture path.
pub fn utf8_path(path: &Path) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(path.to_path_buf())
        .unwrap_or_else(|path| panic!("fixture path is not UTF-8: {path:?}"))
}
