//! Shared filesystem helpers built on `cap-std` and `camino`.
//!
//! Callers hand over UTF-8 paths; these helpers resolve the containing
//! directory with ambient authority and perform whole-file operations
//! through it.
#![forbid(unsafe_code)]

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Open a UTF-8 file path for reading using ambient authority.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Resolve the directory containing `path` and return it with the file name.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("target should include a file name"))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Read a whole UTF-8 file into a string.
pub fn read_utf8_file(path: &Utf8Path) -> io::Result<String> {
    let (dir, file_name) = open_dir_and_file(path)?;
    dir.read_to_string(file_name.as_str())
}

/// Write `contents` to `path`, replacing any existing file.
pub fn write_utf8_file(path: &Utf8Path, contents: &str) -> io::Result<()> {
    let (dir, file_name) = open_dir_and_file(path)?;
    dir.write(file_name.as_str(), contents)
}

/// Return whether a path exists and is a regular file.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, file_name) = open_dir_and_file(path)?;
    dir.metadata(file_name.as_str())
        .map(|meta| meta.is_file())
}

/// Ensure the parent directory for `path` exists.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }

    let (base, relative) = if parent.is_absolute() {
        let relative = parent
            .strip_prefix("/")
            .map_err(|_| io::Error::other("failed to strip root from absolute path"))?;
        (Utf8PathBuf::from("/"), relative.to_path_buf())
    } else {
        (Utf8PathBuf::from("."), parent.to_path_buf())
    };
    if relative.as_str().is_empty() {
        return Ok(());
    }

    let base_dir = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    base_dir.create_dir_all(&relative)
}
