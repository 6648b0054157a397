//! # Path Utilities

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

/// Append a raw suffix to a path, without treating it as an extension.
///
/// ``append_suffix("corpus.txt", ".json") == "corpus.txt.json"``
///
/// * Does not check that the path exists.
pub fn append_suffix<P: AsRef<Path>>(
    path: P,
    suffix: &str,
) -> PathBuf {
    let mut raw: OsString = path.as_ref().as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

/// True if the path's file name ends with `suffix`.
pub fn has_suffix<P: AsRef<Path>>(
    path: P,
    suffix: &str,
) -> bool {
    path.as_ref()
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.len() > suffix.len() && name.ends_with(suffix))
}
