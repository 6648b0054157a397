//! # Vocabulary IO
//!
//! Readers and writers for the persisted vocabulary formats:
//! * JSON token maps and token-per-line text, used by [`crate::backends::DefaultVocab`];
//! * base64 piece lists, used by [`crate::backends::SubwordVocab`].

mod base64_vocab;
mod json_vocab;
mod text_vocab;

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

#[doc(inline)]
pub use base64_vocab::*;
#[doc(inline)]
pub use json_vocab::*;
#[doc(inline)]
pub use text_vocab::*;

use crate::{errors::VocabResult, path_utils::append_suffix, types::Word};

/// ``(token, id)`` pairs as read from or written to a vocabulary file.
pub type VocabEntries = Vec<(String, Word)>;

/// True if the path names a JSON vocabulary.
pub fn is_json_path(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Load word vocabulary entries, choosing the format by file extension.
///
/// ``*.json`` files are JSON token maps; everything else is token-per-line text.
pub fn load_word_entries_path<P: AsRef<Path>>(path: P) -> VocabResult<VocabEntries> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    if is_json_path(path) {
        read_json_entries(reader)
    } else {
        read_text_entries(reader)
    }
}

/// Suffix of the scratch file a save writes before renaming into place.
pub const PARTIAL_SUFFIX: &str = ".partial";

/// Write a file through a scratch sibling, renaming it over `path` on success.
///
/// A failed write removes the scratch file and leaves `path` untouched, so
/// readers never observe a truncated vocabulary.
///
/// ## Arguments
/// * `path` - the final destination.
/// * `write` - fills the buffered writer.
pub fn write_file_atomically<P, F>(
    path: P,
    write: F,
) -> VocabResult<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<File>) -> VocabResult<()>,
{
    let path = path.as_ref();
    let partial = append_suffix(path, PARTIAL_SUFFIX);

    let result = (|| -> VocabResult<()> {
        {
            let mut writer = BufWriter::new(File::create(&partial)?);
            write(&mut writer)?;
            writer.flush()?;
        }
        std::fs::rename(&partial, path)?;
        Ok(())
    })();

    if result.is_err()
        && partial.exists()
        && let Err(err) = std::fs::remove_file(&partial)
    {
        log::warn!("failed to remove {}: {err}", partial.display());
    }
    result
}

/// Save word vocabulary entries, choosing the format by file extension.
pub fn save_word_entries_path<P: AsRef<Path>>(
    entries: &[(String, Word)],
    path: P,
) -> VocabResult<()> {
    let path = path.as_ref();
    write_file_atomically(path, |writer| {
        if is_json_path(path) {
            write_json_entries(entries, writer)
        } else {
            write_text_entries(entries, writer)
        }
    })
}
