//! # Base64 Vocabulary IO

use std::{
    fs::File,
    io::{BufRead, BufReader, Write},
    path::Path,
};

use base64::{Engine, prelude::BASE64_STANDARD};

use crate::{
    backends::io::{VocabEntries, write_file_atomically},
    errors::{VocabError, VocabResult},
    types::Word,
};

/// Load vocabulary entries from a base64 vocab file.
///
/// Lines are:
/// ```terminaloutput
/// {BASE64 PIECE} {TOKEN}
/// ```
///
/// # Arguments
/// * `path` - the path to the vocabulary file.
pub fn load_base64_entries_path<P: AsRef<Path>>(path: P) -> VocabResult<VocabEntries> {
    let reader = BufReader::new(File::open(path)?);
    read_base64_entries(reader)
}

/// Read vocabulary entries from a base64 vocab line reader.
///
/// Blank lines are skipped; pieces must be valid UTF-8.
pub fn read_base64_entries<R: BufRead>(reader: R) -> VocabResult<VocabEntries> {
    let mut entries = VocabEntries::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let s = line.trim_end();
        if s.is_empty() {
            continue;
        }

        let (piece, id) = s.split_once(' ').ok_or_else(|| {
            VocabError::Parse(format!("line {}: expected '{{piece}} {{id}}'", idx + 1))
        })?;

        let piece = BASE64_STANDARD
            .decode(piece)
            .map_err(|e| VocabError::Parse(format!("line {}: {e}", idx + 1)))?;
        let piece = String::from_utf8(piece)
            .map_err(|e| VocabError::Parse(format!("line {}: {e}", idx + 1)))?;

        let id: Word = id
            .parse()
            .map_err(|e: core::num::ParseIntError| {
                VocabError::Parse(format!("line {}: {e}", idx + 1))
            })?;

        entries.push((piece, id));
    }

    Ok(entries)
}

/// Save vocabulary entries to a base64 vocab file.
///
/// # Arguments
/// * `entries` - the vocabulary to save.
/// * `path` - the path to save the vocabulary to.
pub fn save_base64_entries_path<P: AsRef<Path>>(
    entries: &[(String, Word)],
    path: P,
) -> VocabResult<()> {
    write_file_atomically(path, |writer| write_base64_entries(entries, writer))
}

/// Write vocabulary entries to a [`Write`] writer, sorted by id.
pub fn write_base64_entries<W: Write + ?Sized>(
    entries: &[(String, Word)],
    writer: &mut W,
) -> VocabResult<()> {
    let mut items: Vec<&(String, Word)> = entries.iter().collect();
    items.sort_by_key(|(_, id)| *id);

    for (piece, id) in items {
        writeln!(writer, "{} {}", BASE64_STANDARD.encode(piece), id)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_save_load_base64() {
        let entries: VocabEntries = vec![
            ("</s>".to_string(), 0),
            ("<unk>".to_string(), 1),
            ("▁the".to_string(), 3),
            ("a b".to_string(), 2),
        ];

        let dir = tempdir::TempDir::new("vocab_test").unwrap();
        let path = dir.path().join("vocab.bpe");

        save_base64_entries_path(&entries, &path).expect("Failed to save vocab");
        let mut loaded = load_base64_entries_path(&path).expect("Failed to load vocab");
        loaded.sort_by_key(|(_, id)| *id);

        let mut expected = entries.clone();
        expected.sort_by_key(|(_, id)| *id);
        assert_eq!(loaded, expected);
    }

    #[test]
    fn test_read_base64_bad_lines() {
        assert!(matches!(
            read_base64_entries(Cursor::new("no-id-here\n")),
            Err(VocabError::Parse(_))
        ));
        assert!(matches!(
            read_base64_entries(Cursor::new("!!!! 3\n")),
            Err(VocabError::Parse(_))
        ));
        assert!(matches!(
            read_base64_entries(Cursor::new("YQ== x\n")),
            Err(VocabError::Parse(_))
        ));
    }
}
