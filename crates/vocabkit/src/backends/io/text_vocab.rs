//! # Plain Text Vocabulary IO
//!
//! One token per line; a token's id is its line number (from 0).

use std::io::{BufRead, Write};

use crate::{
    backends::io::VocabEntries,
    errors::{VocabError, VocabResult},
    types::{Word, word_from_index},
};

/// Read vocabulary entries from a token-per-line reader.
///
/// Tokens are trimmed; an empty line is a malformed vocabulary.
pub fn read_text_entries<R: BufRead>(reader: R) -> VocabResult<VocabEntries> {
    let mut entries = VocabEntries::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let token = line.trim();
        if token.is_empty() {
            return Err(VocabError::Malformed(format!("empty token on line {}", idx + 1)));
        }
        entries.push((token.to_string(), word_from_index(idx)));
    }
    Ok(entries)
}

/// Write vocabulary entries one per line, in id order.
pub fn write_text_entries<W: Write + ?Sized>(
    entries: &[(String, Word)],
    writer: &mut W,
) -> VocabResult<()> {
    let mut items: Vec<&(String, Word)> = entries.iter().collect();
    items.sort_by_key(|(_, id)| *id);

    for (token, _) in items {
        writeln!(writer, "{token}")?;
    }
    Ok(())
}
