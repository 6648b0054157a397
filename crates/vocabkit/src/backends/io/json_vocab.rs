//! # JSON Vocabulary IO
//!
//! A JSON object mapping each token to its id:
//! ```json
//! {
//!   "</s>": 0,
//!   "<unk>": 1,
//!   "the": 2
//! }
//! ```

use std::{
    collections::BTreeMap,
    io::{BufRead, Write},
};

use crate::{backends::io::VocabEntries, errors::VocabResult, types::Word};

/// Read vocabulary entries from a JSON object.
pub fn read_json_entries<R: BufRead>(reader: R) -> VocabResult<VocabEntries> {
    let map: BTreeMap<String, Word> = serde_json::from_reader(reader)?;
    Ok(map.into_iter().collect())
}

/// Write vocabulary entries as a JSON object, one entry per line, sorted by id.
pub fn write_json_entries<W: Write + ?Sized>(
    entries: &[(String, Word)],
    writer: &mut W,
) -> VocabResult<()> {
    let mut items: Vec<&(String, Word)> = entries.iter().collect();
    items.sort_by_key(|(_, id)| *id);

    writeln!(writer, "{{")?;
    for (idx, (token, id)) in items.iter().enumerate() {
        let sep = if idx + 1 == items.len() { "" } else { "," };
        writeln!(writer, "  {}: {id}{sep}", serde_json::to_string(token)?)?;
    }
    writeln!(writer, "}}")?;

    Ok(())
}
