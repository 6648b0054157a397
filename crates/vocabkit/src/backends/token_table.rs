//! # Token Table
//!
//! The bidirectional ``token <-> id`` table shared by the backends.

use crate::{
    errors::{VocabError, VocabResult},
    types::{EOS_STR, UNK_STR, VKHashMap, Word, word_from_index},
};

/// Dense bidirectional token table.
///
/// Ids are contiguous in ``[0, len)``; every token has exactly one id.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct TokenTable {
    /// Tokens indexed by id.
    id_tokens: Vec<String>,

    /// The reverse map.
    token_ids: VKHashMap<String, Word>,
}

impl TokenTable {
    /// Build a table from tokens in id order.
    ///
    /// ## Errors
    /// Returns [`VocabError::Malformed`] on duplicate tokens.
    pub fn from_tokens<I, S>(tokens: I) -> VocabResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::default();
        for token in tokens {
            table.push(token.into())?;
        }
        Ok(table)
    }

    /// Build a table from loaded ``(token, id)`` entries.
    ///
    /// Entries with ``id >= max`` are dropped when `max > 0`.
    ///
    /// ## Errors
    /// * [`VocabError::Malformed`] on duplicate ids or tokens.
    /// * [`VocabError::SparseIds`] if the kept ids are not ``[0, len)``.
    pub fn from_entries(
        entries: Vec<(String, Word)>,
        max: usize,
    ) -> VocabResult<Self> {
        // A dense table never holds an id at or past its entry count.
        let limit = entries.len();
        let mut slots: Vec<Option<String>> = vec![None; limit];
        let mut out_of_range = 0usize;

        for (token, id) in entries {
            let index = id as usize;
            if max > 0 && index >= max {
                continue;
            }
            let Some(slot) = slots.get_mut(index) else {
                out_of_range += 1;
                continue;
            };
            if let Some(prev) = slot {
                return Err(VocabError::Malformed(format!(
                    "id {id} assigned to both {prev:?} and {token:?}"
                )));
            }
            *slot = Some(token);
        }

        if out_of_range == 0 {
            while slots.last().is_some_and(Option::is_none) {
                slots.pop();
            }
        }

        let size = slots.iter().filter(|s| s.is_some()).count() + out_of_range;
        let mut table = Self::default();
        for (index, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(token) => {
                    table.push(token)?;
                }
                None => return Err(VocabError::SparseIds { missing: index, size }),
            }
        }
        Ok(table)
    }

    /// Iterate ``(id, token)`` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (Word, &str)> + '_ {
        self.id_tokens
            .iter()
            .enumerate()
            .map(|(idx, token)| (word_from_index(idx), token.as_str()))
    }

    /// Append a token at the next id.
    ///
    /// ## Errors
    /// Returns [`VocabError::Malformed`] if the token is already present.
    pub fn push(
        &mut self,
        token: String,
    ) -> VocabResult<Word> {
        if self.token_ids.contains_key(&token) {
            return Err(VocabError::Malformed(format!("duplicate token {token:?}")));
        }
        let id = word_from_index(self.id_tokens.len());
        self.token_ids.insert(token.clone(), id);
        self.id_tokens.push(token);
        Ok(id)
    }

    /// Append a token unless present; returns its id either way.
    pub fn insert(
        &mut self,
        token: &str,
    ) -> Word {
        match self.token_ids.get(token) {
            Some(&id) => id,
            None => {
                let id = word_from_index(self.id_tokens.len());
                self.token_ids.insert(token.to_string(), id);
                self.id_tokens.push(token.to_string());
                id
            }
        }
    }

    /// The number of tokens.
    pub fn len(&self) -> usize {
        self.id_tokens.len()
    }

    /// True if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.id_tokens.is_empty()
    }

    /// Look up the id of a token.
    pub fn lookup_id(
        &self,
        token: &str,
    ) -> Option<Word> {
        self.token_ids.get(token).copied()
    }

    /// Look up the token for an id.
    pub fn lookup_token(
        &self,
        id: Word,
    ) -> Option<&str> {
        self.id_tokens.get(id as usize).map(String::as_str)
    }

    /// Look up a reserved symbol, which must be present.
    pub fn require(
        &self,
        symbol: &'static str,
    ) -> VocabResult<Word> {
        self.lookup_id(symbol)
            .ok_or(VocabError::MissingReservedSymbol { symbol })
    }

    /// Look up the ``(eos, unk)`` ids.
    pub fn reserved_ids(&self) -> VocabResult<(Word, Word)> {
        Ok((self.require(EOS_STR)?, self.require(UNK_STR)?))
    }

    /// The ``(token, id)`` entries, in id order.
    pub fn entries(&self) -> Vec<(String, Word)> {
        self.id_tokens
            .iter()
            .enumerate()
            .map(|(idx, token)| (token.clone(), word_from_index(idx)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tokens() {
        let table = TokenTable::from_tokens([EOS_STR, UNK_STR, "a"]).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.lookup_id("a"), Some(2));
        assert_eq!(table.lookup_token(2), Some("a"));
        assert_eq!(table.lookup_token(3), None);
        assert_eq!(table.reserved_ids().unwrap(), (0, 1));

        assert!(matches!(
            TokenTable::from_tokens(["a", "a"]),
            Err(VocabError::Malformed(_))
        ));
    }

    #[test]
    fn test_from_entries_unordered() {
        let entries = vec![
            ("b".to_string(), 2),
            (UNK_STR.to_string(), 0),
            (EOS_STR.to_string(), 1),
        ];
        let table = TokenTable::from_entries(entries, 0).unwrap();
        assert_eq!(table.reserved_ids().unwrap(), (1, 0));
        assert_eq!(table.entries()[2], ("b".to_string(), 2));
    }

    #[test]
    fn test_from_entries_max() {
        let entries = vec![
            (EOS_STR.to_string(), 0),
            (UNK_STR.to_string(), 1),
            ("a".to_string(), 2),
            ("b".to_string(), 3),
        ];
        let table = TokenTable::from_entries(entries, 3).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.lookup_id("b"), None);
    }

    #[test]
    fn test_from_entries_errors() {
        let sparse = vec![("a".to_string(), 0), ("b".to_string(), 2)];
        assert!(matches!(
            TokenTable::from_entries(sparse, 0),
            Err(VocabError::SparseIds { missing: 1, size: 2 })
        ));

        let dup_id = vec![("a".to_string(), 0), ("b".to_string(), 0)];
        assert!(matches!(
            TokenTable::from_entries(dup_id, 0),
            Err(VocabError::Malformed(_))
        ));

        let gap_at_end = vec![("a".to_string(), 0), ("b".to_string(), 1), ("c".to_string(), 3)];
        assert!(matches!(
            TokenTable::from_entries(gap_at_end, 0),
            Err(VocabError::SparseIds { missing: 2, size: 3 })
        ));

        let no_unk = TokenTable::from_tokens([EOS_STR, "a"]).unwrap();
        assert!(matches!(
            no_unk.reserved_ids(),
            Err(VocabError::MissingReservedSymbol { symbol: UNK_STR })
        ));
    }

    #[test]
    fn test_from_entries_huge_id() {
        let entries = vec![
            (EOS_STR.to_string(), 0),
            (UNK_STR.to_string(), 1),
            ("x".to_string(), 4_000_000_000),
        ];
        assert!(matches!(
            TokenTable::from_entries(entries.clone(), 0),
            Err(VocabError::SparseIds { missing: 2, size: 3 })
        ));

        // Ids past `max` are dropped before the range check.
        let table = TokenTable::from_entries(entries, 2).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_iter() {
        let table = TokenTable::from_tokens([EOS_STR, UNK_STR, "a"]).unwrap();
        let items: Vec<(Word, &str)> = table.iter().collect();
        assert_eq!(items, vec![(0, EOS_STR), (1, UNK_STR), (2, "a")]);
    }

    #[test]
    fn test_insert() {
        let mut table = TokenTable::default();
        assert_eq!(table.insert("x"), 0);
        assert_eq!(table.insert("y"), 1);
        assert_eq!(table.insert("x"), 0);
        assert_eq!(table.len(), 2);
    }
}
