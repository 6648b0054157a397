//! # Default Word Vocabulary
//!
//! Whitespace word-level vocabulary. Every word is a token;
//! words outside the table map to ``<unk>``.

use std::{
    io::{BufRead, Write},
    path::Path,
};

use crate::{
    backends::{
        BackendKind,
        TokenTable,
        VocabBackend,
        io::{load_word_entries_path, save_word_entries_path, write_json_entries},
    },
    corpus::{WordCounter, open_corpus},
    errors::{VocabError, VocabResult},
    types::{EOS_STR, RESERVED_SYMBOL_COUNT, UNK_STR, Word, Words},
};

/// Suffixes for word vocabularies; the first is canonical.
pub const DEFAULT_VOCAB_SUFFIXES: &[&str] = &[".json", ".txt"];

/// Word-level vocabulary backend.
///
/// Always available, and the only backend constructible from streams.
#[derive(Debug, Default, Clone)]
pub struct DefaultVocab {
    table: TokenTable,
    eos_id: Word,
    unk_id: Word,
}

impl DefaultVocab {
    /// Create an empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the ordered token list for a counted corpus.
    ///
    /// Reserved symbols come first, then words by descending count.
    /// `max_size > 0` caps the total length.
    fn build_tokens(
        counter: &WordCounter,
        max_size: usize,
    ) -> Vec<String> {
        let mut tokens: Vec<String> = vec![EOS_STR.to_string(), UNK_STR.to_string()];
        tokens.extend(
            counter
                .sorted_words()
                .into_iter()
                .filter(|(word, _)| *word != EOS_STR && *word != UNK_STR)
                .map(|(word, _)| word.to_string()),
        );
        if max_size > 0 {
            tokens.truncate(max_size.max(RESERVED_SYMBOL_COUNT));
        }
        tokens
    }

    fn set_table(
        &mut self,
        table: TokenTable,
    ) -> VocabResult<usize> {
        let (eos_id, unk_id) = table.reserved_ids()?;
        self.table = table;
        self.eos_id = eos_id;
        self.unk_id = unk_id;
        Ok(self.table.len())
    }
}

impl VocabBackend for DefaultVocab {
    fn kind(&self) -> BackendKind {
        BackendKind::Default
    }

    fn suffixes(&self) -> &'static [&'static str] {
        DEFAULT_VOCAB_SUFFIXES
    }

    fn load(
        &mut self,
        path: &Path,
        max: usize,
    ) -> VocabResult<usize> {
        log::debug!("loading word vocabulary {}", path.display());
        let table = TokenTable::from_entries(load_word_entries_path(path)?, max)?;
        self.set_table(table)
    }

    fn create(
        &mut self,
        vocab_path: &Path,
        train_path: &Path,
    ) -> VocabResult<()> {
        if vocab_path.exists() {
            return Err(VocabError::AlreadyExists {
                path: vocab_path.to_path_buf(),
            });
        }

        log::info!(
            "Creating vocabulary {} from {}",
            vocab_path.display(),
            train_path.display()
        );

        let mut counter = WordCounter::new();
        counter.update_from_reader(&mut open_corpus(train_path)?)?;

        let tokens = Self::build_tokens(&counter, 0);
        let table = TokenTable::from_tokens(tokens)?;
        save_word_entries_path(&table.entries(), vocab_path)
    }

    fn create_from_stream(
        &mut self,
        train: &mut dyn BufRead,
        vocab: &mut dyn Write,
        max_size: usize,
    ) -> VocabResult<()> {
        let mut counter = WordCounter::new();
        counter.update_from_reader(train)?;
        log::info!("counted {} distinct words", counter.len());

        let table = TokenTable::from_tokens(Self::build_tokens(&counter, max_size))?;
        write_json_entries(&table.entries(), vocab)?;
        vocab.flush()?;

        self.set_table(table)?;
        Ok(())
    }

    fn create_fake(&mut self) -> VocabResult<()> {
        self.set_table(TokenTable::from_tokens([EOS_STR, UNK_STR])?)?;
        Ok(())
    }

    fn word(
        &self,
        token: &str,
    ) -> Word {
        self.table.lookup_id(token).unwrap_or(self.unk_id)
    }

    fn token(
        &self,
        id: Word,
    ) -> Option<&str> {
        self.table.lookup_token(id)
    }

    fn encode(
        &self,
        line: &str,
        add_eos: bool,
        _inference: bool,
    ) -> Words {
        let mut words: Words = line.split_whitespace().map(|w| self.word(w)).collect();
        if add_eos {
            words.push(self.eos_id);
        }
        words
    }

    fn decode(
        &self,
        words: &[Word],
        ignore_eos: bool,
    ) -> VocabResult<String> {
        let mut tokens = Vec::with_capacity(words.len());
        for &id in words {
            if ignore_eos && id == self.eos_id {
                continue;
            }
            tokens.push(self.token(id).ok_or(VocabError::InvalidId(id))?);
        }
        Ok(tokens.join(" "))
    }

    fn size(&self) -> usize {
        self.table.len()
    }

    fn eos_id(&self) -> Word {
        self.eos_id
    }

    fn unk_id(&self) -> Word {
        self.unk_id
    }
}
