//! # Subword Segmentation Vocabulary
//!
//! Pair-merge subword backend. Trained models are persisted as base64
//! piece lists (see [`crate::backends::io::read_base64_entries`]);
//! a piece's id doubles as its merge rank.
//!
//! On load, every piece that splits into two known pieces is indexed as a
//! ``(left, right) -> piece`` merge, so segmentation works on ids alone.

use std::{
    io::{BufRead, Write},
    path::Path,
};

use parking_lot::{Mutex, MutexGuard};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    backends::{
        BackendKind,
        SubwordTrainerOptions,
        TokenTable,
        VocabBackend,
        WORD_START,
        io::{load_base64_entries_path, save_base64_entries_path},
    },
    corpus::{WordCounter, open_corpus, sample_lines},
    errors::{VocabError, VocabResult},
    options::VocabOptions,
    path_utils::has_suffix,
    types::{EOS_STR, UNK_STR, VKHashMap, Word, Words},
};

/// Suffixes for subword models.
pub const SUBWORD_VOCAB_SUFFIXES: &[&str] = &[".bpe"];

/// How an unknown piece is rendered when decoding.
pub const UNK_SURFACE: &str = "\u{2047}";

/// Subword segmentation backend.
///
/// Only constructible for model paths (see [`SubwordVocab::probe`]);
/// refuses stream and fake creation.
#[derive(Debug)]
pub struct SubwordVocab {
    options: VocabOptions,
    batch_index: usize,
    table: TokenTable,
    merges: VKHashMap<(Word, Word), Word>,
    eos_id: Word,
    unk_id: Word,
    rng: Mutex<StdRng>,
}

/// Index every piece that is the concatenation of two other pieces.
fn build_merges(table: &TokenTable) -> VKHashMap<(Word, Word), Word> {
    let mut merges: VKHashMap<(Word, Word), Word> = VKHashMap::default();
    for (id, piece) in table.iter() {
        for (split, _) in piece.char_indices().skip(1) {
            let (left, right) = piece.split_at(split);
            if let (Some(left), Some(right)) = (table.lookup_id(left), table.lookup_id(right)) {
                merges.insert((left, right), id);
            }
        }
    }
    merges
}

impl SubwordVocab {
    /// Create an empty subword vocabulary.
    pub fn new(
        options: VocabOptions,
        batch_index: usize,
    ) -> Self {
        let rng = Mutex::new(StdRng::seed_from_u64(options.seed));
        Self {
            options,
            batch_index,
            table: TokenTable::default(),
            merges: VKHashMap::default(),
            eos_id: 0,
            unk_id: 0,
            rng,
        }
    }

    /// Admission check: build a backend only if `path` names a subword model.
    pub fn probe(
        path: &Path,
        options: &VocabOptions,
        batch_index: usize,
    ) -> Option<Box<dyn VocabBackend>> {
        if SUBWORD_VOCAB_SUFFIXES
            .iter()
            .any(|suffix| has_suffix(path, suffix))
        {
            Some(Box::new(Self::new(options.clone(), batch_index)))
        } else {
            None
        }
    }

    fn unsupported(operation: &'static str) -> VocabError {
        VocabError::Unsupported {
            backend: BackendKind::Subword.into(),
            operation,
        }
    }

    /// Segment one word into piece ids, applying merges by rank.
    fn segment_word(
        &self,
        word: &str,
        rng: &mut Option<MutexGuard<'_, StdRng>>,
    ) -> Words {
        let alpha = f64::from(self.options.subword_alpha).clamp(0.0, 1.0);

        let mut buf = [0u8; 4];
        let mut ids: Words = core::iter::once(WORD_START)
            .chain(word.chars())
            .map(|c| self.word(c.encode_utf8(&mut buf)))
            .collect();

        loop {
            let mut best: Option<(usize, Word)> = None;
            for (idx, pair) in ids.windows(2).enumerate() {
                let Some(&rank) = self.merges.get(&(pair[0], pair[1])) else {
                    continue;
                };
                if let Some(rng) = rng.as_mut()
                    && rng.random_bool(alpha)
                {
                    continue;
                }
                if best.is_none_or(|(_, best_rank)| rank < best_rank) {
                    best = Some((idx, rank));
                }
            }

            let Some((idx, rank)) = best else {
                break;
            };
            ids[idx] = rank;
            ids.remove(idx + 1);
        }

        ids
    }
}

impl VocabBackend for SubwordVocab {
    fn kind(&self) -> BackendKind {
        BackendKind::Subword
    }

    fn suffixes(&self) -> &'static [&'static str] {
        SUBWORD_VOCAB_SUFFIXES
    }

    fn load(
        &mut self,
        path: &Path,
        max: usize,
    ) -> VocabResult<usize> {
        log::debug!("loading subword model {}", path.display());
        let table = TokenTable::from_entries(load_base64_entries_path(path)?, max)?;
        let (eos_id, unk_id) = table.reserved_ids()?;
        self.merges = build_merges(&table);
        self.table = table;
        self.eos_id = eos_id;
        self.unk_id = unk_id;
        Ok(self.table.len())
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

        let vocab_size = self.options.vocab_size_for(self.batch_index).ok_or_else(|| {
            VocabError::InvalidOptions(format!(
                "subword vocabulary size for input {} must be set in dim_vocabs",
                self.batch_index
            ))
        })?;

        log::info!(
            "Training subword vocabulary {} ({vocab_size} pieces) from {}",
            vocab_path.display(),
            train_path.display()
        );

        let lines = sample_lines(
            &mut open_corpus(train_path)?,
            self.options.subword_max_lines,
            self.options.seed,
        )?;

        let mut counter = WordCounter::new();
        for line in &lines {
            counter.update_from_text(line);
        }
        counter
            .word_counts
            .retain(|word, _| word.as_str() != EOS_STR && word.as_str() != UNK_STR);
        if counter.is_empty() {
            return Err(VocabError::EmptyCorpus {
                path: train_path.to_path_buf(),
            });
        }

        let table = SubwordTrainerOptions::new(vocab_size).init().train(&counter)?;
        save_base64_entries_path(&table.entries(), vocab_path)
    }

    fn create_from_stream(
        &mut self,
        _train: &mut dyn BufRead,
        _vocab: &mut dyn Write,
        _max_size: usize,
    ) -> VocabResult<()> {
        Err(Self::unsupported("stream creation"))
    }

    fn create_fake(&mut self) -> VocabResult<()> {
        Err(Self::unsupported("fake creation"))
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
        inference: bool,
    ) -> Words {
        let mut rng = if !inference && self.options.subword_alpha > 0.0 {
            Some(self.rng.lock())
        } else {
            None
        };

        let mut words = Words::new();
        for word in line.split_whitespace() {
            words.extend(self.segment_word(word, &mut rng));
        }
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
        let mut text = String::new();
        for &id in words {
            if id == self.eos_id {
                if !ignore_eos {
                    text.push(' ');
                    text.push_str(EOS_STR);
                }
                continue;
            }
            if id == self.unk_id {
                text.push_str(UNK_SURFACE);
                continue;
            }
            let piece = self.token(id).ok_or(VocabError::InvalidId(id))?;
            text.extend(piece.chars().map(|c| if c == WORD_START { ' ' } else { c }));
        }

        Ok(match text.strip_prefix(' ') {
            Some(rest) => rest.to_string(),
            None => text,
        })
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

#[cfg(test)]
mod tests {
    use std::{io::Cursor, path::PathBuf};

    use super::*;
    use crate::{backends::initial_pieces, types::RESERVED_SYMBOL_COUNT};

    const CORPUS: &str = "the cat sat on the mat\nthe cat ate the hat\nthat cat\n";

    fn trained(
        dir: &tempdir::TempDir,
        options: VocabOptions,
    ) -> (SubwordVocab, PathBuf) {
        let train = dir.path().join("corpus.txt");
        std::fs::write(&train, CORPUS).unwrap();
        let model = dir.path().join("model.bpe");

        let mut vocab = SubwordVocab::new(options, 0);
        vocab.create(&model, &train).unwrap();
        vocab.load(&model, 0).unwrap();
        (vocab, model)
    }

    #[test]
    fn test_probe() {
        let options = VocabOptions::default();
        assert!(SubwordVocab::probe(Path::new("m.bpe"), &options, 0).is_some());
        assert!(SubwordVocab::probe(Path::new("m.json"), &options, 0).is_none());
        assert!(SubwordVocab::probe(Path::new("bpe"), &options, 0).is_none());
    }

    #[test]
    fn test_unsupported() {
        let mut vocab = SubwordVocab::new(VocabOptions::default(), 0);
        assert!(matches!(
            vocab.create_fake(),
            Err(VocabError::Unsupported {
                backend: "SubwordVocab",
                ..
            })
        ));
        assert!(matches!(
            vocab.create_from_stream(&mut Cursor::new("a"), &mut Vec::new(), 0),
            Err(VocabError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_create_requires_size() {
        let dir = tempdir::TempDir::new("subword").unwrap();
        let train = dir.path().join("corpus.txt");
        std::fs::write(&train, CORPUS).unwrap();

        let mut vocab = SubwordVocab::new(VocabOptions::default(), 0);
        assert!(matches!(
            vocab.create(&dir.path().join("m.bpe"), &train),
            Err(VocabError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_create_empty_corpus() {
        let dir = tempdir::TempDir::new("subword").unwrap();
        let train = dir.path().join("corpus.txt");
        std::fs::write(&train, "\n  \n").unwrap();

        let mut vocab = SubwordVocab::new(VocabOptions::default().with_dim_vocabs([50]), 0);
        assert!(matches!(
            vocab.create(&dir.path().join("m.bpe"), &train),
            Err(VocabError::EmptyCorpus { .. })
        ));
    }

    #[test]
    fn test_train_load_encode() {
        let dir = tempdir::TempDir::new("subword").unwrap();
        let (vocab, model) = trained(&dir, VocabOptions::default().with_dim_vocabs([30]));

        assert_eq!(vocab.type_name(), "SubwordVocab");
        assert!(vocab.size() > RESERVED_SYMBOL_COUNT);
        assert!(vocab.size() <= 30);
        assert_eq!(vocab.eos_id(), 0);
        assert_eq!(vocab.unk_id(), 1);

        let words = vocab.encode("the cat", true, true);
        assert_eq!(*words.last().unwrap(), vocab.eos_id());
        assert!(!words.contains(&vocab.unk_id()));
        // Merges shorten the character sequence.
        assert!(words.len() < "▁the▁cat".chars().count() + 1);

        assert_eq!(vocab.decode(&words, true).unwrap(), "the cat");
        assert_eq!(vocab.decode(&words, false).unwrap(), "the cat </s>");

        let mut reloaded = SubwordVocab::new(VocabOptions::default(), 0);
        assert_eq!(reloaded.load(&model, 0).unwrap(), vocab.size());
        assert_eq!(reloaded.encode("the cat", true, true), words);
    }

    #[test]
    fn test_unknown_characters() {
        let dir = tempdir::TempDir::new("subword").unwrap();
        let (vocab, _) = trained(&dir, VocabOptions::default().with_dim_vocabs([30]));

        let words = vocab.encode("cat zq", false, true);
        assert!(words.contains(&vocab.unk_id()));
        assert_eq!(vocab.decode(&words, true).unwrap(), "cat \u{2047}\u{2047}");
    }

    #[test]
    fn test_dropout_only_in_training_mode() {
        let dir = tempdir::TempDir::new("subword").unwrap();
        let (vocab, _) = trained(
            &dir,
            VocabOptions::default()
                .with_dim_vocabs([40])
                .with_subword_alpha(1.0),
        );

        let line = "the cat sat on the mat";
        let merged = vocab.encode(line, false, true);
        let sampled = vocab.encode(line, false, false);

        // alpha = 1 skips every merge: one piece per character and marker.
        let chars: usize = line
            .split_whitespace()
            .map(|w| w.chars().count() + 1)
            .sum();
        assert_eq!(sampled.len(), chars);
        assert!(merged.len() < sampled.len());
        assert_eq!(vocab.decode(&sampled, true).unwrap(), line);
    }

    /// Greedy lowest-rank merging over piece strings.
    fn segment_by_concat(
        vocab: &SubwordVocab,
        word: &str,
    ) -> Words {
        let mut pieces: Vec<String> = initial_pieces(word).collect();
        loop {
            let best = pieces
                .windows(2)
                .enumerate()
                .filter_map(|(idx, pair)| {
                    vocab
                        .table
                        .lookup_id(&format!("{}{}", pair[0], pair[1]))
                        .map(|rank| (rank, idx))
                })
                .min();
            let Some((_, idx)) = best else {
                break;
            };
            let right = pieces.remove(idx + 1);
            pieces[idx].push_str(&right);
        }
        pieces.iter().map(|piece| vocab.word(piece)).collect()
    }

    #[test]
    fn test_merges_index() {
        let dir = tempdir::TempDir::new("subword").unwrap();
        let (vocab, _) = trained(&dir, VocabOptions::default().with_dim_vocabs([40]));

        for (&(left, right), &merged) in &vocab.merges {
            let joined = format!(
                "{}{}",
                vocab.token(left).unwrap(),
                vocab.token(right).unwrap()
            );
            assert_eq!(vocab.token(merged), Some(joined.as_str()));
        }
        assert!(!vocab.merges.is_empty());
    }

    #[test]
    fn test_long_word_segmentation() {
        let dir = tempdir::TempDir::new("subword").unwrap();
        let (vocab, _) = trained(&dir, VocabOptions::default().with_dim_vocabs([40]));

        let word = "thecatsatonthemat".repeat(200);
        let words = vocab.encode(&word, false, true);
        assert_eq!(words, segment_by_concat(&vocab, &word));
        assert!(!words.contains(&vocab.unk_id()));
        assert!(words.len() < word.chars().count());
        assert_eq!(vocab.decode(&words, true).unwrap(), word);

        for word in ["the", "cat", "that", "hat", "mat", "q"] {
            assert_eq!(
                vocab.encode(word, false, true),
                segment_by_concat(&vocab, word)
            );
        }
    }

    #[test]
    fn test_load_max() {
        let dir = tempdir::TempDir::new("subword").unwrap();
        let (mut vocab, model) = trained(&dir, VocabOptions::default().with_dim_vocabs([30]));
        let full = vocab.size();

        assert_eq!(vocab.load(&model, 10).unwrap(), 10);
        assert!(full > 10);
        assert_eq!(vocab.word("\u{2581}the"), vocab.unk_id());
    }
}
