//! # Corpus Scanning
//!
//! Word counting and line sampling over training corpora.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use compact_str::CompactString;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{errors::VocabResult, types::VKHashMap};

/// Open a corpus file as a line reader.
pub fn open_corpus(path: impl AsRef<Path>) -> VocabResult<BufReader<File>> {
    let path = path.as_ref();
    log::debug!("reading corpus {}", path.display());
    Ok(BufReader::new(File::open(path)?))
}

/// Whitespace word counter.
#[derive(Debug, Default, Clone)]
pub struct WordCounter {
    /// The word counts.
    pub word_counts: VKHashMap<CompactString, u64>,
}

impl WordCounter {
    /// Create an empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct words seen.
    pub fn len(&self) -> usize {
        self.word_counts.len()
    }

    /// True if no words were seen.
    pub fn is_empty(&self) -> bool {
        self.word_counts.is_empty()
    }

    /// Update word counts inplace from text.
    pub fn update_from_text<S: AsRef<str>>(
        &mut self,
        text: S,
    ) {
        for word in text.as_ref().split_whitespace() {
            *self.word_counts.entry(word.into()).or_default() += 1;
        }
    }

    /// Update word counts inplace from every line of a reader.
    pub fn update_from_reader<R: BufRead + ?Sized>(
        &mut self,
        reader: &mut R,
    ) -> VocabResult<()> {
        let mut line = String::new();
        while reader.read_line(&mut line)? > 0 {
            self.update_from_text(&line);
            line.clear();
        }
        Ok(())
    }

    /// Words ordered by descending count; ties broken by ascending text.
    pub fn sorted_words(&self) -> Vec<(&str, u64)> {
        let mut words: Vec<(&str, u64)> = self
            .word_counts
            .iter()
            .map(|(word, &count)| (word.as_str(), count))
            .collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        words
    }
}

/// Read the lines of a corpus, keeping a uniform sample of at most `max_lines`.
///
/// Sampling is reservoir-based and deterministic for a given `seed`.
/// When `max_lines` is 0 every line is kept.
pub fn sample_lines<R: BufRead + ?Sized>(
    reader: &mut R,
    max_lines: usize,
    seed: u64,
) -> VocabResult<Vec<String>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut sample = Vec::new();
    let mut seen = 0usize;

    for line in reader.lines() {
        let line = line?;
        seen += 1;
        if max_lines == 0 || sample.len() < max_lines {
            sample.push(line);
        } else {
            let slot = rng.random_range(0..seen);
            if slot < max_lines {
                sample[slot] = line;
            }
        }
    }

    if max_lines > 0 && seen > max_lines {
        log::info!("sampled {} of {seen} corpus lines", sample.len());
    }
    Ok(sample)
}
