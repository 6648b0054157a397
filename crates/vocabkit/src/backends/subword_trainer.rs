//! # Subword Merge Trainer
//!
//! Learns byte-pair style merges over character sequences.
//! Each word is a word-start marker followed by its characters;
//! merges are learned greedily by pair frequency.
//!
//! Pair counts are maintained incrementally: merging a pair in a word
//! reports the neighbor pairs it removes and creates, and a max-heap of
//! [`MergeJob`]s is lazily re-validated against the live counts.

use core::cmp::{Ordering, Reverse};

use dary_heap::OctonaryHeap;

use crate::{
    backends::TokenTable,
    corpus::WordCounter,
    errors::VocabResult,
    types::{EOS_STR, UNK_STR, VKHashMap, VKHashSet, Word},
};

/// Marks the start of a word inside a subword piece.
pub const WORD_START: char = '\u{2581}';

/// An adjacent pair of piece ids.
pub type Pair = (Word, Word);

/// Options for [`SubwordTrainer`].
#[derive(Debug, Clone)]
pub struct SubwordTrainerOptions {
    /// The target vocabulary size, reserved symbols included.
    pub vocab_size: usize,

    /// Pairs seen fewer times than this are never merged.
    pub min_pair_count: u64,
}

impl SubwordTrainerOptions {
    /// Create new options.
    ///
    /// ## Arguments
    /// * `vocab_size` - The target vocabulary size.
    pub fn new(vocab_size: usize) -> Self {
        Self {
            vocab_size,
            min_pair_count: 2,
        }
    }

    /// Sets the minimum pair count.
    pub fn with_min_pair_count(
        self,
        min_pair_count: u64,
    ) -> Self {
        Self {
            min_pair_count,
            ..self
        }
    }

    /// Initializes a [`SubwordTrainer`] from these options.
    pub fn init(self) -> SubwordTrainer {
        SubwordTrainer::new(self)
    }
}

/// Split a word into its initial pieces: the marker, then each character.
pub fn initial_pieces(word: &str) -> impl Iterator<Item = String> + '_ {
    core::iter::once(WORD_START.to_string()).chain(word.chars().map(String::from))
}

/// A candidate merge in the training heap.
#[derive(Debug, PartialEq, Eq)]
pub struct MergeJob {
    /// Weighted occurrences of the pair when the job was queued.
    pub count: u64,

    /// The pair to merge.
    pub pair: Pair,
}

impl MergeJob {
    /// Max-heap by count; ties go to the smallest pair.
    pub fn heap_key(&self) -> (u64, Reverse<Pair>) {
        (self.count, Reverse(self.pair))
    }
}

impl PartialOrd for MergeJob {
    fn partial_cmp(
        &self,
        other: &Self,
    ) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MergeJob {
    fn cmp(
        &self,
        other: &Self,
    ) -> Ordering {
        self.heap_key().cmp(&other.heap_key())
    }
}

/// Greedy pair-merge trainer.
pub struct SubwordTrainer {
    /// Trainer options.
    pub options: SubwordTrainerOptions,
}

impl SubwordTrainer {
    /// Initializes a [`SubwordTrainer`].
    pub fn new(options: SubwordTrainerOptions) -> Self {
        Self { options }
    }

    /// Learn a piece table from counted words.
    ///
    /// The table holds ``</s>`` and ``<unk>``, then the base characters
    /// by descending frequency, then merged pieces in learned order.
    /// The base alphabet is always kept whole, even past `vocab_size`.
    pub fn train(
        &self,
        counter: &WordCounter,
    ) -> VocabResult<TokenTable> {
        let mut table = TokenTable::from_tokens([EOS_STR, UNK_STR])?;
        let sorted_words = counter.sorted_words();

        let mut char_counts: VKHashMap<String, u64> = VKHashMap::default();
        for &(word, count) in &sorted_words {
            for piece in initial_pieces(word) {
                *char_counts.entry(piece).or_default() += count;
            }
        }
        let mut alphabet: Vec<(String, u64)> = char_counts.into_iter().collect();
        alphabet.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        for (piece, _) in &alphabet {
            table.insert(piece);
        }

        if table.len() > self.options.vocab_size {
            log::warn!(
                "target vocabulary size {} is smaller than the base alphabet ({}); learning no merges",
                self.options.vocab_size,
                table.len()
            );
            return Ok(table);
        }

        let (mut words, word_counts): (Vec<Vec<Word>>, Vec<u64>) = sorted_words
            .iter()
            .map(|&(word, count)| {
                let ids = initial_pieces(word)
                    .map(|piece| table.insert(&piece))
                    .collect();
                (ids, count)
            })
            .unzip();

        let mut pair_counts: VKHashMap<Pair, u64> = VKHashMap::default();
        let mut pair_index: VKHashMap<Pair, VKHashSet<usize>> = VKHashMap::default();
        for (word_idx, ids) in words.iter().enumerate() {
            for window in ids.windows(2) {
                let pair = (window[0], window[1]);
                *pair_counts.entry(pair).or_default() += word_counts[word_idx];
                pair_index.entry(pair).or_default().insert(word_idx);
            }
        }

        log::debug!("building merge heap with {} unique pairs", pair_counts.len());
        let mut heap = OctonaryHeap::with_capacity(pair_counts.len());
        for (&pair, &count) in &pair_counts {
            heap.push(MergeJob { count, pair });
        }

        while table.len() < self.options.vocab_size {
            let Some(mut job) = heap.pop() else {
                break;
            };

            // Lazy refresh of stale counts.
            let current = pair_counts.get(&job.pair).copied().unwrap_or(0);
            if job.count != current {
                job.count = current;
                if current > 0 {
                    heap.push(job);
                }
                continue;
            }
            if job.count == 0 || job.count < self.options.min_pair_count {
                break;
            }

            let merged = format!(
                "{}{}",
                table.lookup_token(job.pair.0).unwrap_or_default(),
                table.lookup_token(job.pair.1).unwrap_or_default()
            );
            let merged_id = table.insert(&merged);
            log::trace!("merge {merged:?} -> {merged_id} ({})", job.count);

            let mut created: VKHashSet<Pair> = VKHashSet::default();
            for word_idx in pair_index.remove(&job.pair).unwrap_or_default() {
                let count = word_counts[word_idx];
                merge_pair_cb(
                    &mut words[word_idx],
                    job.pair,
                    merged_id,
                    &mut |pair, delta| {
                        let entry = pair_counts.entry(pair).or_default();
                        if delta < 0 {
                            *entry -= count;
                        } else {
                            *entry += count;
                            pair_index.entry(pair).or_default().insert(word_idx);
                            created.insert(pair);
                        }
                    },
                );
            }

            // Pairs that gained occurrences need a job at their live count.
            for pair in created {
                let count = pair_counts.get(&pair).copied().unwrap_or(0);
                if count > 0 {
                    heap.push(MergeJob { count, pair });
                }
            }
        }

        log::debug!("learned {} subword pieces", table.len());
        Ok(table)
    }
}

/// Replace each left-to-right occurrence of `pair` with `merged`.
///
/// ## Arguments
/// * `ids` - the word to rewrite.
/// * `pair` - the pair to merge.
/// * `merged` - the id replacing `pair`.
/// * `on_delta` - called with ``(pair, -1)`` for each removed pair occurrence
///   and ``(pair, +1)`` for each created one.
fn merge_pair_cb<F>(
    ids: &mut Vec<Word>,
    pair: Pair,
    merged: Word,
    on_delta: &mut F,
) where
    F: FnMut(Pair, i32),
{
    let (a, b) = pair;
    let n = ids.len();
    if n < 2 {
        return;
    }

    let mut out = Vec::with_capacity(n);
    let mut idx = 0;
    while idx < n {
        if idx + 1 < n && (ids[idx], ids[idx + 1]) == pair {
            if let Some(&prev) = out.last() {
                on_delta((prev, a), -1);
                on_delta((prev, merged), 1);
            }
            on_delta(pair, -1);
            if let Some(&next) = ids.get(idx + 2) {
                on_delta((b, next), -1);
                on_delta((merged, next), 1);
            }
            out.push(merged);
            idx += 2;
        } else {
            out.push(ids[idx]);
            idx += 1;
        }
    }
    *ids = out;
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn counter(text: &str) -> WordCounter {
        let mut counter = WordCounter::new();
        counter.update_from_text(text);
        counter
    }

    fn window_counts(ids: &[Word]) -> BTreeMap<Pair, i64> {
        let mut counts: BTreeMap<Pair, i64> = BTreeMap::new();
        for window in ids.windows(2) {
            *counts.entry((window[0], window[1])).or_default() += 1;
        }
        counts
    }

    /// Merges `ids`, checking the reported deltas against a full recount.
    fn merge_checked(
        ids: &mut Vec<Word>,
        pair: Pair,
        merged: Word,
    ) {
        let before = window_counts(ids);
        let mut deltas: BTreeMap<Pair, i64> = BTreeMap::new();
        merge_pair_cb(ids, pair, merged, &mut |p, d| {
            *deltas.entry(p).or_default() += i64::from(d);
        });
        let after = window_counts(ids);

        let mut expected: BTreeMap<Pair, i64> = BTreeMap::new();
        for p in before.keys().chain(after.keys()) {
            let diff = after.get(p).copied().unwrap_or(0) - before.get(p).copied().unwrap_or(0);
            expected.insert(*p, diff);
        }
        expected.retain(|_, d| *d != 0);
        deltas.retain(|_, d| *d != 0);
        assert_eq!(deltas, expected, "{ids:?}");
    }

    #[test]
    fn test_merge_pair_cb() {
        let mut ids = vec![1, 2, 1, 2, 2, 1];
        merge_checked(&mut ids, (1, 2), 9);
        assert_eq!(ids, vec![9, 9, 2, 1]);

        let mut ids = vec![3, 3, 3];
        merge_checked(&mut ids, (3, 3), 7);
        assert_eq!(ids, vec![7, 3]);

        let mut ids = vec![5, 3, 3, 3, 3, 5];
        merge_checked(&mut ids, (3, 3), 7);
        assert_eq!(ids, vec![5, 7, 7, 5]);

        let mut ids = vec![4];
        merge_checked(&mut ids, (4, 4), 7);
        assert_eq!(ids, vec![4]);
    }

    /// Full-recount trainer: the most frequent pair wins, ties to the smallest.
    fn train_by_recount(
        options: &SubwordTrainerOptions,
        counter: &WordCounter,
    ) -> TokenTable {
        let mut table = SubwordTrainerOptions::new(0).init().train(counter).unwrap();
        if table.len() > options.vocab_size {
            return table;
        }

        let mut words: Vec<(Vec<Word>, u64)> = counter
            .sorted_words()
            .into_iter()
            .map(|(word, count)| {
                let ids = initial_pieces(word)
                    .map(|piece| table.lookup_id(&piece).unwrap())
                    .collect();
                (ids, count)
            })
            .collect();

        while table.len() < options.vocab_size {
            let mut pair_counts: VKHashMap<Pair, u64> = VKHashMap::default();
            for (ids, count) in &words {
                for window in ids.windows(2) {
                    *pair_counts.entry((window[0], window[1])).or_default() += count;
                }
            }
            let Some((pair, count)) = pair_counts
                .into_iter()
                .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
            else {
                break;
            };
            if count < options.min_pair_count {
                break;
            }

            let merged = format!(
                "{}{}",
                table.lookup_token(pair.0).unwrap(),
                table.lookup_token(pair.1).unwrap()
            );
            let merged_id = table.insert(&merged);
            for (ids, _) in words.iter_mut() {
                merge_pair_cb(ids, pair, merged_id, &mut |_, _| {});
            }
        }
        table
    }

    proptest::proptest! {
        #![proptest_config(proptest::prelude::ProptestConfig::with_cases(200))]

        #[test]
        fn heap_training_matches_recount(
            text in "[abc ]{0,80}",
            vocab_size in 2usize..40,
            min_pair_count in 1u64..3,
        ) {
            let counter = counter(&text);
            let options = SubwordTrainerOptions::new(vocab_size).with_min_pair_count(min_pair_count);

            let expected = train_by_recount(&options, &counter);
            let table = options.init().train(&counter).unwrap();
            proptest::prop_assert_eq!(table.entries(), expected.entries());
        }
    }

    #[test]
    fn test_alphabet_only() {
        let table = SubwordTrainerOptions::new(0)
            .init()
            .train(&counter("ab ba"))
            .unwrap();

        // </s>, <unk>, a, b, marker
        assert_eq!(table.len(), 5);
        assert_eq!(table.lookup_id("a"), Some(2));
        assert_eq!(table.lookup_id(&WORD_START.to_string()), Some(4));
    }

    #[test]
    fn test_learns_frequent_merges() {
        let table = SubwordTrainerOptions::new(10)
            .init()
            .train(&counter("low low low lower"))
            .unwrap();

        // 2 reserved + 6 characters, then two merges.
        assert_eq!(table.len(), 10);
        assert_eq!(table.lookup_token(8), Some("lo"));
        assert_eq!(table.lookup_token(9), Some("\u{2581}lo"));
    }

    #[test]
    fn test_stops_without_repeated_pairs() {
        let table = SubwordTrainerOptions::new(1000)
            .init()
            .train(&counter("xyz"))
            .unwrap();
        // Reserved + marker + 3 chars; every pair is seen once.
        assert_eq!(table.len(), 6);

        let table = SubwordTrainerOptions::new(1000)
            .with_min_pair_count(1)
            .init()
            .train(&counter("xyz"))
            .unwrap();
        assert_eq!(table.len(), 9);
    }
}
