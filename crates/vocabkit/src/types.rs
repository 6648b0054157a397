//! # Common Types

/// A token id within one backend's vocabulary.
///
/// Ids are dense in ``[0, size)`` and are not portable across backends.
pub type Word = u32;

/// An encoded line: token ids in order.
pub type Words = Vec<Word>;

/// The end-of-sequence symbol.
pub const EOS_STR: &str = "</s>";

/// The unknown-token symbol.
pub const UNK_STR: &str = "<unk>";

/// The number of reserved symbols every created vocabulary starts with.
///
/// These are [`EOS_STR`] and [`UNK_STR`], at ids 0 and 1.
pub const RESERVED_SYMBOL_COUNT: usize = 2;

/// Convert a table index to a [`Word`].
///
/// ## Panics
/// Panics if the index exceeds the [`Word`] range; vocabularies
/// are bounded far below that.
pub(crate) fn word_from_index(index: usize) -> Word {
    Word::try_from(index).unwrap_or_else(|_| panic!("token index {index} overflows Word"))
}

cfg_if::cfg_if! {
    if #[cfg(feature = "ahash")] {
        /// Type Alias for hash maps in this crate.
        pub type VKHashMap<K, V> = ahash::AHashMap<K, V>;

        /// Type Alias for hash sets in this crate.
        pub type VKHashSet<V> = ahash::AHashSet<V>;
    } else {
        /// Type Alias for hash maps in this crate.
        pub type VKHashMap<K, V> = std::collections::HashMap<K, V>;

        /// Type Alias for hash sets in this crate.
        pub type VKHashSet<V> = std::collections::HashSet<V>;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_from_index() {
        assert_eq!(word_from_index(0), 0);
        assert_eq!(word_from_index(1234), 1234);
    }

    #[test]
    #[should_panic(expected = "overflows Word")]
    fn test_word_from_index_overflow() {
        word_from_index(usize::MAX);
    }
}
