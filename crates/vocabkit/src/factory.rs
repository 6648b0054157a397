//! # Backend Factory
//!
//! Picks a backend for a vocabulary path by walking [`BACKEND_PROBES`] in order;
//! the first probe that accepts the path wins, and [`DefaultVocab`] catches the rest.

use std::path::Path;

use crate::{
    backends::{DefaultVocab, SubwordVocab, VocabBackend},
    options::VocabOptions,
};

/// A constructor attempt: yields a backend if it accepts the path.
pub type BackendProbe = fn(&Path, &VocabOptions, usize) -> Option<Box<dyn VocabBackend>>;

/// Probes tried by [`create_vocab`], in order.
pub const BACKEND_PROBES: &[BackendProbe] = &[SubwordVocab::probe];

/// Build the always-available word-level backend.
pub fn create_default_vocab() -> Box<dyn VocabBackend> {
    Box::new(DefaultVocab::new())
}

/// Pick a backend for `path`.
///
/// ## Arguments
/// * `path` - the vocabulary path to probe.
/// * `options` - handed unmodified to the backend constructors.
/// * `batch_index` - the input stream the vocabulary serves.
///
/// ## Returns
/// The first accepting probe's backend, or a [`DefaultVocab`].
pub fn create_vocab(
    path: &Path,
    options: &VocabOptions,
    batch_index: usize,
) -> Box<dyn VocabBackend> {
    let backend = BACKEND_PROBES
        .iter()
        .find_map(|probe| probe(path, options, batch_index))
        .unwrap_or_else(create_default_vocab);

    log::debug!(
        "selected {} for {} (input {batch_index})",
        backend.type_name(),
        path.display()
    );
    backend
}
