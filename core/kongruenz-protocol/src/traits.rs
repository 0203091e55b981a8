//! Collaborators the engine consumes but does not implement itself.

use alloc::string::String;
use alloc::vec::Vec;

use crate::reading::{Chunk, ReadingSet, Token};

/// Dictionary lookup: surface form to readings.
pub trait Tagger {
    /// Never returns an empty set; unknown words get a single unknown reading.
    fn tag(&self, surface: &str, sentence_start: bool) -> ReadingSet;
}

/// Morphological generation: `(lemma, tag)` to surface forms.
///
/// Must be a pure function of its inputs. An empty result means the
/// combination does not exist.
pub trait Synthesizer {
    fn synthesize(&self, lemma: &str, tag: &str) -> Vec<String>;
}

/// Groups tagged tokens into non-overlapping chunks.
pub trait Chunker {
    fn chunk(&self, tokens: &[Token]) -> Vec<Chunk>;
}

impl<T: Synthesizer + ?Sized> Synthesizer for &T {
    fn synthesize(&self, lemma: &str, tag: &str) -> Vec<String> {
        (**self).synthesize(lemma, tag)
    }
}

impl<T: Tagger + ?Sized> Tagger for &T {
    fn tag(&self, surface: &str, sentence_start: bool) -> ReadingSet {
        (**self).tag(surface, sentence_start)
    }
}
