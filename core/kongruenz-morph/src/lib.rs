pub mod cache;
pub mod lexicon;

pub use cache::CachedSynthesizer;
pub use lexicon::Lexicon;

use kongruenz_protocol::{Lemma, Paradigm};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MorphError {
    #[error("lemma {lemma:?} refers to missing paradigm {paradigm}")]
    MissingParadigm { lemma: String, paradigm: u32 },
    #[error("paradigm {paradigm:?} uses stem {stem}, lemma {lemma:?} has {available}")]
    MissingStem {
        lemma: String,
        paradigm: String,
        stem: u8,
        available: usize,
    },
    #[error("duplicate paradigm id {0}")]
    DuplicateParadigm(u32),
    #[error("invalid lexicon JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid lexicon archive: {0}")]
    Archive(String),
}

/// Generates every form of `lemma` realizing `tag` by combining a stem with
/// the paradigm's suffix.
pub fn inflect(lemma: &Lemma, paradigm: &Paradigm, tag: &str) -> Vec<String> {
    paradigm
        .endings
        .iter()
        .filter(|ending| ending.tag == tag)
        .filter_map(|ending| {
            lemma
                .stems
                .get(usize::from(ending.stem))
                .map(|stem| format!("{}{}", stem, ending.suffix))
        })
        .collect()
}
