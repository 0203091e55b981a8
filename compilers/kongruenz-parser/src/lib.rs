pub mod chunker;
pub mod tag;
pub mod tokenizer;

pub use chunker::GreedyChunker;
pub use tag::{parse_reading, parse_tag, render_tag, ParsedTag, TagError, TagWarning};

use kongruenz_protocol::{
    Category, Chunker, FeatureTuple, Particle, Reading, ReadingSet, Sentence, Tagger, Token,
};
use crate::tokenizer::{tokenize_with_spans, RawToken};

/// Reference front-end: text -> tagged, chunked sentence.
pub struct Analyzer<'a, T: Tagger + ?Sized, C: Chunker = GreedyChunker> {
    tagger: &'a T,
    chunker: C,
}

impl<'a, T: Tagger + ?Sized> Analyzer<'a, T> {
    pub fn new(tagger: &'a T) -> Self {
        Self { tagger, chunker: GreedyChunker }
    }
}

impl<'a, T: Tagger + ?Sized, C: Chunker> Analyzer<'a, T, C> {
    pub fn with_chunker(tagger: &'a T, chunker: C) -> Self {
        Self { tagger, chunker }
    }

    /// Primary entry point: Text -> Sentence
    pub fn analyze(&self, input: &str) -> Sentence {
        let raw_tokens = tokenize_with_spans(input);
        let mut tokens = Vec::with_capacity(raw_tokens.len());
        let mut previous_end = 0;

        for (i, (span, raw)) in raw_tokens.into_iter().enumerate() {
            let text = &input[span.start..span.end];
            let sentence_start = i == 0;

            let readings = match raw {
                RawToken::Punct(_) => particle(text, Particle::Punctuation),
                RawToken::Number(_) => particle(text, Particle::Numeral),
                RawToken::Word(word) => self.tagger.tag(word, sentence_start),
            };

            // Offsets are in characters, not bytes
            let start = input[..span.start].chars().count();
            let end = start + text.chars().count();

            tokens.push(Token {
                text: text.to_string(),
                start,
                end,
                readings,
                sentence_start,
                whitespace_before: span.start > previous_end,
            });
            previous_end = span.end;
        }

        let chunks = self.chunker.chunk(&tokens);
        Sentence::new(tokens, chunks)
    }
}

fn particle(text: &str, kind: Particle) -> ReadingSet {
    ReadingSet::single(Reading::new(text, Category::Other(kind), FeatureTuple::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kongruenz_protocol::ChunkRole;
    use std::collections::HashMap;

    struct MapTagger(HashMap<&'static str, Vec<&'static str>>);

    impl Tagger for MapTagger {
        fn tag(&self, surface: &str, _sentence_start: bool) -> ReadingSet {
            match self.0.get(surface) {
                Some(tags) => {
                    let readings = tags.iter().map(|t| parse_reading(surface, t).0).collect();
                    ReadingSet::new(readings).unwrap_or_else(|_| ReadingSet::unknown(surface))
                }
                None => ReadingSet::unknown(surface),
            }
        }
    }

    #[test]
    fn test_analyzer_integration() {
        // 1. Setup a tiny tagger
        let tagger = MapTagger(HashMap::from([
            ("Die", vec!["ART:DEF:NOM:SIN:FEM"]),
            ("Größe", vec!["SUB:NOM:SIN:FEM"]),
            ("zählt", vec!["VER:3:SIN:PRÄ"]),
        ]));

        // 2. Run
        let sentence = Analyzer::new(&tagger).analyze("Die Größe zählt nicht.");

        // 3. Assertions
        assert_eq!(sentence.tokens.len(), 5);
        assert!(sentence.tokens[0].sentence_start);
        assert!(!sentence.tokens[1].sentence_start);

        // Character offsets, not bytes
        assert_eq!((sentence.tokens[1].start, sentence.tokens[1].end), (4, 9));
        assert_eq!(sentence.tokens[2].start, 10);

        // "nicht" is unknown to this tagger
        assert!(sentence.tokens[3].is_unknown());
        assert!(!sentence.tokens[4].whitespace_before);
        assert!(sentence.tokens[4].readings.first().category.is_punctuation());

        assert_eq!(sentence.chunks[0].role, ChunkRole::NominalPhrase);
        assert_eq!(sentence.chunks[1].role, ChunkRole::VerbGroup);
        assert!(sentence.validate().is_ok());
    }
}
