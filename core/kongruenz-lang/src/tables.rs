use std::collections::HashSet;

use kongruenz_protocol::{Case, Declension, DeterminerKind};
use serde::Deserialize;

/// Case-insensitive word list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Vec<String>")]
pub struct WordSet(HashSet<String>);

impl From<Vec<String>> for WordSet {
    fn from(words: Vec<String>) -> Self {
        Self(words.into_iter().map(|w| w.to_lowercase()).collect())
    }
}

impl WordSet {
    pub fn contains(&self, word: &str) -> bool {
        self.0.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Spans the phrase checker leaves alone.
#[derive(Debug, Clone, Deserialize)]
pub struct PhraseExceptions {
    /// Token sequences matched case-insensitively at the start of a phrase.
    pub frozen_phrases: Vec<Vec<String>>,
    pub ignored_nouns: WordSet,
    pub titles: WordSet,
    pub loanwords: WordSet,
    /// Nouns whose gender varies; widened to every gender.
    pub variable_gender_nouns: WordSet,
    /// Determiner surfaces that are just as likely pronouns.
    pub pronoun_determiners: WordSet,
    /// Determiners read as relative pronouns right after a comma.
    pub relative_pronouns: WordSet,
}

impl PhraseExceptions {
    /// Whether `words` starts with a frozen phrase.
    pub fn is_frozen(&self, words: &[&str]) -> bool {
        self.frozen_phrases.iter().any(|phrase| {
            phrase.len() <= words.len()
                && phrase
                    .iter()
                    .zip(words)
                    .all(|(expected, word)| word.to_lowercase() == expected.to_lowercase())
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KindDeclension {
    pub kind: DeterminerKind,
    pub declension: Vec<Declension>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuantifierDeclension {
    pub lemma: String,
    pub declension: Vec<Declension>,
}

/// Which adjective ending series a determiner selects.
#[derive(Debug, Clone, Deserialize)]
pub struct DeclensionTable {
    /// Without determiner.
    pub bare: Vec<Declension>,
    pub kinds: Vec<KindDeclension>,
    /// Per-lemma overrides for quantifiers.
    pub quantifiers: Vec<QuantifierDeclension>,
    pub pinned_plural: WordSet,
    pub pinned_singular: WordSet,
}

impl DeclensionTable {
    /// Declension classes allowed after a determiner `(kind, lemma)`, or
    /// without one.
    pub fn after(&self, determiner: Option<(DeterminerKind, &str)>) -> &[Declension] {
        let Some((kind, lemma)) = determiner else {
            return &self.bare;
        };
        if kind == DeterminerKind::Quantifier {
            if let Some(q) = self.quantifiers.iter().find(|q| q.lemma.eq_ignore_ascii_case(lemma)) {
                return &q.declension;
            }
        }
        self.kinds
            .iter()
            .find(|k| k.kind == kind)
            .map(|k| k.declension.as_slice())
            .unwrap_or(&self.bare)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrepositionCases {
    pub word: String,
    pub cases: Vec<Case>,
}

/// Preposition fused with a definite article ("zur" = "zu" + "der").
#[derive(Debug, Clone, Deserialize)]
pub struct Contraction {
    pub surface: String,
    pub preposition: String,
    pub article: String,
    /// Article readings the contraction stands for.
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubjectVerbClasses {
    pub plural_connectors: WordSet,
    pub alternative_connectors: WordSet,
    pub correlative_fillers: WordSet,
    /// Coordinated head nouns that take a singular verb.
    pub singular_coordinations: Vec<Vec<String>>,
    pub irregular_subjects: WordSet,
    pub fraction_nouns: WordSet,
    pub measure_nouns: WordSet,
    pub copulas: WordSet,
    pub elliptical_subjects: WordSet,
    pub unit_nouns: WordSet,
    pub clause_openers: WordSet,
}

impl SubjectVerbClasses {
    pub fn is_singular_coordination(&self, heads: &[&str]) -> bool {
        self.singular_coordinations.iter().any(|pair| {
            pair.len() == heads.len()
                && pair.iter().zip(heads).all(|(a, b)| a.to_lowercase() == b.to_lowercase())
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Slot {
    pub case: Case,
    pub required: bool,
}

/// Cases a verb requires or permits. Separable-prefix verbs may inherit
/// the frame of their base verb.
#[derive(Debug, Clone, Deserialize)]
pub struct ValencyEntry {
    pub verb: String,
    #[serde(default)]
    pub inherits: Option<String>,
    pub frame: Vec<Slot>,
}
