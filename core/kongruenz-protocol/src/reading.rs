use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

use crate::morphology::{AxisSet, Category, FeatureTuple, Particle};

/// One candidate analysis of a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct Reading {
    pub lemma: String,
    pub category: Category,
    pub features: FeatureTuple,
}

impl Reading {
    pub fn new(lemma: impl Into<String>, category: Category, features: FeatureTuple) -> Self {
        Self { lemma: lemma.into(), category, features }
    }

    /// The reading an untagged token carries: every axis open.
    pub fn unknown(surface: &str) -> Self {
        Self {
            lemma: String::from(surface),
            category: Category::Other(Particle::Unknown),
            features: FeatureTuple::default(),
        }
    }
}

/// Non-empty, ordered set of readings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<Reading>", into = "Vec<Reading>"))]
pub struct ReadingSet(Vec<Reading>);

impl ReadingSet {
    /// Fails on an empty list.
    pub fn new(readings: Vec<Reading>) -> Result<Self, ContractError> {
        if readings.is_empty() {
            return Err(ContractError::EmptyReadingSet);
        }
        Ok(Self(readings))
    }

    pub fn single(reading: Reading) -> Self {
        Self(alloc::vec![reading])
    }

    pub fn unknown(surface: &str) -> Self {
        Self::single(Reading::unknown(surface))
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Reading> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn first(&self) -> &Reading {
        &self.0[0]
    }

    pub fn as_slice(&self) -> &[Reading] {
        &self.0
    }

    /// Keeps readings matching `keep`; fails if none would remain.
    pub fn retain(&self, keep: impl Fn(&Reading) -> bool) -> Option<ReadingSet> {
        let kept: Vec<Reading> = self.0.iter().filter(|r| keep(r)).cloned().collect();
        ReadingSet::new(kept).ok()
    }
}

impl TryFrom<Vec<Reading>> for ReadingSet {
    type Error = ContractError;

    fn try_from(readings: Vec<Reading>) -> Result<Self, Self::Error> {
        ReadingSet::new(readings)
    }
}

impl From<ReadingSet> for Vec<Reading> {
    fn from(set: ReadingSet) -> Self {
        set.0
    }
}

impl<'a> IntoIterator for &'a ReadingSet {
    type Item = &'a Reading;
    type IntoIter = core::slice::Iter<'a, Reading>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct Token {
    pub text: String,
    /// Character offset of the first character.
    pub start: usize,
    /// Character offset one past the last character.
    pub end: usize,
    pub readings: ReadingSet,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sentence_start: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub whitespace_before: bool,
}

impl Token {
    /// True iff some reading is compatible with `target` on every axis in `axes`.
    pub fn matches(&self, target: &FeatureTuple, axes: AxisSet) -> bool {
        self.readings.iter().any(|r| r.features.compatible(target, axes))
    }

    pub fn has_reading(&self, pred: impl Fn(&Reading) -> bool) -> bool {
        self.readings.iter().any(pred)
    }

    pub fn all_readings(&self, pred: impl Fn(&Reading) -> bool) -> bool {
        self.readings.iter().all(pred)
    }

    pub fn is_unknown(&self) -> bool {
        self.all_readings(|r| r.category.is_unknown())
    }

    pub fn is_punctuation(&self, c: char) -> bool {
        let mut chars = self.text.chars();
        chars.next() == Some(c) && chars.next().is_none()
    }

    /// Case-insensitive surface comparison.
    pub fn text_is(&self, word: &str) -> bool {
        self.text.to_lowercase() == word.to_lowercase()
    }

    pub fn starts_uppercase(&self) -> bool {
        self.text.chars().next().is_some_and(char::is_uppercase)
    }
}

/// Half-open token index range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }

    pub fn indices(&self) -> core::ops::Range<usize> {
        self.start..self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub enum ChunkRole {
    NominalPhrase,
    VerbGroup,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct Chunk {
    pub span: Span,
    pub role: ChunkRole,
}

impl Chunk {
    pub fn new(start: usize, end: usize, role: ChunkRole) -> Self {
        Self { span: Span::new(start, end), role }
    }
}

/// A tagged and chunked sentence, the unit a check runs on.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct Sentence {
    pub tokens: Vec<Token>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub chunks: Vec<Chunk>,
}

impl Sentence {
    pub fn new(tokens: Vec<Token>, chunks: Vec<Chunk>) -> Self {
        Self { tokens, chunks }
    }

    /// Chunks must be non-empty, in range, ordered and non-overlapping;
    /// token offsets must be well-formed.
    pub fn validate(&self) -> Result<(), ContractError> {
        for (index, token) in self.tokens.iter().enumerate() {
            if token.end < token.start {
                return Err(ContractError::TokenOffsets { index });
            }
        }

        let mut previous_end = 0;
        for chunk in &self.chunks {
            if chunk.span.is_empty() || chunk.span.end > self.tokens.len() {
                return Err(ContractError::ChunkOutOfRange {
                    start: chunk.span.start,
                    end: chunk.span.end,
                    tokens: self.tokens.len(),
                });
            }
            if chunk.span.start < previous_end {
                return Err(ContractError::OverlappingChunks {
                    start: chunk.span.start,
                    previous_end,
                });
            }
            previous_end = chunk.span.end;
        }
        Ok(())
    }

    pub fn chunk_at(&self, token: usize) -> Option<&Chunk> {
        self.chunks.iter().find(|c| c.span.contains(token))
    }
}

/// Caller-side contract violations, reported before any checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    EmptyReadingSet,
    TokenOffsets { index: usize },
    ChunkOutOfRange { start: usize, end: usize, tokens: usize },
    OverlappingChunks { start: usize, previous_end: usize },
    PhraseShape { start: usize, end: usize },
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractError::EmptyReadingSet => write!(f, "reading set must not be empty"),
            ContractError::TokenOffsets { index } => {
                write!(f, "token {} ends before it starts", index)
            }
            ContractError::ChunkOutOfRange { start, end, tokens } => write!(
                f,
                "chunk [{}, {}) is empty or exceeds sentence of {} tokens",
                start, end, tokens
            ),
            ContractError::OverlappingChunks { start, previous_end } => write!(
                f,
                "chunk starting at {} overlaps previous chunk ending at {}",
                start, previous_end
            ),
            ContractError::PhraseShape { start, end } => write!(
                f,
                "span [{}, {}) is not a determiner/adjective/noun sequence",
                start, end
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ContractError {}
