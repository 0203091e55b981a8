use hecs::Entity;
use kongruenz_protocol::{ChunkRole, MismatchReport, Number, Reading, Span};

use crate::unify::AgreementSet;

/// The chunk an entity stands for (source of truth).
#[derive(Debug, Clone, Copy)]
pub struct ChunkData {
    pub span: Span,
    pub role: ChunkRole,
}

/// Where a phrase's determiner comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeterminerSource {
    Token,
    /// Preposition-article contraction in front of the chunk ("zur").
    Contraction { preposition: String },
}

#[derive(Debug, Clone)]
pub struct Determiner {
    pub index: usize,
    /// Attributive determiner readings only.
    pub readings: Vec<Reading>,
    pub source: DeterminerSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Head {
    Noun(usize),
    /// Substantivized adjective ("das Gute").
    Adjective(usize),
}

impl Head {
    pub fn index(self) -> usize {
        match self {
            Head::Noun(i) | Head::Adjective(i) => i,
        }
    }
}

/// A nominal phrase in determiner, modifier, adjective, noun shape.
#[derive(Debug, Clone)]
pub struct NounPhrase {
    /// Includes a leading contraction.
    pub span: Span,
    pub determiner: Option<Determiner>,
    /// Tokens kept verbatim by corrections ("sehr", "drei", "3.").
    pub modifiers: Vec<usize>,
    pub adjectives: Vec<usize>,
    pub head: Head,
    /// Number fixed by a numeral or quantifier.
    pub pinned: Option<Number>,
    /// Per constraining token, the cells it admits.
    pub constraints: Vec<AgreementSet>,
}

impl NounPhrase {
    pub fn head_index(&self) -> usize {
        self.head.index()
    }
}

/// Unified cells of a phrase; empty iff the phrase disagrees.
#[derive(Debug, Clone, Copy)]
pub struct Agreement(pub AgreementSet);

#[derive(Debug, Clone)]
pub struct Mismatch(pub MismatchReport);

/// Verb chunk with its finite verb.
#[derive(Debug, Clone)]
pub struct VerbGroup {
    pub finite: usize,
    pub readings: Vec<Reading>,
}

/// How coordinated subject conjuncts combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coordination {
    Single,
    /// "und", "sowie", "sowohl ... als auch"
    Plural,
    /// "oder", "entweder ... oder", "weder ... noch"
    Alternative,
    /// "Obst und Gemüse", "ich und ich allein"
    FixedSingular,
}

/// Attached to a verb group whose subject was found.
#[derive(Debug, Clone, Copy)]
pub struct Subject {
    pub coordination: Coordination,
    /// Subject class the check must leave alone.
    pub relaxed: bool,
    /// Person and number cells the subject admits.
    pub agreement: AgreementSet,
}

/// The syntactic role of a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyRole {
    Subject,
    Conjunct,
}

#[derive(Debug, Clone, Copy)]
pub struct Syntax {
    pub head: Entity, // The verb group
    pub role: DependencyRole,
}
