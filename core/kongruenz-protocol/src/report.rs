use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

use crate::morphology::{AxisSet, Case};
use crate::reading::Span;

/// Which axes a mismatch is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub enum ViolatedAxes {
    /// Relaxing any one of these axes alone restores agreement.
    Determined(AxisSet),
    /// No single axis accounts for the mismatch ("case, gender or number").
    Ambiguous,
}

impl ViolatedAxes {
    pub fn contains(&self, axes: AxisSet) -> bool {
        match self {
            ViolatedAxes::Determined(set) => set.contains(axes),
            ViolatedAxes::Ambiguous => false,
        }
    }

    /// Axes a suggestion may change.
    pub fn variable(&self, within: AxisSet) -> AxisSet {
        match self {
            ViolatedAxes::Determined(set) => *set & within,
            ViolatedAxes::Ambiguous => within,
        }
    }
}

impl fmt::Display for ViolatedAxes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolatedAxes::Determined(set) => {
                for (i, axis) in set.axes().enumerate() {
                    if i > 0 {
                        f.write_str(" and ")?;
                    }
                    write!(f, "{}", axis)?;
                }
                Ok(())
            }
            ViolatedAxes::Ambiguous => f.write_str("case, gender or number"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub enum MessageCategory {
    /// Determiner, adjectives and noun disagree.
    PhraseAgreement,
    /// Adjective and noun disagree in a phrase without determiner.
    AdjectiveNounAgreement,
    /// The phrase's case is not licensed by the preceding preposition.
    PrepositionCase { preposition: String },
    SubjectVerbAgreement,
    /// The verb's arguments do not fill its valency frame.
    CaseGovernment {
        verb: String,
        missing: Vec<Case>,
        unexpected: Vec<Case>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct MismatchReport {
    pub violated: ViolatedAxes,
    /// Offending token span.
    pub span: Span,
    pub category: MessageCategory,
}

/// A reported disagreement with character offsets and replacements.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct Match {
    pub from: usize,
    pub to: usize,
    pub violated: ViolatedAxes,
    pub category: MessageCategory,
    pub replacements: Vec<String>,
}
