use rkyv::{Archive, Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

use bitflags::bitflags;

/// A value on one agreement axis. `Unspecified` (and, for gender,
/// `CommonAmbiguous`) is compatible with every value.
pub trait Feature: Copy + Eq + 'static {
    /// The concrete values of the axis, in enumeration order.
    const VALUES: &'static [Self];

    /// Position in [`Feature::VALUES`], or `None` for a wildcard.
    fn index(self) -> Option<usize>;

    fn is_wildcard(self) -> bool {
        self.index().is_none()
    }

    fn compatible(self, other: Self) -> bool {
        self.is_wildcard() || other.is_wildcard() || self == other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
#[repr(u8)]
pub enum Case {
    Nominative = 0,
    Accusative = 1,
    Dative = 2,
    Genitive = 3,
    #[default]
    Unspecified = 4,
}

impl Feature for Case {
    const VALUES: &'static [Self] = &[
        Case::Nominative,
        Case::Accusative,
        Case::Dative,
        Case::Genitive,
    ];

    fn index(self) -> Option<usize> {
        match self {
            Case::Nominative => Some(0),
            Case::Accusative => Some(1),
            Case::Dative => Some(2),
            Case::Genitive => Some(3),
            Case::Unspecified => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
#[repr(u8)]
pub enum Number {
    Singular = 0,
    Plural = 1,
    #[default]
    Unspecified = 2,
}

impl Feature for Number {
    const VALUES: &'static [Self] = &[Number::Singular, Number::Plural];

    fn index(self) -> Option<usize> {
        match self {
            Number::Singular => Some(0),
            Number::Plural => Some(1),
            Number::Unspecified => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
#[repr(u8)]
pub enum Gender {
    Masculine = 0,
    Feminine = 1,
    Neuter = 2,
    /// Gender-invariant plurals and nouns without grammatical gender.
    /// Compatible with every gender, but rendered distinctly.
    CommonAmbiguous = 3,
    #[default]
    Unspecified = 4,
}

impl Feature for Gender {
    const VALUES: &'static [Self] = &[Gender::Masculine, Gender::Feminine, Gender::Neuter];

    fn index(self) -> Option<usize> {
        match self {
            Gender::Masculine => Some(0),
            Gender::Feminine => Some(1),
            Gender::Neuter => Some(2),
            Gender::CommonAmbiguous | Gender::Unspecified => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
#[repr(u8)]
pub enum Person {
    First = 1,
    Second = 2,
    Third = 3,
    #[default]
    Unspecified = 0,
}

impl Feature for Person {
    const VALUES: &'static [Self] = &[Person::First, Person::Second, Person::Third];

    fn index(self) -> Option<usize> {
        match self {
            Person::First => Some(0),
            Person::Second => Some(1),
            Person::Third => Some(2),
            Person::Unspecified => None,
        }
    }
}

/// The four agreement axes of a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct FeatureTuple {
    pub case: Case,
    pub number: Number,
    pub gender: Gender,
    pub person: Person,
}

impl FeatureTuple {
    pub const fn new(case: Case, number: Number, gender: Gender, person: Person) -> Self {
        Self { case, number, gender, person }
    }

    /// Nominal tuple (case, number, gender) with person left open.
    pub const fn nominal(case: Case, number: Number, gender: Gender) -> Self {
        Self { case, number, gender, person: Person::Unspecified }
    }

    /// Verbal tuple (person, number).
    pub const fn verbal(person: Person, number: Number) -> Self {
        Self {
            case: Case::Unspecified,
            number,
            gender: Gender::Unspecified,
            person,
        }
    }

    /// Compatibility restricted to the given axes.
    pub fn compatible(&self, other: &FeatureTuple, axes: AxisSet) -> bool {
        (!axes.contains(AxisSet::CASE) || self.case.compatible(other.case))
            && (!axes.contains(AxisSet::NUMBER) || self.number.compatible(other.number))
            && (!axes.contains(AxisSet::GENDER) || self.gender.compatible(other.gender))
            && (!axes.contains(AxisSet::PERSON) || self.person.compatible(other.person))
    }

    pub fn is_unspecified(&self) -> bool {
        self.case.is_wildcard()
            && self.number.is_wildcard()
            && self.gender == Gender::Unspecified
            && self.person.is_wildcard()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub enum Axis {
    Case,
    Number,
    Gender,
    Person,
}

impl Axis {
    pub const fn flag(self) -> AxisSet {
        match self {
            Axis::Case => AxisSet::CASE,
            Axis::Number => AxisSet::NUMBER,
            Axis::Gender => AxisSet::GENDER,
            Axis::Person => AxisSet::PERSON,
        }
    }
}

impl core::fmt::Display for Axis {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Axis::Case => "case",
            Axis::Number => "number",
            Axis::Gender => "gender",
            Axis::Person => "person",
        };
        f.write_str(name)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
    pub struct AxisSet: u8 {
        const CASE = 1;
        const NUMBER = 2;
        const GENDER = 4;
        const PERSON = 8;

        const NOMINAL = Self::CASE.bits() | Self::NUMBER.bits() | Self::GENDER.bits();
        const VERBAL = Self::NUMBER.bits() | Self::PERSON.bits();
    }
}

impl AxisSet {
    /// Member axes in reporting order (case, gender, number, person).
    pub fn axes(self) -> impl Iterator<Item = Axis> {
        [Axis::Case, Axis::Gender, Axis::Number, Axis::Person]
            .into_iter()
            .filter(move |axis| self.contains(axis.flag()))
    }
}

impl From<Axis> for AxisSet {
    fn from(axis: Axis) -> Self {
        axis.flag()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub enum DeterminerKind {
    Definite,
    Indefinite,
    Negative,
    Possessive,
    Demonstrative,
    Quantifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub enum Declension {
    Strong,
    Weak,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub enum Degree {
    #[default]
    Positive,
    Comparative,
    Superlative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub enum Participle {
    Present,
    Past,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct AdjectiveInfo {
    /// `None` for predicative and adverbial use.
    pub declension: Option<Declension>,
    pub degree: Degree,
    pub participle: Option<Participle>,
}

impl AdjectiveInfo {
    pub const fn attributive(declension: Declension, degree: Degree) -> Self {
        Self { declension: Some(declension), degree, participle: None }
    }

    pub const fn predicative(degree: Degree) -> Self {
        Self { declension: None, degree, participle: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub enum NounKind {
    Common,
    Proper,
    /// Substantivized infinitive ("das Laufen").
    Infinitive,
    /// Substantivized adjective ("der Alte").
    Adjectival,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub enum Tense {
    Present,
    Preterite,
    SubjunctiveOne,
    SubjunctiveTwo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub enum VerbForm {
    Finite(Tense),
    Imperative,
    Infinitive,
    ZuInfinitive,
    PresentParticiple,
    PastParticiple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub enum VerbKind {
    Main,
    Auxiliary,
    Modal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct VerbInfo {
    pub kind: VerbKind,
    pub form: VerbForm,
}

impl VerbInfo {
    pub fn is_finite(&self) -> bool {
        matches!(self.form, VerbForm::Finite(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub enum PronounKind {
    Personal,
    Reflexive,
    Demonstrative,
    Indefinite,
    Interrogative,
    Relative,
    Possessive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub enum ConjunctionKind {
    Coordinating,
    Subordinating,
    Comparative,
    Infinitival,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub enum Particle {
    Preposition,
    Conjunction(ConjunctionKind),
    Adverb,
    Numeral,
    Punctuation,
    Negation,
    Interjection,
    VerbParticle,
    Abbreviation,
    Unknown,
}

/// Part of speech with the subtype information agreement depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub enum Category {
    Determiner(DeterminerKind),
    Adjective(AdjectiveInfo),
    Noun(NounKind),
    Verb(VerbInfo),
    Pronoun(PronounKind),
    Other(Particle),
}

impl Category {
    pub fn is_determiner(&self) -> bool {
        matches!(self, Category::Determiner(_))
    }

    pub fn is_noun(&self) -> bool {
        matches!(self, Category::Noun(_))
    }

    /// Attributive adjectives only; predicative readings carry no declension.
    pub fn is_attributive_adjective(&self) -> bool {
        matches!(self, Category::Adjective(AdjectiveInfo { declension: Some(_), .. }))
    }

    pub fn is_finite_verb(&self) -> bool {
        matches!(self, Category::Verb(info) if info.is_finite())
    }

    pub fn is_verb(&self) -> bool {
        matches!(self, Category::Verb(_))
    }

    pub fn is_pronoun(&self) -> bool {
        matches!(self, Category::Pronoun(_))
    }

    pub fn is_preposition(&self) -> bool {
        matches!(self, Category::Other(Particle::Preposition))
    }

    pub fn is_punctuation(&self) -> bool {
        matches!(self, Category::Other(Particle::Punctuation))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Category::Other(Particle::Unknown))
    }
}
