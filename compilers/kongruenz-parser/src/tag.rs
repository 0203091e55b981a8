//! The colon-separated tag alphabet (`ART:DEF:NOM:SIN:MAS`, `SUB:DAT:PLU:NEU`,
//! `VER:3:SIN:PRÄ`, ...), parsed into a category and a feature tuple.

use std::fmt;

use kongruenz_protocol::{
    AdjectiveInfo, Axis, Case, Category, ConjunctionKind, Declension, Degree, DeterminerKind,
    FeatureTuple, Gender, NounKind, Number, Participle, Particle, Person, PronounKind, Reading,
    Tense, VerbForm, VerbInfo, VerbKind,
};
use nom::{
    bytes::complete::take_while1,
    character::complete::char,
    combinator::all_consuming,
    multi::separated_list1,
    IResult,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("malformed tag {0:?}")]
    Syntax(String),
    #[error("unknown tag family {0:?}")]
    UnknownFamily(String),
    #[error("unknown code {code:?} in {family} tag")]
    UnknownCode { family: &'static str, code: String },
    #[error("conflicting {0} codes")]
    Conflict(Axis),
    #[error("{0} tag lacks its subtype")]
    MissingSubtype(&'static str),
    #[error("conflicting markers at {0:?}")]
    Duplicate(String),
}

/// A tag that could not be parsed; the reading it came with was made
/// maximally permissive instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagWarning {
    pub lemma: String,
    pub tag: String,
    pub error: TagError,
}

impl fmt::Display for TagWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tag {:?} of {:?}: {}", self.tag, self.lemma, self.error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTag {
    pub category: Category,
    pub features: FeatureTuple,
}

fn is_code_char(c: char) -> bool {
    c.is_alphanumeric() || c == '/' || c == '+'
}

fn segments(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(char(':'), take_while1(is_code_char))(input)
}

/// Accumulates agreement codes, rejecting a second value on the same axis.
#[derive(Default)]
struct Slots {
    case: Option<Case>,
    number: Option<Number>,
    gender: Option<Gender>,
    person: Option<Person>,
}

fn set<T: PartialEq>(slot: &mut Option<T>, value: T, axis: Axis) -> Result<bool, TagError> {
    match slot {
        Some(existing) if *existing != value => Err(TagError::Conflict(axis)),
        _ => {
            *slot = Some(value);
            Ok(true)
        }
    }
}

/// Single-valued marker outside the agreement axes (degree, tense, ...).
fn once<T: PartialEq>(slot: &mut Option<T>, value: T, code: &str) -> Result<(), TagError> {
    match slot {
        Some(existing) if *existing != value => Err(TagError::Duplicate(code.to_string())),
        _ => {
            *slot = Some(value);
            Ok(())
        }
    }
}

impl Slots {
    /// `Ok(true)` if `code` was an agreement code.
    fn absorb(&mut self, code: &str) -> Result<bool, TagError> {
        match code {
            "NOM" => set(&mut self.case, Case::Nominative, Axis::Case),
            "AKK" => set(&mut self.case, Case::Accusative, Axis::Case),
            "DAT" => set(&mut self.case, Case::Dative, Axis::Case),
            "GEN" => set(&mut self.case, Case::Genitive, Axis::Case),
            "SIN" => set(&mut self.number, Number::Singular, Axis::Number),
            "PLU" => set(&mut self.number, Number::Plural, Axis::Number),
            "MAS" => set(&mut self.gender, Gender::Masculine, Axis::Gender),
            "FEM" => set(&mut self.gender, Gender::Feminine, Axis::Gender),
            "NEU" => set(&mut self.gender, Gender::Neuter, Axis::Gender),
            "ALG" | "NOG" => set(&mut self.gender, Gender::CommonAmbiguous, Axis::Gender),
            "1" => set(&mut self.person, Person::First, Axis::Person),
            "2" => set(&mut self.person, Person::Second, Axis::Person),
            "3" => set(&mut self.person, Person::Third, Axis::Person),
            _ => Ok(false),
        }
    }

    fn features(&self) -> FeatureTuple {
        FeatureTuple {
            case: self.case.unwrap_or_default(),
            number: self.number.unwrap_or_default(),
            gender: self.gender.unwrap_or_default(),
            person: self.person.unwrap_or_default(),
        }
    }
}

/// Strict parse of one tag.
pub fn parse_tag(tag: &str) -> Result<ParsedTag, TagError> {
    let (_, parts) = all_consuming(segments)(tag).map_err(|_| TagError::Syntax(tag.to_string()))?;
    let (family, rest) = parts
        .split_first()
        .ok_or_else(|| TagError::Syntax(tag.to_string()))?;

    let mut slots = Slots::default();
    let category = match *family {
        "ART" => parse_article(rest, &mut slots)?,
        "PRO" => parse_pronoun(rest, &mut slots)?,
        "ADJ" | "PA1" | "PA2" => parse_adjective(family, rest, &mut slots)?,
        "SUB" | "EIG" => parse_noun(family, rest, &mut slots)?,
        "VER" => parse_verb(rest, &mut slots)?,
        "KON" => parse_conjunction(rest)?,
        "PRP" => {
            // Semantic class and case list; licensing comes from static data.
            for code in rest {
                if !code.chars().all(|c| c.is_ascii_uppercase() || c == '+') {
                    return Err(unknown("PRP", code));
                }
            }
            Category::Other(Particle::Preposition)
        }
        "ADV" => Category::Other(Particle::Adverb),
        other => {
            let particle = match other {
                "ZAL" => Particle::Numeral,
                "PKT" => Particle::Punctuation,
                "NEG" => Particle::Negation,
                "INJ" => Particle::Interjection,
                "ZUS" => Particle::VerbParticle,
                "ABK" => Particle::Abbreviation,
                "UNKNOWN" => Particle::Unknown,
                _ => return Err(TagError::UnknownFamily(other.to_string())),
            };
            if let Some(code) = rest.first() {
                return Err(unknown("particle", code));
            }
            Category::Other(particle)
        }
    };

    Ok(ParsedTag { category, features: slots.features() })
}

fn unknown(family: &'static str, code: &str) -> TagError {
    TagError::UnknownCode { family, code: code.to_string() }
}

fn parse_article(rest: &[&str], slots: &mut Slots) -> Result<Category, TagError> {
    let (subtype, codes) = rest.split_first().ok_or(TagError::MissingSubtype("ART"))?;
    let kind = match *subtype {
        "DEF" => DeterminerKind::Definite,
        "IND" => DeterminerKind::Indefinite,
        "NEG" => DeterminerKind::Negative,
        _ => return Err(TagError::MissingSubtype("ART")),
    };
    for code in codes {
        if !slots.absorb(code)? {
            return Err(unknown("ART", code));
        }
    }
    Ok(Category::Determiner(kind))
}

fn parse_pronoun(rest: &[&str], slots: &mut Slots) -> Result<Category, TagError> {
    let (subtype, codes) = rest.split_first().ok_or(TagError::MissingSubtype("PRO"))?;
    let kind = match *subtype {
        "PER" => PronounKind::Personal,
        "REF" => PronounKind::Reflexive,
        "DEM" => PronounKind::Demonstrative,
        "IND" => PronounKind::Indefinite,
        "RIN" => PronounKind::Interrogative,
        "REL" => PronounKind::Relative,
        "POS" => PronounKind::Possessive,
        _ => return Err(TagError::MissingSubtype("PRO")),
    };

    // BEG: attributive, STV: stand-alone, B/S: both.
    let mut attributive = false;
    for code in codes {
        match *code {
            "BEG" | "B/S" => attributive = true,
            "STV" => {}
            _ => {
                if !slots.absorb(code)? {
                    return Err(unknown("PRO", code));
                }
            }
        }
    }

    let determiner = match kind {
        PronounKind::Possessive => Some(DeterminerKind::Possessive),
        PronounKind::Demonstrative => Some(DeterminerKind::Demonstrative),
        PronounKind::Indefinite => Some(DeterminerKind::Quantifier),
        _ => None,
    };
    Ok(match determiner {
        Some(det) if attributive => Category::Determiner(det),
        _ => Category::Pronoun(kind),
    })
}

fn parse_adjective(family: &str, rest: &[&str], slots: &mut Slots) -> Result<Category, TagError> {
    let participle = match family {
        "PA1" => Some(Participle::Present),
        "PA2" => Some(Participle::Past),
        _ => None,
    };
    let mut degree = None;
    let mut declension = None;
    let mut predicative = false;

    for code in rest {
        match *code {
            "GRU" => once(&mut degree, Degree::Positive, code)?,
            "KOM" => once(&mut degree, Degree::Comparative, code)?,
            "SUP" => once(&mut degree, Degree::Superlative, code)?,
            "SOL" => once(&mut declension, Declension::Strong, code)?,
            "DEF" => once(&mut declension, Declension::Weak, code)?,
            "IND" => once(&mut declension, Declension::Mixed, code)?,
            "PRD" => predicative = true,
            _ => {
                if !slots.absorb(code)? {
                    return Err(unknown("ADJ", code));
                }
            }
        }
    }

    if !predicative && declension.is_none() {
        return Err(TagError::MissingSubtype("ADJ"));
    }
    Ok(Category::Adjective(AdjectiveInfo {
        declension: if predicative { None } else { declension },
        degree: degree.unwrap_or_default(),
        participle,
    }))
}

fn parse_noun(family: &str, rest: &[&str], slots: &mut Slots) -> Result<Category, TagError> {
    let mut kind = if family == "EIG" { NounKind::Proper } else { NounKind::Common };
    for code in rest {
        match (family, *code) {
            ("SUB", "INF") => kind = NounKind::Infinitive,
            ("SUB", "ADJ") => kind = NounKind::Adjectival,
            ("SUB", "DIM") => {}
            ("EIG", "VOR" | "NAC" | "COU" | "GEB" | "FIR") => {}
            _ => {
                if !slots.absorb(code)? {
                    return Err(unknown("SUB", code));
                }
            }
        }
    }
    Ok(Category::Noun(kind))
}

fn parse_verb(rest: &[&str], slots: &mut Slots) -> Result<Category, TagError> {
    let mut kind = VerbKind::Main;
    let mut form = None;
    let mut tense = None;

    for code in rest {
        match *code {
            "AUX" => kind = VerbKind::Auxiliary,
            "MOD" => kind = VerbKind::Modal,
            "INF" => form = Some(VerbForm::Infinitive),
            "EIZ" => form = Some(VerbForm::ZuInfinitive),
            "PA1" => form = Some(VerbForm::PresentParticiple),
            "PA2" => form = Some(VerbForm::PastParticiple),
            "IMP" => form = Some(VerbForm::Imperative),
            "PRÄ" => once(&mut tense, Tense::Present, code)?,
            "PRT" => once(&mut tense, Tense::Preterite, code)?,
            "KJ1" => once(&mut tense, Tense::SubjunctiveOne, code)?,
            "KJ2" => once(&mut tense, Tense::SubjunctiveTwo, code)?,
            "SFT" | "NON" => {}
            _ => {
                if !slots.absorb(code)? {
                    return Err(unknown("VER", code));
                }
            }
        }
    }

    let form = match (form, tense) {
        (Some(form), None) => form,
        (None, Some(tense)) => VerbForm::Finite(tense),
        _ => return Err(TagError::MissingSubtype("VER")),
    };
    Ok(Category::Verb(VerbInfo { kind, form }))
}

fn parse_conjunction(rest: &[&str]) -> Result<Category, TagError> {
    let kind = match rest {
        ["NEB"] => ConjunctionKind::Coordinating,
        ["UNT"] => ConjunctionKind::Subordinating,
        ["VGL"] => ConjunctionKind::Comparative,
        ["INF"] => ConjunctionKind::Infinitival,
        _ => return Err(TagError::MissingSubtype("KON")),
    };
    Ok(Category::Other(Particle::Conjunction(kind)))
}

/// Lenient parse: a malformed tag yields a reading with every axis open and
/// a warning for the host.
pub fn parse_reading(lemma: &str, tag: &str) -> (Reading, Option<TagWarning>) {
    match parse_tag(tag) {
        Ok(parsed) => (Reading::new(lemma, parsed.category, parsed.features), None),
        Err(error) => (
            Reading::new(lemma, Category::Other(Particle::Unknown), FeatureTuple::default()),
            Some(TagWarning {
                lemma: lemma.to_string(),
                tag: tag.to_string(),
                error,
            }),
        ),
    }
}

fn case_code(case: Case) -> Option<&'static str> {
    match case {
        Case::Nominative => Some("NOM"),
        Case::Accusative => Some("AKK"),
        Case::Dative => Some("DAT"),
        Case::Genitive => Some("GEN"),
        Case::Unspecified => None,
    }
}

fn number_code(number: Number) -> Option<&'static str> {
    match number {
        Number::Singular => Some("SIN"),
        Number::Plural => Some("PLU"),
        Number::Unspecified => None,
    }
}

fn gender_code(gender: Gender) -> Option<&'static str> {
    match gender {
        Gender::Masculine => Some("MAS"),
        Gender::Feminine => Some("FEM"),
        Gender::Neuter => Some("NEU"),
        Gender::CommonAmbiguous => Some("ALG"),
        Gender::Unspecified => None,
    }
}

fn person_code(person: Person) -> Option<&'static str> {
    match person {
        Person::First => Some("1"),
        Person::Second => Some("2"),
        Person::Third => Some("3"),
        Person::Unspecified => None,
    }
}

fn degree_code(degree: Degree) -> &'static str {
    match degree {
        Degree::Positive => "GRU",
        Degree::Comparative => "KOM",
        Degree::Superlative => "SUP",
    }
}

/// Canonical tag for a category and tuple; the form synthesis lookups use.
pub fn render_tag(category: &Category, features: &FeatureTuple) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(7);
    let nominal = |parts: &mut Vec<&str>| {
        parts.extend(case_code(features.case));
        parts.extend(number_code(features.number));
        parts.extend(gender_code(features.gender));
    };

    match category {
        Category::Determiner(kind) => {
            let (head, sub, beg) = match kind {
                DeterminerKind::Definite => ("ART", "DEF", false),
                DeterminerKind::Indefinite => ("ART", "IND", false),
                DeterminerKind::Negative => ("ART", "NEG", false),
                DeterminerKind::Possessive => ("PRO", "POS", true),
                DeterminerKind::Demonstrative => ("PRO", "DEM", true),
                DeterminerKind::Quantifier => ("PRO", "IND", true),
            };
            parts.push(head);
            parts.push(sub);
            nominal(&mut parts);
            if beg {
                parts.push("BEG");
            }
        }
        Category::Adjective(info) => {
            parts.push(match info.participle {
                None => "ADJ",
                Some(Participle::Present) => "PA1",
                Some(Participle::Past) => "PA2",
            });
            match info.declension {
                None => {
                    parts.push("PRD");
                    parts.push(degree_code(info.degree));
                }
                Some(declension) => {
                    nominal(&mut parts);
                    parts.push(degree_code(info.degree));
                    parts.push(match declension {
                        Declension::Strong => "SOL",
                        Declension::Weak => "DEF",
                        Declension::Mixed => "IND",
                    });
                }
            }
        }
        Category::Noun(kind) => {
            parts.push(if *kind == NounKind::Proper { "EIG" } else { "SUB" });
            nominal(&mut parts);
            match kind {
                NounKind::Infinitive => parts.push("INF"),
                NounKind::Adjectival => parts.push("ADJ"),
                NounKind::Common | NounKind::Proper => {}
            }
        }
        Category::Verb(info) => {
            parts.push("VER");
            match info.kind {
                VerbKind::Main => {}
                VerbKind::Auxiliary => parts.push("AUX"),
                VerbKind::Modal => parts.push("MOD"),
            }
            match info.form {
                VerbForm::Finite(tense) => {
                    parts.extend(person_code(features.person));
                    parts.extend(number_code(features.number));
                    parts.push(match tense {
                        Tense::Present => "PRÄ",
                        Tense::Preterite => "PRT",
                        Tense::SubjunctiveOne => "KJ1",
                        Tense::SubjunctiveTwo => "KJ2",
                    });
                }
                VerbForm::Imperative => {
                    parts.push("IMP");
                    parts.extend(number_code(features.number));
                }
                VerbForm::Infinitive => parts.push("INF"),
                VerbForm::ZuInfinitive => parts.push("EIZ"),
                VerbForm::PresentParticiple => parts.push("PA1"),
                VerbForm::PastParticiple => parts.push("PA2"),
            }
        }
        Category::Pronoun(kind) => {
            parts.push("PRO");
            parts.push(match kind {
                PronounKind::Personal => "PER",
                PronounKind::Reflexive => "REF",
                PronounKind::Demonstrative => "DEM",
                PronounKind::Indefinite => "IND",
                PronounKind::Interrogative => "RIN",
                PronounKind::Relative => "REL",
                PronounKind::Possessive => "POS",
            });
            parts.extend(person_code(features.person));
            nominal(&mut parts);
            if matches!(
                kind,
                PronounKind::Demonstrative | PronounKind::Indefinite | PronounKind::Possessive
            ) {
                parts.push("STV");
            }
        }
        Category::Other(particle) => match particle {
            Particle::Preposition => parts.push("PRP"),
            Particle::Conjunction(kind) => {
                parts.push("KON");
                parts.push(match kind {
                    ConjunctionKind::Coordinating => "NEB",
                    ConjunctionKind::Subordinating => "UNT",
                    ConjunctionKind::Comparative => "VGL",
                    ConjunctionKind::Infinitival => "INF",
                });
            }
            Particle::Adverb => parts.push("ADV"),
            Particle::Numeral => parts.push("ZAL"),
            Particle::Punctuation => parts.push("PKT"),
            Particle::Negation => parts.push("NEG"),
            Particle::Interjection => parts.push("INJ"),
            Particle::VerbParticle => parts.push("ZUS"),
            Particle::Abbreviation => parts.push("ABK"),
            Particle::Unknown => parts.push("UNKNOWN"),
        },
    }

    parts.join(":")
}

#[cfg(test)]
mod tests {
    use super::*;
    use kongruenz_protocol::{AxisSet, Feature, ReadingSet, Token};
    use proptest::prelude::*;

    #[test]
    fn test_article() {
        let parsed = parse_tag("ART:DEF:NOM:SIN:FEM").unwrap();
        assert_eq!(parsed.category, Category::Determiner(DeterminerKind::Definite));
        assert_eq!(
            parsed.features,
            FeatureTuple::nominal(Case::Nominative, Number::Singular, Gender::Feminine)
        );
    }

    #[test]
    fn test_pronoun_usage_decides_category() {
        let beg = parse_tag("PRO:POS:AKK:SIN:MAS:BEG").unwrap();
        assert_eq!(beg.category, Category::Determiner(DeterminerKind::Possessive));

        let stv = parse_tag("PRO:DEM:NOM:SIN:NEU:STV").unwrap();
        assert_eq!(stv.category, Category::Pronoun(PronounKind::Demonstrative));

        let per = parse_tag("PRO:PER:1:NOM:SIN:ALG").unwrap();
        assert_eq!(per.category, Category::Pronoun(PronounKind::Personal));
        assert_eq!(per.features.person, Person::First);
        assert_eq!(per.features.gender, Gender::CommonAmbiguous);
    }

    #[test]
    fn test_adjective_declension() {
        let parsed = parse_tag("ADJ:AKK:SIN:FEM:GRU:SOL").unwrap();
        assert_eq!(
            parsed.category,
            Category::Adjective(AdjectiveInfo::attributive(Declension::Strong, Degree::Positive))
        );
        let prd = parse_tag("ADJ:PRD:KOM").unwrap();
        assert!(!prd.category.is_attributive_adjective());
    }

    #[test]
    fn test_verb() {
        let parsed = parse_tag("VER:AUX:3:SIN:PRÄ").unwrap();
        assert_eq!(
            parsed.category,
            Category::Verb(VerbInfo {
                kind: VerbKind::Auxiliary,
                form: VerbForm::Finite(Tense::Present)
            })
        );
        assert_eq!(parsed.features, FeatureTuple::verbal(Person::Third, Number::Singular));
        // Separability markers are accepted and dropped
        assert!(parse_tag("VER:1:PLU:PRT:SFT").is_ok());
    }

    #[test]
    fn test_malformed_tags() {
        assert!(matches!(parse_tag(""), Err(TagError::Syntax(_))));
        assert!(matches!(parse_tag("SUB::NOM"), Err(TagError::Syntax(_))));
        assert!(matches!(parse_tag("XYZ:NOM"), Err(TagError::UnknownFamily(_))));
        assert!(matches!(parse_tag("SUB:NOM:AKK:SIN:FEM"), Err(TagError::Conflict(Axis::Case))));
        assert!(matches!(parse_tag("SUB:NOM:SIN:FOO"), Err(TagError::UnknownCode { .. })));
    }

    #[test]
    fn test_lenient_reading_is_permissive() {
        let (reading, warning) = parse_reading("Haus", "SUB:NOM:SIN:XX");
        assert!(warning.is_some());
        assert!(reading.features.is_unspecified());
        println!("{}", warning.unwrap());
    }

    #[test]
    fn test_render_is_parseable() {
        for tag in [
            "ART:DEF:NOM:SIN:FEM",
            "PRO:POS:AKK:SIN:MAS:BEG",
            "ADJ:DAT:PLU:ALG:GRU:DEF",
            "PA2:NOM:SIN:NEU:GRU:IND",
            "SUB:GEN:SIN:NEU:INF",
            "EIG:NOM:SIN:FEM",
            "VER:MOD:2:PLU:KJ2",
            "VER:IMP:SIN",
            "PRO:PER:3:NOM:PLU:ALG",
            "KON:NEB",
        ] {
            let parsed = parse_tag(tag).unwrap();
            assert_eq!(render_tag(&parsed.category, &parsed.features), tag);
        }
    }

    fn code_strategy() -> impl Strategy<Value = &'static str> {
        prop_oneof![
            Just("NOM"),
            Just("AKK"),
            Just("DAT"),
            Just("GEN"),
            Just("SIN"),
            Just("PLU"),
            Just("MAS"),
            Just("FEM"),
            Just("NEU"),
            Just("ALG"),
        ]
    }

    fn token_from(tags: &[String]) -> Token {
        let readings = tags.iter().map(|t| parse_reading("w", t).0).collect();
        Token {
            text: "w".to_string(),
            start: 0,
            end: 1,
            readings: ReadingSet::new(readings).unwrap(),
            sentence_start: false,
            whitespace_before: false,
        }
    }

    proptest! {
        // A token matches a target exactly when one of its tags, read back,
        // is compatible with it on every axis.
        #[test]
        fn test_matches_over_generated_tags(
            codes in proptest::collection::vec(proptest::collection::vec(code_strategy(), 0..4), 1..5),
            target in (0usize..4, 0usize..2, 0usize..3),
        ) {
            let tags: Vec<String> = codes
                .iter()
                .map(|cs| {
                    let mut parts = vec!["SUB"];
                    parts.extend(cs.iter().copied());
                    parts.join(":")
                })
                .collect();
            let tok = token_from(&tags);
            let wanted = FeatureTuple::nominal(
                Case::VALUES[target.0],
                Number::VALUES[target.1],
                Gender::VALUES[target.2],
            );

            let expected = tags.iter().any(|t| match parse_tag(t) {
                Ok(p) => p.features.case.compatible(wanted.case)
                    && p.features.number.compatible(wanted.number)
                    && p.features.gender.compatible(wanted.gender),
                // Conflicting codes degrade to a fully open reading
                Err(_) => true,
            });
            prop_assert_eq!(tok.matches(&wanted, AxisSet::NOMINAL), expected);
        }
    }
}
