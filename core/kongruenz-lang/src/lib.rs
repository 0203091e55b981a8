//! Static, versioned German data tables the checkers consult.
//!
//! The tables are embedded at compile time and parsed once per process.

pub mod tables;

pub use tables::*;

use std::collections::HashMap;
use std::sync::OnceLock;

use kongruenz_parser::parse_tag;
use kongruenz_protocol::Case;
use serde::Deserialize;
use thiserror::Error;

const GERMAN: &str = include_str!("../data/de.json");

/// Version of the table layout this crate understands.
pub const DATA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum LangError {
    #[error("invalid language data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("language data version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("invalid tag {tag:?} in {table}: {message}")]
    Tag {
        table: &'static str,
        tag: String,
        message: String,
    },
    #[error("valency frame of {verb:?} inherits unknown verb {base:?}")]
    UnknownBase { verb: String, base: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageData {
    pub version: u32,
    pub language: String,
    pub phrase: PhraseExceptions,
    pub declension: DeclensionTable,
    prepositions: Vec<PrepositionCases>,
    /// Lemma of the article contractions fuse with.
    pub definite_article: String,
    contractions: Vec<Contraction>,
    pub subject_verb: SubjectVerbClasses,
    valency: Vec<ValencyEntry>,
    pub temporal_nouns: WordSet,
    #[serde(skip)]
    preposition_index: HashMap<String, usize>,
    #[serde(skip)]
    contraction_index: HashMap<String, usize>,
}

impl LanguageData {
    /// Parses and validates a data file.
    pub fn from_json(json: &str) -> Result<Self, LangError> {
        let mut data: LanguageData =
            serde_json::from_str(json)?;

        if data.version != DATA_VERSION {
            return Err(LangError::UnsupportedVersion {
                found: data.version,
                expected: DATA_VERSION,
            });
        }

        for contraction in &data.contractions {
            for tag in &contraction.tags {
                parse_tag(tag).map_err(|e| LangError::Tag {
                    table: "contractions",
                    tag: tag.clone(),
                    message: e.to_string(),
                })?;
            }
        }

        for entry in &data.valency {
            if let Some(base) = &entry.inherits {
                if !data.valency.iter().any(|e| &e.verb == base) {
                    return Err(LangError::UnknownBase {
                        verb: entry.verb.clone(),
                        base: base.clone(),
                    });
                }
            }
        }

        data.preposition_index = data
            .prepositions
            .iter()
            .enumerate()
            .map(|(i, p)| (p.word.to_lowercase(), i))
            .collect();
        data.contraction_index = data
            .contractions
            .iter()
            .enumerate()
            .map(|(i, c)| (c.surface.to_lowercase(), i))
            .collect();

        Ok(data)
    }

    /// Cases licensed by a preposition or a contracted preposition-article.
    pub fn preposition_cases(&self, word: &str) -> Option<&[Case]> {
        let word = word.to_lowercase();
        if let Some(&i) = self.preposition_index.get(&word) {
            return Some(&self.prepositions[i].cases);
        }
        let contraction = self.contraction_index.get(&word).map(|&i| &self.contractions[i])?;
        self.preposition_cases(&contraction.preposition)
    }

    pub fn contraction(&self, surface: &str) -> Option<&Contraction> {
        self.contraction_index
            .get(&surface.to_lowercase())
            .map(|&i| &self.contractions[i])
    }

    /// Fuses a preposition with an article form: `("zu", "dem")` -> `"zum"`.
    pub fn recontract(&self, preposition: &str, article: &str) -> Option<&str> {
        self.contractions
            .iter()
            .find(|c| {
                c.preposition.eq_ignore_ascii_case(preposition)
                    && c.article.to_lowercase() == article.to_lowercase()
            })
            .map(|c| c.surface.as_str())
    }

    pub fn valency(&self) -> &[ValencyEntry] {
        &self.valency
    }
}

/// The German tables, parsed on first successful use. A parse failure is
/// not cached; every call reports it again.
pub fn german() -> Result<&'static LanguageData, LangError> {
    static GERMAN_DATA: OnceLock<LanguageData> = OnceLock::new();
    if let Some(data) = GERMAN_DATA.get() {
        return Ok(data);
    }
    let data = LanguageData::from_json(GERMAN)?;
    log::debug!(
        "language data {} v{}: {} prepositions, {} contractions, {} valency frames",
        data.language,
        data.version,
        data.prepositions.len(),
        data.contractions.len(),
        data.valency.len()
    );
    Ok(GERMAN_DATA.get_or_init(|| data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kongruenz_protocol::{Declension, DeterminerKind};

    #[test]
    fn test_embedded_data_loads() {
        let data = german().unwrap();
        assert_eq!(data.language, "de");
        assert!(std::ptr::eq(data, german().unwrap()));
    }

    #[test]
    fn test_phrase_exceptions() {
        let phrase = &german().unwrap().phrase;
        assert!(phrase.ignored_nouns.contains("Prozent"));
        assert!(phrase.titles.contains("herr"));
        assert!(phrase.is_frozen(&["Die", "eine", "Frau"]));
        assert!(!phrase.is_frozen(&["die"]));
        assert!(!phrase.is_frozen(&["die", "kleine"]));
    }

    #[test]
    fn test_declension_table() {
        let table = &german().unwrap().declension;
        assert_eq!(table.after(None), &[Declension::Strong]);
        assert_eq!(table.after(Some((DeterminerKind::Definite, "der"))), &[Declension::Weak]);
        assert_eq!(table.after(Some((DeterminerKind::Possessive, "mein"))), &[Declension::Mixed]);
        assert_eq!(table.after(Some((DeterminerKind::Quantifier, "viele"))), &[Declension::Strong]);
        assert_eq!(table.after(Some((DeterminerKind::Quantifier, "alle"))), &[Declension::Weak]);
    }

    #[test]
    fn test_prepositions_and_contractions() {
        let data = german().unwrap();
        assert_eq!(data.preposition_cases("für"), Some(&[Case::Accusative][..]));
        assert_eq!(data.preposition_cases("In"), Some(&[Case::Dative, Case::Accusative][..]));
        // Contractions license what their preposition licenses
        assert_eq!(data.preposition_cases("zur"), Some(&[Case::Dative][..]));
        assert_eq!(data.preposition_cases("und"), None);

        assert_eq!(data.contraction("ins").map(|c| c.article.as_str()), Some("das"));
        assert_eq!(data.recontract("zu", "dem"), Some("zum"));
        assert_eq!(data.recontract("zu", "Der"), Some("zur"));
        assert_eq!(data.recontract("zu", "den"), None);
    }

    #[test]
    fn test_subject_verb_classes() {
        let sv = &german().unwrap().subject_verb;
        assert!(sv.plural_connectors.contains("und"));
        assert!(sv.is_singular_coordination(&["Obst", "Gemüse"]));
        assert!(!sv.is_singular_coordination(&["Julia", "Karsten"]));
        assert!(sv.copulas.contains("sein"));
    }

    #[test]
    fn test_rejects_bad_data() {
        let bad_version = GERMAN.replacen("\"version\": 1", "\"version\": 7", 1);
        assert!(matches!(
            LanguageData::from_json(&bad_version),
            Err(LangError::UnsupportedVersion { found: 7, expected: 1 })
        ));

        let bad_tag = GERMAN.replacen("ART:DEF:DAT:SIN:FEM", "ART:XYZ", 1);
        assert!(matches!(
            LanguageData::from_json(&bad_tag),
            Err(LangError::Tag { table: "contractions", .. })
        ));

        let truncated = LanguageData::from_json("{").unwrap_err();
        assert!(matches!(truncated, LangError::Json(_)));
        let source = std::error::Error::source(&truncated).expect("serde_json cause");
        assert!(source.downcast_ref::<serde_json::Error>().unwrap().is_eof());
    }
}
