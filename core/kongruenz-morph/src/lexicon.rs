//! Full-form lexicon built from a paradigm dictionary.
//!
//! Every `(lemma, ending)` cell is expanded once at load time into a surface
//! index for tagging; synthesis walks the lemma's paradigm on demand.

use std::collections::HashMap;

use kongruenz_parser::{parse_reading, TagWarning};
use kongruenz_protocol::{Dictionary, Lemma, Paradigm, ParadigmId, Reading, ReadingSet, Synthesizer, Tagger};

use crate::{inflect, MorphError};

pub struct Lexicon {
    lemmas: Vec<Lemma>,
    paradigms: HashMap<ParadigmId, Paradigm>,
    /// Surface form -> readings, in dictionary order.
    forms: HashMap<String, Vec<Reading>>,
    /// Lemma text -> indices into `lemmas`.
    by_lemma: HashMap<String, Vec<usize>>,
    warnings: Vec<TagWarning>,
}

impl Lexicon {
    /// Validates the dictionary's structure and indexes every form.
    ///
    /// Malformed tags do not fail the load: their readings degrade to
    /// unknown and are listed in [`Lexicon::warnings`].
    pub fn new(dictionary: Dictionary) -> Result<Self, MorphError> {
        let mut paradigms = HashMap::with_capacity(dictionary.paradigms.len());
        for paradigm in dictionary.paradigms {
            let id = paradigm.id;
            if paradigms.insert(id, paradigm).is_some() {
                return Err(MorphError::DuplicateParadigm(id.0));
            }
        }

        let mut forms: HashMap<String, Vec<Reading>> = HashMap::new();
        let mut by_lemma: HashMap<String, Vec<usize>> = HashMap::new();
        let mut warnings = Vec::new();

        for (index, lemma) in dictionary.lemmas.iter().enumerate() {
            let paradigm = paradigms.get(&lemma.paradigm).ok_or_else(|| MorphError::MissingParadigm {
                lemma: lemma.text.clone(),
                paradigm: lemma.paradigm.0,
            })?;

            for ending in &paradigm.endings {
                let stem = lemma.stems.get(usize::from(ending.stem)).ok_or_else(|| {
                    MorphError::MissingStem {
                        lemma: lemma.text.clone(),
                        paradigm: paradigm.name.clone(),
                        stem: ending.stem,
                        available: lemma.stems.len(),
                    }
                })?;

                let (reading, warning) = parse_reading(&lemma.text, &ending.tag);
                if let Some(warning) = warning {
                    warnings.push(warning);
                }

                let readings = forms.entry(format!("{}{}", stem, ending.suffix)).or_default();
                if !readings.contains(&reading) {
                    readings.push(reading);
                }
            }

            by_lemma.entry(lemma.text.clone()).or_default().push(index);
        }

        log::debug!(
            "lexicon v{}: {} lemmas, {} paradigms, {} surface forms",
            dictionary.version,
            dictionary.lemmas.len(),
            paradigms.len(),
            forms.len()
        );

        Ok(Self {
            lemmas: dictionary.lemmas,
            paradigms,
            forms,
            by_lemma,
            warnings,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, MorphError> {
        let dictionary: Dictionary = serde_json::from_str(json)?;
        Self::new(dictionary)
    }

    /// Loads a dictionary archived by the lexicon compiler.
    pub fn from_archive(bytes: &[u8]) -> Result<Self, MorphError> {
        let dictionary = rkyv::from_bytes::<Dictionary>(bytes)
            .map_err(|e| MorphError::Archive(format!("{:?}", e)))?;
        Self::new(dictionary)
    }

    pub fn warnings(&self) -> &[TagWarning] {
        &self.warnings
    }

    pub fn lemma_count(&self) -> usize {
        self.lemmas.len()
    }

    pub fn form_count(&self) -> usize {
        self.forms.len()
    }

    /// Every tag the dictionary's paradigms use, once.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        let mut seen = std::collections::HashSet::new();
        self.paradigms
            .values()
            .flat_map(|p| p.endings.iter())
            .map(|e| e.tag.as_str())
            .filter(move |tag| seen.insert(*tag))
    }

    fn lookup(&self, surface: &str) -> Option<&[Reading]> {
        self.forms.get(surface).map(Vec::as_slice)
    }
}

/// `"Die"` -> `"die"`.
fn decapitalize(surface: &str) -> Option<String> {
    let mut chars = surface.chars();
    let first = chars.next()?;
    if !first.is_uppercase() {
        return None;
    }
    Some(first.to_lowercase().chain(chars).collect())
}

impl Tagger for Lexicon {
    fn tag(&self, surface: &str, sentence_start: bool) -> ReadingSet {
        let mut readings: Vec<Reading> = self.lookup(surface).map(<[Reading]>::to_vec).unwrap_or_default();

        // Sentence-initial capitals, and substantivized adjectives ("das Gute")
        if sentence_start || readings.is_empty() {
            if let Some(lower) = decapitalize(surface) {
                for reading in self.lookup(&lower).unwrap_or_default() {
                    if !readings.contains(reading) {
                        readings.push(reading.clone());
                    }
                }
            }
        }

        ReadingSet::new(readings).unwrap_or_else(|_| ReadingSet::unknown(surface))
    }
}

impl Synthesizer for Lexicon {
    fn synthesize(&self, lemma: &str, tag: &str) -> Vec<String> {
        let mut result: Vec<String> = Vec::new();
        for &index in self.by_lemma.get(lemma).map(Vec::as_slice).unwrap_or_default() {
            let entry = &self.lemmas[index];
            let Some(paradigm) = self.paradigms.get(&entry.paradigm) else {
                continue;
            };
            for form in inflect(entry, paradigm, tag) {
                if !result.contains(&form) {
                    result.push(form);
                }
            }
        }
        result
    }
}
