//! Corrected surface strings for disagreeing phrases and finite verbs.

use kongruenz_lang::LanguageData;
use kongruenz_parser::render_tag;
use kongruenz_protocol::{
    AdjectiveInfo, AxisSet, Case, Category, Declension, Feature, FeatureTuple, Gender, Number,
    Person, Reading, Synthesizer, Token, ViolatedAxes,
};

use crate::components::{DeterminerSource, Head, NounPhrase, VerbGroup};
use crate::unify::{relaxed_intersection, AgreementSet};

/// Inflects the constituents of a phrase (or a finite verb) into every
/// cell the rest of the sentence allows.
pub struct SuggestionSynthesizer<'a, S: Synthesizer + ?Sized> {
    synthesizer: &'a S,
    data: &'a LanguageData,
}

#[derive(Debug, Clone, PartialEq)]
struct Variant {
    lemma: String,
    category: Category,
    /// Own gender of a noun head; `Unspecified` for adjectives.
    gender: Gender,
}

fn variants(readings: &[&Reading], gender: bool) -> Vec<Variant> {
    let mut result: Vec<Variant> = Vec::new();
    for r in readings {
        let variant = Variant {
            lemma: r.lemma.clone(),
            category: r.category,
            gender: if gender { r.features.gender } else { Gender::Unspecified },
        };
        if !result.contains(&variant) {
            result.push(variant);
        }
    }
    result
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Cartesian product of per-token alternatives, in token order.
fn product(options: &[Vec<String>]) -> Vec<Vec<String>> {
    options.iter().fold(vec![Vec::new()], |acc, choices| {
        acc.iter()
            .flat_map(|prefix| {
                choices.iter().map(move |choice| {
                    let mut next = prefix.clone();
                    next.push(choice.clone());
                    next
                })
            })
            .collect()
    })
}

fn join(tokens: &[Token], start: usize, words: &[String]) -> String {
    let mut out = String::new();
    for (k, word) in words.iter().enumerate() {
        if k > 0 && tokens[start + k].whitespace_before {
            out.push(' ');
        }
        out.push_str(word);
    }
    if tokens[start].starts_uppercase() {
        out = capitalize(&out);
    }
    out
}

fn push_unique(out: &mut Vec<String>, candidate: String, original: &str) {
    if candidate != original && !out.contains(&candidate) {
        out.push(candidate);
    }
}

impl<'a, S: Synthesizer + ?Sized> SuggestionSynthesizer<'a, S> {
    pub fn new(synthesizer: &'a S, data: &'a LanguageData) -> Self {
        Self { synthesizer, data }
    }

    fn forms(&self, lemma: &str, category: &Category, features: &FeatureTuple) -> Vec<String> {
        self.synthesizer.synthesize(lemma, &render_tag(category, features))
    }

    /// Corrections for a phrase, in number, case, head-variant order.
    /// A governing preposition restricts the case to what it licenses.
    pub fn phrase(
        &self,
        tokens: &[Token],
        phrase: &NounPhrase,
        violated: &ViolatedAxes,
        preposition: Option<&Token>,
    ) -> Vec<String> {
        let variable = violated.variable(AxisSet::NOMINAL);
        let target = relaxed_intersection(&phrase.constraints, variable);
        if target.is_empty() {
            return Vec::new();
        }

        let numbers: Vec<Number> = match phrase.pinned {
            Some(n) => vec![n],
            None if variable.contains(AxisSet::NUMBER) => Number::VALUES.to_vec(),
            None => target.values::<Number>(),
        };
        let mut cases: Vec<Case> = if variable.contains(AxisSet::CASE) {
            Case::VALUES.to_vec()
        } else {
            target.values::<Case>()
        };
        if let Some(licensed) = preposition.and_then(|p| self.data.preposition_cases(&p.text)) {
            cases.retain(|c| licensed.contains(c));
        }

        let head_token = &tokens[phrase.head_index()];
        let head_variants = match phrase.head {
            Head::Noun(_) => {
                let nouns: Vec<&Reading> =
                    head_token.readings.iter().filter(|r| r.category.is_noun()).collect();
                variants(&nouns, true)
            }
            Head::Adjective(_) => {
                let adjectives: Vec<&Reading> = head_token
                    .readings
                    .iter()
                    .filter(|r| r.category.is_attributive_adjective())
                    .collect();
                variants(&adjectives, false)
            }
        };

        let declension = self.declension(phrase);
        let start = phrase.span.start;
        let original = join(
            tokens,
            start,
            &tokens[phrase.span.indices()].iter().map(|t| t.text.clone()).collect::<Vec<_>>(),
        );

        let mut out = Vec::new();
        for &number in &numbers {
            for &case in &cases {
                for head in &head_variants {
                    let genders = match head.gender {
                        Gender::Unspecified => target.values::<Gender>(),
                        own => vec![own],
                    };
                    for gender in genders {
                        let cell = FeatureTuple::nominal(case, number, gender);
                        if !target.admits(&cell) {
                            continue;
                        }
                        let Some(options) =
                            self.phrase_options(tokens, phrase, head, declension, cell)
                        else {
                            continue;
                        };
                        for words in product(&options) {
                            push_unique(&mut out, join(tokens, start, &words), &original);
                        }
                    }
                }
            }
        }
        out
    }

    fn declension(&self, phrase: &NounPhrase) -> Declension {
        let determiner = phrase.determiner.as_ref().and_then(|d| {
            d.readings.iter().find_map(|r| match r.category {
                Category::Determiner(kind) => Some((kind, r.lemma.as_str())),
                _ => None,
            })
        });
        self.data
            .declension
            .after(determiner)
            .first()
            .copied()
            .unwrap_or(Declension::Strong)
    }

    /// Per-token alternatives for one target cell; `None` if some
    /// constituent has no form there.
    fn phrase_options(
        &self,
        tokens: &[Token],
        phrase: &NounPhrase,
        head: &Variant,
        declension: Declension,
        cell: FeatureTuple,
    ) -> Option<Vec<Vec<String>>> {
        // Plural determiners and adjectives do not distinguish gender
        let agreeing = if cell.number == Number::Plural {
            FeatureTuple { gender: Gender::CommonAmbiguous, ..cell }
        } else {
            cell
        };

        let mut options = Vec::with_capacity(phrase.span.len());
        for i in phrase.span.indices() {
            let token = &tokens[i];
            let words = if phrase.determiner.as_ref().is_some_and(|d| d.index == i) {
                self.determiner_forms(phrase, agreeing)
            } else if phrase.adjectives.contains(&i) {
                let reading = token.readings.iter().find_map(|r| match r.category {
                    Category::Adjective(info) if info.declension.is_some() => Some((r, info)),
                    _ => None,
                });
                match reading {
                    Some((r, info)) => {
                        let info = AdjectiveInfo { declension: Some(declension), ..info };
                        self.forms(&r.lemma, &Category::Adjective(info), &agreeing)
                    }
                    None => vec![token.text.clone()],
                }
            } else if i == phrase.head_index() {
                let (category, features) = match head.category {
                    Category::Adjective(info) => (
                        Category::Adjective(AdjectiveInfo { declension: Some(declension), ..info }),
                        agreeing,
                    ),
                    noun => {
                        let gender = if cell.number == Number::Plural && head.gender.is_wildcard() {
                            Gender::CommonAmbiguous
                        } else {
                            head.gender
                        };
                        (noun, FeatureTuple { gender, ..cell })
                    }
                };
                let forms = self.forms(&head.lemma, &category, &features);
                match phrase.head {
                    Head::Adjective(_) => forms.iter().map(|f| capitalize(f)).collect(),
                    Head::Noun(_) => forms,
                }
            } else {
                vec![token.text.clone()]
            };
            if words.is_empty() {
                return None;
            }
            options.push(words);
        }
        Some(options)
    }

    fn determiner_forms(&self, phrase: &NounPhrase, features: FeatureTuple) -> Vec<String> {
        let Some(det) = &phrase.determiner else {
            return Vec::new();
        };
        let readings: Vec<&Reading> = det.readings.iter().collect();
        let mut forms = Vec::new();
        for variant in variants(&readings, false) {
            for form in self.forms(&variant.lemma, &variant.category, &features) {
                let form = match &det.source {
                    DeterminerSource::Token => Some(form),
                    DeterminerSource::Contraction { preposition } => {
                        self.data.recontract(preposition, &form).map(str::to_string)
                    }
                };
                if let Some(form) = form {
                    if !forms.contains(&form) {
                        forms.push(form);
                    }
                }
            }
        }
        forms
    }

    /// Finite-verb forms for every person and number the subject admits.
    pub fn verb(&self, tokens: &[Token], group: &VerbGroup, subject: AgreementSet) -> Vec<String> {
        let original = &tokens[group.finite];
        let readings: Vec<&Reading> = group.readings.iter().collect();
        let verbs = variants(&readings, false);

        let mut out = Vec::new();
        for number in subject.values::<Number>() {
            for person in subject.values::<Person>() {
                let cell = FeatureTuple::verbal(person, number);
                if !subject.admits(&cell) {
                    continue;
                }
                for verb in &verbs {
                    for form in self.forms(&verb.lemma, &verb.category, &cell) {
                        let form = if original.starts_uppercase() { capitalize(&form) } else { form };
                        push_unique(&mut out, form, &original.text);
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Mismatch, Subject};
    use crate::systems::phrase::governing_preposition;
    use crate::fixture::{data, lexicon, sentence};
    use crate::SentenceWorld;
    use std::collections::HashSet;

    fn phrase_suggestions(text: &str) -> Vec<String> {
        let sentence = sentence(text);
        let mut sw = SentenceWorld::new(&sentence);
        sw.run(data()).unwrap();
        let synth = SuggestionSynthesizer::new(lexicon(), data());
        let found = sw
            .inner()
            .query::<(&NounPhrase, &Mismatch)>()
            .iter()
            .map(|(_, (p, m))| {
                let preposition = governing_preposition(&sentence.tokens, p);
                synth.phrase(&sentence.tokens, p, &m.0.violated, preposition)
            })
            .next();
        found.unwrap_or_default()
    }

    #[test]
    fn test_gender_correction() {
        assert_eq!(phrase_suggestions("Der Fahrrad."), vec!["Das Fahrrad"]);
    }

    #[test]
    fn test_adjective_follows_determiner() {
        assert_eq!(
            phrase_suggestions("Das ist ein schönes Tisch."),
            vec!["ein schöner Tisch", "einen schönen Tisch"]
        );
    }

    #[test]
    fn test_contraction_is_refused() {
        assert_eq!(phrase_suggestions("Ich gehe zur Mann."), vec!["zum Mann"]);
    }

    #[test]
    fn test_numeral_keeps_plural() {
        let found = phrase_suggestions("Ich sehe drei Katze.");
        assert!(!found.is_empty());
        assert!(found.iter().all(|s| s.starts_with("drei ")));
        assert!(found.contains(&"drei Katzen".to_string()));
    }

    #[test]
    fn test_every_suggestion_differs_from_original() {
        let found = phrase_suggestions("Die Tischen sind eckig.");
        assert!(!found.is_empty());
        assert!(!found.contains(&"Die Tischen".to_string()));
        let unique: HashSet<&String> = found.iter().collect();
        assert_eq!(unique.len(), found.len());
    }

    #[test]
    fn test_repeated_forms_are_dropped_anywhere() {
        // Masculine and neuter datives both recontract to "zum"
        let mut out = Vec::new();
        for candidate in ["zum Mann", "zur Mann", "zu dem Mann", "zum Mann"] {
            push_unique(&mut out, candidate.to_string(), "zur Mann");
        }
        assert_eq!(out, vec!["zum Mann", "zu dem Mann"]);
    }

    #[test]
    fn test_verb_suggestions() {
        let sentence = sentence("Die Katze sind schön.");
        let mut sw = SentenceWorld::new(&sentence);
        sw.run(data()).unwrap();
        let synth = SuggestionSynthesizer::new(lexicon(), data());
        let found: Vec<Vec<String>> = sw
            .inner()
            .query::<(&VerbGroup, &Subject)>()
            .iter()
            .map(|(_, (g, s))| synth.verb(&sentence.tokens, g, s.agreement))
            .collect();
        assert_eq!(found, vec![vec!["ist".to_string()]]);
    }
}
