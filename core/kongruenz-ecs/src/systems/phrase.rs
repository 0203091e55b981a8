//! Determiner, adjective and noun agreement inside nominal phrases.

use kongruenz_lang::LanguageData;
use kongruenz_parser::parse_tag;
use kongruenz_protocol::{
    AxisSet, Category, ChunkRole, ContractError, Declension, FeatureTuple, Gender, MessageCategory,
    MismatchReport, NounKind, Number, Particle, Reading, Span, Token,
};

use crate::components::{Agreement, Determiner, DeterminerSource, Head, Mismatch, NounPhrase};
use crate::unify::{unify, violated_axes, AgreementSet};
use crate::SentenceWorld;

/// Attaches a [`NounPhrase`] and its [`Agreement`] to every nominal chunk
/// in determiner-adjective-noun shape and returns one report per
/// disagreeing phrase.
pub fn check_phrases(
    sw: &mut SentenceWorld<'_>,
    data: &LanguageData,
) -> Result<Vec<MismatchReport>, ContractError> {
    let tokens = sw.tokens();
    let mut reports = Vec::new();

    for (entity, chunk) in sw.chunks() {
        if chunk.role != ChunkRole::NominalPhrase {
            continue;
        }
        let Some(phrase) = analyze(tokens, chunk.span, data)? else {
            continue;
        };

        let agreement = unify(&phrase.constraints);
        let report = phrase_report(tokens, &phrase, data);

        let world = sw.inner_mut();
        let _ = world.insert(entity, (phrase, Agreement(agreement)));
        if let Some(report) = report {
            let _ = world.insert_one(entity, Mismatch(report.clone()));
            reports.push(report);
        }
    }

    Ok(reports)
}

/// Checks one span directly; the span must have phrase shape.
pub fn check_phrase(
    tokens: &[Token],
    span: Span,
    data: &LanguageData,
) -> Result<Option<MismatchReport>, ContractError> {
    let phrase = analyze(tokens, span, data)?
        .ok_or(ContractError::PhraseShape { start: span.start, end: span.end })?;
    Ok(phrase_report(tokens, &phrase, data))
}

/// The mismatch an analyzed phrase reports, unless it is exempt.
fn phrase_report(tokens: &[Token], phrase: &NounPhrase, data: &LanguageData) -> Option<MismatchReport> {
    if exempt(tokens, phrase, data) {
        return None;
    }
    violated_axes(&phrase.constraints, AxisSet::NOMINAL).map(|violated| MismatchReport {
        violated,
        span: phrase.span,
        category: if phrase.determiner.is_some() {
            MessageCategory::PhraseAgreement
        } else {
            MessageCategory::AdjectiveNounAgreement
        },
    })
}

fn is_numeric(token: &Token) -> bool {
    token.text.chars().all(|c| c.is_ascii_digit())
        || token.has_reading(|r| r.category == Category::Other(Particle::Numeral))
}

/// Category sequence check: nominal material, modifiers, ordinal dots.
fn has_phrase_shape(tokens: &[Token], span: Span) -> bool {
    span.indices().all(|i| {
        let token = &tokens[i];
        let ordinal_dot = i > span.start && token.is_punctuation('.') && is_numeric(&tokens[i - 1]);
        ordinal_dot
            || token.has_reading(|r| {
                matches!(
                    r.category,
                    Category::Determiner(_)
                        | Category::Adjective(_)
                        | Category::Noun(_)
                        | Category::Pronoun(_)
                        | Category::Other(
                            Particle::Adverb
                                | Particle::Numeral
                                | Particle::Abbreviation
                                | Particle::Unknown
                        )
                )
            })
    })
}

fn is_head_noun(token: &Token) -> bool {
    token.starts_uppercase() && token.has_reading(|r| r.category.is_noun())
}

fn determiner_at(tokens: &[Token], span: Span, data: &LanguageData) -> Option<Determiner> {
    let first = &tokens[span.start];
    let readings: Vec<Reading> = first
        .readings
        .iter()
        .filter(|r| r.category.is_determiner())
        .cloned()
        .collect();
    if !readings.is_empty() {
        return Some(Determiner { index: span.start, readings, source: DeterminerSource::Token });
    }

    // "zur Katze": the contraction in front of the chunk is the article
    let previous = span.start.checked_sub(1)?;
    let contraction = data.contraction(&tokens[previous].text)?;
    let readings = contraction
        .tags
        .iter()
        .filter_map(|tag| parse_tag(tag).ok())
        .map(|parsed| Reading::new(data.definite_article.as_str(), parsed.category, parsed.features))
        .collect();
    Some(Determiner {
        index: previous,
        readings,
        source: DeterminerSource::Contraction { preposition: contraction.preposition.clone() },
    })
}

/// Adjective declension classes the determiner selects.
pub fn declensions(determiner: Option<&Determiner>, data: &LanguageData) -> Vec<Declension> {
    let table = &data.declension;
    let Some(det) = determiner else {
        return table.after(None).to_vec();
    };
    let mut result = Vec::new();
    for reading in &det.readings {
        if let Category::Determiner(kind) = reading.category {
            for declension in table.after(Some((kind, &reading.lemma))) {
                if !result.contains(declension) {
                    result.push(*declension);
                }
            }
        }
    }
    result
}

fn adjective_set(token: &Token, allowed: &[Declension]) -> AgreementSet {
    let features: Vec<FeatureTuple> = token
        .readings
        .iter()
        .filter_map(|r| match r.category {
            Category::Adjective(info) => info
                .declension
                .filter(|d| allowed.contains(d))
                .map(|_| r.features),
            Category::Noun(NounKind::Adjectival) => Some(r.features),
            _ => None,
        })
        .collect();
    AgreementSet::from_tuples(&features)
}

fn noun_set(token: &Token, variable_gender: bool) -> AgreementSet {
    let features: Vec<FeatureTuple> = token
        .readings
        .iter()
        .filter(|r| r.category.is_noun())
        .map(|r| {
            let mut f = r.features;
            if variable_gender {
                f.gender = Gender::CommonAmbiguous;
            }
            f
        })
        .collect();
    AgreementSet::from_tuples(&features)
}

/// Cardinal numeral other than one; ordinals ("3.") do not count.
fn plural_numeral(tokens: &[Token], i: usize) -> bool {
    let token = &tokens[i];
    is_numeric(token)
        && !tokens.get(i + 1).is_some_and(|t| t.is_punctuation('.'))
        && !matches!(token.text.to_lowercase().as_str(), "1" | "ein" | "eins" | "eine")
}

/// Breaks a chunk into determiner, modifiers, adjectives and head.
/// `Ok(None)` for nominal chunks without such a head (pronouns).
pub fn analyze(
    tokens: &[Token],
    span: Span,
    data: &LanguageData,
) -> Result<Option<NounPhrase>, ContractError> {
    if span.is_empty() || span.end > tokens.len() || !has_phrase_shape(tokens, span) {
        return Err(ContractError::PhraseShape { start: span.start, end: span.end });
    }

    let determiner = determiner_at(tokens, span, data);
    let mut i = span.start;
    if determiner.as_ref().is_some_and(|d| d.index == span.start) {
        i += 1;
    }

    let mut modifiers = Vec::new();
    let mut adjectives = Vec::new();
    let mut head = None;
    while i < span.end {
        let token = &tokens[i];
        if is_head_noun(token) {
            head = Some(Head::Noun(i));
            break;
        }
        if token.has_reading(|r| r.category.is_attributive_adjective()) {
            adjectives.push(i);
        } else {
            modifiers.push(i);
        }
        i += 1;
    }

    let head = match head {
        Some(head) => head,
        // "das Gute": capitalized adjective closing the chunk
        None => match adjectives.last() {
            Some(&last)
                if determiner.is_some()
                    && last + 1 == span.end
                    && tokens[last].starts_uppercase() =>
            {
                adjectives.pop();
                Head::Adjective(last)
            }
            _ => return Ok(None),
        },
    };

    let allowed = declensions(determiner.as_ref(), data);
    let mut constraints = Vec::new();
    let mut pinned = None;

    if let Some(det) = &determiner {
        let features: Vec<FeatureTuple> = det.readings.iter().map(|r| r.features).collect();
        constraints.push(AgreementSet::from_tuples(&features));

        let lemma = det.readings.first().map(|r| r.lemma.as_str()).unwrap_or_default();
        if data.declension.pinned_plural.contains(lemma) {
            pinned = Some(Number::Plural);
        } else if data.declension.pinned_singular.contains(lemma) {
            pinned = Some(Number::Singular);
        }
    }

    for &m in &modifiers {
        if plural_numeral(tokens, m) {
            pinned = Some(Number::Plural);
            constraints.push(AgreementSet::full().only(&[Number::Plural]));
        }
    }

    for &a in &adjectives {
        if !tokens[a].is_unknown() {
            constraints.push(adjective_set(&tokens[a], &allowed));
        }
    }

    let head_token = &tokens[head.index()];
    constraints.push(match head {
        Head::Noun(_) => noun_set(
            head_token,
            data.phrase.variable_gender_nouns.contains(&head_token.text),
        ),
        Head::Adjective(_) => adjective_set(head_token, &allowed),
    });

    let start = determiner.as_ref().map_or(span.start, |d| d.index.min(span.start));
    Ok(Some(NounPhrase {
        span: Span::new(start, span.end),
        determiner,
        modifiers,
        adjectives,
        head,
        pinned,
        constraints,
    }))
}

/// The preposition (or fused preposition-article) the phrase follows.
pub fn governing_preposition<'t>(tokens: &'t [Token], phrase: &NounPhrase) -> Option<&'t Token> {
    if let Some(det) = &phrase.determiner {
        if let DeterminerSource::Contraction { .. } = det.source {
            return tokens.get(det.index);
        }
    }
    let previous = tokens.get(phrase.span.start.checked_sub(1)?)?;
    previous.has_reading(|r| r.category.is_preposition()).then_some(previous)
}

/// Phrases the static exception tables exclude from reporting.
pub fn exempt(tokens: &[Token], phrase: &NounPhrase, data: &LanguageData) -> bool {
    let exceptions = &data.phrase;
    let head_index = phrase.head_index();
    let head = &tokens[head_index];

    let words: Vec<&str> = tokens[phrase.span.indices()].iter().map(|t| t.text.as_str()).collect();
    let with_previous: Vec<&str> = phrase
        .span
        .start
        .checked_sub(1)
        .map(|p| tokens[p..phrase.span.end].iter().map(|t| t.text.as_str()).collect())
        .unwrap_or_default();
    if exceptions.is_frozen(&words) || exceptions.is_frozen(&with_previous) {
        return true;
    }

    // Apposition or name after the head ("Herr Müller")
    if head_index + 1 < phrase.span.end {
        return true;
    }
    let next_is_name = tokens.get(head_index + 1).is_some_and(|t| {
        t.starts_uppercase() && t.has_reading(|r| r.category == Category::Noun(NounKind::Proper))
    });
    if exceptions.titles.contains(&head.text) && next_is_name {
        return true;
    }

    if let Head::Noun(_) = phrase.head {
        let proper_only = head.all_readings(|r| {
            !r.category.is_noun() || r.category == Category::Noun(NounKind::Proper)
        });
        if proper_only {
            return true;
        }
    }

    if exceptions.ignored_nouns.contains(&head.text) || exceptions.loanwords.contains(&head.text) {
        return true;
    }

    if let Some(det) = &phrase.determiner {
        if det.source == DeterminerSource::Token {
            let det_text = &tokens[det.index].text;
            if exceptions.pronoun_determiners.contains(det_text) {
                return true;
            }
            let after_comma = det.index > 0 && tokens[det.index - 1].is_punctuation(',');
            if after_comma && exceptions.relative_pronouns.contains(det_text) {
                return true;
            }
        }
    }

    false
}
