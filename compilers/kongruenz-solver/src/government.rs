use hecs::Entity;
use kongruenz_ecs::components::{Agreement, ChunkData, Mismatch, NounPhrase, VerbGroup};
use kongruenz_ecs::systems::phrase::governing_preposition;
use kongruenz_ecs::SentenceWorld;
use kongruenz_lang::LanguageData;
use kongruenz_protocol::{
    AxisSet, Case, Category, ChunkRole, Feature, MessageCategory, MismatchReport, Particle, Span,
    Token, ViolatedAxes,
};

use crate::graph::{Frame, ValencyGraph};

/// A nominal chunk that may fill a valency slot.
#[derive(Debug, Clone)]
struct Argument {
    cases: Vec<Case>,
}

/// Lemma with the separated particle fused back on ("gibt ... zurück").
fn verb_lemma(tokens: &[Token], group: &VerbGroup, graph: &ValencyGraph) -> Option<String> {
    let particle = tokens[group.finite + 1..]
        .iter()
        .find(|t| t.has_reading(|r| r.category == Category::Other(Particle::VerbParticle)))
        .map(|t| t.text.to_lowercase());

    group.readings.iter().find_map(|r| {
        let lemma = r.lemma.to_lowercase();
        if let Some(particle) = &particle {
            let fused = format!("{}{}", particle, lemma);
            if graph.contains(&fused) {
                return Some(fused);
            }
        }
        graph.contains(&lemma).then_some(lemma)
    })
}

/// Cases an argument chunk can be in; `None` if its phrase disagrees.
fn argument_cases(sw: &SentenceWorld<'_>, entity: Entity, span: Span) -> Option<Vec<Case>> {
    let world = sw.inner();
    if world.get::<&Mismatch>(entity).is_ok() {
        return None;
    }
    if let Ok(agreement) = world.get::<&Agreement>(entity) {
        return (!agreement.0.is_empty()).then(|| agreement.0.values::<Case>());
    }

    // Pronoun chunk
    let token = &sw.tokens()[span.end - 1];
    let mut cases = Vec::new();
    let readings = token
        .readings
        .iter()
        .filter(|r| r.category.is_pronoun() || r.category.is_determiner());
    for r in readings {
        let expanded = match r.features.case.index() {
            Some(_) => vec![r.features.case],
            None => Case::VALUES.to_vec(),
        };
        for case in expanded {
            if !cases.contains(&case) {
                cases.push(case);
            }
        }
    }
    cases.sort();
    Some(cases)
}

/// Nominal chunks outside prepositional phrases, genitive attributes and
/// temporal adverbials.
fn arguments(sw: &SentenceWorld<'_>, data: &LanguageData) -> Option<Vec<Argument>> {
    let tokens = sw.tokens();
    let chunks: Vec<(Entity, ChunkData)> = sw
        .chunks()
        .into_iter()
        .filter(|(_, c)| c.role == ChunkRole::NominalPhrase)
        .collect();

    let mut result = Vec::new();
    let mut previous_end = None;
    for (entity, chunk) in chunks {
        let span = chunk.span;
        let adjacent = previous_end == Some(span.start);
        previous_end = Some(span.end);

        if span.start > 0 {
            let before = &tokens[span.start - 1];
            if before.is_punctuation(',') || before.has_reading(|r| r.category.is_preposition()) {
                continue;
            }
        }
        let phrase = sw.inner().get::<&NounPhrase>(entity).ok().map(|p| (*p).clone());
        if let Some(phrase) = &phrase {
            if governing_preposition(tokens, phrase).is_some() {
                continue;
            }
            if data.temporal_nouns.contains(&tokens[phrase.head_index()].text) {
                continue;
            }
        }

        let cases = argument_cases(sw, entity, span)?;
        // "die Katze des Nachbarn"
        if adjacent && cases.contains(&Case::Genitive) {
            continue;
        }
        result.push(Argument { cases });
    }
    Some(result)
}

/// Assignment of arguments to distinct slots that fills the most slots,
/// preferring required ones. Returns the slot index per argument.
fn assign(arguments: &[Argument], frame: &Frame) -> Vec<Option<usize>> {
    let slots: Vec<(Case, bool)> = frame.slots().collect();

    fn score(assignment: &[Option<usize>], slots: &[(Case, bool)]) -> (usize, usize) {
        let filled = assignment.iter().flatten().count();
        let required = assignment.iter().flatten().filter(|&&s| slots[s].1).count();
        (filled, required)
    }

    fn search(
        i: usize,
        arguments: &[Argument],
        slots: &[(Case, bool)],
        used: &mut Vec<bool>,
        current: &mut Vec<Option<usize>>,
        best: &mut Vec<Option<usize>>,
    ) {
        if i == arguments.len() {
            if score(current, slots) > score(best, slots) {
                best.clone_from(current);
            }
            return;
        }
        for (s, (case, _)) in slots.iter().enumerate() {
            if !used[s] && arguments[i].cases.contains(case) {
                used[s] = true;
                current[i] = Some(s);
                search(i + 1, arguments, slots, used, current, best);
                current[i] = None;
                used[s] = false;
            }
        }
        search(i + 1, arguments, slots, used, current, best);
    }

    let mut used = vec![false; slots.len()];
    let mut current = vec![None; arguments.len()];
    let mut best = vec![None; arguments.len()];
    search(0, arguments, &slots, &mut used, &mut current, &mut best);
    best
}

/// Matches the case sets of a clause's arguments against the finite
/// verb's valency frame.
pub fn check_case_government(
    sw: &SentenceWorld<'_>,
    data: &LanguageData,
    graph: &ValencyGraph,
) -> Vec<MismatchReport> {
    let tokens = sw.tokens();
    if tokens.iter().any(|t| t.is_unknown()) {
        return Vec::new();
    }

    let groups: Vec<VerbGroup> = sw
        .inner()
        .query::<&VerbGroup>()
        .iter()
        .map(|(_, g)| g.clone())
        .collect();
    // One finite verb: the whole sentence is its clause
    let [group] = groups.as_slice() else {
        return Vec::new();
    };
    let Some(lemma) = verb_lemma(tokens, group, graph) else {
        return Vec::new();
    };
    let Some(frame) = graph.frame(&lemma) else {
        return Vec::new();
    };
    let Some(arguments) = arguments(sw, data) else {
        return Vec::new();
    };

    let assignment = assign(&arguments, &frame);
    let slots: Vec<(Case, bool)> = frame.slots().collect();

    let missing: Vec<Case> = slots
        .iter()
        .enumerate()
        .filter(|(s, (_, required))| *required && !assignment.contains(&Some(*s)))
        .map(|(_, (case, _))| *case)
        .collect();
    let mut unexpected = Vec::new();
    for (argument, slot) in arguments.iter().zip(&assignment) {
        if slot.is_some() {
            continue;
        }
        let case = argument
            .cases
            .iter()
            .find(|c| frame.required.contains(c) || frame.optional.contains(c))
            .or(argument.cases.first());
        if let Some(case) = case {
            unexpected.push(*case);
        }
    }

    if missing.is_empty() && unexpected.is_empty() {
        return Vec::new();
    }
    vec![MismatchReport {
        violated: ViolatedAxes::Determined(AxisSet::CASE),
        span: Span::new(group.finite, group.finite + 1),
        category: MessageCategory::CaseGovernment { verb: lemma, missing, unexpected },
    }]
}

/// Internally agreeing phrases whose every case is outside what the
/// preceding preposition licenses. Returns the phrase with its report.
pub fn check_preposition_government(
    sw: &SentenceWorld<'_>,
    data: &LanguageData,
) -> Vec<(NounPhrase, MismatchReport)> {
    let tokens = sw.tokens();
    let world = sw.inner();
    let mut reports = Vec::new();

    for (entity, (phrase, agreement)) in world.query::<(&NounPhrase, &Agreement)>().iter() {
        if agreement.0.is_empty() || world.get::<&Mismatch>(entity).is_ok() {
            continue;
        }
        let Some(preposition) = governing_preposition(tokens, phrase) else {
            continue;
        };
        let Some(licensed) = data.preposition_cases(&preposition.text) else {
            continue;
        };
        if agreement.0.only(licensed).is_empty() {
            reports.push((
                phrase.clone(),
                MismatchReport {
                    violated: ViolatedAxes::Determined(AxisSet::CASE),
                    span: phrase.span,
                    category: MessageCategory::PrepositionCase {
                        preposition: preposition.text.clone(),
                    },
                },
            ));
        }
    }

    reports.sort_by_key(|(_, r)| r.span.start);
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{data, sentence};

    fn government(text: &str) -> Vec<MismatchReport> {
        let sentence = sentence(text);
        let mut sw = SentenceWorld::new(&sentence);
        sw.run(data()).unwrap();
        let graph = ValencyGraph::from_entries(data().valency());
        check_case_government(&sw, data(), &graph)
    }

    fn preposition(text: &str) -> Vec<MismatchReport> {
        let sentence = sentence(text);
        let mut sw = SentenceWorld::new(&sentence);
        sw.run(data()).unwrap();
        check_preposition_government(&sw, data()).into_iter().map(|(_, r)| r).collect()
    }

    #[test]
    fn test_unexpected_accusative() {
        let found = government("Die Frau gibt ihren Bruder den Hut.");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].span, Span::new(2, 3));
        assert_eq!(
            found[0].category,
            MessageCategory::CaseGovernment {
                verb: "geben".to_string(),
                missing: vec![],
                unexpected: vec![Case::Accusative],
            }
        );
        assert!(government("Die Frau gibt ihrem Bruder den Hut.").is_empty());
    }

    #[test]
    fn test_missing_dative() {
        let found = government("Ich helfe.");
        assert_eq!(found.len(), 1);
        assert!(matches!(
            &found[0].category,
            MessageCategory::CaseGovernment { missing, .. } if missing == &vec![Case::Dative]
        ));
        assert!(government("Ich helfe der Frau.").is_empty());
    }

    #[test]
    fn test_separable_verb_and_adjuncts() {
        assert!(government("Die Frau gibt den Hut zurück.").is_empty());
        // Prepositional objects and temporal nouns are no arguments
        assert!(government("Ich gehe mit der Frau.").is_empty());
    }

    #[test]
    fn test_unknown_verbs_are_skipped() {
        assert!(government("Die Katze ist schön.").is_empty());
    }

    #[test]
    fn test_preposition_case() {
        let found = preposition("Das ist für dein Schmuck.");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].span, Span::new(3, 5));
        assert_eq!(
            found[0].category,
            MessageCategory::PrepositionCase { preposition: "für".to_string() }
        );
        assert!(preposition("Das ist für deinen Schmuck.").is_empty());
        // Two-way prepositions take either case
        assert!(preposition("Ich gehe auf den Tisch.").is_empty());
        assert!(preposition("Das ist auf dem Tisch.").is_empty());
    }
}
