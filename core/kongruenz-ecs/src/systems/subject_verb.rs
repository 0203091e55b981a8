//! Subject detection and subject-verb agreement on person and number.

use hecs::Entity;
use kongruenz_lang::{LanguageData, SubjectVerbClasses};
use kongruenz_protocol::{
    AxisSet, Case, Category, ChunkRole, Feature, FeatureTuple, MessageCategory, MismatchReport,
    Number, Person, PronounKind, Reading, Span, Token,
};

use crate::components::{
    Agreement, ChunkData, Coordination, DependencyRole, DeterminerSource, Mismatch, NounPhrase,
    Subject, VerbGroup,
};
use crate::unify::{violated_axes, AgreementSet};
use crate::SentenceWorld;

/// Person and number cells of a finite verb form.
pub fn verb_cells(readings: &[Reading]) -> AgreementSet {
    let tuples: Vec<FeatureTuple> = readings
        .iter()
        .filter(|r| r.category.is_finite_verb())
        .map(|r| FeatureTuple::verbal(r.features.person, r.features.number))
        .collect();
    AgreementSet::from_tuples(&tuples)
}

fn third_person(numbers: &[Number]) -> AgreementSet {
    let tuples: Vec<FeatureTuple> =
        numbers.iter().map(|n| FeatureTuple::verbal(Person::Third, *n)).collect();
    AgreementSet::from_tuples(&tuples)
}

/// Tags the first finite verb of every verb chunk.
pub fn attach_verb_groups(sw: &mut SentenceWorld<'_>) {
    let tokens = sw.tokens();
    for (entity, chunk) in sw.chunks() {
        if chunk.role != ChunkRole::VerbGroup {
            continue;
        }
        let finite = chunk
            .span
            .indices()
            .find(|&i| tokens[i].has_reading(|r| r.category.is_finite_verb()));
        if let Some(finite) = finite {
            let readings = tokens[finite]
                .readings
                .iter()
                .filter(|r| r.category.is_finite_verb())
                .cloned()
                .collect();
            let _ = sw.inner_mut().insert_one(entity, VerbGroup { finite, readings });
        }
    }
}

#[derive(Debug, Default)]
struct Candidate {
    /// Conjunct chunks in sentence order.
    conjuncts: Vec<(Entity, Span)>,
    connectors: Vec<String>,
    /// "ein Drittel der Katzen": either number is fine.
    fraction: bool,
}

/// Nominal chunk directly after a preposition: a prepositional object.
fn governed(tokens: &[Token], span: Span) -> bool {
    span.start > 0 && tokens[span.start - 1].has_reading(|r| r.category.is_preposition())
}

fn nominal_chunk(sw: &SentenceWorld<'_>, found: Option<(Entity, ChunkData)>) -> Option<(Entity, Span)> {
    found
        .filter(|(_, c)| c.role == ChunkRole::NominalPhrase && !governed(sw.tokens(), c.span))
        .map(|(e, c)| (e, c.span))
}

fn head_index(sw: &SentenceWorld<'_>, entity: Entity, span: Span) -> usize {
    sw.inner()
        .get::<&NounPhrase>(entity)
        .map(|p| p.head_index())
        .unwrap_or(span.end - 1)
}

fn admits_genitive(sw: &SentenceWorld<'_>, entity: Entity) -> bool {
    sw.inner()
        .get::<&Agreement>(entity)
        .is_ok_and(|a| !a.0.only(&[Case::Genitive]).is_empty())
}

fn is_connector(classes: &SubjectVerbClasses, token: &Token) -> bool {
    token.is_punctuation(',')
        || classes.plural_connectors.contains(&token.text)
        || classes.alternative_connectors.contains(&token.text)
        || classes.correlative_fillers.contains(&token.text)
}

fn record_connector(classes: &SubjectVerbClasses, token: &Token, candidate: &mut Candidate) {
    if classes.plural_connectors.contains(&token.text)
        || classes.alternative_connectors.contains(&token.text)
    {
        candidate.connectors.push(token.text.to_lowercase());
    }
}

/// Nominal chunks ending right before the verb, joined by connectors.
fn scan_left(sw: &SentenceWorld<'_>, classes: &SubjectVerbClasses, end: usize) -> Candidate {
    let tokens = sw.tokens();
    let mut candidate = Candidate::default();
    let mut pos = end;

    while let Some((mut entity, mut span)) = nominal_chunk(sw, sw.chunk_ending_at(pos)) {
        // "die Katze des Nachbarn", "zwei Tassen Tee", "ein Drittel der Leute"
        if let Some((prev, prev_span)) = nominal_chunk(sw, sw.chunk_ending_at(span.start)) {
            let prev_head = &tokens[head_index(sw, prev, prev_span)].text;
            if classes.measure_nouns.contains(prev_head) || admits_genitive(sw, entity) {
                candidate.fraction |= classes.fraction_nouns.contains(prev_head);
                entity = prev;
                span = prev_span;
            }
        }
        candidate.conjuncts.push((entity, span));

        let mut k = span.start;
        while k > 0 && is_connector(classes, &tokens[k - 1]) {
            record_connector(classes, &tokens[k - 1], &mut candidate);
            k -= 1;
        }
        if k == span.start {
            break;
        }
        pos = k;
    }

    candidate.conjuncts.reverse();
    candidate
}

/// Nominal chunks starting right after the verb ("Heute sind die Katzen").
fn scan_right(sw: &SentenceWorld<'_>, classes: &SubjectVerbClasses, start: usize) -> Candidate {
    let tokens = sw.tokens();
    let mut candidate = Candidate::default();
    let mut pos = start;

    while let Some((entity, span)) = nominal_chunk(sw, sw.chunk_starting_at(pos)) {
        candidate.conjuncts.push((entity, span));

        let mut k = span.end;
        while k < tokens.len() && is_connector(classes, &tokens[k]) {
            record_connector(classes, &tokens[k], &mut candidate);
            k += 1;
        }
        if k == span.end {
            break;
        }
        pos = k;
    }

    candidate
}

/// Verbal cells of one conjunct in the nominative. `None` when the
/// conjunct is a phrase that disagrees internally.
fn conjunct_cells(sw: &SentenceWorld<'_>, entity: Entity, span: Span) -> Option<AgreementSet> {
    let world = sw.inner();
    if world.get::<&Mismatch>(entity).is_ok() {
        return None;
    }
    if let Ok(agreement) = world.get::<&Agreement>(entity) {
        if agreement.0.is_empty() {
            return None;
        }
        let numbers = agreement.0.only(&[Case::Nominative]).values::<Number>();
        return Some(third_person(&numbers));
    }

    // Pronoun chunk
    let token = &sw.tokens()[span.end - 1];
    let tuples: Vec<FeatureTuple> = token
        .readings
        .iter()
        .filter(|r| r.category.is_pronoun() || r.category.is_determiner())
        .filter(|r| r.features.case.compatible(Case::Nominative))
        .map(|r| {
            let person = if r.features.person.is_wildcard() {
                Person::Third
            } else {
                r.features.person
            };
            FeatureTuple::verbal(person, r.features.number)
        })
        .collect();
    Some(AgreementSet::from_tuples(&tuples))
}

fn combine(coordination: Coordination, cells: &[AgreementSet]) -> AgreementSet {
    let all = cells.iter().fold(AgreementSet::EMPTY, |acc, c| acc.union(*c));
    let first_person = |set: AgreementSet| {
        set.values::<Person>().first().copied().unwrap_or(Person::Third)
    };
    match coordination {
        Coordination::Single => all,
        // "du und ich" -> 1st person plural
        Coordination::Plural => {
            AgreementSet::from_features(&FeatureTuple::verbal(first_person(all), Number::Plural))
        }
        Coordination::Alternative => all.relax(AxisSet::NUMBER),
        Coordination::FixedSingular => {
            let person = cells.first().map_or(Person::Third, |c| first_person(*c));
            AgreementSet::from_features(&FeatureTuple::verbal(person, Number::Singular))
        }
    }
}

/// Conjunct next to the verb can be a subject; disagreeing phrases count.
fn admits_nominative(sw: &SentenceWorld<'_>, nearest: Option<&(Entity, Span)>) -> bool {
    nearest.is_some_and(|&(e, s)| conjunct_cells(sw, e, s).map_or(true, |c| !c.is_empty()))
}

fn is_relative_pronoun(data: &LanguageData, token: &Token) -> bool {
    data.phrase.relative_pronouns.contains(&token.text)
        || token.has_reading(|r| r.category == Category::Pronoun(PronounKind::Relative))
}

/// Comma opening the relative clause whose last word is `verb`
/// (", die den Hund sieht,").
fn relative_clause_start(tokens: &[Token], data: &LanguageData, verb: Span) -> Option<usize> {
    let verb_final = tokens
        .get(verb.end)
        .map_or(true, |t| t.has_reading(|r| r.category.is_punctuation()));
    if !verb_final {
        return None;
    }
    let mut i = verb.start;
    while i > 0 {
        i -= 1;
        if tokens[i].is_punctuation(',') {
            return tokens.get(i + 1).filter(|t| is_relative_pronoun(data, t)).map(|_| i);
        }
        if tokens[i].has_reading(|r| r.category.is_finite_verb()) {
            return None;
        }
    }
    None
}

/// Comma opening a relative clause that ends right before `start`
/// ("Die Katze, die den Hund sieht, ist schön").
fn relative_clause_before(sw: &SentenceWorld<'_>, data: &LanguageData, start: usize) -> Option<usize> {
    let close = start.checked_sub(1).filter(|&c| sw.tokens()[c].is_punctuation(','))?;
    let (_, clause) = sw.chunk_ending_at(close).filter(|(_, c)| c.role == ChunkRole::VerbGroup)?;
    relative_clause_start(sw.tokens(), data, clause.span)
}

/// Verbal cells of the relative pronoun after `open` as the subject of its
/// clause, in the number of its antecedent. `None` when a nominative phrase
/// inside the clause can be the subject instead ("die der Hund sieht").
fn relative_subject(sw: &SentenceWorld<'_>, open: usize, verb: Span) -> Option<AgreementSet> {
    let tokens = sw.tokens();
    let pronoun = open + 1;

    let other_subject = sw.chunks().into_iter().any(|(e, c)| {
        c.role == ChunkRole::NominalPhrase
            && c.span.start >= pronoun
            && c.span.end <= verb.start
            && (c.span.start > pronoun || sw.inner().get::<&NounPhrase>(e).is_ok())
            && !governed(tokens, c.span)
            && conjunct_cells(sw, e, c.span).map_or(true, |cells| !cells.is_empty())
    });
    if other_subject {
        return None;
    }

    let nominative: Vec<FeatureTuple> = tokens[pronoun]
        .readings
        .iter()
        .filter(|r| {
            r.category.is_determiner() || r.category == Category::Pronoun(PronounKind::Relative)
        })
        .filter(|r| r.features.case.compatible(Case::Nominative))
        .map(|r| r.features)
        .collect();
    let own = AgreementSet::from_tuples(&nominative).only(&[Case::Nominative]);

    let antecedent = sw
        .chunk_ending_at(open)
        .filter(|(e, c)| {
            c.role == ChunkRole::NominalPhrase && sw.inner().get::<&Mismatch>(*e).is_err()
        })
        .and_then(|(e, _)| sw.inner().get::<&Agreement>(e).ok().map(|a| a.0));
    let numbers = match antecedent {
        Some(set) if !set.is_empty() => own.intersect(set.relax(AxisSet::CASE)).values::<Number>(),
        _ => own.values::<Number>(),
    };
    (!numbers.is_empty()).then(|| third_person(&numbers))
}

/// Finds the subject of every verb group and attaches [`Subject`] to the
/// verb group and [`crate::components::Syntax`] to each conjunct.
pub fn bind_subjects(sw: &mut SentenceWorld<'_>, data: &LanguageData) {
    let tokens = sw.tokens();
    let classes = &data.subject_verb;

    // Unknown words make the clause structure unreliable
    if tokens.iter().any(|t| t.is_unknown()) {
        return;
    }

    let groups: Vec<(Entity, Span, VerbGroup)> = sw
        .chunks()
        .into_iter()
        .filter_map(|(e, c)| {
            let group = (*sw.inner().get::<&VerbGroup>(e).ok()?).clone();
            Some((e, c.span, group))
        })
        .collect();

    for (verb, verb_span, group) in groups {
        let relative = relative_clause_start(tokens, data, verb_span)
            .and_then(|open| relative_subject(sw, open, verb_span));
        if let Some(agreement) = relative {
            let subject = Subject { coordination: Coordination::Single, relaxed: false, agreement };
            let _ = sw.inner_mut().insert_one(verb, subject);
            continue;
        }

        let mut left = scan_left(sw, classes, verb_span.start);
        if left.conjuncts.is_empty() {
            if let Some(open) = relative_clause_before(sw, data, verb_span.start) {
                left = scan_left(sw, classes, open);
            }
        }
        let candidate = if admits_nominative(sw, left.conjuncts.last()) {
            left
        } else {
            let right = scan_right(sw, classes, verb_span.end);
            if !admits_nominative(sw, right.conjuncts.first()) {
                continue;
            }
            right
        };

        let cells: Option<Vec<AgreementSet>> = candidate
            .conjuncts
            .iter()
            .map(|&(e, s)| conjunct_cells(sw, e, s))
            .collect();
        let heads: Vec<usize> =
            candidate.conjuncts.iter().map(|&(e, s)| head_index(sw, e, s)).collect();
        let head_words: Vec<&str> = heads.iter().map(|&i| tokens[i].text.as_str()).collect();

        let coordination = if candidate.conjuncts.len() == 1 {
            Coordination::Single
        } else if classes.is_singular_coordination(&head_words)
            || repeated_speaker(sw, &candidate, &head_words)
        {
            Coordination::FixedSingular
        } else if candidate.connectors.iter().any(|c| classes.plural_connectors.contains(c)) {
            Coordination::Plural
        } else if candidate.connectors.iter().any(|c| classes.alternative_connectors.contains(c)) {
            Coordination::Alternative
        } else {
            Coordination::Plural
        };

        let verb_set = verb_cells(&group.readings);
        let relaxed = cells.is_none()
            || candidate.fraction
            || irregular(sw, classes, &candidate, &head_words)
            || opened_clause(tokens, classes, &candidate)
            || predicative_nominative(sw, data, &group, verb_span, &candidate, verb_set);
        let agreement = cells.map_or(AgreementSet::EMPTY, |c| combine(coordination, &c));

        for (i, &(conjunct, _)) in candidate.conjuncts.iter().enumerate() {
            let role = if i == 0 { DependencyRole::Subject } else { DependencyRole::Conjunct };
            sw.set_dependency(conjunct, verb, role);
        }
        let _ = sw.inner_mut().insert_one(verb, Subject { coordination, relaxed, agreement });
    }
}

/// "ich und ich allein", "du oder du"
fn repeated_speaker(sw: &SentenceWorld<'_>, candidate: &Candidate, head_words: &[&str]) -> bool {
    let pronouns = candidate
        .conjuncts
        .iter()
        .all(|&(e, _)| sw.inner().get::<&NounPhrase>(e).is_err());
    let Some(first) = head_words.first() else {
        return false;
    };
    let same = head_words.iter().all(|w| w.eq_ignore_ascii_case(first));
    let speaker = candidate.conjuncts.first().is_some_and(|&(e, s)| {
        conjunct_cells(sw, e, s).is_some_and(|c| {
            c.values::<Person>().iter().all(|p| *p != Person::Third) && !c.is_empty()
        })
    });
    pronouns && same && speaker
}

/// Subjects whose verb number is free or lexically decided.
fn irregular(
    sw: &SentenceWorld<'_>,
    classes: &SubjectVerbClasses,
    candidate: &Candidate,
    head_words: &[&str],
) -> bool {
    let tokens = sw.tokens();
    let irregular_word = head_words
        .iter()
        .any(|w| classes.irregular_subjects.contains(w) || classes.unit_nouns.contains(w));
    let irregular_det = candidate.conjuncts.iter().any(|&(e, _)| {
        sw.inner().get::<&NounPhrase>(e).is_ok_and(|p| {
            p.determiner.as_ref().is_some_and(|d| {
                d.source == DeterminerSource::Token
                    && classes.irregular_subjects.contains(&tokens[d.index].text)
            })
        })
    });
    let elliptical = candidate.conjuncts.len() == 1
        && head_words.first().is_some_and(|w| classes.elliptical_subjects.contains(w))
        && candidate.conjuncts.first().is_some_and(|&(e, _)| sw.inner().get::<&NounPhrase>(e).is_err());
    irregular_word || irregular_det || elliptical
}

/// "Wie viele Katzen ...", clause openers in front of the subject.
fn opened_clause(tokens: &[Token], classes: &SubjectVerbClasses, candidate: &Candidate) -> bool {
    candidate.conjuncts.first().is_some_and(|&(_, span)| {
        span.start > 0 && classes.clause_openers.contains(&tokens[span.start - 1].text)
    })
}

/// "Das Ziel sind die Kinder": with a copula the predicative nominative
/// may decide the verb number instead.
fn predicative_nominative(
    sw: &SentenceWorld<'_>,
    data: &LanguageData,
    group: &VerbGroup,
    verb_span: Span,
    candidate: &Candidate,
    verb_set: AgreementSet,
) -> bool {
    let copula = group.readings.iter().any(|r| data.subject_verb.copulas.contains(&r.lemma));
    if !copula {
        return false;
    }
    let subject_after = candidate.conjuncts.first().is_some_and(|&(_, s)| s.start >= verb_span.end);
    let other = if subject_after {
        sw.chunk_ending_at(verb_span.start)
    } else {
        sw.chunk_starting_at(verb_span.end)
    };
    let Some((entity, chunk)) = other.filter(|(_, c)| c.role == ChunkRole::NominalPhrase) else {
        return false;
    };
    if candidate.conjuncts.iter().any(|&(e, _)| e == entity) {
        return false;
    }
    conjunct_cells(sw, entity, chunk.span)
        .is_some_and(|cells| !cells.intersect(verb_set).is_empty())
}

/// Reports verb groups whose finite verb disagrees with the bound subject.
pub fn check_subject_verb(sw: &SentenceWorld<'_>) -> Vec<MismatchReport> {
    let mut reports = Vec::new();
    for (_id, (group, subject)) in sw.inner().query::<(&VerbGroup, &Subject)>().iter() {
        if subject.relaxed {
            continue;
        }
        let verb = verb_cells(&group.readings);
        if let Some(violated) = violated_axes(&[subject.agreement, verb], AxisSet::VERBAL) {
            reports.push(MismatchReport {
                violated,
                span: Span::new(group.finite, group.finite + 1),
                category: MessageCategory::SubjectVerbAgreement,
            });
        }
    }
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Syntax;
    use crate::fixture::{data, sentence};
    use kongruenz_protocol::ViolatedAxes;

    fn reports(text: &str) -> Vec<MismatchReport> {
        let sentence = sentence(text);
        let mut sw = SentenceWorld::new(&sentence);
        sw.run(data())
            .unwrap()
            .into_iter()
            .filter(|r| r.category == MessageCategory::SubjectVerbAgreement)
            .collect()
    }

    fn subject(text: &str) -> Option<Subject> {
        let sentence = sentence(text);
        let mut sw = SentenceWorld::new(&sentence);
        sw.run(data()).unwrap();
        let found = sw.inner().query::<&Subject>().iter().map(|(_, s)| *s).next();
        found
    }

    #[test]
    fn test_number_mismatch() {
        let found = reports("Die Katze sind schön.");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].span, Span::new(2, 3));
        assert_eq!(found[0].violated, ViolatedAxes::Determined(AxisSet::NUMBER));
        assert!(reports("Die Katzen sind schön.").is_empty());
        assert!(reports("Die Katze ist schön.").is_empty());
    }

    #[test]
    fn test_pronoun_subjects() {
        assert!(reports("Ich gehe.").is_empty());
        assert!(reports("Wir sind alt.").is_empty());
        let found = reports("Ich ist alt.");
        assert_eq!(found.len(), 1);
        assert!(found[0].violated.contains(AxisSet::PERSON));
        let found = reports("Du gehen.");
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_coordination() {
        assert!(reports("Julia und Karsten sind alt.").is_empty());
        assert_eq!(reports("Julia und Karsten ist alt.").len(), 1);
        assert_eq!(
            subject("Julia und Karsten sind alt.").map(|s| s.coordination),
            Some(Coordination::Plural)
        );

        // Either number after "oder"
        assert!(reports("Julia oder Karsten ist alt.").is_empty());
        assert!(reports("Julia oder Karsten sind alt.").is_empty());

        // "du und ich" -> wir
        assert!(reports("Du und ich sind alt.").is_empty());
        assert_eq!(reports("Du und ich seid alt.").len(), 1);

        // Correlatives
        assert!(reports("Sowohl Julia als auch Karsten sind alt.").is_empty());
    }

    #[test]
    fn test_fixed_singular_coordination() {
        let found = subject("Obst und Gemüse ist gesund.").unwrap();
        assert_eq!(found.coordination, Coordination::FixedSingular);
        assert!(reports("Obst und Gemüse ist gesund.").is_empty());
    }

    #[test]
    fn test_subject_after_verb() {
        assert!(reports("Heute sind die Katzen alt.").is_empty());
        assert_eq!(reports("Heute ist die Katzen alt.").len(), 1);
    }

    #[test]
    fn test_relaxed_subjects() {
        // The phrase itself disagrees; reported there only
        assert!(subject("Die Tischen sind eckig.").unwrap().relaxed);
        assert!(reports("Die Tischen sind eckig.").is_empty());
        // Elliptical "das"
        assert!(reports("Das sind Katzen.").is_empty());
        // Predicative nominative decides the number
        assert!(subject("Das Ziel sind die Kinder.").unwrap().relaxed);
        assert!(reports("Das Ziel sind die Kinder.").is_empty());
        // Currency amounts
        assert!(reports("Zehn Euro ist gut.").is_empty());
    }

    #[test]
    fn test_relative_clause_subject() {
        let found = reports("Die Katze, die den Hund sehen, ist schön.");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].span, Span::new(6, 7));
        assert_eq!(found[0].violated, ViolatedAxes::Determined(AxisSet::NUMBER));
        assert!(reports("Die Katze, die den Hund sieht, ist schön.").is_empty());
        assert!(reports("Die Katzen, die den Hund sehen, sind schön.").is_empty());
    }

    #[test]
    fn test_main_clause_subject_across_relative_clause() {
        let found = reports("Die Katze, die den Hund sieht, sind schön.");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].span, Span::new(8, 9));
        assert_eq!(found[0].violated, ViolatedAxes::Determined(AxisSet::NUMBER));
    }

    #[test]
    fn test_prepositional_object_is_not_subject() {
        assert!(subject("Mit der Katze gehe ich.").is_some());
        assert!(reports("Mit der Katze gehe ich.").is_empty());
    }

    #[test]
    fn test_links_conjuncts() {
        let sentence = sentence("Julia und Karsten sind alt.");
        let mut sw = SentenceWorld::new(&sentence);
        sw.run(data()).unwrap();
        let mut roles: Vec<DependencyRole> =
            sw.inner().query::<&Syntax>().iter().map(|(_, s)| s.role).collect();
        roles.sort_by_key(|r| *r == DependencyRole::Conjunct);
        assert_eq!(roles, vec![DependencyRole::Subject, DependencyRole::Conjunct]);
    }
}
