//! Per-sentence agreement state as an ECS world: one entity per chunk,
//! with phrase, subject and mismatch components attached by the systems.

pub mod components;
pub mod suggest;
pub mod systems;
pub mod unify;

#[cfg(test)]
mod fixture;

use hecs::{Entity, World};
use kongruenz_lang::LanguageData;
use kongruenz_protocol::{ContractError, MismatchReport, Sentence, Token};

use components::{ChunkData, DependencyRole, Syntax};

pub use suggest::SuggestionSynthesizer;
pub use unify::AgreementSet;

pub struct SentenceWorld<'s> {
    world: World,
    sentence: &'s Sentence,
    /// Chunk entities in sentence order.
    order: Vec<Entity>,
}

impl<'s> SentenceWorld<'s> {
    pub fn new(sentence: &'s Sentence) -> Self {
        let mut world = World::new();
        let order = sentence
            .chunks
            .iter()
            .map(|chunk| world.spawn((ChunkData { span: chunk.span, role: chunk.role },)))
            .collect();
        Self { world, sentence, order }
    }

    /// Expose the inner hecs World for external solvers
    pub fn inner(&self) -> &World {
        &self.world
    }

    pub fn inner_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn sentence(&self) -> &'s Sentence {
        self.sentence
    }

    pub fn tokens(&self) -> &'s [Token] {
        &self.sentence.tokens
    }

    /// Chunk entities with their data, in sentence order.
    pub fn chunks(&self) -> Vec<(Entity, ChunkData)> {
        self.order
            .iter()
            .filter_map(|&e| self.world.get::<&ChunkData>(e).ok().map(|c| (e, *c)))
            .collect()
    }

    /// The chunk whose span ends right before token `end`.
    pub fn chunk_ending_at(&self, end: usize) -> Option<(Entity, ChunkData)> {
        self.chunks().into_iter().find(|(_, c)| c.span.end == end)
    }

    pub fn chunk_starting_at(&self, start: usize) -> Option<(Entity, ChunkData)> {
        self.chunks().into_iter().find(|(_, c)| c.span.start == start)
    }

    /// Links a subject conjunct to its verb group.
    pub fn set_dependency(&mut self, child: Entity, head: Entity, role: DependencyRole) {
        let _ = self.world.insert_one(child, Syntax { head, role });
    }

    /// Runs phrase agreement, subject binding and subject-verb agreement.
    /// Reports come back ordered by span.
    pub fn run(&mut self, data: &LanguageData) -> Result<Vec<MismatchReport>, ContractError> {
        let mut reports = systems::phrase::check_phrases(self, data)?;
        systems::subject_verb::attach_verb_groups(self);
        systems::subject_verb::bind_subjects(self, data);
        reports.extend(systems::subject_verb::check_subject_verb(self));
        reports.sort_by_key(|r| (r.span.start, r.span.end));
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Agreement, Mismatch, NounPhrase, Subject};
    use crate::fixture::{data, sentence};
    use kongruenz_protocol::{ChunkRole, MessageCategory, Span};

    #[test]
    fn test_chunks_in_order() {
        let sentence = sentence("Die Frau gibt ihrem Bruder den Hut.");
        let sw = SentenceWorld::new(&sentence);
        let spans: Vec<(Span, ChunkRole)> = sw.chunks().iter().map(|(_, c)| (c.span, c.role)).collect();
        assert_eq!(
            spans,
            vec![
                (Span::new(0, 2), ChunkRole::NominalPhrase),
                (Span::new(2, 3), ChunkRole::VerbGroup),
                (Span::new(3, 5), ChunkRole::NominalPhrase),
                (Span::new(5, 7), ChunkRole::NominalPhrase),
            ]
        );
        assert!(sw.chunk_ending_at(2).is_some());
        assert!(sw.chunk_starting_at(1).is_none());
    }

    #[test]
    fn test_run_attaches_components() {
        let sentence = sentence("Die Katze sind schön.");
        let mut sw = SentenceWorld::new(&sentence);
        let reports = sw.run(data()).unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].category, MessageCategory::SubjectVerbAgreement);

        let world = sw.inner();
        let (phrase, agreement) = world
            .query::<(&NounPhrase, &Agreement)>()
            .iter()
            .map(|(_, (p, a))| (p.clone(), *a))
            .next()
            .unwrap();
        assert_eq!(phrase.span, Span::new(0, 2));
        assert!(!agreement.0.is_empty());
        assert_eq!(world.query::<&Mismatch>().iter().count(), 0);

        let subjects = world.query::<&Syntax>().iter().count();
        assert_eq!(subjects, 1);
        assert_eq!(world.query::<&Subject>().iter().count(), 1);
    }

    #[test]
    fn test_reports_sorted() {
        let sentence = sentence("Der Fahrrad sind neu und ich sehe drei Katze.");
        let mut sw = SentenceWorld::new(&sentence);
        let reports = sw.run(data()).unwrap();
        let starts: Vec<usize> = reports.iter().map(|r| r.span.start).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
        assert_eq!(reports.len(), 2);
    }
}
