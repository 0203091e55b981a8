use serde::{Deserialize, Serialize};
use thiserror::Error;

use kongruenz_ecs::components::{NounPhrase, Subject, VerbGroup};
use kongruenz_ecs::systems::phrase::governing_preposition;
use kongruenz_ecs::{SentenceWorld, SuggestionSynthesizer};
use kongruenz_lang::{german, LangError, LanguageData};
use kongruenz_protocol::{
    ContractError, Match, MessageCategory, MismatchReport, Sentence, Span, Synthesizer, Token,
};

use crate::government::{check_case_government, check_preposition_government};
use crate::graph::ValencyGraph;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("contract violation: {0}")]
    Contract(#[from] ContractError),
    #[error(transparent)]
    Lang(#[from] LangError),
}

/// What a [`Checker`] reports and how many replacements it offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    pub suggestions: bool,
    pub max_suggestions: Option<usize>,
    pub case_government: bool,
    pub preposition_government: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            suggestions: true,
            max_suggestions: None,
            case_government: true,
            preposition_government: true,
        }
    }
}

impl CheckerConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Runs every agreement check over one sentence and turns the reports into
/// [`Match`]es with replacements.
pub struct Checker<'a, S: Synthesizer + ?Sized> {
    synthesizer: &'a S,
    data: &'a LanguageData,
    valency: ValencyGraph,
    config: CheckerConfig,
}

impl<'a, S: Synthesizer + ?Sized> Checker<'a, S> {
    /// Checker over the embedded German tables.
    pub fn new(synthesizer: &'a S) -> Result<Self, CheckError> {
        Ok(Self::with_data(synthesizer, german()?))
    }

    pub fn with_data(synthesizer: &'a S, data: &'a LanguageData) -> Self {
        Self {
            synthesizer,
            data,
            valency: ValencyGraph::from_entries(data.valency()),
            config: CheckerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CheckerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Matches ordered by position. Fails only on malformed input.
    pub fn check(&self, sentence: &Sentence) -> Result<Vec<Match>, CheckError> {
        sentence.validate()?;
        let tokens = &sentence.tokens;

        let mut sw = SentenceWorld::new(sentence);
        let reports = sw.run(self.data)?;
        let synth = SuggestionSynthesizer::new(self.synthesizer, self.data);

        let mut matches = Vec::new();
        for report in reports {
            let replacements = if self.config.suggestions {
                self.replacements(&sw, &synth, &report)
            } else {
                Vec::new()
            };
            matches.push(self.to_match(tokens, report, replacements));
        }

        if self.config.preposition_government {
            for (phrase, report) in check_preposition_government(&sw, self.data) {
                let replacements = if self.config.suggestions {
                    let preposition = governing_preposition(tokens, &phrase);
                    synth.phrase(tokens, &phrase, &report.violated, preposition)
                } else {
                    Vec::new()
                };
                matches.push(self.to_match(tokens, report, replacements));
            }
        }

        if self.config.case_government {
            for report in check_case_government(&sw, self.data, &self.valency) {
                matches.push(self.to_match(tokens, report, Vec::new()));
            }
        }

        matches.sort_by_key(|m| (m.from, m.to));
        Ok(matches)
    }

    fn replacements(
        &self,
        sw: &SentenceWorld<'_>,
        synth: &SuggestionSynthesizer<'_, S>,
        report: &MismatchReport,
    ) -> Vec<String> {
        let tokens = sw.tokens();
        let world = sw.inner();
        match report.category {
            MessageCategory::PhraseAgreement | MessageCategory::AdjectiveNounAgreement => world
                .query::<&NounPhrase>()
                .iter()
                .find(|(_, p)| p.span == report.span)
                .map(|(_, phrase)| {
                    let preposition = governing_preposition(tokens, phrase);
                    synth.phrase(tokens, phrase, &report.violated, preposition)
                })
                .unwrap_or_default(),
            MessageCategory::SubjectVerbAgreement => world
                .query::<(&VerbGroup, &Subject)>()
                .iter()
                .find(|(_, (g, _))| g.finite == report.span.start)
                .map(|(_, (group, subject))| synth.verb(tokens, group, subject.agreement))
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn to_match(
        &self,
        tokens: &[Token],
        report: MismatchReport,
        mut replacements: Vec<String>,
    ) -> Match {
        if let Some(max) = self.config.max_suggestions {
            replacements.truncate(max);
        }
        let Span { start, end } = report.span;
        Match {
            from: tokens[start].start,
            to: tokens[end - 1].end,
            violated: report.violated,
            category: report.category,
            replacements,
        }
    }
}
