//! German fixture lexicon for the end-to-end tests.

use std::sync::OnceLock;

use kongruenz_lang::LanguageData;
use kongruenz_morph::Lexicon;
use kongruenz_parser::Analyzer;
use kongruenz_protocol::Sentence;

const LEXICON: &str = include_str!("../../../data/de/lexicon.json");

pub fn lexicon() -> &'static Lexicon {
    static FIXTURE: OnceLock<Lexicon> = OnceLock::new();
    FIXTURE.get_or_init(|| Lexicon::from_json(LEXICON).expect("fixture lexicon"))
}

pub fn data() -> &'static LanguageData {
    kongruenz_lang::german().expect("embedded language data")
}

pub fn sentence(text: &str) -> Sentence {
    Analyzer::new(lexicon()).analyze(text)
}
