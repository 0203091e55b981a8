use wasm_bindgen::prelude::*;
use kongruenz_morph::{CachedSynthesizer, Lexicon};
use kongruenz_parser::Analyzer;
use kongruenz_protocol::{Match, Sentence};
use kongruenz_solver::{Checker, CheckerConfig};
use serde::Serialize;

#[wasm_bindgen]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Per-token view for the browser's debug pane.
#[derive(Debug, Serialize)]
pub struct TokenDebug {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub readings: Vec<String>,
}

/// The structured response sent back to JavaScript.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub matches: Vec<Match>,
    pub tokens: Vec<TokenDebug>,
}

fn token_debug(sentence: &Sentence) -> Vec<TokenDebug> {
    sentence
        .tokens
        .iter()
        .map(|t| TokenDebug {
            text: t.text.clone(),
            start: t.start,
            end: t.end,
            readings: t
                .readings
                .iter()
                .map(|r| format!("{} {:?} {:?}", r.lemma, r.category, r.features))
                .collect(),
        })
        .collect()
}

/// The engine instance running in the browser. Owns the lexicon loaded
/// from a compiled archive (fetched by JS).
#[wasm_bindgen]
pub struct KongruenzEngine {
    lexicon: CachedSynthesizer<Lexicon>,
    config: CheckerConfig,
}

impl KongruenzEngine {
    pub fn from_lexicon(lexicon: Lexicon) -> Self {
        Self { lexicon: CachedSynthesizer::new(lexicon), config: CheckerConfig::default() }
    }

    /// Text -> tokens -> checker -> report. Native entry point for tests.
    pub fn report(&self, input: &str) -> Result<CheckReport, String> {
        let sentence = Analyzer::new(self.lexicon.inner()).analyze(input);
        let checker = Checker::new(&self.lexicon)
            .map_err(|e| e.to_string())?
            .with_config(self.config.clone());
        let matches = checker.check(&sentence).map_err(|e| e.to_string())?;
        Ok(CheckReport { matches, tokens: token_debug(&sentence) })
    }
}

#[wasm_bindgen]
impl KongruenzEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(data: Vec<u8>) -> Result<KongruenzEngine, JsValue> {
        let lexicon = Lexicon::from_archive(&data).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self::from_lexicon(lexicon))
    }

    /// Replaces the checker options with a JSON object.
    pub fn configure(&mut self, json: &str) -> Result<(), JsValue> {
        self.config = CheckerConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(())
    }

    pub fn check(&self, input: &str) -> Result<JsValue, JsValue> {
        let report = self.report(input).map_err(|e| JsValue::from_str(&e))?;
        serde_wasm_bindgen::to_value(&report).map_err(JsValue::from)
    }
}
