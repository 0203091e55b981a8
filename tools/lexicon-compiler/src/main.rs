use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use kongruenz_morph::Lexicon;
use kongruenz_parser::Analyzer;
use kongruenz_protocol::{Dictionary, Match};
use kongruenz_solver::{Checker, CheckerConfig};
use rkyv::ser::{serializers::AllocSerializer, Serializer};

#[derive(Parser)]
#[command(author, version, about = "Builds lexicon archives and checks sentences against them")]
struct Cli {
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a JSON lexicon and write it as an rkyv archive
    Compile {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Report agreement errors in one sentence
    Check {
        /// JSON lexicon or compiled archive
        #[arg(short, long, value_name = "FILE")]
        lexicon: PathBuf,

        /// Checker options as JSON
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Print matches as JSON
        #[arg(long)]
        json: bool,

        sentence: String,
    },
}

fn load_lexicon(path: &Path) -> anyhow::Result<Lexicon> {
    let lexicon = if path.extension().is_some_and(|e| e == "json") {
        let json = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        Lexicon::from_json(&json)?
    } else {
        let bytes = fs::read(path).with_context(|| format!("reading {:?}", path))?;
        Lexicon::from_archive(&bytes)?
    };
    for warning in lexicon.warnings() {
        log::warn!("{}", warning);
    }
    Ok(lexicon)
}

fn compile(input: &Path, output: &Path) -> anyhow::Result<()> {
    log::info!("reading {:?}", input);
    let json = fs::read_to_string(input).with_context(|| format!("reading {:?}", input))?;
    let dictionary: Dictionary = serde_json::from_str(&json)?;

    // Structural errors fail here, before anything is written
    let lexicon = Lexicon::new(dictionary.clone())?;
    for warning in lexicon.warnings() {
        log::warn!("{}", warning);
    }
    log::info!(
        "dictionary v{}: {} lemmas, {} surface forms",
        dictionary.version,
        lexicon.lemma_count(),
        lexicon.form_count()
    );

    let mut serializer = AllocSerializer::<256>::default();
    serializer
        .serialize_value(&dictionary)
        .map_err(|e| anyhow::anyhow!("archiving dictionary: {:?}", e))?;
    let bytes = serializer.into_serializer().into_inner();

    fs::write(output, &bytes).with_context(|| format!("writing {:?}", output))?;
    log::info!("wrote {} bytes to {:?}", bytes.len(), output);
    Ok(())
}

fn describe(text: &str, m: &Match) -> String {
    let covered: String = text.chars().skip(m.from).take(m.to - m.from).collect();
    let mut line = format!("{}..{} {:?}: {:?}", m.from, m.to, covered, m.category);
    if !m.replacements.is_empty() {
        line.push_str(&format!(" -> {}", m.replacements.join(" | ")));
    }
    line
}

fn check(lexicon: &Path, config: Option<&Path>, json: bool, text: &str) -> anyhow::Result<()> {
    let lexicon = load_lexicon(lexicon)?;
    let config = match config {
        Some(path) => {
            let raw = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
            CheckerConfig::from_json(&raw)?
        }
        None => CheckerConfig::default(),
    };

    let sentence = Analyzer::new(&lexicon).analyze(text);
    let checker = Checker::new(&lexicon)?.with_config(config);
    let matches = checker.check(&sentence)?;
    log::debug!("{} tokens, {} matches", sentence.tokens.len(), matches.len());

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
    } else {
        for m in &matches {
            println!("{}", describe(text, m));
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(if cli.debug { log::LevelFilter::Debug } else { log::LevelFilter::Info })
        .init();

    match cli.command {
        Command::Compile { input, output } => compile(&input, &output),
        Command::Check { lexicon, config, json, sentence } => {
            check(&lexicon, config.as_deref(), json, &sentence)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kongruenz_protocol::{AxisSet, MessageCategory, ViolatedAxes};

    #[test]
    fn test_describe() {
        let m = Match {
            from: 0,
            to: 11,
            violated: ViolatedAxes::Determined(AxisSet::GENDER),
            category: MessageCategory::PhraseAgreement,
            replacements: vec!["Das Fahrrad".to_string()],
        };
        assert_eq!(
            describe("Der Fahrrad.", &m),
            "0..11 \"Der Fahrrad\": PhraseAgreement -> Das Fahrrad"
        );
    }

    #[test]
    fn test_archive_loads_back() {
        let json = include_str!("../../../data/de/lexicon.json");
        let dictionary: Dictionary = serde_json::from_str(json).unwrap();
        let mut serializer = AllocSerializer::<256>::default();
        serializer.serialize_value(&dictionary).unwrap();
        let bytes = serializer.into_serializer().into_inner();

        let archived = Lexicon::from_archive(&bytes).unwrap();
        let direct = Lexicon::from_json(json).unwrap();
        assert_eq!(archived.lemma_count(), direct.lemma_count());
        assert_eq!(archived.form_count(), direct.form_count());
    }
}
