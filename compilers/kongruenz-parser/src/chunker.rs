use kongruenz_protocol::{Category, Chunk, ChunkRole, Chunker, NounKind, Particle, Token};

/// Greedy left-to-right chunker for German:
/// - Determiner, modifiers, attributive adjectives and a capitalized noun form a nominal phrase
/// - Stand-alone pronouns form a nominal phrase of their own
/// - Runs of verbs form a verb group
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyChunker;

impl Chunker for GreedyChunker {
    fn chunk(&self, tokens: &[Token]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            if let Some(end) = nominal_phrase(tokens, i) {
                chunks.push(Chunk::new(i, end, ChunkRole::NominalPhrase));
                i = end;
                continue;
            }

            if is_verb(&tokens[i]) {
                let start = i;
                while i < tokens.len() && is_verb(&tokens[i]) {
                    i += 1;
                }
                chunks.push(Chunk::new(start, i, ChunkRole::VerbGroup));
                continue;
            }

            i += 1;
        }

        chunks
    }
}

fn is_determiner(token: &Token) -> bool {
    token.has_reading(|r| r.category.is_determiner())
}

fn is_attributive(token: &Token) -> bool {
    token.has_reading(|r| r.category.is_attributive_adjective())
}

/// German nouns are capitalized; a lowercase noun reading is a tagging artifact.
fn is_noun(token: &Token) -> bool {
    token.starts_uppercase() && token.has_reading(|r| r.category.is_noun())
}

fn is_proper_noun(token: &Token) -> bool {
    token.starts_uppercase() && token.has_reading(|r| r.category == Category::Noun(NounKind::Proper))
}

fn is_pronoun(token: &Token) -> bool {
    token.has_reading(|r| r.category.is_pronoun())
}

fn is_verb(token: &Token) -> bool {
    token.has_reading(|r| r.category.is_verb()) && !is_noun(token) && !is_determiner(token)
}

fn is_numeric(token: &Token) -> bool {
    token.text.chars().all(|c| c.is_ascii_digit())
        || token.has_reading(|r| r.category == Category::Other(Particle::Numeral))
}

fn opens_head(token: &Token) -> bool {
    is_attributive(token) || is_noun(token)
}

/// Length of a pre-adjective modifier at `i` ("sehr", "drei", "3." as ordinal), or 0.
fn modifier_len(tokens: &[Token], i: usize) -> usize {
    let token = &tokens[i];
    let next = |k: usize| tokens.get(i + k);

    if is_numeric(token) {
        // Ordinal: "3." followed by the rest of the phrase
        if next(1).is_some_and(|t| t.is_punctuation('.')) && next(2).is_some_and(opens_head) {
            return 2;
        }
        if next(1).is_some_and(opens_head) {
            return 1;
        }
        return 0;
    }

    let adverb = token.has_reading(|r| r.category == Category::Other(Particle::Adverb));
    if adverb && !is_noun(token) && next(1).is_some_and(is_attributive) {
        return 1;
    }
    0
}

/// End (exclusive) of a nominal phrase starting at `start`.
fn nominal_phrase(tokens: &[Token], start: usize) -> Option<usize> {
    let mut i = start;
    let has_determiner = is_determiner(&tokens[i]);
    if has_determiner {
        i += 1;
    }

    // 1. Modifiers and adjectives
    let mut last_adjective = None;
    while i < tokens.len() {
        let len = modifier_len(tokens, i);
        if len > 0 {
            i += len;
        } else if is_attributive(&tokens[i]) && !is_noun(&tokens[i]) {
            last_adjective = Some(i);
            i += 1;
        } else {
            break;
        }
    }

    // 2. Head noun, absorbing following names ("Frau Müller")
    if i < tokens.len() && is_noun(&tokens[i]) {
        i += 1;
        while i < tokens.len() && is_proper_noun(&tokens[i]) {
            i += 1;
        }
        return Some(i);
    }

    // 3. Substantivized adjective: "das Gute"
    if let Some(adj) = last_adjective {
        if has_determiner && adj + 1 == i && tokens[adj].starts_uppercase() {
            return Some(i);
        }
    }

    // 4. Stand-alone pronoun, including demonstrative "das"
    if is_pronoun(&tokens[start]) && (i == start || i == start + 1) {
        return Some(start + 1);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::parse_reading;
    use kongruenz_protocol::ReadingSet;

    fn t(text: &str, tags: &[&str]) -> Token {
        let readings = tags.iter().map(|tag| parse_reading(text, tag).0).collect();
        Token {
            text: text.to_string(),
            start: 0,
            end: 0,
            readings: ReadingSet::new(readings).unwrap(),
            sentence_start: false,
            whitespace_before: true,
        }
    }

    fn roles(chunks: &[Chunk]) -> Vec<(usize, usize, ChunkRole)> {
        chunks.iter().map(|c| (c.span.start, c.span.end, c.role)).collect()
    }

    #[test]
    fn test_determiner_adjective_noun() {
        // "Die kleine Katze ist schön ."
        let tokens = vec![
            t("Die", &["ART:DEF:NOM:SIN:FEM", "ART:DEF:NOM:PLU:ALG"]),
            t("kleine", &["ADJ:NOM:SIN:FEM:GRU:DEF"]),
            t("Katze", &["SUB:NOM:SIN:FEM"]),
            t("ist", &["VER:AUX:3:SIN:PRÄ"]),
            t("schön", &["ADJ:PRD:GRU"]),
            t(".", &["PKT"]),
        ];
        let chunks = GreedyChunker.chunk(&tokens);
        assert_eq!(
            roles(&chunks),
            vec![(0, 3, ChunkRole::NominalPhrase), (3, 4, ChunkRole::VerbGroup)]
        );
    }

    #[test]
    fn test_coordinated_names() {
        // "Julia und Karsten sind alt"
        let tokens = vec![
            t("Julia", &["EIG:NOM:SIN:FEM"]),
            t("und", &["KON:NEB"]),
            t("Karsten", &["EIG:NOM:SIN:MAS"]),
            t("sind", &["VER:AUX:3:PLU:PRÄ"]),
            t("alt", &["ADJ:PRD:GRU"]),
        ];
        let chunks = GreedyChunker.chunk(&tokens);
        assert_eq!(
            roles(&chunks),
            vec![
                (0, 1, ChunkRole::NominalPhrase),
                (2, 3, ChunkRole::NominalPhrase),
                (3, 4, ChunkRole::VerbGroup),
            ]
        );
    }

    #[test]
    fn test_modifiers_and_pronouns() {
        // "Er kauft ein sehr schönes Haus"
        let tokens = vec![
            t("Er", &["PRO:PER:3:NOM:SIN:MAS"]),
            t("kauft", &["VER:3:SIN:PRÄ"]),
            t("ein", &["ART:IND:NOM:SIN:NEU"]),
            t("sehr", &["ADV"]),
            t("schönes", &["ADJ:AKK:SIN:NEU:GRU:IND"]),
            t("Haus", &["SUB:AKK:SIN:NEU"]),
        ];
        let chunks = GreedyChunker.chunk(&tokens);
        assert_eq!(
            roles(&chunks),
            vec![
                (0, 1, ChunkRole::NominalPhrase),
                (1, 2, ChunkRole::VerbGroup),
                (2, 6, ChunkRole::NominalPhrase),
            ]
        );
    }

    #[test]
    fn test_relative_determiner_without_noun_is_not_a_phrase() {
        // ", der schläft"
        let tokens = vec![
            t(",", &["PKT"]),
            t("der", &["ART:DEF:NOM:SIN:MAS"]),
            t("schläft", &["VER:3:SIN:PRÄ"]),
        ];
        let chunks = GreedyChunker.chunk(&tokens);
        assert_eq!(roles(&chunks), vec![(2, 3, ChunkRole::VerbGroup)]);
    }
}
