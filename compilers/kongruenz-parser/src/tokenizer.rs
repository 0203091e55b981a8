use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0, one_of},
    combinator::{map, recognize},
    multi::many0,
    sequence::pair,
    IResult,
};

/// Letters of German words, including umlauts and ß.
fn is_word_char(c: char) -> bool {
    c.is_alphabetic()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawToken<'a> {
    Word(&'a str),
    Number(&'a str),
    Punct(char),
}

/// Byte range of a raw token in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSpan {
    pub start: usize,
    pub end: usize,
}

/// Hyphenated compounds ("LAN-Kabel") stay one word.
fn word(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(is_word_char),
        many0(pair(char('-'), take_while1(is_word_char))),
    ))(input)
}

fn raw_token(input: &str) -> IResult<&str, RawToken<'_>> {
    alt((
        map(word, RawToken::Word),
        map(take_while1(|c: char| c.is_ascii_digit()), RawToken::Number),
        map(one_of(".,;:?!\"'()-"), RawToken::Punct),
    ))(input)
}

pub fn tokenize_with_spans(original_input: &str) -> Vec<(ByteSpan, RawToken<'_>)> {
    let mut input = original_input;
    let mut result = Vec::new();

    loop {
        // 1. Skip whitespace
        let (next_input, _) = match multispace0::<&str, nom::error::Error<&str>>(input) {
            Ok(res) => res,
            Err(_) => break,
        };
        input = next_input;

        if input.is_empty() {
            break;
        }

        // 2. Try to match a token
        match raw_token(input) {
            Ok((next_input, token)) => {
                let len = input.len() - next_input.len();
                let start = original_input.len() - input.len();
                result.push((ByteSpan { start, end: start + len }, token));
                input = next_input;
            }
            Err(_) => {
                // Skip one char to recover
                if let Some(c) = input.chars().next() {
                    input = &input[c.len_utf8()..];
                } else {
                    break;
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_german_sentence() {
        let tokens = tokenize_with_spans("Die Größe des LAN-Kabels ist 3 Meter.");
        let raw: Vec<_> = tokens.iter().map(|(_, t)| t.clone()).collect();
        assert_eq!(
            raw,
            vec![
                RawToken::Word("Die"),
                RawToken::Word("Größe"),
                RawToken::Word("des"),
                RawToken::Word("LAN-Kabels"),
                RawToken::Word("ist"),
                RawToken::Number("3"),
                RawToken::Word("Meter"),
                RawToken::Punct('.'),
            ]
        );
        // Byte spans cover multi-byte characters
        assert_eq!(tokens[1].0, ByteSpan { start: 4, end: 11 });
    }

    #[test]
    fn test_unrecognized_chars_skipped() {
        let tokens = tokenize_with_spans("ja → nein");
        assert_eq!(tokens.len(), 2);
    }
}
