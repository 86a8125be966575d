//! Whitespace tokenization of command lines.
//!
//! The engine's token model is deliberately minimal: a command line is a
//! sequence of whitespace-separated words, nothing else. Quoting and escaping
//! are out of scope; a caller wanting them pre-processes the line before
//! handing it to a grammar. The actual splitting is handled entirely by
//! logos.

use logos::Logos;

/// The two raw token classes of a command line
#[derive(Logos, Debug, PartialEq, Clone, Copy)]
pub enum Token {
    /// A run of non-whitespace characters
    #[regex(r"[^ \t\r\n]+")]
    Word,

    /// A run of whitespace separating words
    #[regex(r"[ \t\r\n]+")]
    Whitespace,
}

/// Split a command line into its complete words.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut lexer = Token::lexer(line);
    let mut words = Vec::new();

    while let Some(result) = lexer.next() {
        if let Ok(Token::Word) = result {
            words.push(lexer.slice().to_string());
        }
    }

    words
}

/// Split a command line for prompting: complete words plus the trailing
/// partial word.
///
/// The final word counts as partial only when the line does not end in
/// whitespace; an empty line, or one ending in whitespace, yields an empty
/// partial ("complete whatever comes next").
pub fn tokenize_partial(line: &str) -> (Vec<String>, String) {
    let mut words = tokenize(line);

    let ends_complete = line
        .chars()
        .last()
        .map(|c| c.is_whitespace())
        .unwrap_or(true);

    if ends_complete {
        (words, String::new())
    } else {
        // tokenize() never returns an empty list for a line with a
        // non-whitespace tail
        let partial = words.pop().unwrap_or_default();
        (words, partial)
    }
}
