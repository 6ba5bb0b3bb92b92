//! Tokenizer for stackvm assembly text.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::AsmError;

/// A single token from an assembly line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// A bare word: mnemonic, directive or label name, as written.
    Word(String),
    /// A numeric or character literal.
    Number(i32),
    /// A string literal with escapes applied.
    Str(Vec<u8>),
}

impl Token {
    /// Source-like rendering for error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Word(word) => word.clone(),
            Token::Number(n) => n.to_string(),
            Token::Str(bytes) => format!("\"{}\"", String::from_utf8_lossy(bytes)),
        }
    }
}

type Chars<'a> = Peekable<CharIndices<'a>>;

/// Tokenize a single line of assembly text.
///
/// Returns an empty Vec for blank lines and comment-only lines.
/// Comments start with `;` outside quotes and extend to end of line.
pub(crate) fn tokenize_line(line: &str, line_num: usize) -> Result<Vec<Token>, AsmError> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            ';' => break,
            c if c.is_whitespace() => {
                chars.next();
            }
            '\'' => {
                chars.next();
                tokens.push(Token::Number(lex_char(&mut chars, line_num)?));
            }
            '"' => {
                chars.next();
                tokens.push(Token::Str(lex_string(&mut chars, line_num)?));
            }
            _ => {
                let mut end = line.len();
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_whitespace() || matches!(c, ';' | '\'' | '"') {
                        end = i;
                        break;
                    }
                    chars.next();
                }
                tokens.push(classify(&line[start..end], line_num)?);
            }
        }
    }

    Ok(tokens)
}

/// Words starting with a digit (after an optional `-`) must be numbers.
fn classify(word: &str, line_num: usize) -> Result<Token, AsmError> {
    let unsigned = word.strip_prefix('-').unwrap_or(word);
    if unsigned.starts_with(|c: char| c.is_ascii_digit()) || word == "-" {
        parse_number(word)
            .map(Token::Number)
            .ok_or_else(|| AsmError::InvalidNumber {
                line: line_num,
                token: word.to_string(),
            })
    } else {
        Ok(Token::Word(word.to_string()))
    }
}

/// Parse a decimal or `0x` hex literal, optionally negative, into an i32.
pub(crate) fn parse_number(word: &str) -> Option<i32> {
    let (negative, digits) = match word.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, word),
    };
    let (radix, body) = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, digits),
    };
    if body.is_empty() || !body.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let magnitude = i64::from_str_radix(body, radix).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value).ok()
}

fn escape(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '0' => Some('\0'),
        '\\' => Some('\\'),
        '\'' => Some('\''),
        '"' => Some('"'),
        _ => None,
    }
}

/// Lex the rest of a character literal; the opening quote is consumed.
fn lex_char(chars: &mut Chars<'_>, line_num: usize) -> Result<i32, AsmError> {
    let unterminated = AsmError::UnterminatedLiteral { line: line_num };
    let mut body = String::new();
    loop {
        match chars.next() {
            None => return Err(unterminated),
            Some((_, '\'')) => break,
            Some((_, '\\')) => {
                body.push('\\');
                match chars.next() {
                    Some((_, c)) => body.push(c),
                    None => return Err(unterminated),
                }
            }
            Some((_, c)) => body.push(c),
        }
    }

    let invalid = || AsmError::InvalidCharLiteral {
        line: line_num,
        token: format!("'{body}'"),
    };
    let mut it = body.chars();
    let value = match (it.next(), it.next(), it.next()) {
        (Some('\\'), Some(e), None) => escape(e).ok_or_else(invalid)?,
        (Some(c), None, _) if c != '\\' => c,
        _ => return Err(invalid()),
    };
    Ok(u32::from(value) as i32)
}

/// Lex the rest of a string literal; the opening quote is consumed.
///
/// Unknown escapes are kept as written.
fn lex_string(chars: &mut Chars<'_>, line_num: usize) -> Result<Vec<u8>, AsmError> {
    let mut text = String::new();
    loop {
        match chars.next() {
            None => return Err(AsmError::UnterminatedLiteral { line: line_num }),
            Some((_, '"')) => break,
            Some((_, '\\')) => match chars.next() {
                None => return Err(AsmError::UnterminatedLiteral { line: line_num }),
                Some((_, e)) => match escape(e) {
                    Some(c) => text.push(c),
                    None => {
                        text.push('\\');
                        text.push(e);
                    }
                },
            },
            Some((_, c)) => text.push(c),
        }
    }
    Ok(text.into_bytes())
}
