//! Parser for stackvm assembly tokens: statements, labels, emission.
//!
//! Assembly runs in two passes over the parsed statements. Pass 1 binds
//! every label (instruction and memory) so forward references resolve;
//! pass 2 emits instructions and the memory image.

use std::collections::HashMap;

use crate::error::AsmError;
use crate::lexer::Token;
use stackvm_common::{Instruction, Opcode, Program};

/// A token with the line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub line: usize,
}

/// An operand or memory word before label resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Literal(i32),
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Word(Value),
    /// Bytes of a string literal; a 0 terminator is appended on emission.
    Str(Vec<u8>),
}

impl Item {
    fn word_count(&self) -> usize {
        match self {
            Item::Word(_) => 1,
            Item::Str(bytes) => bytes.len() + 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Statement {
    Label {
        name: String,
        line: usize,
    },
    Instruction {
        opcode: Opcode,
        operand: Option<Value>,
        line: usize,
    },
    Memory {
        name: Option<String>,
        items: Vec<Item>,
        line: usize,
    },
}

fn is_keyword(word: &str, keyword: &str) -> bool {
    word.eq_ignore_ascii_case(keyword)
}

/// Cursor over the flattened token stream.
struct Cursor<'a> {
    tokens: &'a [Spanned],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn next(&mut self) -> Option<&'a Spanned> {
        let tok = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(tok)
    }

    fn peek(&self) -> Option<&'a Spanned> {
        self.tokens.get(self.pos)
    }

    /// Take the next token only if it is on `line`.
    fn next_on_line(&mut self, line: usize) -> Option<&'a Spanned> {
        match self.peek() {
            Some(tok) if tok.line == line => self.next(),
            _ => None,
        }
    }
}

fn parse_statements(tokens: &[Spanned]) -> Result<Vec<Statement>, AsmError> {
    let mut cursor = Cursor { tokens, pos: 0 };
    let mut statements = Vec::new();

    while let Some(tok) = cursor.next() {
        let line = tok.line;
        let word = match &tok.token {
            Token::Word(word) => word.as_str(),
            other => {
                return Err(AsmError::UnexpectedToken {
                    line,
                    token: other.describe(),
                })
            }
        };

        let statement = if is_keyword(word, "label") {
            let name = match cursor.next_on_line(line) {
                Some(Spanned {
                    token: Token::Word(name),
                    ..
                }) => name.clone(),
                Some(other) => {
                    return Err(AsmError::UnexpectedToken {
                        line,
                        token: other.token.describe(),
                    })
                }
                None => {
                    return Err(AsmError::MissingOperand {
                        line,
                        mnemonic: "label",
                    })
                }
            };
            Statement::Label { name, line }
        } else if is_keyword(word, "memory") {
            parse_memory_block(&mut cursor, line)?
        } else if let Some(opcode) = Opcode::from_mnemonic(word) {
            let operand = if opcode.takes_operand() {
                let tok = cursor.next_on_line(line).ok_or(AsmError::MissingOperand {
                    line,
                    mnemonic: opcode.mnemonic(),
                })?;
                Some(parse_value(tok)?)
            } else {
                None
            };
            Statement::Instruction {
                opcode,
                operand,
                line,
            }
        } else if is_keyword(word, "end") {
            return Err(AsmError::UnexpectedToken {
                line,
                token: word.to_string(),
            });
        } else {
            return Err(AsmError::UnknownMnemonic {
                line,
                token: word.to_string(),
            });
        };

        statements.push(statement);
    }

    Ok(statements)
}

/// `memory [name] items... end`, possibly spanning several lines.
///
/// A word directly after `memory` names the block.
fn parse_memory_block(cursor: &mut Cursor<'_>, line: usize) -> Result<Statement, AsmError> {
    let name = match cursor.peek() {
        Some(Spanned {
            token: Token::Word(word),
            ..
        }) if !is_keyword(word, "end") => {
            cursor.next();
            Some(word.clone())
        }
        _ => None,
    };

    let mut items = Vec::new();
    loop {
        let tok = cursor
            .next()
            .ok_or(AsmError::UnterminatedMemoryBlock { line })?;
        match &tok.token {
            Token::Word(word) if is_keyword(word, "end") => break,
            Token::Str(bytes) => items.push(Item::Str(bytes.clone())),
            _ => items.push(Item::Word(parse_value(tok)?)),
        }
    }

    Ok(Statement::Memory { name, items, line })
}

fn parse_value(tok: &Spanned) -> Result<Value, AsmError> {
    match &tok.token {
        Token::Number(n) => Ok(Value::Literal(*n)),
        Token::Word(name) => Ok(Value::Label(name.clone())),
        Token::Str(_) => Err(AsmError::UnexpectedToken {
            line: tok.line,
            token: tok.token.describe(),
        }),
    }
}

/// Label name to bound value and the line that bound it.
type Symbols = HashMap<String, (usize, usize)>;

fn bind(symbols: &mut Symbols, name: &str, value: usize, line: usize) -> Result<(), AsmError> {
    if let Some(&(_, first)) = symbols.get(name) {
        return Err(AsmError::DuplicateLabel {
            line,
            name: name.to_string(),
            first,
        });
    }
    symbols.insert(name.to_string(), (value, line));
    Ok(())
}

/// Pass 1: assign every label its instruction index or memory offset.
fn bind_labels(statements: &[Statement]) -> Result<Symbols, AsmError> {
    let mut symbols = Symbols::new();
    let mut instructions = 0usize;
    let mut words = 0usize;

    for statement in statements {
        match statement {
            Statement::Label { name, line } => bind(&mut symbols, name, instructions, *line)?,
            Statement::Instruction { .. } => instructions += 1,
            Statement::Memory { name, items, line } => {
                if let Some(name) = name {
                    bind(&mut symbols, name, words, *line)?;
                }
                words += items.iter().map(Item::word_count).sum::<usize>();
            }
        }
    }

    Ok(symbols)
}

fn resolve(value: &Value, symbols: &Symbols, line: usize) -> Result<i32, AsmError> {
    match value {
        Value::Literal(n) => Ok(*n),
        Value::Label(name) => {
            let &(bound, _) = symbols.get(name).ok_or_else(|| AsmError::UndefinedLabel {
                line,
                name: name.clone(),
            })?;
            i32::try_from(bound).map_err(|_| AsmError::InvalidNumber {
                line,
                token: name.clone(),
            })
        }
    }
}

/// Pass 2: emit instructions and memory words.
fn emit(statements: &[Statement], symbols: &Symbols) -> Result<Program, AsmError> {
    let mut instructions = Vec::new();
    let mut memory = Vec::new();

    for statement in statements {
        match statement {
            Statement::Label { .. } => {}
            Statement::Instruction {
                opcode,
                operand,
                line,
            } => {
                let operand = match operand {
                    Some(value) => resolve(value, symbols, *line)?,
                    None => 0,
                };
                instructions.push(Instruction::new(*opcode, operand));
            }
            Statement::Memory { items, line, .. } => {
                for item in items {
                    match item {
                        Item::Word(value) => memory.push(resolve(value, symbols, *line)?),
                        Item::Str(bytes) => {
                            memory.extend(bytes.iter().map(|&b| i32::from(b)));
                            memory.push(0);
                        }
                    }
                }
            }
        }
    }

    Ok(Program::with_memory(instructions, memory))
}

/// Parse a whole token stream into a program.
pub(crate) fn parse(tokens: &[Spanned]) -> Result<Program, AsmError> {
    let statements = parse_statements(tokens)?;
    let symbols = bind_labels(&statements)?;
    log::debug!(
        "parsed {} statements, {} labels",
        statements.len(),
        symbols.len()
    );
    emit(&statements, &symbols)
}
