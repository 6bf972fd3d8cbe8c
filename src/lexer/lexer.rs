use std::rc::Rc;

use regex::Regex;

use crate::{
    errors::{
        diagnostics::Diagnostics,
        errors::{Error, ErrorImpl},
    },
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

/// Consumes the matched text and returns the token it forms, if any.
pub type RegexHandler = fn(&mut Lexer, &str) -> Option<Token>;

#[derive(Clone)]
pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

#[derive(Clone)]
pub struct Lexer {
    patterns: Vec<RegexPattern>,
    source: String,
    pos: usize,
    line: u32,
    column: u32,
    file: Rc<String>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("shell"))
        };

        // Patterns are anchored and tried in order, so longer operators come first.
        Lexer {
            pos: 0,
            line: 1,
            column: 1,
            patterns: vec![
                RegexPattern { regex: Regex::new(r"^\s+").unwrap(), handler: skip_handler },
                RegexPattern { regex: Regex::new(r"^//[^\n]*").unwrap(), handler: skip_handler },
                RegexPattern { regex: Regex::new(r"^[a-zA-Z@][a-zA-Z0-9_]*").unwrap(), handler: symbol_handler },
                RegexPattern { regex: Regex::new(r"^[0-9]+(\.[0-9]*)?").unwrap(), handler: number_handler },
                RegexPattern { regex: Regex::new(r"^\{").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{") },
                RegexPattern { regex: Regex::new(r"^\}").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}") },
                RegexPattern { regex: Regex::new(r"^\(").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(") },
                RegexPattern { regex: Regex::new(r"^\)").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")") },
                RegexPattern { regex: Regex::new(r"^==").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Equals, "==") },
                RegexPattern { regex: Regex::new(r"^=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=") },
                RegexPattern { regex: Regex::new(r"^!").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Not, "!") },
                RegexPattern { regex: Regex::new(r"^<").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Less, "<") },
                RegexPattern { regex: Regex::new(r"^>").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Greater, ">") },
                RegexPattern { regex: Regex::new(r"^\|\|").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Or, "||") },
                RegexPattern { regex: Regex::new(r"^&&").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::And, "&&") },
                RegexPattern { regex: Regex::new(r"^;").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";") },
                RegexPattern { regex: Regex::new(r"^:").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Colon, ":") },
                RegexPattern { regex: Regex::new(r"^,").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Comma, ",") },
                RegexPattern { regex: Regex::new(r"^\+").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Plus, "+") },
                RegexPattern { regex: Regex::new(r"^-").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Dash, "-") },
                RegexPattern { regex: Regex::new(r"^/").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Slash, "/") },
                RegexPattern { regex: Regex::new(r"^\*").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Star, "*") },
            ],
            source,
            file: file_name,
        }
    }

    /// Position of the next unread character.
    pub fn position(&self) -> Position {
        Position::new(self.pos as u32, self.line, self.column, Rc::clone(&self.file))
    }

    /// Moves past `text`, which must be the next slice of the source, and
    /// returns the span it covered.
    pub fn consume(&mut self, text: &str) -> Span {
        let start = self.position();

        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos += text.len();

        Span {
            start,
            end: self.position(),
        }
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Produces the next token, reporting malformed input to `diagnostics`.
    ///
    /// Once the input is exhausted every call returns an `EOF` token.
    pub fn next_token(&mut self, diagnostics: &mut Diagnostics) -> Token {
        loop {
            if self.at_eof() {
                let position = self.position();
                return MK_TOKEN!(
                    TokenKind::EOF,
                    String::from("EOF"),
                    Span {
                        start: position.clone(),
                        end: position
                    }
                );
            }

            let matched = self.patterns.iter().find_map(|pattern| {
                pattern
                    .regex
                    .find(self.remainder())
                    .map(|found| (pattern.handler, found.as_str().to_string()))
            });

            let token = match matched {
                Some((handler, text)) => handler(self, &text),
                None => Some(self.unknown_character()),
            };

            if let Some(token) = token {
                if token.kind == TokenKind::Unknown {
                    report_unknown(&token, diagnostics);
                }
                return token;
            }
        }
    }

    fn unknown_character(&mut self) -> Token {
        let character = self
            .remainder()
            .chars()
            .next()
            .map(String::from)
            .unwrap_or_default();
        let span = self.consume(&character);

        MK_TOKEN!(TokenKind::Unknown, character, span)
    }
}

fn report_unknown(token: &Token, diagnostics: &mut Diagnostics) {
    let error_impl = if token.value.starts_with(|c: char| c.is_ascii_digit()) {
        ErrorImpl::InvalidNumber {
            literal: token.value.clone(),
        }
    } else {
        ErrorImpl::UnrecognisedCharacter {
            character: token.value.clone(),
        }
    };

    diagnostics.report(Error::new(error_impl, token.span.start.clone()));
}

fn skip_handler(lexer: &mut Lexer, matched: &str) -> Option<Token> {
    lexer.consume(matched);
    None
}

fn number_handler(lexer: &mut Lexer, matched: &str) -> Option<Token> {
    let span = lexer.consume(matched);

    // A dot has to be followed by at least one digit.
    if matched.ends_with('.') {
        return Some(MK_TOKEN!(TokenKind::Unknown, String::from(matched), span));
    }

    Some(MK_TOKEN!(TokenKind::Number, String::from(matched), span))
}

fn symbol_handler(lexer: &mut Lexer, matched: &str) -> Option<Token> {
    let span = lexer.consume(matched);
    let kind = RESERVED_LOOKUP
        .get(matched)
        .copied()
        .unwrap_or(TokenKind::Identifier);

    Some(MK_TOKEN!(kind, String::from(matched), span))
}

/// Tokenizes the whole source. The returned list always ends with `EOF`.
pub fn tokenize(source: &str, file: Option<String>, diagnostics: &mut Diagnostics) -> Vec<Token> {
    let mut lex = Lexer::new(String::from(source), file);
    let mut tokens = vec![];

    loop {
        let token = lex.next_token(diagnostics);
        let is_eof = token.kind == TokenKind::EOF;
        tokens.push(token);

        if is_eof {
            break;
        }
    }

    tokens
}
