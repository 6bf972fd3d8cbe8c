//! The parser state and the top-level parse loop.
//!
//! Expressions go through Pratt-style NUD/LED tables keyed by token kind;
//! statements dispatch on their leading keyword.
//!
//! Syntax errors do not stop the parse. They are recorded, the parser skips
//! ahead to a likely statement or function boundary, and the result is
//! marked incomplete.

use std::collections::HashMap;

use crate::{
    ast::ast::FunctionDecl,
    errors::{
        diagnostics::Diagnostics,
        errors::{Error, ErrorImpl},
    },
    lexer::tokens::{Token, TokenKind},
    Position,
};

use super::{
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler,
        NUDLookup, StmtHandler, StmtLookup,
    },
    stmt::parse_fn_decl,
};

/// Cursor over the token stream plus the handler tables, the diagnostics
/// reported so far and the recovery flag.
pub struct Parser {
    /// Always terminated by `EOF`.
    tokens: Vec<Token>,
    pos: usize,
    stmt_lookup: StmtLookup,
    nud_lookup: NUDLookup,
    led_lookup: LEDLookup,
    binding_power_lookup: BPLookup,
    diagnostics: Diagnostics,
    /// Set once any input had to be skipped during recovery.
    incomplete: bool,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
            diagnostics: Diagnostics::new(),
            incomplete: false,
        }
    }

    /// Returns the current token without advancing.
    ///
    /// Past the end of the stream this keeps returning the final `EOF` token.
    pub fn current_token(&self) -> &Token {
        let index = self.pos.min(self.tokens.len().saturating_sub(1));
        &self.tokens[index]
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        if self.tokens.is_empty() {
            return TokenKind::EOF;
        }
        self.current_token().kind
    }

    /// Advances to the next token and returns the previous token.
    ///
    /// The parser never moves past the `EOF` token.
    pub fn advance(&mut self) -> &Token {
        let index = self.pos.min(self.tokens.len().saturating_sub(1));
        if self.current_token_kind() != TokenKind::EOF {
            self.pos += 1;
        }
        &self.tokens[index]
    }

    /// Consumes the current token if it has `expected_kind`, otherwise fails
    /// with `message` at the current token.
    pub fn expect(&mut self, expected_kind: TokenKind, message: &str) -> Result<Token, Error> {
        if self.current_token_kind() != expected_kind {
            return Err(self.unexpected(message));
        }

        Ok(self.advance().clone())
    }

    /// Builds an error about the current token.
    pub fn unexpected(&self, message: &str) -> Error {
        let token = self.current_token();
        Error::new(
            ErrorImpl::UnexpectedToken {
                token: token.value.clone(),
                message: String::from(message),
            },
            token.span.start.clone(),
        )
    }

    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    /// Records a diagnostic.
    pub fn report(&mut self, error: Error) {
        self.diagnostics.report(error);
    }

    /// Returns whether any input was skipped during error recovery.
    pub fn is_incomplete(&self) -> bool {
        self.incomplete
    }

    /// Skips to the end of the current statement.
    ///
    /// Stops after a `;` at the current nesting level, after the `}` closing
    /// a block that was opened while skipping, or before a `}` that closes
    /// the enclosing block. `fn` and `EOF` always stop the skip.
    pub fn synchronize(&mut self) {
        self.incomplete = true;

        let mut braces = 0;
        loop {
            match self.current_token_kind() {
                TokenKind::OpenCurly => braces += 1,
                TokenKind::CloseCurly => {
                    if braces == 0 {
                        break;
                    }

                    if braces == 1 {
                        self.advance();
                        break;
                    }

                    braces -= 1;
                }
                TokenKind::Semicolon if braces == 0 => {
                    self.advance();
                    break;
                }
                TokenKind::Fn | TokenKind::EOF => break,
                _ => {}
            }

            self.advance();
        }
    }

    /// Skips tokens until `kind` or `EOF` is the current token.
    pub fn synchronize_on(&mut self, kind: TokenKind) {
        self.incomplete = true;

        while self.current_token_kind() != kind && self.current_token_kind() != TokenKind::EOF {
            self.advance();
        }
    }

    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    pub fn get_bp_lookup(&self) -> &BPLookup {
        &self.binding_power_lookup
    }

    /// Registers an infix handler and the binding power it parses with.
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a token.
    ///
    /// Prefix handlers do not touch the binding power table, so a token such
    /// as `-` keeps the precedence of its infix form.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    /// Registers the handler for statements starting with `kind`.
    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    /// Returns the position of the current token.
    pub fn get_position(&self) -> Position {
        self.current_token().span.start.clone()
    }
}

/// Parses a token stream into its function declarations.
///
/// Returns the functions that parsed, in source order, and whether any input
/// had to be skipped. Every syntax error goes into `diagnostics`.
pub fn parse(tokens: Vec<Token>, diagnostics: &mut Diagnostics) -> (Vec<FunctionDecl>, bool) {
    let mut parser = Parser::new(tokens);
    create_token_lookups(&mut parser);

    let mut functions = vec![];

    while parser.has_tokens() {
        if parser.current_token_kind() != TokenKind::Fn {
            let error = Error::new(ErrorImpl::TopLevelDeclaration, parser.get_position());
            parser.report(error);
            parser.synchronize_on(TokenKind::Fn);
            continue;
        }

        match parse_fn_decl(&mut parser) {
            Ok(function) => functions.push(function),
            Err(error) => {
                parser.report(error);
                parser.synchronize_on(TokenKind::Fn);
            }
        }
    }

    let incomplete = parser.is_incomplete();
    diagnostics.extend(parser.diagnostics);

    (functions, incomplete)
}
