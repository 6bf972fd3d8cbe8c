use crate::{
    ast::{
        ast::{FunctionDecl, ParamDecl, VarDecl},
        expressions::Expr,
        statements::{Assignment, Block, DeclStmt, IfStmt, ReturnStmt, Stmt, WhileStmt},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{parser::Parser, types::parse_type};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    if let Some(handler) = parser
        .get_stmt_lookup()
        .get(&parser.current_token_kind())
        .copied()
    {
        return handler(parser);
    }

    parse_assignment_or_expr(parser)
}

/// Parses `expr ;` or `identifier = expr ;`.
fn parse_assignment_or_expr(parser: &mut Parser) -> Result<Stmt, Error> {
    let expr = parse_expr(parser, BindingPower::Default)?;

    if parser.current_token_kind() == TokenKind::Assignment {
        let Expr::DeclRef(variable) = expr else {
            return Err(Error::new(
                ErrorImpl::InvalidAssignmentTarget,
                expr.position().clone(),
            ));
        };

        parser.advance();
        let value = parse_expr(parser, BindingPower::Default)?;
        parser.expect(TokenKind::Semicolon, "expected ';' at the end of assignment")?;

        return Ok(Stmt::Assignment(Assignment {
            position: variable.position.clone(),
            variable,
            value,
        }));
    }

    parser.expect(TokenKind::Semicolon, "expected ';' at the end of expression")?;

    Ok(Stmt::Expression(expr))
}

pub fn parse_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start_token = parser.advance().clone();
    let is_mutable = start_token.kind == TokenKind::Var;

    let identifier = parser.expect(TokenKind::Identifier, "expected identifier")?;
    parser.expect(TokenKind::Colon, "expected ':'")?;
    let var_type = parse_type(parser)?;

    let initializer = if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    parser.expect(TokenKind::Semicolon, "expected ';' after declaration")?;

    Ok(Stmt::Decl(DeclStmt {
        var_decl: VarDecl {
            identifier: identifier.value,
            position: identifier.span.start,
            var_type,
            is_mutable,
            initializer,
        },
        position: start_token.span.start,
    }))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let position = parser.advance().span.start.clone();
    let condition = parse_expr(parser, BindingPower::Default)?;

    if parser.current_token_kind() != TokenKind::OpenCurly {
        return Err(parser.unexpected("expected 'if' body"));
    }
    let true_block = parse_block(parser)?;

    if parser.current_token_kind() != TokenKind::Else {
        return Ok(Stmt::If(IfStmt {
            condition,
            true_block,
            false_block: None,
            position,
        }));
    }
    parser.advance();

    let false_block = if parser.current_token_kind() == TokenKind::If {
        // `else if` becomes an else block holding the nested if
        let nested = parse_if_stmt(parser)?;
        Block {
            position: nested.position().clone(),
            statements: vec![nested],
        }
    } else {
        if parser.current_token_kind() != TokenKind::OpenCurly {
            return Err(parser.unexpected("expected 'else' body"));
        }
        parse_block(parser)?
    };

    Ok(Stmt::If(IfStmt {
        condition,
        true_block,
        false_block: Some(false_block),
        position,
    }))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let position = parser.advance().span.start.clone();
    let condition = parse_expr(parser, BindingPower::Default)?;

    if parser.current_token_kind() != TokenKind::OpenCurly {
        return Err(parser.unexpected("expected 'while' body"));
    }
    let body = parse_block(parser)?;

    Ok(Stmt::While(WhileStmt {
        condition,
        body,
        position,
    }))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let position = parser.advance().span.start.clone();

    let value = if parser.current_token_kind() != TokenKind::Semicolon {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    parser.expect(
        TokenKind::Semicolon,
        "expected ';' at the end of a return statement",
    )?;

    Ok(Stmt::Return(ReturnStmt { value, position }))
}

/// Parses `{ stmt* }`.
///
/// A statement that fails to parse is reported and skipped; the block
/// itself only fails when its closing brace is missing.
pub fn parse_block(parser: &mut Parser) -> Result<Block, Error> {
    let position = parser.expect(TokenKind::OpenCurly, "expected '{'")?.span.start;
    let mut statements = vec![];

    loop {
        match parser.current_token_kind() {
            TokenKind::CloseCurly => break,
            TokenKind::EOF | TokenKind::Fn => {
                return Err(parser.unexpected("expected '}' at the end of a block"));
            }
            _ => {}
        }

        match parse_stmt(parser) {
            Ok(stmt) => statements.push(stmt),
            Err(error) => {
                parser.report(error);
                parser.synchronize();
            }
        }
    }

    parser.advance();

    Ok(Block {
        statements,
        position,
    })
}

pub fn parse_fn_decl(parser: &mut Parser) -> Result<FunctionDecl, Error> {
    let position = parser.advance().span.start.clone();

    let identifier = parser.expect(TokenKind::Identifier, "expected identifier")?;
    let params = parse_parameter_list(parser)?;

    parser.expect(TokenKind::Colon, "expected ':'")?;
    let return_type = parse_type(parser)?;

    if parser.current_token_kind() != TokenKind::OpenCurly {
        return Err(parser.unexpected("expected function body"));
    }
    let body = parse_block(parser)?;

    Ok(FunctionDecl {
        identifier: identifier.value,
        position,
        return_type,
        params,
        body,
    })
}

fn parse_parameter_list(parser: &mut Parser) -> Result<Vec<ParamDecl>, Error> {
    parser.expect(TokenKind::OpenParen, "expected '('")?;

    let mut params = vec![];

    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            if parser.current_token_kind() != TokenKind::Identifier {
                return Err(parser.unexpected("expected parameter declaration"));
            }
            params.push(parse_param_decl(parser)?);

            if parser.current_token_kind() != TokenKind::Comma {
                break;
            }
            parser.advance();
        }
    }

    parser.expect(TokenKind::CloseParen, "expected ')'")?;

    Ok(params)
}

fn parse_param_decl(parser: &mut Parser) -> Result<ParamDecl, Error> {
    let identifier = parser.expect(TokenKind::Identifier, "expected parameter declaration")?;
    parser.expect(TokenKind::Colon, "expected ':'")?;
    let param_type = parse_type(parser)?;

    Ok(ParamDecl {
        identifier: identifier.value,
        position: identifier.span.start,
        param_type,
    })
}
