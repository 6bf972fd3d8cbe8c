use crate::{
    ast::expressions::{
        BinaryOp, BinaryOperator, CallExpr, DeclRefExpr, Expr, GroupingExpr, NumberLiteral,
        UnaryOp, UnaryOperator,
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(parser.unexpected("expected expression"));
    };

    let mut left = nud(parser)?;

    // While the current token binds tighter than `bp`, keep extending the lhs
    loop {
        let token_kind = parser.current_token_kind();
        let token_bp = *parser
            .get_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);

        if token_bp <= bp {
            break;
        }

        let Some(led) = parser.get_led_lookup().get(&token_kind).copied() else {
            break;
        };

        left = led(parser, left, token_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    match parser.current_token_kind() {
        TokenKind::Number => {
            let token = parser.advance().clone();
            Ok(Expr::Number(NumberLiteral {
                value: token.value,
                position: token.span.start,
            }))
        }
        TokenKind::Identifier => {
            let token = parser.advance().clone();
            Ok(Expr::DeclRef(DeclRefExpr {
                identifier: token.value,
                position: token.span.start,
            }))
        }
        _ => Err(parser.unexpected("expected expression")),
    }
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let Some(op) = BinaryOp::from_token(operator_token.kind) else {
        return Err(parser.unexpected("expected binary operator"));
    };

    let right = parse_expr(parser, bp)?;

    Ok(Expr::Binary(BinaryOperator {
        lhs: Box::new(left),
        rhs: Box::new(right),
        op,
        position: operator_token.span.start,
    }))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let Some(op) = UnaryOp::from_token(operator_token.kind) else {
        return Err(parser.unexpected("expected unary operator"));
    };

    let operand = parse_expr(parser, BindingPower::Unary)?;

    Ok(Expr::Unary(UnaryOperator {
        operand: Box::new(operand),
        op,
        position: operator_token.span.start,
    }))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let position = parser.advance().span.start.clone();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen, "expected ')'")?;

    Ok(Expr::Grouping(GroupingExpr {
        expr: Box::new(expr),
        position,
    }))
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();

    let mut arguments = vec![];

    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            arguments.push(parse_expr(parser, BindingPower::Default)?);

            if parser.current_token_kind() != TokenKind::Comma {
                break;
            }
            parser.advance();
        }
    }

    parser.expect(TokenKind::CloseParen, "expected ')'")?;

    Ok(Expr::Call(CallExpr {
        position: left.position().clone(),
        callee: Box::new(left),
        arguments,
    }))
}
