// Copyright 2026 The Formica Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Hand-written recursive descent parser for candidate rate equations.
//!
//! The grammar is the subset the regression server emits: numeric
//! literals, the nine known variables, `+ - * / ^`, unary sign,
//! `sin`/`cos` calls, and parentheses.  A numeral exponent directly
//! after `^` may carry its own sign (`S^-2`).

use crate::ast::{BinaryOp, BuiltinFn, Expr, Loc, Symbol, UnaryOp};
use crate::common::{EquationError, EquationResult, ErrorCode};
use crate::token::{Lexer, Spanned, Token};

#[cfg(test)]
mod tests;

/// TokenKind discriminant for efficient peek comparisons without payload matching
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TokenKind {
    Exp,
    Plus,
    Minus,
    Mul,
    Div,
    LParen,
    RParen,
    Comma,
    Ident,
    Num,
}

impl<'a> From<&Token<'a>> for TokenKind {
    fn from(token: &Token<'a>) -> Self {
        match token {
            Token::Exp => TokenKind::Exp,
            Token::Plus => TokenKind::Plus,
            Token::Minus => TokenKind::Minus,
            Token::Mul => TokenKind::Mul,
            Token::Div => TokenKind::Div,
            Token::LParen => TokenKind::LParen,
            Token::RParen => TokenKind::RParen,
            Token::Comma => TokenKind::Comma,
            Token::Ident(_) => TokenKind::Ident,
            Token::Num(_) => TokenKind::Num,
        }
    }
}

/// Parser state holding tokenized input
struct Parser<'input> {
    tokens: Vec<Spanned<Token<'input>>>,
    pos: usize,
}

impl<'input> Parser<'input> {
    /// Create a new parser from a lexer, collecting all tokens up front.
    /// Returns an error if the lexer produces any errors.
    fn new(lexer: Lexer<'input>) -> Result<Self, EquationError> {
        let mut tokens = Vec::new();
        for result in lexer {
            match result {
                Ok(tok) => tokens.push(tok),
                Err(e) => return Err(e),
            }
        }
        Ok(Parser { tokens, pos: 0 })
    }

    /// Peek at the current token without consuming it
    fn peek(&self) -> Option<&Spanned<Token<'input>>> {
        self.tokens.get(self.pos)
    }

    /// Peek at the kind of the current token
    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|(_, tok, _)| TokenKind::from(tok))
    }

    /// Advance to the next token and return the consumed token
    fn advance(&mut self) -> Option<&Spanned<Token<'input>>> {
        if self.pos < self.tokens.len() {
            let tok = &self.tokens[self.pos];
            self.pos += 1;
            Some(tok)
        } else {
            None
        }
    }

    /// Expect the current token to match the expected kind, returning an error if not
    fn expect(&mut self, expected: TokenKind) -> Result<&Spanned<Token<'input>>, EquationError> {
        if self.peek_kind() == Some(expected) {
            Ok(self.advance().unwrap())
        } else if let Some((start, _, end)) = self.peek() {
            Err(EquationError {
                start: *start as u16,
                end: *end as u16,
                code: ErrorCode::UnrecognizedToken,
            })
        } else {
            let pos = self.eof_position();
            Err(EquationError {
                start: pos as u16,
                end: (pos + 1) as u16,
                code: ErrorCode::UnrecognizedEof,
            })
        }
    }

    /// Get the position for EOF errors
    fn eof_position(&self) -> usize {
        if let Some((_, _, end)) = self.tokens.last() {
            *end
        } else {
            0
        }
    }

    /// Check if we've consumed all tokens
    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Parse an equation from the token stream.
    /// Returns Ok(None) for empty input.
    fn parse_equation(&mut self) -> Result<Option<Expr>, EquationError> {
        if self.is_at_end() {
            return Ok(None);
        }

        let expr = self.parse_expr()?;

        // Check for extra tokens after the expression
        if let Some((start, _, end)) = self.peek() {
            return Err(EquationError {
                start: *start as u16,
                end: *end as u16,
                code: ErrorCode::ExtraToken,
            });
        }

        Ok(Some(expr))
    }

    /// Parse additive operators (+, -) - lowest precedence
    fn parse_expr(&mut self) -> Result<Expr, EquationError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            let loc = Loc::new(left.get_loc().start as usize, right.get_loc().end as usize);
            left = Expr::Op2(op, Box::new(left), Box::new(right), loc);
        }

        Ok(left)
    }

    /// Parse multiplicative operators (*, /)
    fn parse_multiplicative(&mut self) -> Result<Expr, EquationError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Mul) => BinaryOp::Mul,
                Some(TokenKind::Div) => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            let loc = Loc::new(left.get_loc().start as usize, right.get_loc().end as usize);
            left = Expr::Op2(op, Box::new(left), Box::new(right), loc);
        }

        Ok(left)
    }

    /// Parse unary sign (+, -)
    fn parse_unary(&mut self) -> Result<Expr, EquationError> {
        match self.peek_kind() {
            Some(TokenKind::Plus) => {
                let (lpos, _, _) = *self.advance().unwrap();
                let operand = self.parse_exponentiation()?;
                let rpos = operand.get_loc().end as usize;
                Ok(Expr::Op1(
                    UnaryOp::Positive,
                    Box::new(operand),
                    Loc::new(lpos, rpos),
                ))
            }
            Some(TokenKind::Minus) => {
                let (lpos, _, _) = *self.advance().unwrap();
                let operand = self.parse_exponentiation()?;
                let rpos = operand.get_loc().end as usize;
                Ok(Expr::Op1(
                    UnaryOp::Negative,
                    Box::new(operand),
                    Loc::new(lpos, rpos),
                ))
            }
            _ => self.parse_exponentiation(),
        }
    }

    /// Parse exponentiation operator (^) - left associative, binds
    /// tighter than unary sign
    fn parse_exponentiation(&mut self) -> Result<Expr, EquationError> {
        let mut left = self.parse_app()?;

        while self.peek_kind() == Some(TokenKind::Exp) {
            self.advance();
            let right = self.parse_exponent_operand()?;
            let loc = Loc::new(left.get_loc().start as usize, right.get_loc().end as usize);
            left = Expr::Op2(BinaryOp::Exp, Box::new(left), Box::new(right), loc);
        }

        Ok(left)
    }

    /// Parse the right operand of `^`, which may be a signed numeral
    /// (`S^-2`, `P1^+0.5`) per the upstream output format.
    fn parse_exponent_operand(&mut self) -> Result<Expr, EquationError> {
        match self.peek_kind() {
            Some(TokenKind::Minus) => {
                let (lpos, _, _) = *self.advance().unwrap();
                let operand = self.parse_app()?;
                let rpos = operand.get_loc().end as usize;
                Ok(Expr::Op1(
                    UnaryOp::Negative,
                    Box::new(operand),
                    Loc::new(lpos, rpos),
                ))
            }
            Some(TokenKind::Plus) => {
                let (lpos, _, _) = *self.advance().unwrap();
                let operand = self.parse_app()?;
                let rpos = operand.get_loc().end as usize;
                Ok(Expr::Op1(
                    UnaryOp::Positive,
                    Box::new(operand),
                    Loc::new(lpos, rpos),
                ))
            }
            _ => self.parse_app(),
        }
    }

    /// Parse function application: id(args)
    fn parse_app(&mut self) -> Result<Expr, EquationError> {
        // Check if we have an identifier followed by '('
        if self.peek_kind() == Some(TokenKind::Ident)
            && self.pos + 1 < self.tokens.len()
            && TokenKind::from(&self.tokens[self.pos + 1].1) == TokenKind::LParen
        {
            // This is a function call
            let (lpos, tok, fn_end) = *self.advance().unwrap();
            let name = if let Token::Ident(s) = tok {
                s.to_lowercase()
            } else {
                unreachable!()
            };

            self.advance(); // consume '('
            let mut args = self.parse_comma_separated_exprs()?;
            let (_, _, rpos) = *self.expect(TokenKind::RParen)?;
            let loc = Loc::new(lpos, rpos);

            let builtin = match name.as_str() {
                "sin" | "cos" => {
                    if args.len() != 1 {
                        return Err(EquationError {
                            start: lpos as u16,
                            end: rpos as u16,
                            code: ErrorCode::BadFunctionArgs,
                        });
                    }
                    let arg = Box::new(args.remove(0));
                    if name == "sin" {
                        BuiltinFn::Sin(arg)
                    } else {
                        BuiltinFn::Cos(arg)
                    }
                }
                _ => {
                    return Err(EquationError {
                        start: lpos as u16,
                        end: fn_end as u16,
                        code: ErrorCode::UnknownFunction,
                    });
                }
            };

            return Ok(Expr::App(builtin, loc));
        }

        self.parse_atom()
    }

    /// Parse an atomic expression (number, variable, parenthesized expression)
    fn parse_atom(&mut self) -> Result<Expr, EquationError> {
        match self.peek_kind() {
            Some(TokenKind::Num) => {
                let (lpos, tok, rpos) = *self.advance().unwrap();
                if let Token::Num(s) = tok {
                    match s.parse::<f64>() {
                        Ok(n) => Ok(Expr::Const(s.to_string(), n, Loc::new(lpos, rpos))),
                        Err(_) => Err(EquationError {
                            start: lpos as u16,
                            end: rpos as u16,
                            code: ErrorCode::ExpectedNumber,
                        }),
                    }
                } else {
                    unreachable!()
                }
            }
            Some(TokenKind::Ident) => {
                let (lpos, tok, rpos) = *self.advance().unwrap();
                if let Token::Ident(s) = tok {
                    match Symbol::from_name(s) {
                        Some(sym) => Ok(Expr::Var(sym, Loc::new(lpos, rpos))),
                        None => Err(EquationError {
                            start: lpos as u16,
                            end: rpos as u16,
                            code: ErrorCode::UnknownVariable,
                        }),
                    }
                } else {
                    unreachable!()
                }
            }
            Some(TokenKind::LParen) => {
                self.advance(); // consume '('
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            Some(_) => {
                let (start, _, end) = self.peek().unwrap();
                Err(EquationError {
                    start: *start as u16,
                    end: *end as u16,
                    code: ErrorCode::UnrecognizedToken,
                })
            }
            None => {
                let pos = self.eof_position();
                Err(EquationError {
                    start: pos as u16,
                    end: (pos + 1) as u16,
                    code: ErrorCode::UnrecognizedEof,
                })
            }
        }
    }

    /// Parse comma-separated expressions (for function arguments)
    fn parse_comma_separated_exprs(&mut self) -> Result<Vec<Expr>, EquationError> {
        let mut exprs = Vec::new();

        // Handle empty list
        if self.peek_kind() == Some(TokenKind::RParen) {
            return Ok(exprs);
        }

        // Parse first expression
        exprs.push(self.parse_expr()?);

        // Parse remaining expressions
        while self.peek_kind() == Some(TokenKind::Comma) {
            self.advance(); // consume ','

            // Handle trailing comma
            if self.peek_kind() == Some(TokenKind::RParen) {
                break;
            }

            exprs.push(self.parse_expr()?);
        }

        Ok(exprs)
    }
}

/// Parse a candidate equation string into an AST.
///
/// Returns:
/// - `Ok(Some(expr))` for valid equations
/// - `Ok(None)` for empty input
/// - `Err(error)` for parse errors
pub fn parse(input: &str) -> EquationResult<Option<Expr>> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;

    parser.parse_equation()
}
