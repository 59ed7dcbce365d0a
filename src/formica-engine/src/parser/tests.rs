// Copyright 2026 The Formica Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use super::*;
use crate::ast::{BinaryOp, BuiltinFn, Expr, Loc, Symbol, UnaryOp};
use crate::common::ErrorCode;

fn parse_ok(input: &str) -> Expr {
    parse(input)
        .unwrap_or_else(|err| panic!("parse error for '{input}': {err}"))
        .unwrap_or_else(|| panic!("no AST for '{input}'"))
        .strip_loc()
}

fn parse_err(input: &str) -> EquationError {
    match parse(input) {
        Err(err) => err,
        Ok(ast) => panic!("expected parse error for '{input}', got {ast:?}"),
    }
}

fn num(s: &str) -> Expr {
    Expr::Const(s.to_string(), s.parse().unwrap(), Loc::default())
}

fn var(sym: Symbol) -> Expr {
    Expr::Var(sym, Loc::default())
}

fn op2(op: BinaryOp, l: Expr, r: Expr) -> Expr {
    Expr::Op2(op, Box::new(l), Box::new(r), Loc::default())
}

fn neg(e: Expr) -> Expr {
    Expr::Op1(UnaryOp::Negative, Box::new(e), Loc::default())
}

#[test]
fn plain_arithmetic() {
    assert_eq!(parse_ok("3.5"), num("3.5"));
    assert_eq!(parse_ok("S"), var(Symbol::S));
    assert_eq!(
        parse_ok("1 + 2*3"),
        op2(
            BinaryOp::Add,
            num("1"),
            op2(BinaryOp::Mul, num("2"), num("3"))
        )
    );
    assert_eq!(
        parse_ok("(1 + 2)*3"),
        op2(
            BinaryOp::Mul,
            op2(BinaryOp::Add, num("1"), num("2")),
            num("3")
        )
    );
    assert_eq!(
        parse_ok("1.2*S - 0.3*A1"),
        op2(
            BinaryOp::Sub,
            op2(BinaryOp::Mul, num("1.2"), var(Symbol::S)),
            op2(BinaryOp::Mul, num("0.3"), var(Symbol::A1))
        )
    );
}

#[test]
fn powers() {
    assert_eq!(
        parse_ok("S^2"),
        op2(BinaryOp::Exp, var(Symbol::S), num("2"))
    );
    // multiple distinct powers of the same variable in one expression
    assert_eq!(
        parse_ok("S^2 + S^3"),
        op2(
            BinaryOp::Add,
            op2(BinaryOp::Exp, var(Symbol::S), num("2")),
            op2(BinaryOp::Exp, var(Symbol::S), num("3"))
        )
    );
    // ^ is left associative
    assert_eq!(
        parse_ok("S^2^3"),
        op2(
            BinaryOp::Exp,
            op2(BinaryOp::Exp, var(Symbol::S), num("2")),
            num("3")
        )
    );
}

#[test]
fn signed_exponents() {
    assert_eq!(
        parse_ok("R1^-2"),
        op2(BinaryOp::Exp, var(Symbol::R1), neg(num("2")))
    );
    assert_eq!(
        parse_ok("P1^-0.5"),
        op2(BinaryOp::Exp, var(Symbol::P1), neg(num("0.5")))
    );
}

#[test]
fn unary_minus_binds_looser_than_power() {
    assert_eq!(
        parse_ok("-S^2"),
        neg(op2(BinaryOp::Exp, var(Symbol::S), num("2")))
    );
}

#[test]
fn trig_calls() {
    assert_eq!(
        parse_ok("sin(t)"),
        Expr::App(
            BuiltinFn::Sin(Box::new(var(Symbol::T))),
            Loc::default()
        )
    );
    assert_eq!(
        parse_ok("cos(2*Q)"),
        Expr::App(
            BuiltinFn::Cos(Box::new(op2(BinaryOp::Mul, num("2"), var(Symbol::Q)))),
            Loc::default()
        )
    );
    // case insensitive, like everything else the upstream tool emits
    assert_eq!(
        parse_ok("SIN(S)"),
        Expr::App(BuiltinFn::Sin(Box::new(var(Symbol::S))), Loc::default())
    );
}

#[test]
fn empty_input() {
    assert_eq!(Ok(None), parse(""));
    assert_eq!(Ok(None), parse("   "));
}

#[test]
fn unknown_variable() {
    let err = parse_err("N*2");
    assert_eq!(err.code, ErrorCode::UnknownVariable);
    assert_eq!((err.start, err.end), (0, 1));

    let err = parse_err("1 + P3");
    assert_eq!(err.code, ErrorCode::UnknownVariable);
    assert_eq!((err.start, err.end), (4, 6));
}

#[test]
fn unknown_function() {
    let err = parse_err("tan(S)");
    assert_eq!(err.code, ErrorCode::UnknownFunction);
}

#[test]
fn bad_function_args() {
    let err = parse_err("sin(1, 2)");
    assert_eq!(err.code, ErrorCode::BadFunctionArgs);
    let err = parse_err("cos()");
    assert_eq!(err.code, ErrorCode::BadFunctionArgs);
}

#[test]
fn malformed() {
    assert_eq!(parse_err("1.2***").code, ErrorCode::UnrecognizedToken);
    assert_eq!(parse_err("1 2").code, ErrorCode::ExtraToken);
    assert_eq!(parse_err("(1 + 2").code, ErrorCode::UnrecognizedEof);
    assert_eq!(parse_err("S +").code, ErrorCode::UnrecognizedEof);
    assert_eq!(parse_err("S % 2").code, ErrorCode::UnrecognizedToken);
}

mod props {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn literals_roundtrip(n in 0.0f64..1e9) {
            let src = format!("{n}");
            let expr = parse_ok(&src);
            prop_assert_eq!(expr, num(&src));
        }

        #[test]
        fn integer_exponents_parse(n in -9i32..10) {
            let src = format!("S^{n}");
            let expected = if n < 0 {
                op2(
                    BinaryOp::Exp,
                    var(Symbol::S),
                    neg(num(&format!("{}", -(n as i64)))),
                )
            } else {
                op2(BinaryOp::Exp, var(Symbol::S), num(&format!("{n}")))
            };
            prop_assert_eq!(parse_ok(&src), expected);
        }
    }
}
