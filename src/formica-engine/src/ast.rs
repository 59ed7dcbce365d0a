// Copyright 2026 The Formica Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

// candidate equations are single lines emitted by the regression
// server -- u16 is long enough
#[derive(PartialEq, Clone, Copy, Debug, Default)]
pub struct Loc {
    pub start: u16,
    pub end: u16,
}

impl Loc {
    pub fn new(start: usize, end: usize) -> Self {
        Loc {
            start: start as u16,
            end: end as u16,
        }
    }
}

#[test]
fn test_loc_basics() {
    let a = Loc { start: 3, end: 7 };
    assert_eq!(a, Loc::new(3, 7));
}

/// The variables a candidate equation may reference: the seven colony
/// roles plus time and the quorum threshold.  Anything else is an
/// `unknown_variable` error at parse time.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum Symbol {
    T,
    Q,
    S,
    P1,
    P2,
    A1,
    A2,
    R1,
    R2,
}

impl Symbol {
    pub fn from_name(name: &str) -> Option<Symbol> {
        use Symbol::*;
        let sym = match name.to_ascii_lowercase().as_str() {
            "t" => T,
            "q" => Q,
            "s" => S,
            "p1" => P1,
            "p2" => P2,
            "a1" => A1,
            "a2" => A2,
            "r1" => R1,
            "r2" => R2,
            _ => return None,
        };
        Some(sym)
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum UnaryOp {
    Positive,
    Negative,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Exp,
}

#[derive(PartialEq, Clone, Debug)]
pub enum BuiltinFn {
    Sin(Box<Expr>),
    Cos(Box<Expr>),
}

// we use Boxes here because we may walk ASTs a number of times, and we
// want to avoid copying and reallocating subexpressions all over the
// place.
#[derive(PartialEq, Clone, Debug)]
pub enum Expr {
    Const(String, f64, Loc),
    Var(Symbol, Loc),
    App(BuiltinFn, Loc),
    Op1(UnaryOp, Box<Expr>, Loc),
    Op2(BinaryOp, Box<Expr>, Box<Expr>, Loc),
}

impl Expr {
    pub(crate) fn get_loc(&self) -> Loc {
        match self {
            Expr::Const(_, _, loc) => *loc,
            Expr::Var(_, loc) => *loc,
            Expr::App(_, loc) => *loc,
            Expr::Op1(_, _, loc) => *loc,
            Expr::Op2(_, _, _, loc) => *loc,
        }
    }

    #[cfg(test)]
    pub(crate) fn strip_loc(self) -> Self {
        let loc = Loc::default();
        match self {
            Expr::Const(s, n, _loc) => Expr::Const(s, n, loc),
            Expr::Var(v, _loc) => Expr::Var(v, loc),
            Expr::App(builtin, _loc) => {
                let builtin = match builtin {
                    BuiltinFn::Sin(a) => BuiltinFn::Sin(Box::new(a.strip_loc())),
                    BuiltinFn::Cos(a) => BuiltinFn::Cos(Box::new(a.strip_loc())),
                };
                Expr::App(builtin, loc)
            }
            Expr::Op1(op, r, _loc) => Expr::Op1(op, Box::new(r.strip_loc()), loc),
            Expr::Op2(op, l, r, _loc) => {
                Expr::Op2(op, Box::new(l.strip_loc()), Box::new(r.strip_loc()), loc)
            }
        }
    }
}

#[test]
fn test_symbol_from_name() {
    assert_eq!(Some(Symbol::S), Symbol::from_name("S"));
    assert_eq!(Some(Symbol::S), Symbol::from_name("s"));
    assert_eq!(Some(Symbol::P1), Symbol::from_name("P1"));
    assert_eq!(Some(Symbol::T), Symbol::from_name("t"));
    assert_eq!(Some(Symbol::Q), Symbol::from_name("Q"));
    assert_eq!(None, Symbol::from_name("N"));
    assert_eq!(None, Symbol::from_name("P3"));
}
