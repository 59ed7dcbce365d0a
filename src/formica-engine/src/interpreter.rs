// Copyright 2026 The Formica Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use crate::ast::{BinaryOp, BuiltinFn, Expr, Symbol, UnaryOp};
use crate::model::State;

/// Evaluates a candidate equation's AST against a single colony state.
/// Role symbols read the state, `t` reads the state's time tag, and `Q`
/// reads the quorum threshold.  Pure and deterministic.
pub(crate) struct ExprEvaluator<'a> {
    state: &'a State,
    quorum: f64,
}

impl<'a> ExprEvaluator<'a> {
    pub(crate) fn new(state: &'a State, quorum: f64) -> Self {
        ExprEvaluator { state, quorum }
    }

    pub(crate) fn eval(&self, expr: &Expr) -> f64 {
        match expr {
            Expr::Const(_, n, _) => *n,
            Expr::Var(sym, _) => match sym {
                Symbol::T => self.state.t,
                Symbol::Q => self.quorum,
                Symbol::S => self.state.s,
                Symbol::P1 => self.state.p1,
                Symbol::P2 => self.state.p2,
                Symbol::A1 => self.state.a1,
                Symbol::A2 => self.state.a2,
                Symbol::R1 => self.state.r1,
                Symbol::R2 => self.state.r2,
            },
            Expr::App(builtin, _) => match builtin {
                BuiltinFn::Sin(a) => self.eval(a).sin(),
                BuiltinFn::Cos(a) => self.eval(a).cos(),
            },
            Expr::Op1(op, r, _) => {
                let r = self.eval(r);
                match op {
                    UnaryOp::Positive => r,
                    UnaryOp::Negative => -r,
                }
            }
            Expr::Op2(op, l, r, _) => {
                let l = self.eval(l);
                let r = self.eval(r);
                match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => l / r,
                    BinaryOp::Exp => l.powf(r),
                }
            }
        }
    }
}
