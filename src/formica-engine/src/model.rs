// Copyright 2026 The Formica Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;

use crate::ast::Expr;
use crate::common::{EquationResult, Error, ErrorCode, ErrorKind, Result};
use crate::interpreter::ExprEvaluator;
use crate::parser;

pub const N_ROLES: usize = 7;

/// The seven colony roles, in the fixed order the regression tool's
/// output blocks arrive in.  This order is a hard contract and must
/// not be reordered.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum Role {
    S,
    P1,
    P2,
    A1,
    A2,
    R1,
    R2,
}

impl Role {
    pub const ALL: [Role; N_ROLES] = [
        Role::S,
        Role::P1,
        Role::P2,
        Role::A1,
        Role::A2,
        Role::R1,
        Role::R2,
    ];

    pub fn index(self) -> usize {
        match self {
            Role::S => 0,
            Role::P1 => 1,
            Role::P2 => 2,
            Role::A1 => 3,
            Role::A2 => 4,
            Role::R1 => 5,
            Role::R2 => 6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::S => "S",
            Role::P1 => "P1",
            Role::P2 => "P2",
            Role::A1 => "A1",
            Role::A2 => "A2",
            Role::R1 => "R1",
            Role::R2 => "R2",
        }
    }

    /// Column of this role within a training-data row (the
    /// whitespace-split portion of the row before the first comma).
    /// Fixed pairing with the training file format, not inferred.
    pub fn file_column(self) -> usize {
        match self {
            Role::S => 3,
            Role::P1 => 5,
            Role::P2 => 6,
            Role::A1 => 9,
            Role::A2 => 10,
            Role::R1 => 7,
            Role::R2 => 8,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One colony state: the seven role populations plus the time tag.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct State {
    pub s: f64,
    pub p1: f64,
    pub p2: f64,
    pub a1: f64,
    pub a2: f64,
    pub r1: f64,
    pub r2: f64,
    pub t: f64,
}

impl State {
    pub fn get(&self, role: Role) -> f64 {
        match role {
            Role::S => self.s,
            Role::P1 => self.p1,
            Role::P2 => self.p2,
            Role::A1 => self.a1,
            Role::A2 => self.a2,
            Role::R1 => self.r1,
            Role::R2 => self.r2,
        }
    }

    pub fn add(&mut self, role: Role, delta: f64) {
        match role {
            Role::S => self.s += delta,
            Role::P1 => self.p1 += delta,
            Role::P2 => self.p2 += delta,
            Role::A1 => self.a1 += delta,
            Role::A2 => self.a2 += delta,
            Role::R1 => self.r1 += delta,
            Role::R2 => self.r2 += delta,
        }
    }
}

/// A candidate equation translated into an evaluable AST, together
/// with the source text it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledExpression {
    source: String,
    ast: Expr,
}

impl CompiledExpression {
    /// Translate one candidate equation.  Empty input and any
    /// malformed syntax is a clean `EquationError` -- nothing is ever
    /// executed as code.
    pub fn compile(source: &str) -> EquationResult<CompiledExpression> {
        let source = source.trim();
        match parser::parse(source)? {
            Some(ast) => Ok(CompiledExpression {
                source: source.to_string(),
                ast,
            }),
            None => Err(crate::common::EquationError {
                start: 0,
                end: source.len() as u16,
                code: ErrorCode::EmptyEquation,
            }),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn eval(&self, state: &State, quorum: f64) -> f64 {
        ExprEvaluator::new(state, quorum).eval(&self.ast)
    }
}

/// One complete system of rate equations: exactly one compiled
/// expression per role.
#[derive(Clone, Debug)]
pub struct AssembledModel {
    rates: [CompiledExpression; N_ROLES],
}

impl AssembledModel {
    /// Translate one candidate per role and bind them into a model.
    /// Fails if any of the seven translations fails.
    pub fn compile(sources: &[&str; N_ROLES]) -> Result<AssembledModel> {
        let mut rates = Vec::with_capacity(N_ROLES);
        for (role, source) in Role::ALL.iter().zip(sources.iter()) {
            let compiled = CompiledExpression::compile(source).map_err(|err| {
                Error::new(
                    ErrorKind::Variable,
                    err.code,
                    Some(format!("d{role} `{source}`: {err}")),
                )
            })?;
            rates.push(compiled);
        }
        let rates: [CompiledExpression; N_ROLES] = rates.try_into().unwrap();
        Ok(AssembledModel { rates })
    }

    pub fn from_compiled(rates: [CompiledExpression; N_ROLES]) -> AssembledModel {
        AssembledModel { rates }
    }

    pub fn rate(&self, role: Role) -> &CompiledExpression {
        &self.rates[role.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_order_is_fixed() {
        let names: Vec<&str> = Role::ALL.iter().map(|r| r.as_str()).collect();
        assert_eq!(vec!["S", "P1", "P2", "A1", "A2", "R1", "R2"], names);
        for (i, role) in Role::ALL.iter().enumerate() {
            assert_eq!(i, role.index());
        }
    }

    #[test]
    fn file_columns() {
        assert_eq!(3, Role::S.file_column());
        assert_eq!(5, Role::P1.file_column());
        assert_eq!(6, Role::P2.file_column());
        assert_eq!(7, Role::R1.file_column());
        assert_eq!(8, Role::R2.file_column());
        assert_eq!(9, Role::A1.file_column());
        assert_eq!(10, Role::A2.file_column());
    }

    #[test]
    fn state_accessors() {
        let mut state = State::default();
        state.add(Role::A2, 2.5);
        state.add(Role::A2, 0.5);
        assert_eq!(3.0, state.get(Role::A2));
        assert_eq!(0.0, state.get(Role::S));
    }

    #[test]
    fn compile_candidate() {
        let expr = CompiledExpression::compile(" 1.2*S - 0.3*A1 ").unwrap();
        assert_eq!("1.2*S - 0.3*A1", expr.source());

        let state = State {
            s: 1.0,
            a1: 2.0,
            ..State::default()
        };
        assert_eq!(1.2 - 0.6, expr.eval(&state, 0.0));
    }

    #[test]
    fn compile_rejects_empty_and_malformed() {
        assert_eq!(
            ErrorCode::EmptyEquation,
            CompiledExpression::compile("   ").unwrap_err().code
        );
        assert_eq!(
            ErrorCode::UnknownVariable,
            CompiledExpression::compile("2*N").unwrap_err().code
        );
    }

    #[test]
    fn assemble_fails_on_any_bad_candidate() {
        let ok = ["0", "0", "0", "0", "0", "0", "0"];
        assert!(AssembledModel::compile(&ok).is_ok());

        let bad = ["0", "0", "0", "1.2***", "0", "0", "0"];
        let err = AssembledModel::compile(&bad).unwrap_err();
        assert_eq!(ErrorKind::Variable, err.kind);
        assert!(err.details.unwrap().contains("dA1"));
    }
}
