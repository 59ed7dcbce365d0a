// Copyright 2026 The Formica Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;
use std::{error, result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NoError, // will never be produced
    DoesNotExist,
    UnrecognizedEof,
    UnrecognizedToken,
    ExtraToken,
    ExpectedNumber,
    EmptyEquation,
    UnknownVariable,
    UnknownFunction,
    BadFunctionArgs,
    BadSolutionDump,
    EmptySolutionSet,
    BadReferenceData,
    TooManyModels,
    Generic,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ErrorCode::*;
        let name = match self {
            NoError => "no_error",
            DoesNotExist => "does_not_exist",
            UnrecognizedEof => "unrecognized_eof",
            UnrecognizedToken => "unrecognized_token",
            ExtraToken => "extra_token",
            ExpectedNumber => "expected_number",
            EmptyEquation => "empty_equation",
            UnknownVariable => "unknown_variable",
            UnknownFunction => "unknown_function",
            BadFunctionArgs => "bad_function_args",
            BadSolutionDump => "bad_solution_dump",
            EmptySolutionSet => "empty_solution_set",
            BadReferenceData => "bad_reference_data",
            TooManyModels => "too_many_models",
            Generic => "generic",
        };

        write!(f, "{name}")
    }
}

/// An error at a specific span of a single candidate equation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EquationError {
    pub start: u16,
    pub end: u16,
    pub code: ErrorCode,
}

impl fmt::Display for EquationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.start, self.end, self.code)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Import,
    Export,
    Model,
    Variable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub details: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind, code: ErrorCode, details: Option<String>) -> Self {
        Error {
            kind,
            code,
            details,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.kind {
            ErrorKind::Import => "ImportError",
            ErrorKind::Export => "ExportError",
            ErrorKind::Model => "ModelError",
            ErrorKind::Variable => "VariableError",
        };
        match self.details {
            Some(ref details) => write!(f, "{}{{{}: {}}}", kind, self.code, details),
            None => write!(f, "{}{{{}}}", kind, self.code),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;
pub type EquationResult<T> = result::Result<T, EquationError>;

#[macro_export]
macro_rules! eprintln(
    ($($arg:tt)*) => {{
        use std::io::Write;
        let r = writeln!(&mut ::std::io::stderr(), $($arg)*);
        r.expect("failed printing to stderr");
    }}
);

#[macro_export]
macro_rules! import_err(
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::Import,
            ErrorCode::$code,
            Some($str),
        ))
    }}
);

#[macro_export]
macro_rules! model_err(
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::Model,
            ErrorCode::$code,
            Some($str),
        ))
    }}
);

#[test]
fn test_error_display() {
    let err = Error::new(
        ErrorKind::Import,
        ErrorCode::BadReferenceData,
        Some("row 3".to_string()),
    );
    assert_eq!("ImportError{bad_reference_data: row 3}", format!("{err}"));

    let err = Error::new(ErrorKind::Model, ErrorCode::EmptySolutionSet, None);
    assert_eq!("ModelError{empty_solution_set}", format!("{err}"));

    let err = EquationError {
        start: 2,
        end: 5,
        code: ErrorCode::UnknownVariable,
    };
    assert_eq!("2:5:unknown_variable", format!("{err}"));
}
