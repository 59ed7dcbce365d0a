// Copyright 2026 The Formica Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Parsing of the regression server's results dump.
//!
//! The dump is one solution block per role, in role order.  Each block
//! is the search string, two frontier header lines, then one row per
//! frontier member (`<error> <complexity> <expression...>`), closed by
//! an `END OF SOLUTION` line and a blank line.  Candidate rows are
//! harvested from a fixed line-offset window relative to the
//! preceding boundary; the first block has no preceding boundary and
//! no leading blank line, so its window sits one line earlier.  These
//! offsets are a compatibility contract with the upstream format.

use std::mem;
use std::ops::Range;

use crate::common::Result;
use crate::model::{CompiledExpression, N_ROLES, Role};
use crate::{eprintln, import_err};

pub const SOLUTION_BOUNDARY: &str = "END OF SOLUTION";

// 1-based line offsets (relative to the preceding boundary) that hold
// candidate rows.
const BLOCK_WINDOW: Range<usize> = 5..9;
const FIRST_BLOCK_WINDOW: Range<usize> = 4..8;

// leading whitespace-delimited metadata tokens on each candidate row:
// error, complexity
const METADATA_TOKENS: usize = 2;

/// The raw candidate texts for every role, in frontier order.
#[derive(Clone, Debug, PartialEq)]
pub struct SolutionSet {
    candidates: [Vec<String>; N_ROLES],
}

impl SolutionSet {
    /// Split a results dump at its boundary lines and harvest the
    /// candidate rows of each block.  Block *i* holds the candidates
    /// for `Role::ALL[i]`.  Lines after the final boundary are
    /// ignored; surplus blocks are ignored with a warning.
    pub fn parse(content: &str) -> Result<SolutionSet> {
        let mut blocks: Vec<Vec<String>> = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut first_block = true;
        let mut counter = 0usize;

        for line in content.lines() {
            counter += 1;
            if line.contains(SOLUTION_BOUNDARY) {
                blocks.push(mem::take(&mut current));
                first_block = false;
                counter = 0;
                continue;
            }

            let window = if first_block {
                FIRST_BLOCK_WINDOW
            } else {
                BLOCK_WINDOW
            };
            if window.contains(&counter) {
                let tokens: Vec<&str> = line.split_whitespace().collect();
                if tokens.len() > METADATA_TOKENS {
                    current.push(tokens[METADATA_TOKENS..].join(" "));
                }
            }
        }

        if blocks.len() < N_ROLES {
            return import_err!(
                BadSolutionDump,
                format!(
                    "expected {} solution blocks, found {}",
                    N_ROLES,
                    blocks.len()
                )
            );
        }
        if blocks.len() > N_ROLES {
            eprintln!(
                "warning: ignoring {} extra solution block(s)",
                blocks.len() - N_ROLES
            );
        }

        blocks.truncate(N_ROLES);
        let candidates: [Vec<String>; N_ROLES] = blocks.try_into().unwrap();
        Ok(SolutionSet { candidates })
    }

    pub fn candidates(&self, role: Role) -> &[String] {
        &self.candidates[role.index()]
    }
}

/// The translated candidates for every role.  Candidates that fail to
/// translate are dropped here, with a warning, so one malformed row
/// can never abort a whole search.
#[derive(Clone, Debug)]
pub struct CandidateSet {
    exprs: [Vec<CompiledExpression>; N_ROLES],
}

impl CandidateSet {
    pub fn compile(solutions: &SolutionSet) -> CandidateSet {
        let exprs = std::array::from_fn(|i| {
            let role = Role::ALL[i];
            solutions
                .candidates(role)
                .iter()
                .filter_map(|source| match CompiledExpression::compile(source) {
                    Ok(expr) => Some(expr),
                    Err(err) => {
                        eprintln!("warning: skipping d{role} candidate `{source}`: {err}");
                        None
                    }
                })
                .collect()
        });
        CandidateSet { exprs }
    }

    pub fn candidates(&self, role: Role) -> &[CompiledExpression] {
        &self.exprs[role.index()]
    }

    pub fn counts(&self) -> [usize; N_ROLES] {
        std::array::from_fn(|i| self.exprs[i].len())
    }

    /// Roles left with no viable candidate.  A non-empty result means
    /// no model containing those roles can be built.
    pub fn empty_roles(&self) -> Vec<Role> {
        Role::ALL
            .iter()
            .copied()
            .filter(|role| self.exprs[role.index()].is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // mirror of the upstream writer: search string, two frontier
    // header lines, the frontier rows, boundary, blank line
    fn block(first: bool, role: &str, rows: &[&str]) -> String {
        let mut lines: Vec<String> = Vec::new();
        if !first {
            lines.push(String::new());
        }
        lines.push(format!("d{role} = f(S, A1, A2, P2)"));
        lines.push("Solution frontier:".to_string());
        lines.push("Fitness  Complexity  Equation".to_string());
        for i in 0..4 {
            match rows.get(i) {
                Some(expr) => lines.push(format!("0.0{i} {i} {expr}")),
                None => lines.push(String::new()),
            }
        }
        lines.push(SOLUTION_BOUNDARY.to_string());
        lines.join("\n") + "\n"
    }

    fn dump(per_role: &[&[&str]; N_ROLES]) -> String {
        let mut out = String::new();
        for (i, (role, rows)) in Role::ALL.iter().zip(per_role.iter()).enumerate() {
            out.push_str(&block(i == 0, role.as_str(), rows));
        }
        out
    }

    #[test]
    fn parse_one_candidate_per_role() {
        let text = dump(&[
            &["1.1*S"],
            &["1.2*S"],
            &["1.3*S"],
            &["1.4*S"],
            &["1.5*S"],
            &["1.6*S"],
            &["1.7*S"],
        ]);
        let solutions = SolutionSet::parse(&text).unwrap();
        assert_eq!(&["1.1*S".to_string()], solutions.candidates(Role::S));
        assert_eq!(&["1.4*S".to_string()], solutions.candidates(Role::A1));
        assert_eq!(&["1.7*S".to_string()], solutions.candidates(Role::R2));
    }

    #[test]
    fn candidate_order_is_preserved() {
        let text = dump(&[
            &["1*S", "2*S", "3*S", "4*S"],
            &["5*S"],
            &["6*S"],
            &["7*S"],
            &["8*S"],
            &["9*S"],
            &["10*S"],
        ]);
        let solutions = SolutionSet::parse(&text).unwrap();
        let expected: Vec<String> = ["1*S", "2*S", "3*S", "4*S"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(expected, solutions.candidates(Role::S));
    }

    #[test]
    fn metadata_tokens_are_stripped() {
        // rows are written as "<error> <complexity> <expression...>";
        // the expression itself may contain spaces
        let text = dump(&[
            &["1.2 * S - 0.3"],
            &["0"],
            &["0"],
            &["0"],
            &["0"],
            &["0"],
            &["0"],
        ]);
        let solutions = SolutionSet::parse(&text).unwrap();
        assert_eq!(&["1.2 * S - 0.3".to_string()], solutions.candidates(Role::S));
    }

    #[test]
    fn too_few_blocks_is_an_error() {
        let text = block(true, "S", &["1*S"]);
        let err = SolutionSet::parse(&text).unwrap_err();
        assert_eq!(crate::common::ErrorCode::BadSolutionDump, err.code);
    }

    #[test]
    fn rows_outside_the_window_are_ignored() {
        // a fifth frontier row falls outside the fixed window
        let mut text = String::new();
        text.push_str("dS = f(S, A1, A2, P2)\n");
        text.push_str("Solution frontier:\n");
        text.push_str("Fitness  Complexity  Equation\n");
        text.push_str("0.01 1 1*S\n");
        text.push_str("0.02 2 2*S\n");
        text.push_str("0.03 3 3*S\n");
        text.push_str("0.04 4 4*S\n");
        text.push_str("0.05 5 5*S\n");
        text.push_str(&format!("{SOLUTION_BOUNDARY}\n"));
        for role in Role::ALL.iter().skip(1) {
            text.push_str(&block(false, role.as_str(), &["0"]));
        }
        let solutions = SolutionSet::parse(&text).unwrap();
        let expected: Vec<String> = ["1*S", "2*S", "3*S", "4*S"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(expected, solutions.candidates(Role::S));
    }

    #[test]
    fn compile_skips_malformed_candidates() {
        let text = dump(&[
            &["1*S", "1.2***", "2*S"],
            &["0"],
            &["0"],
            &["0"],
            &["0"],
            &["0"],
            &["0"],
        ]);
        let solutions = SolutionSet::parse(&text).unwrap();
        assert_eq!(3, solutions.candidates(Role::S).len());

        let candidates = CandidateSet::compile(&solutions);
        assert_eq!([2, 1, 1, 1, 1, 1, 1], candidates.counts());
        assert_eq!("1*S", candidates.candidates(Role::S)[0].source());
        assert_eq!("2*S", candidates.candidates(Role::S)[1].source());
        assert!(candidates.empty_roles().is_empty());
    }

    #[test]
    fn all_candidates_malformed_leaves_role_empty() {
        let text = dump(&[
            &["1*S"],
            &["2***"],
            &["0"],
            &["0"],
            &["0"],
            &["0"],
            &["0"],
        ]);
        let solutions = SolutionSet::parse(&text).unwrap();
        let candidates = CandidateSet::compile(&solutions);
        assert_eq!(vec![Role::P1], candidates.empty_roles());
    }
}
