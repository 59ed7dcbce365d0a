// Copyright 2026 The Formica Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Brute-force model search over the full Cartesian product of
//! per-role candidates.
//!
//! Every combination is assembled, simulated, and scored; nothing is
//! pruned.  Combinations are enumerated as mixed-radix indices with S
//! outermost and R2 fastest-varying, and the reduction maximizes the
//! pair (rounded score, index), so of two combinations with the same
//! rounded score the later-enumerated one wins -- deterministically,
//! even though the map runs in parallel.

use ordered_float::OrderedFloat;
use rayon::prelude::*;

use crate::common::Result;
use crate::fit::{self, Reference};
use crate::model::{AssembledModel, CompiledExpression, N_ROLES, Role};
use crate::model_err;
use crate::sim::{Specs, simulate};
use crate::solutions::CandidateSet;

// selection keys keep this many decimal places, mirroring the
// upstream pipeline's rounding
const SCORE_DECIMALS: f64 = 1e6;

pub(crate) fn round_score(score: f64) -> f64 {
    (score * SCORE_DECIMALS).round() / SCORE_DECIMALS
}

/// The winning combination: its rounded FitScore, the per-role
/// candidate indices it was assembled from, and the model itself.
#[derive(Clone, Debug)]
pub struct BestModel {
    pub score: f64,
    pub choices: [usize; N_ROLES],
    pub model: AssembledModel,
}

/// Evaluate every combination of candidates and keep the best fit.
pub fn search(
    candidates: &CandidateSet,
    specs: &Specs,
    reference: &Reference,
) -> Result<BestModel> {
    let empty = candidates.empty_roles();
    if !empty.is_empty() {
        let names: Vec<&str> = empty.iter().map(|role| role.as_str()).collect();
        return model_err!(
            EmptySolutionSet,
            format!("no viable candidates for {}", names.join(", "))
        );
    }

    let counts = candidates.counts();
    let total = match counts
        .iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
    {
        Some(total) => total,
        None => {
            return model_err!(
                TooManyModels,
                format!("candidate counts {counts:?} overflow the search space")
            );
        }
    };

    let reference_series = fit::extract_all(reference)?;

    let best = (0..total)
        .into_par_iter()
        .map(|index| {
            let choices = decode(index, &counts);
            let model = assemble(candidates, &choices);
            let trajectory = simulate(&model, specs);
            let score = fit::fit_score_extracted(&trajectory, &reference_series);
            (OrderedFloat(round_score(score)), index)
        })
        .max();

    // total >= 1: every role has at least one candidate
    let (score, index) = best.unwrap();
    let choices = decode(index, &counts);
    Ok(BestModel {
        score: score.into_inner(),
        choices,
        model: assemble(candidates, &choices),
    })
}

fn decode(mut index: usize, counts: &[usize; N_ROLES]) -> [usize; N_ROLES] {
    let mut choices = [0usize; N_ROLES];
    for i in (0..N_ROLES).rev() {
        choices[i] = index % counts[i];
        index /= counts[i];
    }
    choices
}

fn assemble(candidates: &CandidateSet, choices: &[usize; N_ROLES]) -> AssembledModel {
    let rates: [CompiledExpression; N_ROLES] =
        std::array::from_fn(|i| candidates.candidates(Role::ALL[i])[choices[i]].clone());
    AssembledModel::from_compiled(rates)
}
