// Copyright 2026 The Formica Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use crate::model::{AssembledModel, N_ROLES, Role, State};
use crate::results::Trajectory;

/// Every reconstructed model is integrated for exactly this many
/// steps; there is no convergence-based stopping condition.
pub const STEP_COUNT: usize = 100;

const INITIAL_S: f64 = 42.83879;
// slightly above zero so candidate systems whose rates are pure P2
// products do not lock at a zero derivative
const INITIAL_P2: f64 = 1.64e-13;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Specs {
    pub step_count: usize,
    pub colony_size: i64,
    pub quorum: f64,
}

impl Specs {
    pub fn new(colony_size: i64, quorum: i64) -> Self {
        Specs {
            step_count: STEP_COUNT,
            colony_size,
            quorum: quorum as f64,
        }
    }
}

pub fn initial_state() -> State {
    State {
        s: INITIAL_S,
        p2: INITIAL_P2,
        ..State::default()
    }
}

/// Forward-integrate a model from the fixed initial conditions.
///
/// Each step evaluates all seven rate expressions against the current
/// state before any variable is written -- a synchronous update.  A
/// rate that reads a sibling variable always sees its pre-step value.
/// The post-update state is tagged with the 0-based step index and
/// recorded, so the trajectory has `step_count + 1` rows and row
/// *i*+1 carries t=*i*.
pub fn simulate(model: &AssembledModel, specs: &Specs) -> Trajectory {
    let mut data: Vec<f64> = Vec::with_capacity((specs.step_count + 1) * (N_ROLES + 1));
    let mut state = initial_state();
    push_row(&mut data, &state);

    for step in 0..specs.step_count {
        let mut deltas = [0.0; N_ROLES];
        for role in Role::ALL {
            deltas[role.index()] = model.rate(role).eval(&state, specs.quorum);
        }
        for role in Role::ALL {
            state.add(role, deltas[role.index()]);
        }
        state.t = step as f64;
        push_row(&mut data, &state);
    }

    Trajectory::new(data, specs.step_count + 1)
}

fn push_row(data: &mut Vec<f64>, state: &State) {
    for role in Role::ALL {
        data.push(state.get(role));
    }
    data.push(state.t);
}
