// Copyright 2026 The Formica Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Goodness-of-fit scoring of a simulated trajectory against training
//! data.
//!
//! R² is computed per role over a fixed window of steps and averaged.
//! The total sum of squares is taken around the mean of the
//! *simulated* series, a deliberate carry-over from the pipeline this
//! one is compatible with.  A degenerate fit (zero total variance, or
//! arithmetic that collapses to NaN) scores 0 for that role rather
//! than poisoning the average.

use std::fs;
use std::ops::Range;
use std::path::Path;

use crate::common::Result;
use crate::import_err;
use crate::model::{N_ROLES, Role};
use crate::results::Trajectory;

// trajectory rows scored against the training data: the initial
// conditions at row 0 are skipped, as are the two final rows
const FIT_WINDOW_START: usize = 1;
const FIT_WINDOW_END: usize = 99;

pub fn fit_window() -> Range<usize> {
    FIT_WINDOW_START..FIT_WINDOW_END
}

/// Training data, kept as raw rows.  Fields are extracted (and
/// parsed) on demand, so only fields a role pairing actually
/// references can fail.
#[derive(Clone, Debug)]
pub struct Reference {
    rows: Vec<String>,
}

impl Reference {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Reference> {
        let content = fs::read_to_string(path.as_ref()).map_err(|err| {
            use crate::common::{Error, ErrorCode, ErrorKind};
            Error::new(
                ErrorKind::Import,
                ErrorCode::DoesNotExist,
                Some(format!("{}: {}", path.as_ref().display(), err)),
            )
        })?;
        Ok(Reference::from_lines(content.lines().map(str::to_string)))
    }

    pub fn from_lines<I: IntoIterator<Item = String>>(lines: I) -> Reference {
        Reference {
            rows: lines.into_iter().collect(),
        }
    }

    /// A role's raw field at one step: the row's text before the
    /// first comma, whitespace-split, indexed by the fixed role
    /// pairing.
    pub fn raw_field(&self, step: usize, role: Role) -> Result<&str> {
        let row = match self.rows.get(step) {
            Some(row) => row,
            None => {
                return import_err!(
                    BadReferenceData,
                    format!("missing row {step} for {role}")
                );
            }
        };
        let fields = row.split(',').next().unwrap_or("");
        match fields.split_whitespace().nth(role.file_column()) {
            Some(field) => Ok(field),
            None => import_err!(
                BadReferenceData,
                format!("row {step} has no column {} for {role}", role.file_column())
            ),
        }
    }

    /// A role's parsed series over a window of steps.  A non-numeric
    /// field is a hard failure; the training data is assumed
    /// well-formed and there is no recovery path.
    pub fn series(&self, role: Role, window: Range<usize>) -> Result<Vec<f64>> {
        window
            .map(|step| {
                let field = self.raw_field(step, role)?;
                field.parse::<f64>().map_err(|_| {
                    use crate::common::{Error, ErrorCode, ErrorKind};
                    Error::new(
                        ErrorKind::Import,
                        ErrorCode::BadReferenceData,
                        Some(format!("row {step} {role}: `{field}` is not a number")),
                    )
                })
            })
            .collect()
    }
}

/// R² of a simulated series against its reference series, guarded
/// first (zero or undefined total variance scores 0), never NaN.
fn r_squared(sim: &[f64], reference: &[f64]) -> f64 {
    let ss_res: f64 = sim
        .iter()
        .zip(reference.iter())
        .map(|(s, r)| (s - r) * (s - r))
        .sum();

    let mean: f64 = sim.iter().sum::<f64>() / sim.len() as f64;
    let ss_tot: f64 = sim.iter().map(|s| (s - mean) * (s - mean)).sum();

    if ss_tot == 0.0 {
        return 0.0;
    }
    let r_sq = 1.0 - ss_res / ss_tot;
    if r_sq.is_nan() { 0.0 } else { r_sq }
}

/// Score a trajectory against reference series already extracted for
/// the fit window, one per role: per-role R² floored at 0, averaged.
pub(crate) fn fit_score_extracted(
    trajectory: &Trajectory,
    reference: &[Vec<f64>; N_ROLES],
) -> f64 {
    let mut sum = 0.0;
    for role in Role::ALL {
        let sim = trajectory.series(role, fit_window());
        let r_sq = r_squared(&sim, &reference[role.index()]);
        sum += r_sq.max(0.0);
    }
    sum / N_ROLES as f64
}

/// Extract every role's reference series for the fit window.
pub(crate) fn extract_all(reference: &Reference) -> Result<[Vec<f64>; N_ROLES]> {
    let mut series = Vec::with_capacity(N_ROLES);
    for role in Role::ALL {
        series.push(reference.series(role, fit_window())?);
    }
    Ok(series.try_into().unwrap())
}

/// The FitScore of one trajectory against the training data.
pub fn fit_score(trajectory: &Trajectory, reference: &Reference) -> Result<f64> {
    let extracted = extract_all(reference)?;
    Ok(fit_score_extracted(trajectory, &extracted))
}
