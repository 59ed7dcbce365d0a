// Copyright 2026 The Formica Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::io;
use std::ops::Range;
use std::path::Path;

use crate::common::{Error, ErrorCode, ErrorKind, Result};
use crate::fit::{Reference, fit_window};
use crate::model::{N_ROLES, Role};

pub(crate) const T_OFF: usize = N_ROLES;
pub(crate) const STEP_SIZE: usize = N_ROLES + 1;

/// A simulated run: one row per recorded step, each row laid out as
/// `[S, P1, P2, A1, A2, R1, R2, t]`, backed by one flat allocation.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    // one large allocation
    data: Box<[f64]>,
    step_size: usize,
    step_count: usize,
}

impl Trajectory {
    pub(crate) fn new(data: Vec<f64>, step_count: usize) -> Trajectory {
        assert_eq!(data.len(), step_count * STEP_SIZE);
        Trajectory {
            data: data.into_boxed_slice(),
            step_size: STEP_SIZE,
            step_count,
        }
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn value(&self, step: usize, role: Role) -> f64 {
        self.data[step * self.step_size + role.index()]
    }

    pub fn time(&self, step: usize) -> f64 {
        self.data[step * self.step_size + T_OFF]
    }

    pub fn iter(&self) -> std::iter::Take<std::slice::Chunks<'_, f64>> {
        self.data.chunks(self.step_size).take(self.step_count)
    }

    /// One role's series over a window of steps.
    pub fn series(&self, role: Role, window: Range<usize>) -> Vec<f64> {
        window.map(|step| self.value(step, role)).collect()
    }
}

/// Write the winning model's run next to the training data: one
/// `<role> Underlying` / `<role> Approximation` column pair per role
/// (simulated and reference respectively), one row per step of the
/// same window the scorer used.  Reference fields are passed through
/// verbatim.
pub fn write_comparison<W: io::Write>(
    trajectory: &Trajectory,
    reference: &Reference,
    writer: W,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = Vec::with_capacity(N_ROLES * 2);
    for role in Role::ALL {
        header.push(format!("{role} Underlying"));
        header.push(format!("{role} Approximation"));
    }
    wtr.write_record(&header).map_err(export_error)?;

    for step in fit_window() {
        let mut record: Vec<String> = Vec::with_capacity(N_ROLES * 2);
        for role in Role::ALL {
            record.push(format!("{}", trajectory.value(step, role)));
            record.push(reference.raw_field(step, role)?.to_string());
        }
        wtr.write_record(&record).map_err(export_error)?;
    }

    wtr.flush()
        .map_err(|err| export_error(csv::Error::from(err)))?;
    Ok(())
}

pub fn write_comparison_file<P: AsRef<Path>>(
    trajectory: &Trajectory,
    reference: &Reference,
    path: P,
) -> Result<()> {
    let file = std::fs::File::create(path.as_ref()).map_err(|err| {
        Error::new(
            ErrorKind::Export,
            ErrorCode::Generic,
            Some(format!("{}: {}", path.as_ref().display(), err)),
        )
    })?;
    write_comparison(trajectory, reference, file)
}

fn export_error(err: csv::Error) -> Error {
    Error::new(ErrorKind::Export, ErrorCode::Generic, Some(err.to_string()))
}
