use std::fs;
use std::path::PathBuf;

use yamss_core::{CoreError, Eom, Observer, Structure};

use crate::util::{ensure_parent_dir, io_err};

/// Accumulates run statistics and writes a one-shot human-readable report
/// at `finalize`, matching `original_source/src/yamss/inspector/summary.hpp`
/// and `ccx-io::output::write_dat`/`write_sta`'s plain-text report idiom.
pub struct SummaryObserver {
    path: PathBuf,
    steps: u64,
    start_time: f64,
    max_displacement_norm: f64,
}

impl SummaryObserver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SummaryObserver {
            path: path.into(),
            steps: 0,
            start_time: 0.0,
            max_displacement_norm: 0.0,
        }
    }
}

impl Observer<f64> for SummaryObserver {
    fn initialize(&mut self, eom: &Eom<f64>, _structure: &Structure<f64>) -> Result<(), CoreError> {
        self.start_time = eom.time(0);
        self.max_displacement_norm = eom.displacement(0).norm();
        Ok(())
    }

    fn update(&mut self, eom: &Eom<f64>, _structure: &Structure<f64>) -> Result<(), CoreError> {
        self.steps += 1;
        let norm = eom.displacement(0).norm();
        if norm > self.max_displacement_norm {
            self.max_displacement_norm = norm;
        }
        Ok(())
    }

    fn finalize(&mut self, eom: &Eom<f64>, structure: &Structure<f64>) -> Result<(), CoreError> {
        ensure_parent_dir(&self.path)?;
        let body = format!(
            "YAMSS RUN SUMMARY\n\
             STEPS: {}\n\
             START TIME: {}\n\
             FINAL TIME: {:.6}\n\
             NODES: {}\n\
             MAX DISPLACEMENT NORM: {:.9e}\n",
            self.steps,
            self.start_time,
            eom.time(0),
            structure.nodes().count(),
            self.max_displacement_norm,
        );
        fs::write(&self.path, body).map_err(io_err)
    }

    fn files(&self) -> Vec<String> {
        vec![self.path.display().to_string()]
    }
}
