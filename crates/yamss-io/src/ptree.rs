use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use serde_json::json;
use yamss_core::{CoreError, Eom, Observer, Structure};

use crate::util::{ensure_parent_dir, io_err};

/// Writes one JSON object per recorded step (JSON Lines), each holding the
/// step index, time, and modal state. The Rust-idiomatic analogue of
/// `original_source/src/yamss/inspector/ptree.hpp`'s
/// `boost::property_tree` dump -- `serde_json::Value` standing in for the
/// property tree.
pub struct PropertyTreeObserver {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl PropertyTreeObserver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PropertyTreeObserver {
            path: path.into(),
            writer: None,
        }
    }

    fn write_record(&mut self, eom: &Eom<f64>) -> Result<(), CoreError> {
        let record = json!({
            "step": eom.step(0),
            "time": eom.time(0),
            "displacement": eom.displacement(0).as_slice(),
            "velocity": eom.velocity(0).as_slice(),
            "acceleration": eom.acceleration(0).as_slice(),
        });
        let w = self.writer.as_mut().expect("initialize must run first");
        writeln!(w, "{}", serde_json::to_string(&record).map_err(io_err)?).map_err(io_err)
    }
}

impl Observer<f64> for PropertyTreeObserver {
    fn initialize(&mut self, eom: &Eom<f64>, _structure: &Structure<f64>) -> Result<(), CoreError> {
        ensure_parent_dir(&self.path)?;
        let file = File::create(&self.path).map_err(io_err)?;
        self.writer = Some(BufWriter::new(file));
        self.write_record(eom)
    }

    fn update(&mut self, eom: &Eom<f64>, _structure: &Structure<f64>) -> Result<(), CoreError> {
        self.write_record(eom)
    }

    fn finalize(&mut self, _eom: &Eom<f64>, _structure: &Structure<f64>) -> Result<(), CoreError> {
        if let Some(w) = self.writer.as_mut() {
            w.flush().map_err(io_err)?;
        }
        Ok(())
    }

    fn files(&self) -> Vec<String> {
        vec![self.path.display().to_string()]
    }
}
