use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use yamss_core::{CoreError, Eom, Observer, Structure};

use crate::util::{ensure_parent_dir, io_err};

/// Writes one row per recorded step of modal coordinates, velocities,
/// accelerations, and generalized forces.
///
/// Grounded on `original_source/src/yamss/inspector/modes.hpp`: `TITLE =
/// "Mode History"`, a `VARIABLES` line naming `Iteration`/`Time` plus
/// `Q(n)`/`Q'(n)`/`Q''(n)`/`F(n)` per mode, then a single
/// `ZONE DATAPACKING=POINT` with one row per step.
pub struct ModesObserver {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl ModesObserver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ModesObserver {
            path: path.into(),
            writer: None,
        }
    }

    fn write_row(&mut self, eom: &Eom<f64>) -> Result<(), CoreError> {
        let w = self.writer.as_mut().expect("initialize must run first");
        write!(w, "{} {:.9e}", eom.step(0), eom.time(0)).map_err(io_err)?;
        for v in [
            eom.displacement(0),
            eom.velocity(0),
            eom.acceleration(0),
            eom.force(0),
        ] {
            for value in v.iter() {
                write!(w, " {:.9e}", value).map_err(io_err)?;
            }
        }
        writeln!(w).map_err(io_err)
    }
}

impl Observer<f64> for ModesObserver {
    fn initialize(&mut self, eom: &Eom<f64>, _structure: &Structure<f64>) -> Result<(), CoreError> {
        ensure_parent_dir(&self.path)?;
        let file = File::create(&self.path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "TITLE = \"Mode History\"").map_err(io_err)?;

        let n = eom.num_modes();
        let mut vars = vec!["\"Iteration\"".to_string(), "\"Time\"".to_string()];
        for label in ["Q", "Q'", "Q''", "F"] {
            for i in 0..n {
                vars.push(format!("\"{label}({i})\""));
            }
        }
        writeln!(writer, "VARIABLES = {}", vars.join(", ")).map_err(io_err)?;
        writeln!(writer, "ZONE DATAPACKING=POINT").map_err(io_err)?;
        self.writer = Some(writer);
        self.write_row(eom)
    }

    fn update(&mut self, eom: &Eom<f64>, _structure: &Structure<f64>) -> Result<(), CoreError> {
        self.write_row(eom)
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

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_path(name: &str) -> PathBuf {
        let pid = std::process::id();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("{name}_{pid}_{nanos}.dat"))
    }

    #[test]
    fn writes_header_and_one_row_per_step() {
        let mut eom = Eom::new(
            DMatrix::from_element(1, 1, 1.0),
            DMatrix::from_element(1, 1, 0.0),
            DMatrix::from_element(1, 1, 4.0),
            2,
        )
        .unwrap();
        let structure = Structure::new();
        let path = unique_temp_path("modes_observer");
        let mut observer = ModesObserver::new(&path);
        observer.initialize(&eom, &structure).unwrap();
        eom.advance(0.1);
        observer.update(&eom, &structure).unwrap();
        observer.finalize(&eom, &structure).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Mode History"));
        assert!(contents.contains("\"Q(0)\""));
        assert_eq!(contents.lines().filter(|l| l.starts_with(char::is_numeric)).count(), 2);
        let _ = fs::remove_file(&path);
    }
}
