use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use yamss_core::{CoreError, Eom, Observer, Structure};

use crate::util::{ensure_parent_dir, io_err};

/// Writes an ASCII Tecplot `POINT`-packed zone per recorded step: nodal
/// displaced positions (translation + rotation) at each of a `Triangle`/
/// `Quad` mesh's nodes.
///
/// Grounded on `original_source/src/yamss/inspector/tecplot.hpp` and
/// `motion.hpp`'s `ZONE T="..." DATAPACKING=POINT` convention.
pub struct TecplotObserver {
    path: PathBuf,
    stride: usize,
    writer: Option<BufWriter<File>>,
    steps_seen: u64,
}

impl TecplotObserver {
    pub fn new(path: impl Into<PathBuf>, stride: usize) -> Self {
        TecplotObserver {
            path: path.into(),
            stride: stride.max(1),
            writer: None,
            steps_seen: 0,
        }
    }

    fn write_zone(&mut self, eom: &Eom<f64>, structure: &Structure<f64>) -> Result<(), CoreError> {
        let w = self.writer.as_mut().expect("initialize must run first");
        writeln!(
            w,
            "ZONE T=\"step {}\" I={} DATAPACKING=POINT",
            eom.step(0),
            structure.nodes().count()
        )
        .map_err(io_err)?;
        let q = eom.displacement(0);
        for node in structure.nodes() {
            let p = node.displaced_position(q);
            writeln!(
                w,
                "{:.9e} {:.9e} {:.9e} {:.9e} {:.9e} {:.9e}",
                p[0], p[1], p[2], p[3], p[4], p[5]
            )
            .map_err(io_err)?;
        }
        Ok(())
    }
}

impl Observer<f64> for TecplotObserver {
    fn initialize(&mut self, eom: &Eom<f64>, structure: &Structure<f64>) -> Result<(), CoreError> {
        ensure_parent_dir(&self.path)?;
        let file = File::create(&self.path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "VARIABLES = \"X\",\"Y\",\"Z\",\"RX\",\"RY\",\"RZ\"").map_err(io_err)?;
        self.writer = Some(writer);
        self.write_zone(eom, structure)
    }

    fn update(&mut self, eom: &Eom<f64>, structure: &Structure<f64>) -> Result<(), CoreError> {
        self.steps_seen += 1;
        if self.steps_seen % self.stride as u64 == 0 {
            self.write_zone(eom, structure)?;
        }
        Ok(())
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
    use nalgebra::{DMatrix, DVector};
    use std::time::{SystemTime, UNIX_EPOCH};
    use yamss_core::Node;

    fn unique_temp_path(name: &str) -> PathBuf {
        let pid = std::process::id();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("{name}_{pid}_{nanos}.dat"))
    }

    #[test]
    fn writes_header_and_one_zone_per_step() {
        let mass = DMatrix::from_element(1, 1, 1.0);
        let damping = DMatrix::from_element(1, 1, 0.0);
        let stiffness = DMatrix::from_element(1, 1, 4.0);
        let mut eom = Eom::new(mass, damping, stiffness, 2).unwrap();

        let mut structure = Structure::new();
        let modes = DMatrix::from_row_slice(1, 6, &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        structure
            .add_node(Node::new(1, DVector::zeros(6), modes))
            .unwrap();

        let path = unique_temp_path("tecplot_observer");
        let mut observer = TecplotObserver::new(&path, 1);
        observer.initialize(&eom, &structure).unwrap();
        eom.advance(0.1);
        observer.update(&eom, &structure).unwrap();
        observer.finalize(&eom, &structure).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("VARIABLES"));
        assert_eq!(contents.matches("ZONE").count(), 2);
        let _ = std::fs::remove_file(&path);
    }
}
